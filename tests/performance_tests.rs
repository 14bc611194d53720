use chart_grouping::approximation::Approximation;
use chart_grouping::data_types::{RawSeries, Series, SeriesKind, TimeAxis, TimeUnit};
use chart_grouping::grouping::group_data;
use chart_grouping::GroupingController;
use std::time::Instant;

#[test]
fn test_group_data_1m_points() {
    let n = 1_000_000;
    let x: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let y: Vec<Option<f64>> = (0..n).map(|i| Some((i as f64 * 0.01).sin())).collect();
    let positions: Vec<f64> = (0..=1000).map(|k| k as f64 * 1000.0).collect();

    let start = Instant::now();
    let res = group_data(&x, &[&y], &positions, &Approximation::Average);
    let duration = start.elapsed();

    println!("group_data 1M points -> {} groups took: {:?}", res.len(), duration);
    assert_eq!(res.len(), 1000);
    assert!(res.group_map.iter().all(|s| s.length == 1000));
}

#[test]
fn test_controller_1m_ohlc_points() {
    let n = 1_000_000;
    let x: Vec<f64> = (0..n).map(|i| i as f64 * TimeUnit::SECOND_MS).collect();
    let open: Vec<Option<f64>> = (0..n).map(|i| Some((i as f64).sin())).collect();
    let high: Vec<Option<f64>> = (0..n).map(|i| Some((i as f64).sin() + 1.0)).collect();
    let low: Vec<Option<f64>> = (0..n).map(|i| Some((i as f64).sin() - 1.0)).collect();
    let close: Vec<Option<f64>> = (0..n).map(|i| Some((i as f64).cos())).collect();
    let last = x[n - 1];

    let mut controller = GroupingController::new(TimeAxis::new(0.0, last, 1600.0));
    controller
        .add_series(Series::new(
            "candles",
            SeriesKind::Candlestick,
            RawSeries::ohlc(x, open, high, low, close),
        ))
        .unwrap();

    let start = Instant::now();
    controller.process();
    let duration = start.elapsed();

    let series = controller.series(0).unwrap();
    let groups = series.grouped_x().unwrap().len();
    println!("Candlestick grouping 1M points -> {} candles took: {:?}", groups, duration);
    assert!(groups <= 1600 / 10 * 2);
    assert!(groups > 0);
}
