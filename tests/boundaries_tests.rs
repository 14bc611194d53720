use chart_grouping::boundaries::{
    normalize_interval, BoundaryProvider, BoundaryRequest, CalendarBoundaryProvider,
    NormalizedInterval,
};
use chart_grouping::data_types::{default_grouping_units, GroupingUnit, TimeUnit};
use chrono::{TimeZone, Utc, Weekday};

fn utc_ms(y: i32, m: u32, d: u32, h: u32) -> f64 {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap().timestamp_millis() as f64
}

fn request(interval: NormalizedInterval, min: f64, max: f64) -> BoundaryRequest<'static> {
    BoundaryRequest {
        interval,
        min,
        max,
        week_start: Weekday::Mon,
        x: &[],
        closest_point_range: None,
    }
}

#[test]
fn test_normalize_to_allowed_units() {
    let units = default_grouping_units();
    let cases = [
        (19_980.0, TimeUnit::Second, 15),
        (1_198_800.0, TimeUnit::Minute, 15),
        (TimeUnit::DAY_MS, TimeUnit::Day, 1),
        (3.0 * TimeUnit::DAY_MS, TimeUnit::Day, 1),
        (5.0 * TimeUnit::DAY_MS, TimeUnit::Week, 1),
        (60.0 * TimeUnit::DAY_MS, TimeUnit::Month, 3),
        (2.0 * TimeUnit::YEAR_MS, TimeUnit::Year, 2),
    ];
    for (interval, unit, count) in cases {
        let n = normalize_interval(interval, &units);
        println!("{} ms -> {} x {}", interval, n.count, n.unit);
        assert_eq!(n, NormalizedInterval::new(unit, count));
    }
}

#[test]
fn test_normalize_with_custom_units() {
    let units = vec![
        GroupingUnit(TimeUnit::Hour, Some(vec![1, 6])),
        GroupingUnit(TimeUnit::Day, Some(vec![1, 7])),
    ];
    // Below every threshold: the finest unit is kept
    let n = normalize_interval(1.0, &units);
    assert_eq!(n, NormalizedInterval::new(TimeUnit::Hour, 1));

    let n = normalize_interval(5.0 * TimeUnit::DAY_MS, &units);
    assert_eq!(n, NormalizedInterval::new(TimeUnit::Day, 7));
}

#[test]
fn test_day_boundaries_are_midnight_aligned() {
    let provider = CalendarBoundaryProvider::default();
    let min = utc_ms(2024, 1, 1, 5);
    let max = utc_ms(2024, 1, 3, 17);

    let res = provider.generate_boundaries(&request(
        NormalizedInterval::new(TimeUnit::Day, 1),
        min,
        max,
    ));

    assert_eq!(
        res.positions,
        vec![
            utc_ms(2024, 1, 1, 0),
            utc_ms(2024, 1, 2, 0),
            utc_ms(2024, 1, 3, 0),
            utc_ms(2024, 1, 4, 0),
        ]
    );
    assert_eq!(res.info.unit, TimeUnit::Day);
    assert_eq!(res.info.count, 1);
    assert_eq!(res.info.total_range, TimeUnit::DAY_MS);
}

#[test]
fn test_sentinel_reaches_the_range_end() {
    let provider = CalendarBoundaryProvider::default();
    let res = provider.generate_boundaries(&request(
        NormalizedInterval::new(TimeUnit::Second, 15),
        1_000.0,
        100_000.0,
    ));

    assert_eq!(res.positions.first(), Some(&0.0));
    assert!(*res.positions.last().unwrap() >= 100_000.0);
    assert!(res.positions.windows(2).all(|w| w[1] - w[0] == 15_000.0));
    // Only the sentinel sits at or past the end
    assert_eq!(res.positions.iter().filter(|&&p| p >= 100_000.0).count(), 1);
}

#[test]
fn test_week_start_day() {
    let provider = CalendarBoundaryProvider::default();
    // Wednesday
    let min = utc_ms(2024, 1, 3, 12);
    let interval = NormalizedInterval::new(TimeUnit::Week, 1);

    let monday = provider.generate_boundaries(&request(interval, min, min + 1.0));
    assert_eq!(monday.positions[0], utc_ms(2024, 1, 1, 0));

    let mut sunday_request = request(interval, min, min + 1.0);
    sunday_request.week_start = Weekday::Sun;
    let sunday = provider.generate_boundaries(&sunday_request);
    assert_eq!(sunday.positions[0], utc_ms(2023, 12, 31, 0));
    assert_eq!(sunday.positions[1], utc_ms(2024, 1, 7, 0));
}

#[test]
fn test_month_multiples_align_to_quarters() {
    let provider = CalendarBoundaryProvider::default();
    let res = provider.generate_boundaries(&request(
        NormalizedInterval::new(TimeUnit::Month, 3),
        utc_ms(2024, 5, 15, 0),
        utc_ms(2024, 11, 2, 0),
    ));

    assert_eq!(
        res.positions,
        vec![
            utc_ms(2024, 4, 1, 0),
            utc_ms(2024, 7, 1, 0),
            utc_ms(2024, 10, 1, 0),
            utc_ms(2025, 1, 1, 0),
        ]
    );
}

#[test]
fn test_year_boundaries() {
    let provider = CalendarBoundaryProvider::default();
    let res = provider.generate_boundaries(&request(
        NormalizedInterval::new(TimeUnit::Year, 2),
        utc_ms(2021, 6, 1, 0),
        utc_ms(2024, 6, 1, 0),
    ));

    assert_eq!(
        res.positions,
        vec![
            utc_ms(2020, 1, 1, 0),
            utc_ms(2022, 1, 1, 0),
            utc_ms(2024, 1, 1, 0),
            utc_ms(2026, 1, 1, 0),
        ]
    );
}

#[test]
fn test_local_midnight_in_timezone() {
    let provider = CalendarBoundaryProvider::with_timezone_name("Europe/Paris").unwrap();
    let res = provider.generate_boundaries(&request(
        NormalizedInterval::new(TimeUnit::Day, 1),
        utc_ms(2024, 1, 1, 12),
        utc_ms(2024, 1, 2, 12),
    ));

    // Midnight in Paris is 23:00 UTC in winter
    assert_eq!(res.positions[0], utc_ms(2023, 12, 31, 23));
    assert_eq!(res.positions[1], utc_ms(2024, 1, 1, 23));
}

#[test]
fn test_daylight_saving_day_is_short() {
    let provider = CalendarBoundaryProvider::with_timezone_name("Europe/Paris").unwrap();
    let res = provider.generate_boundaries(&request(
        NormalizedInterval::new(TimeUnit::Day, 1),
        utc_ms(2024, 3, 30, 12),
        utc_ms(2024, 4, 1, 12),
    ));

    assert_eq!(res.positions[0], utc_ms(2024, 3, 29, 23));
    assert_eq!(res.positions[1], utc_ms(2024, 3, 30, 23));
    // Clocks jump forward on March 31st
    assert_eq!(res.positions[2], utc_ms(2024, 3, 31, 22));
    assert_eq!(res.positions[2] - res.positions[1], 23.0 * TimeUnit::HOUR_MS);
}

#[test]
fn test_unknown_timezone() {
    assert!(CalendarBoundaryProvider::with_timezone_name("Mars/Olympus_Mons").is_err());
}

#[test]
fn test_invalid_range_yields_no_positions() {
    let provider = CalendarBoundaryProvider::default();
    let res = provider.generate_boundaries(&request(
        NormalizedInterval::new(TimeUnit::Second, 1),
        10.0,
        f64::NAN,
    ));
    assert!(res.is_empty());
}
