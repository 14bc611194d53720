use chart_grouping::boundaries::{
    BoundaryProvider, BoundaryRequest, CalendarBoundaryProvider, GroupPositions, GroupingInfo,
    NormalizedInterval,
};
use chart_grouping::data_types::{
    GroupedValue, GroupingOptions, GroupingUnit, RawSeries, SeriesKind, TimeAxis, TimeUnit,
};
use chart_grouping::processor::{
    closest_point_range, CropProcessor, DataProcessor, GroupingDataProcessor, ProcessContext,
};

fn seconds(n: usize) -> RawSeries {
    let x: Vec<f64> = (0..n).map(|i| i as f64 * 1000.0).collect();
    let y: Vec<f64> = (0..n).map(|i| i as f64).collect();
    RawSeries::from_values(x, y)
}

#[test]
fn test_crop_range_keeps_one_shoulder_point() {
    let x: Vec<f64> = (0..10).map(|i| i as f64).collect();
    assert_eq!(CropProcessor::crop_range(&x, 3.0, 5.0), (2, 7));
    assert_eq!(CropProcessor::crop_range(&x, -10.0, 100.0), (0, 10));
    assert_eq!(CropProcessor::crop_range(&x, 20.0, 30.0), (9, 10));
}

#[test]
fn test_closest_point_range() {
    assert_eq!(closest_point_range(&[0.0, 10.0, 15.0, 15.0, 40.0]), Some(5.0));
    assert_eq!(closest_point_range(&[1.0]), None);
}

#[test]
fn test_short_series_are_not_cropped_without_grouping() {
    let raw = seconds(100);
    let axis = TimeAxis::new(10_000.0, 20_000.0, 500.0);
    let ctx = ProcessContext {
        viewport: &axis,
        kind: SeriesKind::Line,
        grouping: None,
        pixel_width: &0.0_f64,
    };

    let processed = CropProcessor::default().process(&raw, &ctx).unwrap();
    assert_eq!(processed.len(), 100);
    assert_eq!(processed.crop_start, 0);
    assert_eq!(processed.closest_point_range, Some(1000.0));
}

#[test]
fn test_grouping_forces_a_crop() {
    let raw = seconds(100);
    let axis = TimeAxis::new(10_000.0, 20_000.0, 500.0);
    let options = GroupingOptions::for_kind(SeriesKind::Line);
    let ctx = ProcessContext {
        viewport: &axis,
        kind: SeriesKind::Line,
        grouping: Some(&options),
        pixel_width: &0.0_f64,
    };

    let processed = CropProcessor::default().process(&raw, &ctx).unwrap();
    assert_eq!(processed.crop_start, 9);
    assert_eq!(processed.x.first(), Some(&9_000.0));
    assert_eq!(processed.x.last(), Some(&21_000.0));
    assert_eq!(processed.columns[0].len(), processed.len());
}

#[test]
fn test_empty_series_has_no_data() {
    let raw = RawSeries::new(Vec::new(), Vec::new());
    let axis = TimeAxis::new(0.0, 1.0, 100.0);
    let options = GroupingOptions::for_kind(SeriesKind::Line);
    let ctx = ProcessContext {
        viewport: &axis,
        kind: SeriesKind::Line,
        grouping: Some(&options),
        pixel_width: &2.0_f64,
    };

    assert!(GroupingDataProcessor::standard().process(&raw, &ctx).is_none());
}

#[test]
fn test_zero_width_leaves_data_ungrouped() {
    let raw = seconds(1000);
    let axis = TimeAxis::new(0.0, 999_000.0, 100.0);
    let options = GroupingOptions::for_kind(SeriesKind::Line);
    let ctx = ProcessContext {
        viewport: &axis,
        kind: SeriesKind::Line,
        grouping: Some(&options),
        pixel_width: &0.0_f64,
    };

    let processed = GroupingDataProcessor::standard().process(&raw, &ctx).unwrap();
    assert!(!processed.is_grouped());
    assert_eq!(processed.group_pixel_width, None);
    assert_eq!(processed.display_len(), 1000);
}

#[test]
fn test_groups_with_the_shared_width() {
    let raw = seconds(1000);
    let axis = TimeAxis::new(0.0, 999_000.0, 100.0);
    let options = GroupingOptions::for_kind(SeriesKind::Line);
    let ctx = ProcessContext {
        viewport: &axis,
        kind: SeriesKind::Line,
        grouping: Some(&options),
        pixel_width: &2.0_f64,
    };

    let processed = GroupingDataProcessor::standard().process(&raw, &ctx).unwrap();
    let grouped = processed.grouped.as_ref().unwrap();

    // 2 px * 999 s / 100 px = 19.98 s, snapped to 15 s
    assert_eq!(grouped.interval, 19_980.0);
    assert_eq!(grouped.info.unit, TimeUnit::Second);
    assert_eq!(grouped.info.count, 15);
    assert_eq!(grouped.len(), 67);
    // average of 0..15
    assert_eq!(grouped.y[0], GroupedValue::Number(7.0));
    let covered: usize = grouped.group_map.iter().map(|s| s.length).sum();
    assert_eq!(covered, 1000);
    assert_eq!(processed.group_pixel_width, Some(2.0));
}

#[test]
fn test_disabled_grouping_is_skipped() {
    let raw = seconds(1000);
    let axis = TimeAxis::new(0.0, 999_000.0, 100.0);
    let mut options = GroupingOptions::for_kind(SeriesKind::Line);
    options.enabled = false;
    let ctx = ProcessContext {
        viewport: &axis,
        kind: SeriesKind::Line,
        grouping: Some(&options),
        pixel_width: &2.0_f64,
    };

    let processed = GroupingDataProcessor::standard().process(&raw, &ctx).unwrap();
    assert!(!processed.is_grouped());
}

#[test]
fn test_smoothed_positions_stay_in_view() {
    let raw = seconds(1000);
    let axis = TimeAxis::new(500.0, 998_500.0, 100.0);
    let mut options = GroupingOptions::for_kind(SeriesKind::Line);
    options.smoothed = true;
    let ctx = ProcessContext {
        viewport: &axis,
        kind: SeriesKind::Line,
        grouping: Some(&options),
        pixel_width: &2.0_f64,
    };

    let processed = GroupingDataProcessor::standard().process(&raw, &ctx).unwrap();
    let x = processed.display_x();
    assert_eq!(x.first(), Some(&500.0));
    assert!(*x.last().unwrap() <= 998_500.0);
}

#[test]
fn test_custom_units() {
    let raw = seconds(1000);
    let axis = TimeAxis::new(0.0, 999_000.0, 100.0);
    let mut options = GroupingOptions::for_kind(SeriesKind::Line);
    options.units = Some(vec![GroupingUnit(TimeUnit::Minute, Some(vec![1]))]);
    let ctx = ProcessContext {
        viewport: &axis,
        kind: SeriesKind::Line,
        grouping: Some(&options),
        pixel_width: &2.0_f64,
    };

    let processed = GroupingDataProcessor::standard().process(&raw, &ctx).unwrap();
    let grouped = processed.grouped.unwrap();
    assert_eq!(grouped.info.unit, TimeUnit::Minute);
    assert_eq!(grouped.info.count, 1);
    assert_eq!(grouped.x[1] - grouped.x[0], 60_000.0);
}

struct NoBoundaries;

impl BoundaryProvider for NoBoundaries {
    fn normalize_interval(&self, _interval: f64, _units: &[GroupingUnit]) -> NormalizedInterval {
        NormalizedInterval::new(TimeUnit::Second, 1)
    }

    fn generate_boundaries(&self, request: &BoundaryRequest<'_>) -> GroupPositions {
        GroupPositions {
            positions: Vec::new(),
            info: GroupingInfo::from(request.interval),
        }
    }
}

#[test]
fn test_failing_provider_leaves_series_ungrouped() {
    let raw = seconds(1000);
    let axis = TimeAxis::new(0.0, 999_000.0, 100.0);
    let options = GroupingOptions::for_kind(SeriesKind::Line);
    let ctx = ProcessContext {
        viewport: &axis,
        kind: SeriesKind::Line,
        grouping: Some(&options),
        pixel_width: &2.0_f64,
    };

    let processor = GroupingDataProcessor::new(CropProcessor::default(), NoBoundaries);
    let processed = processor.process(&raw, &ctx).unwrap();
    assert!(!processed.is_grouped());
    assert_eq!(processed.len(), 1000);

    let err = processor
        .group(&processed, &options, SeriesKind::Line, 2.0, &axis)
        .unwrap_err();
    assert!(matches!(
        err,
        chart_grouping::GroupingError::BoundaryProviderFailure { .. }
    ));
}

#[test]
fn test_timezone_provider() {
    let raw = seconds(10);
    let axis = TimeAxis::new(0.0, 9_000.0, 100.0);
    let mut options = GroupingOptions::for_kind(SeriesKind::Line);
    options.forced = true;
    let ctx = ProcessContext {
        viewport: &axis,
        kind: SeriesKind::Line,
        grouping: Some(&options),
        pixel_width: &2.0_f64,
    };

    let provider = CalendarBoundaryProvider::with_timezone_name("Asia/Tokyo").unwrap();
    let processor = GroupingDataProcessor::new(CropProcessor::default(), provider);
    let processed = processor.process(&raw, &ctx).unwrap();
    assert!(processed.is_grouped());
}
