//! Series processing stages.
//!
//! [`CropProcessor`] is the plain stage that narrows raw data to the visible
//! window. [`GroupingDataProcessor`] wraps any stage and groups its output
//! without the inner stage knowing about grouping.

use tracing::{debug, trace, warn};

use crate::approximation::ApproximationRegistry;
use crate::boundaries::{BoundaryProvider, BoundaryRequest, CalendarBoundaryProvider};
use crate::data_types::{
    GroupedData, GroupingOptions, ProcessedSeries, RawSeries, SeriesKind, Viewport,
};
use crate::error::GroupingError;
use crate::grouping::{group_data, group_interval, smooth_positions};

/// Source of the shared group pixel width for the series being processed.
pub trait GroupPixelWidth {
    /// `own_len` is the processed length of the current series. Returns 0
    /// when no series of the axis needs grouping.
    fn group_pixel_width(&self, own_len: usize) -> f64;
}

/// A fixed width, handy when a single series is processed on its own.
impl GroupPixelWidth for f64 {
    fn group_pixel_width(&self, _own_len: usize) -> f64 {
        *self
    }
}

pub struct ProcessContext<'a> {
    pub viewport: &'a dyn Viewport,
    pub kind: SeriesKind,
    pub grouping: Option<&'a GroupingOptions>,
    pub pixel_width: &'a dyn GroupPixelWidth,
}

impl ProcessContext<'_> {
    pub fn grouping_enabled(&self) -> bool {
        self.grouping.is_some_and(|g| g.enabled)
    }
}

pub trait DataProcessor {
    /// Returns `None` when there is no data to show.
    fn process(&self, raw: &RawSeries, ctx: &ProcessContext<'_>) -> Option<ProcessedSeries>;
}

/// Crops data to the visible range plus one point on each side.
#[derive(Clone, Debug)]
pub struct CropProcessor {
    /// Series up to this length are kept whole unless grouping forces a crop.
    pub crop_threshold: usize,
}

impl Default for CropProcessor {
    fn default() -> Self {
        Self {
            crop_threshold: 300,
        }
    }
}

impl CropProcessor {
    /// Index range of the points in `[min, max]` widened by one shoulder point.
    pub fn crop_range(x: &[f64], min: f64, max: f64) -> (usize, usize) {
        let start = x.partition_point(|&t| t < min).saturating_sub(1);
        let end = (x.partition_point(|&t| t <= max) + 1).min(x.len());
        (start, end.max(start))
    }
}

impl DataProcessor for CropProcessor {
    fn process(&self, raw: &RawSeries, ctx: &ProcessContext<'_>) -> Option<ProcessedSeries> {
        if raw.is_empty() {
            return None;
        }

        let (min, max) = ctx.viewport.extremes();
        let crop = ctx.grouping_enabled() || raw.len() > self.crop_threshold;
        let (start, end) = if crop {
            Self::crop_range(&raw.x, min, max)
        } else {
            (0, raw.len())
        };

        let x = raw.x[start..end].to_vec();
        let columns = raw
            .columns
            .iter()
            .map(|c| c.values.get(start..end).map(<[_]>::to_vec).unwrap_or_default())
            .collect();

        Some(ProcessedSeries {
            closest_point_range: closest_point_range(&x),
            x,
            columns,
            crop_start: start,
            group_pixel_width: None,
            grouped: None,
        })
    }
}

/// Smallest positive distance between consecutive timestamps.
pub fn closest_point_range(x: &[f64]) -> Option<f64> {
    x.windows(2)
        .map(|w| w[1] - w[0])
        .filter(|d| *d > 0.0)
        .fold(None, |acc: Option<f64>, d| Some(acc.map_or(d, |a| a.min(d))))
}

/// Wraps a processing stage with viewport-driven data grouping.
#[derive(Clone, Debug, Default)]
pub struct GroupingDataProcessor<P = CropProcessor, B = CalendarBoundaryProvider> {
    inner: P,
    boundaries: B,
}

impl GroupingDataProcessor {
    /// Crop stage with calendar boundaries in UTC.
    pub fn standard() -> Self {
        Self::new(CropProcessor::default(), CalendarBoundaryProvider::default())
    }
}

impl<P: DataProcessor, B: BoundaryProvider> GroupingDataProcessor<P, B> {
    pub fn new(inner: P, boundaries: B) -> Self {
        Self { inner, boundaries }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn boundaries(&self) -> &B {
        &self.boundaries
    }

    /// Groups already processed data with a non-zero pixel width.
    pub fn group(
        &self,
        processed: &ProcessedSeries,
        options: &GroupingOptions,
        kind: SeriesKind,
        group_pixel_width: f64,
        viewport: &dyn Viewport,
    ) -> Result<GroupedData, GroupingError> {
        let (Some(&first_x), Some(&last_x)) = (processed.x.first(), processed.x.last()) else {
            return Err(GroupingError::BoundaryProviderFailure {
                reason: "no processed data to group".to_string(),
            });
        };

        let (min, max) = viewport.extremes();
        let factor = viewport.ordinal_interval_factor(min, max);
        let interval = group_interval(group_pixel_width, min, max, viewport.plot_width(), factor)?;

        let units = options.units_or_default();
        let normalized = self.boundaries.normalize_interval(interval, &units);
        // Processed data may reach beyond the visible window.
        let request = BoundaryRequest {
            interval: normalized,
            min: min.min(first_x),
            max: max.max(last_x),
            week_start: viewport.week_start(),
            x: &processed.x,
            closest_point_range: processed.closest_point_range,
        };
        let positions = self.boundaries.generate_boundaries(&request);
        if positions.is_empty() {
            return Err(GroupingError::BoundaryProviderFailure {
                reason: format!(
                    "no boundaries for {} x {} over [{}, {}]",
                    normalized.count, normalized.unit, request.min, request.max
                ),
            });
        }

        let approximation = ApproximationRegistry::resolve(options, kind);
        let columns: Vec<&[Option<f64>]> = processed.columns.iter().map(Vec::as_slice).collect();
        let mut result = group_data(&processed.x, &columns, &positions.positions, &approximation);

        if options.smoothed {
            smooth_positions(&mut result.x, min, max, interval);
        }

        debug!(
            unit = %positions.info.unit,
            count = positions.info.count,
            approximation = %approximation,
            points = processed.len(),
            groups = result.len(),
            "grouped series"
        );

        Ok(GroupedData {
            x: result.x,
            y: result.y,
            group_map: result.group_map,
            info: positions.info,
            interval,
        })
    }
}

impl<P: DataProcessor, B: BoundaryProvider> DataProcessor for GroupingDataProcessor<P, B> {
    fn process(&self, raw: &RawSeries, ctx: &ProcessContext<'_>) -> Option<ProcessedSeries> {
        let mut processed = self.inner.process(raw, ctx)?;

        let Some(options) = ctx.grouping.filter(|g| g.enabled) else {
            return Some(processed);
        };

        let group_pixel_width = ctx.pixel_width.group_pixel_width(processed.len());
        trace!(
            points = processed.len(),
            group_pixel_width,
            "grouping pass"
        );
        if group_pixel_width <= 0.0 || processed.is_empty() {
            return Some(processed);
        }

        processed.group_pixel_width = Some(group_pixel_width);
        match self.group(&processed, options, ctx.kind, group_pixel_width, ctx.viewport) {
            Ok(grouped) => processed.grouped = Some(grouped),
            Err(err) => warn!(error = %err, "series left ungrouped"),
        }

        Some(processed)
    }
}
