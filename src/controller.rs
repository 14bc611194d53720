use tracing::{debug, warn};

use crate::data_types::{
    GroupingOptions, GroupingOverride, PointView, ProcessedSeries, RawSeries, Series, TimeAxis,
};
use crate::error::GroupingError;
use crate::grouping::{PixelWidthCandidate, PixelWidthResolver};
use crate::processor::{DataProcessor, GroupPixelWidth, GroupingDataProcessor, ProcessContext};

/// Which series a grouping override applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverrideTarget {
    All,
    Series(usize),
}

/// Shared width lookup for one series of a pass. The current series is
/// judged on its fresh processed length rather than last pass' output.
struct SharedPixelWidth {
    plot_width: f64,
    candidates: Vec<PixelWidthCandidate>,
    own: usize,
}

impl GroupPixelWidth for SharedPixelWidth {
    fn group_pixel_width(&self, own_len: usize) -> f64 {
        let mut candidates = self.candidates.clone();
        if let Some(own) = candidates.get_mut(self.own) {
            own.data_len = own_len;
            own.active_pixel_width = None;
        }
        PixelWidthResolver::resolve(self.plot_width, &candidates)
    }
}

/// Owns a time axis and the series plotted against it, and regroups them
/// whenever the scale or their configuration changes.
pub struct GroupingController<P = GroupingDataProcessor> {
    axis: TimeAxis,
    series: Vec<Series>,
    processor: P,
    dirty: bool,
}

impl GroupingController<GroupingDataProcessor> {
    pub fn new(axis: TimeAxis) -> Self {
        Self::with_processor(axis, GroupingDataProcessor::standard())
    }
}

impl<P: DataProcessor> GroupingController<P> {
    pub fn with_processor(axis: TimeAxis, processor: P) -> Self {
        Self {
            axis,
            series: Vec::new(),
            processor,
            dirty: false,
        }
    }

    pub fn axis(&self) -> &TimeAxis {
        &self.axis
    }

    pub fn processor(&self) -> &P {
        &self.processor
    }

    /// Adds a series and returns its index. Nothing is grouped until the
    /// next [`process`](Self::process).
    pub fn add_series(&mut self, series: Series) -> Result<usize, GroupingError> {
        series.raw.validate()?;
        self.series.push(series);
        self.recompute_data_extremes();
        self.dirty = true;
        Ok(self.series.len() - 1)
    }

    pub fn series(&self, index: usize) -> Option<&Series> {
        self.series.get(index)
    }

    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    pub fn iter_series(&self) -> impl Iterator<Item = &Series> {
        self.series.iter()
    }

    /// Replaces the raw data of a series.
    pub fn set_data(&mut self, index: usize, raw: RawSeries) -> Result<(), GroupingError> {
        raw.validate()?;
        let series = self.series_at_mut(index)?;
        series.raw = raw;
        self.recompute_data_extremes();
        self.dirty = true;
        Ok(())
    }

    pub fn set_visible(&mut self, index: usize, visible: bool) -> Result<(), GroupingError> {
        self.series_at_mut(index)?.visible = visible;
        self.recompute_data_extremes();
        self.dirty = true;
        Ok(())
    }

    /// Moves the visible window. Every series forgets its grouping state so
    /// the next pass decides from scratch.
    pub fn set_scale(&mut self, min: f64, max: f64, plot_width: f64) -> Result<(), GroupingError> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(GroupingError::InvalidViewport {
                reason: format!("invalid extremes [{}, {}]", min, max),
            });
        }
        if !plot_width.is_finite() || plot_width <= 0.0 {
            return Err(GroupingError::InvalidViewport {
                reason: format!("invalid plot width {}", plot_width),
            });
        }

        self.axis.min = min;
        self.axis.max = max;
        self.axis.plot_width = plot_width;
        self.recompute_data_extremes();
        for series in &mut self.series {
            series.state.invalidate();
        }
        self.dirty = true;
        Ok(())
    }

    /// Runs a processing pass over every series in order.
    pub fn process(&mut self) {
        debug!(
            series = self.series.len(),
            min = self.axis.min,
            max = self.axis.max,
            plot_width = self.axis.plot_width,
            "processing pass"
        );
        for index in 0..self.series.len() {
            self.process_series(index);
        }
        self.dirty = false;
    }

    /// True when a change is waiting for the next [`process`](Self::process).
    pub fn needs_redraw(&self) -> bool {
        self.dirty
    }

    /// Applies `config` on top of the targeted series' options. `None`
    /// stops forcing and restores the default units.
    pub fn set_grouping_override(
        &mut self,
        target: OverrideTarget,
        config: Option<GroupingOverride>,
        redraw: bool,
    ) -> Result<(), GroupingError> {
        let config = config.unwrap_or_else(GroupingOverride::reset);
        let range = match target {
            OverrideTarget::All => 0..self.series.len(),
            OverrideTarget::Series(index) => {
                self.series_at_mut(index)?;
                index..index + 1
            }
        };

        for series in &mut self.series[range] {
            let kind = series.kind;
            series
                .grouping
                .get_or_insert_with(|| GroupingOptions::for_kind(kind))
                .apply(&config);
            series.state.invalidate();
        }

        if redraw {
            self.process();
        } else {
            self.dirty = true;
        }
        Ok(())
    }

    /// The displayed point at `index`, grouped or raw.
    pub fn point(&self, series: usize, index: usize) -> Result<PointView, GroupingError> {
        self.series_at(series)?
            .point(index)
            .ok_or(GroupingError::PointOutOfRange { series, index })
    }

    /// Writes `values` to the raw point behind the displayed `index`.
    /// Grouped points are derived data and cannot be edited.
    pub fn update_point(
        &mut self,
        series: usize,
        index: usize,
        values: Vec<Option<f64>>,
    ) -> Result<(), GroupingError> {
        let target = self.series_at_mut(series)?;
        let Some(processed) = target.processed.as_ref() else {
            return Err(GroupingError::PointOutOfRange { series, index });
        };
        if processed.is_grouped() {
            warn!(series, index, "refusing to edit a grouped point");
            return Err(GroupingError::MutationOfAggregate { series, index });
        }
        if index >= processed.len() {
            return Err(GroupingError::PointOutOfRange { series, index });
        }

        let raw_index = processed.crop_start + index;
        for (column, value) in target.raw.columns.iter_mut().zip(values) {
            if let Some(slot) = column.values.get_mut(raw_index) {
                *slot = value;
            }
        }
        self.dirty = true;
        Ok(())
    }

    fn series_at(&self, index: usize) -> Result<&Series, GroupingError> {
        self.series
            .get(index)
            .ok_or(GroupingError::SeriesNotFound { series: index })
    }

    fn series_at_mut(&mut self, index: usize) -> Result<&mut Series, GroupingError> {
        self.series
            .get_mut(index)
            .ok_or(GroupingError::SeriesNotFound { series: index })
    }

    fn recompute_data_extremes(&mut self) {
        let visible = self.series.iter().filter(|s| s.visible);
        let (min, max) = visible.fold((None, None), |(min, max): (Option<f64>, Option<f64>), s| {
            let lo = s.raw.first_x();
            let hi = s.raw.last_x();
            (
                lo.map(|lo| min.map_or(lo, |m| m.min(lo))).or(min),
                hi.map(|hi| max.map_or(hi, |m| m.max(hi))).or(max),
            )
        });
        self.axis.data_min = min;
        self.axis.data_max = max;
    }

    fn candidates(&self) -> Vec<PixelWidthCandidate> {
        self.series
            .iter()
            .map(|s| PixelWidthCandidate {
                group_pixel_width: s.grouping.as_ref().map(|g| g.group_pixel_width),
                forced: s.grouping.as_ref().is_some_and(|g| g.forced),
                has_processed: s.state.has_processed,
                data_len: s.effective_len(),
                active_pixel_width: s.state.group_pixel_width,
            })
            .collect()
    }

    fn process_series(&mut self, index: usize) {
        self.series[index].state.begin_pass();

        let shared = SharedPixelWidth {
            plot_width: self.axis.plot_width,
            candidates: self.candidates(),
            own: index,
        };
        let series = &self.series[index];
        let ctx = ProcessContext {
            viewport: &self.axis,
            kind: series.kind,
            grouping: series.grouping.as_ref(),
            pixel_width: &shared,
        };
        let processed = self.processor.process(&series.raw, &ctx);

        self.publish(index, processed);
    }

    fn publish(&mut self, index: usize, processed: Option<ProcessedSeries>) {
        let series = &mut self.series[index];
        let grouped = processed.as_ref().and_then(|p| p.grouped.as_ref());

        series.state.group_pixel_width = processed.as_ref().and_then(|p| p.group_pixel_width);
        series.state.current_grouping = grouped.map(|g| g.info.clone());
        series.state.closest_point_range = match grouped {
            Some(g) => Some(g.info.total_range),
            None => processed.as_ref().and_then(|p| p.closest_point_range),
        };

        let first_grouped_x = grouped.and_then(|g| g.x.first().copied());
        let visible = series.visible;
        series.processed = processed;

        if let Some(x) = first_grouped_x.filter(|_| visible) {
            self.axis.extend_data_min(x);
        }
    }
}
