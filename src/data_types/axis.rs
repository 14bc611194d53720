use std::sync::Arc;

use chrono::Weekday;

use crate::gaps::GapIndex;

/// What grouping needs to know about the visible window.
pub trait Viewport {
    /// Visible `(min, max)` in milliseconds.
    fn extremes(&self) -> (f64, f64);

    fn plot_width(&self) -> f64;

    /// Correction of the group interval on ordinal axes, `None` on linear ones.
    fn ordinal_interval_factor(&self, _min: f64, _max: f64) -> Option<f64> {
        None
    }

    fn week_start(&self) -> Weekday {
        Weekday::Mon
    }
}

/// The time axis shared by all series of one grouping controller.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeAxis {
    pub min: f64,
    pub max: f64,
    /// Plot area width in pixels.
    pub plot_width: f64,
    /// Smallest timestamp of the visible series. Grouping may lower it so
    /// the first bucket is not clipped.
    pub data_min: Option<f64>,
    pub data_max: Option<f64>,
    pub week_start: Weekday,
    /// Compressed periods when the axis is ordinal.
    pub gaps: Option<Arc<GapIndex>>,
}

impl TimeAxis {
    pub fn new(min: f64, max: f64, plot_width: f64) -> Self {
        Self {
            min,
            max,
            plot_width,
            data_min: None,
            data_max: None,
            week_start: Weekday::Mon,
            gaps: None,
        }
    }

    pub fn with_gaps(mut self, gaps: GapIndex) -> Self {
        self.gaps = Some(Arc::new(gaps));
        self
    }

    pub fn with_week_start(mut self, week_start: Weekday) -> Self {
        self.week_start = week_start;
        self
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn is_ordinal(&self) -> bool {
        self.gaps.as_ref().is_some_and(|g| !g.is_empty())
    }

    /// Lowers the recorded data minimum to `x`, dragging `min` along when
    /// the view was anchored to the data start.
    pub fn extend_data_min(&mut self, x: f64) {
        match self.data_min {
            Some(data_min) if x >= data_min => {}
            Some(data_min) => {
                if self.min == data_min {
                    self.min = x;
                }
                self.data_min = Some(x);
            }
            None => self.data_min = Some(x),
        }
    }
}

impl Viewport for TimeAxis {
    fn extremes(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    fn plot_width(&self) -> f64 {
        self.plot_width
    }

    fn ordinal_interval_factor(&self, min: f64, max: f64) -> Option<f64> {
        self.gaps.as_ref()?.interval_factor(min, max)
    }

    fn week_start(&self) -> Weekday {
        self.week_start
    }
}
