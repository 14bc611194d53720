use std::fmt;

use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};

use crate::approximation::CustomApproximation;

/// Series types known to the grouping layer. Each one declares its value
/// fields and grouping defaults.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    #[default]
    Line,
    Spline,
    Area,
    AreaSpline,
    Scatter,
    Column,
    AreaRange,
    AreaSplineRange,
    ColumnRange,
    Candlestick,
    Ohlc,
}

impl SeriesKind {
    /// Approximation declared by the kind itself, if any.
    pub fn default_approximation(&self) -> Option<&'static str> {
        match self {
            Self::Column => Some("sum"),
            Self::AreaRange | Self::AreaSplineRange | Self::ColumnRange => Some("range"),
            Self::Candlestick | Self::Ohlc => Some("ohlc"),
            _ => None,
        }
    }

    pub fn default_group_pixel_width(&self) -> f64 {
        match self {
            Self::Column | Self::ColumnRange | Self::Candlestick => 10.0,
            Self::Ohlc => 5.0,
            _ => 2.0,
        }
    }

    /// Names of the value columns, in the order reductions receive them.
    pub fn value_fields(&self) -> &'static [&'static str] {
        match self {
            Self::AreaRange | Self::AreaSplineRange | Self::ColumnRange => &["low", "high"],
            Self::Candlestick | Self::Ohlc => &["open", "high", "low", "close"],
            _ => &["y"],
        }
    }
}

/// Calendar units a bucket can be aligned to, finest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl TimeUnit {
    pub const MILLISECOND_MS: f64 = 1.0;
    pub const SECOND_MS: f64 = 1000.0;
    pub const MINUTE_MS: f64 = 60.0 * Self::SECOND_MS;
    pub const HOUR_MS: f64 = 60.0 * Self::MINUTE_MS;
    pub const DAY_MS: f64 = 24.0 * Self::HOUR_MS;
    pub const WEEK_MS: f64 = 7.0 * Self::DAY_MS;
    pub const MONTH_MS: f64 = 28.0 * Self::DAY_MS;
    pub const YEAR_MS: f64 = 364.0 * Self::DAY_MS;

    /// Nominal length of one unit. Months and years use their shortest
    /// lengths so the interval snapping never overshoots.
    pub fn range_ms(&self) -> f64 {
        match self {
            Self::Millisecond => Self::MILLISECOND_MS,
            Self::Second => Self::SECOND_MS,
            Self::Minute => Self::MINUTE_MS,
            Self::Hour => Self::HOUR_MS,
            Self::Day => Self::DAY_MS,
            Self::Week => Self::WEEK_MS,
            Self::Month => Self::MONTH_MS,
            Self::Year => Self::YEAR_MS,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Millisecond => "millisecond",
            Self::Second => "second",
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One row of the allowed-unit table. `None` multiples accept any positive
/// integer multiplier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupingUnit(pub TimeUnit, pub Option<Vec<u32>>);

impl GroupingUnit {
    pub fn unit(&self) -> TimeUnit {
        self.0
    }

    pub fn multiples(&self) -> Option<&[u32]> {
        self.1.as_deref()
    }
}

pub fn default_grouping_units() -> Vec<GroupingUnit> {
    vec![
        GroupingUnit(
            TimeUnit::Millisecond,
            Some(vec![1, 2, 5, 10, 20, 25, 50, 100, 200, 500]),
        ),
        GroupingUnit(TimeUnit::Second, Some(vec![1, 2, 5, 10, 15, 30])),
        GroupingUnit(TimeUnit::Minute, Some(vec![1, 2, 5, 10, 15, 30])),
        GroupingUnit(TimeUnit::Hour, Some(vec![1, 2, 3, 4, 6, 8, 12])),
        GroupingUnit(TimeUnit::Day, Some(vec![1])),
        GroupingUnit(TimeUnit::Week, Some(vec![1])),
        GroupingUnit(TimeUnit::Month, Some(vec![1, 3, 6])),
        GroupingUnit(TimeUnit::Year, None),
    ]
}

/// Resolved grouping configuration of one series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingOptions {
    pub enabled: bool,
    /// Group even when the series fits in the plot width.
    pub forced: bool,
    /// Reduction name (`sum`, `average`, `averages`, `open`, `high`, `low`,
    /// `close`, `ohlc`, `range`).
    pub approximation: Option<String>,
    /// Takes precedence over `approximation` when set.
    #[serde(skip)]
    pub custom_approximation: Option<CustomApproximation>,
    pub group_pixel_width: f64,
    /// Centers interior buckets and clamps the edges to the visible range.
    pub smoothed: bool,
    /// Allowed units, `None` for the default table.
    pub units: Option<Vec<GroupingUnit>>,
}

impl Default for GroupingOptions {
    fn default() -> Self {
        Self::for_kind(SeriesKind::default())
    }
}

impl GroupingOptions {
    pub fn for_kind(kind: SeriesKind) -> Self {
        Self {
            enabled: true,
            forced: false,
            approximation: kind.default_approximation().map(str::to_owned),
            custom_approximation: None,
            group_pixel_width: kind.default_group_pixel_width(),
            smoothed: false,
            units: None,
        }
    }

    /// Kind defaults overlaid with a JSON object of [`GroupingOverride`] fields.
    pub fn from_json(kind: SeriesKind, json: &str) -> Result<Self> {
        let overrides: GroupingOverride = serde_json::from_str(json)
            .wrap_err_with(|| format!("invalid grouping options for {:?} series", kind))?;
        let mut options = Self::for_kind(kind);
        options.apply(&overrides);
        Ok(options)
    }

    pub fn with_custom_approximation(mut self, approximation: CustomApproximation) -> Self {
        self.custom_approximation = Some(approximation);
        self
    }

    pub fn apply(&mut self, overrides: &GroupingOverride) {
        if let Some(enabled) = overrides.enabled {
            self.enabled = enabled;
        }
        if let Some(forced) = overrides.forced {
            self.forced = forced;
        }
        if let Some(name) = &overrides.approximation {
            self.approximation = Some(name.clone());
            self.custom_approximation = None;
        }
        if let Some(width) = overrides.group_pixel_width {
            self.group_pixel_width = width;
        }
        if let Some(smoothed) = overrides.smoothed {
            self.smoothed = smoothed;
        }
        if let Some(units) = &overrides.units {
            self.units = units.clone();
        }
    }

    pub fn units_or_default(&self) -> Vec<GroupingUnit> {
        self.units.clone().unwrap_or_else(default_grouping_units)
    }
}

/// Partial options applied on top of a series' current configuration.
///
/// `units: Some(None)` resets the unit table to the default one.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingOverride {
    pub enabled: Option<bool>,
    pub forced: Option<bool>,
    pub approximation: Option<String>,
    pub group_pixel_width: Option<f64>,
    pub smoothed: Option<bool>,
    #[serde(with = "double_option", skip_serializing_if = "Option::is_none")]
    pub units: Option<Option<Vec<GroupingUnit>>>,
}

impl GroupingOverride {
    /// What clearing an override means: stop forcing and restore default units.
    pub fn reset() -> Self {
        Self {
            forced: Some(false),
            units: Some(None),
            ..Default::default()
        }
    }
}

mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T, S>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}
