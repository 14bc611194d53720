//! Named reductions applied to the values of one bucket.
//!
//! Every reduction follows the same null policy: an empty buffer that saw a
//! null yields [`GroupedValue::Null`], an empty buffer that saw nothing yields
//! `None` (the bucket is dropped), and a non-empty buffer reduces its numbers.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::warn;

use crate::data_types::{Component, GroupedValue, GroupingOptions, SeriesKind};
use crate::error::GroupingError;

/// Numeric values collected for one field of the open bucket.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Buffer {
    values: Vec<f64>,
    has_nulls: bool,
}

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(values: Vec<f64>) -> Self {
        Self {
            values,
            has_nulls: false,
        }
    }

    /// An empty buffer that only saw nulls.
    pub fn nulls() -> Self {
        Self {
            values: Vec::new(),
            has_nulls: true,
        }
    }

    /// Numbers are kept, `None` only flags the buffer, `NaN` is dropped.
    #[inline]
    pub fn push(&mut self, value: Option<f64>) {
        match value {
            Some(v) if !v.is_nan() => self.values.push(v),
            Some(_) => {}
            None => self.has_nulls = true,
        }
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.has_nulls = false;
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn has_nulls(&self) -> bool {
        self.has_nulls
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Result for an empty buffer, `None` when it saw no nulls either.
    fn empty_result(&self) -> Option<GroupedValue> {
        self.has_nulls.then_some(GroupedValue::Null)
    }
}

/// Raw-index window of the bucket being reduced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BucketContext {
    pub start: usize,
    pub length: usize,
}

type ReducerFn = dyn Fn(&[Buffer], BucketContext) -> Option<GroupedValue> + Send + Sync;

/// User supplied reduction.
#[derive(Clone)]
pub struct CustomApproximation(Arc<ReducerFn>);

impl CustomApproximation {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[Buffer], BucketContext) -> Option<GroupedValue> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, buffers: &[Buffer], bucket: BucketContext) -> Option<GroupedValue> {
        (self.0)(buffers, bucket)
    }
}

impl fmt::Debug for CustomApproximation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomApproximation(..)")
    }
}

impl PartialEq for CustomApproximation {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Approximation {
    Sum,
    Average,
    Averages,
    Open,
    High,
    Low,
    Close,
    Ohlc,
    Range,
    Custom(CustomApproximation),
}

impl Approximation {
    pub const GLOBAL_DEFAULT: Approximation = Approximation::Average;

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Average => "average",
            Self::Averages => "averages",
            Self::Open => "open",
            Self::High => "high",
            Self::Low => "low",
            Self::Close => "close",
            Self::Ohlc => "ohlc",
            Self::Range => "range",
            Self::Custom(_) => "custom",
        }
    }

    /// Reduces the buffers of one bucket. Single-valued reductions read the
    /// first buffer; `ohlc` needs four and `range` two.
    pub fn reduce(&self, buffers: &[Buffer], bucket: BucketContext) -> Option<GroupedValue> {
        let first = buffers.first()?;
        match self {
            Self::Sum => sum(first),
            Self::Average => average(first),
            Self::Averages => averages(buffers),
            Self::Open => open(first),
            Self::High => high(first),
            Self::Low => low(first),
            Self::Close => close(first),
            Self::Ohlc => match buffers {
                [o, h, l, c, ..] => ohlc(o, h, l, c),
                _ => None,
            },
            Self::Range => match buffers {
                [l, h, ..] => range(l, h),
                _ => None,
            },
            Self::Custom(f) => f.call(buffers, bucket),
        }
    }
}

impl FromStr for Approximation {
    type Err = GroupingError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Ok(match name {
            "sum" => Self::Sum,
            "average" => Self::Average,
            "averages" => Self::Averages,
            "open" => Self::Open,
            "high" => Self::High,
            "low" => Self::Low,
            "close" => Self::Close,
            "ohlc" => Self::Ohlc,
            "range" => Self::Range,
            _ => {
                return Err(GroupingError::ConfigurationAmbiguous {
                    name: name.to_owned(),
                })
            }
        })
    }
}

impl fmt::Display for Approximation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Picks the reduction a series groups with.
pub struct ApproximationRegistry;

impl ApproximationRegistry {
    pub fn lookup(name: &str) -> Result<Approximation, GroupingError> {
        name.parse()
    }

    /// Custom function first, then the configured name, then the kind's own
    /// default, then `average`.
    pub fn resolve(options: &GroupingOptions, kind: SeriesKind) -> Approximation {
        if let Some(custom) = &options.custom_approximation {
            return Approximation::Custom(custom.clone());
        }

        let configured = options.approximation.as_deref().map(Self::lookup);
        match configured {
            Some(Ok(approximation)) => approximation,
            Some(Err(err)) => {
                let fallback = Self::kind_default(kind);
                warn!(error = %err, ?kind, fallback = %fallback, "unknown approximation");
                fallback
            }
            None => Self::kind_default(kind),
        }
    }

    pub fn kind_default(kind: SeriesKind) -> Approximation {
        kind.default_approximation()
            .and_then(|name| Self::lookup(name).ok())
            .unwrap_or(Approximation::GLOBAL_DEFAULT)
    }
}

pub fn sum(buffer: &Buffer) -> Option<GroupedValue> {
    if buffer.is_empty() {
        return buffer.empty_result();
    }
    Some(GroupedValue::Number(buffer.values.iter().sum()))
}

pub fn average(buffer: &Buffer) -> Option<GroupedValue> {
    match sum(buffer)? {
        GroupedValue::Number(total) => Some(GroupedValue::Number(total / buffer.len() as f64)),
        other => Some(other),
    }
}

/// `average` over every buffer. Dropped only if no component resolves.
pub fn averages(buffers: &[Buffer]) -> Option<GroupedValue> {
    let parts: Vec<Option<GroupedValue>> = buffers.iter().map(average).collect();
    if parts.iter().all(Option::is_none) {
        return None;
    }
    Some(GroupedValue::Vector(parts.into_iter().map(Component::from).collect()))
}

/// First value in arrival order.
pub fn open(buffer: &Buffer) -> Option<GroupedValue> {
    match buffer.values.first() {
        Some(&v) => Some(GroupedValue::Number(v)),
        None => buffer.empty_result(),
    }
}

/// Last value in arrival order.
pub fn close(buffer: &Buffer) -> Option<GroupedValue> {
    match buffer.values.last() {
        Some(&v) => Some(GroupedValue::Number(v)),
        None => buffer.empty_result(),
    }
}

pub fn high(buffer: &Buffer) -> Option<GroupedValue> {
    if buffer.is_empty() {
        return buffer.empty_result();
    }
    let max = buffer.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some(GroupedValue::Number(max))
}

pub fn low(buffer: &Buffer) -> Option<GroupedValue> {
    if buffer.is_empty() {
        return buffer.empty_result();
    }
    let min = buffer.values.iter().copied().fold(f64::INFINITY, f64::min);
    Some(GroupedValue::Number(min))
}

/// `[open, high, low, close]`, emitted as soon as one component is a number.
pub fn ohlc(
    open_buf: &Buffer,
    high_buf: &Buffer,
    low_buf: &Buffer,
    close_buf: &Buffer,
) -> Option<GroupedValue> {
    vector_if_any_number(vec![
        open(open_buf),
        high(high_buf),
        low(low_buf),
        close(close_buf),
    ])
}

/// `[low, high]`, emitted as soon as one component is a number.
pub fn range(low_buf: &Buffer, high_buf: &Buffer) -> Option<GroupedValue> {
    vector_if_any_number(vec![low(low_buf), high(high_buf)])
}

fn vector_if_any_number(parts: Vec<Option<GroupedValue>>) -> Option<GroupedValue> {
    let components: Vec<Component> = parts.into_iter().map(Component::from).collect();
    components
        .iter()
        .any(|c| c.as_number().is_some())
        .then(|| GroupedValue::Vector(components))
}
