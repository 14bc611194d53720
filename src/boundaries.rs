//! Calendar-aligned bucket boundaries.

use chrono::{
    Datelike, Duration, Months, NaiveDate, NaiveDateTime, TimeZone, Timelike, Weekday,
};
use chrono_tz::Tz;
use eyre::{eyre, Result};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::data_types::{GroupingUnit, TimeUnit};

/// A raw interval snapped to an allowed unit and multiplier.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NormalizedInterval {
    pub unit: TimeUnit,
    pub count: u32,
}

impl NormalizedInterval {
    pub fn new(unit: TimeUnit, count: u32) -> Self {
        Self { unit, count }
    }

    /// Nominal span of one bucket in milliseconds.
    pub fn total_range(&self) -> f64 {
        self.unit.range_ms() * self.count as f64
    }
}

/// Describes the grouping used for a pass; consumed by label formatting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupingInfo {
    pub unit: TimeUnit,
    pub count: u32,
    pub total_range: f64,
}

impl From<NormalizedInterval> for GroupingInfo {
    fn from(interval: NormalizedInterval) -> Self {
        Self {
            unit: interval.unit,
            count: interval.count,
            total_range: interval.total_range(),
        }
    }
}

/// Ordered bucket starts plus a trailing sentinel at or past the range end.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupPositions {
    pub positions: Vec<f64>,
    pub info: GroupingInfo,
}

impl GroupPositions {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Everything a provider may use to lay out the buckets of one pass.
#[derive(Clone, Copy, Debug)]
pub struct BoundaryRequest<'a> {
    pub interval: NormalizedInterval,
    pub min: f64,
    pub max: f64,
    pub week_start: Weekday,
    /// Processed timestamps of the series being grouped.
    pub x: &'a [f64],
    pub closest_point_range: Option<f64>,
}

/// Source of bucket start times.
pub trait BoundaryProvider {
    fn normalize_interval(&self, interval: f64, units: &[GroupingUnit]) -> NormalizedInterval;

    fn generate_boundaries(&self, request: &BoundaryRequest<'_>) -> GroupPositions;
}

/// Aligns buckets to calendar units in a fixed time zone.
#[derive(Clone, Debug)]
pub struct CalendarBoundaryProvider {
    timezone: Tz,
}

impl Default for CalendarBoundaryProvider {
    fn default() -> Self {
        Self { timezone: Tz::UTC }
    }
}

impl CalendarBoundaryProvider {
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }

    /// Builds a provider from an IANA zone name such as `Europe/Paris`.
    pub fn with_timezone_name(name: &str) -> Result<Self> {
        let timezone: Tz = name
            .parse()
            .map_err(|e| eyre!("unknown timezone '{}': {}", name, e))?;
        Ok(Self::new(timezone))
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    fn local(&self, ms: f64) -> Option<NaiveDateTime> {
        self.timezone
            .timestamp_millis_opt(ms.floor() as i64)
            .earliest()
            .map(|dt| dt.naive_local())
    }

    /// Local wall-clock time back to epoch ms. Times skipped by a DST jump
    /// resolve to the first valid instant after them.
    fn to_ms(&self, local: NaiveDateTime) -> Option<f64> {
        self.timezone
            .from_local_datetime(&local)
            .earliest()
            .or_else(|| {
                self.timezone
                    .from_local_datetime(&(local + Duration::hours(1)))
                    .earliest()
            })
            .map(|dt| dt.timestamp_millis() as f64)
    }

    /// First bucket start at or before `min`.
    fn aligned_start(
        &self,
        interval: NormalizedInterval,
        min: f64,
        week_start: Weekday,
    ) -> Option<f64> {
        let count = interval.count.max(1);
        match interval.unit {
            TimeUnit::Millisecond | TimeUnit::Second | TimeUnit::Minute => {
                let step = interval.total_range();
                Some((min / step).floor() * step)
            }
            TimeUnit::Hour => {
                let local = self.local(min)?;
                let hour = local.hour() / count * count;
                self.to_ms(local.date().and_hms_opt(hour, 0, 0)?)
            }
            TimeUnit::Day => {
                let local = self.local(min)?;
                self.to_ms(local.date().and_hms_opt(0, 0, 0)?)
            }
            TimeUnit::Week => {
                let date = self.local(min)?.date();
                let back = (7 + date.weekday().num_days_from_monday()
                    - week_start.num_days_from_monday())
                    % 7;
                let start = date - Duration::days(back as i64);
                self.to_ms(start.and_hms_opt(0, 0, 0)?)
            }
            TimeUnit::Month => {
                let date = self.local(min)?.date();
                let month0 = date.month0() / count * count;
                let start = NaiveDate::from_ymd_opt(date.year(), month0 + 1, 1)?;
                self.to_ms(start.and_hms_opt(0, 0, 0)?)
            }
            TimeUnit::Year => {
                let year = self.local(min)?.year();
                let start_year = year - year.rem_euclid(count as i32);
                let start = NaiveDate::from_ymd_opt(start_year, 1, 1)?;
                self.to_ms(start.and_hms_opt(0, 0, 0)?)
            }
        }
    }

    /// Bucket start following `time`.
    fn next_start(&self, interval: NormalizedInterval, time: f64) -> Option<f64> {
        let count = interval.count.max(1);
        match interval.unit {
            TimeUnit::Millisecond | TimeUnit::Second | TimeUnit::Minute | TimeUnit::Hour => {
                Some(time + interval.total_range())
            }
            TimeUnit::Day | TimeUnit::Week => {
                let days = if interval.unit == TimeUnit::Week { 7 * count } else { count };
                let local = self.local(time)?;
                self.to_ms(local + Duration::days(days as i64))
            }
            TimeUnit::Month => {
                let local = self.local(time)?;
                self.to_ms(local.checked_add_months(Months::new(count))?)
            }
            TimeUnit::Year => {
                let local = self.local(time)?;
                self.to_ms(local.checked_add_months(Months::new(12 * count))?)
            }
        }
    }
}

impl BoundaryProvider for CalendarBoundaryProvider {
    fn normalize_interval(&self, interval: f64, units: &[GroupingUnit]) -> NormalizedInterval {
        normalize_interval(interval, units)
    }

    fn generate_boundaries(&self, request: &BoundaryRequest<'_>) -> GroupPositions {
        let info = GroupingInfo::from(request.interval);
        let mut positions = Vec::new();

        if request.min.is_finite() && request.max.is_finite() && request.max >= request.min {
            let start = self.aligned_start(request.interval, request.min, request.week_start);
            if let Some(mut time) = start {
                let mut complete = true;
                while time < request.max {
                    positions.push(time);
                    match self.next_start(request.interval, time) {
                        Some(next) if next > time => time = next,
                        _ => {
                            complete = false;
                            break;
                        }
                    }
                }
                if complete {
                    positions.push(time);
                } else {
                    positions.clear();
                }
            }
        }

        trace!(
            unit = %info.unit,
            count = info.count,
            positions = positions.len(),
            points = request.x.len(),
            "generated group positions"
        );

        GroupPositions { positions, info }
    }
}

/// Snaps `interval` (ms) to the closest allowed unit and multiple.
pub fn normalize_interval(interval: f64, units: &[GroupingUnit]) -> NormalizedInterval {
    let Some(last) = units.last() else {
        return NormalizedInterval::new(TimeUnit::Millisecond, 1);
    };

    let mut chosen = last;
    for (i, unit) in units.iter().enumerate() {
        chosen = unit;
        if let Some(next) = units.get(i + 1) {
            let largest = unit
                .multiples()
                .and_then(|m| m.last())
                .copied()
                .unwrap_or(1) as f64;
            let less_than = (unit.unit().range_ms() * largest + next.unit().range_ms()) / 2.0;
            if interval <= less_than {
                break;
            }
        }
    }

    let unit_range = chosen.unit().range_ms();
    let ratio = interval / unit_range;

    let (multiples, magnitude): (Vec<f64>, f64) = if chosen.unit() == TimeUnit::Year {
        if interval < 5.0 * unit_range {
            (vec![1.0, 2.0, 5.0], 1.0)
        } else {
            match chosen.multiples() {
                Some(m) => (m.iter().map(|&v| v as f64).collect(), 1.0),
                None => (vec![1.0, 2.0, 2.5, 5.0, 10.0], magnitude(ratio).max(1.0)),
            }
        }
    } else {
        let multiples = chosen
            .multiples()
            .map(|m| m.iter().map(|&v| v as f64).collect())
            .unwrap_or_else(|| vec![1.0, 2.0, 5.0, 10.0]);
        (multiples, 1.0)
    };

    let count = nearest_multiple(ratio / magnitude, &multiples) * magnitude;
    NormalizedInterval::new(chosen.unit(), count.round().max(1.0) as u32)
}

fn magnitude(value: f64) -> f64 {
    if value > 0.0 && value.is_finite() {
        10f64.powf(value.log10().floor())
    } else {
        1.0
    }
}

/// First multiple whose midpoint towards the next one is not exceeded.
fn nearest_multiple(normalized: f64, multiples: &[f64]) -> f64 {
    let mut result = multiples.first().copied().unwrap_or(1.0);
    for (i, &m) in multiples.iter().enumerate() {
        result = m;
        let next = multiples.get(i + 1).copied().unwrap_or(m);
        if normalized <= (m + next) / 2.0 {
            break;
        }
    }
    result
}
