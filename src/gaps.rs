//! Exclusion gaps for ordinal time axes.
//!
//! On an ordinal axis closed periods (nights, weekends, holidays) take no
//! horizontal space, so a pixel covers less real time than the raw extremes
//! suggest. [`GapIndex::interval_factor`] gives the correction applied to
//! the group interval.

use chrono::{Datelike, NaiveTime, TimeZone, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A rule producing exclusion segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExclusionRule {
    /// `[start, end)` in UTC milliseconds.
    Fixed { start: i64, end: i64 },
    /// Every listed weekday from `start_time` to `end_time` local time.
    /// An `end_time` not after `start_time` ends on the next day.
    Weekly {
        days: Vec<Weekday>,
        start_time: NaiveTime,
        end_time: NaiveTime,
        timezone: String,
    },
}

/// Half-open excluded period in real time (ms UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapSegment {
    pub start: i64,
    pub end: i64,
}

impl GapSegment {
    pub fn duration(&self) -> i64 {
        self.end - self.start
    }
}

/// Sorted, non-overlapping gap segments with their cumulative durations.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GapIndex {
    segments: Vec<GapSegment>,
    /// Total gap duration before segment `i`.
    cumulative: Vec<i64>,
}

impl GapIndex {
    /// Sorts and merges overlapping or touching segments.
    pub fn new(mut segments: Vec<GapSegment>) -> Self {
        segments.retain(|s| s.end > s.start);
        segments.sort_by_key(|s| s.start);

        let mut merged: Vec<GapSegment> = Vec::with_capacity(segments.len());
        for segment in segments {
            match merged.last_mut() {
                Some(last) if segment.start <= last.end => last.end = last.end.max(segment.end),
                _ => merged.push(segment),
            }
        }

        let mut cumulative = Vec::with_capacity(merged.len());
        let mut total = 0;
        for segment in &merged {
            cumulative.push(total);
            total += segment.duration();
        }

        Self {
            segments: merged,
            cumulative,
        }
    }

    pub fn segments(&self) -> &[GapSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Index of the last segment starting at or before `real_ms`.
    fn segment_before(&self, real_ms: i64) -> Option<usize> {
        self.segments
            .partition_point(|s| s.start <= real_ms)
            .checked_sub(1)
    }

    /// Real time to logical time. Instants inside a gap map to the gap start.
    pub fn to_logical(&self, real_ms: i64) -> i64 {
        match self.segment_before(real_ms) {
            None => real_ms,
            Some(i) => {
                let segment = self.segments[i];
                if real_ms < segment.end {
                    segment.start - self.cumulative[i]
                } else {
                    real_ms - self.cumulative[i] - segment.duration()
                }
            }
        }
    }

    pub fn is_inside(&self, real_ms: i64) -> bool {
        self.segment_before(real_ms)
            .is_some_and(|i| real_ms < self.segments[i].end)
    }

    /// Ratio of logical to real span over `[min, max]`; `None` for an empty span.
    pub fn interval_factor(&self, min: f64, max: f64) -> Option<f64> {
        let real = max - min;
        if !(real > 0.0) || !real.is_finite() {
            return None;
        }
        let logical = (self.to_logical(max as i64) - self.to_logical(min as i64)) as f64;
        (logical > 0.0).then(|| logical / real)
    }
}

/// Expands exclusion rules into a [`GapIndex`] over a time window.
#[derive(Debug, Default, Clone)]
pub struct GapIndexBuilder {
    rules: Vec<ExclusionRule>,
}

impl GapIndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, rule: ExclusionRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn add_rule(&mut self, rule: ExclusionRule) {
        self.rules.push(rule);
    }

    pub fn build(&self, range_start: i64, range_end: i64) -> GapIndex {
        let mut segments = Vec::new();

        for rule in &self.rules {
            match rule {
                ExclusionRule::Fixed { start, end } => {
                    if *start < range_end && *end > range_start {
                        segments.push(GapSegment {
                            start: *start,
                            end: *end,
                        });
                    }
                }
                ExclusionRule::Weekly {
                    days,
                    start_time,
                    end_time,
                    timezone,
                } => match timezone.parse::<Tz>() {
                    Ok(tz) => weekly_segments(
                        &mut segments,
                        range_start,
                        range_end,
                        days,
                        *start_time,
                        *end_time,
                        tz,
                    ),
                    Err(e) => warn!(%timezone, error = %e, "skipping weekly exclusion rule"),
                },
            }
        }

        GapIndex::new(segments)
    }
}

fn weekly_segments(
    out: &mut Vec<GapSegment>,
    range_start: i64,
    range_end: i64,
    days: &[Weekday],
    start_time: NaiveTime,
    end_time: NaiveTime,
    tz: Tz,
) {
    let (Some(first), Some(last)) = (
        tz.timestamp_millis_opt(range_start).earliest(),
        tz.timestamp_millis_opt(range_end).earliest(),
    ) else {
        return;
    };

    // Start a day early so a gap crossing midnight into the window is kept.
    let mut date = first.date_naive().pred_opt().unwrap_or(first.date_naive());
    let last_date = last.date_naive();

    while date <= last_date {
        if days.contains(&date.weekday()) {
            let end_date = if end_time <= start_time {
                date.succ_opt()
            } else {
                Some(date)
            };
            let start = tz.from_local_datetime(&date.and_time(start_time)).earliest();
            let end = end_date.and_then(|d| tz.from_local_datetime(&d.and_time(end_time)).earliest());

            if let (Some(start), Some(end)) = (start, end) {
                let (start, end) = (start.timestamp_millis(), end.timestamp_millis());
                if start < range_end && end > range_start {
                    out.push(GapSegment { start, end });
                }
            }
        }
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }
}
