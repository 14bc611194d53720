use serde::{Deserialize, Serialize};

use crate::boundaries::GroupingInfo;

use super::config::{GroupingOptions, SeriesKind};
use super::data::{GroupSpan, GroupedValue, RawSeries};
use super::state::GroupingState;

/// Aggregated output of one grouping pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupedData {
    pub x: Vec<f64>,
    pub y: Vec<GroupedValue>,
    /// Indices into the processed (cropped) arrays.
    pub group_map: Vec<GroupSpan>,
    pub info: GroupingInfo,
    /// Target interval the buckets were derived from, in ms.
    pub interval: f64,
}

impl GroupedData {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Output of the processing pipeline for one series.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProcessedSeries {
    /// Cropped raw timestamps.
    pub x: Vec<f64>,
    /// Cropped raw value columns.
    pub columns: Vec<Vec<Option<f64>>>,
    /// Raw index of `x[0]`.
    pub crop_start: usize,
    pub closest_point_range: Option<f64>,
    /// Width the series grouped with, set whenever grouping was active.
    pub group_pixel_width: Option<f64>,
    pub grouped: Option<GroupedData>,
}

impl ProcessedSeries {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Timestamps that end up on screen.
    pub fn display_x(&self) -> &[f64] {
        match &self.grouped {
            Some(grouped) => &grouped.x,
            None => &self.x,
        }
    }

    pub fn display_len(&self) -> usize {
        self.display_x().len()
    }

    pub fn is_grouped(&self) -> bool {
        self.grouped.is_some()
    }
}

/// A displayed point, either raw or a group representative.
#[derive(Clone, Debug, PartialEq)]
pub enum PointValue {
    Raw(Vec<Option<f64>>),
    Grouped(GroupedValue),
}

#[derive(Clone, Debug, PartialEq)]
pub struct PointView {
    pub x: f64,
    pub value: PointValue,
    /// Processed indices behind a grouped point.
    pub group: Option<GroupSpan>,
}

impl PointView {
    pub fn is_aggregate(&self) -> bool {
        matches!(self.value, PointValue::Grouped(_))
    }
}

/// A series attached to a grouping controller.
#[derive(Clone, Debug)]
pub struct Series {
    pub name: String,
    pub kind: SeriesKind,
    pub visible: bool,
    /// `None` when grouping is not configured for this series at all.
    pub grouping: Option<GroupingOptions>,
    pub(crate) raw: RawSeries,
    pub(crate) state: GroupingState,
    pub(crate) processed: Option<ProcessedSeries>,
}

impl Series {
    /// A series with the grouping defaults of its kind.
    pub fn new(name: impl Into<String>, kind: SeriesKind, raw: RawSeries) -> Self {
        Self {
            name: name.into(),
            kind,
            visible: true,
            grouping: Some(GroupingOptions::for_kind(kind)),
            raw,
            state: GroupingState::default(),
            processed: None,
        }
    }

    pub fn with_grouping(mut self, grouping: Option<GroupingOptions>) -> Self {
        self.grouping = grouping;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn raw(&self) -> &RawSeries {
        &self.raw
    }

    pub fn state(&self) -> &GroupingState {
        &self.state
    }

    pub fn processed(&self) -> Option<&ProcessedSeries> {
        self.processed.as_ref()
    }

    pub fn grouping_enabled(&self) -> bool {
        self.grouping.as_ref().is_some_and(|g| g.enabled)
    }

    pub fn is_currently_grouped(&self) -> bool {
        self.grouped().is_some()
    }

    pub fn current_grouping(&self) -> Option<&GroupingInfo> {
        self.state.current_grouping.as_ref()
    }

    pub fn group_pixel_width(&self) -> Option<f64> {
        self.state.group_pixel_width
    }

    fn grouped(&self) -> Option<&GroupedData> {
        self.processed.as_ref()?.grouped.as_ref()
    }

    pub fn grouped_x(&self) -> Option<&[f64]> {
        self.grouped().map(|g| g.x.as_slice())
    }

    pub fn grouped_y(&self) -> Option<&[GroupedValue]> {
        self.grouped().map(|g| g.y.as_slice())
    }

    pub fn group_map(&self) -> Option<&[GroupSpan]> {
        self.grouped().map(|g| g.group_map.as_slice())
    }

    /// Timestamps currently on screen; the raw ones before the first pass.
    pub fn display_x(&self) -> &[f64] {
        match &self.processed {
            Some(processed) => processed.display_x(),
            None => &self.raw.x,
        }
    }

    /// Length the pixel width resolver compares against the plot width.
    pub(crate) fn effective_len(&self) -> usize {
        self.processed
            .as_ref()
            .map_or(self.raw.len(), ProcessedSeries::display_len)
    }

    pub fn point(&self, index: usize) -> Option<PointView> {
        let processed = self.processed.as_ref()?;
        match &processed.grouped {
            Some(grouped) => Some(PointView {
                x: *grouped.x.get(index)?,
                value: PointValue::Grouped(grouped.y.get(index)?.clone()),
                group: grouped.group_map.get(index).copied(),
            }),
            None => Some(PointView {
                x: *processed.x.get(index)?,
                value: PointValue::Raw(
                    processed
                        .columns
                        .iter()
                        .map(|c| c.get(index).copied().flatten())
                        .collect(),
                ),
                group: None,
            }),
        }
    }
}
