use crate::boundaries::GroupingInfo;

/// Per-series grouping bookkeeping kept between passes.
///
/// Reset on every axis rescale so the pixel width resolver never compares
/// against a series that has not been processed at the new scale yet.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupingState {
    pub current_grouping: Option<GroupingInfo>,
    pub has_processed: bool,
    /// Pixel width the series grouped with in its last pass.
    pub group_pixel_width: Option<f64>,
    /// Bucket span when grouped, smallest raw spacing otherwise.
    pub closest_point_range: Option<f64>,
}

impl GroupingState {
    pub fn invalidate(&mut self) {
        *self = Self::default();
    }

    /// Start of a processing pass.
    pub fn begin_pass(&mut self) {
        self.group_pixel_width = None;
        self.has_processed = true;
    }
}
