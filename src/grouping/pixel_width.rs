/// What the resolver needs to know about one series sharing the axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PixelWidthCandidate {
    /// Configured group pixel width, `None` when grouping is not configured.
    pub group_pixel_width: Option<f64>,
    pub forced: bool,
    /// Set once the series ran a processing pass since the last rescale.
    pub has_processed: bool,
    /// Length of the processed (possibly already grouped) data, or the raw
    /// length before the first pass.
    pub data_len: usize,
    /// Pixel width the series grouped with in its last pass.
    pub active_pixel_width: Option<f64>,
}

/// Chooses one group pixel width for all series of an axis so overlaid
/// series are grouped at the same granularity.
pub struct PixelWidthResolver;

impl PixelWidthResolver {
    /// Returns the largest configured width if any processed series needs
    /// grouping, `0.0` otherwise.
    pub fn resolve(plot_width: f64, candidates: &[PixelWidthCandidate]) -> f64 {
        let group_pixel_width = candidates
            .iter()
            .filter_map(|c| c.group_pixel_width)
            .fold(0.0, f64::max);

        let max_points = plot_width / group_pixel_width;
        let do_grouping = candidates
            .iter()
            .filter(|c| c.group_pixel_width.is_some() && c.has_processed)
            .any(|c| {
                c.active_pixel_width.is_some_and(|w| w > 0.0)
                    || c.data_len as f64 > max_points
                    || (c.data_len > 0 && c.forced)
            });

        if do_grouping {
            group_pixel_width
        } else {
            0.0
        }
    }
}
