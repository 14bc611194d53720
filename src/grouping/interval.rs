use crate::error::GroupingError;

/// Time span covered by one group of `group_pixel_width` pixels.
///
/// `ordinal_factor` corrects for axes where gaps are compressed and time is
/// no longer proportional to pixels.
pub fn group_interval(
    group_pixel_width: f64,
    min: f64,
    max: f64,
    plot_width: f64,
    ordinal_factor: Option<f64>,
) -> Result<f64, GroupingError> {
    if !(plot_width > 0.0) || !plot_width.is_finite() {
        return Err(GroupingError::InvalidViewport {
            reason: format!("plot width must be positive, got {}", plot_width),
        });
    }
    if !min.is_finite() || !max.is_finite() || max < min {
        return Err(GroupingError::InvalidViewport {
            reason: format!("invalid extremes [{}, {}]", min, max),
        });
    }

    let factor = ordinal_factor
        .filter(|f| f.is_finite() && *f > 0.0)
        .unwrap_or(1.0);

    Ok(group_pixel_width * (max - min) / plot_width * factor)
}
