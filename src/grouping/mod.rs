pub mod group_data;
pub mod interval;
pub mod pixel_width;
pub mod smoothing;

pub use group_data::{group_data, group_series};
pub use interval::group_interval;
pub use pixel_width::{PixelWidthCandidate, PixelWidthResolver};
pub use smoothing::smooth_positions;
