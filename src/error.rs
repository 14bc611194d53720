use thiserror::Error;

/// Errors surfaced by the grouping layer.
///
/// Arithmetic edge cases inside a bucket (empty buffers, nulls, non-numeric
/// values) never show up here; they are resolved by the approximation policy.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GroupingError {
    /// Unknown reduction name. Callers going through the registry get the
    /// fallback reduction instead of this error.
    #[error("unknown approximation '{name}'")]
    ConfigurationAmbiguous { name: String },

    /// The point is a synthetic group representative and cannot be edited.
    #[error("point {index} of series {series} is a grouped point and cannot be updated")]
    MutationOfAggregate { series: usize, index: usize },

    #[error("boundary provider failed: {reason}")]
    BoundaryProviderFailure { reason: String },

    #[error("invalid viewport: {reason}")]
    InvalidViewport { reason: String },

    #[error("series {series} does not exist")]
    SeriesNotFound { series: usize },

    #[error("point {index} is out of range for series {series}")]
    PointOutOfRange { series: usize, index: usize },

    #[error("malformed series: {reason}")]
    MalformedSeries { reason: String },
}
