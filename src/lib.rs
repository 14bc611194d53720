//! chart_grouping: viewport-driven data grouping for time series charts

pub mod approximation;
pub mod boundaries;
pub mod controller;
pub mod data_types;
pub mod error;
pub mod gaps;
pub mod grouping;
pub mod processor;

pub use approximation::{Approximation, ApproximationRegistry, Buffer, CustomApproximation};
pub use boundaries::{BoundaryProvider, CalendarBoundaryProvider, GroupingInfo};
pub use controller::{GroupingController, OverrideTarget};
pub use data_types::{Component, GroupedValue, GroupingOptions, RawSeries, Series, SeriesKind, TimeAxis};
pub use error::GroupingError;
pub use processor::{CropProcessor, DataProcessor, GroupingDataProcessor};
