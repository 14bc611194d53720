use serde::{Deserialize, Serialize};

use crate::error::GroupingError;

/// One named column of values parallel to the series timestamps.
///
/// `None` is an explicit null. `Some(NaN)` stands for a value that is not a
/// number at all and is dropped silently by the grouping buffers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Raw, time-sorted series data as fed by the owning chart component.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSeries {
    /// Timestamps in milliseconds, non-decreasing.
    pub x: Vec<f64>,
    pub columns: Vec<Column>,
}

impl RawSeries {
    /// Single `y` column.
    pub fn new(x: Vec<f64>, y: Vec<Option<f64>>) -> Self {
        Self {
            x,
            columns: vec![Column::new("y", y)],
        }
    }

    /// Convenience constructor for dense data without nulls.
    pub fn from_values(x: Vec<f64>, y: Vec<f64>) -> Self {
        Self::new(x, y.into_iter().map(Some).collect())
    }

    pub fn with_columns(x: Vec<f64>, columns: Vec<Column>) -> Self {
        Self { x, columns }
    }

    pub fn ohlc(
        x: Vec<f64>,
        open: Vec<Option<f64>>,
        high: Vec<Option<f64>>,
        low: Vec<Option<f64>>,
        close: Vec<Option<f64>>,
    ) -> Self {
        Self::with_columns(
            x,
            vec![
                Column::new("open", open),
                Column::new("high", high),
                Column::new("low", low),
                Column::new("close", close),
            ],
        )
    }

    pub fn range(x: Vec<f64>, low: Vec<Option<f64>>, high: Vec<Option<f64>>) -> Self {
        Self::with_columns(
            x,
            vec![Column::new("low", low), Column::new("high", high)],
        )
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn first_x(&self) -> Option<f64> {
        self.x.first().copied()
    }

    pub fn last_x(&self) -> Option<f64> {
        self.x.last().copied()
    }

    /// Checks the parallel-array invariants: equal lengths and non-decreasing `x`.
    pub fn validate(&self) -> Result<(), GroupingError> {
        if let Some(column) = self.columns.iter().find(|c| c.values.len() != self.x.len()) {
            return Err(GroupingError::MalformedSeries {
                reason: format!(
                    "column '{}' has {} values for {} timestamps",
                    column.name,
                    column.values.len(),
                    self.x.len()
                ),
            });
        }
        if let Some(i) = self.x.windows(2).position(|w| w[1] < w[0]) {
            return Err(GroupingError::MalformedSeries {
                reason: format!("x decreases at index {}", i + 1),
            });
        }
        Ok(())
    }
}

/// Reduced value of one bucket.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GroupedValue {
    /// The bucket only saw nulls.
    Null,
    Number(f64),
    /// Multi-valued reductions (`ohlc`, `range`, `averages`).
    Vector(Vec<Component>),
}

/// One entry of a multi-valued reduction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Component {
    Number(f64),
    /// The component's buffer only saw nulls.
    Null,
    /// The component's buffer saw no value at all.
    Missing,
}

impl Component {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<Option<GroupedValue>> for Component {
    fn from(value: Option<GroupedValue>) -> Self {
        match value {
            Some(GroupedValue::Number(v)) => Self::Number(v),
            Some(GroupedValue::Null) => Self::Null,
            Some(GroupedValue::Vector(_)) | None => Self::Missing,
        }
    }
}

impl GroupedValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// A vector of plain numbers.
    pub fn numbers(values: &[f64]) -> Self {
        Self::Vector(values.iter().copied().map(Component::Number).collect())
    }
}

/// Membership of one output bucket: the first raw index of the bucket and the
/// number of numeric values it buffered. With no nulls or non-numeric values
/// the bucket covers exactly the raw indices `start..start + length`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSpan {
    pub start: usize,
    pub length: usize,
}

impl GroupSpan {
    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

/// Output of one aggregation pass. The three vectors are always the same length.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupedResult {
    pub x: Vec<f64>,
    pub y: Vec<GroupedValue>,
    pub group_map: Vec<GroupSpan>,
}

impl GroupedResult {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            x: Vec::with_capacity(capacity),
            y: Vec::with_capacity(capacity),
            group_map: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, x: f64, y: GroupedValue, span: GroupSpan) {
        self.x.push(x);
        self.y.push(y);
        self.group_map.push(span);
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}
