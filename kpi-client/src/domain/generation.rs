use time::PrimitiveDateTime;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum SeriesError {
    #[error("column '{column}' has {actual} values but the index has {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
}

/// Cell values of one generation column.
///
/// A column is `Numeric` only when every non-missing cell parsed as a number.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(v) => v.len(),
            Self::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_numeric(&self) -> Option<&[Option<f64>]> {
        match self {
            Self::Numeric(v) => Some(v),
            Self::Text(_) => None,
        }
    }

    fn reorder(&self, order: &[usize]) -> Self {
        match self {
            Self::Numeric(v) => Self::Numeric(order.iter().map(|&i| v[i]).collect()),
            Self::Text(v) => Self::Text(order.iter().map(|&i| v[i].clone()).collect()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesColumn {
    pub name: String,
    pub values: ColumnValues,
}

/// Generation time series indexed by timezone-free timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSeries {
    index_name: String,
    timestamps: Vec<PrimitiveDateTime>,
    columns: Vec<SeriesColumn>,
}

impl GenerationSeries {
    /// Builds a series ordered ascending by timestamp.
    ///
    /// Repeated timestamps are kept, in file order.
    pub fn new(
        index_name: impl Into<String>,
        timestamps: Vec<PrimitiveDateTime>,
        columns: Vec<SeriesColumn>,
    ) -> Result<Self, SeriesError> {
        if let Some(bad) = columns.iter().find(|c| c.values.len() != timestamps.len()) {
            return Err(SeriesError::LengthMismatch {
                column: bad.name.clone(),
                expected: timestamps.len(),
                actual: bad.values.len(),
            });
        }

        let mut order: Vec<usize> = (0..timestamps.len()).collect();
        order.sort_by_key(|&i| timestamps[i]);

        let in_order = order.iter().enumerate().all(|(pos, &i)| pos == i);
        let (timestamps, columns) = if in_order {
            (timestamps, columns)
        } else {
            let sorted_ts = order.iter().map(|&i| timestamps[i]).collect();
            let sorted_cols = columns
                .iter()
                .map(|c| SeriesColumn {
                    name: c.name.clone(),
                    values: c.values.reorder(&order),
                })
                .collect();
            (sorted_ts, sorted_cols)
        };

        Ok(Self {
            index_name: index_name.into(),
            timestamps,
            columns,
        })
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn timestamps(&self) -> &[PrimitiveDateTime] {
        &self.timestamps
    }

    pub fn columns(&self) -> &[SeriesColumn] {
        &self.columns
    }

    /// First column with the given header, if any.
    pub fn column(&self, name: &str) -> Option<&SeriesColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}
