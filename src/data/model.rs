use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell of an uploaded table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common Pandas dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Integer(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:.4}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Try to interpret the value as an `f64` (numbers only).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

/// The dtype inferred for a whole column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Bool,
    Text,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnKind::Integer => "int64",
            ColumnKind::Float => "float64",
            ColumnKind::Bool => "bool",
            ColumnKind::Text => "object",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Series – one named column
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub kind: ColumnKind,
    pub values: Vec<CellValue>,
}

impl Series {
    pub fn new(name: impl Into<String>, kind: ColumnKind, values: Vec<CellValue>) -> Self {
        Series {
            name: name.into(),
            kind,
            values,
        }
    }

    /// A float column built from plain numbers.
    pub fn from_f64(name: impl Into<String>, values: Vec<f64>) -> Self {
        Series::new(
            name,
            ColumnKind::Float,
            values.into_iter().map(CellValue::Float).collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ---------------------------------------------------------------------------
// DataTable – the uploaded feature table
// ---------------------------------------------------------------------------

/// Ordered, row-aligned named columns.  All series have the same length.
///
/// The row count is stored separately so a table keeps its rows when every
/// column has been dropped.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataTable {
    columns: Vec<Series>,
    rows: usize,
}

impl DataTable {
    /// Build a table from columns of equal length.
    pub fn new(columns: Vec<Series>) -> anyhow::Result<Self> {
        if let Some(first) = columns.first() {
            for col in &columns {
                if col.len() != first.len() {
                    anyhow::bail!(
                        "column '{}' has {} rows but '{}' has {}",
                        col.name,
                        col.len(),
                        first.name,
                        first.len()
                    );
                }
            }
        }
        let rows = columns.first().map_or(0, Series::len);
        Ok(DataTable { columns, rows })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Series] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Series> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// A copy of the table without `name`.  Missing columns are ignored.
    pub fn without_column(&self, name: &str) -> DataTable {
        DataTable {
            columns: self
                .columns
                .iter()
                .filter(|c| c.name != name)
                .cloned()
                .collect(),
            rows: self.rows,
        }
    }

    /// Replace the column with the same name in place, or append it.
    pub fn set_column(&mut self, series: Series) -> anyhow::Result<()> {
        if self.columns.is_empty() && self.rows == 0 {
            self.rows = series.len();
        } else if series.len() != self.rows {
            anyhow::bail!(
                "column '{}' has {} values but the table has {} rows",
                series.name,
                series.len(),
                self.len()
            );
        }
        match self.columns.iter_mut().find(|c| c.name == series.name) {
            Some(existing) => *existing = series,
            None => self.columns.push(series),
        }
        Ok(())
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> DataTable {
        DataTable {
            columns: self
                .columns
                .iter()
                .map(|c| Series {
                    name: c.name.clone(),
                    kind: c.kind,
                    values: c.values.iter().take(n).cloned().collect(),
                })
                .collect(),
            rows: self.rows.min(n),
        }
    }

    /// Cell at (`row`, `col`) by position.
    pub fn cell(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.columns.get(col).and_then(|c| c.values.get(row))
    }
}

// ---------------------------------------------------------------------------
// ResultTable – input table + prediction column
// ---------------------------------------------------------------------------

/// Name of the ground-truth column excluded from the features.
pub const TARGET_COLUMN: &str = "AQI";

/// Name of the appended prediction column.
pub const PREDICTION_COLUMN: &str = "Predicted_AQI";

/// A [`DataTable`] that carries a complete `Predicted_AQI` column.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    table: DataTable,
}

impl ResultTable {
    /// Attach `predictions` to a copy of `input`.
    pub(crate) fn from_predictions(
        input: &DataTable,
        predictions: Vec<f64>,
    ) -> anyhow::Result<Self> {
        let mut table = input.clone();
        table.set_column(Series::from_f64(PREDICTION_COLUMN, predictions))?;
        Ok(ResultTable { table })
    }

    pub fn table(&self) -> &DataTable {
        &self.table
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Predicted values in row order.
    pub fn predictions(&self) -> Vec<f64> {
        self.table
            .column(PREDICTION_COLUMN)
            .map(|c| c.values.iter().filter_map(CellValue::as_f64).collect())
            .unwrap_or_default()
    }

    /// Ground-truth values, when the input carried an `AQI` column.
    pub fn actuals(&self) -> Option<Vec<Option<f64>>> {
        self.table
            .column(TARGET_COLUMN)
            .map(|c| c.values.iter().map(CellValue::as_f64).collect())
    }
}
