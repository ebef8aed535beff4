//! Tabular containers for signal input and feature output.
//!
//! `SignalTable` holds per-sample signals on a monotonic time index;
//! `FeatureTable` holds the assembled per-epoch (or single-row) feature set.
//! Columns are stored in insertion order, which downstream assembly relies on.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A dynamically typed table cell.
///
/// `Float(f64::NAN)` and `Null` are both representable: the former is a
/// computed-but-undefined sample, the latter an absent one. Both read as NaN
/// through [`Value::as_f64`] paths that need a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Text(String),
    Null,
}

impl Value {
    /// Interpret the value as an `f64` for numeric aggregation.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Numeric view used by signal math: non-numeric cells become NaN.
    pub fn to_f64_lossy(&self) -> f64 {
        self.as_f64().unwrap_or(f64::NAN)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v:.4}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Null => write!(f, "<null>"),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

/// Errors raised by table construction and assembly.
#[derive(Debug)]
pub enum TableError {
    /// A column's length does not match the table's row count.
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
    /// Two tables being joined column-wise do not share the same row index.
    IndexMismatch { left: usize, right: usize },
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::LengthMismatch {
                column,
                expected,
                actual,
            } => write!(
                f,
                "column '{column}' has {actual} values but the table has {expected} rows"
            ),
            TableError::IndexMismatch { left, right } => write!(
                f,
                "row indices do not agree (left: {left} rows, right: {right} rows)"
            ),
        }
    }
}

impl std::error::Error for TableError {}

/// A time-indexed table of per-sample signals.
///
/// The index carries time offsets in seconds relative to event onset
/// (negative values are pre-onset baseline samples). The index is monotonic
/// within an epoch; this type does not re-sort it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalTable {
    index: Vec<f64>,
    columns: Vec<(String, Vec<Value>)>,
}

impl SignalTable {
    /// Create an empty table over the given time index.
    pub fn new(index: Vec<f64>) -> Self {
        Self {
            index,
            columns: Vec::new(),
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// The time index.
    pub fn index(&self) -> &[f64] {
        &self.index
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Whether a column with this exact name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|(n, _)| n == name)
    }

    /// Look up a column by exact name.
    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
    }

    /// Numeric view of a column; non-numeric cells become NaN.
    pub fn float_column(&self, name: &str) -> Option<Vec<f64>> {
        self.column(name)
            .map(|values| values.iter().map(Value::to_f64_lossy).collect())
    }

    /// Append a column. Its length must match the row count.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        values: Vec<Value>,
    ) -> Result<(), TableError> {
        let name = name.into();
        if values.len() != self.index.len() {
            return Err(TableError::LengthMismatch {
                column: name,
                expected: self.index.len(),
                actual: values.len(),
            });
        }
        self.columns.push((name, values));
        Ok(())
    }

    /// Append a float column.
    pub fn insert_floats(
        &mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<(), TableError> {
        self.insert(name, values.into_iter().map(Value::Float).collect())
    }

    /// Remove a column if present.
    pub fn drop_column(&mut self, name: &str) {
        self.columns.retain(|(n, _)| n != name);
    }

    /// Rows whose index lies strictly between `start` and `end`.
    ///
    /// Both bounds are exclusive; an empty result is a valid table.
    pub fn slice_between(&self, start: f64, end: f64) -> SignalTable {
        self.filter_rows(|i| self.index[i] > start && self.index[i] < end)
    }

    /// Re-index the table from one of its own columns, dropping that column.
    ///
    /// Returns `None` when the column is absent.
    pub fn reindex_from(&self, name: &str) -> Option<SignalTable> {
        let new_index: Vec<f64> = self
            .column(name)?
            .iter()
            .map(Value::to_f64_lossy)
            .collect();
        let columns = self
            .columns
            .iter()
            .filter(|(n, _)| n != name)
            .cloned()
            .collect();
        Some(SignalTable {
            index: new_index,
            columns,
        })
    }

    /// Split rows into groups keyed by the rendered value of `label`, each
    /// group re-indexed on its `time` column (which is dropped from the
    /// group's columns). Groups come back in first-appearance order.
    pub fn group_by(&self, label: &str, time: &str) -> Vec<(String, SignalTable)> {
        let Some(labels) = self.column(label) else {
            return Vec::new();
        };
        let mut order: Vec<String> = Vec::new();
        let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (row, value) in labels.iter().enumerate() {
            let key = value.to_string();
            if !groups.contains_key(&key) {
                order.push(key.clone());
            }
            groups.entry(key).or_default().push(row);
        }

        let time_values: Vec<f64> = self
            .float_column(time)
            .unwrap_or_else(|| self.index.clone());

        order
            .into_iter()
            .map(|key| {
                let rows = &groups[&key];
                let index = rows.iter().map(|&r| time_values[r]).collect();
                let columns = self
                    .columns
                    .iter()
                    .filter(|(n, _)| n != time)
                    .map(|(n, values)| {
                        (n.clone(), rows.iter().map(|&r| values[r].clone()).collect())
                    })
                    .collect();
                (key, SignalTable { index, columns })
            })
            .collect()
    }

    fn filter_rows(&self, keep: impl Fn(usize) -> bool) -> SignalTable {
        let rows: Vec<usize> = (0..self.len()).filter(|&i| keep(i)).collect();
        SignalTable {
            index: rows.iter().map(|&r| self.index[r]).collect(),
            columns: self
                .columns
                .iter()
                .map(|(n, values)| {
                    (n.clone(), rows.iter().map(|&r| values[r].clone()).collect())
                })
                .collect(),
        }
    }
}

/// The assembled feature set: one row per epoch (event-related analysis) or a
/// single row (interval-related analysis).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    index: Vec<String>,
    columns: Vec<(String, Vec<Value>)>,
}

impl FeatureTable {
    /// Create an empty feature table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table with the given row index and no columns yet.
    pub fn with_index(index: Vec<String>) -> Self {
        Self {
            index,
            columns: Vec::new(),
        }
    }

    /// A single-row table, indexed "0", from named values.
    pub fn single_row(values: impl IntoIterator<Item = (String, Value)>) -> Self {
        let mut table = Self::with_index(vec!["0".to_string()]);
        for (name, value) in values {
            table.columns.push((name, vec![value]));
        }
        table
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the table has neither rows nor columns.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty() && self.columns.is_empty()
    }

    /// The row index (epoch labels).
    pub fn index(&self) -> &[String] {
        &self.index
    }

    /// Column names in insertion order, duplicates included.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// The first column with this exact name.
    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
    }

    /// Number of columns, duplicates included.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Append a column. Its length must match the row count.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        values: Vec<Value>,
    ) -> Result<(), TableError> {
        let name = name.into();
        if values.len() != self.index.len() {
            return Err(TableError::LengthMismatch {
                column: name,
                expected: self.index.len(),
                actual: values.len(),
            });
        }
        self.columns.push((name, values));
        Ok(())
    }

    /// Join another table column-wise, preserving this table's row index.
    ///
    /// No row-wise alignment is performed: both tables must already share the
    /// same row index (one row per the same epoch ordering), an invariant the
    /// producing components uphold. An empty `other` is a no-op; joining onto
    /// an empty table adopts `other` wholesale.
    pub fn concat(&mut self, other: FeatureTable) -> Result<(), TableError> {
        if other.is_empty() {
            return Ok(());
        }
        if self.is_empty() {
            *self = other;
            return Ok(());
        }
        if self.index != other.index {
            return Err(TableError::IndexMismatch {
                left: self.index.len(),
                right: other.index.len(),
            });
        }
        self.columns.extend(other.columns);
        Ok(())
    }

    /// Drop later duplicates of any repeated column name, keeping the first
    /// occurrence.
    ///
    /// This is a deliberate policy step: several channel analyzers each echo
    /// the epoch `Label`/`Condition` identifier columns, and only the first
    /// echo survives assembly. Idempotent.
    pub fn dedup_columns(&mut self) {
        let mut seen: Vec<String> = Vec::new();
        self.columns.retain(|(name, _)| {
            if seen.iter().any(|s| s == name) {
                false
            } else {
                seen.push(name.clone());
                true
            }
        });
    }

    /// Serialize as a JSON array of records, one object per row.
    pub fn to_json_records(&self) -> Result<String, serde_json::Error> {
        let records: Vec<serde_json::Map<String, serde_json::Value>> = (0..self.len())
            .map(|row| {
                let mut record = serde_json::Map::new();
                record.insert(
                    "Index".to_string(),
                    serde_json::Value::String(self.index[row].clone()),
                );
                for (name, values) in &self.columns {
                    let value = serde_json::to_value(&values[row])?;
                    record.insert(name.clone(), value);
                }
                Ok(record)
            })
            .collect::<Result<_, serde_json::Error>>()?;
        serde_json::to_string(&records)
    }
}

impl fmt::Display for FeatureTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Index")?;
        for (name, _) in &self.columns {
            write!(f, "\t{name}")?;
        }
        writeln!(f)?;
        for row in 0..self.len() {
            write!(f, "{}", self.index[row])?;
            for (_, values) in &self.columns {
                write!(f, "\t{}", values[row])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
