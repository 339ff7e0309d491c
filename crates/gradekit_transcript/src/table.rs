//! Transcript table and its typed sheet columns.

use gradekit_io_xlsx::{EnumCellValue, EnumFmtKey, SpecSheetColumn};
use serde_json::Value;

use crate::conf::{N_TRANSCRIPT_COLUMNS, derive_column_labels};
use crate::extract::TranscriptRecord;
use crate::spec::ConvertError;

/// Storage type chosen for one output column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumColumnKind {
    /// No non-null value.
    Empty,
    /// Every value is an `i64`-representable integer.
    ///
    /// Cells are stored as Excel numbers (`f64`), so magnitudes beyond 2^53
    /// lose their low digits.
    Integer,
    /// Every value is a number, at least one not integral.
    Decimal,
    /// Every value is a boolean.
    Boolean,
    /// Every value is a string.
    Text,
    /// Anything else. Each cell keeps its own type; arrays and objects are
    /// written as compact JSON text.
    Mixed,
}

impl EnumColumnKind {
    fn of_value(value: &Value) -> Self {
        match value {
            Value::Null => Self::Empty,
            Value::Bool(_) => Self::Boolean,
            Value::Number(n) if n.is_i64() => Self::Integer,
            Value::Number(_) => Self::Decimal,
            Value::String(_) => Self::Text,
            Value::Array(_) | Value::Object(_) => Self::Mixed,
        }
    }

    fn combine(self, other: Self) -> Self {
        match (self, other) {
            (Self::Empty, kind) | (kind, Self::Empty) => kind,
            (a, b) if a == b => a,
            (Self::Integer, Self::Decimal) | (Self::Decimal, Self::Integer) => Self::Decimal,
            _ => Self::Mixed,
        }
    }

    /// Infer the narrowest kind holding every value without coercion.
    pub fn infer<'a>(values: impl IntoIterator<Item = &'a Value>) -> Self {
        values
            .into_iter()
            .map(Self::of_value)
            .fold(Self::Empty, Self::combine)
    }

    /// Body format preset for a column of this kind.
    pub fn fmt_key(self) -> EnumFmtKey {
        match self {
            Self::Integer => EnumFmtKey::Integer,
            Self::Decimal => EnumFmtKey::Decimal,
            Self::Empty | Self::Boolean | Self::Text | Self::Mixed => EnumFmtKey::Text,
        }
    }
}

/// Ordered output rows, one per record, in content order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranscriptTable {
    rows: Vec<[Value; N_TRANSCRIPT_COLUMNS]>,
}

impl TranscriptTable {
    /// Project every content element; fails on the first non-object element.
    pub fn from_content(content: &[Value]) -> Result<Self, ConvertError> {
        let rows = content
            .iter()
            .enumerate()
            .map(|(n_idx, value)| {
                TranscriptRecord::from_value(n_idx, value).map(TranscriptRecord::into_row)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rows })
    }

    /// Output rows.
    pub fn rows(&self) -> &[[Value; N_TRANSCRIPT_COLUMNS]] {
        &self.rows
    }

    /// Number of data rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Build one sheet column per label, in label order.
    pub fn to_sheet_columns(&self) -> Vec<SpecSheetColumn> {
        derive_column_labels()
            .into_iter()
            .enumerate()
            .map(|(n_idx_col, c_label)| {
                let kind = EnumColumnKind::infer(self.rows.iter().map(|row| &row[n_idx_col]));
                log::trace!("Column {c_label:?} inferred as {kind:?}");
                SpecSheetColumn {
                    name: c_label.to_string(),
                    fmt_key: kind.fmt_key(),
                    cells: self
                        .rows
                        .iter()
                        .map(|row| derive_cell_value(&row[n_idx_col]))
                        .collect(),
                }
            })
            .collect()
    }
}

fn derive_cell_value(value: &Value) -> EnumCellValue {
    match value {
        Value::Null => EnumCellValue::None,
        Value::Bool(b) => EnumCellValue::Boolean(*b),
        Value::Number(n) => n.as_f64().map_or(EnumCellValue::None, EnumCellValue::Number),
        Value::String(s) => EnumCellValue::String(s.clone()),
        other => EnumCellValue::String(other.to_string()),
    }
}
