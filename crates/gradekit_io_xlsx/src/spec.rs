//! Shared XLSX specification models.

use crate::conf::EnumFmtKey;

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Cell format specification; `None` fields inherit on [`SpecCellFormat::merge`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font family name.
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,

    /// Center horizontally.
    pub if_align_center: Option<bool>,
    /// Center vertically.
    pub if_valign_center: Option<bool>,
    /// Thin border on all sides.
    pub if_border: Option<bool>,

    /// Number format code.
    pub num_format: Option<String>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_name: other.font_name.clone().or_else(|| self.font_name.clone()),
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            if_align_center: other.if_align_center.or(self.if_align_center),
            if_valign_center: other.if_valign_center.or(self.if_valign_center),
            if_border: other.if_border.or(self.if_border),
            num_format: other.num_format.clone().or_else(|| self.num_format.clone()),
        }
    }
}

/// Normalized cell value during the write pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// Missing/blank value.
    None,
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
    /// Boolean value.
    Boolean(bool),
}

/// One output column: header text, body format preset and cells in row order.
///
/// Cells carry their own type, so a column may hold numbers next to text.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecSheetColumn {
    /// Header cell text.
    pub name: String,
    /// Preset applied to every body cell.
    pub fmt_key: EnumFmtKey,
    /// Body cells, one per data row.
    pub cells: Vec<EnumCellValue>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WriteOptions

/// Value conversion policy for missing cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecXlsxValuePolicy {
    /// Replacement text for missing value when keep-missing is enabled.
    pub missing_value_str: String,
}

impl Default for SpecXlsxValuePolicy {
    fn default() -> Self {
        Self {
            missing_value_str: "NA".to_string(),
        }
    }
}

/// Column width policy; widths come from the header and every body cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecAutofitCellsPolicy {
    /// Minimum final width.
    pub width_cell_min: usize,
    /// Maximum final width.
    pub width_cell_max: usize,
    /// Width padding added after inference.
    pub width_cell_padding: usize,
}

impl Default for SpecAutofitCellsPolicy {
    fn default() -> Self {
        Self {
            width_cell_min: 8,
            width_cell_max: 60,
            width_cell_padding: 2,
        }
    }
}

/// Writer-wide options controlling value conversion and formatting defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecXlsxWriteOptions {
    /// Value conversion policy.
    pub value_policy: SpecXlsxValuePolicy,
    /// Keep missing values as text instead of blank.
    pub keep_missing_values: bool,
    /// Base patch merged into all per-column body formats.
    pub base_format_patch: SpecCellFormat,
}

impl Default for SpecXlsxWriteOptions {
    fn default() -> Self {
        Self {
            value_policy: SpecXlsxValuePolicy::default(),
            keep_missing_values: false,
            base_format_patch: SpecCellFormat {
                if_border: Some(false),
                ..Default::default()
            },
        }
    }
}

/// Per-sheet call options. The header row is always frozen.
#[derive(Default, Debug, Clone)]
pub struct SpecXlsxSheetWriteOptions {
    /// Override writer-level keep-missing behavior.
    pub if_keep_missing_values: Option<bool>,
    /// Column autofit policy.
    pub policy_autofit: SpecAutofitCellsPolicy,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// Concrete sheet part emitted to workbook (after Excel-limit slicing).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetSlice {
    /// Actual unique sheet name in workbook.
    pub sheet_name: String,
    /// Inclusive source row start.
    pub row_start_inclusive: usize,
    /// Exclusive source row end.
    pub row_end_exclusive: usize,
    /// Inclusive source column start.
    pub col_start_inclusive: usize,
    /// Exclusive source column end.
    pub col_end_exclusive: usize,
}

impl SpecSheetSlice {
    /// Number of data rows (header excluded) in this slice.
    pub fn height(&self) -> usize {
        self.row_end_exclusive - self.row_start_inclusive
    }

    /// Number of columns in this slice.
    pub fn width(&self) -> usize {
        self.col_end_exclusive - self.col_start_inclusive
    }
}

/// Per-write call report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecXlsxReport {
    /// Sheet slices produced by the write call.
    pub sheets: Vec<SpecSheetSlice>,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecXlsxReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_prefers_right_side_values() {
        let base = SpecCellFormat {
            font_name: Some("Times New Roman".to_string()),
            font_size: Some(12),
            bold: Some(false),
            ..Default::default()
        };
        let merged = base.with_(SpecCellFormat {
            bold: Some(true),
            num_format: Some("0".to_string()),
            ..Default::default()
        });

        assert_eq!(merged.font_name.as_deref(), Some("Times New Roman"));
        assert_eq!(merged.font_size, Some(12));
        assert_eq!(merged.bold, Some(true));
        assert_eq!(merged.num_format.as_deref(), Some("0"));
        assert_eq!(merged.if_align_center, None);
    }

    #[test]
    fn test_sheet_slice_dimensions() {
        let slice = SpecSheetSlice {
            sheet_name: "Sheet1".to_string(),
            row_start_inclusive: 10,
            row_end_exclusive: 25,
            col_start_inclusive: 0,
            col_end_exclusive: 7,
        };
        assert_eq!(slice.height(), 15);
        assert_eq!(slice.width(), 7);
    }
}
