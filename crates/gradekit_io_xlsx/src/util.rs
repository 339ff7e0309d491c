//! Stateless helper utilities used by the XLSX writer kernel.

use std::collections::{BTreeMap, BTreeSet};

use crate::conf::{
    N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, TUP_EXCEL_ILLEGAL,
};
use crate::spec::{
    EnumCellValue, SpecAutofitCellsPolicy, SpecSheetSlice, SpecXlsxReport, SpecXlsxValuePolicy,
};

////////////////////////////////////////////////////////////////////////////////
// #region CellValueConversion

/// Apply the missing-value policy; present values keep their own type.
///
/// Non-finite numbers count as missing.
pub fn convert_cell_value(
    value: &EnumCellValue,
    if_keep_missing_values: bool,
    value_policy: &SpecXlsxValuePolicy,
) -> EnumCellValue {
    match value {
        EnumCellValue::None => derive_missing_cell_value(if_keep_missing_values, value_policy),
        EnumCellValue::Number(n) if !n.is_finite() => {
            derive_missing_cell_value(if_keep_missing_values, value_policy)
        }
        other => other.clone(),
    }
}

fn derive_missing_cell_value(
    if_keep_missing_values: bool,
    value_policy: &SpecXlsxValuePolicy,
) -> EnumCellValue {
    if if_keep_missing_values {
        EnumCellValue::String(value_policy.missing_value_str.clone())
    } else {
        EnumCellValue::None
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DataFrameLikeUtils

/// Validate that `columns` has no duplicated names.
pub fn validate_unique_columns(columns: &[String]) -> Result<(), String> {
    if columns.len() == columns.iter().collect::<BTreeSet<_>>().len() {
        return Ok(());
    }

    let mut dict_pos: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (n_idx, c_name) in columns.iter().enumerate() {
        dict_pos.entry(c_name).or_default().push(n_idx);
    }

    let c_msg = dict_pos
        .iter()
        .filter(|(_, l_pos)| l_pos.len() > 1)
        .map(|(c_name, l_pos)| format!("{c_name:?} x{} at indices {:?}", l_pos.len(), l_pos))
        .collect::<Vec<_>>()
        .join("; ");

    Err(format!("Duplicate column names detected: {c_msg}"))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.trim().to_string();
    if c_name.is_empty() {
        c_name = "Sheet".to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

/// Split logical dataframe range into Excel-compliant sheet slices.
pub fn plan_sheet_slices(
    height_df: usize,
    width_df: usize,
    height_header: usize,
    sheet_name: &str,
    report: &mut SpecXlsxReport,
) -> Result<Vec<SpecSheetSlice>, String> {
    plan_sheet_slices_with_limits(
        height_df,
        width_df,
        height_header,
        sheet_name,
        (N_NROWS_EXCEL_MAX, N_NCOLS_EXCEL_MAX),
        report,
    )
}

fn plan_sheet_slices_with_limits(
    height_df: usize,
    width_df: usize,
    height_header: usize,
    sheet_name: &str,
    (n_rows_max, n_cols_max): (usize, usize),
    report: &mut SpecXlsxReport,
) -> Result<Vec<SpecSheetSlice>, String> {
    if height_header == 0 {
        return Err("height_header must be >= 1.".to_string());
    }

    let n_rows_data_max = n_rows_max.saturating_sub(height_header);
    if n_rows_data_max == 0 {
        return Err(format!(
            "Header too tall: height_header={height_header} exceeds Excel limit."
        ));
    }

    let l_col_slices = derive_ranges(width_df, n_cols_max);
    let mut l_row_slices = derive_ranges(height_df, n_rows_data_max);
    if l_row_slices.is_empty() {
        l_row_slices.push((0, 0));
    }

    let n_parts_total = l_col_slices.len() * l_row_slices.len();

    let mut l_sheet_parts = Vec::with_capacity(n_parts_total);
    let mut n_idx_part = 1;
    for (col_start, col_end) in &l_col_slices {
        for (row_start, row_end) in &l_row_slices {
            let c_part_sheet_name = if n_parts_total == 1 {
                sheet_name.to_string()
            } else {
                create_sheet_identifier(sheet_name, n_idx_part)
            };

            l_sheet_parts.push(SpecSheetSlice {
                sheet_name: c_part_sheet_name,
                row_start_inclusive: *row_start,
                row_end_exclusive: *row_end,
                col_start_inclusive: *col_start,
                col_end_exclusive: *col_end,
            });
            n_idx_part += 1;
        }
    }

    if n_parts_total > 1 {
        report.warn(format!(
            "Excel limit overflow: split into {} sheets (columns-first, then rows).",
            l_sheet_parts.len()
        ));
    }

    Ok(l_sheet_parts)
}

fn derive_ranges(n_total: usize, n_step: usize) -> Vec<(usize, usize)> {
    let mut l_ranges = Vec::new();
    let mut n_start = 0;
    while n_start < n_total {
        let n_end = usize::min(n_total, n_start + n_step);
        l_ranges.push((n_start, n_end));
        n_start = n_end;
    }
    l_ranges
}

/// Create suffixed sheet name (`base_1`, `base_2`, ...), respecting length cap.
pub fn create_sheet_identifier(base_name: &str, part_idx_1based: usize) -> String {
    let c_sheet_name_suffix = format!("_{part_idx_1based}");
    let n_len_base_name_max = N_LEN_EXCEL_SHEET_NAME_MAX.saturating_sub(c_sheet_name_suffix.len());

    let c_sheet_name_base: String = base_name
        .chars()
        .take(usize::max(1, n_len_base_name_max))
        .collect();

    format!("{c_sheet_name_base}{c_sheet_name_suffix}")
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WidthEstimation

/// Estimate displayed width units for one normalized cell value.
///
/// Used by autofit inference logic.
pub fn estimate_width_len(
    value: &EnumCellValue,
    if_is_integer_col: bool,
    if_keep_missing_values: bool,
    value_policy: &SpecXlsxValuePolicy,
) -> usize {
    match value {
        EnumCellValue::None => {
            if if_keep_missing_values {
                estimate_unicode_string_width(&value_policy.missing_value_str)
            } else {
                0
            }
        }
        EnumCellValue::String(s) => estimate_unicode_string_width(s),
        EnumCellValue::Boolean(b) => if *b { 4 } else { 5 },
        EnumCellValue::Number(n) => {
            if if_is_integer_col {
                (*n as i64).to_string().len()
            } else {
                format!("{n:.2}").len()
            }
        }
    }
}

/// Final column width: the wider of header and body plus padding, clamped to the policy.
pub fn derive_column_width(
    n_width_header: usize,
    n_width_body: usize,
    policy_autofit: &SpecAutofitCellsPolicy,
) -> usize {
    let n_min = usize::max(1, policy_autofit.width_cell_min);
    let n_max = usize::min(255, usize::max(n_min, policy_autofit.width_cell_max));
    let n_width_recorded = usize::max(n_width_header, n_width_body);
    usize::min(
        n_max,
        usize::max(n_min, n_width_recorded + policy_autofit.width_cell_padding),
    )
}

/// Approximate display width; non-ASCII glyphs (Vietnamese diacritics, CJK) render wider.
pub fn estimate_unicode_string_width(s: &str) -> usize {
    let n_ascii = s.chars().filter(|chr| chr.is_ascii()).count();
    let n_non_ascii = s.chars().count().saturating_sub(n_ascii);
    n_ascii + (n_non_ascii as f64 * 1.6).round() as usize
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_sheet_name_replaces_illegal_chars_and_truncates() {
        assert_eq!(sanitize_sheet_name("HK1/2023:[A]", "_"), "HK1_2023__A_");
        assert_eq!(sanitize_sheet_name("   ", "_"), "Sheet");
        let c_long = "x".repeat(40);
        assert_eq!(sanitize_sheet_name(&c_long, "_").chars().count(), 31);
    }

    #[test]
    fn test_validate_unique_columns_reports_duplicates() {
        let ok = vec!["Học kỳ".to_string(), "Mã môn".to_string()];
        assert!(validate_unique_columns(&ok).is_ok());

        let dup = vec!["A".to_string(), "B".to_string(), "A".to_string()];
        let err = validate_unique_columns(&dup).unwrap_err();
        assert!(err.contains("\"A\" x2 at indices [0, 2]"), "{err}");
    }

    #[test]
    fn test_plan_sheet_slices_single_sheet_for_empty_body() {
        let mut report = SpecXlsxReport::default();
        let l_slices = plan_sheet_slices(0, 7, 1, "Sheet1", &mut report).unwrap();

        assert_eq!(l_slices.len(), 1);
        assert_eq!(l_slices[0].sheet_name, "Sheet1");
        assert_eq!(l_slices[0].height(), 0);
        assert_eq!(l_slices[0].width(), 7);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_plan_sheet_slices_splits_rows_over_limit() {
        let mut report = SpecXlsxReport::default();
        let l_slices =
            plan_sheet_slices_with_limits(7, 3, 1, "Sheet1", (4, 2), &mut report).unwrap();

        let l_ranges: Vec<_> = l_slices
            .iter()
            .map(|s| {
                (
                    s.sheet_name.as_str(),
                    s.row_start_inclusive,
                    s.row_end_exclusive,
                    s.col_start_inclusive,
                    s.col_end_exclusive,
                )
            })
            .collect();
        assert_eq!(
            l_ranges,
            vec![
                ("Sheet1_1", 0, 3, 0, 2),
                ("Sheet1_2", 3, 6, 0, 2),
                ("Sheet1_3", 6, 7, 0, 2),
                ("Sheet1_4", 0, 3, 2, 3),
                ("Sheet1_5", 3, 6, 2, 3),
                ("Sheet1_6", 6, 7, 2, 3),
            ]
        );
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_plan_sheet_slices_rejects_zero_header() {
        let mut report = SpecXlsxReport::default();
        assert!(plan_sheet_slices(3, 3, 0, "Sheet1", &mut report).is_err());
    }

    #[test]
    fn test_create_sheet_identifier_respects_length_cap() {
        let c_name = create_sheet_identifier(&"k".repeat(31), 12);
        assert_eq!(c_name.chars().count(), 31);
        assert!(c_name.ends_with("_12"));
    }

    #[test]
    fn test_convert_cell_value_only_touches_missing_values() {
        let policy = SpecXlsxValuePolicy::default();

        assert_eq!(
            convert_cell_value(&EnumCellValue::None, false, &policy),
            EnumCellValue::None
        );
        assert_eq!(
            convert_cell_value(&EnumCellValue::None, true, &policy),
            EnumCellValue::String("NA".to_string())
        );
        assert_eq!(
            convert_cell_value(&EnumCellValue::Number(f64::NAN), false, &policy),
            EnumCellValue::None
        );
        assert_eq!(
            convert_cell_value(&EnumCellValue::Number(3.0), false, &policy),
            EnumCellValue::Number(3.0)
        );
        assert_eq!(
            convert_cell_value(&EnumCellValue::Boolean(true), true, &policy),
            EnumCellValue::Boolean(true)
        );
        assert_eq!(
            convert_cell_value(&EnumCellValue::String("ba".to_string()), false, &policy),
            EnumCellValue::String("ba".to_string())
        );
    }

    #[test]
    fn test_derive_column_width_uses_wider_of_header_and_body() {
        let policy = SpecAutofitCellsPolicy::default();

        // Short header and body fall back to the minimum.
        assert_eq!(derive_column_width(2, 3, &policy), 8);
        // Body wider than header.
        assert_eq!(derive_column_width(7, 20, &policy), 22);
        // Header wider than body.
        assert_eq!(derive_column_width(15, 4, &policy), 17);
        // Long text is capped.
        assert_eq!(derive_column_width(5, 200, &policy), 60);
    }

    #[test]
    fn test_estimate_unicode_string_width_widens_diacritics() {
        assert_eq!(estimate_unicode_string_width("CS101"), 5);
        // "Học kỳ": 4 ASCII + 2 non-ASCII.
        assert_eq!(estimate_unicode_string_width("Học kỳ"), 4 + 3);
    }
}
