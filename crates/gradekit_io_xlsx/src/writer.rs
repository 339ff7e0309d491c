//! XLSX writer kernel that turns typed columns or a DataFrame into workbook output.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use polars::prelude::{AnyValue, DataFrame};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};

use crate::conf::{
    EnumFmtKey, N_LEN_EXCEL_SHEET_NAME_MAX, derive_default_xlsx_formats,
    derive_default_xlsx_write_options,
};
use crate::spec::{
    EnumCellValue, SpecAutofitCellsPolicy, SpecCellFormat, SpecSheetColumn, SpecSheetSlice,
    SpecXlsxReport, SpecXlsxSheetWriteOptions, SpecXlsxWriteOptions,
};
use crate::util::{
    convert_cell_value, derive_column_width, estimate_unicode_string_width, estimate_width_len,
    plan_sheet_slices, sanitize_sheet_name, validate_unique_columns,
};

/// Stateful workbook writer.
pub struct XlsxWriter {
    path_file_out: PathBuf,
    workbook: Workbook,
    dict_fmt: BTreeMap<EnumFmtKey, SpecCellFormat>,
    write_options: SpecXlsxWriteOptions,
    set_sheet_names_existing: BTreeSet<String>,
    l_reports: Vec<SpecXlsxReport>,
    if_closed: bool,
}

impl XlsxWriter {
    /// Create writer bound to output path and format/options presets.
    ///
    /// Presets missing from `dict_fmt` fall back to [`derive_default_xlsx_formats`].
    /// The workbook is buffered in memory until [`Self::close`] is called, so
    /// nothing touches `path_file_out` before then.
    pub fn new(
        path_file_out: PathBuf,
        dict_fmt: BTreeMap<EnumFmtKey, SpecCellFormat>,
        write_options: SpecXlsxWriteOptions,
    ) -> Self {
        let mut dict_fmt_full = derive_default_xlsx_formats();
        dict_fmt_full.extend(dict_fmt);

        Self {
            path_file_out,
            workbook: Workbook::new(),
            dict_fmt: dict_fmt_full,
            write_options,
            set_sheet_names_existing: BTreeSet::new(),
            l_reports: Vec::new(),
            if_closed: false,
        }
    }

    /// Create writer with default presets and options.
    pub fn with_defaults(path_file_out: impl Into<PathBuf>) -> Self {
        Self::new(
            path_file_out.into(),
            BTreeMap::new(),
            derive_default_xlsx_write_options(),
        )
    }

    /// Output file path.
    pub fn file_out(&self) -> &Path {
        &self.path_file_out
    }

    /// Return immutable snapshot of per-sheet write reports.
    pub fn report(&self) -> Vec<SpecXlsxReport> {
        self.l_reports.clone()
    }

    /// Flush workbook to disk, overwriting any existing file. Idempotent.
    pub fn close(&mut self) -> Result<(), String> {
        if self.if_closed {
            return Ok(());
        }
        self.workbook
            .save(&self.path_file_out)
            .map_err(derive_xlsx_error_text)?;
        self.if_closed = true;
        log::debug!("Saved workbook: {}", self.path_file_out.display());
        Ok(())
    }

    /// Write one sheet from an in-memory dataframe.
    ///
    /// Column names become the single header row; no index column is written.
    /// Integer dtypes use the integer preset, other numeric dtypes the decimal one.
    pub fn write_sheet_from_dataframe(
        &mut self,
        df_data: &DataFrame,
        sheet_name: &str,
        options: &SpecXlsxSheetWriteOptions,
    ) -> Result<(), String> {
        let l_columns = derive_sheet_columns_from_dataframe(df_data)?;
        self.write_sheet_from_columns(&l_columns, sheet_name, options)
    }

    /// Write one sheet from columns of per-cell values.
    ///
    /// Every cell is written with its own type, so numbers, booleans and text
    /// may share a column. All columns must have the same number of cells.
    pub fn write_sheet_from_columns(
        &mut self,
        columns: &[SpecSheetColumn],
        sheet_name: &str,
        options: &SpecXlsxSheetWriteOptions,
    ) -> Result<(), String> {
        if self.if_closed {
            return Err("Cannot write after close().".to_string());
        }
        self.write_sheet(columns, sheet_name, options)
    }

    fn write_sheet(
        &mut self,
        columns: &[SpecSheetColumn],
        sheet_name: &str,
        options: &SpecXlsxSheetWriteOptions,
    ) -> Result<(), String> {
        let policy_autofit = &options.policy_autofit;
        validate_policy_autofit(policy_autofit)?;

        let if_keep_missing_values = options
            .if_keep_missing_values
            .unwrap_or(self.write_options.keep_missing_values);
        let value_policy = self.write_options.value_policy.clone();

        let l_colnames: Vec<String> = columns.iter().map(|col| col.name.clone()).collect();
        validate_unique_columns(&l_colnames)?;
        let n_height = validate_column_heights(columns)?;
        let n_rows_header = 1;

        let mut report = SpecXlsxReport::default();
        let l_sheet_parts = plan_sheet_slices(
            n_height,
            columns.len(),
            n_rows_header,
            &sanitize_sheet_name(sheet_name, "_"),
            &mut report,
        )?;

        let fmt_header = derive_rust_xlsx_format(self.preset(EnumFmtKey::Header)?);

        for sheet_slice in l_sheet_parts {
            let sheet_name_unique = self.derive_unique_sheet_name(&sheet_slice.sheet_name);

            let l_cols_slice =
                &columns[sheet_slice.col_start_inclusive..sheet_slice.col_end_exclusive];
            let l_fmt_data_by_col = l_cols_slice
                .iter()
                .map(|col| {
                    let fmt_base = self
                        .preset(col.fmt_key)?
                        .merge(&self.write_options.base_format_patch);
                    Ok(derive_rust_xlsx_format(&fmt_base))
                })
                .collect::<Result<Vec<Format>, String>>()?;

            let worksheet = self.workbook.add_worksheet();
            worksheet
                .set_name(&sheet_name_unique)
                .map_err(derive_xlsx_error_text)?;

            write_header(
                worksheet,
                &l_colnames[sheet_slice.col_start_inclusive..sheet_slice.col_end_exclusive],
                &fmt_header,
            )?;
            worksheet
                .set_freeze_panes(cast_row_num(n_rows_header)?, 0)
                .map_err(derive_xlsx_error_text)?;

            let mut l_width_by_col_body = vec![0usize; l_cols_slice.len()];
            for n_row in sheet_slice.row_start_inclusive..sheet_slice.row_end_exclusive {
                let n_row_local = n_row - sheet_slice.row_start_inclusive;
                for (n_idx_col, col) in l_cols_slice.iter().enumerate() {
                    let value =
                        convert_cell_value(&col.cells[n_row], if_keep_missing_values, &value_policy);

                    l_width_by_col_body[n_idx_col] = usize::max(
                        l_width_by_col_body[n_idx_col],
                        estimate_width_len(
                            &value,
                            col.fmt_key == EnumFmtKey::Integer,
                            if_keep_missing_values,
                            &value_policy,
                        ),
                    );

                    write_cell_with_format(
                        worksheet,
                        n_rows_header + n_row_local,
                        n_idx_col,
                        &value,
                        &l_fmt_data_by_col[n_idx_col],
                    )?;
                }
            }

            for (n_idx_col, col) in l_cols_slice.iter().enumerate() {
                let n_width_final = derive_column_width(
                    estimate_unicode_string_width(&col.name),
                    l_width_by_col_body[n_idx_col],
                    policy_autofit,
                );
                worksheet
                    .set_column_width(cast_col_num(n_idx_col)?, n_width_final as f64)
                    .map_err(derive_xlsx_error_text)?;
            }

            log::debug!(
                "Wrote sheet {sheet_name_unique:?}: rows {}..{}, cols {}..{}",
                sheet_slice.row_start_inclusive,
                sheet_slice.row_end_exclusive,
                sheet_slice.col_start_inclusive,
                sheet_slice.col_end_exclusive
            );
            report.sheets.push(SpecSheetSlice {
                sheet_name: sheet_name_unique,
                ..sheet_slice
            });
        }

        self.l_reports.push(report);
        Ok(())
    }

    fn preset(&self, key: EnumFmtKey) -> Result<&SpecCellFormat, String> {
        self.dict_fmt
            .get(&key)
            .ok_or_else(|| format!("Missing format preset: {key:?}"))
    }

    fn derive_unique_sheet_name(&mut self, name: &str) -> String {
        if !self.set_sheet_names_existing.contains(name) {
            self.set_sheet_names_existing.insert(name.to_string());
            return name.to_string();
        }

        let base_name: String = name
            .chars()
            .take(usize::max(1, N_LEN_EXCEL_SHEET_NAME_MAX - 3))
            .collect();

        let mut n_idx = 2usize;
        loop {
            let candidate: String = format!("{base_name}__{n_idx}")
                .chars()
                .take(N_LEN_EXCEL_SHEET_NAME_MAX)
                .collect();
            if !self.set_sheet_names_existing.contains(&candidate) {
                self.set_sheet_names_existing.insert(candidate.clone());
                return candidate;
            }
            n_idx += 1;
        }
    }
}

fn validate_policy_autofit(policy_autofit: &SpecAutofitCellsPolicy) -> Result<(), String> {
    if policy_autofit.width_cell_min == 0 {
        return Err("policy_autofit.width_cell_min must be >= 1.".to_string());
    }
    if policy_autofit.width_cell_max < policy_autofit.width_cell_min {
        return Err(
            "policy_autofit.width_cell_max must be >= policy_autofit.width_cell_min.".to_string(),
        );
    }
    Ok(())
}

fn validate_column_heights(columns: &[SpecSheetColumn]) -> Result<usize, String> {
    let n_height = columns.first().map_or(0, |col| col.cells.len());
    if let Some(col) = columns.iter().find(|col| col.cells.len() != n_height) {
        return Err(format!(
            "Column {:?} has {} cells; expected {n_height}.",
            col.name,
            col.cells.len()
        ));
    }
    Ok(n_height)
}

fn derive_sheet_columns_from_dataframe(df: &DataFrame) -> Result<Vec<SpecSheetColumn>, String> {
    df.get_columns()
        .iter()
        .map(|col| {
            let fmt_key = if col.dtype().is_integer() {
                EnumFmtKey::Integer
            } else if col.dtype().is_numeric() {
                EnumFmtKey::Decimal
            } else {
                EnumFmtKey::Text
            };
            let cells = (0..col.len())
                .map(|n_idx| {
                    col.get(n_idx)
                        .map(derive_cell_value_from_any_value)
                        .map_err(|err| format!("Failed to access cell value: {err}"))
                })
                .collect::<Result<Vec<_>, String>>()?;
            Ok(SpecSheetColumn {
                name: col.name().to_string(),
                fmt_key,
                cells,
            })
        })
        .collect()
}

fn derive_cell_value_from_any_value(value: AnyValue<'_>) -> EnumCellValue {
    match value {
        AnyValue::Null => EnumCellValue::None,
        AnyValue::String(val) => EnumCellValue::String(val.to_string()),
        AnyValue::StringOwned(val) => EnumCellValue::String(val.to_string()),
        AnyValue::Boolean(val) => EnumCellValue::Boolean(val),
        AnyValue::UInt8(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt16(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt32(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt64(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int8(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int16(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int32(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int64(val) => EnumCellValue::Number(val as f64),
        AnyValue::Float32(val) => EnumCellValue::Number(val as f64),
        AnyValue::Float64(val) => EnumCellValue::Number(val),
        _ => EnumCellValue::String(value.to_string()),
    }
}

fn write_header(
    worksheet: &mut Worksheet,
    header_row: &[String],
    fmt_header: &Format,
) -> Result<(), String> {
    for (col_idx, cell_value) in header_row.iter().enumerate() {
        if cell_value.is_empty() {
            worksheet
                .write_blank(0, cast_col_num(col_idx)?, fmt_header)
                .map_err(derive_xlsx_error_text)?;
        } else {
            worksheet
                .write_string_with_format(0, cast_col_num(col_idx)?, cell_value, fmt_header)
                .map_err(derive_xlsx_error_text)?;
        }
    }
    Ok(())
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    row_idx: usize,
    col_idx: usize,
    value: &EnumCellValue,
    format: &Format,
) -> Result<(), String> {
    let n_row = cast_row_num(row_idx)?;
    let n_col = cast_col_num(col_idx)?;
    match value {
        EnumCellValue::None => worksheet.write_blank(n_row, n_col, format),
        EnumCellValue::String(val) => worksheet.write_string_with_format(n_row, n_col, val, format),
        EnumCellValue::Number(val) => worksheet.write_number_with_format(n_row, n_col, *val, format),
        EnumCellValue::Boolean(val) => {
            worksheet.write_boolean_with_format(n_row, n_col, *val, format)
        }
    }
    .map_err(derive_xlsx_error_text)?;
    Ok(())
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = &spec.font_name {
        format = format.set_font_name(val.clone());
    }
    if let Some(val) = spec.font_size {
        format = format.set_font_size(val as f64);
    }
    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }

    if spec.if_align_center.unwrap_or(false) {
        format = format.set_align(FormatAlign::Center);
    }
    if spec.if_valign_center.unwrap_or(false) {
        format = format.set_align(FormatAlign::VerticalCenter);
    }

    if let Some(val) = &spec.num_format {
        format = format.set_num_format(val.clone());
    }
    if let Some(val) = spec.if_border {
        format = format.set_border(if val {
            FormatBorder::Thin
        } else {
            FormatBorder::None
        });
    }

    format
}

fn cast_row_num(value: usize) -> Result<u32, String> {
    u32::try_from(value).map_err(|_| format!("row index overflow: {value}"))
}

fn cast_col_num(value: usize) -> Result<u16, String> {
    u16::try_from(value).map_err(|_| format!("column index overflow: {value}"))
}

fn derive_xlsx_error_text(err: XlsxError) -> String {
    format!("xlsx write error: {err}")
}
