//! `gradekit_io_xlsx` v1:
//! Typed columns / DataFrame → XLSX writer kernel.
//!
//! - `conf`   : constants and default presets
//! - `spec`   : specs/models/options
//! - `util`   : pure helper functions
//! - `writer` : workbook writer
pub mod conf;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{
    EnumFmtKey, N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX,
    TUP_EXCEL_ILLEGAL, derive_default_xlsx_formats, derive_default_xlsx_write_options,
};
pub use spec::{
    EnumCellValue, SpecAutofitCellsPolicy, SpecCellFormat, SpecSheetColumn, SpecSheetSlice,
    SpecXlsxReport, SpecXlsxSheetWriteOptions, SpecXlsxValuePolicy, SpecXlsxWriteOptions,
};
pub use util::{plan_sheet_slices, sanitize_sheet_name};
pub use writer::XlsxWriter;
