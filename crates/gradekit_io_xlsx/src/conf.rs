//! XLSX constants and default preset factories.

use std::collections::BTreeMap;

use crate::spec::{SpecCellFormat, SpecXlsxWriteOptions};

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// Canonical format preset keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EnumFmtKey {
    /// Generic text cell format.
    Text,
    /// Integer number format.
    Integer,
    /// Decimal number format.
    Decimal,
    /// Header cell format.
    Header,
}

/// Build default format presets used by [`crate::writer::XlsxWriter`].
///
/// Decimal cells use the General format so grades show as recorded: `8.125`
/// keeps three digits and an integral `3` in a decimal column shows as `3`.
pub fn derive_default_xlsx_formats() -> BTreeMap<EnumFmtKey, SpecCellFormat> {
    let cfg_base_fmt_spec = SpecCellFormat {
        font_name: Some("Times New Roman".to_string()),
        font_size: Some(12),
        if_valign_center: Some(true),
        ..Default::default()
    };

    let mut dict_fmt = BTreeMap::new();
    dict_fmt.insert(EnumFmtKey::Text, cfg_base_fmt_spec.clone());
    dict_fmt.insert(
        EnumFmtKey::Header,
        cfg_base_fmt_spec.with_(SpecCellFormat {
            bold: Some(true),
            if_border: Some(true),
            if_align_center: Some(true),
            ..Default::default()
        }),
    );
    dict_fmt.insert(
        EnumFmtKey::Integer,
        cfg_base_fmt_spec.with_(SpecCellFormat {
            num_format: Some("0".to_string()),
            ..Default::default()
        }),
    );
    dict_fmt.insert(
        EnumFmtKey::Decimal,
        cfg_base_fmt_spec.with_(SpecCellFormat {
            num_format: Some("General".to_string()),
            ..Default::default()
        }),
    );

    dict_fmt
}

/// Build default write options.
pub fn derive_default_xlsx_write_options() -> SpecXlsxWriteOptions {
    SpecXlsxWriteOptions::default()
}
