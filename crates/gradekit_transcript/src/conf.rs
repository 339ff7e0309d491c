//! Transcript export constants.

/// Input document read when no path is given.
pub const C_PATH_FILE_IN_DEFAULT: &str = "response.json";
/// Workbook written when no path is given.
pub const C_PATH_FILE_OUT_DEFAULT: &str = "ket_qua_hoc_tap.xlsx";
/// Sheet receiving the transcript table.
pub const C_SHEET_NAME_DEFAULT: &str = "Sheet1";

/// Object keys leading from the document root to the record sequence.
pub const TUP_CONTENT_KEY_PATH: [&str; 2] = ["data", "content"];

/// Number of output columns.
pub const N_TRANSCRIPT_COLUMNS: usize = 7;

/// `(record field, column label)` pairs in output column order.
pub const TUP_TRANSCRIPT_COLUMNS: [(&str, &str); N_TRANSCRIPT_COLUMNS] = [
    ("semester", "Học kỳ"),
    ("subjectCode", "Mã môn"),
    ("subjectName", "Tên môn"),
    ("credit", "Số tín chỉ"),
    ("point10", "Điểm hệ 10"),
    ("pointChar", "Điểm chữ"),
    ("point4", "Điểm hệ 4"),
];

/// Column labels in output order.
pub fn derive_column_labels() -> [&'static str; N_TRANSCRIPT_COLUMNS] {
    TUP_TRANSCRIPT_COLUMNS.map(|(_, c_label)| c_label)
}
