//! Export options, report model and error types.

use std::path::PathBuf;

use crate::conf::{C_PATH_FILE_IN_DEFAULT, C_PATH_FILE_OUT_DEFAULT, C_SHEET_NAME_DEFAULT};

////////////////////////////////////////////////////////////////////////////////
// #region Options

/// Input options for [`crate::convert::convert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecConvertOptions {
    /// JSON document to read.
    pub path_file_in: PathBuf,
    /// Workbook to create or overwrite.
    pub path_file_out: PathBuf,
    /// Target sheet name (sanitized by the writer).
    pub sheet_name: String,
    /// Write a placeholder text instead of a blank cell for missing fields.
    pub if_keep_missing_values: bool,
}

impl Default for SpecConvertOptions {
    fn default() -> Self {
        Self {
            path_file_in: PathBuf::from(C_PATH_FILE_IN_DEFAULT),
            path_file_out: PathBuf::from(C_PATH_FILE_OUT_DEFAULT),
            sheet_name: C_SHEET_NAME_DEFAULT.to_string(),
            if_keep_missing_values: false,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Report

/// Outcome of one successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecConvertReport {
    /// Workbook that was written.
    pub path_file_out: PathBuf,
    /// Number of records exported (data rows, header excluded).
    pub cnt_records: usize,
    /// Sheets actually created (more than one only past Excel limits).
    pub sheet_names: Vec<String>,
    /// Non-fatal writer warnings.
    pub warnings: Vec<String>,
}

impl SpecConvertReport {
    /// Operator-facing confirmation line.
    pub fn format_confirmation(&self) -> String {
        format!("✅ Đã xuất file {}", self.path_file_out.display())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Export failure; every variant aborts the whole conversion.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// Input file could not be read.
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        /// Input path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Input file is not valid JSON.
    #[error("Invalid JSON in {}: {source}", .path.display())]
    Parse {
        /// Input path.
        path: PathBuf,
        /// Underlying parser error.
        #[source]
        source: serde_json::Error,
    },

    /// A key on the `data.content` path is absent.
    #[error("Missing key: {key}")]
    MissingKey {
        /// Dotted path up to and including the missing key.
        key: String,
    },

    /// A value on the `data.content` path has the wrong JSON type.
    #[error("Unexpected value at {key}: expected {expected}")]
    UnexpectedShape {
        /// Dotted path of the offending value.
        key: String,
        /// Expected JSON type.
        expected: &'static str,
    },

    /// A content element is not an object.
    #[error("Record #{index} is not an object: {source}")]
    InvalidRecord {
        /// Zero-based position in the content sequence.
        index: usize,
        /// Underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },

    /// Workbook could not be written.
    #[error("Failed to write spreadsheet: {0}")]
    Xlsx(String),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
