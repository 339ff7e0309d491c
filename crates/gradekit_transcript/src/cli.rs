//! Command-line surface; every flag defaults to the fixed export paths.

use std::path::PathBuf;

use clap::Parser;

use crate::conf::{C_PATH_FILE_IN_DEFAULT, C_PATH_FILE_OUT_DEFAULT, C_SHEET_NAME_DEFAULT};
use crate::spec::SpecConvertOptions;

/// Export academic transcript records from a JSON response to an XLSX sheet
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "gradekit", version)]
pub struct CliArgs {
    /// JSON document holding records at `data.content`
    #[arg(short, long, default_value = C_PATH_FILE_IN_DEFAULT)]
    pub input: PathBuf,

    /// Workbook to create or overwrite
    #[arg(short, long, default_value = C_PATH_FILE_OUT_DEFAULT)]
    pub output: PathBuf,

    /// Sheet name
    #[arg(long, default_value = C_SHEET_NAME_DEFAULT)]
    pub sheet_name: String,

    /// Write `NA` for missing fields instead of leaving cells blank
    #[arg(long)]
    pub keep_missing: bool,

    /// Increase log verbosity on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl CliArgs {
    /// Resolve into export options.
    pub fn to_convert_options(&self) -> SpecConvertOptions {
        SpecConvertOptions {
            path_file_in: self.input.clone(),
            path_file_out: self.output.clone(),
            sheet_name: self.sheet_name.clone(),
            if_keep_missing_values: self.keep_missing,
        }
    }
}
