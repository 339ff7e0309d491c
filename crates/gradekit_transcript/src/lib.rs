//! `gradekit_transcript` v1:
//! Academic transcript export (JSON records → XLSX sheet).
//!
//! - `conf`    : fixed paths, key path and column table
//! - `spec`    : options/report/errors
//! - `extract` : document loading and record projection
//! - `table`   : typed sheet columns
//! - `convert` : end-to-end export
//! - `cli`     : command-line arguments
pub mod cli;
pub mod conf;
pub mod convert;
pub mod extract;
pub mod spec;
pub mod table;

pub use cli::CliArgs;
pub use convert::convert;
pub use extract::{TranscriptRecord, load_document, select_content};
pub use spec::{ConvertError, SpecConvertOptions, SpecConvertReport};
pub use table::{EnumColumnKind, TranscriptTable};
