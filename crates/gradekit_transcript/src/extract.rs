//! Document loading, `data.content` lookup and per-record projection.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::conf::{N_TRANSCRIPT_COLUMNS, TUP_CONTENT_KEY_PATH};
use crate::spec::ConvertError;

/// Read and parse a UTF-8 JSON document.
pub fn load_document(path: &Path) -> Result<Value, ConvertError> {
    let c_text = fs::read_to_string(path).map_err(|source| ConvertError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let document = serde_json::from_str(&c_text).map_err(|source| ConvertError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("Loaded {} ({} bytes)", path.display(), c_text.len());
    Ok(document)
}

/// Look up the record sequence at `data.content`.
pub fn select_content(document: &Value) -> Result<&[Value], ConvertError> {
    let mut value = document;
    for (n_depth, c_key) in TUP_CONTENT_KEY_PATH.iter().enumerate() {
        let c_key_path = TUP_CONTENT_KEY_PATH[..=n_depth].join(".");
        let Some(dict) = value.as_object() else {
            return Err(ConvertError::UnexpectedShape {
                key: if n_depth == 0 {
                    "<root>".to_string()
                } else {
                    TUP_CONTENT_KEY_PATH[..n_depth].join(".")
                },
                expected: "object",
            });
        };
        value = dict
            .get(*c_key)
            .ok_or(ConvertError::MissingKey { key: c_key_path })?;
    }

    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| ConvertError::UnexpectedShape {
            key: TUP_CONTENT_KEY_PATH.join("."),
            expected: "array",
        })
}

/// One academic result entry; every field is optional and kept as raw JSON.
///
/// Unknown keys are ignored. An explicit `null` is the same as an absent key.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptRecord {
    pub semester: Option<Value>,
    pub subject_code: Option<Value>,
    pub subject_name: Option<Value>,
    pub credit: Option<Value>,
    pub point10: Option<Value>,
    pub point_char: Option<Value>,
    pub point4: Option<Value>,
}

impl TranscriptRecord {
    /// Deserialize the `index`-th content element.
    pub fn from_value(index: usize, value: &Value) -> Result<Self, ConvertError> {
        Self::deserialize(value).map_err(|source| ConvertError::InvalidRecord { index, source })
    }

    /// Project onto the output column order, absent fields as `Value::Null`.
    pub fn into_row(self) -> [Value; N_TRANSCRIPT_COLUMNS] {
        [
            self.semester,
            self.subject_code,
            self.subject_name,
            self.credit,
            self.point10,
            self.point_char,
            self.point4,
        ]
        .map(Option::unwrap_or_default)
    }
}
