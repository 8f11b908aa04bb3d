use crate::domain::error::{HelperError, HelperResult};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Current saved session format
pub const SAVE_FILE_VERSION: u32 = 4;

const VERSION_KEY: &str = "saveFileVersion";
const OWNER_KEY: &str = "playbookBaseName";
const OPTIONS_KEY: &str = "options";

/// A named set of answers saved against one playbook
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionRecord {
    /// File format version
    #[serde(rename = "saveFileVersion")]
    pub format_version: u32,
    /// Base name of the playbook the answers belong to
    #[serde(rename = "playbookBaseName")]
    pub owner: String,
    /// Saved variable values
    pub options: BTreeMap<String, String>,
}

impl SessionRecord {
    pub fn new(owner: &str, options: BTreeMap<String, String>) -> Self {
        Self {
            format_version: SAVE_FILE_VERSION,
            owner: owner.to_string(),
            options,
        }
    }

    /// Four-space indented JSON with a single trailing newline.
    pub fn to_json_pretty(&self) -> HelperResult<String> {
        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        self.serialize(&mut serializer)
            .map_err(|e| HelperError::Output(format!("Failed to serialize session: {}", e)))?;
        buffer.push(b'\n');

        String::from_utf8(buffer).map_err(|e| HelperError::Output(e.to_string()))
    }

    /// Parse a saved session, checking version then owner before the options.
    pub fn parse(path: &Path, content: &str, expected_owner: &str) -> HelperResult<Self> {
        let value: Value = serde_json::from_str(content).map_err(|e| HelperError::SessionFormat {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let object = value.as_object().ok_or_else(|| HelperError::SessionFormat {
            path: path.to_path_buf(),
            message: "expected a JSON object".to_string(),
        })?;

        match object.get(VERSION_KEY) {
            // 4.0 is accepted as 4
            Some(version) if version.as_f64() == Some(f64::from(SAVE_FILE_VERSION)) => {}
            found => {
                return Err(HelperError::SessionVersion {
                    found: found.map_or_else(|| "missing".to_string(), Value::to_string),
                    expected: SAVE_FILE_VERSION,
                })
            }
        }

        match object.get(OWNER_KEY).and_then(Value::as_str) {
            Some(owner) if owner == expected_owner => {}
            found => {
                return Err(HelperError::SessionOwner {
                    found: found.unwrap_or("nothing").to_string(),
                    expected: expected_owner.to_string(),
                })
            }
        }

        let options = object
            .get(OPTIONS_KEY)
            .cloned()
            .ok_or_else(|| HelperError::SessionFormat {
                path: path.to_path_buf(),
                message: format!("missing field `{}`", OPTIONS_KEY),
            })?;
        let options = serde_json::from_value(options).map_err(|e| HelperError::SessionFormat {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Ok(Self::new(expected_owner, options))
    }

    /// Owner of a JSON document that looks like a session, if any.
    pub fn peek_owner(content: &str) -> Option<Option<String>> {
        let value: Value = serde_json::from_str(content).ok()?;
        let object = value.as_object()?;
        Some(object.get(OWNER_KEY).and_then(Value::as_str).map(str::to_string))
    }
}
