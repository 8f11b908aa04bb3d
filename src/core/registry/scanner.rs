use crate::domain::error::{HelperError, HelperResult};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, warn};

const COMMENT_MARKER: char = '#';
const VAR_TAG: &str = "var:";
const OPTION_TAG: &str = "option:";

/// Output mode selected by a `# option:` comment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybookOption {
    /// Minimal callback output
    Quiet,
    /// `community.general.dense` callback
    Dense,
    /// `selective` callback
    Selective,
}

impl PlaybookOption {
    pub fn parse(token: &str) -> HelperResult<Self> {
        match token {
            "quiet" => Ok(Self::Quiet),
            "dense" => Ok(Self::Dense),
            "selective" => Ok(Self::Selective),
            other => Err(HelperError::UnsupportedOption(other.to_string())),
        }
    }
}

/// Metadata declared by a playbook's comment lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybookMetadata {
    /// Variable names in declaration order, without duplicates
    pub variables: Vec<String>,
    /// Options in declaration order
    pub options: Vec<PlaybookOption>,
}

impl PlaybookMetadata {
    pub fn has_option(&self, option: PlaybookOption) -> bool {
        self.options.contains(&option)
    }
}

/// Scan a playbook for `# var:` and `# option:` comments.
pub fn scan(path: &Path) -> HelperResult<PlaybookMetadata> {
    let file = File::open(path).map_err(|source| HelperError::Playbook {
        path: path.to_path_buf(),
        source,
    })?;

    let mut metadata = PlaybookMetadata::default();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|source| HelperError::Playbook {
            path: path.to_path_buf(),
            source,
        })?;
        scan_line(&line, index + 1, &mut metadata)?;
    }

    debug!(
        "Scanned {}: {} variables, {} options",
        path.display(),
        metadata.variables.len(),
        metadata.options.len()
    );
    Ok(metadata)
}

fn scan_line(line: &str, line_no: usize, metadata: &mut PlaybookMetadata) -> HelperResult<()> {
    if !line.starts_with(COMMENT_MARKER) {
        return Ok(());
    }

    if line.contains(VAR_TAG) {
        match tag_value(line) {
            Some(name) if !metadata.variables.iter().any(|v| v == name) => {
                metadata.variables.push(name.to_string());
            }
            Some(name) => debug!("Line {}: variable '{}' already declared", line_no, name),
            None => warn!("Line {}: ignoring variable declaration without a name", line_no),
        }
    }

    if line.contains(OPTION_TAG) {
        let token = tag_value(line).unwrap_or_default();
        metadata.options.push(PlaybookOption::parse(token)?);
    }

    Ok(())
}

/// The text between the first and second colon, trimmed.
fn tag_value(line: &str) -> Option<&str> {
    let value = line.split(':').nth(1)?.trim();
    (!value.is_empty()).then_some(value)
}
