use crate::cli::args::OutputFormat;
use crate::core::command::FactMatch;
use crate::core::registry::ParameterDeclaration;
use crate::core::session::SavedSession;
use std::io;
use tabled::{Table, Tabled};

/// Output writer trait for different formats
pub trait OutputWriter {
    fn write_parameters(&self, parameters: &[ParameterDeclaration]) -> Result<(), OutputError>;
    fn write_sessions(&self, sessions: &[SavedSession]) -> Result<(), OutputError>;
    fn write_facts(&self, facts: &[FactMatch]) -> Result<(), OutputError>;
    fn write_message(&self, message: &str) -> Result<(), OutputError>;
    fn write_error(&self, error: &str) -> Result<(), OutputError>;
}

/// Output formatting errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl From<OutputError> for crate::domain::error::HelperError {
    fn from(err: OutputError) -> Self {
        Self::Output(err.to_string())
    }
}

/// Console output writer
pub struct ConsoleWriter {
    format: OutputFormat,
}

impl ConsoleWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_parameters(
        &self,
        parameters: &[ParameterDeclaration],
    ) -> Result<String, OutputError> {
        let output = match self.format {
            OutputFormat::Text => parameters
                .iter()
                .map(ParameterDeclaration::long_flag)
                .collect::<Vec<_>>()
                .join("\n"),
            OutputFormat::Json => serde_json::to_string_pretty(parameters)?,
            OutputFormat::Table => {
                let rows: Vec<ParameterRow> = parameters.iter().map(ParameterRow::from).collect();
                Table::new(rows).to_string()
            }
        };
        Ok(output)
    }

    pub fn format_sessions(&self, sessions: &[SavedSession]) -> Result<String, OutputError> {
        let output = match self.format {
            OutputFormat::Text => sessions
                .iter()
                .map(|s| format!("{}) {}", s.ordinal, s.key))
                .collect::<Vec<_>>()
                .join("\n"),
            OutputFormat::Json => serde_json::to_string_pretty(sessions)?,
            OutputFormat::Table => {
                let rows: Vec<SessionRow> = sessions.iter().map(SessionRow::from).collect();
                Table::new(rows).to_string()
            }
        };
        Ok(output)
    }
}

impl OutputWriter for ConsoleWriter {
    fn write_parameters(&self, parameters: &[ParameterDeclaration]) -> Result<(), OutputError> {
        println!("{}", self.format_parameters(parameters)?);
        Ok(())
    }

    fn write_sessions(&self, sessions: &[SavedSession]) -> Result<(), OutputError> {
        if sessions.is_empty() && self.format != OutputFormat::Json {
            return Ok(());
        }
        println!("{}", self.format_sessions(sessions)?);
        Ok(())
    }

    // Facts are printed one value per line whatever the format, for use in scripts.
    fn write_facts(&self, facts: &[FactMatch]) -> Result<(), OutputError> {
        for fact in facts {
            println!("{}", fact.display_value());
        }
        Ok(())
    }

    fn write_message(&self, message: &str) -> Result<(), OutputError> {
        println!("{}", message);
        Ok(())
    }

    fn write_error(&self, error: &str) -> Result<(), OutputError> {
        eprintln!("[!] Error: {}", error);
        Ok(())
    }
}

#[derive(Tabled)]
struct ParameterRow {
    #[tabled(rename = "Option")]
    flag: String,
    #[tabled(rename = "Short")]
    short: String,
    #[tabled(rename = "Value")]
    has_value: String,
    #[tabled(rename = "Source")]
    origin: String,
}

impl From<&ParameterDeclaration> for ParameterRow {
    fn from(parameter: &ParameterDeclaration) -> Self {
        Self {
            flag: parameter.long_flag(),
            short: parameter.short.map(|c| format!("-{}", c)).unwrap_or_default(),
            has_value: if parameter.has_value { "yes" } else { "no" }.to_string(),
            origin: parameter.origin.to_string(),
        }
    }
}

#[derive(Tabled)]
struct SessionRow {
    #[tabled(rename = "#")]
    ordinal: usize,
    #[tabled(rename = "Key")]
    key: String,
}

impl From<&SavedSession> for SessionRow {
    fn from(session: &SavedSession) -> Self {
        Self {
            ordinal: session.ordinal,
            key: session.key.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sessions() -> Vec<SavedSession> {
        vec![
            SavedSession {
                ordinal: 1,
                key: "prod".to_string(),
            },
            SavedSession {
                ordinal: 2,
                key: "staging".to_string(),
            },
        ]
    }

    #[test]
    fn test_text_sessions() {
        let writer = ConsoleWriter::new(OutputFormat::Text);
        assert_eq!(writer.format_sessions(&sessions()).unwrap(), "1) prod\n2) staging");
    }

    #[test]
    fn test_json_sessions() {
        let writer = ConsoleWriter::new(OutputFormat::Json);
        let output = writer.format_sessions(&sessions()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value[1]["key"], "staging");
        assert_eq!(value[1]["ordinal"], 2);
    }

    #[test]
    fn test_text_parameters() {
        let writer = ConsoleWriter::new(OutputFormat::Text);
        let parameters = vec![
            ParameterDeclaration::builtin("check", Some('c'), false),
            ParameterDeclaration::variable("region"),
        ];
        assert_eq!(writer.format_parameters(&parameters).unwrap(), "--check\n--region");
    }

    #[test]
    fn test_table_parameters() {
        let writer = ConsoleWriter::new(OutputFormat::Table);
        let output = writer
            .format_parameters(&[ParameterDeclaration::variable("region")])
            .unwrap();
        assert!(output.contains("--region"));
        assert!(output.contains("playbook"));
    }
}
