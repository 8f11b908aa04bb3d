use std::path::PathBuf;
use thiserror::Error;

/// Ansible helper unified error type
#[derive(Error, Debug)]
pub enum HelperError {
    #[error("{0}")]
    Cli(#[from] clap::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Usage error: {0}")]
    Usage(String),

    #[error("Can not open playbook {}: {source}", path.display())]
    Playbook {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported option: {0}")]
    UnsupportedOption(String),

    #[error("Save key should not contain special characters: '{0}'")]
    InvalidSessionKey(String),

    #[error("Save file version error, file version {found} required version {expected}")]
    SessionVersion { found: String, expected: u32 },

    #[error("Playbook name mismatch, got {found} expecting {expected}")]
    SessionOwner { found: String, expected: String },

    #[error("Save file {} does not contain valid session data: {message}", path.display())]
    SessionFormat { path: PathBuf, message: String },

    #[error("Passwords do not match")]
    SecretMismatch,

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Process error: {0}")]
    Process(String),

    #[error("Unexpected playbook output: {0}")]
    FactOutput(String),

    #[error("Output error: {0}")]
    Output(String),
}

impl From<dialoguer::Error> for HelperError {
    fn from(err: dialoguer::Error) -> Self {
        Self::Prompt(err.to_string())
    }
}

pub type HelperResult<T> = Result<T, HelperError>;
