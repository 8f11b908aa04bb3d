use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Ansible helper configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HelperConfig {
    /// Global configuration
    #[serde(default)]
    pub global: GlobalConfig,
}

/// Global configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Default log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Command used to run playbooks, split like a shell would
    #[serde(default = "default_playbook_command")]
    pub playbook_command: String,
    /// Saved session directory, overridden by `helper_data_directory`
    #[serde(default)]
    pub session_dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_playbook_command() -> String {
    "ansible-playbook".to_string()
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            playbook_command: default_playbook_command(),
            session_dir: None,
        }
    }
}
