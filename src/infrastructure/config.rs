use crate::domain::{
    config::{GlobalConfig, HelperConfig},
    error::{HelperError, HelperResult},
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Names an explicit configuration file
pub const CONFIG_ENV: &str = "ANSIBLE_HELPER_CONFIG";
/// Overrides the saved session directory
pub const SESSION_DIR_ENV: &str = "helper_data_directory";

const PROJECT_CONFIG_FILE: &str = "ansible-helper.toml";
const DEFAULT_SESSION_DIR: &str = ".ansible-helper";

/// Configuration manager
pub struct ConfigManager {
    global_config_path: Option<PathBuf>,
    project_config_path: Option<PathBuf>,
    explicit_config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Create new configuration manager
    pub fn new() -> Self {
        Self {
            global_config_path: Self::get_global_config_path(),
            project_config_path: Self::find_project_config_path(),
            explicit_config_path: std::env::var_os(CONFIG_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        }
    }

    /// Load configuration from files
    ///
    /// An explicit file replaces both the global and project files. Otherwise
    /// a project file, when found, takes precedence over the global one.
    pub fn load_config(&self) -> HelperResult<HelperConfig> {
        if let Some(path) = &self.explicit_config_path {
            return self.load_config_from_path(path);
        }

        let mut config = HelperConfig::default();

        if let Some(global_path) = &self.global_config_path {
            if global_path.exists() {
                config = self.load_config_from_path(global_path)?;
            }
        }

        if let Some(project_path) = &self.project_config_path {
            config = self.load_config_from_path(project_path)?;
        }

        Ok(config)
    }

    /// Get global configuration path
    fn get_global_config_path() -> Option<PathBuf> {
        let config_dir = dirs::config_dir()?;
        Some(config_dir.join("ansible-helper").join("config.toml"))
    }

    /// Find project configuration path by walking up directory tree
    fn find_project_config_path() -> Option<PathBuf> {
        let current_dir = std::env::current_dir().ok()?;
        let mut path = current_dir.as_path();

        loop {
            let config_path = path.join(PROJECT_CONFIG_FILE);
            if config_path.is_file() {
                return Some(config_path);
            }

            path = path.parent()?;
        }
    }

    /// Load configuration from specific path
    pub fn load_config_from_path(&self, path: &Path) -> HelperResult<HelperConfig> {
        let content = fs::read_to_string(path).map_err(|e| HelperError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config = toml::from_str(&content).map_err(|e| HelperError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Saved session directory for this process
    pub fn session_dir(&self, config: &GlobalConfig) -> HelperResult<PathBuf> {
        resolve_session_dir(
            std::env::var(SESSION_DIR_ENV).ok(),
            config,
            dirs::home_dir(),
        )
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Environment first, then the config file, then `~/.ansible-helper`.
pub fn resolve_session_dir(
    env_value: Option<String>,
    config: &GlobalConfig,
    home: Option<PathBuf>,
) -> HelperResult<PathBuf> {
    if let Some(dir) = env_value.filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }

    if let Some(dir) = &config.session_dir {
        return Ok(dir.clone());
    }

    let home = home.ok_or_else(|| HelperError::Config {
        message: "Could not determine home directory".to_string(),
    })?;
    Ok(home.join(DEFAULT_SESSION_DIR))
}

/// Split the configured playbook command into program and arguments.
pub fn playbook_command(config: &GlobalConfig) -> HelperResult<Vec<String>> {
    let words = shell_words::split(&config.playbook_command).map_err(|e| HelperError::Config {
        message: format!("Invalid playbook_command '{}': {}", config.playbook_command, e),
    })?;

    if words.is_empty() {
        return Err(HelperError::Config {
            message: "playbook_command is empty".to_string(),
        });
    }
    Ok(words)
}
