use crate::core::overrides::OverrideStore;
use crate::core::registry::{PlaybookMetadata, PlaybookOption};
use crate::domain::error::{HelperError, HelperResult};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment applied to every playbook run
const QUIET_ENVIRONMENT: &[(&str, &str)] = &[
    ("ANSIBLE_HOST_KEY_CHECKING", "False"),
    ("ANSIBLE_LOCALHOST_WARNING", "False"),
    ("ANSIBLE_ACTION_WARNINGS", "False"),
    ("ANSIBLE_COMMAND_WARNINGS", "False"),
    ("ANSIBLE_DEPRECATION_WARNINGS", "False"),
    ("ANSIBLE_DISPLAY_SKIPPED_HOSTS", "False"),
];

const STDOUT_CALLBACK_VAR: &str = "ANSIBLE_STDOUT_CALLBACK";

/// Ansible stdout callback plugin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdoutCallback {
    Minimal,
    Dense,
    Selective,
    Json,
}

impl StdoutCallback {
    pub fn plugin(&self) -> &'static str {
        match self {
            StdoutCallback::Minimal => "minimal",
            StdoutCallback::Dense => "community.general.dense",
            StdoutCallback::Selective => "selective",
            StdoutCallback::Json => "ansible.posix.json",
        }
    }
}

/// How the playbook engine itself is configured for this run
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Program and leading arguments, e.g. `["ansible-playbook"]`
    pub command: Vec<String>,
    /// Callback selected by `# option:dense` or `# option:selective`
    pub playbook_callback: Option<StdoutCallback>,
    /// Set by `# option:quiet`
    pub playbook_quiet: bool,
    /// Vault password file from ansible.cfg, if one exists
    pub vault_password_file: Option<PathBuf>,
}

impl EngineSettings {
    pub fn new(command: Vec<String>, metadata: &PlaybookMetadata) -> Self {
        let playbook_callback = metadata.options.iter().rev().find_map(|option| match option {
            PlaybookOption::Dense => Some(StdoutCallback::Dense),
            PlaybookOption::Selective => Some(StdoutCallback::Selective),
            PlaybookOption::Quiet => None,
        });

        Self {
            command,
            playbook_callback,
            playbook_quiet: metadata.has_option(PlaybookOption::Quiet),
            vault_password_file: None,
        }
    }

    pub fn with_vault_password_file(mut self, path: Option<PathBuf>) -> Self {
        self.vault_password_file = path;
        self
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::new(vec!["ansible-playbook".to_string()], &PlaybookMetadata::default())
    }
}

/// Mode flags for one run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub check: bool,
    pub debug: bool,
    pub quiet: bool,
    pub vault: bool,
    pub ask: bool,
    pub host: Option<String>,
    pub fact: Option<String>,
    pub cryptfile: Option<PathBuf>,
}

/// A fully assembled playbook command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    /// Capture stdout instead of inheriting the terminal
    pub capture: bool,
}

impl Invocation {
    /// Shell-quoted command line, without the environment.
    pub fn render(&self) -> String {
        shell_words::join(std::iter::once(&self.program).chain(self.args.iter()))
    }

    pub fn env_value(&self, key: &str) -> Option<&str> {
        self.env
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Build the `ansible-playbook` invocation for a finished override store.
pub fn assemble(
    playbook: &Path,
    overrides: &OverrideStore,
    options: &RunOptions,
    settings: &EngineSettings,
) -> HelperResult<Invocation> {
    let (program, leading) = settings
        .command
        .split_first()
        .ok_or_else(|| HelperError::Config {
            message: "playbook command is empty".to_string(),
        })?;

    let mut args: Vec<String> = leading.to_vec();

    if let Some(host) = &options.host {
        args.push("-i".to_string());
        args.push(format!("{},", host));
    }

    args.push(playbook.display().to_string());

    let vault = options.vault || options.cryptfile.is_some();
    if vault && settings.vault_password_file.is_none() {
        args.push("--ask-vault-pass".to_string());
    }

    if !overrides.is_empty() {
        args.push("--extra-vars".to_string());
        args.push(overrides.to_json());
    }

    if options.check {
        args.push("--check".to_string());
    }

    if options.debug {
        args.push("-vvv".to_string());
    }

    if let Some(cryptfile) = &options.cryptfile {
        args.push("-e".to_string());
        args.push(format!("@{}", cryptfile.display()));
    }

    let mut env: Vec<(String, String)> = QUIET_ENVIRONMENT
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    if let Some(callback) = stdout_callback(options, settings) {
        env.push((STDOUT_CALLBACK_VAR.to_string(), callback.plugin().to_string()));
    }

    let invocation = Invocation {
        program: program.clone(),
        args,
        env,
        capture: options.fact.is_some(),
    };
    debug!("Assembled invocation: {}", invocation.render());
    Ok(invocation)
}

fn stdout_callback(options: &RunOptions, settings: &EngineSettings) -> Option<StdoutCallback> {
    if options.fact.is_some() {
        Some(StdoutCallback::Json)
    } else if options.quiet || settings.playbook_quiet {
        Some(StdoutCallback::Minimal)
    } else {
        settings.playbook_callback
    }
}
