// Ansible configuration lookup - only `vault_password_file` is read
use crate::domain::error::{HelperError, HelperResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const ANSIBLE_CONFIG_ENV: &str = "ANSIBLE_CONFIG";
const VAULT_PASSWORD_KEY: &str = "vault_password_file";

/// ansible.cfg locations in the order Ansible searches them.
pub fn config_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(path) = std::env::var_os(ANSIBLE_CONFIG_ENV).filter(|v| !v.is_empty()) {
        candidates.push(PathBuf::from(path));
    }
    candidates.push(PathBuf::from("ansible.cfg"));
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".ansible.cfg"));
    }
    candidates.push(PathBuf::from("/etc/ansible/ansible.cfg"));
    candidates
}

/// Vault password file named by the first ansible.cfg found, if it exists.
pub fn find_vault_password_file() -> HelperResult<Option<PathBuf>> {
    let Some(config) = config_candidates().into_iter().find(|p| p.exists()) else {
        return Ok(None);
    };

    let content = fs::read_to_string(&config).map_err(|e| HelperError::Config {
        message: format!("Could not read ansible config file {}: {}", config.display(), e),
    })?;

    let found = vault_password_file(&content).filter(|path| path.exists());
    debug!(
        "Ansible config {}: vault password file {:?}",
        config.display(),
        found
    );
    Ok(found)
}

/// Value of `vault_password_file` in ansible.cfg text. Spaces are ignored.
pub fn vault_password_file(content: &str) -> Option<PathBuf> {
    content
        .lines()
        .map(|line| line.replace(' ', ""))
        .filter(|line| !line.starts_with('#') && !line.starts_with(';'))
        .find_map(|line| {
            let (key, value) = line.split_once('=')?;
            (key == VAULT_PASSWORD_KEY && !value.is_empty()).then(|| expand_home(value))
        })
}

fn expand_home(value: &str) -> PathBuf {
    match (value.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => Path::new(value).to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vault_password_file() {
        let content = "[defaults]\ninventory = hosts\nvault_password_file = /etc/ansible/vault.txt\n";
        assert_eq!(
            vault_password_file(content),
            Some(PathBuf::from("/etc/ansible/vault.txt"))
        );
    }

    #[test]
    fn test_commented_vault_password_file() {
        let content = "[defaults]\n# vault_password_file = /etc/vault\n; vault_password_file=/x\n";
        assert_eq!(vault_password_file(content), None);
    }

    #[test]
    fn test_blank_lines_do_not_stop_the_scan() {
        let content = "[defaults]\n\nvault_password_file=/opt/vault\n";
        assert_eq!(vault_password_file(content), Some(PathBuf::from("/opt/vault")));
    }

    #[test]
    fn test_candidates_end_with_system_config() {
        let candidates = config_candidates();
        assert_eq!(
            candidates.last(),
            Some(&PathBuf::from("/etc/ansible/ansible.cfg"))
        );
        assert!(candidates.contains(&PathBuf::from("ansible.cfg")));
    }
}
