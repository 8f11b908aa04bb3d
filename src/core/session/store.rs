use crate::core::prompt::Prompter;
use crate::core::session::record::SessionRecord;
use crate::domain::error::{HelperError, HelperResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

static SESSION_KEY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("Failed to compile session key regex"));

const SESSION_EXTENSION: &str = "json";

/// Reject keys that are empty or contain anything but letters, digits, `_` and `-`.
pub fn validate_key(key: &str) -> HelperResult<()> {
    if SESSION_KEY_REGEX.is_match(key) {
        Ok(())
    } else {
        Err(HelperError::InvalidSessionKey(key.to_string()))
    }
}

/// One listed session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedSession {
    pub ordinal: usize,
    pub key: String,
}

/// Directory of saved sessions, one `{key}.json` file each
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", key, SESSION_EXTENSION))
    }

    /// Prompt for every variable and write the answers under `key`.
    ///
    /// Empty answers are left out of the saved options. An existing session
    /// with the same key is replaced.
    pub fn save(
        &self,
        key: &str,
        playbook: &str,
        variables: &[String],
        prompter: &mut dyn Prompter,
    ) -> HelperResult<SessionRecord> {
        validate_key(key)?;

        let mut options = BTreeMap::new();
        for name in variables {
            let answer = prompter.input(name)?;
            let answer = answer.trim_end_matches(&['\r', '\n'][..]);
            if !answer.is_empty() {
                options.insert(name.clone(), answer.to_string());
            }
        }

        let record = SessionRecord::new(playbook, options);
        let content = record.to_json_pretty()?;

        self.ensure_dir()?;
        let path = self.path_for(key);
        fs::write(&path, content).map_err(|e| HelperError::Config {
            message: format!("Could not write save file {}: {}", path.display(), e),
        })?;

        info!(
            "Saved session '{}' with {} options to {}",
            key,
            record.options.len(),
            path.display()
        );
        Ok(record)
    }

    /// Load the session saved under `key`, or `None` when there is none.
    pub fn load(&self, key: &str, playbook: &str) -> HelperResult<Option<SessionRecord>> {
        validate_key(key)?;

        let path = self.path_for(key);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No saved session at {}", path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(HelperError::Config {
                    message: format!("Could not read save file {}: {}", path.display(), e),
                })
            }
        };

        let record = SessionRecord::parse(&path, &content, playbook)?;
        debug!("Loaded session '{}' with {} options", key, record.options.len());
        Ok(Some(record))
    }

    /// Sessions saved against `playbook`, in file name order.
    ///
    /// Enumeration happens here; each file is read as the iterator advances.
    /// Calling `list` again starts over.
    pub fn list(&self, playbook: &str) -> HelperResult<SessionIter> {
        let mut paths = Vec::new();

        match fs::read_dir(&self.dir) {
            Ok(entries) => {
                for entry in entries {
                    let entry = entry.map_err(|e| HelperError::Config {
                        message: format!("Could not read {}: {}", self.dir.display(), e),
                    })?;
                    let path = entry.path();
                    if path.is_file() {
                        paths.push(path);
                    }
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(HelperError::Config {
                    message: format!("Could not read {}: {}", self.dir.display(), e),
                })
            }
        }

        paths.sort();
        Ok(SessionIter {
            playbook: playbook.to_string(),
            paths: paths.into_iter(),
            count: 0,
        })
    }

    fn ensure_dir(&self) -> HelperResult<()> {
        if self.dir.is_dir() {
            return Ok(());
        }

        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o770);
        }

        builder.create(&self.dir).map_err(|e| HelperError::Config {
            message: format!("Can not make directory {}: {}", self.dir.display(), e),
        })?;
        debug!("Created session directory {}", self.dir.display());
        Ok(())
    }
}

/// Lazy walk over a session directory snapshot
#[derive(Debug, Clone)]
pub struct SessionIter {
    playbook: String,
    paths: std::vec::IntoIter<PathBuf>,
    count: usize,
}

impl Iterator for SessionIter {
    type Item = HelperResult<SavedSession>;

    fn next(&mut self) -> Option<Self::Item> {
        for path in self.paths.by_ref() {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) if e.kind() == ErrorKind::InvalidData => {
                    warn!("Skipping {}: file does not contain JSON data", file_name);
                    continue;
                }
                Err(e) => {
                    return Some(Err(HelperError::Config {
                        message: format!("Could not read file {}: {}", path.display(), e),
                    }))
                }
            };

            let owner = match SessionRecord::peek_owner(&content) {
                Some(owner) => owner,
                None => {
                    warn!("Skipping {}: file does not contain JSON data", file_name);
                    continue;
                }
            };

            if owner.as_deref() == Some(self.playbook.as_str()) {
                self.count += 1;
                let key = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or(file_name);
                return Some(Ok(SavedSession {
                    ordinal: self.count,
                    key,
                }));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::prompt::ScriptedPrompter;
    use tempfile::TempDir;

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("prod").is_ok());
        assert!(validate_key("Prod_eu-1").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("../etc").is_err());
        assert!(validate_key("my key").is_err());
        assert!(validate_key("prod.json").is_err());
    }

    #[test]
    fn test_invalid_key_prompts_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::new(temp_dir.path().join("sessions"));
        let mut prompter = ScriptedPrompter::new(["us-east-1"]);

        let err = store
            .save("bad/key", "site.yaml", &names(&["region"]), &mut prompter)
            .unwrap_err();

        assert!(matches!(err, HelperError::InvalidSessionKey(_)));
        assert!(prompter.asked().is_empty());
        assert!(!store.dir().exists());
    }

    #[test]
    fn test_save_skips_empty_answers() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::new(temp_dir.path());
        let mut prompter = ScriptedPrompter::new(["us-east-1", ""]);

        let record = store
            .save("prod", "site.yaml", &names(&["region", "zone"]), &mut prompter)
            .unwrap();

        assert_eq!(record.options.len(), 1);
        assert_eq!(prompter.asked(), ["region", "zone"]);

        let content = fs::read_to_string(store.path_for("prod")).unwrap();
        assert!(content.ends_with("}\n"));
        assert!(!content.ends_with("\n\n"));
        assert!(!content.contains("zone"));
    }

    #[test]
    fn test_save_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("nested").join("sessions");
        let store = SessionStore::new(&dir);
        let mut prompter = ScriptedPrompter::new(Vec::<String>::new());

        store.save("empty", "site.yaml", &[], &mut prompter).unwrap();
        assert!(dir.join("empty.json").is_file());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&dir).unwrap().permissions().mode();
            assert_eq!(mode & 0o007, 0);
        }
    }

    #[test]
    fn test_load_missing_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::new(temp_dir.path().join("never-created"));
        assert!(store.load("prod", "site.yaml").unwrap().is_none());
    }

    #[test]
    fn test_list_missing_directory_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::new(temp_dir.path().join("never-created"));
        assert_eq!(store.list("site.yaml").unwrap().count(), 0);
    }

    #[test]
    fn test_list_is_restartable() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::new(temp_dir.path());
        for key in ["b", "a"] {
            store
                .save(key, "site.yaml", &[], &mut ScriptedPrompter::default())
                .unwrap();
        }

        let iter = store.list("site.yaml").unwrap();
        let first: Vec<SavedSession> = iter.clone().collect::<HelperResult<_>>().unwrap();
        let second: Vec<SavedSession> = iter.collect::<HelperResult<_>>().unwrap();

        assert_eq!(first, second);
        assert_eq!(
            first,
            vec![
                SavedSession {
                    ordinal: 1,
                    key: "a".to_string(),
                },
                SavedSession {
                    ordinal: 2,
                    key: "b".to_string(),
                },
            ]
        );
    }
}
