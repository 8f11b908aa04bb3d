use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use tracing::debug;

/// Where an override value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideSource {
    /// Loaded from a saved session
    Session,
    /// Given as `--name value` on the command line
    CommandLine,
    /// Injected by a mode flag such as `--ask` or `--passvar`
    Derived,
}

impl fmt::Display for OverrideSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverrideSource::Session => write!(f, "session"),
            OverrideSource::CommandLine => write!(f, "command line"),
            OverrideSource::Derived => write!(f, "derived"),
        }
    }
}

/// A single playbook variable override
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideEntry {
    pub name: String,
    pub value: String,
    pub source: OverrideSource,
}

/// Ordered name to value mapping passed to the playbook as extra vars.
///
/// Names are unique. Writing an existing name replaces its value and source
/// but keeps the position of the first write.
#[derive(Debug, Clone, Default)]
pub struct OverrideStore {
    entries: Vec<OverrideEntry>,
}

impl OverrideStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: &str, source: OverrideSource) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.name == name) {
            debug!(
                "Override '{}' from {} replaced by {}",
                name, entry.source, source
            );
            entry.value = value.to_string();
            entry.source = source;
            return;
        }

        self.entries.push(OverrideEntry {
            name: name.to_string(),
            value: value.to_string(),
            source,
        });
    }

    pub fn extend<I, K, V>(&mut self, values: I, source: OverrideSource)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (name, value) in values {
            self.insert(name.as_ref(), value.as_ref(), source);
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entry(name).map(|e| e.value.as_str())
    }

    pub fn entry(&self, name: &str) -> Option<&OverrideEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OverrideEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compact JSON object in store order.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Serialize for OverrideStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.name, &entry.value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_write_wins() {
        let mut store = OverrideStore::new();
        store.insert("region", "eu-west-1", OverrideSource::Session);
        store.insert("zone", "a", OverrideSource::Session);
        store.insert("region", "us-east-1", OverrideSource::CommandLine);

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("region"), Some("us-east-1"));
        assert_eq!(store.entry("region").unwrap().source, OverrideSource::CommandLine);

        let names: Vec<&str> = store.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["region", "zone"]);
    }

    #[test]
    fn test_json_keeps_order_and_escapes() {
        let mut store = OverrideStore::new();
        store.insert("zone", "b", OverrideSource::CommandLine);
        store.insert("path", r#"C:\temp "x""#, OverrideSource::CommandLine);

        assert_eq!(store.to_json(), r#"{"zone":"b","path":"C:\\temp \"x\""}"#);
    }

    #[test]
    fn test_empty_store() {
        let store = OverrideStore::new();
        assert!(store.is_empty());
        assert_eq!(store.to_json(), "{}");
        assert!(store.get("anything").is_none());
    }
}
