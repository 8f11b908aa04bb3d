//! Fact lookup in `ansible.posix.json` callback output.
//!
//! The callback prints one document shaped as
//! `plays[].tasks[].hosts{<host>: {ansible_facts: {...}}}`. Nothing else in
//! the document is read. Output that does not have this shape is an error.

use crate::domain::error::{HelperError, HelperResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
struct PlaybookReport {
    plays: Vec<PlayReport>,
}

#[derive(Debug, Deserialize)]
struct PlayReport {
    tasks: Vec<TaskReport>,
}

#[derive(Debug, Deserialize)]
struct TaskReport {
    hosts: BTreeMap<String, HostReport>,
}

#[derive(Debug, Deserialize)]
struct HostReport {
    #[serde(default)]
    ansible_facts: Option<Map<String, Value>>,
}

/// One host's value for a fact
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactMatch {
    pub host: String,
    pub value: Value,
}

impl FactMatch {
    /// Strings unquoted, anything else as JSON.
    pub fn display_value(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Every value of `fact` reported by any task, in play and task order.
pub fn extract_facts(output: &str, fact: &str) -> HelperResult<Vec<FactMatch>> {
    let report: PlaybookReport = serde_json::from_str(output).map_err(|e| {
        HelperError::FactOutput(format!(
            "expected plays/tasks/hosts JSON from the json callback: {}",
            e
        ))
    })?;

    let matches = report
        .plays
        .iter()
        .flat_map(|play| play.tasks.iter())
        .flat_map(|task| task.hosts.iter())
        .filter_map(|(host, result)| {
            let value = result.ansible_facts.as_ref()?.get(fact)?;
            Some(FactMatch {
                host: host.clone(),
                value: value.clone(),
            })
        })
        .collect();

    Ok(matches)
}
