// Registry module - Recognized command line parameters
pub mod declaration;
pub mod scanner;

pub use declaration::{
    ParameterDeclaration, ParameterOrigin, BUILTIN_PARAMETERS, HELPER_ONLY_PARAMETERS,
};
pub use scanner::{scan, PlaybookMetadata, PlaybookOption};

use crate::domain::error::{HelperError, HelperResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

static VARIABLE_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.-]*$").expect("Failed to compile variable name regex")
});

/// Every parameter name the command line accepts, keyed by long name
#[derive(Debug, Clone)]
pub struct ParameterRegistry {
    declarations: Vec<ParameterDeclaration>,
    index: HashMap<String, usize>,
    metadata: PlaybookMetadata,
}

impl ParameterRegistry {
    /// Registry with only the helper's own flags
    pub fn builtin() -> Self {
        let mut registry = Self {
            declarations: BUILTIN_PARAMETERS
                .iter()
                .map(|(name, short, has_value)| {
                    ParameterDeclaration::builtin(name, *short, *has_value)
                })
                .collect(),
            index: HashMap::new(),
            metadata: PlaybookMetadata::default(),
        };
        registry.reindex();
        registry
    }

    /// Scan a playbook and register its variables after the built-in flags.
    pub fn from_playbook(path: &Path) -> HelperResult<Self> {
        let metadata = scan(path)?;
        Self::from_metadata(metadata)
    }

    /// Names that can not be written as `--<name>` are skipped with a warning.
    pub fn from_metadata(metadata: PlaybookMetadata) -> HelperResult<Self> {
        let mut registry = Self::builtin();
        for name in &metadata.variables {
            if !VARIABLE_NAME_REGEX.is_match(name) {
                warn!("Ignoring playbook variable '{}': not a valid option name", name);
                continue;
            }
            registry.declare(ParameterDeclaration::variable(name))?;
        }
        registry.metadata = metadata;
        Ok(registry)
    }

    fn declare(&mut self, declaration: ParameterDeclaration) -> HelperResult<()> {
        if let Some(&position) = self.index.get(&declaration.name) {
            let existing = &self.declarations[position];
            if !HELPER_ONLY_PARAMETERS.contains(&existing.name.as_str()) {
                return Err(HelperError::Usage(format!(
                    "playbook variable '{}' collides with the {} flag {}",
                    declaration.name,
                    existing.origin,
                    existing.long_flag()
                )));
            }
            debug!("Playbook variable '{}' replaces the helper flag", declaration.name);
            self.declarations.remove(position);
            self.reindex();
        }
        self.index.insert(declaration.name.clone(), self.declarations.len());
        self.declarations.push(declaration);
        Ok(())
    }

    fn reindex(&mut self) {
        self.index = self
            .declarations
            .iter()
            .enumerate()
            .map(|(i, d)| (d.name.clone(), i))
            .collect();
    }

    pub fn get(&self, name: &str) -> Option<&ParameterDeclaration> {
        self.index.get(name).map(|&i| &self.declarations[i])
    }

    /// All declarations, built-in flags first.
    pub fn declarations(&self) -> &[ParameterDeclaration] {
        &self.declarations
    }

    /// Declarations discovered in the playbook.
    pub fn variables(&self) -> impl Iterator<Item = &ParameterDeclaration> {
        self.declarations.iter().filter(|d| d.is_variable())
    }

    pub fn variable_names(&self) -> Vec<String> {
        self.variables().map(|d| d.name.clone()).collect()
    }

    pub fn metadata(&self) -> &PlaybookMetadata {
        &self.metadata
    }
}
