use serde::Serialize;
use std::fmt;

/// Where a parameter declaration came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterOrigin {
    /// Fixed helper flag
    Builtin,
    /// Discovered from a `# var:` comment in the playbook
    Playbook,
}

/// A recognized command line parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterDeclaration {
    /// Long name, used as `--name`
    pub name: String,
    /// Whether the parameter takes a value
    pub has_value: bool,
    /// Single character short form
    pub short: Option<char>,
    /// Declaration source
    pub origin: ParameterOrigin,
}

impl ParameterDeclaration {
    pub fn builtin(name: &str, short: Option<char>, has_value: bool) -> Self {
        Self {
            name: name.to_string(),
            has_value,
            short,
            origin: ParameterOrigin::Builtin,
        }
    }

    /// Playbook variables always take a value and have no short form.
    pub fn variable(name: &str) -> Self {
        Self {
            name: name.to_string(),
            has_value: true,
            short: None,
            origin: ParameterOrigin::Playbook,
        }
    }

    pub fn long_flag(&self) -> String {
        format!("--{}", self.name)
    }

    pub fn is_variable(&self) -> bool {
        self.origin == ParameterOrigin::Playbook
    }
}

impl fmt::Display for ParameterOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterOrigin::Builtin => write!(f, "builtin"),
            ParameterOrigin::Playbook => write!(f, "playbook"),
        }
    }
}

/// Helper flags in the order they are printed.
pub const BUILTIN_PARAMETERS: &[(&str, Option<char>, bool)] = &[
    ("check", Some('c'), false),
    ("print", Some('p'), false),
    ("debug", Some('d'), false),
    ("list", Some('l'), false),
    ("help", Some('?'), false),
    ("ask", Some('a'), false),
    ("quiet", Some('q'), false),
    ("vault", Some('v'), false),
    ("save", Some('s'), true),
    ("read", Some('r'), true),
    ("host", Some('h'), true),
    ("fact", Some('f'), true),
    ("cryptfile", Some('e'), true),
    ("passvar", Some('P'), true),
    ("output", Some('o'), true),
    ("version", Some('V'), false),
];

/// Helper flags a playbook variable of the same name replaces. The flag keeps
/// its short form only.
pub const HELPER_ONLY_PARAMETERS: &[&str] = &["output", "version"];
