//! Ansible Helper Library
//!
//! Interactive front-end for `ansible-playbook`: playbook variables declared
//! in comments become command line options, answers can be saved under a key
//! and read back, and everything is merged into one `--extra-vars` mapping.

pub mod cli;
pub mod core;
pub mod domain;
pub mod infrastructure;

pub use crate::core::overrides::{OverrideEntry, OverrideSource, OverrideStore};
pub use crate::core::registry::{ParameterDeclaration, ParameterRegistry};
pub use crate::core::session::{SessionRecord, SessionStore, SAVE_FILE_VERSION};
pub use domain::config::HelperConfig;
pub use domain::error::{HelperError, HelperResult};
