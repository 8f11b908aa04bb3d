// Command module - Playbook invocation assembly
pub mod assembler;
pub mod facts;

pub use assembler::{assemble, EngineSettings, Invocation, RunOptions, StdoutCallback};
pub use facts::{extract_facts, FactMatch};
