// Core module - Parameters, overrides, saved sessions and invocation assembly
pub mod command;
pub mod overrides;
pub mod prompt;
pub mod registry;
pub mod session;
