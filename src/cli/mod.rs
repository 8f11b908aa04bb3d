// CLI module - Command line interface
pub mod args;
pub mod commands;
pub mod output;

pub use args::{Args, Mode, OutputFormat, ParsedArgs};
pub use commands::{execute, run, HelperContext};
pub use output::{ConsoleWriter, OutputWriter};
