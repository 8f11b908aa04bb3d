// Ansible Helper - Interactive front-end for ansible-playbook
use ansible_helper::cli::{self, ConsoleWriter, OutputFormat, OutputWriter};
use ansible_helper::HelperError;
use std::process::ExitCode;

fn main() -> ExitCode {
    match cli::run(std::env::args_os().collect()) {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(HelperError::Cli(e)) => e.exit(),
        Err(e) => {
            let _ = ConsoleWriter::new(OutputFormat::Text).write_error(&e.to_string());
            ExitCode::from(1)
        }
    }
}
