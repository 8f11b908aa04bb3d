use crate::core::command::Invocation;
use crate::domain::error::{HelperError, HelperResult};
use std::process::{Command, ExitStatus, Stdio};
use tracing::{debug, info};

/// Result of a run with captured stdout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedRun {
    pub exit_code: i32,
    pub stdout: String,
}

/// Executes assembled invocations
pub trait PlaybookRunner {
    /// Run attached to the terminal and return the exit code.
    fn run(&mut self, invocation: &Invocation) -> HelperResult<i32>;
    /// Run with stdout captured.
    fn capture(&mut self, invocation: &Invocation) -> HelperResult<CapturedRun>;
}

/// Runs invocations as child processes
#[derive(Debug, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    fn command(invocation: &Invocation) -> Command {
        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args);
        command.envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        command
    }

    fn spawn_error(invocation: &Invocation, err: std::io::Error) -> HelperError {
        HelperError::Process(format!("Failed to run {}: {}", invocation.program, err))
    }
}

impl PlaybookRunner for ProcessRunner {
    fn run(&mut self, invocation: &Invocation) -> HelperResult<i32> {
        info!("Running {}", invocation.program);
        let status = Self::command(invocation)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| Self::spawn_error(invocation, e))?;

        Ok(exit_code(status))
    }

    fn capture(&mut self, invocation: &Invocation) -> HelperResult<CapturedRun> {
        info!("Running {} with captured output", invocation.program);
        let output = Self::command(invocation)
            .stdin(Stdio::inherit())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|e| Self::spawn_error(invocation, e))?;

        debug!("Captured {} bytes of output", output.stdout.len());
        Ok(CapturedRun {
            exit_code: exit_code(output.status),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}

/// Signals have no code; report them as a plain failure.
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}
