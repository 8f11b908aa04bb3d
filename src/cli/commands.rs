use crate::cli::args::{parse_from, Mode, ParsedArgs};
use crate::cli::output::{ConsoleWriter, OutputWriter};
use crate::core::command::{assemble, extract_facts, EngineSettings};
use crate::core::overrides::{OverrideSource, OverrideStore};
use crate::core::prompt::{capture_secret, Prompter, TerminalPrompter};
use crate::core::registry::ParameterRegistry;
use crate::core::session::{SavedSession, SessionStore};
use crate::domain::error::{HelperError, HelperResult};
use crate::infrastructure::ansible_cfg::find_vault_password_file;
use crate::infrastructure::config::{playbook_command, ConfigManager};
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::runner::{PlaybookRunner, ProcessRunner};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Derived override holding the password from `--ask`
pub const ASK_PASSWORD_VAR: &str = "ask_password";
/// Derived override holding the `--passvar` name
pub const PASSWORD_VAR: &str = "password_var";

/// Everything a run needs from outside the command line
pub struct HelperContext<'a> {
    pub sessions: SessionStore,
    pub command: Vec<String>,
    /// Looked up only when a playbook is about to run
    pub vault_password_lookup: fn() -> HelperResult<Option<PathBuf>>,
    pub prompter: &'a mut dyn Prompter,
    pub runner: &'a mut dyn PlaybookRunner,
}

/// Entry point used by the binary: load configuration, then execute.
pub fn run(argv: Vec<OsString>) -> HelperResult<i32> {
    let config_manager = ConfigManager::new();
    let config = config_manager.load_config()?;
    init_logging(&config.global.log_level)?;

    let mut prompter = TerminalPrompter;
    let mut runner = ProcessRunner;
    let mut context = HelperContext {
        sessions: SessionStore::new(config_manager.session_dir(&config.global)?),
        command: playbook_command(&config.global)?,
        vault_password_lookup: find_vault_password_file,
        prompter: &mut prompter,
        runner: &mut runner,
    };

    execute(argv, &mut context)
}

/// Parse `argv` against the playbook's declared parameters and carry out the
/// requested mode. Returns the process exit code.
pub fn execute<I, T>(argv: I, context: &mut HelperContext<'_>) -> HelperResult<i32>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();

    let Some(playbook) = leading_playbook(&argv) else {
        parse_from(&ParameterRegistry::builtin(), argv)?;
        return Err(HelperError::Usage(
            "Playbook should be the first argument".to_string(),
        ));
    };

    let registry = ParameterRegistry::from_playbook(&playbook)?;
    let parsed = parse_from(&registry, argv)?;
    let writer = ConsoleWriter::new(parsed.args.output.clone());
    let playbook_name = playbook_base_name(&parsed.args.playbook)?;

    match parsed.args.mode() {
        Mode::Print => {
            writer.write_parameters(registry.declarations())?;
            Ok(0)
        }
        Mode::List => {
            let sessions: Vec<SavedSession> = context
                .sessions
                .list(&playbook_name)?
                .collect::<HelperResult<_>>()?;
            writer.write_sessions(&sessions)?;
            Ok(0)
        }
        Mode::Save(key) => {
            context.sessions.save(
                &key,
                &playbook_name,
                &registry.variable_names(),
                &mut *context.prompter,
            )?;
            Ok(0)
        }
        Mode::Run => run_playbook(&parsed, &registry, &playbook_name, context, &writer),
    }
}

/// Build the override store in precedence order: saved session, command line,
/// then derived values.
pub fn build_overrides(
    parsed: &ParsedArgs,
    playbook_name: &str,
    context: &mut HelperContext<'_>,
) -> HelperResult<OverrideStore> {
    let args = &parsed.args;
    let mut overrides = OverrideStore::new();

    if let Some(key) = &args.read {
        if let Some(record) = context.sessions.load(key, playbook_name)? {
            overrides.extend(&record.options, OverrideSource::Session);
        }
    }

    overrides.extend(parsed.overrides.iter().cloned(), OverrideSource::CommandLine);

    if args.ask {
        let secret = capture_secret(&mut *context.prompter)?;
        overrides.insert(ASK_PASSWORD_VAR, &secret, OverrideSource::Derived);
    }

    if let Some(name) = &args.passvar {
        overrides.insert(PASSWORD_VAR, name, OverrideSource::Derived);
    }

    debug!("Override store has {} entries", overrides.len());
    Ok(overrides)
}

fn run_playbook(
    parsed: &ParsedArgs,
    registry: &ParameterRegistry,
    playbook_name: &str,
    context: &mut HelperContext<'_>,
    writer: &dyn OutputWriter,
) -> HelperResult<i32> {
    let overrides = build_overrides(parsed, playbook_name, context)?;
    let options = parsed.args.run_options();
    let settings = EngineSettings::new(context.command.clone(), registry.metadata())
        .with_vault_password_file((context.vault_password_lookup)()?);

    let invocation = assemble(&parsed.args.playbook, &overrides, &options, &settings)?;
    if options.debug && !options.ask {
        writer.write_message(&invocation.render())?;
    }

    if !invocation.capture {
        return context.runner.run(&invocation);
    }

    let fact = options.fact.as_deref().unwrap_or_default();
    let captured = context.runner.capture(&invocation)?;
    let facts = extract_facts(&captured.stdout, fact).map_err(|e| {
        if captured.exit_code != 0 {
            HelperError::Process(format!(
                "{} exited with status {}",
                invocation.program, captured.exit_code
            ))
        } else {
            e
        }
    })?;
    writer.write_facts(&facts)?;
    Ok(captured.exit_code)
}

fn leading_playbook(argv: &[OsString]) -> Option<PathBuf> {
    let first = argv.get(1)?;
    if first.to_string_lossy().starts_with('-') {
        return None;
    }
    Some(PathBuf::from(first))
}

fn playbook_base_name(playbook: &Path) -> HelperResult<String> {
    playbook
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            HelperError::Usage(format!("{} is not a playbook file", playbook.display()))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_playbook() {
        let argv: Vec<OsString> = ["ansible-helper", "deploy/site.yaml", "-c"]
            .iter()
            .map(OsString::from)
            .collect();
        assert_eq!(leading_playbook(&argv), Some(PathBuf::from("deploy/site.yaml")));

        let argv: Vec<OsString> = ["ansible-helper", "-c", "site.yaml"]
            .iter()
            .map(OsString::from)
            .collect();
        assert_eq!(leading_playbook(&argv), None);
        assert_eq!(leading_playbook(&argv[..1]), None);
    }

    #[test]
    fn test_playbook_base_name() {
        assert_eq!(
            playbook_base_name(Path::new("deploy/site.yaml")).unwrap(),
            "site.yaml"
        );
        assert!(playbook_base_name(Path::new("..")).is_err());
    }
}
