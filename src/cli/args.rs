use crate::core::command::RunOptions;
use crate::core::registry::{ParameterRegistry, HELPER_ONLY_PARAMETERS};
use crate::domain::error::{HelperError, HelperResult};
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, CommandFactory, FromArgMatches, Parser, ValueEnum};
use std::ffi::OsString;
use std::path::PathBuf;

const VARIABLE_ID_PREFIX: &str = "var:";
const VARIABLE_HEADING: &str = "Playbook variables";
// Given alongside --print and --list without breaking "used alone"
const UNCOUNTED_IDS: [&str; 2] = ["playbook", "output"];

/// Command line arguments for the ansible helper
#[derive(Parser, Debug)]
#[command(
    name = "ansible-helper",
    version = env!("CARGO_PKG_VERSION"),
    about = "Run Ansible playbooks with saved and command line variables",
    long_about = "Run Ansible playbooks with saved and command line variables.\n\n\
                  Playbook variables are declared with `# var:<name>` comments in the playbook \
                  and become `--<name> <value>` options. Answers can be saved under a key and \
                  read back on later runs.",
    override_usage = "ansible-helper <PLAYBOOK> [-p | -l | -s KEY | -r KEY] [-c] [-d] [--<VARIABLE> <VALUE>]...",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct Args {
    /// Playbook to run, always the first argument
    pub playbook: PathBuf,

    /// Run the playbook in check mode
    #[arg(short = 'c', long)]
    pub check: bool,

    /// Print every accepted option and exit
    #[arg(short = 'p', long)]
    pub print: bool,

    /// Verbose playbook output and print the command before running it
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// List sessions saved for this playbook
    #[arg(short = 'l', long)]
    pub list: bool,

    /// Print help
    #[arg(short = '?', long, action = ArgAction::Help)]
    #[allow(dead_code)]
    help: Option<bool>,

    /// Prompt for a password passed as `ask_password`
    #[arg(short = 'a', long)]
    pub ask: bool,

    /// Minimal playbook output
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Ask for the vault password
    #[arg(short = 'v', long)]
    pub vault: bool,

    /// Save answers for the playbook variables under KEY
    #[arg(short = 's', long, value_name = "KEY")]
    pub save: Option<String>,

    /// Read saved answers from KEY before applying command line variables
    #[arg(short = 'r', long, value_name = "KEY")]
    pub read: Option<String>,

    /// Run against a single host instead of the inventory
    #[arg(short = 'h', long, value_name = "HOST")]
    pub host: Option<String>,

    /// Print the value of a gathered fact
    #[arg(short = 'f', long, value_name = "FACT")]
    pub fact: Option<String>,

    /// Encrypted variables file, implies --vault
    #[arg(short = 'e', long, value_name = "FILE")]
    pub cryptfile: Option<PathBuf>,

    /// Variable holding the vault password, passed as `password_var`, implies --vault
    #[arg(short = 'P', long, value_name = "NAME")]
    pub passvar: Option<String>,

    /// Output format for --print and --list
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Print version
    #[arg(short = 'V', long, action = ArgAction::Version)]
    #[allow(dead_code)]
    version: Option<bool>,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
    /// Table output
    Table,
}

/// What a run does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Print,
    List,
    Save(String),
    Run,
}

impl Args {
    pub fn mode(&self) -> Mode {
        if self.print {
            Mode::Print
        } else if self.list {
            Mode::List
        } else if let Some(key) = &self.save {
            Mode::Save(key.clone())
        } else {
            Mode::Run
        }
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            check: self.check,
            debug: self.debug,
            quiet: self.quiet,
            vault: self.vault || self.cryptfile.is_some() || self.passvar.is_some(),
            ask: self.ask,
            host: self.host.clone(),
            fact: self.fact.clone(),
            cryptfile: self.cryptfile.clone(),
        }
    }
}

/// Parsed command line
#[derive(Debug)]
pub struct ParsedArgs {
    pub args: Args,
    /// Playbook variables given on the command line, in declaration order
    pub overrides: Vec<(String, String)>,
    /// Long names of every option given on the command line
    pub explicit: Vec<String>,
}

/// The helper's parser extended with one `--<name>` option per playbook variable.
///
/// A variable named like a flag in `HELPER_ONLY_PARAMETERS` takes over its
/// long form; the flag keeps its short form.
pub fn build_command(registry: &ParameterRegistry) -> clap::Command {
    let command = HELPER_ONLY_PARAMETERS
        .iter()
        .filter(|name| registry.get(name).map_or(false, |d| d.is_variable()))
        .fold(Args::command(), |command, name| {
            command.mut_arg(*name, |arg| arg.long(None::<&'static str>))
        });

    registry
        .variables()
        .fold(command, |command, declaration| {
            command.arg(
                Arg::new(format!("{}{}", VARIABLE_ID_PREFIX, declaration.name))
                    .long(declaration.name.clone())
                    .value_name("VALUE")
                    .help(format!("Value for the playbook variable {}", declaration.name))
                    .help_heading(VARIABLE_HEADING)
                    .action(ArgAction::Set),
            )
        })
}

/// Parse `argv` (program name first) against the registry.
pub fn parse_from<I, T>(registry: &ParameterRegistry, argv: I) -> HelperResult<ParsedArgs>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let command = build_command(registry);
    let argument_ids: Vec<String> = command
        .get_arguments()
        .map(|arg| arg.get_id().as_str().to_string())
        .collect();
    let matches = command.try_get_matches_from(argv)?;
    let args = Args::from_arg_matches(&matches)?;

    let overrides = registry
        .variables()
        .filter_map(|declaration| {
            let id = format!("{}{}", VARIABLE_ID_PREFIX, declaration.name);
            matches
                .get_one::<String>(&id)
                .map(|value| (declaration.name.clone(), value.clone()))
        })
        .collect();

    let explicit = explicit_options(&matches, &argument_ids);
    let parsed = ParsedArgs {
        args,
        overrides,
        explicit,
    };
    parsed.check_standalone()?;
    Ok(parsed)
}

/// Options given on the command line. Group ids such as the derived `Args`
/// group are reported by `ids()` too and are left out.
fn explicit_options(matches: &ArgMatches, argument_ids: &[String]) -> Vec<String> {
    matches
        .ids()
        .map(|id| id.as_str())
        .filter(|id| argument_ids.iter().any(|a| a == id))
        .filter(|id| !UNCOUNTED_IDS.contains(id))
        .filter(|id| matches.value_source(id) == Some(ValueSource::CommandLine))
        .map(|id| id.trim_start_matches(VARIABLE_ID_PREFIX).to_string())
        .collect()
}

impl ParsedArgs {
    /// `--print`, `--list` and `--save` can not be combined with other options.
    fn check_standalone(&self) -> HelperResult<()> {
        if self.explicit.len() <= 1 {
            return Ok(());
        }

        let standalone = [("print", "Print"), ("list", "List"), ("save", "Save")];
        for (name, label) in standalone {
            if self.explicit.iter().any(|e| e == name) {
                return Err(HelperError::Usage(format!(
                    "{} option can not be combined with other options",
                    label
                )));
            }
        }
        Ok(())
    }
}
