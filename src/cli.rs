//! Command line handling.
//!
//! The tool accepts the traditional switches `-h`, `-?`, `/h`, `/?` and
//! `-l`, `-list` (all case-insensitive) next to the usual `--help` and
//! `--list`. Traditional forms are rewritten before clap sees them.

use crate::config::BackendKind;
use clap::Parser;
use std::path::PathBuf;

/// Printed when the tool runs without any argument.
pub const MISSING_ARGUMENT: &str = "Missing required command line parameter";

/// Usage text with examples for program name `name`.
pub fn usage(name: &str) -> String {
    format!(
        "pwmtool: Command line pwm testing utility
Usage: {name} [-list] [FriendlyName]

  -list          List available PWM controllers and exit.
  FriendlyName   The friendly name of the PWM controller over
                 which you wish to communicate. This parameter is
                 optional and defaults to the first enumerated
                 PWM controller.

Options:
  --config PATH      Configuration file (default: ./pwmtool.toml if present)
  --backend NAME     Driver backend: sysfs or mock

Examples:
  List available PWM controllers and exit:
    {name} -list

  Open connection to PWM1:
    {name} PWM1
"
    )
}

/// Parsed command line.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "pwmtool")]
#[command(about = "Interactive PWM controller test utility", long_about = None)]
#[command(disable_help_flag = true)]
pub struct Cli {
    /// Print usage and exit
    #[arg(long)]
    pub help: bool,

    /// List available PWM controllers and exit
    #[arg(short = 'l', long)]
    pub list: bool,

    /// Configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Driver backend, overriding the configuration
    #[arg(long, value_enum)]
    pub backend: Option<BackendKind>,

    /// Friendly name of the controller to bind
    #[arg(value_name = "FriendlyName")]
    pub friendly_name: Option<String>,
}

/// What the process should do.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Print usage, exit 0
    Usage,
    /// Run the inventory reporter, exit 0
    List,
    /// Bind a controller and run the REPL
    Interactive {
        /// Filter for the controller to bind; `None` binds the first
        friendly_name: Option<String>,
    },
}

impl Cli {
    /// `--help` wins over `--list`, which wins over a friendly name.
    pub fn action(&self) -> Action {
        if self.help {
            Action::Usage
        } else if self.list {
            Action::List
        } else {
            Action::Interactive {
                friendly_name: self.friendly_name.clone(),
            }
        }
    }
}

/// Why the command line was rejected.
#[derive(Debug)]
pub enum ArgsError {
    /// No argument at all
    Missing,
    /// Clap rejected the arguments
    Invalid(clap::Error),
}

/// Rewrite a traditional switch into its clap spelling.
fn normalize(arg: String) -> String {
    match arg.to_ascii_lowercase().as_str() {
        "-h" | "/h" | "-?" | "/?" => "--help".to_string(),
        "-l" | "-list" => "--list".to_string(),
        _ => arg,
    }
}

/// Parse the full argv, program name included.
pub fn parse_args<I>(args: I) -> Result<Cli, ArgsError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let program = args.next().unwrap_or_else(|| "pwmtool".to_string());
    let rest: Vec<String> = args.map(normalize).collect();

    if rest.is_empty() {
        return Err(ArgsError::Missing);
    }

    Cli::try_parse_from(std::iter::once(program).chain(rest)).map_err(ArgsError::Invalid)
}
