//! REPL command grammar.
//!
//! One command per line, whitespace separated, matched case-sensitively.
//! Tokens after the expected argument are ignored.

use crate::error::CommandError;

/// Shown for `help`.
pub const HELP: &str = "\
Commands:
 > freq N                           Set controller frequency (Hz)
 > open N                           Open pin N
 > start                            start PWM
 > stop                             stop PWM
 > dutycycle N                      set duty cycle percentage to N
 > polarity                         toggle polarity
 > info                             Display device information
 > help                             Display this help message
 > quit                             Quit

";

const EXPECT_INTEGER: &str = "Expecting integer. e.g: open 0";
const EXPECT_FLOAT: &str = "Expecting float.";

/// A parsed REPL command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// `help`, `h`
    Help,
    /// `quit`, `q`
    Quit,
    /// `open N`: open pin N, replacing any open pin
    Open(u32),
    /// `freq N`: controller frequency in Hz
    Freq(f64),
    /// `start`
    Start,
    /// `stop`
    Stop,
    /// `dutycycle N`: duty cycle in percent
    DutyCycle(f64),
    /// `polarity`: toggle
    Polarity,
    /// `info`
    Info,
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    let mut tokens = line.split_whitespace();
    let Some(word) = tokens.next() else {
        return Ok(None);
    };
    let arg = tokens.next();

    let command = match word {
        "h" | "help" => Command::Help,
        "q" | "quit" => Command::Quit,
        "open" => Command::Open(number(arg, EXPECT_INTEGER)?),
        "freq" => Command::Freq(number(arg, EXPECT_FLOAT)?),
        "start" => Command::Start,
        "stop" => Command::Stop,
        "dutycycle" => Command::DutyCycle(number(arg, EXPECT_FLOAT)?),
        "polarity" => Command::Polarity,
        "info" => Command::Info,
        other => return Err(CommandError::Unrecognized(other.to_string())),
    };
    Ok(Some(command))
}

fn number<T: std::str::FromStr>(arg: Option<&str>, hint: &'static str) -> Result<T, CommandError> {
    arg.and_then(|a| a.parse().ok())
        .ok_or(CommandError::ArgumentFormat { hint })
}
