//! CLI Entry Point for pwmtool
//!
//! ```bash
//! # List controllers
//! pwmtool -list
//!
//! # Bind the controller named PWM1 and start the REPL
//! pwmtool PWM1
//!
//! # Try it without hardware
//! pwmtool --backend mock PWM1
//! ```

use anyhow::{Context, Result};
use pwm_tool::cli::{self, Action, Cli};
use pwm_tool::config::Config;
use pwm_tool::{app, backend, logging};
use std::process::ExitCode;
use tokio::io::BufReader;

fn program_name() -> String {
    std::env::args()
        .next()
        .as_deref()
        .map(std::path::Path::new)
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "pwmtool".to_string())
}

/// Load, override and validate configuration, then start logging.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    config.validate()?;

    logging::init_from_config(&config).map_err(anyhow::Error::msg)?;
    tracing::debug!(?config, "configuration loaded");
    Ok(config)
}

#[tokio::main]
async fn main() -> ExitCode {
    let program = program_name();
    let usage = cli::usage(&program);

    let cli = match cli::parse_args(std::env::args()) {
        Ok(cli) => cli,
        Err(e) => {
            let code = app::reject_args(
                &e,
                &usage,
                &mut tokio::io::stdout(),
                &mut tokio::io::stderr(),
            )
            .await;
            return ExitCode::from(code);
        }
    };

    let action = cli.action();
    if action == Action::Usage {
        print!("{}", usage);
        return ExitCode::SUCCESS;
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::from(app::EXIT_FAILURE);
        }
    };

    let provider = backend::build_provider(&config);
    let code = app::run(
        action,
        &usage,
        provider.as_ref(),
        BufReader::new(tokio::io::stdin()),
        &mut tokio::io::stdout(),
        &mut tokio::io::stderr(),
    )
    .await;

    ExitCode::from(code)
}
