//! Process-level flow: list mode or bind-then-REPL.

use crate::binder::bind;
use crate::cli::{Action, ArgsError, MISSING_ARGUMENT};
use crate::interpreter::{Interpreter, BANNER};
use crate::inventory::list_controllers;
use crate::session::PinSession;
use pwm_core::PwmProvider;
use std::fmt::Display;
use tokio::io::{AsyncBufRead, AsyncWrite, AsyncWriteExt};
use tracing::{error, info};

/// Exit code for success and clean quit.
pub const EXIT_OK: u8 = 0;
/// Exit code for startup failures.
pub const EXIT_FAILURE: u8 = 1;

async fn fail<E: AsyncWrite + Unpin>(err: &mut E, message: impl Display) -> u8 {
    let _ = err
        .write_all(format!("Error: {}\n", message).as_bytes())
        .await;
    let _ = err.flush().await;
    EXIT_FAILURE
}

/// Report a rejected command line: the reason on `err`, then `usage` on `out`.
pub async fn reject_args<W, E>(error: &ArgsError, usage: &str, out: &mut W, err: &mut E) -> u8
where
    W: AsyncWrite + Unpin,
    E: AsyncWrite + Unpin,
{
    let reason = match error {
        ArgsError::Missing => format!("{}\n\n", MISSING_ARGUMENT),
        ArgsError::Invalid(e) => format!("{}\n", e.to_string().trim_end()),
    };
    let _ = err.write_all(reason.as_bytes()).await;
    let _ = err.flush().await;
    let _ = out.write_all(usage.as_bytes()).await;
    let _ = out.flush().await;
    EXIT_FAILURE
}

/// Run `action` against `provider` and return the process exit code.
///
/// `usage` is printed for [`Action::Usage`].
pub async fn run<R, W, E>(
    action: Action,
    usage: &str,
    provider: &dyn PwmProvider,
    input: R,
    out: &mut W,
    err: &mut E,
) -> u8
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    E: AsyncWrite + Unpin,
{
    match action {
        Action::Usage => match out.write_all(usage.as_bytes()).await {
            Ok(()) => EXIT_OK,
            Err(e) => fail(err, e).await,
        },
        Action::List => match list_controllers(provider, out).await {
            Ok(entries) => {
                info!(count = entries.len(), "inventory complete");
                EXIT_OK
            }
            Err(e) => {
                error!(error = %e, "inventory failed");
                fail(err, e).await
            }
        },
        Action::Interactive { friendly_name } => {
            let controller = match bind(provider, friendly_name.as_deref()).await {
                Ok(controller) => controller,
                Err(e) => {
                    error!(error = %e, "bind failed");
                    return fail(err, e).await;
                }
            };

            if let Err(e) = out.write_all(format!("{}\n", BANNER).as_bytes()).await {
                return fail(err, e).await;
            }

            let mut interpreter = Interpreter::new(controller, PinSession::new());
            match interpreter.run(input, out, err).await {
                Ok(exit) => {
                    info!(?exit, "session closed");
                    EXIT_OK
                }
                Err(e) => fail(err, e).await,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::parse_args;
    use pwm_driver_mock::{MockControllerConfig, MockProvider};

    async fn run_mock(action: Action, provider: &MockProvider, input: &str) -> (u8, String, String) {
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let code = run(action, "usage\n", provider, input.as_bytes(), &mut out, &mut err).await;
        (
            code,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_usage() {
        let (code, out, _) = run_mock(Action::Usage, &MockProvider::empty(), "").await;
        assert_eq!(code, EXIT_OK);
        assert_eq!(out, "usage\n");
    }

    #[tokio::test]
    async fn test_banner_then_prompt() {
        let provider = MockProvider::new(vec![MockControllerConfig::new("mock0", "PWM1")]);
        let action = Action::Interactive {
            friendly_name: None,
        };
        let (code, out, err) = run_mock(action, &provider, "quit\n").await;
        assert_eq!(code, EXIT_OK);
        assert_eq!(out, "  Type 'help' for a list of commands\n> ");
        assert!(err.is_empty());
        assert!(!provider.is_claimed("mock0"));
    }

    #[tokio::test]
    async fn test_bind_failure_exits_one() {
        let action = Action::Interactive {
            friendly_name: Some("PWM1".into()),
        };
        let (code, out, err) = run_mock(action, &MockProvider::empty(), "").await;
        assert_eq!(code, EXIT_FAILURE);
        assert!(out.is_empty());
        assert_eq!(err, "Error: pwm controller not found\n");
    }

    #[tokio::test]
    async fn test_rejected_arguments_print_usage() {
        let error = parse_args(["pwmtool", "--bogus"].map(String::from)).unwrap_err();
        let (mut out, mut err) = (Vec::new(), Vec::new());

        let code = reject_args(&error, "usage\n", &mut out, &mut err).await;
        assert_eq!(code, EXIT_FAILURE);
        assert_eq!(String::from_utf8(out).unwrap(), "usage\n");
        assert!(String::from_utf8(err).unwrap().contains("--bogus"));
    }

    #[tokio::test]
    async fn test_missing_argument_prints_usage() {
        let error = parse_args(["pwmtool".to_string()]).unwrap_err();
        let (mut out, mut err) = (Vec::new(), Vec::new());

        let code = reject_args(&error, "usage\n", &mut out, &mut err).await;
        assert_eq!(code, EXIT_FAILURE);
        assert_eq!(String::from_utf8(out).unwrap(), "usage\n");
        assert_eq!(
            String::from_utf8(err).unwrap(),
            "Missing required command line parameter\n\n"
        );
    }
}
