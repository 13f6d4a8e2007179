//! Command Interpreter: the line-oriented REPL.
//!
//! ```text
//! AWAITING_LINE -> PARSED -> DISPATCHED -> RESULT_PRINTED | ERROR_PRINTED -> AWAITING_LINE
//!       |
//!       +-> SESSION_CLOSED   (quit, q, end of input)
//! ```
//!
//! Results and hints go to `out`. Driver failures go to `err` with an
//! `Error:` prefix. Commands that need a pin print `No open pin` when there is
//! none and are still attempted; the resulting [`SessionError::NoOpenPin`] is
//! only logged.

use crate::binder::BoundController;
use crate::command::{parse, Command, HELP};
use crate::error::SessionError;
use crate::session::{PinSession, SessionInfo};
use std::borrow::Cow;
use std::fmt::Display;
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

/// Printed before every line is read.
pub const PROMPT: &str = "> ";

/// Printed once after binding.
pub const BANNER: &str = "  Type 'help' for a list of commands";

const NO_OPEN_PIN: &str = "No open pin";
const PIN_NOT_STARTED: &str = "Pin not started";

/// Why the REPL stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// `quit` or `q`
    Quit,
    /// Input closed
    EndOfInput,
}

async fn say<W: AsyncWrite + Unpin>(w: &mut W, text: impl Display) -> io::Result<()> {
    w.write_all(format!("{}\n", text).as_bytes()).await
}

/// Session state plus the loop that drives it.
///
/// Field order matters: the pin is released before the controller.
#[derive(Debug)]
pub struct Interpreter {
    session: PinSession,
    controller: BoundController,
}

impl Interpreter {
    /// Start a session on `controller`.
    pub fn new(controller: BoundController, session: PinSession) -> Self {
        Self {
            session,
            controller,
        }
    }

    /// The bound controller.
    pub fn controller(&self) -> &BoundController {
        &self.controller
    }

    /// The pin session.
    pub fn session(&self) -> &PinSession {
        &self.session
    }

    /// Give the controller back, releasing the pin first.
    pub fn into_controller(self) -> BoundController {
        drop(self.session);
        self.controller
    }

    /// Read and execute lines until `quit` or end of input.
    ///
    /// Bytes that are not valid UTF-8 are replaced and the line goes through
    /// the parser like any other, so it ends up as an unrecognized command.
    pub async fn run<R, W, E>(&mut self, mut input: R, out: &mut W, err: &mut E) -> io::Result<Exit>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
        E: AsyncWrite + Unpin,
    {
        let mut buf = Vec::new();
        loop {
            out.write_all(PROMPT.as_bytes()).await?;
            out.flush().await?;

            buf.clear();
            if input.read_until(b'\n', &mut buf).await? == 0 {
                debug!("end of input");
                return Ok(Exit::EndOfInput);
            }
            let line = match String::from_utf8_lossy(&buf) {
                Cow::Borrowed(line) => Cow::Borrowed(line),
                Cow::Owned(line) => {
                    warn!(len = buf.len(), "input line is not valid UTF-8");
                    Cow::Owned(line)
                }
            };
            let line = line.trim_end_matches(['\n', '\r']);

            match parse(line) {
                Ok(None) => {}
                Ok(Some(Command::Quit)) => return Ok(Exit::Quit),
                Ok(Some(command)) => {
                    debug!(?command, "dispatching");
                    self.dispatch(command, out, err).await?;
                }
                Err(e) => say(out, e).await?,
            }
            out.flush().await?;
            err.flush().await?;
        }
    }

    /// Execute one command against the live session.
    pub async fn dispatch<W, E>(&mut self, command: Command, out: &mut W, err: &mut E) -> io::Result<()>
    where
        W: AsyncWrite + Unpin,
        E: AsyncWrite + Unpin,
    {
        match command {
            Command::Help => out.write_all(HELP.as_bytes()).await,
            Command::Quit => Ok(()),
            Command::Open(pin) => {
                let result = self.session.open(&self.controller, pin).await;
                report(result, err).await
            }
            Command::Freq(hz) => {
                let result = self.controller.set_desired_frequency(hz).await;
                report(result.map_err(SessionError::from), err).await
            }
            Command::Start => {
                self.warn_if_no_pin(out).await?;
                let result = self.session.start().await;
                report(result, err).await
            }
            Command::Stop => {
                match self.session.is_started().await {
                    Ok(None) => say(out, NO_OPEN_PIN).await?,
                    Ok(Some(false)) => say(out, PIN_NOT_STARTED).await?,
                    Ok(Some(true)) => {}
                    Err(e) => report_error(e, err).await?,
                }
                let result = self.session.stop().await;
                report(result, err).await
            }
            Command::DutyCycle(percent) => {
                self.warn_if_no_pin(out).await?;
                let result = self.session.set_duty_cycle(percent).await;
                report(result, err).await
            }
            Command::Polarity => {
                self.warn_if_no_pin(out).await?;
                match self.session.toggle_polarity().await {
                    Ok(polarity) => say(out, format!("Polarity is now {}", polarity)).await,
                    Err(e) => report_error(e, err).await,
                }
            }
            Command::Info => match self.session.info(&self.controller).await {
                Ok(info) => write_info(&info, out).await,
                Err(e) => report_error(e, err).await,
            },
        }
    }

    async fn warn_if_no_pin<W: AsyncWrite + Unpin>(&self, out: &mut W) -> io::Result<()> {
        if !self.session.has_pin() {
            say(out, NO_OPEN_PIN).await?;
        }
        Ok(())
    }
}

async fn report<T, E: AsyncWrite + Unpin>(
    result: Result<T, SessionError>,
    err: &mut E,
) -> io::Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(e) => report_error(e, err).await,
    }
}

async fn report_error<E: AsyncWrite + Unpin>(error: SessionError, err: &mut E) -> io::Result<()> {
    if let SessionError::NoOpenPin = error {
        debug!("operation attempted without an open pin");
        return Ok(());
    }
    say(err, format!("Error: {}", error)).await
}

async fn write_info<W: AsyncWrite + Unpin>(info: &SessionInfo, out: &mut W) -> io::Result<()> {
    let c = &info.controller;
    let mut text = format!(
        " ActualFrequency: {}\n    MaxFrequency: {}\n    MinFrequency: {}\n        PinCount: {}\n",
        c.actual_frequency, c.max_frequency, c.min_frequency, c.pin_count
    );
    if let Some(pin) = &info.pin {
        text.push_str(&format!(
            "                 IsStarted: {}\n                  Polarity: {}\n ActiveDutyCyclePercentage: {}\n",
            pin.is_started, pin.polarity, pin.duty_cycle_percent
        ));
    }
    out.write_all(text.as_bytes()).await
}
