//! Sketchnet headless editor.
//!
//! Reads gesture commands (`press`, `drag`, `release`, ...) from a terminal,
//! turns them into protocol lines through the shared tools, and keeps a local
//! mirror of the canvas up to date from the server's broadcasts.

pub mod commands;
pub mod session;

use std::io::{self, BufRead, Write};
use std::time::{Duration, Instant};

use clap::Parser;
use sketchnet_core::{ConnectionError, NativeConnection, SyncEvent};
use thiserror::Error;

pub use commands::{Command, CommandError, CommandRegistry};
pub use session::{Reply, Session};

/// How long to wait for the server's echo after sending edits.
const ECHO_WAIT: Duration = Duration::from_millis(150);

/// Upper bound on one wait, so steady traffic from other editors cannot keep
/// the shell away from its input.
const PUMP_LIMIT: Duration = Duration::from_secs(1);

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "sketchnet", version, about = "Shared canvas editor shell")]
pub struct ClientConfig {
    /// Relay server address (host:port).
    #[arg(long, env = "SKETCHNET_SERVER", default_value = "127.0.0.1:4242")]
    pub server: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: "127.0.0.1:4242".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("server closed the connection")]
    ServerClosed,
}

/// Connect and run the shell until `quit`, end of input, or disconnect.
pub fn run(
    config: &ClientConfig,
    input: impl BufRead,
    mut output: impl Write,
) -> Result<(), ClientError> {
    let mut connection = NativeConnection::new();
    connection.connect(&config.server)?;
    let mut session = Session::new();

    writeln!(output, "Connected to {} (type `help`)", config.server)?;
    // Let the snapshot arrive before the first prompt
    pump(&mut connection, &mut session, ECHO_WAIT, &mut output)?;

    for line in input.lines() {
        let line = line?;
        pump(&mut connection, &mut session, Duration::ZERO, &mut output)?;

        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                writeln!(output, "error: {e}")?;
                continue;
            }
        };

        match session.execute(command) {
            Reply::Silent => {}
            Reply::Text(text) => writeln!(output, "{text}")?,
            Reply::Quit => break,
        }

        let outgoing = session.take_outgoing();
        for line in &outgoing {
            connection.send(line)?;
        }
        if !outgoing.is_empty() {
            pump(&mut connection, &mut session, ECHO_WAIT, &mut output)?;
        }
    }

    connection.disconnect();
    Ok(())
}

/// Apply server events to the session.
///
/// With a non-zero `wait`, keeps reading until the connection has been quiet
/// for that long or [`PUMP_LIMIT`] has passed; otherwise only drains what is
/// already queued.
fn pump(
    connection: &mut NativeConnection,
    session: &mut Session,
    wait: Duration,
    output: &mut impl Write,
) -> Result<(), ClientError> {
    for event in connection.poll_events() {
        apply_event(event, session, output)?;
    }
    if wait.is_zero() {
        return Ok(());
    }

    let deadline = Instant::now() + PUMP_LIMIT;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            log::debug!("Still receiving after {PUMP_LIMIT:?}, returning to the prompt");
            return Ok(());
        }
        match connection.wait_event(wait.min(remaining)) {
            Some(event) => apply_event(event, session, output)?,
            None => return Ok(()),
        }
    }
}

fn apply_event(
    event: SyncEvent,
    session: &mut Session,
    output: &mut impl Write,
) -> Result<(), ClientError> {
    match event {
        SyncEvent::Connected => log::debug!("Connection established"),
        SyncEvent::Line(line) => match session.apply_server_line(&line) {
            Ok(event) => log::debug!("{event:?}"),
            // One bad line does not invalidate the rest of the mirror
            Err(e) => writeln!(output, "ignored server line {line:?}: {e}")?,
        },
        SyncEvent::Disconnected => return Err(ClientError::ServerClosed),
        SyncEvent::Error { message } => {
            log::error!("Connection error: {message}");
            return Err(ClientError::ServerClosed);
        }
    }
    Ok(())
}
