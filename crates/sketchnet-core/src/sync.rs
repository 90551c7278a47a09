//! Client transport: a newline-delimited TCP stream to the relay server.

use std::io::{self, BufRead, BufReader, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, channel};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use thiserror::Error;

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
    Error,
}

/// Events from the reader thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// Connected to server
    Connected,
    /// One protocol line from the server, without its terminator
    Line(String),
    /// Server closed the stream
    Disconnected,
    /// Read failed
    Error { message: String },
}

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("already connected")]
    AlreadyConnected,
    #[error("not connected")]
    NotConnected,
    #[error("line contains a newline")]
    EmbeddedNewline,
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// TCP connection for native platforms.
///
/// Reads happen on a background thread; events are collected with
/// [`NativeConnection::poll_events`] without blocking.
pub struct NativeConnection {
    state: ConnectionState,
    stream: Option<TcpStream>,
    /// Channel to receive events from the reader thread.
    event_rx: Option<Receiver<SyncEvent>>,
    _thread: Option<JoinHandle<()>>,
}

impl NativeConnection {
    /// Create a new disconnected client.
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            stream: None,
            event_rx: None,
            _thread: None,
        }
    }

    /// Connect to `addr` (host:port) and start reading.
    pub fn connect(&mut self, addr: &str) -> Result<(), ConnectionError> {
        if self.stream.is_some() {
            return Err(ConnectionError::AlreadyConnected);
        }

        let stream = TcpStream::connect(addr).map_err(|source| ConnectionError::Connect {
            addr: addr.to_string(),
            source,
        })?;
        stream.set_nodelay(true)?;
        let reader = stream.try_clone()?;
        log::info!("Connected to {addr}");

        let (event_tx, event_rx) = channel::<SyncEvent>();
        let _ = event_tx.send(SyncEvent::Connected);
        let handle = thread::spawn(move || read_loop(reader, event_tx));

        self.stream = Some(stream);
        self.event_rx = Some(event_rx);
        self._thread = Some(handle);
        Ok(())
    }

    /// Close the connection. Safe to call when already disconnected.
    pub fn disconnect(&mut self) {
        if let Some(stream) = self.stream.take() {
            // Unblocks the reader thread
            let _ = stream.shutdown(Shutdown::Both);
            log::info!("Disconnected");
        }
        self.event_rx = None;
        self._thread = None;
        self.state = ConnectionState::Disconnected;
    }

    /// Send one protocol line. The terminator is appended here.
    pub fn send(&self, line: &str) -> Result<(), ConnectionError> {
        let Some(stream) = &self.stream else {
            return Err(ConnectionError::NotConnected);
        };
        if line.contains('\n') {
            return Err(ConnectionError::EmbeddedNewline);
        }
        log::debug!("Sending: {line}");
        let mut writer = stream;
        writer.write_all(format!("{line}\n").as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// Poll for pending events (non-blocking).
    pub fn poll_events(&mut self) -> Vec<SyncEvent> {
        let mut events = Vec::new();
        if let Some(rx) = &self.event_rx {
            while let Ok(event) = rx.try_recv() {
                events.push(event);
            }
        }
        for event in &events {
            self.track(event);
        }
        events
    }

    /// Wait up to `timeout` for the next event.
    ///
    /// `Disconnected` or `Error` is reported once; after that the reader is
    /// gone and this returns `None` immediately.
    pub fn wait_event(&mut self, timeout: Duration) -> Option<SyncEvent> {
        let event = match self.event_rx.as_ref()?.recv_timeout(timeout) {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) => return None,
            Err(RecvTimeoutError::Disconnected) => {
                // Reader thread exited without saying why
                self.event_rx = None;
                if self.state != ConnectionState::Connected {
                    return None;
                }
                SyncEvent::Disconnected
            }
        };
        self.track(&event);
        Some(event)
    }

    fn track(&mut self, event: &SyncEvent) {
        match event {
            SyncEvent::Connected => self.state = ConnectionState::Connected,
            SyncEvent::Disconnected => {
                self.state = ConnectionState::Disconnected;
                self.event_rx = None;
            }
            SyncEvent::Error { .. } => {
                self.state = ConnectionState::Error;
                self.event_rx = None;
            }
            SyncEvent::Line(_) => {}
        }
    }

    /// Get current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Check if connected.
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }
}

impl Default for NativeConnection {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for NativeConnection {
    fn drop(&mut self) {
        self.disconnect();
    }
}

fn read_loop(stream: TcpStream, events: Sender<SyncEvent>) {
    let reader = BufReader::new(stream);
    for line in reader.lines() {
        let event = match line {
            Ok(line) => {
                log::debug!("Received: {line}");
                SyncEvent::Line(line)
            }
            Err(e) => {
                log::error!("Read error: {e}");
                let _ = events.send(SyncEvent::Error {
                    message: e.to_string(),
                });
                return;
            }
        };
        if events.send(event).is_err() {
            // Connection handle dropped
            return;
        }
    }
    log::info!("Server closed the connection");
    let _ = events.send(SyncEvent::Disconnected);
}
