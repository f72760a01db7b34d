//! Protocol Engine Implementation
//!
//! Read-dispatch-write loop of the emulated adapter. The engine never
//! waits for a particular command: it polls the transport for bytes,
//! frames them into lines, and answers every line it completes.

use crate::command::Command;
use crate::error::ProtocolError;
use crate::framer::LineFramer;
use crate::{mode, DEFAULT_IDENTITY, RESPONSE_TERMINATOR};
use signal_store::{format_hex, RunFlag, Signal, SignalStore};
use std::io::ErrorKind;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

/// Default pause between transport polls
const DEFAULT_POLL_INTERVAL_MS: u64 = 1;

/// Bytes read from the transport per poll
const READ_CHUNK: usize = 256;

/// Protocol engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How long a single transport poll waits for bytes
    pub poll_interval: Duration,
    /// Identity string reported for `ATZ` and `ATI`
    pub identity: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            identity: DEFAULT_IDENTITY.to_string(),
        }
    }
}

/// ELM327 command interpreter bound to a signal store
pub struct ProtocolEngine {
    /// Source of live values for PID responses
    store: SignalStore,
    /// Configuration
    config: EngineConfig,
    /// Receive-side line assembly
    framer: LineFramer,
    /// Number of commands answered so far
    commands_served: u64,
}

impl ProtocolEngine {
    /// Create a new engine reading from `store`
    pub fn new(store: SignalStore, config: EngineConfig) -> Self {
        Self {
            store,
            config,
            framer: LineFramer::new(),
            commands_served: 0,
        }
    }

    /// Number of commands answered so far
    pub fn commands_served(&self) -> u64 {
        self.commands_served
    }

    /// Answer a single command line, terminator included
    pub fn respond(&self, line: &str) -> String {
        let command = Command::parse(line);
        let body = match &command {
            Command::At(text) => self.at_response(text),
            Command::CurrentData(pid) => self.current_data_response(pid),
            Command::Other(_) => {
                debug!("Unrecognized command {:?}, answering OK", command.as_str());
                "OK".to_string()
            }
        };
        format!("{body}{RESPONSE_TERMINATOR}")
    }

    /// Feed raw transport bytes and return the bytes to write back
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        for line in self.framer.push(bytes) {
            debug!("RX: {}", line.escape_debug());
            let response = self.respond(&line);
            debug!("TX: {}", response.escape_debug());
            out.extend_from_slice(response.as_bytes());
            self.commands_served += 1;
        }
        out
    }

    fn at_response(&self, command: &str) -> String {
        match command {
            "ATZ" | "ATI" => self.config.identity.clone(),
            "ATRV" => format!("{:.1}V", self.store.get(Signal::Voltage)),
            "ATE0" | "ATL0" | "ATS0" | "ATH0" | "ATSP0" => "OK".to_string(),
            _ => {
                debug!("Unhandled AT command {}, answering OK", command);
                "OK".to_string()
            }
        }
    }

    fn current_data_response(&self, pid: &str) -> String {
        match self.store.encode(pid) {
            // a successful lookup means pid is the four ASCII hex digits of a table entry
            Some(data) => format!(
                "{} {} {}",
                mode::CURRENT_DATA_RESPONSE,
                &pid[2..],
                format_hex(&data)
            ),
            None => "NO DATA".to_string(),
        }
    }

    /// Serve commands from `transport` until `running` is cleared or the
    /// transport reaches end of stream.
    pub async fn run<T>(
        &mut self,
        transport: &mut T,
        running: &RunFlag,
    ) -> Result<(), ProtocolError>
    where
        T: AsyncRead + AsyncWrite + Unpin,
    {
        info!(
            "Protocol engine started (poll interval {:?})",
            self.config.poll_interval
        );
        let mut chunk = [0u8; READ_CHUNK];

        while running.is_running() {
            let read =
                tokio::time::timeout(self.config.poll_interval, transport.read(&mut chunk)).await;
            let n = match read {
                // nothing arrived this interval
                Err(_) => continue,
                Ok(Ok(0)) => {
                    info!("Transport reached end of stream");
                    break;
                }
                Ok(Ok(n)) => n,
                Ok(Err(e))
                    if matches!(e.kind(), ErrorKind::Interrupted | ErrorKind::WouldBlock) =>
                {
                    continue
                }
                Ok(Err(e)) => return Err(e.into()),
            };

            let response = self.feed(&chunk[..n]);
            if !response.is_empty() {
                transport.write_all(&response).await?;
                transport.flush().await?;
            }
        }

        let dropped = self.framer.discard();
        if dropped > 0 {
            warn!("Discarded {} bytes of an incomplete command", dropped);
        }
        info!(
            "Protocol engine stopped after {} commands",
            self.commands_served
        );
        Ok(())
    }
}
