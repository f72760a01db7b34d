//! Emulator Error Types

use obd_protocol::ProtocolError;
use signal_source::SourceError;
use thiserror::Error;

/// Errors that end an emulator run
#[derive(Debug, Error)]
pub enum EmulatorError {
    /// Configuration could not be loaded or deserialized
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Serial port could not be opened
    #[error("Failed to open serial port {port} at {baudrate} baud: {source}")]
    TransportOpen {
        port: String,
        baudrate: u32,
        #[source]
        source: tokio_serial::Error,
    },

    /// Source worker could not be created
    #[error("Signal source error: {0}")]
    Source(#[from] SourceError),

    /// Protocol loop failed on transport I/O
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Global tracing subscriber could not be installed
    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}
