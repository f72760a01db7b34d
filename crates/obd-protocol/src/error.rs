//! Protocol Engine Error Types

use thiserror::Error;

/// Errors that end a protocol engine run
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Reading from or writing to the transport failed
    #[error("Transport I/O error: {0}")]
    Transport(#[from] std::io::Error),
}
