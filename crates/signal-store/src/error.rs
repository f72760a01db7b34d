//! Signal Store Error Types

use thiserror::Error;

/// Errors raised while resolving signal names
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignalError {
    /// Name does not match any of the fixed signals
    #[error("Unknown signal name: {0}")]
    UnknownSignal(String),
}
