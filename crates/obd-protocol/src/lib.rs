//! ELM327 Protocol Engine
//!
//! Turns the raw byte stream from an emulated adapter's transport into
//! carriage-return terminated commands and answers each one the way an
//! ELM327 does, reading live values from a shared [`signal_store::SignalStore`].

mod command;
mod engine;
mod error;
mod framer;

pub use command::Command;
pub use engine::{EngineConfig, ProtocolEngine};
pub use error::ProtocolError;
pub use framer::LineFramer;

/// Appended to every response: two carriage returns and the ready prompt
pub const RESPONSE_TERMINATOR: &str = "\r\r>";

/// Adapter identity reported for `ATZ` / `ATI`
pub const DEFAULT_IDENTITY: &str = "ELM327 v1.5";

/// OBD-II mode constants
pub mod mode {
    /// Current data request prefix
    pub const CURRENT_DATA: &str = "01";
    /// Positive response header for current data
    pub const CURRENT_DATA_RESPONSE: &str = "41";
}
