//! Vehicle Signal Store
//!
//! Holds the emulated vehicle's current physical signal values and the
//! Mode 01 PID table that encodes them into ELM327 response bytes, plus
//! the shutdown flag shared by every execution path of a session.

mod error;
mod pid;
mod run_flag;
mod signal;
mod store;

pub use error::SignalError;
pub use pid::{format_hex, lookup, Encoder, PidEntry, PID_TABLE, SUPPORTED_PIDS_01_20};
pub use run_flag::RunFlag;
pub use signal::{coerce_value, Signal, SignalSnapshot, SignalUpdate};
pub use store::SignalStore;
