//! Signal Sources
//!
//! Background producers that keep the emulator's signal store current.
//! Exactly one runs per session, selected by the configured [`SourceMode`]:
//! a fixed operating point, a CSV drive recording, or a live vehicle
//! telemetry API.

mod error;
mod live_api;
mod replay;
mod static_source;
mod worker;

pub use error::SourceError;
pub use live_api::{diagnostics_update, LiveApiConfig, LiveApiSource};
pub use replay::{ReplayConfig, ReplaySource};
pub use static_source::{ConfigValue, StaticConfig, StaticSource};
pub use worker::{SourceMode, SourceWorker};

use std::time::Duration;

/// Convert a configured number of seconds into a [`Duration`], falling
/// back to `default` for negative, zero or non-finite input.
pub(crate) fn interval_from_secs(secs: f64, default: Duration) -> Duration {
    match Duration::try_from_secs_f64(secs) {
        Ok(interval) if !interval.is_zero() => interval,
        _ => default,
    }
}
