//! Shared Signal Store Implementation

use crate::pid;
use crate::signal::{Signal, SignalSnapshot, SignalUpdate};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

/// Thread-safe table of the vehicle's current signal values.
///
/// Cloning is cheap and every clone refers to the same table. The whole
/// [`SignalSnapshot`] sits behind one lock, so readers always observe a
/// complete update or none of it.
#[derive(Debug, Clone, Default)]
pub struct SignalStore {
    inner: Arc<RwLock<SignalSnapshot>>,
}

impl SignalStore {
    /// Create a store holding the default parked-vehicle values
    pub fn new() -> Self {
        Self::with_snapshot(SignalSnapshot::default())
    }

    /// Create a store seeded with the given values
    pub fn with_snapshot(snapshot: SignalSnapshot) -> Self {
        info!("Creating signal store: {:?}", snapshot);
        Self {
            inner: Arc::new(RwLock::new(snapshot)),
        }
    }

    /// Apply a partial update. Absent signals keep their previous value.
    pub fn update(&self, update: &SignalUpdate) {
        if update.is_empty() {
            return;
        }
        let mut snapshot = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        snapshot.apply(update);
        debug!("Signal store updated ({} signals)", update.len());
    }

    /// Copy of all current values
    pub fn snapshot(&self) -> SignalSnapshot {
        *self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current value of one signal
    pub fn get(&self, signal: Signal) -> f64 {
        self.snapshot().get(signal)
    }

    /// Encode a Mode 01 PID against the current values.
    ///
    /// Returns `None` ("no data") when the PID is not in the table.
    pub fn encode(&self, pid: &str) -> Option<Vec<u8>> {
        let entry = pid::lookup(pid)?;
        Some(entry.encode(&self.snapshot()))
    }
}
