//! Cooperative Shutdown Flag

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared running/stopped flag observed by every execution path of a session
#[derive(Debug, Clone)]
pub struct RunFlag {
    running: Arc<AtomicBool>,
}

impl RunFlag {
    /// Create a flag in the running state
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Whether the session should keep going
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Ask every holder of this flag to stop
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }
}

impl Default for RunFlag {
    fn default() -> Self {
        Self::new()
    }
}
