//! Carriage-Return Line Framing

use tracing::warn;

/// Default cap on bytes buffered without a terminator
pub const DEFAULT_MAX_LINE: usize = 256;

/// Reassembles `\r`-terminated command lines from arbitrary byte chunks
#[derive(Debug)]
pub struct LineFramer {
    /// Bytes received since the last terminator
    buffer: Vec<u8>,
    /// Maximum number of buffered bytes before the partial line is dropped
    max_line: usize,
}

impl LineFramer {
    /// Create a framer with the default line cap
    pub fn new() -> Self {
        Self::with_max_line(DEFAULT_MAX_LINE)
    }

    /// Create a framer with a custom line cap
    pub fn with_max_line(max_line: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(max_line.min(DEFAULT_MAX_LINE)),
            max_line,
        }
    }

    /// Feed received bytes and return every line they complete, in order.
    /// The terminator itself is not included.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        for &byte in bytes {
            if byte == b'\r' {
                lines.push(String::from_utf8_lossy(&self.buffer).into_owned());
                self.buffer.clear();
                continue;
            }

            if self.buffer.len() >= self.max_line {
                warn!(
                    "Discarding {} buffered bytes without a carriage return",
                    self.buffer.len()
                );
                self.buffer.clear();
            }
            self.buffer.push(byte);
        }
        lines
    }

    /// Bytes of the incomplete line currently buffered
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Drop any incomplete line, returning how many bytes were discarded
    pub fn discard(&mut self) -> usize {
        let dropped = self.buffer.len();
        self.buffer.clear();
        dropped
    }
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new()
    }
}
