//! CSV Drive Replay Source
//!
//! Replays a recorded drive row by row at a fixed pace. Pacing always comes
//! from the configured interval; timestamp columns in the file are ignored.

use crate::error::SourceError;
use crate::interval_from_secs;
use csv::{ByteRecord, ReaderBuilder, Trim};
use serde::{Deserialize, Serialize};
use signal_store::{coerce_value, RunFlag, Signal, SignalStore, SignalUpdate};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default pause between rows
const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);

fn default_interval_secs() -> f64 {
    DEFAULT_INTERVAL.as_secs_f64()
}

fn default_loop() -> bool {
    true
}

/// Replay mode configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Recorded telemetry file
    pub csv_file: PathBuf,
    /// Seconds between rows (default 0.1)
    #[serde(default = "default_interval_secs")]
    pub interval: f64,
    /// Restart from the first row after the last one
    #[serde(rename = "loop", default = "default_loop")]
    pub looping: bool,
    /// Signal name -> CSV column name. Signals without an entry are read
    /// from a column with the signal's own name.
    #[serde(default)]
    pub mapping: BTreeMap<String, String>,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            csv_file: PathBuf::from("data/drive.csv"),
            interval: default_interval_secs(),
            looping: default_loop(),
            mapping: BTreeMap::new(),
        }
    }
}

impl ReplayConfig {
    /// Resolve the mapping into (signal, column name) pairs
    pub fn columns(&self) -> Vec<(Signal, String)> {
        for name in self.mapping.keys() {
            if name.parse::<Signal>().is_err() {
                warn!("Ignoring replay mapping for unknown signal '{}'", name);
            }
        }

        Signal::ALL
            .into_iter()
            .map(|signal| {
                let column = self
                    .mapping
                    .iter()
                    .find(|(name, _)| name.parse::<Signal>() == Ok(signal))
                    .map(|(_, column)| column.clone())
                    .unwrap_or_else(|| signal.name().to_string());
                (signal, column)
            })
            .collect()
    }
}

/// Parse CSV text into one partial update per data row.
///
/// A field that is missing, empty, not UTF-8, or not numeric is left out
/// of that row's update; rows the reader cannot split at all are skipped.
pub(crate) fn parse_rows(
    data: &[u8],
    columns: &[(Signal, String)],
) -> Result<Vec<SignalUpdate>, SourceError> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(data);

    let headers = reader.byte_headers()?.clone();
    let indices: Vec<(Signal, Option<usize>)> = columns
        .iter()
        .map(|(signal, column)| {
            let index = headers.iter().position(|h| h == column.as_bytes());
            if index.is_none() {
                warn!("Replay file has no column '{}' for {}", column, signal);
            }
            (*signal, index)
        })
        .collect();

    let mut rows = Vec::new();
    let mut record = ByteRecord::new();
    let mut line = 1u64;
    loop {
        line += 1;
        match reader.read_byte_record(&mut record) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                warn!("Skipping unreadable replay row {}: {}", line, e);
                continue;
            }
        }

        let update: SignalUpdate = indices
            .iter()
            .map(|(signal, index)| {
                let value = index
                    .and_then(|i| record.get(i))
                    .and_then(|field| std::str::from_utf8(field).ok())
                    .and_then(coerce_value);
                (*signal, value)
            })
            .collect();
        rows.push(update);
    }

    Ok(rows)
}

/// Replays CSV rows into the signal store
#[derive(Debug, Clone)]
pub struct ReplaySource {
    /// Configuration
    config: ReplayConfig,
    /// Pause between rows
    interval: Duration,
}

impl ReplaySource {
    /// Create a replay source
    pub fn new(config: ReplayConfig) -> Self {
        let interval = interval_from_secs(config.interval, DEFAULT_INTERVAL);
        Self { config, interval }
    }

    /// Pause between rows
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Load the file and replay it until the end (or forever when looping),
    /// stopping early once `running` is cleared.
    pub async fn run(&self, store: &SignalStore, running: &RunFlag) -> Result<(), SourceError> {
        let path = &self.config.csv_file;
        let data = tokio::fs::read(path)
            .await
            .map_err(|source| SourceError::ReplayFile {
                path: path.clone(),
                source,
            })?;
        let rows = parse_rows(&data, &self.config.columns())?;

        if rows.is_empty() {
            warn!("Replay file {} has no data rows", path.display());
            return Ok(());
        }
        info!(
            "Replaying {} rows from {} every {:?} (loop: {})",
            rows.len(),
            path.display(),
            self.interval,
            self.config.looping
        );

        let mut cursor = 0;
        let mut passes = 1u64;
        while running.is_running() {
            if cursor == rows.len() {
                if !self.config.looping {
                    info!("Replay finished after {} rows", rows.len());
                    break;
                }
                cursor = 0;
                passes += 1;
                debug!("Replay restarting (pass {})", passes);
            }

            store.update(&rows[cursor]);
            cursor += 1;
            tokio::time::sleep(self.interval).await;
        }

        Ok(())
    }
}
