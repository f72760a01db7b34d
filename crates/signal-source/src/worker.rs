//! Source Worker Selection and Spawning

use crate::error::SourceError;
use crate::live_api::LiveApiSource;
use crate::replay::ReplaySource;
use crate::static_source::StaticSource;
use serde::{Deserialize, Serialize};
use signal_store::{RunFlag, SignalStore};
use std::fmt;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Which producer feeds the signal store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceMode {
    /// Fixed values from configuration
    #[default]
    Static,
    /// Rows from a recorded CSV drive
    Replay,
    /// Live vehicle telemetry API
    HighMobility,
}

impl fmt::Display for SourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SourceMode::Static => "static",
            SourceMode::Replay => "replay",
            SourceMode::HighMobility => "high_mobility",
        })
    }
}

/// The active producer of periodic partial signal updates.
///
/// Each variant owns its state and timing loop; only one exists per session.
#[derive(Debug)]
pub enum SourceWorker {
    Static(StaticSource),
    Replay(ReplaySource),
    LiveApi(LiveApiSource),
}

impl SourceWorker {
    /// Mode this worker implements
    pub fn mode(&self) -> SourceMode {
        match self {
            SourceWorker::Static(_) => SourceMode::Static,
            SourceWorker::Replay(_) => SourceMode::Replay,
            SourceWorker::LiveApi(_) => SourceMode::HighMobility,
        }
    }

    /// Produce updates until the source is exhausted or `running` is cleared
    pub async fn run(self, store: SignalStore, running: RunFlag) -> Result<(), SourceError> {
        match self {
            SourceWorker::Static(source) => {
                source.run(&store);
                Ok(())
            }
            SourceWorker::Replay(source) => source.run(&store, &running).await,
            SourceWorker::LiveApi(source) => {
                source.run(&store, &running).await;
                Ok(())
            }
        }
    }

    /// Run on a background task. A worker that ends, with or without an
    /// error, leaves the store holding its last values.
    pub fn spawn(
        self,
        store: SignalStore,
        running: RunFlag,
    ) -> JoinHandle<Result<(), SourceError>> {
        let mode = self.mode();
        info!("Starting {} source worker", mode);
        tokio::spawn(async move {
            let result = self.run(store, running).await;
            match &result {
                Ok(()) => info!("{} source worker finished", mode),
                Err(e) => error!("{} source worker stopped: {}", mode, e),
            }
            result
        })
    }
}
