//! Emulator Session
//!
//! Wires the signal store, the configured source worker and the protocol
//! engine together for one run of the emulated adapter.

use crate::error::EmulatorError;
use crate::settings::EmulatorConfig;
use obd_protocol::ProtocolEngine;
use signal_source::{LiveApiSource, ReplaySource, SourceMode, SourceWorker, StaticSource};
use signal_store::{RunFlag, SignalStore};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tracing::{info, warn};

/// One emulator run: shared state plus the configuration it was built from
pub struct EmulatorSession {
    /// Configuration
    config: EmulatorConfig,
    /// Signal table shared by the worker and the engine
    store: SignalStore,
    /// Running flag shared by every execution path
    running: RunFlag,
}

impl EmulatorSession {
    /// Create a new session
    pub fn new(config: EmulatorConfig) -> Self {
        info!(
            "Creating emulator session: port {} @ {} baud, mode {}",
            config.connection.port, config.connection.baudrate, config.mode
        );
        Self {
            config,
            store: SignalStore::new(),
            running: RunFlag::new(),
        }
    }

    /// Handle to the session's signal store
    pub fn store(&self) -> SignalStore {
        self.store.clone()
    }

    /// Handle to the session's running flag
    pub fn running(&self) -> RunFlag {
        self.running.clone()
    }

    /// Ask the engine and the worker to stop
    pub fn shutdown(&self) {
        info!("Stopping emulator session");
        self.running.stop();
    }

    /// Open the configured serial port
    pub fn open_transport(&self) -> Result<SerialStream, EmulatorError> {
        let connection = &self.config.connection;
        tokio_serial::new(&connection.port, connection.baudrate)
            .open_native_async()
            .map_err(|source| EmulatorError::TransportOpen {
                port: connection.port.clone(),
                baudrate: connection.baudrate,
                source,
            })
    }

    /// Build the source worker selected by the configured mode
    pub fn build_worker(&self) -> Result<SourceWorker, EmulatorError> {
        let worker = match self.config.mode {
            SourceMode::Static => {
                SourceWorker::Static(StaticSource::new(&self.config.static_values))
            }
            SourceMode::Replay => {
                SourceWorker::Replay(ReplaySource::new(self.config.replay.clone()))
            }
            SourceMode::HighMobility => {
                SourceWorker::LiveApi(LiveApiSource::new(self.config.high_mobility.clone())?)
            }
        };
        Ok(worker)
    }

    /// Open the serial port and serve on it until shutdown
    pub async fn run(&self) -> Result<(), EmulatorError> {
        let mut transport = self.open_transport()?;
        info!("Serial port {} open", self.config.connection.port);

        let result = self.serve(&mut transport).await;
        drop(transport);
        info!("Serial port {} closed", self.config.connection.port);
        result
    }

    /// Start the source worker and run the protocol engine on `transport`
    /// until shutdown or end of stream.
    pub async fn serve<T>(&self, transport: &mut T) -> Result<(), EmulatorError>
    where
        T: AsyncRead + AsyncWrite + Unpin,
    {
        // static values must be in the store before the first command is read
        let worker = match self.build_worker()? {
            SourceWorker::Static(source) => {
                source.run(&self.store);
                None
            }
            worker => Some(worker.spawn(self.store.clone(), self.running.clone())),
        };

        let mut engine =
            ProtocolEngine::new(self.store.clone(), self.config.protocol.engine_config());
        let result = engine.run(transport, &self.running).await;

        // the engine may also stop on end of stream; make sure the worker follows
        self.running.stop();
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                warn!("Source worker task ended abnormally: {}", e);
            }
        }

        result.map_err(EmulatorError::from)
    }
}
