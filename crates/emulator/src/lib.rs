//! ELM327 Adapter Emulator
//!
//! Serves ELM327 AT commands and Mode 01 PID requests over a serial port,
//! answering from a signal store fed by a static, replay or live API source.

mod error;
mod session;
mod settings;

pub use error::EmulatorError;
pub use session::EmulatorSession;
pub use settings::{
    ConnectionConfig, EmulatorConfig, LogFormat, LoggingConfig, ProtocolConfig, CONFIG_ENV,
    DEFAULT_CONFIG_PATH,
};

use tracing_subscriber::FmtSubscriber;

/// Initialize logging
pub fn init_logging(logging: &LoggingConfig) -> Result<(), EmulatorError> {
    let builder = FmtSubscriber::builder()
        .with_max_level(logging.max_level())
        .with_target(true);

    let result = match logging.format {
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish()),
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish()),
    };
    result.map_err(|e| EmulatorError::Logging(e.to_string()))
}
