//! Static Operating Point Source

use serde::{Deserialize, Serialize};
use signal_store::{coerce_value, Signal, SignalStore, SignalUpdate};
use tracing::{info, warn};

/// A configured signal value as written by the user.
///
/// Numbers are taken as-is; strings (for instance from environment
/// overrides) are parsed and dropped if they are not numeric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Number(f64),
    Text(String),
}

impl ConfigValue {
    /// Numeric value, if there is one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConfigValue::Number(v) => Some(*v).filter(|v| v.is_finite()),
            ConfigValue::Text(text) => coerce_value(text),
        }
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        ConfigValue::Number(value)
    }
}

/// Fixed signal values for static mode
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticConfig {
    pub rpm: Option<ConfigValue>,
    pub speed: Option<ConfigValue>,
    pub coolant_temp: Option<ConfigValue>,
    pub engine_load: Option<ConfigValue>,
    pub throttle: Option<ConfigValue>,
    pub voltage: Option<ConfigValue>,
}

impl StaticConfig {
    fn value(&self, signal: Signal) -> Option<&ConfigValue> {
        match signal {
            Signal::Rpm => self.rpm.as_ref(),
            Signal::Speed => self.speed.as_ref(),
            Signal::CoolantTemp => self.coolant_temp.as_ref(),
            Signal::EngineLoad => self.engine_load.as_ref(),
            Signal::Throttle => self.throttle.as_ref(),
            Signal::Voltage => self.voltage.as_ref(),
        }
    }

    /// Convert into a partial update, skipping non-numeric entries
    pub fn to_update(&self) -> SignalUpdate {
        let mut update = SignalUpdate::new();
        for signal in Signal::ALL {
            let Some(raw) = self.value(signal) else {
                continue;
            };
            match raw.as_f64() {
                Some(value) => update.set(signal, Some(value)),
                None => warn!("Ignoring non-numeric static value for {}: {:?}", signal, raw),
            }
        }
        update
    }
}

/// Applies one fixed set of values at startup and then does nothing
#[derive(Debug, Clone)]
pub struct StaticSource {
    update: SignalUpdate,
}

impl StaticSource {
    /// Snapshot the configuration once
    pub fn new(config: &StaticConfig) -> Self {
        Self {
            update: config.to_update(),
        }
    }

    /// Push the configured values into the store
    pub fn run(&self, store: &SignalStore) {
        store.update(&self.update);
        info!(
            "Static source applied {} signal values: {:?}",
            self.update.len(),
            store.snapshot()
        );
    }
}
