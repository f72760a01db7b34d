//! Signal Definitions and Partial Updates

use crate::error::SignalError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const SIGNAL_COUNT: usize = 6;

/// The fixed set of physical quantities the emulated vehicle reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    /// Engine speed (rev/min)
    Rpm,
    /// Vehicle speed (km/h)
    Speed,
    /// Engine coolant temperature (°C)
    CoolantTemp,
    /// Calculated engine load (%)
    EngineLoad,
    /// Throttle position (%)
    Throttle,
    /// Control module voltage (V)
    Voltage,
}

impl Signal {
    /// Every signal, in table order
    pub const ALL: [Signal; SIGNAL_COUNT] = [
        Signal::Rpm,
        Signal::Speed,
        Signal::CoolantTemp,
        Signal::EngineLoad,
        Signal::Throttle,
        Signal::Voltage,
    ];

    /// Configuration / CSV mapping name of this signal
    pub fn name(&self) -> &'static str {
        match self {
            Signal::Rpm => "rpm",
            Signal::Speed => "speed",
            Signal::CoolantTemp => "coolant_temp",
            Signal::EngineLoad => "engine_load",
            Signal::Throttle => "throttle",
            Signal::Voltage => "voltage",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Signal {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Signal::ALL
            .into_iter()
            .find(|signal| signal.name().eq_ignore_ascii_case(needle))
            .ok_or_else(|| SignalError::UnknownSignal(s.to_string()))
    }
}

/// Coerce upstream text into a signal value.
///
/// Anything that does not parse as a finite number becomes `None`, so a
/// malformed field is skipped instead of failing the caller.
pub fn coerce_value(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Complete set of signal values as seen at one instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalSnapshot {
    /// Engine RPM
    pub rpm: f64,
    /// Vehicle speed (km/h)
    pub speed: f64,
    /// Coolant temperature (°C, may be negative)
    pub coolant_temp: f64,
    /// Engine load (0-100%)
    pub engine_load: f64,
    /// Throttle position (0-100%)
    pub throttle: f64,
    /// Control module voltage (V)
    pub voltage: f64,
}

impl Default for SignalSnapshot {
    /// A parked vehicle with the ignition on
    fn default() -> Self {
        Self {
            rpm: 0.0,
            speed: 0.0,
            coolant_temp: 20.0,
            engine_load: 0.0,
            throttle: 0.0,
            voltage: 12.6,
        }
    }
}

impl SignalSnapshot {
    /// Read one signal
    pub fn get(&self, signal: Signal) -> f64 {
        match signal {
            Signal::Rpm => self.rpm,
            Signal::Speed => self.speed,
            Signal::CoolantTemp => self.coolant_temp,
            Signal::EngineLoad => self.engine_load,
            Signal::Throttle => self.throttle,
            Signal::Voltage => self.voltage,
        }
    }

    fn slot(&mut self, signal: Signal) -> &mut f64 {
        match signal {
            Signal::Rpm => &mut self.rpm,
            Signal::Speed => &mut self.speed,
            Signal::CoolantTemp => &mut self.coolant_temp,
            Signal::EngineLoad => &mut self.engine_load,
            Signal::Throttle => &mut self.throttle,
            Signal::Voltage => &mut self.voltage,
        }
    }

    /// Overwrite every signal present in `update`, leaving the rest untouched
    pub fn apply(&mut self, update: &SignalUpdate) {
        for (signal, value) in update.iter() {
            *self.slot(signal) = value;
        }
    }
}

/// A "fill known fields only" patch for the signal table
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SignalUpdate {
    values: [Option<f64>; SIGNAL_COUNT],
}

impl SignalUpdate {
    /// Create an empty update
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`SignalUpdate::set`]
    pub fn with(mut self, signal: Signal, value: f64) -> Self {
        self.set(signal, Some(value));
        self
    }

    /// Set or clear one signal. Non-finite values are treated as absent.
    pub fn set(&mut self, signal: Signal, value: Option<f64>) {
        self.values[signal as usize] = value.filter(|v| v.is_finite());
    }

    /// Value carried for `signal`, if any
    pub fn get(&self, signal: Signal) -> Option<f64> {
        self.values[signal as usize]
    }

    /// Whether the update carries no values at all
    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }

    /// Number of signals carried
    pub fn len(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Iterate the signals carried by this update
    pub fn iter(&self) -> impl Iterator<Item = (Signal, f64)> + '_ {
        Signal::ALL
            .into_iter()
            .filter_map(|signal| self.get(signal).map(|value| (signal, value)))
    }
}

impl FromIterator<(Signal, Option<f64>)> for SignalUpdate {
    fn from_iter<I: IntoIterator<Item = (Signal, Option<f64>)>>(iter: I) -> Self {
        let mut update = SignalUpdate::new();
        for (signal, value) in iter {
            update.set(signal, value);
        }
        update
    }
}
