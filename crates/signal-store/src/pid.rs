//! Mode 01 PID Table and Response Encoders
//!
//! Each entry maps a four-hex-digit Mode 01 request (e.g. `010C`) to the
//! data bytes an ELM327 would report for it. Live entries are pure
//! functions of a [`SignalSnapshot`]; constant entries never change.

use crate::signal::SignalSnapshot;

/// Supported-PID bitmap for PIDs 01-20, reported for `0100`
pub const SUPPORTED_PIDS_01_20: [u8; 4] = [0xBE, 0x1F, 0xB8, 0x10];

/// How a PID's data bytes are produced
#[derive(Clone, Copy)]
pub enum Encoder {
    /// Fixed bytes for the emulator's lifetime
    Constant(&'static [u8]),
    /// Computed from the current signal values
    Live(fn(&SignalSnapshot) -> Vec<u8>),
}

impl std::fmt::Debug for Encoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Encoder::Constant(bytes) => write!(f, "Constant({})", format_hex(bytes)),
            Encoder::Live(_) => f.write_str("Live"),
        }
    }
}

/// One row of the PID table
#[derive(Debug, Clone, Copy)]
pub struct PidEntry {
    /// Mode 01 request, upper-case hex (e.g. "010C")
    pub pid: &'static str,
    /// Human readable name
    pub name: &'static str,
    /// Byte producer
    pub encoder: Encoder,
}

impl PidEntry {
    /// The PID byte itself (the last two hex digits of the request)
    pub fn pid_byte(&self) -> &'static str {
        &self.pid[2..]
    }

    /// Encode this PID against a snapshot
    pub fn encode(&self, snapshot: &SignalSnapshot) -> Vec<u8> {
        match self.encoder {
            Encoder::Constant(bytes) => bytes.to_vec(),
            Encoder::Live(encode) => encode(snapshot),
        }
    }
}

/// Every PID the emulator answers. Anything else is `NO DATA`.
pub static PID_TABLE: &[PidEntry] = &[
    PidEntry {
        pid: "0100",
        name: "PIDs supported [01-20]",
        encoder: Encoder::Constant(&SUPPORTED_PIDS_01_20),
    },
    PidEntry {
        pid: "0104",
        name: "Calculated engine load",
        encoder: Encoder::Live(encode_engine_load),
    },
    PidEntry {
        pid: "0105",
        name: "Engine coolant temperature",
        encoder: Encoder::Live(encode_coolant_temp),
    },
    PidEntry {
        pid: "010C",
        name: "Engine RPM",
        encoder: Encoder::Live(encode_rpm),
    },
    PidEntry {
        pid: "010D",
        name: "Vehicle speed",
        encoder: Encoder::Live(encode_speed),
    },
    PidEntry {
        pid: "010F",
        name: "Intake air temperature",
        encoder: Encoder::Constant(&[0x00]),
    },
    PidEntry {
        pid: "0110",
        name: "MAF air flow rate",
        encoder: Encoder::Constant(&[0x00, 0x00]),
    },
    PidEntry {
        pid: "0111",
        name: "Throttle position",
        encoder: Encoder::Live(encode_throttle),
    },
    PidEntry {
        pid: "0142",
        name: "Control module voltage",
        encoder: Encoder::Live(encode_voltage),
    },
];

/// Find the table entry for a Mode 01 request (case-insensitive)
pub fn lookup(pid: &str) -> Option<&'static PidEntry> {
    PID_TABLE
        .iter()
        .find(|entry| entry.pid.eq_ignore_ascii_case(pid))
}

/// Format bytes as space-separated upper-case hex pairs ("2E E0")
pub fn format_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Round half-to-even and saturate into one byte
fn to_byte(value: f64) -> u8 {
    value.round_ties_even().clamp(0.0, u8::MAX as f64) as u8
}

/// Round half-to-even and saturate into two big-endian bytes
fn to_word(value: f64) -> Vec<u8> {
    let word = value.round_ties_even().clamp(0.0, u16::MAX as f64) as u16;
    word.to_be_bytes().to_vec()
}

// RPM: (A*256 + B) / 4
fn encode_rpm(s: &SignalSnapshot) -> Vec<u8> {
    to_word(s.rpm * 4.0)
}

// Speed: A (km/h)
fn encode_speed(s: &SignalSnapshot) -> Vec<u8> {
    vec![to_byte(s.speed)]
}

// Coolant: A - 40 (°C)
fn encode_coolant_temp(s: &SignalSnapshot) -> Vec<u8> {
    vec![to_byte(s.coolant_temp + 40.0)]
}

// Load: A * 100 / 255 (%)
fn encode_engine_load(s: &SignalSnapshot) -> Vec<u8> {
    vec![to_byte(s.engine_load * 2.55)]
}

// Throttle: A * 100 / 255 (%)
fn encode_throttle(s: &SignalSnapshot) -> Vec<u8> {
    vec![to_byte(s.throttle * 2.55)]
}

// Voltage: (A*256 + B) / 1000 (V)
fn encode_voltage(s: &SignalSnapshot) -> Vec<u8> {
    to_word(s.voltage * 1000.0)
}
