//! Live Vehicle Telemetry API Source
//!
//! Polls a High Mobility style diagnostics endpoint with a bearer token and
//! copies the returned engine values into the signal store.

use crate::error::SourceError;
use crate::interval_from_secs;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use signal_store::{coerce_value, RunFlag, Signal, SignalStore, SignalUpdate};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default pause between polls
const DEFAULT_REFRESH: Duration = Duration::from_secs(1);

/// Default per-request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Diagnostics field names reported by the API, per signal
const DIAGNOSTIC_FIELDS: [(Signal, &str); 5] = [
    (Signal::Rpm, "engine_rpm"),
    (Signal::Speed, "speed"),
    (Signal::CoolantTemp, "engine_coolant_temperature"),
    (Signal::EngineLoad, "engine_load"),
    (Signal::Voltage, "battery_voltage"),
];

fn default_refresh_secs() -> f64 {
    DEFAULT_REFRESH.as_secs_f64()
}

fn default_timeout_secs() -> f64 {
    DEFAULT_TIMEOUT.as_secs_f64()
}

fn default_endpoint() -> String {
    "https://sandbox.api.high-mobility.com/v1/diagnostics".to_string()
}

/// Live telemetry API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveApiConfig {
    /// Bearer token sent with every request
    #[serde(default)]
    pub access_token: String,
    /// Seconds between polls (default 1.0)
    #[serde(default = "default_refresh_secs")]
    pub refresh_interval: f64,
    /// Diagnostics endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Per-request timeout in seconds (default 5.0)
    #[serde(default = "default_timeout_secs")]
    pub timeout: f64,
}

impl Default for LiveApiConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            refresh_interval: default_refresh_secs(),
            endpoint: default_endpoint(),
            timeout: default_timeout_secs(),
        }
    }
}

/// Pull a number out of an API field.
///
/// Accepts a bare number, a numeric string, or the wrapped
/// `{"data": {"value": ...}}` / `{"value": ...}` forms.
fn field_value(field: &Value) -> Option<f64> {
    match field {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => coerce_value(s),
        Value::Object(map) => map
            .get("data")
            .or_else(|| map.get("value"))
            .and_then(field_value),
        _ => None,
    }
}

/// Map an API response body onto a partial signal update.
///
/// Fields are looked up under a top-level `diagnostics` object when
/// present, otherwise at the top level. Missing or malformed fields are
/// left out of the update.
pub fn diagnostics_update(body: &Value) -> SignalUpdate {
    let diagnostics = body.get("diagnostics").unwrap_or(body);
    DIAGNOSTIC_FIELDS
        .iter()
        .map(|(signal, field)| (*signal, diagnostics.get(*field).and_then(field_value)))
        .collect()
}

/// Polls the telemetry API into the signal store
#[derive(Debug, Clone)]
pub struct LiveApiSource {
    /// HTTP client with the request timeout applied
    client: reqwest::Client,
    /// Configuration
    config: LiveApiConfig,
    /// Pause between polls
    refresh: Duration,
}

impl LiveApiSource {
    /// Create the source and its HTTP client
    pub fn new(config: LiveApiConfig) -> Result<Self, SourceError> {
        if config.endpoint.trim().is_empty() {
            return Err(SourceError::InvalidConfig(
                "high_mobility.endpoint must not be empty".to_string(),
            ));
        }
        if config.access_token.is_empty() {
            warn!("No telemetry API access token configured; requests will be unauthenticated");
        }

        let client = reqwest::Client::builder()
            .timeout(interval_from_secs(config.timeout, DEFAULT_TIMEOUT))
            .build()?;
        let refresh = interval_from_secs(config.refresh_interval, DEFAULT_REFRESH);

        Ok(Self {
            client,
            config,
            refresh,
        })
    }

    /// Pause between polls
    pub fn refresh(&self) -> Duration {
        self.refresh
    }

    /// Issue one request and decode the response
    pub async fn poll(&self) -> Result<SignalUpdate, SourceError> {
        let mut request = self.client.get(&self.config.endpoint);
        if !self.config.access_token.is_empty() {
            request = request.bearer_auth(&self.config.access_token);
        }
        let body: Value = request.send().await?.error_for_status()?.json().await?;
        Ok(diagnostics_update(&body))
    }

    /// Poll until `running` is cleared. Failed polls are logged and retried
    /// on the next tick.
    pub async fn run(&self, store: &SignalStore, running: &RunFlag) {
        info!(
            "Polling telemetry API {} every {:?}",
            self.config.endpoint, self.refresh
        );
        let mut failures = 0u64;

        while running.is_running() {
            match self.poll().await {
                Ok(update) => {
                    failures = 0;
                    if update.is_empty() {
                        debug!("Telemetry response carried no usable signals");
                    }
                    store.update(&update);
                }
                Err(e) => {
                    failures += 1;
                    warn!("Telemetry poll failed (attempt {}): {}", failures, e);
                }
            }
            tokio::time::sleep(self.refresh).await;
        }

        info!("Telemetry polling stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn test_diagnostics_update_wrapped_values() {
        let body = json!({
            "diagnostics": {
                "engine_rpm": {
                    "data": {"value": 2500, "unit": {"angular_velocity": "revolutions_per_minute"}}
                },
                "speed": {"data": {"value": 72.5}},
                "engine_coolant_temperature": {"data": {"value": -3}},
                "engine_load": {"data": {"value": "41"}},
            }
        });
        let update = diagnostics_update(&body);
        assert_eq!(update.get(Signal::Rpm), Some(2500.0));
        assert_eq!(update.get(Signal::Speed), Some(72.5));
        assert_eq!(update.get(Signal::CoolantTemp), Some(-3.0));
        assert_eq!(update.get(Signal::EngineLoad), Some(41.0));
        assert_eq!(update.get(Signal::Voltage), None);
    }

    #[test]
    fn test_diagnostics_update_flat_and_malformed() {
        let body = json!({
            "engine_rpm": 900,
            "speed": "unknown",
            "engine_load": null,
            "battery_voltage": {"value": 12.4},
        });
        let update = diagnostics_update(&body);
        assert_eq!(update.get(Signal::Rpm), Some(900.0));
        assert_eq!(update.get(Signal::Speed), None);
        assert_eq!(update.get(Signal::EngineLoad), None);
        assert_eq!(update.get(Signal::Voltage), Some(12.4));
    }

    #[test]
    fn test_empty_endpoint_rejected() {
        let config = LiveApiConfig {
            endpoint: " ".to_string(),
            ..LiveApiConfig::default()
        };
        assert!(matches!(
            LiveApiSource::new(config),
            Err(SourceError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_refresh_interval() {
        let source = LiveApiSource::new(LiveApiConfig {
            refresh_interval: 0.25,
            ..LiveApiConfig::default()
        })
        .unwrap();
        assert_eq!(source.refresh(), Duration::from_millis(250));

        let source = LiveApiSource::new(LiveApiConfig {
            refresh_interval: 0.0,
            ..LiveApiConfig::default()
        })
        .unwrap();
        assert_eq!(source.refresh(), DEFAULT_REFRESH);
    }

    /// Serve one canned JSON response and hand back the raw request
    async fn serve_once(body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
            }
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });
        (format!("http://{addr}/diagnostics"), handle)
    }

    #[tokio::test]
    async fn test_poll_sends_bearer_token() {
        let (endpoint, server) =
            serve_once(r#"{"diagnostics":{"engine_rpm":{"data":{"value":1800}}}}"#).await;
        let source = LiveApiSource::new(LiveApiConfig {
            access_token: "secret-token".to_string(),
            endpoint,
            ..LiveApiConfig::default()
        })
        .unwrap();

        let update = source.poll().await.unwrap();
        assert_eq!(update.get(Signal::Rpm), Some(1800.0));

        let request = server.await.unwrap().to_lowercase();
        assert!(request.contains("authorization: bearer secret-token"));
    }

    #[tokio::test]
    async fn test_run_pushes_response_into_store() {
        let (endpoint, server) = serve_once(
            r#"{"diagnostics":{"engine_rpm":{"data":{"value":2200}},"speed":{"data":{"value":64}}}}"#,
        )
        .await;
        let source = LiveApiSource::new(LiveApiConfig {
            endpoint,
            refresh_interval: 0.01,
            timeout: 0.5,
            ..LiveApiConfig::default()
        })
        .unwrap();

        let store = SignalStore::new();
        let running = RunFlag::new();
        let task = {
            let (store, running) = (store.clone(), running.clone());
            tokio::spawn(async move { source.run(&store, &running).await })
        };

        server.await.unwrap();
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while store.get(Signal::Rpm) != 2200.0 && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        running.stop();
        tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(store.get(Signal::Rpm), 2200.0);
        assert_eq!(store.get(Signal::Speed), 64.0);
        assert_eq!(store.get(Signal::CoolantTemp), 20.0);
    }

    #[tokio::test]
    async fn test_failed_polls_are_not_fatal() {
        // bind then drop to get a port nothing listens on
        let addr = TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap()
            .local_addr()
            .unwrap();
        let source = LiveApiSource::new(LiveApiConfig {
            endpoint: format!("http://{addr}/diagnostics"),
            refresh_interval: 0.01,
            timeout: 0.5,
            ..LiveApiConfig::default()
        })
        .unwrap();

        let store = SignalStore::new();
        let running = RunFlag::new();
        let task = {
            let (store, running) = (store.clone(), running.clone());
            tokio::spawn(async move { source.run(&store, &running).await })
        };

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(!task.is_finished());
        running.stop();
        tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(store.snapshot(), signal_store::SignalSnapshot::default());
    }
}
