//! End-to-end session tests over an in-memory transport

use emulator::{EmulatorConfig, EmulatorError, EmulatorSession};
use signal_source::{ConfigValue, ReplayConfig, SourceMode, StaticConfig};
use signal_store::Signal;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::task::JoinHandle;

const TERMINATOR: &[u8] = b"\r\r>";

fn static_config() -> EmulatorConfig {
    EmulatorConfig {
        mode: SourceMode::Static,
        static_values: StaticConfig {
            rpm: Some(ConfigValue::Number(3000.0)),
            speed: Some(ConfigValue::Number(80.0)),
            coolant_temp: Some(ConfigValue::Number(90.0)),
            engine_load: Some(ConfigValue::Number(50.0)),
            ..StaticConfig::default()
        },
        ..EmulatorConfig::default()
    }
}

type SessionTask = JoinHandle<Result<(), EmulatorError>>;

/// Serve an existing transport on a background task
fn serve(config: EmulatorConfig, mut server: DuplexStream) -> (Arc<EmulatorSession>, SessionTask) {
    let session = Arc::new(EmulatorSession::new(config));
    let task = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.serve(&mut server).await })
    };
    (session, task)
}

fn start(config: EmulatorConfig) -> (Arc<EmulatorSession>, DuplexStream, SessionTask) {
    let (client, server) = duplex(4096);
    let (session, task) = serve(config, server);
    (session, client, task)
}

/// Send one command and read back exactly one terminated response
async fn query(client: &mut DuplexStream, command: &str) -> String {
    client.write_all(command.as_bytes()).await.unwrap();
    let mut response = Vec::new();
    let mut byte = [0u8; 1];
    while !response.ends_with(TERMINATOR) {
        let read = tokio::time::timeout(Duration::from_secs(2), client.read(&mut byte))
            .await
            .expect("response timed out")
            .unwrap();
        assert_eq!(read, 1, "transport closed mid-response");
        response.push(byte[0]);
    }
    String::from_utf8(response).unwrap()
}

async fn stop(session: &EmulatorSession, task: SessionTask) {
    session.shutdown();
    tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .expect("session did not stop")
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_static_mode_scenario() {
    let (session, mut client, task) = start(static_config());

    assert_eq!(query(&mut client, "010C\r").await, "41 0C 2E E0\r\r>");
    assert_eq!(query(&mut client, "010D\r").await, "41 0D 50\r\r>");
    assert_eq!(query(&mut client, "0105\r").await, "41 05 82\r\r>");
    assert_eq!(query(&mut client, "ATZ\r").await, "ELM327 v1.5\r\r>");

    stop(&session, task).await;
}

#[tokio::test]
async fn test_static_values_answer_a_request_already_waiting() {
    let (mut client, server) = duplex(4096);
    client.write_all(b"010C\r").await.unwrap();

    let (session, task) = serve(static_config(), server);

    let mut response = [0u8; 14];
    tokio::time::timeout(Duration::from_secs(2), client.read_exact(&mut response))
        .await
        .expect("response timed out")
        .unwrap();
    assert_eq!(&response, b"41 0C 2E E0\r\r>");
    assert_eq!(session.store().get(Signal::Rpm), 3000.0);

    stop(&session, task).await;
}

#[tokio::test]
async fn test_client_init_sequence() {
    let (session, mut client, task) = start(static_config());

    for command in ["ATZ\r", "ATE0\r", "ATE0\r", "ATL0\r", "ATS0\r", "ATH0\r", "ATSP0\r"] {
        let response = query(&mut client, command).await;
        if command == "ATZ\r" {
            assert_eq!(response, "ELM327 v1.5\r\r>");
        } else {
            assert_eq!(response, "OK\r\r>", "{command:?}");
        }
    }
    assert_eq!(query(&mut client, "0100\r").await, "41 00 BE 1F B8 10\r\r>");
    assert_eq!(query(&mut client, " 01 0c \r").await, "41 0C 2E E0\r\r>");
    assert_eq!(query(&mut client, "01A6\r").await, "NO DATA\r\r>");
    assert_eq!(query(&mut client, "0902\r").await, "OK\r\r>");

    stop(&session, task).await;
}

#[tokio::test]
async fn test_split_writes_are_reassembled() {
    let (session, mut client, task) = start(static_config());

    client.write_all(b"01").await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    client.write_all(b"0").await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(query(&mut client, "D\r").await, "41 0D 50\r\r>");

    stop(&session, task).await;
}

#[tokio::test]
async fn test_replay_without_loop_keeps_serving_last_row() {
    let mut csv = tempfile::NamedTempFile::new().unwrap();
    csv.write_all(b"time,rpm,speed\n0.0,1000,10\n0.1,2000,20\n").unwrap();
    csv.flush().unwrap();

    let config = EmulatorConfig {
        mode: SourceMode::Replay,
        replay: ReplayConfig {
            csv_file: csv.path().to_path_buf(),
            interval: 0.02,
            looping: false,
            ..ReplayConfig::default()
        },
        ..EmulatorConfig::default()
    };
    let (session, mut client, task) = start(config);

    // two rows, two intervals, then the worker ends on its own
    tokio::time::sleep(Duration::from_millis(150)).await;

    // 2000 * 4 = 8000 = 0x1F40
    assert_eq!(query(&mut client, "010C\r").await, "41 0C 1F 40\r\r>");
    assert_eq!(query(&mut client, "010D\r").await, "41 0D 14\r\r>");
    assert!(session.running().is_running());

    stop(&session, task).await;
}

#[tokio::test]
async fn test_missing_replay_file_does_not_stop_protocol() {
    let config = EmulatorConfig {
        mode: SourceMode::Replay,
        replay: ReplayConfig {
            csv_file: "/nonexistent/drive.csv".into(),
            ..ReplayConfig::default()
        },
        ..EmulatorConfig::default()
    };
    let (session, mut client, task) = start(config);
    tokio::time::sleep(Duration::from_millis(20)).await;

    // defaults: 20 °C coolant
    assert_eq!(query(&mut client, "0105\r").await, "41 05 3C\r\r>");

    stop(&session, task).await;
}

#[tokio::test]
async fn test_session_ends_when_client_disconnects() {
    let (session, client, task) = start(static_config());
    drop(client);

    tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .expect("session did not stop")
        .unwrap()
        .unwrap();
    assert!(!session.running().is_running());
}

#[tokio::test]
async fn test_unopenable_port_is_fatal() {
    let mut config = static_config();
    config.connection.port = "/nonexistent/ttyELM".to_string();
    let session = EmulatorSession::new(config);

    let result = session.run().await;
    assert!(matches!(result, Err(EmulatorError::TransportOpen { .. })));
}
