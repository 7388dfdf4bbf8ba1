//! End-to-end tests: real clients against a local TCP server.

use std::net::SocketAddr;
use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;

use watchsim::client::{ClientConfigBuilder, ClientEvent, EventSink};
use watchsim::payload::build_login_payload;
use watchsim::transport::TcpConnector;
use watchsim::{ClientConfig, ClientState, Credential, Supervisor};

const WAIT: Duration = Duration::from_secs(5);

fn fast_config(addr: SocketAddr) -> ClientConfig {
    ClientConfigBuilder::new()
        .server_addr(addr)
        .send_interval(Duration::from_millis(50))
        .reconnect_delay(Duration::from_millis(100))
        .build()
}

async fn listen() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

async fn accept(listener: &TcpListener) -> TcpStream {
    let (stream, _) = timeout(WAIT, listener.accept()).await.unwrap().unwrap();
    stream
}

/// Read until `count` complete JSON objects have arrived.
///
/// Messages are unframed, so objects are split out of the byte stream.
async fn read_objects(stream: &mut TcpStream, count: usize) -> (Vec<u8>, Vec<Value>) {
    let mut bytes = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let objects: Vec<Value> = serde_json::Deserializer::from_slice(&bytes)
            .into_iter::<Value>()
            .map_while(Result::ok)
            .collect();
        if objects.len() >= count {
            return (bytes, objects);
        }

        let n = timeout(WAIT, stream.read(&mut chunk)).await.unwrap().unwrap();
        assert!(n > 0, "client closed the connection");
        bytes.extend_from_slice(&chunk[..n]);
    }
}

/// Forwards every event to the test.
struct ChannelSink(mpsc::UnboundedSender<ClientEvent>);

impl EventSink for ChannelSink {
    fn emit(&mut self, event: ClientEvent) {
        let _ = self.0.send(event);
    }
}

#[tokio::test]
async fn test_login_then_telemetry() {
    let (listener, addr) = listen().await;
    let credential = Credential::roster().remove(0);

    let mut supervisor = Supervisor::new(fast_config(addr));
    supervisor.spawn(credential.clone());

    let mut stream = accept(&listener).await;
    let (bytes, objects) = read_objects(&mut stream, 3).await;

    assert!(bytes.starts_with(&build_login_payload(&credential)));
    assert_eq!(objects[0]["uSer"], "SmartWatch1");
    for record in &objects[1..] {
        assert_eq!(record["vEh"], "Watch11");
        assert_eq!(record["mode"], "walk");
        assert!(record["heartBeat"].is_string());
    }
    assert_eq!(supervisor.clients()[0].state(), ClientState::Streaming);

    let summaries = supervisor.shutdown_all().await;
    assert_eq!(summaries[0].retries, 0);
}

#[tokio::test]
async fn test_reconnects_after_server_closes() {
    let (listener, addr) = listen().await;
    let credential = Credential::roster().remove(2);

    let mut supervisor = Supervisor::new(fast_config(addr));
    supervisor.spawn(credential.clone());

    let mut first = accept(&listener).await;
    read_objects(&mut first, 2).await;
    drop(first);

    let mut second = accept(&listener).await;
    let (bytes, objects) = read_objects(&mut second, 2).await;
    assert!(bytes.starts_with(&build_login_payload(&credential)));
    assert_eq!(objects[1]["vEh"], "Watch13");

    let summaries = supervisor.shutdown_all().await;
    assert!(summaries[0].retries >= 1);
}

#[tokio::test]
async fn test_retries_while_server_is_down() {
    let (listener, addr) = listen().await;
    drop(listener);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut supervisor = Supervisor::new(fast_config(addr));
    supervisor.spawn_with(
        Credential::roster().remove(0),
        TcpConnector::new(),
        ChannelSink(tx),
    );

    let mut failures = 0;
    while failures < 2 {
        let event = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
        if matches!(event, ClientEvent::ConnectFailed { .. }) {
            failures += 1;
        }
    }

    let summaries = supervisor.shutdown_all().await;
    assert!(summaries[0].retries >= 2);
}

#[tokio::test]
async fn test_server_data_is_reported() {
    let (listener, addr) = listen().await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut supervisor = Supervisor::new(fast_config(addr));
    supervisor.spawn_with(
        Credential::roster().remove(0),
        TcpConnector::new(),
        ChannelSink(tx),
    );

    let mut stream = accept(&listener).await;
    read_objects(&mut stream, 1).await;
    stream.write_all(b"ack").await.unwrap();

    loop {
        let event = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
        if let ClientEvent::DataReceived { data } = event {
            assert_eq!(data, b"ack");
            break;
        }
    }

    supervisor.shutdown_all().await;
}

#[tokio::test]
async fn test_clients_stream_their_own_identity() {
    let (listener, addr) = listen().await;
    let roster = Credential::roster();

    let mut supervisor = Supervisor::new(fast_config(addr));
    for credential in roster.iter().take(2) {
        supervisor.spawn(credential.clone());
    }

    for _ in 0..2 {
        let mut stream = accept(&listener).await;
        let (_, objects) = read_objects(&mut stream, 3).await;

        let user = objects[0]["uSer"].as_str().unwrap();
        let credential = roster.iter().find(|c| c.user() == user).unwrap();
        for record in &objects[1..] {
            assert_eq!(record["vEh"], credential.device_id());
        }
    }

    assert_eq!(supervisor.shutdown_all().await.len(), 2);
}
