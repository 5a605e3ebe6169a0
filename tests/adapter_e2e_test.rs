use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};

use heart_match::adapter::protocol::{create_hello, PROTOCOL_VERSION};
use heart_match::adapter::server::{run_server, ServerConfig};
use heart_match::adapter::{InboundCommand, InboundPayload, OutboundMessage, SessionHost};

struct Client {
    lines: Lines<BufReader<OwnedReadHalf>>,
    write_half: OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.expect("connect failed");
        let (read_half, write_half) = stream.into_split();
        Self {
            lines: BufReader::new(read_half).lines(),
            write_half,
        }
    }

    async fn send(&mut self, line: &str) {
        tokio_test::assert_ok!(self.write_half.write_all(line.as_bytes()).await);
        tokio_test::assert_ok!(self.write_half.write_all(b"\n").await);
        tokio_test::assert_ok!(self.write_half.flush().await);
    }

    async fn recv(&mut self) -> serde_json::Value {
        let line = tokio::time::timeout(Duration::from_secs(2), self.lines.next_line())
            .await
            .expect("timed out waiting for a line")
            .expect("read failed")
            .expect("connection closed");
        serde_json::from_str(&line).expect("server sent invalid JSON")
    }

    async fn hello(&mut self, seq: u64) -> (serde_json::Value, serde_json::Value) {
        let hello = create_hello(seq, "e2e-test", PROTOCOL_VERSION);
        self.send(&serde_json::to_string(&hello).unwrap()).await;
        let welcome = self.recv().await;
        let observation = self.recv().await;
        (welcome, observation)
    }
}

/// Server plus a session loop task standing in for the binary's blocking loop
async fn start(max_pending: usize) -> (SocketAddr, tokio::task::JoinHandle<()>, tokio::task::JoinHandle<()>) {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        max_pending_commands: max_pending,
        seed: Some(500),
        ..ServerConfig::default()
    };

    let (cmd_tx, mut cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
    let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
    let (ready_tx, ready_rx) = oneshot::channel();

    let server_handle = tokio::spawn(async move {
        let _ = run_server(config, cmd_tx, out_rx, Some(ready_tx)).await;
    });

    let loop_handle = tokio::spawn(async move {
        let mut host = SessionHost::new(500);
        while let Some(inbound) = cmd_rx.recv().await {
            for reply in host.handle(inbound) {
                let _ = out_tx.send(reply);
            }
        }
    });

    let addr = tokio::time::timeout(Duration::from_secs(2), ready_rx)
        .await
        .expect("server did not signal ready")
        .expect("ready channel dropped");

    (addr, server_handle, loop_handle)
}

#[tokio::test]
async fn adapter_hello_command_ack_and_observation() {
    let (addr, server, session_loop) = start(8).await;
    let mut client = Client::connect(addr).await;

    let (welcome, observation) = client.hello(1).await;
    assert_eq!(welcome["type"], "welcome");
    assert_eq!(welcome["seq"], 1);
    assert_eq!(welcome["protocol_version"], PROTOCOL_VERSION);
    assert_eq!(observation["type"], "observation");
    assert_eq!(observation["piles"]["main"].as_array().map(|a| a.len()), Some(178));
    assert_eq!(observation["piles"]["left"].as_array().map(|a| a.len()), Some(15));
    assert_eq!(observation["power_ups"]["undo"], 1);

    client
        .send(r#"{"type":"command","seq":2,"command":{"action":"drawSide","side":"left"}}"#)
        .await;
    let ack = client.recv().await;
    assert_eq!(ack["type"], "ack");
    assert_eq!(ack["seq"], 2);
    assert_eq!(ack["outcome"], "applied");

    let observation = client.recv().await;
    assert_eq!(observation["seq"], 2);
    assert_eq!(observation["piles"]["stack"].as_array().map(|a| a.len()), Some(1));
    assert_eq!(observation["piles"]["left"].as_array().map(|a| a.len()), Some(14));

    client.send(r#"{"type":"command","seq":3,"command":{"action":"undo"}}"#).await;
    let ack = client.recv().await;
    assert_eq!(ack["outcome"], "applied");
    let observation = client.recv().await;
    assert!(observation["piles"]["stack"].as_array().is_some_and(|a| a.is_empty()));
    assert_eq!(observation["power_ups"]["undo"], 0);

    server.abort();
    session_loop.abort();
}

#[tokio::test]
async fn adapter_requires_hello_and_increasing_seq() {
    let (addr, server, session_loop) = start(8).await;
    let mut client = Client::connect(addr).await;

    client.send(r#"{"type":"query","seq":1}"#).await;
    let err = client.recv().await;
    assert_eq!(err["type"], "error");
    assert_eq!(err["code"], "handshake_required");

    client.hello(5).await;

    client.send(r#"{"type":"query","seq":5}"#).await;
    let err = client.recv().await;
    assert_eq!(err["code"], "invalid_command");
    assert_eq!(err["seq"], 5);

    client.send(r#"{"type":"query","seq":6}"#).await;
    let observation = client.recv().await;
    assert_eq!(observation["type"], "observation");
    assert_eq!(observation["seq"], 6);

    server.abort();
    session_loop.abort();
}

#[tokio::test]
async fn adapter_reports_bad_commands() {
    let (addr, server, session_loop) = start(8).await;
    let mut client = Client::connect(addr).await;
    client.hello(1).await;

    client.send(r#"{"type":"command","seq":2,"command":{"action":"fly"}}"#).await;
    let err = client.recv().await;
    assert_eq!(err["code"], "invalid_command");
    assert_eq!(err["seq"], 2);

    client.send(r#"{"type":"command","seq":3,"command":{"action":"drawMain","index":4000}}"#).await;
    let err = client.recv().await;
    assert_eq!(err["code"], "invalid_argument");
    assert_eq!(err["seq"], 3);

    client.send(r#"{"type":"command","seq":4,"command":{"action":"reorder","from":1,"to":1}}"#).await;
    let err = client.recv().await;
    assert_eq!(err["code"], "invalid_argument", "stack is empty, so index 1 is out of range");

    client.send("{not json").await;
    let err = client.recv().await;
    assert_eq!(err["code"], "invalid_command");

    client.send(r#"{"type":"teleport","seq":9}"#).await;
    let err = client.recv().await;
    assert_eq!(err["code"], "invalid_command");
    assert_eq!(err["seq"], 9);

    server.abort();
    session_loop.abort();
}

#[tokio::test]
async fn adapter_rejects_protocol_mismatch() {
    let (addr, server, session_loop) = start(8).await;
    let mut client = Client::connect(addr).await;

    let hello = create_hello(1, "old-client", "2.0.0");
    client.send(&serde_json::to_string(&hello).unwrap()).await;
    let err = client.recv().await;
    assert_eq!(err["code"], "protocol_mismatch");

    // The server closes the connection afterwards.
    let next = tokio::time::timeout(Duration::from_secs(2), client.lines.next_line())
        .await
        .expect("timed out waiting for close");
    assert!(matches!(next, Ok(None) | Err(_)));

    server.abort();
    session_loop.abort();
}

#[tokio::test]
async fn adapter_sessions_are_per_connection() {
    let (addr, server, session_loop) = start(8).await;
    let mut a = Client::connect(addr).await;
    let mut b = Client::connect(addr).await;

    let (welcome_a, obs_a) = a.hello(1).await;
    let (welcome_b, obs_b) = b.hello(1).await;
    assert_ne!(welcome_a["session"], welcome_b["session"]);
    assert_ne!(obs_a["seed"], obs_b["seed"]);

    a.send(r#"{"type":"new_game","seq":2,"seed":77}"#).await;
    let ack = a.recv().await;
    assert_eq!(ack["outcome"], "applied");
    let obs = a.recv().await;
    assert_eq!(obs["seed"], 77);

    b.send(r#"{"type":"query","seq":2}"#).await;
    let obs = b.recv().await;
    assert_eq!(obs["seed"], obs_b["seed"]);

    server.abort();
    session_loop.abort();
}

#[tokio::test]
async fn adapter_hello_is_not_welcomed_when_queue_is_full() {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        max_pending_commands: 1,
        ..ServerConfig::default()
    };

    // No session loop yet: the single queue slot stays taken until drained below.
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<InboundCommand>(1);
    let (_out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
    let (ready_tx, ready_rx) = oneshot::channel();
    let server = tokio::spawn(async move {
        let _ = run_server(config, cmd_tx, out_rx, Some(ready_tx)).await;
    });
    let addr = ready_rx.await.expect("ready channel dropped");

    let mut a = Client::connect(addr).await;
    a.send(&serde_json::to_string(&create_hello(1, "first", PROTOCOL_VERSION)).unwrap())
        .await;
    assert_eq!(a.recv().await["type"], "welcome");

    let mut b = Client::connect(addr).await;
    b.send(&serde_json::to_string(&create_hello(1, "second", PROTOCOL_VERSION)).unwrap())
        .await;
    let err = b.recv().await;
    assert_eq!(err["type"], "error");
    assert_eq!(err["code"], "backpressure");

    // Still not handshaken, so other messages are refused.
    b.send(r#"{"type":"query","seq":2}"#).await;
    assert_eq!(b.recv().await["code"], "handshake_required");

    let queued = cmd_rx.recv().await.expect("first open queued");
    assert_eq!(queued.payload, InboundPayload::Open);

    b.send(&serde_json::to_string(&create_hello(3, "second", PROTOCOL_VERSION)).unwrap())
        .await;
    let welcome = b.recv().await;
    assert_eq!(welcome["type"], "welcome");
    assert_eq!(welcome["seq"], 3);

    server.abort();
}
