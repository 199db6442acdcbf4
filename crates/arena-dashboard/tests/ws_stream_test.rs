//! Live PLC stream tests over a real socket.
//!
//! Each test binds an ephemeral port, serves the router and connects with
//! tokio-tungstenite as a viewer would.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

use arena_core::{MatchPhase, PhaseTracker, PlcSnapshot, PlcState, PlcTopology};
use arena_dashboard::{serve, DashboardConfig, FieldState};
use arena_notify::ArenaNotifiers;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const WAIT: Duration = Duration::from_secs(2);

struct TestServer {
    addr: SocketAddr,
    field: FieldState,
    shutdown: CancellationToken,
    handle: JoinHandle<std::io::Result<()>>,
}

impl TestServer {
    async fn start(config: DashboardConfig) -> Self {
        let plc = PlcState::new(PlcTopology::with_counts(3, 2, 1));
        plc.apply(PlcSnapshot {
            inputs: vec![true, false, true],
            registers: vec![10, 20],
            coils: vec![false],
        })
        .unwrap();
        let field = FieldState::new(
            Arc::new(plc),
            Arc::new(PhaseTracker::new(MatchPhase::PreMatch)),
            ArenaNotifiers::new(),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(serve(listener, field.clone(), config, shutdown.clone()));

        Self {
            addr,
            field,
            shutdown,
            handle,
        }
    }

    fn url(&self) -> String {
        format!("ws://{}/setup/field/websocket", self.addr)
    }

    async fn connect(&self) -> Client {
        let (client, _) = connect_async(self.url()).await.unwrap();
        client
    }

    /// Wait until the bus has `count` listeners.
    async fn wait_for_viewers(&self, count: usize) {
        timeout(WAIT, async {
            while self.field.notifiers().plc_io_change.listener_count() != count {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("viewer count reached");
    }

    async fn stop(self) {
        self.shutdown.cancel();
        let _ = timeout(WAIT, self.handle).await;
    }
}

async fn next_json(client: &mut Client) -> serde_json::Value {
    loop {
        let msg = timeout(WAIT, client.next())
            .await
            .expect("message within timeout")
            .expect("stream open")
            .expect("valid frame");
        if msg.is_text() {
            return serde_json::from_str(msg.to_text().unwrap()).unwrap();
        }
    }
}

#[tokio::test]
async fn test_first_message_is_current_snapshot() {
    let server = TestServer::start(DashboardConfig::default()).await;
    let mut client = server.connect().await;

    let msg = next_json(&mut client).await;
    assert_eq!(
        msg,
        serde_json::json!({
            "type": "plcIoChange",
            "data": {
                "Inputs": [true, false, true],
                "Registers": [10, 20],
                "Coils": [false]
            }
        })
    );

    server.stop().await;
}

#[tokio::test]
async fn test_change_reaches_every_viewer() {
    let server = TestServer::start(DashboardConfig::default()).await;
    let mut first = server.connect().await;
    let mut second = server.connect().await;
    let _ = next_json(&mut first).await;
    let _ = next_json(&mut second).await;
    server.wait_for_viewers(2).await;

    server.field.plc().set_coil(0, true).unwrap();
    server.field.notifiers().plc_io_change.notify();

    for client in [&mut first, &mut second] {
        let msg = next_json(client).await;
        assert_eq!(msg["type"], "plcIoChange");
        assert_eq!(msg["data"]["Coils"], serde_json::json!([true]));
    }

    server.stop().await;
}

#[tokio::test]
async fn test_viewer_close_releases_listener() {
    let server = TestServer::start(DashboardConfig::default()).await;
    let mut client = server.connect().await;
    let _ = next_json(&mut client).await;
    server.wait_for_viewers(1).await;

    client.close(None).await.unwrap();
    server.wait_for_viewers(0).await;

    server.stop().await;
}

#[tokio::test]
async fn test_shutdown_closes_viewers() {
    let server = TestServer::start(DashboardConfig::default()).await;
    let mut client = server.connect().await;
    let _ = next_json(&mut client).await;
    server.wait_for_viewers(1).await;

    server.shutdown.cancel();

    let closed = timeout(WAIT, async {
        loop {
            match client.next().await {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            }
        }
    })
    .await;
    assert!(closed.is_ok(), "viewer should be closed on shutdown");
    server.wait_for_viewers(0).await;

    server.stop().await;
}

#[tokio::test]
async fn test_connection_limit_returns_503() {
    let config = DashboardConfig {
        max_connections: 1,
        ..Default::default()
    };
    let server = TestServer::start(config).await;
    let mut first = server.connect().await;
    let _ = next_json(&mut first).await;

    let err = connect_async(server.url()).await.unwrap_err();
    match err {
        tungstenite::Error::Http(response) => assert_eq!(response.status().as_u16(), 503),
        other => panic!("expected HTTP error, got {other:?}"),
    }

    server.stop().await;
}

#[tokio::test]
async fn test_websocket_requires_auth_when_configured() {
    let config = DashboardConfig {
        username: "admin".to_string(),
        password: "s3cret".to_string(),
        ..Default::default()
    };
    let server = TestServer::start(config).await;

    let err = connect_async(server.url()).await.unwrap_err();
    match err {
        tungstenite::Error::Http(response) => assert_eq!(response.status().as_u16(), 401),
        other => panic!("expected HTTP error, got {other:?}"),
    }
    assert_eq!(server.field.notifiers().plc_io_change.listener_count(), 0);

    server.stop().await;
}
