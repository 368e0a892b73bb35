// Shared primitives for one-time server bootstrapping across integration
// tests, plus small WebSocket client helpers.

use futures_util::{SinkExt, StreamExt};
use shared::{CharacterClass, ClientMessage, PlayerDto, ServerMessage};
use std::{
    sync::{Arc, OnceLock},
    time::Duration,
};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

// Global base URL used by all tests after the server publishes its bound address.
static SERVER_URL: OnceLock<String> = OnceLock::new();
// One-time guard that ensures the server bootstrap path runs only once.
static SERVER_READY: OnceLock<()> = OnceLock::new();

// Ensure the test server is running and return the shared ws base URL.
pub fn ensure_server() -> &'static str {
    SERVER_READY.get_or_init(|| {
        let published_url = Arc::new(OnceLock::<String>::new());
        let published_url_thread = Arc::clone(&published_url);
        // Spawn an OS thread so the server outlives individual `#[tokio::test]` runtimes.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                // Bind to an ephemeral port to avoid collisions with local services.
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                let addr = listener.local_addr().expect("get local addr");
                let _ = published_url_thread.set(format!("ws://{}", addr));
                server::run(listener).await.expect("server failed");
            });
        });
        wait_for_server_url_and_readiness(published_url);
    });

    SERVER_URL
        .get()
        .expect("server url should be initialized")
        .as_str()
}

fn wait_for_server_url_and_readiness(published_url: Arc<OnceLock<String>>) {
    let base_url = loop {
        if let Some(url) = published_url.get() {
            break url.clone();
        }
        std::thread::sleep(Duration::from_millis(10));
    };

    let _ = SERVER_URL.set(base_url.clone());

    let addr = base_url
        .strip_prefix("ws://")
        .expect("base url should use ws://");

    // Retry for a short period to avoid racing server bind/accept.
    for _ in 0..100 {
        if std::net::TcpStream::connect(addr).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    panic!("server did not become ready in time");
}

/// Opens a connection and reads the identity handshake.
pub async fn connect(base_url: &str) -> (WsClient, String) {
    let (ws, _response) = connect_async(format!("{base_url}/ws"))
        .await
        .expect("websocket connect");
    let mut ws = ws;

    match next_message(&mut ws).await {
        ServerMessage::Identity { player_id } => (ws, player_id),
        other => panic!("expected identity, got {other:?}"),
    }
}

/// Sends the one-time character selection for this session.
pub async fn join(ws: &mut WsClient, name: &str, class: CharacterClass) {
    send(
        ws,
        &ClientMessage::SelectCharacter {
            name: name.to_string(),
            class,
        },
    )
    .await;
}

pub async fn send(ws: &mut WsClient, message: &ClientMessage) {
    let text = serde_json::to_string(message).expect("serialize client message");
    ws.send(Message::text(text)).await.expect("send message");
}

/// Reads the next parseable server message, panicking on close or timeout.
pub async fn next_message(ws: &mut WsClient) -> ServerMessage {
    loop {
        let frame = tokio::time::timeout(RECV_TIMEOUT, ws.next())
            .await
            .expect("timed out waiting for server message")
            .expect("connection closed while waiting for server message")
            .expect("websocket error");

        if let Message::Text(text) = frame {
            return serde_json::from_str(text.as_str()).expect("parse server message");
        }
    }
}

/// Skips messages until a `players` snapshot satisfies the predicate.
pub async fn wait_for_snapshot(
    ws: &mut WsClient,
    pred: impl Fn(&[PlayerDto]) -> bool,
) -> Vec<PlayerDto> {
    loop {
        if let ServerMessage::Players(players) = next_message(ws).await {
            if pred(&players) {
                return players;
            }
        }
    }
}

/// Asserts that no server message arrives within the given window.
#[allow(dead_code)]
pub async fn expect_silence(ws: &mut WsClient, window: Duration) {
    match tokio::time::timeout(window, ws.next()).await {
        Err(_elapsed) => {}
        Ok(frame) => panic!("expected silence, got {frame:?}"),
    }
}

/// Reads until the stream ends or a close frame arrives.
#[allow(dead_code)]
pub async fn expect_closed(ws: &mut WsClient) {
    let outcome = tokio::time::timeout(RECV_TIMEOUT, async {
        while let Some(frame) = ws.next().await {
            match frame {
                Ok(Message::Close(_)) => return,
                Ok(_) => continue,
                Err(_) => return,
            }
        }
    })
    .await;
    outcome.expect("connection did not close");
}
