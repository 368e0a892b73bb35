// WebSocket plumbing for the client: one task reads frames off the socket,
// one task writes queued messages. Handlers on the receive side only parse
// and enqueue; nothing here blocks a render frame.

use futures_util::{SinkExt, StreamExt};
use shared::{ClientMessage, ServerMessage};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite};
use tracing::{debug, warn};

const OUTGOING_CAPACITY: usize = 64;
const INCOMING_CAPACITY: usize = 256;

#[derive(Debug)]
pub enum NetError {
    Connect(tungstenite::Error),
}

impl std::fmt::Display for NetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetError::Connect(e) => write!(f, "failed to connect: {e}"),
        }
    }
}

impl std::error::Error for NetError {}

/// A connected session transport.
///
/// Dropping the `outgoing` sender closes the write side; the `incoming`
/// receiver yields `None` once the server closes the connection.
pub struct Connection {
    pub outgoing: mpsc::Sender<ClientMessage>,
    pub incoming: mpsc::Receiver<ServerMessage>,
}

impl Connection {
    pub async fn open(url: &str) -> Result<Connection, NetError> {
        let (socket, _response) = connect_async(url).await.map_err(NetError::Connect)?;
        let (mut sink, mut stream) = socket.split();

        let (outgoing_tx, mut outgoing_rx) = mpsc::channel::<ClientMessage>(OUTGOING_CAPACITY);
        let (incoming_tx, incoming_rx) = mpsc::channel::<ServerMessage>(INCOMING_CAPACITY);

        // Writer: serialize and push queued client messages.
        tokio::spawn(async move {
            while let Some(message) = outgoing_rx.recv().await {
                let text = match serde_json::to_string(&message) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(error = %e, "failed to serialize client message");
                        continue;
                    }
                };
                if let Err(e) = sink.send(tungstenite::Message::text(text)).await {
                    warn!(error = %e, "websocket send failed; writer exiting");
                    break;
                }
            }
            let _ = sink.close().await;
        });

        // Reader: parse frames and hand them to the session.
        tokio::spawn(async move {
            while let Some(frame) = stream.next().await {
                let frame = match frame {
                    Ok(frame) => frame,
                    Err(e) => {
                        warn!(error = %e, "websocket recv error; reader exiting");
                        break;
                    }
                };

                match frame {
                    tungstenite::Message::Text(text) => {
                        match serde_json::from_str::<ServerMessage>(text.as_str()) {
                            Ok(message) => {
                                if incoming_tx.send(message).await.is_err() {
                                    // Session dropped its receiver; stop reading.
                                    break;
                                }
                            }
                            Err(e) => {
                                warn!(error = %e, "unparseable server message dropped");
                            }
                        }
                    }
                    tungstenite::Message::Close(frame) => {
                        debug!(?frame, "server closed the connection");
                        break;
                    }
                    _ => {}
                }
            }
        });

        Ok(Connection {
            outgoing: outgoing_tx,
            incoming: incoming_rx,
        })
    }
}
