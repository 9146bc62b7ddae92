//! WebSocket server and connection handling.

use crate::config::ServerConfig;
use crate::protocol::{self, Broadcast};
use crate::room::{Room, ServerError};
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::{accept_hdr_async, tungstenite::Message};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Room used when a client connects to `/`
const DEFAULT_ROOM: &str = "default";

/// Server state shared across all connections.
pub struct ServerState {
    pub config: ServerConfig,
    /// All rooms, by id
    pub rooms: DashMap<String, Room>,
    /// Mapping from connection ID to its message sender
    pub senders: DashMap<Uuid, mpsc::UnboundedSender<Broadcast>>,
}

impl ServerState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            rooms: DashMap::new(),
            senders: DashMap::new(),
        }
    }

    /// Send a message to a specific connection.
    pub fn send_to(&self, conn: Uuid, msg: Broadcast) {
        if let Some(sender) = self.senders.get(&conn) {
            let _ = sender.send(msg);
        }
    }

    /// Send a message to every connection in `room`.
    ///
    /// Callers hold the room's guard, so broadcasts from one room never
    /// interleave.
    pub fn broadcast(&self, room: &Room, msg: Broadcast) {
        for conn in room.connections() {
            self.send_to(*conn, msg.clone());
        }
    }
}

/// Room id for a request path: `/rooms/<id>`, `/<id>`, or the default room.
pub fn room_id_from_path(path: &str) -> String {
    let path = path.trim_matches('/');
    let id = path.strip_prefix("rooms/").unwrap_or(path).trim_matches('/');
    if id.is_empty() || id == "rooms" {
        DEFAULT_ROOM.to_string()
    } else {
        id.to_string()
    }
}

/// Run the WebSocket server.
pub async fn run_server(state: Arc<ServerState>) -> anyhow::Result<()> {
    let addr = state.config.addr;
    let listener = TcpListener::bind(addr).await?;
    info!("Harmonies server listening on {}", addr);

    while let Ok((stream, peer_addr)) = listener.accept().await {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer_addr, state).await {
                error!("Connection error from {}: {}", peer_addr, e);
            }
        });
    }

    Ok(())
}

/// Handle a single WebSocket connection.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    state: Arc<ServerState>,
) -> anyhow::Result<()> {
    let mut path = String::new();
    let capture_path = |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
        path = req.uri().path().to_string();
        Ok(resp)
    };
    let ws_stream = accept_hdr_async(stream, capture_path).await?;
    let room_id = room_id_from_path(&path);
    let conn = Uuid::new_v4();
    info!(%conn, room = %room_id, "New WebSocket connection from {}", addr);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    // Create channel for outgoing messages
    let (tx, mut rx) = mpsc::unbounded_channel::<Broadcast>();
    state.senders.insert(conn, tx);

    // Spawn task to forward messages from channel to WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(text) => {
                    if ws_sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(e) => error!("Failed to encode message: {}", e),
            }
        }
    });

    // Register with the room and show the newcomer where things stand
    {
        let seed = state.config.seed;
        let mut room = state
            .rooms
            .entry(room_id.clone())
            .or_insert_with(|| Room::new(room_id.clone(), seed));
        room.connect(conn);
        state.send_to(
            conn,
            Broadcast::GameState {
                payload: room.public_state(),
            },
        );
    }

    // Handle incoming messages
    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => handle_message(conn, &room_id, &text, &state),
            Ok(Message::Close(_)) => {
                info!("Client {} closing connection", conn);
                break;
            }
            Err(e) => {
                error!("WebSocket error from {}: {}", conn, e);
                break;
            }
            _ => {}
        }
    }

    // Clean up on disconnect
    handle_disconnect(conn, &room_id, &state);
    state.senders.remove(&conn);
    send_task.abort();

    info!("Connection closed for {}", conn);
    Ok(())
}

/// Handle a client text frame.
fn handle_message(conn: Uuid, room_id: &str, text: &str, state: &ServerState) {
    let action = match protocol::parse_action(text) {
        Ok(action) => action,
        Err(e) => {
            warn!("Invalid message from {}: {}", conn, text);
            state.send_to(conn, Broadcast::error(&e));
            return;
        }
    };

    let Some(mut room) = state.rooms.get_mut(room_id) else {
        error!("Connection {} has no room {}", conn, room_id);
        return;
    };

    let kind = action.kind();
    match room.handle(conn, action) {
        Ok(public) => {
            debug!(%conn, room = %room.id, "Applied {}", kind);
            state.broadcast(&room, Broadcast::GameState { payload: public });
        }
        Err(e) => {
            match &e {
                ServerError::Game(game) if game.is_invariant_violation() => {
                    error!(%conn, room = %room.id, "Invariant violated by {}: {}", kind, game)
                }
                ServerError::Game(game) => {
                    debug!(%conn, room = %room.id, "Rejected {}: {}", kind, game)
                }
                ServerError::NotJoined
                | ServerError::AlreadyJoined(_)
                | ServerError::InvalidMessage(_) => {
                    warn!(%conn, room = %room.id, "Refused {}: {}", kind, e)
                }
            }
            state.send_to(conn, Broadcast::error(&e));
        }
    }
}

/// Handle connection close.
fn handle_disconnect(conn: Uuid, room_id: &str, state: &ServerState) {
    if let Some(mut room) = state.rooms.get_mut(room_id) {
        room.disconnect(conn);
    }
    // Idle rooms nobody watches are dropped; running games stay for rejoining.
    if state
        .rooms
        .remove_if(room_id, |_, room| room.is_abandoned())
        .is_some()
    {
        info!("Removed empty room {}", room_id);
    }
}
