//! WebSocket protocol messages for Harmonies rooms.
//!
//! Clients send [`Action`]s as `{"type": ..., "payload": ...}`; the server
//! answers with [`Broadcast`]s.

use crate::room::ServerError;
use harmonies_core::{Action, PublicState};
use serde::Serialize;

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Broadcast {
    /// The room's current public state, sent to everyone in the room
    GameState { payload: PublicState },

    /// A rejected message, sent only to the connection that sent it
    Error { message: String },
}

impl Broadcast {
    pub fn error(err: &ServerError) -> Self {
        Broadcast::Error {
            message: err.to_string(),
        }
    }
}

/// Parse a client text frame into an action.
pub fn parse_action(text: &str) -> Result<Action, ServerError> {
    serde_json::from_str(text).map_err(|e| ServerError::InvalidMessage(e.to_string()))
}
