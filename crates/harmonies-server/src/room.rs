//! Game room management.
//!
//! A [`Room`] ties the engine's [`GameRoom`] to the sockets connected to it.
//! Each connection learns its player id from its first `joinGame` and keeps
//! it; later joins may only rename that player.

use harmonies_core::{Action, GameError, GameRoom, PlayerId, PublicState, RoomPhase};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Join the game before sending actions")]
    NotJoined,

    #[error("This connection already joined as {0}")]
    AlreadyJoined(PlayerId),

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error(transparent)]
    Game(#[from] GameError),
}

/// A game room and the connections watching it.
pub struct Room {
    pub id: String,
    game: GameRoom,
    /// Connection id -> player id, once the connection has joined
    connections: HashMap<Uuid, Option<PlayerId>>,
    rng: StdRng,
}

impl Room {
    pub fn new(id: impl Into<String>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            id: id.into(),
            game: GameRoom::new(),
            connections: HashMap::new(),
            rng,
        }
    }

    pub fn connect(&mut self, conn: Uuid) {
        self.connections.entry(conn).or_insert(None);
    }

    pub fn disconnect(&mut self, conn: Uuid) {
        self.connections.remove(&conn);
    }

    pub fn connections(&self) -> impl Iterator<Item = &Uuid> {
        self.connections.keys()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// The player a connection joined as
    pub fn player_of(&self, conn: Uuid) -> Option<&PlayerId> {
        self.connections.get(&conn).and_then(Option::as_ref)
    }

    /// Nobody is connected and no game is running, so the room can go.
    pub fn is_abandoned(&self) -> bool {
        self.connections.is_empty() && matches!(self.game.phase(), RoomPhase::Idle)
    }

    pub fn public_state(&self) -> PublicState {
        self.game.public_state()
    }

    /// Run `action` from connection `conn` through the game.
    pub fn handle(&mut self, conn: Uuid, action: Action) -> Result<PublicState, ServerError> {
        let player = match &action {
            Action::JoinGame { id, .. } => {
                if let Some(joined) = self.player_of(conn).filter(|joined| *joined != id) {
                    return Err(ServerError::AlreadyJoined(joined.clone()));
                }
                self.connections.insert(conn, Some(id.clone()));
                id.clone()
            }
            _ => self.player_of(conn).cloned().ok_or(ServerError::NotJoined)?,
        };
        Ok(self.game.on_action_with_rng(&player, action, &mut self.rng)?)
    }
}
