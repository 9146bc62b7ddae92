//! Actions players can submit.
//!
//! On the wire an action is `{"type": "<kind>", "payload": {...}}`; the kinds
//! without data omit `payload`.

use crate::animal::AnimalCardId;
use crate::hex::HexCoord;
use crate::state::PlayerId;
use crate::token::TokenId;
use serde::{Deserialize, Serialize};

/// All possible actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Action {
    // ==================== Room ====================
    /// Register (or rename) a player in the room
    JoinGame { id: PlayerId, name: String },
    /// Deal the game out to everyone who has joined
    StartGame,

    // ==================== Turn Actions ====================
    /// Take every token from a central-board zone
    TakeTokens { zone: usize },
    /// Put a taken token on the player's board; `coords` is a `"(q,r)"` key
    #[serde(rename_all = "camelCase")]
    PlaceToken { token_id: TokenId, coords: String },
    /// Take a card from the face-up spread
    TakeAnimalCard { index: usize },
    /// Move a cube from a held card onto a matching board cell
    #[serde(rename_all = "camelCase")]
    PlaceCube {
        animal_card_id: AnimalCardId,
        hex: HexCoord,
    },
    /// Pass play to the next player
    EndTurn,

    // ==================== History ====================
    /// Revert the most recent action
    Undo,
}

impl Action {
    /// The wire name of this action's kind
    pub fn kind(&self) -> &'static str {
        match self {
            Action::JoinGame { .. } => "joinGame",
            Action::StartGame => "startGame",
            Action::TakeTokens { .. } => "takeTokens",
            Action::PlaceToken { .. } => "placeToken",
            Action::TakeAnimalCard { .. } => "takeAnimalCard",
            Action::PlaceCube { .. } => "placeCube",
            Action::EndTurn => "endTurn",
            Action::Undo => "undo",
        }
    }
}
