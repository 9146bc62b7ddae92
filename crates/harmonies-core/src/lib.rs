//! Harmonies - rules engine for the hex tile-placement board game
//!
//! This crate holds the authoritative game logic:
//! - Hex coordinates and rotations for player boards
//! - Tokens, animal cards and cubes, each tracked by a placement tag
//! - The private game state and its public projection for clients
//! - Validation and application of every player action, with undo
//!
//! # Architecture
//!
//! The engine does no I/O. It can be compiled to:
//! - Native Rust for the WebSocket room server
//! - WebAssembly, so browser clients can run the placement checks locally
//!
//! # Modules
//!
//! - [`hex`]: Axial coordinates, rotation and `"(q,r)"` cell keys
//! - [`token`], [`animal`]: Game pieces and their placements
//! - [`board`]: Board layouts and the stacking rule
//! - [`state`]: The private state and deal
//! - [`derive`]: Public projection
//! - [`rules`]: Per-action validation and application
//! - [`game`]: Room state machine with undo history

pub mod actions;
pub mod animal;
pub mod board;
pub mod derive;
pub mod error;
pub mod game;
pub mod hex;
pub mod history;
pub mod rules;
pub mod state;
pub mod token;
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use actions::Action;
pub use animal::{
    can_place_cube, valid_cube_spots, AnimalCard, AnimalCube, CardPlacement, CubePlacement,
    ShapeCell,
};
pub use board::{token_placeable, valid_token_spots, BoardGrid, BoardType, Place, PlayerBoard};
pub use derive::{
    derive_public_game_state, PlayerGameState, PlayerMeta, PublicGameState, PublicState, Roster,
};
pub use error::{GameError, InvariantViolation};
pub use game::{ActiveGame, GameRoom, RoomPhase};
pub use hex::HexCoord;
pub use history::{History, HistoryEntry};
pub use state::{PlayerId, PrivateGameState};
pub use token::{Token, TokenColor, TokenPlacement};
