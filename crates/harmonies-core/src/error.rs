//! Errors raised while validating or applying actions.

use crate::hex::HexCoord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why an action was refused.
///
/// Everything except [`GameError::Invariant`] is an ordinary rejection: the
/// player asked for something the rules don't allow, and state is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("Game has not started")]
    GameNotStarted,

    #[error("Game already started")]
    GameAlreadyStarted,

    #[error("No players have joined")]
    NoPlayers,

    #[error("Not your turn")]
    NotYourTurn,

    #[error("You already took tokens this turn")]
    TokensAlreadyTaken,

    #[error("There is no zone {0} on the central board")]
    InvalidZone(usize),

    #[error("Zone {0} is empty")]
    EmptyZone(usize),

    #[error("You are not holding token {0}")]
    TokenNotHeld(String),

    #[error("Invalid coordinates {0:?}")]
    InvalidCoords(String),

    #[error("{0} is not on your board")]
    OffBoard(HexCoord),

    #[error("That token cannot be stacked on {0}")]
    StackNotAllowed(HexCoord),

    #[error("Your hand is full")]
    HandFull,

    #[error("There is no animal card slot {0}")]
    InvalidSpreadIndex(usize),

    #[error("Animal card slot {0} is empty")]
    EmptySpreadSlot(usize),

    #[error("You already took an animal card this turn")]
    AnimalCardAlreadyTaken,

    #[error("Animal card {0} is not in your hand")]
    CardNotInHand(String),

    #[error("Animal card {0} has no cubes left")]
    NoCubesLeft(String),

    #[error("{0} already has a cube")]
    CellOccupied(HexCoord),

    #[error("The pattern does not match at {0}")]
    PatternMismatch(HexCoord),

    #[error("Take tokens before ending your turn")]
    TokensNotTaken,

    #[error("Place all your tokens before ending your turn")]
    TokensNotPlaced,

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("That action cannot be undone")]
    CannotUndo,

    #[error("Internal error: {0}")]
    Invariant(#[from] InvariantViolation),
}

impl GameError {
    /// True for states the engine should never reach; false for rejections.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, GameError::Invariant(_))
    }
}

/// A state that validation should have made unreachable.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum InvariantViolation {
    #[error("no current player")]
    NoCurrentPlayer,

    #[error("invalid central board state: no zone to refill")]
    InvalidCentralBoard,

    #[error("{0} is not a turn action")]
    NotATurnAction(String),

    #[error("token {0} does not exist")]
    UnknownToken(String),

    #[error("animal card {0} does not exist")]
    UnknownCard(String),
}
