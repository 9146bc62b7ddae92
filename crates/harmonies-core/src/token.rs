//! Landscape tokens.
//!
//! Tokens are the six-colored pieces players stack on their boards. Every
//! token has exactly one placement at a time, and under normal play moves
//! pouch → central board → taken → player board (undo can move it back).

use crate::hex::{coord_key, HexCoord};
use crate::state::PlayerId;
use serde::{Deserialize, Serialize};

/// Identifier of a token, `token-<n>`
pub type TokenId = String;

/// Number of central-board zones
pub const ZONE_COUNT: usize = 5;

/// Tokens per central-board zone, and per player's taken area
pub const TOKENS_PER_ZONE: usize = 3;

/// Token colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenColor {
    /// Water
    Blue,
    /// Mountain
    Gray,
    /// Trunk
    Brown,
    /// Foliage
    Green,
    /// Field
    Yellow,
    /// Building
    Red,
}

impl TokenColor {
    /// All token colors
    pub const ALL: [TokenColor; 6] = [
        TokenColor::Blue,
        TokenColor::Gray,
        TokenColor::Brown,
        TokenColor::Green,
        TokenColor::Yellow,
        TokenColor::Red,
    ];

    /// How many tokens of this color are in the full pool
    pub const fn pool_count(self) -> usize {
        match self {
            TokenColor::Blue => 23,
            TokenColor::Gray => 23,
            TokenColor::Brown => 21,
            TokenColor::Green => 19,
            TokenColor::Yellow => 19,
            TokenColor::Red => 15,
        }
    }
}

/// Where a token currently is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TokenPlacement {
    /// Face-down reserve
    InPouch,
    /// On the shared central board
    OnCentralBoard { zone: usize, slot: usize },
    /// Taken by a player this turn, not yet placed
    TakenByPlayer { player: PlayerId, slot: usize },
    /// Stacked on a player's board; `stack_depth` is 0 for the bottom token
    #[serde(rename_all = "camelCase")]
    OnPlayerBoard {
        player: PlayerId,
        #[serde(with = "coord_key")]
        coords: HexCoord,
        stack_depth: usize,
    },
}

/// A single token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub id: TokenId,
    pub color: TokenColor,
    pub placement: TokenPlacement,
}

impl Token {
    pub fn new(id: impl Into<TokenId>, color: TokenColor) -> Self {
        Self {
            id: id.into(),
            color,
            placement: TokenPlacement::InPouch,
        }
    }

    /// Whether this token has been taken by `player` and is waiting to be placed
    pub fn is_taken_by(&self, player: &str) -> bool {
        matches!(&self.placement, TokenPlacement::TakenByPlayer { player: p, .. } if p == player)
    }
}

/// The full token pool, in color order, all in the pouch.
pub fn standard_pool() -> Vec<Token> {
    TokenColor::ALL
        .iter()
        .flat_map(|&color| std::iter::repeat(color).take(color.pool_count()))
        .enumerate()
        .map(|(i, color)| Token::new(format!("token-{i}"), color))
        .collect()
}
