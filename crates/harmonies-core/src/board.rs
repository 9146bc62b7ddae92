//! Player board layouts and the token stacking rule.
//!
//! This module contains:
//! - Board sides and the legal hex set for each
//! - `Place`, the public view of one board cell
//! - The stacking table deciding which token may go on which stack

use crate::animal::CubeId;
use crate::hex::HexCoord;
use crate::token::{Token, TokenColor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tallest stack a cell can hold
pub const MAX_STACK_HEIGHT: usize = 3;

/// Side A of the player board: 23 cells in five columns.
const SIDE_A: [(i32, i32); 23] = [
    (0, 0),
    (0, 1),
    (0, 2),
    (0, 3),
    (0, 4),
    (1, 0),
    (1, 1),
    (1, 2),
    (1, 3),
    (2, -1),
    (2, 0),
    (2, 1),
    (2, 2),
    (2, 3),
    (3, -1),
    (3, 0),
    (3, 1),
    (3, 2),
    (4, -2),
    (4, -1),
    (4, 0),
    (4, 1),
    (4, 2),
];

/// Which side of the player board is in use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BoardType {
    #[default]
    A,
    B,
}

/// The legal cells of a board side, in layout order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardGrid {
    cells: Vec<HexCoord>,
}

impl BoardGrid {
    pub fn for_board(board_type: BoardType) -> Self {
        // TODO: side B has its own layout; until it is transcribed both sides share side A.
        let layout: &[(i32, i32)] = match board_type {
            BoardType::A | BoardType::B => &SIDE_A,
        };
        Self {
            cells: layout.iter().map(|&(q, r)| HexCoord::new(q, r)).collect(),
        }
    }

    pub fn contains(&self, coord: &HexCoord) -> bool {
        self.cells.contains(coord)
    }

    pub fn cells(&self) -> &[HexCoord] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// `[q, r]` pairs, the shape clients receive
    pub fn to_pairs(&self) -> Vec<(i32, i32)> {
        self.cells.iter().map(|c| (c.q, c.r)).collect()
    }
}

/// One cell of a player's board as seen by clients
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    /// Bottom to top
    pub tokens: Vec<Token>,
    pub cube: Option<CubeId>,
}

impl Place {
    pub fn top(&self) -> Option<&Token> {
        self.tokens.last()
    }

    pub fn height(&self) -> usize {
        self.tokens.len()
    }
}

/// A player's board keyed by `"(q,r)"`
pub type PlayerBoard = BTreeMap<String, Place>;

/// Whether a `candidate` token may go on a stack of `height` whose top is `top`.
pub fn can_stack(candidate: TokenColor, height: usize, top: Option<TokenColor>) -> bool {
    use TokenColor::*;

    if height >= MAX_STACK_HEIGHT {
        return false;
    }
    match (height, top) {
        (0, _) => true,
        (1, Some(top)) => match candidate {
            Blue | Yellow => false,
            Gray => top == Gray,
            Brown => top == Brown,
            Green => top == Brown,
            Red => matches!(top, Gray | Brown | Red),
        },
        (2, Some(top)) => match candidate {
            Gray => top == Gray,
            Green => top == Brown,
            Blue | Yellow | Brown | Red => false,
        },
        _ => false,
    }
}

/// Whether `candidate` may be placed on top of `stack` (bottom to top).
pub fn token_placeable(candidate: TokenColor, stack: &[Token]) -> bool {
    can_stack(candidate, stack.len(), stack.last().map(|t| t.color))
}

/// Cells of `grid` where a `color` token could be placed on `board`.
pub fn valid_token_spots(
    board: &PlayerBoard,
    grid: &BoardGrid,
    color: TokenColor,
) -> Vec<HexCoord> {
    grid.cells()
        .iter()
        .filter(|cell| {
            let stack = board.get(&cell.key()).map(|p| p.tokens.as_slice()).unwrap_or(&[]);
            token_placeable(color, stack)
        })
        .copied()
        .collect()
}
