//! Animal cards, animal cubes, and footprint matching.
//!
//! An animal card carries a footprint: a set of cells relative to an anchor,
//! each demanding a particular token color on top of a stack of a particular
//! height. Holding the card puts one cube on each of its score slots; a cube
//! can be moved onto the player's board wherever the footprint matches, in
//! any of the six rotations.

use crate::board::{BoardGrid, PlayerBoard};
use crate::hex::{self, coord_key, HexCoord};
use crate::state::PlayerId;
use crate::token::TokenColor::{self, Blue, Gray, Green, Red, Yellow};
use serde::{Deserialize, Serialize};

/// Identifier of an animal card, the animal's name (e.g. `"alligator"`)
pub type AnimalCardId = String;

/// Identifier of an animal cube, `cube-<n>`
pub type CubeId = String;

/// Number of animal cubes in the game
pub const CUBE_COUNT: usize = 66;

/// Face-up card slots
pub const SPREAD_SIZE: usize = 5;

/// Most cards a player may hold at once
pub const HAND_SIZE: usize = 4;

/// One cell of a card's footprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeCell {
    /// Offset from the anchor cell
    pub offset: HexCoord,
    /// Color the top token must have
    pub color: TokenColor,
    /// 0-based depth of that top token (stack height - 1)
    pub depth: usize,
}

/// Where an animal card currently is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CardPlacement {
    InDeck,
    InSpread { index: usize },
    InHand { player: PlayerId, index: usize },
    Completed { player: PlayerId },
}

/// An animal card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimalCard {
    pub id: AnimalCardId,
    /// Points per score slot, lowest first
    pub scores: Vec<u32>,
    pub shape: Vec<ShapeCell>,
    pub placement: CardPlacement,
}

impl AnimalCard {
    /// Whether this card is in `player`'s hand
    pub fn is_held_by(&self, player: &str) -> bool {
        matches!(&self.placement, CardPlacement::InHand { player: p, .. } if p == player)
    }
}

/// Where an animal cube currently is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CubePlacement {
    InPouch,
    #[serde(rename_all = "camelCase")]
    OnCard { card_id: AnimalCardId, index: usize },
    OnPlayerBoard {
        player: PlayerId,
        #[serde(with = "coord_key")]
        coords: HexCoord,
    },
}

/// An animal cube
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimalCube {
    pub id: CubeId,
    pub placement: CubePlacement,
}

impl AnimalCube {
    /// The score slot this cube covers on `card_id`, if any
    pub fn slot_on(&self, card_id: &str) -> Option<usize> {
        match &self.placement {
            CubePlacement::OnCard { card_id: c, index } if c == card_id => Some(*index),
            _ => None,
        }
    }
}

struct CatalogEntry {
    id: &'static str,
    scores: &'static [u32],
    shape: &'static [(i32, i32, TokenColor, usize)],
}

const CATALOG: [CatalogEntry; 32] = [
    CatalogEntry {
        id: "alligator",
        scores: &[4, 9, 15],
        shape: &[(0, 0, Blue, 0), (1, 0, Blue, 0), (2, 0, Green, 2)],
    },
    CatalogEntry {
        id: "alpaca",
        scores: &[5, 12],
        shape: &[(0, 0, Yellow, 0), (1, 0, Yellow, 0), (2, 0, Gray, 1)],
    },
    CatalogEntry {
        id: "arctic_fox",
        scores: &[5, 12],
        shape: &[(0, 0, Yellow, 0), (1, 0, Green, 1), (-1, 1, Green, 1)],
    },
    CatalogEntry {
        id: "bat",
        scores: &[3, 6, 10, 15],
        shape: &[(0, 0, Gray, 0), (1, 0, Green, 2)],
    },
    CatalogEntry {
        id: "bear",
        scores: &[5, 11],
        shape: &[(0, 0, Green, 0), (1, 0, Gray, 1), (0, 1, Gray, 1)],
    },
    CatalogEntry {
        id: "bee",
        scores: &[8, 18],
        shape: &[(0, 0, Green, 1), (1, 0, Yellow, 0), (0, 1, Yellow, 0), (-1, 1, Yellow, 0)],
    },
    CatalogEntry {
        id: "boar",
        scores: &[4, 8, 13],
        shape: &[(0, 0, Green, 1), (1, 0, Red, 1)],
    },
    CatalogEntry {
        id: "crow",
        scores: &[4, 9],
        shape: &[(0, 0, Yellow, 0), (1, 0, Red, 1), (-1, 1, Red, 1)],
    },
    CatalogEntry {
        id: "duck",
        scores: &[2, 4, 8, 13],
        shape: &[(0, 0, Blue, 0), (1, 0, Red, 1)],
    },
    CatalogEntry {
        id: "falcon",
        scores: &[5, 11],
        shape: &[(0, 0, Gray, 2), (1, 0, Yellow, 0)],
    },
    CatalogEntry {
        id: "fennec_fox",
        scores: &[4, 9, 16],
        shape: &[(0, 0, Gray, 0), (1, 0, Gray, 0), (2, 0, Yellow, 0)],
    },
    CatalogEntry {
        id: "fish",
        scores: &[3, 6, 10, 16],
        shape: &[(0, 0, Blue, 0), (1, 0, Gray, 2)],
    },
    CatalogEntry {
        id: "flamingo",
        scores: &[4, 10, 16],
        shape: &[(0, 0, Blue, 0), (1, 0, Yellow, 0), (0, 1, Yellow, 0)],
    },
    CatalogEntry {
        id: "frog",
        scores: &[2, 4, 6, 10, 15],
        shape: &[(0, 0, Blue, 0), (1, 0, Green, 0)],
    },
    CatalogEntry {
        id: "hedgehog",
        scores: &[5, 12],
        shape: &[(0, 0, Red, 1), (1, 0, Green, 1), (0, 1, Green, 1)],
    },
    CatalogEntry {
        id: "kingfisher",
        scores: &[5, 11, 18],
        shape: &[(0, 0, Green, 2), (1, 0, Blue, 0), (-1, 1, Blue, 0)],
    },
    CatalogEntry {
        id: "koala",
        scores: &[3, 6, 10, 15],
        shape: &[(0, 0, Green, 1), (1, 0, Green, 0)],
    },
    CatalogEntry {
        id: "ladybug",
        scores: &[2, 5, 8, 12, 17],
        shape: &[(0, 0, Yellow, 0), (1, 0, Green, 0)],
    },
    CatalogEntry {
        id: "lizard",
        scores: &[5, 10, 16],
        shape: &[(0, 0, Red, 1), (1, 0, Yellow, 0), (2, 0, Yellow, 0)],
    },
    CatalogEntry {
        id: "macaque",
        scores: &[5, 11],
        shape: &[(0, 0, Gray, 1), (1, 0, Blue, 0), (0, 1, Blue, 0)],
    },
    CatalogEntry {
        id: "macaw",
        scores: &[4, 9, 14],
        shape: &[(0, 0, Green, 1), (1, 0, Blue, 0), (0, 1, Blue, 0)],
    },
    CatalogEntry {
        id: "meerkat",
        scores: &[2, 5, 9, 14],
        shape: &[(0, 0, Gray, 0), (1, 0, Yellow, 0)],
    },
    CatalogEntry {
        id: "otter",
        scores: &[5, 10, 16],
        shape: &[(0, 0, Blue, 0), (1, 0, Green, 0), (2, 0, Green, 0)],
    },
    CatalogEntry {
        id: "panther",
        scores: &[5, 11],
        shape: &[(0, 0, Yellow, 0), (1, 0, Green, 0), (2, 0, Green, 0)],
    },
    CatalogEntry {
        id: "peacock",
        scores: &[5, 10, 17],
        shape: &[(0, 0, Red, 1), (1, 0, Blue, 0), (-1, 1, Blue, 0)],
    },
    CatalogEntry {
        id: "penguin",
        scores: &[4, 10, 16],
        shape: &[(0, 0, Gray, 0), (1, 0, Blue, 0), (-1, 1, Blue, 0)],
    },
    CatalogEntry {
        id: "rabbit",
        scores: &[5, 10, 17],
        shape: &[(0, 0, Green, 0), (1, 0, Green, 0), (2, 0, Red, 1)],
    },
    CatalogEntry {
        id: "raccoon",
        scores: &[6, 12],
        shape: &[(0, 0, Yellow, 0), (1, 0, Blue, 0), (0, 1, Blue, 0), (-1, 1, Blue, 0)],
    },
    CatalogEntry {
        id: "ray",
        scores: &[4, 10, 16],
        shape: &[(0, 0, Blue, 0), (1, 0, Gray, 0), (0, 1, Gray, 0)],
    },
    CatalogEntry {
        id: "shrew",
        scores: &[5, 10, 17],
        shape: &[(0, 0, Red, 1), (1, 0, Yellow, 0), (-1, 1, Yellow, 0)],
    },
    CatalogEntry {
        id: "squirrel",
        scores: &[4, 9, 15],
        shape: &[(0, 0, Red, 1), (1, 0, Green, 2)],
    },
    CatalogEntry {
        id: "wolf",
        scores: &[4, 10, 16],
        shape: &[(0, 0, Green, 2), (1, 0, Yellow, 0), (0, 1, Yellow, 0)],
    },
];

/// Every animal card, all in the deck, in catalog order.
pub fn standard_deck() -> Vec<AnimalCard> {
    CATALOG
        .iter()
        .map(|spec| AnimalCard {
            id: spec.id.to_string(),
            scores: spec.scores.to_vec(),
            shape: spec
                .shape
                .iter()
                .map(|&(q, r, color, depth)| ShapeCell {
                    offset: HexCoord::new(q, r),
                    color,
                    depth,
                })
                .collect(),
            placement: CardPlacement::InDeck,
        })
        .collect()
}

/// All animal cubes, in the pouch.
pub fn standard_cubes() -> Vec<AnimalCube> {
    (0..CUBE_COUNT)
        .map(|i| AnimalCube {
            id: format!("cube-{i}"),
            placement: CubePlacement::InPouch,
        })
        .collect()
}

/// Whether a cube for a card with footprint `shape` may go on `anchor`.
///
/// The anchor must not already hold a cube, and in at least one of the six
/// rotations every footprint cell must land on the grid on a stack whose top
/// token has the required color at the required depth. A rotation that leaves
/// the grid simply fails; the remaining rotations are still tried.
pub fn can_place_cube(
    shape: &[ShapeCell],
    grid: &BoardGrid,
    anchor: HexCoord,
    board: &PlayerBoard,
) -> bool {
    if board.get(&anchor.key()).is_some_and(|place| place.cube.is_some()) {
        return false;
    }

    (0..6).any(|rotation| matches_rotation(shape, grid, anchor, board, rotation))
}

fn matches_rotation(
    shape: &[ShapeCell],
    grid: &BoardGrid,
    anchor: HexCoord,
    board: &PlayerBoard,
    rotation: usize,
) -> bool {
    let offsets: Vec<HexCoord> = shape
        .iter()
        .map(|cell| cell.offset.rotate(rotation))
        .collect();
    let cells = hex::path_from(anchor, &offsets);
    shape.iter().zip(cells).all(|(cell, coord)| {
        if !grid.contains(&coord) {
            return false;
        }
        board.get(&coord.key()).is_some_and(|place| match place.top() {
            Some(top) => top.color == cell.color && place.height() - 1 == cell.depth,
            None => false,
        })
    })
}

/// Cells of `grid` where a cube for `shape` could be placed on `board`.
pub fn valid_cube_spots(
    shape: &[ShapeCell],
    board: &PlayerBoard,
    grid: &BoardGrid,
) -> Vec<HexCoord> {
    grid.cells()
        .iter()
        .filter(|&&cell| can_place_cube(shape, grid, cell, board))
        .copied()
        .collect()
}
