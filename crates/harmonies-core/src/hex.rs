//! Hex coordinate system using axial coordinates (q, r).
//!
//! Player boards are laid out on a hex grid. Every cell is identified by a
//! `HexCoord`, and card footprints are expressed as offsets relative to an
//! anchor cell, so matching a footprint is rotation plus translation.
//!
//! Board cells are keyed on the wire by the literal string `"(q,r)"`. That
//! format is what clients use to address cells, so `Display` and `FromStr`
//! must stay exact inverses of each other.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Axial coordinate for hex grid.
///
/// In axial coordinates:
/// - `q` increases going east (right)
/// - `r` increases going southeast
/// - The third coordinate `s` (not stored) satisfies: q + r + s = 0
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct HexCoord {
    /// Column (increases going east)
    pub q: i32,
    /// Row (increases going southeast)
    pub r: i32,
}

/// A cell key that is not of the form `"(q,r)"`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid hex coordinate key {0:?}")]
pub struct ParseCoordError(pub String);

impl HexCoord {
    /// Create a new hex coordinate
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// The implicit third coordinate (s = -q - r)
    pub const fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// The six neighboring hexes in clockwise order starting from East
    pub fn neighbors(&self) -> [HexCoord; 6] {
        [
            HexCoord::new(self.q + 1, self.r),     // East
            HexCoord::new(self.q + 1, self.r - 1), // NorthEast
            HexCoord::new(self.q, self.r - 1),     // NorthWest
            HexCoord::new(self.q - 1, self.r),     // West
            HexCoord::new(self.q - 1, self.r + 1), // SouthWest
            HexCoord::new(self.q, self.r + 1),     // SouthEast
        ]
    }

    /// Distance to another hex (in hex steps)
    pub fn distance_to(&self, other: &HexCoord) -> u32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        ((dq + dr + ds) / 2) as u32
    }

    /// Rotate 60° around the origin: (q, r) becomes (-r, -s).
    pub const fn rotate_once(self) -> Self {
        Self::new(-self.r, -self.s())
    }

    /// Rotate around the origin by `steps * 60°`.
    ///
    /// Six steps is a full turn, so `steps` is taken modulo 6.
    pub fn rotate(self, steps: usize) -> Self {
        (0..steps % 6).fold(self, |coord, _| coord.rotate_once())
    }

    /// Vector addition
    pub const fn translate(self, delta: HexCoord) -> Self {
        Self::new(self.q + delta.q, self.r + delta.r)
    }

    /// The wire key of this cell, `"(q,r)"`
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.q, self.r)
    }
}

impl FromStr for HexCoord {
    type Err = ParseCoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseCoordError(s.to_string());
        let inner = s
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(err)?;
        let (q, r) = inner.split_once(',').ok_or_else(err)?;
        let q = q.parse().map_err(|_| err())?;
        let r = r.parse().map_err(|_| err())?;
        Ok(Self::new(q, r))
    }
}

/// Anchor a list of relative offsets at `origin`.
pub fn path_from(origin: HexCoord, offsets: &[HexCoord]) -> Vec<HexCoord> {
    offsets.iter().map(|offset| offset.translate(origin)).collect()
}

/// Serde adapter that writes a `HexCoord` as its `"(q,r)"` key.
pub mod coord_key {
    use super::HexCoord;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(coord: &HexCoord, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(coord)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<HexCoord, D::Error> {
        let key = String::deserialize(deserializer)?;
        key.parse().map_err(de::Error::custom)
    }
}
