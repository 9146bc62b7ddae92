//! Projection of the private state into what clients see.
//!
//! The public view is recomputed from scratch on every call; nothing is
//! cached between calls, so deriving for several broadcasts in a row always
//! yields the same value for the same private state.

use crate::animal::{
    AnimalCard, CardPlacement, CubeId, CubePlacement, ShapeCell, HAND_SIZE, SPREAD_SIZE,
};
use crate::board::{Place, PlayerBoard};
use crate::state::{PlayerId, PrivateGameState};
use crate::token::{Token, TokenPlacement, TOKENS_PER_ZONE, ZONE_COUNT};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A roster entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerMeta {
    pub id: PlayerId,
    pub name: String,
}

/// Everyone who has joined a room, by id
pub type Roster = BTreeMap<PlayerId, PlayerMeta>;

/// One score slot of a held card and the cube covering it, if any
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSlot {
    pub points: u32,
    pub cube_id: Option<CubeId>,
}

/// A held card with its cubes resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedAnimalCard {
    pub id: String,
    pub scores: Vec<ScoreSlot>,
    pub shape: Vec<ShapeCell>,
    pub placement: CardPlacement,
}

impl DerivedAnimalCard {
    /// Cubes still on the card
    pub fn cubes_remaining(&self) -> usize {
        self.scores.iter().filter(|s| s.cube_id.is_some()).count()
    }
}

/// Everything public about one player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerGameState {
    pub id: PlayerId,
    pub name: String,
    pub taken_tokens: [Option<Token>; TOKENS_PER_ZONE],
    pub animal_cards: [Option<DerivedAnimalCard>; HAND_SIZE],
    pub completed_animal_cards: Vec<AnimalCard>,
    pub board: PlayerBoard,
}

/// The public view of an active game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicGameState {
    /// Legal cells as `[q, r]` pairs
    pub grid: Vec<(i32, i32)>,
    pub current_player_id: PlayerId,
    pub players: BTreeMap<PlayerId, PlayerGameState>,
    pub animal_card_spread: [Option<AnimalCard>; SPREAD_SIZE],
    pub central_board: [[Option<Token>; TOKENS_PER_ZONE]; ZONE_COUNT],
}

/// What a room broadcasts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PublicState {
    Idle {
        players: Roster,
    },
    #[serde(rename_all = "camelCase")]
    Active {
        players: Roster,
        game_state: PublicGameState,
    },
}

/// Build the public view of `state`.
///
/// Every token, cube and card is visited once and dropped into the bucket its
/// placement names. Indices outside the public arrays are skipped rather than
/// trusted, so the projection is total.
pub fn derive_public_game_state(state: &PrivateGameState, roster: &Roster) -> PublicGameState {
    let grid = state.grid();

    let mut players: BTreeMap<PlayerId, PlayerGameState> = state
        .player_ids
        .iter()
        .map(|id| {
            let name = roster
                .get(id)
                .map(|meta| meta.name.clone())
                .unwrap_or_else(|| id.clone());
            let board = grid
                .cells()
                .iter()
                .map(|cell| (cell.key(), Place::default()))
                .collect();
            let player = PlayerGameState {
                id: id.clone(),
                name,
                taken_tokens: Default::default(),
                animal_cards: Default::default(),
                completed_animal_cards: Vec::new(),
                board,
            };
            (id.clone(), player)
        })
        .collect();

    let mut central_board: [[Option<Token>; TOKENS_PER_ZONE]; ZONE_COUNT] = Default::default();
    let mut animal_card_spread: [Option<AnimalCard>; SPREAD_SIZE] = Default::default();

    for token in &state.tokens {
        match &token.placement {
            TokenPlacement::InPouch => {}
            TokenPlacement::OnCentralBoard { zone, slot } => {
                if let Some(cell) = central_board.get_mut(*zone).and_then(|z| z.get_mut(*slot)) {
                    *cell = Some(token.clone());
                }
            }
            TokenPlacement::TakenByPlayer { player, slot } => {
                if let Some(cell) = players
                    .get_mut(player)
                    .and_then(|p| p.taken_tokens.get_mut(*slot))
                {
                    *cell = Some(token.clone());
                }
            }
            TokenPlacement::OnPlayerBoard { player, coords, .. } => {
                if let Some(p) = players.get_mut(player) {
                    p.board
                        .entry(coords.key())
                        .or_default()
                        .tokens
                        .push(token.clone());
                }
            }
        }
    }

    for player in players.values_mut() {
        for place in player.board.values_mut() {
            place.tokens.sort_by_key(stack_depth);
        }
    }

    let mut cubes_by_card: HashMap<&str, HashMap<usize, CubeId>> = HashMap::new();
    for cube in &state.animal_cubes {
        match &cube.placement {
            CubePlacement::InPouch => {}
            CubePlacement::OnCard { card_id, index } => {
                cubes_by_card
                    .entry(card_id.as_str())
                    .or_default()
                    .insert(*index, cube.id.clone());
            }
            CubePlacement::OnPlayerBoard { player, coords } => {
                if let Some(p) = players.get_mut(player) {
                    p.board.entry(coords.key()).or_default().cube = Some(cube.id.clone());
                }
            }
        }
    }

    for card in &state.animal_cards {
        match &card.placement {
            CardPlacement::InDeck => {}
            CardPlacement::InSpread { index } => {
                if let Some(slot) = animal_card_spread.get_mut(*index) {
                    *slot = Some(card.clone());
                }
            }
            CardPlacement::InHand { player, index } => {
                let cubes = cubes_by_card.get(card.id.as_str());
                let derived = DerivedAnimalCard {
                    id: card.id.clone(),
                    scores: card
                        .scores
                        .iter()
                        .enumerate()
                        .map(|(i, &points)| ScoreSlot {
                            points,
                            cube_id: cubes.and_then(|c| c.get(&i).cloned()),
                        })
                        .collect(),
                    shape: card.shape.clone(),
                    placement: card.placement.clone(),
                };
                if let Some(slot) = players
                    .get_mut(player)
                    .and_then(|p| p.animal_cards.get_mut(*index))
                {
                    *slot = Some(derived);
                }
            }
            CardPlacement::Completed { player } => {
                if let Some(p) = players.get_mut(player) {
                    p.completed_animal_cards.push(card.clone());
                }
            }
        }
    }

    PublicGameState {
        grid: grid.to_pairs(),
        current_player_id: state.current_player_id.clone(),
        players,
        animal_card_spread,
        central_board,
    }
}

fn stack_depth(token: &Token) -> usize {
    match token.placement {
        TokenPlacement::OnPlayerBoard { stack_depth, .. } => stack_depth,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::HexCoord;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn roster() -> Roster {
        ["alice", "bob"]
            .into_iter()
            .map(|id| {
                (
                    id.to_string(),
                    PlayerMeta {
                        id: id.to_string(),
                        name: id.to_uppercase(),
                    },
                )
            })
            .collect()
    }

    fn dealt() -> PrivateGameState {
        let mut rng = StdRng::seed_from_u64(11);
        PrivateGameState::deal(roster().into_keys(), &mut rng).unwrap()
    }

    #[test]
    fn test_fresh_game_projection() {
        let state = dealt();
        let public = derive_public_game_state(&state, &roster());

        assert_eq!(public.grid.len(), 23);
        assert_eq!(public.current_player_id, state.current_player_id);
        assert!(public.central_board.iter().flatten().all(Option::is_some));
        assert!(public.animal_card_spread.iter().all(Option::is_some));

        let alice = &public.players["alice"];
        assert_eq!(alice.name, "ALICE");
        assert_eq!(alice.board.len(), 23);
        assert!(alice.board.values().all(|p| p.tokens.is_empty() && p.cube.is_none()));
        assert!(alice.taken_tokens.iter().all(Option::is_none));
        assert!(alice.animal_cards.iter().all(Option::is_none));
    }

    #[test]
    fn test_projection_is_repeatable() {
        let state = dealt();
        let first = derive_public_game_state(&state, &roster());
        let second = derive_public_game_state(&state, &roster());
        assert_eq!(first, second);
    }

    #[test]
    fn test_board_stacks_and_cubes() {
        let mut state = dealt();
        let at = HexCoord::new(2, 0);
        // Insert the top token first to check ordering by depth.
        for (i, depth) in [(20usize, 1usize), (21, 0)] {
            state.tokens[i].placement = TokenPlacement::OnPlayerBoard {
                player: "bob".into(),
                coords: at,
                stack_depth: depth,
            };
        }
        state.animal_cubes[0].placement = CubePlacement::OnPlayerBoard {
            player: "bob".into(),
            coords: at,
        };

        let public = derive_public_game_state(&state, &roster());
        let place = &public.players["bob"].board["(2,0)"];
        assert_eq!(place.tokens.len(), 2);
        assert_eq!(place.tokens[0].id, state.tokens[21].id);
        assert_eq!(place.tokens[1].id, state.tokens[20].id);
        assert_eq!(place.cube.as_deref(), Some("cube-0"));
        assert!(public.players["alice"].board["(2,0)"].tokens.is_empty());
    }

    #[test]
    fn test_held_card_scores_resolve_cubes() {
        let mut state = dealt();
        let card_index = state
            .animal_cards
            .iter()
            .position(|c| c.placement == CardPlacement::InDeck)
            .unwrap();
        let card_id = state.animal_cards[card_index].id.clone();
        let score_count = state.animal_cards[card_index].scores.len();
        state.animal_cards[card_index].placement = CardPlacement::InHand {
            player: "alice".into(),
            index: 2,
        };
        // Top slot already claimed; the rest covered.
        for i in 0..score_count - 1 {
            state.animal_cubes[i].placement = CubePlacement::OnCard {
                card_id: card_id.clone(),
                index: i,
            };
        }

        let public = derive_public_game_state(&state, &roster());
        let card = public.players["alice"].animal_cards[2].as_ref().unwrap();
        assert_eq!(card.id, card_id);
        assert_eq!(card.cubes_remaining(), score_count - 1);
        assert_eq!(card.scores[0].cube_id.as_deref(), Some("cube-0"));
        assert_eq!(card.scores[score_count - 1].cube_id, None);
    }

    #[test]
    fn test_public_state_wire_shape() {
        let state = dealt();
        let public = PublicState::Active {
            players: roster(),
            game_state: derive_public_game_state(&state, &roster()),
        };
        let json = serde_json::to_value(&public).unwrap();
        assert_eq!(json["type"], "active");
        assert_eq!(json["players"]["bob"]["name"], "BOB");
        assert_eq!(json["gameState"]["grid"][0], serde_json::json!([0, 0]));
        assert!(json["gameState"]["players"]["alice"]["board"]["(0,0)"]["cube"].is_null());
        assert_eq!(json["gameState"]["centralBoard"].as_array().unwrap().len(), 5);

        let idle = serde_json::to_value(PublicState::Idle { players: roster() }).unwrap();
        assert_eq!(idle["type"], "idle");
    }
}
