//! The authoritative private game state.
//!
//! One flat aggregate holds every token, card and cube with its placement
//! tag. Nothing here is ever shown to clients directly; see
//! [`crate::derive`] for the public projection.

use crate::animal::{self, AnimalCard, AnimalCube, CardPlacement, SPREAD_SIZE};
use crate::board::{BoardGrid, BoardType};
use crate::error::{GameError, InvariantViolation};
use crate::hex::HexCoord;
use crate::token::{self, Token, TokenPlacement, TOKENS_PER_ZONE, ZONE_COUNT};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Player identifier, chosen by the client when joining
pub type PlayerId = String;

/// The complete game state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateGameState {
    pub tokens: Vec<Token>,
    pub animal_cards: Vec<AnimalCard>,
    pub animal_cubes: Vec<AnimalCube>,
    pub board_type: BoardType,
    /// Turn order
    pub player_ids: Vec<PlayerId>,
    pub current_player_id: PlayerId,
}

impl PrivateGameState {
    /// Deal a new game.
    ///
    /// Tokens and cards are shuffled; the first 15 tokens fill the central
    /// board zone by zone and the first 5 cards form the spread. The rest stay
    /// in the pouch and deck in shuffled order, which is also the order they
    /// are drawn in. Turn order is shuffled too.
    pub fn deal<R: Rng + ?Sized>(
        players: impl IntoIterator<Item = PlayerId>,
        rng: &mut R,
    ) -> Result<Self, GameError> {
        let mut player_ids: Vec<PlayerId> = players.into_iter().collect();
        player_ids.shuffle(rng);
        let current_player_id = player_ids.first().cloned().ok_or(GameError::NoPlayers)?;

        let mut tokens = token::standard_pool();
        tokens.shuffle(rng);
        for (i, token) in tokens
            .iter_mut()
            .take(ZONE_COUNT * TOKENS_PER_ZONE)
            .enumerate()
        {
            token.placement = TokenPlacement::OnCentralBoard {
                zone: i / TOKENS_PER_ZONE,
                slot: i % TOKENS_PER_ZONE,
            };
        }

        let mut animal_cards = animal::standard_deck();
        animal_cards.shuffle(rng);
        for (index, card) in animal_cards.iter_mut().take(SPREAD_SIZE).enumerate() {
            card.placement = CardPlacement::InSpread { index };
        }

        Ok(Self {
            tokens,
            animal_cards,
            animal_cubes: animal::standard_cubes(),
            board_type: BoardType::A,
            player_ids,
            current_player_id,
        })
    }

    /// Legal cells of the board side in use
    pub fn grid(&self) -> BoardGrid {
        BoardGrid::for_board(self.board_type)
    }

    /// Look up a token by id
    pub fn token(&self, id: &str) -> Option<&Token> {
        self.tokens.iter().find(|t| t.id == id)
    }

    /// Look up an animal card by id
    pub fn card(&self, id: &str) -> Option<&AnimalCard> {
        self.animal_cards.iter().find(|c| c.id == id)
    }

    /// Tokens sitting in a central-board zone
    pub fn zone_tokens(&self, zone: usize) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(move |t| {
            matches!(t.placement, TokenPlacement::OnCentralBoard { zone: z, .. } if z == zone)
        })
    }

    /// Tokens `player` has taken but not placed yet
    pub fn taken_tokens<'a>(&'a self, player: &'a str) -> impl Iterator<Item = &'a Token> {
        self.tokens.iter().filter(move |t| t.is_taken_by(player))
    }

    /// The stack on one of `player`'s cells, bottom to top
    pub fn stack_at(&self, player: &str, coords: HexCoord) -> Vec<&Token> {
        let mut stack: Vec<(usize, &Token)> = self
            .tokens
            .iter()
            .filter_map(|t| match &t.placement {
                TokenPlacement::OnPlayerBoard {
                    player: p,
                    coords: c,
                    stack_depth,
                } if p == player && *c == coords => Some((*stack_depth, t)),
                _ => None,
            })
            .collect();
        stack.sort_by_key(|(depth, _)| *depth);
        stack.into_iter().map(|(_, t)| t).collect()
    }

    /// Cards in `player`'s hand
    pub fn hand<'a>(&'a self, player: &'a str) -> impl Iterator<Item = &'a AnimalCard> {
        self.animal_cards.iter().filter(move |c| c.is_held_by(player))
    }

    /// The lowest hand slot `player` is not using
    pub fn free_hand_slot(&self, player: &str) -> Option<usize> {
        (0..animal::HAND_SIZE).find(|&slot| {
            !self.hand(player).any(
                |c| matches!(c.placement, CardPlacement::InHand { index, .. } if index == slot),
            )
        })
    }

    /// The face-up card in spread slot `index`
    pub fn card_in_spread(&self, index: usize) -> Option<&AnimalCard> {
        self.animal_cards
            .iter()
            .find(|c| c.placement == CardPlacement::InSpread { index })
    }

    /// Cubes still sitting on `card_id`
    pub fn cubes_on_card<'a>(&'a self, card_id: &'a str) -> impl Iterator<Item = &'a AnimalCube> {
        self.animal_cubes
            .iter()
            .filter(move |c| c.slot_on(card_id).is_some())
    }

    /// Whether one of `player`'s cells already has a cube
    pub fn has_cube_at(&self, player: &str, coords: HexCoord) -> bool {
        self.animal_cubes.iter().any(|c| {
            matches!(
                &c.placement,
                animal::CubePlacement::OnPlayerBoard { player: p, coords: at }
                    if p == player && *at == coords
            )
        })
    }

    /// The player after the current one, wrapping around
    pub fn next_player_id(&self) -> Result<&PlayerId, InvariantViolation> {
        let current = self
            .player_ids
            .iter()
            .position(|id| *id == self.current_player_id)
            .ok_or(InvariantViolation::NoCurrentPlayer)?;
        Ok(&self.player_ids[(current + 1) % self.player_ids.len()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animal::CubePlacement;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn dealt() -> PrivateGameState {
        let mut rng = StdRng::seed_from_u64(7);
        PrivateGameState::deal(["alice".to_string(), "bob".to_string()], &mut rng).unwrap()
    }

    #[test]
    fn test_deal_fills_central_board() {
        let state = dealt();
        for zone in 0..ZONE_COUNT {
            assert_eq!(state.zone_tokens(zone).count(), TOKENS_PER_ZONE);
        }
        let in_pouch = state
            .tokens
            .iter()
            .filter(|t| t.placement == TokenPlacement::InPouch)
            .count();
        assert_eq!(in_pouch, 120 - 15);
    }

    #[test]
    fn test_deal_fills_spread() {
        let state = dealt();
        for index in 0..SPREAD_SIZE {
            assert!(state.card_in_spread(index).is_some());
        }
        let in_deck = state
            .animal_cards
            .iter()
            .filter(|c| c.placement == CardPlacement::InDeck)
            .count();
        assert_eq!(in_deck, 32 - SPREAD_SIZE);
        assert!(state
            .animal_cubes
            .iter()
            .all(|c| c.placement == CubePlacement::InPouch));
    }

    #[test]
    fn test_deal_turn_order() {
        let state = dealt();
        assert_eq!(state.player_ids.len(), 2);
        assert_eq!(state.current_player_id, state.player_ids[0]);
        assert_eq!(state.next_player_id().unwrap(), &state.player_ids[1]);
    }

    #[test]
    fn test_deal_is_deterministic_per_seed() {
        assert_eq!(dealt(), dealt());
    }

    #[test]
    fn test_deal_without_players() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            PrivateGameState::deal(Vec::<PlayerId>::new(), &mut rng),
            Err(GameError::NoPlayers)
        );
    }

    #[test]
    fn test_next_player_without_current() {
        let state = PrivateGameState::default();
        assert_eq!(state.next_player_id(), Err(InvariantViolation::NoCurrentPlayer));
    }

    #[test]
    fn test_stack_at_orders_by_depth() {
        let mut state = dealt();
        let at = HexCoord::new(1, 1);
        for (depth, i) in [(1usize, 0usize), (0, 1)] {
            state.tokens[i].placement = TokenPlacement::OnPlayerBoard {
                player: "alice".into(),
                coords: at,
                stack_depth: depth,
            };
        }
        let stack = state.stack_at("alice", at);
        assert_eq!(stack.len(), 2);
        assert_eq!(stack[0].id, state.tokens[1].id);
        assert!(state.stack_at("bob", at).is_empty());
    }
}
