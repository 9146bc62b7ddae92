//! Turn actions: validation and application.
//!
//! Each turn action has a `validate_*` function that only reads state and a
//! `apply_*` function that edits a fresh copy. [`validate`] and [`apply`]
//! dispatch on the closed [`Action`] enum. Room-level actions (`joinGame`,
//! `startGame`, `undo`) are handled by [`crate::game::GameRoom`] and never
//! reach this module.

use crate::actions::Action;
use crate::animal::{self, CardPlacement, CubePlacement, HAND_SIZE, SPREAD_SIZE};
use crate::board;
use crate::derive::{derive_public_game_state, Roster};
use crate::error::{GameError, InvariantViolation};
use crate::hex::HexCoord;
use crate::history::History;
use crate::state::PrivateGameState;
use crate::token::{TokenPlacement, TOKENS_PER_ZONE, ZONE_COUNT};

/// Check whether `player` may perform `action` now. Never changes anything.
pub fn validate(
    state: &PrivateGameState,
    history: &History,
    player: &str,
    action: &Action,
) -> Result<(), GameError> {
    if state.current_player_id != player {
        return Err(GameError::NotYourTurn);
    }

    match action {
        Action::TakeTokens { zone } => validate_take_tokens(state, history, *zone),
        Action::PlaceToken { token_id, coords } => {
            validate_place_token(state, player, token_id, coords)
        }
        Action::TakeAnimalCard { index } => {
            validate_take_animal_card(state, history, player, *index)
        }
        Action::PlaceCube {
            animal_card_id,
            hex,
        } => validate_place_cube(state, player, animal_card_id, *hex),
        Action::EndTurn => validate_end_turn(state, history, player),
        Action::JoinGame { .. } | Action::StartGame | Action::Undo => {
            Err(InvariantViolation::NotATurnAction(action.kind().to_string()).into())
        }
    }
}

/// Apply an already validated `action`, returning the next state.
///
/// `state` itself is left untouched.
pub fn apply(
    state: &PrivateGameState,
    player: &str,
    action: &Action,
) -> Result<PrivateGameState, GameError> {
    let mut next = state.clone();

    match action {
        Action::TakeTokens { zone } => apply_take_tokens(&mut next, player, *zone),
        Action::PlaceToken { token_id, coords } => {
            apply_place_token(&mut next, player, token_id, parse_coords(coords)?)?
        }
        Action::TakeAnimalCard { index } => apply_take_animal_card(&mut next, player, *index)?,
        Action::PlaceCube {
            animal_card_id,
            hex,
        } => apply_place_cube(&mut next, player, animal_card_id, *hex)?,
        Action::EndTurn => apply_end_turn(&mut next)?,
        Action::JoinGame { .. } | Action::StartGame | Action::Undo => {
            return Err(InvariantViolation::NotATurnAction(action.kind().to_string()).into());
        }
    }

    Ok(next)
}

fn parse_coords(coords: &str) -> Result<HexCoord, GameError> {
    coords
        .parse()
        .map_err(|_| GameError::InvalidCoords(coords.to_string()))
}

fn took_tokens_this_turn(history: &History) -> bool {
    history.find_in_turn(|entry| matches!(entry.action, Action::TakeTokens { .. }))
}

// ==================== Take Tokens ====================

fn validate_take_tokens(
    state: &PrivateGameState,
    history: &History,
    zone: usize,
) -> Result<(), GameError> {
    if took_tokens_this_turn(history) {
        return Err(GameError::TokensAlreadyTaken);
    }
    if zone >= ZONE_COUNT {
        return Err(GameError::InvalidZone(zone));
    }
    if state.zone_tokens(zone).next().is_none() {
        return Err(GameError::EmptyZone(zone));
    }
    Ok(())
}

fn apply_take_tokens(state: &mut PrivateGameState, player: &str, zone: usize) {
    let in_zone = state.tokens.iter_mut().filter(|t| {
        matches!(t.placement, TokenPlacement::OnCentralBoard { zone: z, .. } if z == zone)
    });
    for (slot, token) in in_zone.enumerate() {
        token.placement = TokenPlacement::TakenByPlayer {
            player: player.to_string(),
            slot,
        };
    }
}

// ==================== Place Token ====================

fn validate_place_token(
    state: &PrivateGameState,
    player: &str,
    token_id: &str,
    coords: &str,
) -> Result<(), GameError> {
    let token = state
        .token(token_id)
        .filter(|t| t.is_taken_by(player))
        .ok_or_else(|| GameError::TokenNotHeld(token_id.to_string()))?;

    let coords = parse_coords(coords)?;
    if !state.grid().contains(&coords) {
        return Err(GameError::OffBoard(coords));
    }

    let stack = state.stack_at(player, coords);
    if !board::can_stack(token.color, stack.len(), stack.last().map(|t| t.color)) {
        return Err(GameError::StackNotAllowed(coords));
    }
    Ok(())
}

fn apply_place_token(
    state: &mut PrivateGameState,
    player: &str,
    token_id: &str,
    coords: HexCoord,
) -> Result<(), GameError> {
    let stack_depth = state.stack_at(player, coords).len();
    let token = state
        .tokens
        .iter_mut()
        .find(|t| t.id == token_id)
        .ok_or_else(|| InvariantViolation::UnknownToken(token_id.to_string()))?;
    token.placement = TokenPlacement::OnPlayerBoard {
        player: player.to_string(),
        coords,
        stack_depth,
    };
    Ok(())
}

// ==================== Take Animal Card ====================

fn validate_take_animal_card(
    state: &PrivateGameState,
    history: &History,
    player: &str,
    index: usize,
) -> Result<(), GameError> {
    if state.hand(player).count() >= HAND_SIZE {
        return Err(GameError::HandFull);
    }
    if index >= SPREAD_SIZE {
        return Err(GameError::InvalidSpreadIndex(index));
    }
    if state.card_in_spread(index).is_none() {
        return Err(GameError::EmptySpreadSlot(index));
    }
    if history.find_in_turn(|entry| matches!(entry.action, Action::TakeAnimalCard { .. })) {
        return Err(GameError::AnimalCardAlreadyTaken);
    }
    Ok(())
}

fn apply_take_animal_card(
    state: &mut PrivateGameState,
    player: &str,
    index: usize,
) -> Result<(), GameError> {
    let hand_slot = state.free_hand_slot(player).ok_or(GameError::HandFull)?;
    let card = state
        .animal_cards
        .iter_mut()
        .find(|c| c.placement == CardPlacement::InSpread { index })
        .ok_or(GameError::EmptySpreadSlot(index))?;
    card.placement = CardPlacement::InHand {
        player: player.to_string(),
        index: hand_slot,
    };
    let card_id = card.id.clone();
    let score_count = card.scores.len();

    // Highest score slot first, so a short pouch leaves the cheap slots bare.
    let mut pouch = state
        .animal_cubes
        .iter_mut()
        .filter(|c| c.placement == CubePlacement::InPouch);
    for score_index in (0..score_count).rev() {
        let Some(cube) = pouch.next() else { break };
        cube.placement = CubePlacement::OnCard {
            card_id: card_id.clone(),
            index: score_index,
        };
    }
    Ok(())
}

// ==================== Place Cube ====================

fn validate_place_cube(
    state: &PrivateGameState,
    player: &str,
    card_id: &str,
    hex: HexCoord,
) -> Result<(), GameError> {
    let card = state
        .card(card_id)
        .filter(|c| c.is_held_by(player))
        .ok_or_else(|| GameError::CardNotInHand(card_id.to_string()))?;

    if state.cubes_on_card(card_id).next().is_none() {
        return Err(GameError::NoCubesLeft(card_id.to_string()));
    }

    let grid = state.grid();
    if !grid.contains(&hex) {
        return Err(GameError::OffBoard(hex));
    }
    if state.has_cube_at(player, hex) {
        return Err(GameError::CellOccupied(hex));
    }

    let public = derive_public_game_state(state, &Roster::new());
    let board = public
        .players
        .get(player)
        .map(|p| &p.board)
        .ok_or(InvariantViolation::NoCurrentPlayer)?;
    if !animal::can_place_cube(&card.shape, &grid, hex, board) {
        return Err(GameError::PatternMismatch(hex));
    }
    Ok(())
}

fn apply_place_cube(
    state: &mut PrivateGameState,
    player: &str,
    card_id: &str,
    hex: HexCoord,
) -> Result<(), GameError> {
    let cube = state
        .animal_cubes
        .iter_mut()
        .filter_map(|c| c.slot_on(card_id).map(|index| (index, c)))
        .max_by_key(|(index, _)| *index)
        .map(|(_, c)| c)
        .ok_or_else(|| GameError::NoCubesLeft(card_id.to_string()))?;
    cube.placement = CubePlacement::OnPlayerBoard {
        player: player.to_string(),
        coords: hex,
    };

    if state.cubes_on_card(card_id).next().is_none() {
        let card = state
            .animal_cards
            .iter_mut()
            .find(|c| c.id == card_id)
            .ok_or_else(|| InvariantViolation::UnknownCard(card_id.to_string()))?;
        card.placement = CardPlacement::Completed {
            player: player.to_string(),
        };
    }
    Ok(())
}

// ==================== End Turn ====================

fn validate_end_turn(
    state: &PrivateGameState,
    history: &History,
    player: &str,
) -> Result<(), GameError> {
    if !took_tokens_this_turn(history) {
        return Err(GameError::TokensNotTaken);
    }
    if state.taken_tokens(player).next().is_some() {
        return Err(GameError::TokensNotPlaced);
    }
    Ok(())
}

fn apply_end_turn(state: &mut PrivateGameState) -> Result<(), GameError> {
    state.current_player_id = state.next_player_id()?.clone();
    refill_central_board(state)?;
    refill_spread(state);
    Ok(())
}

/// Refill every empty zone with up to three tokens from the pouch, in pouch order.
fn refill_central_board(state: &mut PrivateGameState) -> Result<(), InvariantViolation> {
    let empty_zones: Vec<usize> = (0..ZONE_COUNT)
        .filter(|&zone| state.zone_tokens(zone).next().is_none())
        .collect();
    if empty_zones.is_empty() {
        return Err(InvariantViolation::InvalidCentralBoard);
    }

    let mut pouch = state
        .tokens
        .iter_mut()
        .filter(|t| t.placement == TokenPlacement::InPouch);
    for zone in empty_zones {
        for slot in 0..TOKENS_PER_ZONE {
            let Some(token) = pouch.next() else {
                return Ok(());
            };
            token.placement = TokenPlacement::OnCentralBoard { zone, slot };
        }
    }
    Ok(())
}

/// Deal cards from the deck into empty spread slots, in deck order.
fn refill_spread(state: &mut PrivateGameState) {
    let empty_slots: Vec<usize> = (0..SPREAD_SIZE)
        .filter(|&index| state.card_in_spread(index).is_none())
        .collect();

    let mut deck = state
        .animal_cards
        .iter_mut()
        .filter(|c| c.placement == CardPlacement::InDeck);
    for index in empty_slots {
        let Some(card) = deck.next() else { break };
        card.placement = CardPlacement::InSpread { index };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::HistoryEntry;
    use crate::token::TokenColor;
    use pretty_assertions::{assert_eq, assert_ne};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn dealt() -> PrivateGameState {
        let mut rng = StdRng::seed_from_u64(3);
        let mut state =
            PrivateGameState::deal(["alice".to_string(), "bob".to_string()], &mut rng).unwrap();
        state.player_ids = vec!["alice".into(), "bob".into()];
        state.current_player_id = "alice".into();
        state
    }

    fn record(history: &mut History, state: &PrivateGameState, action: Action) {
        history.push(HistoryEntry {
            action,
            player: state.current_player_id.clone(),
            can_undo: true,
            snapshot: state.clone(),
        });
    }

    /// Validate, apply and record, panicking on rejection.
    fn play(state: &mut PrivateGameState, history: &mut History, action: Action) {
        let player = state.current_player_id.clone();
        validate(state, history, &player, &action).unwrap();
        let next = apply(state, &player, &action).unwrap();
        record(history, state, action);
        *state = next;
    }

    fn taken_ids(state: &PrivateGameState, player: &str) -> Vec<String> {
        state.taken_tokens(player).map(|t| t.id.clone()).collect()
    }

    #[test]
    fn test_not_your_turn() {
        let state = dealt();
        let err = validate(&state, &History::new(), "bob", &Action::TakeTokens { zone: 0 });
        assert_eq!(err, Err(GameError::NotYourTurn));
    }

    #[test]
    fn test_take_tokens_once_per_turn() {
        let mut state = dealt();
        let mut history = History::new();
        let zone_ids: Vec<String> = state.zone_tokens(1).map(|t| t.id.clone()).collect();

        play(&mut state, &mut history, Action::TakeTokens { zone: 1 });
        assert_eq!(taken_ids(&state, "alice"), zone_ids);
        assert_eq!(state.zone_tokens(1).count(), 0);

        let again = validate(&state, &history, "alice", &Action::TakeTokens { zone: 2 });
        assert_eq!(again, Err(GameError::TokensAlreadyTaken));
    }

    #[test]
    fn test_take_tokens_bad_zone() {
        let state = dealt();
        let history = History::new();
        assert_eq!(
            validate(&state, &history, "alice", &Action::TakeTokens { zone: 5 }),
            Err(GameError::InvalidZone(5))
        );
    }

    #[test]
    fn test_take_tokens_empty_zone() {
        let mut state = dealt();
        for token in &mut state.tokens {
            if matches!(token.placement, TokenPlacement::OnCentralBoard { zone: 4, .. }) {
                token.placement = TokenPlacement::InPouch;
            }
        }
        assert_eq!(
            validate(&state, &History::new(), "alice", &Action::TakeTokens { zone: 4 }),
            Err(GameError::EmptyZone(4))
        );
    }

    #[test]
    fn test_taken_slots_follow_encounter_order() {
        let mut state = dealt();
        let mut history = History::new();
        play(&mut state, &mut history, Action::TakeTokens { zone: 0 });
        let slots: Vec<usize> = state
            .taken_tokens("alice")
            .map(|t| match t.placement {
                TokenPlacement::TakenByPlayer { slot, .. } => slot,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(slots, vec![0, 1, 2]);
    }

    #[test]
    fn test_place_token_rules() {
        let mut state = dealt();
        let mut history = History::new();
        play(&mut state, &mut history, Action::TakeTokens { zone: 0 });
        let ids = taken_ids(&state, "alice");

        let place = |id: &str, coords: &str| Action::PlaceToken {
            token_id: id.to_string(),
            coords: coords.to_string(),
        };

        assert_eq!(
            validate(&state, &history, "alice", &place("token-nope", "(0,0)")),
            Err(GameError::TokenNotHeld("token-nope".into()))
        );
        assert_eq!(
            validate(&state, &history, "alice", &place(&ids[0], "0,0")),
            Err(GameError::InvalidCoords("0,0".into()))
        );
        assert_eq!(
            validate(&state, &history, "alice", &place(&ids[0], "(-1,0)")),
            Err(GameError::OffBoard(HexCoord::new(-1, 0)))
        );

        play(&mut state, &mut history, place(&ids[0], "(1,1)"));
        let placed = state.token(&ids[0]).unwrap();
        assert_eq!(
            placed.placement,
            TokenPlacement::OnPlayerBoard {
                player: "alice".into(),
                coords: HexCoord::new(1, 1),
                stack_depth: 0,
            }
        );

        // A yellow token can never sit on anything.
        state.tokens.iter_mut().find(|t| t.id == ids[1]).unwrap().color = TokenColor::Yellow;
        assert_eq!(
            validate(&state, &history, "alice", &place(&ids[1], "(1,1)")),
            Err(GameError::StackNotAllowed(HexCoord::new(1, 1)))
        );
    }

    #[test]
    fn test_place_token_stacks_on_top() {
        let mut state = dealt();
        let mut history = History::new();
        play(&mut state, &mut history, Action::TakeTokens { zone: 0 });
        let ids = taken_ids(&state, "alice");
        for id in &ids[..2] {
            state.tokens.iter_mut().find(|t| t.id == *id).unwrap().color = TokenColor::Gray;
        }
        for id in &ids[..2] {
            play(
                &mut state,
                &mut history,
                Action::PlaceToken {
                    token_id: id.clone(),
                    coords: "(3,0)".into(),
                },
            );
        }
        let stack = state.stack_at("alice", HexCoord::new(3, 0));
        let stack_ids: Vec<&str> = stack.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(stack_ids, vec![ids[0].as_str(), ids[1].as_str()]);
    }

    #[test]
    fn test_take_animal_card_assigns_cubes_high_first() {
        let mut state = dealt();
        let mut history = History::new();
        let card_id = state.card_in_spread(2).unwrap().id.clone();
        let score_count = state.card(&card_id).unwrap().scores.len();

        play(&mut state, &mut history, Action::TakeAnimalCard { index: 2 });

        assert_eq!(
            state.card(&card_id).unwrap().placement,
            CardPlacement::InHand {
                player: "alice".into(),
                index: 0
            }
        );
        assert!(state.card_in_spread(2).is_none());
        assert_eq!(state.cubes_on_card(&card_id).count(), score_count);
        // The first pouch cube covers the highest score slot.
        assert_eq!(state.animal_cubes[0].slot_on(&card_id), Some(score_count - 1));

        assert_eq!(
            validate(&state, &history, "alice", &Action::TakeAnimalCard { index: 3 }),
            Err(GameError::AnimalCardAlreadyTaken)
        );
    }

    #[test]
    fn test_take_animal_card_gates() {
        let mut state = dealt();
        let history = History::new();
        assert_eq!(
            validate(&state, &history, "alice", &Action::TakeAnimalCard { index: 5 }),
            Err(GameError::InvalidSpreadIndex(5))
        );

        let spread_card = state.card_in_spread(1).unwrap().id.clone();
        state
            .animal_cards
            .iter_mut()
            .find(|c| c.id == spread_card)
            .unwrap()
            .placement = CardPlacement::InDeck;
        assert_eq!(
            validate(&state, &history, "alice", &Action::TakeAnimalCard { index: 1 }),
            Err(GameError::EmptySpreadSlot(1))
        );

        let mut filled = 0;
        for card in &mut state.animal_cards {
            if filled < HAND_SIZE && card.placement == CardPlacement::InDeck {
                card.placement = CardPlacement::InHand {
                    player: "alice".into(),
                    index: filled,
                };
                filled += 1;
            }
        }
        assert_eq!(
            validate(&state, &history, "alice", &Action::TakeAnimalCard { index: 0 }),
            Err(GameError::HandFull)
        );
    }

    #[test]
    fn test_end_turn_requirements() {
        let mut state = dealt();
        let mut history = History::new();
        assert_eq!(
            validate(&state, &history, "alice", &Action::EndTurn),
            Err(GameError::TokensNotTaken)
        );

        play(&mut state, &mut history, Action::TakeTokens { zone: 2 });
        assert_eq!(
            validate(&state, &history, "alice", &Action::EndTurn),
            Err(GameError::TokensNotPlaced)
        );
    }

    #[test]
    fn test_end_turn_refills_from_pouch() {
        let mut state = dealt();
        let mut history = History::new();
        play(&mut state, &mut history, Action::TakeTokens { zone: 2 });
        for token in &mut state.tokens {
            if token.is_taken_by("alice") {
                token.placement = TokenPlacement::OnPlayerBoard {
                    player: "alice".into(),
                    coords: HexCoord::new(0, 0),
                    stack_depth: 0,
                };
            }
        }
        let pouch_head: Vec<String> = state
            .tokens
            .iter()
            .filter(|t| t.placement == TokenPlacement::InPouch)
            .take(3)
            .map(|t| t.id.clone())
            .collect();

        play(&mut state, &mut history, Action::EndTurn);

        assert_eq!(state.current_player_id, "bob");
        let refilled: Vec<String> = state.zone_tokens(2).map(|t| t.id.clone()).collect();
        assert_eq!(refilled, pouch_head);
    }

    #[test]
    fn test_end_turn_refills_spread_from_deck() {
        let mut state = dealt();
        let mut history = History::new();
        play(&mut state, &mut history, Action::TakeAnimalCard { index: 4 });
        let deck_head = state
            .animal_cards
            .iter()
            .find(|c| c.placement == CardPlacement::InDeck)
            .unwrap()
            .id
            .clone();

        refill_spread(&mut state);
        assert_eq!(state.card_in_spread(4).unwrap().id, deck_head);
    }

    #[test]
    fn test_refill_without_empty_zone_is_an_invariant_violation() {
        let mut state = dealt();
        assert_eq!(
            refill_central_board(&mut state),
            Err(InvariantViolation::InvalidCentralBoard)
        );
    }

    #[test]
    fn test_place_unknown_token_is_an_invariant_violation() {
        let state = dealt();
        let action = Action::PlaceToken {
            token_id: "token-999".into(),
            coords: "(0,0)".into(),
        };
        let err = apply(&state, "alice", &action).unwrap_err();
        assert_eq!(
            err,
            GameError::Invariant(InvariantViolation::UnknownToken("token-999".into()))
        );
    }

    #[test]
    fn test_room_actions_are_not_turn_actions() {
        let state = dealt();
        let err = validate(&state, &History::new(), "alice", &Action::Undo).unwrap_err();
        assert!(err.is_invariant_violation());
        assert!(apply(&state, "alice", &Action::StartGame)
            .unwrap_err()
            .is_invariant_violation());
    }

    #[test]
    fn test_apply_leaves_input_untouched() {
        let state = dealt();
        let before = state.clone();
        let next = apply(&state, "alice", &Action::TakeTokens { zone: 0 }).unwrap();
        assert_eq!(state, before);
        assert_ne!(next, before);
    }
}
