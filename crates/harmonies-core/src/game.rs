//! Per-room game state machine.
//!
//! A room starts `Idle`, collecting players, and becomes `Active` once
//! someone starts the game. Room-level actions (join, start, undo) are
//! handled here; turn actions go through [`crate::rules`] and are recorded in
//! the undo history.

use crate::actions::Action;
use crate::derive::{derive_public_game_state, PlayerMeta, PublicState, Roster};
use crate::error::GameError;
use crate::history::{History, HistoryEntry};
use crate::rules;
use crate::state::{PlayerId, PrivateGameState};
use rand::Rng;

/// A game in progress
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveGame {
    pub state: PrivateGameState,
    pub history: History,
}

/// Room phase
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RoomPhase {
    /// Waiting for players
    #[default]
    Idle,
    /// Game running
    Active(ActiveGame),
}

/// One room: its roster and, once started, its game.
#[derive(Debug, Clone, Default)]
pub struct GameRoom {
    players: Roster,
    phase: RoomPhase,
}

impl GameRoom {
    pub fn new() -> Self {
        Self::default()
    }

    /// A room with a game already under way
    pub fn resume(players: Roster, game: ActiveGame) -> Self {
        Self {
            players,
            phase: RoomPhase::Active(game),
        }
    }

    /// Handle `action` from `player`, shuffling with the thread RNG if the
    /// game starts.
    pub fn on_action(&mut self, player: &str, action: Action) -> Result<PublicState, GameError> {
        self.on_action_with_rng(player, action, &mut rand::thread_rng())
    }

    /// Handle `action` from `player` and return the new public state.
    ///
    /// On error nothing changes: neither the state nor the history.
    pub fn on_action_with_rng<R: Rng + ?Sized>(
        &mut self,
        player: &str,
        action: Action,
        rng: &mut R,
    ) -> Result<PublicState, GameError> {
        match action {
            Action::JoinGame { id, name } => self.join(id, name),
            Action::StartGame => self.start(rng)?,
            Action::Undo => self.undo(player)?,
            turn_action => self.play(player, turn_action)?,
        }
        Ok(self.public_state())
    }

    /// What clients currently see
    pub fn public_state(&self) -> PublicState {
        match &self.phase {
            RoomPhase::Idle => PublicState::Idle {
                players: self.players.clone(),
            },
            RoomPhase::Active(game) => PublicState::Active {
                players: self.players.clone(),
                game_state: derive_public_game_state(&game.state, &self.players),
            },
        }
    }

    pub fn players(&self) -> &Roster {
        &self.players
    }

    pub fn phase(&self) -> &RoomPhase {
        &self.phase
    }

    pub fn active_game(&self) -> Option<&ActiveGame> {
        match &self.phase {
            RoomPhase::Active(game) => Some(game),
            RoomPhase::Idle => None,
        }
    }

    fn join(&mut self, id: PlayerId, name: String) {
        self.players.insert(id.clone(), PlayerMeta { id, name });
    }

    fn start<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), GameError> {
        if let RoomPhase::Active(_) = self.phase {
            return Err(GameError::GameAlreadyStarted);
        }
        let state = PrivateGameState::deal(self.players.keys().cloned(), rng)?;
        self.phase = RoomPhase::Active(ActiveGame {
            state,
            history: History::new(),
        });
        Ok(())
    }

    fn undo(&mut self, player: &str) -> Result<(), GameError> {
        let game = self.active_game_mut()?;
        if game.state.current_player_id != player {
            return Err(GameError::NotYourTurn);
        }
        // Whoever made the newest entry; undoing an `endTurn` hands the turn back.
        let last = game.history.last().ok_or(GameError::NothingToUndo)?;
        if !last.can_undo {
            return Err(GameError::CannotUndo);
        }
        if let Some(entry) = game.history.pop() {
            game.state = entry.snapshot;
        }
        Ok(())
    }

    fn play(&mut self, player: &str, action: Action) -> Result<(), GameError> {
        let game = self.active_game_mut()?;
        rules::validate(&game.state, &game.history, player, &action)?;
        let next = rules::apply(&game.state, player, &action)?;
        let snapshot = std::mem::replace(&mut game.state, next);
        game.history.push(HistoryEntry {
            action,
            player: player.to_string(),
            can_undo: true,
            snapshot,
        });
        Ok(())
    }

    fn active_game_mut(&mut self) -> Result<&mut ActiveGame, GameError> {
        match &mut self.phase {
            RoomPhase::Active(game) => Ok(game),
            RoomPhase::Idle => Err(GameError::GameNotStarted),
        }
    }
}
