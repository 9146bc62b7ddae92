//! Undo history.
//!
//! Each accepted turn action records the state as it was before the action.
//! Undo pops the newest entry and restores its snapshot. The same list answers
//! "has this player already done X this turn" by scanning back to the most
//! recent end of turn.

use crate::actions::Action;
use crate::state::{PlayerId, PrivateGameState};

/// One accepted action and the state before it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub action: Action,
    /// Who performed the action
    pub player: PlayerId,
    pub can_undo: bool,
    pub snapshot: PrivateGameState,
}

/// Append-only list of accepted actions, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn pop(&mut self) -> Option<HistoryEntry> {
        self.entries.pop()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Whether any entry since the most recent `EndTurn` matches `predicate`.
    ///
    /// The `EndTurn` entry itself is not part of the window.
    pub fn find_in_turn<F>(&self, predicate: F) -> bool
    where
        F: Fn(&HistoryEntry) -> bool,
    {
        self.entries
            .iter()
            .rev()
            .take_while(|entry| entry.action != Action::EndTurn)
            .any(predicate)
    }
}
