use std::cell::RefCell;
use std::rc::Rc;

use crate::battle::state::BattleOutcome;

/// Callbacks into whatever owns the battle session.
pub trait SessionHooks {
    fn on_round_begin(&mut self, turn: u32);
    fn on_round_end(&mut self, turn: u32);
    fn on_battle_over(&mut self, outcome: BattleOutcome);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl SessionHooks for NoopHooks {
    fn on_round_begin(&mut self, _turn: u32) {}
    fn on_round_end(&mut self, _turn: u32) {}
    fn on_battle_over(&mut self, _outcome: BattleOutcome) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEntry {
    RoundBegan(u32),
    RoundEnded(u32),
    BattleOver(BattleOutcome),
}

/// Records every hook call. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct SessionLog {
    entries: Rc<RefCell<Vec<SessionEntry>>>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<SessionEntry> {
        self.entries.borrow().clone()
    }

    pub fn rounds_completed(&self) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|entry| matches!(entry, SessionEntry::RoundEnded(_)))
            .count()
    }
}

impl SessionHooks for SessionLog {
    fn on_round_begin(&mut self, turn: u32) {
        self.entries.borrow_mut().push(SessionEntry::RoundBegan(turn));
    }

    fn on_round_end(&mut self, turn: u32) {
        self.entries.borrow_mut().push(SessionEntry::RoundEnded(turn));
    }

    fn on_battle_over(&mut self, outcome: BattleOutcome) {
        self.entries.borrow_mut().push(SessionEntry::BattleOver(outcome));
    }
}
