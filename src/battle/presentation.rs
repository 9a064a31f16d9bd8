//! Presentation boundary: the engine asks for an effect to be played and gets
//! back a `Completion` it can wait on. Nothing here renders anything.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::battle::combatant::BattlerIndex;
use crate::{Move, Species};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionState {
    Pending,
    Done,
    Failed(String),
}

/// Shared handle to the outcome of a presentation step.
#[derive(Debug, Clone)]
pub struct Completion {
    state: Rc<RefCell<CompletionState>>,
}

impl Completion {
    pub fn pending() -> Self {
        Self {
            state: Rc::new(RefCell::new(CompletionState::Pending)),
        }
    }

    /// A completion that has already fired.
    pub fn done() -> Self {
        Self {
            state: Rc::new(RefCell::new(CompletionState::Done)),
        }
    }

    pub fn resolve(&self) {
        *self.state.borrow_mut() = CompletionState::Done;
    }

    pub fn fail(&self, reason: impl Into<String>) {
        *self.state.borrow_mut() = CompletionState::Failed(reason.into());
    }

    pub fn state(&self) -> CompletionState {
        self.state.borrow().clone()
    }

    pub fn is_pending(&self) -> bool {
        *self.state.borrow() == CompletionState::Pending
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresentationEffect {
    MoveAnimation {
        user: BattlerIndex,
        move_: Move,
        targets: Vec<BattlerIndex>,
    },
    Summon {
        battler: BattlerIndex,
        species: Species,
    },
    Text(String),
    CaptureAnimation {
        species: Species,
    },
}

pub trait Presenter {
    fn play(&mut self, effect: PresentationEffect) -> Completion;
}

/// Completes every effect on the spot. Used for headless simulation.
#[derive(Debug, Clone, Default)]
pub struct ImmediatePresenter;

impl Presenter for ImmediatePresenter {
    fn play(&mut self, _effect: PresentationEffect) -> Completion {
        Completion::done()
    }
}

/// Holds completions until the caller releases them, one at a time or all at
/// once. Clones share the same queue, so a test can keep a handle after
/// giving one to the battle.
#[derive(Debug, Clone, Default)]
pub struct QueuedPresenter {
    pending: Rc<RefCell<VecDeque<(PresentationEffect, Completion)>>>,
}

impl QueuedPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn peek_effect(&self) -> Option<PresentationEffect> {
        self.pending.borrow().front().map(|(effect, _)| effect.clone())
    }

    /// Fires the oldest pending completion. Returns false if none was waiting.
    pub fn complete_next(&self) -> bool {
        match self.pending.borrow_mut().pop_front() {
            Some((_, completion)) => {
                completion.resolve();
                true
            }
            None => false,
        }
    }

    pub fn complete_all(&self) -> usize {
        let drained: Vec<_> = self.pending.borrow_mut().drain(..).collect();
        for (_, completion) in &drained {
            completion.resolve();
        }
        drained.len()
    }

    pub fn fail_next(&self, reason: &str) -> bool {
        match self.pending.borrow_mut().pop_front() {
            Some((_, completion)) => {
                completion.fail(reason);
                true
            }
            None => false,
        }
    }
}

impl Presenter for QueuedPresenter {
    fn play(&mut self, effect: PresentationEffect) -> Completion {
        let completion = Completion::pending();
        self.pending
            .borrow_mut()
            .push_back((effect, completion.clone()));
        completion
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn queued_presenter_releases_in_order() {
        let handle = QueuedPresenter::new();
        let mut presenter = handle.clone();
        let first = presenter.play(PresentationEffect::Text("one".into()));
        let second = presenter.play(PresentationEffect::Text("two".into()));

        assert_eq!(handle.pending_len(), 2);
        assert!(handle.complete_next());
        assert_eq!(first.state(), CompletionState::Done);
        assert!(second.is_pending());

        assert!(handle.fail_next("renderer gone"));
        assert_eq!(
            second.state(),
            CompletionState::Failed("renderer gone".to_string())
        );
        assert!(!handle.complete_next());
    }

    #[test]
    fn immediate_presenter_is_always_done() {
        let completion = ImmediatePresenter.play(PresentationEffect::Text("hi".into()));
        assert_eq!(completion.state(), CompletionState::Done);
    }
}
