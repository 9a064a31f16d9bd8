use crate::battle::events::BattleEvent;
use crate::battle::phases::{PhaseBuffer, PhaseHandler, PhaseStatus};
use crate::battle::presentation::PresentationEffect;
use crate::battle::state::BattleContext;
use crate::errors::BattleResult;

/// Emits one event and waits for its text to be shown. Silent events finish
/// immediately.
#[derive(Debug, Clone, PartialEq)]
pub struct MessagePhase {
    event: BattleEvent,
}

impl MessagePhase {
    pub fn new(event: BattleEvent) -> Self {
        Self { event }
    }

    pub fn event(&self) -> &BattleEvent {
        &self.event
    }
}

impl PhaseHandler for MessagePhase {
    fn start(&mut self, ctx: &mut BattleContext, _buffer: &mut PhaseBuffer) -> BattleResult<PhaseStatus> {
        let text = self.event.format();
        ctx.emit(self.event.clone());
        match text {
            Some(text) => Ok(PhaseStatus::Awaiting(ctx.presenter.play(PresentationEffect::Text(text)))),
            None => Ok(PhaseStatus::Done),
        }
    }
}
