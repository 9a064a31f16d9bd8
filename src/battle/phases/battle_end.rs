use tracing::info;

use crate::battle::events::BattleEvent;
use crate::battle::phases::{PhaseBuffer, PhaseHandler, PhaseStatus};
use crate::battle::state::{BattleContext, BattleOutcome};
use crate::errors::BattleResult;

/// Settles the outcome and drops everything still queued. The first outcome
/// recorded wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BattleEndPhase {
    outcome: BattleOutcome,
}

impl BattleEndPhase {
    pub fn new(outcome: BattleOutcome) -> Self {
        Self { outcome }
    }

    pub fn outcome(&self) -> BattleOutcome {
        self.outcome
    }
}

impl PhaseHandler for BattleEndPhase {
    fn start(&mut self, ctx: &mut BattleContext, buffer: &mut PhaseBuffer) -> BattleResult<PhaseStatus> {
        if ctx.outcome.is_none() {
            info!(outcome = %self.outcome, turn = ctx.turn, "battle over");
            ctx.outcome = Some(self.outcome);
            ctx.emit(BattleEvent::BattleEnded {
                outcome: self.outcome,
            });
            ctx.hooks.on_battle_over(self.outcome);
        }
        buffer.clear_queue();
        Ok(PhaseStatus::Done)
    }
}
