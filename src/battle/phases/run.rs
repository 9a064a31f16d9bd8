use tracing::debug;

use crate::battle::catch::roll_escape;
use crate::battle::combatant::BattlerIndex;
use crate::battle::events::BattleEvent;
use crate::battle::phases::{BattleEndPhase, Phase, PhaseBuffer, PhaseHandler, PhaseStatus};
use crate::battle::state::{BattleContext, BattleOutcome};
use crate::battle::turn_order::effective_speed;
use crate::errors::BattleResult;

/// An escape attempt, measured against the fastest standing opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptRunPhase {
    battler: BattlerIndex,
}

impl AttemptRunPhase {
    pub fn new(battler: BattlerIndex) -> Self {
        Self { battler }
    }
}

impl PhaseHandler for AttemptRunPhase {
    fn start(&mut self, ctx: &mut BattleContext, buffer: &mut PhaseBuffer) -> BattleResult<PhaseStatus> {
        let battler = self.battler;
        if !ctx.field.is_active(battler) {
            return Ok(PhaseStatus::Done);
        }
        let speed = effective_speed(ctx, battler)?;
        let mut foe_speed = 0;
        for opponent in ctx.field.opponents_of(battler) {
            foe_speed = foe_speed.max(effective_speed(ctx, opponent)?);
        }

        let attempts = ctx.escape_attempts;
        let escaped = roll_escape(speed, foe_speed, attempts, &mut ctx.rng);
        ctx.escape_attempts += 1;
        debug!(battler = %battler, speed, foe_speed, attempts, escaped, "escape attempt");

        let side = battler.side();
        if escaped {
            ctx.emit(BattleEvent::FleeSucceeded { side });
            buffer.push_front(Phase::BattleEnd(BattleEndPhase::new(BattleOutcome::Fled)));
        } else {
            ctx.emit(BattleEvent::FleeFailed { side });
        }
        Ok(PhaseStatus::Done)
    }
}
