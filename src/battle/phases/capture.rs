use tracing::debug;

use crate::battle::catch::{calculate_catch_rate, roll_catch_success, POKE_BALL_MULTIPLIER};
use crate::battle::combatant::{BattlerIndex, Side};
use crate::battle::events::BattleEvent;
use crate::battle::phases::{BattleEndPhase, Phase, PhaseBuffer, PhaseHandler, PhaseStatus};
use crate::battle::presentation::PresentationEffect;
use crate::battle::state::{BattleContext, BattleOutcome};
use crate::errors::BattleResult;

/// Throws a Poke Ball at the first standing enemy. The roll happens after
/// the throw animation completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptCapturePhase {
    thrower: BattlerIndex,
    target: Option<BattlerIndex>,
}

impl AttemptCapturePhase {
    pub fn new(thrower: BattlerIndex) -> Self {
        Self {
            thrower,
            target: None,
        }
    }
}

impl PhaseHandler for AttemptCapturePhase {
    fn start(&mut self, ctx: &mut BattleContext, _buffer: &mut PhaseBuffer) -> BattleResult<PhaseStatus> {
        if ctx.poke_balls == 0 {
            return Ok(PhaseStatus::Done);
        }
        let Some(target) = ctx.field.active_on_side(Side::Enemy).first().copied() else {
            return Ok(PhaseStatus::Done);
        };
        ctx.poke_balls -= 1;
        let species = ctx.require_combatant(target)?.species();
        debug!(thrower = %self.thrower, target = %target, balls_left = ctx.poke_balls, "ball thrown");
        ctx.emit(BattleEvent::BallThrown { target, species });
        self.target = Some(target);
        let completion = ctx
            .presenter
            .play(PresentationEffect::CaptureAnimation { species });
        Ok(PhaseStatus::Awaiting(completion))
    }

    fn resume(&mut self, ctx: &mut BattleContext, buffer: &mut PhaseBuffer) -> BattleResult<PhaseStatus> {
        let Some(target) = self.target else {
            return Ok(PhaseStatus::Done);
        };
        let combatant = ctx.require_combatant(target)?;
        let species = combatant.species();
        let species_rate = ctx.data.require_species(species)?.catch_rate;
        let rate = calculate_catch_rate(combatant, species_rate, POKE_BALL_MULTIPLIER);
        if roll_catch_success(rate, &mut ctx.rng) {
            ctx.emit(BattleEvent::CaptureSucceeded { species });
            buffer.push_front(Phase::BattleEnd(BattleEndPhase::new(BattleOutcome::Captured(species))));
        } else {
            debug!(%species, rate, "broke free");
            ctx.emit(BattleEvent::CaptureFailed { species });
        }
        Ok(PhaseStatus::Done)
    }
}
