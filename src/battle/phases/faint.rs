use tracing::{debug, info};

use crate::battle::combatant::{BattlerIndex, Side};
use crate::battle::events::BattleEvent;
use crate::battle::phases::{BattleEndPhase, Phase, PhaseBuffer, PhaseHandler, PhaseStatus, SummonPhase};
use crate::battle::state::{BattleContext, BattleOutcome};
use crate::errors::BattleResult;

/// Queues a `FaintPhase` for every fainted slot-holder that does not have one
/// yet. Call after anything that deals damage.
pub fn queue_faints(ctx: &mut BattleContext, buffer: &mut PhaseBuffer) {
    for battler in BattlerIndex::ALL {
        let fainted = ctx
            .combatant(battler)
            .is_some_and(|combatant| combatant.is_fainted());
        if fainted && ctx.faint_pending.insert(battler) {
            debug!(battler = %battler, "faint queued");
            buffer.push_front(Phase::Faint(FaintPhase::new(battler)));
        }
    }
}

/// Removes a fainted combatant, decides whether either side is out, and
/// otherwise asks for a replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaintPhase {
    battler: BattlerIndex,
}

impl FaintPhase {
    pub fn new(battler: BattlerIndex) -> Self {
        Self { battler }
    }

    fn outcome(ctx: &BattleContext) -> Option<BattleOutcome> {
        let player_out = ctx.field.party(Side::Player).all_fainted();
        let enemy_out = ctx.field.party(Side::Enemy).all_fainted();
        match (player_out, enemy_out) {
            (true, true) => Some(BattleOutcome::Draw),
            (true, false) => Some(BattleOutcome::PlayerDefeat),
            (false, true) => Some(BattleOutcome::PlayerVictory),
            (false, false) => None,
        }
    }
}

impl PhaseHandler for FaintPhase {
    fn start(&mut self, ctx: &mut BattleContext, buffer: &mut PhaseBuffer) -> BattleResult<PhaseStatus> {
        let battler = self.battler;
        ctx.faint_pending.remove(&battler);
        let Some(combatant) = ctx.combatant_mut(battler) else {
            return Ok(PhaseStatus::Done);
        };
        combatant.tags_mut().clear();
        let species = combatant.species();
        ctx.emit(BattleEvent::Fainted { battler, species });
        ctx.field.party_mut(battler.side()).clear_slot(battler.slot());
        info!(battler = %battler, %species, "fainted");

        if let Some(outcome) = Self::outcome(ctx) {
            buffer.push_front(Phase::BattleEnd(BattleEndPhase::new(outcome)));
            return Ok(PhaseStatus::Done);
        }

        let candidates = ctx.field.party(battler.side()).bench_candidates();
        let Some(&first) = candidates.first() else {
            return Ok(PhaseStatus::Done);
        };
        let chosen = ctx.command_sources[battler.side().index()].choose_replacement(
            battler,
            &candidates,
            &mut ctx.rng,
        );
        let party_index = if candidates.contains(&chosen) { chosen } else { first };
        debug!(battler = %battler, party_index, "replacement chosen");
        buffer.push_front(Phase::Summon(SummonPhase::new(battler, party_index)));
        Ok(PhaseStatus::Done)
    }
}
