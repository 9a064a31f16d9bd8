//! Bringing combatants onto the field and taking them off it.

use tracing::{debug, warn};

use crate::battle::arena::{TagApply, TagFamily};
use crate::battle::combatant::{BattlerIndex, TurnData};
use crate::battle::events::BattleEvent;
use crate::battle::phases::{queue_faints, Phase, PhaseBuffer, PhaseHandler, PhaseStatus};
use crate::battle::presentation::PresentationEffect;
use crate::battle::state::BattleContext;
use crate::errors::BattleResult;
use crate::ArenaTagType;

/// A chosen switch: recall whoever holds the slot, then summon the replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchSummonPhase {
    battler: BattlerIndex,
    party_index: usize,
}

impl SwitchSummonPhase {
    pub fn new(battler: BattlerIndex, party_index: usize) -> Self {
        Self {
            battler,
            party_index,
        }
    }
}

impl PhaseHandler for SwitchSummonPhase {
    fn start(&mut self, ctx: &mut BattleContext, buffer: &mut PhaseBuffer) -> BattleResult<PhaseStatus> {
        let battler = self.battler;
        if let Some(outgoing) = ctx.combatant_mut(battler) {
            if outgoing.is_fainted() {
                return Ok(PhaseStatus::Done);
            }
            outgoing.tags_mut().clear();
            outgoing.reset_stat_stages();
            let species = outgoing.species();
            ctx.emit(BattleEvent::Recalled { battler, species });
        }
        ctx.field.party_mut(battler.side()).clear_slot(battler.slot());
        buffer.push_front(Phase::Summon(SummonPhase::new(battler, self.party_index)));
        Ok(PhaseStatus::Done)
    }
}

/// Places a party member in a slot with fresh volatile state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummonPhase {
    battler: BattlerIndex,
    party_index: usize,
}

impl SummonPhase {
    pub fn new(battler: BattlerIndex, party_index: usize) -> Self {
        Self {
            battler,
            party_index,
        }
    }

    pub fn battler(&self) -> BattlerIndex {
        self.battler
    }
}

impl PhaseHandler for SummonPhase {
    fn start(&mut self, ctx: &mut BattleContext, _buffer: &mut PhaseBuffer) -> BattleResult<PhaseStatus> {
        let battler = self.battler;
        let party = ctx.field.party_mut(battler.side());
        let standing = party
            .member(self.party_index)
            .is_some_and(|member| !member.is_fainted());
        if !standing || !party.place(battler.slot(), self.party_index, battler) {
            warn!(battler = %battler, party_index = self.party_index, "nothing to summon");
            return Ok(PhaseStatus::Done);
        }

        let combatant = ctx.require_combatant_mut(battler)?;
        combatant.tags_mut().clear();
        combatant.reset_stat_stages();
        combatant.set_turns_active(0);
        *combatant.turn_data_mut() = TurnData::default();
        let species = combatant.species();
        debug!(battler = %battler, %species, "summoned");

        ctx.emit(BattleEvent::Summoned { battler, species });
        let completion = ctx
            .presenter
            .play(PresentationEffect::Summon { battler, species });
        Ok(PhaseStatus::Awaiting(completion))
    }

    fn resume(&mut self, _ctx: &mut BattleContext, buffer: &mut PhaseBuffer) -> BattleResult<PhaseStatus> {
        buffer.push_front(Phase::PostSummon(PostSummonPhase::new(self.battler)));
        Ok(PhaseStatus::Done)
    }
}

/// Entry hazards on the newcomer's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostSummonPhase {
    battler: BattlerIndex,
}

impl PostSummonPhase {
    pub fn new(battler: BattlerIndex) -> Self {
        Self { battler }
    }
}

impl PhaseHandler for PostSummonPhase {
    fn start(&mut self, ctx: &mut BattleContext, buffer: &mut PhaseBuffer) -> BattleResult<PhaseStatus> {
        let battler = self.battler;
        let gravity = ctx.arena.has_tag(ArenaTagType::Gravity);
        let (field, arena, mut env) = ctx.split_field_arena();
        let Some(target) = field.combatant_mut(battler) else {
            return Ok(PhaseStatus::Done);
        };
        let grounded = gravity || target.is_grounded();
        arena.apply_tags_for_side(
            TagFamily::Hazard,
            battler.side().tag_side(),
            &mut env,
            &mut TagApply::Summon { target, grounded },
        );
        queue_faints(ctx, buffer);
        Ok(PhaseStatus::Done)
    }
}
