//! One strike of a move against its targets.
//!
//! Strike zero rolls the hit count and checks accuracy; every strike then
//! plays its animation and, once that completes, runs the per-hit pipeline
//! for each target that was hit:
//!
//! 1. protection on the target's side
//! 2. pre-apply effects (screen breaking)
//! 3. damage, or the status a status move exists for
//! 4. effects on the user, once per strike
//! 5. secondary effects on the target and on-hit reactions
//! 6. contact items
//!
//! A further strike is queued while hits remain and the first target is still
//! standing; the last strike writes the move history.

use tracing::{debug, trace};

use crate::battle::battler_tags::BattlerTagType;
use crate::battle::calculators::{calculate_damage, resolve_move_type, HitResult};
use crate::battle::combatant::{BattlerIndex, CombatantId, MoveHistoryEntry, MoveResult};
use crate::battle::events::BattleEvent;
use crate::battle::hit_check::{check_hit, roll_hit_count};
use crate::battle::move_effects::{
    apply_contact_items, apply_move_damage, apply_pre_effects, apply_self_effects,
    apply_shell_bell, apply_target_effects, try_inflict_status, EffectContext,
};
use crate::battle::phases::{queue_faints, Phase, PhaseBuffer, PhaseHandler, PhaseStatus};
use crate::battle::presentation::PresentationEffect;
use crate::battle::state::BattleContext;
use crate::errors::BattleResult;
use crate::move_data::{MoveData, MoveFlags};
use crate::{Move, PokemonType, Species};

#[derive(Debug, Clone, PartialEq)]
pub struct MoveEffectPhase {
    user: BattlerIndex,
    user_id: CombatantId,
    move_: Move,
    targets: Vec<BattlerIndex>,
    /// Zero-based strike number.
    strike: u8,
    /// Run by the engine (a delayed attack) rather than chosen this turn.
    is_virtual: bool,
    /// Targets this strike connected with; filled by `start`.
    hit_targets: Vec<BattlerIndex>,
    /// Targets already told they were protected.
    protected: Vec<BattlerIndex>,
    /// The first target blocked the move; no further strikes.
    blocked: bool,
    landed: bool,
    failed: bool,
}

impl MoveEffectPhase {
    pub fn new(user: BattlerIndex, user_id: CombatantId, move_: Move, targets: Vec<BattlerIndex>) -> Self {
        Self {
            user,
            user_id,
            move_,
            targets,
            strike: 0,
            is_virtual: false,
            hit_targets: Vec::new(),
            protected: Vec::new(),
            blocked: false,
            landed: false,
            failed: false,
        }
    }

    /// A delayed attack coming due. `source` must still hold `source_id`.
    pub fn delayed(source: BattlerIndex, source_id: CombatantId, move_: Move, target: BattlerIndex) -> Self {
        Self {
            is_virtual: true,
            ..Self::new(source, source_id, move_, vec![target])
        }
    }

    pub fn strike(&self) -> u8 {
        self.strike
    }

    pub fn is_virtual(&self) -> bool {
        self.is_virtual
    }

    fn next_strike(&self) -> Self {
        Self {
            strike: self.strike + 1,
            hit_targets: Vec::new(),
            ..self.clone()
        }
    }

    fn user_species(&self, ctx: &BattleContext) -> BattleResult<Species> {
        Ok(ctx.require_combatant(self.user)?.species())
    }

    fn emit_failed(&self, ctx: &mut BattleContext) -> BattleResult<()> {
        let species = self.user_species(ctx)?;
        ctx.emit(BattleEvent::MoveFailed {
            battler: self.user,
            species,
            move_: self.move_,
        });
        Ok(())
    }

    /// Delayed attacks announce themselves, then need their source in place.
    fn delayed_strike_ready(&self, ctx: &mut BattleContext) -> bool {
        let Some(&target) = self.targets.first() else {
            return false;
        };
        let Some(species) = ctx.field.species_at(target).filter(|_| ctx.field.is_active(target)) else {
            return false;
        };
        ctx.emit(BattleEvent::DelayedAttackStruck {
            target,
            species,
            move_: self.move_,
        });
        if !ctx.is_same_active(self.user, self.user_id) {
            debug!(source = %self.user, move_ = %self.move_, "delayed attack fizzled; source gone");
            return false;
        }
        true
    }

    fn is_protected(&self, ctx: &mut BattleContext, target: BattlerIndex, move_data: &MoveData) -> BattleResult<bool> {
        if self.is_virtual || target.side() == self.user.side() {
            return Ok(false);
        }
        let mut blocked = ctx.arena.guards_block(target.side().tag_side(), move_data);
        if !blocked && !move_data.has_flag(MoveFlags::IGNORE_PROTECT) {
            blocked = ctx.require_combatant(target)?.tags().has(BattlerTagType::Protected);
        }
        Ok(blocked)
    }

    /// Step 3. Returns the outcome and the damage dealt.
    fn apply(
        &self,
        ctx: &mut BattleContext,
        target: BattlerIndex,
        move_data: &MoveData,
    ) -> BattleResult<(HitResult, u16)> {
        let species = ctx.require_combatant(target)?.species();
        if move_data.is_damaging() {
            let roll = calculate_damage(ctx, self.user, target, move_data, self.targets.len() > 1)?;
            if roll.critical {
                ctx.emit(BattleEvent::CriticalHit { battler: target });
            }
            if roll.result != HitResult::Indirect && roll.effectiveness != 1.0 {
                ctx.emit(BattleEvent::Effectiveness {
                    battler: target,
                    species,
                    multiplier: roll.effectiveness,
                });
            }
            let dealt = if roll.damage > 0 {
                apply_move_damage(ctx, self.user, target, roll.damage)?
            } else {
                0
            };
            return Ok((roll.result, dealt));
        }

        let Some(status) = move_data.primary_status() else {
            return Ok((HitResult::Status, 0));
        };
        let move_type = resolve_move_type(ctx, move_data);
        let effectiveness = PokemonType::effectiveness_against(move_type, ctx.require_combatant(target)?.types());
        if effectiveness == 0.0 {
            ctx.emit(BattleEvent::Effectiveness {
                battler: target,
                species,
                multiplier: 0.0,
            });
            return Ok((HitResult::NoEffect, 0));
        }
        if try_inflict_status(ctx, self.user, target, status, true)? {
            Ok((HitResult::Status, 0))
        } else {
            Ok((HitResult::Fail, 0))
        }
    }

    /// The per-hit pipeline for one target.
    fn hit(
        &mut self,
        ctx: &mut BattleContext,
        target: BattlerIndex,
        move_data: &MoveData,
        self_effects_pending: &mut bool,
    ) -> BattleResult<()> {
        if self.is_protected(ctx, target, move_data)? {
            if self.targets.first() == Some(&target) {
                self.blocked = true;
            }
            if !self.protected.contains(&target) {
                self.protected.push(target);
                let species = ctx.require_combatant(target)?.species();
                ctx.emit(BattleEvent::ProtectedFromMove {
                    battler: target,
                    species,
                });
            }
            return Ok(());
        }

        let effect = EffectContext::new(self.user, target, self.move_);
        apply_pre_effects(ctx, &effect, move_data);

        let (outcome, damage) = self.apply(ctx, target, move_data)?;
        trace!(user = %self.user, target = %target, ?outcome, damage, "strike applied");
        match outcome {
            HitResult::Fail => {
                self.failed = true;
                return self.emit_failed(ctx);
            }
            HitResult::NoEffect => return Ok(()),
            _ => {}
        }

        if *self_effects_pending {
            *self_effects_pending = false;
            let took_hold = apply_self_effects(ctx, &effect, move_data, u32::from(damage))?;
            if !took_hold && !move_data.is_damaging() {
                self.failed = true;
                return self.emit_failed(ctx);
            }
        }
        self.landed = true;

        if ctx.field.is_active(target) {
            apply_target_effects(ctx, &effect, move_data, outcome, u32::from(damage))?;
        }
        if move_data.has_flag(MoveFlags::MAKES_CONTACT) && damage > 0 && ctx.field.is_active(self.user) {
            apply_contact_items(ctx, self.user, target)?;
        }
        Ok(())
    }

    /// After the last strike: Shell Bell, the multi-hit summary and the history entry.
    fn finish_action(&self, ctx: &mut BattleContext, buffer: &mut PhaseBuffer) -> BattleResult<()> {
        if !self.is_virtual {
            apply_shell_bell(ctx, self.user)?;
        }
        let result = if self.landed {
            MoveResult::Success
        } else if self.failed || self.blocked {
            MoveResult::Fail
        } else {
            MoveResult::Miss
        };
        let user = ctx.require_combatant_mut(self.user)?;
        let hits = user.turn_data().hit_count;
        user.turn_data_mut().hits_left = None;
        user.push_move_history(MoveHistoryEntry {
            move_: self.move_,
            targets: self.targets.clone(),
            result,
            is_virtual: self.is_virtual,
        });
        debug!(user = %self.user, move_ = %self.move_, hits, ?result, "move finished");
        if hits > 1 {
            buffer.push_front(Phase::message(BattleEvent::MultiHitSummary { hits }));
        }
        queue_faints(ctx, buffer);
        Ok(())
    }
}

impl PhaseHandler for MoveEffectPhase {
    fn start(&mut self, ctx: &mut BattleContext, buffer: &mut PhaseBuffer) -> BattleResult<PhaseStatus> {
        if self.is_virtual && self.strike == 0 {
            if !self.delayed_strike_ready(ctx) {
                return Ok(PhaseStatus::Done);
            }
        } else if !ctx.is_same_active(self.user, self.user_id) {
            return Ok(PhaseStatus::Done);
        }
        let move_data = ctx.move_data(self.move_)?;

        if self.strike == 0 {
            let hits = roll_hit_count(move_data.multi_hit(), &mut ctx.rng);
            let turn_data = ctx.require_combatant_mut(self.user)?.turn_data_mut();
            turn_data.hit_count = 0;
            turn_data.hits_left = Some(hits);
            trace!(user = %self.user, hits, "hit count rolled");
        }

        let species = self.user_species(ctx)?;
        let mut hit_targets = Vec::with_capacity(self.targets.len());
        for target in self.targets.clone() {
            if !ctx.field.is_active(target) {
                continue;
            }
            if check_hit(ctx, self.user, target, &move_data, self.strike)? {
                hit_targets.push(target);
            } else {
                ctx.emit(BattleEvent::MoveMissed {
                    battler: self.user,
                    species,
                    target,
                });
            }
        }

        if hit_targets.is_empty() {
            if self.strike == 0 && !self.targets.iter().any(|target| ctx.field.is_active(*target)) {
                ctx.emit(BattleEvent::NoTarget {
                    battler: self.user,
                    species,
                });
            }
            self.finish_action(ctx, buffer)?;
            return Ok(PhaseStatus::Done);
        }

        self.hit_targets = hit_targets;
        let completion = ctx.presenter.play(PresentationEffect::MoveAnimation {
            user: self.user,
            move_: self.move_,
            targets: self.hit_targets.clone(),
        });
        Ok(PhaseStatus::Awaiting(completion))
    }

    fn resume(&mut self, ctx: &mut BattleContext, buffer: &mut PhaseBuffer) -> BattleResult<PhaseStatus> {
        let move_data = ctx.move_data(self.move_)?;
        let mut self_effects_pending = true;
        for target in self.hit_targets.clone() {
            if !ctx.field.is_active(self.user) {
                break;
            }
            if !ctx.field.is_active(target) {
                continue;
            }
            self.hit(ctx, target, &move_data, &mut self_effects_pending)?;
        }

        let user = ctx.require_combatant_mut(self.user)?;
        let turn_data = user.turn_data_mut();
        turn_data.hit_count = turn_data.hit_count.saturating_add(1);
        let hits_left = turn_data.hits_left.map_or(0, |left| left.saturating_sub(1));
        turn_data.hits_left = Some(hits_left);

        let first_standing = self
            .targets
            .first()
            .is_some_and(|target| ctx.field.is_active(*target));
        let continues = hits_left > 0
            && first_standing
            && !self.blocked
            && !self.failed
            && ctx.field.is_active(self.user);
        if continues {
            queue_faints(ctx, buffer);
            buffer.push_front(Phase::MoveEffect(self.next_strike()));
        } else {
            self.finish_action(ctx, buffer)?;
        }
        Ok(PhaseStatus::Done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn next_strike_carries_the_action_forward() {
        let mut phase = MoveEffectPhase::new(BattlerIndex::Player, 7, Move::DoubleKick, vec![BattlerIndex::Enemy]);
        phase.hit_targets = vec![BattlerIndex::Enemy];
        phase.landed = true;

        let next = phase.next_strike();
        assert_eq!(next.strike(), 1);
        assert!(next.hit_targets.is_empty());
        assert!(next.landed);
        assert!(!next.is_virtual());
    }

    #[test]
    fn delayed_strikes_are_virtual() {
        let phase = MoveEffectPhase::delayed(BattlerIndex::Enemy, 3, Move::FutureSight, BattlerIndex::Player);
        assert!(phase.is_virtual());
        assert_eq!(phase.targets, vec![BattlerIndex::Player]);
    }
}
