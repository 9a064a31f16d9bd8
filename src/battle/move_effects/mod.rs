//! Move effect helpers used by the per-hit pipeline.
//!
//! `MoveEffect` values from the move table are dispatched here by trigger:
//! pre-apply, self post-apply, target post-apply and on-hit.

pub mod damage_effects;
pub mod special_effects;
pub mod stat_effects;
pub mod status_effects;

pub use damage_effects::*;
pub use special_effects::*;
pub use stat_effects::*;
pub use status_effects::*;

use tracing::trace;

use crate::battle::arena::{TagApply, TagFamily};
use crate::battle::calculators::HitResult;
use crate::battle::combatant::BattlerIndex;
use crate::battle::state::BattleContext;
use crate::errors::BattleResult;
use crate::move_data::{EffectTrigger, MoveData, MoveEffect};
use crate::Move;

/// Who is acting on whom for one strike.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectContext {
    pub user: BattlerIndex,
    pub target: BattlerIndex,
    pub move_: Move,
}

impl EffectContext {
    pub fn new(user: BattlerIndex, target: BattlerIndex, move_: Move) -> Self {
        Self {
            user,
            target,
            move_,
        }
    }
}

/// Secondary effect chance after side effects (Water/Fire pledge doubles it).
pub fn secondary_chance(ctx: &mut BattleContext, user: BattlerIndex, chance: u8) -> u32 {
    if chance >= 100 {
        return 100;
    }
    let mut multiplier = 1.0;
    let (arena, mut env) = ctx.split_arena();
    arena.apply_tags_for_side(
        TagFamily::Field,
        user.side().tag_side(),
        &mut env,
        &mut TagApply::SecondaryChance {
            multiplier: &mut multiplier,
        },
    );
    ((f64::from(chance) * multiplier).floor() as u32).min(100)
}

fn roll_secondary(ctx: &mut BattleContext, user: BattlerIndex, chance: u8, reason: &str) -> bool {
    let chance = secondary_chance(ctx, user, chance);
    ctx.rng.percent(chance, reason)
}

/// Step (b): effects that reshape the field before the strike lands.
pub fn apply_pre_effects(ctx: &mut BattleContext, effect: &EffectContext, move_data: &MoveData) {
    for move_effect in move_data.effects_with(EffectTrigger::PreApply) {
        if let MoveEffect::BreakScreens = move_effect {
            break_screens(ctx, effect.target);
        }
    }
}

/// Step (d): effects on the user or the user's side. Returns false when an
/// effect the move exists for could not take hold.
pub fn apply_self_effects(
    ctx: &mut BattleContext,
    effect: &EffectContext,
    move_data: &MoveData,
    damage: u32,
) -> BattleResult<bool> {
    let mut succeeded = true;
    let self_effects = move_data
        .effects_with(EffectTrigger::PostApply)
        .filter(|move_effect| move_effect.is_self_targeted());
    for move_effect in self_effects {
        trace!(user = %effect.user, ?move_effect, "self effect");
        match move_effect {
            MoveEffect::StatChange {
                stat,
                stages,
                chance,
                ..
            } => {
                if roll_secondary(ctx, effect.user, *chance, "self stat change") {
                    let moved = apply_stat_change(ctx, effect.user, effect.user, *stat, *stages)?;
                    succeeded &= moved || move_data.is_damaging();
                }
            }
            MoveEffect::Recoil { percent } => apply_recoil(ctx, effect.user, damage, *percent)?,
            MoveEffect::StruggleRecoil => apply_struggle_recoil(ctx, effect.user)?,
            MoveEffect::Heal { percent } => {
                succeeded &= apply_percent_heal(ctx, effect.user, *percent)?;
            }
            MoveEffect::Protect => protect(ctx, effect.user)?,
            MoveEffect::LockOn => lock_on(ctx, effect.user)?,
            MoveEffect::SetWeather(weather) => succeeded &= set_weather(ctx, *weather),
            MoveEffect::AddArenaTag { tag, turns, side } => {
                succeeded &= add_arena_tag(ctx, effect, *tag, *turns, *side)?;
            }
            MoveEffect::RemoveArenaTags { tags, side } => {
                remove_arena_tags(ctx, effect.user, tags, *side);
            }
            _ => {}
        }
    }
    Ok(succeeded)
}

/// Step (e): secondary effects on the target, then on-hit reactions.
pub fn apply_target_effects(
    ctx: &mut BattleContext,
    effect: &EffectContext,
    move_data: &MoveData,
    outcome: HitResult,
    damage: u32,
) -> BattleResult<()> {
    if outcome == HitResult::NoEffect {
        return Ok(());
    }
    let primary_status = move_data.primary_status();
    let guaranteed = !move_data.is_damaging();

    let target_effects = move_data
        .effects_with(EffectTrigger::PostApply)
        .filter(|move_effect| !move_effect.is_self_targeted());
    for move_effect in target_effects {
        if !ctx.field.is_active(effect.target) {
            break;
        }
        match move_effect {
            MoveEffect::InflictStatus { status, chance } => {
                // Already handled while applying a status move.
                if primary_status == Some(*status) {
                    continue;
                }
                if roll_secondary(ctx, effect.user, *chance, "secondary status") {
                    try_inflict_status(ctx, effect.user, effect.target, *status, guaranteed)?;
                }
            }
            MoveEffect::Confuse { chance } => {
                if roll_secondary(ctx, effect.user, *chance, "secondary confusion") {
                    try_confuse(ctx, effect.target, guaranteed)?;
                }
            }
            MoveEffect::Flinch { chance } => {
                if roll_secondary(ctx, effect.user, *chance, "flinch") {
                    flinch(ctx, effect.target)?;
                }
            }
            MoveEffect::StatChange {
                stat,
                stages,
                chance,
                ..
            } => {
                if roll_secondary(ctx, effect.user, *chance, "target stat change") {
                    apply_stat_change(ctx, effect.user, effect.target, *stat, *stages)?;
                }
            }
            _ => {}
        }
    }

    for move_effect in move_data.effects_with(EffectTrigger::Hit) {
        if let MoveEffect::Drain { percent } = move_effect {
            if ctx.field.is_active(effect.user) {
                apply_drain(ctx, effect.user, damage, *percent)?;
            }
        }
    }
    Ok(())
}
