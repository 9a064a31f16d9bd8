use tracing::debug;

use crate::battle::arena::{TagApply, TagFamily};
use crate::battle::combatant::BattlerIndex;
use crate::battle::events::BattleEvent;
use crate::battle::state::BattleContext;
use crate::errors::BattleResult;
use crate::StatType;

/// Moves a stat stage by `stages`, clamped to -6..=6. Mist on the target's
/// side stops drops coming from the other side. Returns whether the stage
/// actually moved.
pub fn apply_stat_change(
    ctx: &mut BattleContext,
    source: BattlerIndex,
    target: BattlerIndex,
    stat: StatType,
    stages: i8,
) -> BattleResult<bool> {
    let species = ctx.require_combatant(target)?.species();

    if stages < 0 && source.is_opponent_of(target) {
        let mut cancelled = false;
        let (arena, mut env) = ctx.split_arena();
        arena.apply_tags_for_side(
            TagFamily::Field,
            target.side().tag_side(),
            &mut env,
            &mut TagApply::StatDrop {
                cancelled: &mut cancelled,
            },
        );
        if cancelled {
            ctx.emit(BattleEvent::StatChangeBlocked {
                battler: target,
                species,
                stat,
                reason: "is protected by the mist!".to_string(),
            });
            return Ok(false);
        }
    }

    let combatant = ctx.require_combatant_mut(target)?;
    let old_stage = combatant.stat_stage(stat);
    let new_stage = (old_stage + stages).clamp(-6, 6);
    if new_stage == old_stage {
        let reason = if stages > 0 {
            "won't go any higher!"
        } else {
            "won't go any lower!"
        };
        ctx.emit(BattleEvent::StatChangeBlocked {
            battler: target,
            species,
            stat,
            reason: reason.to_string(),
        });
        return Ok(false);
    }
    combatant.set_stat_stage(stat, new_stage);
    debug!(battler = %target, %stat, old_stage, new_stage, "stat stage changed");
    ctx.emit(BattleEvent::StatStageChanged {
        battler: target,
        species,
        stat,
        old_stage,
        new_stage,
    });
    Ok(true)
}
