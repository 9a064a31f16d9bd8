//! Who acts first.
//!
//! Two passes: the speed order is fixed once at the start of the round (RNG
//! used only to break speed ties), then the command order ranks the chosen
//! commands against it without drawing again.

use std::cmp::Reverse;

use tracing::debug;

use crate::battle::arena::{TagApply, TagFamily};
use crate::battle::combatant::BattlerIndex;
use crate::battle::commands::{fight_move, TurnCommand};
use crate::battle::rng::BattleRng;
use crate::battle::state::BattleContext;
use crate::battle::stats::staged_stat;
use crate::errors::BattleResult;
use crate::{StatType, StatusEffect};

/// Orders combatants by speed, fastest first. Ties are broken by a shuffle
/// before the stable sort. `reversed` flips the whole sequence.
pub fn speed_order(
    entries: &[(BattlerIndex, u32)],
    reversed: bool,
    rng: &mut BattleRng,
) -> Vec<BattlerIndex> {
    let mut shuffled = entries.to_vec();
    rng.shuffle(&mut shuffled, "speed tie shuffle");
    shuffled.sort_by_key(|(_, speed)| Reverse(*speed));
    let mut order: Vec<BattlerIndex> = shuffled.into_iter().map(|(battler, _)| battler).collect();
    if reversed {
        order.reverse();
    }
    order
}

/// Ranking keys for one command at execution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionPriority {
    pub battler: BattlerIndex,
    /// Anything that is not a fight goes first.
    pub is_fight: bool,
    pub move_priority: i8,
}

/// Sorts commands: non-fights, then move priority, then position in `speed_order`.
pub fn command_order(actions: &[ActionPriority], speed_order: &[BattlerIndex]) -> Vec<BattlerIndex> {
    let rank = |battler: BattlerIndex| {
        speed_order
            .iter()
            .position(|b| *b == battler)
            .unwrap_or(usize::MAX)
    };
    let mut sorted = actions.to_vec();
    sorted.sort_by_key(|action| {
        (
            action.is_fight,
            Reverse(action.move_priority),
            rank(action.battler),
        )
    });
    sorted.into_iter().map(|action| action.battler).collect()
}

/// Speed after stages, side tags and paralysis.
pub fn effective_speed(ctx: &mut BattleContext, battler: BattlerIndex) -> BattleResult<u32> {
    let combatant = ctx.require_combatant(battler)?;
    let base = f64::from(staged_stat(combatant, StatType::Speed));
    let paralysed = combatant
        .status()
        .is_some_and(|status| status.effect == StatusEffect::Paralysis);

    let mut multiplier = 1.0;
    let (arena, mut env) = ctx.split_arena();
    arena.apply_tags_for_side(
        TagFamily::Field,
        battler.side().tag_side(),
        &mut env,
        &mut TagApply::Speed {
            multiplier: &mut multiplier,
        },
    );
    if paralysed {
        multiplier *= 0.5;
    }
    Ok((base * multiplier).floor() as u32)
}

/// Computes and stores the speed order for every combatant holding a command.
pub fn resolve_speed_order(ctx: &mut BattleContext) -> BattleResult<Vec<BattlerIndex>> {
    let battlers: Vec<BattlerIndex> = ctx.commands.keys().copied().collect();
    let mut entries = Vec::with_capacity(battlers.len());
    for battler in battlers {
        entries.push((battler, effective_speed(ctx, battler)?));
    }
    let reversed = ctx.arena.is_order_reversed();
    let order = speed_order(&entries, reversed, &mut ctx.rng);
    debug!(?entries, reversed, ?order, "speed order resolved");
    ctx.speed_order = order.clone();
    Ok(order)
}

/// Execution order for this round's commands, using the stored speed order.
pub fn resolve_command_order(ctx: &BattleContext) -> BattleResult<Vec<BattlerIndex>> {
    let mut actions = Vec::with_capacity(ctx.commands.len());
    for (battler, command) in &ctx.commands {
        let move_priority = match command {
            TurnCommand::Fight { move_index, .. } => {
                let combatant = ctx.require_combatant(*battler)?;
                match fight_move(combatant, *move_index) {
                    Some(move_) => ctx.data.require_move(move_)?.priority,
                    None => 0,
                }
            }
            _ => 0,
        };
        actions.push(ActionPriority {
            battler: *battler,
            is_fight: command.is_fight(),
            move_priority,
        });
    }
    Ok(command_order(&actions, &ctx.speed_order))
}
