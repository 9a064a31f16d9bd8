use tracing::debug;

use crate::battle::arena::{weather_duration, NewTag, TagFamily};
use crate::battle::battler_tags::BattlerTag;
use crate::battle::combatant::BattlerIndex;
use crate::battle::events::BattleEvent;
use crate::battle::move_effects::status_effects::flinch;
use crate::battle::move_effects::EffectContext;
use crate::battle::state::BattleContext;
use crate::errors::BattleResult;
use crate::move_data::TagScope;
use crate::{ArenaTagSide, ArenaTagType, HeldItem, WeatherType};

const DELAYED_ATTACK_TURNS: i32 = 3;
const SCREENS: [ArenaTagType; 3] = [
    ArenaTagType::Reflect,
    ArenaTagType::LightScreen,
    ArenaTagType::AuroraVeil,
];

/// Resolves a scope relative to the user into an arena side.
pub fn scope_side(user: BattlerIndex, scope: TagScope) -> ArenaTagSide {
    match scope {
        TagScope::User => user.side().tag_side(),
        TagScope::Target => user.side().opponent().tag_side(),
        TagScope::Both => ArenaTagSide::Both,
    }
}

pub fn protect(ctx: &mut BattleContext, user: BattlerIndex) -> BattleResult<()> {
    let combatant = ctx.require_combatant_mut(user)?;
    combatant.tags_mut().add(BattlerTag::Protected);
    let species = combatant.species();
    ctx.emit(BattleEvent::ProtectingItself {
        battler: user,
        species,
    });
    Ok(())
}

/// The next move against the target cannot miss. Lasts through the end of
/// the following turn.
pub fn lock_on(ctx: &mut BattleContext, user: BattlerIndex) -> BattleResult<()> {
    ctx.require_combatant_mut(user)?
        .tags_mut()
        .add(BattlerTag::IgnoreAccuracy { turns_remaining: 2 });
    Ok(())
}

/// Returns false when the same weather is already up.
pub fn set_weather(ctx: &mut BattleContext, weather: WeatherType) -> bool {
    let (arena, mut env) = ctx.split_arena();
    arena.try_set_weather(weather, weather_duration(weather), &mut env)
}

/// Adds an arena tag for the move. Overlapping a hazard or a room is a valid
/// use; overlapping anything else fails the move.
pub fn add_arena_tag(
    ctx: &mut BattleContext,
    effect: &EffectContext,
    tag: ArenaTagType,
    turns: i32,
    scope: TagScope,
) -> BattleResult<bool> {
    let user_id = ctx.require_combatant(effect.user)?.id();
    let side = scope_side(effect.user, scope);
    let new_tag = NewTag::new(tag, turns, side).with_source(effect.move_, user_id);
    let (arena, mut env) = ctx.split_arena();
    let added = arena.add_tag(new_tag, false, &mut env);
    Ok(added || matches!(TagFamily::of(tag), TagFamily::Hazard | TagFamily::Room))
}

pub fn remove_arena_tags(ctx: &mut BattleContext, user: BattlerIndex, tags: &[ArenaTagType], scope: TagScope) {
    let side = scope_side(user, scope);
    let (arena, mut env) = ctx.split_arena();
    for tag in tags {
        arena.remove_tag_on_side(*tag, side, false, &mut env);
    }
}

/// Brick Break: shatters screens on the target's side before the hit.
pub fn break_screens(ctx: &mut BattleContext, target: BattlerIndex) {
    let side = target.side().tag_side();
    let (arena, mut env) = ctx.split_arena();
    for screen in SCREENS {
        if arena.remove_tag_on_side(screen, side, false, &mut env) {
            debug!(tag = ?screen, ?side, "screen broken");
        }
    }
}

/// Future Sight: plants a delayed attack on the target's side. Fails while
/// one is already pending there.
pub fn place_delayed_attack(ctx: &mut BattleContext, effect: &EffectContext) -> BattleResult<bool> {
    let user = ctx.require_combatant(effect.user)?;
    let new_tag = NewTag::new(
        ArenaTagType::DelayedAttack,
        DELAYED_ATTACK_TURNS,
        effect.target.side().tag_side(),
    )
    .with_source(effect.move_, user.id())
    .with_source_battler(effect.user, user.species())
    .with_target(effect.target);
    let (arena, mut env) = ctx.split_arena();
    Ok(arena.add_tag(new_tag, false, &mut env))
}

/// King's Rock and Grip Claw, after a damaging contact hit. Magic Room
/// disables both.
pub fn apply_contact_items(ctx: &mut BattleContext, user: BattlerIndex, target: BattlerIndex) -> BattleResult<()> {
    if ctx.arena.items_suppressed() {
        return Ok(());
    }
    let attacker = ctx.require_combatant(user)?;
    let species = attacker.species();
    let kings_rock = attacker.holds(HeldItem::KingsRock);
    let grip_claw = attacker.holds(HeldItem::GripClaw);

    if kings_rock && ctx.rng.percent(10, "king's rock flinch") {
        ctx.emit(BattleEvent::ItemActivated {
            battler: user,
            species,
            item: HeldItem::KingsRock,
        });
        flinch(ctx, target)?;
    }

    if grip_claw && ctx.rng.percent(10, "grip claw steal") {
        let target_items = ctx.require_combatant(target)?.held_items().to_vec();
        let Some(&item) = ctx.rng.pick(&target_items, "grip claw item") else {
            return Ok(());
        };
        if ctx.require_combatant_mut(target)?.take_item(item) {
            ctx.require_combatant_mut(user)?.give_item(item);
            ctx.emit(BattleEvent::ItemTransferred {
                from: target,
                to: user,
                to_species: species,
                item,
            });
        }
    }
    Ok(())
}

/// Shell Bell: heals 1/8 of the damage the action dealt.
pub fn apply_shell_bell(ctx: &mut BattleContext, user: BattlerIndex) -> BattleResult<()> {
    if ctx.arena.items_suppressed() {
        return Ok(());
    }
    let attacker = ctx.require_combatant(user)?;
    if !attacker.is_active() || !attacker.holds(HeldItem::ShellBell) {
        return Ok(());
    }
    let dealt = attacker.turn_data().damage_dealt;
    if dealt == 0 || attacker.hp() >= attacker.max_hp() {
        return Ok(());
    }
    let species = attacker.species();
    let amount = (dealt / 8).max(1).min(u32::from(u16::MAX)) as u16;
    ctx.emit(BattleEvent::ItemActivated {
        battler: user,
        species,
        item: HeldItem::ShellBell,
    });
    super::damage_effects::apply_heal(ctx, user, amount)?;
    Ok(())
}
