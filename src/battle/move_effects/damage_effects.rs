use crate::battle::combatant::BattlerIndex;
use crate::battle::events::{BattleEvent, DamageSource};
use crate::battle::state::BattleContext;
use crate::errors::BattleResult;

/// Damage from a move striking its target. Records it on both sides' turn data.
pub fn apply_move_damage(
    ctx: &mut BattleContext,
    user: BattlerIndex,
    target: BattlerIndex,
    amount: u16,
) -> BattleResult<u16> {
    let combatant = ctx.require_combatant_mut(target)?;
    let dealt = combatant.take_damage(amount);
    combatant.turn_data_mut().damage_taken += u32::from(dealt);
    let species = combatant.species();
    let remaining_hp = combatant.hp();
    if let Some(attacker) = ctx.combatant_mut(user) {
        attacker.turn_data_mut().damage_dealt += u32::from(dealt);
    }
    ctx.emit(BattleEvent::DamageDealt {
        battler: target,
        species,
        damage: dealt,
        remaining_hp,
    });
    Ok(dealt)
}

/// Damage that does not come from a move striking (recoil, weather, hazards).
pub fn apply_indirect_damage(
    ctx: &mut BattleContext,
    target: BattlerIndex,
    amount: u16,
    source: DamageSource,
) -> BattleResult<u16> {
    let combatant = ctx.require_combatant_mut(target)?;
    let dealt = combatant.take_damage(amount);
    let species = combatant.species();
    ctx.emit(BattleEvent::IndirectDamage {
        battler: target,
        species,
        source,
        damage: dealt,
    });
    Ok(dealt)
}

/// Restores HP. Nothing is reported when the combatant is already full.
pub fn apply_heal(ctx: &mut BattleContext, target: BattlerIndex, amount: u16) -> BattleResult<u16> {
    let combatant = ctx.require_combatant_mut(target)?;
    let healed = combatant.heal(amount);
    if healed > 0 {
        let species = combatant.species();
        let new_hp = combatant.hp();
        ctx.emit(BattleEvent::Healed {
            battler: target,
            species,
            amount: healed,
            new_hp,
        });
    }
    Ok(healed)
}

/// `percent` of `base`, rounded down but never below 1 when `base` is non-zero.
pub fn fraction_of(base: u32, percent: u8) -> u16 {
    if base == 0 || percent == 0 {
        return 0;
    }
    ((base * u32::from(percent) / 100).max(1)).min(u32::from(u16::MAX)) as u16
}

pub fn apply_recoil(
    ctx: &mut BattleContext,
    user: BattlerIndex,
    damage_dealt: u32,
    percent: u8,
) -> BattleResult<()> {
    let recoil = fraction_of(damage_dealt, percent);
    if recoil > 0 {
        apply_indirect_damage(ctx, user, recoil, DamageSource::Recoil)?;
    }
    Ok(())
}

/// Struggle costs a quarter of max HP whatever it dealt.
pub fn apply_struggle_recoil(ctx: &mut BattleContext, user: BattlerIndex) -> BattleResult<()> {
    let max_hp = ctx.require_combatant(user)?.max_hp();
    let recoil = (max_hp / 4).max(1);
    apply_indirect_damage(ctx, user, recoil, DamageSource::Struggle)?;
    Ok(())
}

pub fn apply_drain(
    ctx: &mut BattleContext,
    user: BattlerIndex,
    damage_dealt: u32,
    percent: u8,
) -> BattleResult<()> {
    let amount = fraction_of(damage_dealt, percent);
    if amount > 0 {
        apply_heal(ctx, user, amount)?;
    }
    Ok(())
}

/// Heals a percentage of max HP. Returns false when already at full HP.
pub fn apply_percent_heal(ctx: &mut BattleContext, user: BattlerIndex, percent: u8) -> BattleResult<bool> {
    let combatant = ctx.require_combatant(user)?;
    if combatant.hp() >= combatant.max_hp() {
        return Ok(false);
    }
    let amount = fraction_of(u32::from(combatant.max_hp()), percent);
    Ok(apply_heal(ctx, user, amount)? > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fractions_round_down_with_a_floor_of_one() {
        assert_eq!(fraction_of(100, 33), 33);
        assert_eq!(fraction_of(2, 25), 1);
        assert_eq!(fraction_of(0, 50), 0);
        assert_eq!(fraction_of(80, 0), 0);
    }
}
