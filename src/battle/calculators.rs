//! Damage arithmetic. The pure formula is split from the part that reads the
//! battle context so the numbers can be tested on their own.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::battle::arena::{TagApply, TagFamily};
use crate::battle::combatant::{BattlerIndex, Combatant};
use crate::battle::state::BattleContext;
use crate::battle::stats::{apply_stat_stage, staged_stat};
use crate::errors::BattleResult;
use crate::move_data::MoveData;
use crate::{ArenaTagSide, MoveCategory, PokemonType, StatType, StatusEffect, WeatherType};

/// Outcome of applying a move to one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitResult {
    SuperEffective,
    NotVeryEffective,
    Effective,
    NoEffect,
    Fail,
    /// A status move that landed.
    Status,
    /// Damage that bypasses the type chart (fixed damage).
    Indirect,
}

impl HitResult {
    pub fn from_effectiveness(multiplier: f64) -> Self {
        if multiplier == 0.0 {
            HitResult::NoEffect
        } else if multiplier > 1.0 {
            HitResult::SuperEffective
        } else if multiplier < 1.0 {
            HitResult::NotVeryEffective
        } else {
            HitResult::Effective
        }
    }

    /// Outcomes that dealt damage through the normal formula or a fixed amount.
    pub fn is_damaging(self) -> bool {
        matches!(
            self,
            HitResult::SuperEffective
                | HitResult::NotVeryEffective
                | HitResult::Effective
                | HitResult::Indirect
        )
    }
}

/// `((2L/5 + 2) * P * A / D) / 50 + 2`, before any multiplier.
pub fn base_damage(level: u8, power: u16, attack: u16, defense: u16) -> f64 {
    let level_factor = f64::from(2 * u32::from(level) / 5 + 2);
    let defense = f64::from(defense.max(1));
    (level_factor * f64::from(power) * f64::from(attack) / defense).floor() / 50.0 + 2.0
}

/// Weather multiplier on a move of `move_type`.
pub fn weather_multiplier(weather: Option<WeatherType>, move_type: PokemonType) -> f64 {
    match (weather, move_type) {
        (Some(WeatherType::Sunny | WeatherType::HarshSun), PokemonType::Fire) => 1.5,
        (Some(WeatherType::Sunny | WeatherType::HarshSun), PokemonType::Water) => 0.5,
        (Some(WeatherType::Rain | WeatherType::HeavyRain), PokemonType::Water) => 1.5,
        (Some(WeatherType::Rain | WeatherType::HeavyRain), PokemonType::Fire) => 0.5,
        _ => 1.0,
    }
}

/// The multipliers stacked on top of base damage, in application order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageModifiers {
    pub spread: f64,
    pub weather: f64,
    pub critical: bool,
    /// The 85..=100 roll, as a percentage.
    pub random_percent: u32,
    pub stab: bool,
    pub effectiveness: f64,
    pub burned_physical: bool,
    pub screen: f64,
}

impl Default for DamageModifiers {
    fn default() -> Self {
        Self {
            spread: 1.0,
            weather: 1.0,
            critical: false,
            random_percent: 100,
            stab: false,
            effectiveness: 1.0,
            burned_physical: false,
            screen: 1.0,
        }
    }
}

/// Applies the modifiers to `base`. Anything that is not immune deals at least 1.
pub fn final_damage(base: f64, modifiers: &DamageModifiers) -> u16 {
    if modifiers.effectiveness == 0.0 {
        return 0;
    }
    let mut damage = base * modifiers.spread * modifiers.weather;
    if modifiers.critical {
        damage *= 1.5;
    }
    damage = (damage * f64::from(modifiers.random_percent) / 100.0).floor();
    if modifiers.stab {
        damage *= 1.5;
    }
    damage *= modifiers.effectiveness;
    if modifiers.burned_physical {
        damage *= 0.5;
    }
    damage *= modifiers.screen;
    (damage.floor() as u16).max(1)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageOutcome {
    pub damage: u16,
    pub critical: bool,
    pub effectiveness: f64,
    pub result: HitResult,
}

/// The type a move attacks with once field effects have had their say.
pub fn resolve_move_type(ctx: &mut BattleContext, move_data: &MoveData) -> PokemonType {
    let mut move_type = move_data.move_type;
    let (arena, mut env) = ctx.split_arena();
    arena.apply_tags_for_side(
        TagFamily::Field,
        ArenaTagSide::Both,
        &mut env,
        &mut TagApply::MoveType {
            move_type: &mut move_type,
        },
    );
    move_type
}

/// Full damage roll for `user` hitting `target`. Draws for the critical hit
/// and the random factor; an immune target draws nothing.
pub fn calculate_damage(
    ctx: &mut BattleContext,
    user: BattlerIndex,
    target: BattlerIndex,
    move_data: &MoveData,
    spread: bool,
) -> BattleResult<DamageOutcome> {
    let move_type = resolve_move_type(ctx, move_data);
    let effectiveness = {
        let defender = ctx.require_combatant(target)?;
        PokemonType::effectiveness_against(move_type, defender.types())
    };
    if effectiveness == 0.0 {
        return Ok(DamageOutcome {
            damage: 0,
            critical: false,
            effectiveness,
            result: HitResult::NoEffect,
        });
    }

    if let Some(fixed) = move_data.fixed_damage() {
        return Ok(DamageOutcome {
            damage: fixed,
            critical: false,
            effectiveness: 1.0,
            result: HitResult::Indirect,
        });
    }

    let target_side = target.side().tag_side();
    let critical = {
        let mut blocked = false;
        let (arena, mut env) = ctx.split_arena();
        arena.apply_tags_for_side(
            TagFamily::Field,
            target_side,
            &mut env,
            &mut TagApply::Crit {
                blocked: &mut blocked,
            },
        );
        !blocked && ctx.rng.chance(1, ctx.config.crit_rate_denominator, "critical hit")
    };

    let physical = move_data.category == MoveCategory::Physical;
    let (attack_stat, defense_stat) = if physical {
        (StatType::Attack, StatType::Defense)
    } else {
        (StatType::SpAttack, StatType::SpDefense)
    };
    // Wonder Room swaps which defence a category hits.
    let defense_stat = match (ctx.arena.defenses_swapped(), defense_stat) {
        (true, StatType::Defense) => StatType::SpDefense,
        (true, _) => StatType::Defense,
        (false, stat) => stat,
    };

    let attacker = ctx.require_combatant(user)?;
    let level = attacker.level();
    let attack = staged_stat(attacker, attack_stat);
    let stab = move_type != PokemonType::Typeless && attacker.has_type(move_type);
    let burned_physical = physical
        && attacker
            .status()
            .is_some_and(|status| status.effect == StatusEffect::Burn);
    let defense = staged_stat(ctx.require_combatant(target)?, defense_stat);

    let mut power_multiplier = 1.0;
    {
        let (arena, mut env) = ctx.split_arena();
        arena.apply_tags_for_side(
            TagFamily::Field,
            ArenaTagSide::Both,
            &mut env,
            &mut TagApply::MovePower {
                move_type,
                multiplier: &mut power_multiplier,
            },
        );
    }
    let screen = ctx.arena.screen_multiplier(
        target_side,
        move_data.category,
        critical,
        ctx.config.screen_multiplier(),
    );

    let power = (f64::from(move_data.power.unwrap_or(0)) * power_multiplier).floor() as u16;
    let base = base_damage(level, power.max(1), attack, defense);
    let modifiers = DamageModifiers {
        spread: if spread && ctx.is_double() { 0.75 } else { 1.0 },
        weather: weather_multiplier(ctx.arena.weather_type(), move_type),
        critical,
        random_percent: ctx.rng.int_range(85, 100, "damage roll"),
        stab,
        effectiveness,
        burned_physical,
        screen,
    };
    let damage = final_damage(base, &modifiers);
    trace!(%user, %target, base, ?modifiers, damage, "damage calculated");

    Ok(DamageOutcome {
        damage,
        critical,
        effectiveness,
        result: HitResult::from_effectiveness(effectiveness),
    })
}

/// Self-hit while confused: a 40-power typeless physical attack on itself,
/// with no random factor.
pub fn confusion_damage(combatant: &dyn Combatant) -> u16 {
    let attack = staged_stat(combatant, StatType::Attack);
    let defense = apply_stat_stage(
        combatant.stat(StatType::Defense),
        combatant.stat_stage(StatType::Defense),
    );
    (base_damage(combatant.level(), 40, attack, defense).floor() as u16).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn base_damage_matches_formula() {
        // Level 50: (22 * 90 * 100 / 100) / 50 + 2 = 41.6
        assert!((base_damage(50, 90, 100, 100) - 41.6).abs() < 1e-9);
    }

    #[test]
    fn modifiers_stack_in_order() {
        let base = 41.6;
        let neutral = final_damage(base, &DamageModifiers::default());
        assert_eq!(neutral, 41);

        let boosted = final_damage(
            base,
            &DamageModifiers {
                stab: true,
                effectiveness: 2.0,
                ..DamageModifiers::default()
            },
        );
        assert_eq!(boosted, 124);

        let screened = final_damage(
            base,
            &DamageModifiers {
                screen: 0.5,
                ..DamageModifiers::default()
            },
        );
        assert_eq!(screened, 20);
    }

    #[test]
    fn immunity_deals_nothing_and_anything_else_deals_one() {
        let immune = DamageModifiers {
            effectiveness: 0.0,
            ..DamageModifiers::default()
        };
        assert_eq!(final_damage(50.0, &immune), 0);
        let weak = DamageModifiers {
            effectiveness: 0.25,
            random_percent: 85,
            ..DamageModifiers::default()
        };
        assert_eq!(final_damage(2.0, &weak), 1);
    }

    #[test]
    fn weather_boosts_and_weakens() {
        assert_eq!(weather_multiplier(Some(WeatherType::Sunny), PokemonType::Fire), 1.5);
        assert_eq!(weather_multiplier(Some(WeatherType::Sunny), PokemonType::Water), 0.5);
        assert_eq!(weather_multiplier(Some(WeatherType::HeavyRain), PokemonType::Water), 1.5);
        assert_eq!(weather_multiplier(Some(WeatherType::Sandstorm), PokemonType::Rock), 1.0);
        assert_eq!(weather_multiplier(None, PokemonType::Fire), 1.0);
    }

    #[test]
    fn effectiveness_maps_to_hit_result() {
        assert_eq!(HitResult::from_effectiveness(4.0), HitResult::SuperEffective);
        assert_eq!(HitResult::from_effectiveness(0.5), HitResult::NotVeryEffective);
        assert_eq!(HitResult::from_effectiveness(1.0), HitResult::Effective);
        assert_eq!(HitResult::from_effectiveness(0.0), HitResult::NoEffect);
        assert!(!HitResult::Status.is_damaging());
    }
}
