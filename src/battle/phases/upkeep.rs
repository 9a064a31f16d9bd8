//! End-of-turn damage from weather and from non-volatile statuses.

use tracing::trace;

use crate::battle::combatant::{BattlerIndex, Combatant};
use crate::battle::events::{BattleEvent, DamageSource};
use crate::battle::move_effects::apply_indirect_damage;
use crate::battle::phases::{queue_faints, PhaseBuffer, PhaseHandler, PhaseStatus};
use crate::battle::state::BattleContext;
use crate::errors::BattleResult;
use crate::{PokemonType, StatusEffect, WeatherType};

const TOXIC_CAP: u8 = 15;

/// Ticks the weather, then applies sandstorm or hail chip damage.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeatherEffectPhase;

fn weather_spares(weather: WeatherType, combatant: &dyn Combatant) -> Option<bool> {
    match weather {
        WeatherType::Sandstorm => Some(
            [PokemonType::Rock, PokemonType::Ground, PokemonType::Steel]
                .into_iter()
                .any(|pokemon_type| combatant.has_type(pokemon_type)),
        ),
        WeatherType::Hail => Some(combatant.has_type(PokemonType::Ice)),
        _ => None,
    }
}

impl PhaseHandler for WeatherEffectPhase {
    fn start(&mut self, ctx: &mut BattleContext, buffer: &mut PhaseBuffer) -> BattleResult<PhaseStatus> {
        let still_active = {
            let (arena, mut env) = ctx.split_arena();
            arena.lapse_weather(&mut env)
        };
        let Some(weather) = ctx.arena.weather_type().filter(|_| still_active) else {
            return Ok(PhaseStatus::Done);
        };

        for battler in ctx.field.active_battlers() {
            let combatant = ctx.require_combatant(battler)?;
            // Only damaging weathers answer.
            let Some(spared) = weather_spares(weather, combatant) else {
                break;
            };
            if spared {
                continue;
            }
            let damage = (combatant.max_hp() / 16).max(1);
            apply_indirect_damage(ctx, battler, damage, DamageSource::Weather(weather))?;
        }
        queue_faints(ctx, buffer);
        Ok(PhaseStatus::Done)
    }
}

/// Poison, toxic and burn damage for one combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostTurnStatusPhase {
    battler: BattlerIndex,
}

impl PostTurnStatusPhase {
    pub fn new(battler: BattlerIndex) -> Self {
        Self { battler }
    }
}

impl PhaseHandler for PostTurnStatusPhase {
    fn start(&mut self, ctx: &mut BattleContext, buffer: &mut PhaseBuffer) -> BattleResult<PhaseStatus> {
        let battler = self.battler;
        if !ctx.field.is_active(battler) {
            return Ok(PhaseStatus::Done);
        }
        let combatant = ctx.require_combatant_mut(battler)?;
        let Some(mut status) = combatant.status().filter(|status| status.is_damaging()) else {
            return Ok(PhaseStatus::Done);
        };
        let max_hp = u32::from(combatant.max_hp());
        let damage = match status.effect {
            StatusEffect::Poison => max_hp / 8,
            StatusEffect::Burn => max_hp / 16,
            StatusEffect::Toxic => {
                status.turn_count = (status.turn_count + 1).min(TOXIC_CAP);
                combatant.set_status(Some(status));
                max_hp * u32::from(status.turn_count) / 16
            }
            _ => 0,
        };
        let damage = damage.clamp(1, u32::from(u16::MAX)) as u16;
        let dealt = combatant.take_damage(damage);
        let species = combatant.species();
        trace!(battler = %battler, status = %status.effect, dealt, "status damage");
        ctx.emit(BattleEvent::StatusDamage {
            battler,
            species,
            status: status.effect,
            damage: dealt,
        });
        queue_faints(ctx, buffer);
        Ok(PhaseStatus::Done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::tests::common::TestPokemonBuilder;
    use crate::Species;
    use rstest::rstest;

    #[rstest]
    #[case(WeatherType::Sandstorm, Species::Golem, Some(true))]
    #[case(WeatherType::Sandstorm, Species::Skarmory, Some(true))]
    #[case(WeatherType::Sandstorm, Species::Pikachu, Some(false))]
    #[case(WeatherType::Hail, Species::Pikachu, Some(false))]
    #[case(WeatherType::Rain, Species::Pikachu, None)]
    fn weather_chip_damage_spares_resistant_types(
        #[case] weather: WeatherType,
        #[case] species: Species,
        #[case] expected: Option<bool>,
    ) {
        let combatant = TestPokemonBuilder::new(species, 30).build();
        assert_eq!(weather_spares(weather, &combatant), expected);
    }
}
