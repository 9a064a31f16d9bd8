use tracing::debug;

use crate::battle::arena::{TagApply, TagFamily};
use crate::battle::battler_tags::{BattlerTag, BattlerTagType};
use crate::battle::combatant::{BattlerIndex, Combatant, Status};
use crate::battle::events::BattleEvent;
use crate::battle::state::BattleContext;
use crate::errors::BattleResult;
use crate::{PokemonType, StatusEffect};

/// Type-based immunity to a non-volatile status.
pub fn is_immune_to_status(target: &dyn Combatant, status: StatusEffect) -> bool {
    match status {
        StatusEffect::Paralysis => target.has_type(PokemonType::Electric),
        StatusEffect::Burn => target.has_type(PokemonType::Fire),
        StatusEffect::Freeze => target.has_type(PokemonType::Ice),
        StatusEffect::Poison | StatusEffect::Toxic => {
            target.has_type(PokemonType::Poison) || target.has_type(PokemonType::Steel)
        }
        StatusEffect::Sleep => false,
    }
}

/// Attempts to inflict `status` on `target`. `announce` controls whether a
/// refusal is reported; secondary effects fail silently.
pub fn try_inflict_status(
    ctx: &mut BattleContext,
    source: BattlerIndex,
    target: BattlerIndex,
    status: StatusEffect,
    announce: bool,
) -> BattleResult<bool> {
    let combatant = ctx.require_combatant(target)?;
    let species = combatant.species();

    let refusal = if let Some(current) = combatant.status() {
        Some(format!("is already {}!", current.effect))
    } else if is_immune_to_status(combatant, status) {
        Some("is unaffected!".to_string())
    } else {
        None
    };
    if let Some(reason) = refusal {
        if announce {
            ctx.emit(BattleEvent::StatusBlocked {
                battler: target,
                species,
                reason,
            });
        }
        return Ok(false);
    }

    if source.is_opponent_of(target) {
        let mut cancelled = false;
        let (arena, mut env) = ctx.split_arena();
        arena.apply_tags_for_side(
            TagFamily::Field,
            target.side().tag_side(),
            &mut env,
            &mut TagApply::Status {
                cancelled: &mut cancelled,
            },
        );
        if cancelled {
            if announce {
                ctx.emit(BattleEvent::StatusBlocked {
                    battler: target,
                    species,
                    reason: "is protected by Safeguard!".to_string(),
                });
            }
            return Ok(false);
        }
    }

    let mut applied = Status::new(status);
    if status == StatusEffect::Sleep {
        applied.turn_count = ctx.rng.int_range(2, 4, "sleep duration") as u8;
    }
    ctx.require_combatant_mut(target)?.set_status(Some(applied));
    debug!(battler = %target, %status, turns = applied.turn_count, "status inflicted");
    ctx.emit(BattleEvent::StatusApplied {
        battler: target,
        species,
        status,
    });
    Ok(true)
}

/// Confuses for 2-5 actions. Fails if the target is already confused.
pub fn try_confuse(ctx: &mut BattleContext, target: BattlerIndex, announce: bool) -> BattleResult<bool> {
    let combatant = ctx.require_combatant(target)?;
    let species = combatant.species();
    if combatant.tags().has(BattlerTagType::Confused) {
        if announce {
            ctx.emit(BattleEvent::StatusBlocked {
                battler: target,
                species,
                reason: "is already confused!".to_string(),
            });
        }
        return Ok(false);
    }
    let turns = ctx.rng.int_range(2, 5, "confusion duration") as u8;
    ctx.require_combatant_mut(target)?
        .tags_mut()
        .add(BattlerTag::Confused {
            turns_remaining: turns,
        });
    ctx.emit(BattleEvent::BecameConfused {
        battler: target,
        species,
    });
    Ok(true)
}

/// Flinching only matters if the target has yet to act this turn.
pub fn flinch(ctx: &mut BattleContext, target: BattlerIndex) -> BattleResult<()> {
    let combatant = ctx.require_combatant_mut(target)?;
    if !combatant.turn_data().acted {
        combatant.tags_mut().add(BattlerTag::Flinched);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::tests::common::TestPokemonBuilder;
    use crate::Species;
    use rstest::rstest;

    #[rstest]
    #[case(Species::Pikachu, StatusEffect::Paralysis, true)]
    #[case(Species::Charizard, StatusEffect::Burn, true)]
    #[case(Species::Muk, StatusEffect::Toxic, true)]
    #[case(Species::Skarmory, StatusEffect::Poison, true)]
    #[case(Species::Snorlax, StatusEffect::Poison, false)]
    #[case(Species::Pikachu, StatusEffect::Sleep, false)]
    fn type_immunities(#[case] species: Species, #[case] status: StatusEffect, #[case] immune: bool) {
        let pokemon = TestPokemonBuilder::new(species, 30).build();
        assert_eq!(is_immune_to_status(&pokemon, status), immune);
    }
}
