use crate::battle::arena::tags::{ArenaTagBehavior, TagCore};
use crate::battle::arena::{TagApply, TagEnv};
use crate::battle::combatant::{BattlerIndex, Combatant, CombatantId};
use crate::battle::events::{BattleEvent, DamageSource};
use crate::{ArenaTagType, Move, PokemonType, Species};

/// Tags that only modify a value passed to them (Mist, Gravity, sports, pledges, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct FieldEffectTag {
    core: TagCore,
}

impl FieldEffectTag {
    pub fn new(core: TagCore) -> Self {
        Self { core }
    }

    fn burn_field(&self, env: &mut TagEnv<'_>, target: &mut (dyn Combatant + 'static)) -> bool {
        let Some(battler) = target.battler_index() else {
            return false;
        };
        if target.is_fainted() || target.has_type(PokemonType::Fire) {
            return false;
        }
        let damage = (target.max_hp() / 8).max(1);
        let dealt = target.take_damage(damage);
        env.events.push(BattleEvent::IndirectDamage {
            battler,
            species: target.species(),
            source: DamageSource::FieldTag(self.core.tag_type),
            damage: dealt,
        });
        true
    }
}

impl ArenaTagBehavior for FieldEffectTag {
    fn core(&self) -> &TagCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TagCore {
        &mut self.core
    }

    fn apply(&mut self, env: &mut TagEnv<'_>, args: &mut TagApply<'_>) -> bool {
        match (self.core.tag_type, args) {
            (ArenaTagType::Mist, TagApply::StatDrop { cancelled })
            | (ArenaTagType::Safeguard, TagApply::Status { cancelled }) => {
                **cancelled = true;
                true
            }
            (ArenaTagType::NoCrit, TagApply::Crit { blocked }) => {
                **blocked = true;
                true
            }
            (
                ArenaTagType::MudSport,
                TagApply::MovePower {
                    move_type: PokemonType::Electric,
                    multiplier,
                },
            )
            | (
                ArenaTagType::WaterSport,
                TagApply::MovePower {
                    move_type: PokemonType::Fire,
                    multiplier,
                },
            ) => {
                **multiplier *= 0.33;
                true
            }
            (ArenaTagType::IonDeluge, TagApply::MoveType { move_type }) => {
                if **move_type != PokemonType::Normal {
                    return false;
                }
                **move_type = PokemonType::Electric;
                true
            }
            (ArenaTagType::Gravity, TagApply::Accuracy { multiplier }) => {
                **multiplier *= 5.0 / 3.0;
                true
            }
            (ArenaTagType::Tailwind, TagApply::Speed { multiplier }) => {
                **multiplier *= 2.0;
                true
            }
            (ArenaTagType::GrassWaterPledge, TagApply::Speed { multiplier }) => {
                **multiplier *= 0.25;
                true
            }
            (ArenaTagType::WaterFirePledge, TagApply::SecondaryChance { multiplier }) => {
                **multiplier *= 2.0;
                true
            }
            (ArenaTagType::FireGrassPledge, TagApply::TurnEnd { target }) => {
                self.burn_field(env, &mut **target)
            }
            _ => false,
        }
    }
}

/// Field-wide rooms. Using the move again while the room is up ends it.
pub trait RoomTag {
    fn reverses_order(&self) -> bool;
    fn swaps_defenses(&self) -> bool;
    fn suppresses_items(&self) -> bool;
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoomEffectTag {
    core: TagCore,
}

impl RoomEffectTag {
    pub fn new(core: TagCore) -> Self {
        Self { core }
    }
}

impl RoomTag for RoomEffectTag {
    fn reverses_order(&self) -> bool {
        self.core.tag_type == ArenaTagType::TrickRoom
    }

    fn swaps_defenses(&self) -> bool {
        self.core.tag_type == ArenaTagType::WonderRoom
    }

    fn suppresses_items(&self) -> bool {
        self.core.tag_type == ArenaTagType::MagicRoom
    }
}

impl ArenaTagBehavior for RoomEffectTag {
    fn core(&self) -> &TagCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TagCore {
        &mut self.core
    }

    fn on_overlap(&mut self, _env: &mut TagEnv<'_>, _source: Option<CombatantId>) -> bool {
        false
    }
}

/// A stored attack (Future Sight) that strikes `target` when the tag expires.
#[derive(Debug, Clone, PartialEq)]
pub struct DelayedAttackTag {
    core: TagCore,
    source: BattlerIndex,
    source_species: Species,
    target: BattlerIndex,
    move_: Move,
}

impl DelayedAttackTag {
    pub fn new(
        core: TagCore,
        source: BattlerIndex,
        source_species: Species,
        target: BattlerIndex,
        move_: Move,
    ) -> Self {
        Self {
            core,
            source,
            source_species,
            target,
            move_,
        }
    }

    pub fn source(&self) -> BattlerIndex {
        self.source
    }

    pub fn target(&self) -> BattlerIndex {
        self.target
    }

    pub fn move_(&self) -> Move {
        self.move_
    }
}

impl ArenaTagBehavior for DelayedAttackTag {
    fn core(&self) -> &TagCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TagCore {
        &mut self.core
    }

    fn on_add(&self, env: &mut TagEnv<'_>, quiet: bool) {
        if !quiet {
            env.events.push(BattleEvent::DelayedAttackForeseen {
                battler: self.source,
                species: self.source_species,
                move_: self.move_,
            });
        }
    }

    // The strike itself is the visible end of the tag.
    fn on_remove(&self, _env: &mut TagEnv<'_>, _quiet: bool) {}
}
