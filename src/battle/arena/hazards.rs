use crate::battle::arena::tags::{ArenaTagBehavior, TagCore};
use crate::battle::arena::{TagApply, TagEnv};
use crate::battle::combatant::{Combatant, CombatantId, Status};
use crate::battle::events::{BattleEvent, DamageSource};
use crate::{ArenaTagType, PokemonType, StatType, StatusEffect};

/// Layered side hazards that act when a combatant is sent out.
pub trait EntryHazard {
    fn layers(&self) -> u8;
    fn max_layers(&self) -> u8;
}

#[derive(Debug, Clone, PartialEq)]
pub struct HazardTag {
    core: TagCore,
    layers: u8,
    max_layers: u8,
    neutralized: bool,
}

impl HazardTag {
    pub fn new(core: TagCore) -> Self {
        let max_layers = match core.tag_type {
            ArenaTagType::Spikes => 3,
            ArenaTagType::ToxicSpikes => 2,
            _ => 1,
        };
        Self {
            core,
            layers: 1,
            max_layers,
            neutralized: false,
        }
    }

    fn on_summon(
        &mut self,
        env: &mut TagEnv<'_>,
        target: &mut (dyn Combatant + 'static),
        grounded: bool,
    ) -> bool {
        let Some(battler) = target.battler_index() else {
            return false;
        };
        let species = target.species();
        match self.core.tag_type {
            ArenaTagType::Spikes => {
                if !grounded {
                    return false;
                }
                let divisor = 10 - 2 * u16::from(self.layers);
                let damage = (target.max_hp() / divisor).max(1);
                let dealt = target.take_damage(damage);
                env.events.push(BattleEvent::IndirectDamage {
                    battler,
                    species,
                    source: DamageSource::Hazard(ArenaTagType::Spikes),
                    damage: dealt,
                });
                true
            }
            ArenaTagType::StealthRock => {
                let effectiveness =
                    PokemonType::effectiveness_against(PokemonType::Rock, target.types());
                if effectiveness == 0.0 {
                    return false;
                }
                let damage = ((f64::from(target.max_hp()) * effectiveness / 8.0).floor() as u16).max(1);
                let dealt = target.take_damage(damage);
                env.events.push(BattleEvent::IndirectDamage {
                    battler,
                    species,
                    source: DamageSource::Hazard(ArenaTagType::StealthRock),
                    damage: dealt,
                });
                true
            }
            ArenaTagType::ToxicSpikes => {
                if !grounded {
                    return false;
                }
                if target.has_type(PokemonType::Poison) {
                    // A grounded Poison type absorbs the spikes.
                    self.neutralized = true;
                    return true;
                }
                if target.has_type(PokemonType::Steel) || target.status().is_some() {
                    return false;
                }
                let effect = if self.layers >= 2 {
                    StatusEffect::Toxic
                } else {
                    StatusEffect::Poison
                };
                target.set_status(Some(Status::new(effect)));
                env.events.push(BattleEvent::StatusApplied {
                    battler,
                    species,
                    status: effect,
                });
                true
            }
            ArenaTagType::StickyWeb => {
                if !grounded {
                    return false;
                }
                let old_stage = target.stat_stage(StatType::Speed);
                if old_stage <= -6 {
                    env.events.push(BattleEvent::StatChangeBlocked {
                        battler,
                        species,
                        stat: StatType::Speed,
                        reason: "won't go any lower!".to_string(),
                    });
                    return true;
                }
                target.set_stat_stage(StatType::Speed, old_stage - 1);
                env.events.push(BattleEvent::StatStageChanged {
                    battler,
                    species,
                    stat: StatType::Speed,
                    old_stage,
                    new_stage: old_stage - 1,
                });
                true
            }
            _ => false,
        }
    }
}

impl EntryHazard for HazardTag {
    fn layers(&self) -> u8 {
        self.layers
    }

    fn max_layers(&self) -> u8 {
        self.max_layers
    }
}

impl ArenaTagBehavior for HazardTag {
    fn core(&self) -> &TagCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TagCore {
        &mut self.core
    }

    fn on_add(&self, env: &mut TagEnv<'_>, quiet: bool) {
        if !quiet {
            env.events.push(BattleEvent::ArenaTagAdded {
                tag: self.core.tag_type,
                side: self.core.side,
                layers: Some(self.layers),
            });
        }
    }

    /// Adds a layer up to the cap. The add announcement runs either way.
    fn on_overlap(&mut self, env: &mut TagEnv<'_>, _source: Option<CombatantId>) -> bool {
        if self.layers < self.max_layers {
            self.layers += 1;
        }
        self.on_add(env, false);
        true
    }

    fn apply(&mut self, env: &mut TagEnv<'_>, args: &mut TagApply<'_>) -> bool {
        match args {
            TagApply::Summon { target, grounded } => self.on_summon(env, &mut **target, *grounded),
            _ => false,
        }
    }

    fn is_neutralized(&self) -> bool {
        self.neutralized
    }
}
