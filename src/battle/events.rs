use serde::{Deserialize, Serialize};

use crate::battle::combatant::{BattlerIndex, Side};
use crate::battle::state::BattleOutcome;
use crate::config::BattleKind;
use crate::{ArenaTagSide, ArenaTagType, HeldItem, Move, Species, StatType, StatusEffect, WeatherType};

/// Why a combatant lost its action before the move started.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    Asleep,
    Frozen,
    Flinched,
    FullyParalyzed,
    HurtItselfInConfusion,
}

/// What dealt damage that did not come from a move striking its target.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageSource {
    Recoil,
    Struggle,
    Weather(WeatherType),
    Hazard(ArenaTagType),
    FieldTag(ArenaTagType),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum BattleEvent {
    // Battle and turn management
    BattleStarted {
        kind: BattleKind,
    },
    TurnStarted {
        turn: u32,
    },
    TurnEnded {
        turn: u32,
    },
    CommandRejected {
        battler: BattlerIndex,
        reason: String,
    },

    // Field presence
    Summoned {
        battler: BattlerIndex,
        species: Species,
    },
    Recalled {
        battler: BattlerIndex,
        species: Species,
    },
    Fainted {
        battler: BattlerIndex,
        species: Species,
    },

    // Move execution
    MoveUsed {
        battler: BattlerIndex,
        species: Species,
        move_: Move,
    },
    MoveFailed {
        battler: BattlerIndex,
        species: Species,
        move_: Move,
    },
    MoveMissed {
        battler: BattlerIndex,
        species: Species,
        target: BattlerIndex,
    },
    NoTarget {
        battler: BattlerIndex,
        species: Species,
    },
    ActionCancelled {
        battler: BattlerIndex,
        species: Species,
        reason: CancelReason,
    },
    ChargingUp {
        battler: BattlerIndex,
        species: Species,
        move_: Move,
    },
    ProtectingItself {
        battler: BattlerIndex,
        species: Species,
    },
    ProtectedFromMove {
        battler: BattlerIndex,
        species: Species,
    },
    MultiHitSummary {
        hits: u8,
    },
    DelayedAttackForeseen {
        battler: BattlerIndex,
        species: Species,
        move_: Move,
    },
    DelayedAttackStruck {
        target: BattlerIndex,
        species: Species,
        move_: Move,
    },

    // Damage and healing
    DamageDealt {
        battler: BattlerIndex,
        species: Species,
        damage: u16,
        remaining_hp: u16,
    },
    IndirectDamage {
        battler: BattlerIndex,
        species: Species,
        source: DamageSource,
        damage: u16,
    },
    Effectiveness {
        battler: BattlerIndex,
        species: Species,
        multiplier: f64,
    },
    CriticalHit {
        battler: BattlerIndex,
    },
    Healed {
        battler: BattlerIndex,
        species: Species,
        amount: u16,
        new_hp: u16,
    },
    HurtByConfusion {
        battler: BattlerIndex,
        species: Species,
        damage: u16,
    },

    // Status and stats
    StatusApplied {
        battler: BattlerIndex,
        species: Species,
        status: StatusEffect,
    },
    StatusCured {
        battler: BattlerIndex,
        species: Species,
        status: StatusEffect,
    },
    StatusDamage {
        battler: BattlerIndex,
        species: Species,
        status: StatusEffect,
        damage: u16,
    },
    StatusBlocked {
        battler: BattlerIndex,
        species: Species,
        reason: String,
    },
    BecameConfused {
        battler: BattlerIndex,
        species: Species,
    },
    ConfusionEnded {
        battler: BattlerIndex,
        species: Species,
    },
    StatStageChanged {
        battler: BattlerIndex,
        species: Species,
        stat: StatType,
        old_stage: i8,
        new_stage: i8,
    },
    StatChangeBlocked {
        battler: BattlerIndex,
        species: Species,
        stat: StatType,
        reason: String,
    },

    // Items
    ItemActivated {
        battler: BattlerIndex,
        species: Species,
        item: HeldItem,
    },
    ItemTransferred {
        from: BattlerIndex,
        to: BattlerIndex,
        to_species: Species,
        item: HeldItem,
    },

    // Field
    ArenaTagAdded {
        tag: ArenaTagType,
        side: ArenaTagSide,
        layers: Option<u8>,
    },
    ArenaTagRemoved {
        tag: ArenaTagType,
        side: ArenaTagSide,
    },
    WeatherStarted {
        weather: WeatherType,
    },
    WeatherContinues {
        weather: WeatherType,
    },
    WeatherEnded {
        weather: WeatherType,
    },

    // Capture, escape and the end of the battle
    BallThrown {
        target: BattlerIndex,
        species: Species,
    },
    CaptureSucceeded {
        species: Species,
    },
    CaptureFailed {
        species: Species,
    },
    FleeSucceeded {
        side: Side,
    },
    FleeFailed {
        side: Side,
    },
    BattleEnded {
        outcome: BattleOutcome,
    },
    PresentationFailed {
        reason: String,
    },
}

impl BattleEvent {
    /// Formats the event into a human-readable line.
    /// Returns None for silent events that should not produce user-visible text.
    pub fn format(&self) -> Option<String> {
        match self {
            // === Battle and Turn Management ===
            BattleEvent::BattleStarted { kind } => Some(match kind {
                BattleKind::Wild => "A wild battle begins!".to_string(),
                BattleKind::Trainer => "The trainer battle begins!".to_string(),
            }),
            BattleEvent::TurnStarted { turn } => Some(format!("=== Turn {} ===", turn)),
            BattleEvent::TurnEnded { .. } => None,
            BattleEvent::CommandRejected { reason, .. } => {
                Some(format!("That command can't be used: {}", reason))
            }

            // === Field Presence ===
            BattleEvent::Summoned { battler, species } => Some(match battler.side() {
                Side::Player => format!("Go! {}!", species),
                Side::Enemy => format!("The opponent sent out {}!", species),
            }),
            BattleEvent::Recalled { battler, species } => {
                Some(format!("{}, come back!", name(*battler, *species)))
            }
            BattleEvent::Fainted { battler, species } => {
                Some(format!("{} fainted!", name(*battler, *species)))
            }

            // === Move Execution ===
            BattleEvent::MoveUsed {
                battler,
                species,
                move_,
            } => Some(format!("{} used {}!", name(*battler, *species), move_)),
            BattleEvent::MoveFailed { .. } => Some("But it failed!".to_string()),
            BattleEvent::MoveMissed {
                battler, species, ..
            } => Some(format!("{}'s attack missed!", name(*battler, *species))),
            BattleEvent::NoTarget { .. } => Some("But there was no target...".to_string()),
            BattleEvent::ActionCancelled {
                battler,
                species,
                reason,
            } => {
                let who = name(*battler, *species);
                Some(match reason {
                    CancelReason::Asleep => format!("{} is fast asleep.", who),
                    CancelReason::Frozen => format!("{} is frozen solid!", who),
                    CancelReason::Flinched => format!("{} flinched and couldn't move!", who),
                    CancelReason::FullyParalyzed => {
                        format!("{} is paralyzed! It can't move!", who)
                    }
                    CancelReason::HurtItselfInConfusion => return None,
                })
            }
            BattleEvent::ChargingUp {
                battler,
                species,
                move_,
            } => Some(format!(
                "{} is getting ready to use {}!",
                name(*battler, *species),
                move_
            )),
            BattleEvent::ProtectingItself { battler, species } => {
                Some(format!("{} protected itself!", name(*battler, *species)))
            }
            BattleEvent::ProtectedFromMove { battler, species } => {
                Some(format!("{} was protected from the attack!", name(*battler, *species)))
            }
            BattleEvent::MultiHitSummary { hits } => Some(format!("Hit {} times!", hits)),
            BattleEvent::DelayedAttackForeseen {
                battler, species, ..
            } => Some(format!("{} foresaw an attack!", name(*battler, *species))),
            BattleEvent::DelayedAttackStruck {
                target,
                species,
                move_,
            } => Some(format!("{} took the {} attack!", name(*target, *species), move_)),

            // === Damage and Healing ===
            BattleEvent::DamageDealt {
                battler,
                species,
                damage,
                ..
            } => Some(format!("{} took {} damage!", name(*battler, *species), damage)),
            BattleEvent::IndirectDamage {
                battler,
                species,
                source,
                damage,
            } => {
                let who = name(*battler, *species);
                Some(match source {
                    DamageSource::Recoil => format!("{} is damaged by recoil! (-{})", who, damage),
                    DamageSource::Struggle => {
                        format!("{} is hurt by the struggle! (-{})", who, damage)
                    }
                    DamageSource::Weather(weather) => {
                        format!("{} is buffeted by the {}! (-{})", who, weather, damage)
                    }
                    DamageSource::Hazard(tag) => {
                        format!("{} is hurt by the {}! (-{})", who, tag, damage)
                    }
                    DamageSource::FieldTag(tag) => {
                        format!("{} is hurt by the {}! (-{})", who, tag, damage)
                    }
                })
            }
            BattleEvent::Effectiveness { multiplier, .. } => {
                if *multiplier == 0.0 {
                    Some("It doesn't affect the target...".to_string())
                } else if *multiplier > 1.0 {
                    Some("It's super effective!".to_string())
                } else if *multiplier < 1.0 {
                    Some("It's not very effective...".to_string())
                } else {
                    None
                }
            }
            BattleEvent::CriticalHit { .. } => Some("A critical hit!".to_string()),
            BattleEvent::Healed {
                battler,
                species,
                amount,
                ..
            } => Some(format!("{} recovered {} HP!", name(*battler, *species), amount)),
            BattleEvent::HurtByConfusion {
                battler,
                species,
                damage,
            } => Some(format!(
                "{} hurt itself in its confusion! (-{})",
                name(*battler, *species),
                damage
            )),

            // === Status and Stats ===
            BattleEvent::StatusApplied {
                battler,
                species,
                status,
            } => Some(format!("{} is {}!", name(*battler, *species), status)),
            BattleEvent::StatusCured {
                battler,
                species,
                status,
            } => {
                let who = name(*battler, *species);
                Some(match status {
                    StatusEffect::Sleep => format!("{} woke up!", who),
                    StatusEffect::Freeze => format!("{} thawed out!", who),
                    other => format!("{} is no longer {}.", who, other),
                })
            }
            BattleEvent::StatusDamage {
                battler,
                species,
                status,
                damage,
            } => {
                let cause = match status {
                    StatusEffect::Burn => "its burn",
                    _ => "poison",
                };
                Some(format!(
                    "{} is hurt by {}! (-{})",
                    name(*battler, *species),
                    cause,
                    damage
                ))
            }
            BattleEvent::StatusBlocked {
                battler,
                species,
                reason,
            } => Some(format!("{} {}", name(*battler, *species), reason)),
            BattleEvent::BecameConfused { battler, species } => {
                Some(format!("{} became confused!", name(*battler, *species)))
            }
            BattleEvent::ConfusionEnded { battler, species } => {
                Some(format!("{} snapped out of its confusion!", name(*battler, *species)))
            }
            BattleEvent::StatStageChanged {
                battler,
                species,
                stat,
                old_stage,
                new_stage,
            } => {
                let change = new_stage - old_stage;
                let how = match change {
                    c if c >= 2 => "rose sharply",
                    c if c > 0 => "rose",
                    c if c <= -2 => "harshly fell",
                    _ => "fell",
                };
                Some(format!("{}'s {} {}!", name(*battler, *species), stat, how))
            }
            BattleEvent::StatChangeBlocked {
                battler,
                species,
                stat,
                reason,
            } => Some(format!("{}'s {} {}", name(*battler, *species), stat, reason)),

            // === Items ===
            BattleEvent::ItemActivated {
                battler,
                species,
                item,
            } => Some(format!("{}'s {} activated.", name(*battler, *species), item)),
            BattleEvent::ItemTransferred {
                to,
                to_species,
                item,
                ..
            } => Some(format!("{} took the {}!", name(*to, *to_species), item)),

            // === Field ===
            BattleEvent::ArenaTagAdded { tag, side, layers } => Some(match layers {
                Some(layers) if *layers > 1 => {
                    format!("{} now covers {} ({} layers).", tag, side, layers)
                }
                _ => format!("{} now covers {}.", tag, side),
            }),
            BattleEvent::ArenaTagRemoved { tag, side } => {
                Some(format!("{} wore off for {}.", tag, side))
            }
            BattleEvent::WeatherStarted { weather } => Some(format!("The {} began!", weather)),
            BattleEvent::WeatherContinues { .. } => None,
            BattleEvent::WeatherEnded { weather } => Some(format!("The {} subsided.", weather)),

            // === Capture, Escape and Ending ===
            BattleEvent::BallThrown { species, .. } => {
                Some(format!("You threw a Poke Ball at the wild {}!", species))
            }
            BattleEvent::CaptureSucceeded { species } => {
                Some(format!("Gotcha! {} was caught!", species))
            }
            BattleEvent::CaptureFailed { species } => {
                Some(format!("Oh no! The wild {} broke free!", species))
            }
            BattleEvent::FleeSucceeded { .. } => Some("Got away safely!".to_string()),
            BattleEvent::FleeFailed { .. } => Some("Can't escape!".to_string()),
            BattleEvent::BattleEnded { outcome } => Some(format!("The battle is over: {}.", outcome)),
            BattleEvent::PresentationFailed { .. } => None,
        }
    }
}

fn name(battler: BattlerIndex, species: Species) -> String {
    match battler.side() {
        Side::Player => species.to_string(),
        Side::Enemy => format!("The opposing {}", species),
    }
}

/// Append-only record of everything that happened in a battle.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    events: Vec<BattleEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    /// Events recorded at or after `start`.
    pub fn since(&self, start: usize) -> &[BattleEvent] {
        self.events.get(start..).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Formatted lines for every event that has text.
    pub fn formatted(&self) -> Vec<String> {
        self.events.iter().filter_map(BattleEvent::format).collect()
    }
}

impl std::fmt::Display for EventBus {
    /// One formatted line per visible event.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for line in self.formatted() {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn enemy_names_are_qualified() {
        let event = BattleEvent::MoveUsed {
            battler: BattlerIndex::Enemy,
            species: Species::Gengar,
            move_: Move::ShadowBall,
        };
        assert_eq!(
            event.format().as_deref(),
            Some("The opposing Gengar used ShadowBall!")
        );
    }

    #[test]
    fn silent_events_have_no_text() {
        assert_eq!(BattleEvent::TurnEnded { turn: 3 }.format(), None);
        let neutral = BattleEvent::Effectiveness {
            battler: BattlerIndex::Player,
            species: Species::Pikachu,
            multiplier: 1.0,
        };
        assert_eq!(neutral.format(), None);
    }

    #[test]
    fn bus_keeps_order_and_slices() {
        let mut bus = EventBus::new();
        bus.push(BattleEvent::TurnStarted { turn: 1 });
        bus.push(BattleEvent::MultiHitSummary { hits: 3 });
        bus.push(BattleEvent::TurnEnded { turn: 1 });

        assert_eq!(bus.len(), 3);
        assert_eq!(bus.since(1).len(), 2);
        assert!(bus.since(10).is_empty());
        assert_eq!(
            bus.formatted(),
            vec!["=== Turn 1 ===".to_string(), "Hit 3 times!".to_string()]
        );
    }
}
