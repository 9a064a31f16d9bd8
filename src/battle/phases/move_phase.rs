//! The move phase: everything that happens between a combatant's turn coming
//! up and its move striking. Gates that can stop the move run here; the
//! strikes themselves are queued as a `MoveEffectPhase`.

use tracing::{debug, trace};

use crate::battle::battler_tags::{BattlerTag, BattlerTagType};
use crate::battle::calculators::confusion_damage;
use crate::battle::combatant::{BattlerIndex, CombatantId, MoveHistoryEntry, MoveResult};
use crate::battle::events::{BattleEvent, CancelReason};
use crate::battle::move_effects::{place_delayed_attack, EffectContext};
use crate::battle::phases::{
    queue_faints, MoveEffectPhase, Phase, PhaseBuffer, PhaseHandler, PhaseStatus,
};
use crate::battle::state::BattleContext;
use crate::errors::BattleResult;
use crate::move_data::{MoveCondition, MoveData, MoveFlags};
use crate::{ArenaTagType, Move, MoveTarget, PokemonType, StatusEffect, WeatherType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePhase {
    battler: BattlerIndex,
    user_id: CombatantId,
    move_: Move,
    move_index: Option<usize>,
    target: Option<BattlerIndex>,
}

impl MovePhase {
    pub fn new(
        battler: BattlerIndex,
        user_id: CombatantId,
        move_: Move,
        move_index: Option<usize>,
        target: Option<BattlerIndex>,
    ) -> Self {
        Self {
            battler,
            user_id,
            move_,
            move_index,
            target,
        }
    }

    pub fn battler(&self) -> BattlerIndex {
        self.battler
    }

    pub fn move_(&self) -> Move {
        self.move_
    }

    fn record(&self, ctx: &mut BattleContext, targets: Vec<BattlerIndex>, result: MoveResult) -> BattleResult<()> {
        ctx.require_combatant_mut(self.battler)?
            .push_move_history(MoveHistoryEntry {
                move_: self.move_,
                targets,
                result,
                is_virtual: false,
            });
        Ok(())
    }

    fn fail(&self, ctx: &mut BattleContext, targets: Vec<BattlerIndex>) -> BattleResult<PhaseStatus> {
        let species = ctx.require_combatant(self.battler)?.species();
        ctx.emit(BattleEvent::MoveFailed {
            battler: self.battler,
            species,
            move_: self.move_,
        });
        clear_charge(ctx, self.battler)?;
        self.record(ctx, targets, MoveResult::Fail)?;
        Ok(PhaseStatus::Done)
    }

    fn spend_pp(&self, ctx: &mut BattleContext, release: bool) -> BattleResult<()> {
        if release || self.move_ == Move::Struggle {
            return Ok(());
        }
        let Some(index) = self.move_index else {
            return Ok(());
        };
        if let Some(slot) = ctx.require_combatant_mut(self.battler)?.moves_mut().get_mut(index) {
            slot.use_pp();
        }
        Ok(())
    }
}

impl PhaseHandler for MovePhase {
    fn start(&mut self, ctx: &mut BattleContext, buffer: &mut PhaseBuffer) -> BattleResult<PhaseStatus> {
        let battler = self.battler;
        if !ctx.is_same_active(battler, self.user_id) {
            debug!(battler = %battler, move_ = %self.move_, "user left the field; move dropped");
            return Ok(PhaseStatus::Done);
        }
        let move_data = ctx.move_data(self.move_)?;

        let user = ctx.require_combatant_mut(battler)?;
        user.turn_data_mut().acted = true;
        let species = user.species();
        let release = user.tags().charging_move() == Some(self.move_);

        if !release {
            if let Some(index) = self.move_index {
                if user.moves().get(index).map_or(true, |slot| slot.pp == 0) {
                    debug!(battler = %battler, index, "no pp left");
                    return self.fail(ctx, Vec::new());
                }
            }
        }

        // No legal target is a usability failure: no status roll, no PP.
        let targets = resolve_targets(ctx, battler, &move_data, self.target);
        if targets.is_empty() {
            ctx.emit(BattleEvent::NoTarget { battler, species });
            clear_charge(ctx, battler)?;
            self.record(ctx, Vec::new(), MoveResult::Fail)?;
            return Ok(PhaseStatus::Done);
        }
        trace!(battler = %battler, ?targets, "targets resolved");

        if let Some(reason) = check_action_prevention(ctx, battler)? {
            debug!(battler = %battler, ?reason, "action cancelled");
            clear_charge(ctx, battler)?;
            ctx.emit(BattleEvent::ActionCancelled {
                battler,
                species,
                reason,
            });
            self.record(ctx, Vec::new(), MoveResult::Fail)?;
            queue_faints(ctx, buffer);
            return Ok(PhaseStatus::Done);
        }

        self.spend_pp(ctx, release)?;
        ctx.emit(BattleEvent::MoveUsed {
            battler,
            species,
            move_: self.move_,
        });

        if condition_fails(ctx, battler, &move_data)? {
            return self.fail(ctx, targets);
        }

        if let Some((semi_invulnerable, instant_in)) = move_data.charge() {
            if release {
                clear_charge(ctx, battler)?;
            } else if instant_in.is_none() || ctx.arena.weather_type() != instant_in {
                let user = ctx.require_combatant_mut(battler)?;
                user.tags_mut().add(BattlerTag::Charging { move_: self.move_ });
                if semi_invulnerable {
                    user.tags_mut().add(BattlerTag::SemiInvulnerable);
                }
                ctx.emit(BattleEvent::ChargingUp {
                    battler,
                    species,
                    move_: self.move_,
                });
                return Ok(PhaseStatus::Done);
            }
        }

        if move_data.is_delayed_attack() {
            let effect = EffectContext::new(battler, targets[0], self.move_);
            if !place_delayed_attack(ctx, &effect)? {
                return self.fail(ctx, targets);
            }
            self.record(ctx, targets, MoveResult::Success)?;
            return Ok(PhaseStatus::Done);
        }

        buffer.push_front(Phase::MoveEffect(MoveEffectPhase::new(
            battler,
            self.user_id,
            self.move_,
            targets,
        )));
        Ok(PhaseStatus::Done)
    }
}

fn clear_charge(ctx: &mut BattleContext, battler: BattlerIndex) -> BattleResult<()> {
    let tags = ctx.require_combatant_mut(battler)?.tags_mut();
    tags.remove(BattlerTagType::Charging);
    tags.remove(BattlerTagType::SemiInvulnerable);
    Ok(())
}

/// Field-targeted moves land on the user; a chosen enemy that has left is
/// replaced by the first standing opponent.
fn resolve_targets(
    ctx: &mut BattleContext,
    battler: BattlerIndex,
    move_data: &MoveData,
    chosen: Option<BattlerIndex>,
) -> Vec<BattlerIndex> {
    let opponents = ctx.field.opponents_of(battler);
    match move_data.target {
        MoveTarget::User | MoveTarget::UserSide | MoveTarget::EnemySide | MoveTarget::BothSides => {
            vec![battler]
        }
        MoveTarget::NearAlly => ctx.field.ally_of(battler).into_iter().collect(),
        MoveTarget::NearEnemy => match chosen {
            Some(target) if opponents.contains(&target) => vec![target],
            _ => opponents.into_iter().take(1).collect(),
        },
        MoveTarget::RandomNearEnemy => ctx
            .rng
            .pick(&opponents, "random target")
            .copied()
            .into_iter()
            .collect(),
        MoveTarget::AllNearEnemies => opponents,
        MoveTarget::AllNearOthers => ctx.field.ally_of(battler).into_iter().chain(opponents).collect(),
    }
}

/// Sleep, freeze, flinch, confusion and paralysis, in that order.
fn check_action_prevention(ctx: &mut BattleContext, battler: BattlerIndex) -> BattleResult<Option<CancelReason>> {
    let user = ctx.require_combatant(battler)?;
    let species = user.species();

    match user.status() {
        Some(mut sleep) if sleep.effect == StatusEffect::Sleep => {
            sleep.turn_count = sleep.turn_count.saturating_sub(1);
            let user = ctx.require_combatant_mut(battler)?;
            if sleep.turn_count > 0 {
                user.set_status(Some(sleep));
                return Ok(Some(CancelReason::Asleep));
            }
            user.set_status(None);
            ctx.emit(BattleEvent::StatusCured {
                battler,
                species,
                status: StatusEffect::Sleep,
            });
        }
        Some(frozen) if frozen.effect == StatusEffect::Freeze => {
            if !ctx.rng.percent(20, "thaw") {
                return Ok(Some(CancelReason::Frozen));
            }
            ctx.require_combatant_mut(battler)?.set_status(None);
            ctx.emit(BattleEvent::StatusCured {
                battler,
                species,
                status: StatusEffect::Freeze,
            });
        }
        _ => {}
    }

    let tags = ctx.require_combatant_mut(battler)?.tags_mut();
    if tags.remove(BattlerTagType::Flinched).is_some() {
        return Ok(Some(CancelReason::Flinched));
    }

    let confusion_left = match tags.get_mut(BattlerTagType::Confused) {
        Some(BattlerTag::Confused { turns_remaining }) => {
            *turns_remaining = turns_remaining.saturating_sub(1);
            Some(*turns_remaining)
        }
        _ => None,
    };
    match confusion_left {
        Some(0) => {
            tags.remove(BattlerTagType::Confused);
            ctx.emit(BattleEvent::ConfusionEnded { battler, species });
        }
        Some(_) if ctx.rng.chance(1, 3, "confusion self-hit") => {
            let user = ctx.require_combatant_mut(battler)?;
            let damage = confusion_damage(&*user);
            let dealt = user.take_damage(damage);
            ctx.emit(BattleEvent::HurtByConfusion {
                battler,
                species,
                damage: dealt,
            });
            return Ok(Some(CancelReason::HurtItselfInConfusion));
        }
        _ => {}
    }

    let paralysed = ctx
        .require_combatant(battler)?
        .status()
        .is_some_and(|status| status.effect == StatusEffect::Paralysis);
    if paralysed && ctx.rng.percent(25, "full paralysis") {
        return Ok(Some(CancelReason::FullyParalyzed));
    }
    Ok(None)
}

/// Gravity, primal weather and the move's own use conditions.
fn condition_fails(ctx: &mut BattleContext, battler: BattlerIndex, move_data: &MoveData) -> BattleResult<bool> {
    if move_data.has_flag(MoveFlags::GRAVITY) && ctx.arena.has_tag(ArenaTagType::Gravity) {
        debug!(battler = %battler, "move grounded by gravity");
        return Ok(true);
    }
    if move_data.is_damaging() {
        let washed_out = match ctx.arena.weather_type() {
            Some(WeatherType::HeavyRain) => move_data.move_type == PokemonType::Fire,
            Some(WeatherType::HarshSun) => move_data.move_type == PokemonType::Water,
            _ => false,
        };
        if washed_out {
            debug!(battler = %battler, "move evaporated by weather");
            return Ok(true);
        }
    }

    for condition in move_data.conditions() {
        let failed = match condition {
            MoveCondition::FirstTurnOnly => ctx.require_combatant(battler)?.turns_active() > 1,
            MoveCondition::ConsecutiveUse => {
                let streak = consecutive_successes(ctx, battler)?;
                let denominator = 3u32.saturating_pow(streak);
                !ctx.rng.chance(1, denominator, "consecutive use")
            }
        };
        if failed {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Trailing successful uses of moves that share the consecutive-use penalty.
fn consecutive_successes(ctx: &BattleContext, battler: BattlerIndex) -> BattleResult<u32> {
    let user = ctx.require_combatant(battler)?;
    let mut streak = 0;
    for entry in user.move_history().iter().rev() {
        if entry.result != MoveResult::Success {
            break;
        }
        let shares_penalty = ctx
            .data
            .require_move(entry.move_)?
            .conditions()
            .any(|condition| condition == MoveCondition::ConsecutiveUse);
        if !shares_penalty {
            break;
        }
        streak += 1;
    }
    Ok(streak)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::combatant::Status;
    use crate::battle::commands::{ScriptedCommandSource, TurnCommand};
    use crate::battle::tests::common::{battle_with, battle_with_data, run_encounter, TestPokemonBuilder};
    use crate::config::BattleConfig;
    use crate::data::{DataProvider, GameData};
    use crate::Species;
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    #[test]
    fn sleeping_user_loses_its_action_and_keeps_its_pp() {
        let mut snorlax = TestPokemonBuilder::new(Species::Snorlax, 30)
            .with_moves(vec![Move::Tackle])
            .build();
        snorlax.status = Some(Status {
            effect: StatusEffect::Sleep,
            turn_count: 3,
        });
        let rattata = TestPokemonBuilder::new(Species::Rattata, 5)
            .with_moves(vec![Move::Growl])
            .build();
        let mut battle = battle_with(BattleConfig::default(), vec![snorlax], vec![rattata]);
        battle.context_mut().command_sources[0] = Box::new(ScriptedCommandSource::new([TurnCommand::fight(0)]));
        run_encounter(&mut battle);
        battle.play_turn();

        let ctx = battle.context();
        assert!(ctx.events.events().iter().any(|event| matches!(
            event,
            BattleEvent::ActionCancelled {
                battler: BattlerIndex::Player,
                reason: CancelReason::Asleep,
                ..
            }
        )));
        let snorlax = ctx.combatant(BattlerIndex::Player).expect("snorlax active");
        assert_eq!(snorlax.moves()[0].pp, snorlax.moves()[0].max_pp);
        assert_eq!(snorlax.status().map(|status| status.turn_count), Some(2));
    }

    #[test]
    fn first_turn_only_moves_fail_after_the_first_turn() {
        let pikachu = TestPokemonBuilder::new(Species::Pikachu, 30)
            .with_moves(vec![Move::FakeOut])
            .build();
        let rattata = TestPokemonBuilder::new(Species::Rattata, 50)
            .with_moves(vec![Move::Growl])
            .build();
        let mut battle = battle_with(BattleConfig::default(), vec![pikachu], vec![rattata]);
        run_encounter(&mut battle);
        battle.play_turn();
        let after_first = battle.events().len();
        battle.play_turn();

        assert!(battle.events()[after_first..].iter().any(|event| matches!(
            event,
            BattleEvent::MoveFailed {
                battler: BattlerIndex::Player,
                move_: Move::FakeOut,
                ..
            }
        )));
    }

    #[test]
    fn move_without_a_legal_target_keeps_its_pp() {
        // Arrange: an ally-only Tackle has nothing to hit in singles.
        let data = GameData::builtin().expect("builtin tables load");
        let mut ally_tackle = data.require_move(Move::Tackle).expect("tackle exists").clone();
        ally_tackle.target = MoveTarget::NearAlly;
        let data: Rc<dyn DataProvider> = Rc::new(data.with_move(Move::Tackle, ally_tackle));

        let pikachu = TestPokemonBuilder::new(Species::Pikachu, 30)
            .with_moves(vec![Move::Tackle])
            .build();
        let rattata = TestPokemonBuilder::new(Species::Rattata, 30)
            .with_moves(vec![Move::Splash])
            .build();
        let mut battle = battle_with_data(data, BattleConfig::default(), vec![pikachu], vec![rattata]);
        battle.context_mut().command_sources[0] = Box::new(ScriptedCommandSource::new([TurnCommand::fight(0)]));
        run_encounter(&mut battle);

        // Act
        battle.play_turn();

        // Assert
        let ctx = battle.context();
        assert!(ctx.events.events().iter().any(|event| matches!(
            event,
            BattleEvent::NoTarget {
                battler: BattlerIndex::Player,
                ..
            }
        )));
        assert!(!ctx.events.events().iter().any(|event| matches!(
            event,
            BattleEvent::MoveUsed {
                battler: BattlerIndex::Player,
                ..
            }
        )));
        let pikachu = ctx.combatant(BattlerIndex::Player).expect("pikachu active");
        assert_eq!(pikachu.moves()[0].pp, pikachu.moves()[0].max_pp);
        assert_eq!(
            pikachu.move_history().last().map(|entry| entry.result),
            Some(MoveResult::Fail)
        );
    }
}
