#[cfg(test)]
mod tests {
    use crate::battle::combatant::BattlerIndex;
    use crate::battle::commands::{ScriptedCommandSource, TurnCommand};
    use crate::battle::events::BattleEvent;
    use crate::battle::runner::Battle;
    use crate::battle::tests::common::{battle_with, run_encounter, settle, TestPokemonBuilder};
    use crate::config::BattleConfig;
    use crate::{ArenaTagType, Move, Species};
    use pretty_assertions::assert_eq;

    fn seer_battle(player_commands: Vec<TurnCommand>) -> Battle {
        let seer = TestPokemonBuilder::new(Species::Alakazam, 60)
            .with_moves(vec![Move::FutureSight, Move::Splash])
            .build();
        let bench = TestPokemonBuilder::new(Species::Rattata, 20)
            .with_moves(vec![Move::Splash])
            .build();
        let target = TestPokemonBuilder::new(Species::Snorlax, 60)
            .with_moves(vec![Move::Splash])
            .with_stats([500, 80, 80, 80, 80, 30])
            .build();
        let mut battle = battle_with(BattleConfig::default(), vec![seer, bench], vec![target]);
        battle.context_mut().command_sources[0] = Box::new(ScriptedCommandSource::new(player_commands));
        run_encounter(&mut battle);
        battle
    }

    fn struck_on_turn(battle: &Battle) -> Option<u32> {
        let mut turn = 0;
        for event in battle.events() {
            match event {
                BattleEvent::TurnStarted { turn: started } => turn = *started,
                BattleEvent::DelayedAttackStruck { .. } => return Some(turn),
                _ => {}
            }
        }
        None
    }

    fn damage_to_enemy(battle: &Battle) -> usize {
        battle
            .events()
            .iter()
            .filter(|event| {
                matches!(
                    event,
                    BattleEvent::DamageDealt {
                        battler: BattlerIndex::Enemy,
                        ..
                    }
                )
            })
            .count()
    }

    #[test]
    fn future_sight_lands_at_the_end_of_the_third_turn() {
        // Arrange
        let mut battle = seer_battle(vec![
            TurnCommand::fight(0),
            TurnCommand::fight(1),
            TurnCommand::fight(1),
        ]);

        // Act
        battle.play_turn();
        let foreseen = battle.events().iter().any(|event| {
            matches!(
                event,
                BattleEvent::DelayedAttackForeseen {
                    battler: BattlerIndex::Player,
                    move_: Move::FutureSight,
                    ..
                }
            )
        });
        battle.play_turn();
        assert_eq!(damage_to_enemy(&battle), 0);
        battle.play_turn();
        settle(&mut battle);

        // Assert
        assert!(foreseen);
        assert_eq!(struck_on_turn(&battle), Some(3));
        assert_eq!(damage_to_enemy(&battle), 1);
        assert!(!battle.context().arena.has_tag(ArenaTagType::DelayedAttack));
    }

    #[test]
    fn second_future_sight_fails_while_one_is_pending() {
        let mut battle = seer_battle(vec![TurnCommand::fight(0), TurnCommand::fight(0)]);

        battle.play_turn();
        battle.play_turn();

        assert!(battle.events().iter().any(|event| matches!(
            event,
            BattleEvent::MoveFailed {
                battler: BattlerIndex::Player,
                move_: Move::FutureSight,
                ..
            }
        )));
    }

    #[test]
    fn delayed_attack_fizzles_when_its_source_has_left() {
        let mut battle = seer_battle(vec![
            TurnCommand::fight(0),
            TurnCommand::Switch { party_index: 1 },
            TurnCommand::fight(0),
        ]);

        battle.play_turn();
        battle.play_turn();
        battle.play_turn();
        settle(&mut battle);

        assert_eq!(struck_on_turn(&battle), Some(3));
        assert_eq!(damage_to_enemy(&battle), 0);
    }
}
