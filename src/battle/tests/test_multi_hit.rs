#[cfg(test)]
mod tests {
    use crate::battle::combatant::BattlerIndex;
    use crate::battle::events::BattleEvent;
    use crate::battle::tests::common::{battle_with, run_encounter, TestPokemonBuilder};
    use crate::config::BattleConfig;
    use crate::{Move, Species};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn hits_on_enemy(events: &[BattleEvent]) -> usize {
        events
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

    fn summaries(events: &[BattleEvent]) -> Vec<u8> {
        events
            .iter()
            .filter_map(|event| match event {
                BattleEvent::MultiHitSummary { hits } => Some(*hits),
                _ => None,
            })
            .collect()
    }

    #[rstest]
    #[case(Move::DoubleKick, 2, vec![2])]
    #[case(Move::Tackle, 1, vec![])]
    fn summary_is_shown_only_for_more_than_one_hit(
        #[case] move_: Move,
        #[case] expected_hits: usize,
        #[case] expected_summaries: Vec<u8>,
    ) {
        // Arrange
        let attacker = TestPokemonBuilder::new(Species::Machamp, 30)
            .with_moves(vec![move_])
            .build();
        let defender = TestPokemonBuilder::new(Species::Snorlax, 60)
            .with_moves(vec![Move::Splash])
            .with_stats([600, 80, 150, 80, 80, 30])
            .build();
        let mut battle = battle_with(BattleConfig::default(), vec![attacker], vec![defender]);
        run_encounter(&mut battle);

        // Act
        battle.play_turn();

        // Assert
        assert_eq!(hits_on_enemy(battle.events()), expected_hits);
        assert_eq!(summaries(battle.events()), expected_summaries);
    }

    #[test]
    fn summary_follows_the_last_hit() {
        let attacker = TestPokemonBuilder::new(Species::Machamp, 30)
            .with_moves(vec![Move::DoubleKick])
            .build();
        let defender = TestPokemonBuilder::new(Species::Snorlax, 60)
            .with_moves(vec![Move::Splash])
            .with_stats([600, 80, 150, 80, 80, 30])
            .build();
        let mut battle = battle_with(BattleConfig::default(), vec![attacker], vec![defender]);
        run_encounter(&mut battle);

        battle.play_turn();

        let events = battle.events();
        let last_hit = events
            .iter()
            .rposition(|event| matches!(event, BattleEvent::DamageDealt { .. }))
            .expect("double kick landed");
        let summary = events
            .iter()
            .position(|event| matches!(event, BattleEvent::MultiHitSummary { .. }))
            .expect("summary shown");
        assert!(summary > last_hit);
    }

    #[test]
    fn strikes_stop_when_the_target_faints() {
        let attacker = TestPokemonBuilder::new(Species::Machamp, 80)
            .with_moves(vec![Move::DoubleKick])
            .build();
        let defender = TestPokemonBuilder::new(Species::Rattata, 5)
            .with_moves(vec![Move::Splash])
            .with_hp(1)
            .build();
        let mut battle = battle_with(BattleConfig::default(), vec![attacker], vec![defender]);
        run_encounter(&mut battle);

        battle.play_turn();

        assert_eq!(hits_on_enemy(battle.events()), 1);
        assert!(summaries(battle.events()).is_empty());
        assert!(battle.events().iter().any(|event| matches!(
            event,
            BattleEvent::Fainted {
                battler: BattlerIndex::Enemy,
                ..
            }
        )));
    }

    #[rstest]
    #[case(1)]
    #[case(7)]
    #[case(42)]
    #[case(2024)]
    fn two_to_five_hits_land_between_two_and_five_times(#[case] seed: u64) {
        // Arrange
        let attacker = TestPokemonBuilder::new(Species::Venusaur, 30)
            .with_moves(vec![Move::BulletSeed])
            .build();
        let defender = TestPokemonBuilder::new(Species::Snorlax, 60)
            .with_moves(vec![Move::Splash])
            .with_stats([900, 80, 200, 80, 80, 30])
            .build();
        let config = BattleConfig {
            seed,
            ..BattleConfig::default()
        };
        let mut battle = battle_with(config, vec![attacker], vec![defender]);
        run_encounter(&mut battle);

        // Act
        battle.play_turn();

        // Assert
        let hits = hits_on_enemy(battle.events());
        assert!((2..=5).contains(&hits), "bullet seed hit {hits} times");
        assert_eq!(summaries(battle.events()), vec![hits as u8]);
    }
}
