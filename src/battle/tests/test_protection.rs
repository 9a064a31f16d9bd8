#[cfg(test)]
mod tests {
    use crate::battle::battler_tags::BattlerTagType;
    use crate::battle::combatant::{BattlerIndex, MoveResult};
    use crate::battle::events::BattleEvent;
    use crate::battle::tests::common::{battle_with, run_encounter, TestPokemonBuilder};
    use crate::config::BattleConfig;
    use crate::{Move, Species};
    use pretty_assertions::assert_eq;

    fn protected_from(events: &[BattleEvent], battler: BattlerIndex) -> usize {
        events
            .iter()
            .filter(|event| matches!(event, BattleEvent::ProtectedFromMove { battler: b, .. } if *b == battler))
            .count()
    }

    #[test]
    fn protect_negates_an_incoming_attack() {
        // Arrange
        let guard = TestPokemonBuilder::new(Species::Snorlax, 50)
            .with_moves(vec![Move::Protect])
            .build();
        let attacker = TestPokemonBuilder::new(Species::Machamp, 50)
            .with_moves(vec![Move::Tackle])
            .build();
        let mut battle = battle_with(BattleConfig::default(), vec![guard], vec![attacker]);
        run_encounter(&mut battle);
        let full_hp = battle
            .context()
            .combatant(BattlerIndex::Player)
            .map(|combatant| combatant.hp());

        // Act
        battle.play_turn();

        // Assert
        let ctx = battle.context();
        assert_eq!(protected_from(battle.events(), BattlerIndex::Player), 1);
        assert_eq!(
            ctx.combatant(BattlerIndex::Player).map(|combatant| combatant.hp()),
            full_hp
        );
        let last = ctx
            .combatant(BattlerIndex::Enemy)
            .and_then(|combatant| combatant.move_history().last())
            .map(|entry| entry.result);
        assert_eq!(last, Some(MoveResult::Fail));
    }

    #[test]
    fn protection_lapses_at_the_end_of_the_turn() {
        let guard = TestPokemonBuilder::new(Species::Snorlax, 50)
            .with_moves(vec![Move::Protect])
            .build();
        let attacker = TestPokemonBuilder::new(Species::Machamp, 50)
            .with_moves(vec![Move::Tackle])
            .build();
        let mut battle = battle_with(BattleConfig::default(), vec![guard], vec![attacker]);
        run_encounter(&mut battle);

        battle.play_turn();

        let protected = battle
            .context()
            .combatant(BattlerIndex::Player)
            .is_some_and(|combatant| combatant.tags().has(BattlerTagType::Protected));
        assert!(!protected);
    }

    #[test]
    fn multi_hit_moves_are_stopped_once() {
        let guard = TestPokemonBuilder::new(Species::Snorlax, 50)
            .with_moves(vec![Move::Protect])
            .build();
        let attacker = TestPokemonBuilder::new(Species::Machamp, 50)
            .with_moves(vec![Move::DoubleKick])
            .build();
        let mut battle = battle_with(BattleConfig::default(), vec![guard], vec![attacker]);
        run_encounter(&mut battle);

        battle.play_turn();

        assert_eq!(protected_from(battle.events(), BattlerIndex::Player), 1);
        assert!(!battle
            .events()
            .iter()
            .any(|event| matches!(event, BattleEvent::MultiHitSummary { .. })));
        assert!(!battle.events().iter().any(|event| matches!(
            event,
            BattleEvent::DamageDealt {
                battler: BattlerIndex::Player,
                ..
            }
        )));
    }

    #[test]
    fn quick_guard_blocks_a_priority_attack_on_its_side() {
        // Arrange: Quick Guard (+3) goes up before Quick Attack (+1) lands.
        let guard = TestPokemonBuilder::new(Species::Snorlax, 50)
            .with_moves(vec![Move::QuickGuard])
            .build();
        let attacker = TestPokemonBuilder::new(Species::Pikachu, 50)
            .with_moves(vec![Move::QuickAttack])
            .build();
        let mut battle = battle_with(BattleConfig::default(), vec![attacker], vec![guard]);
        run_encounter(&mut battle);
        let full_hp = battle
            .context()
            .combatant(BattlerIndex::Enemy)
            .map(|combatant| combatant.hp());

        // Act
        battle.play_turn();

        // Assert
        let ctx = battle.context();
        assert_eq!(protected_from(battle.events(), BattlerIndex::Enemy), 1);
        assert_eq!(
            ctx.combatant(BattlerIndex::Enemy).map(|combatant| combatant.hp()),
            full_hp
        );
        assert!(!battle.events().iter().any(|event| matches!(
            event,
            BattleEvent::DamageDealt {
                battler: BattlerIndex::Enemy,
                ..
            }
        )));
        let last = ctx
            .combatant(BattlerIndex::Player)
            .and_then(|combatant| combatant.move_history().last())
            .map(|entry| entry.result);
        assert_eq!(last, Some(MoveResult::Fail));
    }
}
