#[cfg(test)]
mod tests {
    use crate::battle::combatant::Combatant;
    use crate::battle::events::BattleEvent;
    use crate::battle::phases::PhaseKind;
    use crate::battle::presentation::{PresentationEffect, QueuedPresenter};
    use crate::battle::runner::{Battle, BattleBuilder};
    use crate::battle::scheduler::StepOutcome;
    use crate::battle::tests::common::{game_data, TestPokemonBuilder};
    use crate::{Move, Species};
    use pretty_assertions::assert_eq;

    fn queued_battle() -> (Battle, QueuedPresenter) {
        let presenter = QueuedPresenter::new();
        let player: Box<dyn Combatant> = Box::new(
            TestPokemonBuilder::new(Species::Pikachu, 20)
                .with_moves(vec![Move::Splash])
                .build(),
        );
        let enemy: Box<dyn Combatant> = Box::new(
            TestPokemonBuilder::new(Species::Rattata, 20)
                .with_moves(vec![Move::Splash])
                .build(),
        );
        let battle = BattleBuilder::new(game_data())
            .player_team(vec![player])
            .enemy_team(vec![enemy])
            .presenter(presenter.clone())
            .build()
            .expect("battle builds");
        (battle, presenter)
    }

    fn summoned(battle: &Battle) -> usize {
        battle
            .events()
            .iter()
            .filter(|event| matches!(event, BattleEvent::Summoned { .. }))
            .count()
    }

    #[test]
    fn pending_summon_holds_the_queue() {
        // Arrange
        let (mut battle, presenter) = queued_battle();

        // Act
        assert_eq!(battle.step(), StepOutcome::Completed(PhaseKind::Encounter));
        assert_eq!(battle.step(), StepOutcome::Awaiting(PhaseKind::Summon));
        let pending_after_first = battle.scheduler().len();
        assert_eq!(battle.step(), StepOutcome::Awaiting(PhaseKind::Summon));

        // Assert
        assert_eq!(battle.scheduler().len(), pending_after_first);
        assert_eq!(summoned(&battle), 1);
        assert!(matches!(
            presenter.peek_effect(),
            Some(PresentationEffect::Summon {
                species: Species::Pikachu,
                ..
            })
        ));

        assert!(presenter.complete_next());
        assert_eq!(battle.step(), StepOutcome::Completed(PhaseKind::Summon));
        assert_eq!(battle.scheduler().pending_kinds().first(), Some(&PhaseKind::PostSummon));
    }

    #[test]
    fn failed_presentation_is_reported_and_the_phase_moves_on() {
        let (mut battle, presenter) = queued_battle();
        battle.step();
        assert_eq!(battle.step(), StepOutcome::Awaiting(PhaseKind::Summon));

        assert!(presenter.fail_next("renderer gone"));
        assert_eq!(battle.step(), StepOutcome::Completed(PhaseKind::Summon));

        assert!(battle.events().iter().any(|event| matches!(
            event,
            BattleEvent::PresentationFailed { reason } if reason == "renderer gone"
        )));
    }

    #[test]
    fn released_presentations_let_the_battle_finish_a_turn() {
        let (mut battle, presenter) = queued_battle();

        let mut turn_ended = false;
        for _ in 0..200 {
            match battle.step() {
                StepOutcome::Awaiting(_) => {
                    presenter.complete_all();
                }
                StepOutcome::Completed(PhaseKind::TurnEnd) => {
                    turn_ended = true;
                    break;
                }
                StepOutcome::Completed(_) => {}
                StepOutcome::Idle => break,
            }
        }

        assert!(turn_ended);
        assert_eq!(battle.context().turn, 1);
        assert_eq!(presenter.pending_len(), 0);
    }
}
