use tracing::{debug, warn};

use crate::battle::combatant::BattlerIndex;
use crate::battle::commands::{
    validate_command, CommandSource, CommandView, NpcCommandSource, TurnCommand,
};
use crate::battle::events::BattleEvent;
use crate::battle::phases::{Phase, PhaseBuffer, PhaseHandler, PhaseStatus};
use crate::battle::state::BattleContext;
use crate::errors::BattleResult;

/// Asks one combatant's command source for its choice and records it.
///
/// A rejected choice re-queues this phase at the head with the attempt count
/// raised; after `max_command_retries` the NPC picker decides instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandPhase {
    battler: BattlerIndex,
    attempts: u8,
}

impl CommandPhase {
    pub fn new(battler: BattlerIndex) -> Self {
        Self {
            battler,
            attempts: 0,
        }
    }

    pub fn attempts(&self) -> u8 {
        self.attempts
    }

    fn choose(&self, ctx: &mut BattleContext) -> Option<TurnCommand> {
        let battler = self.battler;
        let combatant = ctx.field.combatant(battler)?;
        let view = CommandView {
            battler,
            combatant,
            party: ctx.field.party(battler.side()),
            opponents: ctx.field.opponents_of(battler),
            kind: ctx.config.kind,
            poke_balls: ctx.poke_balls,
        };
        let command = if self.attempts >= ctx.config.max_command_retries {
            warn!(battler = %battler, attempts = self.attempts, "retries exhausted; npc picks");
            NpcCommandSource.choose_command(&view, &mut ctx.rng)
        } else {
            ctx.command_sources[battler.side().index()].choose_command(&view, &mut ctx.rng)
        };
        Some(command)
    }
}

impl PhaseHandler for CommandPhase {
    fn start(&mut self, ctx: &mut BattleContext, buffer: &mut PhaseBuffer) -> BattleResult<PhaseStatus> {
        let battler = self.battler;
        if !ctx.field.is_active(battler) {
            return Ok(PhaseStatus::Done);
        }

        // A charging move locks the combatant into its release.
        let locked = ctx
            .require_combatant(battler)?
            .tags()
            .charging_move()
            .is_some();
        if locked {
            debug!(battler = %battler, "locked into charging move");
            ctx.commands.insert(battler, TurnCommand::struggle());
            return Ok(PhaseStatus::Done);
        }

        let Some(command) = self.choose(ctx) else {
            return Ok(PhaseStatus::Done);
        };
        match validate_command(ctx, battler, &command) {
            Ok(()) => {
                debug!(battler = %battler, ?command, "command recorded");
                ctx.commands.insert(battler, command);
            }
            Err(err) => {
                warn!(battler = %battler, ?command, error = %err, "command rejected");
                ctx.emit(BattleEvent::CommandRejected {
                    battler,
                    reason: err.to_string(),
                });
                buffer.push_front(Phase::Command(CommandPhase {
                    battler,
                    attempts: self.attempts + 1,
                }));
            }
        }
        Ok(PhaseStatus::Done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::commands::ScriptedCommandSource;
    use crate::battle::phases::PhaseKind;
    use crate::battle::scheduler::StepOutcome;
    use crate::battle::tests::common::{battle_with, run_encounter, TestPokemonBuilder};
    use crate::config::BattleConfig;
    use crate::{Move, Species};
    use pretty_assertions::assert_eq;

    #[test]
    fn rejected_command_is_asked_again() {
        let pikachu = TestPokemonBuilder::new(Species::Pikachu, 20)
            .with_moves(vec![Move::Tackle])
            .build();
        let rattata = TestPokemonBuilder::new(Species::Rattata, 5).build();
        let mut battle = battle_with(BattleConfig::default(), vec![pikachu], vec![rattata]);
        battle.context_mut().command_sources[0] = Box::new(ScriptedCommandSource::new([
            TurnCommand::fight(2),
            TurnCommand::fight(0),
        ]));
        run_encounter(&mut battle);

        // TurnInit, then the player's first (bad) command.
        assert_eq!(battle.step(), StepOutcome::Completed(PhaseKind::TurnInit));
        assert_eq!(battle.step(), StepOutcome::Completed(PhaseKind::Command));
        assert_eq!(
            battle.scheduler().pending_kinds().first(),
            Some(&PhaseKind::Command)
        );
        assert!(battle
            .events()
            .iter()
            .any(|event| matches!(event, BattleEvent::CommandRejected { battler: BattlerIndex::Player, .. })));

        assert_eq!(battle.step(), StepOutcome::Completed(PhaseKind::Command));
        assert_eq!(
            battle.context().commands.get(&BattlerIndex::Player),
            Some(&TurnCommand::fight(0))
        );
    }

    #[test]
    fn exhausted_retries_fall_back_to_npc_choice() {
        let pikachu = TestPokemonBuilder::new(Species::Pikachu, 20)
            .with_moves(vec![Move::Tackle])
            .build();
        let rattata = TestPokemonBuilder::new(Species::Rattata, 5).build();
        let config = BattleConfig {
            max_command_retries: 1,
            ..BattleConfig::default()
        };
        let mut battle = battle_with(config, vec![pikachu], vec![rattata]);
        battle.context_mut().command_sources[0] =
            Box::new(ScriptedCommandSource::new([TurnCommand::Switch { party_index: 5 }; 4]));
        run_encounter(&mut battle);

        battle.step();
        battle.step();
        battle.step();
        assert_eq!(
            battle.context().commands.get(&BattlerIndex::Player),
            Some(&TurnCommand::fight(0))
        );
    }
}
