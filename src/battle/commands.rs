//! Turn commands and the sources that choose them.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::battle::combatant::{BattlerIndex, Combatant, Side};
use crate::battle::rng::BattleRng;
use crate::battle::state::{BattleContext, Party};
use crate::config::BattleKind;
use crate::errors::CommandError;
use crate::Move;

/// What one combatant will do this round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnCommand {
    /// `move_index: None` is Struggle, or the release of a charging move.
    Fight {
        move_index: Option<usize>,
        target: Option<BattlerIndex>,
    },
    Ball,
    Switch {
        party_index: usize,
    },
    Run,
}

impl TurnCommand {
    pub fn fight(move_index: usize) -> Self {
        TurnCommand::Fight {
            move_index: Some(move_index),
            target: None,
        }
    }

    pub fn fight_at(move_index: usize, target: BattlerIndex) -> Self {
        TurnCommand::Fight {
            move_index: Some(move_index),
            target: Some(target),
        }
    }

    pub fn struggle() -> Self {
        TurnCommand::Fight {
            move_index: None,
            target: None,
        }
    }

    pub fn is_fight(&self) -> bool {
        matches!(self, TurnCommand::Fight { .. })
    }
}

/// The move a `Fight` command resolves to for this combatant.
pub fn fight_move(combatant: &dyn Combatant, move_index: Option<usize>) -> Option<Move> {
    match move_index {
        Some(index) => combatant.moves().get(index).map(|slot| slot.move_),
        None => Some(combatant.tags().charging_move().unwrap_or(Move::Struggle)),
    }
}

/// Read-only view handed to a `CommandSource`.
pub struct CommandView<'a> {
    pub battler: BattlerIndex,
    pub combatant: &'a dyn Combatant,
    pub party: &'a Party,
    pub opponents: Vec<BattlerIndex>,
    pub kind: BattleKind,
    pub poke_balls: u8,
}

/// Anything that can pick commands for one side: a human front end, an AI,
/// or a test script.
pub trait CommandSource {
    fn choose_command(&mut self, view: &CommandView<'_>, rng: &mut BattleRng) -> TurnCommand;

    /// Picks a party index from `candidates`, which is never empty.
    fn choose_replacement(
        &mut self,
        battler: BattlerIndex,
        candidates: &[usize],
        rng: &mut BattleRng,
    ) -> usize;
}

/// Picks a random usable move, or Struggle when nothing has PP.
#[derive(Debug, Clone, Copy, Default)]
pub struct NpcCommandSource;

impl CommandSource for NpcCommandSource {
    fn choose_command(&mut self, view: &CommandView<'_>, rng: &mut BattleRng) -> TurnCommand {
        let usable: Vec<usize> = view
            .combatant
            .moves()
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.pp > 0)
            .map(|(index, _)| index)
            .collect();
        match rng.pick(&usable, "npc move choice") {
            Some(&index) => TurnCommand::fight(index),
            None => TurnCommand::struggle(),
        }
    }

    fn choose_replacement(
        &mut self,
        _battler: BattlerIndex,
        candidates: &[usize],
        rng: &mut BattleRng,
    ) -> usize {
        rng.pick(candidates, "npc replacement choice")
            .copied()
            .unwrap_or_default()
    }
}

/// Replays queued commands and replacements in order, then behaves like
/// `NpcCommandSource`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedCommandSource {
    commands: VecDeque<TurnCommand>,
    replacements: VecDeque<usize>,
    fallback: NpcCommandSource,
}

impl ScriptedCommandSource {
    pub fn new(commands: impl IntoIterator<Item = TurnCommand>) -> Self {
        Self {
            commands: commands.into_iter().collect(),
            replacements: VecDeque::new(),
            fallback: NpcCommandSource,
        }
    }

    pub fn with_replacements(mut self, replacements: impl IntoIterator<Item = usize>) -> Self {
        self.replacements = replacements.into_iter().collect();
        self
    }

    pub fn remaining(&self) -> usize {
        self.commands.len()
    }
}

impl CommandSource for ScriptedCommandSource {
    fn choose_command(&mut self, view: &CommandView<'_>, rng: &mut BattleRng) -> TurnCommand {
        match self.commands.pop_front() {
            Some(command) => command,
            None => {
                debug!(battler = %view.battler, "script exhausted; falling back to npc choice");
                self.fallback.choose_command(view, rng)
            }
        }
    }

    fn choose_replacement(
        &mut self,
        battler: BattlerIndex,
        candidates: &[usize],
        rng: &mut BattleRng,
    ) -> usize {
        match self.replacements.pop_front() {
            Some(index) if candidates.contains(&index) => index,
            _ => self.fallback.choose_replacement(battler, candidates, rng),
        }
    }
}

/// Checks a selection against the current state before it is recorded.
pub fn validate_command(
    ctx: &BattleContext,
    battler: BattlerIndex,
    command: &TurnCommand,
) -> Result<(), CommandError> {
    let combatant = ctx
        .combatant(battler)
        .ok_or(CommandError::NoCombatant(battler))?;

    match *command {
        TurnCommand::Fight {
            move_index: Some(index),
            ..
        } => {
            let slot = combatant
                .moves()
                .get(index)
                .ok_or(CommandError::NoSuchMove { battler, index })?;
            if slot.pp == 0 {
                return Err(CommandError::MoveDepleted {
                    battler,
                    move_: slot.move_,
                });
            }
            Ok(())
        }
        TurnCommand::Fight {
            move_index: None, ..
        } => {
            let locked = combatant.tags().charging_move().is_some();
            if !locked && combatant.moves().iter().any(|slot| slot.pp > 0) {
                return Err(CommandError::MovesRemaining { battler });
            }
            Ok(())
        }
        TurnCommand::Ball => {
            if ctx.config.kind == BattleKind::Trainer || battler.side() != Side::Player {
                return Err(CommandError::CannotCapture);
            }
            if ctx.poke_balls == 0 {
                return Err(CommandError::NoBallsLeft);
            }
            Ok(())
        }
        TurnCommand::Run => {
            if ctx.config.kind == BattleKind::Trainer {
                return Err(CommandError::CannotFlee);
            }
            Ok(())
        }
        TurnCommand::Switch { party_index } => {
            let party = ctx.field.party(battler.side());
            let invalid = CommandError::InvalidSwitch {
                battler,
                party_index,
            };
            let member = party.member(party_index).ok_or(invalid.clone())?;
            if member.is_fainted() || party.is_on_field(party_index) {
                return Err(invalid);
            }
            // An ally may already have claimed the same member this round.
            let claimed = ctx.commands.iter().any(|(other, chosen)| {
                *other != battler
                    && other.side() == battler.side()
                    && *chosen == TurnCommand::Switch { party_index }
            });
            if claimed {
                return Err(invalid);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::tests::common::{battle_with, predictable_rng, run_encounter, TestPokemonBuilder};
    use crate::config::BattleConfig;
    use crate::Species;
    use pretty_assertions::assert_eq;

    fn trainer_config() -> BattleConfig {
        BattleConfig {
            kind: BattleKind::Trainer,
            ..BattleConfig::default()
        }
    }

    #[test]
    fn depleted_and_missing_moves_are_rejected() {
        let mut pikachu = TestPokemonBuilder::new(Species::Pikachu, 20)
            .with_moves(vec![Move::Tackle, Move::QuickAttack])
            .build();
        pikachu.moves[1].pp = 0;
        let rattata = TestPokemonBuilder::new(Species::Rattata, 5).build();
        let battle = battle_with(BattleConfig::default(), vec![pikachu], vec![rattata]);
        let ctx = battle.context();

        assert_eq!(
            validate_command(ctx, BattlerIndex::Player, &TurnCommand::fight(3)),
            Err(CommandError::NoSuchMove {
                battler: BattlerIndex::Player,
                index: 3
            })
        );
        assert_eq!(
            validate_command(ctx, BattlerIndex::Player, &TurnCommand::fight(1)),
            Err(CommandError::MoveDepleted {
                battler: BattlerIndex::Player,
                move_: Move::QuickAttack
            })
        );
        assert_eq!(
            validate_command(ctx, BattlerIndex::Player, &TurnCommand::struggle()),
            Err(CommandError::MovesRemaining {
                battler: BattlerIndex::Player
            })
        );
        assert!(validate_command(ctx, BattlerIndex::Player, &TurnCommand::fight(0)).is_ok());
    }

    #[test]
    fn trainer_battles_forbid_capture_and_escape() {
        let pikachu = TestPokemonBuilder::new(Species::Pikachu, 20).build();
        let rattata = TestPokemonBuilder::new(Species::Rattata, 5).build();
        let battle = battle_with(trainer_config(), vec![pikachu], vec![rattata]);
        let ctx = battle.context();

        assert_eq!(
            validate_command(ctx, BattlerIndex::Player, &TurnCommand::Run),
            Err(CommandError::CannotFlee)
        );
        assert_eq!(
            validate_command(ctx, BattlerIndex::Player, &TurnCommand::Ball),
            Err(CommandError::CannotCapture)
        );
    }

    #[test]
    fn switching_to_the_active_member_is_rejected() {
        let pikachu = TestPokemonBuilder::new(Species::Pikachu, 20).build();
        let snorlax = TestPokemonBuilder::new(Species::Snorlax, 20).build();
        let rattata = TestPokemonBuilder::new(Species::Rattata, 5).build();
        let mut battle = battle_with(BattleConfig::default(), vec![pikachu, snorlax], vec![rattata]);
        run_encounter(&mut battle);
        let ctx = battle.context();

        assert!(matches!(
            validate_command(ctx, BattlerIndex::Player, &TurnCommand::Switch { party_index: 0 }),
            Err(CommandError::InvalidSwitch { .. })
        ));
        assert!(validate_command(ctx, BattlerIndex::Player, &TurnCommand::Switch { party_index: 1 }).is_ok());
    }

    #[test]
    fn scripted_source_falls_back_after_script() {
        let pikachu = TestPokemonBuilder::new(Species::Pikachu, 20)
            .with_moves(vec![Move::Tackle])
            .build();
        let rattata = TestPokemonBuilder::new(Species::Rattata, 5).build();
        let battle = battle_with(BattleConfig::default(), vec![pikachu.clone()], vec![rattata]);
        let party = battle.context().field.party(Side::Player);

        let view = CommandView {
            battler: BattlerIndex::Player,
            combatant: &pikachu,
            party,
            opponents: vec![BattlerIndex::Enemy],
            kind: BattleKind::Wild,
            poke_balls: 5,
        };
        let mut rng = predictable_rng();
        let mut source = ScriptedCommandSource::new([TurnCommand::Run]);
        assert_eq!(source.choose_command(&view, &mut rng), TurnCommand::Run);
        assert_eq!(source.choose_command(&view, &mut rng), TurnCommand::fight(0));
        assert_eq!(source.remaining(), 0);
    }
}
