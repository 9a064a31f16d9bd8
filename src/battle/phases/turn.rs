//! Phases that open and close a round, plus the opening encounter.

use tracing::{debug, info, trace};

use crate::battle::arena::{TagApply, TagFamily};
use crate::battle::combatant::{BattlerIndex, Side, TurnData};
use crate::battle::commands::{fight_move, TurnCommand};
use crate::battle::events::BattleEvent;
use crate::battle::move_effects::apply_heal;
use crate::battle::phases::{
    queue_faints, AttemptCapturePhase, AttemptRunPhase, BattleEndPhase, CommandPhase, MoveEffectPhase,
    MovePhase, Phase, PhaseBuffer, PhaseHandler, PhaseStatus, PostTurnStatusPhase, SummonPhase,
    SwitchSummonPhase, WeatherEffectPhase,
};
use crate::battle::state::{BattleContext, BattleOutcome};
use crate::battle::turn_order::{resolve_command_order, resolve_speed_order};
use crate::errors::BattleResult;
use crate::HeldItem;

/// Sends out each side's leads.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncounterPhase;

impl PhaseHandler for EncounterPhase {
    fn start(&mut self, ctx: &mut BattleContext, buffer: &mut PhaseBuffer) -> BattleResult<PhaseStatus> {
        ctx.emit(BattleEvent::BattleStarted {
            kind: ctx.config.kind,
        });
        let slots = ctx.config.format.active_slots();
        for side in [Side::Player, Side::Enemy] {
            let party = ctx.field.party(side);
            let leads: Vec<usize> = party
                .members()
                .iter()
                .enumerate()
                .filter(|(_, member)| !member.is_fainted())
                .map(|(index, _)| index)
                .take(slots)
                .collect();
            for (slot, party_index) in leads.into_iter().enumerate() {
                if let Some(battler) = BattlerIndex::from_side_slot(side, slot) {
                    buffer.push_back(Phase::Summon(SummonPhase::new(battler, party_index)));
                }
            }
        }
        Ok(PhaseStatus::Done)
    }
}

/// Opens a round: resets per-turn state and asks every combatant for a command.
#[derive(Debug, Clone, Copy, Default)]
pub struct TurnInitPhase;

impl PhaseHandler for TurnInitPhase {
    fn start(&mut self, ctx: &mut BattleContext, buffer: &mut PhaseBuffer) -> BattleResult<PhaseStatus> {
        if ctx.turn >= ctx.config.max_turns {
            info!(turn = ctx.turn, "turn limit reached");
            buffer.push_front(Phase::BattleEnd(BattleEndPhase::new(BattleOutcome::TurnLimit)));
            return Ok(PhaseStatus::Done);
        }
        ctx.turn += 1;
        ctx.commands.clear();

        let active = ctx.field.active_battlers();
        for battler in &active {
            if let Some(combatant) = ctx.combatant_mut(*battler) {
                *combatant.turn_data_mut() = TurnData::default();
                let turns = combatant.turns_active() + 1;
                combatant.set_turns_active(turns);
            }
        }

        let turn = ctx.turn;
        ctx.hooks.on_round_begin(turn);
        ctx.emit(BattleEvent::TurnStarted { turn });
        info!(turn, active = active.len(), "turn started");

        for battler in active {
            buffer.push_back(Phase::Command(CommandPhase::new(battler)));
        }
        buffer.push_back(Phase::TurnStart(TurnStartPhase));
        Ok(PhaseStatus::Done)
    }
}

/// Orders the recorded commands and queues the round's actions and upkeep.
#[derive(Debug, Clone, Copy, Default)]
pub struct TurnStartPhase;

impl PhaseHandler for TurnStartPhase {
    fn start(&mut self, ctx: &mut BattleContext, buffer: &mut PhaseBuffer) -> BattleResult<PhaseStatus> {
        resolve_speed_order(ctx)?;
        let order = resolve_command_order(ctx)?;
        debug!(?order, "command order");

        // Non-fight commands sort ahead of every move, so queueing in order
        // keeps switches, balls and escapes first.
        for battler in order {
            let Some(command) = ctx.commands.get(&battler).copied() else {
                continue;
            };
            let phase = match command {
                TurnCommand::Fight { move_index, target } => {
                    let combatant = ctx.require_combatant(battler)?;
                    let Some(move_) = fight_move(combatant, move_index) else {
                        continue;
                    };
                    Phase::Move(MovePhase::new(battler, combatant.id(), move_, move_index, target))
                }
                TurnCommand::Ball => Phase::AttemptCapture(AttemptCapturePhase::new(battler)),
                TurnCommand::Switch { party_index } => {
                    Phase::SwitchSummon(SwitchSummonPhase::new(battler, party_index))
                }
                TurnCommand::Run => Phase::AttemptRun(AttemptRunPhase::new(battler)),
            };
            buffer.push_back(phase);
        }

        buffer.push_back(Phase::WeatherEffect(WeatherEffectPhase));
        for battler in ctx.speed_order.clone() {
            buffer.push_back(Phase::PostTurnStatus(PostTurnStatusPhase::new(battler)));
        }
        buffer.push_back(Phase::TurnEnd(TurnEndPhase));
        Ok(PhaseStatus::Done)
    }
}

/// Ticks battler and arena tags, runs end-of-turn items, and fires any
/// delayed attack whose timer ran out.
#[derive(Debug, Clone, Copy, Default)]
pub struct TurnEndPhase;

impl TurnEndPhase {
    fn leftovers(ctx: &mut BattleContext, battler: BattlerIndex) -> BattleResult<()> {
        let combatant = ctx.require_combatant(battler)?;
        if !combatant.holds(HeldItem::Leftovers) || combatant.hp() >= combatant.max_hp() {
            return Ok(());
        }
        let species = combatant.species();
        let amount = (combatant.max_hp() / 16).max(1);
        ctx.emit(BattleEvent::ItemActivated {
            battler,
            species,
            item: HeldItem::Leftovers,
        });
        apply_heal(ctx, battler, amount)?;
        Ok(())
    }
}

impl PhaseHandler for TurnEndPhase {
    fn start(&mut self, ctx: &mut BattleContext, buffer: &mut PhaseBuffer) -> BattleResult<PhaseStatus> {
        let active = ctx.field.active_battlers();
        for battler in &active {
            if let Some(combatant) = ctx.combatant_mut(*battler) {
                let expired = combatant.tags_mut().lapse_all();
                if !expired.is_empty() {
                    trace!(battler = %battler, ?expired, "battler tags expired");
                }
            }
        }

        for battler in &active {
            let (field, arena, mut env) = ctx.split_field_arena();
            let Some(target) = field.combatant_mut(*battler) else {
                continue;
            };
            arena.apply_tags_for_side(
                TagFamily::Field,
                battler.side().tag_side(),
                &mut env,
                &mut TagApply::TurnEnd { target },
            );
        }

        if !ctx.arena.items_suppressed() {
            for battler in &active {
                if ctx.field.is_active(*battler) {
                    Self::leftovers(ctx, *battler)?;
                }
            }
        }

        let expired = {
            let (arena, mut env) = ctx.split_arena();
            arena.lapse_tags(&mut env)
        };
        for tag in &expired {
            let (Some(delayed), Some(source_id)) = (tag.as_delayed_attack(), tag.core().source_id) else {
                continue;
            };
            debug!(move_ = %delayed.move_(), target = %delayed.target(), "delayed attack due");
            buffer.push_front(Phase::MoveEffect(MoveEffectPhase::delayed(
                delayed.source(),
                source_id,
                delayed.move_(),
                delayed.target(),
            )));
        }

        let turn = ctx.turn;
        ctx.emit(BattleEvent::TurnEnded { turn });
        ctx.hooks.on_round_end(turn);
        queue_faints(ctx, buffer);
        Ok(PhaseStatus::Done)
    }
}
