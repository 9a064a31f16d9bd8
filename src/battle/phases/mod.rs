//! The phase taxonomy.
//!
//! A battle is a queue of `Phase` values. Each variant wraps a struct that
//! implements `PhaseHandler`; the scheduler only ever talks to the trait.
//! Phases never touch the queue directly: follow-ups go into the
//! `PhaseBuffer` and are merged when the phase ends.

pub mod battle_end;
pub mod capture;
pub mod command;
pub mod faint;
pub mod message;
pub mod move_effect;
pub mod move_phase;
pub mod run;
pub mod switch;
pub mod turn;
pub mod upkeep;

pub use battle_end::BattleEndPhase;
pub use capture::AttemptCapturePhase;
pub use command::CommandPhase;
pub use faint::{queue_faints, FaintPhase};
pub use message::MessagePhase;
pub use move_effect::MoveEffectPhase;
pub use move_phase::MovePhase;
pub use run::AttemptRunPhase;
pub use switch::{PostSummonPhase, SummonPhase, SwitchSummonPhase};
pub use turn::{EncounterPhase, TurnEndPhase, TurnInitPhase, TurnStartPhase};
pub use upkeep::{PostTurnStatusPhase, WeatherEffectPhase};

use strum::Display;

use crate::battle::presentation::Completion;
use crate::battle::state::BattleContext;
use crate::errors::BattleResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum PhaseKind {
    Encounter,
    TurnInit,
    Command,
    TurnStart,
    Move,
    MoveEffect,
    Message,
    SwitchSummon,
    Summon,
    PostSummon,
    WeatherEffect,
    PostTurnStatus,
    TurnEnd,
    Faint,
    AttemptCapture,
    AttemptRun,
    BattleEnd,
}

/// What a phase reports after `start` or `resume`.
#[derive(Debug, Clone)]
pub enum PhaseStatus {
    Done,
    /// Suspend until the completion fires, then `resume`.
    Awaiting(Completion),
}

/// Insertions a phase requests. Merged by the scheduler when the phase ends.
#[derive(Debug, Default)]
pub struct PhaseBuffer {
    front: Vec<Phase>,
    back: Vec<Phase>,
    clear_queue: bool,
}

impl PhaseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs before everything already queued. Several front pushes keep their order.
    pub fn push_front(&mut self, phase: Phase) {
        self.front.push(phase);
    }

    pub fn push_back(&mut self, phase: Phase) {
        self.back.push(phase);
    }

    /// Drops every pending phase before the buffered insertions are merged.
    pub fn clear_queue(&mut self) {
        self.clear_queue = true;
    }

    pub fn front(&self) -> &[Phase] {
        &self.front
    }

    pub fn back(&self) -> &[Phase] {
        &self.back
    }

    pub fn is_empty(&self) -> bool {
        self.front.is_empty() && self.back.is_empty() && !self.clear_queue
    }

    pub(crate) fn into_parts(self) -> (Vec<Phase>, Vec<Phase>, bool) {
        (self.front, self.back, self.clear_queue)
    }
}

pub trait PhaseHandler {
    fn start(&mut self, ctx: &mut BattleContext, buffer: &mut PhaseBuffer) -> BattleResult<PhaseStatus>;

    /// Runs once an awaited completion has fired (or failed).
    fn resume(&mut self, _ctx: &mut BattleContext, _buffer: &mut PhaseBuffer) -> BattleResult<PhaseStatus> {
        Ok(PhaseStatus::Done)
    }

    fn end(&mut self, _ctx: &mut BattleContext, _buffer: &mut PhaseBuffer) -> BattleResult<()> {
        Ok(())
    }
}

#[derive(Debug)]
pub enum Phase {
    Encounter(EncounterPhase),
    TurnInit(TurnInitPhase),
    Command(CommandPhase),
    TurnStart(TurnStartPhase),
    Move(MovePhase),
    MoveEffect(MoveEffectPhase),
    Message(MessagePhase),
    SwitchSummon(SwitchSummonPhase),
    Summon(SummonPhase),
    PostSummon(PostSummonPhase),
    WeatherEffect(WeatherEffectPhase),
    PostTurnStatus(PostTurnStatusPhase),
    TurnEnd(TurnEndPhase),
    Faint(FaintPhase),
    AttemptCapture(AttemptCapturePhase),
    AttemptRun(AttemptRunPhase),
    BattleEnd(BattleEndPhase),
}

impl Phase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            Phase::Encounter(_) => PhaseKind::Encounter,
            Phase::TurnInit(_) => PhaseKind::TurnInit,
            Phase::Command(_) => PhaseKind::Command,
            Phase::TurnStart(_) => PhaseKind::TurnStart,
            Phase::Move(_) => PhaseKind::Move,
            Phase::MoveEffect(_) => PhaseKind::MoveEffect,
            Phase::Message(_) => PhaseKind::Message,
            Phase::SwitchSummon(_) => PhaseKind::SwitchSummon,
            Phase::Summon(_) => PhaseKind::Summon,
            Phase::PostSummon(_) => PhaseKind::PostSummon,
            Phase::WeatherEffect(_) => PhaseKind::WeatherEffect,
            Phase::PostTurnStatus(_) => PhaseKind::PostTurnStatus,
            Phase::TurnEnd(_) => PhaseKind::TurnEnd,
            Phase::Faint(_) => PhaseKind::Faint,
            Phase::AttemptCapture(_) => PhaseKind::AttemptCapture,
            Phase::AttemptRun(_) => PhaseKind::AttemptRun,
            Phase::BattleEnd(_) => PhaseKind::BattleEnd,
        }
    }

    pub fn handler_mut(&mut self) -> &mut dyn PhaseHandler {
        match self {
            Phase::Encounter(phase) => phase,
            Phase::TurnInit(phase) => phase,
            Phase::Command(phase) => phase,
            Phase::TurnStart(phase) => phase,
            Phase::Move(phase) => phase,
            Phase::MoveEffect(phase) => phase,
            Phase::Message(phase) => phase,
            Phase::SwitchSummon(phase) => phase,
            Phase::Summon(phase) => phase,
            Phase::PostSummon(phase) => phase,
            Phase::WeatherEffect(phase) => phase,
            Phase::PostTurnStatus(phase) => phase,
            Phase::TurnEnd(phase) => phase,
            Phase::Faint(phase) => phase,
            Phase::AttemptCapture(phase) => phase,
            Phase::AttemptRun(phase) => phase,
            Phase::BattleEnd(phase) => phase,
        }
    }

    // Shorthand constructors for the common cases.

    pub fn encounter() -> Self {
        Phase::Encounter(EncounterPhase)
    }

    pub fn turn_init() -> Self {
        Phase::TurnInit(TurnInitPhase)
    }

    pub fn message(event: crate::battle::events::BattleEvent) -> Self {
        Phase::Message(MessagePhase::new(event))
    }
}
