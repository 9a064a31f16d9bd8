//! The phase scheduler: a double-ended queue plus the one phase that is
//! currently running.

use std::collections::VecDeque;

use tracing::{debug, error, warn};

use crate::battle::events::BattleEvent;
use crate::battle::phases::{Phase, PhaseBuffer, PhaseKind, PhaseStatus};
use crate::battle::presentation::{Completion, CompletionState};
use crate::battle::state::BattleContext;
use crate::errors::BattleResult;

/// Result of one `run_next` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A phase ran to its end.
    Completed(PhaseKind),
    /// The current phase is waiting on a presentation step.
    Awaiting(PhaseKind),
    /// Nothing left to run; the battle is over.
    Idle,
}

#[derive(Debug)]
struct ActivePhase {
    phase: Phase,
    awaiting: Option<Completion>,
    buffer: PhaseBuffer,
}

#[derive(Debug, Default)]
pub struct PhaseScheduler {
    queue: VecDeque<Phase>,
    current: Option<ActivePhase>,
}

impl PhaseScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_back(&mut self, phase: Phase) {
        self.queue.push_back(phase);
    }

    pub fn push_front(&mut self, phase: Phase) {
        self.queue.push_front(phase);
    }

    /// Inserts `phases` at the head, keeping their relative order.
    pub fn push_front_batch(&mut self, phases: Vec<Phase>) {
        for phase in phases.into_iter().rev() {
            self.queue.push_front(phase);
        }
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty() && self.current.is_none()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn has_phase_of_kind(&self, kind: PhaseKind) -> bool {
        self.queue.iter().any(|phase| phase.kind() == kind)
    }

    /// Removes the first queued phase of `kind`. Returns whether one was found.
    pub fn try_remove_phase(&mut self, kind: PhaseKind) -> bool {
        match self.queue.iter().position(|phase| phase.kind() == kind) {
            Some(position) => {
                self.queue.remove(position);
                true
            }
            None => false,
        }
    }

    pub fn pending_kinds(&self) -> Vec<PhaseKind> {
        self.queue.iter().map(Phase::kind).collect()
    }

    pub fn current_kind(&self) -> Option<PhaseKind> {
        self.current.as_ref().map(|active| active.phase.kind())
    }

    /// One macro-step: resume or start a phase and carry it as far as it goes.
    pub fn run_next(&mut self, ctx: &mut BattleContext) -> StepOutcome {
        let mut active = match self.current.take() {
            Some(active) => active,
            None => {
                let phase = match self.queue.pop_front() {
                    Some(phase) => phase,
                    None if ctx.is_over() => return StepOutcome::Idle,
                    None => Phase::turn_init(),
                };
                let mut active = ActivePhase {
                    phase,
                    awaiting: None,
                    buffer: PhaseBuffer::new(),
                };
                let kind = active.phase.kind();
                debug!(phase = %kind, pending = self.queue.len(), "phase start");
                let result = active.phase.handler_mut().start(ctx, &mut active.buffer);
                match self.absorb(ctx, active, result) {
                    Some(active) => active,
                    None => return StepOutcome::Completed(kind),
                }
            }
        };

        let kind = active.phase.kind();
        loop {
            let Some(completion) = active.awaiting.take() else {
                // Only reachable for a phase that was awaiting when stored.
                self.finish(ctx, active);
                return StepOutcome::Completed(kind);
            };
            match completion.state() {
                CompletionState::Pending => {
                    active.awaiting = Some(completion);
                    self.current = Some(active);
                    return StepOutcome::Awaiting(kind);
                }
                CompletionState::Failed(reason) => {
                    warn!(phase = %kind, %reason, "presentation failed; resuming");
                    ctx.emit(BattleEvent::PresentationFailed { reason });
                }
                CompletionState::Done => {}
            }
            debug!(phase = %kind, "phase resume");
            let result = active.phase.handler_mut().resume(ctx, &mut active.buffer);
            active = match self.absorb(ctx, active, result) {
                Some(active) => active,
                None => return StepOutcome::Completed(kind),
            };
        }
    }

    /// Drives the queue until it blocks, the battle is over, or `max_steps`
    /// phases have run. Returns the last step's outcome.
    pub fn run_until_idle(&mut self, ctx: &mut BattleContext, max_steps: usize) -> StepOutcome {
        let mut last = StepOutcome::Idle;
        for _ in 0..max_steps {
            last = self.run_next(ctx);
            if matches!(last, StepOutcome::Awaiting(_) | StepOutcome::Idle) {
                break;
            }
        }
        last
    }

    /// Takes the result of `start` or `resume`. Hands the phase back while it
    /// still awaits a completion; otherwise ends it.
    fn absorb(
        &mut self,
        ctx: &mut BattleContext,
        mut active: ActivePhase,
        result: BattleResult<PhaseStatus>,
    ) -> Option<ActivePhase> {
        match result {
            Ok(PhaseStatus::Awaiting(completion)) => {
                active.awaiting = Some(completion);
                Some(active)
            }
            Ok(PhaseStatus::Done) => {
                self.finish(ctx, active);
                None
            }
            Err(err) => {
                // Contained: the phase becomes a no-op and nothing it buffered is kept.
                error!(phase = %active.phase.kind(), error = %err, "phase failed");
                None
            }
        }
    }

    fn finish(&mut self, ctx: &mut BattleContext, mut active: ActivePhase) {
        let kind = active.phase.kind();
        if let Err(err) = active.phase.handler_mut().end(ctx, &mut active.buffer) {
            error!(phase = %kind, error = %err, "phase end failed");
        }
        let (front, back, clear_queue) = active.buffer.into_parts();
        if clear_queue {
            debug!(phase = %kind, dropped = self.queue.len(), "queue cleared");
            self.queue.clear();
        }
        debug!(phase = %kind, front = front.len(), back = back.len(), "phase end");
        self.push_front_batch(front);
        self.queue.extend(back);
    }
}
