//! The battle handle: a context plus the scheduler that drives it.

use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use tracing::{info, warn};

use crate::battle::arena::Arena;
use crate::battle::combatant::{Combatant, Side};
use crate::battle::commands::{CommandSource, NpcCommandSource};
use crate::battle::events::{BattleEvent, EventBus};
use crate::battle::phases::{Phase, PhaseKind};
use crate::battle::presentation::{ImmediatePresenter, Presenter};
use crate::battle::rng::BattleRng;
use crate::battle::scheduler::{PhaseScheduler, StepOutcome};
use crate::battle::session::{NoopHooks, SessionHooks};
use crate::battle::state::{BattleContext, BattleOutcome, Field, Party};
use crate::config::{BattleConfig, BattleSetup, TeamMemberSpec};
use crate::data::DataProvider;
use crate::errors::{BattleResult, BattleStateError};
use crate::pokemon::PokemonInst;
use crate::Biome;

/// Upper bound on phases run by `run_to_completion` per configured turn.
const STEPS_PER_TURN: usize = 256;

#[derive(Debug)]
pub struct Battle {
    ctx: BattleContext,
    scheduler: PhaseScheduler,
}

impl Battle {
    fn new(ctx: BattleContext) -> Self {
        let mut scheduler = PhaseScheduler::new();
        scheduler.push_back(Phase::encounter());
        Self { ctx, scheduler }
    }

    /// Runs one macro-step of the scheduler.
    pub fn step(&mut self) -> StepOutcome {
        self.scheduler.run_next(&mut self.ctx)
    }

    /// Steps until the current turn has ended, the battle is over, or a
    /// presentation step is still pending.
    pub fn play_turn(&mut self) -> StepOutcome {
        loop {
            let outcome = self.step();
            match outcome {
                StepOutcome::Completed(PhaseKind::TurnEnd) | StepOutcome::Awaiting(_) | StepOutcome::Idle => {
                    return outcome;
                }
                StepOutcome::Completed(_) => {}
            }
        }
    }

    /// Runs the battle to its end. Needs a presenter that completes on its
    /// own; anything left pending is reported as a stall.
    pub fn run_to_completion(&mut self) -> BattleResult<BattleOutcome> {
        let budget = (self.ctx.config.max_turns as usize + 1).saturating_mul(STEPS_PER_TURN);
        for _ in 0..budget {
            match self.step() {
                StepOutcome::Idle => break,
                StepOutcome::Awaiting(kind) => {
                    warn!(phase = %kind, "presentation never completed");
                    return Err(BattleStateError::Stalled.into());
                }
                StepOutcome::Completed(_) => {}
            }
        }
        match self.ctx.outcome {
            Some(outcome) => {
                info!(%outcome, turns = self.ctx.turn, "battle finished");
                Ok(outcome)
            }
            None => Err(BattleStateError::Stalled.into()),
        }
    }

    pub fn is_over(&self) -> bool {
        self.ctx.is_over()
    }

    pub fn outcome(&self) -> Option<BattleOutcome> {
        self.ctx.outcome
    }

    pub fn events(&self) -> &[BattleEvent] {
        self.ctx.events.events()
    }

    pub fn context(&self) -> &BattleContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut BattleContext {
        &mut self.ctx
    }

    pub fn scheduler(&self) -> &PhaseScheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut PhaseScheduler {
        &mut self.scheduler
    }
}

/// Assembles a `Battle`. Only the content tables are required; everything
/// else has a headless default.
pub struct BattleBuilder {
    data: Rc<dyn DataProvider>,
    config: BattleConfig,
    player_team: Vec<Box<dyn Combatant>>,
    enemy_team: Vec<Box<dyn Combatant>>,
    presenter: Box<dyn Presenter>,
    hooks: Box<dyn SessionHooks>,
    sources: [Box<dyn CommandSource>; 2],
    biome: Biome,
}

impl BattleBuilder {
    pub fn new(data: Rc<dyn DataProvider>) -> Self {
        Self {
            data,
            config: BattleConfig::default(),
            player_team: Vec::new(),
            enemy_team: Vec::new(),
            presenter: Box::new(ImmediatePresenter),
            hooks: Box::new(NoopHooks),
            sources: [Box::new(NpcCommandSource), Box::new(NpcCommandSource)],
            biome: Biome::default(),
        }
    }

    /// Builds both teams from a setup description. Combatant ids are assigned
    /// in order, player team first.
    pub fn from_setup(setup: &BattleSetup, data: Rc<dyn DataProvider>) -> BattleResult<Self> {
        let mut next_id = 0;
        let mut build_team = |team: &[TeamMemberSpec]| -> BattleResult<Vec<Box<dyn Combatant>>> {
            let mut members: Vec<Box<dyn Combatant>> = Vec::with_capacity(team.len());
            for spec in team {
                let species_data = data.require_species(spec.species)?;
                let mut member = PokemonInst::new(next_id, species_data, spec.level, &spec.moves, data.as_ref())?;
                if let Some(item) = spec.held_item {
                    member = member.with_item(item);
                }
                next_id += 1;
                members.push(Box::new(member));
            }
            Ok(members)
        };
        let player_team = build_team(&setup.player_team)?;
        let enemy_team = build_team(&setup.enemy_team)?;
        Ok(Self::new(Rc::clone(&data))
            .config(setup.config.clone())
            .player_team(player_team)
            .enemy_team(enemy_team))
    }

    pub fn config(mut self, config: BattleConfig) -> Self {
        self.config = config;
        self
    }

    pub fn player_team(mut self, team: Vec<Box<dyn Combatant>>) -> Self {
        self.player_team = team;
        self
    }

    pub fn enemy_team(mut self, team: Vec<Box<dyn Combatant>>) -> Self {
        self.enemy_team = team;
        self
    }

    pub fn presenter(mut self, presenter: impl Presenter + 'static) -> Self {
        self.presenter = Box::new(presenter);
        self
    }

    pub fn hooks(mut self, hooks: impl SessionHooks + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    pub fn command_source(mut self, side: Side, source: impl CommandSource + 'static) -> Self {
        self.sources[side.index()] = Box::new(source);
        self
    }

    pub fn biome(mut self, biome: Biome) -> Self {
        self.biome = biome;
        self
    }

    pub fn build(self) -> BattleResult<Battle> {
        if self.player_team.is_empty() {
            return Err(BattleStateError::EmptyParty(Side::Player).into());
        }
        if self.enemy_team.is_empty() {
            return Err(BattleStateError::EmptyParty(Side::Enemy).into());
        }
        info!(
            seed = self.config.seed,
            format = ?self.config.format,
            kind = ?self.config.kind,
            "battle built"
        );
        let ctx = BattleContext {
            rng: BattleRng::from_seed(self.config.seed),
            poke_balls: self.config.poke_balls,
            config: self.config,
            data: self.data,
            field: Field::new(Party::new(self.player_team), Party::new(self.enemy_team)),
            arena: Arena::new(self.biome),
            events: EventBus::new(),
            presenter: self.presenter,
            hooks: self.hooks,
            command_sources: self.sources,
            commands: BTreeMap::new(),
            speed_order: Vec::new(),
            turn: 0,
            outcome: None,
            escape_attempts: 0,
            faint_pending: BTreeSet::new(),
        };
        Ok(Battle::new(ctx))
    }
}
