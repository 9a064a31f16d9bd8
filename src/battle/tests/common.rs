use std::rc::Rc;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::battle::combatant::{Combatant, Status};
use crate::battle::events::BattleEvent;
use crate::battle::rng::BattleRng;
use crate::battle::runner::{Battle, BattleBuilder};
use crate::battle::scheduler::StepOutcome;
use crate::config::BattleConfig;
use crate::data::{DataProvider, GameData};
use crate::pokemon::PokemonInst;
use crate::{HeldItem, Move, Species, StatusEffect};

static NEXT_ID: AtomicU32 = AtomicU32::new(1000);

/// Shared builtin tables for tests.
pub fn game_data() -> Rc<dyn DataProvider> {
    Rc::new(GameData::builtin().expect("builtin tables load"))
}

/// A builder for test combatants with common defaults.
///
/// # Example
/// ```ignore
/// let pokemon = TestPokemonBuilder::new(Species::Pikachu, 25)
///     .with_moves(vec![Move::Tackle])
///     .with_status(StatusEffect::Paralysis)
///     .build();
/// ```
pub struct TestPokemonBuilder {
    species: Species,
    level: u8,
    moves: Option<Vec<Move>>,
    status: Option<StatusEffect>,
    current_hp: Option<u16>,
    stats: Option<[u16; 6]>,
    item: Option<HeldItem>,
}

impl TestPokemonBuilder {
    pub fn new(species: Species, level: u8) -> Self {
        Self {
            species,
            level,
            moves: None,
            status: None,
            current_hp: None,
            stats: None,
            item: None,
        }
    }

    pub fn with_moves(mut self, moves: Vec<Move>) -> Self {
        self.moves = Some(moves);
        self
    }

    pub fn with_status(mut self, status: StatusEffect) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the current HP. Applied after `with_stats`, so it is clamped to
    /// the final maximum.
    pub fn with_hp(mut self, hp: u16) -> Self {
        self.current_hp = Some(hp);
        self
    }

    /// Overrides the computed stats: HP, ATK, DEF, SP.ATK, SP.DEF, SPD.
    pub fn with_stats(mut self, stats: [u16; 6]) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn with_item(mut self, item: HeldItem) -> Self {
        self.item = Some(item);
        self
    }

    pub fn build(self) -> PokemonInst {
        let data = GameData::builtin().expect("builtin tables load");
        let species_data = match data.require_species(self.species) {
            Ok(species_data) => species_data,
            Err(err) => panic!("no species data for {:?}: {}", self.species, err),
        };
        let moves = self.moves.unwrap_or_else(|| vec![Move::Tackle]);
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        let mut pokemon = match PokemonInst::new(id, species_data, self.level, &moves, &data) {
            Ok(pokemon) => pokemon,
            Err(err) => panic!("failed to build {:?}: {}", self.species, err),
        };

        if let Some(stats) = self.stats {
            pokemon.set_stats(stats);
        }
        if let Some(hp) = self.current_hp {
            pokemon.set_hp(hp);
        }
        if let Some(item) = self.item {
            pokemon = pokemon.with_item(item);
        }
        pokemon.status = self.status.map(Status::new);
        pokemon
    }
}

/// A headless battle between two teams, NPC-driven on both sides.
pub fn battle_with(config: BattleConfig, player: Vec<PokemonInst>, enemy: Vec<PokemonInst>) -> Battle {
    battle_with_data(game_data(), config, player, enemy)
}

/// Like `battle_with`, over a caller-supplied set of tables.
pub fn battle_with_data(
    data: Rc<dyn DataProvider>,
    config: BattleConfig,
    player: Vec<PokemonInst>,
    enemy: Vec<PokemonInst>,
) -> Battle {
    let boxed = |team: Vec<PokemonInst>| -> Vec<Box<dyn Combatant>> {
        team.into_iter()
            .map(|member| Box::new(member) as Box<dyn Combatant>)
            .collect()
    };
    BattleBuilder::new(data)
        .config(config)
        .player_team(boxed(player))
        .enemy_team(boxed(enemy))
        .build()
        .expect("test battle builds")
}

/// Runs the opening encounter and the leads' summons, stopping before the
/// first round is initialised.
pub fn run_encounter(battle: &mut Battle) {
    settle(battle);
}

/// Runs whatever is still queued (faints, delayed attacks) without starting
/// a new round.
pub fn settle(battle: &mut Battle) {
    while !battle.scheduler().is_empty() {
        if matches!(battle.step(), StepOutcome::Awaiting(_) | StepOutcome::Idle) {
            break;
        }
    }
}

/// Scripted rng with a generous buffer of mid-range values.
pub fn predictable_rng() -> BattleRng {
    BattleRng::new_for_test(vec![50; 100])
}

pub fn has_event(battle: &Battle, pred: impl Fn(&BattleEvent) -> bool) -> bool {
    battle.events().iter().any(pred)
}
