//! Pokemon Arena Battle Core
//!
//! A phase-scheduled battle engine: a double-ended phase queue drives turn
//! resolution, a turn order resolver ranks commands, a move effect resolver runs
//! the per-hit pipeline, and an arena tag subsystem carries field-wide effects.

// --- MODULE DECLARATIONS ---
pub mod battle;
pub mod config;
pub mod data;
pub mod errors;
pub mod logging;
pub mod move_data;
pub mod pokemon;

// --- PUBLIC API RE-EXPORTS ---

// --- From the `schema` crate ---
// Shared identifiers used by the data tables and the engine.
pub use schema::{
    ArenaTagSide, ArenaTagType, BaseStats, Biome,
    HeldItem, Move, MoveCategory, MoveTarget, PokemonType, Species, SpeciesData, StatType,
    StatusEffect, WeatherType,
};

// --- From this crate ---
pub use battle::runner::{Battle, BattleBuilder};
pub use battle::state::{BattleContext, BattleOutcome};
pub use config::{BattleConfig, BattleSetup};
pub use data::{DataProvider, GameData};
pub use errors::{BattleEngineError, BattleResult};
pub use pokemon::PokemonInst;
