// Shared schema definitions for the battle core.
// Plain data enums live here so that data tables, the engine and any
// surrounding tooling agree on the same identifiers.

pub use battle_data::*;
pub use moves::*;
pub use pokemon_types::*;
pub use species_data::*;

pub mod battle_data;
pub mod moves;
pub mod pokemon_types;
pub mod species_data;
