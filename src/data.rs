//! Read-only content tables: move definitions and species stats.

use std::collections::HashMap;
use std::path::Path;

use crate::errors::{DataError, DataResult};
use crate::move_data::MoveData;
use crate::{Move, Species, SpeciesData};

const BUILTIN_MOVES: &str = include_str!("../data/moves.ron");
const BUILTIN_SPECIES: &str = include_str!("../data/species.ron");

/// Lookup contract the battle core consumes. Tables are immutable once built.
pub trait DataProvider {
    fn move_data(&self, move_: Move) -> Option<&MoveData>;
    fn species_data(&self, species: Species) -> Option<&SpeciesData>;

    fn require_move(&self, move_: Move) -> DataResult<&MoveData> {
        self.move_data(move_).ok_or(DataError::MoveNotFound(move_))
    }

    fn require_species(&self, species: Species) -> DataResult<&SpeciesData> {
        self.species_data(species)
            .ok_or(DataError::SpeciesNotFound(species))
    }
}

#[derive(Debug, Clone, Default)]
pub struct GameData {
    moves: HashMap<Move, MoveData>,
    species: HashMap<Species, SpeciesData>,
}

impl GameData {
    /// Tables bundled with the crate.
    pub fn builtin() -> DataResult<Self> {
        Self::from_ron(BUILTIN_MOVES, BUILTIN_SPECIES)
    }

    /// Loads `moves.ron` and `species.ron` from a directory.
    pub fn from_dir(dir: &Path) -> DataResult<Self> {
        let moves = read_table(&dir.join("moves.ron"))?;
        let species = read_table(&dir.join("species.ron"))?;
        Self::from_ron(&moves, &species)
    }

    pub fn from_ron(moves: &str, species: &str) -> DataResult<Self> {
        let moves: HashMap<Move, MoveData> =
            ron::from_str(moves).map_err(|source| DataError::Parse {
                table: "move",
                source,
            })?;
        let species_list: Vec<SpeciesData> =
            ron::from_str(species).map_err(|source| DataError::Parse {
                table: "species",
                source,
            })?;
        let species = species_list
            .into_iter()
            .map(|entry| (entry.species, entry))
            .collect();
        Ok(Self { moves, species })
    }

    pub fn with_move(mut self, move_: Move, data: MoveData) -> Self {
        self.moves.insert(move_, data);
        self
    }

    pub fn move_count(&self) -> usize {
        self.moves.len()
    }
}

impl DataProvider for GameData {
    fn move_data(&self, move_: Move) -> Option<&MoveData> {
        self.moves.get(&move_)
    }

    fn species_data(&self, species: Species) -> Option<&SpeciesData> {
        self.species.get(&species)
    }
}

fn read_table(path: &Path) -> DataResult<String> {
    std::fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn builtin_tables_cover_every_move_and_species() {
        let data = GameData::builtin().unwrap();
        for move_ in Move::iter() {
            assert!(data.move_data(move_).is_some(), "missing move data for {move_:?}");
        }
        for species in Species::iter() {
            assert!(
                data.species_data(species).is_some(),
                "missing species data for {species:?}"
            );
        }
    }

    #[test]
    fn missing_entries_are_errors() {
        let data = GameData::default();
        assert!(matches!(
            data.require_move(Move::Tackle),
            Err(DataError::MoveNotFound(Move::Tackle))
        ));
    }

    #[test]
    fn bad_table_reports_which_table() {
        let err = GameData::from_ron("{ Tackle: 3 }", "[]").unwrap_err();
        assert!(matches!(err, DataError::Parse { table: "move", .. }));
    }
}
