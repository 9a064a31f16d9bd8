use crate::PokemonType;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter)]
pub enum Species {
    Rattata,
    Pikachu,
    Charizard,
    Blastoise,
    Venusaur,
    Pidgeot,
    Alakazam,
    Machamp,
    Golem,
    Gengar,
    Muk,
    Snorlax,
    Skarmory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    pub hp: u8,
    pub attack: u8,
    pub defense: u8,
    pub sp_attack: u8,
    pub sp_defense: u8,
    pub speed: u8,
}

/// Read-only species entry as stored in the species table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesData {
    pub species: Species,
    pub name: String,
    pub types: Vec<PokemonType>,
    pub base_stats: BaseStats,
    pub catch_rate: u8,
}
