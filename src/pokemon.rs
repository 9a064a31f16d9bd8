use serde::{Deserialize, Serialize};

use crate::battle::battler_tags::BattlerTags;
use crate::battle::combatant::{
    BattlerIndex, Combatant, CombatantId, MoveHistoryEntry, MoveSlot, Status, TurnData,
};
use crate::data::DataProvider;
use crate::errors::DataResult;
use crate::{BaseStats, HeldItem, Move, PokemonType, Species, SpeciesData, StatType};

/// Fixed IVs used for every battle instance.
const DEFAULT_IV: u32 = 15;

const STAGED_STATS: usize = 7;

/// The bundled creature model. Stats are fixed at creation; everything the
/// battle changes lives alongside them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PokemonInst {
    pub id: CombatantId,
    pub name: String,
    pub species: Species,
    pub types: Vec<PokemonType>,
    pub level: u8,
    pub stats: [u16; 6], // HP, ATK, DEF, SP.ATK, SP.DEF, SPD
    pub hp: u16,
    /// Indexed like `StatType`: Attack through Evasion.
    pub stat_stages: [i8; STAGED_STATS],
    pub status: Option<Status>,
    pub tags: BattlerTags,
    pub moves: Vec<MoveSlot>,
    pub held_items: Vec<HeldItem>,
    pub turn_data: TurnData,
    pub move_history: Vec<MoveHistoryEntry>,
    pub battler_index: Option<BattlerIndex>,
    pub turns_active: u32,
}

impl PokemonInst {
    /// Create a new Pokemon instance from species data, at full HP.
    pub fn new(
        id: CombatantId,
        species_data: &SpeciesData,
        level: u8,
        moves: &[Move],
        data: &dyn DataProvider,
    ) -> DataResult<Self> {
        let stats = Self::calculate_stats(&species_data.base_stats, level);
        let moves = moves
            .iter()
            .take(4)
            .map(|move_| {
                let move_data = data.require_move(*move_)?;
                Ok(MoveSlot::new(*move_, move_data.max_pp))
            })
            .collect::<DataResult<Vec<_>>>()?;

        Ok(PokemonInst {
            id,
            name: species_data.name.clone(),
            species: species_data.species,
            types: species_data.types.clone(),
            level,
            stats,
            hp: stats[0],
            stat_stages: [0; STAGED_STATS],
            status: None,
            tags: BattlerTags::new(),
            moves,
            held_items: Vec::new(),
            turn_data: TurnData::default(),
            move_history: Vec::new(),
            battler_index: None,
            turns_active: 0,
        })
    }

    pub fn with_item(mut self, item: HeldItem) -> Self {
        self.held_items.push(item);
        self
    }

    /// Overrides the computed stats. HP is refilled to the new maximum.
    pub fn set_stats(&mut self, stats: [u16; 6]) {
        self.stats = stats;
        self.hp = stats[0];
    }

    pub fn set_hp(&mut self, hp: u16) {
        self.hp = hp.min(self.stats[0]);
    }

    /// Gen 3+ stat formula without natures or EVs.
    fn calculate_stats(base_stats: &BaseStats, level: u8) -> [u16; 6] {
        let base = [
            base_stats.hp,
            base_stats.attack,
            base_stats.defense,
            base_stats.sp_attack,
            base_stats.sp_defense,
            base_stats.speed,
        ];
        let level = u32::from(level);
        let mut stats = [0u16; 6];
        for (i, stat) in stats.iter_mut().enumerate() {
            let base_calculation = 2 * u32::from(base[i]) + DEFAULT_IV;
            let value = if i == 0 {
                // HP = floor((2 * Base + IV) * Level / 100) + Level + 10
                (base_calculation * level) / 100 + level + 10
            } else {
                (base_calculation * level) / 100 + 5
            };
            *stat = u16::try_from(value).unwrap_or(u16::MAX);
        }
        stats
    }

    fn stage_slot(stat: StatType) -> usize {
        match stat {
            StatType::Attack => 0,
            StatType::Defense => 1,
            StatType::SpAttack => 2,
            StatType::SpDefense => 3,
            StatType::Speed => 4,
            StatType::Accuracy => 5,
            StatType::Evasion => 6,
        }
    }
}

impl Combatant for PokemonInst {
    fn id(&self) -> CombatantId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn species(&self) -> Species {
        self.species
    }

    fn types(&self) -> &[PokemonType] {
        &self.types
    }

    fn level(&self) -> u8 {
        self.level
    }

    fn hp(&self) -> u16 {
        self.hp
    }

    fn max_hp(&self) -> u16 {
        self.stats[0]
    }

    fn take_damage(&mut self, amount: u16) -> u16 {
        let dealt = amount.min(self.hp);
        self.hp -= dealt;
        dealt
    }

    fn heal(&mut self, amount: u16) -> u16 {
        if self.is_fainted() {
            return 0;
        }
        let restored = amount.min(self.max_hp() - self.hp);
        self.hp += restored;
        restored
    }

    fn stat(&self, stat: StatType) -> u16 {
        match stat {
            StatType::Attack => self.stats[1],
            StatType::Defense => self.stats[2],
            StatType::SpAttack => self.stats[3],
            StatType::SpDefense => self.stats[4],
            StatType::Speed => self.stats[5],
            StatType::Accuracy | StatType::Evasion => 0,
        }
    }

    fn stat_stage(&self, stat: StatType) -> i8 {
        self.stat_stages[Self::stage_slot(stat)]
    }

    fn set_stat_stage(&mut self, stat: StatType, stage: i8) {
        self.stat_stages[Self::stage_slot(stat)] = stage.clamp(-6, 6);
    }

    fn reset_stat_stages(&mut self) {
        self.stat_stages = [0; STAGED_STATS];
    }

    fn status(&self) -> Option<Status> {
        self.status
    }

    fn set_status(&mut self, status: Option<Status>) {
        self.status = status;
    }

    fn tags(&self) -> &BattlerTags {
        &self.tags
    }

    fn tags_mut(&mut self) -> &mut BattlerTags {
        &mut self.tags
    }

    fn moves(&self) -> &[MoveSlot] {
        &self.moves
    }

    fn moves_mut(&mut self) -> &mut [MoveSlot] {
        &mut self.moves
    }

    fn held_items(&self) -> &[HeldItem] {
        &self.held_items
    }

    fn give_item(&mut self, item: HeldItem) {
        self.held_items.push(item);
    }

    fn take_item(&mut self, item: HeldItem) -> bool {
        match self.held_items.iter().position(|held| *held == item) {
            Some(position) => {
                self.held_items.remove(position);
                true
            }
            None => false,
        }
    }

    fn turn_data(&self) -> &TurnData {
        &self.turn_data
    }

    fn turn_data_mut(&mut self) -> &mut TurnData {
        &mut self.turn_data
    }

    fn move_history(&self) -> &[MoveHistoryEntry] {
        &self.move_history
    }

    fn push_move_history(&mut self, entry: MoveHistoryEntry) {
        self.move_history.push(entry);
    }

    fn battler_index(&self) -> Option<BattlerIndex> {
        self.battler_index
    }

    fn set_battler_index(&mut self, index: Option<BattlerIndex>) {
        self.battler_index = index;
    }

    fn turns_active(&self) -> u32 {
        self.turns_active
    }

    fn set_turns_active(&mut self, turns: u32) {
        self.turns_active = turns;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::GameData;
    use pretty_assertions::assert_eq;

    fn pikachu(level: u8) -> PokemonInst {
        let data = GameData::builtin().unwrap();
        let species = data.require_species(Species::Pikachu).unwrap();
        PokemonInst::new(1, species, level, &[Move::Thunderbolt, Move::QuickAttack], &data).unwrap()
    }

    #[test]
    fn stats_follow_level_formula() {
        let pokemon = pikachu(50);
        // Base HP 35: (70 + 15) * 50 / 100 + 50 + 10 = 102
        assert_eq!(pokemon.max_hp(), 102);
        // Base speed 90: (180 + 15) * 50 / 100 + 5 = 102
        assert_eq!(pokemon.stat(StatType::Speed), 102);
        assert_eq!(pokemon.hp(), pokemon.max_hp());
    }

    #[test]
    fn stats_at_the_top_of_the_level_range_do_not_overflow() {
        let data = GameData::builtin().unwrap();
        let snorlax = data.require_species(Species::Snorlax).unwrap();

        let pokemon = PokemonInst::new(1, snorlax, u8::MAX, &[Move::Tackle], &data).unwrap();

        // Base HP 160: (320 + 15) * 255 / 100 + 255 + 10 = 1119
        assert_eq!(pokemon.max_hp(), 1119);
        assert!(pokemon.stat(StatType::Attack) > 0);
    }

    #[test]
    fn damage_and_heal_are_clamped() {
        let mut pokemon = pikachu(20);
        let max = pokemon.max_hp();
        assert_eq!(pokemon.take_damage(10), 10);
        assert_eq!(pokemon.heal(50), 10);
        assert_eq!(pokemon.take_damage(max + 5), max);
        assert!(pokemon.is_fainted());
        assert_eq!(pokemon.heal(10), 0);
    }

    #[test]
    fn moves_take_max_pp_from_data() {
        let pokemon = pikachu(20);
        assert_eq!(pokemon.moves().len(), 2);
        assert_eq!(pokemon.moves()[0].pp, pokemon.moves()[0].max_pp);
    }

    #[test]
    fn stages_clamp_and_items_transfer() {
        let mut pokemon = pikachu(20).with_item(HeldItem::Leftovers);
        pokemon.set_stat_stage(StatType::Evasion, 9);
        assert_eq!(pokemon.stat_stage(StatType::Evasion), 6);
        assert!(pokemon.take_item(HeldItem::Leftovers));
        assert!(!pokemon.holds(HeldItem::Leftovers));
    }
}
