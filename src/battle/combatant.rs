//! The capability contract the battle core needs from a combatant.
//!
//! The engine never reaches into a concrete creature model; it talks to
//! `dyn Combatant`. `crate::pokemon::PokemonInst` is the bundled implementation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::battle::battler_tags::BattlerTags;
use crate::{ArenaTagSide, HeldItem, Move, PokemonType, Species, StatType, StatusEffect};

/// Stable side-qualified slot address on the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BattlerIndex {
    Player,
    Player2,
    Enemy,
    Enemy2,
}

impl BattlerIndex {
    pub const ALL: [BattlerIndex; 4] = [
        BattlerIndex::Player,
        BattlerIndex::Player2,
        BattlerIndex::Enemy,
        BattlerIndex::Enemy2,
    ];

    pub fn side(self) -> Side {
        match self {
            BattlerIndex::Player | BattlerIndex::Player2 => Side::Player,
            BattlerIndex::Enemy | BattlerIndex::Enemy2 => Side::Enemy,
        }
    }

    /// Position within the side: 0 for the lead slot, 1 for the partner slot.
    pub fn slot(self) -> usize {
        match self {
            BattlerIndex::Player | BattlerIndex::Enemy => 0,
            BattlerIndex::Player2 | BattlerIndex::Enemy2 => 1,
        }
    }

    pub fn from_side_slot(side: Side, slot: usize) -> Option<BattlerIndex> {
        match (side, slot) {
            (Side::Player, 0) => Some(BattlerIndex::Player),
            (Side::Player, 1) => Some(BattlerIndex::Player2),
            (Side::Enemy, 0) => Some(BattlerIndex::Enemy),
            (Side::Enemy, 1) => Some(BattlerIndex::Enemy2),
            _ => None,
        }
    }

    pub fn is_opponent_of(self, other: BattlerIndex) -> bool {
        self.side() != other.side()
    }
}

impl fmt::Display for BattlerIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_name = match self {
            BattlerIndex::Player => "player slot 1",
            BattlerIndex::Player2 => "player slot 2",
            BattlerIndex::Enemy => "enemy slot 1",
            BattlerIndex::Enemy2 => "enemy slot 2",
        };
        write!(f, "{}", display_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    Player,
    Enemy,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Player => Side::Enemy,
            Side::Enemy => Side::Player,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Side::Player => 0,
            Side::Enemy => 1,
        }
    }

    pub fn tag_side(self) -> ArenaTagSide {
        match self {
            Side::Player => ArenaTagSide::Player,
            Side::Enemy => ArenaTagSide::Enemy,
        }
    }
}

/// Unique per-battle identity. Survives switching, unlike `BattlerIndex`.
pub type CombatantId = u32;

/// A non-volatile status and its counter.
///
/// `turn_count` is the remaining sleep duration for `Sleep` and the escalation
/// step for `Toxic`; other statuses leave it at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub effect: StatusEffect,
    pub turn_count: u8,
}

impl Status {
    pub fn new(effect: StatusEffect) -> Self {
        Self {
            effect,
            turn_count: 0,
        }
    }

    /// Poison, toxic and burn deal damage at the end of every turn.
    pub fn is_damaging(&self) -> bool {
        matches!(
            self.effect,
            StatusEffect::Poison | StatusEffect::Toxic | StatusEffect::Burn
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveSlot {
    pub move_: Move,
    pub pp: u8,
    pub max_pp: u8,
}

impl MoveSlot {
    pub fn new(move_: Move, max_pp: u8) -> Self {
        Self {
            move_,
            pp: max_pp,
            max_pp,
        }
    }

    /// Spends one PP. Returns false when the slot is already empty.
    pub fn use_pp(&mut self) -> bool {
        if self.pp > 0 {
            self.pp -= 1;
            true
        } else {
            false
        }
    }
}

/// Per-turn scratch data, reset every `TurnInit`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnData {
    /// Strikes landed by the current action.
    pub hit_count: u8,
    /// Strikes still to run; `None` outside a move action.
    pub hits_left: Option<u8>,
    pub damage_dealt: u32,
    pub damage_taken: u32,
    pub acted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveResult {
    Success,
    Miss,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveHistoryEntry {
    pub move_: Move,
    pub targets: Vec<BattlerIndex>,
    pub result: MoveResult,
    /// Executed by the engine rather than chosen (delayed attacks).
    pub is_virtual: bool,
}

pub trait Combatant: fmt::Debug {
    fn id(&self) -> CombatantId;
    fn name(&self) -> &str;
    fn species(&self) -> Species;
    fn types(&self) -> &[PokemonType];
    fn level(&self) -> u8;

    fn hp(&self) -> u16;
    fn max_hp(&self) -> u16;
    /// Removes up to `amount` HP and returns what was actually taken.
    fn take_damage(&mut self, amount: u16) -> u16;
    /// Restores up to `amount` HP and returns what was actually restored.
    fn heal(&mut self, amount: u16) -> u16;

    /// Raw stat before stages. `Accuracy` and `Evasion` have no raw value.
    fn stat(&self, stat: StatType) -> u16;
    fn stat_stage(&self, stat: StatType) -> i8;
    fn set_stat_stage(&mut self, stat: StatType, stage: i8);
    fn reset_stat_stages(&mut self);

    fn status(&self) -> Option<Status>;
    fn set_status(&mut self, status: Option<Status>);

    fn tags(&self) -> &BattlerTags;
    fn tags_mut(&mut self) -> &mut BattlerTags;

    fn moves(&self) -> &[MoveSlot];
    fn moves_mut(&mut self) -> &mut [MoveSlot];

    fn held_items(&self) -> &[HeldItem];
    fn give_item(&mut self, item: HeldItem);
    /// Removes one copy of `item`. Returns false if it was not held.
    fn take_item(&mut self, item: HeldItem) -> bool;

    fn turn_data(&self) -> &TurnData;
    fn turn_data_mut(&mut self) -> &mut TurnData;

    fn move_history(&self) -> &[MoveHistoryEntry];
    fn push_move_history(&mut self, entry: MoveHistoryEntry);

    fn battler_index(&self) -> Option<BattlerIndex>;
    fn set_battler_index(&mut self, index: Option<BattlerIndex>);

    /// Turns started since this combatant was last sent out.
    fn turns_active(&self) -> u32;
    fn set_turns_active(&mut self, turns: u32);

    fn is_fainted(&self) -> bool {
        self.hp() == 0
    }

    fn is_active(&self) -> bool {
        self.battler_index().is_some() && !self.is_fainted()
    }

    fn side(&self) -> Option<Side> {
        self.battler_index().map(BattlerIndex::side)
    }

    fn has_type(&self, pokemon_type: PokemonType) -> bool {
        self.types().contains(&pokemon_type)
    }

    fn holds(&self, item: HeldItem) -> bool {
        self.held_items().contains(&item)
    }

    /// Grounded ignoring field effects; Gravity grounds everything on top of this.
    fn is_grounded(&self) -> bool {
        !self.has_type(PokemonType::Flying)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn battler_index_round_trips_through_side_and_slot() {
        for index in BattlerIndex::ALL {
            assert_eq!(
                BattlerIndex::from_side_slot(index.side(), index.slot()),
                Some(index)
            );
        }
        assert_eq!(BattlerIndex::from_side_slot(Side::Enemy, 2), None);
    }

    #[test]
    fn opponents_are_on_the_other_side() {
        assert!(BattlerIndex::Player.is_opponent_of(BattlerIndex::Enemy2));
        assert!(!BattlerIndex::Player.is_opponent_of(BattlerIndex::Player2));
        assert_eq!(Side::Player.opponent(), Side::Enemy);
    }

    #[test]
    fn empty_slot_cannot_spend_pp() {
        let mut slot = MoveSlot::new(Move::Tackle, 1);
        assert!(slot.use_pp());
        assert!(!slot.use_pp());
        assert_eq!(slot.pp, 0);
    }
}
