use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::Move;

/// Volatile conditions attached to one combatant; dropped when it leaves the field.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum BattlerTag {
    /// Blocks incoming moves for the rest of the turn.
    Protected,
    Flinched,
    Confused {
        turns_remaining: u8,
    }, // Counts down each time the combatant tries to act
    /// First turn of a two-turn move; the move is released next turn.
    Charging {
        move_: Move,
    },
    /// Out of reach (Fly); incoming moves miss.
    SemiInvulnerable,
    /// Lock-On: the next move against the recorded target cannot miss.
    IgnoreAccuracy {
        turns_remaining: u8,
    },
}

impl Hash for BattlerTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Hash only the discriminant (variant), not the data
        std::mem::discriminant(self).hash(state);
    }
}

impl Eq for BattlerTag {}

/// Tag kind without data payload, used for lookups and removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BattlerTagType {
    Protected,
    Flinched,
    Confused,
    Charging,
    SemiInvulnerable,
    IgnoreAccuracy,
}

impl BattlerTag {
    pub fn get_type(&self) -> BattlerTagType {
        match self {
            BattlerTag::Protected => BattlerTagType::Protected,
            BattlerTag::Flinched => BattlerTagType::Flinched,
            BattlerTag::Confused { .. } => BattlerTagType::Confused,
            BattlerTag::Charging { .. } => BattlerTagType::Charging,
            BattlerTag::SemiInvulnerable => BattlerTagType::SemiInvulnerable,
            BattlerTag::IgnoreAccuracy { .. } => BattlerTagType::IgnoreAccuracy,
        }
    }

    /// End-of-turn tick. Returns false when the tag should be dropped.
    fn lapse(&mut self) -> bool {
        match self {
            BattlerTag::Protected | BattlerTag::Flinched => false,
            BattlerTag::IgnoreAccuracy { turns_remaining } => {
                *turns_remaining = turns_remaining.saturating_sub(1);
                *turns_remaining > 0
            }
            // Confusion counts down on action; charging ends when the move fires.
            BattlerTag::Confused { .. }
            | BattlerTag::Charging { .. }
            | BattlerTag::SemiInvulnerable => true,
        }
    }
}

/// A combatant's volatile tags, at most one per kind.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct BattlerTags {
    tags: BTreeMap<BattlerTagType, BattlerTag>,
}

impl BattlerTags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tag, replacing any existing tag of the same kind.
    pub fn add(&mut self, tag: BattlerTag) {
        self.tags.insert(tag.get_type(), tag);
    }

    pub fn has(&self, tag_type: BattlerTagType) -> bool {
        self.tags.contains_key(&tag_type)
    }

    pub fn get(&self, tag_type: BattlerTagType) -> Option<&BattlerTag> {
        self.tags.get(&tag_type)
    }

    pub fn get_mut(&mut self, tag_type: BattlerTagType) -> Option<&mut BattlerTag> {
        self.tags.get_mut(&tag_type)
    }

    pub fn remove(&mut self, tag_type: BattlerTagType) -> Option<BattlerTag> {
        self.tags.remove(&tag_type)
    }

    pub fn clear(&mut self) {
        self.tags.clear();
    }

    /// The move being charged, if any.
    pub fn charging_move(&self) -> Option<Move> {
        match self.tags.get(&BattlerTagType::Charging) {
            Some(BattlerTag::Charging { move_ }) => Some(*move_),
            _ => None,
        }
    }

    /// Ticks every tag at turn end and returns the kinds that expired.
    pub fn lapse_all(&mut self) -> Vec<BattlerTagType> {
        let mut expired = Vec::new();
        self.tags.retain(|tag_type, tag| {
            let keep = tag.lapse();
            if !keep {
                expired.push(*tag_type);
            }
            keep
        });
        expired
    }

    pub fn iter(&self) -> impl Iterator<Item = &BattlerTag> {
        self.tags.values()
    }
}
