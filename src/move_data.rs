use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::{ArenaTagType, MoveCategory, MoveTarget, PokemonType, StatType, StatusEffect, WeatherType};

bitflags! {
    /// Behavioural flags carried by a move definition.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct MoveFlags: u16 {
        const MAKES_CONTACT = 1;
        /// Passes through protection unless the protection ignores bypass.
        const IGNORE_PROTECT = 1 << 1;
        /// Every strike of a multi-hit move rolls accuracy, not just the first.
        const CHECK_ALL_HITS = 1 << 2;
        /// Unusable while Gravity is in effect.
        const GRAVITY = 1 << 3;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MultiHitKind {
    Fixed(u8),
    TwoToFive,
}

/// Which side of the field an arena effect lands on, relative to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagScope {
    User,
    Target,
    Both,
}

/// Usage conditions checked before the move executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveCondition {
    /// Only works on the user's first turn out (Fake Out, Mat Block).
    FirstTurnOnly,
    /// Chance of success falls to 1/3^n after n consecutive successes (Protect).
    ConsecutiveUse,
}

/// When a move effect fires inside the per-hit pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectTrigger {
    /// Shapes the action itself (hit count, charging, gating) and never fires per hit.
    Action,
    PreApply,
    PostApply,
    /// On-hit reactions that need damage to have landed.
    Hit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MoveEffect {
    MultiHit(MultiHitKind),
    Charge {
        semi_invulnerable: bool,
        instant_in: Option<WeatherType>,
    },
    DelayedAttack,
    Condition(MoveCondition),
    FixedDamage(u16),

    InflictStatus { status: StatusEffect, chance: u8 },
    Confuse { chance: u8 },
    Flinch { chance: u8 },
    StatChange {
        stat: StatType,
        stages: i8,
        chance: u8,
        self_target: bool,
    },

    Recoil { percent: u8 },
    /// Loses a quarter of max HP regardless of damage dealt.
    StruggleRecoil,
    Drain { percent: u8 },
    Heal { percent: u8 },
    Protect,
    LockOn,

    SetWeather(WeatherType),
    AddArenaTag {
        tag: ArenaTagType,
        turns: i32,
        side: TagScope,
    },
    RemoveArenaTags { tags: Vec<ArenaTagType>, side: TagScope },
    BreakScreens,
}

impl MoveEffect {
    pub fn trigger(&self) -> EffectTrigger {
        match self {
            MoveEffect::MultiHit(_)
            | MoveEffect::Charge { .. }
            | MoveEffect::DelayedAttack
            | MoveEffect::Condition(_)
            | MoveEffect::FixedDamage(_) => EffectTrigger::Action,
            MoveEffect::BreakScreens => EffectTrigger::PreApply,
            MoveEffect::Drain { .. } => EffectTrigger::Hit,
            _ => EffectTrigger::PostApply,
        }
    }

    /// Whether the effect acts on the user (or the user's side) rather than the target.
    pub fn is_self_targeted(&self) -> bool {
        match self {
            MoveEffect::StatChange { self_target, .. } => *self_target,
            MoveEffect::Recoil { .. }
            | MoveEffect::StruggleRecoil
            | MoveEffect::Drain { .. }
            | MoveEffect::Heal { .. }
            | MoveEffect::Protect
            | MoveEffect::LockOn
            | MoveEffect::SetWeather(_)
            | MoveEffect::AddArenaTag { .. }
            | MoveEffect::RemoveArenaTags { .. } => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveData {
    pub name: String,
    pub move_type: PokemonType,
    pub category: MoveCategory,
    pub power: Option<u8>,
    /// `None` never misses.
    pub accuracy: Option<u8>,
    pub max_pp: u8,
    #[serde(default)]
    pub priority: i8,
    pub target: MoveTarget,
    #[serde(default)]
    pub flags: MoveFlags,
    #[serde(default)]
    pub effects: Vec<MoveEffect>,
}

impl MoveData {
    pub fn is_damaging(&self) -> bool {
        self.category != MoveCategory::Status
    }

    pub fn has_flag(&self, flag: MoveFlags) -> bool {
        self.flags.contains(flag)
    }

    pub fn multi_hit(&self) -> Option<MultiHitKind> {
        self.effects.iter().find_map(|effect| match effect {
            MoveEffect::MultiHit(kind) => Some(*kind),
            _ => None,
        })
    }

    /// Returns `(semi_invulnerable, instant_in)` for two-turn moves.
    pub fn charge(&self) -> Option<(bool, Option<WeatherType>)> {
        self.effects.iter().find_map(|effect| match effect {
            MoveEffect::Charge {
                semi_invulnerable,
                instant_in,
            } => Some((*semi_invulnerable, *instant_in)),
            _ => None,
        })
    }

    pub fn is_delayed_attack(&self) -> bool {
        self.effects.contains(&MoveEffect::DelayedAttack)
    }

    pub fn fixed_damage(&self) -> Option<u16> {
        self.effects.iter().find_map(|effect| match effect {
            MoveEffect::FixedDamage(amount) => Some(*amount),
            _ => None,
        })
    }

    pub fn conditions(&self) -> impl Iterator<Item = MoveCondition> + '_ {
        self.effects.iter().filter_map(|effect| match effect {
            MoveEffect::Condition(condition) => Some(*condition),
            _ => None,
        })
    }

    /// Status moves whose whole point is a guaranteed status; these fail outright
    /// when the status cannot take hold.
    pub fn primary_status(&self) -> Option<StatusEffect> {
        if self.is_damaging() {
            return None;
        }
        self.effects.iter().find_map(|effect| match effect {
            MoveEffect::InflictStatus {
                status,
                chance: 100,
            } => Some(*status),
            _ => None,
        })
    }

    pub fn effects_with(&self, trigger: EffectTrigger) -> impl Iterator<Item = &MoveEffect> + '_ {
        self.effects
            .iter()
            .filter(move |effect| effect.trigger() == trigger)
    }
}
