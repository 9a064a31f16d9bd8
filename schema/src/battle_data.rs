use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{EnumIter, IntoStaticStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter)]
pub enum StatType {
    Attack,
    Defense,
    SpAttack,
    SpDefense,
    Speed,
    Accuracy,
    Evasion,
}

impl fmt::Display for StatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_name = match self {
            StatType::Attack => "Attack",
            StatType::Defense => "Defense",
            StatType::SpAttack => "Sp. Atk",
            StatType::SpDefense => "Sp. Def",
            StatType::Speed => "Speed",
            StatType::Accuracy => "accuracy",
            StatType::Evasion => "evasiveness",
        };
        write!(f, "{}", display_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveCategory {
    Physical,
    Special,
    Status,
}

/// Who a move is aimed at when it is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveTarget {
    User,
    NearEnemy,
    RandomNearEnemy,
    AllNearEnemies,
    AllNearOthers,
    NearAlly,
    UserSide,
    EnemySide,
    BothSides,
}

impl MoveTarget {
    pub fn is_multi_target(self) -> bool {
        matches!(self, MoveTarget::AllNearEnemies | MoveTarget::AllNearOthers)
    }

    /// Moves that land on a side of the field rather than on a combatant.
    pub fn is_field_target(self) -> bool {
        matches!(
            self,
            MoveTarget::UserSide | MoveTarget::EnemySide | MoveTarget::BothSides
        )
    }

    /// Moves that never leave the user's own side.
    pub fn is_ally_target(self) -> bool {
        matches!(
            self,
            MoveTarget::User | MoveTarget::NearAlly | MoveTarget::UserSide
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, IntoStaticStr)]
pub enum StatusEffect {
    Poison,
    Toxic,
    Paralysis,
    Sleep,
    Freeze,
    Burn,
}

impl fmt::Display for StatusEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_name = match self {
            StatusEffect::Poison => "poisoned",
            StatusEffect::Toxic => "badly poisoned",
            StatusEffect::Paralysis => "paralyzed",
            StatusEffect::Sleep => "asleep",
            StatusEffect::Freeze => "frozen",
            StatusEffect::Burn => "burned",
        };
        write!(f, "{}", display_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeatherType {
    Sunny,
    Rain,
    Sandstorm,
    Hail,
    HarshSun,
    HeavyRain,
}

impl fmt::Display for WeatherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_name = match self {
            WeatherType::Sunny => "harsh sunlight",
            WeatherType::Rain => "rain",
            WeatherType::Sandstorm => "sandstorm",
            WeatherType::Hail => "hail",
            WeatherType::HarshSun => "extremely harsh sunlight",
            WeatherType::HeavyRain => "heavy rain",
        };
        write!(f, "{}", display_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeldItem {
    Leftovers,
    KingsRock,
    GripClaw,
    ShellBell,
}

impl fmt::Display for HeldItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_name = match self {
            HeldItem::Leftovers => "Leftovers",
            HeldItem::KingsRock => "King's Rock",
            HeldItem::GripClaw => "Grip Claw",
            HeldItem::ShellBell => "Shell Bell",
        };
        write!(f, "{}", display_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Biome {
    #[default]
    Plains,
    Cave,
    Sea,
    Volcano,
    Mountain,
}

/// Every kind of field effect the arena knows how to build.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, IntoStaticStr,
)]
pub enum ArenaTagType {
    Mist,
    Safeguard,
    NoCrit,
    Reflect,
    LightScreen,
    AuroraVeil,
    QuickGuard,
    WideGuard,
    MatBlock,
    CraftyShield,
    MudSport,
    WaterSport,
    IonDeluge,
    Spikes,
    ToxicSpikes,
    StealthRock,
    StickyWeb,
    Gravity,
    TrickRoom,
    WonderRoom,
    MagicRoom,
    Tailwind,
    FireGrassPledge,
    WaterFirePledge,
    GrassWaterPledge,
    DelayedAttack,
}

impl fmt::Display for ArenaTagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_name = match self {
            ArenaTagType::NoCrit => "Lucky Chant",
            ArenaTagType::LightScreen => "Light Screen",
            ArenaTagType::AuroraVeil => "Aurora Veil",
            ArenaTagType::QuickGuard => "Quick Guard",
            ArenaTagType::WideGuard => "Wide Guard",
            ArenaTagType::MatBlock => "Mat Block",
            ArenaTagType::CraftyShield => "Crafty Shield",
            ArenaTagType::MudSport => "Mud Sport",
            ArenaTagType::WaterSport => "Water Sport",
            ArenaTagType::IonDeluge => "Ion Deluge",
            ArenaTagType::ToxicSpikes => "Toxic Spikes",
            ArenaTagType::StealthRock => "Stealth Rock",
            ArenaTagType::StickyWeb => "Sticky Web",
            ArenaTagType::TrickRoom => "Trick Room",
            ArenaTagType::WonderRoom => "Wonder Room",
            ArenaTagType::MagicRoom => "Magic Room",
            ArenaTagType::FireGrassPledge => "sea of fire",
            ArenaTagType::WaterFirePledge => "rainbow",
            ArenaTagType::GrassWaterPledge => "swamp",
            ArenaTagType::DelayedAttack => "delayed attack",
            other => other.into(),
        };
        write!(f, "{}", display_name)
    }
}

/// The part of the field a tag covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArenaTagSide {
    Both,
    Player,
    Enemy,
}

impl ArenaTagSide {
    /// Both-sided scopes match everything; otherwise the sides must agree.
    pub fn overlaps(self, other: ArenaTagSide) -> bool {
        self == ArenaTagSide::Both || other == ArenaTagSide::Both || self == other
    }
}

impl fmt::Display for ArenaTagSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_name = match self {
            ArenaTagSide::Both => "the field",
            ArenaTagSide::Player => "your team",
            ArenaTagSide::Enemy => "the opposing team",
        };
        write!(f, "{}", display_name)
    }
}
