use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter)]
pub enum Move {
    // Damaging
    Tackle,
    Scratch,
    QuickAttack,
    FakeOut,
    DoubleKick,
    FuryAttack,
    BulletSeed,
    Ember,
    Flamethrower,
    WaterGun,
    Surf,
    Thunderbolt,
    ZapCannon,
    Earthquake,
    RockSlide,
    Swift,
    Psychic,
    IceBeam,
    ShadowBall,
    DrainPunch,
    DoubleEdge,
    BrickBreak,
    RapidSpin,
    SolarBeam,
    Fly,
    FutureSight,
    Struggle,
    // Status
    ThunderWave,
    Toxic,
    Hypnosis,
    ConfuseRay,
    SwordsDance,
    Growl,
    SandAttack,
    DoubleTeam,
    Recover,
    Splash,
    LockOn,
    Protect,
    // Field
    Spikes,
    ToxicSpikes,
    StealthRock,
    StickyWeb,
    Reflect,
    LightScreen,
    AuroraVeil,
    Mist,
    Safeguard,
    LuckyChant,
    MudSport,
    WaterSport,
    IonDeluge,
    Gravity,
    TrickRoom,
    WonderRoom,
    MagicRoom,
    Tailwind,
    QuickGuard,
    WideGuard,
    MatBlock,
    CraftyShield,
    SunnyDay,
    RainDance,
    Sandstorm,
    Hail,
}
