//! Battle configuration, loaded from RON.
//!
//! Every field carries a default so a config file only needs to name what it
//! changes:
//!
//! ```ron
//! (seed: 42, format: Double, kind: Trainer)
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{ConfigError, ConfigResult};
use crate::logging::LogConfig;
use crate::{HeldItem, Move, Species};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BattleFormat {
    #[default]
    Single,
    Double,
}

impl BattleFormat {
    pub fn active_slots(self) -> usize {
        match self {
            BattleFormat::Single => 1,
            BattleFormat::Double => 2,
        }
    }
}

/// Wild battles allow capture and escape; trainer battles do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BattleKind {
    #[default]
    Wild,
    Trainer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Seed for the battle RNG; a fixed seed replays a fixed battle.
    pub seed: u64,
    pub format: BattleFormat,
    pub kind: BattleKind,
    /// The battle is called a draw once this many turns have been played.
    pub max_turns: u32,
    pub poke_balls: u8,
    /// Critical hits land with probability 1 / `crit_rate_denominator`.
    pub crit_rate_denominator: u32,
    pub screen_multiplier_single: f64,
    pub screen_multiplier_double: f64,
    /// Consecutive illegal selections tolerated before the NPC fallback picks.
    pub max_command_retries: u8,
    pub log: LogConfig,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            format: BattleFormat::Single,
            kind: BattleKind::Wild,
            max_turns: 200,
            poke_balls: 5,
            crit_rate_denominator: 24,
            screen_multiplier_single: 0.5,
            screen_multiplier_double: 2732.0 / 4096.0,
            max_command_retries: 3,
            log: LogConfig::default(),
        }
    }
}

impl BattleConfig {
    pub fn from_ron_str(source: &str) -> ConfigResult<Self> {
        let config: BattleConfig = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> ConfigResult<Self> {
        let source = read_file(path)?;
        Self::from_ron_str(&source)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_turns == 0 {
            return Err(ConfigError::Invalid {
                field: "max_turns",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.crit_rate_denominator == 0 {
            return Err(ConfigError::Invalid {
                field: "crit_rate_denominator",
                reason: "must be at least 1".to_string(),
            });
        }
        for (field, value) in [
            ("screen_multiplier_single", self.screen_multiplier_single),
            ("screen_multiplier_double", self.screen_multiplier_double),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{value} is outside 0.0..=1.0"),
                });
            }
        }
        Ok(())
    }

    pub fn is_double(&self) -> bool {
        self.format == BattleFormat::Double
    }

    pub fn screen_multiplier(&self) -> f64 {
        match self.format {
            BattleFormat::Single => self.screen_multiplier_single,
            BattleFormat::Double => self.screen_multiplier_double,
        }
    }
}

pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 100;

/// One party member as written in a setup file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMemberSpec {
    pub species: Species,
    pub level: u8,
    pub moves: Vec<Move>,
    #[serde(default)]
    pub held_item: Option<HeldItem>,
}

/// A full battle description: configuration plus both teams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleSetup {
    #[serde(default)]
    pub config: BattleConfig,
    pub player_team: Vec<TeamMemberSpec>,
    pub enemy_team: Vec<TeamMemberSpec>,
}

impl BattleSetup {
    pub fn from_ron_str(source: &str) -> ConfigResult<Self> {
        let setup: BattleSetup = ron::from_str(source)?;
        setup.config.validate()?;
        for (field, team) in [
            ("player_team", &setup.player_team),
            ("enemy_team", &setup.enemy_team),
        ] {
            if team.is_empty() {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "a team needs at least one member".to_string(),
                });
            }
            if let Some(member) = team.iter().find(|m| !(MIN_LEVEL..=MAX_LEVEL).contains(&m.level)) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!(
                        "{:?} is level {}, outside {MIN_LEVEL}..={MAX_LEVEL}",
                        member.species, member.level
                    ),
                });
            }
            if let Some(member) = team.iter().find(|m| m.moves.is_empty() || m.moves.len() > 4) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{:?} must know between one and four moves", member.species),
                });
            }
        }
        Ok(setup)
    }

    pub fn load(path: &Path) -> ConfigResult<Self> {
        let source = read_file(path)?;
        Self::from_ron_str(&source)
    }
}

fn read_file(path: &Path) -> ConfigResult<String> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}
