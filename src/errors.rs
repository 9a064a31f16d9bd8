use std::path::PathBuf;

use thiserror::Error;

use crate::battle::combatant::{BattlerIndex, Side};
use crate::{Move, Species};

/// Main error type for the battle engine.
#[derive(Debug, Error)]
pub enum BattleEngineError {
    /// Content table lookup or loading failed
    #[error(transparent)]
    Data(#[from] DataError),
    /// Battle configuration could not be loaded or is invalid
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A chosen turn command was rejected
    #[error(transparent)]
    Command(#[from] CommandError),
    /// The battle state does not match what a phase expected
    #[error(transparent)]
    BattleState(#[from] BattleStateError),
}

/// Errors raised by the move and species tables.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("move not found: {0:?}")]
    MoveNotFound(Move),

    #[error("species not found: {0:?}")]
    SpeciesNotFound(Species),

    #[error("failed to parse {table} table: {source}")]
    Parse {
        table: &'static str,
        #[source]
        source: ron::error::SpannedError,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while loading a battle configuration or setup file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Reasons a turn command is refused before it is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("{battler:?} has no move in slot {index}")]
    NoSuchMove { battler: BattlerIndex, index: usize },

    #[error("{battler:?} has no PP left for {move_:?}")]
    MoveDepleted { battler: BattlerIndex, move_: Move },

    #[error("{battler:?} cannot switch to party slot {party_index}")]
    InvalidSwitch {
        battler: BattlerIndex,
        party_index: usize,
    },

    #[error("{battler:?} still has moves with PP and cannot struggle")]
    MovesRemaining { battler: BattlerIndex },

    #[error("there is no escaping from a trainer battle")]
    CannotFlee,

    #[error("capture is not possible here")]
    CannotCapture,

    #[error("no Poke Balls left")]
    NoBallsLeft,

    #[error("no combatant at {0:?}")]
    NoCombatant(BattlerIndex),
}

/// Errors for battle state that cannot be interpreted.
#[derive(Debug, Error)]
pub enum BattleStateError {
    #[error("no combatant at {0:?}")]
    MissingCombatant(BattlerIndex),

    #[error("{0:?} side has no party members")]
    EmptyParty(Side),

    #[error("scheduler is blocked on a presentation step that never completes")]
    Stalled,
}

pub type BattleResult<T> = Result<T, BattleEngineError>;
pub type DataResult<T> = Result<T, DataError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
