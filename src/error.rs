use std::path::PathBuf;

use thiserror::Error;

use crate::input::Direction;

/// Reasons a command sent to the engine was refused.
///
/// Rejections never mutate state; the caller decides whether to surface them.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
pub enum EngineError {
    #[error("boundary mode can only change while no game is running")]
    InvalidModeChange,
    #[error("cannot turn {requested:?} while heading {current:?}")]
    ReversalRejected {
        current: Direction,
        requested: Direction,
    },
    #[error("no game is running")]
    NotRunning,
    #[error("the game is paused")]
    Paused,
    #[error("the game is over; reset to play again")]
    GameOver,
    #[error(transparent)]
    Spawn(#[from] SpawnError),
}

/// Failure of the spawn planner to find a free cell.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
pub enum SpawnError {
    #[error("no free cell left on a {width}x{height} board")]
    NoSpaceAvailable { width: u16, height: u16 },
}

/// Errors raised while loading or validating an engine config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("grid must have non-zero width and height")]
    EmptyGrid,
    #[error("grid needs room for at least a snake and one food cell")]
    GridTooSmall,
    #[error(transparent)]
    Spawn(#[from] SpawnError),
    #[error("tick floor {floor_ms}ms must be non-zero and not above base interval {base_ms}ms")]
    InvalidSpeedFloor { floor_ms: u64, base_ms: u64 },
    #[error("speed steps need a non-zero point threshold and a factor above 1.0")]
    InvalidSpeedStep,
    #[error("power-up spawn delay range {min_ms}..={max_ms}ms is inverted")]
    InvertedSpawnDelay { min_ms: u64, max_ms: u64 },
    #[error("power-up growth factor {0} must be a finite non-negative number")]
    InvalidGrowthFactor(f64),
}
