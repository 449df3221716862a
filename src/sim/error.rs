//! Simulation error taxonomy
//!
//! Fatal errors (`SimError`) mean an invariant broke and the caller must halt
//! the simulation. Recoverable action rejections (`RejectReason`) are plain
//! data surfaced as no-ops plus an event, never an `Err`.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Entity category, for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Player,
    Bomb,
    Pickup,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Player => "player",
            EntityKind::Bomb => "bomb",
            EntityKind::Pickup => "pickup",
        })
    }
}

/// Fatal simulation errors
#[derive(Debug, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("tile ({x}, {y}) is outside the {width}x{height} arena")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
    #[error("{width}x{height} arena is below the {min}x{min} minimum")]
    ArenaTooSmall { width: i32, height: i32, min: i32 },
    #[error("unknown {kind} id {id}")]
    MissingEntity { kind: EntityKind, id: u32 },
    #[error("world state desynced: {0}")]
    Desync(String),
}

impl SimError {
    pub(crate) fn missing(kind: EntityKind, id: u32) -> Self {
        SimError::MissingEntity { kind, id }
    }
}

/// Why a player action was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// The player already has `max_bombs` bombs in play
    BombLimitReached,
    /// The target tile already holds a bomb or is not walkable
    TileOccupied,
    /// Dead players cannot act
    PlayerDead,
}
