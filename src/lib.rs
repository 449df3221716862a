//! Blastzone - a deterministic grid-arena bomb game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (arena, movement, explosions, power-ups)
//!
//! Rendering, input polling, audio, and networking are external concerns.
//! Callers feed per-tick [`sim::TickIntents`] into [`sim::step`] and consume
//! the returned [`sim::Event`] log.

pub mod sim;

pub use sim::{Event, Intent, SimError, TickIntents, WorldState, create_world, step};

use glam::Vec2;
use sim::TilePos;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const TICK_DT: f32 = 1.0 / 60.0;

    /// Half the side of a player's square body, in tile units
    pub const PLAYER_HALF_EXTENT: f32 = 0.4;
    /// Slack subtracted from the body span when probing lateral cells,
    /// so a body flush against a wall does not read as inside it
    pub const COLLISION_EPS: f32 = 1e-4;

    /// Smallest arena side that fits the border, pillars, and spawn pockets
    pub const MIN_ARENA_SIDE: i32 = 7;
}

/// Tile containing a continuous position
#[inline]
pub fn tile_of(pos: Vec2) -> TilePos {
    TilePos::new(pos.x.floor() as i32, pos.y.floor() as i32)
}

/// Center of a tile in continuous coordinates
#[inline]
pub fn tile_center(pos: TilePos) -> Vec2 {
    Vec2::new(pos.x as f32 + 0.5, pos.y as f32 + 0.5)
}
