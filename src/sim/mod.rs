//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod error;
pub mod explosion;
pub mod grid;
pub mod movement;
pub mod powerup;
pub mod rules;
pub mod state;
pub mod tick;

pub use error::{EntityKind, RejectReason, SimError};
pub use grid::{Direction, Grid, Tile, TilePos};
pub use powerup::PowerUpKind;
pub use rules::{DropWeights, Ruleset};
pub use state::{
    Bomb, BombId, EntityStore, Event, Explosion, Flame, Inventory, Pickup, PickupId, Player,
    PlayerId, PlayerStats, RngState, WorldState,
};
pub use tick::{Intent, PlaceOutcome, TickIntents, create_world, create_world_with, place_bomb, step};
