//! Ruleset: every tunable the simulation reads
//!
//! Carried inside `WorldState` so a serialized world embeds the parameters
//! its replay needs.

use serde::{Deserialize, Serialize};

use crate::consts::TICK_DT;

/// Relative weights for the power-up drop table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropWeights {
    pub extra_bomb: u32,
    pub blast_radius: u32,
    pub speed: u32,
    pub bomb_pass: u32,
}

impl DropWeights {
    pub fn total(&self) -> u32 {
        self.extra_bomb + self.blast_radius + self.speed + self.bomb_pass
    }
}

impl Default for DropWeights {
    fn default() -> Self {
        Self {
            extra_bomb: 38,
            blast_radius: 38,
            speed: 19,
            bomb_pass: 5,
        }
    }
}

/// Fixed gameplay parameters for one match
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ruleset {
    /// Seconds advanced per simulation tick
    pub tick_dt: f32,
    /// Ticks from bomb placement to detonation
    pub fuse_ticks: u32,
    /// Ticks an explosion's flames stay active
    pub fire_ticks: u32,
    /// Starting simultaneous-bomb limit per player
    pub bombs_base: u32,
    /// Stacking cap for the simultaneous-bomb limit
    pub bombs_cap: u32,
    /// Starting blast radius, in tiles per direction
    pub radius_base: u32,
    /// Stacking cap for blast radius
    pub radius_cap: u32,
    /// Starting move speed, in tiles per second
    pub speed_base: f32,
    /// Stacking cap for move speed
    pub speed_cap: f32,
    /// Move speed gained per Speed pickup
    pub speed_step: f32,
    /// Percent chance a destroyed soft block drops a power-up
    pub drop_chance_pct: u32,
    pub drop_weights: DropWeights,
    /// Percent of eligible interior tiles that start as soft blocks
    pub soft_density_pct: u32,
    /// Whether living players block each other's movement
    pub players_block: bool,
}

impl Default for Ruleset {
    fn default() -> Self {
        Self {
            tick_dt: TICK_DT,
            fuse_ticks: 180,
            fire_ticks: 30,
            bombs_base: 1,
            bombs_cap: 8,
            radius_base: 2,
            radius_cap: 8,
            speed_base: 3.0,
            speed_cap: 6.0,
            speed_step: 0.5,
            drop_chance_pct: 30,
            drop_weights: DropWeights::default(),
            soft_density_pct: 55,
            players_block: false,
        }
    }
}
