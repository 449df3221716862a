//! Grid-aligned movement and collision resolution
//!
//! Pure functions over the world state: the orchestrator applies the
//! returned positions. Movement is continuous along one axis per tick;
//! collision is resolved against the cells the body's leading edge would
//! enter, and blocked motion is clamped exactly to the cell boundary.

use glam::Vec2;

use super::grid::{Direction, TilePos};
use super::state::{Player, WorldState};
use crate::consts::{COLLISION_EPS, PLAYER_HALF_EXTENT};

/// Whether `cell` blocks `mover`.
///
/// Solid tiles always block. A bomb blocks unless the mover's body still
/// overlaps its tile (you can leave a bomb just placed under your feet, but
/// not re-enter it) or the mover holds bomb-pass. Other living players block
/// only under the player-blocking rule.
pub fn is_blocked(world: &WorldState, mover: &Player, cell: TilePos) -> bool {
    if world.grid.is_solid(cell) {
        return true;
    }
    if world.entities.bomb_at(cell).is_some()
        && !body_overlaps_tile(mover.pos, cell)
        && !mover.has_bomb_pass()
    {
        return true;
    }
    if world.rules.players_block
        && world
            .entities
            .players
            .iter()
            .any(|p| p.alive && p.id != mover.id && p.tile() == cell)
    {
        return true;
    }
    false
}

/// Compute the post-move position for one movement intent.
///
/// Steps are well under a tile at the speed cap, so testing the single cell
/// layer the leading edge lands in is sufficient.
pub fn resolve_move(world: &WorldState, mover: &Player, dir: Direction, dist: f32) -> Vec2 {
    if dist <= 0.0 {
        return mover.pos;
    }
    let half = PLAYER_HALF_EXTENT;
    let mut target = mover.pos + dir.vec() * dist;

    // Tile row/column the leading edge lands in
    let lead = match dir {
        Direction::Up => (target.y - half).floor() as i32,
        Direction::Down => (target.y + half).floor() as i32,
        Direction::Left => (target.x - half).floor() as i32,
        Direction::Right => (target.x + half).floor() as i32,
    };
    // Rows/columns the body spans laterally, shrunk so edge touches don't count
    let (span_lo, span_hi) = match dir {
        Direction::Up | Direction::Down => (
            (target.x - half + COLLISION_EPS).floor() as i32,
            (target.x + half - COLLISION_EPS).floor() as i32,
        ),
        Direction::Left | Direction::Right => (
            (target.y - half + COLLISION_EPS).floor() as i32,
            (target.y + half - COLLISION_EPS).floor() as i32,
        ),
    };

    let blocked = (span_lo..=span_hi).any(|lat| {
        let cell = match dir {
            Direction::Up | Direction::Down => TilePos::new(lat, lead),
            Direction::Left | Direction::Right => TilePos::new(lead, lat),
        };
        is_blocked(world, mover, cell)
    });
    if !blocked {
        return target;
    }

    // Snap the leading edge onto the blocked cell's near boundary
    match dir {
        Direction::Up => target.y = (lead + 1) as f32 + half,
        Direction::Down => target.y = lead as f32 - half,
        Direction::Left => target.x = (lead + 1) as f32 + half,
        Direction::Right => target.x = lead as f32 - half,
    }
    target
}

/// True if the body square at `center` overlaps the unit tile at `tile`
#[inline]
fn body_overlaps_tile(center: Vec2, tile: TilePos) -> bool {
    let half = PLAYER_HALF_EXTENT;
    let (tx, ty) = (tile.x as f32, tile.y as f32);
    center.x + half > tx + COLLISION_EPS
        && center.x - half < tx + 1.0 - COLLISION_EPS
        && center.y + half > ty + COLLISION_EPS
        && center.y - half < ty + 1.0 - COLLISION_EPS
}
