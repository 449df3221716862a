//! Fixed timestep simulation step and arena generation
//!
//! `step` advances the world by exactly one tick in a fixed phase order:
//! movement, bomb placement, pickups, detonations, fire decay. Everything it
//! reads is inside `WorldState` or the intents, so identical (seed, intent
//! sequence) pairs replay bit-identically.

use serde::{Deserialize, Serialize};

use super::error::{EntityKind, RejectReason, SimError};
use super::explosion;
use super::grid::{Direction, Grid, Tile, TilePos};
use super::movement;
use super::powerup;
use super::rules::Ruleset;
use super::state::{Bomb, BombId, Event, PlayerId, WorldState};
use crate::consts::MIN_ARENA_SIDE;
use crate::tile_center;

/// One player's decoded input for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    /// Movement direction, if any
    pub dir: Option<Direction>,
    /// Place a bomb at the player's tile this tick
    pub place_bomb: bool,
}

/// Per-player intents for one tick. Players without an entry idle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickIntents {
    intents: Vec<(PlayerId, Intent)>,
}

impl TickIntents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, player: PlayerId, intent: Intent) {
        match self.intents.iter_mut().find(|(id, _)| *id == player) {
            Some(slot) => slot.1 = intent,
            None => {
                self.intents.push((player, intent));
                self.intents.sort_by_key(|(id, _)| *id);
            }
        }
    }

    pub fn get(&self, player: PlayerId) -> Intent {
        self.intents
            .iter()
            .find(|(id, _)| *id == player)
            .map(|(_, intent)| *intent)
            .unwrap_or_default()
    }
}

/// Outcome of a bomb placement attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceOutcome {
    Placed(BombId),
    Rejected(RejectReason),
}

/// Try to place a bomb at `player`'s center tile.
///
/// Rejections (limit reached, tile occupied, dead player) are recoverable
/// no-ops reported in the outcome; an unknown player id is fatal.
pub fn place_bomb(world: &mut WorldState, player: PlayerId) -> Result<PlaceOutcome, SimError> {
    let p = world
        .entities
        .player(player)
        .ok_or(SimError::missing(EntityKind::Player, player.0))?;
    if !p.alive {
        return Ok(PlaceOutcome::Rejected(RejectReason::PlayerDead));
    }
    if p.active_bombs >= p.stats.max_bombs {
        return Ok(PlaceOutcome::Rejected(RejectReason::BombLimitReached));
    }
    let pos = p.tile();
    let radius = p.stats.blast_radius;
    if world.entities.bomb_at(pos).is_some() || world.grid.tile_at(pos)? != Tile::Empty {
        return Ok(PlaceOutcome::Rejected(RejectReason::TileOccupied));
    }

    let id = BombId(world.entities.next_entity_id());
    world.entities.bombs.push(Bomb {
        id,
        owner: player,
        pos,
        radius,
        fuse_ticks: world.rules.fuse_ticks,
        armed: true,
    });
    let p = world
        .entities
        .player_mut(player)
        .ok_or(SimError::missing(EntityKind::Player, player.0))?;
    p.active_bombs += 1;
    Ok(PlaceOutcome::Placed(id))
}

/// Advance the world by one tick and return the tick's event log.
///
/// Recoverable problems become events; `Err` means an internal invariant
/// broke and the caller must halt instead of continuing with corrupt state.
pub fn step(world: &mut WorldState, intents: &TickIntents) -> Result<Vec<Event>, SimError> {
    let mut events = Vec::new();
    let ids: Vec<PlayerId> = world.entities.players.iter().map(|p| p.id).collect();

    // Phase 1a: movement, ascending player id
    for &id in &ids {
        let Some(dir) = intents.get(id).dir else {
            continue;
        };
        let to = {
            let p = world
                .entities
                .player(id)
                .ok_or(SimError::missing(EntityKind::Player, id.0))?;
            if !p.alive {
                continue;
            }
            let dist = p.stats.move_speed * world.rules.tick_dt;
            movement::resolve_move(world, p, dir, dist)
        };
        world
            .entities
            .player_mut(id)
            .ok_or(SimError::missing(EntityKind::Player, id.0))?
            .pos = to;
    }

    // Phase 1b: bomb placement at post-move positions, ascending player id
    for &id in &ids {
        if !intents.get(id).place_bomb {
            continue;
        }
        match place_bomb(world, id)? {
            PlaceOutcome::Placed(bomb) => {
                let b = world
                    .entities
                    .bombs
                    .iter()
                    .find(|b| b.id == bomb)
                    .ok_or(SimError::missing(EntityKind::Bomb, bomb.0))?;
                events.push(Event::BombPlaced {
                    bomb: b.id,
                    owner: b.owner,
                    pos: b.pos,
                });
            }
            PlaceOutcome::Rejected(reason) => {
                events.push(Event::ActionRejected { player: id, reason });
            }
        }
    }

    // Phase 2: pickups at the new positions
    powerup::resolve_pickups(world, &mut events)?;

    // Phase 3: fuses, detonations, chains, deaths
    explosion::resolve_detonations(world, &mut events)?;

    // Phase 4: fire decay; expired explosions release owner bomb slots
    explosion::decay_fire(world)?;

    world.normalize_order();
    world.tick += 1;
    Ok(events)
}

/// Generate a match-ready world from a seed, with the default ruleset.
pub fn create_world(width: i32, height: i32, layout_seed: u64) -> Result<WorldState, SimError> {
    create_world_with(width, height, layout_seed, Ruleset::default())
}

/// Generate a match-ready world from a seed.
///
/// Layout rule: a hard border ring, hard pillars at even (x, y), four
/// cleared corner spawn pockets, and soft blocks rolled per remaining tile
/// at `soft_density_pct`. Tiles are visited row-major, so the layout is a
/// pure function of (width, height, seed). Four players spawn at the corner
/// tiles, ids ascending clockwise from the top-left.
pub fn create_world_with(
    width: i32,
    height: i32,
    layout_seed: u64,
    rules: Ruleset,
) -> Result<WorldState, SimError> {
    if width < MIN_ARENA_SIDE || height < MIN_ARENA_SIDE {
        return Err(SimError::ArenaTooSmall {
            width,
            height,
            min: MIN_ARENA_SIDE,
        });
    }
    let grid = Grid::new(width, height)?;
    let mut world = WorldState::new(grid, layout_seed, rules);
    generate_layout(&mut world)?;
    for pos in spawn_tiles(width, height) {
        world.spawn_player(tile_center(pos));
    }
    world.normalize_order();
    log::info!(
        "generated {}x{} arena, {} players, seed {}",
        width,
        height,
        world.entities.players.len(),
        layout_seed
    );
    Ok(world)
}

fn generate_layout(world: &mut WorldState) -> Result<(), SimError> {
    let (w, h) = (world.grid.width(), world.grid.height());
    for y in 0..h {
        for x in 0..w {
            let pos = TilePos::new(x, y);
            let border = x == 0 || y == 0 || x == w - 1 || y == h - 1;
            let pillar = x % 2 == 0 && y % 2 == 0;
            if border || pillar {
                world.grid.set_tile(pos, Tile::HardBlock)?;
                continue;
            }
            if in_spawn_pocket(pos, w, h) {
                continue;
            }
            if world.rng.roll(100) < world.rules.soft_density_pct {
                world.grid.set_tile(pos, Tile::SoftBlock)?;
            }
        }
    }
    Ok(())
}

/// The four corner spawn tiles, in player id order
fn spawn_tiles(w: i32, h: i32) -> [TilePos; 4] {
    [
        TilePos::new(1, 1),
        TilePos::new(w - 2, 1),
        TilePos::new(w - 2, h - 2),
        TilePos::new(1, h - 2),
    ]
}

/// Spawn tiles and their orthogonal neighbors stay clear of soft blocks
fn in_spawn_pocket(pos: TilePos, w: i32, h: i32) -> bool {
    spawn_tiles(w, h)
        .iter()
        .any(|c| (pos.x - c.x).abs() + (pos.y - c.y).abs() <= 1)
}


#[cfg(test)]
mod props {
    use super::*;
    use proptest::prelude::*;

    fn arb_intent() -> impl Strategy<Value = Intent> {
        (
            proptest::option::of(prop_oneof![
                Just(Direction::Up),
                Just(Direction::Down),
                Just(Direction::Left),
                Just(Direction::Right),
            ]),
            any::<bool>(),
        )
            .prop_map(|(dir, place_bomb)| Intent { dir, place_bomb })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        // A world serialized mid-match and resumed must replay exactly like
        // the uninterrupted run. Short fuses so detonations, chains, and
        // live fire all land inside the script window.
        #[test]
        fn prop_snapshot_resume_matches_uninterrupted_run(
            seed in any::<u64>(),
            script in proptest::collection::vec((arb_intent(), arb_intent()), 20..80),
            cut in 1usize..20,
        ) {
            let rules = Ruleset {
                fuse_ticks: 8,
                fire_ticks: 3,
                ..Default::default()
            };
            let mut live = create_world_with(13, 11, seed, rules).unwrap();
            let p0 = live.entities.players[0].id;
            let p1 = live.entities.players[1].id;

            let mut snapshot = None;
            for (i, (a, b)) in script.iter().enumerate() {
                if i == cut {
                    let json = serde_json::to_string(&live).unwrap();
                    snapshot = Some(serde_json::from_str::<WorldState>(&json).unwrap());
                }
                let mut intents = TickIntents::new();
                intents.set(p0, *a);
                intents.set(p1, *b);
                step(&mut live, &intents).unwrap();
            }

            let mut resumed = snapshot.unwrap();
            for (a, b) in script.iter().skip(cut) {
                let mut intents = TickIntents::new();
                intents.set(p0, *a);
                intents.set(p1, *b);
                step(&mut resumed, &intents).unwrap();
            }
            prop_assert_eq!(live.digest(), resumed.digest());
        }
    }
}
