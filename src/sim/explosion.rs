//! Detonation rays, chain reactions, and fire lifetime
//!
//! Rays walk the four directions in fixed order and stop exclusive at hard
//! blocks, inclusive after the first soft block. A ray touching another bomb
//! forces its fuse to zero; the victim detonates on the next tick, never the
//! same one, so chains fan out as a wave over successive ticks.

use super::error::{EntityKind, SimError};
use super::grid::{Direction, Tile, TilePos};
use super::powerup;
use super::state::{BombId, Event, Explosion, Flame, PlayerId, WorldState};

/// Advance fuses and resolve this tick's detonations, in ascending bomb id
/// order. Also marks players standing in any active fire dead.
pub fn resolve_detonations(world: &mut WorldState, events: &mut Vec<Event>) -> Result<(), SimError> {
    let mut ready: Vec<BombId> = Vec::new();
    for bomb in &mut world.entities.bombs {
        if !bomb.armed {
            continue;
        }
        if bomb.fuse_ticks == 0 {
            // Forced by a chain on a previous tick
            ready.push(bomb.id);
        } else {
            bomb.fuse_ticks -= 1;
            if bomb.fuse_ticks == 0 {
                ready.push(bomb.id);
            }
        }
    }

    for id in ready {
        detonate(world, id, events)?;
    }

    check_flame_deaths(world, events);
    Ok(())
}

fn detonate(world: &mut WorldState, id: BombId, events: &mut Vec<Event>) -> Result<(), SimError> {
    let idx = world
        .entities
        .bombs
        .iter()
        .position(|b| b.id == id)
        .ok_or(SimError::missing(EntityKind::Bomb, id.0))?;
    let bomb = world.entities.bombs.remove(idx);

    events.push(Event::BombDetonated {
        bomb: bomb.id,
        owner: bomb.owner,
        pos: bomb.pos,
    });

    let mut flames = vec![Flame {
        pos: bomb.pos,
        dir: None,
        dist: 0,
    }];

    for dir in Direction::ALL {
        let mut cur = bomb.pos;
        for dist in 1..=bomb.radius {
            cur = cur.step(dir);
            let Some(tile) = world.grid.get(cur) else {
                break;
            };
            if tile == Tile::HardBlock {
                break;
            }

            flames.push(Flame {
                pos: cur,
                dir: Some(dir),
                dist,
            });

            if let Some(victim) = world.entities.bombs.iter_mut().find(|b| b.pos == cur) {
                victim.fuse_ticks = 0;
                victim.armed = true;
                break;
            }
            if tile == Tile::SoftBlock {
                destroy_soft_block(world, cur, bomb.id, events)?;
                break;
            }
            if let Tile::PowerUp(_) = tile {
                // Flames burn loot through; the ray continues
                world.take_pickup_at(cur)?;
            }
        }
    }

    world.explosions.push(Explosion {
        origin: bomb.id,
        owner: bomb.owner,
        flames,
        ttl_ticks: world.rules.fire_ticks.max(1),
    });
    Ok(())
}

fn destroy_soft_block(
    world: &mut WorldState,
    pos: TilePos,
    by: BombId,
    events: &mut Vec<Event>,
) -> Result<(), SimError> {
    events.push(Event::TileDestroyed { pos, by });
    match powerup::roll_drop(&mut world.rng, &world.rules) {
        Some(kind) => {
            let pickup = world.spawn_pickup(kind, pos)?;
            events.push(Event::PowerUpSpawned { pickup, kind, pos });
        }
        None => world.grid.set_tile(pos, Tile::Empty)?,
    }
    Ok(())
}

/// Mark every living player whose center tile is under active fire dead.
/// Runs after detonations, so it also catches players who walked into
/// standing fire this tick.
fn check_flame_deaths(world: &mut WorldState, events: &mut Vec<Event>) {
    for i in 0..world.entities.players.len() {
        if !world.entities.players[i].alive {
            continue;
        }
        let tile = world.entities.players[i].tile();
        let hit = world
            .explosions
            .iter()
            .find(|e| e.covers(tile))
            .map(|e| e.origin);
        if let Some(by) = hit {
            let player = &mut world.entities.players[i];
            player.alive = false;
            events.push(Event::PlayerKilled {
                player: player.id,
                by,
                pos: tile,
            });
        }
    }
}

/// Age active fire by one tick. Expired explosions are cleared and hand the
/// owner their bomb slot back.
pub fn decay_fire(world: &mut WorldState) -> Result<(), SimError> {
    let mut released: Vec<PlayerId> = Vec::new();
    for explosion in &mut world.explosions {
        explosion.ttl_ticks -= 1;
        if explosion.ttl_ticks == 0 {
            released.push(explosion.owner);
        }
    }
    world.explosions.retain(|e| e.ttl_ticks > 0);

    for owner in released {
        let player = world
            .entities
            .player_mut(owner)
            .ok_or(SimError::missing(EntityKind::Player, owner.0))?;
        if player.active_bombs == 0 {
            return Err(SimError::Desync(format!(
                "player {} has no active bombs to release",
                owner.0
            )));
        }
        player.active_bombs -= 1;
    }
    Ok(())
}
