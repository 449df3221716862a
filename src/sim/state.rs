//! World state and entity records
//!
//! Everything that must be carried for determinism and replay lives here.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::error::{RejectReason, SimError};
use super::grid::{Direction, Grid, Tile, TilePos};
use super::powerup::PowerUpKind;
use super::rules::Ruleset;
use crate::tile_of;

/// Stable player id
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

/// Stable bomb id
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BombId(pub u32);

/// Stable pickup id
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PickupId(pub u32);

/// Effective player stats, clamped at the ruleset caps
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    /// Simultaneous bombs allowed in play
    pub max_bombs: u32,
    /// Blast radius of newly placed bombs, in tiles per direction
    pub blast_radius: u32,
    /// Movement speed in tiles per second
    pub move_speed: f32,
}

/// Collected power-up counts. Keeps counting past the stat caps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub extra_bomb: u32,
    pub blast_radius: u32,
    pub speed: u32,
    pub bomb_pass: u32,
}

impl Inventory {
    pub fn record(&mut self, kind: PowerUpKind) {
        match kind {
            PowerUpKind::ExtraBomb => self.extra_bomb += 1,
            PowerUpKind::BlastRadius => self.blast_radius += 1,
            PowerUpKind::Speed => self.speed += 1,
            PowerUpKind::BombPass => self.bomb_pass += 1,
        }
    }

    pub fn count(&self, kind: PowerUpKind) -> u32 {
        match kind {
            PowerUpKind::ExtraBomb => self.extra_bomb,
            PowerUpKind::BlastRadius => self.blast_radius,
            PowerUpKind::Speed => self.speed,
            PowerUpKind::BombPass => self.bomb_pass,
        }
    }

    pub fn total(&self) -> u32 {
        self.extra_bomb + self.blast_radius + self.speed + self.bomb_pass
    }
}

/// A player entity. Dead players are flagged, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    /// Continuous position in tile units
    pub pos: Vec2,
    pub alive: bool,
    pub stats: PlayerStats,
    /// Bombs currently in play (placed, fire not yet cleared)
    pub active_bombs: u32,
    pub inventory: Inventory,
}

impl Player {
    pub fn new(id: PlayerId, pos: Vec2, rules: &Ruleset) -> Self {
        Self {
            id,
            pos,
            alive: true,
            stats: PlayerStats {
                max_bombs: rules.bombs_base,
                blast_radius: rules.radius_base,
                move_speed: rules.speed_base,
            },
            active_bombs: 0,
            inventory: Inventory::default(),
        }
    }

    /// Tile containing the player's center
    #[inline]
    pub fn tile(&self) -> TilePos {
        tile_of(self.pos)
    }

    pub fn has_bomb_pass(&self) -> bool {
        self.inventory.bomb_pass > 0
    }
}

/// A placed bomb. Removed exactly once, at detonation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bomb {
    pub id: BombId,
    pub owner: PlayerId,
    pub pos: TilePos,
    /// Blast radius in tiles per direction, snapshotted at placement
    pub radius: u32,
    /// Ticks until detonation; forced to 0 by chain contact
    pub fuse_ticks: u32,
    /// Only armed bombs count down
    pub armed: bool,
}

/// A power-up pickup record, mirrored by `Tile::PowerUp` at `pos`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pickup {
    pub id: PickupId,
    pub kind: PowerUpKind,
    pub pos: TilePos,
}

/// One tile of active fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flame {
    pub pos: TilePos,
    /// Ray direction, `None` for the bomb's own tile
    pub dir: Option<Direction>,
    /// Distance from the origin tile
    pub dist: u32,
}

/// The fire left by one detonation. All of its flames share one clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explosion {
    pub origin: BombId,
    pub owner: PlayerId,
    pub flames: Vec<Flame>,
    pub ttl_ticks: u32,
}

impl Explosion {
    pub fn covers(&self, pos: TilePos) -> bool {
        self.flames.iter().any(|f| f.pos == pos)
    }
}

/// One entry in a tick's event log. Pure data for external consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    BombPlaced {
        bomb: BombId,
        owner: PlayerId,
        pos: TilePos,
    },
    BombDetonated {
        bomb: BombId,
        owner: PlayerId,
        pos: TilePos,
    },
    TileDestroyed {
        pos: TilePos,
        by: BombId,
    },
    PowerUpSpawned {
        pickup: PickupId,
        kind: PowerUpKind,
        pos: TilePos,
    },
    PowerUpCollected {
        player: PlayerId,
        kind: PowerUpKind,
        pos: TilePos,
    },
    PlayerKilled {
        player: PlayerId,
        by: BombId,
        pos: TilePos,
    },
    ActionRejected {
        player: PlayerId,
        reason: RejectReason,
    },
}

/// Seeded RNG carried in the world state. Every draw advances the carried
/// generator, so a serialized world resumes mid-sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RngState {
    seed: u64,
    rng: Pcg32,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// The seed this state was created from
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform draw in [0, bound). `bound` must be nonzero.
    pub fn roll(&mut self, bound: u32) -> u32 {
        self.rng.random_range(0..bound)
    }
}

/// Players, bombs, and pickups, keyed by stable ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityStore {
    /// Sorted by id for deterministic iteration
    pub players: Vec<Player>,
    /// Sorted by id for deterministic iteration
    pub bombs: Vec<Bomb>,
    /// Sorted by id for deterministic iteration
    pub pickups: Vec<Pickup>,
    next_id: u32,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self {
            players: Vec::new(),
            bombs: Vec::new(),
            pickups: Vec::new(),
            next_id: 1,
        }
    }
}

impl EntityStore {
    /// Allocate the next entity id. Ids are shared across entity kinds and
    /// strictly increasing.
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Re-sort all entity vectors by id for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.players.sort_by_key(|p| p.id);
        self.bombs.sort_by_key(|b| b.id);
        self.pickups.sort_by_key(|p| p.id);
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn bomb_at(&self, pos: TilePos) -> Option<&Bomb> {
        self.bombs.iter().find(|b| b.pos == pos)
    }

    pub fn pickup_at(&self, pos: TilePos) -> Option<&Pickup> {
        self.pickups.iter().find(|p| p.pos == pos)
    }
}

/// Complete world state: the sole mutable aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    pub grid: Grid,
    pub entities: EntityStore,
    /// Active fire, in detonation order
    pub explosions: Vec<Explosion>,
    pub rng: RngState,
    pub rules: Ruleset,
    /// Completed-tick counter
    pub tick: u64,
}

impl WorldState {
    /// Wrap a grid into a world with no entities yet
    pub fn new(grid: Grid, seed: u64, rules: Ruleset) -> Self {
        Self {
            grid,
            entities: EntityStore::default(),
            explosions: Vec::new(),
            rng: RngState::new(seed),
            rules,
            tick: 0,
        }
    }

    pub fn spawn_player(&mut self, pos: Vec2) -> PlayerId {
        let id = PlayerId(self.entities.next_entity_id());
        let player = Player::new(id, pos, &self.rules);
        self.entities.players.push(player);
        id
    }

    /// Place a pickup record and its tile variant together
    pub fn spawn_pickup(
        &mut self,
        kind: PowerUpKind,
        pos: TilePos,
    ) -> Result<PickupId, SimError> {
        self.grid.set_tile(pos, Tile::PowerUp(kind))?;
        let id = PickupId(self.entities.next_entity_id());
        self.entities.pickups.push(Pickup { id, kind, pos });
        Ok(id)
    }

    /// Remove the pickup at `pos` and clear its tile. Caller has already
    /// seen `Tile::PowerUp` there, so a missing record is a fatal desync.
    pub(crate) fn take_pickup_at(&mut self, pos: TilePos) -> Result<Pickup, SimError> {
        let idx = self
            .entities
            .pickups
            .iter()
            .position(|p| p.pos == pos)
            .ok_or_else(|| {
                SimError::Desync(format!(
                    "power-up tile at ({}, {}) has no pickup record",
                    pos.x, pos.y
                ))
            })?;
        let pickup = self.entities.pickups.remove(idx);
        self.grid.set_tile(pos, Tile::Empty)?;
        Ok(pickup)
    }

    pub fn normalize_order(&mut self) {
        self.entities.normalize_order();
    }

    /// Canonical JSON of the full state, for replay hash-equality checks
    pub fn digest(&self) -> String {
        // Plain structs and enums; serialization cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_world() -> WorldState {
        let grid = Grid::new(9, 9).unwrap();
        WorldState::new(grid, 1234, Ruleset::default())
    }

    #[test]
    fn test_entity_ids_monotonic_across_kinds() {
        let mut world = empty_world();
        let p = world.spawn_player(Vec2::new(1.5, 1.5));
        let k = world
            .spawn_pickup(PowerUpKind::Speed, TilePos::new(3, 3))
            .unwrap();
        let next = world.entities.next_entity_id();
        assert_eq!(p.0, 1);
        assert_eq!(k.0, 2);
        assert_eq!(next, 3);
    }

    #[test]
    fn test_normalize_order_sorts_by_id() {
        let mut store = EntityStore::default();
        let rules = Ruleset::default();
        let a = store.next_entity_id();
        let b = store.next_entity_id();
        store
            .players
            .push(Player::new(PlayerId(b), Vec2::ZERO, &rules));
        store
            .players
            .push(Player::new(PlayerId(a), Vec2::ZERO, &rules));
        store.normalize_order();
        assert_eq!(store.players[0].id, PlayerId(a));
        assert_eq!(store.players[1].id, PlayerId(b));
    }

    #[test]
    fn test_pickup_tile_and_record_stay_in_sync() {
        let mut world = empty_world();
        let pos = TilePos::new(4, 2);
        world.spawn_pickup(PowerUpKind::ExtraBomb, pos).unwrap();
        assert_eq!(
            world.grid.tile_at(pos).unwrap(),
            Tile::PowerUp(PowerUpKind::ExtraBomb)
        );
        assert!(world.entities.pickup_at(pos).is_some());

        let taken = world.take_pickup_at(pos).unwrap();
        assert_eq!(taken.kind, PowerUpKind::ExtraBomb);
        assert_eq!(world.grid.tile_at(pos).unwrap(), Tile::Empty);
        assert!(world.entities.pickup_at(pos).is_none());
    }

    #[test]
    fn test_orphan_pickup_tile_is_fatal() {
        let mut world = empty_world();
        let pos = TilePos::new(4, 2);
        // Tile variant without a matching record
        world
            .grid
            .set_tile(pos, Tile::PowerUp(PowerUpKind::Speed))
            .unwrap();
        assert!(matches!(
            world.take_pickup_at(pos),
            Err(SimError::Desync(_))
        ));
    }

    #[test]
    fn test_digest_tracks_state() {
        let mut world = empty_world();
        let copy = world.clone();
        assert_eq!(world.digest(), copy.digest());

        world.spawn_player(Vec2::new(1.5, 1.5));
        assert_ne!(world.digest(), copy.digest());
    }

    #[test]
    fn test_world_json_roundtrip() {
        let mut world = empty_world();
        world.spawn_player(Vec2::new(1.5, 1.5));
        world
            .spawn_pickup(PowerUpKind::BombPass, TilePos::new(2, 2))
            .unwrap();
        // Advance the RNG so its mid-sequence state is exercised too
        world.rng.roll(100);

        let json = serde_json::to_string(&world).unwrap();
        let back: WorldState = serde_json::from_str(&json).unwrap();
        assert_eq!(world, back);
    }

    #[test]
    fn test_rng_draws_advance_state() {
        let mut rng = RngState::new(5);
        let first = rng.roll(1000);
        let again = rng.roll(1000);
        let mut fresh = RngState::new(5);
        assert_eq!(fresh.roll(1000), first);
        assert_eq!(fresh.roll(1000), again);
    }

    #[test]
    fn test_player_center_tile() {
        let rules = Ruleset::default();
        let player = Player::new(PlayerId(1), Vec2::new(3.5, 7.25), &rules);
        assert_eq!(player.tile(), TilePos::new(3, 7));
    }
}
