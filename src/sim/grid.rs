//! Fixed-size tile grid and tile state machine
//!
//! The grid is a leaf: it knows tiles and bounds, never entities. Bomb-aware
//! solidity lives in the movement resolver.

use serde::{Deserialize, Serialize};

use super::error::SimError;
use super::powerup::PowerUpKind;

/// Integer tile coordinates. Tile (x, y) spans [x, x+1) x [y, y+1) in
/// continuous space, with y growing downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The adjacent tile one step in `dir`
    #[inline]
    pub fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        Self::new(self.x + dx, self.y + dy)
    }
}

/// The four orthogonal directions, always processed in this order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Tile delta for one step in this direction
    #[inline]
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Unit vector for continuous movement
    #[inline]
    pub fn vec(self) -> glam::Vec2 {
        let (dx, dy) = self.delta();
        glam::Vec2::new(dx as f32, dy as f32)
    }
}

/// What a single grid cell holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tile {
    #[default]
    Empty,
    /// Indestructible, blocks movement and explosions
    HardBlock,
    /// Destructible, blocks movement and explosions until destroyed
    SoftBlock,
    /// Walkable, consumed on contact
    PowerUp(PowerUpKind),
}

/// Fixed-size tile grid. Dimensions are immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Create an all-empty grid. Dimensions must be at least 1x1.
    pub fn new(width: i32, height: i32) -> Result<Self, SimError> {
        if width < 1 || height < 1 {
            return Err(SimError::ArenaTooSmall {
                width,
                height,
                min: 1,
            });
        }
        Ok(Self {
            width,
            height,
            tiles: vec![Tile::Empty; (width * height) as usize],
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, pos: TilePos) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    #[inline]
    fn index(&self, pos: TilePos) -> usize {
        (pos.y * self.width + pos.x) as usize
    }

    /// Tile at `pos`, erroring outside the grid
    pub fn tile_at(&self, pos: TilePos) -> Result<Tile, SimError> {
        if !self.in_bounds(pos) {
            return Err(SimError::OutOfBounds {
                x: pos.x,
                y: pos.y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(self.tiles[self.index(pos)])
    }

    /// Tile at `pos`, `None` outside the grid
    #[inline]
    pub fn get(&self, pos: TilePos) -> Option<Tile> {
        if self.in_bounds(pos) {
            Some(self.tiles[self.index(pos)])
        } else {
            None
        }
    }

    pub fn set_tile(&mut self, pos: TilePos, tile: Tile) -> Result<(), SimError> {
        if !self.in_bounds(pos) {
            return Err(SimError::OutOfBounds {
                x: pos.x,
                y: pos.y,
                width: self.width,
                height: self.height,
            });
        }
        let idx = self.index(pos);
        self.tiles[idx] = tile;
        Ok(())
    }

    /// True for blocks and for out-of-bounds coordinates (the arena edge
    /// behaves like a wall)
    #[inline]
    pub fn is_solid(&self, pos: TilePos) -> bool {
        match self.get(pos) {
            Some(Tile::HardBlock) | Some(Tile::SoftBlock) => true,
            Some(Tile::Empty) | Some(Tile::PowerUp(_)) => false,
            None => true,
        }
    }
}
