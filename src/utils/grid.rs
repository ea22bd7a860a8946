//! # Grid Mathematics
//!
//! Conversions between tile coordinates and pixel coordinates, bounds checks
//! and neighbor queries.
//!
//! Each level context owns its own [`GridConfig`]; nothing here is global.

use crate::{config, LevelData, Position};
use serde::{Deserialize, Serialize};

/// A point in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f32,
    pub y: f32,
}

impl PixelPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Coordinate system of one level.
///
/// # Examples
///
/// ```
/// use cotw::{GridConfig, PixelPoint, Position};
///
/// let grid = GridConfig::new(32, 50, 38);
/// assert_eq!(grid.grid_to_pixel(Position::new(2, 3)), PixelPoint::new(64.0, 96.0));
/// assert_eq!(grid.pixel_to_grid(PixelPoint::new(70.5, 100.0)), Position::new(2, 3));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Edge length of one tile in pixels
    pub tile_size: u32,
    pub grid_width: u32,
    pub grid_height: u32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl GridConfig {
    /// Creates a config with no pixel offset.
    pub fn new(tile_size: u32, grid_width: u32, grid_height: u32) -> Self {
        Self {
            tile_size,
            grid_width,
            grid_height,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    /// Derives the coordinate system of a level.
    pub fn for_level(level: &LevelData) -> Self {
        Self::new(level.tile_size, level.width, level.height)
    }

    /// Changes the tile size. A size of zero is raised to one.
    pub fn set_tile_size(&mut self, tile_size: u32) {
        self.tile_size = tile_size.max(1);
    }

    pub fn set_dimensions(&mut self, grid_width: u32, grid_height: u32) {
        self.grid_width = grid_width;
        self.grid_height = grid_height;
    }

    pub fn set_offset(&mut self, offset_x: f32, offset_y: f32) {
        self.offset_x = offset_x;
        self.offset_y = offset_y;
    }

    /// Top-left pixel corner of a tile.
    pub fn grid_to_pixel(&self, pos: Position) -> PixelPoint {
        let tile = self.tile_size as f32;
        PixelPoint::new(
            self.offset_x + pos.x as f32 * tile,
            self.offset_y + pos.y as f32 * tile,
        )
    }

    /// Tile containing a pixel, by floor division.
    pub fn pixel_to_grid(&self, point: PixelPoint) -> Position {
        let tile = self.tile_size.max(1) as f32;
        Position::new(
            ((point.x - self.offset_x) / tile).floor() as i32,
            ((point.y - self.offset_y) / tile).floor() as i32,
        )
    }

    pub fn is_valid_grid_position(&self, pos: Position) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && (pos.x as u32) < self.grid_width
            && (pos.y as u32) < self.grid_height
    }

    /// The 4 cardinal neighbors, optionally restricted to in-bounds tiles.
    pub fn neighbors(&self, pos: Position, only_valid: bool) -> Vec<Position> {
        self.filter_valid(pos.cardinal_adjacent_positions(), only_valid)
    }

    /// All 8 neighbors, optionally restricted to in-bounds tiles.
    pub fn neighbors8(&self, pos: Position, only_valid: bool) -> Vec<Position> {
        self.filter_valid(pos.adjacent_positions(), only_valid)
    }

    fn filter_valid(&self, positions: Vec<Position>, only_valid: bool) -> Vec<Position> {
        if !only_valid {
            return positions;
        }
        positions
            .into_iter()
            .filter(|&p| self.is_valid_grid_position(p))
            .collect()
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self::new(
            config::DEFAULT_TILE_SIZE,
            config::DEFAULT_LEVEL_WIDTH,
            config::DEFAULT_LEVEL_HEIGHT,
        )
    }
}

/// Euclidean distance between two tiles.
pub fn grid_distance(a: Position, b: Position) -> f64 {
    a.euclidean_distance(b)
}

/// Manhattan distance between two tiles.
pub fn manhattan_distance(a: Position, b: Position) -> u32 {
    a.manhattan_distance(b)
}
