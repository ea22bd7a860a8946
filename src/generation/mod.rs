//! # Generation Module
//!
//! Procedural content generation for dungeon levels.
//!
//! The room-and-corridor generator carves the level, then hands the carved
//! rooms to populators that scatter item and enemy symbols into them. Every
//! routine takes the random source as a parameter so a seeded generator
//! reproduces a level exactly.

pub mod dungeon;
pub mod encounters;
pub mod items;

pub use dungeon::*;
pub use encounters::*;
pub use items::*;

use crate::{config, CotwResult, FogOfWar, Grid, Position, Symbol};
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for procedural generation.
///
/// Every field has a default, so a JSON file only needs the values it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Level width in tiles
    pub width: u32,
    /// Level height in tiles
    pub height: u32,
    /// Tile edge length in pixels
    pub tile_size: u32,
    /// Minimum number of rooms per level
    pub min_rooms: u32,
    /// Maximum number of rooms per level
    pub max_rooms: u32,
    /// Minimum room edge length
    pub min_room_size: u32,
    /// Maximum room edge length
    pub max_room_size: u32,
    /// Room placement attempts before settling for fewer rooms
    pub max_room_attempts: u32,
    pub min_items: u32,
    pub max_items: u32,
    pub min_enemies: u32,
    pub max_enemies: u32,
    /// Attempts per scattered symbol
    pub max_scatter_attempts: u32,
    /// Identifier written into the generated `LevelData`
    pub level_id: String,
    /// Display name written into the generated `LevelData`
    pub level_name: String,
    pub fog_of_war: FogOfWar,
}

impl GenerationConfig {
    /// Creates a default generation configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use cotw::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(42);
    /// assert_eq!((config.width, config.height), (50, 38));
    /// assert!(config.max_room_size >= config.min_room_size);
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            width: config::DEFAULT_LEVEL_WIDTH,
            height: config::DEFAULT_LEVEL_HEIGHT,
            tile_size: config::DEFAULT_TILE_SIZE,
            min_rooms: 6,
            max_rooms: 12,
            min_room_size: 4,
            max_room_size: 9,
            max_room_attempts: config::MAX_ROOM_ATTEMPTS,
            min_items: 6,
            max_items: 13,
            min_enemies: 6,
            max_enemies: 13,
            max_scatter_attempts: config::MAX_SCATTER_ATTEMPTS,
            level_id: "generated_dungeon".to_string(),
            level_name: "Generated Dungeon".to_string(),
            fog_of_war: FogOfWar::default(),
        }
    }

    /// Creates a configuration for testing with smaller, simpler levels.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            width: 30,
            height: 20,
            min_rooms: 3,
            max_rooms: 5,
            min_room_size: 4,
            max_room_size: 6,
            min_items: 2,
            max_items: 4,
            min_enemies: 2,
            max_enemies: 4,
            level_id: "test_dungeon".to_string(),
            level_name: "Test Dungeon".to_string(),
            ..Self::new(seed)
        }
    }

    /// Reads a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> CotwResult<Self> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Returns a copy with every range made usable.
    ///
    /// Inverted ranges are swapped, dimensions are raised to the crate
    /// minimums and room sizes are capped to what fits inside the border.
    /// A zero room count is left alone; the generator's fallback
    /// room absorbs it.
    pub fn normalized(&self) -> Self {
        let mut normalized = self.clone();

        if normalized.width < config::MIN_LEVEL_DIMENSION
            || normalized.height < config::MIN_LEVEL_DIMENSION
        {
            warn!(
                "Level size {}x{} too small, clamping to at least {}",
                normalized.width,
                normalized.height,
                config::MIN_LEVEL_DIMENSION
            );
            normalized.width = normalized.width.max(config::MIN_LEVEL_DIMENSION);
            normalized.height = normalized.height.max(config::MIN_LEVEL_DIMENSION);
        }

        normalized.tile_size = normalized.tile_size.max(1);

        if normalized.min_rooms > normalized.max_rooms {
            warn!(
                "Room count range {}..={} inverted, swapping",
                normalized.min_rooms, normalized.max_rooms
            );
            std::mem::swap(&mut normalized.min_rooms, &mut normalized.max_rooms);
        }

        if normalized.min_room_size < config::MIN_ROOM_SIZE {
            warn!(
                "Minimum room size {} raised to {}",
                normalized.min_room_size,
                config::MIN_ROOM_SIZE
            );
            normalized.min_room_size = config::MIN_ROOM_SIZE;
        }
        normalized.max_room_size = normalized.max_room_size.max(normalized.min_room_size);

        // Rooms sit inside the one-tile border
        let largest_room = normalized.width.min(normalized.height) - 2;
        if normalized.max_room_size > largest_room {
            warn!(
                "Room size range {}..={} capped to {}",
                normalized.min_room_size, normalized.max_room_size, largest_room
            );
            normalized.min_room_size = normalized.min_room_size.min(largest_room);
            normalized.max_room_size = largest_room;
        }

        if normalized.min_items > normalized.max_items {
            std::mem::swap(&mut normalized.min_items, &mut normalized.max_items);
        }
        if normalized.min_enemies > normalized.max_enemies {
            std::mem::swap(&mut normalized.min_enemies, &mut normalized.max_enemies);
        }

        normalized
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// An axis-aligned rectangular room, fully carved to floor.
///
/// The room's *interior* excludes its outermost ring of tiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Index of the room in placement order
    pub id: u32,
    /// Top-left corner of the room
    pub top_left: Position,
    pub width: u32,
    pub height: u32,
    /// Rooms this one has a corridor to
    pub connections: Vec<u32>,
}

impl Room {
    /// Creates a new room with the given parameters.
    ///
    /// # Examples
    ///
    /// ```
    /// use cotw::{Room, Position};
    ///
    /// let room = Room::new(1, Position::new(5, 5), 10, 8);
    /// assert_eq!(room.center(), Position::new(10, 9));
    /// assert!(room.contains(Position::new(14, 12)));
    /// assert!(!room.contains(Position::new(15, 12)));
    /// ```
    pub fn new(id: u32, top_left: Position, width: u32, height: u32) -> Self {
        Self {
            id,
            top_left,
            width,
            height,
            connections: Vec::new(),
        }
    }

    /// Gets the bottom-right corner of the room.
    pub fn bottom_right(&self) -> Position {
        Position::new(
            self.top_left.x + self.width as i32 - 1,
            self.top_left.y + self.height as i32 - 1,
        )
    }

    /// Gets the center position of the room.
    pub fn center(&self) -> Position {
        Position::new(
            self.top_left.x + self.width as i32 / 2,
            self.top_left.y + self.height as i32 / 2,
        )
    }

    /// Gets the area of the room in tiles.
    pub fn area(&self) -> u32 {
        self.width * self.height
    }

    /// Checks if a position is inside this room.
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.top_left.x
            && pos.y >= self.top_left.y
            && pos.x < self.top_left.x + self.width as i32
            && pos.y < self.top_left.y + self.height as i32
    }

    /// Checks if a position is inside the room and off its outer ring.
    pub fn is_interior(&self, pos: Position) -> bool {
        let bottom_right = self.bottom_right();
        pos.x > self.top_left.x
            && pos.y > self.top_left.y
            && pos.x < bottom_right.x
            && pos.y < bottom_right.y
    }

    /// All positions of the room, row by row.
    pub fn all_positions(&self) -> Vec<Position> {
        let bottom_right = self.bottom_right();
        (self.top_left.y..=bottom_right.y)
            .flat_map(|y| (self.top_left.x..=bottom_right.x).map(move |x| Position::new(x, y)))
            .collect()
    }

    /// Positions off the outer ring, row by row.
    pub fn interior_positions(&self) -> Vec<Position> {
        self.all_positions()
            .into_iter()
            .filter(|&pos| self.is_interior(pos))
            .collect()
    }

    /// A uniformly random interior position, if the room has an interior.
    pub fn random_interior_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Position> {
        if self.width < 3 || self.height < 3 {
            return None;
        }
        let bottom_right = self.bottom_right();
        Some(Position::new(
            rng.gen_range(self.top_left.x + 1..bottom_right.x),
            rng.gen_range(self.top_left.y + 1..bottom_right.y),
        ))
    }

    /// Checks if this room overlaps with another room.
    pub fn overlaps(&self, other: &Room) -> bool {
        self.overlaps_padded(other, 0)
    }

    /// Checks overlap after growing this room by `padding` tiles on every side.
    ///
    /// With a padding of one, rooms must be separated by at least one tile.
    pub fn overlaps_padded(&self, other: &Room, padding: i32) -> bool {
        let left = self.top_left.x - padding;
        let top = self.top_left.y - padding;
        let right = self.top_left.x + self.width as i32 + padding;
        let bottom = self.top_left.y + self.height as i32 + padding;

        left < other.top_left.x + other.width as i32
            && right > other.top_left.x
            && top < other.top_left.y + other.height as i32
            && bottom > other.top_left.y
    }

    /// Adds a connection to another room.
    pub fn add_connection(&mut self, room_id: u32) {
        if !self.connections.contains(&room_id) {
            self.connections.push(room_id);
        }
    }
}

/// Trait for whole-level generators.
///
/// The random source is injected so callers control determinism.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random source.
    fn generate<R: Rng + ?Sized>(&self, config: &GenerationConfig, rng: &mut R) -> T;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> CotwResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Trait for generators that decorate an already carved grid.
pub trait Populator {
    /// Writes symbols into floor cells of `rooms`, returning where they went.
    fn populate<R: Rng + ?Sized>(
        &self,
        grid: &mut Grid,
        rooms: &[Room],
        config: &GenerationConfig,
        rng: &mut R,
    ) -> Vec<Position>;

    /// Gets the populator type name for logging and debugging.
    fn populator_type(&self) -> &'static str;
}

/// Creates a seeded random number generator from the config.
pub fn create_rng(config: &GenerationConfig) -> StdRng {
    StdRng::seed_from_u64(config.seed)
}

/// Places `count` symbols on random interior floor cells of random rooms.
///
/// Each placement gets `max_attempts` tries; a placement that finds no floor
/// cell in time is dropped, so fewer than `count` symbols may be placed.
pub fn scatter_symbols<R, F>(
    grid: &mut Grid,
    rooms: &[Room],
    count: u32,
    max_attempts: u32,
    rng: &mut R,
    mut pick: F,
) -> Vec<Position>
where
    R: Rng + ?Sized,
    F: FnMut(&mut R) -> Symbol,
{
    let mut placed = Vec::new();
    if rooms.is_empty() {
        return placed;
    }

    for _ in 0..count {
        let mut spot = None;
        for _ in 0..max_attempts {
            let room = &rooms[rng.gen_range(0..rooms.len())];
            let Some(pos) = room.random_interior_position(rng) else {
                continue;
            };
            if grid.get(pos) == Some(Symbol::Floor) {
                spot = Some(pos);
                break;
            }
        }

        match spot {
            Some(pos) => {
                let symbol = pick(rng);
                grid.set(pos, symbol);
                placed.push(pos);
            }
            None => debug!("Gave up placing a symbol after {} attempts", max_attempts),
        }
    }

    placed
}
