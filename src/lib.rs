//! # CotW Dungeon Core
//!
//! Procedural dungeon generation and level content spawning for a
//! Castles of the Wind style roguelike.
//!
//! ## Architecture Overview
//!
//! The crate is the engine-independent core of the game. Rendering, input,
//! cameras and persistence belong to the host engine; everything here is plain
//! data and free functions over it.
//!
//! - **Grid Utility**: tile/pixel coordinate conversion, bounds and neighbor queries
//! - **Dungeon Generator**: room-and-corridor carving into a symbolic grid
//! - **Level Content Spawner**: turns a level's placed items and symbols into live
//!   world objects, exactly once per stable identifier
//!
//! Data flows one way: the generator produces a [`LevelData`], the spawner reads
//! it and populates a [`LiveWorld`]. The grid utility is consulted by both.

pub mod game;
pub mod generation;
pub mod utils;

// Core module re-exports
pub use game::*;
pub use generation::*;
pub use utils::*;

/// Core error type for the dungeon core.
#[derive(thiserror::Error, Debug)]
pub enum CotwError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// A textual layout could not be turned into a grid
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    /// Configuration values are unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A generated level violates a structural invariant
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// No live object with the given identifier
    #[error("Unknown object: {0}")]
    UnknownObject(String),
}

/// Result type used throughout the crate.
pub type CotwResult<T> = Result<T, CotwError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Dungeon configuration constants.
pub mod config {
    /// Default dungeon width in tiles
    pub const DEFAULT_LEVEL_WIDTH: u32 = 50;

    /// Default dungeon height in tiles
    pub const DEFAULT_LEVEL_HEIGHT: u32 = 38;

    /// Default tile edge length in pixels
    pub const DEFAULT_TILE_SIZE: u32 = 32;

    /// Smallest width or height a generated level is clamped to
    pub const MIN_LEVEL_DIMENSION: u32 = 9;

    /// Smallest room edge; leaves at least a 2x2 interior
    pub const MIN_ROOM_SIZE: u32 = 4;

    /// Smallest edge of the fallback room
    pub const MIN_FALLBACK_ROOM_SIZE: u32 = 5;

    /// Room placement attempts per level
    pub const MAX_ROOM_ATTEMPTS: u32 = 100;

    /// Attempts per scattered symbol before giving up on it
    pub const MAX_SCATTER_ATTEMPTS: u32 = 200;

    /// Gap enforced around every accepted room
    pub const ROOM_PADDING: i32 = 1;

    /// Default player starting health
    pub const DEFAULT_PLAYER_HEALTH: u32 = 100;
}
