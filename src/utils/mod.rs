//! # Utilities Module
//!
//! Grid coordinate math and pathfinding over level layouts.

pub mod grid;
pub mod pathfinding;

pub use self::grid::*;
pub use self::pathfinding::*;
