//! # Pathfinding
//!
//! Reachability queries over a symbol grid, used to check that generated
//! levels can actually be played.

use crate::{Grid, Position};
use ::pathfinding::prelude::bfs;

/// Shortest 4-directional path between two tiles through passable cells.
///
/// Returns the path including both endpoints, or `None` when either endpoint
/// is impassable or no route exists.
pub fn find_path(grid: &Grid, from: Position, to: Position) -> Option<Vec<Position>> {
    let passable = |pos: Position| grid.get(pos).map(|s| s.is_passable()).unwrap_or(false);
    if !passable(from) || !passable(to) {
        return None;
    }

    bfs(
        &from,
        |pos| {
            pos.cardinal_adjacent_positions()
                .into_iter()
                .filter(|&p| passable(p))
                .collect::<Vec<_>>()
        },
        |pos| *pos == to,
    )
}

/// Whether `to` can be reached from `from`.
pub fn is_reachable(grid: &Grid, from: Position, to: Position) -> bool {
    find_path(grid, from, to).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&str]) -> Grid {
        let rows: Vec<String> = rows.iter().map(|r| r.to_string()).collect();
        Grid::from_layout(&rows).unwrap()
    }

    #[test]
    fn test_path_through_corridor() {
        let grid = grid(&["#######", "#@..+>#", "#######"]);
        let path = find_path(&grid, Position::new(1, 1), Position::new(5, 1)).unwrap();
        assert_eq!(path.len(), 5);
        assert_eq!(path.first(), Some(&Position::new(1, 1)));
        assert_eq!(path.last(), Some(&Position::new(5, 1)));
    }

    #[test]
    fn test_wall_blocks_path() {
        let grid = grid(&["#######", "#@.#.>#", "#######"]);
        assert!(!is_reachable(&grid, Position::new(1, 1), Position::new(5, 1)));
    }

    #[test]
    fn test_impassable_endpoint() {
        let grid = grid(&["####", "#@.#", "####"]);
        assert!(find_path(&grid, Position::new(1, 1), Position::new(0, 0)).is_none());
        assert!(find_path(&grid, Position::new(1, 1), Position::new(9, 9)).is_none());
    }
}
