//! # Encounter Generation
//!
//! Scatters enemy symbols into the interiors of carved rooms.

use crate::{
    scatter_symbols, EnemyKind, GenerationConfig, Grid, Populator, Position, Room, Symbol,
};
use log::debug;
use rand::Rng;

/// Scatters a random number of enemy symbols into room interiors.
///
/// Every room is a candidate by default. Setting `spare_spawn_room` keeps
/// the first room, which holds the player spawn, free of enemies whenever
/// other rooms exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncounterGenerator {
    /// Enemy kinds to choose from, uniformly
    pub kinds: Vec<EnemyKind>,
    /// Skip the first room when more than one room exists
    pub spare_spawn_room: bool,
}

impl EncounterGenerator {
    pub fn new() -> Self {
        Self {
            kinds: EnemyKind::ALL.to_vec(),
            spare_spawn_room: false,
        }
    }
}

impl Default for EncounterGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Populator for EncounterGenerator {
    fn populate<R: Rng + ?Sized>(
        &self,
        grid: &mut Grid,
        rooms: &[Room],
        config: &GenerationConfig,
        rng: &mut R,
    ) -> Vec<Position> {
        if self.kinds.is_empty() {
            return Vec::new();
        }

        let candidates = if self.spare_spawn_room && rooms.len() > 1 {
            &rooms[1..]
        } else {
            rooms
        };

        let count = rng.gen_range(config.min_enemies..=config.max_enemies);
        let placed = scatter_symbols(
            grid,
            candidates,
            count,
            config.max_scatter_attempts,
            rng,
            |rng| Symbol::Enemy(self.kinds[rng.gen_range(0..self.kinds.len())]),
        );

        if placed.len() < count as usize {
            debug!("Placed {} of {} enemies", placed.len(), count);
        }
        placed
    }

    fn populator_type(&self) -> &'static str {
        "EncounterGenerator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn carve(grid: &mut Grid, room: &Room) {
        for pos in room.all_positions() {
            grid.set(pos, Symbol::Floor);
        }
    }

    #[test]
    fn test_enemy_count_in_range() {
        let generator = EncounterGenerator::new();
        let config = GenerationConfig::new(1);
        let room = Room::new(0, Position::new(1, 1), 15, 15);

        for seed in 0..10 {
            let mut grid = Grid::filled(20, 20, Symbol::Wall);
            carve(&mut grid, &room);
            let mut rng = StdRng::seed_from_u64(seed);
            let placed = generator.populate(&mut grid, &[room.clone()], &config, &mut rng);
            assert!((6..=13).contains(&placed.len()));
            assert_eq!(grid.count(|s| matches!(s, Symbol::Enemy(_))), placed.len());
        }
    }

    #[test]
    fn test_spare_spawn_room() {
        let generator = EncounterGenerator {
            spare_spawn_room: true,
            ..EncounterGenerator::new()
        };
        let config = GenerationConfig::new(1);
        let spawn_room = Room::new(0, Position::new(1, 1), 6, 6);
        let other_room = Room::new(1, Position::new(10, 10), 8, 8);
        let mut grid = Grid::filled(20, 20, Symbol::Wall);
        carve(&mut grid, &spawn_room);
        carve(&mut grid, &other_room);
        let mut rng = StdRng::seed_from_u64(21);

        let placed = generator.populate(
            &mut grid,
            &[spawn_room.clone(), other_room.clone()],
            &config,
            &mut rng,
        );
        assert!(!placed.is_empty());
        assert!(placed.iter().all(|&pos| other_room.is_interior(pos)));
        assert!(placed.iter().all(|&pos| !spawn_room.contains(pos)));
    }

    #[test]
    fn test_skips_occupied_cells() {
        let generator = EncounterGenerator::new();
        let config = GenerationConfig::new(1);
        let room = Room::new(0, Position::new(1, 1), 4, 4);
        let mut grid = Grid::filled(8, 8, Symbol::Wall);
        carve(&mut grid, &room);
        grid.set(Position::new(2, 2), Symbol::Spawn);
        grid.set(Position::new(3, 3), Symbol::Exit);
        let mut rng = StdRng::seed_from_u64(2);

        let placed = generator.populate(&mut grid, &[room], &config, &mut rng);
        // Only two interior cells remain free
        assert_eq!(placed.len(), 2);
        assert_eq!(grid.get(Position::new(2, 2)), Some(Symbol::Spawn));
        assert_eq!(grid.get(Position::new(3, 3)), Some(Symbol::Exit));
    }
}
