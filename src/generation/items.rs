//! # Item Generation
//!
//! Scatters item symbols into the interiors of carved rooms.

use crate::{scatter_symbols, GenerationConfig, Grid, ItemKind, Populator, Position, Room, Symbol};
use log::debug;
use rand::Rng;

/// Scatters a random number of item symbols into room interiors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemGenerator {
    /// Item kinds to choose from, uniformly
    pub kinds: Vec<ItemKind>,
}

impl ItemGenerator {
    pub fn new() -> Self {
        Self {
            kinds: ItemKind::SCATTERED.to_vec(),
        }
    }
}

impl Default for ItemGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Populator for ItemGenerator {
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

        let count = rng.gen_range(config.min_items..=config.max_items);
        let placed = scatter_symbols(grid, rooms, count, config.max_scatter_attempts, rng, |rng| {
            Symbol::Item(self.kinds[rng.gen_range(0..self.kinds.len())])
        });

        if placed.len() < count as usize {
            debug!("Placed {} of {} items", placed.len(), count);
        }
        placed
    }

    fn populator_type(&self) -> &'static str {
        "ItemGenerator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn carved(room: &Room) -> Grid {
        let mut grid = Grid::filled(30, 30, Symbol::Wall);
        for pos in room.all_positions() {
            grid.set(pos, Symbol::Floor);
        }
        grid
    }

    #[test]
    fn test_item_count_in_range() {
        let generator = ItemGenerator::new();
        let config = GenerationConfig::new(1);
        let room = Room::new(0, Position::new(2, 2), 20, 20);

        for seed in 0..10 {
            let mut grid = carved(&room);
            let mut rng = StdRng::seed_from_u64(seed);
            let placed = generator.populate(&mut grid, &[room.clone()], &config, &mut rng);
            assert!((6..=13).contains(&placed.len()));
            let items = grid.count(|s| matches!(s, Symbol::Item(_)));
            assert_eq!(items, placed.len());
        }
    }

    #[test]
    fn test_restricted_kinds() {
        let generator = ItemGenerator {
            kinds: vec![ItemKind::Potion],
        };
        let config = GenerationConfig::new(1);
        let room = Room::new(0, Position::new(2, 2), 10, 10);
        let mut grid = carved(&room);
        let mut rng = StdRng::seed_from_u64(4);

        let placed = generator.populate(&mut grid, &[room], &config, &mut rng);
        for pos in placed {
            assert_eq!(grid.get(pos), Some(Symbol::Item(ItemKind::Potion)));
        }
        assert_eq!(generator.populator_type(), "ItemGenerator");
    }

    #[test]
    fn test_no_kinds_places_nothing() {
        let generator = ItemGenerator { kinds: Vec::new() };
        let config = GenerationConfig::new(1);
        let room = Room::new(0, Position::new(2, 2), 10, 10);
        let mut grid = carved(&room);
        let mut rng = StdRng::seed_from_u64(4);
        assert!(generator.populate(&mut grid, &[room], &config, &mut rng).is_empty());
    }
}
