//! # Dungeon Generation
//!
//! Procedural dungeon layout generation using a room-and-corridor algorithm.
//!
//! A level is built in fixed steps: place non-overlapping rooms, connect them
//! in placement order with L-shaped corridors, mark doors, put the spawn and
//! exit markers in the first and last room, scatter items and enemies, seal
//! the border and finally bundle everything into a [`LevelData`].

use crate::{
    config, is_reachable, CotwError, CotwResult, EncounterGenerator, GenerationConfig, Generator,
    Grid, ItemGenerator, LevelData, Lighting, Populator, Position, Room, Symbol,
};
use log::{debug, info, warn};
use rand::Rng;

/// Primary dungeon generator using room-and-corridor algorithm.
///
/// This generator creates dungeons by:
/// 1. Placing rooms randomly with padded collision detection
/// 2. Connecting consecutive rooms with L-shaped corridors
/// 3. Marking doors, spawn and exit
/// 4. Scattering items and enemies into room interiors
#[derive(Debug, Clone)]
pub struct RoomCorridorGenerator {
    /// How each corridor picks its bend
    pub corridor_strategy: CorridorStrategy,
    pub items: ItemGenerator,
    pub encounters: EncounterGenerator,
}

/// Strategies for bending the L-shaped corridors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorridorStrategy {
    /// Each corridor independently picks horizontal-first or vertical-first
    RandomBend,
    HorizontalFirst,
    VerticalFirst,
}

/// A generated level together with the rooms it was carved from.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedLevel {
    pub level: LevelData,
    /// Rooms in placement order; corridors join each room to the previous one
    pub rooms: Vec<Room>,
    pub exit: Position,
    /// Number of cells the door heuristic marked
    pub doors: usize,
}

impl RoomCorridorGenerator {
    /// Creates a new dungeon generator with default settings.
    ///
    /// # Examples
    ///
    /// ```
    /// use cotw::{GenerationConfig, Generator, RoomCorridorGenerator};
    ///
    /// let config = GenerationConfig::new(1234);
    /// let mut rng = cotw::create_rng(&config);
    /// let generated = RoomCorridorGenerator::new().generate(&config, &mut rng);
    /// assert_eq!(generated.level.layout.len(), 38);
    /// ```
    pub fn new() -> Self {
        Self {
            corridor_strategy: CorridorStrategy::RandomBend,
            items: ItemGenerator::new(),
            encounters: EncounterGenerator::new(),
        }
    }

    /// Uses a fixed corridor bend instead of a random one.
    pub fn with_corridor_strategy(mut self, strategy: CorridorStrategy) -> Self {
        self.corridor_strategy = strategy;
        self
    }

    /// Places rooms until the target count or the attempt budget is reached.
    fn place_rooms<R: Rng + ?Sized>(
        &self,
        grid: &mut Grid,
        config: &GenerationConfig,
        rng: &mut R,
    ) -> Vec<Room> {
        let mut rooms: Vec<Room> = Vec::new();
        let target = rng.gen_range(config.min_rooms..=config.max_rooms) as usize;

        for _ in 0..config.max_room_attempts {
            if rooms.len() >= target {
                break;
            }

            let Some(room) = self.generate_room_candidate(config, rng, rooms.len() as u32)
            else {
                continue;
            };

            if rooms
                .iter()
                .any(|existing| room.overlaps_padded(existing, config::ROOM_PADDING))
            {
                continue;
            }

            self.carve_room(grid, &room);
            rooms.push(room);
        }

        debug!("Placed {} of {} target rooms", rooms.len(), target);
        rooms
    }

    /// Generates a candidate room that leaves a one-tile border around the level.
    ///
    /// Returns `None` when the rolled size does not fit at all.
    fn generate_room_candidate<R: Rng + ?Sized>(
        &self,
        config: &GenerationConfig,
        rng: &mut R,
        room_id: u32,
    ) -> Option<Room> {
        let width = rng.gen_range(config.min_room_size..=config.max_room_size);
        let height = rng.gen_range(config.min_room_size..=config.max_room_size);

        let max_x = i64::from(config.width) - i64::from(width) - 1;
        let max_y = i64::from(config.height) - i64::from(height) - 1;
        if max_x < 1 || max_y < 1 {
            return None;
        }

        let x = rng.gen_range(1..=i32::try_from(max_x).ok()?);
        let y = rng.gen_range(1..=i32::try_from(max_y).ok()?);
        Some(Room::new(room_id, Position::new(x, y), width, height))
    }

    /// The room used when no random placement succeeded: centered, roughly a
    /// third of the level in each dimension.
    fn fallback_room(&self, config: &GenerationConfig) -> Room {
        let width = (config.width / 3).clamp(config::MIN_FALLBACK_ROOM_SIZE, config.width - 2);
        let height = (config.height / 3).clamp(config::MIN_FALLBACK_ROOM_SIZE, config.height - 2);
        let x = (config.width - width) / 2;
        let y = (config.height - height) / 2;
        Room::new(0, Position::new(x as i32, y as i32), width, height)
    }

    /// Carves out a room in the grid by setting its tiles to floor.
    fn carve_room(&self, grid: &mut Grid, room: &Room) {
        for pos in room.all_positions() {
            grid.set(pos, Symbol::Floor);
        }
    }

    /// Connects each room to the one placed before it.
    fn connect_rooms<R: Rng + ?Sized>(&self, grid: &mut Grid, rooms: &mut [Room], rng: &mut R) {
        for i in 1..rooms.len() {
            let start = rooms[i - 1].center();
            let end = rooms[i].center();
            let horizontal_first = match self.corridor_strategy {
                CorridorStrategy::RandomBend => rng.gen_bool(0.5),
                CorridorStrategy::HorizontalFirst => true,
                CorridorStrategy::VerticalFirst => false,
            };

            self.carve_l_corridor(grid, start, end, horizontal_first);

            let (previous_id, current_id) = (rooms[i - 1].id, rooms[i].id);
            rooms[i - 1].add_connection(current_id);
            rooms[i].add_connection(previous_id);
        }
    }

    /// Carves an L-shaped corridor between two points.
    fn carve_l_corridor(
        &self,
        grid: &mut Grid,
        start: Position,
        end: Position,
        horizontal_first: bool,
    ) {
        if horizontal_first {
            self.carve_horizontal(grid, start.x, end.x, start.y);
            self.carve_vertical(grid, start.y, end.y, end.x);
        } else {
            self.carve_vertical(grid, start.y, end.y, start.x);
            self.carve_horizontal(grid, start.x, end.x, end.y);
        }
    }

    fn carve_horizontal(&self, grid: &mut Grid, x1: i32, x2: i32, y: i32) {
        for x in x1.min(x2)..=x1.max(x2) {
            self.carve_corridor_cell(grid, Position::new(x, y));
        }
    }

    fn carve_vertical(&self, grid: &mut Grid, y1: i32, y2: i32, x: i32) {
        for y in y1.min(y2)..=y1.max(y2) {
            self.carve_corridor_cell(grid, Position::new(x, y));
        }
    }

    /// Corridors never touch the outer border.
    fn carve_corridor_cell(&self, grid: &mut Grid, pos: Position) {
        if grid.in_bounds(pos) && !grid.is_border(pos) {
            grid.set(pos, Symbol::Floor);
        }
    }

    /// Marks floor cells with at least three walled cardinal neighbors as doors.
    ///
    /// Cells are judged against the grid as carved, so one door never turns
    /// its neighbor into another. This is a local pattern match: corridor
    /// mouths and dead ends qualify, and so can a one-tile-wide room corner.
    fn add_doors(&self, grid: &mut Grid) -> usize {
        let doors: Vec<Position> = grid
            .positions_where(|symbol| symbol == Symbol::Floor)
            .into_iter()
            .filter(|&pos| {
                pos.cardinal_adjacent_positions()
                    .into_iter()
                    .filter(|&n| grid.get(n).map_or(true, |s| s == Symbol::Wall))
                    .count()
                    >= 3
            })
            .collect();

        for &pos in &doors {
            grid.set(pos, Symbol::Door);
        }
        doors.len()
    }

    /// Puts the spawn in the first room's center and the exit in the last
    /// room's center. A lone room gets its exit on the interior cell farthest
    /// from the spawn.
    fn place_spawn_and_exit(&self, grid: &mut Grid, rooms: &[Room]) -> (Position, Position) {
        let first = &rooms[0];
        let spawn = first.center();
        let exit = match rooms.last() {
            Some(last) if rooms.len() > 1 => last.center(),
            _ => first
                .interior_positions()
                .into_iter()
                .filter(|&pos| pos != spawn)
                .max_by_key(|&pos| (pos.manhattan_distance(spawn), pos))
                .unwrap_or(spawn),
        };

        grid.set(spawn, Symbol::Spawn);
        grid.set(exit, Symbol::Exit);
        (spawn, exit)
    }

    /// Forces every border cell back to wall.
    fn seal_border(&self, grid: &mut Grid) {
        for pos in grid.positions_where(|symbol| symbol != Symbol::Wall) {
            if grid.is_border(pos) {
                grid.set(pos, Symbol::Wall);
            }
        }
    }
}

impl Generator<GeneratedLevel> for RoomCorridorGenerator {
    fn generate<R: Rng + ?Sized>(&self, config: &GenerationConfig, rng: &mut R) -> GeneratedLevel {
        let config = config.normalized();
        let mut grid = Grid::filled(config.width as usize, config.height as usize, Symbol::Wall);

        let mut rooms = self.place_rooms(&mut grid, &config, rng);
        if rooms.is_empty() {
            let room = self.fallback_room(&config);
            warn!(
                "No room could be placed, using fallback room {}x{} at {:?}",
                room.width, room.height, room.top_left
            );
            self.carve_room(&mut grid, &room);
            rooms.push(room);
        }

        self.connect_rooms(&mut grid, &mut rooms, rng);
        let doors = self.add_doors(&mut grid);
        let (spawn, exit) = self.place_spawn_and_exit(&mut grid, &rooms);

        let items = self.items.populate(&mut grid, &rooms, &config, rng);
        let enemies = self.encounters.populate(&mut grid, &rooms, &config, rng);

        self.seal_border(&mut grid);

        info!(
            "Generated level '{}' ({}x{}): {} rooms, {} doors, {} items, {} enemies",
            config.level_id,
            config.width,
            config.height,
            rooms.len(),
            doors,
            items.len(),
            enemies.len()
        );

        let level = LevelData {
            id: config.level_id.clone(),
            name: config.level_name.clone(),
            width: config.width,
            height: config.height,
            tile_size: config.tile_size,
            layout: grid.to_layout(),
            player_spawn: spawn,
            lighting: Lighting::around_markers(spawn, exit),
            fog_of_war: config.fog_of_war.clone(),
            items: Vec::new(),
        };

        GeneratedLevel {
            level,
            rooms,
            exit,
            doors,
        }
    }

    fn validate(&self, generated: &GeneratedLevel, config: &GenerationConfig) -> CotwResult<()> {
        let config = config.normalized();
        let level = &generated.level;
        let grid = level.grid()?;

        if grid.width() != config.width as usize || grid.height() != config.height as usize {
            return Err(CotwError::GenerationFailed(format!(
                "layout is {}x{}, expected {}x{}",
                grid.width(),
                grid.height(),
                config.width,
                config.height
            )));
        }

        if let Some((pos, symbol)) = grid
            .iter()
            .find(|&(pos, symbol)| grid.is_border(pos) && symbol != Symbol::Wall)
        {
            return Err(CotwError::GenerationFailed(format!(
                "border cell {:?} is '{}'",
                pos,
                symbol.to_char()
            )));
        }

        let spawns = grid.positions_where(|s| s == Symbol::Spawn);
        let exits = grid.positions_where(|s| s == Symbol::Exit);
        if spawns.len() != 1 || exits.len() != 1 {
            return Err(CotwError::GenerationFailed(format!(
                "expected one spawn and one exit, found {} and {}",
                spawns.len(),
                exits.len()
            )));
        }
        if spawns[0] != level.player_spawn {
            return Err(CotwError::GenerationFailed(format!(
                "player spawn {:?} does not match layout marker {:?}",
                level.player_spawn, spawns[0]
            )));
        }

        for (i, room) in generated.rooms.iter().enumerate() {
            if let Some(other) = generated.rooms[i + 1..]
                .iter()
                .find(|other| room.overlaps_padded(other, config::ROOM_PADDING))
            {
                return Err(CotwError::GenerationFailed(format!(
                    "rooms {} and {} overlap",
                    room.id, other.id
                )));
            }
        }

        if !is_reachable(&grid, spawns[0], exits[0]) {
            return Err(CotwError::GenerationFailed(
                "exit is not reachable from spawn".to_string(),
            ));
        }

        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "RoomCorridorGenerator"
    }
}

impl Default for RoomCorridorGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Generates a level seeded from `config.seed` with the default generator.
pub fn generate_level(config: &GenerationConfig) -> GeneratedLevel {
    let mut rng = crate::create_rng(config);
    RoomCorridorGenerator::new().generate(config, &mut rng)
}
