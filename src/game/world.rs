//! # World Representation
//!
//! The symbol grid a level is carved into and the `LevelData` record handed
//! to the rendering layer and to the spawner.

use crate::{CotwError, CotwResult, EnemyKind, ItemKind, PlacedItem, Position};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One cell of a level layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Wall,
    Floor,
    Door,
    Spawn,
    Exit,
    Item(ItemKind),
    Enemy(EnemyKind),
}

impl Symbol {
    /// Layout character for this symbol.
    ///
    /// # Examples
    ///
    /// ```
    /// use cotw::{ItemKind, Symbol};
    ///
    /// assert_eq!(Symbol::Wall.to_char(), '#');
    /// assert_eq!(Symbol::Item(ItemKind::Gold).to_char(), '$');
    /// ```
    pub fn to_char(self) -> char {
        match self {
            Symbol::Wall => '#',
            Symbol::Floor => '.',
            Symbol::Door => '+',
            Symbol::Spawn => '@',
            Symbol::Exit => '>',
            Symbol::Item(kind) => kind.symbol(),
            Symbol::Enemy(kind) => kind.symbol(),
        }
    }

    /// Parses a layout character; `None` for characters outside the alphabet.
    pub fn from_char(c: char) -> Option<Symbol> {
        match c {
            '#' => Some(Symbol::Wall),
            '.' => Some(Symbol::Floor),
            '+' => Some(Symbol::Door),
            '@' => Some(Symbol::Spawn),
            '>' => Some(Symbol::Exit),
            other => ItemKind::from_symbol(other)
                .map(Symbol::Item)
                .or_else(|| EnemyKind::from_symbol(other).map(Symbol::Enemy)),
        }
    }

    /// Whether the player can stand on this cell.
    pub fn is_passable(self) -> bool {
        self != Symbol::Wall
    }
}

/// A rectangular grid of symbols, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Symbol>,
}

impl Grid {
    /// Creates a grid with every cell set to `symbol`.
    pub fn filled(width: usize, height: usize, symbol: Symbol) -> Self {
        Self {
            width,
            height,
            cells: vec![symbol; width * height],
        }
    }

    /// Parses a layout of equal-length rows.
    pub fn from_layout(rows: &[String]) -> CotwResult<Self> {
        let height = rows.len();
        let width = rows.first().map(|row| row.chars().count()).unwrap_or(0);
        let mut cells = Vec::with_capacity(width * height);

        for (y, row) in rows.iter().enumerate() {
            let row_width = row.chars().count();
            if row_width != width {
                return Err(CotwError::InvalidLayout(format!(
                    "row {} has {} columns, expected {}",
                    y, row_width, width
                )));
            }
            for (x, c) in row.chars().enumerate() {
                let symbol = Symbol::from_char(c).ok_or_else(|| {
                    CotwError::InvalidLayout(format!("unknown symbol '{}' at ({}, {})", c, x, y))
                })?;
                cells.push(symbol);
            }
        }

        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if self.in_bounds(pos) {
            Some(pos.y as usize * self.width + pos.x as usize)
        } else {
            None
        }
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    /// Whether `pos` lies on the outermost ring of the grid.
    pub fn is_border(&self, pos: Position) -> bool {
        self.in_bounds(pos)
            && (pos.x == 0
                || pos.y == 0
                || pos.x as usize == self.width - 1
                || pos.y as usize == self.height - 1)
    }

    pub fn get(&self, pos: Position) -> Option<Symbol> {
        self.index(pos).map(|i| self.cells[i])
    }

    /// Sets a cell. Returns false and leaves the grid untouched when out of bounds.
    pub fn set(&mut self, pos: Position, symbol: Symbol) -> bool {
        match self.index(pos) {
            Some(i) => {
                self.cells[i] = symbol;
                true
            }
            None => false,
        }
    }

    /// Iterates over every cell with its position, row by row.
    pub fn iter(&self) -> impl Iterator<Item = (Position, Symbol)> + '_ {
        let width = self.width;
        self.cells.iter().enumerate().map(move |(i, &symbol)| {
            (Position::new((i % width) as i32, (i / width) as i32), symbol)
        })
    }

    /// Positions of every cell matching `predicate`.
    pub fn positions_where(&self, predicate: impl Fn(Symbol) -> bool) -> Vec<Position> {
        self.iter()
            .filter(|(_, symbol)| predicate(*symbol))
            .map(|(pos, _)| pos)
            .collect()
    }

    pub fn count(&self, predicate: impl Fn(Symbol) -> bool) -> usize {
        self.cells.iter().filter(|symbol| predicate(**symbol)).count()
    }

    /// Renders the grid as one string per row.
    pub fn to_layout(&self) -> Vec<String> {
        self.cells
            .chunks(self.width.max(1))
            .map(|row| row.iter().map(|symbol| symbol.to_char()).collect())
            .collect()
    }
}

/// A point light attached to a tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Torch {
    pub x: i32,
    pub y: i32,
    pub radius: u32,
    pub intensity: f32,
}

/// Lighting hints for the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lighting {
    /// Base light level, 0.0 (dark) to 1.0 (fully lit)
    pub ambient: f32,
    pub torches: Vec<Torch>,
}

impl Lighting {
    pub const DEFAULT_AMBIENT: f32 = 0.25;
    pub const TORCH_RADIUS: u32 = 5;
    pub const TORCH_INTENSITY: f32 = 0.8;

    /// Default lighting: dim ambient light and one torch at each marker.
    pub fn around_markers(spawn: Position, exit: Position) -> Self {
        let torch = |pos: Position| Torch {
            x: pos.x,
            y: pos.y,
            radius: Self::TORCH_RADIUS,
            intensity: Self::TORCH_INTENSITY,
        };
        Self {
            ambient: Self::DEFAULT_AMBIENT,
            torches: vec![torch(spawn), torch(exit)],
        }
    }
}

/// Fog-of-war settings for the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FogOfWar {
    pub enabled: bool,
    /// Radius in tiles the player can see
    pub vision_radius: u32,
    pub explored_opacity: f32,
    pub unexplored_opacity: f32,
}

impl Default for FogOfWar {
    fn default() -> Self {
        Self {
            enabled: true,
            vision_radius: 6,
            explored_opacity: 0.6,
            unexplored_opacity: 1.0,
        }
    }
}

/// The generated level bundle exchanged with the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelData {
    pub id: String,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub tile_size: u32,
    /// One string per row, `height` rows of `width` characters
    pub layout: Vec<String>,
    pub player_spawn: Position,
    pub lighting: Lighting,
    pub fog_of_war: FogOfWar,
    /// Explicitly authored items; generated levels leave this empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<PlacedItem>,
}

impl LevelData {
    /// Parses the layout into a grid.
    pub fn grid(&self) -> CotwResult<Grid> {
        Grid::from_layout(&self.layout)
    }

    /// Symbol at a grid position, read straight from the layout.
    pub fn symbol_at(&self, pos: Position) -> Option<Symbol> {
        if pos.x < 0 || pos.y < 0 {
            return None;
        }
        self.layout
            .get(pos.y as usize)
            .and_then(|row| row.chars().nth(pos.x as usize))
            .and_then(Symbol::from_char)
    }

    /// Position of the exit marker, if the layout has one.
    pub fn exit_position(&self) -> Option<Position> {
        self.layout.iter().enumerate().find_map(|(y, row)| {
            row.chars()
                .position(|c| c == Symbol::Exit.to_char())
                .map(|x| Position::new(x as i32, y as i32))
        })
    }

    pub fn to_json(&self) -> CotwResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> CotwResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Writes the level as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> CotwResult<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Reads a level previously written with [`LevelData::save`].
    pub fn load(path: impl AsRef<Path>) -> CotwResult<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
