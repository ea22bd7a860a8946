//! # Entity Records
//!
//! Plain-data records for everything that lives on a level: placed items,
//! enemies, doors and the player's stats. Behavior lives in free functions
//! (see the spawner module), not on the records.

use crate::{config, EntityId, PixelPoint, Position};
use serde::{Deserialize, Serialize};

/// Composes the stable identifier used for collection bookkeeping.
///
/// # Examples
///
/// ```
/// use cotw::{stable_id, Position};
///
/// assert_eq!(stable_id("gold", Position::new(3, 7)), "gold_3_7");
/// ```
pub fn stable_id(type_name: &str, pos: Position) -> String {
    format!("{}_{}_{}", type_name, pos.x, pos.y)
}

/// Kinds of collectable items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Currency
    Gold,
    /// Restores health
    Potion,
    /// Raises defense
    Armor,
    /// Raises attack
    Weapon,
    /// Container holding nested items
    Chest,
    Scroll,
    Key,
    /// Any type this crate has no effect for
    #[serde(other)]
    Misc,
}

impl ItemKind {
    /// Item kinds the generator scatters into rooms.
    pub const SCATTERED: [ItemKind; 6] = [
        ItemKind::Gold,
        ItemKind::Potion,
        ItemKind::Armor,
        ItemKind::Weapon,
        ItemKind::Chest,
        ItemKind::Scroll,
    ];

    /// Layout character for this kind.
    pub fn symbol(self) -> char {
        match self {
            ItemKind::Gold => '$',
            ItemKind::Potion => '!',
            ItemKind::Armor => '[',
            ItemKind::Weapon => ')',
            ItemKind::Chest => '&',
            ItemKind::Scroll => '?',
            ItemKind::Key => '~',
            ItemKind::Misc => '*',
        }
    }

    /// Parses a layout character.
    pub fn from_symbol(symbol: char) -> Option<ItemKind> {
        match symbol {
            '$' => Some(ItemKind::Gold),
            '!' => Some(ItemKind::Potion),
            '[' => Some(ItemKind::Armor),
            ')' => Some(ItemKind::Weapon),
            '&' => Some(ItemKind::Chest),
            '?' => Some(ItemKind::Scroll),
            '~' => Some(ItemKind::Key),
            '*' => Some(ItemKind::Misc),
            _ => None,
        }
    }

    /// Maps an item `type` name to its kind. Names with no effect are `Misc`.
    pub fn from_name(name: &str) -> ItemKind {
        match name {
            "gold" => ItemKind::Gold,
            "potion" => ItemKind::Potion,
            "armor" => ItemKind::Armor,
            "weapon" => ItemKind::Weapon,
            "chest" => ItemKind::Chest,
            "scroll" => ItemKind::Scroll,
            "key" => ItemKind::Key,
            _ => ItemKind::Misc,
        }
    }

    /// Lowercase name, identical to the serialized `type` field.
    pub fn name(self) -> &'static str {
        match self {
            ItemKind::Gold => "gold",
            ItemKind::Potion => "potion",
            ItemKind::Armor => "armor",
            ItemKind::Weapon => "weapon",
            ItemKind::Chest => "chest",
            ItemKind::Scroll => "scroll",
            ItemKind::Key => "key",
            ItemKind::Misc => "misc",
        }
    }
}

/// Kinds of enemies the generator can scatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    Rat,
    Goblin,
    Kobold,
    Skeleton,
    Orc,
}

impl EnemyKind {
    /// All enemy kinds.
    pub const ALL: [EnemyKind; 5] = [
        EnemyKind::Rat,
        EnemyKind::Goblin,
        EnemyKind::Kobold,
        EnemyKind::Skeleton,
        EnemyKind::Orc,
    ];

    /// Layout character for this kind.
    pub fn symbol(self) -> char {
        match self {
            EnemyKind::Rat => 'r',
            EnemyKind::Goblin => 'g',
            EnemyKind::Kobold => 'k',
            EnemyKind::Skeleton => 's',
            EnemyKind::Orc => 'o',
        }
    }

    /// Parses a layout character.
    pub fn from_symbol(symbol: char) -> Option<EnemyKind> {
        EnemyKind::ALL.into_iter().find(|kind| kind.symbol() == symbol)
    }

    pub fn name(self) -> &'static str {
        match self {
            EnemyKind::Rat => "rat",
            EnemyKind::Goblin => "goblin",
            EnemyKind::Kobold => "kobold",
            EnemyKind::Skeleton => "skeleton",
            EnemyKind::Orc => "orc",
        }
    }

    /// Starting health for a freshly spawned enemy.
    pub fn base_health(self) -> u32 {
        match self {
            EnemyKind::Rat => 4,
            EnemyKind::Goblin => 8,
            EnemyKind::Kobold => 6,
            EnemyKind::Skeleton => 12,
            EnemyKind::Orc => 16,
        }
    }

    /// Attack value for a freshly spawned enemy.
    pub fn base_attack(self) -> i32 {
        match self {
            EnemyKind::Rat => 1,
            EnemyKind::Goblin => 2,
            EnemyKind::Kobold => 2,
            EnemyKind::Skeleton => 3,
            EnemyKind::Orc => 4,
        }
    }
}

/// An item placed on a level, as authored or generated.
///
/// The authored `type` name is kept verbatim, so unknown types keep their
/// own stable ids and survive a save. Type-specific fields are optional;
/// collection falls back to the defaults in [`PlacedItem::amount`] when
/// they are absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedItem {
    #[serde(rename = "type")]
    pub type_name: String,
    pub x: i32,
    pub y: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defense: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attack: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<String>,
    /// Nested items released when a container is opened
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contents: Vec<PlacedItem>,
}

impl PlacedItem {
    /// Creates an item with no type-specific fields.
    pub fn new(kind: ItemKind, pos: Position) -> Self {
        Self::named(kind.name(), pos)
    }

    /// Creates an item with an arbitrary `type` name.
    pub fn named(type_name: &str, pos: Position) -> Self {
        Self {
            type_name: type_name.to_string(),
            x: pos.x,
            y: pos.y,
            value: None,
            defense: None,
            attack: None,
            effect: None,
            contents: Vec::new(),
        }
    }

    /// Creates the item a bare layout symbol stands for.
    ///
    /// Scattered chests hold a single pouch of gold.
    pub fn from_layout_symbol(kind: ItemKind, pos: Position) -> Self {
        let item = Self::new(kind, pos);
        match kind {
            ItemKind::Gold => item.with_value(10),
            ItemKind::Potion => item.with_value(20).with_effect("heal"),
            ItemKind::Armor => item.with_defense(1),
            ItemKind::Weapon => item.with_attack(1),
            ItemKind::Chest => item.with_contents(vec![
                PlacedItem::new(ItemKind::Gold, pos).with_value(25)
            ]),
            _ => item,
        }
    }

    pub fn with_value(mut self, value: u32) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_defense(mut self, defense: i32) -> Self {
        self.defense = Some(defense);
        self
    }

    pub fn with_attack(mut self, attack: i32) -> Self {
        self.attack = Some(attack);
        self
    }

    pub fn with_effect(mut self, effect: &str) -> Self {
        self.effect = Some(effect.to_string());
        self
    }

    pub fn with_contents(mut self, contents: Vec<PlacedItem>) -> Self {
        self.contents = contents;
        self
    }

    /// Effect kind for this item's `type` name.
    pub fn kind(&self) -> ItemKind {
        ItemKind::from_name(&self.type_name)
    }

    /// Grid position of this item.
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    /// Moves the item, returning it for chaining.
    pub fn at(mut self, pos: Position) -> Self {
        self.x = pos.x;
        self.y = pos.y;
        self
    }

    /// Stable identifier derived from type and grid position.
    pub fn stable_id(&self) -> String {
        stable_id(&self.type_name, self.position())
    }

    /// Magnitude of this item's effect, with per-kind defaults.
    pub fn amount(&self) -> i64 {
        match self.kind() {
            ItemKind::Gold => self.value.unwrap_or(10) as i64,
            ItemKind::Potion => self.value.unwrap_or(20) as i64,
            ItemKind::Armor => self.defense.unwrap_or(1) as i64,
            ItemKind::Weapon => self.attack.unwrap_or(1) as i64,
            _ => 0,
        }
    }
}

/// Player attributes touched by collection effects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub gold: u32,
    pub health: u32,
    pub max_health: u32,
    pub attack: i32,
    pub defense: i32,
}

impl PlayerStats {
    /// Creates a fresh player at full health.
    pub fn new() -> Self {
        Self {
            gold: 0,
            health: config::DEFAULT_PLAYER_HEALTH,
            max_health: config::DEFAULT_PLAYER_HEALTH,
            attack: 1,
            defense: 0,
        }
    }
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self::new()
    }
}

/// What a live world object is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    Item(PlacedItem),
    Enemy {
        kind: EnemyKind,
        health: u32,
        attack: i32,
    },
    Door,
}

/// A live object instantiated from level data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldObject {
    /// Runtime handle, unique per spawn
    pub id: EntityId,
    /// Identifier that survives re-entering the level
    pub stable_id: String,
    pub kind: ObjectKind,
    pub grid_position: Position,
    /// Top-left pixel corner of the object's tile
    pub world_position: PixelPoint,
    /// Containers only: contents already released
    pub opened: bool,
}

impl WorldObject {
    /// Returns the item record if this object is an item.
    pub fn item(&self) -> Option<&PlacedItem> {
        match &self.kind {
            ObjectKind::Item(item) => Some(item),
            _ => None,
        }
    }

    pub fn is_enemy(&self) -> bool {
        matches!(self.kind, ObjectKind::Enemy { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stable_id_composition() {
        let item = PlacedItem::new(ItemKind::Potion, Position::new(12, 4));
        assert_eq!(item.stable_id(), "potion_12_4");
        assert_eq!(stable_id("orc", Position::new(0, 9)), "orc_0_9");
    }

    #[test]
    fn test_item_symbols_are_distinct_from_enemies() {
        for kind in ItemKind::SCATTERED {
            assert_eq!(ItemKind::from_symbol(kind.symbol()), Some(kind));
            assert!(EnemyKind::from_symbol(kind.symbol()).is_none());
        }
        for kind in EnemyKind::ALL {
            assert_eq!(EnemyKind::from_symbol(kind.symbol()), Some(kind));
            assert!(ItemKind::from_symbol(kind.symbol()).is_none());
        }
    }

    #[test]
    fn test_placed_item_json_shape() {
        let item = PlacedItem::new(ItemKind::Gold, Position::new(3, 4)).with_value(25);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "gold");
        assert_eq!(json["x"], 3);
        assert_eq!(json["value"], 25);
        assert!(json.get("attack").is_none());
        assert!(json.get("contents").is_none());
    }

    #[test]
    fn test_unknown_item_type_is_misc() {
        let item: PlacedItem =
            serde_json::from_str(r#"{"type":"amulet","x":1,"y":2}"#).unwrap();
        assert_eq!(item.kind(), ItemKind::Misc);
        assert_eq!(item.position(), Position::new(1, 2));
        assert_eq!(item.stable_id(), "amulet_1_2");

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "amulet");
    }

    #[test]
    fn test_nested_contents_deserialize() {
        let json = r#"{"type":"chest","x":5,"y":5,"contents":[
            {"type":"gold","x":0,"y":0,"value":50},
            {"type":"weapon","x":0,"y":0,"attack":3}
        ]}"#;
        let chest: PlacedItem = serde_json::from_str(json).unwrap();
        assert_eq!(chest.contents.len(), 2);
        assert_eq!(chest.contents[0].amount(), 50);
        assert_eq!(chest.contents[1].amount(), 3);
    }

    #[test]
    fn test_amount_defaults() {
        let pos = Position::new(1, 1);
        assert_eq!(PlacedItem::new(ItemKind::Gold, pos).amount(), 10);
        assert_eq!(PlacedItem::new(ItemKind::Potion, pos).amount(), 20);
        assert_eq!(PlacedItem::new(ItemKind::Armor, pos).amount(), 1);
        assert_eq!(PlacedItem::new(ItemKind::Scroll, pos).amount(), 0);
    }

    #[test]
    fn test_layout_chest_holds_gold() {
        let chest = PlacedItem::from_layout_symbol(ItemKind::Chest, Position::new(2, 2));
        assert_eq!(chest.contents.len(), 1);
        assert_eq!(chest.contents[0].kind(), ItemKind::Gold);
    }

    #[test]
    fn test_player_defaults() {
        let player = PlayerStats::default();
        assert_eq!(player.health, player.max_health);
        assert_eq!(player.gold, 0);
    }
}
