//! # World State
//!
//! Bookkeeping shared between the spawner and the host game: which stable
//! identifiers have been collected or opened, and which objects are currently
//! live on the level.

use crate::{EntityId, GridConfig, Position, WorldObject};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Record of what the player already took from a level.
///
/// The spawner consults this before creating any collectable object. A
/// missing record means "not yet collected". Opened containers are tracked
/// separately: a chest stays on the level once opened, and its contents
/// must not be released again on re-entry.
pub trait WorldState {
    /// Whether the object with this stable id was collected (or defeated).
    fn is_collected(&self, stable_id: &str) -> bool;

    /// Records a collection.
    fn mark_collected(&mut self, stable_id: &str);

    /// Whether the container with this stable id was already opened.
    fn is_opened(&self, stable_id: &str) -> bool;

    /// Records that a container released its contents.
    fn mark_opened(&mut self, stable_id: &str);
}

/// In-memory `WorldState`, serializable alongside a save game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectedSet {
    collected: HashSet<String>,
    opened: HashSet<String>,
}

impl CollectedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of collected identifiers.
    pub fn len(&self) -> usize {
        self.collected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collected.is_empty()
    }
}

impl WorldState for CollectedSet {
    fn is_collected(&self, stable_id: &str) -> bool {
        self.collected.contains(stable_id)
    }

    fn mark_collected(&mut self, stable_id: &str) {
        self.collected.insert(stable_id.to_string());
    }

    fn is_opened(&self, stable_id: &str) -> bool {
        self.opened.contains(stable_id)
    }

    fn mark_opened(&mut self, stable_id: &str) {
        self.opened.insert(stable_id.to_string());
    }
}

/// Registry of live objects on the current level.
///
/// Objects are indexed both by runtime id and by stable id; at most one live
/// object exists per stable id.
#[derive(Debug, Clone)]
pub struct LiveWorld {
    /// Coordinate system used to place objects in pixel space
    pub grid: GridConfig,
    objects: HashMap<EntityId, WorldObject>,
    by_stable_id: HashMap<String, EntityId>,
}

impl LiveWorld {
    /// Creates an empty world using the given coordinate system.
    pub fn new(grid: GridConfig) -> Self {
        Self {
            grid,
            objects: HashMap::new(),
            by_stable_id: HashMap::new(),
        }
    }

    /// Adds an object. Returns false if an object with the same stable id is already live.
    pub fn insert(&mut self, object: WorldObject) -> bool {
        if self.by_stable_id.contains_key(&object.stable_id) {
            return false;
        }
        self.by_stable_id.insert(object.stable_id.clone(), object.id);
        self.objects.insert(object.id, object);
        true
    }

    /// Removes and returns an object.
    pub fn remove(&mut self, id: EntityId) -> Option<WorldObject> {
        let object = self.objects.remove(&id)?;
        self.by_stable_id.remove(&object.stable_id);
        Some(object)
    }

    pub fn get(&self, id: EntityId) -> Option<&WorldObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut WorldObject> {
        self.objects.get_mut(&id)
    }

    /// Looks up a live object by its stable id.
    pub fn find_stable(&self, stable_id: &str) -> Option<&WorldObject> {
        self.by_stable_id
            .get(stable_id)
            .and_then(|id| self.objects.get(id))
    }

    pub fn contains_stable_id(&self, stable_id: &str) -> bool {
        self.by_stable_id.contains_key(stable_id)
    }

    /// All live objects on a tile, in no particular order.
    pub fn objects_at(&self, pos: Position) -> Vec<&WorldObject> {
        self.objects
            .values()
            .filter(|object| object.grid_position == pos)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorldObject> {
        self.objects.values()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Drops every live object, e.g. when leaving the level.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.by_stable_id.clear();
    }
}
