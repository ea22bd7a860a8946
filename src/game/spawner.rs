//! # Level Content Spawner
//!
//! Turns the placed entities of a [`LevelData`] into live [`WorldObject`]s and
//! resolves what happens when the player collects one.
//!
//! Spawning is idempotent: every object carries a stable id composed of its
//! type and grid position, and nothing is created for an id that is already
//! live or that the [`WorldState`] reports as collected.

use crate::{
    new_entity_id, stable_id, CotwError, CotwResult, EnemyKind, EntityId, ItemKind, LevelData,
    LiveWorld, ObjectKind, PlacedItem, PlayerStats, Position, Symbol, WorldObject, WorldState,
};
use log::{debug, info};
use rand::Rng;

/// Offsets tried per content item when a chest is opened.
const CONTENT_PLACEMENT_ATTEMPTS: u32 = 9;

/// Counts from one spawn pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpawnReport {
    pub spawned: usize,
    /// Skipped because the world state recorded them as collected
    pub skipped_collected: usize,
    /// Skipped because an object with the same stable id is already live
    pub skipped_live: usize,
}

/// Result of the player collecting an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectOutcome {
    Gold { amount: u32 },
    /// Health actually restored after capping at max health
    Healed { amount: u32 },
    Defense { amount: i32 },
    Attack { amount: i32 },
    /// The chest stays in the world, opened; its contents were spawned nearby
    ChestOpened { released: Vec<EntityId> },
    AlreadyOpened,
    /// An item with no effect, removed from the world
    Discarded { kind: ItemKind },
    /// Enemies and doors cannot be collected
    NotCollectable,
}

/// Creates live objects from level data.
#[derive(Debug, Clone)]
pub struct LevelSpawner {
    /// Also spawn items, enemies and doors found as layout symbols
    pub include_layout: bool,
}

impl LevelSpawner {
    pub fn new() -> Self {
        Self {
            include_layout: true,
        }
    }

    /// Spawner that only instantiates the level's explicit `items` list.
    pub fn items_only() -> Self {
        Self {
            include_layout: false,
        }
    }

    /// Instantiates every not-yet-collected entity of `level` into `world`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cotw::{CollectedSet, GenerationConfig, Generator, GridConfig, LevelSpawner,
    ///            LiveWorld, RoomCorridorGenerator};
    ///
    /// let config = GenerationConfig::new(7);
    /// let mut rng = cotw::create_rng(&config);
    /// let level = RoomCorridorGenerator::new().generate(&config, &mut rng).level;
    ///
    /// let mut world = LiveWorld::new(GridConfig::for_level(&level));
    /// let state = CollectedSet::new();
    /// let first = LevelSpawner::new().spawn(&level, &mut world, &state);
    /// let second = LevelSpawner::new().spawn(&level, &mut world, &state);
    /// assert!(first.spawned > 0);
    /// assert_eq!(second.spawned, 0);
    /// ```
    pub fn spawn(
        &self,
        level: &LevelData,
        world: &mut LiveWorld,
        state: &dyn WorldState,
    ) -> SpawnReport {
        let mut report = SpawnReport::default();

        for item in &level.items {
            spawn_item(world, state, item.clone(), &mut report);
        }

        if self.include_layout {
            self.spawn_layout(level, world, state, &mut report);
        }

        info!(
            "Spawned {} objects for level '{}' ({} collected, {} already live)",
            report.spawned, level.id, report.skipped_collected, report.skipped_live
        );
        report
    }

    fn spawn_layout(
        &self,
        level: &LevelData,
        world: &mut LiveWorld,
        state: &dyn WorldState,
        report: &mut SpawnReport,
    ) {
        for (y, row) in level.layout.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                let pos = Position::new(x as i32, y as i32);
                match Symbol::from_char(c) {
                    Some(Symbol::Item(kind)) => {
                        spawn_item(world, state, PlacedItem::from_layout_symbol(kind, pos), report);
                    }
                    Some(Symbol::Enemy(kind)) => {
                        let object_kind = ObjectKind::Enemy {
                            kind,
                            health: kind.base_health(),
                            attack: kind.base_attack(),
                        };
                        let id = stable_id(kind.name(), pos);
                        spawn_object(world, state, id, pos, object_kind, report);
                    }
                    Some(Symbol::Door) => {
                        let id = stable_id("door", pos);
                        spawn_object(world, state, id, pos, ObjectKind::Door, report);
                    }
                    Some(_) => {}
                    None => debug!("Ignoring unknown layout symbol '{}' at {:?}", c, pos),
                }
            }
        }
    }
}

impl Default for LevelSpawner {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawns a single item unless it was collected or is already live.
pub fn spawn_item(
    world: &mut LiveWorld,
    state: &dyn WorldState,
    item: PlacedItem,
    report: &mut SpawnReport,
) -> Option<EntityId> {
    let key = item.stable_id();
    let pos = item.position();
    spawn_object(world, state, key, pos, ObjectKind::Item(item), report)
}

fn spawn_object(
    world: &mut LiveWorld,
    state: &dyn WorldState,
    key: String,
    pos: Position,
    kind: ObjectKind,
    report: &mut SpawnReport,
) -> Option<EntityId> {
    if state.is_collected(&key) {
        report.skipped_collected += 1;
        return None;
    }
    if world.contains_stable_id(&key) {
        report.skipped_live += 1;
        return None;
    }

    let opened = matches!(&kind, ObjectKind::Item(item) if item.kind() == ItemKind::Chest)
        && state.is_opened(&key);
    let object = WorldObject {
        id: new_entity_id(),
        stable_id: key,
        kind,
        grid_position: pos,
        world_position: world.grid.grid_to_pixel(pos),
        opened,
    };
    let id = object.id;
    world.insert(object);
    report.spawned += 1;
    Some(id)
}

/// Applies the effect of collecting a live object.
///
/// Non-container items are removed from the world and recorded as collected.
/// Chests stay in place, are marked opened and release their contents at
/// random offsets of at most one tile.
pub fn collect<R: Rng + ?Sized>(
    world: &mut LiveWorld,
    state: &mut dyn WorldState,
    player: &mut PlayerStats,
    id: EntityId,
    rng: &mut R,
) -> CotwResult<CollectOutcome> {
    let object = world
        .get(id)
        .ok_or_else(|| CotwError::UnknownObject(id.to_string()))?;
    let item = match &object.kind {
        ObjectKind::Item(item) => item.clone(),
        _ => return Ok(CollectOutcome::NotCollectable),
    };

    if item.kind() == ItemKind::Chest {
        return open_chest(world, state, id, &item, rng);
    }

    if let Some(object) = world.remove(id) {
        state.mark_collected(&object.stable_id);
    }
    let outcome = apply_item_effect(player, &item);
    debug!("Collected {} at {:?}: {:?}", item.type_name, item.position(), outcome);
    Ok(outcome)
}

/// Collects every item on a tile, as reported by an engine collision.
pub fn collect_at<R: Rng + ?Sized>(
    world: &mut LiveWorld,
    state: &mut dyn WorldState,
    player: &mut PlayerStats,
    pos: Position,
    rng: &mut R,
) -> CotwResult<Vec<CollectOutcome>> {
    let mut ids: Vec<(String, EntityId)> = world
        .objects_at(pos)
        .into_iter()
        .filter(|object| object.item().is_some())
        .map(|object| (object.stable_id.clone(), object.id))
        .collect();
    // Deterministic order regardless of hash map iteration.
    ids.sort();

    ids.into_iter()
        .map(|(_, id)| collect(world, state, player, id, rng))
        .collect()
}

/// Mutates the player according to an item's type.
pub fn apply_item_effect(player: &mut PlayerStats, item: &PlacedItem) -> CollectOutcome {
    let amount = item.amount();
    match item.kind() {
        ItemKind::Gold => {
            let amount = amount.clamp(0, u32::MAX as i64) as u32;
            player.gold = player.gold.saturating_add(amount);
            CollectOutcome::Gold { amount }
        }
        ItemKind::Potion => {
            let before = player.health;
            let restore = amount.clamp(0, u32::MAX as i64) as u32;
            let capped = before.saturating_add(restore).min(player.max_health);
            player.health = capped.max(before);
            CollectOutcome::Healed {
                amount: player.health.saturating_sub(before),
            }
        }
        ItemKind::Armor => {
            let amount = amount as i32;
            player.defense += amount;
            CollectOutcome::Defense { amount }
        }
        ItemKind::Weapon => {
            let amount = amount as i32;
            player.attack += amount;
            CollectOutcome::Attack { amount }
        }
        kind => CollectOutcome::Discarded { kind },
    }
}

fn open_chest<R: Rng + ?Sized>(
    world: &mut LiveWorld,
    state: &mut dyn WorldState,
    id: EntityId,
    chest: &PlacedItem,
    rng: &mut R,
) -> CotwResult<CollectOutcome> {
    let object = world
        .get_mut(id)
        .ok_or_else(|| CotwError::UnknownObject(id.to_string()))?;
    if object.opened {
        return Ok(CollectOutcome::AlreadyOpened);
    }
    object.opened = true;
    let origin = object.grid_position;
    state.mark_opened(&object.stable_id);

    let mut report = SpawnReport::default();
    let mut released = Vec::new();
    for content in &chest.contents {
        let placed = (0..CONTENT_PLACEMENT_ATTEMPTS).find_map(|_| {
            let offset = Position::new(rng.gen_range(-1..=1), rng.gen_range(-1..=1));
            spawn_item(world, &*state, content.clone().at(origin + offset), &mut report)
        });
        match placed {
            Some(content_id) => released.push(content_id),
            None => debug!("No free tile near {:?} for {} from chest", origin, content.type_name),
        }
    }

    debug!("Opened chest at {:?}, released {} items", origin, released.len());
    Ok(CollectOutcome::ChestOpened { released })
}

/// Removes a defeated enemy and records it so it stays dead on re-entry.
///
/// Returns `None` without side effects if the object is not an enemy.
pub fn defeat_enemy(
    world: &mut LiveWorld,
    state: &mut dyn WorldState,
    id: EntityId,
) -> CotwResult<Option<EnemyKind>> {
    let object = world
        .get(id)
        .ok_or_else(|| CotwError::UnknownObject(id.to_string()))?;
    let kind = match object.kind {
        ObjectKind::Enemy { kind, .. } => kind,
        _ => return Ok(None),
    };

    if let Some(object) = world.remove(id) {
        state.mark_collected(&object.stable_id);
    }
    Ok(Some(kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CollectedSet, FogOfWar, GridConfig, Lighting};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn level_with(items: Vec<PlacedItem>, rows: &[&str]) -> LevelData {
        let layout: Vec<String> = rows.iter().map(|r| r.to_string()).collect();
        LevelData {
            id: "spawn-test".to_string(),
            name: "Spawn Test".to_string(),
            width: layout[0].len() as u32,
            height: layout.len() as u32,
            tile_size: 32,
            layout,
            player_spawn: Position::new(1, 1),
            lighting: Lighting::around_markers(Position::new(1, 1), Position::new(2, 1)),
            fog_of_war: FogOfWar::default(),
            items,
        }
    }

    fn spawn_one(item: PlacedItem) -> (LiveWorld, EntityId) {
        let level = level_with(vec![item], &["#####", "#...#", "#####"]);
        let mut world = LiveWorld::new(GridConfig::for_level(&level));
        LevelSpawner::new().spawn(&level, &mut world, &CollectedSet::new());
        let id = world.iter().next().expect("one object").id;
        (world, id)
    }

    #[test]
    fn test_spawn_places_objects_in_pixel_space() {
        let level = level_with(
            vec![PlacedItem::new(ItemKind::Gold, Position::new(2, 1)).with_value(5)],
            &["#####", "#.+g#", "#####"],
        );
        let mut world = LiveWorld::new(GridConfig::for_level(&level));
        let report = LevelSpawner::new().spawn(&level, &mut world, &CollectedSet::new());

        assert_eq!(report.spawned, 3);
        let gold = world.find_stable("gold_2_1").unwrap();
        assert_eq!(gold.world_position.x, 64.0);
        assert_eq!(gold.world_position.y, 32.0);
        assert!(world.find_stable("door_2_1").is_some());
        assert!(world.find_stable("goblin_3_1").unwrap().is_enemy());
    }

    #[test]
    fn test_spawn_skips_collected_items() {
        let level = level_with(
            vec![
                PlacedItem::new(ItemKind::Gold, Position::new(1, 1)),
                PlacedItem::new(ItemKind::Potion, Position::new(2, 1)),
            ],
            &["#####", "#...#", "#####"],
        );
        let mut state = CollectedSet::new();
        state.mark_collected("gold_1_1");

        let mut world = LiveWorld::new(GridConfig::for_level(&level));
        let report = LevelSpawner::items_only().spawn(&level, &mut world, &state);
        assert_eq!(report.spawned, 1);
        assert_eq!(report.skipped_collected, 1);
        assert!(world.find_stable("gold_1_1").is_none());
        assert!(world.find_stable("potion_2_1").is_some());
    }

    #[test]
    fn test_unknown_item_types_keep_their_names() {
        let tile = Position::new(2, 1);
        let level = level_with(
            vec![PlacedItem::named("idol", tile), PlacedItem::named("amulet", tile)],
            &["#####", "#...#", "#####"],
        );
        let mut world = LiveWorld::new(GridConfig::for_level(&level));
        let report = LevelSpawner::items_only().spawn(&level, &mut world, &CollectedSet::new());
        assert_eq!(report.spawned, 2);
        assert_eq!(report.skipped_live, 0);
        assert!(world.find_stable("idol_2_1").is_some());
        assert!(world.find_stable("amulet_2_1").is_some());

        let reloaded = LevelData::from_json(&level.to_json().unwrap()).unwrap();
        let names: Vec<&str> = reloaded.items.iter().map(|i| i.type_name.as_str()).collect();
        assert_eq!(names, ["idol", "amulet"]);
    }

    #[test]
    fn test_spawn_twice_creates_no_duplicates() {
        let level = level_with(
            vec![PlacedItem::new(ItemKind::Armor, Position::new(3, 1))],
            &["#####", "#$.r#", "#####"],
        );
        let mut world = LiveWorld::new(GridConfig::for_level(&level));
        let state = CollectedSet::new();
        let spawner = LevelSpawner::new();

        let first = spawner.spawn(&level, &mut world, &state);
        let second = spawner.spawn(&level, &mut world, &state);
        assert_eq!(first.spawned, 3);
        assert_eq!(second.spawned, 0);
        assert_eq!(second.skipped_live, 3);
        assert_eq!(world.len(), 3);
    }

    #[test]
    fn test_collect_gold() {
        let (mut world, id) =
            spawn_one(PlacedItem::new(ItemKind::Gold, Position::new(1, 1)).with_value(40));
        let mut state = CollectedSet::new();
        let mut player = PlayerStats::new();
        let mut rng = StdRng::seed_from_u64(1);

        let outcome = collect(&mut world, &mut state, &mut player, id, &mut rng).unwrap();
        assert_eq!(outcome, CollectOutcome::Gold { amount: 40 });
        assert_eq!(player.gold, 40);
        assert!(world.is_empty());
        assert!(state.is_collected("gold_1_1"));
    }

    #[test]
    fn test_collect_potion_caps_health() {
        let (mut world, id) =
            spawn_one(PlacedItem::new(ItemKind::Potion, Position::new(1, 1)).with_value(50));
        let mut state = CollectedSet::new();
        let mut player = PlayerStats::new();
        player.health = 80;
        let mut rng = StdRng::seed_from_u64(1);

        let outcome = collect(&mut world, &mut state, &mut player, id, &mut rng).unwrap();
        assert_eq!(outcome, CollectOutcome::Healed { amount: 20 });
        assert_eq!(player.health, player.max_health);
    }

    #[test]
    fn test_collect_armor_and_weapon() {
        let mut state = CollectedSet::new();
        let mut player = PlayerStats::new();
        let mut rng = StdRng::seed_from_u64(1);

        let (mut world, id) =
            spawn_one(PlacedItem::new(ItemKind::Armor, Position::new(1, 1)).with_defense(3));
        let outcome = collect(&mut world, &mut state, &mut player, id, &mut rng).unwrap();
        assert_eq!(outcome, CollectOutcome::Defense { amount: 3 });
        assert_eq!(player.defense, 3);

        let (mut world, id) =
            spawn_one(PlacedItem::new(ItemKind::Weapon, Position::new(2, 1)).with_attack(2));
        let outcome = collect(&mut world, &mut state, &mut player, id, &mut rng).unwrap();
        assert_eq!(outcome, CollectOutcome::Attack { amount: 2 });
        assert_eq!(player.attack, 3);
    }

    #[test]
    fn test_collect_other_item_is_destroyed() {
        let (mut world, id) = spawn_one(PlacedItem::new(ItemKind::Key, Position::new(1, 1)));
        let mut state = CollectedSet::new();
        let mut player = PlayerStats::new();
        let before = player.clone();
        let mut rng = StdRng::seed_from_u64(1);

        let outcome = collect(&mut world, &mut state, &mut player, id, &mut rng).unwrap();
        assert_eq!(outcome, CollectOutcome::Discarded { kind: ItemKind::Key });
        assert_eq!(player, before);
        assert!(world.is_empty());
    }

    #[test]
    fn test_open_chest_releases_contents_once() {
        let chest = PlacedItem::new(ItemKind::Chest, Position::new(2, 1)).with_contents(vec![
            PlacedItem::new(ItemKind::Gold, Position::origin()).with_value(30),
            PlacedItem::new(ItemKind::Potion, Position::origin()),
        ]);
        let (mut world, id) = spawn_one(chest);
        let mut state = CollectedSet::new();
        let mut player = PlayerStats::new();
        let mut rng = StdRng::seed_from_u64(99);

        let outcome = collect(&mut world, &mut state, &mut player, id, &mut rng).unwrap();
        let released = match outcome {
            CollectOutcome::ChestOpened { released } => released,
            other => panic!("unexpected outcome {:?}", other),
        };
        assert_eq!(released.len(), 2);
        assert_eq!(world.len(), 3);

        let chest = world.get(id).expect("chest stays in the world");
        assert!(chest.opened);
        assert!(state.is_opened("chest_2_1"));
        for content_id in &released {
            let content = world.get(*content_id).unwrap();
            assert!(content.grid_position.manhattan_distance(Position::new(2, 1)) <= 2);
        }

        let again = collect(&mut world, &mut state, &mut player, id, &mut rng).unwrap();
        assert_eq!(again, CollectOutcome::AlreadyOpened);
        assert_eq!(world.len(), 3);
    }

    #[test]
    fn test_opened_chest_respawns_opened() {
        let level = level_with(
            vec![PlacedItem::new(ItemKind::Chest, Position::new(1, 1))],
            &["#####", "#...#", "#####"],
        );
        let mut state = CollectedSet::new();
        state.mark_opened("chest_1_1");

        let mut world = LiveWorld::new(GridConfig::for_level(&level));
        LevelSpawner::new().spawn(&level, &mut world, &state);
        assert!(world.find_stable("chest_1_1").unwrap().opened);
    }

    #[test]
    fn test_collect_enemy_is_not_collectable() {
        let level = level_with(Vec::new(), &["#####", "#.o.#", "#####"]);
        let mut world = LiveWorld::new(GridConfig::for_level(&level));
        LevelSpawner::new().spawn(&level, &mut world, &CollectedSet::new());
        let id = world.find_stable("orc_2_1").unwrap().id;

        let mut state = CollectedSet::new();
        let mut player = PlayerStats::new();
        let mut rng = StdRng::seed_from_u64(1);
        let outcome = collect(&mut world, &mut state, &mut player, id, &mut rng).unwrap();
        assert_eq!(outcome, CollectOutcome::NotCollectable);
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn test_defeated_enemy_stays_dead() {
        let level = level_with(Vec::new(), &["#####", "#.o.#", "#####"]);
        let mut world = LiveWorld::new(GridConfig::for_level(&level));
        let mut state = CollectedSet::new();
        LevelSpawner::new().spawn(&level, &mut world, &state);
        let id = world.find_stable("orc_2_1").unwrap().id;

        assert_eq!(defeat_enemy(&mut world, &mut state, id).unwrap(), Some(EnemyKind::Orc));
        assert!(world.is_empty());

        let report = LevelSpawner::new().spawn(&level, &mut world, &state);
        assert_eq!(report.spawned, 0);
        assert_eq!(report.skipped_collected, 1);
    }

    #[test]
    fn test_collect_unknown_object() {
        let mut world = LiveWorld::new(GridConfig::default());
        let mut state = CollectedSet::new();
        let mut player = PlayerStats::new();
        let mut rng = StdRng::seed_from_u64(1);
        let result = collect(&mut world, &mut state, &mut player, new_entity_id(), &mut rng);
        assert!(matches!(result, Err(CotwError::UnknownObject(_))));
    }

    #[test]
    fn test_collect_at_tile() {
        let level = level_with(
            vec![
                PlacedItem::new(ItemKind::Gold, Position::new(1, 1)).with_value(3),
                PlacedItem::new(ItemKind::Weapon, Position::new(1, 1)),
            ],
            &["#####", "#...#", "#####"],
        );
        let mut world = LiveWorld::new(GridConfig::for_level(&level));
        let mut state = CollectedSet::new();
        LevelSpawner::new().spawn(&level, &mut world, &state);

        let mut player = PlayerStats::new();
        let mut rng = StdRng::seed_from_u64(1);
        let outcomes =
            collect_at(&mut world, &mut state, &mut player, Position::new(1, 1), &mut rng).unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(player.gold, 3);
        assert_eq!(player.attack, 2);
        assert!(world.is_empty());
    }
}
