//! A running level: entities, physics wiring, lifecycle and the per-frame tick.
//!
//! Lifecycle is `preload()` → `create()` → `step()` repeatedly. Hooks pushed by
//! the builder run inside preload/create in registration order. The level
//! starts paused and only unpauses once `create()` succeeds.
//!
//! Entity type lives on the controller. The level keeps side indices
//! (type → ids, and type → ids interested in overlapping that type) plus the
//! matching physics groups.

use glam::Vec2;
use std::collections::{BTreeMap, BTreeSet};

use hb_core::input::InputState;
use hb_core::schedule::Scheduler;

use crate::assets::AssetLoader;
use crate::config::GameConfig;
use crate::controller::{EntityController, EntityId, EntityType, PlayerBindings};
use crate::display::{Camera, DisplayList, ObjectId, Visual};
use crate::error::LevelError;
use crate::handlers;
use crate::inventory::Inventory;
use crate::physics::{Body, Contact, ContactTag, GroupId, PhysicsWorld, Target};
use crate::tilemap::TiledMap;

pub type LevelHook = Box<dyn FnMut(&mut Level) -> Result<(), LevelError>>;

/// Called for entity-vs-entity overlaps with (entity of the overlapped type,
/// entity interested in it).
pub type EntityOverlapHook = Box<dyn FnMut(&mut Level, EntityId, EntityId)>;

pub const DEATH_TINT: u32 = 0xff0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelTask {
    Despawn(EntityId),
    Reload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelStatus {
    Running,
    ReloadRequested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HookStage {
    Preload,
    Create,
}

/// The tile map a level was built from.
#[derive(Debug, Clone)]
pub struct LevelTilemap {
    pub key: String,
    pub path: String,
    pub tileset: String,
    pub tile_size: Vec2,
    pub map: TiledMap,
}

pub struct Level {
    pub name: String,
    pub config: GameConfig,
    pub inventory: Inventory,
    pub display: DisplayList,
    pub physics: PhysicsWorld,
    pub camera: Camera,
    pub loader: AssetLoader,
    pub input: InputState,
    pub hero: Option<ObjectId>,
    pub hero_controller: Option<EntityId>,
    pub tilemap: Option<LevelTilemap>,
    pub collision_layer: Option<ObjectId>,
    pub layers: Vec<(String, ObjectId)>,
    pub paused: bool,
    entities: Vec<EntityController>,
    next_entity_id: u32,
    entity_index: BTreeMap<EntityType, BTreeSet<EntityId>>,
    overlap_index: BTreeMap<EntityType, BTreeSet<EntityId>>,
    entity_groups: BTreeMap<EntityType, GroupId>,
    overlap_groups: BTreeMap<EntityType, GroupId>,
    wired_overlaps: BTreeSet<EntityType>,
    actors: GroupId,
    platforms: Option<GroupId>,
    touchables: Option<GroupId>,
    created: bool,
    elapsed_ms: f64,
    scheduler: Scheduler<LevelTask>,
    preload_hooks: Vec<LevelHook>,
    create_hooks: Vec<LevelHook>,
    overlap_hook: Option<EntityOverlapHook>,
}

impl Level {
    pub fn new(name: &str, inventory: Inventory, config: GameConfig) -> Self {
        let mut physics = PhysicsWorld::new(Vec2::new(0.0, config.physics.gravity_y));
        let actors = physics.create_group();
        Self {
            name: name.to_string(),
            config,
            inventory,
            display: DisplayList::new(),
            physics,
            camera: Camera::new(),
            loader: AssetLoader::new("."),
            input: InputState::new(),
            hero: None,
            hero_controller: None,
            tilemap: None,
            collision_layer: None,
            layers: Vec::new(),
            paused: true,
            entities: Vec::new(),
            next_entity_id: 0,
            entity_index: BTreeMap::new(),
            overlap_index: BTreeMap::new(),
            entity_groups: BTreeMap::new(),
            overlap_groups: BTreeMap::new(),
            wired_overlaps: BTreeSet::new(),
            actors,
            platforms: None,
            touchables: None,
            created: false,
            elapsed_ms: 0.0,
            scheduler: Scheduler::new(),
            preload_hooks: Vec::new(),
            create_hooks: Vec::new(),
            overlap_hook: None,
        }
    }

    pub fn on_preload(
        &mut self,
        hook: impl FnMut(&mut Level) -> Result<(), LevelError> + 'static,
    ) {
        self.preload_hooks.push(Box::new(hook));
    }

    pub fn on_create(&mut self, hook: impl FnMut(&mut Level) -> Result<(), LevelError> + 'static) {
        self.create_hooks.push(Box::new(hook));
    }

    /// Replace the entity-vs-entity overlap handler. Without one, overlaps
    /// are only logged.
    pub fn set_entity_overlap_hook(
        &mut self,
        hook: impl FnMut(&mut Level, EntityId, EntityId) + 'static,
    ) {
        self.overlap_hook = Some(Box::new(hook));
    }

    pub fn preload(&mut self) -> Result<(), LevelError> {
        self.run_hooks(HookStage::Preload)?;
        let resolved = self.loader.load_pending()?;
        log::info!("Level '{}' preloaded {} assets", self.name, resolved);
        Ok(())
    }

    pub fn create(&mut self) -> Result<(), LevelError> {
        self.platforms = Some(self.physics.create_group());
        self.touchables = Some(self.physics.create_group());

        self.run_hooks(HookStage::Create)?;

        let platforms = self.platforms()?;
        let touchables = self.touchables()?;
        self.physics
            .add_collider(self.actors, Target::Group(platforms), ContactTag::Dispatch);
        self.physics
            .add_collider(self.actors, Target::TileLayer, ContactTag::Silent);
        self.physics
            .add_overlap(self.actors, touchables, ContactTag::Dispatch);

        let interested: Vec<EntityType> = self.overlap_index.keys().copied().collect();
        for ty in interested {
            self.wire_entity_overlap(ty);
        }

        self.created = true;
        self.paused = false;
        log::info!(
            "Level '{}' created: {} entities, {} display objects, {} interactions",
            self.name,
            self.entities.len(),
            self.display.len(),
            self.physics.interaction_count()
        );
        Ok(())
    }

    pub fn is_created(&self) -> bool {
        self.created
    }

    pub fn platforms(&self) -> Result<GroupId, LevelError> {
        self.platforms.ok_or(LevelError::NotCreated("platforms group"))
    }

    pub fn touchables(&self) -> Result<GroupId, LevelError> {
        self.touchables.ok_or(LevelError::NotCreated("touchables group"))
    }

    pub fn actors(&self) -> GroupId {
        self.actors
    }

    /// Register a controller. Its object should already have a physics body.
    pub fn add(&mut self, mut entity: EntityController) -> EntityId {
        self.next_entity_id += 1;
        let id = EntityId::new(self.next_entity_id);
        entity.id = id;

        match self.physics.body_mut(entity.object) {
            Some(body) => entity.apply_velocity_caps(body),
            None => log::warn!(
                "Entity {} added without a physics body (object {})",
                id.raw(),
                entity.object.raw()
            ),
        }

        self.physics.group_add(self.actors, entity.object);
        let group = self.entity_group(entity.entity_type);
        self.physics.group_add(group, entity.object);
        self.entity_index
            .entry(entity.entity_type)
            .or_default()
            .insert(id);

        for &ty in &entity.overlaps_with {
            let group = self.overlap_group(ty);
            self.physics.group_add(group, entity.object);
            self.overlap_index.entry(ty).or_default().insert(id);
            if self.created {
                self.wire_entity_overlap(ty);
            }
        }

        log::debug!("Added {:?} entity {}", entity.entity_type, id.raw());
        self.entities.push(entity);
        id
    }

    pub fn add_player_controller(&mut self, object: ObjectId) -> EntityId {
        let bindings = self.config.controls.bindings().unwrap_or_else(|e| {
            log::warn!("{e}; falling back to default bindings");
            PlayerBindings::default()
        });
        self.add(EntityController::player(object, self.config.motion, bindings))
    }

    /// Dynamic physics sprite, not yet controlled by anything.
    pub fn add_dynamic_sprite(&mut self, position: Vec2, size: Vec2, texture: &str) -> ObjectId {
        let id = self.display.add(
            position,
            size,
            Visual::Image {
                texture: texture.to_string(),
            },
        );
        self.physics.add_body(id, Body::dynamic(size));
        id
    }

    /// Static body in `group`.
    pub fn add_static_object(
        &mut self,
        group: GroupId,
        position: Vec2,
        size: Vec2,
        visual: Visual,
    ) -> ObjectId {
        let id = self.display.add(position, size, visual);
        self.physics.add_body(id, Body::fixed(size));
        self.physics.group_add(group, id);
        id
    }

    /// Static platform centred at (x, y) in the platforms group.
    pub fn add_platform(&mut self, x: f32, y: f32, texture: &str) -> Result<ObjectId, LevelError> {
        let group = self.platforms()?;
        let size = self
            .loader
            .image_size(texture)
            .unwrap_or_else(|| Vec2::from(self.config.default_image_size));
        Ok(self.add_static_object(
            group,
            Vec2::new(x, y),
            size,
            Visual::Image {
                texture: texture.to_string(),
            },
        ))
    }

    /// Hero sprite at `position` with a player controller; the camera
    /// follows it.
    pub fn spawn_hero(&mut self, position: Vec2) -> EntityId {
        let hero = self.config.hero.clone();
        let size = Vec2::new(hero.width, hero.height) * hero.scale;
        let object = self.add_dynamic_sprite(position, size, &hero.asset_key);
        if let Some(obj) = self.display.get_mut(object) {
            obj.scale = hero.scale;
            obj.tint = Some(hero.tint);
        }

        let controller = self.add_player_controller(object);
        self.hero = Some(object);
        self.hero_controller = Some(controller);
        self.camera.start_follow(object);
        log::info!("Hero spawned at ({}, {})", position.x, position.y);
        controller
    }

    pub fn entities(&self) -> &[EntityController] {
        &self.entities
    }

    pub fn find(&self, object: ObjectId) -> Option<&EntityController> {
        self.entities.iter().find(|entity| entity.object == object)
    }

    pub fn find_mut(&mut self, object: ObjectId) -> Option<&mut EntityController> {
        self.entities.iter_mut().find(|entity| entity.object == object)
    }

    pub fn entity(&self, id: EntityId) -> Option<&EntityController> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut EntityController> {
        self.entities.iter_mut().find(|entity| entity.id == id)
    }

    pub fn entities_of_type(&self, ty: EntityType) -> Vec<EntityId> {
        self.entity_index
            .get(&ty)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn interested_in(&self, ty: EntityType) -> Vec<EntityId> {
        self.overlap_index
            .get(&ty)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Remove the entity and free its object. Unknown ids are ignored.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        let Some(index) = self.entities.iter().position(|entity| entity.id == id) else {
            log::warn!("destroy() called for unknown entity {}", id.raw());
            return false;
        };
        let entity = self.entities.remove(index);
        for ids in self.entity_index.values_mut() {
            ids.remove(&id);
        }
        for ids in self.overlap_index.values_mut() {
            ids.remove(&id);
        }
        if self.hero_controller == Some(id) {
            self.hero_controller = None;
            self.hero = None;
        }
        self.destroy_object(entity.object);
        log::debug!("Destroyed entity {}", id.raw());
        true
    }

    /// Remove a game object and its body. Returns whether it existed.
    pub fn destroy_object(&mut self, object: ObjectId) -> bool {
        let existed = self.display.remove(object).is_some();
        self.physics.remove(object);
        existed
    }

    pub fn update(&mut self, elapsed: f64, _delta: f64) {
        self.elapsed_ms = elapsed;
        if self.paused {
            return;
        }
        for entity in &mut self.entities {
            if let Some(body) = self.physics.body_mut(entity.object) {
                entity.update(body, &self.input);
            }
        }
    }

    /// Kill `actor`: freeze and tint it, then reload (hero) or despawn
    /// (anything else) after the configured delay.
    pub fn death(&mut self, actor: ObjectId) {
        if let Some(body) = self.physics.body_mut(actor) {
            if !body.enabled {
                log::trace!("Object {} is already dead", actor.raw());
                return;
            }
            body.enabled = false;
            body.stop();
        }
        if let Some(obj) = self.display.get_mut(actor) {
            obj.tint = Some(DEATH_TINT);
        }

        let Some(entity) = self.find_mut(actor) else {
            log::warn!("death() for object {} with no controller", actor.raw());
            return;
        };
        entity.locked = true;
        let id = entity.id;

        let due = self.elapsed_ms + self.config.death_delay_ms;
        if self.hero == Some(actor) {
            log::info!("YOU DIED!!!! Reloading '{}'", self.name);
            self.paused = true;
            self.scheduler.schedule_at(due, LevelTask::Reload);
        } else {
            log::info!("Entity {} died", id.raw());
            self.scheduler.schedule_at(due, LevelTask::Despawn(id));
        }
    }

    /// One host tick: controllers, physics, contact dispatch, camera, then
    /// any scheduled tasks due at `elapsed`.
    pub fn step(&mut self, elapsed: f64, delta: f64) -> LevelStatus {
        self.update(elapsed, delta);

        let contacts = self
            .physics
            .step((delta / 1000.0) as f32, &mut self.display);
        self.dispatch(contacts);
        self.camera.update(&self.display);

        let mut status = LevelStatus::Running;
        for task in self.scheduler.advance_to(elapsed) {
            match task {
                LevelTask::Despawn(id) => {
                    self.destroy(id);
                }
                LevelTask::Reload => status = LevelStatus::ReloadRequested,
            }
        }

        status
    }

    /// Cancel every pending task. The level must not fire anything after this.
    pub fn teardown(&mut self) {
        let cancelled = self.scheduler.cancel_all();
        self.paused = true;
        log::info!("Level '{}' torn down ({} pending tasks cancelled)", self.name, cancelled);
    }

    pub fn pending_tasks(&self) -> usize {
        self.scheduler.len()
    }

    fn dispatch(&mut self, contacts: Vec<Contact>) {
        for contact in contacts {
            if !self.display.contains(contact.actor) || !self.display.contains(contact.other) {
                log::trace!(
                    "Skipping contact {} -> {}: object already destroyed",
                    contact.actor.raw(),
                    contact.other.raw()
                );
                continue;
            }
            match contact.tag {
                ContactTag::Silent => {}
                ContactTag::Dispatch => handlers::handle(contact.actor, contact.other, self),
                ContactTag::EntityOverlap(ty) => {
                    self.entity_overlap(ty, contact.actor, contact.other)
                }
            }
        }
    }

    fn entity_overlap(&mut self, ty: EntityType, actor: ObjectId, other: ObjectId) {
        let (Some(a), Some(b)) = (
            self.find(actor).map(EntityController::id),
            self.find(other).map(EntityController::id),
        ) else {
            return;
        };
        match self.overlap_hook.take() {
            Some(mut hook) => {
                hook(self, a, b);
                if self.overlap_hook.is_none() {
                    self.overlap_hook = Some(hook);
                }
            }
            None => log::debug!(
                "{:?} entity {} overlapped entity {}; no overlap hook installed",
                ty,
                a.raw(),
                b.raw()
            ),
        }
    }

    fn entity_group(&mut self, ty: EntityType) -> GroupId {
        if let Some(group) = self.entity_groups.get(&ty) {
            return *group;
        }
        let group = self.physics.create_group();
        self.entity_groups.insert(ty, group);
        group
    }

    fn overlap_group(&mut self, ty: EntityType) -> GroupId {
        if let Some(group) = self.overlap_groups.get(&ty) {
            return *group;
        }
        let group = self.physics.create_group();
        self.overlap_groups.insert(ty, group);
        group
    }

    fn wire_entity_overlap(&mut self, ty: EntityType) {
        if !self.wired_overlaps.insert(ty) {
            return;
        }
        let entities = self.entity_group(ty);
        let interested = self.overlap_group(ty);
        self.physics
            .add_overlap(entities, interested, ContactTag::EntityOverlap(ty));
    }

    fn run_hooks(&mut self, stage: HookStage) -> Result<(), LevelError> {
        let mut hooks = match stage {
            HookStage::Preload => std::mem::take(&mut self.preload_hooks),
            HookStage::Create => std::mem::take(&mut self.create_hooks),
        };

        let mut result = Ok(());
        for hook in hooks.iter_mut() {
            result = hook(self);
            if result.is_err() {
                break;
            }
        }

        // Hooks registered while running go after the existing ones.
        let slot = match stage {
            HookStage::Preload => &mut self.preload_hooks,
            HookStage::Create => &mut self.create_hooks,
        };
        hooks.append(slot);
        *slot = hooks;
        result
    }
}

impl std::fmt::Debug for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Level")
            .field("name", &self.name)
            .field("paused", &self.paused)
            .field("hero", &self.hero)
            .field("entities", &self.entities.len())
            .field("pending_tasks", &self.scheduler.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::HorDir;
    use hb_core::input::Key;
    use std::cell::RefCell;
    use std::rc::Rc;

    const FRAME_MS: f64 = 1000.0 / 60.0;

    fn created_level() -> Level {
        let mut level = Level::new("test", Inventory::new(), GameConfig::default());
        level.create().expect("empty level creates");
        level
    }

    fn enemy(level: &mut Level, x: f32) -> EntityId {
        let object = level.add_dynamic_sprite(Vec2::new(x, 100.0), Vec2::splat(32.0), "enemy");
        let motion = level.config.motion;
        level.add(EntityController::simple_enemy(object, motion, None))
    }

    #[test]
    fn starts_paused_and_create_unpauses() {
        let mut level = Level::new("test", Inventory::new(), GameConfig::default());
        assert!(level.paused);
        assert!(level.platforms().is_err());
        level.create().expect("create");
        assert!(!level.paused);
        assert!(level.platforms().is_ok());
        assert_eq!(level.physics.interaction_count(), 3);
    }

    #[test]
    fn failing_create_hook_keeps_level_paused() {
        let mut level = Level::new("test", Inventory::new(), GameConfig::default());
        level.on_create(|_| Err(LevelError::MissingLayer("bg".to_string())));
        assert!(level.create().is_err());
        assert!(level.paused);
    }

    #[test]
    fn hooks_run_in_registration_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut level = Level::new("test", Inventory::new(), GameConfig::default());
        for tag in ["first", "second"] {
            let order = Rc::clone(&order);
            level.on_create(move |_| {
                order.borrow_mut().push(tag);
                Ok(())
            });
        }
        level.create().expect("create");
        assert_eq!(*order.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn add_then_find_then_destroy() {
        let mut level = created_level();
        let id = enemy(&mut level, 100.0);
        let object = level.entity(id).expect("registered").object;

        assert_eq!(level.find(object).map(EntityController::id), Some(id));
        assert_eq!(level.entities_of_type(EntityType::Enemy), vec![id]);
        assert_eq!(
            level.physics.body(object).expect("body").max_velocity,
            Vec2::new(400.0, 600.0)
        );

        assert!(level.destroy(id));
        assert!(level.find(object).is_none());
        assert!(level.entities_of_type(EntityType::Enemy).is_empty());
        assert!(!level.display.contains(object));
        assert!(level.physics.body(object).is_none());
    }

    #[test]
    fn destroying_unknown_entity_is_a_no_op() {
        let mut level = created_level();
        let id = enemy(&mut level, 100.0);
        assert!(level.destroy(id));
        assert!(!level.destroy(id));
        assert!(level.entities().is_empty());
    }

    #[test]
    fn paused_level_does_not_drive_controllers() {
        let mut level = created_level();
        let id = enemy(&mut level, 100.0);
        let object = level.entity(id).expect("registered").object;
        if let Some(entity) = level.entity_mut(id) {
            entity.current_hor_dir = HorDir::Right;
        }

        level.paused = true;
        level.update(0.0, FRAME_MS);
        assert_eq!(level.physics.body(object).expect("body").velocity.x, 0.0);

        level.paused = false;
        level.update(FRAME_MS, FRAME_MS);
        assert_eq!(level.physics.body(object).expect("body").velocity.x, 300.0);
    }

    #[test]
    fn hero_uses_configured_bindings() {
        let mut config = GameConfig::default();
        config.controls.left = "Left".to_string();
        config.controls.right = "Right".to_string();
        let mut level = Level::new("bindings", Inventory::new(), config);
        level.create().expect("create");
        level.spawn_hero(Vec2::new(48.0, 48.0));
        let hero = level.hero.expect("hero spawned");

        level.input.key_down(Key::D);
        level.update(FRAME_MS, FRAME_MS);
        assert_eq!(level.physics.body(hero).expect("body").velocity.x, 0.0);

        level.input.key_down(Key::Right);
        level.update(2.0 * FRAME_MS, FRAME_MS);
        assert_eq!(level.physics.body(hero).expect("body").velocity.x, 300.0);
    }

    #[test]
    fn unknown_binding_falls_back_to_defaults() {
        let mut config = GameConfig::default();
        config.controls.jump = "Hyper".to_string();
        let mut level = Level::new("bindings", Inventory::new(), config);
        level.create().expect("create");
        level.spawn_hero(Vec2::new(48.0, 48.0));
        let hero = level.hero.expect("hero spawned");

        level.input.key_down(Key::D);
        level.update(FRAME_MS, FRAME_MS);
        assert_eq!(level.physics.body(hero).expect("body").velocity.x, 300.0);
    }

    #[test]
    fn hero_death_pauses_then_requests_reload() {
        let mut level = created_level();
        level.spawn_hero(Vec2::new(48.0, 48.0));
        let hero = level.hero.expect("hero spawned");

        level.death(hero);
        assert!(level.paused);
        assert_eq!(level.display.get(hero).expect("still shown").tint, Some(DEATH_TINT));
        assert!(!level.physics.body(hero).expect("body").enabled);
        assert!(level.find(hero).expect("controller").locked);

        assert_eq!(level.step(500.0, FRAME_MS), LevelStatus::Running);
        assert_eq!(level.step(1000.0, FRAME_MS), LevelStatus::ReloadRequested);
    }

    #[test]
    fn enemy_death_despawns_after_delay() {
        let mut level = created_level();
        let id = enemy(&mut level, 100.0);
        let object = level.entity(id).expect("registered").object;

        level.step(100.0, FRAME_MS);
        level.death(object);
        assert!(!level.paused);
        level.step(1099.0, FRAME_MS);
        assert!(level.entity(id).is_some());
        level.step(1100.0, FRAME_MS);
        assert!(level.entity(id).is_none());
        assert!(!level.display.contains(object));
    }

    #[test]
    fn repeated_death_schedules_once() {
        let mut level = created_level();
        let id = enemy(&mut level, 100.0);
        let object = level.entity(id).expect("registered").object;
        level.death(object);
        level.death(object);
        assert_eq!(level.pending_tasks(), 1);
    }

    #[test]
    fn teardown_cancels_pending_reload() {
        let mut level = created_level();
        level.spawn_hero(Vec2::new(48.0, 48.0));
        let hero = level.hero.expect("hero spawned");
        level.death(hero);
        level.teardown();
        assert_eq!(level.pending_tasks(), 0);
        assert_eq!(level.step(5000.0, FRAME_MS), LevelStatus::Running);
    }

    #[test]
    fn platform_uses_default_image_size() {
        let mut level = created_level();
        let id = level.add_platform(160.0, 720.0, "block").expect("platforms exist");
        let obj = level.display.get(id).expect("placed");
        assert_eq!(obj.size, Vec2::new(64.0, 64.0));
        let platforms = level.platforms().expect("created");
        assert!(level.physics.group_contains(platforms, id));
        assert!(level.physics.body(id).expect("body").is_static);
    }

    #[test]
    fn entity_overlap_routes_to_hook() {
        let mut level = created_level();
        level.physics.gravity = Vec2::ZERO;
        let seen = Rc::new(RefCell::new(Vec::new()));
        {
            let seen = Rc::clone(&seen);
            level.set_entity_overlap_hook(move |_, a, b| seen.borrow_mut().push((a, b)));
        }

        let target = enemy(&mut level, 100.0);
        let object = level.add_dynamic_sprite(Vec2::new(110.0, 100.0), Vec2::splat(32.0), "enemy");
        let motion = level.config.motion;
        let watcher = level.add(
            EntityController::simple_enemy(object, motion, None).with_overlaps(&[EntityType::Enemy]),
        );
        assert_eq!(level.interested_in(EntityType::Enemy), vec![watcher]);

        level.step(FRAME_MS, FRAME_MS);
        let seen = seen.borrow();
        assert!(seen.contains(&(target, watcher)));
        assert!(seen.iter().all(|(a, b)| a != b));
    }
}
