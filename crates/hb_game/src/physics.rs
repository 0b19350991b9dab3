//! Arcade-style physics: axis-aligned boxes, velocity/acceleration
//! integration, static obstacles and a tile collision layer.
//!
//! Movement uses **axis-separable move-and-slide**: resolve X against the
//! tile layer and static bodies first, then resolve Y from the corrected X.
//! This prevents diagonal tunnelling and gives the slide-along-walls feel.
//!
//! World space is y-down (matching tile maps), so "down" is +y and a body
//! resting on the floor reports `blocked.down`.
//!
//! The world never calls game code. `step()` returns the contacts it found and
//! the level decides what each one means.

use glam::Vec2;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::controller::EntityType;
use crate::display::{DisplayList, ObjectId};

const EPS: f32 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center: Vec2,
    pub half: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, half: Vec2) -> Self {
        Self { center, half }
    }

    pub fn left(&self) -> f32 {
        self.center.x - self.half.x
    }

    pub fn right(&self) -> f32 {
        self.center.x + self.half.x
    }

    pub fn top(&self) -> f32 {
        self.center.y - self.half.y
    }

    pub fn bottom(&self) -> f32 {
        self.center.y + self.half.y
    }

    /// Touching edges do not count as overlapping.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.left() < other.right() - EPS
            && self.right() > other.left() + EPS
            && self.top() < other.bottom() - EPS
            && self.bottom() > other.top() + EPS
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Blocked {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

#[derive(Debug, Clone)]
pub struct Body {
    pub half_size: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    pub max_velocity: Vec2,
    pub allow_gravity: bool,
    pub enabled: bool,
    pub is_static: bool,
    /// Contacts from the most recent step. This is the grounded query.
    pub blocked: Blocked,
}

impl Body {
    pub fn dynamic(size: Vec2) -> Self {
        Self {
            half_size: size * 0.5,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            max_velocity: Vec2::splat(10_000.0),
            allow_gravity: true,
            enabled: true,
            is_static: false,
            blocked: Blocked::default(),
        }
    }

    pub fn fixed(size: Vec2) -> Self {
        Self {
            allow_gravity: false,
            is_static: true,
            ..Self::dynamic(size)
        }
    }

    pub fn stop(&mut self) {
        self.velocity = Vec2::ZERO;
        self.acceleration = Vec2::ZERO;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileCollision {
    Solid,
    /// One-way platform: only blocks bodies falling onto its top face.
    TopOnly,
}

/// Collision layer built from a tile layer's gids. Gid 0 is empty; a tile
/// collides only if its index has a rule.
#[derive(Debug, Clone)]
pub struct CollisionTileLayer {
    width: i32,
    height: i32,
    tile_size: Vec2,
    tiles: Vec<u32>,
    rules: HashMap<u32, TileCollision>,
}

impl CollisionTileLayer {
    pub fn new(width: u32, height: u32, tile_size: Vec2, tiles: Vec<u32>) -> Self {
        Self {
            width: i32::try_from(width).unwrap_or(i32::MAX),
            height: i32::try_from(height).unwrap_or(i32::MAX),
            tile_size,
            tiles,
            rules: HashMap::new(),
        }
    }

    pub fn set_collision(&mut self, index: u32, rule: TileCollision) {
        self.rules.insert(index, rule);
    }

    pub fn tile_at(&self, x: i32, y: i32) -> Option<u32> {
        if x < 0 || x >= self.width || y < 0 || y >= self.height {
            return None;
        }
        self.tiles
            .get(y as usize * self.width as usize + x as usize)
            .copied()
            .filter(|&gid| gid != 0)
    }

    pub fn rule_at(&self, x: i32, y: i32) -> Option<TileCollision> {
        self.tile_at(x, y)
            .and_then(|index| self.rules.get(&index).copied())
    }

    pub fn colliding_tile_count(&self) -> usize {
        self.tiles
            .iter()
            .filter(|index| self.rules.contains_key(index))
            .count()
    }

    fn resolve_x(&self, aabb: Aabb, dx: f32) -> f32 {
        let mut candidate = aabb.center.x + dx;
        if dx == 0.0 {
            return candidate;
        }
        let y0 = self.cell_y(aabb.top() + EPS);
        let y1 = self.cell_y(aabb.bottom() - EPS);

        if dx > 0.0 {
            let x_cell = self.cell_x(candidate + aabb.half.x - EPS);
            for y in y0..=y1 {
                if self.rule_at(x_cell, y) == Some(TileCollision::Solid) {
                    candidate = candidate.min(self.cell_left(x_cell) - aabb.half.x);
                }
            }
            candidate.max(aabb.center.x)
        } else {
            let x_cell = self.cell_x(candidate - aabb.half.x + EPS);
            for y in y0..=y1 {
                if self.rule_at(x_cell, y) == Some(TileCollision::Solid) {
                    candidate = candidate.max(self.cell_left(x_cell + 1) + aabb.half.x);
                }
            }
            candidate.min(aabb.center.x)
        }
    }

    fn resolve_y(&self, aabb: Aabb, dy: f32) -> f32 {
        let mut candidate = aabb.center.y + dy;
        if dy == 0.0 {
            return candidate;
        }
        let x0 = self.cell_x(aabb.left() + EPS);
        let x1 = self.cell_x(aabb.right() - EPS);

        if dy > 0.0 {
            let y_cell = self.cell_y(candidate + aabb.half.y - EPS);
            let tile_top = self.cell_top(y_cell);
            for x in x0..=x1 {
                let blocks = match self.rule_at(x, y_cell) {
                    Some(TileCollision::Solid) => true,
                    Some(TileCollision::TopOnly) => aabb.bottom() <= tile_top + EPS,
                    None => false,
                };
                if blocks {
                    candidate = candidate.min(tile_top - aabb.half.y);
                }
            }
            candidate.max(aabb.center.y)
        } else {
            let y_cell = self.cell_y(candidate - aabb.half.y + EPS);
            for x in x0..=x1 {
                if self.rule_at(x, y_cell) == Some(TileCollision::Solid) {
                    candidate = candidate.max(self.cell_top(y_cell + 1) + aabb.half.y);
                }
            }
            candidate.min(aabb.center.y)
        }
    }

    fn cell_x(&self, world_x: f32) -> i32 {
        (world_x / self.tile_size.x).floor() as i32
    }

    fn cell_y(&self, world_y: f32) -> i32 {
        (world_y / self.tile_size.y).floor() as i32
    }

    fn cell_left(&self, x: i32) -> f32 {
        x as f32 * self.tile_size.x
    }

    fn cell_top(&self, y: i32) -> f32 {
        y as f32 * self.tile_size.y
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId(usize);

/// What the level should do with a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactTag {
    /// Plain physics, nobody is told.
    Silent,
    /// Route through the tile-object handler dispatcher.
    Dispatch,
    /// Entity-vs-entity overlap for the given entity type's group.
    EntityOverlap(EntityType),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Group(GroupId),
    TileLayer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InteractionKind {
    Collide,
    Overlap,
}

#[derive(Debug, Clone, Copy)]
struct Interaction {
    actors: GroupId,
    target: Target,
    kind: InteractionKind,
    tag: ContactTag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub tag: ContactTag,
    pub actor: ObjectId,
    pub other: ObjectId,
}

#[derive(Debug)]
pub struct PhysicsWorld {
    pub gravity: Vec2,
    bodies: BTreeMap<ObjectId, Body>,
    groups: Vec<BTreeSet<ObjectId>>,
    interactions: Vec<Interaction>,
    tile_layer: Option<CollisionTileLayer>,
}

impl PhysicsWorld {
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity,
            bodies: BTreeMap::new(),
            groups: Vec::new(),
            interactions: Vec::new(),
            tile_layer: None,
        }
    }

    pub fn add_body(&mut self, id: ObjectId, body: Body) {
        self.bodies.insert(id, body);
    }

    pub fn body(&self, id: ObjectId) -> Option<&Body> {
        self.bodies.get(&id)
    }

    pub fn body_mut(&mut self, id: ObjectId) -> Option<&mut Body> {
        self.bodies.get_mut(&id)
    }

    /// Drop the body and every group membership of `id`.
    pub fn remove(&mut self, id: ObjectId) -> Option<Body> {
        for members in &mut self.groups {
            members.remove(&id);
        }
        self.bodies.remove(&id)
    }

    pub fn create_group(&mut self) -> GroupId {
        self.groups.push(BTreeSet::new());
        GroupId(self.groups.len() - 1)
    }

    pub fn group_add(&mut self, group: GroupId, id: ObjectId) {
        if let Some(members) = self.groups.get_mut(group.0) {
            members.insert(id);
        }
    }

    pub fn group_contains(&self, group: GroupId, id: ObjectId) -> bool {
        self.groups
            .get(group.0)
            .is_some_and(|members| members.contains(&id))
    }

    pub fn group_members(&self, group: GroupId) -> Vec<ObjectId> {
        self.groups
            .get(group.0)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Blocking contact between every body in `actors` and `target`.
    pub fn add_collider(&mut self, actors: GroupId, target: Target, tag: ContactTag) {
        self.interactions.push(Interaction {
            actors,
            target,
            kind: InteractionKind::Collide,
            tag,
        });
    }

    /// Non-blocking contact detection between two groups.
    pub fn add_overlap(&mut self, actors: GroupId, target: GroupId, tag: ContactTag) {
        self.interactions.push(Interaction {
            actors,
            target: Target::Group(target),
            kind: InteractionKind::Overlap,
            tag,
        });
    }

    pub fn interaction_count(&self) -> usize {
        self.interactions.len()
    }

    pub fn set_tile_layer(&mut self, layer: CollisionTileLayer) {
        self.tile_layer = Some(layer);
    }

    pub fn tile_layer(&self) -> Option<&CollisionTileLayer> {
        self.tile_layer.as_ref()
    }

    /// Advance every enabled dynamic body by `dt` seconds, writing the new
    /// centres into `display`. Returns collide contacts in body order followed
    /// by overlap contacts in registration order.
    pub fn step(&mut self, dt: f32, display: &mut DisplayList) -> Vec<Contact> {
        let mut contacts = Vec::new();
        if dt <= 0.0 {
            return contacts;
        }

        let movers: Vec<ObjectId> = self
            .bodies
            .iter()
            .filter(|(_, body)| body.enabled && !body.is_static)
            .map(|(id, _)| *id)
            .collect();

        for id in movers {
            let Some(center) = display.position(id) else {
                continue;
            };
            let obstacles = self.obstacles_for(id, display);
            let tiles = if self.collides_with_tiles(id) {
                self.tile_layer.as_ref()
            } else {
                None
            };
            let gravity = self.gravity;
            let Some(body) = self.bodies.get_mut(&id) else {
                continue;
            };

            let mut hits = Vec::new();
            let moved = move_body(body, center, gravity, dt, tiles, &obstacles, &mut hits);
            display.set_position(id, moved);

            for (other, tag) in hits {
                let contact = Contact {
                    tag,
                    actor: id,
                    other,
                };
                if tag != ContactTag::Silent && !contacts.contains(&contact) {
                    contacts.push(contact);
                }
            }
        }

        for interaction in &self.interactions {
            let (InteractionKind::Overlap, Target::Group(target)) =
                (interaction.kind, interaction.target)
            else {
                continue;
            };
            for actor in self.group_members(interaction.actors) {
                let Some(actor_box) = self.enabled_aabb(actor, display) else {
                    continue;
                };
                for other in self.group_members(target) {
                    if other == actor {
                        continue;
                    }
                    let Some(other_box) = self.enabled_aabb(other, display) else {
                        continue;
                    };
                    if actor_box.intersects(&other_box) {
                        contacts.push(Contact {
                            tag: interaction.tag,
                            actor,
                            other,
                        });
                    }
                }
            }
        }

        contacts
    }

    fn enabled_aabb(&self, id: ObjectId, display: &DisplayList) -> Option<Aabb> {
        let body = self.bodies.get(&id).filter(|body| body.enabled)?;
        let center = display.position(id)?;
        Some(Aabb::new(center, body.half_size))
    }

    fn collides_with_tiles(&self, id: ObjectId) -> bool {
        self.interactions.iter().any(|interaction| {
            interaction.kind == InteractionKind::Collide
                && interaction.target == Target::TileLayer
                && self.group_contains(interaction.actors, id)
        })
    }

    fn obstacles_for(&self, id: ObjectId, display: &DisplayList) -> Vec<(Aabb, ObjectId, ContactTag)> {
        let mut obstacles = Vec::new();
        for interaction in &self.interactions {
            let (InteractionKind::Collide, Target::Group(target)) =
                (interaction.kind, interaction.target)
            else {
                continue;
            };
            if !self.group_contains(interaction.actors, id) {
                continue;
            }
            for other in self.group_members(target) {
                if other == id || !self.bodies.get(&other).is_some_and(|b| b.is_static) {
                    continue;
                }
                if let Some(aabb) = self.enabled_aabb(other, display) {
                    obstacles.push((aabb, other, interaction.tag));
                }
            }
        }
        obstacles
    }
}

fn move_body(
    body: &mut Body,
    center: Vec2,
    gravity: Vec2,
    dt: f32,
    tiles: Option<&CollisionTileLayer>,
    obstacles: &[(Aabb, ObjectId, ContactTag)],
    hits: &mut Vec<(ObjectId, ContactTag)>,
) -> Vec2 {
    let mut accel = body.acceleration;
    if body.allow_gravity {
        accel += gravity;
    }
    body.velocity = (body.velocity + accel * dt).clamp(-body.max_velocity, body.max_velocity);

    let start = Aabb::new(center, body.half_size);
    let dx = body.velocity.x * dt;
    let dy = body.velocity.y * dt;

    let mut x = tiles.map_or(start.center.x + dx, |layer| layer.resolve_x(start, dx));
    for (obstacle, other, tag) in obstacles {
        if let Some(clamped) = clamp_x(start, x, dx, obstacle) {
            x = clamped;
            hits.push((*other, *tag));
        }
    }
    let collided_x = (x - (start.center.x + dx)).abs() > EPS;

    let after_x = Aabb::new(Vec2::new(x, start.center.y), start.half);
    let mut y = tiles.map_or(after_x.center.y + dy, |layer| layer.resolve_y(after_x, dy));
    for (obstacle, other, tag) in obstacles {
        if let Some(clamped) = clamp_y(after_x, y, dy, obstacle) {
            y = clamped;
            hits.push((*other, *tag));
        }
    }
    let collided_y = (y - (start.center.y + dy)).abs() > EPS;

    body.blocked = Blocked {
        left: collided_x && dx < 0.0,
        right: collided_x && dx > 0.0,
        up: collided_y && dy < 0.0,
        down: collided_y && dy > 0.0,
    };
    if collided_x {
        body.velocity.x = 0.0;
    }
    if collided_y {
        body.velocity.y = 0.0;
    }

    Vec2::new(x, y)
}

fn clamp_x(start: Aabb, x: f32, dx: f32, obstacle: &Aabb) -> Option<f32> {
    let overlaps_vertically =
        start.top() < obstacle.bottom() - EPS && start.bottom() > obstacle.top() + EPS;
    if !overlaps_vertically {
        return None;
    }
    if dx > 0.0 && start.right() <= obstacle.left() + EPS && x + start.half.x > obstacle.left() {
        return Some(obstacle.left() - start.half.x);
    }
    if dx < 0.0 && start.left() >= obstacle.right() - EPS && x - start.half.x < obstacle.right() {
        return Some(obstacle.right() + start.half.x);
    }
    None
}

fn clamp_y(start: Aabb, y: f32, dy: f32, obstacle: &Aabb) -> Option<f32> {
    let overlaps_horizontally =
        start.left() < obstacle.right() - EPS && start.right() > obstacle.left() + EPS;
    if !overlaps_horizontally {
        return None;
    }
    if dy > 0.0 && start.bottom() <= obstacle.top() + EPS && y + start.half.y > obstacle.top() {
        return Some(obstacle.top() - start.half.y);
    }
    if dy < 0.0 && start.top() >= obstacle.bottom() - EPS && y - start.half.y < obstacle.bottom() {
        return Some(obstacle.bottom() + start.half.y);
    }
    None
}
