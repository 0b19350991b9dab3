//! Chainable level description compiled into a `Level`.
//!
//! Appenders only record; nothing is validated until the level's create
//! phase runs. `build()` installs the hook chain:
//!
//! - preload: built-in asset requests, then the user `Preload` hook
//! - create: built-in tile map and object ingestion, then `Create`, then
//!   `CreateLast`
//!
//! The built-in create phase is where map problems surface: a bad tile
//! object, a missing or duplicated spawn or an unknown object type fails the
//! whole build with the map path and object position in the error.

use glam::Vec2;
use std::rc::Rc;

use crate::config::GameConfig;
use crate::display::{ContainerPart, ObjectData, Visual};
use crate::error::LevelError;
use crate::inventory::Inventory;
use crate::level::{Level, LevelHook, LevelTilemap};
use crate::physics::{CollisionTileLayer, TileCollision};
use crate::tile_objects::TiledBaseObj;
use crate::tilemap::{TiledMap, TiledObject};

pub const DEFAULT_TILE_SIZE: u32 = 32;
pub const OBJECT_LAYER_NAME: &str = "objects";
pub const COLLISION_LAYER_NAME: &str = "collision";

#[derive(Debug, Clone, PartialEq)]
pub struct AssetInfo {
    pub name: String,
    pub path: String,
}

impl AssetInfo {
    fn new(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TilemapInfo {
    pub tilemap: AssetInfo,
    pub tileset: AssetInfo,
    pub tile_width: u32,
    pub tile_height: u32,
}

impl TilemapInfo {
    pub fn sheet_key(&self) -> String {
        sheet_key(&self.tileset.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerInfo {
    pub name: String,
    pub scroll_factor: Vec2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlatformInfo {
    pub x: f32,
    pub y: f32,
    pub texture: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Preload,
    Create,
    CreateLast,
}

/// Everything the built-in hooks need, shared between preload and create.
#[derive(Debug, Default)]
struct LevelRecipe {
    tilemap: Option<TilemapInfo>,
    fg_layers: Vec<LayerInfo>,
    bg_layers: Vec<LayerInfo>,
    images: Vec<AssetInfo>,
    sounds: Vec<AssetInfo>,
    platforms: Vec<PlatformInfo>,
}

#[derive(Default)]
pub struct LevelBuilder {
    recipe: LevelRecipe,
    on_preload: Option<LevelHook>,
    on_create: Option<LevelHook>,
    on_create_last: Option<LevelHook>,
}

impl LevelBuilder {
    pub fn start() -> Self {
        Self::default()
    }

    pub fn tilemap(self, name: &str, path: &str, tileset_name: &str, tileset_path: &str) -> Self {
        self.tilemap_sized(
            name,
            path,
            tileset_name,
            tileset_path,
            DEFAULT_TILE_SIZE,
            DEFAULT_TILE_SIZE,
        )
    }

    pub fn tilemap_sized(
        mut self,
        name: &str,
        path: &str,
        tileset_name: &str,
        tileset_path: &str,
        tile_width: u32,
        tile_height: u32,
    ) -> Self {
        self.recipe.tilemap = Some(TilemapInfo {
            tilemap: AssetInfo::new(name, path),
            tileset: AssetInfo::new(tileset_name, tileset_path),
            tile_width,
            tile_height,
        });
        self
    }

    /// Foreground layers are created last, in declared order.
    pub fn fg_layer(mut self, name: &str, scroll_x: f32, scroll_y: Option<f32>) -> Self {
        self.recipe.fg_layers.push(layer_info(name, scroll_x, scroll_y));
        self
    }

    /// Background layers are prepended, so the last one declared is created
    /// first and ends up furthest back.
    pub fn bg_layer(mut self, name: &str, scroll_x: f32, scroll_y: Option<f32>) -> Self {
        self.recipe.bg_layers.insert(0, layer_info(name, scroll_x, scroll_y));
        self
    }

    pub fn image(mut self, name: &str, path: &str) -> Self {
        self.recipe.images.push(AssetInfo::new(name, path));
        self
    }

    pub fn sound(mut self, name: &str, path: &str) -> Self {
        self.recipe.sounds.push(AssetInfo::new(name, path));
        self
    }

    pub fn platform(mut self, x: f32, y: f32, texture: &str) -> Self {
        self.recipe.platforms.push(PlatformInfo {
            x,
            y,
            texture: texture.to_string(),
        });
        self
    }

    /// Call `f(builder, i)` for `i` in `0..count`, threading the builder.
    pub fn repeat(mut self, count: usize, mut f: impl FnMut(Self, usize) -> Self) -> Self {
        for i in 0..count {
            self = f(self, i);
        }
        self
    }

    /// One hook per event; registering again replaces the previous one.
    pub fn on(
        mut self,
        event: LifecycleEvent,
        hook: impl FnMut(&mut Level) -> Result<(), LevelError> + 'static,
    ) -> Self {
        let slot = match event {
            LifecycleEvent::Preload => &mut self.on_preload,
            LifecycleEvent::Create => &mut self.on_create,
            LifecycleEvent::CreateLast => &mut self.on_create_last,
        };
        if slot.replace(Box::new(hook)).is_some() {
            log::debug!("Replaced {:?} hook", event);
        }
        self
    }

    pub fn build(self, name: &str, inventory: Inventory) -> Level {
        self.build_with_config(name, inventory, GameConfig::default())
    }

    pub fn build_with_config(self, name: &str, inventory: Inventory, config: GameConfig) -> Level {
        let LevelBuilder {
            recipe,
            on_preload,
            on_create,
            on_create_last,
        } = self;
        let recipe = Rc::new(recipe);
        let mut level = Level::new(name, inventory, config);

        let preload_recipe = Rc::clone(&recipe);
        level.on_preload(move |level| {
            preload_recipe.preload(level);
            Ok(())
        });
        if let Some(hook) = on_preload {
            level.on_preload(hook);
        }

        level.on_create(move |level| recipe.create(level));
        if let Some(hook) = on_create {
            level.on_create(hook);
        }
        if let Some(hook) = on_create_last {
            level.on_create(hook);
        }

        level
    }
}

impl LevelRecipe {
    fn preload(&self, level: &mut Level) {
        let hero = level.config.hero.clone();
        level.loader.image(&hero.asset_key, &hero.asset_path);
        level
            .loader
            .set_image_size(&hero.asset_key, Vec2::new(hero.width, hero.height));

        if let Some(info) = &self.tilemap {
            level.loader.image(&info.tileset.name, &info.tileset.path);
            level.loader.spritesheet(
                &info.sheet_key(),
                &info.tileset.path,
                info.tile_width,
                info.tile_height,
            );
            level.loader.tilemap_json(&info.tilemap.name, &info.tilemap.path);
        }
        for image in &self.images {
            level.loader.image(&image.name, &image.path);
        }
        for sound in &self.sounds {
            level.loader.audio(&sound.name, &sound.path);
        }
    }

    fn create(&self, level: &mut Level) -> Result<(), LevelError> {
        if let Some(info) = &self.tilemap {
            let map = level
                .loader
                .tilemap(&info.tilemap.name)
                .cloned()
                .ok_or_else(|| LevelError::MissingTilemap(info.tilemap.name.clone()))?;
            if !map.tilesets.is_empty() && !map.tilesets.iter().any(|t| t.name == info.tileset.name) {
                log::warn!(
                    "Tileset '{}' is not referenced by map {}",
                    info.tileset.name,
                    info.tilemap.path
                );
            }

            level.tilemap = Some(LevelTilemap {
                key: info.tilemap.name.clone(),
                path: info.tilemap.path.clone(),
                tileset: info.tileset.name.clone(),
                tile_size: Vec2::new(map.tile_width as f32, map.tile_height as f32),
                map: map.clone(),
            });

            setup_layers(level, &map, &self.bg_layers)?;
            place_objects(level, info, &map)?;
            if level.hero.is_none() {
                return Err(LevelError::MissingSpawn {
                    map_path: info.tilemap.path.clone(),
                });
            }
            create_collision_layer(level, &map)?;
        }

        for platform in &self.platforms {
            level.add_platform(platform.x, platform.y, &platform.texture)?;
        }

        if let Some(map) = level.tilemap.as_ref().map(|t| t.map.clone()) {
            setup_layers(level, &map, &self.fg_layers)?;
        }

        level.camera.background_color = Some(level.config.background_color);
        level.camera.round_pixels = true;
        Ok(())
    }
}

fn setup_layers(level: &mut Level, map: &TiledMap, layers: &[LayerInfo]) -> Result<(), LevelError> {
    let map_size = Vec2::new(map.width as f32, map.height as f32)
        * Vec2::new(map.tile_width as f32, map.tile_height as f32);
    for info in layers {
        if map.tile_layer(&info.name).is_none() {
            return Err(LevelError::MissingLayer(info.name.clone()));
        }
        let id = level.display.add(
            map_size * 0.5,
            map_size,
            Visual::TileLayer {
                layer: info.name.clone(),
            },
        );
        if let Some(obj) = level.display.get_mut(id) {
            obj.scroll_factor = info.scroll_factor;
        }
        level.layers.push((info.name.clone(), id));
    }
    Ok(())
}

fn place_objects(level: &mut Level, info: &TilemapInfo, map: &TiledMap) -> Result<(), LevelError> {
    let layer = map
        .object_layer(OBJECT_LAYER_NAME)
        .ok_or_else(|| LevelError::MissingLayer(OBJECT_LAYER_NAME.to_string()))?;
    let map_path = &info.tilemap.path;

    for obj in &layer.objects {
        match obj.object_type.as_str() {
            "object" => place_tile_object(level, info, obj)?,
            "spawn" => {
                if level.hero.is_some() {
                    return Err(LevelError::MultipleSpawns {
                        map_path: map_path.clone(),
                    });
                }
                level.spawn_hero(Vec2::new(obj.x, obj.y));
            }
            _ => {
                return Err(LevelError::UnknownObjectType {
                    map_path: map_path.clone(),
                    name: obj.name.clone(),
                    object_type: obj.object_type.clone(),
                    x: obj.x,
                    y: obj.y,
                })
            }
        }
    }
    Ok(())
}

fn place_tile_object(level: &mut Level, info: &TilemapInfo, obj: &TiledObject) -> Result<(), LevelError> {
    let descriptor =
        TiledBaseObj::from_props(&obj.properties).map_err(|source| LevelError::InObject {
            map_path: info.tilemap.path.clone(),
            name: obj.name.clone(),
            object_type: obj.object_type.clone(),
            x: obj.x,
            y: obj.y,
            source: Box::new(source),
        })?;
    if descriptor.ignore {
        log::debug!("Skipping ignored object '{}' ({})", obj.name, descriptor.config_key);
        return Ok(());
    }

    let group = if descriptor.collideable {
        level.platforms()?
    } else {
        level.touchables()?
    };
    let size = Vec2::new(obj.width, obj.height);
    let center = Vec2::new(obj.x, obj.y) + size * 0.5;
    let sheet = sheet_key(&descriptor.key);

    let id = match descriptor.frame_below {
        None => {
            // Sprites take their frame's size; hidden ones use the object's
            // own box so invisible hazards are still hit.
            let frame_size = level.loader.frame_size(&sheet).unwrap_or(Vec2::new(
                info.tile_width as f32,
                info.tile_height as f32,
            ));
            let body_size = if descriptor.visible { frame_size } else { size };
            level.add_static_object(
                group,
                center,
                body_size,
                Visual::Sprite {
                    texture: sheet,
                    frame: descriptor.frame,
                },
            )
        }
        Some(frame_below) => {
            let quarter = size.y / 4.0;
            let parts = vec![
                ContainerPart {
                    offset: Vec2::new(0.0, -quarter),
                    texture: sheet.clone(),
                    frame: descriptor.frame,
                },
                ContainerPart {
                    offset: Vec2::new(0.0, quarter),
                    texture: sheet,
                    frame: frame_below,
                },
            ];
            level.add_static_object(group, center, size, Visual::Container { parts })
        }
    };

    if let Some(placed) = level.display.get_mut(id) {
        placed.visible = descriptor.visible;
        placed.data = Some(ObjectData {
            descriptor,
            original_props: obj.properties.clone(),
        });
    }
    Ok(())
}

fn create_collision_layer(level: &mut Level, map: &TiledMap) -> Result<(), LevelError> {
    let layer = map
        .tile_layer(COLLISION_LAYER_NAME)
        .ok_or_else(|| LevelError::MissingLayer(COLLISION_LAYER_NAME.to_string()))?;
    let tile_size = Vec2::new(map.tile_width as f32, map.tile_height as f32);

    let mut collision = CollisionTileLayer::new(layer.width, layer.height, tile_size, layer.data.clone());
    let rules = level.config.tiles;
    collision.set_collision(rules.solid_index, TileCollision::Solid);
    collision.set_collision(rules.jump_through_index, TileCollision::TopOnly);
    log::info!(
        "Collision layer: {}x{} tiles, {} colliding",
        layer.width,
        layer.height,
        collision.colliding_tile_count()
    );
    level.physics.set_tile_layer(collision);

    let layer_size = Vec2::new(layer.width as f32, layer.height as f32) * tile_size;
    let id = level.display.add(
        layer_size * 0.5,
        layer_size,
        Visual::TileLayer {
            layer: COLLISION_LAYER_NAME.to_string(),
        },
    );
    if let Some(obj) = level.display.get_mut(id) {
        obj.visible = false;
    }
    level.collision_layer = Some(id);
    Ok(())
}

fn layer_info(name: &str, scroll_x: f32, scroll_y: Option<f32>) -> LayerInfo {
    LayerInfo {
        name: name.to_string(),
        scroll_factor: Vec2::new(scroll_x, scroll_y.unwrap_or(scroll_x)),
    }
}

fn sheet_key(key: &str) -> String {
    format!("{key}_sheet")
}
