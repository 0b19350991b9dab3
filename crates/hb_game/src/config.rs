use hb_core::input::Key;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::controller::PlayerBindings;

/// Pixels, pixels/second and milliseconds; y grows downward. Omitted fields
/// keep their defaults.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub fixed_dt_ms: f64,
    pub death_delay_ms: f64,
    pub background_color: u32,
    pub default_image_size: [f32; 2],
    pub physics: PhysicsConfig,
    pub motion: MotionConfig,
    pub hero: HeroConfig,
    pub tiles: TileRules,
    pub controls: ControlsConfig,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity_y: f32,
}

/// Per-entity motion limits. Copied into each controller when it is created.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct MotionConfig {
    pub max_x_vel: f32,
    pub max_y_vel: f32,
    pub min_x_vel: f32,
    pub x_accel: f32,
    pub jump_initial_vel: f32,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct HeroConfig {
    pub asset_key: String,
    pub asset_path: String,
    pub width: f32,
    pub height: f32,
    pub scale: f32,
    pub tint: u32,
}

/// Tile indices on the collision layer that become solid geometry.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct TileRules {
    pub solid_index: u32,
    pub jump_through_index: u32,
}

/// Player key bindings by name, e.g. `"Left"` or `"Space"`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ControlsConfig {
    pub left: String,
    pub right: String,
    pub jump: String,
}

impl ControlsConfig {
    pub fn bindings(&self) -> Result<PlayerBindings, String> {
        Ok(PlayerBindings {
            left: key_named("left", &self.left)?,
            right: key_named("right", &self.right)?,
            jump: key_named("jump", &self.jump)?,
        })
    }
}

fn key_named(action: &str, name: &str) -> Result<Key, String> {
    Key::from_name(name).ok_or_else(|| format!("unknown key '{name}' bound to {action}"))
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fixed_dt_ms: 1000.0 / 60.0,
            death_delay_ms: 1000.0,
            background_color: 0x7a70ff,
            default_image_size: [64.0, 64.0],
            physics: PhysicsConfig::default(),
            motion: MotionConfig::default(),
            hero: HeroConfig::default(),
            tiles: TileRules::default(),
            controls: ControlsConfig::default(),
        }
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self { gravity_y: 900.0 }
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            max_x_vel: 400.0,
            max_y_vel: 600.0,
            min_x_vel: 300.0,
            x_accel: 300.0,
            jump_initial_vel: -600.0,
        }
    }
}

impl Default for HeroConfig {
    fn default() -> Self {
        Self {
            asset_key: "heroblob".to_string(),
            asset_path: "assets/png/heroblob2.png".to_string(),
            width: 64.0,
            height: 64.0,
            scale: 0.5,
            tint: 0xff0f0000,
        }
    }
}

impl Default for TileRules {
    fn default() -> Self {
        Self {
            solid_index: 5,
            jump_through_index: 56,
        }
    }
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            left: "A".to_string(),
            right: "D".to_string(),
            jump: "Space".to_string(),
        }
    }
}

pub fn load_config_from_path(path: &Path) -> Result<GameConfig, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let config: GameConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse config JSON {}: {e}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &GameConfig) -> Result<(), String> {
    if config.fixed_dt_ms <= 0.0 {
        return Err("Config validation failed: fixed_dt_ms must be > 0".to_string());
    }
    if config.death_delay_ms < 0.0 {
        return Err("Config validation failed: death_delay_ms must be >= 0".to_string());
    }
    if config.hero.width <= 0.0 || config.hero.height <= 0.0 || config.hero.scale <= 0.0 {
        return Err("Config validation failed: hero size and scale must be > 0".to_string());
    }
    let motion = &config.motion;
    if motion.max_x_vel <= 0.0 || motion.max_y_vel <= 0.0 {
        return Err("Config validation failed: velocity caps must be > 0".to_string());
    }
    if motion.min_x_vel > motion.max_x_vel {
        return Err(format!(
            "Config validation failed: min_x_vel {} exceeds max_x_vel {}",
            motion.min_x_vel, motion.max_x_vel
        ));
    }
    config
        .controls
        .bindings()
        .map_err(|e| format!("Config validation failed: {e}"))?;
    if config.tiles.solid_index == config.tiles.jump_through_index {
        return Err(
            "Config validation failed: solid and jump-through tile indices must differ"
                .to_string(),
        );
    }
    Ok(())
}
