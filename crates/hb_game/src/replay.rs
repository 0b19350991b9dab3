use hb_core::input::InputState;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::controller::PlayerBindings;

/// Scripted key states, one entry per run of identical frames.
#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    #[serde(default = "default_dt_ms")]
    pub fixed_dt_ms: f64,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayFrame {
    #[serde(default)]
    pub left: bool,
    #[serde(default)]
    pub right: bool,
    #[serde(default)]
    pub jump: bool,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl ReplayFrame {
    /// Drive the bound keys to this frame's state.
    pub fn apply(&self, bindings: &PlayerBindings, input: &mut InputState) {
        input.set_key(bindings.left, self.left);
        input.set_key(bindings.right, self.right);
        input.set_key(bindings.jump, self.jump);
    }
}

impl ReplaySequence {
    pub fn expanded_frames(&self) -> Vec<ReplayFrame> {
        let mut out = Vec::new();
        for frame in &self.frames {
            for _ in 0..frame.repeat.max(1) {
                out.push(ReplayFrame { repeat: 1, ..*frame });
            }
        }
        out
    }

    pub fn total_frames(&self) -> usize {
        self.frames.iter().map(|f| f.repeat.max(1) as usize).sum()
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if replay.fixed_dt_ms <= 0.0 {
        return Err("Replay validation failed: fixed_dt_ms must be > 0".to_string());
    }
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    Ok(())
}

fn default_dt_ms() -> f64 {
    1000.0 / 60.0
}

const fn default_repeat() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::display::Visual;
    use crate::inventory::Inventory;
    use crate::level::Level;
    use crate::physics::{CollisionTileLayer, TileCollision};
    use glam::Vec2;
    use hb_core::input::Key;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "hb_replay_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    /// 30x10 level of 32px tiles: solid floor, a one-way ledge and a wall.
    fn sample_level() -> Level {
        let mut tiles = vec![0u32; 300];
        for x in 0..30 {
            tiles[9 * 30 + x] = 5;
        }
        for x in 8..12 {
            tiles[6 * 30 + x] = 56;
        }
        for y in 5..9 {
            tiles[y * 30 + 20] = 5;
        }
        let mut layer = CollisionTileLayer::new(30, 10, Vec2::splat(32.0), tiles);
        layer.set_collision(5, TileCollision::Solid);
        layer.set_collision(56, TileCollision::TopOnly);

        let mut level = Level::new("replay", Inventory::new(), GameConfig::default());
        level.physics.set_tile_layer(layer);
        level.create().expect("create");
        level.spawn_hero(Vec2::new(48.0, 272.0));
        let group = level.platforms().expect("created");
        level.add_static_object(
            group,
            Vec2::new(400.0, 272.0),
            Vec2::splat(32.0),
            Visual::Image {
                texture: "block".to_string(),
            },
        );
        level
    }

    fn run(replay: &ReplaySequence) -> (Vec2, Vec2) {
        let mut level = sample_level();
        let bindings = PlayerBindings::default();
        let mut elapsed = 0.0;
        for frame in replay.expanded_frames() {
            frame.apply(&bindings, &mut level.input);
            elapsed += replay.fixed_dt_ms;
            level.step(elapsed, replay.fixed_dt_ms);
        }
        let hero = level.hero.expect("hero alive");
        let position = level.display.position(hero).expect("hero shown");
        let velocity = level.physics.body(hero).expect("hero body").velocity;
        (position, velocity)
    }

    #[test]
    fn replay_file_parses_and_expands() {
        let path = temp_file_path("parse");
        fs::write(
            &path,
            r#"{
              "fixed_dt_ms": 16.0,
              "frames": [
                { "right": true, "repeat": 3 },
                { "jump": true }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        let expanded = replay.expanded_frames();
        assert_eq!(expanded.len(), 4);
        assert_eq!(replay.total_frames(), 4);
        assert!(expanded[0].right && !expanded[0].jump);
        assert!(expanded[3].jump);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn empty_replay_is_rejected() {
        let path = temp_file_path("empty");
        fs::write(&path, r#"{ "frames": [] }"#).expect("write replay file");
        let err = load_replay_from_path(&path).expect_err("no frames");
        assert!(err.contains("frames list is empty"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn frame_drives_bound_keys() {
        let bindings = PlayerBindings::default();
        let mut input = InputState::new();
        ReplayFrame {
            right: true,
            jump: true,
            ..ReplayFrame::default()
        }
        .apply(&bindings, &mut input);
        assert!(input.is_held(Key::D));
        assert!(input.is_held(Key::Space));
        assert!(!input.is_held(Key::A));
    }

    #[test]
    fn replay_run_is_deterministic() {
        let replay: ReplaySequence = serde_json::from_str(
            r#"{
              "frames": [
                { "right": true, "repeat": 20 },
                { "right": true, "jump": true, "repeat": 1 },
                { "right": true, "repeat": 60 },
                { "left": true, "repeat": 45 },
                { "left": true, "right": true, "repeat": 10 }
              ]
            }"#,
        )
        .expect("inline replay parses");

        let (pos_a, vel_a) = run(&replay);
        let (pos_b, vel_b) = run(&replay);
        assert!((pos_a - pos_b).length() < 0.0001);
        assert!((vel_a - vel_b).length() < 0.0001);
    }
}
