//! Asset request queue.
//!
//! Levels queue requests during preload and the loader resolves them in one
//! pass. Only tile maps are actually read, since level construction needs
//! their contents. Images, sheets and audio are recorded so later lookups
//! (frame size, image size) succeed; decoding them is the host's job.

use glam::Vec2;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::error::LevelError;
use crate::tilemap::{load_tilemap_from_path, TiledMap};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AssetKind {
    Image,
    Spritesheet { frame_width: u32, frame_height: u32 },
    TilemapJson,
    Audio,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssetRequest {
    pub key: String,
    pub path: String,
    pub kind: AssetKind,
}

#[derive(Debug, Default)]
pub struct AssetLoader {
    base_dir: PathBuf,
    queue: Vec<AssetRequest>,
    loaded: BTreeMap<String, AssetRequest>,
    tilemaps: HashMap<String, TiledMap>,
    image_sizes: HashMap<String, Vec2>,
}

impl AssetLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Self::default()
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn set_base_dir(&mut self, base_dir: impl Into<PathBuf>) {
        self.base_dir = base_dir.into();
    }

    pub fn image(&mut self, key: &str, path: &str) {
        self.enqueue(key, path, AssetKind::Image);
    }

    pub fn spritesheet(&mut self, key: &str, path: &str, frame_width: u32, frame_height: u32) {
        self.enqueue(
            key,
            path,
            AssetKind::Spritesheet {
                frame_width,
                frame_height,
            },
        );
    }

    pub fn tilemap_json(&mut self, key: &str, path: &str) {
        self.enqueue(key, path, AssetKind::TilemapJson);
    }

    pub fn audio(&mut self, key: &str, path: &str) {
        self.enqueue(key, path, AssetKind::Audio);
    }

    pub fn pending(&self) -> &[AssetRequest] {
        &self.queue
    }

    /// Pre-seed a parsed tile map. A queued request for the same key is then
    /// satisfied without touching the disk.
    pub fn insert_tilemap(&mut self, key: &str, map: TiledMap) {
        self.tilemaps.insert(key.to_string(), map);
    }

    /// Known pixel size for an image key. Unknown images fall back to the
    /// configured default at placement time.
    pub fn set_image_size(&mut self, key: &str, size: Vec2) {
        self.image_sizes.insert(key.to_string(), size);
    }

    /// Resolve every queued request. Returns how many were processed.
    pub fn load_pending(&mut self) -> Result<usize, LevelError> {
        let requests = std::mem::take(&mut self.queue);
        let count = requests.len();

        for request in requests {
            if request.kind == AssetKind::TilemapJson && !self.tilemaps.contains_key(&request.key) {
                let path = self.base_dir.join(&request.path);
                let map = load_tilemap_from_path(&path).map_err(LevelError::Asset)?;
                log::info!(
                    "Loaded tilemap '{}' from {} ({}x{} tiles, {} layers)",
                    request.key,
                    path.display(),
                    map.width,
                    map.height,
                    map.layers.len()
                );
                self.tilemaps.insert(request.key.clone(), map);
            }

            if self.loaded.contains_key(&request.key) {
                log::debug!("Asset key '{}' requested again; keeping first", request.key);
                continue;
            }
            log::debug!("Registered {:?} asset '{}' ({})", request.kind, request.key, request.path);
            self.loaded.insert(request.key.clone(), request);
        }

        Ok(count)
    }

    pub fn is_loaded(&self, key: &str) -> bool {
        self.loaded.contains_key(key)
    }

    pub fn tilemap(&self, key: &str) -> Option<&TiledMap> {
        self.tilemaps.get(key)
    }

    pub fn frame_size(&self, key: &str) -> Option<Vec2> {
        match self.loaded.get(key)?.kind {
            AssetKind::Spritesheet {
                frame_width,
                frame_height,
            } => Some(Vec2::new(frame_width as f32, frame_height as f32)),
            _ => None,
        }
    }

    pub fn image_size(&self, key: &str) -> Option<Vec2> {
        self.image_sizes.get(key).copied()
    }

    fn enqueue(&mut self, key: &str, path: &str, kind: AssetKind) {
        self.queue.push(AssetRequest {
            key: key.to_string(),
            path: path.to_string(),
            kind,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tilemap::parse_tilemap;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(name_hint: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!(
            "hb_assets_test_{}_{}_{}",
            name_hint,
            std::process::id(),
            nanos
        ));
        fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    const TINY_MAP: &str = r#"{ "width": 1, "height": 1, "tilewidth": 32, "tileheight": 32,
        "layers": [ { "name": "collision", "type": "tilelayer", "width": 1, "height": 1, "data": [5] } ] }"#;

    #[test]
    fn tilemap_is_read_relative_to_base_dir() {
        let dir = temp_dir("relative");
        fs::create_dir_all(dir.join("tilemaps")).expect("create subdir");
        fs::write(dir.join("tilemaps/tiny.json"), TINY_MAP).expect("write map");

        let mut loader = AssetLoader::new(&dir);
        loader.tilemap_json("tiny", "tilemaps/tiny.json");
        loader.image("heroblob", "png/heroblob2.png");
        assert_eq!(loader.pending().len(), 2);

        assert_eq!(loader.load_pending().expect("load"), 2);
        assert!(loader.pending().is_empty());
        assert!(loader.is_loaded("heroblob"));
        assert_eq!(loader.tilemap("tiny").expect("cached").width, 1);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn cached_tilemap_skips_disk() {
        let mut loader = AssetLoader::new("/definitely/not/here");
        loader.insert_tilemap("tiny", parse_tilemap(TINY_MAP, "inline").expect("parse"));
        loader.tilemap_json("tiny", "tiny.json");
        loader.load_pending().expect("served from cache");
        assert!(loader.is_loaded("tiny"));
    }

    #[test]
    fn missing_tilemap_is_an_asset_error() {
        let dir = temp_dir("missing");
        let mut loader = AssetLoader::new(&dir);
        loader.tilemap_json("nope", "nope.json");
        let err = loader.load_pending().expect_err("file does not exist");
        assert!(matches!(err, LevelError::Asset(ref msg) if msg.contains("nope.json")));
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn spritesheet_reports_frame_size() {
        let mut loader = AssetLoader::new(".");
        loader.spritesheet("testtileset_sheet", "png/testtileset.png", 32, 16);
        loader.audio("theme", "audio/theme.ogg");
        loader.load_pending().expect("nothing to read");
        assert_eq!(loader.frame_size("testtileset_sheet"), Some(Vec2::new(32.0, 16.0)));
        assert_eq!(loader.frame_size("theme"), None);
        assert_eq!(loader.image_size("theme"), None);
    }
}
