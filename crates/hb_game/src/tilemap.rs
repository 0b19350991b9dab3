//! Tiled JSON map loading.
//!
//! Only the subset the level builder consumes is modelled: tile layers as
//! flat gid arrays, object groups, custom properties and tileset first gids.
//! Layer `type` is kept as a string so unsupported kinds (image layers, groups)
//! parse and are simply never looked up.

use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

pub const TILE_LAYER: &str = "tilelayer";
pub const OBJECT_LAYER: &str = "objectgroup";

/// Largest accepted map or layer side, in tiles.
pub const MAX_MAP_TILES: u32 = 4096;
/// Largest accepted tile side, in pixels.
pub const MAX_TILE_SIZE: u32 = 1024;

#[derive(Debug, Deserialize, Clone)]
pub struct TiledMap {
    pub width: u32,
    pub height: u32,
    #[serde(rename = "tilewidth")]
    pub tile_width: u32,
    #[serde(rename = "tileheight")]
    pub tile_height: u32,
    pub layers: Vec<TiledLayer>,
    #[serde(default)]
    pub tilesets: Vec<TiledTileset>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TiledLayer {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub data: Vec<u32>,
    #[serde(default)]
    pub objects: Vec<TiledObject>,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TiledObject {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub name: String,
    // Tiled 1.9 renamed `type` to `class`.
    #[serde(default, rename = "type", alias = "class")]
    pub object_type: String,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(default)]
    pub properties: Vec<TiledProp>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TiledProp {
    pub name: String,
    #[serde(default, rename = "type")]
    pub prop_type: String,
    pub value: PropValue,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum PropValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

#[derive(Debug, Deserialize, Clone)]
pub struct TiledTileset {
    pub firstgid: u32,
    #[serde(default)]
    pub name: String,
}

impl TiledMap {
    pub fn layer(&self, name: &str) -> Option<&TiledLayer> {
        self.layers.iter().find(|layer| layer.name == name)
    }

    pub fn tile_layer(&self, name: &str) -> Option<&TiledLayer> {
        self.layer(name).filter(|layer| layer.kind == TILE_LAYER)
    }

    pub fn object_layer(&self, name: &str) -> Option<&TiledLayer> {
        self.layer(name).filter(|layer| layer.kind == OBJECT_LAYER)
    }
}

impl TiledProp {
    pub fn new(name: &str, value: PropValue) -> Self {
        Self {
            name: name.to_string(),
            prop_type: String::new(),
            value,
        }
    }
}

impl PropValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Booleans also accept the strings `true` / `false`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(b) => Some(*b),
            PropValue::Str(s) => match s.trim() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Integers also accept whole floats and numeric strings.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PropValue::Int(i) => Some(*i),
            PropValue::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            PropValue::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

pub fn load_tilemap_from_path(path: &Path) -> Result<TiledMap, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read tilemap {}: {e}", path.display()))?;
    parse_tilemap(&raw, &path.display().to_string())
}

pub fn parse_tilemap(raw: &str, origin: &str) -> Result<TiledMap, String> {
    let map: TiledMap = serde_json::from_str(raw)
        .map_err(|e| format!("Failed to parse tilemap JSON {origin}: {e}"))?;
    validate_tilemap(&map)?;
    Ok(map)
}

fn validate_tilemap(map: &TiledMap) -> Result<(), String> {
    if map.width == 0 || map.height == 0 {
        return Err("Tilemap validation failed: width and height must be > 0".to_string());
    }
    if map.width > MAX_MAP_TILES || map.height > MAX_MAP_TILES {
        return Err(format!(
            "Tilemap validation failed: map is {}x{} tiles, limit is {MAX_MAP_TILES} per side",
            map.width, map.height
        ));
    }
    if map.tile_width == 0 || map.tile_height == 0 {
        return Err("Tilemap validation failed: tile size must be > 0".to_string());
    }
    if map.tile_width > MAX_TILE_SIZE || map.tile_height > MAX_TILE_SIZE {
        return Err(format!(
            "Tilemap validation failed: tile size {}x{} exceeds {MAX_TILE_SIZE}px",
            map.tile_width, map.tile_height
        ));
    }

    let mut names = HashSet::new();
    for layer in &map.layers {
        if !names.insert(layer.name.as_str()) {
            return Err(format!(
                "Tilemap validation failed: duplicate layer name '{}'",
                layer.name
            ));
        }
        if layer.kind == TILE_LAYER {
            if layer.width > MAX_MAP_TILES || layer.height > MAX_MAP_TILES {
                return Err(format!(
                    "Tilemap validation failed: layer '{}' is {}x{} tiles, limit is {MAX_MAP_TILES} per side",
                    layer.name, layer.width, layer.height
                ));
            }
            let expected = layer.width as usize * layer.height as usize;
            if layer.data.len() != expected {
                return Err(format!(
                    "Tilemap validation failed: layer '{}' has {} tiles, expected {}x{}",
                    layer.name,
                    layer.data.len(),
                    layer.width,
                    layer.height
                ));
            }
        }
    }
    Ok(())
}

const fn default_visible() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "hb_tilemap_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    const SMALL_MAP: &str = r#"
    {
      "width": 2, "height": 2, "tilewidth": 32, "tileheight": 32,
      "tilesets": [ { "firstgid": 1, "name": "testtileset" } ],
      "layers": [
        { "name": "collision", "type": "tilelayer", "width": 2, "height": 2, "data": [0, 0, 5, 56] },
        { "name": "objects", "type": "objectgroup", "objects": [
          { "id": 1, "name": "start", "type": "spawn", "x": 16, "y": 16 },
          { "id": 2, "name": "flower", "class": "object", "x": 32, "y": 0, "width": 32, "height": 32,
            "properties": [
              { "name": "configKey", "type": "string", "value": "BLUE_FLOWER$1" },
              { "name": "visible", "type": "bool", "value": false },
              { "name": "frame", "type": "int", "value": 7 }
            ] }
        ] },
        { "name": "sky", "type": "imagelayer", "image": "sky.png" }
      ]
    }
    "#;

    #[test]
    fn parses_layers_objects_and_properties() {
        let map = parse_tilemap(SMALL_MAP, "inline").expect("map should parse");
        assert_eq!(map.tile_width, 32);
        assert_eq!(map.tile_layer("collision").expect("layer").data, vec![0, 0, 5, 56]);
        assert!(map.tile_layer("objects").is_none());
        assert!(map.layer("sky").is_some());

        let objects = &map.object_layer("objects").expect("objects").objects;
        assert_eq!(objects[0].object_type, "spawn");
        assert_eq!(objects[1].object_type, "object");
        assert_eq!(objects[1].properties[0].value.as_str(), Some("BLUE_FLOWER$1"));
        assert_eq!(objects[1].properties[1].value.as_bool(), Some(false));
        assert_eq!(objects[1].properties[2].value.as_i64(), Some(7));
    }

    #[test]
    fn load_from_path_reads_file() {
        let path = temp_file_path("valid");
        fs::write(&path, SMALL_MAP).expect("write temp file");
        let map = load_tilemap_from_path(&path).expect("map should load");
        assert_eq!(map.layers.len(), 3);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn rejects_short_tile_data() {
        let raw = r#"{ "width": 2, "height": 1, "tilewidth": 32, "tileheight": 32,
            "layers": [ { "name": "collision", "type": "tilelayer", "width": 2, "height": 1, "data": [5] } ] }"#;
        let err = parse_tilemap(raw, "inline").expect_err("short data should fail");
        assert!(err.contains("has 1 tiles"));
    }

    #[test]
    fn rejects_oversized_layer() {
        let raw = r#"{ "width": 1, "height": 1, "tilewidth": 32, "tileheight": 32,
            "layers": [ { "name": "collision", "type": "tilelayer", "width": 70000, "height": 70000, "data": [] } ] }"#;
        let err = parse_tilemap(raw, "inline").expect_err("huge layer should fail");
        assert!(err.contains("Tilemap validation failed"));
        assert!(err.contains("70000x70000"));
    }

    #[test]
    fn rejects_oversized_map_and_tiles() {
        let wide = r#"{ "width": 4294967295, "height": 2, "tilewidth": 32, "tileheight": 32, "layers": [] }"#;
        let err = parse_tilemap(wide, "inline").expect_err("huge map should fail");
        assert!(err.contains("limit is 4096"));

        let chunky = r#"{ "width": 2, "height": 2, "tilewidth": 4000000, "tileheight": 32, "layers": [] }"#;
        let err = parse_tilemap(chunky, "inline").expect_err("huge tiles should fail");
        assert!(err.contains("exceeds 1024px"));
    }

    #[test]
    fn rejects_duplicate_layer_names() {
        let raw = r#"{ "width": 1, "height": 1, "tilewidth": 32, "tileheight": 32,
            "layers": [
              { "name": "objects", "type": "objectgroup", "objects": [] },
              { "name": "objects", "type": "objectgroup", "objects": [] }
            ] }"#;
        let err = parse_tilemap(raw, "inline").expect_err("duplicate names should fail");
        assert!(err.contains("duplicate layer name"));
    }

    #[test]
    fn missing_file_reports_path() {
        let path = temp_file_path("missing");
        let err = load_tilemap_from_path(&path).expect_err("missing file should fail");
        assert!(err.contains("Failed to read tilemap"));
    }

    #[test]
    fn prop_values_coerce_from_strings() {
        assert_eq!(PropValue::Str("true".into()).as_bool(), Some(true));
        assert_eq!(PropValue::Str(" 12 ".into()).as_i64(), Some(12));
        assert_eq!(PropValue::Float(3.0).as_i64(), Some(3));
        assert_eq!(PropValue::Float(3.5).as_i64(), None);
        assert_eq!(PropValue::Int(1).as_bool(), None);
    }
}
