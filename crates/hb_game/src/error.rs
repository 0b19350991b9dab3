use std::fmt;

/// Fatal problems while building or loading a level. None of these are
/// recovered from: the level is rebuilt from scratch after a fix.
#[derive(Debug)]
pub enum LevelError {
    MissingConfigKey,
    UnknownConfigKey(String),
    InventoryLengthMismatch {
        keys: usize,
        values: usize,
    },
    InvalidProperty {
        name: String,
        reason: String,
    },
    /// Wraps a tile object failure with where it happened.
    InObject {
        map_path: String,
        name: String,
        object_type: String,
        x: f32,
        y: f32,
        source: Box<LevelError>,
    },
    MultipleSpawns {
        map_path: String,
    },
    MissingSpawn {
        map_path: String,
    },
    UnknownObjectType {
        map_path: String,
        name: String,
        object_type: String,
        x: f32,
        y: f32,
    },
    MissingLayer(String),
    MissingTilemap(String),
    NotCreated(&'static str),
    Asset(String),
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::MissingConfigKey => write!(f, "tile object missing 'configKey' property"),
            LevelError::UnknownConfigKey(key) => write!(f, "unknown configKey '{key}'"),
            LevelError::InventoryLengthMismatch { keys, values } => write!(
                f,
                "number of inventory values doesn't match number of keys: {keys} keys vs {values} values"
            ),
            LevelError::InvalidProperty { name, reason } => {
                write!(f, "invalid property '{name}': {reason}")
            }
            LevelError::InObject {
                map_path,
                name,
                object_type,
                x,
                y,
                source,
            } => write!(
                f,
                "error in level \"{map_path}\" in object \"{name}\":\"{object_type}\" at {x},{y}: {source}"
            ),
            LevelError::MultipleSpawns { map_path } => {
                write!(f, "multiple spawn points in level \"{map_path}\"")
            }
            LevelError::MissingSpawn { map_path } => {
                write!(f, "no spawn point found in level \"{map_path}\"")
            }
            LevelError::UnknownObjectType {
                map_path,
                name,
                object_type,
                x,
                y,
            } => write!(
                f,
                "unknown object type \"{name}\":\"{object_type}\" encountered in map {map_path} at position {x},{y}"
            ),
            LevelError::MissingLayer(name) => write!(f, "can't find layer \"{name}\""),
            LevelError::MissingTilemap(key) => write!(f, "tilemap '{key}' was never loaded"),
            LevelError::NotCreated(what) => {
                write!(f, "{what} used before the level was created")
            }
            LevelError::Asset(msg) => write!(f, "asset error: {msg}"),
        }
    }
}

impl std::error::Error for LevelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LevelError::InObject { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn object_context_names_map_object_and_position() {
        let err = LevelError::InObject {
            map_path: "assets/tilemaps/level_a.json".to_string(),
            name: "flower".to_string(),
            object_type: "object".to_string(),
            x: 64.0,
            y: 96.0,
            source: Box::new(LevelError::UnknownConfigKey("NOPE$1".to_string())),
        };
        let text = err.to_string();
        assert!(text.contains("level_a.json"));
        assert!(text.contains("\"flower\""));
        assert!(text.contains("64,96"));
        assert!(text.contains("NOPE$1"));
        assert!(err.source().is_some());
    }
}
