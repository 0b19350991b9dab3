//! Placeable tile-object behaviours.
//!
//! A tile object in the map names a catalog entry through its `configKey`
//! property. The entry supplies every field; the object's own properties may
//! then override individual fields. The merge is an explicit match over the
//! known property names, so a typo in a map is ignored (logged) rather than
//! silently creating a new field.
//!
//! Catalog naming convention: `NAME$variant`.

use std::fmt;

use crate::error::LevelError;
use crate::tilemap::{PropValue, TiledProp};

pub const CONFIG_KEY_PROP: &str = "configKey";

/// Behaviour run when an actor touches a tile object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    None,
    Pickup,
    Door,
    Death,
}

impl HandlerKind {
    pub const ALL: &'static [HandlerKind] = &[
        HandlerKind::None,
        HandlerKind::Pickup,
        HandlerKind::Door,
        HandlerKind::Death,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Pickup => "pickup",
            Self::Door => "door",
            Self::Death => "death",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Static catalog entry.
#[derive(Debug, Clone, Copy)]
pub struct ObjConfig {
    pub visible: bool,
    pub key: &'static str,
    pub frame: u32,
    pub frame_below: Option<u32>,
    pub ignore: bool,
    pub collideable: bool,
    pub inventory_keys: &'static [&'static str],
    pub inventory_values: &'static [i32],
    pub handler: HandlerKind,
}

const BLUE_FLOWER_1: ObjConfig = ObjConfig {
    visible: true,
    key: "testtileset",
    frame: 4,
    frame_below: None,
    ignore: false,
    collideable: false,
    inventory_keys: &["blue_flower"],
    inventory_values: &[1],
    handler: HandlerKind::Pickup,
};

const BLUE_FLOWER_DOOR_1: ObjConfig = ObjConfig {
    visible: true,
    key: "testtileset",
    frame: 1,
    frame_below: Some(9),
    ignore: false,
    collideable: true,
    inventory_keys: &["blue_flower"],
    inventory_values: &[1],
    handler: HandlerKind::Door,
};

// Hazards and map annotations.
const SPIKES_1: ObjConfig = ObjConfig {
    visible: true,
    key: "testtileset",
    frame: 6,
    frame_below: None,
    ignore: false,
    collideable: false,
    inventory_keys: &[],
    inventory_values: &[],
    handler: HandlerKind::Death,
};

pub static CONFIGS: &[(&str, ObjConfig)] = &[
    ("BLUE_FLOWER$1", BLUE_FLOWER_1),
    (
        "BLUE_FLOWER$2",
        ObjConfig {
            inventory_values: &[2],
            ..BLUE_FLOWER_1
        },
    ),
    ("BLUE_FLOWER_DOOR$1", BLUE_FLOWER_DOOR_1),
    (
        "BLUE_FLOWER_DOOR$2",
        ObjConfig {
            inventory_values: &[2],
            ..BLUE_FLOWER_DOOR_1
        },
    ),
    ("SPIKES$1", SPIKES_1),
    (
        "KILL_ZONE$1",
        ObjConfig {
            visible: false,
            ..SPIKES_1
        },
    ),
    (
        "NOTE$1",
        ObjConfig {
            visible: false,
            ignore: true,
            handler: HandlerKind::None,
            ..SPIKES_1
        },
    ),
];

pub fn lookup_config(key: &str) -> Option<&'static ObjConfig> {
    CONFIGS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, config)| config)
}

/// Resolved behaviour descriptor for one placed tile object.
#[derive(Debug, Clone, PartialEq)]
pub struct TiledBaseObj {
    pub config_key: String,
    pub visible: bool,
    pub key: String,
    pub frame: u32,
    pub frame_below: Option<u32>,
    pub ignore: bool,
    pub collideable: bool,
    pub inventory_keys: Vec<String>,
    pub inventory_values: Vec<i32>,
    pub handler: HandlerKind,
}

impl TiledBaseObj {
    pub fn from_props(props: &[TiledProp]) -> Result<Self, LevelError> {
        let key_prop = props
            .iter()
            .find(|prop| prop.name == CONFIG_KEY_PROP)
            .ok_or(LevelError::MissingConfigKey)?;
        let config_key = key_prop
            .value
            .as_str()
            .ok_or_else(|| invalid(CONFIG_KEY_PROP, "expected a string"))?;
        let config = lookup_config(config_key)
            .ok_or_else(|| LevelError::UnknownConfigKey(config_key.to_string()))?;

        let mut obj = Self::from_config(config_key, config);
        for prop in props {
            obj.apply_override(prop)?;
        }

        if obj.inventory_keys.len() != obj.inventory_values.len() {
            return Err(LevelError::InventoryLengthMismatch {
                keys: obj.inventory_keys.len(),
                values: obj.inventory_values.len(),
            });
        }
        Ok(obj)
    }

    pub fn from_config(config_key: &str, config: &ObjConfig) -> Self {
        Self {
            config_key: config_key.to_string(),
            visible: config.visible,
            key: config.key.to_string(),
            frame: config.frame,
            frame_below: config.frame_below,
            ignore: config.ignore,
            collideable: config.collideable,
            inventory_keys: config.inventory_keys.iter().map(|k| k.to_string()).collect(),
            inventory_values: config.inventory_values.to_vec(),
            handler: config.handler,
        }
    }

    /// `(key, amount)` pairs of the inventory manifest, in declared order.
    pub fn manifest(&self) -> impl Iterator<Item = (&str, i32)> + '_ {
        self.inventory_keys
            .iter()
            .map(String::as_str)
            .zip(self.inventory_values.iter().copied())
    }

    fn apply_override(&mut self, prop: &TiledProp) -> Result<(), LevelError> {
        let name = prop.name.as_str();
        match name {
            CONFIG_KEY_PROP => {}
            "visible" => self.visible = bool_prop(name, &prop.value)?,
            "ignore" => self.ignore = bool_prop(name, &prop.value)?,
            "collideable" => self.collideable = bool_prop(name, &prop.value)?,
            "key" => {
                self.key = prop
                    .value
                    .as_str()
                    .ok_or_else(|| invalid(name, "expected a string"))?
                    .to_string()
            }
            "frame" => self.frame = frame_prop(name, &prop.value)?,
            "frameBelow" => {
                // Negative or empty clears the lower half.
                self.frame_below = match &prop.value {
                    PropValue::Str(s) if s.trim().is_empty() => None,
                    value => match value.as_i64() {
                        Some(v) if v < 0 => None,
                        _ => Some(frame_prop(name, value)?),
                    },
                }
            }
            "inventoryKeys" => {
                let raw = prop
                    .value
                    .as_str()
                    .ok_or_else(|| invalid(name, "expected a comma separated string"))?;
                self.inventory_keys = split_list(raw).map(str::to_string).collect();
            }
            "inventoryValues" => {
                self.inventory_values = match &prop.value {
                    PropValue::Str(raw) => split_list(raw)
                        .map(|item| {
                            item.parse::<i32>()
                                .map_err(|_| invalid(name, &format!("'{item}' is not an integer")))
                        })
                        .collect::<Result<_, _>>()?,
                    value => {
                        let single = value
                            .as_i64()
                            .ok_or_else(|| invalid(name, "expected comma separated integers"))?;
                        vec![i32::try_from(single)
                            .map_err(|_| invalid(name, &format!("{single} is out of range")))?]
                    }
                };
            }
            "handler" => {
                let raw = prop
                    .value
                    .as_str()
                    .ok_or_else(|| invalid(name, "expected a handler name"))?;
                self.handler = HandlerKind::from_name(raw.trim())
                    .ok_or_else(|| invalid(name, &format!("unknown handler '{raw}'")))?;
            }
            other => log::trace!("Ignoring unrecognised tile object property '{other}'"),
        }
        Ok(())
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.trim()
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

fn bool_prop(name: &str, value: &PropValue) -> Result<bool, LevelError> {
    value
        .as_bool()
        .ok_or_else(|| invalid(name, "expected a boolean"))
}

fn frame_prop(name: &str, value: &PropValue) -> Result<u32, LevelError> {
    value
        .as_i64()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| invalid(name, "expected a non-negative frame index"))
}

fn invalid(name: &str, reason: &str) -> LevelError {
    LevelError::InvalidProperty {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}
