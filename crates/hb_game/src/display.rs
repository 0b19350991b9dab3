use glam::Vec2;
use std::collections::BTreeMap;

use crate::tile_objects::TiledBaseObj;
use crate::tilemap::TiledProp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u32);

impl ObjectId {
    pub fn raw(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Visual {
    Image {
        texture: String,
    },
    Sprite {
        texture: String,
        frame: u32,
    },
    /// Children are offsets from the container centre.
    Container {
        parts: Vec<ContainerPart>,
    },
    TileLayer {
        layer: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContainerPart {
    pub offset: Vec2,
    pub texture: String,
    pub frame: u32,
}

/// Metadata attached to objects produced from a tile map's object layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectData {
    pub descriptor: TiledBaseObj,
    pub original_props: Vec<TiledProp>,
}

#[derive(Debug, Clone)]
pub struct GameObject {
    pub id: ObjectId,
    pub position: Vec2,
    pub size: Vec2,
    pub visual: Visual,
    pub visible: bool,
    pub tint: Option<u32>,
    pub scale: f32,
    pub scroll_factor: Vec2,
    pub data: Option<ObjectData>,
}

#[derive(Debug, Default)]
pub struct DisplayList {
    objects: BTreeMap<ObjectId, GameObject>,
    next_id: u32,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, position: Vec2, size: Vec2, visual: Visual) -> ObjectId {
        self.next_id += 1;
        let id = ObjectId(self.next_id);
        self.objects.insert(
            id,
            GameObject {
                id,
                position,
                size,
                visual,
                visible: true,
                tint: None,
                scale: 1.0,
                scroll_factor: Vec2::ONE,
                data: None,
            },
        );
        id
    }

    pub fn get(&self, id: ObjectId) -> Option<&GameObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut GameObject> {
        self.objects.get_mut(&id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<GameObject> {
        self.objects.remove(&id)
    }

    pub fn position(&self, id: ObjectId) -> Option<Vec2> {
        self.objects.get(&id).map(|obj| obj.position)
    }

    pub fn set_position(&mut self, id: ObjectId, position: Vec2) {
        if let Some(obj) = self.objects.get_mut(&id) {
            obj.position = position;
        }
    }

    pub fn data(&self, id: ObjectId) -> Option<&ObjectData> {
        self.objects.get(&id).and_then(|obj| obj.data.as_ref())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameObject> {
        self.objects.values()
    }
}

#[derive(Debug, Clone)]
pub struct Camera {
    pub scroll: Vec2,
    pub follow: Option<ObjectId>,
    pub background_color: Option<u32>,
    pub round_pixels: bool,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            scroll: Vec2::ZERO,
            follow: None,
            background_color: None,
            round_pixels: false,
        }
    }

    pub fn start_follow(&mut self, target: ObjectId) {
        self.follow = Some(target);
    }

    /// Centre on the follow target, if it still exists.
    pub fn update(&mut self, display: &DisplayList) {
        let Some(target) = self.follow else {
            return;
        };
        match display.position(target) {
            Some(position) if self.round_pixels => self.scroll = position.round(),
            Some(position) => self.scroll = position,
            None => self.follow = None,
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
