use glam::Vec2;

use crate::controller::{EntityController, EntityType, HorDir};
use crate::display::{ObjectId, Visual};
use crate::level::Level;
use crate::level_builder::{LevelBuilder, LifecycleEvent};

pub const LEVEL_A: &str = "levelA";

const BANNER_KEY: &str = "playtext";
const BANNER_TINT: u32 = 0xff90ff10;
const PLATFORM_WIDTH: f32 = 64.0;
const PLATFORM_PADDING: f32 = 128.0;
const BOTTOM_ISH: f32 = 720.0;

/// Two runs of twelve blocks: a ground run and a raised run three blocks up,
/// joined by a jump-through ledge in the tile map. An enemy patrols the upper
/// run towards the spikes.
pub fn level_a() -> LevelBuilder {
    let w = PLATFORM_WIDTH;
    LevelBuilder::start()
        .image(BANNER_KEY, "assets/png/playtext.png")
        .image("block", "assets/png/block.png")
        .image("weirdblock", "assets/png/weirdblock.png")
        .tilemap(
            LEVEL_A,
            "assets/tilemaps/level_a.json",
            "testtileset",
            "assets/png/testtileset.png",
        )
        .sound("level1_soundtrack", "assets/audio/level1_soundtrack.ogg")
        .repeat(12, |b, i| {
            b.platform(i as f32 * w + PLATFORM_PADDING, BOTTOM_ISH, "block")
        })
        .repeat(12, |b, i| {
            b.platform(
                12.0 * w + i as f32 * w + PLATFORM_PADDING,
                BOTTOM_ISH - 3.0 * w,
                "block",
            )
        })
        .bg_layer("background", 0.5, None)
        .on(LifecycleEvent::Create, |level| {
            let size = Vec2::splat(32.0);
            let object = level.add_dynamic_sprite(Vec2::new(1500.0, 480.0), size, "weirdblock");
            let enemy = EntityController::simple_enemy(object, level.config.motion, Some(HorDir::Left))
                .with_overlaps(&[EntityType::Player]);
            level.add(enemy);
            Ok(())
        })
        .on(LifecycleEvent::CreateLast, |level| {
            set_hero_locked(level, true);
            let banner = level.display.add(
                Vec2::new(600.0, 272.0),
                Vec2::from(level.config.default_image_size),
                Visual::Image {
                    texture: BANNER_KEY.to_string(),
                },
            );
            if let Some(obj) = level.display.get_mut(banner) {
                obj.tint = Some(BANNER_TINT);
                obj.scroll_factor = Vec2::new(0.0, -1.2);
            }
            Ok(())
        })
}

/// Dismiss the title banner and hand control to the player.
pub fn start_play(level: &mut Level) {
    if let Some(banner) = banner(level) {
        level.destroy_object(banner);
    }
    set_hero_locked(level, false);
    log::info!("Play started on '{}'", level.name);
}

fn set_hero_locked(level: &mut Level, locked: bool) {
    let Some(id) = level.hero_controller else {
        return;
    };
    if let Some(hero) = level.entity_mut(id) {
        hero.locked = locked;
    }
}

fn banner(level: &Level) -> Option<ObjectId> {
    level
        .display
        .iter()
        .find(|obj| matches!(&obj.visual, Visual::Image { texture } if texture == BANNER_KEY))
        .map(|obj| obj.id)
}
