use crate::display::ObjectId;
use crate::inventory::Inventory;
use crate::level::Level;
use crate::tile_objects::{HandlerKind, TiledBaseObj};

/// Objects without tile-object data take part in physics only.
pub fn handle(actor: ObjectId, obj: ObjectId, level: &mut Level) {
    let Some(data) = level.display.data(obj) else {
        return;
    };
    let descriptor = data.descriptor.clone();
    log::trace!(
        "Object {} touched {} '{}' ({})",
        actor.raw(),
        obj.raw(),
        descriptor.config_key,
        descriptor.handler
    );

    match descriptor.handler {
        HandlerKind::None => {}
        HandlerKind::Pickup => pickup(obj, &descriptor, level),
        HandlerKind::Door => door(obj, &descriptor, level),
        HandlerKind::Death => level.death(actor),
    }
}

/// Credit the whole manifest to the hero and remove the pickup.
fn pickup(obj: ObjectId, descriptor: &TiledBaseObj, level: &mut Level) {
    for (key, value) in descriptor.manifest() {
        level.inventory.add_to_hero(key, value);
    }
    level.destroy_object(obj);
    log::info!("Picked up '{}'", descriptor.config_key);
}

/// Open only if every requirement is met; nothing is deducted otherwise.
fn door(obj: ObjectId, descriptor: &TiledBaseObj, level: &mut Level) {
    if !meets_requirements(&level.inventory, descriptor) {
        log::trace!("Door '{}' stays shut", descriptor.config_key);
        return;
    }
    for (key, value) in descriptor.manifest() {
        level.inventory.remove_from_hero(key, value);
    }
    level.destroy_object(obj);
    log::info!("Opened door '{}'", descriptor.config_key);
}

fn meets_requirements(inventory: &Inventory, descriptor: &TiledBaseObj) -> bool {
    descriptor
        .manifest()
        .all(|(key, value)| inventory.get_from_hero(key) >= value)
}
