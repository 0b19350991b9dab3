//! Per-entity motion controllers.
//!
//! A controller turns intent (`current_hor_dir`, `should_jump`) into one-shot
//! step values and writes them onto its physics body. The body does the
//! integration; the controller never moves anything itself.
//!
//! Variants share the same record. The player polls the keyboard for its
//! intent; the simple enemy optionally patrols.

use hb_core::input::{InputState, Key};

use crate::config::MotionConfig;
use crate::display::ObjectId;
use crate::physics::Body;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HorDir {
    Left,
    Right,
    #[default]
    None,
}

impl HorDir {
    pub fn reversed(self) -> Self {
        match self {
            HorDir::Left => HorDir::Right,
            HorDir::Right => HorDir::Left,
            HorDir::None => HorDir::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityType {
    Entity,
    Player,
    Enemy,
}

/// Assigned by the owning level when the controller is added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u32);

impl EntityId {
    pub(crate) fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Values to write onto the body this step. `None` leaves the body alone.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepIntent {
    pub x_vel: Option<f32>,
    pub y_vel: Option<f32>,
    pub x_accel: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerBindings {
    pub left: Key,
    pub right: Key,
    pub jump: Key,
}

impl Default for PlayerBindings {
    fn default() -> Self {
        Self {
            left: Key::A,
            right: Key::D,
            jump: Key::Space,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlayerInput {
    pub bindings: PlayerBindings,
    last_key_was_left: bool,
    jump_released: bool,
}

impl PlayerInput {
    pub fn new(bindings: PlayerBindings) -> Self {
        Self {
            bindings,
            last_key_was_left: false,
            jump_released: true,
        }
    }

    /// With both direction keys down the one pressed most recently wins.
    fn direction(&mut self, input: &InputState) -> HorDir {
        let left = input.is_held(self.bindings.left);
        let right = input.is_held(self.bindings.right);
        match (left, right) {
            (true, true) if self.last_key_was_left => HorDir::Right,
            (true, true) => HorDir::Left,
            (true, false) => {
                self.last_key_was_left = true;
                HorDir::Left
            }
            (false, true) => {
                self.last_key_was_left = false;
                HorDir::Right
            }
            (false, false) => HorDir::None,
        }
    }

    /// A held jump key fires once; it has to be released before it fires again.
    fn jump(&mut self, input: &InputState) -> bool {
        if !input.is_held(self.bindings.jump) {
            self.jump_released = true;
            false
        } else if self.jump_released {
            self.jump_released = false;
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone)]
pub enum ControllerKind {
    Entity,
    Player(PlayerInput),
    /// Walks in `patrol` and turns around at walls. `None` stands still
    /// unless something else sets the direction.
    SimpleEnemy { patrol: Option<HorDir> },
}

#[derive(Debug, Clone)]
pub struct EntityController {
    pub(crate) id: EntityId,
    pub object: ObjectId,
    pub entity_type: EntityType,
    pub locked: bool,
    pub current_hor_dir: HorDir,
    pub should_jump: bool,
    /// Entity types whose overlaps this controller wants to hear about.
    pub overlaps_with: Vec<EntityType>,
    pub motion: MotionConfig,
    pub kind: ControllerKind,
    step: StepIntent,
}

impl EntityController {
    pub fn new(object: ObjectId, motion: MotionConfig) -> Self {
        Self {
            id: EntityId(0),
            object,
            entity_type: EntityType::Entity,
            locked: false,
            current_hor_dir: HorDir::None,
            should_jump: false,
            overlaps_with: Vec::new(),
            motion,
            kind: ControllerKind::Entity,
            step: StepIntent::default(),
        }
    }

    pub fn player(object: ObjectId, motion: MotionConfig, bindings: PlayerBindings) -> Self {
        Self {
            entity_type: EntityType::Player,
            kind: ControllerKind::Player(PlayerInput::new(bindings)),
            ..Self::new(object, motion)
        }
    }

    pub fn simple_enemy(object: ObjectId, motion: MotionConfig, patrol: Option<HorDir>) -> Self {
        Self {
            entity_type: EntityType::Enemy,
            kind: ControllerKind::SimpleEnemy { patrol },
            ..Self::new(object, motion)
        }
    }

    pub fn with_overlaps(mut self, types: &[EntityType]) -> Self {
        self.overlaps_with = types.to_vec();
        self
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn is_player(&self) -> bool {
        matches!(self.kind, ControllerKind::Player(_))
    }

    pub fn apply_velocity_caps(&self, body: &mut Body) {
        body.max_velocity.x = self.motion.max_x_vel;
        body.max_velocity.y = self.motion.max_y_vel;
    }

    pub fn set_max_x_vel(&mut self, value: f32, body: &mut Body) {
        self.motion.max_x_vel = value;
        self.apply_velocity_caps(body);
    }

    pub fn set_max_y_vel(&mut self, value: f32, body: &mut Body) {
        self.motion.max_y_vel = value;
        self.apply_velocity_caps(body);
    }

    pub fn update(&mut self, body: &mut Body, input: &InputState) {
        if !self.locked {
            self.refresh_intent(body, input);
            self.plan_motion(body);

            if let Some(x_accel) = self.step.x_accel {
                body.acceleration.x = x_accel;
            }
            if let Some(x_vel) = self.step.x_vel {
                body.velocity.x = x_vel;
            }
            if let Some(y_vel) = self.step.y_vel {
                body.velocity.y = y_vel;
            }
        }

        self.step = StepIntent::default();
    }

    fn refresh_intent(&mut self, body: &Body, input: &InputState) {
        match &mut self.kind {
            ControllerKind::Entity => {}
            ControllerKind::Player(player) => {
                self.current_hor_dir = player.direction(input);
                self.should_jump = player.jump(input);
            }
            ControllerKind::SimpleEnemy { patrol } => {
                if let Some(dir) = patrol {
                    let walled = match dir {
                        HorDir::Left => body.blocked.left,
                        HorDir::Right => body.blocked.right,
                        HorDir::None => false,
                    };
                    if walled {
                        *dir = dir.reversed();
                        log::debug!("Enemy {} turned to {:?}", self.id.raw(), dir);
                    }
                    self.current_hor_dir = *dir;
                }
            }
        }
    }

    fn plan_motion(&mut self, body: &Body) {
        let m = self.motion;
        match self.current_hor_dir {
            HorDir::None => {
                self.step.x_accel = Some(0.0);
                self.step.x_vel = Some(0.0);
            }
            HorDir::Left => {
                if body.velocity.x > -m.min_x_vel {
                    self.step.x_vel = Some(-m.min_x_vel);
                }
                self.step.x_accel = Some(-m.x_accel);
            }
            HorDir::Right => {
                if body.velocity.x < m.min_x_vel {
                    self.step.x_vel = Some(m.min_x_vel);
                }
                self.step.x_accel = Some(m.x_accel);
            }
        }

        if self.should_jump && body.blocked.down {
            self.step.y_vel = Some(m.jump_initial_vel);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DisplayList;
    use crate::display::Visual;
    use glam::Vec2;

    fn object() -> ObjectId {
        let mut display = DisplayList::new();
        display.add(
            Vec2::ZERO,
            Vec2::splat(32.0),
            Visual::Image {
                texture: "heroblob".to_string(),
            },
        )
    }

    fn body() -> Body {
        Body::dynamic(Vec2::splat(32.0))
    }

    #[test]
    fn no_direction_hard_stops() {
        let mut ctrl = EntityController::new(object(), MotionConfig::default());
        let mut body = body();
        body.velocity.x = 350.0;
        body.acceleration.x = 300.0;

        ctrl.update(&mut body, &InputState::new());
        assert_eq!(body.velocity.x, 0.0);
        assert_eq!(body.acceleration.x, 0.0);
    }

    #[test]
    fn moving_snaps_to_min_speed_and_accelerates() {
        let mut ctrl = EntityController::new(object(), MotionConfig::default());
        let mut body = body();
        ctrl.current_hor_dir = HorDir::Left;
        ctrl.update(&mut body, &InputState::new());
        assert_eq!(body.velocity.x, -300.0);
        assert_eq!(body.acceleration.x, -300.0);

        // Already faster than the minimum: velocity is left alone.
        body.velocity.x = 380.0;
        ctrl.current_hor_dir = HorDir::Right;
        ctrl.update(&mut body, &InputState::new());
        assert_eq!(body.velocity.x, 380.0);
        assert_eq!(body.acceleration.x, 300.0);
    }

    #[test]
    fn jump_requires_ground() {
        let mut ctrl = EntityController::new(object(), MotionConfig::default());
        let mut body = body();
        body.velocity.y = 120.0;
        ctrl.should_jump = true;

        ctrl.update(&mut body, &InputState::new());
        assert_eq!(body.velocity.y, 120.0);

        body.blocked.down = true;
        ctrl.update(&mut body, &InputState::new());
        assert_eq!(body.velocity.y, -600.0);
    }

    #[test]
    fn locked_controller_leaves_body_alone() {
        let mut ctrl = EntityController::new(object(), MotionConfig::default());
        let mut body = body();
        body.velocity.x = 200.0;
        ctrl.locked = true;
        ctrl.update(&mut body, &InputState::new());
        assert_eq!(body.velocity.x, 200.0);
        assert_eq!(ctrl.step, StepIntent::default());
    }

    #[test]
    fn player_latest_key_wins_when_both_held() {
        let mut ctrl =
            EntityController::player(object(), MotionConfig::default(), PlayerBindings::default());
        let mut body = body();
        let mut input = InputState::new();

        input.key_down(Key::A);
        ctrl.update(&mut body, &input);
        assert_eq!(ctrl.current_hor_dir, HorDir::Left);

        input.key_down(Key::D);
        ctrl.update(&mut body, &input);
        assert_eq!(ctrl.current_hor_dir, HorDir::Right);

        input.key_up(Key::A);
        ctrl.update(&mut body, &input);
        assert_eq!(ctrl.current_hor_dir, HorDir::Right);

        input.key_down(Key::A);
        ctrl.update(&mut body, &input);
        assert_eq!(ctrl.current_hor_dir, HorDir::Left);
    }

    #[test]
    fn player_jump_needs_release_between_presses() {
        let mut ctrl =
            EntityController::player(object(), MotionConfig::default(), PlayerBindings::default());
        let mut body = body();
        body.blocked.down = true;
        let mut input = InputState::new();

        input.key_down(Key::Space);
        ctrl.update(&mut body, &input);
        assert_eq!(body.velocity.y, -600.0);

        body.velocity.y = 0.0;
        ctrl.update(&mut body, &input);
        assert_eq!(body.velocity.y, 0.0, "held key does not re-jump");

        input.key_up(Key::Space);
        ctrl.update(&mut body, &input);
        input.key_down(Key::Space);
        ctrl.update(&mut body, &input);
        assert_eq!(body.velocity.y, -600.0);
    }

    #[test]
    fn enemy_patrol_turns_at_walls() {
        let mut ctrl =
            EntityController::simple_enemy(object(), MotionConfig::default(), Some(HorDir::Right));
        let mut body = body();
        ctrl.update(&mut body, &InputState::new());
        assert_eq!(ctrl.current_hor_dir, HorDir::Right);

        body.blocked.right = true;
        ctrl.update(&mut body, &InputState::new());
        assert_eq!(ctrl.current_hor_dir, HorDir::Left);
        assert_eq!(body.velocity.x, -300.0);
    }

    #[test]
    fn changing_caps_updates_body() {
        let mut ctrl = EntityController::new(object(), MotionConfig::default());
        let mut body = body();
        ctrl.apply_velocity_caps(&mut body);
        assert_eq!(body.max_velocity, Vec2::new(400.0, 600.0));

        ctrl.set_max_x_vel(250.0, &mut body);
        ctrl.set_max_y_vel(700.0, &mut body);
        assert_eq!(body.max_velocity, Vec2::new(250.0, 700.0));
    }
}
