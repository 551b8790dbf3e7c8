//! Spatial tracking: player body, camera, and the two hands.
//!
//! ## Per-tick update
//!
//! 1. [`player_movement_system`] walks the player on the horizontal plane.
//! 2. [`hand_tracking_system`] moves the active hand's offset by the pointer
//!    delta, then for **both** hands:
//!    - `target = camera + offset`
//!    - `position = lerp(position, target, HAND_SMOOTHING)`
//!    - `velocity = (position − previous) / dt`, with `dt` already clamped to
//!      `MAX_DELTA_TIME` by [`crate::simulation::SimClock`]
//!    - `previous = position`
//!
//! Everything here is a pure function of (previous state, input, dt); the
//! systems only fetch resources and call into [`Hand::track`] / [`walk`].

use crate::config::ForgeConfig;
use crate::input::{InputKey, InputState};
use crate::objects::EntityId;
use crate::simulation::SimClock;
use bevy::prelude::*;

// ── Player ────────────────────────────────────────────────────────────────────

/// The player's body, standing on the floor.  The camera sits `eye_height`
/// above it and always faces −Z.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct PlayerBody {
    pub position: Vec3,
}

impl Default for PlayerBody {
    fn default() -> Self {
        Self {
            position: Vec3::from_array(crate::constants::PLAYER_START),
        }
    }
}

impl PlayerBody {
    /// World-space camera position.
    #[inline]
    pub fn camera(&self, eye_height: f32) -> Vec3 {
        self.position + Vec3::Y * eye_height
    }
}

/// Horizontal walk direction from the movement keys (not normalized).
pub fn walk_direction(input: &InputState) -> Vec3 {
    let mut dir = Vec3::ZERO;
    if input.key_held(InputKey::Forward) {
        dir.z -= 1.0;
    }
    if input.key_held(InputKey::Back) {
        dir.z += 1.0;
    }
    if input.key_held(InputKey::StrafeLeft) {
        dir.x -= 1.0;
    }
    if input.key_held(InputKey::StrafeRight) {
        dir.x += 1.0;
    }
    dir
}

/// Advance a floor position by a walk direction.  Diagonals are not faster.
pub fn walk(position: Vec3, direction: Vec3, speed: f32, dt: f32) -> Vec3 {
    position + direction.normalize_or_zero() * speed * dt
}

pub fn player_movement_system(
    input: Res<InputState>,
    clock: Res<SimClock>,
    config: Res<ForgeConfig>,
    mut player: ResMut<PlayerBody>,
) {
    let dir = walk_direction(&input);
    if dir != Vec3::ZERO {
        player.position = walk(player.position, dir, config.walk_speed, clock.dt);
    }
}

// ── Hands ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandSide {
    Left,
    Right,
}

/// One tracked end-effector.
///
/// `held` is a plain id: the grab relationship is owned by
/// [`crate::grab`], not by the held object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hand {
    pub side: HandSide,
    /// Target offset from the camera, driven by the pointer.
    pub offset: Vec3,
    /// Smoothed world position.
    pub position: Vec3,
    /// Smoothed position on the previous tick.
    pub previous: Vec3,
    /// Derived world velocity (u/s).
    pub velocity: Vec3,
    pub held: Option<EntityId>,
}

impl Hand {
    pub fn new(side: HandSide, offset: Vec3, camera: Vec3) -> Self {
        let position = camera + offset;
        Self {
            side,
            offset,
            position,
            previous: position,
            velocity: Vec3::ZERO,
            held: None,
        }
    }

    /// World-space position the hand is easing toward.
    #[inline]
    pub fn target(&self, camera: Vec3) -> Vec3 {
        camera + self.offset
    }

    /// Move the target offset by a pointer delta (screen y grows downward),
    /// keeping it inside the reach box around the camera.
    pub fn steer(&mut self, pointer: Vec2, sensitivity: f32, reach: Vec3) {
        self.offset.x += pointer.x * sensitivity;
        self.offset.y -= pointer.y * sensitivity;
        self.offset = self.offset.clamp(-reach, reach);
    }

    /// Smooth toward the target and derive velocity.
    pub fn track(&mut self, camera: Vec3, smoothing: f32, dt: f32) {
        self.position = self.position.lerp(self.target(camera), smoothing);
        self.velocity = derive_velocity(self.position, self.previous, dt);
        self.previous = self.position;
    }
}

/// `(current − previous) / dt`; zero when no time has passed.
#[inline]
pub fn derive_velocity(current: Vec3, previous: Vec3, dt: f32) -> Vec3 {
    if dt > 0.0 {
        (current - previous) / dt
    } else {
        Vec3::ZERO
    }
}

/// Clamp a frame delta so hitches cannot produce velocity spikes.
#[inline]
pub fn clamp_delta_time(dt: f32, max: f32) -> f32 {
    if dt.is_finite() {
        dt.clamp(0.0, max)
    } else {
        0.0
    }
}

/// Both hands.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct Hands {
    pub left: Hand,
    pub right: Hand,
}

impl Default for Hands {
    fn default() -> Self {
        Self::at_rest(&ForgeConfig::default(), PlayerBody::default())
    }
}

impl Hands {
    /// Both hands at their rest offsets in front of the player.
    pub fn at_rest(config: &ForgeConfig, player: PlayerBody) -> Self {
        let camera = player.camera(config.eye_height);
        Self {
            left: Hand::new(HandSide::Left, Vec3::from_array(config.left_hand_rest), camera),
            right: Hand::new(HandSide::Right, Vec3::from_array(config.right_hand_rest), camera),
        }
    }

    pub fn get(&self, side: HandSide) -> &Hand {
        match side {
            HandSide::Left => &self.left,
            HandSide::Right => &self.right,
        }
    }

    pub fn get_mut(&mut self, side: HandSide) -> &mut Hand {
        match side {
            HandSide::Left => &mut self.left,
            HandSide::Right => &mut self.right,
        }
    }

    /// Which hand, if any, holds `id`.
    pub fn holder_of(&self, id: EntityId) -> Option<HandSide> {
        if self.left.held == Some(id) {
            Some(HandSide::Left)
        } else if self.right.held == Some(id) {
            Some(HandSide::Right)
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hand> {
        [&self.left, &self.right].into_iter()
    }
}

/// The hand pointer motion currently drives.
pub fn active_hand(input: &InputState) -> HandSide {
    if input.key_held(InputKey::LeftHandModifier) {
        HandSide::Left
    } else {
        HandSide::Right
    }
}

pub fn hand_tracking_system(
    input: Res<InputState>,
    clock: Res<SimClock>,
    config: Res<ForgeConfig>,
    player: Res<PlayerBody>,
    mut hands: ResMut<Hands>,
) {
    let reach = Vec3::from_array(config.hand_reach);
    if input.pointer_delta != Vec2::ZERO {
        hands
            .get_mut(active_hand(&input))
            .steer(input.pointer_delta, config.pointer_sensitivity, reach);
    }

    let camera = player.camera(config.eye_height);
    hands.left.track(camera, config.hand_smoothing, clock.dt);
    hands.right.track(camera, config.hand_smoothing, clock.dt);
}
