//! Grab resolution: which object, if any, each hand holds.
//!
//! The relationship lives on [`crate::spatial::Hand::held`] only; objects do
//! not know who holds them.  An object is held by at most one hand.
//!
//! Button mapping: `Primary` drives the right hand, `Secondary` the left.
//! A press with an empty hand attempts a grab; a release drops whatever the
//! hand holds.  Releasing the hammer from the right hand hands a strike
//! candidate to [`crate::strike`].

use crate::billet::Billet;
use crate::config::ForgeConfig;
use crate::input::{InputState, PointerButton};
use crate::objects::{EntityId, WorldObject, WorldObjects};
use crate::spatial::{Hand, HandSide, Hands};
use crate::strike::{StrikeCandidate, SwingState};
use bevy::prelude::*;

/// The hand a pointer button controls.
#[inline]
pub fn hand_for(button: PointerButton) -> HandSide {
    match button {
        PointerButton::Primary => HandSide::Right,
        PointerButton::Secondary => HandSide::Left,
    }
}

/// Nearest grabbable object within `radius` of the `side` hand.
///
/// Objects held by either hand are skipped.  Ties keep the first object in
/// iteration order, so the result is deterministic for a fixed table.
pub fn attempt_grab(
    hands: &Hands,
    side: HandSide,
    objects: &WorldObjects,
    radius: f32,
) -> Option<EntityId> {
    let hand = hands.get(side);
    let mut best: Option<(EntityId, f32)> = None;
    for object in objects.iter() {
        if !object.grabbable || hands.holder_of(object.id).is_some() {
            continue;
        }
        let distance = object.position.distance(hand.position);
        if distance > radius {
            continue;
        }
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((object.id, distance));
        }
    }
    best.map(|(id, _)| id)
}

/// Detach whatever the hand holds and return it.
pub fn release(hands: &mut Hands, side: HandSide) -> Option<EntityId> {
    hands.get_mut(side).held.take()
}

/// Strike candidate produced by letting go of `object` from `hand`.
///
/// Only a hammer leaving the right hand swings; tongs, the billet and
/// anything dropped by the left hand are just put down.
pub fn release_strike(hand: &Hand, object: &WorldObject) -> Option<StrikeCandidate> {
    let striking = object.tool().is_some_and(|tool| tool.is_striking());
    (striking && hand.side == HandSide::Right).then(|| StrikeCandidate {
        tool: object.id,
        position: hand.position,
        velocity: hand.velocity,
    })
}

pub fn grab_system(
    input: Res<InputState>,
    config: Res<ForgeConfig>,
    mut hands: ResMut<Hands>,
    mut objects: ResMut<WorldObjects>,
    mut billet: ResMut<Billet>,
    mut swing: ResMut<SwingState>,
) {
    for button in [PointerButton::Primary, PointerButton::Secondary] {
        let side = hand_for(button);

        if input.button_just_pressed(button) && hands.get(side).held.is_none() {
            if let Some(id) = attempt_grab(&hands, side, &objects, config.grab_radius) {
                hands.get_mut(side).held = Some(id);
                if id == billet.id {
                    billet.anvil_locked = false;
                }
                if let Some(object) = objects.get_mut(id) {
                    object.resting = false;
                }
                debug!("{:?} hand grabbed object {}", side, id.0);
            }
        }

        if input.button_just_released(button) {
            let hand = *hands.get(side);
            let Some(id) = release(&mut hands, side) else {
                continue;
            };
            let Some(object) = objects.get_mut(id) else {
                continue;
            };
            object.position = hand.position;
            object.velocity = hand.velocity;
            // Everything let go of drops until it lands or snaps.
            object.resting = false;
            debug!("{:?} hand released object {}", side, id.0);

            if let Some(candidate) = release_strike(&hand, object) {
                swing.released = Some(candidate);
                swing.armed = false;
            }
        }
    }
}
