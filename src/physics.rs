//! Object motion: held objects, dropped objects, and anvil snapping.
//!
//! Per tick, for every object in [`WorldObjects`]:
//!
//! 1. Held → copy the hand's position and velocity.  Nothing else applies.
//! 2. The billet in the forge sits on the coals; anvil-locked sits on the face.
//! 3. A free billet within `anvil_snap_radius` of the anvil face locks to it.
//! 4. Otherwise a non-resting object falls under gravity until it reaches
//!    the floor, where it comes to rest.
//!
//! Snapping is checked both before and after the gravity step so a billet
//! dropped from above catches on the anvil instead of tunnelling to the floor.

use crate::billet::Billet;
use crate::config::ForgeConfig;
use crate::objects::{WorldObject, WorldObjects};
use crate::simulation::SimClock;
use crate::spatial::Hands;
use bevy::prelude::*;

/// One explicit-Euler gravity step.  Returns `true` when the object landed.
pub fn fall(object: &mut WorldObject, gravity: f32, floor: f32, dt: f32) -> bool {
    object.velocity.y -= gravity * dt;
    object.position += object.velocity * dt;
    if object.position.y <= floor {
        object.position.y = floor;
        object.velocity = Vec3::ZERO;
        object.resting = true;
        true
    } else {
        false
    }
}

/// Lock the billet onto the anvil if it is close enough.
pub fn try_snap_to_anvil(
    object: &mut WorldObject,
    billet: &mut Billet,
    config: &ForgeConfig,
) -> bool {
    let anvil = Vec3::from_array(config.anvil_position);
    if object.position.distance(anvil) > config.anvil_snap_radius {
        return false;
    }
    object.position = anvil;
    object.velocity = Vec3::ZERO;
    object.resting = true;
    billet.anvil_locked = true;
    true
}

pub fn object_physics_system(
    clock: Res<SimClock>,
    config: Res<ForgeConfig>,
    hands: Res<Hands>,
    mut objects: ResMut<WorldObjects>,
    mut billet: ResMut<Billet>,
) {
    let dt = clock.dt;
    let ids: Vec<_> = objects.iter().map(|o| o.id).collect();
    for id in ids {
        let Some(object) = objects.get_mut(id) else {
            continue;
        };

        if let Some(side) = hands.holder_of(id) {
            let hand = hands.get(side);
            object.position = hand.position;
            object.velocity = hand.velocity;
            continue;
        }

        if id == billet.id {
            if billet.in_forge {
                object.position = Vec3::from_array(config.forge_position);
                object.velocity = Vec3::ZERO;
                continue;
            }
            if billet.anvil_locked {
                object.position = Vec3::from_array(config.anvil_position);
                object.velocity = Vec3::ZERO;
                continue;
            }
            if try_snap_to_anvil(object, &mut billet, &config) {
                info!("Billet locked onto the anvil");
                continue;
            }
        }

        if object.resting {
            continue;
        }
        fall(object, config.gravity, config.floor_height, dt);

        if id == billet.id && try_snap_to_anvil(object, &mut billet, &config) {
            info!("Billet locked onto the anvil");
        }
    }
}
