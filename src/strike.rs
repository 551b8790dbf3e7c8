//! Strike detection: turning hammer motion into validated strike events.
//!
//! ## Candidates
//!
//! - **Release**: [`crate::grab`] drops the hammer from the right hand and
//!   stores a [`StrikeCandidate`] in [`SwingState::released`].
//! - **Swing contact**: the hammer, still in the right hand, enters the
//!   strike radius of the anvil-locked billet while moving downward.  The
//!   swing re-arms once the hammer leaves the radius again.
//!
//! Both share one cooldown (`strike_cooldown`) so a contact followed by an
//! immediate release cannot land twice.
//!
//! ## Validation order
//!
//! 1. a billet exists ([`StrikeRejection::NoBillet`])
//! 2. it is anvil-locked ([`StrikeRejection::NotOnAnvil`])
//! 3. the player stands at the anvil ([`StrikeRejection::AwayFromAnvil`])
//! 4. downward speed × `speed_modifier` ≥ `min_strike_speed` ([`StrikeRejection::TooSlow`])
//! 5. hammer-to-billet distance ≤ `strike_radius × face_size` ([`StrikeRejection::TooFar`])
//!
//! A rejected candidate never reaches [`crate::forging`]; it may only
//! produce feedback text.

use crate::billet::Billet;
use crate::config::ForgeConfig;
use crate::error::StrikeRejection;
use crate::events::ForgeEvent;
use crate::objects::{EntityId, ToolStats, WorldObjects};
use crate::proximity::{Proximity, Station};
use crate::simulation::SimClock;
use crate::spatial::{HandSide, Hands};
use bevy::prelude::*;

/// A hammer motion sample that may become a strike.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrikeCandidate {
    pub tool: EntityId,
    pub position: Vec3,
    pub velocity: Vec3,
}

/// Swing bookkeeping carried between ticks.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct SwingState {
    /// Set by a hammer release this tick.
    pub released: Option<StrikeCandidate>,
    /// Seconds until another strike may land.
    pub cooldown: f32,
    /// Whether the held hammer has been outside the strike radius since the
    /// last contact.
    pub armed: bool,
}

impl Default for SwingState {
    fn default() -> Self {
        Self {
            released: None,
            cooldown: 0.0,
            armed: true,
        }
    }
}

/// A validated strike, consumed by [`crate::forging`] in the same tick.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct StrikeEvent {
    pub tool: EntityId,
    pub tool_velocity: Vec3,
    /// Tool-adjusted downward speed (u/s).
    pub downward_speed: f32,
    /// Billet heat at the moment of impact.
    pub heat: f32,
    /// Hammer-to-anvil-face distance.
    pub distance_to_anvil: f32,
    /// `min(downward_speed / strike_normalization_speed, 1)`.
    pub accuracy: f32,
    pub timestamp: f64,
    /// Impact point (the billet).
    pub position: Vec3,
}

/// Measurements of a candidate that passed validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidStrike {
    pub downward_speed: f32,
    pub distance: f32,
    pub accuracy: f32,
}

/// Downward component of a velocity (positive when moving down).
#[inline]
pub fn downward_speed(velocity: Vec3) -> f32 {
    (-velocity.y).max(0.0)
}

#[inline]
pub fn strike_accuracy(downward_speed: f32, normalization_speed: f32) -> f32 {
    (downward_speed / normalization_speed).clamp(0.0, 1.0)
}

/// Validate a candidate against the billet and the player's position.
///
/// `billet_position` is `None` when no billet exists.
pub fn evaluate_strike(
    candidate: &StrikeCandidate,
    stats: &ToolStats,
    billet: &Billet,
    billet_position: Option<Vec3>,
    near_anvil: bool,
    config: &ForgeConfig,
) -> Result<ValidStrike, StrikeRejection> {
    let Some(billet_position) = billet_position else {
        return Err(StrikeRejection::NoBillet);
    };
    if !billet.anvil_locked {
        return Err(StrikeRejection::NotOnAnvil);
    }
    if !near_anvil {
        return Err(StrikeRejection::AwayFromAnvil);
    }
    let speed = downward_speed(candidate.velocity) * stats.speed_modifier;
    if speed < config.min_strike_speed {
        return Err(StrikeRejection::TooSlow {
            downward_speed: speed,
        });
    }
    let distance = candidate.position.distance(billet_position);
    if distance > config.strike_radius * stats.face_size {
        return Err(StrikeRejection::TooFar { distance });
    }
    Ok(ValidStrike {
        downward_speed: speed,
        distance,
        accuracy: strike_accuracy(speed, config.strike_normalization_speed),
    })
}

/// Swing-contact candidate from the hammer in the right hand, if any.
///
/// Updates `armed`: leaving the radius re-arms, a contact disarms.
pub fn swing_contact(
    swing: &mut SwingState,
    hands: &Hands,
    objects: &WorldObjects,
    billet: &Billet,
    config: &ForgeConfig,
) -> Option<StrikeCandidate> {
    let hand = hands.get(HandSide::Right);
    let tool_id = hand.held?;
    let tool = objects.tool(tool_id)?;
    if !tool.is_striking() {
        swing.armed = true;
        return None;
    }
    let billet_position = objects.get(billet.id)?.position;
    let radius = config.strike_radius * tool.stats.face_size;
    if hand.position.distance(billet_position) > radius {
        swing.armed = true;
        return None;
    }
    if !swing.armed || !billet.anvil_locked || downward_speed(hand.velocity) <= 0.0 {
        return None;
    }
    swing.armed = false;
    Some(StrikeCandidate {
        tool: tool_id,
        position: hand.position,
        velocity: hand.velocity,
    })
}

#[allow(clippy::too_many_arguments)]
pub fn strike_detection_system(
    clock: Res<SimClock>,
    config: Res<ForgeConfig>,
    hands: Res<Hands>,
    objects: Res<WorldObjects>,
    billet: Res<Billet>,
    proximity: Res<Proximity>,
    mut swing: ResMut<SwingState>,
    mut strikes: MessageWriter<StrikeEvent>,
    mut events: MessageWriter<ForgeEvent>,
) {
    swing.cooldown = (swing.cooldown - clock.dt).max(0.0);

    let released = swing.released.take();
    let contact = swing_contact(&mut swing, &hands, &objects, &billet, &config);
    let Some(candidate) = released.or(contact) else {
        return;
    };
    if swing.cooldown > 0.0 {
        return;
    }
    let Some(stats) = objects.tool(candidate.tool).map(|tool| tool.stats) else {
        return;
    };
    let billet_position = objects.get(billet.id).map(|o| o.position);

    match evaluate_strike(
        &candidate,
        &stats,
        &billet,
        billet_position,
        proximity.is_near(Station::Anvil),
        &config,
    ) {
        Ok(valid) => {
            swing.cooldown = config.strike_cooldown;
            let position = billet_position.unwrap_or(candidate.position);
            strikes.write(StrikeEvent {
                tool: candidate.tool,
                tool_velocity: candidate.velocity,
                downward_speed: valid.downward_speed,
                heat: billet.heat,
                distance_to_anvil: candidate
                    .position
                    .distance(Vec3::from_array(config.anvil_position)),
                accuracy: valid.accuracy,
                timestamp: clock.elapsed,
                position,
            });
        }
        Err(rejection) => {
            debug!("Strike rejected: {:?}", rejection);
            if let Some(text) = rejection.message() {
                events.write(ForgeEvent::feedback(text));
            }
        }
    }
}
