//! Presentation: camera, gizmo drawing, sparks, and the event log.
//!
//! Everything here only reads simulation resources and [`ForgeEvent`]s; it
//! never writes back into the forge.  Added by the binary, not by
//! [`crate::simulation::ForgeCorePlugin`].
//!
//! ## Sparks
//!
//! Sparks are entities carrying a [`Spark`] component with an age and a
//! lifetime.  [`spark_update_system`] moves them, sweeps out expired ones
//! once per frame, and draws the rest; nothing schedules deferred callbacks.

use crate::billet::Billet;
use crate::config::ForgeConfig;
use crate::events::{DepartureReason, ForgeEvent};
use crate::heat::to_celsius;
use crate::objects::{ObjectKind, ToolKind, WorldObjects};
use crate::proximity::{Proximity, Station};
use crate::spatial::{Hands, PlayerBody};
use bevy::prelude::*;
use rand::Rng;

/// Short-lived spark entity.
#[derive(Component, Debug, Clone, Copy)]
pub struct Spark {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Time alive so far (s).
    pub age: f32,
    /// Despawned when `age >= lifetime`.
    pub lifetime: f32,
}

/// Marker for the player camera.
#[derive(Component)]
pub struct ForgeCamera;

const SPARK_GRAVITY: f32 = 6.0;
const SPARKS_PER_STRIKE: f32 = 24.0;

/// Glow colour of metal at `heat`: dull grey → cherry → orange → yellow-white.
pub fn heat_color(heat: f32) -> Color {
    let h = heat.clamp(0.0, 1.0);
    let (r, g, b) = if h < 0.4 {
        let t = h / 0.4;
        (0.35 + 0.25 * t, 0.35 - 0.2 * t, 0.38 - 0.28 * t)
    } else if h < 0.75 {
        let t = (h - 0.4) / 0.35;
        (0.6 + 0.4 * t, 0.15 + 0.35 * t, 0.1 - 0.05 * t)
    } else {
        let t = (h - 0.75) / 0.25;
        (1.0, 0.5 + 0.45 * t, 0.05 + 0.75 * t)
    };
    Color::srgb(r, g, b)
}

pub struct PresentationPlugin;

impl Plugin for PresentationPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera).add_systems(
            Update,
            (
                camera_follow_system,
                spawn_sparks_system,
                spark_update_system,
                draw_workshop_system,
                event_log_system,
            )
                .chain()
                .after(crate::economy::economy_system),
        );
    }
}

fn spawn_camera(mut commands: Commands, config: Res<ForgeConfig>, player: Res<PlayerBody>) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_translation(player.camera(config.eye_height)),
        ForgeCamera,
    ));
}

pub fn camera_follow_system(
    config: Res<ForgeConfig>,
    player: Res<PlayerBody>,
    mut cameras: Query<&mut Transform, With<ForgeCamera>>,
) {
    for mut transform in cameras.iter_mut() {
        transform.translation = player.camera(config.eye_height);
    }
}

pub fn spawn_sparks_system(mut commands: Commands, mut events: MessageReader<ForgeEvent>) {
    let mut rng = rand::thread_rng();
    for event in events.read() {
        let ForgeEvent::SparksAt {
            position,
            intensity,
        } = event
        else {
            continue;
        };
        let count = (SPARKS_PER_STRIKE * intensity).ceil() as usize;
        for _ in 0..count {
            let velocity = Vec3::new(
                rng.gen_range(-1.5..1.5),
                rng.gen_range(0.5..2.5) * (0.5 + intensity),
                rng.gen_range(-1.5..1.5),
            );
            commands.spawn(Spark {
                position: *position,
                velocity,
                age: 0.0,
                lifetime: rng.gen_range(0.2..0.6),
            });
        }
    }
}

pub fn spark_update_system(
    mut commands: Commands,
    time: Res<Time>,
    mut gizmos: Gizmos,
    mut sparks: Query<(Entity, &mut Spark)>,
) {
    let dt = time.delta_secs();
    for (entity, mut spark) in sparks.iter_mut() {
        spark.age += dt;
        if spark.age >= spark.lifetime {
            commands.entity(entity).despawn();
            continue;
        }
        spark.velocity.y -= SPARK_GRAVITY * dt;
        let step = spark.velocity * dt;
        spark.position += step;

        let fade = 1.0 - spark.age / spark.lifetime;
        gizmos.line(
            spark.position,
            spark.position - step * 2.0,
            Color::srgba(1.0, 0.75, 0.3, fade),
        );
    }
}

pub fn draw_workshop_system(
    mut gizmos: Gizmos,
    config: Res<ForgeConfig>,
    proximity: Res<Proximity>,
    objects: Res<WorldObjects>,
    billet: Res<Billet>,
    hands: Res<Hands>,
) {
    for station in Station::ALL {
        let (position, radius) = station.placement(&config);
        let base = match station {
            Station::Forge => Color::srgb(0.9, 0.35, 0.1),
            Station::Anvil => Color::srgb(0.55, 0.55, 0.6),
            Station::Quench => Color::srgb(0.2, 0.45, 0.9),
        };
        gizmos.cuboid(
            Transform::from_translation(position).with_scale(Vec3::new(0.6, 0.1, 0.4)),
            base,
        );
        let glow = 0.15 + 0.85 * proximity.indicator(station);
        let floor = Vec3::new(position.x, config.floor_height + 0.01, position.z);
        gizmos.circle(
            Isometry3d::new(floor, Quat::from_rotation_x(std::f32::consts::FRAC_PI_2)),
            radius,
            base.with_alpha(glow),
        );
    }

    for object in objects.iter() {
        match object.kind {
            ObjectKind::Billet => {
                gizmos.cuboid(
                    Transform::from_translation(object.position)
                        .with_scale(Vec3::new(0.3, 0.04, 0.06)),
                    heat_color(billet.heat),
                );
            }
            ObjectKind::Tool(tool) => {
                let (size, color) = match tool.kind {
                    ToolKind::Hammer => (
                        Vec3::new(0.08 * tool.stats.face_size, 0.08, 0.16),
                        Color::srgb(0.7, 0.7, 0.75),
                    ),
                    ToolKind::Tongs => (Vec3::new(0.03, 0.03, 0.3), Color::srgb(0.4, 0.4, 0.45)),
                };
                gizmos.cuboid(
                    Transform::from_translation(object.position).with_scale(size),
                    color,
                );
            }
        }
    }

    for hand in hands.iter() {
        let color = if hand.held.is_some() {
            Color::srgb(0.95, 0.85, 0.3)
        } else {
            Color::srgb(0.9, 0.75, 0.6)
        };
        gizmos.sphere(Isometry3d::from_translation(hand.position), 0.04, color);
    }
}

/// Mirror player-facing events into the log.
pub fn event_log_system(mut events: MessageReader<ForgeEvent>) {
    for event in events.read() {
        match event {
            ForgeEvent::FeedbackMessage { text } => info!("» {text}"),
            ForgeEvent::StrikeOccurred { effectiveness } => {
                debug!("Strike effectiveness {:.2}", effectiveness)
            }
            ForgeEvent::BilletHeatChanged { heat } => {
                trace!("Billet at {:.0} °C", to_celsius(*heat))
            }
            ForgeEvent::CustomerArrived {
                name,
                wants,
                min_quality,
                ..
            } => info!(
                "» {name} enters, looking for a {} (quality {:.0}+)",
                wants.label(),
                min_quality
            ),
            ForgeEvent::CustomerDeparted { id, reason } => match reason {
                DepartureReason::Served => debug!("Customer {} served", id.0),
                DepartureReason::LostPatience => debug!("Customer {} walked out", id.0),
            },
            ForgeEvent::SaleCompleted { price } => info!("» +{price} coins"),
            ForgeEvent::WeaponForged { .. }
            | ForgeEvent::SparksAt { .. }
            | ForgeEvent::BilletReset => {}
        }
    }
}
