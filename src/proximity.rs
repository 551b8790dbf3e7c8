//! Station proximity.
//!
//! Distances are measured on the horizontal plane only: standing next to the
//! anvil counts whether or not the camera is above its face.  Logic reads the
//! instantaneous `near` flags; the eased `indicators` exist for display.

use crate::config::ForgeConfig;
use crate::simulation::SimClock;
use crate::spatial::PlayerBody;
use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Station {
    Forge,
    Anvil,
    Quench,
}

impl Station {
    pub const ALL: [Station; 3] = [Station::Forge, Station::Anvil, Station::Quench];

    #[inline]
    fn index(self) -> usize {
        match self {
            Station::Forge => 0,
            Station::Anvil => 1,
            Station::Quench => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Station::Forge => "forge",
            Station::Anvil => "anvil",
            Station::Quench => "quench tub",
        }
    }

    /// World position and "near" radius from the configured layout.
    pub fn placement(self, config: &ForgeConfig) -> (Vec3, f32) {
        match self {
            Station::Forge => (Vec3::from_array(config.forge_position), config.forge_radius),
            Station::Anvil => (Vec3::from_array(config.anvil_position), config.anvil_radius),
            Station::Quench => (
                Vec3::from_array(config.quench_position),
                config.quench_radius,
            ),
        }
    }
}

/// Distance ignoring the vertical axis.
#[inline]
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(a.x - b.x, a.z - b.z).length()
}

#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct Proximity {
    near: [bool; 3],
    indicators: [f32; 3],
}

impl Proximity {
    #[inline]
    pub fn is_near(&self, station: Station) -> bool {
        self.near[station.index()]
    }

    /// Display-only strength in `[0, 1]`, easing toward the `near` flag.
    #[inline]
    pub fn indicator(&self, station: Station) -> f32 {
        self.indicators[station.index()]
    }

    /// Recompute every flag from the player's position and ease the
    /// indicators by `rate · dt`.
    pub fn update(&mut self, player: Vec3, config: &ForgeConfig, dt: f32) {
        let step = config.proximity_indicator_rate * dt;
        for station in Station::ALL {
            let (position, radius) = station.placement(config);
            let near = horizontal_distance(player, position) <= radius;
            let i = station.index();
            self.near[i] = near;
            let goal = if near { 1.0 } else { 0.0 };
            let current = self.indicators[i];
            self.indicators[i] = if current < goal {
                (current + step).min(goal)
            } else {
                (current - step).max(goal)
            };
        }
    }
}

pub fn proximity_system(
    clock: Res<SimClock>,
    config: Res<ForgeConfig>,
    player: Res<PlayerBody>,
    mut proximity: ResMut<Proximity>,
) {
    let before = *proximity;
    proximity.update(player.position, &config, clock.dt);
    for station in Station::ALL {
        if before.is_near(station) != proximity.is_near(station) {
            debug!(
                "Player {} the {}",
                if proximity.is_near(station) { "reached" } else { "left" },
                station.label()
            );
        }
    }
}
