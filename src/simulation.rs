//! Forge core plugin: resources, messages, and the per-frame system chain.
//!
//! The chain runs in one fixed order every frame so a given sequence of
//! `InputEvent`s and frame times always produces the same session:
//!
//! input → clock → movement → hands → grab → object physics → proximity →
//! stations → heat → strikes → forging → economy → end of input frame
//!
//! Saving runs later, in `Last`, so no I/O happens mid-chain.

use crate::billet::Billet;
use crate::config::{load_forge_config, ForgeConfig};
use crate::economy::{economy_system, Ledger, WeaponType};
use crate::events::ForgeEvent;
use crate::forging::{forging_system, Training};
use crate::grab::grab_system;
use crate::heat::{heat_system, HeatReporter};
use crate::input::{apply_input_events_system, end_input_frame_system, InputEvent, InputState};
use crate::objects::{spawn_workshop_objects, WorldObjects};
use crate::persistence::{load_persisted_state, save_state_system, SaveRequest, StateStore};
use crate::physics::object_physics_system;
use crate::proximity::{proximity_system, Proximity};
use crate::spatial::{
    clamp_delta_time, hand_tracking_system, player_movement_system, Hands, PlayerBody,
};
use crate::stations::{station_interaction_system, BilletQuenched};
use crate::strike::{strike_detection_system, StrikeEvent, SwingState};
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Simulation time.  `dt` is the clamped frame delta every system uses.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct SimClock {
    /// Seconds of simulation since startup.
    pub elapsed: f64,
    pub dt: f32,
}

impl SimClock {
    pub fn advance(&mut self, raw_dt: f32, max_dt: f32) {
        self.dt = clamp_delta_time(raw_dt, max_dt);
        self.elapsed += self.dt as f64;
    }
}

/// Seeded RNG shared by every random decision in the forge.
#[derive(Resource)]
pub struct ForgeRng(pub StdRng);

impl Default for ForgeRng {
    fn default() -> Self {
        Self(StdRng::seed_from_u64(crate::constants::RNG_SEED))
    }
}

pub fn advance_clock_system(
    time: Res<Time>,
    config: Res<ForgeConfig>,
    mut clock: ResMut<SimClock>,
) {
    clock.advance(time.delta_secs(), config.max_delta_time);
}

/// Lay out the workshop from the (possibly overridden) config.
#[allow(clippy::too_many_arguments)]
pub fn setup_workshop(
    config: Res<ForgeConfig>,
    mut objects: ResMut<WorldObjects>,
    mut billet: ResMut<Billet>,
    mut player: ResMut<PlayerBody>,
    mut hands: ResMut<Hands>,
    mut ledger: ResMut<Ledger>,
    mut rng: ResMut<ForgeRng>,
) {
    *objects = WorldObjects::default();
    let billet_id = spawn_workshop_objects(&mut objects, &config);
    *billet = Billet::new(billet_id, WeaponType::Sword);
    *player = PlayerBody {
        position: Vec3::from_array(config.player_start),
    };
    *hands = Hands::at_rest(&config, *player);
    *ledger = Ledger::new(&config);
    rng.0 = StdRng::seed_from_u64(config.rng_seed);
    info!(
        "Workshop ready: {} objects, forging a {}",
        objects.len(),
        billet.target.label()
    );
}

/// Headless forging simulation.  Works under `MinimalPlugins`.
///
/// Uses a [`crate::persistence::FileBackend`] unless a [`StateStore`] was
/// inserted before the plugin was added.
pub struct ForgeCorePlugin;

impl Plugin for ForgeCorePlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<StateStore>() {
            app.insert_resource(StateStore::default());
        }

        app.init_resource::<ForgeConfig>()
            .init_resource::<SimClock>()
            .init_resource::<ForgeRng>()
            .init_resource::<InputState>()
            .init_resource::<PlayerBody>()
            .init_resource::<Hands>()
            .init_resource::<WorldObjects>()
            .init_resource::<Billet>()
            .init_resource::<Proximity>()
            .init_resource::<HeatReporter>()
            .init_resource::<SwingState>()
            .init_resource::<Training>()
            .init_resource::<Ledger>()
            .add_message::<InputEvent>()
            .add_message::<StrikeEvent>()
            .add_message::<ForgeEvent>()
            .add_message::<BilletQuenched>()
            .add_message::<SaveRequest>()
            .add_systems(
                Startup,
                (load_forge_config, setup_workshop, load_persisted_state).chain(),
            )
            .add_systems(
                Update,
                (
                    apply_input_events_system,
                    advance_clock_system,
                    player_movement_system,
                    hand_tracking_system,
                    grab_system,
                    object_physics_system,
                    proximity_system,
                    station_interaction_system,
                    heat_system,
                    strike_detection_system,
                    forging_system,
                    economy_system,
                    end_input_frame_system,
                )
                    .chain(),
            )
            .add_systems(Last, save_state_system);
    }
}
