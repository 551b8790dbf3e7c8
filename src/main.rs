use bevy::prelude::*;
use bevy::window::WindowResolution;
use std::env;

use emberforge::config::ForgeConfig;
use emberforge::input::DeviceInputPlugin;
use emberforge::persistence::{FileBackend, StateStore, DEFAULT_STATE_PATH};
use emberforge::presentation::PresentationPlugin;
use emberforge::simulation::ForgeCorePlugin;

fn main() {
    // Optional save-file override, e.g. EMBERFORGE_SAVE=saves/alt.toml
    let save_path = env::var("EMBERFORGE_SAVE").unwrap_or_else(|_| DEFAULT_STATE_PATH.to_string());

    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Emberforge".into(),
            resolution: WindowResolution::new(1200, 680),
            ..Default::default()
        }),
        ..Default::default()
    }))
    .insert_resource(ClearColor(Color::srgb(0.05, 0.04, 0.04)))
    // Compiled defaults; load_forge_config overwrites them from
    // assets/forge.toml (if present) in the Startup schedule.
    .insert_resource(ForgeConfig::default())
    .insert_resource(StateStore::new(FileBackend {
        path: save_path.clone().into(),
    }))
    .add_plugins(ForgeCorePlugin)
    .add_plugins(DeviceInputPlugin)
    .add_plugins(PresentationPlugin);

    println!("Emberforge: progress is saved to {save_path}");
    println!("WASD walk · mouse steers the right hand (Shift: left) · LMB/RMB grab");
    println!("E forge · Q quench · Tab design · R scrap · 1-3 sell · B master hammer · F5 save");

    app.run();
}
