//! Headless end-to-end tests for the forge core.
//!
//! Every test builds an [`App`] with [`MinimalPlugins`] and
//! [`ForgeCorePlugin`], a fixed 16 ms frame time, and an in-memory state
//! backend.  Input is scripted by writing [`InputEvent`] messages; hands are
//! steered by setting their target offsets, exactly as pointer motion would.
//!
//! Covered scenarios:
//! 1. Startup lays out the workshop and applies saved progress.
//! 2. A real downward swing onto the anvil-locked billet lands one strike.
//! 3. A swing at cold metal lands but adds defects and warns the player.
//! 4. A slow release never touches the billet; a fast one strikes, and a
//!    release right after a contact strike does not strike twice.
//! 5. Grabbing skips an object held by the other hand.
//! 6. Forge loading heats the billet and counts reheats.
//! 7. Quench → weapon → sale, with progress saved after each step.
//! 8. Several slots sold in one frame serve the customers shown in them.
//! 9. An impatient customer leaves and costs reputation.
//! 10. An unreachable backend never stops the forge.
//! 11. Identical input replays identical customers.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use emberforge::billet::Billet;
use emberforge::economy::{Customer, CustomerId, Ledger, WeaponType, MASTER_HAMMER_UNLOCK};
use emberforge::events::{DepartureReason, ForgeEvent};
use emberforge::forging::Training;
use emberforge::input::{InputEvent, InputKey, PointerButton};
use emberforge::objects::{ToolKind, ToolStats, WorldObjects};
use emberforge::persistence::{MemoryBackend, PersistedState, StateStore};
use emberforge::simulation::ForgeCorePlugin;
use emberforge::spatial::{Hands, PlayerBody};
use emberforge::strike::SwingState;

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Every `ForgeEvent` seen so far, in order.
#[derive(Resource, Default)]
struct Recorded(Vec<ForgeEvent>);

fn record_forge_events(mut reader: MessageReader<ForgeEvent>, mut recorded: ResMut<Recorded>) {
    recorded.0.extend(reader.read().cloned());
}

/// Build the headless forge and run the startup frame.
fn forge_app(backend: MemoryBackend) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(16)))
        .insert_resource(StateStore::new(backend))
        .add_plugins(ForgeCorePlugin)
        .init_resource::<Recorded>()
        .add_systems(PostUpdate, record_forge_events);
    app.update();
    app
}

fn run(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

fn send(app: &mut App, event: InputEvent) {
    app.world_mut().write_message(event);
}

/// Press and release a key over two frames.
fn tap(app: &mut App, key: InputKey) {
    send(app, InputEvent::KeyDown(key));
    app.update();
    send(app, InputEvent::KeyUp(key));
    app.update();
}

fn events(app: &App) -> Vec<ForgeEvent> {
    app.world().resource::<Recorded>().0.clone()
}

fn feedback(app: &App) -> Vec<String> {
    events(app)
        .into_iter()
        .filter_map(|event| match event {
            ForgeEvent::FeedbackMessage { text } => Some(text),
            _ => None,
        })
        .collect()
}

fn strikes(app: &App) -> Vec<f32> {
    events(app)
        .into_iter()
        .filter_map(|event| match event {
            ForgeEvent::StrikeOccurred { effectiveness } => Some(effectiveness),
            _ => None,
        })
        .collect()
}

fn stand_at(app: &mut App, position: Vec3) {
    app.world_mut().resource_mut::<PlayerBody>().position = position;
}

fn hammer_id(app: &App) -> emberforge::objects::EntityId {
    app.world()
        .resource::<WorldObjects>()
        .find_tool(ToolKind::Hammer)
        .expect("workshop has a hammer")
}

/// Stand at the anvil, hammer in the right hand raised half a unit above
/// the anvil face, billet locked on the anvil at `heat`.
fn ready_to_strike(app: &mut App, heat: f32) {
    stand_at(app, Vec3::new(0.0, 0.0, -0.2));
    let hammer = hammer_id(app);
    {
        let mut hands = app.world_mut().resource_mut::<Hands>();
        hands.right.held = Some(hammer);
        // camera (0, 1.6, -0.2) + offset → (0, 1.3, -0.8)
        hands.right.offset = Vec3::new(0.0, -0.3, -0.6);
    }
    run(app, 40);

    let anvil = Vec3::new(0.0, 0.8, -0.8);
    let id = app.world().resource::<Billet>().id;
    if let Some(object) = app.world_mut().resource_mut::<WorldObjects>().get_mut(id) {
        object.position = anvil;
    }
    let mut billet = app.world_mut().resource_mut::<Billet>();
    billet.anvil_locked = true;
    billet.heat = heat;
}

/// Bring the hammer straight down onto the anvil face.
fn swing_down(app: &mut App, frames: usize) {
    app.world_mut().resource_mut::<Hands>().right.offset = Vec3::new(0.0, -0.8, -0.6);
    run(app, frames);
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn startup_lays_out_workshop() {
    let app = forge_app(MemoryBackend::default());
    let world = app.world();

    assert_eq!(world.resource::<WorldObjects>().len(), 3);
    let billet = world.resource::<Billet>();
    assert_eq!(billet.heat, 0.0);
    assert_eq!(billet.target, WeaponType::Sword);
    let ledger = world.resource::<Ledger>();
    assert_eq!(ledger.money, 50);
    assert_eq!(ledger.reputation, 50.0);
}

#[test]
fn saved_progress_is_applied_at_startup() {
    let saved = PersistedState {
        money: 777,
        reputation: 64.0,
        unlocks: vec![MASTER_HAMMER_UNLOCK.to_string()],
        ..Default::default()
    };
    let app = forge_app(MemoryBackend::with_state(saved));

    let ledger = app.world().resource::<Ledger>();
    assert_eq!(ledger.money, 777);
    assert_eq!(ledger.reputation, 64.0);
    let objects = app.world().resource::<WorldObjects>();
    let hammer = objects.find_tool(ToolKind::Hammer).unwrap();
    assert_eq!(objects.tool(hammer).unwrap().stats, ToolStats::MASTER_HAMMER);
}

#[test]
fn downward_swing_lands_exactly_one_strike() {
    let mut app = forge_app(MemoryBackend::default());
    ready_to_strike(&mut app, 0.68);
    swing_down(&mut app, 8);

    let billet = app.world().resource::<Billet>();
    assert_eq!(billet.strike_count, 1, "one swing, one strike");
    // ideal heat · basic hammer 0.85 · untrained · full accuracy
    assert!((billet.shape_progress - 0.85 * 0.05).abs() < 1e-4);
    assert!((billet.quality - 0.85 * 4.0).abs() < 1e-3);
    assert_eq!(billet.defects, 0.0);
    assert!(!billet.mishandled);

    let landed = strikes(&app);
    assert_eq!(landed.len(), 1);
    assert!((landed[0] - 0.85).abs() < 1e-4);
    assert!(events(&app)
        .iter()
        .any(|e| matches!(e, ForgeEvent::SparksAt { intensity, .. } if *intensity > 0.0)));
    assert_eq!(app.world().resource::<Training>().xp, 1.0);
}

#[test]
fn cold_strike_lands_with_defects_and_warning() {
    let mut app = forge_app(MemoryBackend::default());
    ready_to_strike(&mut app, 0.2);
    swing_down(&mut app, 8);

    let billet = app.world().resource::<Billet>();
    assert_eq!(billet.strike_count, 1);
    assert!(billet.mishandled);
    assert!(billet.defects > 0.0);
    assert!(strikes(&app)[0] <= 0.2);
    assert!(feedback(&app).iter().any(|t| t == "The metal is too cold!"));
}

#[test]
fn slow_release_never_mutates_billet() {
    let mut app = forge_app(MemoryBackend::default());
    ready_to_strike(&mut app, 0.68);
    // Lower the hammer a millimetre per frame (~6 cm/s) until it rests just
    // above the anvil face, then let go.
    for _ in 0..450 {
        app.world_mut().resource_mut::<Hands>().right.offset.y -= 0.001;
        app.update();
    }
    run(&mut app, 30);
    let before = app.world().resource::<Billet>().clone();

    send(&mut app, InputEvent::ButtonDown(PointerButton::Primary));
    app.update();
    send(&mut app, InputEvent::ButtonUp(PointerButton::Primary));
    app.update();

    let after = app.world().resource::<Billet>();
    assert_eq!(after.strike_count, before.strike_count);
    assert_eq!(after.quality, before.quality);
    assert_eq!(after.shape_progress, before.shape_progress);
    assert_eq!(after.defects, before.defects);
    assert_eq!(app.world().resource::<Hands>().right.held, None);
}

#[test]
fn releasing_the_hammer_mid_swing_lands_a_strike() {
    let mut app = forge_app(MemoryBackend::default());
    ready_to_strike(&mut app, 0.68);
    // Ease the hammer into striking range; the slow entry disarms the
    // swing check without striking.
    for _ in 0..300 {
        app.world_mut().resource_mut::<Hands>().right.offset.y -= 0.001;
        app.update();
    }
    run(&mut app, 30);
    assert_eq!(app.world().resource::<Billet>().strike_count, 0);
    assert!(!app.world().resource::<SwingState>().armed);

    app.world_mut().resource_mut::<Billet>().heat = 0.68;
    send(&mut app, InputEvent::ButtonDown(PointerButton::Primary));
    app.update();
    // Drive the hand down at the billet and let go on the same frame:
    // 0.07 u in 16 ms is 4.375 u/s downward.
    app.world_mut().resource_mut::<Hands>().right.offset.y = -0.8;
    send(&mut app, InputEvent::ButtonUp(PointerButton::Primary));
    app.update();

    assert_eq!(app.world().resource::<Billet>().strike_count, 1);
    let landed = strikes(&app);
    assert_eq!(landed.len(), 1);
    assert!((landed[0] - 0.85 * 0.875).abs() < 1e-3);
    assert_eq!(app.world().resource::<Hands>().right.held, None);

    // The dropped hammer falls to the floor instead of hanging in the air.
    run(&mut app, 60);
    let hammer = hammer_id(&app);
    let dropped = *app
        .world()
        .resource::<WorldObjects>()
        .get(hammer)
        .expect("hammer still exists");
    assert!(dropped.resting);
    assert_eq!(dropped.position.y, 0.0);
}

#[test]
fn contact_then_release_inside_cooldown_strikes_once() {
    let mut app = forge_app(MemoryBackend::default());
    ready_to_strike(&mut app, 0.68);
    send(&mut app, InputEvent::ButtonDown(PointerButton::Primary));
    app.update();

    // Second frame of the swing reaches the billet.
    swing_down(&mut app, 2);
    assert_eq!(app.world().resource::<Billet>().strike_count, 1);

    // Letting go one frame later is still inside the cooldown.
    send(&mut app, InputEvent::ButtonUp(PointerButton::Primary));
    app.update();
    run(&mut app, 20);

    assert_eq!(app.world().resource::<Hands>().right.held, None);
    assert_eq!(app.world().resource::<Billet>().strike_count, 1);
    assert_eq!(strikes(&app).len(), 1);
}

#[test]
fn grab_skips_object_held_by_other_hand() {
    let mut app = forge_app(MemoryBackend::default());
    let billet = app.world().resource::<Billet>().id;
    {
        let mut hands = app.world_mut().resource_mut::<Hands>();
        hands.left.held = Some(billet);
        let offset = hands.left.offset;
        hands.right.offset = offset;
    }
    run(&mut app, 40);

    send(&mut app, InputEvent::ButtonDown(PointerButton::Primary));
    app.update();

    let hands = app.world().resource::<Hands>();
    assert_eq!(hands.left.held, Some(billet));
    assert_eq!(hands.right.held, None);
}

#[test]
fn pressing_near_a_tool_grabs_it() {
    let mut app = forge_app(MemoryBackend::default());
    stand_at(&mut app, Vec3::new(0.0, 0.0, -0.2));
    // camera (0, 1.6, -0.2) + offset → hammer rest (0.35, 0.85, -0.7)
    app.world_mut().resource_mut::<Hands>().right.offset = Vec3::new(0.35, -0.75, -0.5);
    run(&mut app, 40);

    send(&mut app, InputEvent::ButtonDown(PointerButton::Primary));
    app.update();

    let hammer = hammer_id(&app);
    assert_eq!(app.world().resource::<Hands>().right.held, Some(hammer));
}

#[test]
fn forge_heats_and_counts_reheats() {
    let mut app = forge_app(MemoryBackend::default());
    stand_at(&mut app, Vec3::new(-1.5, 0.0, -0.5));
    let id = app.world().resource::<Billet>().id;
    app.world_mut().resource_mut::<Hands>().right.held = Some(id);
    app.update();

    tap(&mut app, InputKey::Interact);
    assert!(app.world().resource::<Billet>().in_forge);
    assert_eq!(app.world().resource::<Hands>().right.held, None);

    run(&mut app, 100);
    let heat = app.world().resource::<Billet>().heat;
    assert!(heat > 0.15 && heat < 0.25, "heat {heat}");
    assert!(events(&app)
        .iter()
        .any(|e| matches!(e, ForgeEvent::BilletHeatChanged { .. })));

    tap(&mut app, InputKey::Interact);
    assert!(!app.world().resource::<Billet>().in_forge);
    assert_eq!(app.world().resource::<Hands>().right.held, Some(id));

    tap(&mut app, InputKey::Interact);
    assert_eq!(app.world().resource::<Billet>().reheat_count, 1);
}

#[test]
fn interact_away_from_forge_only_gives_feedback() {
    let mut app = forge_app(MemoryBackend::default());
    let id = app.world().resource::<Billet>().id;
    app.world_mut().resource_mut::<Hands>().right.held = Some(id);

    tap(&mut app, InputKey::Interact);
    assert!(!app.world().resource::<Billet>().in_forge);
    assert!(feedback(&app).iter().any(|t| t == "Too far from the forge"));
}

#[test]
fn quench_forge_weapon_then_sell_it() {
    let backend = MemoryBackend::default();
    let mut app = forge_app(backend.clone());
    stand_at(&mut app, Vec3::new(1.8, 0.0, -0.5));
    {
        let mut billet = app.world_mut().resource_mut::<Billet>();
        billet.shape_progress = 1.0;
        billet.quality = 80.0;
        billet.strike_count = 20;
    }
    app.update();

    tap(&mut app, InputKey::Quench);

    let ledger = app.world().resource::<Ledger>();
    assert_eq!(ledger.inventory.len(), 1);
    let weapon = ledger.inventory[0].clone();
    assert_eq!(weapon.kind, WeaponType::Sword);
    assert_eq!(weapon.quality, 80.0);
    assert_eq!(weapon.price, 191);
    assert_eq!(app.world().resource::<Billet>().quality, 0.0);
    assert!(events(&app).contains(&ForgeEvent::BilletReset));
    assert_eq!(backend.stored().expect("saved after forging").inventory.len(), 1);

    app.world_mut()
        .resource_mut::<Ledger>()
        .customers
        .push(Customer {
            id: CustomerId(100),
            name: "Hilde".to_string(),
            wants: WeaponType::Sword,
            min_quality: 50.0,
            patience: 90.0,
        });
    tap(&mut app, InputKey::Sell(0));

    let ledger = app.world().resource::<Ledger>();
    assert_eq!(ledger.money, 50 + 191);
    assert_eq!(ledger.reputation, 52.0);
    assert!(ledger.inventory.is_empty());
    assert!(ledger.customers.is_empty());
    let recorded = events(&app);
    assert!(recorded.contains(&ForgeEvent::SaleCompleted { price: 191 }));
    assert!(recorded.contains(&ForgeEvent::CustomerDeparted {
        id: CustomerId(100),
        reason: DepartureReason::Served,
    }));
    assert_eq!(backend.stored().unwrap().money, 241);
}

#[test]
fn unfinished_billet_cannot_be_quenched() {
    let mut app = forge_app(MemoryBackend::default());
    stand_at(&mut app, Vec3::new(1.8, 0.0, -0.5));
    app.world_mut().resource_mut::<Billet>().shape_progress = 0.5;
    app.update();

    tap(&mut app, InputKey::Quench);
    assert!(app.world().resource::<Ledger>().inventory.is_empty());
    assert_eq!(app.world().resource::<Billet>().shape_progress, 0.5);
    assert!(feedback(&app).iter().any(|t| t == "The metal isn't shaped yet"));
}

#[test]
fn rejected_sale_keeps_money_and_weapon() {
    let mut app = forge_app(MemoryBackend::default());
    {
        let mut ledger = app.world_mut().resource_mut::<Ledger>();
        let config = emberforge::config::ForgeConfig::default();
        ledger.create_weapon(WeaponType::Sword, 30.0, 5, 0.0, &config);
        ledger.customers.push(Customer {
            id: CustomerId(7),
            name: "Ivor".to_string(),
            wants: WeaponType::Sword,
            min_quality: 60.0,
            patience: 90.0,
        });
    }
    tap(&mut app, InputKey::Sell(0));

    let ledger = app.world().resource::<Ledger>();
    assert_eq!(ledger.money, 50);
    assert_eq!(ledger.inventory.len(), 1);
    assert_eq!(ledger.customers.len(), 1);
    assert_eq!(ledger.reputation, 49.5);
}

#[test]
fn selling_two_slots_in_one_frame_serves_both_customers() {
    let mut app = forge_app(MemoryBackend::default());
    {
        let mut ledger = app.world_mut().resource_mut::<Ledger>();
        let config = emberforge::config::ForgeConfig::default();
        ledger.create_weapon(WeaponType::Sword, 80.0, 20, 0.0, &config);
        ledger.create_weapon(WeaponType::Sword, 80.0, 20, 0.0, &config);
        for (id, name) in [(11, "Aldith"), (12, "Bram")] {
            ledger.customers.push(Customer {
                id: CustomerId(id),
                name: name.to_string(),
                wants: WeaponType::Sword,
                min_quality: 50.0,
                patience: 90.0,
            });
        }
    }
    send(&mut app, InputEvent::KeyDown(InputKey::Sell(1)));
    send(&mut app, InputEvent::KeyDown(InputKey::Sell(0)));
    app.update();

    let ledger = app.world().resource::<Ledger>();
    assert!(ledger.customers.is_empty());
    assert!(ledger.inventory.is_empty());
    assert_eq!(ledger.money, 50 + 2 * 191);

    let served: Vec<CustomerId> = events(&app)
        .into_iter()
        .filter_map(|event| match event {
            ForgeEvent::CustomerDeparted {
                id,
                reason: DepartureReason::Served,
            } => Some(id),
            _ => None,
        })
        .collect();
    assert_eq!(served, vec![CustomerId(11), CustomerId(12)]);
}

#[test]
fn impatient_customer_leaves_and_costs_reputation() {
    let mut app = forge_app(MemoryBackend::default());
    app.world_mut()
        .resource_mut::<Ledger>()
        .customers
        .push(Customer {
            id: CustomerId(3),
            name: "Gareth".to_string(),
            wants: WeaponType::Mace,
            min_quality: 40.0,
            patience: 0.05,
        });
    run(&mut app, 5);

    let ledger = app.world().resource::<Ledger>();
    assert!(ledger.customers.is_empty());
    assert_eq!(ledger.reputation, 45.0);
    assert!(events(&app).contains(&ForgeEvent::CustomerDeparted {
        id: CustomerId(3),
        reason: DepartureReason::LostPatience,
    }));
}

#[test]
fn offline_backend_never_blocks_the_forge() {
    let mut app = forge_app(MemoryBackend::offline());
    assert_eq!(app.world().resource::<Ledger>().money, 50);
    tap(&mut app, InputKey::Save);
    run(&mut app, 10);
    assert_eq!(app.world().resource::<Ledger>().money, 50);
}

#[test]
fn buying_the_master_hammer_upgrades_in_place() {
    let mut app = forge_app(MemoryBackend::default());
    let hammer = hammer_id(&app);
    app.world_mut().resource_mut::<Ledger>().money = 300;

    tap(&mut app, InputKey::BuyUpgrade);

    let ledger = app.world().resource::<Ledger>();
    assert_eq!(ledger.money, 50);
    assert!(ledger.is_unlocked(MASTER_HAMMER_UNLOCK));
    let objects = app.world().resource::<WorldObjects>();
    assert_eq!(objects.find_tool(ToolKind::Hammer), Some(hammer));
    assert_eq!(objects.tool(hammer).unwrap().stats, ToolStats::MASTER_HAMMER);
}

#[test]
fn identical_sessions_replay_identical_customers() {
    let arrivals = || {
        let mut app = forge_app(MemoryBackend::default());
        run(&mut app, 1900);
        events(&app)
            .into_iter()
            .filter(|e| matches!(e, ForgeEvent::CustomerArrived { .. }))
            .collect::<Vec<_>>()
    };
    let first = arrivals();
    assert_eq!(first.len(), 1, "one customer after ~30 s");
    assert_eq!(first, arrivals());
}
