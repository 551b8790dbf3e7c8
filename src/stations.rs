//! Station actions driven by keys: forge, quench tub, design choice, scrap,
//! shop upgrades, and saving.
//!
//! Every action checks where the player stands; an action attempted at the
//! wrong place or with the metal in the wrong state only produces feedback.

use crate::billet::Billet;
use crate::config::ForgeConfig;
use crate::economy::{Ledger, UpgradePurchase, WeaponType, MASTER_HAMMER_UNLOCK};
use crate::events::ForgeEvent;
use crate::input::{InputKey, InputState};
use crate::objects::{billet_stock_position, ToolKind, ToolStats, WorldObjects};
use crate::persistence::SaveRequest;
use crate::proximity::{Proximity, Station};
use crate::spatial::{HandSide, Hands};
use bevy::prelude::*;

/// A finished billet was quenched; the economy turns it into a weapon.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct BilletQuenched {
    pub kind: WeaponType,
    /// Final grade after the defect penalty.
    pub grade: f32,
    pub strike_count: u32,
}

/// Result of pressing `Interact` at the forge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForgeAction {
    Loaded,
    Unloaded(HandSide),
    HandsFull,
    NothingToLoad,
}

/// Load the held billet into the forge, or take it out into a free hand.
pub fn use_forge(
    billet: &mut Billet,
    hands: &mut Hands,
    objects: &mut WorldObjects,
) -> ForgeAction {
    if billet.in_forge {
        let side = if hands.right.held.is_none() {
            HandSide::Right
        } else if hands.left.held.is_none() {
            HandSide::Left
        } else {
            return ForgeAction::HandsFull;
        };
        billet.leave_forge();
        hands.get_mut(side).held = Some(billet.id);
        if let Some(object) = objects.get_mut(billet.id) {
            object.grabbable = true;
            object.resting = false;
        }
        return ForgeAction::Unloaded(side);
    }

    let Some(side) = hands.holder_of(billet.id) else {
        return ForgeAction::NothingToLoad;
    };
    hands.get_mut(side).held = None;
    billet.enter_forge();
    if let Some(object) = objects.get_mut(billet.id) {
        object.grabbable = false;
        object.velocity = Vec3::ZERO;
    }
    ForgeAction::Loaded
}

/// Replace the billet with fresh stock on the bench.
pub fn restock_billet(
    billet: &mut Billet,
    hands: &mut Hands,
    objects: &mut WorldObjects,
    config: &ForgeConfig,
) {
    if let Some(side) = hands.holder_of(billet.id) {
        hands.get_mut(side).held = None;
    }
    billet.reset();
    if let Some(object) = objects.get_mut(billet.id) {
        object.position = billet_stock_position(config);
        object.velocity = Vec3::ZERO;
        object.grabbable = true;
        object.resting = true;
    }
}

/// Quench the billet if it is fully shaped.  Returns the quench record.
pub fn quench(
    billet: &mut Billet,
    hands: &mut Hands,
    objects: &mut WorldObjects,
    config: &ForgeConfig,
) -> Option<BilletQuenched> {
    if billet.in_forge || !billet.is_finished() {
        return None;
    }
    let record = BilletQuenched {
        kind: billet.target,
        grade: billet.final_grade(config),
        strike_count: billet.strike_count,
    };
    restock_billet(billet, hands, objects, config);
    Some(record)
}

#[allow(clippy::too_many_arguments)]
pub fn station_interaction_system(
    input: Res<InputState>,
    config: Res<ForgeConfig>,
    proximity: Res<Proximity>,
    mut billet: ResMut<Billet>,
    mut hands: ResMut<Hands>,
    mut objects: ResMut<WorldObjects>,
    mut ledger: ResMut<Ledger>,
    mut quenched: MessageWriter<BilletQuenched>,
    mut events: MessageWriter<ForgeEvent>,
    mut saves: MessageWriter<SaveRequest>,
) {
    if input.key_just_pressed(InputKey::Interact) {
        if !proximity.is_near(Station::Forge) {
            events.write(ForgeEvent::feedback("Too far from the forge"));
        } else {
            match use_forge(&mut billet, &mut hands, &mut objects) {
                ForgeAction::Loaded => {
                    info!("Billet into the forge (reheat #{})", billet.reheat_count);
                    events.write(ForgeEvent::feedback("The metal is heating"));
                }
                ForgeAction::Unloaded(side) => {
                    info!(
                        "Billet out of the forge into {:?} hand at heat {:.2}",
                        side, billet.heat
                    );
                }
                ForgeAction::HandsFull => {
                    events.write(ForgeEvent::feedback("Your hands are full"));
                }
                ForgeAction::NothingToLoad => {
                    events.write(ForgeEvent::feedback("Pick up the metal first"));
                }
            }
        }
    }

    if input.key_just_pressed(InputKey::Quench) {
        if !proximity.is_near(Station::Quench) {
            events.write(ForgeEvent::feedback("Too far from the quench tub"));
        } else if billet.in_forge {
            events.write(ForgeEvent::feedback("Take the metal out of the forge first"));
        } else {
            match quench(&mut billet, &mut hands, &mut objects, &config) {
                Some(record) => {
                    info!(
                        "Quenched {} at grade {:.1} after {} strikes",
                        record.kind.label(),
                        record.grade,
                        record.strike_count
                    );
                    quenched.write(record);
                    events.write(ForgeEvent::BilletReset);
                }
                None => {
                    events.write(ForgeEvent::feedback("The metal isn't shaped yet"));
                }
            }
        }
    }

    if input.key_just_pressed(InputKey::CycleWeapon) {
        if billet.is_untouched() {
            billet.target = billet.target.next();
            events.write(ForgeEvent::feedback(format!("Now forging: {}", billet.target.label())));
        } else {
            events.write(ForgeEvent::feedback("Too late to change the design"));
        }
    }

    if input.key_just_pressed(InputKey::ResetBillet) {
        restock_billet(&mut billet, &mut hands, &mut objects, &config);
        info!("Billet scrapped");
        events.write(ForgeEvent::BilletReset);
        events.write(ForgeEvent::feedback("A fresh billet waits by the forge"));
    }

    if input.key_just_pressed(InputKey::BuyUpgrade) {
        match ledger.purchase_unlock(MASTER_HAMMER_UNLOCK, config.master_hammer_cost) {
            UpgradePurchase::Purchased { cost } => {
                objects.upgrade_tool(ToolKind::Hammer, ToolStats::MASTER_HAMMER);
                info!("Bought the master hammer for {}", cost);
                events.write(ForgeEvent::feedback("Master hammer acquired"));
                saves.write(SaveRequest);
            }
            UpgradePurchase::AlreadyOwned => {
                events.write(ForgeEvent::feedback("You already own the master hammer"));
            }
            UpgradePurchase::InsufficientFunds { cost } => {
                events.write(ForgeEvent::feedback(format!(
                    "The master hammer costs {} coins",
                    cost
                )));
            }
        }
    }

    if input.key_just_pressed(InputKey::Save) {
        saves.write(SaveRequest);
    }
}
