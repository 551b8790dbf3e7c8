//! Messages the simulation core emits for the presentation layer.
//!
//! The core never renders, plays audio, or touches UI.  Everything a
//! presentation layer needs is written as a [`ForgeEvent`] message; the
//! binary's [`crate::presentation::PresentationPlugin`] consumes them, and the
//! headless tests read them to observe the simulation.

use crate::economy::{CustomerId, WeaponId, WeaponType};
use bevy::prelude::*;

/// Why a customer left the shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepartureReason {
    /// Bought a weapon.
    Served,
    /// Patience ran out.
    LostPatience,
}

/// One observable change in the forge.
#[derive(Message, Debug, Clone, PartialEq)]
pub enum ForgeEvent {
    /// A valid strike was applied to the billet.
    StrikeOccurred { effectiveness: f32 },
    /// Billet heat moved noticeably (or crossed a band boundary).
    BilletHeatChanged { heat: f32 },
    /// Player-facing text (invalid actions, hints, results).
    FeedbackMessage { text: String },
    /// Spawn sparks at `position`; `intensity` in `[0, 1]`.
    SparksAt { position: Vec3, intensity: f32 },
    /// A new customer entered the shop.
    CustomerArrived {
        id: CustomerId,
        name: String,
        wants: WeaponType,
        min_quality: f32,
    },
    /// A customer left the shop.
    CustomerDeparted {
        id: CustomerId,
        reason: DepartureReason,
    },
    /// A sale went through; `price` was added to the balance.
    SaleCompleted { price: u32 },
    /// A quenched billet became a finished weapon.
    WeaponForged {
        id: WeaponId,
        kind: WeaponType,
        quality: f32,
        price: u32,
    },
    /// The billet was replaced by a fresh cold one.
    BilletReset,
}

impl ForgeEvent {
    /// Shorthand for a feedback message.
    pub fn feedback(text: impl Into<String>) -> Self {
        ForgeEvent::FeedbackMessage { text: text.into() }
    }
}
