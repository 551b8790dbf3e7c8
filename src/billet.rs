//! The workpiece: metal state of the single active billet.
//!
//! The billet's position lives in [`crate::objects::WorldObjects`] under
//! [`Billet::id`]; this resource holds only the material simulation.
//!
//! ## Mutation rules
//!
//! | Field            | Mutated by                        | Range / rule                        |
//! |------------------|-----------------------------------|-------------------------------------|
//! | `heat`           | [`crate::heat`] every tick        | `[0, 1]`                            |
//! | `quality`        | [`crate::forging`] per strike     | `[0, 100]`, never decreases         |
//! | `defects`        | [`crate::forging`] per strike     | `[0, max_defects]`                  |
//! | `shape_progress` | [`crate::forging`] per strike     | `[0, 1]`                            |
//! | `reheat_count`   | [`Billet::enter_forge`]           | +1 per forge entry after the first  |
//!
//! Everything resets through [`Billet::reset`] (quench or scrap).

use crate::config::ForgeConfig;
use crate::economy::WeaponType;
use crate::heat::{classify, HeatBand, HeatContext};
use crate::objects::EntityId;
use bevy::prelude::*;

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct Billet {
    pub id: EntityId,
    pub heat: f32,
    pub quality: f32,
    pub defects: f32,
    pub shape_progress: f32,
    pub reheat_count: u32,
    /// Set by a low-effectiveness strike; cleared only on reset.
    pub mishandled: bool,
    pub strike_count: u32,
    /// Weapon this billet is being shaped into.
    pub target: WeaponType,
    /// External "metal is in the forge" flag, owned by the station layer.
    pub in_forge: bool,
    /// Snapped onto the anvil's working position.
    pub anvil_locked: bool,
    pub(crate) heated_before: bool,
}

impl Default for Billet {
    fn default() -> Self {
        Self::new(EntityId(0), WeaponType::Sword)
    }
}

impl Billet {
    /// A fresh, cold billet.
    pub fn new(id: EntityId, target: WeaponType) -> Self {
        Self {
            id,
            heat: 0.0,
            quality: 0.0,
            defects: 0.0,
            shape_progress: 0.0,
            reheat_count: 0,
            mishandled: false,
            strike_count: 0,
            target,
            in_forge: false,
            anvil_locked: false,
            heated_before: false,
        }
    }

    /// Replace with a fresh billet of the same id and target.
    pub fn reset(&mut self) {
        *self = Self::new(self.id, self.target);
    }

    #[inline]
    pub fn band(&self, config: &ForgeConfig) -> HeatBand {
        classify(self.heat, config)
    }

    /// Fully shaped and ready to quench.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.shape_progress >= 1.0
    }

    /// Whether no strike has landed yet.
    #[inline]
    pub fn is_untouched(&self) -> bool {
        self.strike_count == 0
    }

    /// Put the billet into the forge.  Every entry after the first counts
    /// as a reheat.  Leaving the anvil is implied.
    pub fn enter_forge(&mut self) {
        if self.heated_before {
            self.reheat_count += 1;
        }
        self.heated_before = true;
        self.in_forge = true;
        self.anvil_locked = false;
    }

    pub fn leave_forge(&mut self) {
        self.in_forge = false;
    }

    /// What the heat model should do with this billet this tick.
    pub fn heat_context(&self) -> HeatContext {
        if self.in_forge {
            HeatContext::InForge
        } else if self.anvil_locked {
            HeatContext::AnvilLocked
        } else {
            HeatContext::Idle
        }
    }

    /// Grade recorded on the finished weapon:
    /// `quality − defects × defect_grade_penalty`, clamped to `[0, 100]`.
    pub fn final_grade(&self, config: &ForgeConfig) -> f32 {
        (self.quality - self.defects * config.defect_grade_penalty).clamp(0.0, 100.0)
    }
}
