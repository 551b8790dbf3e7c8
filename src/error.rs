//! Forge-specific error and rejection types.
//!
//! Two families live here:
//!
//! - [`ForgeError`]: infrastructure failures (configuration, persistence).
//!   Systems log these and fall back to defaults; none of them stop the
//!   frame loop.
//! - [`StrikeRejection`] / [`SaleRejection`]: invalid player actions.  They are
//!   always recoverable, leave simulation state untouched, and are surfaced to
//!   the player only as feedback text via [`StrikeRejection::message`] /
//!   [`SaleRejection::message`].

use std::fmt;

/// Top-level error enum for the forge simulation.
#[derive(Debug)]
pub enum ForgeError {
    /// A configuration value is outside its safe operating range.
    InvalidConfig {
        /// Name of the offending field (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the accepted range.
        expected: &'static str,
    },

    /// The configuration file could not be parsed.
    ConfigParse(String),

    /// The persistence backend could not be reached or read.
    PersistenceUnavailable(String),

    /// Persisted state exists but could not be decoded.
    CorruptState(String),
}

impl fmt::Display for ForgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForgeError::InvalidConfig {
                name,
                value,
                expected,
            } => write!(
                f,
                "config value '{}' = {} is outside accepted range {}",
                name, value, expected
            ),
            ForgeError::ConfigParse(msg) => write!(f, "failed to parse config: {}", msg),
            ForgeError::PersistenceUnavailable(msg) => {
                write!(f, "persistence backend unavailable: {}", msg)
            }
            ForgeError::CorruptState(msg) => write!(f, "persisted state is corrupt: {}", msg),
        }
    }
}

impl std::error::Error for ForgeError {}

/// Convenience alias: a `Result` using `ForgeError` as the error type.
pub type ForgeResult<T> = Result<T, ForgeError>;

// ── Invalid actions ───────────────────────────────────────────────────────────

/// Why a swing did not count as a strike.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrikeRejection {
    /// There is no billet in the workshop.
    NoBillet,
    /// The billet is not resting on the anvil.
    NotOnAnvil,
    /// The player is standing too far from the anvil.
    AwayFromAnvil,
    /// Downward hammer speed below the minimum.
    TooSlow {
        /// Measured (tool-adjusted) downward speed.
        downward_speed: f32,
    },
    /// Hammer head too far from the billet.
    TooFar {
        /// Measured hammer-to-billet distance.
        distance: f32,
    },
}

impl StrikeRejection {
    /// Player-facing feedback text.  Slow swings are silent: they are usually
    /// just the player putting the hammer down.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            StrikeRejection::NoBillet => None,
            StrikeRejection::NotOnAnvil => Some("Place the metal on the anvil first"),
            StrikeRejection::AwayFromAnvil => Some("Too far from the anvil"),
            StrikeRejection::TooSlow { .. } => None,
            StrikeRejection::TooFar { .. } => Some("Missed the metal"),
        }
    }
}

/// Why a customer refused a weapon.
#[derive(Debug, Clone, PartialEq)]
pub enum SaleRejection {
    /// The weapon is not the type the customer asked for.
    TypeMismatch {
        wanted: crate::economy::WeaponType,
        offered: crate::economy::WeaponType,
    },
    /// The weapon quality is below the customer's minimum.
    InsufficientQuality { required: f32, offered: f32 },
    /// No customer with that id is waiting.
    UnknownCustomer,
    /// No weapon with that id is in the inventory.
    UnknownWeapon,
}

impl SaleRejection {
    /// Player-facing feedback text.
    pub fn message(&self) -> String {
        match self {
            SaleRejection::TypeMismatch { wanted, offered } => format!(
                "The customer wanted a {}, not a {}",
                wanted.label(),
                offered.label()
            ),
            SaleRejection::InsufficientQuality { required, offered } => format!(
                "Not good enough: quality {:.0} offered, {:.0} required",
                offered, required
            ),
            SaleRejection::UnknownCustomer => "Nobody is waiting there".to_string(),
            SaleRejection::UnknownWeapon => "You have nothing to sell".to_string(),
        }
    }

    /// Whether the rejection came from an actual offer to a customer (and so
    /// may cost reputation) rather than from a missing customer/weapon.
    pub fn is_refusal(&self) -> bool {
        matches!(
            self,
            SaleRejection::TypeMismatch { .. } | SaleRejection::InsufficientQuality { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::WeaponType;

    #[test]
    fn display_names_offending_field() {
        let err = ForgeError::InvalidConfig {
            name: "grab_radius",
            value: -1.0,
            expected: "(0.0, ∞)",
        };
        assert!(err.to_string().contains("grab_radius"));
    }

    #[test]
    fn slow_swings_are_silent() {
        assert!(StrikeRejection::TooSlow { downward_speed: 0.5 }
            .message()
            .is_none());
        assert!(StrikeRejection::NotOnAnvil.message().is_some());
    }

    #[test]
    fn only_offers_count_as_refusals() {
        let mismatch = SaleRejection::TypeMismatch {
            wanted: WeaponType::Sword,
            offered: WeaponType::Axe,
        };
        assert!(mismatch.is_refusal());
        assert!(mismatch.message().contains("Sword"));
        assert!(!SaleRejection::UnknownWeapon.is_refusal());
    }
}
