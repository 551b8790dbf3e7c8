//! Runtime forging configuration loaded from `assets/forge.toml`.
//!
//! [`ForgeConfig`] is a Bevy [`Resource`] that mirrors every constant in
//! [`crate::constants`].  At startup, [`load_forge_config`] reads
//! `assets/forge.toml` and overwrites the defaults with any values present in
//! the file.  Missing keys fall back to the compile-time defaults, so a minimal
//! TOML can override just the values you care about:
//!
//! ```toml
//! heating_rate = 0.2
//! heat_curve = [[0.0, 0.1], [0.4, 0.25], [0.6, 1.0], [0.75, 1.0], [1.0, 0.5]]
//! ```
//!
//! A file that parses but fails [`ForgeConfig::validate`] is rejected as a
//! whole and the compiled defaults stay in place.
//!
//! Keep `src/constants.rs` in sync: it remains the **authoritative default**
//! source used by `ForgeConfig::default()`.

use crate::constants::*;
use crate::error::{ForgeError, ForgeResult};
use bevy::prelude::*;
use serde::Deserialize;

/// Path of the optional override file, relative to the working directory.
pub const CONFIG_PATH: &str = "assets/forge.toml";

/// Runtime-tunable forging and gameplay configuration.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ForgeConfig {
    // ── Frame Timing ─────────────────────────────────────────────────────────
    pub max_delta_time: f32,
    pub rng_seed: u64,

    // ── Player & Hands ───────────────────────────────────────────────────────
    pub walk_speed: f32,
    pub eye_height: f32,
    pub player_start: [f32; 3],
    pub pointer_sensitivity: f32,
    pub hand_smoothing: f32,
    pub left_hand_rest: [f32; 3],
    pub right_hand_rest: [f32; 3],
    pub hand_reach: [f32; 3],

    // ── Grabbing & Physics ───────────────────────────────────────────────────
    pub grab_radius: f32,
    pub gravity: f32,
    pub floor_height: f32,

    // ── Stations ─────────────────────────────────────────────────────────────
    pub forge_position: [f32; 3],
    pub forge_radius: f32,
    pub anvil_position: [f32; 3],
    pub anvil_radius: f32,
    pub quench_position: [f32; 3],
    pub quench_radius: f32,
    pub anvil_snap_radius: f32,
    pub proximity_indicator_rate: f32,

    // ── Heat ─────────────────────────────────────────────────────────────────
    pub heating_rate: f32,
    pub forge_max_heat: f32,
    pub base_decay_rate: f32,
    pub reheat_penalty_base: f32,
    pub heat_cold_threshold: f32,
    pub heat_ideal_min: f32,
    pub heat_ideal_max: f32,
    pub heat_burn_threshold: f32,
    pub heat_curve: Vec<[f32; 2]>,
    pub heat_event_step: f32,

    // ── Strikes ──────────────────────────────────────────────────────────────
    pub min_strike_speed: f32,
    pub strike_radius: f32,
    pub strike_normalization_speed: f32,
    pub strike_cooldown: f32,

    // ── Forging ──────────────────────────────────────────────────────────────
    pub shape_gain_rate: f32,
    pub quality_gain_rate: f32,
    pub defect_threshold: f32,
    pub mishandle_defect: f32,
    pub heat_defect: f32,
    pub max_defects: f32,
    pub defect_grade_penalty: f32,
    pub reference_tool_mass: f32,
    pub spark_intensity_floor: f32,

    // ── Training ─────────────────────────────────────────────────────────────
    pub training_max_level: u32,
    pub training_bonus_per_level: f32,
    pub good_strike_threshold: f32,
    pub xp_per_good_strike: f32,
    pub xp_per_level: f32,

    // ── Economy ──────────────────────────────────────────────────────────────
    pub starting_money: u32,
    pub starting_reputation: f32,
    pub max_reputation: f32,
    pub quality_mult_min: f32,
    pub quality_mult_max: f32,
    pub reputation_mult_min: f32,
    pub reputation_mult_max: f32,
    pub dagger_base_price: f32,
    pub sword_base_price: f32,
    pub axe_base_price: f32,
    pub mace_base_price: f32,
    pub max_customers: usize,
    pub customer_spawn_interval: f32,
    pub customer_min_quality_range: (u32, u32),
    pub customer_patience_range: (f32, f32),
    pub sale_reputation_gain: f32,
    pub rejection_reputation_penalty: f32,
    pub patience_reputation_penalty: f32,
    pub master_hammer_cost: u32,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            // Frame Timing
            max_delta_time: MAX_DELTA_TIME,
            rng_seed: RNG_SEED,
            // Player & Hands
            walk_speed: WALK_SPEED,
            eye_height: EYE_HEIGHT,
            player_start: PLAYER_START,
            pointer_sensitivity: POINTER_SENSITIVITY,
            hand_smoothing: HAND_SMOOTHING,
            left_hand_rest: LEFT_HAND_REST,
            right_hand_rest: RIGHT_HAND_REST,
            hand_reach: HAND_REACH,
            // Grabbing & Physics
            grab_radius: GRAB_RADIUS,
            gravity: GRAVITY,
            floor_height: FLOOR_HEIGHT,
            // Stations
            forge_position: FORGE_POSITION,
            forge_radius: FORGE_RADIUS,
            anvil_position: ANVIL_POSITION,
            anvil_radius: ANVIL_RADIUS,
            quench_position: QUENCH_POSITION,
            quench_radius: QUENCH_RADIUS,
            anvil_snap_radius: ANVIL_SNAP_RADIUS,
            proximity_indicator_rate: PROXIMITY_INDICATOR_RATE,
            // Heat
            heating_rate: HEATING_RATE,
            forge_max_heat: FORGE_MAX_HEAT,
            base_decay_rate: BASE_DECAY_RATE,
            reheat_penalty_base: REHEAT_PENALTY_BASE,
            heat_cold_threshold: HEAT_COLD_THRESHOLD,
            heat_ideal_min: HEAT_IDEAL_MIN,
            heat_ideal_max: HEAT_IDEAL_MAX,
            heat_burn_threshold: HEAT_BURN_THRESHOLD,
            heat_curve: HEAT_CURVE.iter().map(|&(h, m)| [h, m]).collect(),
            heat_event_step: HEAT_EVENT_STEP,
            // Strikes
            min_strike_speed: MIN_STRIKE_SPEED,
            strike_radius: STRIKE_RADIUS,
            strike_normalization_speed: STRIKE_NORMALIZATION_SPEED,
            strike_cooldown: STRIKE_COOLDOWN,
            // Forging
            shape_gain_rate: SHAPE_GAIN_RATE,
            quality_gain_rate: QUALITY_GAIN_RATE,
            defect_threshold: DEFECT_THRESHOLD,
            mishandle_defect: MISHANDLE_DEFECT,
            heat_defect: HEAT_DEFECT,
            max_defects: MAX_DEFECTS,
            defect_grade_penalty: DEFECT_GRADE_PENALTY,
            reference_tool_mass: REFERENCE_TOOL_MASS,
            spark_intensity_floor: SPARK_INTENSITY_FLOOR,
            // Training
            training_max_level: TRAINING_MAX_LEVEL,
            training_bonus_per_level: TRAINING_BONUS_PER_LEVEL,
            good_strike_threshold: GOOD_STRIKE_THRESHOLD,
            xp_per_good_strike: XP_PER_GOOD_STRIKE,
            xp_per_level: XP_PER_LEVEL,
            // Economy
            starting_money: STARTING_MONEY,
            starting_reputation: STARTING_REPUTATION,
            max_reputation: MAX_REPUTATION,
            quality_mult_min: QUALITY_MULT_MIN,
            quality_mult_max: QUALITY_MULT_MAX,
            reputation_mult_min: REPUTATION_MULT_MIN,
            reputation_mult_max: REPUTATION_MULT_MAX,
            dagger_base_price: DAGGER_BASE_PRICE,
            sword_base_price: SWORD_BASE_PRICE,
            axe_base_price: AXE_BASE_PRICE,
            mace_base_price: MACE_BASE_PRICE,
            max_customers: MAX_CUSTOMERS,
            customer_spawn_interval: CUSTOMER_SPAWN_INTERVAL,
            customer_min_quality_range: CUSTOMER_MIN_QUALITY_RANGE,
            customer_patience_range: CUSTOMER_PATIENCE_RANGE,
            sale_reputation_gain: SALE_REPUTATION_GAIN,
            rejection_reputation_penalty: REJECTION_REPUTATION_PENALTY,
            patience_reputation_penalty: PATIENCE_REPUTATION_PENALTY,
            master_hammer_cost: MASTER_HAMMER_COST,
        }
    }
}

impl ForgeConfig {
    /// Check cross-field invariants that the simulation relies on.
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> ForgeResult<()> {
        positive("max_delta_time", self.max_delta_time)?;
        positive("grab_radius", self.grab_radius)?;
        positive("strike_radius", self.strike_radius)?;
        positive("strike_normalization_speed", self.strike_normalization_speed)?;
        positive("reference_tool_mass", self.reference_tool_mass)?;
        positive("xp_per_level", self.xp_per_level)?;

        if !(0.0..=1.0).contains(&self.hand_smoothing) {
            return Err(ForgeError::InvalidConfig {
                name: "hand_smoothing",
                value: self.hand_smoothing,
                expected: "[0.0, 1.0]",
            });
        }
        if self.reheat_penalty_base < 1.0 {
            return Err(ForgeError::InvalidConfig {
                name: "reheat_penalty_base",
                value: self.reheat_penalty_base,
                expected: "[1.0, ∞)",
            });
        }
        if !(self.heat_cold_threshold <= self.heat_ideal_min
            && self.heat_ideal_min <= self.heat_ideal_max
            && self.heat_ideal_max <= self.heat_burn_threshold)
        {
            return Err(ForgeError::InvalidConfig {
                name: "heat thresholds",
                value: self.heat_ideal_min,
                expected: "cold ≤ ideal_min ≤ ideal_max ≤ burn",
            });
        }
        if self.heat_curve.len() < 2 {
            return Err(ForgeError::InvalidConfig {
                name: "heat_curve",
                value: self.heat_curve.len() as f32,
                expected: "at least 2 knots",
            });
        }
        for pair in self.heat_curve.windows(2) {
            if pair[1][0] <= pair[0][0] {
                return Err(ForgeError::InvalidConfig {
                    name: "heat_curve",
                    value: pair[1][0],
                    expected: "strictly increasing heat knots",
                });
            }
        }
        if self.customer_min_quality_range.0 > self.customer_min_quality_range.1 {
            return Err(ForgeError::InvalidConfig {
                name: "customer_min_quality_range",
                value: self.customer_min_quality_range.0 as f32,
                expected: "min ≤ max",
            });
        }
        if self.customer_patience_range.0 > self.customer_patience_range.1
            || self.customer_patience_range.0 <= 0.0
        {
            return Err(ForgeError::InvalidConfig {
                name: "customer_patience_range",
                value: self.customer_patience_range.0,
                expected: "0 < min ≤ max",
            });
        }
        Ok(())
    }

    /// Parse a TOML override document and validate the result.
    pub fn from_toml_str(contents: &str) -> ForgeResult<Self> {
        let config: ForgeConfig =
            toml::from_str(contents).map_err(|err| ForgeError::ConfigParse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

fn positive(name: &'static str, value: f32) -> ForgeResult<()> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ForgeError::InvalidConfig {
            name,
            value,
            expected: "(0.0, ∞)",
        })
    }
}

/// Startup system: attempt to load `assets/forge.toml` and overwrite the
/// `ForgeConfig` resource with the values present in the file.
///
/// A missing file is not an error.  Parse or validation failures are logged
/// and the compiled defaults stay in place; the simulation always starts.
pub fn load_forge_config(mut config: ResMut<ForgeConfig>) {
    match std::fs::read_to_string(CONFIG_PATH) {
        Ok(contents) => match ForgeConfig::from_toml_str(&contents) {
            Ok(loaded) => {
                *config = loaded;
                info!("Loaded forge config from {CONFIG_PATH}");
            }
            Err(err) => {
                warn!("Rejected {CONFIG_PATH}: {err}; using defaults");
            }
        },
        Err(_) => {
            info!("No {CONFIG_PATH} found; using compiled defaults");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(ForgeConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = ForgeConfig::from_toml_str("heating_rate = 0.5\nmax_customers = 1\n")
            .expect("partial override must parse");
        assert_eq!(config.heating_rate, 0.5);
        assert_eq!(config.max_customers, 1);
        assert_eq!(config.grab_radius, GRAB_RADIUS);
    }

    #[test]
    fn unordered_heat_curve_is_rejected() {
        let err = ForgeConfig::from_toml_str("heat_curve = [[0.5, 1.0], [0.2, 0.1]]")
            .expect_err("decreasing knots must be rejected");
        assert!(matches!(err, ForgeError::InvalidConfig { name: "heat_curve", .. }));
    }

    #[test]
    fn reheat_base_below_one_is_rejected() {
        let config = ForgeConfig {
            reheat_penalty_base: 0.9,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn garbage_toml_reports_parse_error() {
        let err = ForgeConfig::from_toml_str("heating_rate = [").unwrap_err();
        assert!(matches!(err, ForgeError::ConfigParse(_)));
    }
}
