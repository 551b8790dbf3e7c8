//! Centralised forging and gameplay constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place without source-diving across multiple modules.
//! [`crate::config::ForgeConfig`] mirrors every value and may override any
//! subset from `assets/forge.toml`.
//!
//! ## Units
//!
//! - Distances are world units (1 u ≈ 1 m).
//! - Heat is normalized: `0.0` is ambient, `1.0` is the forge maximum.
//!   [`crate::heat::to_celsius`] converts for display.
//! - Times are seconds of simulation time.

// ── Frame Timing ──────────────────────────────────────────────────────────────

/// Largest delta-time fed into velocity derivation (s).
///
/// Frame hitches longer than this are clamped so a single slow frame cannot
/// produce a huge velocity spike (and therefore a phantom strike).
pub const MAX_DELTA_TIME: f32 = 0.1;

/// Seed for the simulation RNG.  A fixed seed plus a fixed dt sequence makes
/// a session replayable.
pub const RNG_SEED: u64 = 0x00F0_46E0;

// ── Player & Hands ────────────────────────────────────────────────────────────

/// Walking speed of the player/camera on the horizontal plane (u/s).
pub const WALK_SPEED: f32 = 2.5;

/// Height of the camera above the floor (u).
pub const EYE_HEIGHT: f32 = 1.6;

/// Player start position (floor level).
pub const PLAYER_START: [f32; 3] = [0.0, 0.0, 1.5];

/// Pointer-delta → hand-offset conversion (u per pointer unit).
pub const POINTER_SENSITIVITY: f32 = 0.003;

/// Exponential smoothing factor applied per tick when lerping a hand toward
/// its target.  `1.0` snaps instantly; lower values feel heavier.
pub const HAND_SMOOTHING: f32 = 0.35;

/// Resting offsets of the hands relative to the camera (x right, y up, z forward is −z).
pub const LEFT_HAND_REST: [f32; 3] = [-0.3, -0.45, -0.6];
pub const RIGHT_HAND_REST: [f32; 3] = [0.3, -0.45, -0.6];

/// Half-extent of the box (around the camera) a hand offset is clamped to.
pub const HAND_REACH: [f32; 3] = [0.8, 1.6, 1.0];

// ── Grabbing ──────────────────────────────────────────────────────────────────

/// Maximum hand-to-object distance for a grab to succeed (u).
pub const GRAB_RADIUS: f32 = 0.3;

/// Gravity applied to a free billet (u/s²).
pub const GRAVITY: f32 = 9.81;

/// Height of the workshop floor.
pub const FLOOR_HEIGHT: f32 = 0.0;

// ── Stations ──────────────────────────────────────────────────────────────────

/// Forge position and "near" radius.
pub const FORGE_POSITION: [f32; 3] = [-2.0, 0.9, -1.0];
pub const FORGE_RADIUS: f32 = 1.5;

/// Anvil working position (top face) and "near" radius.
pub const ANVIL_POSITION: [f32; 3] = [0.0, 0.8, -0.8];
pub const ANVIL_RADIUS: f32 = 1.2;

/// Quench tub position and "near" radius.
pub const QUENCH_POSITION: [f32; 3] = [2.0, 0.5, -1.0];
pub const QUENCH_RADIUS: f32 = 1.2;

/// Distance within which a free billet snaps onto the anvil (u).
pub const ANVIL_SNAP_RADIUS: f32 = 0.25;

/// Rate at which the visual "near" indicators ease toward 0/1 (per second).
pub const PROXIMITY_INDICATOR_RATE: f32 = 4.0;

// ── Heat ──────────────────────────────────────────────────────────────────────

/// Heat gained per second while the billet is in the forge.
pub const HEATING_RATE: f32 = 0.12;

/// Forge maximum heat.
pub const FORGE_MAX_HEAT: f32 = 1.0;

/// Heat lost per second while anvil-locked, before the reheat penalty.
pub const BASE_DECAY_RATE: f32 = 0.02;

/// Compounding base of the reheat penalty: decay is multiplied by
/// `REHEAT_PENALTY_BASE ^ reheat_count`.  Must be > 1.
pub const REHEAT_PENALTY_BASE: f32 = 1.25;

/// Band thresholds on the normalized scale.
pub const HEAT_COLD_THRESHOLD: f32 = 0.40;
pub const HEAT_IDEAL_MIN: f32 = 0.60;
pub const HEAT_IDEAL_MAX: f32 = 0.75;
pub const HEAT_BURN_THRESHOLD: f32 = 0.90;

/// Knots `(heat, multiplier)` of the piecewise-linear effectiveness curve.
///
/// Flat plateau at 1.0 over the ideal band, steep fall-off when cold,
/// moderate penalty when overheated, severe penalty when burning.
pub const HEAT_CURVE: [(f32, f32); 8] = [
    (0.00, 0.10),
    (0.40, 0.25),
    (0.60, 1.00),
    (0.75, 1.00),
    (0.77, 0.80),
    (0.90, 0.80),
    (0.92, 0.50),
    (1.00, 0.50),
];

/// Minimum heat change before another `BilletHeatChanged` event is emitted.
pub const HEAT_EVENT_STEP: f32 = 0.01;

/// Ambient and forge-maximum temperature used for the Celsius display mapping.
pub const AMBIENT_CELSIUS: f32 = 20.0;
pub const MAX_CELSIUS: f32 = 1500.0;

// ── Strikes ───────────────────────────────────────────────────────────────────

/// Minimum downward hammer speed for a strike to count (u/s).
pub const MIN_STRIKE_SPEED: f32 = 2.0;

/// Maximum hammer-to-billet distance for a strike to count (u).
pub const STRIKE_RADIUS: f32 = 0.3;

/// Downward speed that yields a perfect strike accuracy of 1.0 (u/s).
pub const STRIKE_NORMALIZATION_SPEED: f32 = 5.0;

/// Minimum time between two swing-contact strikes (s).
pub const STRIKE_COOLDOWN: f32 = 0.25;

// ── Forging ───────────────────────────────────────────────────────────────────

/// Shape progress gained by a strike of effectiveness 1.0 with a reference-mass hammer.
pub const SHAPE_GAIN_RATE: f32 = 0.05;

/// Quality points gained by a strike of effectiveness 1.0.
pub const QUALITY_GAIN_RATE: f32 = 4.0;

/// Strikes weaker than this add a mishandling defect.
pub const DEFECT_THRESHOLD: f32 = 0.3;

/// Defect added by a mishandled (low-effectiveness) strike.
pub const MISHANDLE_DEFECT: f32 = 1.0;

/// Defect added by striking outside `[HEAT_COLD_THRESHOLD, HEAT_BURN_THRESHOLD]`.
pub const HEAT_DEFECT: f32 = 0.25;

/// Upper bound on accumulated defects.
pub const MAX_DEFECTS: f32 = 10.0;

/// Grade points removed per unit of defect at quench time.
pub const DEFECT_GRADE_PENALTY: f32 = 5.0;

/// Hammer mass that gives a shape-gain factor of exactly 1.0.
pub const REFERENCE_TOOL_MASS: f32 = 1.0;

/// Spark intensity floor so weak hot strikes still show something.
pub const SPARK_INTENSITY_FLOOR: f32 = 0.2;

// ── Training ──────────────────────────────────────────────────────────────────

pub const TRAINING_MAX_LEVEL: u32 = 5;
pub const TRAINING_BONUS_PER_LEVEL: f32 = 0.05;
pub const GOOD_STRIKE_THRESHOLD: f32 = 0.7;
pub const XP_PER_GOOD_STRIKE: f32 = 1.0;
pub const XP_PER_LEVEL: f32 = 25.0;

// ── Economy ───────────────────────────────────────────────────────────────────

pub const STARTING_MONEY: u32 = 50;
pub const STARTING_REPUTATION: f32 = 50.0;
pub const MAX_REPUTATION: f32 = 100.0;

/// Quality (0–100) → price multiplier endpoints.
pub const QUALITY_MULT_MIN: f32 = 0.5;
pub const QUALITY_MULT_MAX: f32 = 2.0;

/// Reputation (0–100) → price multiplier endpoints.
pub const REPUTATION_MULT_MIN: f32 = 0.75;
pub const REPUTATION_MULT_MAX: f32 = 1.5;

/// Base prices by weapon type.
pub const DAGGER_BASE_PRICE: f32 = 40.0;
pub const SWORD_BASE_PRICE: f32 = 100.0;
pub const AXE_BASE_PRICE: f32 = 80.0;
pub const MACE_BASE_PRICE: f32 = 70.0;

pub const MAX_CUSTOMERS: usize = 3;
pub const CUSTOMER_SPAWN_INTERVAL: f32 = 30.0;
pub const CUSTOMER_MIN_QUALITY_RANGE: (u32, u32) = (20, 80);
pub const CUSTOMER_PATIENCE_RANGE: (f32, f32) = (60.0, 120.0);

pub const SALE_REPUTATION_GAIN: f32 = 2.0;
pub const REJECTION_REPUTATION_PENALTY: f32 = 0.5;
pub const PATIENCE_REPUTATION_PENALTY: f32 = 5.0;

/// Cost of the master hammer upgrade.
pub const MASTER_HAMMER_COST: u32 = 250;

pub const CUSTOMER_NAMES: [&str; 10] = [
    "Aldric", "Brenna", "Cedric", "Dagny", "Eamon", "Freya", "Gareth", "Hilde", "Ivor", "Jorun",
];
