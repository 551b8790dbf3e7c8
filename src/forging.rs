//! Forging: applying validated strikes to the billet.
//!
//! ```text
//! effectiveness = heat_multiplier(heat) · tool_quality · training_bonus · accuracy
//! ```
//!
//! The product is multiplicative on purpose: cold metal caps the result no
//! matter how good the hammer or the swing.  Per strike:
//!
//! - `shape_progress += effectiveness · shape_gain_rate · mass / reference_mass`, capped at 1
//! - `quality        += effectiveness · quality_gain_rate`, capped at 100
//! - `effectiveness < defect_threshold` → `+mishandle_defect`, `mishandled = true`
//! - heat outside `[cold, burn]`        → `+heat_defect`, independent of effectiveness
//! - `defects` is capped at `max_defects`

use crate::billet::Billet;
use crate::config::ForgeConfig;
use crate::events::ForgeEvent;
use crate::heat::{classify, heat_multiplier, outside_working_range, HeatBand};
use crate::objects::{ToolStats, WorldObjects};
use crate::strike::StrikeEvent;
use bevy::prelude::*;

// ── Training ──────────────────────────────────────────────────────────────────

/// Smithing skill.  Persisted under `trainingLevels.smithing`.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct Training {
    pub level: u32,
    pub xp: f32,
}

impl Training {
    /// Multiplicative skill factor, `1 + level · bonus_per_level`.
    pub fn bonus(&self, config: &ForgeConfig) -> f32 {
        1.0 + self.level.min(config.training_max_level) as f32 * config.training_bonus_per_level
    }

    /// Award xp for a good strike.  Returns `true` if the level went up.
    pub fn record_strike(&mut self, effectiveness: f32, config: &ForgeConfig) -> bool {
        if effectiveness < config.good_strike_threshold {
            return false;
        }
        self.xp += config.xp_per_good_strike;
        let mut leveled = false;
        while self.level < config.training_max_level && self.xp >= config.xp_per_level {
            self.xp -= config.xp_per_level;
            self.level += 1;
            leveled = true;
        }
        leveled
    }
}

// ── Strike application ────────────────────────────────────────────────────────

/// Product of the four factors, floored at zero.
#[inline]
pub fn effectiveness(
    heat_multiplier: f32,
    tool_quality: f32,
    training_bonus: f32,
    accuracy: f32,
) -> f32 {
    (heat_multiplier * tool_quality * training_bonus * accuracy).max(0.0)
}

/// What one strike did to the billet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrikeOutcome {
    pub effectiveness: f32,
    pub band: HeatBand,
    pub defects_added: f32,
    /// The strike completed the shape.
    pub finished: bool,
}

/// Apply one strike at `heat` with the given tool.
pub fn apply_strike(
    billet: &mut Billet,
    heat: f32,
    tool: &ToolStats,
    training_bonus: f32,
    accuracy: f32,
    config: &ForgeConfig,
) -> StrikeOutcome {
    let was_finished = billet.is_finished();
    let eff = effectiveness(
        heat_multiplier(heat, &config.heat_curve),
        tool.effective_quality(),
        training_bonus,
        accuracy,
    );

    let mass_factor = tool.mass / config.reference_tool_mass;
    billet.shape_progress =
        (billet.shape_progress + eff * config.shape_gain_rate * mass_factor).clamp(0.0, 1.0);
    billet.quality = (billet.quality + eff * config.quality_gain_rate).min(100.0);

    let mut added = 0.0;
    if eff < config.defect_threshold {
        added += config.mishandle_defect;
        billet.mishandled = true;
    }
    if outside_working_range(heat, config) {
        added += config.heat_defect;
    }
    let before = billet.defects;
    billet.defects = (billet.defects + added).min(config.max_defects);
    billet.strike_count += 1;

    StrikeOutcome {
        effectiveness: eff,
        band: classify(heat, config),
        defects_added: billet.defects - before,
        finished: !was_finished && billet.is_finished(),
    }
}

/// Spark intensity: brighter for hotter metal, never fully dark on a hit.
#[inline]
pub fn spark_intensity(heat: f32, effectiveness: f32, floor: f32) -> f32 {
    (heat * effectiveness.max(floor)).clamp(0.0, 1.0)
}

pub fn forging_system(
    config: Res<ForgeConfig>,
    objects: Res<WorldObjects>,
    mut strikes: MessageReader<StrikeEvent>,
    mut billet: ResMut<Billet>,
    mut training: ResMut<Training>,
    mut events: MessageWriter<ForgeEvent>,
) {
    for strike in strikes.read() {
        let Some(stats) = objects.tool(strike.tool).map(|tool| tool.stats) else {
            warn!("Strike from unknown tool {}", strike.tool.0);
            continue;
        };
        let outcome = apply_strike(
            &mut billet,
            strike.heat,
            &stats,
            training.bonus(&config),
            strike.accuracy,
            &config,
        );
        debug!(
            "Strike #{}: effectiveness {:.2}, shape {:.2}, quality {:.1}, defects {:.2}",
            billet.strike_count,
            outcome.effectiveness,
            billet.shape_progress,
            billet.quality,
            billet.defects
        );

        events.write(ForgeEvent::StrikeOccurred {
            effectiveness: outcome.effectiveness,
        });
        events.write(ForgeEvent::SparksAt {
            position: strike.position,
            intensity: spark_intensity(
                strike.heat,
                outcome.effectiveness,
                config.spark_intensity_floor,
            ),
        });

        match outcome.band {
            HeatBand::Cold => {
                events.write(ForgeEvent::feedback("The metal is too cold!"));
            }
            HeatBand::Burning => {
                events.write(ForgeEvent::feedback("The metal is burning!"));
            }
            HeatBand::Workable | HeatBand::Overheated => {}
        }
        if outcome.finished {
            info!("Billet fully shaped after {} strikes", billet.strike_count);
            events.write(ForgeEvent::feedback(format!(
                "The {} is shaped. Quench it!",
                billet.target.label()
            )));
        }

        if training.record_strike(outcome.effectiveness, &config) {
            info!("Smithing training reached level {}", training.level);
            events.write(ForgeEvent::feedback(format!(
                "Your smithing improves (level {})",
                training.level
            )));
        }
    }
}
