//! Heat model: per-billet temperature and the heat → effectiveness curve.
//!
//! ## Scale
//!
//! Heat is normalized to `[0, 1]` (ambient → forge maximum).
//! [`to_celsius`] maps it onto 20–1500 °C for display only.
//!
//! ## Bands
//!
//! Bands are a classification re-evaluated every tick, not stored state:
//!
//! | Band         | Heat                                   |
//! |--------------|----------------------------------------|
//! | `Cold`       | `< heat_cold_threshold`                |
//! | `Workable`   | `[heat_cold_threshold, heat_ideal_max]`|
//! | `Overheated` | `(heat_ideal_max, heat_burn_threshold]`|
//! | `Burning`    | `> heat_burn_threshold`                |
//!
//! ## Update rule
//!
//! - in the forge: `heat += heating_rate · dt`, capped at `forge_max_heat`
//! - anvil-locked: `heat −= base_decay_rate · reheat_penalty_base^reheat_count · dt`, floored at 0
//! - anywhere else: unchanged
//!
//! Heat can therefore only be recovered at the forge, and every reheat makes
//! the next stint on the anvil shorter.

use crate::billet::Billet;
use crate::config::ForgeConfig;
use crate::constants::{AMBIENT_CELSIUS, MAX_CELSIUS};
use crate::events::ForgeEvent;
use crate::simulation::SimClock;
use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeatBand {
    Cold,
    Workable,
    Overheated,
    Burning,
}

impl HeatBand {
    pub fn label(self) -> &'static str {
        match self {
            HeatBand::Cold => "cold",
            HeatBand::Workable => "workable",
            HeatBand::Overheated => "overheated",
            HeatBand::Burning => "burning",
        }
    }
}

/// Which branch of the update rule applies this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeatContext {
    InForge,
    AnvilLocked,
    Idle,
}

pub fn classify(heat: f32, config: &ForgeConfig) -> HeatBand {
    if heat > config.heat_burn_threshold {
        HeatBand::Burning
    } else if heat > config.heat_ideal_max {
        HeatBand::Overheated
    } else if heat >= config.heat_cold_threshold {
        HeatBand::Workable
    } else {
        HeatBand::Cold
    }
}

/// Whether a strike at `heat` earns the flat heat defect.
#[inline]
pub fn outside_working_range(heat: f32, config: &ForgeConfig) -> bool {
    heat < config.heat_cold_threshold || heat > config.heat_burn_threshold
}

/// Effectiveness multiplier for a given heat.
///
/// Linear interpolation between the `(heat, multiplier)` knots; flat beyond
/// the first and last knot.  Knots must be sorted by heat (enforced by
/// [`ForgeConfig::validate`]).  NaN heat is treated as ambient.
pub fn heat_multiplier(heat: f32, curve: &[[f32; 2]]) -> f32 {
    let Some(first) = curve.first() else {
        return 1.0;
    };
    let heat = if heat.is_nan() { 0.0 } else { heat.clamp(0.0, 1.0) };
    if heat <= first[0] {
        return first[1];
    }
    for pair in curve.windows(2) {
        let ([h0, m0], [h1, m1]) = (pair[0], pair[1]);
        if heat <= h1 {
            let t = (heat - h0) / (h1 - h0);
            return m0 + (m1 - m0) * t;
        }
    }
    curve[curve.len() - 1][1]
}

/// Compounding reheat penalty applied to anvil decay.
#[inline]
pub fn decay_multiplier(reheat_count: u32, penalty_base: f32) -> f32 {
    penalty_base.powi(reheat_count.min(i32::MAX as u32) as i32)
}

/// One tick of the heat update rule.
pub fn step_heat(
    heat: f32,
    context: HeatContext,
    reheat_count: u32,
    dt: f32,
    config: &ForgeConfig,
) -> f32 {
    match context {
        HeatContext::InForge => (heat + config.heating_rate * dt).min(config.forge_max_heat),
        HeatContext::AnvilLocked => {
            let rate =
                config.base_decay_rate * decay_multiplier(reheat_count, config.reheat_penalty_base);
            (heat - rate * dt).max(0.0)
        }
        HeatContext::Idle => heat,
    }
}

/// Display conversion onto the Celsius scale.
#[inline]
pub fn to_celsius(heat: f32) -> f32 {
    AMBIENT_CELSIUS + heat.clamp(0.0, 1.0) * (MAX_CELSIUS - AMBIENT_CELSIUS)
}

/// Throttles `BilletHeatChanged` so the presentation layer is not flooded
/// with one event per frame.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct HeatReporter {
    pub last_reported: f32,
    pub last_band: HeatBand,
}

impl Default for HeatReporter {
    fn default() -> Self {
        Self {
            last_reported: 0.0,
            last_band: HeatBand::Cold,
        }
    }
}

impl HeatReporter {
    /// Returns `true` when `heat` should be reported, and records it.
    pub fn should_report(&mut self, heat: f32, config: &ForgeConfig) -> bool {
        let band = classify(heat, config);
        let moved = (heat - self.last_reported).abs() >= config.heat_event_step;
        if moved || band != self.last_band {
            self.last_reported = heat;
            self.last_band = band;
            true
        } else {
            false
        }
    }
}

pub fn heat_system(
    clock: Res<SimClock>,
    config: Res<ForgeConfig>,
    mut billet: ResMut<Billet>,
    mut reporter: ResMut<HeatReporter>,
    mut events: MessageWriter<ForgeEvent>,
) {
    let next = step_heat(
        billet.heat,
        billet.heat_context(),
        billet.reheat_count,
        clock.dt,
        &config,
    );
    if next != billet.heat {
        let before = billet.band(&config);
        billet.heat = next;
        let after = billet.band(&config);
        if before != after {
            debug!(
                "Billet heat {:.2} ({:.0} °C): {} → {}",
                next,
                to_celsius(next),
                before.label(),
                after.label()
            );
        }
    }
    if reporter.should_report(billet.heat, &config) {
        events.write(ForgeEvent::BilletHeatChanged { heat: billet.heat });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve() -> Vec<[f32; 2]> {
        ForgeConfig::default().heat_curve
    }

    #[test]
    fn plateau_is_exactly_one() {
        let curve = curve();
        for h in [0.60, 0.65, 0.70, 0.75] {
            assert!((heat_multiplier(h, &curve) - 1.0).abs() < 1e-6, "h={h}");
        }
    }

    fn is_ideal(heat: f32, config: &ForgeConfig) -> bool {
        (config.heat_ideal_min..=config.heat_ideal_max).contains(&heat)
    }

    #[test]
    fn maximum_only_inside_ideal_band() {
        let config = ForgeConfig::default();
        let curve = curve();
        for i in 0..=1000 {
            let h = i as f32 / 1000.0;
            let m = heat_multiplier(h, &curve);
            assert!(m <= 1.0 + 1e-6);
            if (m - 1.0).abs() < 1e-6 {
                assert!(is_ideal(h, &config), "multiplier 1.0 outside band at h={h}");
            }
        }
    }

    #[test]
    fn curve_is_continuous_within_tolerance() {
        // Steepest segment is 15 per unit heat; a 0.001 step may move ≤ 0.015.
        let curve = curve();
        let step = 0.001;
        let tolerance = 0.0151;
        let mut prev = heat_multiplier(0.0, &curve);
        for i in 1..=1000 {
            let m = heat_multiplier(i as f32 * step, &curve);
            assert!(
                (m - prev).abs() <= tolerance,
                "jump of {} at h={}",
                (m - prev).abs(),
                i as f32 * step
            );
            prev = m;
        }
    }

    #[test]
    fn penalizes_both_edges() {
        let curve = curve();
        let ideal = heat_multiplier(0.65, &curve);
        let cold = heat_multiplier(0.2, &curve);
        let hot = heat_multiplier(0.85, &curve);
        let burning = heat_multiplier(0.95, &curve);

        assert!(cold <= 0.25 && cold >= 0.1);
        assert!((hot - 0.8).abs() < 1e-6);
        assert!((burning - 0.5).abs() < 1e-6);
        assert!(cold < burning && burning < hot && hot < ideal);
        // Rises then falls: intentionally non-monotonic.
        assert!(heat_multiplier(0.5, &curve) < ideal);
        assert!(heat_multiplier(0.99, &curve) < ideal);
    }

    #[test]
    fn out_of_range_heat_is_clamped() {
        let curve = curve();
        assert_eq!(heat_multiplier(-3.0, &curve), heat_multiplier(0.0, &curve));
        assert_eq!(heat_multiplier(7.0, &curve), heat_multiplier(1.0, &curve));
        assert_eq!(heat_multiplier(f32::NAN, &curve), heat_multiplier(0.0, &curve));
    }

    #[test]
    fn bands_follow_thresholds() {
        let config = ForgeConfig::default();
        assert_eq!(classify(0.2, &config), HeatBand::Cold);
        assert_eq!(classify(0.4, &config), HeatBand::Workable);
        assert_eq!(classify(0.75, &config), HeatBand::Workable);
        assert_eq!(classify(0.8, &config), HeatBand::Overheated);
        assert_eq!(classify(0.95, &config), HeatBand::Burning);
    }

    #[test]
    fn forge_heats_up_to_cap() {
        let config = ForgeConfig::default();
        let h = step_heat(0.5, HeatContext::InForge, 0, 1.0, &config);
        assert!((h - (0.5 + config.heating_rate)).abs() < 1e-6);
        let capped = step_heat(0.99, HeatContext::InForge, 0, 10.0, &config);
        assert_eq!(capped, config.forge_max_heat);
    }

    #[test]
    fn anvil_decays_but_never_below_zero() {
        let config = ForgeConfig::default();
        let h = step_heat(0.5, HeatContext::AnvilLocked, 0, 1.0, &config);
        assert!((h - (0.5 - config.base_decay_rate)).abs() < 1e-6);
        assert_eq!(step_heat(0.01, HeatContext::AnvilLocked, 3, 100.0, &config), 0.0);
    }

    #[test]
    fn idle_heat_is_unchanged() {
        let config = ForgeConfig::default();
        assert_eq!(step_heat(0.63, HeatContext::Idle, 2, 5.0, &config), 0.63);
    }

    #[test]
    fn reheating_strictly_increases_decay() {
        let config = ForgeConfig::default();
        let mut last_loss = 0.0;
        for count in 0..6 {
            assert!(decay_multiplier(count + 1, 1.25) > decay_multiplier(count, 1.25));
            let loss = 0.9 - step_heat(0.9, HeatContext::AnvilLocked, count, 0.5, &config);
            assert!(loss > last_loss, "reheat {count} did not speed up cooling");
            last_loss = loss;
        }
    }

    #[test]
    fn celsius_mapping_spans_display_range() {
        assert_eq!(to_celsius(0.0), 20.0);
        assert_eq!(to_celsius(1.0), 1500.0);
    }

    #[test]
    fn reporter_throttles_small_changes() {
        let config = ForgeConfig::default();
        let mut reporter = HeatReporter::default();
        assert!(!reporter.should_report(0.005, &config));
        assert!(reporter.should_report(0.02, &config));
        assert!(!reporter.should_report(0.025, &config));
        // Band change always reports.
        let mut near_edge = HeatReporter {
            last_reported: 0.395,
            last_band: HeatBand::Cold,
        };
        assert!(near_edge.should_report(0.4, &config));
    }
}
