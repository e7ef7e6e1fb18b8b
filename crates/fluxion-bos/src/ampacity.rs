// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Ampacity and backfeed derivations (NEC 125% continuous-load rule, 120% bus rule).

use crate::config::EngineConfig;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Standard overcurrent device ratings, ascending
pub const STANDARD_AMP_RATINGS: &[u32] = &[
    15, 20, 25, 30, 35, 40, 45, 50, 60, 70, 80, 90, 100, 110, 125, 150, 175, 200, 225, 250, 300,
    350, 400, 450, 500, 600,
];

/// Main breaker choices offered for a service panel ("MLO" first)
pub const MAIN_CIRCUIT_BREAKER_RATINGS: &[&str] = &[
    "MLO", "100", "110", "125", "150", "175", "200", "225", "250", "300", "350", "400", "450",
    "500", "600",
];

/// Bus bar ratings offered for a service panel
pub const BUS_BAR_RATINGS: &[u32] = &[
    60, 70, 80, 90, 100, 110, 125, 150, 175, 200, 225, 250, 300, 350, 400, 450, 500, 600,
];

// ============= Inputs =============

/// Main breaker of the panel receiving backfeed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MainBreaker {
    /// Main-lug-only panel: no breaker draws from the bus
    MainLugOnly,
    Rated(u32),
}

impl MainBreaker {
    /// Current the main breaker reserves on the bus
    pub fn draw(&self) -> u32 {
        match self {
            Self::MainLugOnly => 0,
            Self::Rated(amps) => *amps,
        }
    }
}

impl fmt::Display for MainBreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MainLugOnly => f.write_str("MLO"),
            Self::Rated(amps) => write!(f, "{amps}"),
        }
    }
}

impl FromStr for MainBreaker {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("MLO") {
            return Ok(Self::MainLugOnly);
        }
        trimmed
            .parse::<u32>()
            .map(Self::Rated)
            .map_err(|_| anyhow::anyhow!("Invalid main breaker rating: '{s}'. Use MLO or amps"))
    }
}

/// Inverter topology, which decides how per-unit output is aggregated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InverterKind {
    Microinverter,
    String,
}

/// Observed upstream amperages and panel limits for one system
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AmpacityContext {
    pub inverter_amperage: Option<f64>,
    pub battery_max_charge_current: Option<f64>,
    /// Combined-system output, used instead of per-system amperages when set
    pub combined_system_override: Option<f64>,
    pub bus_bar_rating: Option<u32>,
    pub main_breaker: Option<MainBreaker>,
}

impl AmpacityContext {
    pub fn with_inverter_amperage(amps: f64) -> Self {
        Self {
            inverter_amperage: Some(amps),
            ..Default::default()
        }
    }

    /// Largest observed continuous amperage; the override wins when present
    pub fn observed_amperage(&self) -> Option<f64> {
        if let Some(combined) = self.combined_system_override.filter(|a| *a > 0.0) {
            return Some(combined);
        }
        [self.inverter_amperage, self.battery_max_charge_current]
            .into_iter()
            .flatten()
            .filter(|a| *a > 0.0)
            .reduce(f64::max)
    }
}

// ============= Outputs =============

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmpRatingInfo {
    pub minimum_amp_rating: u32,
    pub recommended_amp_rating: u32,
    /// Human-readable derivation, e.g. "100A × 1.25 = 125A"
    pub calculation: String,
}

/// PCS (power control system) decision for one system
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PcsAssessment {
    pub max_continuous_output_125: Option<f64>,
    pub allowable_backfeed: Option<f64>,
    pub should_auto_trigger: bool,
    pub can_manual_trigger: bool,
    pub violates_120_rule: bool,
}

// ============= Calculator =============

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmpacityCalculator {
    continuous_load_multiplier: f64,
    backfeed_multiplier: f64,
    standard_voltage: u32,
}

impl Default for AmpacityCalculator {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl AmpacityCalculator {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            continuous_load_multiplier: config.continuous_load_multiplier,
            backfeed_multiplier: config.backfeed_multiplier,
            standard_voltage: config.standard_voltage,
        }
    }

    pub fn continuous_load_multiplier(&self) -> f64 {
        self.continuous_load_multiplier
    }

    /// Minimum and recommended ratings for the context's observed amperage.
    ///
    /// Returns `None` when no positive amperage was observed.
    pub fn calculate_min_amp(&self, ctx: &AmpacityContext) -> Option<AmpRatingInfo> {
        let observed = ctx.observed_amperage()?;
        let minimum = self.minimum_rating(observed);
        Some(AmpRatingInfo {
            minimum_amp_rating: minimum,
            recommended_amp_rating: next_standard_rating(minimum).unwrap_or(minimum),
            calculation: format!(
                "{}A × {} = {minimum}A",
                format_amps(observed),
                self.continuous_load_multiplier
            ),
        })
    }

    /// Rating info for an inverter's max continuous output, with the
    /// recommended rating spelled out in the calculation string
    pub fn amp_rating_info(&self, max_continuous_output: f64) -> Option<AmpRatingInfo> {
        if max_continuous_output <= 0.0 {
            return None;
        }
        let minimum = self.minimum_rating(max_continuous_output);
        let recommended = next_standard_rating(minimum).unwrap_or(minimum);
        Some(AmpRatingInfo {
            minimum_amp_rating: minimum,
            recommended_amp_rating: recommended,
            calculation: format!(
                "{}A × {} = {minimum}A min → {recommended}A",
                format_amps(max_continuous_output),
                self.continuous_load_multiplier
            ),
        })
    }

    /// Unrounded required ampacity (observed × multiplier)
    pub fn required_amps(&self, observed: f64) -> f64 {
        observed * self.continuous_load_multiplier
    }

    fn minimum_rating(&self, observed: f64) -> u32 {
        self.required_amps(observed).ceil() as u32
    }

    /// `(bus × 1.2) − main breaker draw`; `None` when either input is missing
    pub fn allowable_backfeed(
        &self,
        bus_bar_rating: Option<u32>,
        main_breaker: Option<MainBreaker>,
    ) -> Option<f64> {
        let bus = bus_bar_rating.filter(|b| *b > 0)?;
        let main = main_breaker?;
        let raw = f64::from(bus) * self.backfeed_multiplier - f64::from(main.draw());
        Some((raw * 100.0).round() / 100.0)
    }

    /// Display form of the backfeed derivation, e.g. "(200 × 1.2) - 100 = 140"
    pub fn backfeed_formula(
        &self,
        bus_bar_rating: Option<u32>,
        main_breaker: Option<MainBreaker>,
    ) -> Option<String> {
        let backfeed = self.allowable_backfeed(bus_bar_rating, main_breaker)?;
        let bus = bus_bar_rating?;
        let draw = main_breaker?.draw();
        Some(format!(
            "({bus} × {}) - {draw} = {}",
            self.backfeed_multiplier,
            format_amps(backfeed)
        ))
    }

    /// Evaluate every PCS trigger for one system
    pub fn assess_pcs(
        &self,
        has_battery: bool,
        max_continuous_output: Option<f64>,
        ctx: &AmpacityContext,
    ) -> PcsAssessment {
        let backfeed = self.allowable_backfeed(ctx.bus_bar_rating, ctx.main_breaker);
        let auto = pcs::should_auto_trigger(has_battery, max_continuous_output, backfeed);
        PcsAssessment {
            max_continuous_output_125: max_continuous_output.map(|a| self.required_amps(a)),
            allowable_backfeed: backfeed,
            should_auto_trigger: auto,
            can_manual_trigger: pcs::can_manual_trigger(has_battery, auto, backfeed),
            violates_120_rule: pcs::violates_120_rule(
                has_battery,
                max_continuous_output.map(|a| self.required_amps(a)),
                backfeed,
            ),
        }
    }

    /// Convert a power rating to amps at the standard service voltage
    pub fn amps_from_watts(&self, watts: f64) -> f64 {
        watts / f64::from(self.standard_voltage)
    }
}

/// Smallest standard rating ≥ `minimum_amps`, `None` above the series
pub fn next_standard_rating(minimum_amps: u32) -> Option<u32> {
    STANDARD_AMP_RATINGS
        .iter()
        .copied()
        .find(|rating| *rating >= minimum_amps)
}

/// Max continuous output of a system's inverters.
///
/// Microinverters multiply per-unit output by quantity (and need a quantity);
/// a string inverter contributes its own rating. Results are rounded to whole amps.
pub fn max_continuous_output(
    amps_per_unit: Option<f64>,
    kind: InverterKind,
    quantity: Option<u32>,
) -> Option<f64> {
    let amps = amps_per_unit.filter(|a| *a > 0.0)?;
    match kind {
        InverterKind::Microinverter => {
            let qty = quantity.filter(|q| *q > 0)?;
            Some((amps * f64::from(qty)).round())
        }
        InverterKind::String => Some(amps.round()),
    }
}

fn format_amps(amps: f64) -> String {
    if amps.fract() == 0.0 {
        format!("{amps:.0}")
    } else {
        format!("{amps}")
    }
}

/// PCS trigger rules
pub mod pcs {
    use super::STANDARD_AMP_RATINGS;

    /// Battery present and continuous output alone already exceeds allowable backfeed
    pub fn should_auto_trigger(
        has_battery: bool,
        max_continuous_output: Option<f64>,
        allowable_backfeed: Option<f64>,
    ) -> bool {
        match (max_continuous_output, allowable_backfeed) {
            (Some(output), Some(backfeed)) => has_battery && output > backfeed,
            _ => false,
        }
    }

    /// User may opt into PCS on a battery system that did not auto-trigger
    pub fn can_manual_trigger(
        has_battery: bool,
        auto_triggered: bool,
        allowable_backfeed: Option<f64>,
    ) -> bool {
        has_battery && !auto_triggered && allowable_backfeed.is_some_and(|b| b > 0.0)
    }

    /// 120% rule check for battery-less systems.
    ///
    /// # Arguments
    /// * `has_battery` - battery systems are governed by PCS instead
    /// * `max_continuous_output_125` - max continuous output already multiplied by 1.25
    /// * `allowable_backfeed` - bus allowance from `allowable_backfeed`
    pub fn violates_120_rule(
        has_battery: bool,
        max_continuous_output_125: Option<f64>,
        allowable_backfeed: Option<f64>,
    ) -> bool {
        match (max_continuous_output_125, allowable_backfeed) {
            (Some(required), Some(backfeed)) => !has_battery && required > backfeed,
            _ => false,
        }
    }

    /// PCS current-limit settings that keep export within the allowable backfeed
    pub fn filter_options(allowable_backfeed: Option<f64>) -> Vec<u32> {
        let Some(backfeed) = allowable_backfeed else {
            return Vec::new();
        };
        STANDARD_AMP_RATINGS
            .iter()
            .copied()
            .filter(|rating| f64::from(*rating) <= backfeed)
            .collect()
    }

    /// Largest permitted PCS setting
    pub fn recommended_setting(allowable_backfeed: Option<f64>) -> Option<u32> {
        filter_options(allowable_backfeed).last().copied()
    }
}
