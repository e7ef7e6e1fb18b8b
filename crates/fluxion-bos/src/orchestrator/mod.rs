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

//! Automatic BOS configuration for known equipment pairings.
//!
//! Each pairing is an [`AutoConfigRule`]. The orchestrator asks its rules in
//! order and lets the first eligible one plan the BOS. Plans never fail: they
//! carry whatever could be resolved and the positions that were skipped.

mod franklin_aps;

pub use franklin_aps::FranklinApsRule;

use crate::config::EngineConfig;
use crate::equipment_state::EquipmentState;
use crate::matcher::{Ambiguity, EquipmentCatalogMatcher, MatchOutcome};
use crate::traits::EquipmentCatalogSource;
use fluxion_bos_types::{BosSection, SlotEquipment};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Which existing-BOS list a position is checked against and written to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BosSide {
    Utility,
    Battery,
}

impl BosSide {
    /// Section planned items of this side are stored in
    pub fn section(&self) -> BosSection {
        match self {
            Self::Utility => BosSection::Utility,
            Self::Battery => BosSection::PostSms,
        }
    }
}

/// One required BOS position of a pairing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BosPosition {
    pub equipment_type: &'static str,
    pub side: BosSide,
    pub preferred_make: Option<String>,
}

/// Why a required position produced no equipment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "kebab-case")]
pub enum SkipReason {
    AlreadyPresent,
    Ambiguous { amp_rating: u32, options: Ambiguity },
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedPosition {
    pub equipment_type: String,
    pub side: BosSide,
    pub reason: SkipReason,
}

/// Slot assignments proposed by a rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BosPlan {
    pub rule: String,
    /// Observed continuous output × continuous-load multiplier
    pub minimum_required_amps: f64,
    pub utility_bos: Vec<SlotEquipment>,
    pub battery_bos: Vec<SlotEquipment>,
    pub skipped: Vec<SkippedPosition>,
    pub message: String,
}

impl BosPlan {
    pub fn added_count(&self) -> usize {
        self.utility_bos.len() + self.battery_bos.len()
    }

    /// Planned equipment paired with the side it belongs to, in plan order
    pub fn items(&self) -> impl Iterator<Item = (BosSide, &SlotEquipment)> {
        self.utility_bos
            .iter()
            .map(|e| (BosSide::Utility, e))
            .chain(self.battery_bos.iter().map(|e| (BosSide::Battery, e)))
    }

    /// Positions the user still has to fill by hand
    pub fn needs_user_choice(&self) -> impl Iterator<Item = &SkippedPosition> {
        self.skipped
            .iter()
            .filter(|s| !matches!(s.reason, SkipReason::AlreadyPresent))
    }
}

/// A vendor pairing that can configure its own BOS
pub trait AutoConfigRule: Send + Sync {
    /// Get the name of this rule
    fn name(&self) -> &str;

    /// Whether the system's equipment matches this pairing
    fn is_eligible(&self, state: &EquipmentState) -> bool;

    /// Plan BOS equipment for an eligible system
    fn plan(
        &self,
        state: &EquipmentState,
        max_continuous_output_amps: f64,
        catalog: &dyn EquipmentCatalogSource,
    ) -> BosPlan;

    /// Check if this rule is enabled
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Resolve positions in order against the catalog.
///
/// Positions whose type is already present on their side are skipped, as are
/// positions the matcher cannot resolve unambiguously.
pub fn plan_positions(
    rule: &str,
    positions: &[BosPosition],
    state: &EquipmentState,
    minimum_required_amps: f64,
    catalog: &dyn EquipmentCatalogSource,
) -> BosPlan {
    let matcher = EquipmentCatalogMatcher::new(catalog);
    let mut plan = BosPlan {
        rule: rule.to_owned(),
        minimum_required_amps,
        utility_bos: Vec::new(),
        battery_bos: Vec::new(),
        skipped: Vec::new(),
        message: String::new(),
    };

    for position in positions {
        let skip = |reason| SkippedPosition {
            equipment_type: position.equipment_type.to_owned(),
            side: position.side,
            reason,
        };

        if state.has_existing(position.equipment_type, position.side == BosSide::Utility) {
            debug!("[{rule}] Skipped {} (already exists)", position.equipment_type);
            plan.skipped.push(skip(SkipReason::AlreadyPresent));
            continue;
        }

        match matcher.find_minimal(
            position.equipment_type,
            minimum_required_amps,
            position.preferred_make.as_deref(),
        ) {
            MatchOutcome::Selected(part) => {
                info!(
                    "[{rule}] Added {} {} {} @ {}A",
                    position.equipment_type, part.make, part.model, part.amp_rating
                );
                let equipment = SlotEquipment::new(position.equipment_type)
                    .with_part(part.make, part.model)
                    .with_amp_rating(part.amp_rating.to_string());
                match position.side {
                    BosSide::Utility => plan.utility_bos.push(equipment),
                    BosSide::Battery => plan.battery_bos.push(equipment),
                }
            }
            MatchOutcome::Ambiguous { amp_rating, reason } => {
                warn!(
                    "[{rule}] Could not auto-select {} at {amp_rating}A: {reason:?}",
                    position.equipment_type
                );
                plan.skipped.push(skip(SkipReason::Ambiguous {
                    amp_rating,
                    options: reason,
                }));
            }
            MatchOutcome::NotFound => {
                warn!(
                    "[{rule}] No {} rated for {minimum_required_amps:.2}A",
                    position.equipment_type
                );
                plan.skipped.push(skip(SkipReason::NotFound));
            }
        }
    }

    plan
}

/// Runs the first enabled, eligible rule
pub struct AutoConfigOrchestrator {
    rules: Vec<Arc<dyn AutoConfigRule>>,
}

impl fmt::Debug for AutoConfigOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|rule| rule.name()))
            .finish()
    }
}

impl AutoConfigOrchestrator {
    pub fn new(rules: Vec<Arc<dyn AutoConfigRule>>) -> Self {
        Self { rules }
    }

    /// Orchestrator with every built-in pairing
    pub fn with_default_rules(config: &EngineConfig) -> Self {
        let rules: Vec<Arc<dyn AutoConfigRule>> = vec![Arc::new(FranklinApsRule::from_config(config))];

        info!("Initialized AutoConfigOrchestrator with {} rules", rules.len());
        for rule in &rules {
            info!("  - {} (enabled: {})", rule.name(), rule.is_enabled());
        }

        Self::new(rules)
    }

    /// First enabled rule the system qualifies for
    pub fn eligible_rule(&self, state: &EquipmentState) -> Option<&dyn AutoConfigRule> {
        self.rules
            .iter()
            .filter(|rule| rule.is_enabled())
            .find(|rule| rule.is_eligible(state))
            .map(|rule| &**rule)
    }

    pub fn detect_eligibility(&self, state: &EquipmentState) -> bool {
        self.eligible_rule(state).is_some()
    }

    /// Plan with the first eligible rule; `None` when no rule applies
    pub fn plan_bos(
        &self,
        state: &EquipmentState,
        max_continuous_output_amps: f64,
        catalog: &dyn EquipmentCatalogSource,
    ) -> Option<BosPlan> {
        let Some(rule) = self.eligible_rule(state) else {
            debug!("No auto-config rule applies");
            return None;
        };
        Some(rule.plan(state, max_continuous_output_amps, catalog))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference_catalog::StaticCatalog;
    use fluxion_bos_types::equipment_types as types;

    struct NeverEligible;

    impl AutoConfigRule for NeverEligible {
        fn name(&self) -> &str {
            "never"
        }

        fn is_eligible(&self, _state: &EquipmentState) -> bool {
            false
        }

        fn plan(&self, _: &EquipmentState, _: f64, _: &dyn EquipmentCatalogSource) -> BosPlan {
            unreachable!("never eligible")
        }
    }

    struct Disabled;

    impl AutoConfigRule for Disabled {
        fn name(&self) -> &str {
            "disabled"
        }

        fn is_eligible(&self, _state: &EquipmentState) -> bool {
            true
        }

        fn plan(&self, _: &EquipmentState, _: f64, _: &dyn EquipmentCatalogSource) -> BosPlan {
            unreachable!("disabled")
        }

        fn is_enabled(&self) -> bool {
            false
        }
    }

    #[test]
    fn test_no_rule_applies() {
        let orchestrator =
            AutoConfigOrchestrator::new(vec![Arc::new(NeverEligible), Arc::new(Disabled)]);
        let state = EquipmentState::default();
        assert!(!orchestrator.detect_eligibility(&state));
        assert!(
            orchestrator
                .plan_bos(&state, 32.0, &StaticCatalog::reference())
                .is_none()
        );
    }

    #[test]
    fn test_plan_positions_skips_and_resolves() {
        let positions = [
            BosPosition {
                equipment_type: types::PV_METER,
                side: BosSide::Utility,
                preferred_make: None,
            },
            BosPosition {
                equipment_type: types::AC_DISCONNECT,
                side: BosSide::Utility,
                preferred_make: None,
            },
            BosPosition {
                equipment_type: types::BI_DIRECTIONAL_METER_DER_SIDE_DISCONNECT,
                side: BosSide::Battery,
                preferred_make: None,
            },
        ];
        let state = EquipmentState {
            existing_utility_bos: vec![SlotEquipment::new(types::PV_METER)],
            ..Default::default()
        };

        let plan = plan_positions("test", &positions, &state, 40.0, &StaticCatalog::reference());
        assert!(plan.utility_bos.is_empty());
        assert_eq!(plan.battery_bos.len(), 1);
        assert_eq!(plan.battery_bos[0].amp_rating.as_deref(), Some("60"));
        assert_eq!(plan.skipped.len(), 2);
        assert_eq!(plan.skipped[0].reason, SkipReason::AlreadyPresent);
        assert_eq!(plan.needs_user_choice().count(), 1);
        assert_eq!(
            plan.items().map(|(side, _)| side.section()).collect::<Vec<_>>(),
            vec![BosSection::PostSms]
        );
    }
}
