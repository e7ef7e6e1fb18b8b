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

use super::{AutoConfigRule, BosPlan, BosPosition, BosSide, plan_positions};
use crate::ampacity::AmpacityCalculator;
use crate::config::EngineConfig;
use crate::equipment_state::EquipmentState;
use crate::traits::EquipmentCatalogSource;
use crate::triggers::EquipmentSignature;
use fluxion_bos_types::equipment_types as types;
use tracing::{debug, info};

const RULE_NAME: &str = "Franklin + APS";
const WHOLE_HOME_BACKUP: &str = "Whole Home";

/// FranklinWH Agate + aPower on a reference-utility whole-home install.
///
/// Fills the utility production meter and its line-side disconnect, then the
/// battery DER disconnect, bi-directional meter and line-side disconnect.
#[derive(Debug, Clone)]
pub struct FranklinApsRule {
    utility: String,
    calculator: AmpacityCalculator,
    sms: EquipmentSignature,
    battery: EquipmentSignature,
    positions: Vec<BosPosition>,
}

impl FranklinApsRule {
    pub fn from_config(config: &EngineConfig) -> Self {
        let preferred = &config.preferred_makes;
        let position = |equipment_type, side, make: &Option<String>| BosPosition {
            equipment_type,
            side,
            preferred_make: make.clone(),
        };

        Self {
            utility: config.reference_utility.clone(),
            calculator: AmpacityCalculator::from_config(config),
            sms: EquipmentSignature::new("franklin", "agate"),
            battery: EquipmentSignature::new("franklin", "apower"),
            positions: vec![
                position(
                    types::UNI_DIRECTIONAL_METER,
                    BosSide::Utility,
                    &preferred.utility_meter,
                ),
                position(
                    types::UNI_DIRECTIONAL_METER_LINE_SIDE_DISCONNECT,
                    BosSide::Utility,
                    &preferred.utility_line_disconnect,
                ),
                position(
                    types::BI_DIRECTIONAL_METER_DER_SIDE_DISCONNECT,
                    BosSide::Battery,
                    &preferred.battery_der_disconnect,
                ),
                position(
                    types::BI_DIRECTIONAL_METER,
                    BosSide::Battery,
                    &preferred.battery_meter,
                ),
                position(
                    types::BI_DIRECTIONAL_METER_LINE_SIDE_DISCONNECT,
                    BosSide::Battery,
                    &preferred.battery_line_disconnect,
                ),
            ],
        }
    }

    pub fn positions(&self) -> &[BosPosition] {
        &self.positions
    }
}

impl Default for FranklinApsRule {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl AutoConfigRule for FranklinApsRule {
    fn name(&self) -> &str {
        RULE_NAME
    }

    fn is_eligible(&self, state: &EquipmentState) -> bool {
        let checks = [
            ("utility", state.utility_name == self.utility),
            ("solar", state.has_solar_path()),
            ("sms", state.sms.matches(&self.sms)),
            (
                "battery",
                state.battery1.matches(&self.battery) && state.battery1_quantity > 0,
            ),
            (
                "backup",
                state.backup_option.as_deref() == Some(WHOLE_HOME_BACKUP),
            ),
        ];

        match checks.iter().find(|(_, ok)| !ok) {
            Some((failed, _)) => {
                debug!("[{RULE_NAME}] Not eligible: {failed} check failed");
                false
            }
            None => true,
        }
    }

    fn plan(
        &self,
        state: &EquipmentState,
        max_continuous_output_amps: f64,
        catalog: &dyn EquipmentCatalogSource,
    ) -> BosPlan {
        let minimum = self.calculator.required_amps(max_continuous_output_amps);
        info!(
            "[{RULE_NAME}] Planning BOS: {max_continuous_output_amps}A × {} = {minimum:.2}A minimum",
            self.calculator.continuous_load_multiplier()
        );

        let mut plan = plan_positions(RULE_NAME, &self.positions, state, minimum, catalog);
        let added = plan.added_count();
        let pending = plan.needs_user_choice().count();
        plan.message = match (added, pending) {
            (0, 0) => "All required BOS equipment is already configured.".to_owned(),
            (0, _) => format!(
                "No BOS equipment could be selected automatically; {pending} items need a manual choice."
            ),
            (_, 0) => format!(
                "Successfully configured {added} BOS equipment items for Franklin + APS installation."
            ),
            (_, _) => format!(
                "Successfully configured {added} BOS equipment items for Franklin + APS installation. \
                 {pending} items need a manual choice."
            ),
        };
        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equipment_state::PartRef;
    use crate::orchestrator::SkipReason;
    use crate::reference_catalog::StaticCatalog;
    use fluxion_bos_types::SlotEquipment;

    fn eligible_state() -> EquipmentState {
        EquipmentState {
            utility_name: "APS".to_owned(),
            has_solar_panels: true,
            solar_panel: PartRef::new("REC", "Alpha Pure"),
            micro_inverter: PartRef::new("Enphase", "IQ8M"),
            sms: PartRef::new("FranklinWH", "Agate"),
            battery1: PartRef::new("FranklinWH", "aPower 2"),
            battery1_quantity: 1,
            backup_option: Some("Whole Home".to_owned()),
            ..Default::default()
        }
    }

    #[test]
    fn test_eligibility() {
        let rule = FranklinApsRule::default();
        assert!(rule.is_eligible(&eligible_state()));

        let mut state = eligible_state();
        state.micro_inverter = PartRef::default();
        assert!(!rule.is_eligible(&state));
        state.inverter = PartRef::new("SolarEdge", "SE7600H");
        assert!(rule.is_eligible(&state));

        let cases: [fn(&mut EquipmentState); 5] = [
            |s| s.utility_name = "Arizona Public Service (APS)".to_owned(),
            |s| s.sms = PartRef::new("Tesla", "Gateway 3"),
            |s| s.battery1_quantity = 0,
            |s| s.backup_option = Some("Partial Home".to_owned()),
            |s| s.has_solar_panels = false,
        ];
        for mutate in cases {
            let mut state = eligible_state();
            mutate(&mut state);
            assert!(!rule.is_eligible(&state));
        }
    }

    #[test]
    fn test_plan_for_empty_bos() {
        let rule = FranklinApsRule::default();
        let plan = rule.plan(&eligible_state(), 32.0, &StaticCatalog::reference());

        assert!((plan.minimum_required_amps - 40.0).abs() < 1e-9);
        let utility: Vec<_> = plan
            .utility_bos
            .iter()
            .map(|e| (e.make.as_deref(), e.model.as_deref(), e.amp_rating.as_deref()))
            .collect();
        assert_eq!(
            utility,
            vec![
                (Some("MILBANK"), Some("U5929XL"), Some("100")),
                (Some("SIEMENS"), Some("LNF222R"), Some("60")),
            ]
        );

        let battery: Vec<_> = plan
            .battery_bos
            .iter()
            .map(|e| e.equipment_type.as_str())
            .collect();
        assert_eq!(
            battery,
            vec![
                types::BI_DIRECTIONAL_METER_DER_SIDE_DISCONNECT,
                types::BI_DIRECTIONAL_METER_LINE_SIDE_DISCONNECT,
            ]
        );

        // Three meter makes tie at 200A
        assert_eq!(plan.skipped.len(), 1);
        assert_eq!(plan.skipped[0].equipment_type, types::BI_DIRECTIONAL_METER);
        assert!(matches!(
            plan.skipped[0].reason,
            SkipReason::Ambiguous { amp_rating: 200, .. }
        ));
        assert!(plan.message.starts_with("Successfully configured 4 BOS equipment items"));
    }

    #[test]
    fn test_existing_equipment_is_kept() {
        let mut state = eligible_state();
        state.existing_utility_bos = vec![
            SlotEquipment::new(types::UNI_DIRECTIONAL_METER),
            SlotEquipment::new(types::UNI_DIRECTIONAL_METER_LINE_SIDE_DISCONNECT),
        ];
        state.existing_battery_bos = vec![
            SlotEquipment::new(types::BI_DIRECTIONAL_METER_DER_SIDE_DISCONNECT),
            SlotEquipment::new(types::BI_DIRECTIONAL_METER),
            SlotEquipment::new(types::BI_DIRECTIONAL_METER_LINE_SIDE_DISCONNECT),
        ];

        let plan = FranklinApsRule::default().plan(&state, 32.0, &StaticCatalog::reference());
        assert_eq!(plan.added_count(), 0);
        assert_eq!(plan.skipped.len(), 5);
        assert_eq!(plan.message, "All required BOS equipment is already configured.");
    }

    #[test]
    fn test_oversized_output_finds_nothing() {
        let plan = FranklinApsRule::default().plan(&eligible_state(), 400.0, &StaticCatalog::reference());
        assert_eq!(plan.added_count(), 0);
        assert!(plan.skipped.iter().all(|s| s.reason == SkipReason::NotFound));
        assert!(plan.message.starts_with("No BOS equipment could be selected"));
    }
}
