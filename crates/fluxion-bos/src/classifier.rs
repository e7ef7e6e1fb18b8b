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

//! Configuration classification as ordered guarded rules.
//!
//! Rules are evaluated top to bottom and the first guard that holds wins.
//! Universal rules apply to every utility. Battery systems of the reference
//! utility then run the utility's own rule list; other battery systems get
//! `UTILITY-DEFAULT-ESS`. Anything left over is `INVALID`.

use crate::config::EngineConfig;
use fluxion_bos_types::{
    ChargingSource, ConfigurationId, CouplingType, SystemAttributes, UtilityContext,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// One guarded classification rule
#[derive(Clone, Copy)]
pub struct Rule {
    pub id: ConfigurationId,
    /// Human-readable guard, shown in the decision matrix
    pub condition: &'static str,
    guard: fn(&SystemAttributes) -> bool,
}

impl Rule {
    const fn new(
        id: ConfigurationId,
        condition: &'static str,
        guard: fn(&SystemAttributes) -> bool,
    ) -> Self {
        Self {
            id,
            condition,
            guard,
        }
    }

    pub fn matches(&self, attrs: &SystemAttributes) -> bool {
        (self.guard)(attrs)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("condition", &self.condition)
            .finish()
    }
}

fn grid_or_renewable_with_solar(a: &SystemAttributes) -> bool {
    a.is_coupled(CouplingType::Ac) && a.charges_from(ChargingSource::GridOrRenewable) && a.solar()
}

fn dc_peak_shaving(a: &SystemAttributes) -> bool {
    a.is_coupled(CouplingType::Dc) && a.solar() && a.peak_shaving()
}

fn ac_grid_only(a: &SystemAttributes) -> bool {
    a.is_coupled(CouplingType::Ac) && a.charges_from(ChargingSource::GridOnly)
}

/// Rules checked before any utility-specific logic
pub const UNIVERSAL_RULES: &[Rule] = &[
    Rule::new(ConfigurationId::NoBos, "utility BOS combination is \"No BOS\"", |a| {
        a.utility.is_no_bos()
    }),
    Rule::new(ConfigurationId::PvUtility, "no battery, solar PV present", |a| {
        !a.has_battery && a.solar()
    }),
];

/// ESS rules of the reference utility, in priority order.
///
/// Single battery without backup always lands on B-4: no input separates a
/// PCS system (B-2) from the standard one, so B-2 has no rule.
pub const REFERENCE_UTILITY_RULES: &[Rule] = &[
    Rule::new(ConfigurationId::D, "standby only", |a| a.is_standby_only),
    Rule::new(
        ConfigurationId::C2,
        "DC coupled, solar, peak shaving, backup",
        |a| dc_peak_shaving(a) && a.backup(),
    ),
    Rule::new(
        ConfigurationId::C1,
        "DC coupled, solar, peak shaving, no backup",
        |a| dc_peak_shaving(a) && !a.backup(),
    ),
    Rule::new(ConfigurationId::A1, "AC coupled, grid-only charging, backup", |a| {
        ac_grid_only(a) && a.backup()
    }),
    Rule::new(
        ConfigurationId::A2,
        "AC coupled, grid-only charging, no backup",
        |a| ac_grid_only(a) && !a.backup(),
    ),
    Rule::new(
        ConfigurationId::B1,
        "AC coupled, grid-or-renewable, solar, backup, multiple batteries",
        |a| grid_or_renewable_with_solar(a) && a.backup() && a.multiple_batteries(),
    ),
    Rule::new(
        ConfigurationId::B3,
        "AC coupled, grid-or-renewable, solar, backup, single battery",
        |a| grid_or_renewable_with_solar(a) && a.backup(),
    ),
    Rule::new(
        ConfigurationId::B5,
        "AC coupled, grid-or-renewable, solar, no backup, multiple batteries",
        |a| grid_or_renewable_with_solar(a) && a.multiple_batteries(),
    ),
    Rule::new(
        ConfigurationId::B4,
        "AC coupled, grid-or-renewable, solar, no backup, single battery",
        grid_or_renewable_with_solar,
    ),
];

/// Row of the decision matrix shown to installers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecisionRow {
    pub scope: &'static str,
    pub condition: &'static str,
    pub output: ConfigurationId,
}

#[derive(Debug, Clone)]
pub struct ConfigurationClassifier {
    reference_utility: String,
}

impl Default for ConfigurationClassifier {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl ConfigurationClassifier {
    pub fn new(reference_utility: impl Into<String>) -> Self {
        Self {
            reference_utility: reference_utility.into(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.reference_utility.clone())
    }

    pub fn reference_utility(&self) -> &str {
        &self.reference_utility
    }

    fn runs_utility_rules(&self, utility: &UtilityContext) -> bool {
        utility.name == self.reference_utility && utility.supports_ess
    }

    /// Classify one system. Total: unmatched inputs yield `INVALID`.
    pub fn classify(&self, attrs: &SystemAttributes) -> ConfigurationId {
        if let Some(rule) = UNIVERSAL_RULES.iter().find(|r| r.matches(attrs)) {
            debug!("Classified as {} ({})", rule.id, rule.condition);
            return rule.id;
        }

        if !attrs.has_battery {
            debug!("No battery and no solar PV, configuration invalid");
            return ConfigurationId::Invalid;
        }

        if !self.runs_utility_rules(&attrs.utility) {
            debug!(
                "Utility '{}' has no ESS rules, using default ESS",
                attrs.utility.name
            );
            return ConfigurationId::UtilityDefaultEss;
        }

        match REFERENCE_UTILITY_RULES.iter().find(|r| r.matches(attrs)) {
            Some(rule) => {
                debug!("Classified as {} ({})", rule.id, rule.condition);
                rule.id
            }
            None => {
                debug!("No {} ESS rule matched", self.reference_utility);
                ConfigurationId::Invalid
            }
        }
    }

    /// Every rule in evaluation order
    pub fn decision_matrix(&self) -> Vec<DecisionRow> {
        let universal = UNIVERSAL_RULES.iter().map(|rule| DecisionRow {
            scope: "universal",
            condition: rule.condition,
            output: rule.id,
        });
        let utility = REFERENCE_UTILITY_RULES.iter().map(|rule| DecisionRow {
            scope: "reference utility ESS",
            condition: rule.condition,
            output: rule.id,
        });
        universal
            .chain(utility)
            .chain(std::iter::once(DecisionRow {
                scope: "other utility ESS",
                condition: "battery present, utility without ESS rules",
                output: ConfigurationId::UtilityDefaultEss,
            }))
            .collect()
    }

    /// Classify from installed equipment instead of questionnaire answers
    pub fn identify_from_equipment(
        &self,
        equipment: &EquipmentSummary,
        utility: UtilityContext,
    ) -> ConfigurationId {
        self.classify(&equipment.to_attributes(utility))
    }
}

/// More than one unit of the same battery type
pub fn has_multiple_batteries(quantity: u32) -> bool {
    quantity > 1
}

// ============= Equipment Summary =============

/// Inverter class of the main inverter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InverterClass {
    GridFollowing,
    GridFormingFollowing,
    Hybrid,
}

impl InverterClass {
    pub fn to_config_value(&self) -> &'static str {
        match self {
            Self::GridFollowing => "grid-following",
            Self::GridFormingFollowing => "grid-forming-following",
            Self::Hybrid => "hybrid",
        }
    }
}

impl FromStr for InverterClass {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "grid-following" => Ok(Self::GridFollowing),
            "grid-forming-following" => Ok(Self::GridFormingFollowing),
            "hybrid" => Ok(Self::Hybrid),
            _ => Err(anyhow::anyhow!(
                "Unknown inverter class: '{s}'. Supported types: grid-following, grid-forming-following, hybrid"
            )),
        }
    }
}

/// Equipment already entered for a system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentSummary {
    pub solar_panels: bool,
    pub battery_quantity: u32,
    pub inverter_class: Option<InverterClass>,
    pub backup_power: bool,
    pub charging_source: ChargingSource,
    pub coupling: CouplingType,
}

impl EquipmentSummary {
    /// Derive questionnaire answers. A hybrid inverter implies DC coupling
    /// with peak shaving; a system without solar charging from the grid only
    /// is standby.
    pub fn to_attributes(&self, utility: UtilityContext) -> SystemAttributes {
        let hybrid = self.inverter_class == Some(InverterClass::Hybrid);
        SystemAttributes {
            utility,
            has_battery: self.battery_quantity > 0,
            battery_quantity: self.battery_quantity,
            battery_type_count: u32::from(self.battery_quantity > 0),
            is_standby_only: !self.solar_panels && self.charging_source == ChargingSource::GridOnly,
            has_solar_pv: Some(self.solar_panels),
            charging_source: Some(self.charging_source),
            coupling: Some(if hybrid { CouplingType::Dc } else { self.coupling }),
            requires_backup_power: Some(self.backup_power),
            supports_peak_shaving: Some(hybrid),
            has_multiple_batteries: Some(has_multiple_batteries(self.battery_quantity)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aps() -> UtilityContext {
        UtilityContext {
            name: "APS".to_owned(),
            bos_combination: "Standard".to_owned(),
            supports_ess: true,
            bos_requirements: Vec::new(),
        }
    }

    fn ac_grid_or_renewable(backup: bool, multiple: bool) -> SystemAttributes {
        SystemAttributes {
            utility: aps(),
            has_battery: true,
            battery_quantity: if multiple { 2 } else { 1 },
            battery_type_count: 1,
            is_standby_only: false,
            has_solar_pv: Some(true),
            charging_source: Some(ChargingSource::GridOrRenewable),
            coupling: Some(CouplingType::Ac),
            requires_backup_power: Some(backup),
            supports_peak_shaving: Some(false),
            has_multiple_batteries: Some(multiple),
        }
    }

    #[test]
    fn test_no_bos_overrides_everything() {
        let classifier = ConfigurationClassifier::default();
        let mut attrs = ac_grid_or_renewable(true, true);
        attrs.utility.bos_combination = "No BOS".to_owned();
        assert_eq!(classifier.classify(&attrs), ConfigurationId::NoBos);
        attrs.is_standby_only = true;
        attrs.has_battery = false;
        assert_eq!(classifier.classify(&attrs), ConfigurationId::NoBos);
    }

    #[test]
    fn test_pv_only_for_any_utility() {
        let classifier = ConfigurationClassifier::default();
        let attrs = SystemAttributes {
            utility: UtilityContext::new("SRP"),
            has_solar_pv: Some(true),
            ..Default::default()
        };
        assert_eq!(classifier.classify(&attrs), ConfigurationId::PvUtility);
    }

    #[test]
    fn test_nothing_installed_is_invalid() {
        let classifier = ConfigurationClassifier::default();
        assert_eq!(
            classifier.classify(&SystemAttributes::default()),
            ConfigurationId::Invalid
        );
    }

    #[test]
    fn test_battery_outside_reference_utility_uses_default() {
        let classifier = ConfigurationClassifier::default();
        let mut attrs = ac_grid_or_renewable(true, false);
        attrs.utility.supports_ess = false;
        assert_eq!(classifier.classify(&attrs), ConfigurationId::UtilityDefaultEss);
        attrs.utility = UtilityContext {
            supports_ess: true,
            ..UtilityContext::new("TEP")
        };
        assert_eq!(classifier.classify(&attrs), ConfigurationId::UtilityDefaultEss);
    }

    #[test]
    fn test_grid_or_renewable_branch() {
        let classifier = ConfigurationClassifier::default();
        let cases = [
            (true, true, ConfigurationId::B1),
            (true, false, ConfigurationId::B3),
            (false, true, ConfigurationId::B5),
            (false, false, ConfigurationId::B4),
        ];
        for (backup, multiple, expected) in cases {
            assert_eq!(
                classifier.classify(&ac_grid_or_renewable(backup, multiple)),
                expected,
                "backup={backup} multiple={multiple}"
            );
        }
    }

    #[test]
    fn test_b2_is_unreachable() {
        let classifier = ConfigurationClassifier::default();
        assert!(
            classifier
                .decision_matrix()
                .iter()
                .all(|row| row.output != ConfigurationId::B2)
        );
        let mut attrs = ac_grid_or_renewable(false, false);
        attrs.supports_peak_shaving = Some(true);
        assert_eq!(classifier.classify(&attrs), ConfigurationId::B4);
    }

    #[test]
    fn test_priority_order() {
        let classifier = ConfigurationClassifier::default();

        // Standby wins over everything in the utility subtree
        let mut attrs = ac_grid_or_renewable(true, true);
        attrs.is_standby_only = true;
        assert_eq!(classifier.classify(&attrs), ConfigurationId::D);

        // DC with peak shaving wins over AC rules
        let mut attrs = ac_grid_or_renewable(true, false);
        attrs.coupling = Some(CouplingType::Dc);
        attrs.supports_peak_shaving = Some(true);
        assert_eq!(classifier.classify(&attrs), ConfigurationId::C2);
        attrs.requires_backup_power = Some(false);
        assert_eq!(classifier.classify(&attrs), ConfigurationId::C1);

        // DC without peak shaving falls through every rule
        attrs.supports_peak_shaving = Some(false);
        assert_eq!(classifier.classify(&attrs), ConfigurationId::Invalid);

        // Grid-only ignores solar and battery count
        let mut attrs = ac_grid_or_renewable(true, true);
        attrs.charging_source = Some(ChargingSource::GridOnly);
        assert_eq!(classifier.classify(&attrs), ConfigurationId::A1);
        attrs.requires_backup_power = Some(false);
        assert_eq!(classifier.classify(&attrs), ConfigurationId::A2);
    }

    #[test]
    fn test_rule_order_is_pinned() {
        let ids: Vec<_> = REFERENCE_UTILITY_RULES.iter().map(|r| r.id).collect();
        assert_eq!(
            ids,
            vec![
                ConfigurationId::D,
                ConfigurationId::C2,
                ConfigurationId::C1,
                ConfigurationId::A1,
                ConfigurationId::A2,
                ConfigurationId::B1,
                ConfigurationId::B3,
                ConfigurationId::B5,
                ConfigurationId::B4,
            ]
        );
        let matrix = ConfigurationClassifier::default().decision_matrix();
        assert_eq!(matrix.first().map(|r| r.output), Some(ConfigurationId::NoBos));
        assert_eq!(matrix.len(), UNIVERSAL_RULES.len() + ids.len() + 1);
    }

    #[test]
    fn test_custom_reference_utility() {
        let classifier = ConfigurationClassifier::new("SRP");
        let mut attrs = ac_grid_or_renewable(true, false);
        assert_eq!(classifier.classify(&attrs), ConfigurationId::UtilityDefaultEss);
        attrs.utility.name = "SRP".to_owned();
        assert_eq!(classifier.classify(&attrs), ConfigurationId::B3);
    }

    #[test]
    fn test_identify_from_equipment() {
        let classifier = ConfigurationClassifier::default();
        let hybrid = EquipmentSummary {
            solar_panels: true,
            battery_quantity: 1,
            inverter_class: Some(InverterClass::Hybrid),
            backup_power: true,
            charging_source: ChargingSource::GridOrRenewable,
            coupling: CouplingType::Ac,
        };
        assert_eq!(classifier.identify_from_equipment(&hybrid, aps()), ConfigurationId::C2);

        let standby = EquipmentSummary {
            solar_panels: false,
            inverter_class: Some(InverterClass::GridFormingFollowing),
            charging_source: ChargingSource::GridOnly,
            ..hybrid.clone()
        };
        assert_eq!(classifier.identify_from_equipment(&standby, aps()), ConfigurationId::D);

        let multi = EquipmentSummary {
            battery_quantity: 3,
            inverter_class: Some(InverterClass::GridFollowing),
            backup_power: false,
            ..hybrid
        };
        assert_eq!(classifier.identify_from_equipment(&multi, aps()), ConfigurationId::B5);
    }

    #[test]
    fn test_inverter_class_parse() {
        assert_eq!("Hybrid".parse::<InverterClass>().unwrap(), InverterClass::Hybrid);
        assert!("string".parse::<InverterClass>().is_err());
        assert!(has_multiple_batteries(2));
        assert!(!has_multiple_batteries(1));
    }
}
