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

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============= Configuration Identifier =============

/// Canonical configuration identifiers produced by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConfigurationId {
    #[serde(rename = "A-1")]
    A1,
    #[serde(rename = "A-2")]
    A2,
    #[serde(rename = "B-1")]
    B1,
    #[serde(rename = "B-2")]
    B2,
    #[serde(rename = "B-3")]
    B3,
    #[serde(rename = "B-4")]
    B4,
    #[serde(rename = "B-5")]
    B5,
    #[serde(rename = "C-1")]
    C1,
    #[serde(rename = "C-2")]
    C2,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "NO-BOS")]
    NoBos,
    #[serde(rename = "PV-UTILITY")]
    PvUtility,
    #[serde(rename = "UTILITY-DEFAULT-ESS")]
    UtilityDefaultEss,
    #[serde(rename = "INVALID")]
    Invalid,
}

impl ConfigurationId {
    /// Identifier as stored and displayed, e.g. "B-3"
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A1 => "A-1",
            Self::A2 => "A-2",
            Self::B1 => "B-1",
            Self::B2 => "B-2",
            Self::B3 => "B-3",
            Self::B4 => "B-4",
            Self::B5 => "B-5",
            Self::C1 => "C-1",
            Self::C2 => "C-2",
            Self::D => "D",
            Self::NoBos => "NO-BOS",
            Self::PvUtility => "PV-UTILITY",
            Self::UtilityDefaultEss => "UTILITY-DEFAULT-ESS",
            Self::Invalid => "INVALID",
        }
    }

    /// True for the identifiers that apply regardless of utility
    pub fn is_universal(&self) -> bool {
        matches!(
            self,
            Self::NoBos | Self::PvUtility | Self::UtilityDefaultEss | Self::Invalid
        )
    }

    /// List every identifier in catalog order
    pub fn all() -> &'static [ConfigurationId] {
        &[
            Self::A1,
            Self::A2,
            Self::B1,
            Self::B2,
            Self::B3,
            Self::B4,
            Self::B5,
            Self::C1,
            Self::C2,
            Self::D,
            Self::NoBos,
            Self::PvUtility,
            Self::UtilityDefaultEss,
            Self::Invalid,
        ]
    }
}

impl fmt::Display for ConfigurationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigurationId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_uppercase();
        Self::all()
            .iter()
            .copied()
            .find(|id| id.as_str() == wanted)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown configuration id: '{}'. Supported ids: {}",
                    s,
                    Self::all()
                        .iter()
                        .map(ConfigurationId::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
    }
}

// ============= Configuration Record =============

/// Bill of equipment a configuration requires
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredEquipment {
    pub solar_panels: bool,
    pub battery_quantity: u32,
    pub battery_types: u32,
    pub grid_following_inverter: u32,
    pub grid_forming_following_inverter: u32,
    pub hybrid_inverter: u32,
    pub backup_load_panel: bool,
    /// Automatic disconnect switch (ADS) for grid isolation
    pub automatic_disconnect_switch: bool,
    pub transfer_switch: bool,
    pub battery_charger: bool,
    pub dedicated_der_combiner: bool,
    pub bi_directional_meters: u32,
    pub uni_directional_meters: u32,
    pub peak_shaving: bool,
}

/// Which equipment sections the UI shows for a configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionVisibility {
    pub solar: bool,
    pub solar_type2: bool,
    pub micro_inverter: bool,
    pub inverter: bool,
    pub optimizer: bool,
    pub battery1: bool,
    pub battery2: bool,
    pub battery_combiner_panel: bool,
    pub backup_load_sub_panel: bool,
    pub gateway: bool,
    pub sms: bool,
    pub ess: bool,
    pub string_combiner_panel: bool,
    /// Visibility of utility BOS type slots 1..=6
    pub bos_types: [bool; 6],
}

impl SectionVisibility {
    /// Number of utility BOS slots shown (leading visible slots)
    pub fn bos_slot_count(&self) -> usize {
        self.bos_types.iter().take_while(|visible| **visible).count()
    }
}

/// Directionality of the utility revenue meter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UtilityMeter {
    BiDirectional,
    UniDirectional,
}

/// Where production is metered relative to the service point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductionMetering {
    LineSide,
    DerSide,
    Both,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeterConfiguration {
    pub utility_meter: UtilityMeter,
    pub production_metering: ProductionMetering,
    pub meter_test_block: bool,
}

/// Immutable description of one configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationRecord {
    pub id: ConfigurationId,
    pub name: String,
    pub description: String,
    pub required_equipment: RequiredEquipment,
    pub sections: SectionVisibility,
    pub meters: MeterConfiguration,
    pub notes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_string_forms_agree() {
        for id in ConfigurationId::all() {
            let json = serde_json::to_string(id).unwrap();
            assert_eq!(json, format!("\"{}\"", id.as_str()));
            assert_eq!(id.as_str().parse::<ConfigurationId>().unwrap(), *id);
        }
    }

    #[test]
    fn test_id_parse_is_case_insensitive() {
        assert_eq!("b-3".parse::<ConfigurationId>().unwrap(), ConfigurationId::B3);
        assert_eq!(
            "utility-default-ess".parse::<ConfigurationId>().unwrap(),
            ConfigurationId::UtilityDefaultEss
        );
        assert!("B-9".parse::<ConfigurationId>().is_err());
    }

    #[test]
    fn test_universal_ids() {
        assert!(ConfigurationId::NoBos.is_universal());
        assert!(ConfigurationId::Invalid.is_universal());
        assert!(!ConfigurationId::B4.is_universal());
    }

    #[test]
    fn test_bos_slot_count_counts_leading_slots() {
        let sections = SectionVisibility {
            bos_types: [true, true, true, false, false, false],
            ..Default::default()
        };
        assert_eq!(sections.bos_slot_count(), 3);
    }
}
