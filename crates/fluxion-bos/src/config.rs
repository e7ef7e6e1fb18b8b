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

//! Engine configuration, loaded from JSON or TOML

use crate::error::{BosError, Result};
use fluxion_bos_types::BosSection;
use fluxion_bos_types::bos::MAX_SLOTS;
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_continuous_load_multiplier() -> f64 {
    1.25
}

fn default_backfeed_multiplier() -> f64 {
    1.2
}

fn default_240() -> u32 {
    240
}

fn default_reference_utility() -> String {
    "APS".to_owned()
}

fn default_log_filter() -> String {
    "info".to_owned()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Slots available per BOS section
    #[serde(default)]
    pub slot_capacities: SlotCapacities,

    /// NEC continuous-load factor applied to observed amperage
    #[serde(default = "default_continuous_load_multiplier")]
    pub continuous_load_multiplier: f64,

    /// Bus-bar multiplier used for allowable backfeed (120% rule)
    #[serde(default = "default_backfeed_multiplier")]
    pub backfeed_multiplier: f64,

    /// Nominal service voltage used when converting watts to amps
    #[serde(default = "default_240")]
    pub standard_voltage: u32,

    /// Utility whose ESS configuration subtree the classifier applies
    #[serde(default = "default_reference_utility")]
    pub reference_utility: String,

    /// Preferred makes for auto-configured BOS positions
    #[serde(default)]
    pub preferred_makes: PreferredMakes,

    /// Default tracing filter when RUST_LOG is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            slot_capacities: SlotCapacities::default(),
            continuous_load_multiplier: default_continuous_load_multiplier(),
            backfeed_multiplier: default_backfeed_multiplier(),
            standard_voltage: default_240(),
            reference_utility: default_reference_utility(),
            preferred_makes: PreferredMakes::default(),
            log_filter: default_log_filter(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        for section in BosSection::all() {
            let capacity = self.slot_capacities.get(*section);
            if capacity == 0 || capacity > MAX_SLOTS {
                return Err(BosError::Config(format!(
                    "{section} capacity {capacity} must be within 1..={MAX_SLOTS}"
                )));
            }
        }
        if self.continuous_load_multiplier < 1.0 {
            return Err(BosError::Config(format!(
                "continuous_load_multiplier {} must be at least 1.0",
                self.continuous_load_multiplier
            )));
        }
        if self.backfeed_multiplier <= 0.0 {
            return Err(BosError::Config(format!(
                "backfeed_multiplier {} must be positive",
                self.backfeed_multiplier
            )));
        }
        if self.reference_utility.trim().is_empty() {
            return Err(BosError::Config("reference_utility is empty".to_owned()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlotCapacities {
    pub utility: usize,
    pub battery1: usize,
    pub battery2: usize,
    pub backup: usize,
    pub post_sms: usize,
}

impl SlotCapacities {
    /// Six utility slots and three in every other section.
    ///
    /// Matches records created before battery, backup and post-SMS sections
    /// were widened; opt in through `[slot_capacities]` or this constructor.
    pub fn compact_layout() -> Self {
        Self {
            utility: MAX_SLOTS,
            battery1: 3,
            battery2: 3,
            backup: 3,
            post_sms: 3,
        }
    }

    pub fn get(&self, section: BosSection) -> usize {
        match section {
            BosSection::Utility => self.utility,
            BosSection::Battery1 => self.battery1,
            BosSection::Battery2 => self.battery2,
            BosSection::Backup => self.backup,
            BosSection::PostSms => self.post_sms,
        }
    }
}

impl Default for SlotCapacities {
    fn default() -> Self {
        Self {
            utility: BosSection::Utility.default_capacity(),
            battery1: BosSection::Battery1.default_capacity(),
            battery2: BosSection::Battery2.default_capacity(),
            backup: BosSection::Backup.default_capacity(),
            post_sms: BosSection::PostSms.default_capacity(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PreferredMakes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utility_meter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utility_line_disconnect: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_der_disconnect: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_meter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_line_disconnect: Option<String>,
}

impl Default for PreferredMakes {
    fn default() -> Self {
        Self {
            utility_meter: Some("Milbank".to_owned()),
            utility_line_disconnect: Some("Siemens".to_owned()),
            battery_der_disconnect: None,
            battery_meter: None,
            battery_line_disconnect: None,
        }
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}

/// Load config from `path`; a missing file yields defaults
pub fn load_config(path: &Path) -> Result<EngineConfig> {
    if !path.exists() {
        return Ok(EngineConfig::default());
    }
    let content = std::fs::read_to_string(path)?;
    let config: EngineConfig = if is_toml(path) {
        toml::from_str(&content)?
    } else {
        serde_json::from_str(&content)
            .map_err(|e| BosError::Config(format!("Failed to parse config: {e}")))?
    };
    config.validate()?;
    Ok(config)
}

pub fn save_config(path: &Path, config: &EngineConfig) -> Result<()> {
    config.validate()?;
    let temp_path = path.with_extension("tmp");
    let content = if is_toml(path) {
        toml::to_string_pretty(config)
            .map_err(|e| BosError::Config(format!("Failed to serialize config: {e}")))?
    } else {
        serde_json::to_string_pretty(config)?
    };

    // Atomic write
    std::fs::write(&temp_path, content)?;
    std::fs::rename(&temp_path, path)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert!((config.continuous_load_multiplier - 1.25).abs() < 0.001);
        assert!((config.backfeed_multiplier - 1.2).abs() < 0.001);
        assert_eq!(config.standard_voltage, 240);
        assert_eq!(config.reference_utility, "APS");
        assert_eq!(config.slot_capacities.get(BosSection::Utility), 6);
        assert!(
            BosSection::all()
                .iter()
                .all(|s| config.slot_capacities.get(*s) == MAX_SLOTS)
        );
        assert_eq!(config.preferred_makes.utility_line_disconnect.as_deref(), Some("Siemens"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bos.toml");
        std::fs::write(
            &path,
            "reference_utility = \"SRP\"\n\n[slot_capacities]\nutility = 4\nbattery1 = 3\nbattery2 = 3\nbackup = 2\npost_sms = 3\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.reference_utility, "SRP");
        assert_eq!(config.slot_capacities.utility, 4);
        assert_eq!(config.slot_capacities.backup, 2);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_compact_layout_is_opt_in() {
        let compact = SlotCapacities::compact_layout();
        assert_ne!(compact, SlotCapacities::default());
        assert_eq!(compact.get(BosSection::Utility), 6);
        assert_eq!(compact.get(BosSection::Backup), 3);
        assert_eq!(compact.get(BosSection::PostSms), 3);

        let config = EngineConfig {
            slot_capacities: compact,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_capacity_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bos.json");
        std::fs::write(
            &path,
            r#"{"slot_capacities": {"utility": 7, "battery1": 3, "battery2": 3, "backup": 3, "post_sms": 3}}"#,
        )
        .unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, BosError::Config(_)));
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = TempDir::new().unwrap();
        for name in ["bos.json", "bos.toml"] {
            let path = dir.path().join(name);
            let config = EngineConfig {
                reference_utility: "TEP".to_owned(),
                standard_voltage: 208,
                ..Default::default()
            };
            save_config(&path, &config).unwrap();
            let loaded = load_config(&path).unwrap();
            assert_eq!(loaded, config);
            assert!(!path.with_extension("tmp").exists());
        }
    }
}
