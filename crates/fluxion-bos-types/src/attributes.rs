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

/// BOS combination tag a utility uses when it requires no BOS equipment at all
pub const NO_BOS_COMBINATION: &str = "No BOS";

// ============= Coupling / Charging Enums =============

/// How the battery is coupled to the PV array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CouplingType {
    /// Battery inverter on the AC bus, separate from the PV inverter
    #[serde(rename = "AC")]
    Ac,
    /// PV and battery share a hybrid inverter's DC bus
    #[serde(rename = "DC")]
    Dc,
}

impl CouplingType {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Ac => "AC",
            Self::Dc => "DC",
        }
    }

    pub fn all() -> &'static [CouplingType] {
        &[Self::Ac, Self::Dc]
    }
}

impl fmt::Display for CouplingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for CouplingType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "AC" => Ok(Self::Ac),
            "DC" => Ok(Self::Dc),
            _ => Err(anyhow::anyhow!(
                "Unknown coupling type: '{}'. Supported types: {}",
                s,
                Self::all()
                    .iter()
                    .map(CouplingType::display_name)
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }
}

/// Where the battery is allowed to draw charging energy from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChargingSource {
    GridOnly,
    GridOrRenewable,
}

impl ChargingSource {
    /// Get config string value (kebab-case)
    pub fn to_config_value(&self) -> &'static str {
        match self {
            Self::GridOnly => "grid-only",
            Self::GridOrRenewable => "grid-or-renewable",
        }
    }

    pub fn all() -> &'static [ChargingSource] {
        &[Self::GridOnly, Self::GridOrRenewable]
    }
}

impl fmt::Display for ChargingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_config_value())
    }
}

impl FromStr for ChargingSource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "grid-only" => Ok(Self::GridOnly),
            "grid-or-renewable" => Ok(Self::GridOrRenewable),
            _ => Err(anyhow::anyhow!(
                "Unknown charging source: '{}'. Supported sources: {}",
                s,
                Self::all()
                    .iter()
                    .map(ChargingSource::to_config_value)
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }
}

// ============= System Number =============

/// Logical system index inside one project (1..=4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SystemNumber(u8);

impl SystemNumber {
    pub const MAX: u8 = 4;

    pub fn new(number: u8) -> Option<Self> {
        (1..=Self::MAX).contains(&number).then_some(Self(number))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Field prefix for system-scoped fields, e.g. `sys2_`
    pub fn prefix(self) -> String {
        format!("sys{}_", self.0)
    }

    pub fn all() -> impl Iterator<Item = SystemNumber> {
        (1..=Self::MAX).map(Self)
    }
}

impl TryFrom<u8> for SystemNumber {
    type Error = anyhow::Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value).ok_or_else(|| {
            anyhow::anyhow!("System number {value} out of range 1..={}", Self::MAX)
        })
    }
}

impl From<SystemNumber> for u8 {
    fn from(value: SystemNumber) -> Self {
        value.0
    }
}

impl fmt::Display for SystemNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============= System Attributes =============

/// Utility the installation interconnects with
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtilityContext {
    /// Utility identity, e.g. "APS"
    pub name: String,
    /// Utility BOS combination tag ("No BOS" disables BOS entirely)
    #[serde(default)]
    pub bos_combination: String,
    /// Whether the utility publishes its own ESS configuration table
    #[serde(default)]
    pub supports_ess: bool,
    /// Utility-specific BOS requirement labels (bos1..bos6)
    #[serde(default)]
    pub bos_requirements: Vec<String>,
}

impl UtilityContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn is_no_bos(&self) -> bool {
        self.bos_combination.trim() == NO_BOS_COMBINATION
    }
}

/// Electrical attributes of one logical system used for classification.
///
/// Optional fields are the answers a user must supply before a non-standby
/// system can be classified; `None` means "not answered yet".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemAttributes {
    pub utility: UtilityContext,
    pub has_battery: bool,
    #[serde(default)]
    pub battery_quantity: u32,
    /// Number of distinct battery types (battery1/battery2)
    #[serde(default)]
    pub battery_type_count: u32,
    #[serde(default)]
    pub is_standby_only: bool,
    #[serde(default)]
    pub has_solar_pv: Option<bool>,
    #[serde(default)]
    pub charging_source: Option<ChargingSource>,
    #[serde(default)]
    pub coupling: Option<CouplingType>,
    #[serde(default)]
    pub requires_backup_power: Option<bool>,
    #[serde(default)]
    pub supports_peak_shaving: Option<bool>,
    #[serde(default)]
    pub has_multiple_batteries: Option<bool>,
}

impl SystemAttributes {
    pub fn solar(&self) -> bool {
        self.has_solar_pv.unwrap_or(false)
    }

    pub fn backup(&self) -> bool {
        self.requires_backup_power.unwrap_or(false)
    }

    pub fn peak_shaving(&self) -> bool {
        self.supports_peak_shaving.unwrap_or(false)
    }

    pub fn multiple_batteries(&self) -> bool {
        self.has_multiple_batteries.unwrap_or(false)
    }

    pub fn is_coupled(&self, coupling: CouplingType) -> bool {
        self.coupling == Some(coupling)
    }

    pub fn charges_from(&self, source: ChargingSource) -> bool {
        self.charging_source == Some(source)
    }
}
