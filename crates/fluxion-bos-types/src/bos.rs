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

use crate::attributes::SystemNumber;

/// Largest slot count any BOS section can hold
pub const MAX_SLOTS: usize = 6;

// ============= BOS Sections =============

/// A group of ordered BOS slots attached to one logical system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BosSection {
    /// Utility-side BOS between the string combiner and the service
    Utility,
    /// Daisy chain after battery type 1
    Battery1,
    /// Daisy chain after battery type 2
    Battery2,
    /// Daisy chain after the backup load sub panel
    Backup,
    /// Equipment downstream of the storage management system
    PostSms,
}

impl BosSection {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Utility => "Utility BOS",
            Self::Battery1 => "Battery 1 BOS",
            Self::Battery2 => "Battery 2 BOS",
            Self::Backup => "Backup BOS",
            Self::PostSms => "Post-SMS BOS",
        }
    }

    /// Get config string value (kebab-case)
    pub fn to_config_value(&self) -> &'static str {
        match self {
            Self::Utility => "utility",
            Self::Battery1 => "battery1",
            Self::Battery2 => "battery2",
            Self::Backup => "backup",
            Self::PostSms => "post-sms",
        }
    }

    /// Number of slots the persisted record provides for this section.
    ///
    /// Every section holds the full six slots; narrower layouts are opted
    /// into through the engine's slot capacity settings.
    #[expect(clippy::unused_self)]
    pub fn default_capacity(&self) -> usize {
        MAX_SLOTS
    }

    /// Battery sections persist no `active` flag
    pub fn has_active_flag(&self) -> bool {
        !matches!(self, Self::Battery1 | Self::Battery2)
    }

    /// Sections whose slots model a physical daisy chain and may be reordered
    pub fn is_chain(&self) -> bool {
        matches!(self, Self::Battery1 | Self::Battery2 | Self::Backup)
    }

    pub fn default_block_name(&self) -> &'static str {
        match self {
            Self::Utility => "PRE COMBINE",
            Self::Battery1 | Self::Battery2 => "ESS",
            Self::Backup => "BACKUP LOAD SUB PANEL",
            Self::PostSms => "POST SMS",
        }
    }

    /// Value written to a slot's `trigger` field when the section's trigger populates it
    pub fn trigger_value(&self, system: SystemNumber) -> String {
        let source = match self {
            Self::Utility => "stringCombiner",
            Self::Battery1 => "battery1",
            Self::Battery2 => "battery2",
            Self::Backup => "backup",
            Self::PostSms => "postSMS",
        };
        format!("sys{system}_{source}")
    }

    pub fn all() -> &'static [BosSection] {
        &[
            Self::Utility,
            Self::Battery1,
            Self::Battery2,
            Self::Backup,
            Self::PostSms,
        ]
    }
}

impl fmt::Display for BosSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for BosSection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "utility" => Ok(Self::Utility),
            "battery1" => Ok(Self::Battery1),
            "battery2" => Ok(Self::Battery2),
            "backup" => Ok(Self::Backup),
            "post-sms" | "postsms" => Ok(Self::PostSms),
            _ => Err(anyhow::anyhow!(
                "Unknown BOS section: '{}'. Supported sections: {}",
                s,
                Self::all()
                    .iter()
                    .map(BosSection::to_config_value)
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }
}

// ============= Slots =============

/// Equipment stored in a BOS slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotEquipment {
    pub equipment_type: String,
    #[serde(default)]
    pub make: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub amp_rating: Option<String>,
    /// New equipment (true) versus existing on site (false)
    #[serde(default = "default_true")]
    pub is_new: bool,
}

fn default_true() -> bool {
    true
}

impl SlotEquipment {
    pub fn new(equipment_type: impl Into<String>) -> Self {
        Self {
            equipment_type: equipment_type.into(),
            make: None,
            model: None,
            amp_rating: None,
            is_new: true,
        }
    }

    pub fn with_part(mut self, make: impl Into<String>, model: impl Into<String>) -> Self {
        self.make = Some(make.into());
        self.model = Some(model.into());
        self
    }

    pub fn with_amp_rating(mut self, amp_rating: impl Into<String>) -> Self {
        self.amp_rating = Some(amp_rating.into());
        self
    }
}

/// A populated position in a section, as read from the system-details record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BosSlot {
    pub section: BosSection,
    pub system: SystemNumber,
    /// 1-based slot index
    pub index: usize,
    pub equipment: SlotEquipment,
    pub trigger: Option<String>,
    pub block_name: Option<String>,
    pub active: bool,
}

impl BosSlot {
    pub fn equipment_type(&self) -> &str {
        &self.equipment.equipment_type
    }
}
