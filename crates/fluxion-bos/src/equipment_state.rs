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

use crate::slots::BosSlotStore;
use crate::triggers::EquipmentSignature;
use fluxion_bos_types::{
    BosSection, SlotEquipment, SystemAttr, SystemNumber, SystemSnapshot, UtilityContext,
};
use serde::{Deserialize, Serialize};

/// Placeholder make some clients store instead of leaving the SMS empty
pub const NO_SMS_PLACEHOLDER: &str = "No SMS";

/// Make and model of one piece of equipment, either possibly missing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartRef {
    pub make: Option<String>,
    pub model: Option<String>,
}

impl PartRef {
    pub fn new(make: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            make: Some(make.into()),
            model: Some(model.into()),
        }
    }

    fn read(snapshot: &SystemSnapshot, system: SystemNumber, make: SystemAttr, model: SystemAttr) -> Self {
        Self {
            make: snapshot.attr_text(system, make).map(str::to_owned),
            model: snapshot.attr_text(system, model).map(str::to_owned),
        }
    }

    /// Both make and model entered
    pub fn is_complete(&self) -> bool {
        self.make.is_some() && self.model.is_some()
    }

    pub fn matches(&self, signature: &EquipmentSignature) -> bool {
        signature.matches(self.make.as_deref(), self.model.as_deref())
    }
}

/// Equipment of one system as seen by auto-configuration rules
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentState {
    pub system: Option<SystemNumber>,
    pub utility_name: String,
    pub has_solar_panels: bool,
    pub solar_panel: PartRef,
    pub micro_inverter: PartRef,
    pub inverter: PartRef,
    pub sms: PartRef,
    pub battery1: PartRef,
    pub battery1_quantity: u32,
    pub backup_option: Option<String>,
    /// Equipment already in the utility BOS section
    pub existing_utility_bos: Vec<SlotEquipment>,
    /// Equipment already in the post-SMS BOS section
    pub existing_battery_bos: Vec<SlotEquipment>,
}

impl EquipmentState {
    /// Read one system's equipment and its current BOS from a snapshot
    pub fn from_snapshot(
        snapshot: &SystemSnapshot,
        system: SystemNumber,
        utility: &UtilityContext,
        store: &BosSlotStore,
    ) -> Self {
        let solar_panel = PartRef::read(
            snapshot,
            system,
            SystemAttr::SolarPanelMake,
            SystemAttr::SolarPanelModel,
        );
        let mut sms = PartRef::read(snapshot, system, SystemAttr::SmsMake, SystemAttr::SmsModel);
        if sms
            .make
            .as_deref()
            .is_some_and(|make| make.eq_ignore_ascii_case(NO_SMS_PLACEHOLDER))
        {
            sms = PartRef::default();
        }

        let existing = |section: BosSection| -> Vec<SlotEquipment> {
            store
                .list_populated(snapshot, section, system)
                .into_iter()
                .map(|slot| slot.equipment)
                .collect()
        };

        Self {
            system: Some(system),
            utility_name: utility.name.clone(),
            has_solar_panels: solar_panel.make.is_some()
                || snapshot.attr_quantity(system, SystemAttr::SolarPanelQuantity) > 0,
            solar_panel,
            micro_inverter: PartRef::read(
                snapshot,
                system,
                SystemAttr::MicroInverterMake,
                SystemAttr::MicroInverterModel,
            ),
            inverter: PartRef::read(
                snapshot,
                system,
                SystemAttr::InverterMake,
                SystemAttr::InverterModel,
            ),
            sms,
            battery1: PartRef::read(
                snapshot,
                system,
                SystemAttr::Battery1Make,
                SystemAttr::Battery1Model,
            ),
            battery1_quantity: snapshot.attr_quantity(system, SystemAttr::Battery1Quantity),
            backup_option: snapshot
                .attr_text(system, SystemAttr::BackupOption)
                .map(str::to_owned),
            existing_utility_bos: existing(BosSection::Utility),
            existing_battery_bos: existing(BosSection::PostSms),
        }
    }

    /// Solar panels plus a complete micro-inverter or string-inverter entry
    pub fn has_solar_path(&self) -> bool {
        self.has_solar_panels && (self.micro_inverter.is_complete() || self.inverter.is_complete())
    }

    /// Whether `equipment_type` is already in the utility or battery BOS list
    pub fn has_existing(&self, equipment_type: &str, utility_side: bool) -> bool {
        let list = if utility_side {
            &self.existing_utility_bos
        } else {
            &self.existing_battery_bos
        };
        list.iter().any(|item| item.equipment_type == equipment_type)
    }
}
