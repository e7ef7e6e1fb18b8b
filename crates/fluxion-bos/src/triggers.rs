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

//! BOS section visibility.
//!
//! A section is shown only while its triggering equipment is present in the
//! same system. Results are computed from the snapshot on every call and never
//! cached, so a stale visibility decision cannot outlive a mutation.

use fluxion_bos_types::{BosSection, SystemAttr, SystemNumber, SystemSnapshot};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Backup options that put a backup load sub panel in the system
pub const BACKUP_OPTIONS_WITH_PANEL: &[&str] = &["Whole Home", "Partial Home"];

/// Systems that must be active before the combine section appears
pub const COMBINE_MIN_ACTIVE_SYSTEMS: usize = 2;

/// Case-insensitive make/model substring requirement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentSignature {
    pub make_contains: String,
    pub model_contains: String,
}

impl EquipmentSignature {
    pub fn new(make_contains: impl Into<String>, model_contains: impl Into<String>) -> Self {
        Self {
            make_contains: make_contains.into(),
            model_contains: model_contains.into(),
        }
    }

    pub fn matches(&self, make: Option<&str>, model: Option<&str>) -> bool {
        fn contains(value: Option<&str>, needle: &str) -> bool {
            value.is_some_and(|v| v.to_lowercase().contains(&needle.to_lowercase()))
        }
        contains(make, &self.make_contains) && contains(model, &self.model_contains)
    }
}

/// Kind of equipment that triggered a section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerSource {
    StringCombinerPanel,
    MicroInverter,
    Inverter,
    Battery1,
    Battery2,
    BackupPanel,
    Sms,
}

/// Equipment whose presence makes a BOS section visible
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerEquipment {
    pub section: BosSection,
    pub system: SystemNumber,
    pub source: TriggerSource,
    pub make: Option<String>,
    pub model: Option<String>,
    pub quantity: Option<u32>,
    /// Backup option that enabled the backup section
    pub backup_option: Option<String>,
}

impl TriggerEquipment {
    fn new(section: BosSection, system: SystemNumber, source: TriggerSource) -> Self {
        Self {
            section,
            system,
            source,
            make: None,
            model: None,
            quantity: None,
            backup_option: None,
        }
    }

    fn with_part(mut self, make: Option<&str>, model: Option<&str>) -> Self {
        self.make = make.map(str::to_owned);
        self.model = model.map(str::to_owned);
        self
    }

    /// Value written to the `trigger` field of slots populated for this section
    pub fn trigger_value(&self) -> String {
        self.section.trigger_value(self.system)
    }
}

/// Decides BOS section visibility from a system snapshot
#[derive(Debug, Clone, Default)]
pub struct TriggerResolver {
    signatures: HashMap<BosSection, EquipmentSignature>,
}

impl TriggerResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Additionally require the section's trigger equipment to match `signature`
    pub fn with_signature(mut self, section: BosSection, signature: EquipmentSignature) -> Self {
        self.signatures.insert(section, signature);
        self
    }

    pub fn is_section_visible(
        &self,
        section: BosSection,
        system: SystemNumber,
        snapshot: &SystemSnapshot,
    ) -> bool {
        self.get_trigger_equipment(section, system, snapshot)
            .is_some()
    }

    /// The equipment that makes `section` visible, or `None` when hidden
    pub fn get_trigger_equipment(
        &self,
        section: BosSection,
        system: SystemNumber,
        snapshot: &SystemSnapshot,
    ) -> Option<TriggerEquipment> {
        let found = match section {
            BosSection::Utility => utility_trigger(system, snapshot),
            BosSection::Battery1 => battery_trigger(
                section,
                system,
                snapshot,
                TriggerSource::Battery1,
                [
                    SystemAttr::Battery1Make,
                    SystemAttr::Battery1Model,
                    SystemAttr::Battery1Quantity,
                ],
            ),
            BosSection::Battery2 => battery_trigger(
                section,
                system,
                snapshot,
                TriggerSource::Battery2,
                [
                    SystemAttr::Battery2Make,
                    SystemAttr::Battery2Model,
                    SystemAttr::Battery2Quantity,
                ],
            ),
            BosSection::Backup => backup_trigger(system, snapshot),
            BosSection::PostSms => sms_trigger(system, snapshot),
        }?;

        match self.signatures.get(&section) {
            Some(signature) if !signature.matches(found.make.as_deref(), found.model.as_deref()) => {
                None
            }
            _ => Some(found),
        }
    }

    /// Sections of `system` that are currently visible, in display order
    pub fn visible_sections(
        &self,
        system: SystemNumber,
        snapshot: &SystemSnapshot,
    ) -> Vec<BosSection> {
        BosSection::all()
            .iter()
            .copied()
            .filter(|section| self.is_section_visible(*section, system, snapshot))
            .collect()
    }
}

fn utility_trigger(system: SystemNumber, snapshot: &SystemSnapshot) -> Option<TriggerEquipment> {
    let section = BosSection::Utility;
    let combiner = (
        snapshot.attr_text(system, SystemAttr::StringCombinerPanelMake),
        snapshot.attr_text(system, SystemAttr::StringCombinerPanelModel),
    );
    if let (Some(make), Some(model)) = combiner {
        return Some(
            TriggerEquipment::new(section, system, TriggerSource::StringCombinerPanel)
                .with_part(Some(make), Some(model)),
        );
    }

    let micro = (
        snapshot.attr_text(system, SystemAttr::MicroInverterMake),
        snapshot.attr_text(system, SystemAttr::MicroInverterModel),
    );
    let (source, make, model, qty_attr) = if micro.0.is_some() {
        (
            TriggerSource::MicroInverter,
            micro.0,
            micro.1,
            SystemAttr::MicroInverterQuantity,
        )
    } else {
        (
            TriggerSource::Inverter,
            snapshot.attr_text(system, SystemAttr::InverterMake),
            snapshot.attr_text(system, SystemAttr::InverterModel),
            SystemAttr::InverterQuantity,
        )
    };

    let (make, model) = (make?, model?);
    let mut trigger = TriggerEquipment::new(section, system, source).with_part(Some(make), Some(model));
    let qty = snapshot.attr_quantity(system, qty_attr);
    trigger.quantity = (qty > 0).then_some(qty);
    Some(trigger)
}

fn battery_trigger(
    section: BosSection,
    system: SystemNumber,
    snapshot: &SystemSnapshot,
    source: TriggerSource,
    [make, model, quantity]: [SystemAttr; 3],
) -> Option<TriggerEquipment> {
    let qty = snapshot.attr_quantity(system, quantity);
    if qty == 0 {
        return None;
    }
    let mut trigger = TriggerEquipment::new(section, system, source).with_part(
        snapshot.attr_text(system, make),
        snapshot.attr_text(system, model),
    );
    trigger.quantity = Some(qty);
    Some(trigger)
}

fn backup_trigger(system: SystemNumber, snapshot: &SystemSnapshot) -> Option<TriggerEquipment> {
    let option = snapshot.attr_text(system, SystemAttr::BackupOption)?;
    if !BACKUP_OPTIONS_WITH_PANEL.contains(&option) {
        return None;
    }
    let mut trigger = TriggerEquipment::new(BosSection::Backup, system, TriggerSource::BackupPanel)
        .with_part(
            snapshot.attr_text(system, SystemAttr::BackupPanelMake),
            snapshot.attr_text(system, SystemAttr::BackupPanelModel),
        );
    trigger.backup_option = Some(option.to_owned());
    Some(trigger)
}

fn sms_trigger(system: SystemNumber, snapshot: &SystemSnapshot) -> Option<TriggerEquipment> {
    let make = snapshot.attr_text(system, SystemAttr::SmsMake);
    let model = snapshot.attr_text(system, SystemAttr::SmsModel);
    let has_sms = make.is_some() && model.is_some();
    // An explicit "has SMS" answer shows the section before a part is picked
    let declared = snapshot.attr_flag(system, SystemAttr::NoSms) == Some(false);
    (has_sms || declared).then(|| {
        TriggerEquipment::new(BosSection::PostSms, system, TriggerSource::Sms).with_part(make, model)
    })
}

/// A system counts as active once any generation or storage equipment is entered
pub fn is_system_active(system: SystemNumber, snapshot: &SystemSnapshot) -> bool {
    snapshot
        .attr_text(system, SystemAttr::SolarPanelMake)
        .is_some()
        || snapshot
            .attr_text(system, SystemAttr::MicroInverterMake)
            .is_some()
        || snapshot.attr_text(system, SystemAttr::InverterMake).is_some()
        || snapshot.attr_quantity(system, SystemAttr::Battery1Quantity) > 0
        || snapshot.attr_quantity(system, SystemAttr::Battery2Quantity) > 0
}

pub fn active_system_count(snapshot: &SystemSnapshot) -> usize {
    SystemNumber::all()
        .filter(|system| is_system_active(*system, snapshot))
        .count()
}

/// The project-wide combine section appears once two systems are active
pub fn is_combine_visible(snapshot: &SystemSnapshot) -> bool {
    active_system_count(snapshot) >= COMBINE_MIN_ACTIVE_SYSTEMS
}
