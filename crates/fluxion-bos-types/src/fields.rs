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

//! Flat system-details record and its field-name schema.
//!
//! The persisted record is a string-keyed map. Every key the engine reads or
//! writes is produced here, so the naming scheme lives in one place:
//!
//! - system fields: `sys{N}_{name}`
//! - utility BOS: `bos_sys{N}_type{slot}_{attr}`
//! - battery / backup BOS: `bos_sys{N}_{section}_type{slot}_{attr}`
//! - post-SMS BOS: `post_sms_bos_sys{N}_type{slot}_{attr}`

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::attributes::SystemNumber;
use crate::bos::BosSection;

// ============= Field Descriptors =============

/// Attributes persisted for every BOS slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotField {
    EquipmentType,
    Make,
    Model,
    AmpRating,
    IsNew,
    Active,
    Trigger,
    BlockName,
}

impl SlotField {
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::EquipmentType => "equipment_type",
            Self::Make => "make",
            Self::Model => "model",
            Self::AmpRating => "amp_rating",
            Self::IsNew => "is_new",
            Self::Active => "active",
            Self::Trigger => "trigger",
            Self::BlockName => "block_name",
        }
    }

    /// Fields that exist for a section (battery sections have no `active`)
    pub fn for_section(section: BosSection) -> &'static [SlotField] {
        const WITH_ACTIVE: &[SlotField] = &[
            SlotField::EquipmentType,
            SlotField::Make,
            SlotField::Model,
            SlotField::AmpRating,
            SlotField::IsNew,
            SlotField::Active,
            SlotField::Trigger,
            SlotField::BlockName,
        ];
        const WITHOUT_ACTIVE: &[SlotField] = &[
            SlotField::EquipmentType,
            SlotField::Make,
            SlotField::Model,
            SlotField::AmpRating,
            SlotField::IsNew,
            SlotField::Trigger,
            SlotField::BlockName,
        ];
        if section.has_active_flag() {
            WITH_ACTIVE
        } else {
            WITHOUT_ACTIVE
        }
    }

    /// Canonical record key for `(section, system, slot, attribute)`
    pub fn key(&self, section: BosSection, system: SystemNumber, slot: usize) -> String {
        format!("{}_{}", slot_stem(section, system, slot), self.suffix())
    }
}

fn slot_stem(section: BosSection, system: SystemNumber, slot: usize) -> String {
    match section {
        BosSection::Utility => format!("bos_sys{system}_type{slot}"),
        BosSection::Battery1 => format!("bos_sys{system}_battery1_type{slot}"),
        BosSection::Battery2 => format!("bos_sys{system}_battery2_type{slot}"),
        BosSection::Backup => format!("bos_sys{system}_backup_type{slot}"),
        BosSection::PostSms => format!("post_sms_bos_sys{system}_type{slot}"),
    }
}

/// System-scoped field key, e.g. `sys1_battery1_qty`
pub fn system_field(system: SystemNumber, name: &str) -> String {
    format!("sys{system}_{name}")
}

/// System-scoped equipment attributes read by the engine.
///
/// Clients have written several spellings over time; `names()` lists every
/// accepted one, canonical first. Writes always use the canonical name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemAttr {
    SolarPanelMake,
    SolarPanelModel,
    SolarPanelQuantity,
    MicroInverterMake,
    MicroInverterModel,
    MicroInverterQuantity,
    InverterMake,
    InverterModel,
    InverterQuantity,
    InverterMaxContinuousOutput,
    StringCombinerPanelMake,
    StringCombinerPanelModel,
    Battery1Make,
    Battery1Model,
    Battery1Quantity,
    Battery1MaxContinuousOutput,
    Battery2Make,
    Battery2Model,
    Battery2Quantity,
    BatteryChargingSource,
    CouplingType,
    BackupOption,
    BackupPanelMake,
    BackupPanelModel,
    SmsMake,
    SmsModel,
    NoSms,
    GatewayMake,
    GatewayModel,
}

impl SystemAttr {
    pub fn names(&self) -> &'static [&'static str] {
        match self {
            Self::SolarPanelMake => &["solar_panel_make"],
            Self::SolarPanelModel => &["solar_panel_model"],
            Self::SolarPanelQuantity => &["solar_panel_qty", "solar_panel_quantity"],
            Self::MicroInverterMake => &["micro_inverter_make"],
            Self::MicroInverterModel => &["micro_inverter_model"],
            Self::MicroInverterQuantity => &["micro_inverter_qty", "micro_inverter_quantity"],
            Self::InverterMake => &["inverter_make"],
            Self::InverterModel => &["inverter_model"],
            Self::InverterQuantity => &["inverter_qty", "inverter_quantity"],
            Self::InverterMaxContinuousOutput => &["inverter_max_continuous_output"],
            Self::StringCombinerPanelMake => &["string_combiner_panel_make"],
            Self::StringCombinerPanelModel => &["string_combiner_panel_model"],
            Self::Battery1Make => &["battery1_make", "battery_1_make"],
            Self::Battery1Model => &["battery1_model", "battery_1_model"],
            Self::Battery1Quantity => &["battery1_qty", "battery_1_qty", "battery_type1_quantity"],
            Self::Battery1MaxContinuousOutput => &["battery_1_max_continuous_output"],
            Self::Battery2Make => &["battery2_make", "battery_2_make"],
            Self::Battery2Model => &["battery2_model", "battery_2_model"],
            Self::Battery2Quantity => &["battery2_qty", "battery_2_qty", "battery_type2_quantity"],
            Self::BatteryChargingSource => &["battery_charging_source"],
            Self::CouplingType => &["coupling_type", "couple_type"],
            Self::BackupOption => &["backup_option", "ess_backup_option"],
            Self::BackupPanelMake => &["backup_panel_make", "backup_load_sub_panel_make"],
            Self::BackupPanelModel => &["backup_panel_model", "backup_load_sub_panel_model"],
            Self::SmsMake => &["sms_make"],
            Self::SmsModel => &["sms_model"],
            Self::NoSms => &["no_sms"],
            Self::GatewayMake => &["gateway_make"],
            Self::GatewayModel => &["gateway_model"],
        }
    }

    /// Canonical key for this attribute in `system`
    pub fn key(&self, system: SystemNumber) -> String {
        system_field(system, self.names()[0])
    }

    /// Every accepted key for this attribute in `system`
    pub fn keys(&self, system: SystemNumber) -> impl Iterator<Item = String> + '_ {
        self.names()
            .iter()
            .map(move |name| system_field(system, name))
    }
}

// ============= Snapshot =============

/// Read-only view of the externally owned system-details record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SystemSnapshot {
    fields: BTreeMap<String, Value>,
}

impl SystemSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Non-empty, trimmed string value
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.fields.get(key) {
            Some(Value::String(s)) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then_some(trimmed)
            }
            _ => None,
        }
    }

    /// String or number rendered as text (amp ratings are stored either way)
    pub fn display(&self, key: &str) -> Option<String> {
        match self.fields.get(key) {
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::String(_)) => self.text(key).map(str::to_owned),
            _ => None,
        }
    }

    /// Numeric value, accepting numeric strings
    pub fn number(&self, key: &str) -> Option<f64> {
        match self.fields.get(key) {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Boolean value, accepting "true"/"false" strings and 0/1
    pub fn flag(&self, key: &str) -> Option<bool> {
        match self.fields.get(key) {
            Some(Value::Bool(b)) => Some(*b),
            Some(Value::String(s)) => match s.trim().to_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            Some(Value::Number(n)) => n.as_i64().map(|v| v != 0),
            _ => None,
        }
    }

    /// First non-empty text among an attribute's accepted spellings
    pub fn attr_text(&self, system: SystemNumber, attr: SystemAttr) -> Option<&str> {
        attr.names()
            .iter()
            .find_map(|name| self.text(&system_field(system, name)))
    }

    pub fn attr_number(&self, system: SystemNumber, attr: SystemAttr) -> Option<f64> {
        attr.names()
            .iter()
            .find_map(|name| self.number(&system_field(system, name)))
    }

    pub fn attr_flag(&self, system: SystemNumber, attr: SystemAttr) -> Option<bool> {
        attr.names()
            .iter()
            .find_map(|name| self.flag(&system_field(system, name)))
    }

    /// Whole-unit quantity; missing, negative or unparsable values read as 0
    pub fn attr_quantity(&self, system: SystemNumber, attr: SystemAttr) -> u32 {
        self.attr_number(system, attr)
            .filter(|q| *q > 0.0)
            .map_or(0, |q| q.trunc() as u32)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Apply a patch the way the persistence collaborator would
    pub fn apply(&mut self, patch: &FieldPatch) {
        for (key, value) in patch.iter() {
            if value.is_null() {
                self.fields.remove(key);
            } else {
                self.fields.insert(key.to_owned(), value.clone());
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<BTreeMap<String, Value>> for SystemSnapshot {
    fn from(fields: BTreeMap<String, Value>) -> Self {
        Self { fields }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for SystemSnapshot {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// ============= Patch =============

/// Partial field mutation handed to the persistence collaborator.
/// A `null` value clears the field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPatch {
    fields: BTreeMap<String, Value>,
}

impl FieldPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn clear(&mut self, key: impl Into<String>) {
        self.fields.insert(key.into(), Value::Null);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Later patches win on conflicting keys
    pub fn merge(&mut self, other: FieldPatch) {
        self.fields.extend(other.fields);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Drop entries the snapshot already holds, so re-applying a patch is a no-op
    pub fn without_noops(self, snapshot: &SystemSnapshot) -> FieldPatch {
        let fields = self
            .fields
            .into_iter()
            .filter(|(key, value)| match snapshot.get(key) {
                Some(current) => current != value,
                None => !value.is_null(),
            })
            .collect();
        FieldPatch { fields }
    }
}
