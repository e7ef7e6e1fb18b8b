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

pub mod attributes;
pub mod bos;
pub mod catalog;
pub mod configuration;
pub mod fields;

// Re-export common types for convenience
pub use attributes::{ChargingSource, CouplingType, SystemAttributes, SystemNumber, UtilityContext};
pub use bos::{BosSection, BosSlot, SlotEquipment};
pub use catalog::{CatalogEntry, equipment_types};
pub use configuration::{
    ConfigurationId, ConfigurationRecord, MeterConfiguration, ProductionMetering,
    RequiredEquipment, SectionVisibility, UtilityMeter,
};
pub use fields::{FieldPatch, SlotField, SystemAttr, SystemSnapshot};
