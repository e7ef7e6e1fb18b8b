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

use fluxion_bos_types::{
    ConfigurationId, ConfigurationRecord, MeterConfiguration, ProductionMetering,
    RequiredEquipment, SectionVisibility, UtilityMeter,
};
use std::collections::BTreeMap;

const NOTHING: RequiredEquipment = RequiredEquipment {
    solar_panels: false,
    battery_quantity: 0,
    battery_types: 0,
    grid_following_inverter: 0,
    grid_forming_following_inverter: 0,
    hybrid_inverter: 0,
    backup_load_panel: false,
    automatic_disconnect_switch: false,
    transfer_switch: false,
    battery_charger: false,
    dedicated_der_combiner: false,
    bi_directional_meters: 0,
    uni_directional_meters: 0,
    peak_shaving: false,
};

/// Equipment panels a configuration can show
#[derive(Clone, Copy)]
enum Panel {
    Solar,
    Inverter,
    Battery1,
    BatteryCombiner,
    BackupSub,
    Gateway,
    Ess,
    StringCombiner,
}

fn visible(panels: &[Panel], bos_slots: usize) -> SectionVisibility {
    let mut sections = SectionVisibility::default();
    for panel in panels {
        match panel {
            Panel::Solar => sections.solar = true,
            Panel::Inverter => sections.inverter = true,
            Panel::Battery1 => sections.battery1 = true,
            Panel::BatteryCombiner => sections.battery_combiner_panel = true,
            Panel::BackupSub => sections.backup_load_sub_panel = true,
            Panel::Gateway => sections.gateway = true,
            Panel::Ess => sections.ess = true,
            Panel::StringCombiner => sections.string_combiner_panel = true,
        }
    }
    for slot in sections.bos_types.iter_mut().take(bos_slots) {
        *slot = true;
    }
    sections
}

fn meters(production_metering: ProductionMetering) -> MeterConfiguration {
    MeterConfiguration {
        utility_meter: UtilityMeter::BiDirectional,
        production_metering,
        meter_test_block: false,
    }
}

fn record(
    id: ConfigurationId,
    name: &str,
    description: &str,
    required_equipment: RequiredEquipment,
    sections: SectionVisibility,
    meters: MeterConfiguration,
    notes: &[&str],
) -> ConfigurationRecord {
    ConfigurationRecord {
        id,
        name: name.to_owned(),
        description: description.to_owned(),
        required_equipment,
        sections,
        meters,
        notes: notes.iter().map(|n| (*n).to_owned()).collect(),
    }
}

fn build(id: ConfigurationId) -> ConfigurationRecord {
    use ConfigurationId as Id;
    use Panel::{
        Battery1, BatteryCombiner, BackupSub, Ess, Gateway, Inverter, Solar, StringCombiner,
    };
    use ProductionMetering::{Both, DerSide, LineSide, None as Unmetered};

    match id {
        Id::A1 => record(
            id,
            "AC Coupled A-1",
            "Battery charged from grid only with backup power capability",
            RequiredEquipment {
                battery_quantity: 1,
                battery_types: 1,
                grid_forming_following_inverter: 1,
                backup_load_panel: true,
                automatic_disconnect_switch: true,
                bi_directional_meters: 3,
                ..NOTHING
            },
            visible(&[Inverter, Battery1, BackupSub, Gateway, Ess], 3),
            meters(Both),
            &[
                "Battery charges from grid only",
                "Provides backup power during outages",
                "Requires ADS for grid isolation",
                "No solar PV in this configuration",
            ],
        ),
        Id::A2 => record(
            id,
            "AC Coupled A-2",
            "Battery charged from grid only with Power Control System (PCS/curtailment)",
            RequiredEquipment {
                battery_quantity: 1,
                battery_types: 1,
                grid_following_inverter: 1,
                bi_directional_meters: 2,
                peak_shaving: true,
                ..NOTHING
            },
            visible(&[Inverter, Battery1, Ess], 2),
            meters(DerSide),
            &[
                "Battery charges from grid only",
                "Provides customer load curtailment/PCS",
                "System shuts down during grid outage",
                "Used for peak shaving and load shifting",
            ],
        ),
        Id::B1 => record(
            id,
            "AC Coupled B-1",
            "Battery charged from grid or renewable with multiple batteries (qty > 1) and backup",
            RequiredEquipment {
                solar_panels: true,
                battery_quantity: 2,
                battery_types: 1,
                grid_following_inverter: 1,
                grid_forming_following_inverter: 2,
                backup_load_panel: true,
                automatic_disconnect_switch: true,
                dedicated_der_combiner: true,
                bi_directional_meters: 1,
                uni_directional_meters: 2,
                ..NOTHING
            },
            visible(
                &[
                    Solar,
                    Inverter,
                    Battery1,
                    BatteryCombiner,
                    BackupSub,
                    Gateway,
                    Ess,
                    StringCombiner,
                ],
                4,
            ),
            meters(Both),
            &[
                "Multiple battery units of the same type (quantity > 1)",
                "Includes solar PV array",
                "Provides backup power during outages",
                "Requires dedicated DER combiner panel for multiple batteries",
            ],
        ),
        Id::B2 => record(
            id,
            "AC Coupled B-2",
            "Battery charged from grid or renewable with PCS (curtailment)",
            RequiredEquipment {
                solar_panels: true,
                battery_quantity: 1,
                battery_types: 1,
                grid_following_inverter: 2,
                bi_directional_meters: 1,
                uni_directional_meters: 1,
                peak_shaving: true,
                ..NOTHING
            },
            visible(&[Solar, Inverter, Battery1, Ess], 2),
            meters(LineSide),
            &[
                "Single battery system",
                "Includes solar PV array",
                "Provides customer load curtailment/PCS",
                "System shuts down during grid outage",
            ],
        ),
        Id::B3 => record(
            id,
            "AC Coupled B-3",
            "Battery charged from grid or renewable with single battery and backup",
            RequiredEquipment {
                solar_panels: true,
                battery_quantity: 1,
                battery_types: 1,
                grid_following_inverter: 1,
                grid_forming_following_inverter: 1,
                backup_load_panel: true,
                automatic_disconnect_switch: true,
                bi_directional_meters: 1,
                uni_directional_meters: 1,
                ..NOTHING
            },
            visible(&[Solar, Inverter, Battery1, BackupSub, Gateway, Ess], 3),
            meters(LineSide),
            &[
                "Single battery system",
                "Includes solar PV array",
                "Provides backup power during outages",
                "Requires ADS for grid isolation",
            ],
        ),
        Id::B4 => record(
            id,
            "AC Coupled B-4",
            "Battery charged from grid or renewable (standard configuration)",
            RequiredEquipment {
                solar_panels: true,
                battery_quantity: 1,
                battery_types: 1,
                grid_following_inverter: 2,
                dedicated_der_combiner: true,
                bi_directional_meters: 1,
                uni_directional_meters: 1,
                ..NOTHING
            },
            visible(&[Solar, Inverter, Battery1, BatteryCombiner, Ess], 2),
            meters(Both),
            &[
                "Standard configuration",
                "No backup power capability",
                "No PCS/curtailment",
                "Includes dedicated DER combiner panel",
            ],
        ),
        Id::B5 => record(
            id,
            "AC Coupled B-5",
            "Battery charged from grid or renewable with multiple batteries (qty > 1) and PCS",
            RequiredEquipment {
                solar_panels: true,
                battery_quantity: 2,
                battery_types: 1,
                grid_following_inverter: 2,
                bi_directional_meters: 1,
                uni_directional_meters: 1,
                peak_shaving: true,
                ..NOTHING
            },
            visible(&[Solar, Inverter, Battery1, Ess], 2),
            meters(LineSide),
            &[
                "Multiple battery units of the same type (quantity > 1)",
                "Includes solar PV array",
                "Provides customer load curtailment/PCS",
                "Two utility disconnects required",
            ],
        ),
        Id::C1 => record(
            id,
            "DC Coupled Hybrid C-1",
            "DC coupled hybrid system with peak shaving capability",
            RequiredEquipment {
                solar_panels: true,
                battery_quantity: 1,
                battery_types: 1,
                hybrid_inverter: 1,
                backup_load_panel: true,
                bi_directional_meters: 2,
                uni_directional_meters: 2,
                peak_shaving: true,
                ..NOTHING
            },
            visible(&[Solar, Inverter, Battery1, BackupSub, Ess], 3),
            meters(Both),
            &[
                "DC coupled system with hybrid inverter",
                "Battery may provide peak shaving",
                "Optional backup load equipment",
                "PV array directly connected to hybrid inverter",
            ],
        ),
        Id::C2 => record(
            id,
            "DC Coupled Hybrid C-2",
            "DC coupled hybrid system with peak shaving and backup power",
            RequiredEquipment {
                solar_panels: true,
                battery_quantity: 1,
                battery_types: 1,
                hybrid_inverter: 1,
                backup_load_panel: true,
                automatic_disconnect_switch: true,
                bi_directional_meters: 2,
                peak_shaving: true,
                ..NOTHING
            },
            visible(&[Solar, Inverter, Battery1, BackupSub, Gateway, Ess], 3),
            meters(DerSide),
            &[
                "DC coupled system with hybrid inverter",
                "Provides backup power during outages",
                "Battery may provide peak shaving",
                "Requires ADS for grid isolation",
            ],
        ),
        Id::D => record(
            id,
            "Standby Battery Configuration",
            "Standby battery system without renewable energy sources",
            RequiredEquipment {
                battery_quantity: 1,
                battery_types: 1,
                grid_forming_following_inverter: 1,
                backup_load_panel: true,
                transfer_switch: true,
                battery_charger: true,
                ..NOTHING
            },
            visible(&[Inverter, Battery1, BackupSub, Gateway], 1),
            meters(Unmetered),
            &[
                "Standby battery only - no solar",
                "Includes battery charger",
                "Requires transfer switch",
                "Provides backup power during outages",
            ],
        ),
        Id::NoBos => record(
            id,
            "No BOS Required",
            "Utility does not require BOS equipment - custom configuration only",
            NOTHING,
            visible(&[], 0),
            meters(Unmetered),
            &[
                "This utility does not require BOS equipment",
                "Configure equipment manually as needed",
            ],
        ),
        Id::PvUtility => record(
            id,
            "PV-Only System",
            "Solar PV system without battery storage - uses utility-specific BOS requirements",
            RequiredEquipment {
                solar_panels: true,
                grid_following_inverter: 1,
                bi_directional_meters: 1,
                ..NOTHING
            },
            visible(&[Solar, Inverter, StringCombiner], 0),
            meters(LineSide),
            &[
                "PV-only system without battery storage",
                "Uses utility-specific BOS requirements",
                "No backup power capability",
            ],
        ),
        Id::UtilityDefaultEss => record(
            id,
            "Utility Default ESS",
            "Standard ESS configuration for utilities without specific ESS requirements",
            RequiredEquipment {
                solar_panels: true,
                battery_quantity: 1,
                battery_types: 1,
                grid_following_inverter: 1,
                grid_forming_following_inverter: 1,
                backup_load_panel: true,
                automatic_disconnect_switch: true,
                bi_directional_meters: 1,
                uni_directional_meters: 1,
                ..NOTHING
            },
            visible(
                &[Solar, Inverter, Battery1, BackupSub, Gateway, Ess, StringCombiner],
                0,
            ),
            meters(Both),
            &[
                "Standard ESS configuration",
                "Uses utility-specific BOS requirements",
                "Suitable for utilities without custom ESS configurations",
            ],
        ),
        Id::Invalid => record(
            id,
            "Invalid Configuration",
            "Unable to determine valid configuration from provided inputs",
            NOTHING,
            visible(&[], 0),
            meters(Unmetered),
            &[
                "Please check input parameters",
                "Ensure all required fields are provided",
            ],
        ),
    }
}

/// Immutable records for every configuration id
#[derive(Debug, Clone)]
pub struct ConfigurationCatalog {
    records: BTreeMap<ConfigurationId, ConfigurationRecord>,
    invalid: ConfigurationRecord,
}

impl Default for ConfigurationCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigurationCatalog {
    pub fn new() -> Self {
        Self {
            records: ConfigurationId::all()
                .iter()
                .map(|id| (*id, build(*id)))
                .collect(),
            invalid: build(ConfigurationId::Invalid),
        }
    }

    /// Record for `id`; never fails
    pub fn get(&self, id: ConfigurationId) -> &ConfigurationRecord {
        self.records.get(&id).unwrap_or(&self.invalid)
    }

    /// Lookup by textual id; unknown ids resolve to the INVALID record
    pub fn get_by_name(&self, id: &str) -> &ConfigurationRecord {
        self.get(id.parse().unwrap_or(ConfigurationId::Invalid))
    }

    pub fn records(&self) -> impl Iterator<Item = &ConfigurationRecord> {
        self.records.values()
    }

    /// Installer checklist derived from the required-equipment bill
    pub fn suggest_equipment(&self, id: ConfigurationId) -> Vec<String> {
        suggest_equipment(&self.get(id).required_equipment)
    }
}

pub fn suggest_equipment(bill: &RequiredEquipment) -> Vec<String> {
    let mut suggestions = Vec::new();

    if bill.solar_panels {
        suggestions.push("Add solar panel array".to_owned());
    }

    match bill.battery_quantity {
        0 => {}
        1 => suggestions.push("Add single battery system (quantity: 1)".to_owned()),
        qty => {
            suggestions.push(format!(
                "Add multiple units of the same battery type (quantity: {qty})"
            ));
            if bill.dedicated_der_combiner {
                suggestions.push("Add dedicated DER combiner panel for multiple batteries".to_owned());
            }
        }
    }

    if bill.hybrid_inverter > 0 {
        suggestions.push("Add hybrid inverter (DC coupled system)".to_owned());
    } else if bill.grid_forming_following_inverter > 0 {
        suggestions.push(format!(
            "Add {} grid forming/following inverter(s)",
            bill.grid_forming_following_inverter
        ));
    }

    if bill.grid_following_inverter > 0 {
        suggestions.push(format!(
            "Add {} grid following inverter(s)",
            bill.grid_following_inverter
        ));
    }

    let flags = [
        (bill.backup_load_panel, "Add backup load panel"),
        (
            bill.automatic_disconnect_switch,
            "Add automatic disconnect switch (ADS) for grid isolation",
        ),
        (bill.transfer_switch, "Add automatic/manual transfer switch"),
        (bill.battery_charger, "Add battery charger"),
    ];
    suggestions.extend(
        flags
            .iter()
            .filter(|(required, _)| *required)
            .map(|(_, text)| (*text).to_owned()),
    );

    suggestions.push(format!(
        "Install {} bi-directional meter(s)",
        bill.bi_directional_meters
    ));
    if bill.uni_directional_meters > 0 {
        suggestions.push(format!(
            "Install {} uni-directional meter(s)",
            bill.uni_directional_meters
        ));
    }

    suggestions
}
