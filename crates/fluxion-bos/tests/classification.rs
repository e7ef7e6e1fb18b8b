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

//! End-to-end classification: questionnaire answers -> configuration record

use fluxion_bos::{ConfigurationCatalog, ConfigurationClassifier, validate_inputs};
use fluxion_bos_types::{
    ChargingSource, ConfigurationId, CouplingType, SystemAttributes, UtilityContext,
};

fn aps_standard() -> UtilityContext {
    UtilityContext {
        name: "APS".to_owned(),
        bos_combination: "Standard".to_owned(),
        supports_ess: true,
        bos_requirements: Vec::new(),
    }
}

fn ac_grid_or_renewable(backup: bool, multiple: bool) -> SystemAttributes {
    SystemAttributes {
        utility: aps_standard(),
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
fn test_single_battery_with_backup_is_b3() {
    let attrs = ac_grid_or_renewable(true, false);
    assert!(validate_inputs(&attrs).is_empty());

    let classifier = ConfigurationClassifier::default();
    let id = classifier.classify(&attrs);
    assert_eq!(id, ConfigurationId::B3);

    let catalog = ConfigurationCatalog::new();
    let record = catalog.get(id);
    assert_eq!(record.id, ConfigurationId::B3);
    assert!(record.sections.battery1);
}

#[test]
fn test_single_battery_without_backup_is_b4_not_b2() {
    let id = ConfigurationClassifier::default().classify(&ac_grid_or_renewable(false, false));
    assert_eq!(id, ConfigurationId::B4);
    assert_ne!(id, ConfigurationId::B2);
}

#[test]
fn test_every_answer_combination_resolves_to_catalog_record() {
    let classifier = ConfigurationClassifier::default();
    let catalog = ConfigurationCatalog::new();

    for backup in [true, false] {
        for multiple in [true, false] {
            for coupling in CouplingType::all() {
                for source in ChargingSource::all() {
                    let attrs = SystemAttributes {
                        coupling: Some(*coupling),
                        charging_source: Some(*source),
                        ..ac_grid_or_renewable(backup, multiple)
                    };
                    let id = classifier.classify(&attrs);
                    assert_eq!(catalog.get(id).id, id);
                    assert_ne!(id, ConfigurationId::B2);
                }
            }
        }
    }
}

#[test]
fn test_utility_without_ess_table_gets_default() {
    let mut attrs = ac_grid_or_renewable(true, true);
    attrs.utility.name = "SRP".to_owned();
    assert_eq!(
        ConfigurationClassifier::default().classify(&attrs),
        ConfigurationId::UtilityDefaultEss
    );

    attrs.utility.bos_combination = "No BOS".to_owned();
    assert_eq!(
        ConfigurationClassifier::default().classify(&attrs),
        ConfigurationId::NoBos
    );
}
