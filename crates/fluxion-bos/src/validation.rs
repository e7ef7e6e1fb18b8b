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

use fluxion_bos_types::{ChargingSource, CouplingType, SystemAttributes};
use serde::{Deserialize, Serialize};

/// A form-level problem with classification inputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
    pub severity: String,
}

impl ValidationIssue {
    fn error(field: &str, message: &str) -> Self {
        Self {
            field: field.to_owned(),
            message: message.to_owned(),
            severity: "error".to_owned(),
        }
    }
}

/// Check that a system's answers are complete and consistent.
/// An empty list means the inputs can be classified.
pub fn validate_inputs(attrs: &SystemAttributes) -> Vec<ValidationIssue> {
    let mut errors = Vec::new();

    // ============= Required Answers =============
    if !attrs.is_standby_only {
        let missing = [
            (attrs.has_solar_pv.is_none(), "has_solar_pv", "Solar PV selection required"),
            (
                attrs.charging_source.is_none(),
                "charging_source",
                "Battery charging source required",
            ),
            (attrs.coupling.is_none(), "coupling", "Coupling type required"),
            (
                attrs.requires_backup_power.is_none(),
                "requires_backup_power",
                "Backup power selection required",
            ),
            (
                attrs.supports_peak_shaving.is_none(),
                "supports_peak_shaving",
                "Peak shaving selection required",
            ),
            (
                attrs.has_multiple_batteries.is_none(),
                "has_multiple_batteries",
                "Multiple batteries selection required",
            ),
        ];
        errors.extend(
            missing
                .iter()
                .filter(|(is_missing, _, _)| *is_missing)
                .map(|(_, field, message)| ValidationIssue::error(field, message)),
        );
    }

    // ============= Consistency =============
    let no_solar = attrs.has_solar_pv == Some(false);
    if no_solar && attrs.charges_from(ChargingSource::GridOrRenewable) {
        errors.push(ValidationIssue::error(
            "charging_source",
            "Grid-or-renewable charging requires solar PV",
        ));
    }
    if no_solar && attrs.is_coupled(CouplingType::Dc) {
        errors.push(ValidationIssue::error(
            "coupling",
            "DC coupling requires solar PV",
        ));
    }

    errors
}
