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

use serde::{Deserialize, Serialize};

/// One row of the BOS equipment reference catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub equipment_type: String,
    pub make: String,
    pub model: String,
    /// Continuous amp rating; `None` for unrated items (junction boxes)
    pub amp_rating: Option<u32>,
}

impl CatalogEntry {
    pub fn new(
        equipment_type: impl Into<String>,
        make: impl Into<String>,
        model: impl Into<String>,
        amp_rating: Option<u32>,
    ) -> Self {
        Self {
            equipment_type: equipment_type.into(),
            make: make.into(),
            model: model.into(),
            amp_rating,
        }
    }

    /// Case-insensitive equipment type comparison
    pub fn is_type(&self, equipment_type: &str) -> bool {
        self.equipment_type.eq_ignore_ascii_case(equipment_type)
    }
}

/// Standard (utility-neutral) BOS equipment type names
pub mod equipment_types {
    pub const AC_DISCONNECT: &str = "AC Disconnect";
    pub const FUSED_AC_DISCONNECT: &str = "Fused AC Disconnect";
    pub const COMBINER_PANEL: &str = "Combiner Panel";
    pub const PV_METER: &str = "PV Meter";
    pub const BI_DIRECTIONAL_METER: &str = "Bi-Directional Meter";
    pub const BI_DIRECTIONAL_METER_DER_SIDE_DISCONNECT: &str =
        "Bi-Directional Meter DER Side Disconnect";
    pub const BI_DIRECTIONAL_METER_LINE_SIDE_DISCONNECT: &str =
        "Bi-Directional Meter Line Side Disconnect";
    pub const UNI_DIRECTIONAL_METER: &str = "Uni-Directional Meter";
    pub const UNI_DIRECTIONAL_METER_LINE_SIDE_DISCONNECT: &str =
        "Uni-Directional Meter Line Side Disconnect";
    pub const JUNCTION_BOX: &str = "Junction Box";

    /// Types offered in BOS dropdowns for the generic utility
    pub const STANDARD: &[&str] = &[
        AC_DISCONNECT,
        FUSED_AC_DISCONNECT,
        COMBINER_PANEL,
        PV_METER,
        BI_DIRECTIONAL_METER,
        BI_DIRECTIONAL_METER_DER_SIDE_DISCONNECT,
        BI_DIRECTIONAL_METER_LINE_SIDE_DISCONNECT,
        JUNCTION_BOX,
    ];
}
