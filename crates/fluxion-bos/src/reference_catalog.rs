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

use crate::traits::EquipmentCatalogSource;
use fluxion_bos_types::CatalogEntry;
use fluxion_bos_types::equipment_types as types;

/// (type, make, model, amp rating)
type Row = (&'static str, &'static str, &'static str, Option<u32>);

const BOS_CATALOG: &[Row] = &[
    // AC Disconnect
    (types::AC_DISCONNECT, "CUTLER HAMMER", "DG221URB", Some(30)),
    (types::AC_DISCONNECT, "CUTLER HAMMER", "DG222URB", Some(60)),
    (types::AC_DISCONNECT, "CUTLER HAMMER", "DG323UGB", Some(100)),
    (types::AC_DISCONNECT, "CUTLER HAMMER", "DG324URK", Some(200)),
    (types::AC_DISCONNECT, "EATON", "DG221URB", Some(30)),
    (types::AC_DISCONNECT, "EATON", "DG222URB", Some(60)),
    (types::AC_DISCONNECT, "EATON", "DG223URB", Some(100)),
    (types::AC_DISCONNECT, "EATON", "DG324URK", Some(200)),
    (types::AC_DISCONNECT, "SIEMENS", "LNF221R", Some(30)),
    (types::AC_DISCONNECT, "SIEMENS", "LNF222R", Some(60)),
    (types::AC_DISCONNECT, "SIEMENS", "GNF323R", Some(100)),
    (types::AC_DISCONNECT, "SIEMENS", "DU324RB", Some(200)),
    (types::AC_DISCONNECT, "SQUARE D", "DU221RB", Some(30)),
    (types::AC_DISCONNECT, "SQUARE D", "DU222RB", Some(60)),
    (types::AC_DISCONNECT, "SQUARE D", "DTU223RB", Some(100)),
    (types::AC_DISCONNECT, "SQUARE D", "DU324RB", Some(200)),
    // Fused AC Disconnect
    (types::FUSED_AC_DISCONNECT, "CUTLER HAMMER", "DG221NRB", Some(30)),
    (types::FUSED_AC_DISCONNECT, "CUTLER HAMMER", "DG222NRB", Some(60)),
    (types::FUSED_AC_DISCONNECT, "CUTLER HAMMER", "DG223NRB", Some(100)),
    (types::FUSED_AC_DISCONNECT, "CUTLER HAMMER", "DG324NRK", Some(200)),
    (types::FUSED_AC_DISCONNECT, "EATON", "DG221NRB", Some(30)),
    (types::FUSED_AC_DISCONNECT, "EATON", "DG222NRB", Some(60)),
    (types::FUSED_AC_DISCONNECT, "EATON", "DG223NRB", Some(100)),
    (types::FUSED_AC_DISCONNECT, "EATON", "DG324NRK", Some(200)),
    (types::FUSED_AC_DISCONNECT, "SIEMENS", "LF221R", Some(30)),
    (types::FUSED_AC_DISCONNECT, "SIEMENS", "LF222R", Some(60)),
    (types::FUSED_AC_DISCONNECT, "SIEMENS", "GF323", Some(100)),
    (types::FUSED_AC_DISCONNECT, "SIEMENS", "GF224NR", Some(200)),
    (types::FUSED_AC_DISCONNECT, "SIEMENS", "GNF324R", Some(200)),
    (types::FUSED_AC_DISCONNECT, "SQUARE D", "D221NRB", Some(30)),
    (types::FUSED_AC_DISCONNECT, "SQUARE D", "D222NRB", Some(60)),
    // Combiner Panel
    (types::COMBINER_PANEL, "EATON", "BR816L100RP", Some(100)),
    (types::COMBINER_PANEL, "EATON", "BR816L125RP", Some(125)),
    (types::COMBINER_PANEL, "EATON", "BR816L200RP", Some(200)),
    (types::COMBINER_PANEL, "SIEMENS", "W0816ML1125CU", Some(125)),
    // PV Meter
    (types::PV_METER, "EATON", "011", Some(125)),
    (types::PV_METER, "EATON", "1004455BCH", Some(200)),
    (types::PV_METER, "MILBANK", "U5929XL", Some(100)),
    (types::PV_METER, "MILBANK", "U4015-0", Some(200)),
    (types::PV_METER, "MILBANK", "U4518-XL-W", Some(200)),
    (types::PV_METER, "MILBANK", "U1104-RL-PG-KK", Some(200)),
    (types::PV_METER, "SIEMENS", "UAT111-BPCC", Some(135)),
    // Bi-Directional Meter (ESS)
    (types::BI_DIRECTIONAL_METER, "ITRON", "C1SR", Some(200)),
    (types::BI_DIRECTIONAL_METER, "LANDIS+GYR", "FOCUS AXE-SD", Some(200)),
    (types::BI_DIRECTIONAL_METER, "SENSUS", "iCon A", Some(200)),
    // Bi-Directional Meter DER Side Disconnect
    (types::BI_DIRECTIONAL_METER_DER_SIDE_DISCONNECT, "EATON", "DG221URB", Some(30)),
    (types::BI_DIRECTIONAL_METER_DER_SIDE_DISCONNECT, "EATON", "DG222URB", Some(60)),
    (types::BI_DIRECTIONAL_METER_DER_SIDE_DISCONNECT, "EATON", "DG223URB", Some(100)),
    (types::BI_DIRECTIONAL_METER_DER_SIDE_DISCONNECT, "EATON", "DG324URK", Some(200)),
    // Bi-Directional Meter Line Side Disconnect
    (types::BI_DIRECTIONAL_METER_LINE_SIDE_DISCONNECT, "EATON", "DG221URB", Some(30)),
    (types::BI_DIRECTIONAL_METER_LINE_SIDE_DISCONNECT, "EATON", "DG222URB", Some(60)),
    (types::BI_DIRECTIONAL_METER_LINE_SIDE_DISCONNECT, "EATON", "DG223URB", Some(100)),
    (types::BI_DIRECTIONAL_METER_LINE_SIDE_DISCONNECT, "EATON", "DG324URK", Some(200)),
    // Uni-Directional Meter (production)
    (types::UNI_DIRECTIONAL_METER, "MILBANK", "U5929XL", Some(100)),
    (types::UNI_DIRECTIONAL_METER, "GE", "I-210+", Some(200)),
    (types::UNI_DIRECTIONAL_METER, "LANDIS+GYR", "E350", Some(200)),
    (types::UNI_DIRECTIONAL_METER, "ITRON", "C1SR", Some(200)),
    // Uni-Directional Meter Line Side Disconnect
    (types::UNI_DIRECTIONAL_METER_LINE_SIDE_DISCONNECT, "EATON", "DG221URB", Some(30)),
    (types::UNI_DIRECTIONAL_METER_LINE_SIDE_DISCONNECT, "EATON", "DG222URB", Some(60)),
    (types::UNI_DIRECTIONAL_METER_LINE_SIDE_DISCONNECT, "EATON", "DG223URB", Some(100)),
    (types::UNI_DIRECTIONAL_METER_LINE_SIDE_DISCONNECT, "EATON", "DG324URK", Some(200)),
    (types::UNI_DIRECTIONAL_METER_LINE_SIDE_DISCONNECT, "SIEMENS", "LNF221R", Some(30)),
    (types::UNI_DIRECTIONAL_METER_LINE_SIDE_DISCONNECT, "SIEMENS", "LNF222R", Some(60)),
    (types::UNI_DIRECTIONAL_METER_LINE_SIDE_DISCONNECT, "SIEMENS", "GNF323R", Some(100)),
    (types::UNI_DIRECTIONAL_METER_LINE_SIDE_DISCONNECT, "SIEMENS", "GNF324R", Some(200)),
    // Junction Box
    (types::JUNCTION_BOX, "VYNCKIER", "RU2LP", None),
    (types::JUNCTION_BOX, "WILEY", "BR816L100RP", Some(100)),
];

/// Built-in BOS reference catalog
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    entries: Vec<CatalogEntry>,
}

impl StaticCatalog {
    pub fn reference() -> Self {
        Self::from_entries(
            BOS_CATALOG
                .iter()
                .map(|(t, make, model, amps)| CatalogEntry::new(*t, *make, *model, *amps))
                .collect(),
        )
    }

    /// Catalog over caller-supplied rows (tests, utility-specific catalogs)
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self::reference()
    }
}

impl EquipmentCatalogSource for StaticCatalog {
    fn list(&self, equipment_type: &str) -> Vec<CatalogEntry> {
        self.entries
            .iter()
            .filter(|e| e.is_type(equipment_type))
            .cloned()
            .collect()
    }

    fn name(&self) -> &str {
        "static-bos-catalog"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_is_case_insensitive() {
        let catalog = StaticCatalog::reference();
        assert_eq!(catalog.list("ac disconnect").len(), 16);
        assert_eq!(catalog.list(types::BI_DIRECTIONAL_METER).len(), 3);
        assert!(catalog.list("Flux Capacitor").is_empty());
    }

    #[test]
    fn test_every_standard_type_has_entries() {
        let catalog = StaticCatalog::reference();
        for t in types::STANDARD {
            assert!(!catalog.list(t).is_empty(), "no entries for {t}");
        }
    }

    #[test]
    fn test_unrated_entries_survive() {
        let catalog = StaticCatalog::reference();
        let boxes = catalog.list(types::JUNCTION_BOX);
        assert!(boxes.iter().any(|e| e.amp_rating.is_none()));
    }
}
