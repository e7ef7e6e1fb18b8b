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

//! Utility-specific BOS equipment names.
//!
//! Two tables ship with the engine and are loaded as-is: the current one and
//! the legacy one older clients still write. They overlap and disagree in
//! places; neither is corrected against the other.

use crate::error::{BosError, Result};
use std::collections::{BTreeMap, BTreeSet};

const CURRENT_TABLE: &str = include_str!("../data/utility_translations.toml");
const LEGACY_TABLE: &str = include_str!("../data/legacy_utility_translations.toml");

/// Table used when a utility has no entry of its own
pub const GENERIC_UTILITY: &str = "Gen";

/// Abbreviations recognised inside free-form utility names
pub const KNOWN_ABBREVIATIONS: &[&str] = &["APS", "SRP", "TEP", "TRICO"];

/// Extract a known abbreviation from a utility name.
///
/// Accepts "Arizona Public Service (APS)", "aps", or any name containing one
/// of [`KNOWN_ABBREVIATIONS`].
pub fn utility_abbreviation(name: &str) -> Option<&'static str> {
    let upper = name.trim().to_uppercase();
    if upper.is_empty() {
        return None;
    }

    let in_parens = upper
        .split_once('(')
        .and_then(|(_, rest)| rest.split_once(')'))
        .map(|(inner, _)| inner.trim());
    let exact = |candidate: &str| {
        KNOWN_ABBREVIATIONS
            .iter()
            .copied()
            .find(|abbr| *abbr == candidate)
    };

    in_parens
        .and_then(exact)
        .or_else(|| exact(&upper))
        .or_else(|| {
            KNOWN_ABBREVIATIONS
                .iter()
                .copied()
                .find(|abbr| upper.contains(abbr))
        })
}

type Table = BTreeMap<String, String>;

/// Standard type -> utility display name, per utility key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtilityTranslations {
    tables: BTreeMap<String, Table>,
}

impl UtilityTranslations {
    pub fn current() -> Result<Self> {
        Self::from_toml(CURRENT_TABLE)
    }

    pub fn legacy() -> Result<Self> {
        Self::from_toml(LEGACY_TABLE)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let tables: BTreeMap<String, Table> = toml::from_str(text)
            .map_err(|e| BosError::ReferenceData(format!("translation table: {e}")))?;
        Ok(Self { tables })
    }

    pub fn utilities(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Table for a utility key, full utility name, or abbreviation
    fn table(&self, utility: &str) -> Option<&Table> {
        self.tables
            .get(utility.trim())
            .or_else(|| utility_abbreviation(utility).and_then(|abbr| self.tables.get(abbr)))
    }

    /// Utility display name for a standard type; the standard type when untranslated
    pub fn to_utility_name(&self, standard_type: &str, utility: &str) -> String {
        self.table(utility)
            .and_then(|table| table.get(standard_type))
            .cloned()
            .unwrap_or_else(|| standard_type.to_owned())
    }

    /// Standard type for a utility display name.
    ///
    /// The given utility's table is searched first, then the name itself if it
    /// is a standard type, then every other table in key order.
    pub fn to_standard(&self, name: &str, utility: Option<&str>) -> String {
        let reverse = |table: &Table| {
            table
                .iter()
                .find(|(_, display)| display.as_str() == name)
                .map(|(standard, _)| standard.clone())
        };

        if let Some(found) = utility.and_then(|u| self.table(u)).and_then(reverse) {
            return found;
        }
        let standard_types = self.standard_types();
        if standard_types.contains(name) {
            return name.to_owned();
        }
        self.tables
            .values()
            .find_map(reverse)
            .unwrap_or_else(|| name.to_owned())
    }

    /// Every standard type named by any table
    pub fn standard_types(&self) -> BTreeSet<&str> {
        self.tables
            .values()
            .flat_map(|table| table.keys().map(String::as_str))
            .collect()
    }

    /// Distinct display names offered for a utility, sorted.
    /// Unknown utilities get the generic table.
    pub fn type_options(&self, utility: Option<&str>) -> Vec<String> {
        utility
            .and_then(|u| self.table(u))
            .or_else(|| self.tables.get(GENERIC_UTILITY))
            .map(|table| {
                table
                    .values()
                    .cloned()
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abbreviation_extraction() {
        assert_eq!(utility_abbreviation("Arizona Public Service (APS)"), Some("APS"));
        assert_eq!(utility_abbreviation("srp"), Some("SRP"));
        assert_eq!(utility_abbreviation("Tucson Electric Power TEP"), Some("TEP"));
        assert_eq!(utility_abbreviation("Salt River Project"), None);
        assert_eq!(utility_abbreviation(""), None);
    }

    #[test]
    fn test_bundled_tables_parse() {
        let current = UtilityTranslations::current().unwrap();
        let legacy = UtilityTranslations::legacy().unwrap();
        assert!(current.utilities().any(|u| u == "APS"));
        assert!(legacy.utilities().any(|u| u == GENERIC_UTILITY));
        assert_ne!(current, legacy);
    }

    #[test]
    fn test_to_utility_name() {
        let current = UtilityTranslations::current().unwrap();
        assert_eq!(
            current.to_utility_name("PV Meter", "Arizona Public Service (APS)"),
            "Uni-Directional Meter"
        );
        assert_eq!(
            current.to_utility_name("AC Disconnect", "SRP"),
            "DER Meter Disconnect Switch"
        );
        assert_eq!(current.to_utility_name("AC Disconnect", "Nowhere Power"), "AC Disconnect");
    }

    #[test]
    fn test_to_standard_prefers_utility_table() {
        let current = UtilityTranslations::current().unwrap();
        assert_eq!(
            current.to_standard("Uni-Directional Meter Line Side Disconnect", Some("APS")),
            "AC Disconnect"
        );
        assert_eq!(
            current.to_standard("DER Meter Disconnect Switch", None),
            "AC Disconnect"
        );
        assert_eq!(current.to_standard("Junction Box", None), "Junction Box");
        assert_eq!(current.to_standard("Mystery Box", Some("APS")), "Mystery Box");
    }

    #[test]
    fn test_type_options_fall_back_to_generic() {
        let current = UtilityTranslations::current().unwrap();
        let generic = current.type_options(None);
        assert_eq!(generic, current.type_options(Some("Unknown Co-op")));
        assert!(generic.contains(&"AC Disconnect".to_owned()));

        let aps = current.type_options(Some("APS"));
        assert!(aps.contains(&"Utility Disconnect".to_owned()));
        assert!(aps.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_malformed_table_is_reference_error() {
        assert!(matches!(
            UtilityTranslations::from_toml("[APS]\n\"AC Disconnect\" = 3"),
            Err(BosError::ReferenceData(_))
        ));
    }
}
