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
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// A catalog part chosen without user input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedPart {
    pub make: String,
    pub model: String,
    pub amp_rating: u32,
}

/// Why no part could be chosen automatically
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Ambiguity {
    /// Several makes tie at the minimal qualifying rating
    Makes(Vec<String>),
    /// The chosen make offers several models at that rating
    Models { make: String, models: Vec<String> },
}

/// Result of a catalog search. `Ambiguous` means the user must choose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum MatchOutcome {
    Selected(SelectedPart),
    Ambiguous { amp_rating: u32, reason: Ambiguity },
    NotFound,
}

impl MatchOutcome {
    pub fn selected(&self) -> Option<&SelectedPart> {
        match self {
            Self::Selected(part) => Some(part),
            Self::Ambiguous { .. } | Self::NotFound => None,
        }
    }
}

/// Picks the smallest adequate catalog part, refusing to guess on ties
#[derive(Debug)]
pub struct EquipmentCatalogMatcher<'a, C: EquipmentCatalogSource + ?Sized> {
    catalog: &'a C,
}

impl<'a, C: EquipmentCatalogSource + ?Sized> EquipmentCatalogMatcher<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }

    /// Find the minimal part of `equipment_type` rated for at least `minimum_amps`.
    ///
    /// Among entries at the smallest qualifying rating, `preferred_make` wins when
    /// offered (compared case-insensitively); otherwise a single make is taken as-is.
    /// The chosen make must offer exactly one model at that rating.
    pub fn find_minimal(
        &self,
        equipment_type: &str,
        minimum_amps: f64,
        preferred_make: Option<&str>,
    ) -> MatchOutcome {
        let candidates: Vec<_> = self
            .catalog
            .list(equipment_type)
            .into_iter()
            .filter_map(|e| {
                let amps = e.amp_rating?;
                (f64::from(amps) >= minimum_amps).then_some((amps, e))
            })
            .collect();

        let Some(min_rating) = candidates.iter().map(|(amps, _)| *amps).min() else {
            debug!("No '{equipment_type}' rated >= {minimum_amps}A in {}", self.catalog.name());
            return MatchOutcome::NotFound;
        };

        let at_rating: Vec<_> = candidates
            .into_iter()
            .filter(|(amps, _)| *amps == min_rating)
            .map(|(_, e)| e)
            .collect();

        let makes: BTreeSet<&str> = at_rating.iter().map(|e| e.make.as_str()).collect();
        let preferred = preferred_make.and_then(|wanted| {
            makes
                .iter()
                .copied()
                .find(|make| make.eq_ignore_ascii_case(wanted))
        });

        let make = match (preferred, makes.len()) {
            (Some(make), _) => make,
            (None, 1) => makes.iter().copied().next().unwrap_or_default(),
            (None, _) => {
                debug!(
                    "Ambiguous '{equipment_type}' at {min_rating}A: {} makes",
                    makes.len()
                );
                return MatchOutcome::Ambiguous {
                    amp_rating: min_rating,
                    reason: Ambiguity::Makes(makes.into_iter().map(str::to_owned).collect()),
                };
            }
        };

        let models: BTreeSet<&str> = at_rating
            .iter()
            .filter(|e| e.make == make)
            .map(|e| e.model.as_str())
            .collect();

        if models.len() == 1 {
            let model = models.into_iter().next().unwrap_or_default();
            MatchOutcome::Selected(SelectedPart {
                make: make.to_owned(),
                model: model.to_owned(),
                amp_rating: min_rating,
            })
        } else {
            MatchOutcome::Ambiguous {
                amp_rating: min_rating,
                reason: Ambiguity::Models {
                    make: make.to_owned(),
                    models: models.into_iter().map(str::to_owned).collect(),
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference_catalog::StaticCatalog;
    use fluxion_bos_types::CatalogEntry;

    fn catalog() -> StaticCatalog {
        StaticCatalog::reference()
    }

    #[test]
    fn test_single_make_selected() {
        let catalog = catalog();
        let matcher = EquipmentCatalogMatcher::new(&catalog);
        let outcome = matcher.find_minimal("Bi-Directional Meter DER Side Disconnect", 50.0, None);
        assert_eq!(
            outcome,
            MatchOutcome::Selected(SelectedPart {
                make: "EATON".to_owned(),
                model: "DG222URB".to_owned(),
                amp_rating: 60,
            })
        );
    }

    #[test]
    fn test_tied_makes_are_ambiguous() {
        let catalog = catalog();
        let matcher = EquipmentCatalogMatcher::new(&catalog);
        match matcher.find_minimal("AC Disconnect", 40.0, None) {
            MatchOutcome::Ambiguous {
                amp_rating,
                reason: Ambiguity::Makes(makes),
            } => {
                assert_eq!(amp_rating, 60);
                assert_eq!(makes.len(), 4);
            }
            other => panic!("expected ambiguous makes, got {other:?}"),
        }
    }

    #[test]
    fn test_preferred_make_breaks_tie() {
        let catalog = catalog();
        let matcher = EquipmentCatalogMatcher::new(&catalog);
        let outcome = matcher.find_minimal("AC Disconnect", 40.0, Some("Siemens"));
        let part = outcome.selected().unwrap();
        assert_eq!(part.make, "SIEMENS");
        assert_eq!(part.model, "LNF222R");
        assert_eq!(part.amp_rating, 60);
    }

    #[test]
    fn test_absent_preferred_make_falls_back() {
        let catalog = catalog();
        let matcher = EquipmentCatalogMatcher::new(&catalog);
        let outcome = matcher.find_minimal("PV Meter", 90.0, Some("Siemens"));
        // Only MILBANK sits at 100A
        assert_eq!(outcome.selected().unwrap().make, "MILBANK");
    }

    #[test]
    fn test_multiple_models_are_ambiguous() {
        let catalog = catalog();
        let matcher = EquipmentCatalogMatcher::new(&catalog);
        let outcome = matcher.find_minimal("Fused AC Disconnect", 150.0, Some("SIEMENS"));
        assert_eq!(
            outcome,
            MatchOutcome::Ambiguous {
                amp_rating: 200,
                reason: Ambiguity::Models {
                    make: "SIEMENS".to_owned(),
                    models: vec!["GF224NR".to_owned(), "GNF324R".to_owned()],
                },
            }
        );
    }

    #[test]
    fn test_not_found() {
        let catalog = catalog();
        let matcher = EquipmentCatalogMatcher::new(&catalog);
        assert_eq!(
            matcher.find_minimal("Combiner Panel", 250.0, None),
            MatchOutcome::NotFound
        );
        assert_eq!(
            matcher.find_minimal("Unknown Widget", 1.0, None),
            MatchOutcome::NotFound
        );
    }

    #[test]
    fn test_unrated_entries_never_match() {
        let catalog = StaticCatalog::from_entries(vec![CatalogEntry::new(
            "Junction Box",
            "VYNCKIER",
            "RU2LP",
            None,
        )]);
        let matcher = EquipmentCatalogMatcher::new(&catalog);
        assert_eq!(
            matcher.find_minimal("Junction Box", 0.0, None),
            MatchOutcome::NotFound
        );
    }

    #[test]
    fn test_exact_rating_qualifies() {
        let catalog = catalog();
        let matcher = EquipmentCatalogMatcher::new(&catalog);
        let part = matcher
            .find_minimal("Combiner Panel", 100.0, None)
            .selected()
            .cloned()
            .unwrap();
        assert_eq!(part.model, "BR816L100RP");
    }
}
