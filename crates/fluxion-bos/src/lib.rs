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

pub mod ampacity;
pub mod cache;
pub mod classifier;
pub mod config;
pub mod configurations;
pub mod equipment_state;
pub mod error;
pub mod logging;
pub mod matcher;
pub mod orchestrator;
pub mod reference_catalog;
pub mod session;
pub mod slots;
pub mod traits;
pub mod translations;
pub mod triggers;
pub mod validation;

pub use ampacity::{AmpRatingInfo, AmpacityCalculator, AmpacityContext, MainBreaker};
pub use cache::CatalogCache;
pub use classifier::{ConfigurationClassifier, DecisionRow, EquipmentSummary, InverterClass};
pub use config::{EngineConfig, PreferredMakes, SlotCapacities, load_config, save_config};
pub use configurations::{ConfigurationCatalog, suggest_equipment};
pub use equipment_state::{EquipmentState, PartRef};
pub use error::{BosError, Result};
pub use logging::init_tracing;
pub use matcher::{Ambiguity, EquipmentCatalogMatcher, MatchOutcome, SelectedPart};
pub use orchestrator::{
    AutoConfigOrchestrator, AutoConfigRule, BosPlan, BosSide, FranklinApsRule, SkipReason,
};
pub use reference_catalog::StaticCatalog;
pub use session::BosSession;
pub use slots::BosSlotStore;
pub use traits::{EquipmentCatalogSource, SystemDetailsStore};
pub use translations::UtilityTranslations;
pub use triggers::{EquipmentSignature, TriggerEquipment, TriggerResolver};
pub use validation::{ValidationIssue, validate_inputs};
