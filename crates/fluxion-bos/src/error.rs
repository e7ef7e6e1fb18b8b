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

//! Error types for the BOS engine

use fluxion_bos_types::{BosSection, SystemNumber};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BosError {
    #[error("config error: {0}")]
    Config(String),

    #[error("config file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("all {section} slots are full for system {system}")]
    SlotsFull {
        section: BosSection,
        system: SystemNumber,
    },

    #[error("slot {slot} is outside 1..={capacity}")]
    InvalidSlot { slot: usize, capacity: usize },

    #[error("invalid reorder: {0}")]
    InvalidReorder(String),

    #[error("reference data error: {0}")]
    ReferenceData(String),

    /// Failure reported by the system-details store, passed through unchanged
    #[error("storage failure: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, BosError>;
