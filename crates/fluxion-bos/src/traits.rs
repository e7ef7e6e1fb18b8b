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

use crate::error::Result;
use async_trait::async_trait;
use fluxion_bos_types::{CatalogEntry, FieldPatch, SystemSnapshot};

// ============= Collaborator Traits =============

/// Externally owned system-details record.
///
/// The engine never locks or retries: callers keep one mutation in flight per
/// record and re-fetch before each mutation. Errors should be reported as
/// `BosError::Storage` and are passed back to the caller unchanged.
#[async_trait]
pub trait SystemDetailsStore: Send + Sync {
    /// Read the current flat field map
    async fn fetch(&self) -> Result<SystemSnapshot>;

    /// Persist a partial field map atomically; `null` values clear fields
    async fn patch(&self, patch: &FieldPatch) -> Result<()>;

    /// Get store name for logging
    fn name(&self) -> &str;
}

/// Static BOS equipment reference data
pub trait EquipmentCatalogSource: Send + Sync {
    /// All entries of an equipment type (case-insensitive type match)
    fn list(&self, equipment_type: &str) -> Vec<CatalogEntry>;

    /// Get catalog name for logging
    fn name(&self) -> &str;
}
