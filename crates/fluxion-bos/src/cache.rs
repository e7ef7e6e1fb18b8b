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
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Session-owned memo of catalog lookups keyed by equipment type.
///
/// Nothing is shared between sessions; drop the cache or call
/// [`CatalogCache::invalidate`] when the underlying catalog changes.
pub struct CatalogCache {
    source: Arc<dyn EquipmentCatalogSource>,
    by_type: RwLock<HashMap<String, Arc<[CatalogEntry]>>>,
}

impl fmt::Debug for CatalogCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogCache")
            .field("source", &self.source.name())
            .field("cached_types", &self.by_type.read().len())
            .finish()
    }
}

fn cache_key(equipment_type: &str) -> String {
    equipment_type.trim().to_lowercase()
}

impl CatalogCache {
    pub fn new(source: Arc<dyn EquipmentCatalogSource>) -> Self {
        Self {
            source,
            by_type: RwLock::new(HashMap::new()),
        }
    }

    /// Entries for a type, loading from the source on first use
    pub fn entries(&self, equipment_type: &str) -> Arc<[CatalogEntry]> {
        let key = cache_key(equipment_type);
        if let Some(hit) = self.by_type.read().get(&key) {
            return Arc::clone(hit);
        }

        let loaded: Arc<[CatalogEntry]> = self.source.list(equipment_type).into();
        debug!(
            "Catalog cache miss for '{}' ({} entries from {})",
            equipment_type,
            loaded.len(),
            self.source.name()
        );
        self.by_type
            .write()
            .entry(key)
            .or_insert_with(|| Arc::clone(&loaded))
            .clone()
    }

    /// Distinct makes for a type, sorted
    pub fn makes(&self, equipment_type: &str) -> Vec<String> {
        self.entries(equipment_type)
            .iter()
            .map(|e| e.make.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct models for a type and make, sorted
    pub fn models(&self, equipment_type: &str, make: &str) -> Vec<String> {
        self.entries(equipment_type)
            .iter()
            .filter(|e| e.make.eq_ignore_ascii_case(make))
            .map(|e| e.model.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Forget one type; returns whether it was cached
    pub fn invalidate(&self, equipment_type: &str) -> bool {
        let removed = self
            .by_type
            .write()
            .remove(&cache_key(equipment_type))
            .is_some();
        debug!("Catalog cache invalidated '{equipment_type}' (was cached: {removed})");
        removed
    }

    pub fn invalidate_all(&self) {
        let mut guard = self.by_type.write();
        debug!("Catalog cache cleared ({} types)", guard.len());
        guard.clear();
    }

    pub fn cached_types(&self) -> usize {
        self.by_type.read().len()
    }
}

impl EquipmentCatalogSource for CatalogCache {
    fn list(&self, equipment_type: &str) -> Vec<CatalogEntry> {
        self.entries(equipment_type).to_vec()
    }

    fn name(&self) -> &str {
        "catalog-cache"
    }
}
