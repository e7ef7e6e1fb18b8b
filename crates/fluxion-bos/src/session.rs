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

//! Read-compute-write cycles against a system-details store.
//!
//! Every mutation fetches a fresh snapshot, computes its patch with the slot
//! store and writes it with a single `patch` call. Nothing is serialized here:
//! callers keep one mutation in flight per record.

use crate::equipment_state::EquipmentState;
use crate::error::Result;
use crate::orchestrator::{AutoConfigOrchestrator, BosPlan};
use crate::slots::BosSlotStore;
use crate::traits::{EquipmentCatalogSource, SystemDetailsStore};
use fluxion_bos_types::{BosSection, BosSlot, FieldPatch, SlotEquipment, SystemNumber, UtilityContext};
use std::fmt;
use tracing::{debug, info};

pub struct BosSession<S: SystemDetailsStore> {
    store: S,
    slots: BosSlotStore,
}

impl<S: SystemDetailsStore> fmt::Debug for BosSession<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BosSession")
            .field("store", &self.store.name())
            .field("slots", &self.slots)
            .finish()
    }
}

impl<S: SystemDetailsStore> BosSession<S> {
    pub fn new(store: S, slots: BosSlotStore) -> Self {
        Self { store, slots }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn slots(&self) -> &BosSlotStore {
        &self.slots
    }

    async fn commit(&self, patch: FieldPatch) -> Result<()> {
        if patch.is_empty() {
            debug!("Nothing to write to {}", self.store.name());
            return Ok(());
        }
        debug!("Writing {} fields to {}", patch.len(), self.store.name());
        self.store.patch(&patch).await
    }

    /// Populated slots of a section as currently stored
    pub async fn list(&self, section: BosSection, system: SystemNumber) -> Result<Vec<BosSlot>> {
        let snapshot = self.store.fetch().await?;
        Ok(self.slots.list_populated(&snapshot, section, system))
    }

    /// Insert into the next free slot and return its index
    pub async fn insert(
        &self,
        section: BosSection,
        system: SystemNumber,
        equipment: SlotEquipment,
        trigger: Option<&str>,
    ) -> Result<usize> {
        let snapshot = self.store.fetch().await?;
        let (index, patch) = self.slots.insert(&snapshot, section, system, equipment, trigger)?;
        self.commit(patch).await?;
        info!("Added {section} slot {index} for system {system}");
        Ok(index)
    }

    /// Remove a slot and write the compacted section
    pub async fn remove(&self, section: BosSection, system: SystemNumber, index: usize) -> Result<()> {
        let snapshot = self.store.fetch().await?;
        let patch = self.slots.remove(&snapshot, section, system, index)?;
        self.commit(patch).await?;
        info!("Removed {section} slot {index} for system {system}");
        Ok(())
    }

    pub async fn reorder(
        &self,
        section: BosSection,
        system: SystemNumber,
        new_order: &[usize],
    ) -> Result<()> {
        let snapshot = self.store.fetch().await?;
        let patch = self.slots.reorder_chain(&snapshot, section, system, new_order)?;
        self.commit(patch).await
    }

    pub async fn clear_system(&self, system: SystemNumber) -> Result<()> {
        let snapshot = self.store.fetch().await?;
        let patch = self.slots.clear_system(&snapshot, system);
        self.commit(patch).await?;
        info!("Cleared all BOS sections for system {system}");
        Ok(())
    }

    /// Current equipment of one system, as auto-configuration sees it
    pub async fn equipment_state(
        &self,
        system: SystemNumber,
        utility: &UtilityContext,
    ) -> Result<EquipmentState> {
        let snapshot = self.store.fetch().await?;
        Ok(EquipmentState::from_snapshot(&snapshot, system, utility, &self.slots))
    }

    /// Write a plan's utility items to the utility section and its battery
    /// items to the post-SMS section.
    ///
    /// Either every item is written or, when a section runs out of slots,
    /// nothing is.
    pub async fn apply_plan(&self, system: SystemNumber, plan: &BosPlan) -> Result<Vec<usize>> {
        let mut working = self.store.fetch().await?;
        let mut patch = FieldPatch::new();
        let mut indices = Vec::with_capacity(plan.added_count());

        for (side, equipment) in plan.items() {
            let section = side.section();
            let trigger = section.trigger_value(system);
            let (index, item_patch) =
                self.slots
                    .insert(&working, section, system, equipment.clone(), Some(&trigger))?;
            working.apply(&item_patch);
            patch.merge(item_patch);
            indices.push(index);
        }

        self.commit(patch).await?;
        info!(
            "[{}] Wrote {} BOS items for system {system}",
            plan.rule,
            indices.len()
        );
        Ok(indices)
    }

    /// Detect, plan and write in one pass.
    ///
    /// Returns `None` without touching the store when no rule applies.
    pub async fn auto_configure(
        &self,
        orchestrator: &AutoConfigOrchestrator,
        catalog: &dyn EquipmentCatalogSource,
        system: SystemNumber,
        utility: &UtilityContext,
        max_continuous_output_amps: f64,
    ) -> Result<Option<BosPlan>> {
        let state = self.equipment_state(system, utility).await?;
        let Some(plan) = orchestrator.plan_bos(&state, max_continuous_output_amps, catalog) else {
            return Ok(None);
        };
        self.apply_plan(system, &plan).await?;
        Ok(Some(plan))
    }
}
