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

//! Fixed-capacity ordered BOS slots per (section, system).
//!
//! The store never owns data. Every operation reads a [`SystemSnapshot`] and
//! returns the [`FieldPatch`] the caller must persist in one write. After any
//! patch is applied, the populated slots of a section occupy `1..=k` with no gaps.

use crate::config::{EngineConfig, SlotCapacities};
use crate::error::{BosError, Result};
use fluxion_bos_types::{
    BosSection, BosSlot, FieldPatch, SlotEquipment, SlotField, SystemNumber, SystemSnapshot,
};
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct BosSlotStore {
    capacities: SlotCapacities,
}

impl BosSlotStore {
    pub fn new(capacities: SlotCapacities) -> Self {
        Self { capacities }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.slot_capacities.clone())
    }

    pub fn capacity(&self, section: BosSection) -> usize {
        self.capacities.get(section)
    }

    // ============= Reads =============

    /// Read one slot; `None` when the slot is empty.
    ///
    /// A slot is populated when any of its equipment type, make, model, amp
    /// rating, trigger or block name holds a value. The same rule drives
    /// listing, free-slot search, compaction and clearing, so a slot holding
    /// only a make is listed and never handed out for a new insert.
    pub fn read_slot(
        &self,
        snapshot: &SystemSnapshot,
        section: BosSection,
        system: SystemNumber,
        index: usize,
    ) -> Option<BosSlot> {
        if !slot_has_data(snapshot, section, system, index) {
            return None;
        }
        let key = |field: SlotField| field.key(section, system, index);

        Some(BosSlot {
            section,
            system,
            index,
            equipment: SlotEquipment {
                equipment_type: snapshot
                    .text(&key(SlotField::EquipmentType))
                    .unwrap_or_default()
                    .to_owned(),
                make: snapshot.text(&key(SlotField::Make)).map(str::to_owned),
                model: snapshot.text(&key(SlotField::Model)).map(str::to_owned),
                amp_rating: snapshot.display(&key(SlotField::AmpRating)),
                is_new: snapshot.flag(&key(SlotField::IsNew)).unwrap_or(true),
            },
            trigger: snapshot.text(&key(SlotField::Trigger)).map(str::to_owned),
            block_name: snapshot.text(&key(SlotField::BlockName)).map(str::to_owned),
            active: section.has_active_flag()
                && snapshot.flag(&key(SlotField::Active)).unwrap_or(false),
        })
    }

    /// Populated slots in index order, each carrying its original index
    pub fn list_populated(
        &self,
        snapshot: &SystemSnapshot,
        section: BosSection,
        system: SystemNumber,
    ) -> Vec<BosSlot> {
        (1..=self.capacity(section))
            .filter_map(|index| self.read_slot(snapshot, section, system, index))
            .collect()
    }

    /// Smallest unused index, or `None` when the section is full
    pub fn next_free_slot(
        &self,
        snapshot: &SystemSnapshot,
        section: BosSection,
        system: SystemNumber,
    ) -> Option<usize> {
        (1..=self.capacity(section))
            .find(|index| self.read_slot(snapshot, section, system, *index).is_none())
    }

    // ============= Mutations =============

    /// Place equipment in the next free slot.
    ///
    /// The slot gets the section's default block name and, when given, the
    /// trigger key of the equipment that caused it.
    pub fn insert(
        &self,
        snapshot: &SystemSnapshot,
        section: BosSection,
        system: SystemNumber,
        equipment: SlotEquipment,
        trigger: Option<&str>,
    ) -> Result<(usize, FieldPatch)> {
        let index = self
            .next_free_slot(snapshot, section, system)
            .ok_or(BosError::SlotsFull { section, system })?;

        let slot = BosSlot {
            section,
            system,
            index,
            equipment,
            trigger: trigger.map(str::to_owned),
            block_name: Some(section.default_block_name().to_owned()),
            active: true,
        };
        debug!(
            "Inserting '{}' into {} slot {} for system {}",
            slot.equipment_type(),
            section,
            index,
            system
        );
        Ok((index, write_slot(&slot, index)))
    }

    /// Clear a slot and close the gap it leaves. Empty slots are a no-op.
    pub fn remove(
        &self,
        snapshot: &SystemSnapshot,
        section: BosSection,
        system: SystemNumber,
        index: usize,
    ) -> Result<FieldPatch> {
        self.check_index(section, index)?;
        if self.read_slot(snapshot, section, system, index).is_none() {
            debug!("{section} slot {index} for system {system} already empty");
            return Ok(FieldPatch::new());
        }

        let mut patch = clear_slot(section, system, index);
        let mut after = snapshot.clone();
        after.apply(&patch);
        patch.merge(self.compact(&after, section, system));
        Ok(patch.without_noops(snapshot))
    }

    /// Move populated slots down to `1..=k`, keeping their relative order.
    /// Returns an empty patch when the run is already contiguous.
    pub fn compact(
        &self,
        snapshot: &SystemSnapshot,
        section: BosSection,
        system: SystemNumber,
    ) -> FieldPatch {
        let populated = self.list_populated(snapshot, section, system);
        let contiguous = populated
            .iter()
            .enumerate()
            .all(|(position, slot)| slot.index == position + 1);
        if contiguous {
            return FieldPatch::new();
        }

        debug!(
            "Compacting {} {} slots for system {}",
            populated.len(),
            section,
            system
        );
        self.rewrite(snapshot, section, system, &populated)
    }

    /// Rewrite a daisy-chain section in the given order.
    ///
    /// `new_order` lists the current indices of every populated slot, first
    /// position first.
    pub fn reorder_chain(
        &self,
        snapshot: &SystemSnapshot,
        section: BosSection,
        system: SystemNumber,
        new_order: &[usize],
    ) -> Result<FieldPatch> {
        if !section.is_chain() {
            return Err(BosError::InvalidReorder(format!(
                "{section} is not a daisy-chain section"
            )));
        }

        let populated = self.list_populated(snapshot, section, system);
        let mut requested = new_order.to_vec();
        requested.sort_unstable();
        let current: Vec<usize> = populated.iter().map(|slot| slot.index).collect();
        if requested != current {
            return Err(BosError::InvalidReorder(format!(
                "order {new_order:?} is not a permutation of populated slots {current:?}"
            )));
        }

        let ordered: Vec<BosSlot> = new_order
            .iter()
            .filter_map(|index| populated.iter().find(|slot| slot.index == *index))
            .cloned()
            .collect();
        Ok(self.rewrite(snapshot, section, system, &ordered))
    }

    /// Clear every populated slot in one section
    pub fn clear_section(
        &self,
        snapshot: &SystemSnapshot,
        section: BosSection,
        system: SystemNumber,
    ) -> FieldPatch {
        let mut patch = FieldPatch::new();
        for index in 1..=self.capacity(section) {
            if slot_has_data(snapshot, section, system, index) {
                patch.merge(clear_slot(section, system, index));
            }
        }
        patch.without_noops(snapshot)
    }

    /// Clear every BOS section of one system
    pub fn clear_system(&self, snapshot: &SystemSnapshot, system: SystemNumber) -> FieldPatch {
        let mut patch = FieldPatch::new();
        for section in BosSection::all() {
            patch.merge(self.clear_section(snapshot, *section, system));
        }
        patch
    }

    // ============= Helpers =============

    fn check_index(&self, section: BosSection, index: usize) -> Result<()> {
        let capacity = self.capacity(section);
        if index == 0 || index > capacity {
            return Err(BosError::InvalidSlot {
                slot: index,
                capacity,
            });
        }
        Ok(())
    }

    /// Write `slots` to positions `1..=n` and clear the rest of the section
    fn rewrite(
        &self,
        snapshot: &SystemSnapshot,
        section: BosSection,
        system: SystemNumber,
        slots: &[BosSlot],
    ) -> FieldPatch {
        let mut patch = FieldPatch::new();
        for (position, slot) in slots.iter().enumerate() {
            patch.merge(write_slot(slot, position + 1));
        }
        for index in slots.len() + 1..=self.capacity(section) {
            if slot_has_data(snapshot, section, system, index) {
                patch.merge(clear_slot(section, system, index));
            }
        }
        patch.without_noops(snapshot)
    }
}

fn optional(value: Option<&String>) -> Value {
    value.map_or(Value::Null, |v| Value::String(v.clone()))
}

/// Full field set for `slot` placed at `index`
fn write_slot(slot: &BosSlot, index: usize) -> FieldPatch {
    let mut patch = FieldPatch::new();
    for field in SlotField::for_section(slot.section) {
        let value = match field {
            SlotField::EquipmentType if slot.equipment.equipment_type.is_empty() => Value::Null,
            SlotField::EquipmentType => Value::String(slot.equipment.equipment_type.clone()),
            SlotField::Make => optional(slot.equipment.make.as_ref()),
            SlotField::Model => optional(slot.equipment.model.as_ref()),
            SlotField::AmpRating => optional(slot.equipment.amp_rating.as_ref()),
            SlotField::IsNew => Value::Bool(slot.equipment.is_new),
            SlotField::Active => Value::Bool(slot.active),
            SlotField::Trigger => optional(slot.trigger.as_ref()),
            SlotField::BlockName => optional(slot.block_name.as_ref()),
        };
        patch.set(field.key(slot.section, slot.system, index), value);
    }
    patch
}

/// Cleared slot payload
fn clear_slot(section: BosSection, system: SystemNumber, index: usize) -> FieldPatch {
    let mut patch = FieldPatch::new();
    for field in SlotField::for_section(section) {
        let key = field.key(section, system, index);
        match field {
            SlotField::IsNew => patch.set(key, true),
            SlotField::Active => patch.set(key, false),
            _ => patch.clear(key),
        }
    }
    patch
}

fn slot_has_data(
    snapshot: &SystemSnapshot,
    section: BosSection,
    system: SystemNumber,
    index: usize,
) -> bool {
    [
        SlotField::EquipmentType,
        SlotField::Make,
        SlotField::Model,
        SlotField::AmpRating,
        SlotField::Trigger,
        SlotField::BlockName,
    ]
    .iter()
    .any(|field| snapshot.display(&field.key(section, system, index)).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluxion_bos_types::equipment_types as types;

    fn sys(n: u8) -> SystemNumber {
        SystemNumber::new(n).unwrap()
    }

    fn store() -> BosSlotStore {
        BosSlotStore::default()
    }

    /// Snapshot with `types` inserted one after another
    fn filled(section: BosSection, system: SystemNumber, names: &[&str]) -> SystemSnapshot {
        let store = store();
        let mut snapshot = SystemSnapshot::new();
        for name in names {
            let (_, patch) = store
                .insert(&snapshot, section, system, SlotEquipment::new(*name), None)
                .unwrap();
            snapshot.apply(&patch);
        }
        snapshot
    }

    fn types_in(snapshot: &SystemSnapshot, section: BosSection, system: SystemNumber) -> Vec<(usize, String)> {
        store()
            .list_populated(snapshot, section, system)
            .into_iter()
            .map(|slot| (slot.index, slot.equipment.equipment_type))
            .collect()
    }

    #[test]
    fn test_insert_fills_in_order() {
        let store = store();
        let snapshot = SystemSnapshot::new();
        let equipment = SlotEquipment::new(types::PV_METER)
            .with_part("MILBANK", "U5929XL")
            .with_amp_rating("100");
        let (index, patch) = store
            .insert(&snapshot, BosSection::Utility, sys(1), equipment, Some("sys1_stringCombiner"))
            .unwrap();

        assert_eq!(index, 1);
        assert_eq!(
            patch.get("bos_sys1_type1_equipment_type"),
            Some(&Value::String("PV Meter".into()))
        );
        assert_eq!(
            patch.get("bos_sys1_type1_block_name"),
            Some(&Value::String("PRE COMBINE".into()))
        );
        assert_eq!(patch.get("bos_sys1_type1_active"), Some(&Value::Bool(true)));

        let mut after = snapshot;
        after.apply(&patch);
        assert_eq!(store.next_free_slot(&after, BosSection::Utility, sys(1)), Some(2));
        let slot = store.read_slot(&after, BosSection::Utility, sys(1), 1).unwrap();
        assert_eq!(slot.equipment.amp_rating.as_deref(), Some("100"));
        assert_eq!(slot.trigger.as_deref(), Some("sys1_stringCombiner"));
    }

    #[test]
    fn test_battery_sections_never_write_active() {
        let (_, patch) = store()
            .insert(
                &SystemSnapshot::new(),
                BosSection::Battery1,
                sys(1),
                SlotEquipment::new(types::AC_DISCONNECT),
                None,
            )
            .unwrap();
        assert!(patch.iter().all(|(key, _)| !key.ends_with("_active")));
    }

    #[test]
    fn test_full_section_reports_slots_full() {
        let names = ["A", "B", "C", "D", "E", "F"];
        let snapshot = filled(BosSection::Backup, sys(2), &names);
        assert_eq!(
            types_in(&snapshot, BosSection::Backup, sys(2)).len(),
            names.len()
        );

        let result = store().insert(
            &snapshot,
            BosSection::Backup,
            sys(2),
            SlotEquipment::new("G"),
            None,
        );
        assert!(matches!(result, Err(BosError::SlotsFull { .. })));
        assert_eq!(store().next_free_slot(&snapshot, BosSection::Backup, sys(2)), None);
    }

    #[test]
    fn test_every_section_takes_six_items() {
        for section in BosSection::all() {
            let snapshot = filled(*section, sys(1), &["A", "B", "C", "D", "E", "F"]);
            assert_eq!(
                store().list_populated(&snapshot, *section, sys(1)).len(),
                6,
                "{section}"
            );
        }
    }

    #[test]
    fn test_remove_shifts_later_slots_down() {
        let names = ["A", "B", "C", "D", "E"];
        for k in 1..=names.len() {
            let mut snapshot = filled(BosSection::Utility, sys(1), &names);
            let patch = store()
                .remove(&snapshot, BosSection::Utility, sys(1), k)
                .unwrap();
            snapshot.apply(&patch);

            let expected: Vec<(usize, String)> = names
                .iter()
                .enumerate()
                .filter(|(i, _)| i + 1 != k)
                .enumerate()
                .map(|(position, (_, name))| (position + 1, (*name).to_owned()))
                .collect();
            assert_eq!(types_in(&snapshot, BosSection::Utility, sys(1)), expected, "k={k}");
            for index in names.len()..=6 {
                assert!(
                    snapshot
                        .get(&SlotField::EquipmentType.key(BosSection::Utility, sys(1), index))
                        .is_none()
                );
            }
        }
    }

    #[test]
    fn test_remove_empty_slot_is_noop() {
        let snapshot = filled(BosSection::PostSms, sys(1), &["A"]);
        let patch = store()
            .remove(&snapshot, BosSection::PostSms, sys(1), 3)
            .unwrap();
        assert!(patch.is_empty());
        assert!(matches!(
            store().remove(&snapshot, BosSection::PostSms, sys(1), 7),
            Err(BosError::InvalidSlot { slot: 7, capacity: 6 })
        ));
    }

    #[test]
    fn test_compact_is_idempotent() {
        let store = store();
        let mut snapshot = filled(BosSection::Utility, sys(1), &["A", "B"]);
        assert!(store.compact(&snapshot, BosSection::Utility, sys(1)).is_empty());

        // Gap left by an external writer
        snapshot.set("bos_sys1_type5_equipment_type", "C");
        snapshot.apply(&clear_slot(BosSection::Utility, sys(1), 1));
        let patch = store.compact(&snapshot, BosSection::Utility, sys(1));
        snapshot.apply(&patch);
        assert_eq!(
            types_in(&snapshot, BosSection::Utility, sys(1)),
            vec![(1, "B".to_owned()), (2, "C".to_owned())]
        );
        assert!(store.compact(&snapshot, BosSection::Utility, sys(1)).is_empty());
    }

    #[test]
    fn test_reorder_chain() {
        let store = store();
        let mut snapshot = filled(BosSection::Battery1, sys(1), &["A", "B", "C"]);
        let patch = store
            .reorder_chain(&snapshot, BosSection::Battery1, sys(1), &[3, 1, 2])
            .unwrap();
        snapshot.apply(&patch);
        assert_eq!(
            types_in(&snapshot, BosSection::Battery1, sys(1)),
            vec![(1, "C".to_owned()), (2, "A".to_owned()), (3, "B".to_owned())]
        );

        assert!(matches!(
            store.reorder_chain(&snapshot, BosSection::Battery1, sys(1), &[1, 1, 2]),
            Err(BosError::InvalidReorder(_))
        ));
        assert!(matches!(
            store.reorder_chain(&snapshot, BosSection::Utility, sys(1), &[]),
            Err(BosError::InvalidReorder(_))
        ));
    }

    #[test]
    fn test_clear_system_leaves_other_systems() {
        let store = store();
        let mut snapshot = filled(BosSection::Utility, sys(1), &["A", "B"]);
        let other = filled(BosSection::Backup, sys(2), &["X"]);
        let (_, patch) = store
            .insert(&snapshot, BosSection::Backup, sys(1), SlotEquipment::new("Y"), None)
            .unwrap();
        snapshot.apply(&patch);
        for (key, value) in other.iter() {
            snapshot.set(key.clone(), value.clone());
        }

        let patch = store.clear_system(&snapshot, sys(1));
        snapshot.apply(&patch);
        assert!(store.list_populated(&snapshot, BosSection::Utility, sys(1)).is_empty());
        assert!(store.list_populated(&snapshot, BosSection::Backup, sys(1)).is_empty());
        assert_eq!(store.list_populated(&snapshot, BosSection::Backup, sys(2)).len(), 1);
        assert!(store.clear_system(&snapshot, sys(1)).is_empty());
    }

    #[test]
    fn test_capacity_from_config() {
        let mut config = EngineConfig::default();
        config.slot_capacities.post_sms = 1;
        let store = BosSlotStore::from_config(&config);
        let snapshot = filled(BosSection::PostSms, sys(1), &["A"]);
        assert_eq!(store.next_free_slot(&snapshot, BosSection::PostSms, sys(1)), None);

        let compact = BosSlotStore::new(SlotCapacities::compact_layout());
        let snapshot = filled(BosSection::Backup, sys(1), &["A", "B", "C"]);
        assert_eq!(compact.next_free_slot(&snapshot, BosSection::Backup, sys(1)), None);
        assert_eq!(compact.next_free_slot(&snapshot, BosSection::Utility, sys(1)), Some(1));
        assert_eq!(
            BosSlotStore::default().next_free_slot(&snapshot, BosSection::Backup, sys(1)),
            Some(4)
        );
    }

    #[test]
    fn test_slot_with_only_a_make_is_occupied() {
        let store = store();
        let mut snapshot = SystemSnapshot::new();
        snapshot.set("bos_sys1_type1_make", "EATON");

        let slot = store
            .read_slot(&snapshot, BosSection::Utility, sys(1), 1)
            .unwrap();
        assert_eq!(slot.equipment_type(), "");
        assert_eq!(slot.equipment.make.as_deref(), Some("EATON"));
        assert_eq!(store.next_free_slot(&snapshot, BosSection::Utility, sys(1)), Some(2));

        let (index, patch) = store
            .insert(&snapshot, BosSection::Utility, sys(1), SlotEquipment::new("A"), None)
            .unwrap();
        assert_eq!(index, 2);
        assert!(patch.get("bos_sys1_type1_make").is_none());
        snapshot.apply(&patch);
        assert_eq!(
            types_in(&snapshot, BosSection::Utility, sys(1)),
            vec![(1, String::new()), (2, "A".to_owned())]
        );

        // Removing the partial slot compacts like any other
        let mut removed = snapshot.clone();
        removed.apply(&store.remove(&snapshot, BosSection::Utility, sys(1), 1).unwrap());
        assert_eq!(
            types_in(&removed, BosSection::Utility, sys(1)),
            vec![(1, "A".to_owned())]
        );

        snapshot.apply(&store.clear_section(&snapshot, BosSection::Utility, sys(1)));
        assert!(store.list_populated(&snapshot, BosSection::Utility, sys(1)).is_empty());
        assert_eq!(snapshot.text("bos_sys1_type1_make"), None);
    }

    #[test]
    fn test_blank_strings_do_not_occupy_a_slot() {
        let mut snapshot = SystemSnapshot::new();
        snapshot.set("bos_sys1_type1_equipment_type", "  ");
        snapshot.set("bos_sys1_type1_make", "");
        assert!(store().read_slot(&snapshot, BosSection::Utility, sys(1), 1).is_none());
        assert_eq!(store().next_free_slot(&snapshot, BosSection::Utility, sys(1)), Some(1));
    }
}
