//! Observing-side view of a player's slot annotations
//!
//! Fed only by server messages. Renderers query it; it never decides placement.

use super::messages::{decode_entries, decode_server_message, DecodeError, ServerMessage};
use crate::slots::{SlotAnnotation, SlotState, SlotStore};
use crate::types::SlotIndex;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default)]
pub struct ObservedSlots {
    slots: SlotStore,
}

impl ObservedSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a decoded message. Deltas overwrite one slot; snapshots replace
    /// everything.
    pub fn apply(&mut self, msg: &ServerMessage) {
        match msg {
            ServerMessage::SyncSlot(wire) => match wire.decode() {
                Ok((slot, annotation)) => {
                    debug!("Slot {} is now {}", slot, annotation.state());
                    self.slots.set(slot, annotation);
                }
                Err(e) => warn!("Ignoring sync for slot {}: {}", wire.slot, e),
            },
            ServerMessage::FullSync { slots } => {
                self.slots = decode_entries(slots);
                debug!("Full sync: {} annotated slots", self.slots.len());
            }
        }
    }

    /// Decode and apply raw wire text
    pub fn apply_raw(&mut self, text: &str) -> Result<(), DecodeError> {
        let msg = decode_server_message(text)?;
        self.apply(&msg);
        Ok(())
    }

    pub fn get(&self, slot: SlotIndex) -> &SlotAnnotation {
        self.slots.get(slot)
    }

    pub fn is_reserved(&self, slot: SlotIndex) -> bool {
        self.slots.state(slot) == SlotState::Reserved
    }

    pub fn is_locked(&self, slot: SlotIndex) -> bool {
        self.slots.state(slot) == SlotState::Locked
    }

    pub fn slots(&self) -> &SlotStore {
        &self.slots
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::messages::WireSlot;

    fn wire(slot: u32, state: u8, item: &str) -> WireSlot {
        WireSlot {
            slot,
            state,
            item: item.to_string(),
        }
    }

    #[test]
    fn test_snapshot_replaces_stale_state() {
        let mut observed = ObservedSlots::new();
        observed.apply(&ServerMessage::SyncSlot(wire(5, 2, "minecraft:bow")));
        assert!(observed.is_locked(5));

        observed.apply(&ServerMessage::FullSync {
            slots: vec![wire(8, 1, "minecraft:arrow").to_value()],
        });
        assert!(!observed.is_locked(5));
        assert!(observed.is_reserved(8));
        assert_eq!(observed.slots().len(), 1);
    }

    #[test]
    fn test_snapshot_with_bad_entry_still_replaces() {
        let mut observed = ObservedSlots::new();
        observed.apply(&ServerMessage::SyncSlot(wire(9, 2, "minecraft:bow")));

        observed
            .apply_raw(
                r#"{"type":"full_sync","data":{"slots":[
                    {"slot":1,"state":300,"item":"minecraft:dirt"},
                    {"slot":2,"state":1,"item":"minecraft:dirt"}
                ]}}"#,
            )
            .unwrap();
        assert!(!observed.is_locked(9));
        assert!(observed.is_reserved(2));
        assert_eq!(observed.slots().len(), 1);
    }

    #[test]
    fn test_empty_snapshot_clears() {
        let mut observed = ObservedSlots::new();
        observed.apply(&ServerMessage::SyncSlot(wire(0, 1, "minecraft:bread")));
        observed.apply_raw(r#"{"type":"full_sync","data":{"slots":[]}}"#).unwrap();
        assert!(observed.slots().is_empty());
    }

    #[test]
    fn test_normal_delta_clears_slot() {
        let mut observed = ObservedSlots::new();
        observed.apply(&ServerMessage::SyncSlot(wire(3, 2, "minecraft:shield")));
        observed.apply(&ServerMessage::SyncSlot(wire(3, 0, "minecraft:air")));
        assert_eq!(observed.get(3), &SlotAnnotation::normal());
    }

    #[test]
    fn test_bad_delta_leaves_state_untouched() {
        let mut observed = ObservedSlots::new();
        observed.apply(&ServerMessage::SyncSlot(wire(3, 1, "minecraft:shield")));
        observed.apply(&ServerMessage::SyncSlot(wire(3, 7, "minecraft:shield")));
        assert!(observed.is_reserved(3));
        assert!(observed.apply_raw("not json").is_err());
    }
}
