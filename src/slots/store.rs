use super::annotation::SlotAnnotation;
use super::state::SlotState;
use crate::types::{ItemStack, SlotIndex};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

static NORMAL_SLOT: SlotAnnotation = SlotAnnotation::NORMAL;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ToggleError {
    #[error("cannot reserve empty slot {slot}")]
    SlotEmpty { slot: SlotIndex },
}

/// Sparse per-player map of slot annotations.
///
/// A missing entry and a Normal entry mean the same thing, so Normal
/// annotations are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotStore {
    slots: BTreeMap<SlotIndex, SlotAnnotation>,
}

impl SlotStore {
    pub const EMPTY: SlotStore = SlotStore {
        slots: BTreeMap::new(),
    };

    pub fn new() -> Self {
        Self::default()
    }

    /// Annotation for a slot, Normal when absent
    pub fn get(&self, slot: SlotIndex) -> &SlotAnnotation {
        self.slots.get(&slot).unwrap_or(&NORMAL_SLOT)
    }

    pub fn state(&self, slot: SlotIndex) -> SlotState {
        self.get(slot).state()
    }

    pub fn set(&mut self, slot: SlotIndex, annotation: SlotAnnotation) {
        if annotation.is_normal() {
            self.slots.remove(&slot);
        } else {
            self.slots.insert(slot, annotation);
        }
    }

    /// Cycle a slot's state. `current` is the slot's live contents.
    ///
    /// An empty Normal slot cannot start a reservation; the store is left
    /// untouched in that case.
    pub fn toggle(
        &mut self,
        slot: SlotIndex,
        current: Option<&ItemStack>,
    ) -> Result<SlotAnnotation, ToggleError> {
        let mut annotation = self.get(slot).clone();
        let has_item = current.is_some_and(|stack| !stack.is_empty());

        if annotation.is_normal() && !has_item {
            debug!("Cannot reserve empty slot {}", slot);
            return Err(ToggleError::SlotEmpty { slot });
        }

        annotation.cycle(current);
        self.set(slot, annotation.clone());
        Ok(annotation)
    }

    /// Non-Normal entries in slot order
    pub fn iter(&self) -> impl Iterator<Item = (SlotIndex, &SlotAnnotation)> {
        self.slots.iter().map(|(slot, annotation)| (*slot, annotation))
    }

    /// Number of non-Normal entries
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

impl FromIterator<(SlotIndex, SlotAnnotation)> for SlotStore {
    fn from_iter<T: IntoIterator<Item = (SlotIndex, SlotAnnotation)>>(iter: T) -> Self {
        let mut store = SlotStore::new();
        for (slot, annotation) in iter {
            store.set(slot, annotation);
        }
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ItemId;

    fn stack(id: &str) -> ItemStack {
        ItemStack::new(ItemId::parse(id).unwrap(), 1)
    }

    #[test]
    fn test_toggle_empty_normal_slot_fails() {
        let mut store = SlotStore::new();
        assert_eq!(store.toggle(4, None), Err(ToggleError::SlotEmpty { slot: 4 }));
        let air = ItemStack::new(ItemId::empty(), 1);
        assert_eq!(store.toggle(4, Some(&air)), Err(ToggleError::SlotEmpty { slot: 4 }));
        assert!(store.is_empty());
    }

    #[test]
    fn test_toggle_three_times_returns_to_normal() {
        let mut store = SlotStore::new();
        let apple = stack("apple");

        let first = store.toggle(3, Some(&apple)).unwrap();
        assert_eq!(first.state(), SlotState::Reserved);

        let second = store.toggle(3, Some(&apple)).unwrap();
        assert_eq!(second.state(), SlotState::Locked);
        assert_eq!(second.reserved_item(), first.reserved_item());

        let third = store.toggle(3, Some(&apple)).unwrap();
        assert!(third.is_normal());
        assert!(store.is_empty());
    }

    #[test]
    fn test_reserved_slot_can_advance_while_empty() {
        let mut store = SlotStore::new();
        store.toggle(0, Some(&stack("torch"))).unwrap();

        let locked = store.toggle(0, None).unwrap();
        assert_eq!(locked.state(), SlotState::Locked);
        assert_eq!(locked.reserved_item().map(|i| i.as_str()), Some("minecraft:torch"));
    }

    #[test]
    fn test_normal_entries_are_not_stored() {
        let mut store = SlotStore::new();
        store.set(7, SlotAnnotation::normal());
        assert!(store.is_empty());
        assert_eq!(store.get(7), &SlotAnnotation::normal());
    }
}
