//! Inventory manager
//!
//! Holds a player's main inventory contents and applies the insertion and
//! placement hooks on top of the allocation rules.

use super::allocation::{
    can_accept, find_placement, is_full_excluding_locked, AllocationPolicy, InventoryView,
};
use crate::slots::SlotStore;
use crate::types::{ItemId, ItemStack, SlotIndex, MAIN_INVENTORY_SIZE};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("slot {slot} is outside the main inventory")]
    OutOfRange { slot: SlotIndex },
    #[error("slot {slot} does not accept {item}")]
    Rejected { slot: SlotIndex, item: ItemId },
    #[error("slot {slot} holds a different item")]
    Occupied { slot: SlotIndex },
}

/// Inventory manager
#[derive(Debug, Clone)]
pub struct InventoryManager {
    /// Main inventory slots
    slots: Vec<Option<ItemStack>>,
}

impl InventoryManager {
    /// Create an empty inventory
    pub fn new() -> Self {
        Self {
            slots: vec![None; MAIN_INVENTORY_SIZE],
        }
    }

    /// Get item at slot
    pub fn get_slot(&self, slot: SlotIndex) -> Option<&ItemStack> {
        self.stack(slot)
    }

    /// Set item at slot, ignoring out-of-range indices
    pub fn set_slot(&mut self, slot: SlotIndex, item: Option<ItemStack>) {
        if slot < self.slots.len() {
            self.slots[slot] = item.filter(|stack| !stack.is_empty());
        }
    }

    /// Clear all slots
    pub fn clear(&mut self) {
        self.slots = vec![None; MAIN_INVENTORY_SIZE];
    }

    /// Find the first slot holding an item
    pub fn find_by_item(&self, item: &ItemId) -> Option<SlotIndex> {
        (0..self.slots.len()).find(|&slot| self.stack(slot).is_some_and(|s| &s.item == item))
    }

    /// Total count of an item across the inventory
    pub fn count_of(&self, item: &ItemId) -> u32 {
        self.slots
            .iter()
            .flatten()
            .filter(|stack| &stack.item == item)
            .map(|stack| stack.count)
            .sum()
    }

    /// Insertion hook: route `stack` through the allocation rules until it is
    /// used up or no slot will take it. Returns the number of items inserted;
    /// whatever is left stays in `stack`.
    pub fn insert_stack(
        &mut self,
        store: &SlotStore,
        stack: &mut ItemStack,
        policy: AllocationPolicy,
    ) -> u32 {
        let mut inserted = 0;

        while !stack.is_empty() {
            let Some(placement) = find_placement(store, &*self, stack, policy) else {
                break;
            };

            let moved = self.put(placement.slot, stack);
            if moved == 0 {
                break;
            }
            inserted += moved;
            debug!(
                "{} {} x{} into slot {} ({:?})",
                if placement.rule.is_stacking() { "Merged" } else { "Placed" },
                stack.item,
                moved,
                placement.slot,
                placement.rule
            );
        }

        if !stack.is_empty() && is_full_excluding_locked(store, &*self) {
            debug!("Inventory full, {} x{} left over", stack.item, stack.count);
        }

        inserted
    }

    /// Slot-validity hook for direct placements (drag-and-drop, shift-click).
    /// Returns what did not fit.
    pub fn place_stack(
        &mut self,
        store: &SlotStore,
        slot: SlotIndex,
        mut stack: ItemStack,
        policy: AllocationPolicy,
    ) -> Result<Option<ItemStack>, PlacementError> {
        if slot >= self.slots.len() {
            return Err(PlacementError::OutOfRange { slot });
        }
        if !can_accept(store, &*self, slot, &stack, policy) {
            return Err(PlacementError::Rejected {
                slot,
                item: stack.item,
            });
        }
        if let Some(existing) = self.stack(slot) {
            if !existing.can_merge(&stack) {
                return Err(PlacementError::Occupied { slot });
            }
        }

        self.put(slot, &mut stack);
        Ok(Some(stack).filter(|rest| !rest.is_empty()))
    }

    /// Merge into or fill `slot` from `stack`, returning the amount moved
    fn put(&mut self, slot: SlotIndex, stack: &mut ItemStack) -> u32 {
        match self.slots[slot].as_mut().filter(|existing| !existing.is_empty()) {
            Some(existing) => existing.absorb(stack),
            None => {
                let moved = stack.count.min(stack.max_count);
                let mut placed = stack.clone();
                placed.count = moved;
                stack.count -= moved;
                self.slots[slot] = Some(placed).filter(|s| !s.is_empty());
                moved
            }
        }
    }
}

impl InventoryView for InventoryManager {
    fn stack(&self, slot: SlotIndex) -> Option<&ItemStack> {
        self.slots.as_slice().stack(slot)
    }
}

impl Default for InventoryManager {
    fn default() -> Self {
        Self::new()
    }
}
