use super::state::SlotState;
use crate::types::{ItemId, ItemStack};

/// State and reserved item for a single inventory slot.
///
/// `reserved_item` is only ever set while the state is Reserved or Locked.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SlotAnnotation {
    state: SlotState,
    reserved_item: Option<ItemId>,
}

impl SlotAnnotation {
    pub const NORMAL: SlotAnnotation = SlotAnnotation {
        state: SlotState::Normal,
        reserved_item: None,
    };

    /// Unannotated slot
    pub fn normal() -> Self {
        Self::default()
    }

    /// Build an annotation, dropping the item when the state is Normal
    pub fn new(state: SlotState, reserved_item: Option<ItemId>) -> Self {
        let reserved_item = if state.is_annotated() {
            reserved_item.filter(|id| !id.is_empty())
        } else {
            None
        };
        Self {
            state,
            reserved_item,
        }
    }

    pub fn state(&self) -> SlotState {
        self.state
    }

    pub fn reserved_item(&self) -> Option<&ItemId> {
        self.reserved_item.as_ref()
    }

    pub fn is_normal(&self) -> bool {
        self.state == SlotState::Normal
    }

    /// True if the stack is non-empty and is the reserved item
    pub fn matches(&self, stack: &ItemStack) -> bool {
        match &self.reserved_item {
            Some(reserved) => !stack.is_empty() && &stack.item == reserved,
            None => false,
        }
    }

    /// Advance to the next state. `current` is whatever sits in the slot right now;
    /// it becomes the reservation when entering Reserved.
    pub fn cycle(&mut self, current: Option<&ItemStack>) {
        match self.state {
            SlotState::Normal => {
                self.state = SlotState::Reserved;
                self.reserved_item = current
                    .filter(|stack| !stack.is_empty())
                    .map(|stack| stack.item.clone());
            }
            SlotState::Reserved => {
                self.state = SlotState::Locked;
            }
            SlotState::Locked => {
                self.state = SlotState::Normal;
                self.reserved_item = None;
            }
        }
    }
}
