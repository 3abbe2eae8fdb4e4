pub mod allocation;
pub mod manager;

pub use allocation::{
    can_accept, empty_slot, find_best_slot, find_placement, is_full_excluding_locked,
    occupied_slot_with_room, AllocationPolicy, InventoryView, Placement, PlacementRule,
};
pub use manager::{InventoryManager, PlacementError};
