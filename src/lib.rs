//! Reserved Slots for Minecraft player inventories
//!
//! Players can mark main-inventory slots as Reserved or Locked for a
//! particular item. Picked-up items are routed into those slots first,
//! the markings are mirrored to the player's client over a small JSON
//! protocol and survive restarts in a per-world data file.

pub mod config;
pub mod inventory;
pub mod logging;
pub mod persist;
pub mod session;
pub mod slots;
pub mod sync;
pub mod types;
pub mod utils;

pub use inventory::{AllocationPolicy, InventoryManager, InventoryView};
pub use session::{SessionManager, SessionError};
pub use slots::{SlotAnnotation, SlotState, SlotStore};
pub use types::{ItemId, ItemStack, SlotIndex};
