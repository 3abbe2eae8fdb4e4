pub mod annotation;
pub mod state;
pub mod store;

pub use annotation::SlotAnnotation;
pub use state::SlotState;
pub use store::{SlotStore, ToggleError};
