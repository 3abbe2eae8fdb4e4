pub mod record;
pub mod registry;
pub mod store;

pub use record::{DurableRecord, PersistedSlot};
pub use registry::{SharedStore, StoreRegistry};
pub use store::{DurableStore, PersistError};
