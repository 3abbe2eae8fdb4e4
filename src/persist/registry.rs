use super::store::{DurableStore, PersistError};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

pub type SharedStore = Arc<Mutex<DurableStore>>;

/// Open durable stores, one per world directory.
///
/// Stores are opened when a world starts and closed (flushed and dropped)
/// when it stops, so a new world in the same save directory never sees a
/// stale cache.
pub struct StoreRegistry {
    file_name: String,
    stores: RwLock<HashMap<PathBuf, SharedStore>>,
}

impl StoreRegistry {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            stores: RwLock::new(HashMap::new()),
        }
    }

    /// Open the store for a world, reusing it if it is already open
    pub fn open(&self, world_dir: &Path) -> SharedStore {
        if let Some(store) = self.stores.read().get(world_dir) {
            return store.clone();
        }

        self.stores
            .write()
            .entry(world_dir.to_path_buf())
            .or_insert_with(|| {
                let path = world_dir.join(&self.file_name);
                info!("Opened reserved slot store at {:?}", path);
                Arc::new(Mutex::new(DurableStore::new(path)))
            })
            .clone()
    }

    pub fn get(&self, world_dir: &Path) -> Option<SharedStore> {
        self.stores.read().get(world_dir).cloned()
    }

    /// Flush and forget a world's store
    pub fn close(&self, world_dir: &Path) -> Result<(), PersistError> {
        let Some(store) = self.stores.write().remove(world_dir) else {
            return Ok(());
        };

        let mut store = store.lock();
        let result = store.flush();
        store.invalidate();
        info!("Closed reserved slot store at {:?}", store.path());
        result
    }

    /// Close every open store. Failures are logged; the rest still close.
    pub fn close_all(&self) {
        let worlds: Vec<PathBuf> = self.stores.read().keys().cloned().collect();
        for world in worlds {
            if let Err(e) = self.close(&world) {
                error!("Failed to flush reserved slot store for {:?}: {}", world, e);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.stores.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.read().is_empty()
    }
}
