use super::record::{DurableRecord, PersistedSlot};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info, warn};

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize slot data: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// On-disk layout: player key -> stored slots
#[derive(Debug, Serialize, Deserialize)]
struct SaveFile {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    saved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    players: BTreeMap<String, serde_json::Value>,
}

fn default_version() -> u32 {
    FORMAT_VERSION
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> PersistError {
    let path = path.to_path_buf();
    move |source| PersistError::Io { path, source }
}

/// File-backed slot data for one world.
///
/// The file is read on first access and cached; every change is written
/// straight back. The in-memory copy is only ever a cache of the file.
#[derive(Debug)]
pub struct DurableStore {
    path: PathBuf,
    players: BTreeMap<String, DurableRecord>,
    loaded: bool,
    dirty: bool,
}

impl DurableStore {
    /// Create a handle; nothing is read until the first lookup
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            players: BTreeMap::new(),
            loaded: false,
            dirty: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_loaded(&mut self) {
        if self.loaded {
            return;
        }
        self.loaded = true;
        self.players = Self::read_file(&self.path);
    }

    /// Read failures are logged and treated as "no prior data"
    fn read_file(path: &Path) -> BTreeMap<String, DurableRecord> {
        info!("Loading reserved slot data from {:?}", path);

        if !path.exists() {
            info!("No saved data found, starting fresh");
            return BTreeMap::new();
        }

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                error!("Failed to read reserved slot data from {:?}: {}", path, e);
                return BTreeMap::new();
            }
        };

        let file: SaveFile = match serde_json::from_str(&contents) {
            Ok(file) => file,
            Err(e) => {
                error!("Failed to parse reserved slot data in {:?}: {}", path, e);
                return BTreeMap::new();
            }
        };

        if file.version != FORMAT_VERSION {
            warn!(
                "Reserved slot data has format version {}, expected {}",
                file.version, FORMAT_VERSION
            );
        }

        let players: BTreeMap<String, DurableRecord> = file
            .players
            .into_iter()
            .filter_map(|(player_key, raw)| {
                let serde_json::Value::Array(raw_slots) = raw else {
                    warn!("Skipping malformed record for {}: not a list of slots", player_key);
                    return None;
                };
                let slots = raw_slots
                    .into_iter()
                    .filter_map(|raw| match serde_json::from_value::<PersistedSlot>(raw) {
                        Ok(slot) => Some(slot),
                        Err(e) => {
                            warn!("Skipping malformed slot entry for {}: {}", player_key, e);
                            None
                        }
                    })
                    .collect();
                let record = DurableRecord {
                    player_key: player_key.clone(),
                    slots,
                };
                Some((player_key, record))
            })
            .collect();

        info!("Loaded reserved slot data for {} players", players.len());
        players
    }

    /// Stored record for a player key
    pub fn get(&mut self, player_key: &str) -> Option<&DurableRecord> {
        self.ensure_loaded();
        self.players.get(player_key)
    }

    pub fn player_keys(&mut self) -> Vec<String> {
        self.ensure_loaded();
        self.players.keys().cloned().collect()
    }

    /// Replace a player's record and write the file. An empty record removes
    /// the key.
    pub fn put(&mut self, record: DurableRecord) -> Result<(), PersistError> {
        self.ensure_loaded();
        if record.is_empty() {
            self.players.remove(&record.player_key);
        } else {
            self.players.insert(record.player_key.clone(), record);
        }
        self.dirty = true;
        self.save()
    }

    /// Write everything to disk via a temp file and rename
    pub fn save(&mut self) -> Result<(), PersistError> {
        let players = self
            .players
            .iter()
            .map(|(key, record)| {
                let slots = record
                    .slots
                    .iter()
                    .map(serde_json::to_value)
                    .collect::<Result<Vec<_>, _>>()?;
                let slots = serde_json::Value::Array(slots);
                Ok::<_, serde_json::Error>((key.clone(), slots))
            })
            .collect::<Result<BTreeMap<_, _>, serde_json::Error>>()?;

        let file = SaveFile {
            version: FORMAT_VERSION,
            saved_at: Some(Utc::now()),
            players,
        };
        let json = serde_json::to_string_pretty(&file)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(io_error(&tmp))?;
        fs::rename(&tmp, &self.path).map_err(io_error(&self.path))?;

        self.dirty = false;
        debug!(
            "Saved reserved slot data for {} players to {:?}",
            self.players.len(),
            self.path
        );
        Ok(())
    }

    /// Write pending changes, if any
    pub fn flush(&mut self) -> Result<(), PersistError> {
        if self.dirty {
            self.save()?;
        }
        Ok(())
    }

    /// Drop the cache so the next access re-reads the file
    pub fn invalidate(&mut self) {
        self.players.clear();
        self.loaded = false;
        self.dirty = false;
    }
}
