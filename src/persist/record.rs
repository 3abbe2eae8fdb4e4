use crate::slots::{SlotAnnotation, SlotState, SlotStore};
use crate::sync::DecodeError;
use crate::types::{ItemId, SlotIndex};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One stored slot: `{index, state, item}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSlot {
    pub index: u32,
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
}

impl PersistedSlot {
    pub fn from_annotation(index: SlotIndex, annotation: &SlotAnnotation) -> Self {
        Self {
            index: index as u32,
            state: annotation.state().name().to_string(),
            item: annotation.reserved_item().map(|id| id.to_string()),
        }
    }

    pub fn decode(&self) -> Result<(SlotIndex, SlotAnnotation), DecodeError> {
        let state = SlotState::from_name(&self.state)
            .ok_or_else(|| DecodeError::UnknownStateName(self.state.clone()))?;
        let item = match &self.item {
            Some(raw) => {
                Some(ItemId::parse(raw).map_err(|_| DecodeError::InvalidItem(raw.clone()))?)
            }
            None => None,
        };
        Ok((self.index as SlotIndex, SlotAnnotation::new(state, item)))
    }
}

/// Everything stored for one player key. Normal slots are never written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DurableRecord {
    pub player_key: String,
    pub slots: Vec<PersistedSlot>,
}

impl DurableRecord {
    pub fn from_store(player_key: impl Into<String>, store: &SlotStore) -> Self {
        Self {
            player_key: player_key.into(),
            slots: store
                .iter()
                .filter(|(_, annotation)| !annotation.is_normal())
                .map(|(index, annotation)| PersistedSlot::from_annotation(index, annotation))
                .collect(),
        }
    }

    /// Rebuild a slot store. Entries that fail to decode are skipped.
    pub fn to_store(&self) -> SlotStore {
        self.slots
            .iter()
            .filter_map(|entry| match entry.decode() {
                Ok(decoded) => Some(decoded),
                Err(e) => {
                    warn!(
                        "Skipping stored slot {} for {}: {}",
                        entry.index, self.player_key, e
                    );
                    None
                }
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
