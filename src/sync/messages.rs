use crate::slots::{SlotAnnotation, SlotState, SlotStore};
use crate::types::{ItemId, SlotIndex, EMPTY_ITEM_ID};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unknown slot state ordinal {0}")]
    UnknownState(u8),
    #[error("unknown slot state {0:?}")]
    UnknownStateName(String),
    #[error("unresolvable item identifier {0:?}")]
    InvalidItem(String),
}

/// One slot as it travels on the wire.
///
/// `item` is always present; the air identifier stands for "no reservation".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireSlot {
    pub slot: u32,
    pub state: u8,
    pub item: String,
}

impl WireSlot {
    pub fn from_annotation(slot: SlotIndex, annotation: &SlotAnnotation) -> Self {
        Self {
            slot: slot as u32,
            state: annotation.state().ordinal(),
            item: annotation
                .reserved_item()
                .map(|id| id.to_string())
                .unwrap_or_else(|| EMPTY_ITEM_ID.to_string()),
        }
    }

    /// Parse one snapshot entry on its own
    pub fn from_value(entry: &Value) -> Result<Self, DecodeError> {
        Ok(WireSlot::deserialize(entry)?)
    }

    pub fn to_value(&self) -> Value {
        json!({ "slot": self.slot, "state": self.state, "item": self.item })
    }

    pub fn decode(&self) -> Result<(SlotIndex, SlotAnnotation), DecodeError> {
        let state =
            SlotState::from_ordinal(self.state).ok_or(DecodeError::UnknownState(self.state))?;
        let item = ItemId::parse(&self.item).map_err(|_| DecodeError::InvalidItem(self.item.clone()))?;
        Ok((self.slot as SlotIndex, SlotAnnotation::new(state, Some(item))))
    }
}

/// Authority -> observer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Single-slot delta, sent after a successful toggle
    SyncSlot(WireSlot),
    /// Full replace of the observer's state, sent on attach. Entries stay
    /// raw so a bad one cannot sink the whole message.
    FullSync { slots: Vec<Value> },
}

/// Observer -> authority
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    ToggleSlot { slot: u32 },
}

impl ServerMessage {
    pub fn delta(slot: SlotIndex, annotation: &SlotAnnotation) -> Self {
        ServerMessage::SyncSlot(WireSlot::from_annotation(slot, annotation))
    }

    /// Snapshot of every non-Normal slot in the store
    pub fn snapshot(store: &SlotStore) -> Self {
        ServerMessage::FullSync {
            slots: store
                .iter()
                .map(|(slot, annotation)| WireSlot::from_annotation(slot, annotation).to_value())
                .collect(),
        }
    }
}

/// Decode snapshot entries into a fresh store, skipping entries that fail
pub fn decode_entries(entries: &[Value]) -> SlotStore {
    entries
        .iter()
        .filter_map(|entry| match WireSlot::from_value(entry).and_then(|wire| wire.decode()) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                warn!("Skipping entry {} in sync message: {}", entry, e);
                None
            }
        })
        .collect()
}

pub fn encode_server_message(msg: &ServerMessage) -> Result<String, serde_json::Error> {
    serde_json::to_string(msg)
}

pub fn decode_server_message(text: &str) -> Result<ServerMessage, DecodeError> {
    Ok(serde_json::from_str(text)?)
}

pub fn encode_client_message(msg: &ClientMessage) -> Result<String, serde_json::Error> {
    serde_json::to_string(msg)
}

pub fn decode_client_message(text: &str) -> Result<ClientMessage, DecodeError> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotation(state: SlotState, item: &str) -> SlotAnnotation {
        SlotAnnotation::new(state, Some(ItemId::parse(item).unwrap()))
    }

    #[test]
    fn test_delta_wire_format() {
        let msg = ServerMessage::delta(4, &annotation(SlotState::Locked, "shield"));
        let text = encode_server_message(&msg).unwrap();
        assert_eq!(
            text,
            r#"{"type":"sync_slot","data":{"slot":4,"state":2,"item":"minecraft:shield"}}"#
        );
        assert_eq!(decode_server_message(&text).unwrap(), msg);
    }

    #[test]
    fn test_normal_delta_uses_air_sentinel() {
        let msg = ServerMessage::delta(1, &SlotAnnotation::normal());
        let ServerMessage::SyncSlot(wire) = &msg else {
            panic!("expected a delta");
        };
        assert_eq!(wire.item, EMPTY_ITEM_ID);
        let (_, decoded) = wire.decode().unwrap();
        assert_eq!(decoded, SlotAnnotation::normal());
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut store = SlotStore::new();
        store.set(0, annotation(SlotState::Reserved, "torch"));
        store.set(35, annotation(SlotState::Locked, "water_bucket"));

        let text = encode_server_message(&ServerMessage::snapshot(&store)).unwrap();
        let ServerMessage::FullSync { slots } = decode_server_message(&text).unwrap() else {
            panic!("expected a snapshot");
        };
        assert_eq!(decode_entries(&slots), store);
    }

    #[test]
    fn test_bad_entries_are_skipped() {
        let entries = vec![
            json!({ "slot": 1, "state": 9, "item": "minecraft:dirt" }),
            json!({ "slot": 2, "state": 1, "item": "Not An Id" }),
            json!({ "slot": 4, "state": 300, "item": "minecraft:dirt" }),
            json!({ "slot": -1, "state": 1, "item": "minecraft:dirt" }),
            json!({ "slot": "six", "state": 1, "item": "minecraft:dirt" }),
            json!("garbage"),
            json!({ "slot": 3, "state": 1, "item": "minecraft:dirt" }),
        ];
        let store = decode_entries(&entries);
        assert_eq!(store.len(), 1);
        assert_eq!(store.state(3), SlotState::Reserved);
    }

    #[test]
    fn test_snapshot_with_out_of_range_entry_still_decodes() {
        let text = r#"{"type":"full_sync","data":{"slots":[
            {"slot":1,"state":300,"item":"minecraft:dirt"},
            {"slot":2,"state":1,"item":"minecraft:dirt"}
        ]}}"#;
        let ServerMessage::FullSync { slots } = decode_server_message(text).unwrap() else {
            panic!("expected a snapshot");
        };
        assert_eq!(slots.len(), 2);
        let store = decode_entries(&slots);
        assert_eq!(store.len(), 1);
        assert_eq!(store.state(2), SlotState::Reserved);
    }

    #[test]
    fn test_client_toggle_message() {
        let text = encode_client_message(&ClientMessage::ToggleSlot { slot: 7 }).unwrap();
        assert_eq!(text, r#"{"type":"toggle_slot","data":{"slot":7}}"#);
        assert!(matches!(
            decode_client_message(&text).unwrap(),
            ClientMessage::ToggleSlot { slot: 7 }
        ));
        assert!(decode_client_message("{\"type\":\"explode\"}").is_err());
    }
}
