use crate::config::Config;
use crate::inventory::{self, AllocationPolicy, InventoryManager, InventoryView};
use crate::persist::{DurableRecord, SharedStore};
use crate::slots::{SlotAnnotation, SlotStore, ToggleError};
use crate::sync::{decode_client_message, ClientMessage, DecodeError, ServerMessage};
use crate::types::{ItemStack, SlotIndex};
use crate::utils::clean_display_name;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

static NO_SLOTS: SlotStore = SlotStore::EMPTY;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Toggle(#[from] ToggleError),
    #[error("player {0} has no active session")]
    NotAttached(Uuid),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// How a player maps to a storage key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPolicy {
    /// Every player shares one key (non-networked sessions, where ids are not stable)
    Shared(String),
    /// Cleaned-up display name
    DisplayName,
}

impl KeyPolicy {
    pub fn from_config(config: &Config) -> Self {
        if config.singleplayer {
            KeyPolicy::Shared(config.shared_player_key.clone())
        } else {
            KeyPolicy::DisplayName
        }
    }

    pub fn resolve(&self, display_name: &str) -> String {
        match self {
            KeyPolicy::Shared(key) => key.clone(),
            KeyPolicy::DisplayName => clean_display_name(display_name),
        }
    }
}

/// Message for one player's observing side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub player: Uuid,
    pub message: ServerMessage,
}

#[derive(Debug)]
struct PlayerSession {
    player_key: String,
    display_name: String,
    slots: SlotStore,
}

/// Reserved slot state for one running world.
///
/// Owns every attached player's slot store and the handle to the world's
/// durable store. Per-player state only lives here between attach and detach.
pub struct SessionManager {
    key_policy: KeyPolicy,
    policy: AllocationPolicy,
    durable: SharedStore,
    sessions: HashMap<Uuid, PlayerSession>,
    outbound: mpsc::UnboundedSender<Outbound>,
}

impl SessionManager {
    pub fn new(
        config: &Config,
        durable: SharedStore,
    ) -> (Self, mpsc::UnboundedReceiver<Outbound>) {
        Self::with_policies(
            KeyPolicy::from_config(config),
            config.allocation_policy(),
            durable,
        )
    }

    pub fn with_policies(
        key_policy: KeyPolicy,
        policy: AllocationPolicy,
        durable: SharedStore,
    ) -> (Self, mpsc::UnboundedReceiver<Outbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let manager = Self {
            key_policy,
            policy,
            durable,
            sessions: HashMap::new(),
            outbound: tx,
        };
        (manager, rx)
    }

    pub fn allocation_policy(&self) -> AllocationPolicy {
        self.policy
    }

    /// Join hook: load the player's stored slots and send a full snapshot.
    /// A session already open for the same id is saved first.
    pub fn attach(&mut self, player: Uuid, display_name: &str) -> &SlotStore {
        if let Some(previous) = self.sessions.remove(&player) {
            debug!("Replacing open session for {}", previous.display_name);
            self.write_record(&previous);
        }

        let player_key = self.key_policy.resolve(display_name);
        info!(
            "Player {} joining with UUID: {} (storage key: {})",
            display_name, player, player_key
        );

        let slots = match self.durable.lock().get(&player_key) {
            Some(record) => {
                let slots = record.to_store();
                info!("Loaded {} reserved slots for {}", slots.len(), player_key);
                slots
            }
            None => {
                info!("No saved slots for {}", player_key);
                SlotStore::new()
            }
        };

        // Always sent, even when empty, so the observer drops stale state
        self.send(player, ServerMessage::snapshot(&slots));

        let session = PlayerSession {
            player_key,
            display_name: display_name.to_string(),
            slots,
        };
        self.sessions.insert(player, session);
        &self.sessions[&player].slots
    }

    /// Leave hook: persist and forget the player's slots
    pub fn detach(&mut self, player: Uuid) {
        let Some(session) = self.sessions.remove(&player) else {
            debug!("Detach for unknown player {}", player);
            return;
        };
        info!(
            "Player {} leaving (storage key: {})",
            session.display_name, session.player_key
        );
        self.write_record(&session);
    }

    /// Persist a player's slots without ending the session
    pub fn checkpoint(&mut self, player: Uuid) {
        if let Some(session) = self.sessions.get(&player) {
            self.write_record(session);
        }
    }

    /// Server-stop hook: persist everyone, then drop all in-memory state
    pub fn shutdown(&mut self) {
        info!("Saving reserved slots for {} players", self.sessions.len());
        for session in self.sessions.values() {
            self.write_record(session);
        }
        self.sessions.clear();
        info!("Cleared all reserved slot data from memory");
    }

    fn write_record(&self, session: &PlayerSession) {
        let record = DurableRecord::from_store(session.player_key.clone(), &session.slots);
        if let Err(e) = self.durable.lock().put(record) {
            error!(
                "Failed to save reserved slots for {}: {}",
                session.player_key, e
            );
        }
    }

    fn send(&self, player: Uuid, message: ServerMessage) {
        if self.outbound.send(Outbound { player, message }).is_err() {
            debug!("No observer listening for {}", player);
        }
    }

    pub fn is_attached(&self, player: Uuid) -> bool {
        self.sessions.contains_key(&player)
    }

    pub fn player_key(&self, player: Uuid) -> Option<&str> {
        self.sessions.get(&player).map(|s| s.player_key.as_str())
    }

    /// A player's slot annotations; all Normal for players without a session
    pub fn slots(&self, player: Uuid) -> &SlotStore {
        self.sessions
            .get(&player)
            .map(|session| &session.slots)
            .unwrap_or(&NO_SLOTS)
    }

    /// Toggle input: cycle the slot and send the delta
    pub fn toggle<I>(
        &mut self,
        player: Uuid,
        slot: SlotIndex,
        inventory: &I,
    ) -> Result<SlotAnnotation, SessionError>
    where
        I: InventoryView + ?Sized,
    {
        let session = self
            .sessions
            .get_mut(&player)
            .ok_or(SessionError::NotAttached(player))?;

        let annotation = match session.slots.toggle(slot, inventory.stack(slot)) {
            Ok(annotation) => annotation,
            Err(e) => {
                info!("{}: {}", session.display_name, e);
                return Err(e.into());
            }
        };

        info!(
            "Player {} toggled slot {} to {} with item {}",
            session.display_name,
            slot,
            annotation.state(),
            annotation
                .reserved_item()
                .map(|id| id.to_string())
                .unwrap_or_else(|| "none".to_string())
        );

        self.send(player, ServerMessage::delta(slot, &annotation));
        Ok(annotation)
    }

    /// Decode a request from the observing side and act on it
    pub fn handle_client_message<I>(
        &mut self,
        player: Uuid,
        text: &str,
        inventory: &I,
    ) -> Result<SlotAnnotation, SessionError>
    where
        I: InventoryView + ?Sized,
    {
        let message = decode_client_message(text).map_err(|e| {
            warn!("Bad message from {}: {}", player, e);
            e
        })?;

        match message {
            ClientMessage::ToggleSlot { slot } => {
                debug!("Toggle request from {} for slot {}", player, slot);
                self.toggle(player, slot as SlotIndex, inventory)
            }
        }
    }

    pub fn find_best_slot<I>(&self, player: Uuid, inventory: &I, stack: &ItemStack) -> Option<SlotIndex>
    where
        I: InventoryView + ?Sized,
    {
        inventory::find_best_slot(self.slots(player), inventory, stack, self.policy)
    }

    pub fn can_accept<I>(&self, player: Uuid, inventory: &I, slot: SlotIndex, stack: &ItemStack) -> bool
    where
        I: InventoryView + ?Sized,
    {
        inventory::can_accept(self.slots(player), inventory, slot, stack, self.policy)
    }

    /// Pickup path: route a stack into the player's inventory
    pub fn insert_stack(
        &self,
        player: Uuid,
        inventory: &mut InventoryManager,
        stack: &mut ItemStack,
    ) -> u32 {
        inventory.insert_stack(self.slots(player), stack, self.policy)
    }
}
