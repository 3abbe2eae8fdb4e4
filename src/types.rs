use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Index of a slot in the player's main inventory
pub type SlotIndex = usize;

/// Main carry slots covered by placement routing (hotbar + 27 storage slots).
/// Armor and offhand are out of scope.
pub const MAIN_INVENTORY_SIZE: usize = 36;

/// Sentinel identifier meaning "no item"
pub const EMPTY_ITEM_ID: &str = "minecraft:air";

/// Namespace assumed when an identifier has none
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// Default maximum stack size for most items
pub const DEFAULT_MAX_COUNT: u32 = 64;

static IDENTIFIER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9_.-]+:[a-z0-9_./-]+$").expect("identifier pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid item identifier: {0:?}")]
pub struct InvalidItemId(pub String);

/// Namespaced item identifier such as `minecraft:cobblestone`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId(String);

impl ItemId {
    /// Parse an identifier, defaulting the namespace to `minecraft`
    pub fn parse(raw: &str) -> Result<Self, InvalidItemId> {
        let trimmed = raw.trim();
        let full = if trimmed.contains(':') {
            trimmed.to_string()
        } else {
            format!("{}:{}", DEFAULT_NAMESPACE, trimmed)
        };

        if IDENTIFIER_RE.is_match(&full) {
            Ok(Self(full))
        } else {
            Err(InvalidItemId(raw.to_string()))
        }
    }

    pub fn empty() -> Self {
        Self(EMPTY_ITEM_ID.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the air sentinel
    pub fn is_empty(&self) -> bool {
        self.0 == EMPTY_ITEM_ID
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ItemId {
    type Err = InvalidItemId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ItemId {
    type Error = InvalidItemId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

/// Represents a stack of items in an inventory slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: ItemId,
    pub count: u32,
    #[serde(default = "default_max_count")]
    pub max_count: u32,
    /// Item-specific data (enchantments, custom names, ...). Stacks only merge
    /// when this is equal.
    #[serde(default)]
    pub components: Option<serde_json::Value>,
}

fn default_max_count() -> u32 {
    DEFAULT_MAX_COUNT
}

impl ItemStack {
    pub fn new(item: ItemId, count: u32) -> Self {
        Self {
            item,
            count,
            max_count: DEFAULT_MAX_COUNT,
            components: None,
        }
    }

    pub fn with_max_count(mut self, max_count: u32) -> Self {
        self.max_count = max_count;
        self
    }

    pub fn with_components(mut self, components: serde_json::Value) -> Self {
        self.components = Some(components);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0 || self.item.is_empty()
    }

    /// Same item and same item-specific data
    pub fn can_merge(&self, other: &ItemStack) -> bool {
        self.item == other.item && self.components == other.components
    }

    pub fn remaining_space(&self) -> u32 {
        self.max_count.saturating_sub(self.count)
    }

    /// True if `incoming` could be merged into this stack right now
    pub fn has_room_for(&self, incoming: &ItemStack) -> bool {
        !self.is_empty() && self.can_merge(incoming) && self.remaining_space() > 0
    }

    /// Move as many items as fit from `incoming` into this stack.
    /// Returns the amount moved.
    pub fn absorb(&mut self, incoming: &mut ItemStack) -> u32 {
        let moved = incoming.count.min(self.remaining_space());
        self.count += moved;
        incoming.count -= moved;
        moved
    }
}
