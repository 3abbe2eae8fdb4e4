use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-slot mode chosen by the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlotState {
    /// Regular slot, accepts anything
    #[default]
    Normal,
    /// Prefers its reserved item, still usable by others under pressure
    Reserved,
    /// Accepts only its reserved item
    Locked,
}

impl SlotState {
    pub const ALL: [SlotState; 3] = [SlotState::Normal, SlotState::Reserved, SlotState::Locked];

    /// Next state in the cycle Normal -> Reserved -> Locked -> Normal
    pub fn next(self) -> Self {
        match self {
            SlotState::Normal => SlotState::Reserved,
            SlotState::Reserved => SlotState::Locked,
            SlotState::Locked => SlotState::Normal,
        }
    }

    /// Wire ordinal
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::ALL.get(ordinal as usize).copied()
    }

    /// Stored name
    pub fn name(self) -> &'static str {
        match self {
            SlotState::Normal => "NORMAL",
            SlotState::Reserved => "RESERVED",
            SlotState::Locked => "LOCKED",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|s| s.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Reserved or Locked
    pub fn is_annotated(self) -> bool {
        !matches!(self, SlotState::Normal)
    }
}

impl fmt::Display for SlotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
