use crate::inventory::AllocationPolicy;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Save directory of the world; the data file lives inside it
    #[serde(default = "default_world_dir")]
    pub world_dir: PathBuf,

    #[serde(default = "default_data_file_name")]
    pub data_file_name: String,

    /// Non-networked session: every player maps to `shared_player_key`
    #[serde(default)]
    pub singleplayer: bool,

    #[serde(default = "default_shared_player_key")]
    pub shared_player_key: String,

    /// Let other items into empty Reserved slots when nothing else is free
    #[serde(default = "default_true")]
    pub reserved_fallback: bool,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Directory for the rotating log file; next to the executable when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

// Default values
fn default_world_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("reservedslots")
        .join("world")
}

fn default_data_file_name() -> String {
    "reservedslots_data.json".to_string()
}

fn default_shared_player_key() -> String {
    "singleplayer".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            world_dir: default_world_dir(),
            data_file_name: default_data_file_name(),
            singleplayer: false,
            shared_player_key: default_shared_player_key(),
            reserved_fallback: true,
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl Config {
    pub fn allocation_policy(&self) -> AllocationPolicy {
        AllocationPolicy {
            reserved_fallback: self.reserved_fallback,
        }
    }

    /// Reject settings that would put data outside the world directory or
    /// leave players without a storage key
    pub fn validate(&self) -> Result<()> {
        let name = self.data_file_name.trim();
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            bail!("data_file_name must be a plain file name, got {:?}", self.data_file_name);
        }
        if self.shared_player_key.trim().is_empty() {
            bail!("shared_player_key must not be empty");
        }
        Ok(())
    }

    /// Full path of the durable data file
    pub fn data_file(&self) -> PathBuf {
        self.world_dir.join(&self.data_file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = toml::from_str("singleplayer = true\nreserved_fallback = false\n").unwrap();
        assert!(config.singleplayer);
        assert!(!config.allocation_policy().reserved_fallback);
        assert_eq!(config.shared_player_key, "singleplayer");
        assert_eq!(config.data_file_name, "reservedslots_data.json");
        assert_eq!(config.log_level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        let mut config = Config::default();
        config.shared_player_key = " ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.data_file_name = "saves/data.json".to_string();
        assert!(config.validate().is_err());

        for name in [".", ".."] {
            let mut config = Config::default();
            config.data_file_name = name.to_string();
            assert!(config.validate().is_err());
        }
    }
}
