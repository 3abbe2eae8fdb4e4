use super::types::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Overrides the config file location
pub const CONFIG_PATH_ENV: &str = "RESERVEDSLOTS_CONFIG";

const CONFIG_FILE_NAME: &str = "reservedslots.toml";

/// Reads `reservedslots.toml`, writing a default one on first start
pub struct ConfigLoader {
    config_path: PathBuf,
}

impl ConfigLoader {
    pub fn new() -> Self {
        let config_path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(Self::default_config_path);
        Self { config_path }
    }

    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    // Next to the executable, so each server install keeps its own settings
    fn default_config_path() -> PathBuf {
        let exe_path = std::env::current_exe().unwrap_or_else(|_| PathBuf::from("."));
        exe_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(CONFIG_FILE_NAME)
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> Result<Config> {
        let config = if self.config_path.exists() {
            let contents = fs::read_to_string(&self.config_path)
                .with_context(|| format!("Failed to read config file {:?}", self.config_path))?;
            let config: Config = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {:?}", self.config_path))?;
            info!("Loaded configuration from {:?}", self.config_path);
            config
        } else {
            info!("No config at {:?}, writing defaults", self.config_path);
            let config = Config::default();
            self.save(&config)?;
            config
        };

        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let toml_string = toml::to_string_pretty(config).context("Failed to serialize config")?;
        fs::write(&self.config_path, toml_string).context("Failed to write config file")?;

        info!("Saved configuration to {:?}", self.config_path);
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
