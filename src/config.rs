//! Runtime settings
//!
//! Settings live in `<config dir>/inputmap/config.toml`. A missing file
//! falls back to defaults and is written out on first start, so the
//! application keeps working with no configuration at all. Bindings are not
//! part of the file; they are built by the embedding application.

use color_eyre::{eyre::eyre, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const CONFIG_DIR: &str = "inputmap";
const CONFIG_FILE: &str = "config.toml";

/// Keyboard capture settings
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct KeyboardSettings {
    /// Keep the original key-down event while the host auto-repeats
    pub ignore_repeat: bool,
}

impl Default for KeyboardSettings {
    fn default() -> Self {
        Self {
            ignore_repeat: true,
        }
    }
}

/// Pointer capture settings
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PointerSettings {
    /// Upper bound of concurrently tracked touch contacts (`Touch0..TouchN-1`)
    pub max_touch_slots: usize,
}

impl Default for PointerSettings {
    fn default() -> Self {
        Self {
            max_touch_slots: 10,
        }
    }
}

/// Gamepad capture settings
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct GamepadSettings {
    /// Analog dead zone as a fraction (0.0-1.0), rescaled outside the zone
    pub deadzone: f32,
}

impl Default for GamepadSettings {
    fn default() -> Self {
        Self {
            deadzone: 0.05, // 5% deadzone for typical controllers
        }
    }
}

/// Complete runtime configuration
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    /// Simulation tick interval in milliseconds
    pub tick_interval_ms: u64,
    /// Log level for the subscriber (`error`, `warn`, `info`, `debug`, `trace`)
    pub log_level: String,
    pub keyboard: KeyboardSettings,
    pub pointer: PointerSettings,
    pub gamepad: GamepadSettings,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 16,
            log_level: "info".to_string(),
            keyboard: KeyboardSettings::default(),
            pointer: PointerSettings::default(),
            gamepad: GamepadSettings::default(),
        }
    }
}

impl InputConfig {
    /// Default location of the config file
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| {
            warn!("No config directory available, using current directory");
            PathBuf::from(".")
        });
        path.push(CONFIG_DIR);
        path.push(CONFIG_FILE);
        path
    }

    /// Loads the config at `path`, falling back to defaults if it is missing
    pub async fn load(path: &Path) -> Result<Self> {
        if !tokio::fs::try_exists(path)
            .await
            .map_err(|e| eyre!("Failed to check if config file exists: {}", e))?
        {
            info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| eyre!("Failed to read config file: {}", e))?;
        let config: InputConfig =
            toml::from_str(&content).map_err(|e| eyre!("Failed to parse config file: {}", e))?;
        debug!("Loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// Writes the config to `path`, creating parent directories
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| eyre!("Failed to create config directory: {}", e))?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| eyre!("Failed to serialize config: {}", e))?;
        tokio::fs::write(path, content)
            .await
            .map_err(|e| eyre!("Failed to write config file: {}", e))?;
        info!("Config written to {}", path.display());
        Ok(())
    }

    /// Makes sure a config file exists at `path` and returns its content
    pub async fn ensure_default_config(path: &Path) -> Result<Self> {
        let config = Self::load(path).await?;
        if !tokio::fs::try_exists(path)
            .await
            .map_err(|e| eyre!("Failed to check if config file exists: {}", e))?
        {
            config.save(path).await?;
        }
        Ok(config)
    }

    /// `log_level` as a tracing level; unknown names fall back to INFO
    pub fn tracing_level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or_else(|_| {
            warn!("Unknown log level '{}', using info", self.log_level);
            tracing::Level::INFO
        })
    }
}
