//! Configuration for tix
//!
//! Stored in `<config dir>/tix/config.toml`, overridable with `$TIX_CONFIG`.

use crate::id::{DEFAULT_MAX_ID, DEFAULT_MIN_ID};
use crate::store::DEFAULT_MAX_ATTEMPTS;
use crate::{Error, IdGenerator, RandomIds, Result, SequentialIds, UndoPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that points at an alternative config file
pub const CONFIG_ENV: &str = "TIX_CONFIG";

const CONFIG_DIR: &str = "tix";
const CONFIG_FILE: &str = "config.toml";

/// tix configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Ticket number allocation
    pub ids: IdConfig,

    /// Undo behaviour
    pub undo: UndoPolicy,

    /// Display settings
    pub display: DisplayConfig,
}

/// How ticket numbers are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    /// Uniform draw from the range, redrawn on collision
    #[default]
    Random,
    /// Counter starting at the bottom of the range
    Sequential,
}

impl std::str::FromStr for IdStrategy {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "random" => Ok(IdStrategy::Random),
            "sequential" | "seq" => Ok(IdStrategy::Sequential),
            _ => Err(Error::InvalidStrategy(s.to_string())),
        }
    }
}

impl std::fmt::Display for IdStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdStrategy::Random => write!(f, "random"),
            IdStrategy::Sequential => write!(f, "sequential"),
        }
    }
}

/// Ticket number configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdConfig {
    pub strategy: IdStrategy,

    /// Lowest ticket number
    pub min: u32,

    /// Upper bound, exclusive
    pub max: u32,

    /// Draws per ticket before giving up
    pub max_attempts: u32,
}

impl Default for IdConfig {
    fn default() -> Self {
        Self {
            strategy: IdStrategy::Random,
            min: DEFAULT_MIN_ID,
            max: DEFAULT_MAX_ID,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl IdConfig {
    /// Build the generator described by this section
    pub fn generator(&self) -> Box<dyn IdGenerator> {
        match self.strategy {
            IdStrategy::Random => Box::new(RandomIds::new(self.min, self.max)),
            IdStrategy::Sequential => Box::new(SequentialIds::new(self.min, self.max)),
        }
    }
}

/// Display configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Use colors in output
    pub colors: bool,

    /// Date format for display
    pub date_format: String,

    /// Maximum description length in the ticket table before truncation
    pub max_description_length: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            colors: true,
            date_format: "%Y-%m-%d %H:%M".to_string(),
            max_description_length: 60,
        }
    }
}

impl Config {
    /// Resolve the config path: `$TIX_CONFIG`, then the user config dir
    pub fn default_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate config from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to a TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.ids.min >= self.ids.max {
            return Err(Error::Config(format!(
                "ids.min ({}) must be below ids.max ({})",
                self.ids.min, self.ids.max
            )));
        }
        if self.ids.max_attempts == 0 {
            return Err(Error::Config("ids.max_attempts must be at least 1".into()));
        }
        Ok(())
    }

    /// Generate a default config file with comments
    pub fn default_with_comments() -> String {
        r#"# tix configuration

[ids]
# How ticket numbers are drawn: "random" or "sequential"
strategy = "random"

# Ticket numbers are drawn from [min, max)
min = 1000
max = 10000

# Draws per ticket before giving up when numbers collide
max_attempts = 64

[undo]
# Undoing a description change puts the old description back.
# Off by default: only processing is undone.
restore_descriptions = false

[display]
# Use colors in output
colors = true

# Date format for display (strftime format)
date_format = "%Y-%m-%d %H:%M"

# Maximum description length in the ticket table
max_description_length = 60
"#
        .to_string()
    }
}
