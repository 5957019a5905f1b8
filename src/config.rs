use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::preview::{PreviewDisplayState, DEFAULT_HISTORY_LIMIT};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub notes_dir: String,
    pub history_limit: usize,
    /// Overrides `$VISUAL`/`$EDITOR` when set.
    pub editor: Option<String>,
    pub log_level: String,
    /// `[display]` table: how cards are drawn when the app starts.
    pub display: PreviewDisplayState,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            notes_dir: "~/Documents/notedeck".to_string(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            editor: None,
            log_level: "info".to_string(),
            display: PreviewDisplayState::default(),
        }
    }
}

impl Config {
    pub fn config_dir() -> PathBuf {
        dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("notedeck")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    fn read_from(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::parse(&text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    /// The config at `path`, or the defaults when it is missing. A broken
    /// file also yields the defaults, along with the error. Nothing is
    /// logged here: this runs before logging is set up.
    pub fn load_from(path: &Path) -> (Self, Option<ConfigError>) {
        if !path.exists() {
            return (Self::default(), None);
        }
        match Self::read_from(path) {
            Ok(config) => (config, None),
            Err(err) => (Self::default(), Some(err)),
        }
    }

    /// Like `load_from`, but writes the defaults out on first run.
    pub fn load_or_create_at(path: &Path) -> (Self, Option<ConfigError>) {
        if path.exists() {
            return Self::load_from(path);
        }
        let config = Self::default();
        let err = config.save_to(path).err();
        (config, err)
    }

    pub fn load() -> (Self, Option<ConfigError>) {
        Self::load_from(&Self::config_path())
    }

    pub fn load_or_create() -> (Self, Option<ConfigError>) {
        Self::load_or_create_at(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|source| ConfigError::Write { path: dir.to_path_buf(), source })?;
        }
        let text = toml::to_string_pretty(self)?;
        fs::write(path, text).map_err(|source| ConfigError::Write { path: path.to_path_buf(), source })
    }

    pub fn notes_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.notes_dir).to_string())
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit.max(1)
    }
}
