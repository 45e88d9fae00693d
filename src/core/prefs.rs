//! Judge preferences: key bindings and judge name, persisted as JSON

use std::path::Path;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{truncate_judge_name, KeyBindings};
use crate::{DEFAULT_KEY_NEGATIVE, DEFAULT_KEY_POSITIVE};

/// Persisted preferences; missing fields fall back to defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Preferences {
    pub key_positive: String,
    pub key_negative: String,
    pub judge_name: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            key_positive: DEFAULT_KEY_POSITIVE.to_string(),
            key_negative: DEFAULT_KEY_NEGATIVE.to_string(),
            judge_name: String::new(),
        }
    }
}

impl Preferences {
    /// Load from `path`; a missing file yields defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let mut prefs: Self = serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        prefs.judge_name = truncate_judge_name(&prefs.judge_name);
        Ok(prefs)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        // Plain strings always serialize
        let json = serde_json::to_string_pretty(self).unwrap_or_default();
        std::fs::write(path, json).map_err(io_err)
    }

    pub fn bindings(&self) -> KeyBindings {
        KeyBindings::new(self.key_positive.clone(), self.key_negative.clone())
    }
}
