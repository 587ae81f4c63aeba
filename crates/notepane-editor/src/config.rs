#![forbid(unsafe_code)]

//! Editor configuration.
//!
//! [`EditorConfig::default()`] reproduces the built-in behavior: a
//! 1000-snapshot history and the standard Ctrl/Cmd shortcuts. With the
//! `config` feature the same struct loads from TOML or JSON.
//!
//! ```toml
//! # notepane.toml
//! [history]
//! max_depth = 500
//!
//! [shortcuts]
//! redo = "y"
//! shift_undo_redoes = true
//! ```
//!
//! ```rust,ignore
//! let config = EditorConfig::from_toml_file("notepane.toml")?.validated()?;
//! ```

#[cfg(feature = "config")]
use std::path::Path;

use notepane_history::HistoryConfig;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shortcut::ShortcutConfig;

/// Top-level configuration for an [`EditSession`](crate::EditSession).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EditorConfig {
    pub history: HistoryConfig,
    pub shortcuts: ShortcutConfig,
}

impl EditorConfig {
    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Check every parameter. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.history.max_depth == 0 {
            errors.push("history.max_depth must be > 0".into());
        }

        let keys = self.shortcuts.keys();
        for (name, key) in keys {
            if !key.is_ascii_alphanumeric() {
                errors.push(format!(
                    "shortcuts.{name} must be an ASCII letter or digit, got {key:?}"
                ));
            }
        }
        for (i, (a, key_a)) in keys.iter().enumerate() {
            for (b, key_b) in &keys[i + 1..] {
                if key_a.eq_ignore_ascii_case(key_b) {
                    errors.push(format!("shortcuts.{a} and shortcuts.{b} share key {key_a:?}"));
                }
            }
        }

        errors
    }

    /// Return `self` if [`validate`](Self::validate) finds nothing.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Errors from loading or validating an [`EditorConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "config")]
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[cfg(feature = "config")]
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}
