//! onehand-core
//!
//! Disambiguation engine for one-handed typing. Every key on the typing hand
//! also stands for its mirror on the other half of the keyboard, so typed text
//! is ambiguous; words are resolved against a dictionary grouped by fold key.
//!
//! Public API:
//! - `fold_word` - Physical-key canonicalization
//! - `Dictionary` / `Entry` - Fold key → spellings, with a default per key
//! - `resolve_entry` / `resolve_substitution` - Token resolution
//! - `Buffer` / `TextBuffer` - Text surface the engine edits
//! - `ImeEngine` - Insert / wordcheck state machine driven by key events
//! - `DictionaryStore` - Load/save with user-location preference
//! - `Config` - Configuration
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// Core modules
pub mod fold;
pub use fold::{fold_char, fold_word, FoldKey};

pub mod dictionary;
pub use dictionary::{Dictionary, Entry, WordSource};

pub mod resolver;
pub use resolver::{resolve_entry, resolve_substitution};

pub mod store;
pub use store::{load_dictionary, save_dictionary, DictionaryFormat, DictionaryStore};

// Editing modules
pub mod buffer;
pub use buffer::{Buffer, EditCommand, Highlight, HighlightTag, Motion, TextBuffer};

pub mod context;
pub use context::ImeContext;

pub mod session;
pub use session::{ImeSession, InputMode, WordCheckToken};

pub mod editor;
pub use editor::{Editor, EditorResult, InsertEditor, WordCheckEditor};

pub mod ime_engine;
pub use ime_engine::{ImeEngine, KeyEvent, KeyResult};

/// Engine configuration.
///
/// Every field has a default, so a TOML file only needs the settings it
/// changes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Capitalize resolved words at the start of a sentence or line
    pub autocaps: bool,

    /// Characters that trigger resolution of the preceding word in insert mode
    pub boundary_keys: String,

    /// User-writable dictionary; `$HOME/.onehand/dictionary.json` when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_dictionary: Option<PathBuf>,

    /// Read-only dictionary shipped with the application
    pub bundled_dictionary: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            autocaps: true,
            boundary_keys: " \n/".to_string(),
            user_dictionary: None,
            bundled_dictionary: PathBuf::from("dictionary.json"),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        use anyhow::Context;
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parse config {}", path.display()))
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        use anyhow::Context;
        let path = path.as_ref();
        let content = self.to_toml_string()?;
        std::fs::write(path, content).with_context(|| format!("write config {}", path.display()))
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Toggle sentence-start capitalization.
    pub fn toggle_autocaps(&mut self) {
        self.autocaps = !self.autocaps;
    }

    /// Check if a character triggers word resolution.
    pub fn is_boundary_key(&self, ch: char) -> bool {
        self.boundary_keys.contains(ch)
    }
}

/// Utility helpers.
pub mod utils {
    /// Normalize input strings (NFC) and trim whitespace.
    pub fn normalize(s: &str) -> String {
        use unicode_normalization::UnicodeNormalization;
        s.nfc().collect::<String>().trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = Config::default();
        assert!(config.autocaps);
        assert!(config.is_boundary_key(' '));
        assert!(config.is_boundary_key('\n'));
        assert!(config.is_boundary_key('/'));
        assert!(!config.is_boundary_key('.'));
        assert_eq!(config.user_dictionary, None);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml_str("autocaps = false\n").unwrap();
        assert!(!config.autocaps);
        assert_eq!(config.boundary_keys, " \n/");
        assert_eq!(config.bundled_dictionary, PathBuf::from("dictionary.json"));
    }

    #[test]
    fn toml_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("onehand.toml");
        let mut config = Config {
            user_dictionary: Some(dir.path().join("mine.json")),
            ..Config::default()
        };
        config.toggle_autocaps();
        config.save_toml(&path).unwrap();

        let loaded = Config::load_toml(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_config_names_path() {
        let err = Config::load_toml("/nonexistent/onehand.toml").unwrap_err();
        assert!(format!("{err:#}").contains("onehand.toml"));
    }

    #[test]
    fn normalize_trims_and_composes() {
        assert_eq!(utils::normalize("  cafe\u{301}\n"), "caf\u{e9}");
    }
}
