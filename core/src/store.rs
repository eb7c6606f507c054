//! Dictionary persistence.
//!
//! Dictionaries are stored as a JSON object mapping fold keys to
//! `{"default": ..., "words": [...]}`, written with sorted keys so that diffs
//! stay readable. A path ending in `.bin` selects a compact bincode snapshot of
//! the same content instead.
//!
//! `DictionaryStore` decides where to read from and write to: a user-writable
//! copy is preferred, with the bundled dictionary as read-only fallback.

use crate::dictionary::Dictionary;
use crate::Config;
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Directory under `$HOME` holding the user dictionary.
pub const USER_DIR: &str = ".onehand";

/// File name of the user dictionary.
pub const USER_FILE: &str = "dictionary.json";

/// On-disk encoding of a dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictionaryFormat {
    Json,
    Bincode,
}

impl DictionaryFormat {
    /// Pick the format from the file extension (`.bin` is bincode).
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("bin") => DictionaryFormat::Bincode,
            _ => DictionaryFormat::Json,
        }
    }
}

/// Read a dictionary, validating every entry and re-keying stale fold keys.
pub fn load_dictionary<P: AsRef<Path>>(path: P) -> Result<Dictionary> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("open dictionary {}", path.display()))?;
    let reader = BufReader::new(file);

    let dict: Dictionary = match DictionaryFormat::from_path(path) {
        DictionaryFormat::Json => serde_json::from_reader(reader)
            .with_context(|| format!("parse dictionary {}", path.display()))?,
        DictionaryFormat::Bincode => bincode::deserialize_from(reader)
            .with_context(|| format!("decode dictionary {}", path.display()))?,
    };

    tracing::info!(path = %path.display(), entries = dict.len(), "loaded dictionary");
    Ok(dict)
}

/// Serialize to pretty JSON with sorted keys.
pub fn to_json_string(dict: &Dictionary) -> Result<String> {
    serde_json::to_string_pretty(dict).context("serialize dictionary")
}

/// Write a dictionary atomically: a temp file in the target directory is
/// renamed over `path` once fully written.
pub fn save_dictionary<P: AsRef<Path>>(dict: &Dictionary, path: P) -> Result<()> {
    let path = path.as_ref();
    let parent_dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir)
        .with_context(|| format!("create directory {}", parent_dir.display()))?;

    let temp_file = NamedTempFile::new_in(parent_dir)
        .with_context(|| format!("create temp file in {}", parent_dir.display()))?;
    {
        let mut writer = BufWriter::new(&temp_file);
        match DictionaryFormat::from_path(path) {
            DictionaryFormat::Json => {
                serde_json::to_writer_pretty(&mut writer, dict).context("serialize dictionary")?;
                writer.write_all(b"\n")?;
            }
            DictionaryFormat::Bincode => {
                bincode::serialize_into(&mut writer, dict).context("encode dictionary")?;
            }
        }
        writer.flush().context("flush dictionary")?;
    }
    temp_file
        .persist(path)
        .with_context(|| format!("replace {}", path.display()))?;

    tracing::info!(path = %path.display(), entries = dict.len(), "saved dictionary");
    Ok(())
}

/// User-location preference with bundled fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryStore {
    user_path: Option<PathBuf>,
    bundled_path: PathBuf,
    /// Where the last `load()` read from.
    source: Option<PathBuf>,
}

impl DictionaryStore {
    pub fn new(user_path: Option<PathBuf>, bundled_path: PathBuf) -> Self {
        Self {
            user_path,
            bundled_path,
            source: None,
        }
    }

    /// Store for the paths named in `config`, defaulting the user path to
    /// `$HOME/.onehand/dictionary.json`.
    pub fn from_config(config: &Config) -> Self {
        let user_path = config
            .user_dictionary
            .clone()
            .or_else(Self::default_user_path);
        Self::new(user_path, config.bundled_dictionary.clone())
    }

    /// `$HOME/.onehand/dictionary.json`, if `HOME` is set.
    pub fn default_user_path() -> Option<PathBuf> {
        let home = std::env::var_os("HOME")?;
        Some(PathBuf::from(home).join(USER_DIR).join(USER_FILE))
    }

    pub fn user_path(&self) -> Option<&Path> {
        self.user_path.as_deref()
    }

    pub fn bundled_path(&self) -> &Path {
        &self.bundled_path
    }

    /// Path the dictionary was last loaded from.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Load the user dictionary if it exists, else the bundled one.
    pub fn load(&mut self) -> Result<Dictionary> {
        let path = match &self.user_path {
            Some(user) if user.exists() => user.clone(),
            _ => {
                tracing::debug!(path = %self.bundled_path.display(), "using bundled dictionary");
                self.bundled_path.clone()
            }
        };
        let dict = load_dictionary(&path)?;
        self.source = Some(path);
        Ok(dict)
    }

    /// Persist `dict` if `modified`. Returns the path written, if any.
    ///
    /// A dictionary loaded from the bundled resource is written to the user
    /// path when its directory can be created; otherwise it goes back where it
    /// came from.
    pub fn save(&self, dict: &Dictionary, modified: bool) -> Result<Option<PathBuf>> {
        if !modified {
            return Ok(None);
        }
        let target = self.save_target();
        save_dictionary(dict, &target)?;
        Ok(Some(target))
    }

    fn save_target(&self) -> PathBuf {
        let source = self.source.as_ref().unwrap_or(&self.bundled_path);
        if *source != self.bundled_path {
            return source.clone();
        }
        if let Some(user) = &self.user_path {
            let dir_ready = match user.parent() {
                Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir).is_ok(),
                _ => true,
            };
            if dir_ready {
                return user.clone();
            }
            tracing::warn!(
                path = %user.display(),
                "user dictionary directory unavailable, writing bundled copy"
            );
        }
        source.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension() {
        assert_eq!(
            DictionaryFormat::from_path(Path::new("d/dictionary.json")),
            DictionaryFormat::Json
        );
        assert_eq!(
            DictionaryFormat::from_path(Path::new("dictionary.bin")),
            DictionaryFormat::Bincode
        );
        assert_eq!(
            DictionaryFormat::from_path(Path::new("dictionary")),
            DictionaryFormat::Json
        );
    }

    #[test]
    fn json_round_trip_in_temp_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dictionary.json");
        let dict = Dictionary::from_words(&["may", "cat", "the"]);

        save_dictionary(&dict, &path).unwrap();
        let loaded = load_dictionary(&path).unwrap();
        assert_eq!(loaded, dict);
    }

    #[test]
    fn bincode_round_trip_in_temp_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dictionary.bin");
        let dict = Dictionary::from_words(&["may", "cat", "the"]);

        save_dictionary(&dict, &path).unwrap();
        let loaded = load_dictionary(&path).unwrap();
        assert_eq!(loaded.lookup("cat").unwrap().words(), ["may", "cat"]);
    }

    #[test]
    fn malformed_dictionary_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, r#"{"cat":{"default":"dog","words":["cat"]}}"#).unwrap();

        let err = load_dictionary(&path).unwrap_err();
        assert!(format!("{err:#}").contains("broken.json"));
    }

    #[test]
    fn unmodified_dictionary_is_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let store = DictionaryStore::new(
            Some(dir.path().join("user").join("dictionary.json")),
            dir.path().join("bundled.json"),
        );
        let written = store.save(&Dictionary::new(), false).unwrap();
        assert_eq!(written, None);
        assert!(!dir.path().join("user").exists());
    }
}
