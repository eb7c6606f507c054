//! Fold-key dictionary for onehand-core.
//!
//! Words are grouped by their fold key (see `crate::fold`). Each group is an
//! `Entry`: an ordered, duplicate-free list of spellings with one designated
//! default. The default is what live substitution writes into the buffer; the
//! rest are offered when cycling in wordcheck mode.
//!
//! Public API:
//! - `Entry` - spellings sharing one fold key, `default ∈ words` always holds
//! - `WordSource` - one newline-delimited word list plus its capitals policy
//! - `Dictionary` - build, lookup, add, delete, set-default
//!
//! Ordering is priority order only: the first word seen for a fold key becomes
//! its default, later words are appended behind it.

use crate::fold::{capitalize_first, fold_word, is_all_lowercase, uncapitalize_first, FoldKey};
use ahash::{AHashMap, AHashSet};
use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::path::Path;

/// Suffix appended to resolved possessives.
pub const POSSESSIVE_SUFFIX: &str = "'s";

/// Letters, with dashes and apostrophes allowed inside but not at either end.
static WORD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z]+(?:[A-Za-z'-]+[A-Za-z]+|[A-Za-z]*)$").expect("word pattern compiles")
});

/// Whether `word` may be added to or removed from a dictionary by hand.
pub fn is_valid_word(word: &str) -> bool {
    WORD_PATTERN.is_match(word)
}

/// Strip a trailing possessive (`'s`, or `'l` typed on the mirrored key).
///
/// Returns `None` if the word has no possessive suffix.
pub fn strip_possessive(word: &str) -> Option<&str> {
    word.strip_suffix("'s").or_else(|| word.strip_suffix("'l"))
}

/// All known spellings for one fold key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawEntry")]
pub struct Entry {
    default: String,
    words: Vec<String>,
}

/// Unvalidated on-disk shape of an `Entry`.
#[derive(Deserialize)]
struct RawEntry {
    default: String,
    words: Vec<String>,
}

impl TryFrom<RawEntry> for Entry {
    type Error = String;

    fn try_from(raw: RawEntry) -> Result<Self, Self::Error> {
        if raw.words.is_empty() {
            return Err(format!("entry for {:?} has no words", raw.default));
        }
        let mut seen = AHashSet::with_capacity(raw.words.len());
        for w in &raw.words {
            if !seen.insert(w.as_str()) {
                return Err(format!("duplicate word {:?} in entry", w));
            }
        }
        if !seen.contains(raw.default.as_str()) {
            return Err(format!("default {:?} is not one of its words", raw.default));
        }
        Ok(Entry {
            default: raw.default,
            words: raw.words,
        })
    }
}

impl Entry {
    /// Create an entry holding a single word, which is also its default.
    pub fn new<T: Into<String>>(word: T) -> Self {
        let word = word.into();
        Self {
            default: word.clone(),
            words: vec![word],
        }
    }

    /// The spelling substituted when this fold key is typed.
    pub fn default_word(&self) -> &str {
        &self.default
    }

    /// All spellings in priority order.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.iter().any(|w| w == word)
    }

    /// Index of `word` in `words()`, if present.
    pub fn position(&self, word: &str) -> Option<usize> {
        self.words.iter().position(|w| w == word)
    }

    pub fn is_default(&self, word: &str) -> bool {
        self.default == word
    }

    /// Append `word` unless already present. Returns true if appended.
    fn push(&mut self, word: String) -> bool {
        if self.contains(&word) {
            return false;
        }
        self.words.push(word);
        true
    }

    /// Append the capitalized form of every all-lowercase spelling.
    ///
    /// e.g. `["Fin", "fin", "fen"]` becomes `["Fin", "fin", "fen", "Fen"]`, so that
    /// text at a sentence start can cycle through both genuinely capitalized
    /// words and auto-capitalized variants.
    pub fn expand_capitals(&mut self) {
        let capitalized: Vec<String> = self
            .words
            .iter()
            .filter(|w| is_all_lowercase(w))
            .map(|w| capitalize_first(w))
            .collect();
        for word in capitalized {
            self.push(word);
        }
    }

    /// Copy of this entry with every spelling made possessive.
    pub fn possessive(&self) -> Entry {
        Entry {
            default: format!("{}{}", self.default, POSSESSIVE_SUFFIX),
            words: self
                .words
                .iter()
                .map(|w| format!("{}{}", w, POSSESSIVE_SUFFIX))
                .collect(),
        }
    }
}

/// One ordered word list used when building a dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordSource {
    pub words: Vec<String>,
    /// When false, words that are not entirely lowercase are dropped.
    pub keep_capitals: bool,
}

impl WordSource {
    pub fn new<I, S>(words: I, keep_capitals: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
            keep_capitals,
        }
    }

    /// Parse newline-delimited text; lines are NFC-normalized and trimmed,
    /// blank lines skipped.
    pub fn from_text(text: &str, keep_capitals: bool) -> Self {
        let words = text
            .lines()
            .map(crate::utils::normalize)
            .filter(|w| !w.is_empty())
            .collect();
        Self {
            words,
            keep_capitals,
        }
    }

    /// Read a word list from disk.
    pub fn load<P: AsRef<Path>>(path: P, keep_capitals: bool) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read word list {}", path.display()))?;
        Ok(Self::from_text(&text, keep_capitals))
    }
}

/// Fold key → `Entry` map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary {
    map: AHashMap<FoldKey, Entry>,
}

impl Dictionary {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self {
            map: AHashMap::new(),
        }
    }

    /// Build a dictionary from word lists given in priority order.
    ///
    /// Duplicate words (compared case-sensitively) keep their first position.
    /// Within each fold key the first word becomes the default.
    pub fn build<I>(sources: I) -> Self
    where
        I: IntoIterator<Item = WordSource>,
    {
        let mut seen: AHashSet<String> = AHashSet::new();
        let mut ordered: Vec<String> = Vec::new();
        let mut dropped = 0usize;

        for source in sources {
            for word in source.words {
                if !source.keep_capitals && !is_all_lowercase(&word) {
                    dropped += 1;
                    continue;
                }
                if seen.insert(word.clone()) {
                    ordered.push(word);
                }
            }
        }

        let mut dict = Self::new();
        for word in ordered {
            let key = fold_word(&word);
            match dict.map.get_mut(&key) {
                Some(entry) => {
                    entry.words.push(word);
                }
                None => {
                    dict.map.insert(key, Entry::new(word));
                }
            }
        }

        tracing::info!(
            entries = dict.len(),
            dropped_capitals = dropped,
            "built dictionary"
        );
        dict
    }

    /// Convenience: build from a single capitals-keeping list.
    pub fn from_words<S: AsRef<str>>(words: &[S]) -> Self {
        Self::build([WordSource::new(
            words.iter().map(|w| w.as_ref().to_string()),
            true,
        )])
    }

    /// Lookup the entry for a fold key.
    pub fn lookup(&self, key: &str) -> Option<&Entry> {
        self.map.get(key)
    }

    /// Lookup the entry a word would be typed as.
    pub fn entry_for_word(&self, word: &str) -> Option<&Entry> {
        self.lookup(&fold_word(word))
    }

    /// Add a word. Returns false if it is already present.
    pub fn add_word(&mut self, word: &str) -> bool {
        if word.is_empty() {
            return false;
        }
        let key = fold_word(word);
        match self.map.get_mut(&key) {
            Some(entry) => entry.push(word.to_string()),
            None => {
                self.map.insert(key, Entry::new(word));
                true
            }
        }
    }

    /// Remove a word. Returns false if it was not in the dictionary.
    ///
    /// Removing the last spelling removes the fold key; removing the default
    /// promotes the first remaining spelling.
    pub fn delete_word(&mut self, word: &str) -> bool {
        let key = fold_word(word);
        let Some(entry) = self.map.get_mut(&key) else {
            return false;
        };
        let Some(idx) = entry.position(word) else {
            return false;
        };

        if entry.words.len() == 1 {
            self.map.remove(&key);
        } else {
            entry.words.remove(idx);
            if entry.default == word {
                entry.default = entry.words[0].clone();
            }
        }
        true
    }

    /// Make `word` the default of its entry.
    ///
    /// Falls back to the possessive root (`cat's` → `cat`). An auto-capitalized
    /// `word` selects its lowercase member when one exists; otherwise an unknown
    /// spelling is added to the entry. Returns false only when no entry exists.
    pub fn set_default(&mut self, word: &str) -> bool {
        if word.is_empty() {
            return false;
        }

        let mut base = word;
        let mut key = fold_word(base);
        if !self.map.contains_key(&key) {
            match strip_possessive(word) {
                Some(root) if !root.is_empty() => {
                    base = root;
                    key = fold_word(base);
                }
                _ => return false,
            }
        }
        let Some(entry) = self.map.get_mut(&key) else {
            return false;
        };

        let uncapitalized = uncapitalize_first(base);
        if entry.contains(base) {
            entry.default = base.to_string();
        } else if entry.contains(&uncapitalized) {
            entry.default = uncapitalized;
        } else {
            entry.words.push(base.to_string());
            entry.default = base.to_string();
        }
        tracing::debug!(word = base, default = %entry.default, "set default");
        true
    }

    /// Number of fold keys.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate `(fold key, entry)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Insert a persisted entry under its recomputed fold key, merging with any
    /// entry already there (existing default wins).
    fn merge_entry(&mut self, key: FoldKey, entry: Entry) {
        match self.map.get_mut(&key) {
            Some(existing) => {
                for word in entry.words {
                    existing.push(word);
                }
            }
            None => {
                self.map.insert(key, entry);
            }
        }
    }
}

impl Serialize for Dictionary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let sorted: BTreeMap<&str, &Entry> = self.iter().collect();
        serializer.collect_map(sorted)
    }
}

impl<'de> Deserialize<'de> for Dictionary {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let stored = BTreeMap::<String, Entry>::deserialize(deserializer)?;
        Ok(Self::from(stored))
    }
}

impl From<BTreeMap<String, Entry>> for Dictionary {
    /// Re-key persisted entries through `fold_word`.
    ///
    /// An entry stored under a stale key moves to the key of its default. A
    /// spelling that folds to a different key than its default is moved to the
    /// entry for its own key, behind every word already filed there.
    fn from(stored: BTreeMap<String, Entry>) -> Self {
        let mut dict = Self::new();
        let mut misfiled = Vec::new();
        for (key, entry) in stored {
            let canonical = fold_word(&entry.default);
            if canonical != key {
                tracing::warn!(stored = %key, canonical = %canonical, "re-keying dictionary entry");
            }
            let Entry { default, words } = entry;
            let (kept, strays): (Vec<String>, Vec<String>) =
                words.into_iter().partition(|w| fold_word(w) == canonical);
            for word in &strays {
                tracing::warn!(word = %word, entry = %default, "moving misfiled dictionary word");
            }
            misfiled.extend(strays);
            dict.merge_entry(
                canonical,
                Entry {
                    default,
                    words: kept,
                },
            );
        }
        for word in misfiled {
            dict.merge_entry(fold_word(&word), Entry::new(word));
        }
        dict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn may_cat() -> Dictionary {
        Dictionary::from_words(&["may", "cat"])
    }

    #[test]
    fn build_groups_by_fold_key() {
        let dict = may_cat();
        assert_eq!(dict.len(), 1);
        let entry = dict.lookup("cat").unwrap();
        assert_eq!(entry.default_word(), "may");
        assert_eq!(entry.words(), ["may", "cat"]);
    }

    #[test]
    fn build_dedups_case_sensitively() {
        let dict = Dictionary::from_words(&["a", "A", "the"]);
        assert_eq!(dict.len(), 2);
        let a = dict.entry_for_word("a").unwrap();
        assert_eq!(a.default_word(), "a");
        assert_eq!(a.words(), ["a", "A"]);
        assert_eq!(dict.entry_for_word("the").unwrap().default_word(), "the");
    }

    #[test]
    fn build_respects_priority_and_capitals_policy() {
        let dict = Dictionary::build([
            WordSource::new(["a", "A", "the", "thi", "a"], false),
            WordSource::new(["B"], true),
            WordSource::new(["a", "a"], true),
        ]);
        assert_eq!(dict.len(), 3);
        assert_eq!(dict.lookup("a").unwrap().words(), ["a"]);
        let tge = dict.lookup("tge").unwrap();
        assert_eq!(tge.default_word(), "the");
        assert_eq!(tge.words(), ["the", "thi"]);
        assert_eq!(dict.lookup("b").unwrap().default_word(), "B");
    }

    #[test]
    fn word_source_parses_lines() {
        let src = WordSource::from_text("cat\n\n  may \r\n", true);
        assert_eq!(src.words, ["cat", "may"]);
    }

    #[test]
    fn add_word_cases() {
        let mut dict = may_cat();
        assert!(!dict.add_word("may"), "duplicate");
        assert_eq!(dict.lookup("cat").unwrap().words(), ["may", "cat"]);

        assert!(dict.add_word("cay"));
        assert_eq!(dict.lookup("cat").unwrap().words(), ["may", "cat", "cay"]);

        assert!(dict.add_word("a"));
        assert_eq!(dict.lookup("a").unwrap().default_word(), "a");
        assert_eq!(dict.len(), 2);

        assert!(!dict.add_word(""));
    }

    #[test]
    fn delete_word_cases() {
        let mut dict = may_cat();
        assert!(!dict.delete_word("x"), "missing entry");
        assert!(!dict.delete_word("mat"), "missing word");
        assert_eq!(dict.lookup("cat").unwrap().words(), ["may", "cat"]);

        assert!(dict.delete_word("may"));
        let entry = dict.lookup("cat").unwrap();
        assert_eq!(entry.default_word(), "cat");
        assert_eq!(entry.words(), ["cat"]);

        assert!(dict.delete_word("cat"));
        assert!(dict.is_empty());
    }

    #[test]
    fn scenario_add_then_delete_default() {
        let mut dict = may_cat();
        assert!(dict.add_word("cay"));
        assert!(dict.delete_word("may"));
        let entry = dict.lookup("cat").unwrap();
        assert_eq!(entry.default_word(), "cat");
        assert_eq!(entry.words(), ["cat", "cay"]);
    }

    #[test]
    fn set_default_cases() {
        let mut dict = may_cat();
        assert!(!dict.set_default(""));
        assert!(!dict.set_default("x"));

        assert!(dict.set_default("cat"));
        assert_eq!(dict.lookup("cat").unwrap().default_word(), "cat");

        let mut dict = may_cat();
        assert!(dict.set_default("Cat"), "auto-capitalized");
        assert_eq!(dict.lookup("cat").unwrap().default_word(), "cat");
        assert_eq!(dict.lookup("cat").unwrap().words(), ["may", "cat"]);

        let mut dict = may_cat();
        assert!(dict.set_default("cat's"), "possessive");
        assert_eq!(dict.lookup("cat").unwrap().default_word(), "cat");

        let mut dict = may_cat();
        assert!(dict.set_default("CAT"), "unexpected spelling is added");
        let entry = dict.lookup("cat").unwrap();
        assert_eq!(entry.default_word(), "CAT");
        assert_eq!(entry.words(), ["may", "cat", "CAT"]);
    }

    #[test]
    fn set_default_possessive_single_letter() {
        let mut dict = may_cat();
        dict.add_word("a");
        assert!(dict.set_default("a's"));
        assert_eq!(dict.lookup("a").unwrap().default_word(), "a");
        assert_eq!(dict.lookup("cat").unwrap().default_word(), "may");
    }

    #[test]
    fn word_validation() {
        for word in ["a", "cat", "x-ray", "it's", "O'Neil"] {
            assert!(is_valid_word(word), "{word}");
        }
        for word in ["", "-cat", "cat'", "c4t", "two words", "'s"] {
            assert!(!is_valid_word(word), "{word}");
        }
    }

    #[test]
    fn expand_capitals_appends_missing_forms() {
        let mut entry = Entry::new("Hi");
        entry.push("hi".into());
        entry.push("he".into());
        entry.expand_capitals();
        assert_eq!(entry.words(), ["Hi", "hi", "he", "He"]);
    }

    #[test]
    fn entry_rejects_broken_invariants() {
        let bad: Result<Entry, _> = serde_json::from_str(r#"{"default":"x","words":["y"]}"#);
        assert!(bad.is_err());
        let dup: Result<Entry, _> = serde_json::from_str(r#"{"default":"y","words":["y","y"]}"#);
        assert!(dup.is_err());
        let empty: Result<Entry, _> = serde_json::from_str(r#"{"default":"y","words":[]}"#);
        assert!(empty.is_err());
    }

    #[test]
    fn json_shape_is_sorted_map() {
        let dict = Dictionary::from_words(&["the", "a"]);
        let json = serde_json::to_string(&dict).unwrap();
        assert_eq!(
            json,
            r#"{"a":{"default":"a","words":["a"]},"tge":{"default":"the","words":["the"]}}"#
        );
    }

    #[test]
    fn stale_keys_are_rekeyed_on_load() {
        let json = r#"{"^[ty][gh][ei]$":{"default":"the","words":["the","thi"]}}"#;
        let dict: Dictionary = serde_json::from_str(json).unwrap();
        assert_eq!(dict.lookup("tge").unwrap().words(), ["the", "thi"]);
    }

    #[test]
    fn misfiled_words_move_to_their_own_key() {
        let json = r#"{
            "cat": {"default": "may", "words": ["may", "dog", "cat", "thi"]},
            "tge": {"default": "the", "words": ["the"]}
        }"#;
        let mut dict: Dictionary = serde_json::from_str(json).unwrap();
        assert_eq!(dict.len(), 3);
        assert_eq!(dict.lookup("cat").unwrap().words(), ["may", "cat"]);
        assert_eq!(dict.lookup("dwg").unwrap().default_word(), "dog");

        let the = dict.lookup("tge").unwrap();
        assert_eq!(the.default_word(), "the");
        assert_eq!(the.words(), ["the", "thi"]);

        assert!(dict.delete_word("dog"));
        assert!(dict.entry_for_word("dog").is_none());
    }
}
