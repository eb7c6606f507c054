//! Token resolution against the dictionary.
//!
//! Two read-only entry points:
//! - `resolve_entry` produces the candidate list shown in wordcheck mode
//! - `resolve_substitution` produces the single best spelling written back in
//!   insert mode, keeping the typed capitalization and trailing punctuation

use crate::dictionary::{strip_possessive, Dictionary, Entry, POSSESSIVE_SUFFIX};
use crate::fold::{capitalize_first, is_capital, symbol_for_letter};

/// Punctuation that may trail a word and is not part of its root.
fn is_trailing_symbol(c: char) -> bool {
    matches!(c, '.' | ',' | ';' | '<' | '>' | ':')
}

/// Candidates for a token of letters, apostrophes and hyphens.
///
/// The returned entry is a copy of the stored one, extended with capitalized
/// forms of its lowercase members. A possessive token (`cat's`, `cat'l`) whose
/// root is known resolves to the root's spellings with `'s` appended.
pub fn resolve_entry(dict: &Dictionary, raw_word: &str) -> Option<Entry> {
    if raw_word.is_empty() {
        return None;
    }

    let mut entry = match dict.entry_for_word(raw_word) {
        Some(entry) => entry.clone(),
        None => {
            let root = strip_possessive(raw_word)?;
            dict.entry_for_word(root)?.possessive()
        }
    };
    entry.expand_capitals();
    tracing::trace!(word = raw_word, candidates = entry.len(), "resolved entry");
    Some(entry)
}

/// Best spelling for a raw typed token, or `None` if nothing matches.
///
/// The left-hand letters `a z x` (and capitals) are read as the punctuation on
/// their mirrored keys; the longest prefix that names a dictionary entry is
/// replaced by that entry's default and the rest is kept as punctuation.
///
/// ```
/// use onehand_core::{resolve_substitution, Dictionary};
/// let dict = Dictionary::from_words(&["ax", "and"]);
/// assert_eq!(resolve_substitution(&dict, ";,.,;").as_deref(), Some("ax.,;"));
/// assert_eq!(resolve_substitution(&dict, ":nd").as_deref(), Some("And"));
/// ```
pub fn resolve_substitution(dict: &Dictionary, raw_token: &str) -> Option<String> {
    let first = raw_token.chars().next()?;
    let capitalized = is_capital(first);

    let symbolized: Vec<char> = raw_token.chars().map(symbol_for_letter).collect();
    let mut root_len = symbolized.len();
    while root_len > 1 && is_trailing_symbol(symbolized[root_len - 1]) {
        root_len -= 1;
    }

    let mut resolved = None;
    for end in (root_len..=symbolized.len()).rev() {
        let prefix: String = symbolized[..end].iter().collect();
        if let Some(entry) = dict.entry_for_word(&prefix) {
            let tail: String = symbolized[end..].iter().collect();
            resolved = Some(format!("{}{}", entry.default_word(), tail));
            break;
        }
    }

    if resolved.is_none() && root_len > 2 {
        let root: String = symbolized[..root_len].iter().collect();
        if let Some(stem) = strip_possessive(&root) {
            if let Some(entry) = dict.entry_for_word(stem) {
                let tail: String = symbolized[root_len..].iter().collect();
                resolved = Some(format!(
                    "{}{}{}",
                    entry.default_word(),
                    POSSESSIVE_SUFFIX,
                    tail
                ));
            }
        }
    }

    let resolved = resolved?;
    let resolved = if capitalized {
        capitalize_first(&resolved)
    } else {
        resolved
    };
    tracing::debug!(token = raw_token, replacement = %resolved, "substitution");
    Some(resolved)
}
