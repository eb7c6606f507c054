use anyhow::Result;
use onehand_core::{fold_word, resolve_entry, resolve_substitution, Dictionary};
use serde_json::json;

/// Describe how `word` looks to the dictionary, as pretty JSON.
pub fn run(dict: &Dictionary, word: &str) -> Result<String> {
    let report = json!({
        "word": word,
        "fold_key": fold_word(word),
        "entry": dict.entry_for_word(word),
        "resolved_entry": resolve_entry(dict, word),
        "substitution": resolve_substitution(dict, word),
    });
    Ok(serde_json::to_string_pretty(&report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn reports_entry_and_substitution() {
        let dict = Dictionary::from_words(&["may", "cat"]);
        let report: Value = serde_json::from_str(&run(&dict, "cat").unwrap()).unwrap();
        assert_eq!(report["fold_key"], "cat");
        assert_eq!(report["entry"]["default"], "may");
        assert_eq!(report["entry"]["words"], json!(["may", "cat"]));
        assert_eq!(report["substitution"], "may");
    }

    #[test]
    fn unknown_word_reports_nulls() {
        let dict = Dictionary::from_words(&["may"]);
        let report: Value = serde_json::from_str(&run(&dict, "qqq").unwrap()).unwrap();
        assert!(report["entry"].is_null());
        assert!(report["substitution"].is_null());
    }
}
