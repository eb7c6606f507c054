use anyhow::Result;
use onehand_core::{save_dictionary, Dictionary, WordSource};
use std::path::{Path, PathBuf};

/// Build a dictionary from word lists and write it to `out`.
///
/// Sources are taken in priority order. `keep_capitals[i]` applies to
/// `sources[i]`; sources without a flag keep their capitalized words.
pub fn run(sources: &[PathBuf], keep_capitals: &[bool], out: &Path) -> Result<Dictionary> {
    if keep_capitals.len() > sources.len() {
        tracing::warn!(
            sources = sources.len(),
            flags = keep_capitals.len(),
            "more keep-capitals flags than sources, extra flags ignored"
        );
    } else if keep_capitals.len() < sources.len() {
        tracing::warn!(
            sources = sources.len(),
            flags = keep_capitals.len(),
            "missing keep-capitals flags default to true"
        );
    }

    let mut lists = Vec::with_capacity(sources.len());
    for (i, path) in sources.iter().enumerate() {
        let keep = keep_capitals.get(i).copied().unwrap_or(true);
        let source = WordSource::load(path, keep)?;
        tracing::debug!(
            path = %path.display(),
            words = source.words.len(),
            keep_capitals = keep,
            "read word list"
        );
        lists.push(source);
    }

    let dict = Dictionary::build(lists);
    save_dictionary(&dict, out)?;
    Ok(dict)
}
