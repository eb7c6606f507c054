use anyhow::{bail, Result};
use onehand_core::{Config, Dictionary, DictionaryStore, ImeEngine};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Action {
    Add,
    Delete,
    Default,
}

/// Apply one dictionary command and save through `store` if it changed.
pub fn run(
    dictionary: Dictionary,
    store: &DictionaryStore,
    config: &Config,
    action: Action,
    word: &str,
) -> Result<Option<PathBuf>> {
    let mut engine = ImeEngine::with_config(dictionary, config.clone());
    let applied = match action {
        Action::Add => engine.add_word(word),
        Action::Delete => engine.delete_word(word),
        Action::Default => engine.set_default(word),
    };
    if !applied {
        bail!("{}", engine.context_mut().take_message());
    }
    engine.save_dictionary(store)
}
