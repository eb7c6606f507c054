//! Input engine with session management and key event processing.
//!
//! `ImeEngine` owns the dictionary, the session and the shell-facing context,
//! and routes every key event to the editor of the current mode. The document
//! is not owned: each call borrows the shell's `Buffer`.

use crate::buffer::{Buffer, EditCommand};
use crate::context::ImeContext;
use crate::dictionary::{is_valid_word, Dictionary};
use crate::editor::{Editor, EditorResult, InsertEditor, WordCheckEditor};
use crate::session::{ImeSession, InputMode};
use crate::store::DictionaryStore;
use crate::Config;
use std::path::PathBuf;

/// Shown when an explicit dictionary command is given a malformed word.
pub const INVALID_WORD_MESSAGE: &str = "A word can only contain letters (upper or lower case) \
     and contain (but not start or end with) - (dashes) and ' (apostrophes).";

/// Key event types the engine can process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    /// Character input, unmodified or shifted
    Char(char),
    /// Space key
    Space,
    /// Enter/Return key
    Enter,
    /// Backspace key
    Backspace,
    /// Delete key
    Delete,
    /// Left arrow key
    Left,
    /// Right arrow key
    Right,
    /// Up arrow key
    Up,
    /// Down arrow key
    Down,
    /// Ctrl + character (e.g., Ctrl+e for the mode toggle)
    Ctrl(char),
}

/// Result of processing a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResult {
    /// Key was handled by the engine
    Handled,
    /// Key was not handled (pass through to the shell)
    NotHandled,
}

/// Input engine with session management.
pub struct ImeEngine {
    insert_editor: InsertEditor,

    wordcheck_editor: WordCheckEditor,

    dictionary: Dictionary,

    session: ImeSession,

    context: ImeContext,

    config: Config,
}

impl ImeEngine {
    /// Create an engine over `dictionary` with default configuration.
    pub fn new(dictionary: Dictionary) -> Self {
        Self::with_config(dictionary, Config::default())
    }

    pub fn with_config(dictionary: Dictionary, config: Config) -> Self {
        let session = ImeSession::new(config.autocaps);
        let mut context = ImeContext::new();
        session.sync_to_context(&mut context);
        Self {
            insert_editor: InsertEditor::new(&config.boundary_keys),
            wordcheck_editor: WordCheckEditor::new(),
            dictionary,
            session,
            context,
            config,
        }
    }

    /// Get a reference to the context for reading engine state.
    pub fn context(&self) -> &ImeContext {
        &self.context
    }

    /// Get a mutable reference to the context.
    pub fn context_mut(&mut self) -> &mut ImeContext {
        &mut self.context
    }

    /// Get a reference to the session.
    pub fn session(&self) -> &ImeSession {
        &self.session
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// Consume the engine, handing the dictionary back for persistence.
    pub fn into_dictionary(self) -> Dictionary {
        self.dictionary
    }

    pub fn mode(&self) -> InputMode {
        self.session.mode()
    }

    pub fn set_autocaps(&mut self, enabled: bool) {
        self.session.set_autocaps(enabled);
    }

    pub fn is_dictionary_modified(&self) -> bool {
        self.session.is_dictionary_modified()
    }

    /// Persist the dictionary through `store` if it has unsaved changes.
    ///
    /// Returns the path written, if any.
    pub fn save_dictionary(&mut self, store: &DictionaryStore) -> anyhow::Result<Option<PathBuf>> {
        let written = store.save(&self.dictionary, self.session.is_dictionary_modified())?;
        if written.is_some() {
            self.session.clear_dictionary_modified();
        }
        Ok(written)
    }

    /// Process a key event against `buffer`.
    ///
    /// After calling this, the shell should read `context()` to update its UI.
    /// Returns `KeyResult::NotHandled` for keys the shell should handle itself.
    pub fn process_key<B: Buffer>(&mut self, key: KeyEvent, buffer: &mut B) -> KeyResult {
        tracing::trace!(?key, mode = self.session.mode().label(), "process key");

        // Global shortcuts first (before mode routing)
        match key {
            KeyEvent::Ctrl('e' | 'i' | 'E' | 'I') => {
                self.toggle_mode(buffer);
                return KeyResult::Handled;
            }
            KeyEvent::Ctrl(';') => {
                buffer.perform(EditCommand::SelectAll);
                self.on_cursor_moved(buffer);
                return KeyResult::Handled;
            }
            KeyEvent::Ctrl('/') => {
                buffer.perform(EditCommand::Undo);
                self.on_cursor_moved(buffer);
                return KeyResult::Handled;
            }
            _ => {}
        }

        let result = match self.session.mode() {
            InputMode::Insert => self.insert_editor.process_key(
                key,
                &mut self.session,
                &mut self.dictionary,
                buffer,
            ),
            InputMode::WordCheck => self.wordcheck_editor.process_key(
                key,
                &mut self.session,
                &mut self.dictionary,
                buffer,
            ),
        };

        match result {
            EditorResult::Handled => {
                self.session.sync_to_context(&mut self.context);
                KeyResult::Handled
            }
            EditorResult::PassThrough => KeyResult::NotHandled,
        }
    }

    /// Switch between insert and wordcheck mode.
    ///
    /// Entering wordcheck highlights the word under the cursor; leaving it
    /// clears all highlighting.
    pub fn toggle_mode<B: Buffer>(&mut self, buffer: &mut B) {
        let mode = self.session.mode().toggled();
        match mode {
            InputMode::WordCheck => {
                self.session.set_mode(mode);
                self.wordcheck_editor
                    .refresh(&mut self.session, &self.dictionary, buffer);
            }
            InputMode::Insert => {
                self.wordcheck_editor.reset(&mut self.session, buffer);
                self.insert_editor.reset(&mut self.session, buffer);
                self.session.set_mode(mode);
            }
        }
        tracing::debug!(mode = mode.label(), "mode switch");
        self.session.sync_to_context(&mut self.context);
    }

    /// Tell the engine the cursor or text changed outside `process_key`
    /// (mouse click, programmatic edit).
    pub fn on_cursor_moved<B: Buffer>(&mut self, buffer: &mut B) {
        if self.session.mode() == InputMode::WordCheck {
            self.wordcheck_editor
                .refresh(&mut self.session, &self.dictionary, buffer);
        }
        self.session.sync_to_context(&mut self.context);
    }

    /// Add a word to the dictionary.
    ///
    /// On failure a message is left in the context.
    pub fn add_word(&mut self, word: &str) -> bool {
        let word = crate::utils::normalize(word);
        if !is_valid_word(&word) {
            self.context.message = INVALID_WORD_MESSAGE.to_string();
            return false;
        }
        if self.dictionary.add_word(&word) {
            tracing::info!(word = %word, "added word");
            self.session.mark_dictionary_modified();
            true
        } else {
            self.context.message = "Word already in your dictionary".to_string();
            false
        }
    }

    /// Remove a word from the dictionary.
    pub fn delete_word(&mut self, word: &str) -> bool {
        let word = crate::utils::normalize(word);
        if !is_valid_word(&word) {
            self.context.message = INVALID_WORD_MESSAGE.to_string();
            return false;
        }
        if self.dictionary.delete_word(&word) {
            tracing::info!(word = %word, "deleted word");
            self.session.mark_dictionary_modified();
            true
        } else {
            self.context.message = "Word not found in dictionary".to_string();
            false
        }
    }

    /// Make `word` the default spelling of its entry.
    pub fn set_default(&mut self, word: &str) -> bool {
        let word = crate::utils::normalize(word);
        if self.dictionary.set_default(&word) {
            self.session.mark_dictionary_modified();
            true
        } else {
            self.context.message = "Word not found in dictionary".to_string();
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{HighlightTag, TextBuffer};

    fn engine() -> ImeEngine {
        let config = Config {
            autocaps: false,
            ..Config::default()
        };
        ImeEngine::with_config(Dictionary::from_words(&["may", "cat", "the"]), config)
    }

    fn type_str(engine: &mut ImeEngine, buf: &mut TextBuffer, text: &str) {
        for ch in text.chars() {
            let key = match ch {
                ' ' => KeyEvent::Space,
                '\n' => KeyEvent::Enter,
                c => KeyEvent::Char(c),
            };
            engine.process_key(key, buf);
        }
    }

    #[test]
    fn starts_in_insert_mode() {
        let engine = engine();
        assert_eq!(engine.mode(), InputMode::Insert);
        assert_eq!(engine.context().mode_text, "Insert");
    }

    #[test]
    fn toggle_enters_and_leaves_wordcheck() {
        let mut engine = engine();
        let mut buf = TextBuffer::new();
        type_str(&mut engine, &mut buf, "thi");

        assert_eq!(engine.process_key(KeyEvent::Ctrl('i'), &mut buf), KeyResult::Handled);
        assert_eq!(engine.mode(), InputMode::WordCheck);
        assert_eq!(buf.highlights().len(), 1);
        assert_eq!(buf.highlights()[0].tag, HighlightTag::Alternate);
        assert_eq!(engine.context().mode_text, "WordCheck");

        engine.process_key(KeyEvent::Ctrl('e'), &mut buf);
        assert_eq!(engine.mode(), InputMode::Insert);
        assert!(buf.highlights().is_empty());
        assert!(engine.session().wordcheck_token().is_none());
    }

    #[test]
    fn other_ctrl_keys_pass_through() {
        let mut engine = engine();
        let mut buf = TextBuffer::new();
        assert_eq!(engine.process_key(KeyEvent::Ctrl('s'), &mut buf), KeyResult::NotHandled);
        engine.process_key(KeyEvent::Ctrl('e'), &mut buf);
        assert_eq!(engine.process_key(KeyEvent::Ctrl('s'), &mut buf), KeyResult::NotHandled);
    }

    #[test]
    fn mirrored_shortcuts() {
        let mut engine = engine();
        let mut buf = TextBuffer::new();
        type_str(&mut engine, &mut buf, "the cat");
        engine.process_key(KeyEvent::Ctrl(';'), &mut buf);
        assert_eq!(buf.selected_text(), "the cat");

        engine.process_key(KeyEvent::Ctrl('/'), &mut buf);
        assert_eq!(buf.text(), "the ca");
    }

    #[test]
    fn dictionary_commands_report_failures() {
        let mut engine = engine();
        assert!(!engine.is_dictionary_modified());

        assert!(!engine.add_word("may"));
        assert_eq!(engine.context_mut().take_message(), "Word already in your dictionary");
        assert!(!engine.is_dictionary_modified());

        assert!(engine.add_word("cay"));
        assert!(engine.is_dictionary_modified());

        assert!(!engine.delete_word("dog"));
        assert_eq!(engine.context_mut().take_message(), "Word not found in dictionary");

        assert!(!engine.add_word("-cat"));
        assert_eq!(engine.context_mut().take_message(), INVALID_WORD_MESSAGE);

        assert!(engine.delete_word("may"));
        assert!(engine.set_default("cay"));
        assert_eq!(engine.dictionary().lookup("cat").unwrap().default_word(), "cay");

        assert!(!engine.set_default("qqq"));
        assert!(engine.context().has_message());
    }

    #[test]
    fn save_clears_modified_flag() {
        let dir = tempfile::tempdir().unwrap();
        let bundled = dir.path().join("bundled.json");
        crate::store::save_dictionary(&Dictionary::from_words(&["cat"]), &bundled).unwrap();

        let mut store = DictionaryStore::new(Some(dir.path().join("u").join("d.json")), bundled);
        let mut engine = ImeEngine::new(store.load().unwrap());
        assert_eq!(engine.save_dictionary(&store).unwrap(), None);

        engine.add_word("may");
        let written = engine.save_dictionary(&store).unwrap();
        assert_eq!(written, Some(dir.path().join("u").join("d.json")));
        assert!(!engine.is_dictionary_modified());
    }
}
