//! Editor session state.
//!
//! `ImeSession` tracks what survives between key events: the input mode, the
//! word currently under review in wordcheck mode, the autocaps switch and
//! whether the dictionary has unsaved changes. The cursor itself lives in the
//! buffer and is re-read whenever it is needed.

use crate::buffer::{Highlight, HighlightTag};
use crate::context::ImeContext;
use crate::dictionary::Entry;

/// Current input mode of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Typing; words are resolved at boundary keys.
    #[default]
    Insert,
    /// Reviewing; letter keys navigate and cycle spellings.
    WordCheck,
}

impl InputMode {
    /// Label shown in the shell's mode indicator.
    pub fn label(self) -> &'static str {
        match self {
            InputMode::Insert => "Insert",
            InputMode::WordCheck => "WordCheck",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            InputMode::Insert => InputMode::WordCheck,
            InputMode::WordCheck => InputMode::Insert,
        }
    }
}

/// The word under the cursor in wordcheck mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordCheckToken {
    /// Char range of the word in the document.
    pub start: usize,
    pub end: usize,
    /// Text currently in the range.
    pub text: String,
    /// Expanded candidates, `None` when the word is not in the dictionary.
    pub entry: Option<Entry>,
    /// Position of `text` in the candidates (0 if absent).
    pub index: usize,
}

impl WordCheckToken {
    pub fn new(start: usize, text: String, entry: Option<Entry>) -> Self {
        let end = start + text.chars().count();
        let index = entry
            .as_ref()
            .and_then(|e| e.position(&text))
            .unwrap_or(0);
        Self {
            start,
            end,
            text,
            entry,
            index,
        }
    }

    /// How the current text relates to the dictionary.
    pub fn tag(&self) -> HighlightTag {
        match &self.entry {
            None => HighlightTag::Missing,
            Some(entry) if entry.is_default(&self.text) => HighlightTag::Default,
            Some(_) => HighlightTag::Alternate,
        }
    }

    pub fn highlight(&self) -> Highlight {
        Highlight {
            start: self.start,
            end: self.end,
            tag: self.tag(),
        }
    }

    /// Candidate `step` places away from the current one, wrapping around.
    pub fn candidate(&self, step: isize) -> Option<&str> {
        let entry = self.entry.as_ref()?;
        let len = entry.len() as isize;
        let idx = (self.index as isize + step).rem_euclid(len) as usize;
        entry.words().get(idx).map(String::as_str)
    }
}

/// Session state carried across key events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImeSession {
    mode: InputMode,

    wordcheck_token: Option<WordCheckToken>,

    /// Sentence-start capitalization in insert mode
    autocaps: bool,

    /// Dictionary changed since it was loaded or last saved
    dictionary_modified: bool,
}

impl ImeSession {
    /// Create a new session in insert mode.
    pub fn new(autocaps: bool) -> Self {
        Self {
            mode: InputMode::Insert,
            wordcheck_token: None,
            autocaps,
            dictionary_modified: false,
        }
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: InputMode) {
        self.mode = mode;
        if mode == InputMode::Insert {
            self.wordcheck_token = None;
        }
    }

    pub fn wordcheck_token(&self) -> Option<&WordCheckToken> {
        self.wordcheck_token.as_ref()
    }

    pub fn set_wordcheck_token(&mut self, token: Option<WordCheckToken>) {
        self.wordcheck_token = token;
    }

    pub fn autocaps(&self) -> bool {
        self.autocaps
    }

    pub fn set_autocaps(&mut self, enabled: bool) {
        self.autocaps = enabled;
    }

    pub fn is_dictionary_modified(&self) -> bool {
        self.dictionary_modified
    }

    pub fn mark_dictionary_modified(&mut self) {
        self.dictionary_modified = true;
    }

    /// Called after the dictionary has been persisted.
    pub fn clear_dictionary_modified(&mut self) {
        self.dictionary_modified = false;
    }

    /// Copy session state into the shell-facing context.
    pub fn sync_to_context(&self, context: &mut ImeContext) {
        context.clear();
        context.mode_text = self.mode.label().to_string();

        if let Some(token) = &self.wordcheck_token {
            if let Some(entry) = &token.entry {
                context.candidates = entry.words().to_vec();
            }
            context.candidate_cursor = token.index;
            context.highlight = Some(token.tag());
        }
    }
}

impl Default for ImeSession {
    fn default() -> Self {
        Self::new(true)
    }
}
