//! Engine context for shell communication.
//!
//! `ImeContext` is a plain data container. After every call to
//! `ImeEngine::process_key()` or `ImeEngine::on_cursor_moved()` the shell
//! reads these fields to update its mode indicator, candidate popup and
//! status bar. No callbacks, no traits.

use crate::buffer::HighlightTag;

/// Engine state visible to the shell.
///
/// # Fields
///
/// - `mode_text`: short label for the current mode ("Insert" / "WordCheck")
/// - `candidates`: spellings of the word under the cursor (wordcheck only)
/// - `candidate_cursor`: index of the spelling currently in the text
/// - `highlight`: tag of the highlighted word, if any
/// - `message`: informational text for the user (consume with `take_message`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImeContext {
    pub mode_text: String,

    pub candidates: Vec<String>,

    pub candidate_cursor: usize,

    pub highlight: Option<HighlightTag>,

    pub message: String,
}

impl ImeContext {
    /// Create a new empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear candidates and highlight. Does NOT clear `message`.
    pub fn clear(&mut self) {
        self.candidates.clear();
        self.candidate_cursor = 0;
        self.highlight = None;
    }

    /// Take the message, leaving it empty.
    pub fn take_message(&mut self) -> String {
        std::mem::take(&mut self.message)
    }

    pub fn has_message(&self) -> bool {
        !self.message.is_empty()
    }

    /// Check if there's anything to show in a candidate popup.
    pub fn has_candidates(&self) -> bool {
        !self.candidates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_message_consumes() {
        let mut ctx = ImeContext::new();
        ctx.message = "Word not found in dictionary".into();
        assert!(ctx.has_message());
        assert_eq!(ctx.take_message(), "Word not found in dictionary");
        assert!(!ctx.has_message());
    }

    #[test]
    fn clear_keeps_message() {
        let mut ctx = ImeContext {
            mode_text: "WordCheck".into(),
            candidates: vec!["the".into()],
            candidate_cursor: 0,
            highlight: Some(HighlightTag::Default),
            message: "saved".into(),
        };
        ctx.clear();
        assert!(!ctx.has_candidates());
        assert_eq!(ctx.highlight, None);
        assert_eq!(ctx.message, "saved");
        assert_eq!(ctx.mode_text, "WordCheck");
    }
}
