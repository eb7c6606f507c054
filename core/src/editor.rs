//! Editor trait and implementations for the two input modes.
//!
//! Each editor implements the `Editor` trait and processes key events in its
//! own mode. Editors hold no document state: the session, the dictionary and
//! the buffer are handed in on every call by `ImeEngine`.

use crate::buffer::{Buffer, EditCommand, Motion};
use crate::dictionary::Dictionary;
use crate::fold::{capitalize_first, symbol_for_letter};
use crate::ime_engine::KeyEvent;
use crate::resolver::{resolve_entry, resolve_substitution};
use crate::session::{ImeSession, WordCheckToken};
use once_cell::sync::Lazy;
use regex::Regex;

/// Result of processing a key event in an editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorResult {
    /// Key was handled, buffer and session updated
    Handled,

    /// Key not handled by this editor, pass to the shell
    PassThrough,
}

/// Editor trait for handling input in a specific mode.
pub trait Editor {
    /// Process a key event in this editor's mode.
    fn process_key(
        &mut self,
        key: KeyEvent,
        session: &mut ImeSession,
        dict: &mut Dictionary,
        buffer: &mut dyn Buffer,
    ) -> EditorResult;

    /// Reset editor state when leaving the mode.
    fn reset(&mut self, session: &mut ImeSession, buffer: &mut dyn Buffer);

    /// Get a human-readable name for this editor (for debugging/logging).
    fn name(&self) -> &'static str;
}

/// Map the arrow keys onto native motions.
fn arrow_motion(key: &KeyEvent) -> Option<Motion> {
    match key {
        KeyEvent::Left => Some(Motion::CharLeft),
        KeyEvent::Right => Some(Motion::CharRight),
        KeyEvent::Up => Some(Motion::LineUp),
        KeyEvent::Down => Some(Motion::LineDown),
        _ => None,
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

// ============================================================================
// InsertEditor - typing with resolution at word boundaries
// ============================================================================

/// Trailing token of a line: leading symbols, the raw word, and what follows
/// it. A closing-bracket cluster may be followed by left-hand letters standing
/// in for punctuation, which are captured as `end_punct_and_space`.
static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?P<lead_symbols>[^\sA-Za-z,.;:<>]*)",
        r"(?P<raw_word>[A-Za-z,.;:<>'-]+?)",
        r"(?P<end>[^A-Za-z,.;:<>]*|",
        r#"[!?'"]*[\]})]+['"]*(?P<end_punct_and_space>[.,;:azxA]+\s*))$"#,
    ))
    .expect("token pattern compiles")
});

/// Whether the word ending `line` starts a sentence.
///
/// True when it is the first run on the line or the previous run (ignoring
/// trailing quotes) ends with `.`, `?` or `!`. Never true once the line ends in
/// whitespace.
fn starts_sentence(line: &str) -> bool {
    if line.is_empty() || line.ends_with(char::is_whitespace) {
        return false;
    }
    let runs: Vec<&str> = line.split_whitespace().collect();
    if runs.len() < 2 {
        return true;
    }
    let prev = runs[runs.len() - 2].trim_end_matches(|c| c == '\'' || c == '"');
    prev.is_empty() || prev.ends_with(|c| matches!(c, '.' | '?' | '!'))
}

/// Insert mode: keys type text, boundary keys resolve the preceding word.
pub struct InsertEditor {
    boundary_keys: Vec<char>,
}

impl InsertEditor {
    /// Create an insert editor resolving on the given boundary characters.
    pub fn new(boundary_keys: &str) -> Self {
        Self {
            boundary_keys: boundary_keys.chars().collect(),
        }
    }

    /// The character a key inserts, if it is a boundary key.
    fn boundary_char(&self, key: &KeyEvent) -> Option<char> {
        let ch = match key {
            KeyEvent::Char(ch) => *ch,
            KeyEvent::Space => ' ',
            KeyEvent::Enter => '\n',
            _ => return None,
        };
        self.boundary_keys.contains(&ch).then_some(ch)
    }

    /// Overwrite the word before the cursor with its resolved spelling.
    ///
    /// Returns true if the word was replaced. Left-hand letters after a
    /// closing bracket are turned into punctuation even when the word itself
    /// is unknown.
    pub fn process_previous_word(
        &self,
        session: &ImeSession,
        dict: &Dictionary,
        buffer: &mut dyn Buffer,
    ) -> bool {
        let line = buffer.text_before_cursor(usize::MAX);
        let cursor = buffer.cursor_position();
        let line_start = cursor - char_len(&line);

        let Some(caps) = TOKEN_PATTERN.captures(&line) else {
            return false;
        };
        let Some(raw_word) = caps.name("raw_word") else {
            return false;
        };

        if let Some(end) = caps.name("end_punct_and_space") {
            let converted: String = end.as_str().chars().map(symbol_for_letter).collect();
            if converted != end.as_str() {
                let n = char_len(&converted);
                buffer.replace_range(cursor - n, cursor, &converted);
            }
        }

        let Some(mut word) = resolve_substitution(dict, raw_word.as_str()) else {
            tracing::debug!(token = raw_word.as_str(), "no substitution");
            return false;
        };
        if session.autocaps() && starts_sentence(&line) {
            word = capitalize_first(&word);
        }

        let start = line_start + char_len(&line[..raw_word.start()]);
        let end = start + char_len(raw_word.as_str());
        if line[raw_word.range()] != word {
            buffer.replace_range(start, end, &word);
        }
        true
    }
}

impl Editor for InsertEditor {
    fn process_key(
        &mut self,
        key: KeyEvent,
        session: &mut ImeSession,
        dict: &mut Dictionary,
        buffer: &mut dyn Buffer,
    ) -> EditorResult {
        if let Some(boundary) = self.boundary_char(&key) {
            self.process_previous_word(session, dict, buffer);
            buffer.insert_text(&boundary.to_string());
            return EditorResult::Handled;
        }

        if let Some(motion) = arrow_motion(&key) {
            buffer.navigate(motion);
            return EditorResult::Handled;
        }

        match key {
            KeyEvent::Char(ch) => buffer.insert_text(&ch.to_string()),
            KeyEvent::Space => buffer.insert_text(" "),
            KeyEvent::Enter => buffer.insert_text("\n"),
            KeyEvent::Backspace => buffer.perform(EditCommand::DeleteBackward),
            KeyEvent::Delete => buffer.perform(EditCommand::DeleteForward),
            _ => return EditorResult::PassThrough,
        }
        EditorResult::Handled
    }

    fn reset(&mut self, _session: &mut ImeSession, _buffer: &mut dyn Buffer) {}

    fn name(&self) -> &'static str {
        "insert"
    }
}

// ============================================================================
// WordCheckEditor - navigation and candidate cycling
// ============================================================================

static FRONT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"'*(?P<raw_front>[A-Za-z'-]*?)$").expect("front pattern compiles"));

static BACK_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z'-]*").expect("back pattern compiles"));

/// Split the word under the cursor into the parts before and after it.
///
/// A word is a run of letters, apostrophes and hyphens. Apostrophes at either
/// edge are quotes, not part of the word, so a cursor sitting next to one is
/// outside the word: for `'h'i'`, a cursor at 0 yields nothing and a cursor
/// at 1 yields `("", "h'i")`.
pub fn word_under_cursor<'a>(before: &'a str, after: &'a str) -> (&'a str, &'a str) {
    let raw_front = FRONT_PATTERN
        .captures(before)
        .and_then(|c| c.name("raw_front"))
        .map_or("", |m| m.as_str());
    let raw_back = BACK_PATTERN.find(after).map_or("", |m| m.as_str());
    let pre_back = raw_back.trim_end_matches('\'');

    let front = if pre_back.is_empty() && raw_front.ends_with('\'') {
        ""
    } else {
        raw_front
    };
    let back = if front.is_empty() && pre_back.starts_with('\'') {
        ""
    } else {
        pre_back
    };
    (front, back)
}

/// Wordcheck mode: letter keys navigate, cycle spellings and set defaults.
#[derive(Debug, Default)]
pub struct WordCheckEditor;

impl WordCheckEditor {
    pub fn new() -> Self {
        Self
    }

    /// Recompute and highlight the word under the cursor.
    pub fn refresh(&self, session: &mut ImeSession, dict: &Dictionary, buffer: &mut dyn Buffer) {
        let before = buffer.text_before_cursor(usize::MAX);
        let after = buffer.text_after_cursor(usize::MAX);
        let (front, back) = word_under_cursor(&before, &after);

        if front.is_empty() && back.is_empty() {
            session.set_wordcheck_token(None);
            buffer.set_highlight_ranges(&[]);
            return;
        }

        let word = format!("{front}{back}");
        let start = buffer.cursor_position() - char_len(front);
        let entry = resolve_entry(dict, &word);
        let token = WordCheckToken::new(start, word, entry);
        tracing::trace!(word = %token.text, tag = ?token.tag(), "wordcheck token");
        buffer.set_highlight_ranges(&[token.highlight()]);
        session.set_wordcheck_token(Some(token));
    }

    /// Replace the current word with the candidate `step` places away.
    fn cycle(
        &self,
        step: isize,
        session: &mut ImeSession,
        dict: &Dictionary,
        buffer: &mut dyn Buffer,
    ) {
        self.refresh(session, dict, buffer);
        let Some(token) = session.wordcheck_token() else {
            return;
        };
        let Some(next) = token.candidate(step).map(str::to_owned) else {
            return;
        };

        let (start, end) = (token.start, token.end);
        let offset = buffer.cursor_position().saturating_sub(start);
        tracing::debug!(from = %token.text, to = %next, "cycle candidate");

        buffer.replace_range(start, end, &next);
        buffer.set_cursor(start + offset.min(char_len(&next)), false);
    }

    /// Make the current word the default of its entry.
    fn set_default(
        &self,
        session: &mut ImeSession,
        dict: &mut Dictionary,
        buffer: &mut dyn Buffer,
    ) {
        self.refresh(session, dict, buffer);
        let Some(text) = session.wordcheck_token().map(|t| t.text.clone()) else {
            return;
        };
        if dict.set_default(&text) {
            session.mark_dictionary_modified();
        }
    }
}

impl Editor for WordCheckEditor {
    fn process_key(
        &mut self,
        key: KeyEvent,
        session: &mut ImeSession,
        dict: &mut Dictionary,
        buffer: &mut dyn Buffer,
    ) -> EditorResult {
        if let Some(motion) = arrow_motion(&key) {
            buffer.navigate(motion);
        } else {
            match key {
                KeyEvent::Char(ch) => match ch {
                    's' | 'h' => buffer.navigate(Motion::WordLeft),
                    'g' | 'l' => buffer.navigate(Motion::WordRight),
                    'd' | 'k' => buffer.navigate(Motion::LineUp),
                    'f' | 'j' => buffer.navigate(Motion::LineDown),
                    'c' | 'n' => buffer.navigate(Motion::CharLeft),
                    'v' | 'm' => buffer.navigate(Motion::CharRight),
                    'r' | 'u' => self.cycle(1, session, dict, buffer),
                    'e' | 'i' => self.cycle(-1, session, dict, buffer),
                    't' | 'y' => self.set_default(session, dict, buffer),
                    'a' | 'z' | 'x' | 'A' | 'Z' | 'X' => {
                        buffer.insert_text(&symbol_for_letter(ch).to_string())
                    }
                    ',' | '.' | ';' | ':' | '<' | '>' => buffer.insert_text(&ch.to_string()),
                    _ => tracing::trace!(key = %ch, "swallowed in wordcheck"),
                },
                KeyEvent::Backspace => buffer.perform(EditCommand::DeleteBackward),
                KeyEvent::Delete => buffer.perform(EditCommand::DeleteForward),
                KeyEvent::Ctrl(_) => return EditorResult::PassThrough,
                _ => {}
            }
        }

        self.refresh(session, dict, buffer);
        EditorResult::Handled
    }

    fn reset(&mut self, session: &mut ImeSession, buffer: &mut dyn Buffer) {
        session.set_wordcheck_token(None);
        buffer.set_highlight_ranges(&[]);
    }

    fn name(&self) -> &'static str {
        "wordcheck"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::TextBuffer;

    fn split(text: &str, cursor: usize) -> (String, String) {
        let before: String = text.chars().take(cursor).collect();
        let after: String = text.chars().skip(cursor).collect();
        let (f, b) = word_under_cursor(&before, &after);
        (f.to_string(), b.to_string())
    }

    #[test]
    fn boundary_quotes_block_the_word() {
        let text = "'h'i'";
        assert_eq!(split(text, 0), ("".into(), "".into()));
        assert_eq!(split(text, 1), ("".into(), "h'i".into()));
        assert_eq!(split(text, 2), ("h".into(), "'i".into()));
        assert_eq!(split(text, 3), ("h'".into(), "i".into()));
        assert_eq!(split(text, 4), ("h'i".into(), "".into()));
        assert_eq!(split(text, 5), ("".into(), "".into()));
    }

    #[test]
    fn word_spans_around_cursor() {
        assert_eq!(split("the box", 5), ("b".into(), "ox".into()));
        assert_eq!(split("the box", 3), ("the".into(), "".into()));
        assert_eq!(split("the box", 4), ("".into(), "box".into()));
        assert_eq!(split("x-ray, ok", 2), ("x-".into(), "ray".into()));
        assert_eq!(split("  ", 1), ("".into(), "".into()));
    }

    #[test]
    fn sentence_starts() {
        assert!(starts_sentence("thi"));
        assert!(starts_sentence("The!' thi."));
        assert!(starts_sentence("end? \"next"));
        assert!(starts_sentence("\" next"));
        assert!(!starts_sentence("the thi"));
        assert!(!starts_sentence("thi "));
        assert!(!starts_sentence(""));
    }

    fn insert_dict() -> Dictionary {
        Dictionary::from_words(&["the", "and", "ax"])
    }

    #[test]
    fn previous_word_is_replaced() {
        let dict = insert_dict();
        let session = ImeSession::new(false);
        let editor = InsertEditor::new(" \n/");

        let mut buf = TextBuffer::from_text("so thi");
        assert!(editor.process_previous_word(&session, &dict, &mut buf));
        assert_eq!(buf.text(), "so the");
        assert_eq!(buf.cursor_position(), 6);

        let mut buf = TextBuffer::from_text("qqq");
        assert!(!editor.process_previous_word(&session, &dict, &mut buf));
        assert_eq!(buf.text(), "qqq");
    }

    #[test]
    fn bracket_cluster_letters_become_punctuation() {
        let dict = insert_dict();
        let session = ImeSession::new(false);
        let editor = InsertEditor::new(" ");

        let mut buf = TextBuffer::from_text("(thi)z");
        assert!(editor.process_previous_word(&session, &dict, &mut buf));
        assert_eq!(buf.text(), "(the).");
    }

    #[test]
    fn autocaps_on_first_word() {
        let dict = insert_dict();
        let session = ImeSession::new(true);
        let editor = InsertEditor::new(" ");

        let mut buf = TextBuffer::from_text(";nd");
        editor.process_previous_word(&session, &dict, &mut buf);
        assert_eq!(buf.text(), "And");

        let mut buf = TextBuffer::from_text("And thi");
        editor.process_previous_word(&session, &dict, &mut buf);
        assert_eq!(buf.text(), "And the");
    }
}
