//! Text buffer abstraction consumed by the input engine.
//!
//! The engine never owns the document. It reads text around the cursor,
//! replaces ranges, moves the cursor and paints highlight ranges through the
//! `Buffer` trait; a GUI shell implements it over its own text widget.
//!
//! All positions are char offsets into the whole document, not byte offsets.
//!
//! `TextBuffer` is an in-memory implementation with a selection anchor,
//! highlight list and snapshot undo, used by tests and the simulator.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Native cursor motions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Motion {
    CharLeft,
    CharRight,
    /// Start of the current or previous word.
    WordLeft,
    /// Start of the next word.
    WordRight,
    LineUp,
    LineDown,
}

/// Native editing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditCommand {
    DeleteBackward,
    DeleteForward,
    SelectAll,
    Undo,
}

/// How a highlighted word relates to the dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HighlightTag {
    /// No entry for the word's fold key.
    Missing,
    /// The text is the entry's default spelling.
    Default,
    /// The text is some other spelling.
    Alternate,
}

/// A tagged char range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    pub start: usize,
    pub end: usize,
    pub tag: HighlightTag,
}

/// Editing surface the engine works against.
pub trait Buffer {
    /// Up to `n` chars before the cursor, limited to the cursor's line.
    fn text_before_cursor(&self, n: usize) -> String;

    /// Up to `n` chars after the cursor, limited to the cursor's line.
    fn text_after_cursor(&self, n: usize) -> String;

    /// Cursor position as a char offset into the document.
    fn cursor_position(&self) -> usize;

    /// Move the cursor. With `keep_selection`, the selection is extended
    /// instead of cleared.
    fn set_cursor(&mut self, pos: usize, keep_selection: bool);

    /// Replace chars `[start, end)` with `text`.
    ///
    /// A cursor inside the range ends up after the inserted text; a cursor
    /// after the range shifts by the length difference.
    fn replace_range(&mut self, start: usize, end: usize, text: &str);

    /// Insert `text` at the cursor.
    fn insert_text(&mut self, text: &str) {
        let pos = self.cursor_position();
        self.replace_range(pos, pos, text);
    }

    /// Replace all highlight ranges; an empty slice clears them.
    fn set_highlight_ranges(&mut self, ranges: &[Highlight]);

    fn navigate(&mut self, motion: Motion);

    fn perform(&mut self, command: EditCommand);
}

const UNDO_DEPTH: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Snapshot {
    text: String,
    cursor: usize,
}

/// In-memory `Buffer`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
    cursor: usize,
    anchor: Option<usize>,
    highlights: Vec<Highlight>,
    undo: VecDeque<Snapshot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Word,
    Space,
    Punct,
}

fn classify(c: char) -> CharClass {
    if c.is_alphanumeric() || c == '_' || c == '\'' {
        CharClass::Word
    } else if c.is_whitespace() {
        CharClass::Space
    } else {
        CharClass::Punct
    }
}

impl TextBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer holding `text` with the cursor at the end.
    pub fn from_text(text: &str) -> Self {
        let cursor = text.chars().count();
        Self {
            text: text.to_string(),
            cursor,
            ..Self::default()
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Document length in chars.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Current selection as an ordered char range, if non-empty.
    pub fn selection(&self) -> Option<(usize, usize)> {
        let anchor = self.anchor?;
        if anchor == self.cursor {
            return None;
        }
        Some((anchor.min(self.cursor), anchor.max(self.cursor)))
    }

    pub fn selected_text(&self) -> String {
        match self.selection() {
            Some((start, end)) => self.slice(start, end),
            None => String::new(),
        }
    }

    /// Highlight ranges last set by the engine.
    pub fn highlights(&self) -> &[Highlight] {
        &self.highlights
    }

    /// Text covered by a highlight.
    pub fn highlighted_text(&self, highlight: &Highlight) -> String {
        self.slice(highlight.start, highlight.end)
    }

    fn byte_offset(&self, pos: usize) -> usize {
        self.text
            .char_indices()
            .nth(pos)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    fn slice(&self, start: usize, end: usize) -> String {
        self.text.chars().skip(start).take(end.saturating_sub(start)).collect()
    }

    fn line_start(&self, pos: usize) -> usize {
        let chars: Vec<char> = self.text.chars().take(pos).collect();
        chars
            .iter()
            .rposition(|&c| c == '\n')
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    fn line_end(&self, pos: usize) -> usize {
        self.text
            .chars()
            .skip(pos)
            .position(|c| c == '\n')
            .map(|i| pos + i)
            .unwrap_or_else(|| self.len())
    }

    fn snapshot(&mut self) {
        if self.undo.len() == UNDO_DEPTH {
            self.undo.pop_front();
        }
        self.undo.push_back(Snapshot {
            text: self.text.clone(),
            cursor: self.cursor,
        });
    }

    fn delete_selection(&mut self) -> bool {
        match self.selection() {
            Some((start, end)) => {
                self.replace_range(start, end, "");
                self.cursor = start;
                self.anchor = None;
                true
            }
            None => false,
        }
    }

    fn word_left(&self) -> usize {
        let chars: Vec<char> = self.text.chars().collect();
        let mut pos = self.cursor.min(chars.len());
        while pos > 0 && classify(chars[pos - 1]) == CharClass::Space {
            pos -= 1;
        }
        if pos == 0 {
            return 0;
        }
        let class = classify(chars[pos - 1]);
        while pos > 0 && classify(chars[pos - 1]) == class {
            pos -= 1;
        }
        pos
    }

    fn word_right(&self) -> usize {
        let chars: Vec<char> = self.text.chars().collect();
        let mut pos = self.cursor.min(chars.len());
        if pos < chars.len() {
            let class = classify(chars[pos]);
            if class != CharClass::Space {
                while pos < chars.len() && classify(chars[pos]) == class {
                    pos += 1;
                }
            }
        }
        while pos < chars.len() && classify(chars[pos]) == CharClass::Space {
            pos += 1;
        }
        pos
    }

    fn line_up(&self) -> usize {
        let start = self.line_start(self.cursor);
        if start == 0 {
            return self.cursor;
        }
        let column = self.cursor - start;
        let prev_start = self.line_start(start - 1);
        prev_start + column.min(start - 1 - prev_start)
    }

    fn line_down(&self) -> usize {
        let end = self.line_end(self.cursor);
        if end >= self.len() {
            return self.cursor;
        }
        let column = self.cursor - self.line_start(self.cursor);
        let next_start = end + 1;
        let next_end = self.line_end(next_start);
        next_start + column.min(next_end - next_start)
    }
}

impl Buffer for TextBuffer {
    fn text_before_cursor(&self, n: usize) -> String {
        let start = self.line_start(self.cursor).max(self.cursor.saturating_sub(n));
        self.slice(start, self.cursor)
    }

    fn text_after_cursor(&self, n: usize) -> String {
        let end = self.line_end(self.cursor).min(self.cursor.saturating_add(n));
        self.slice(self.cursor, end)
    }

    fn cursor_position(&self) -> usize {
        self.cursor
    }

    fn set_cursor(&mut self, pos: usize, keep_selection: bool) {
        let pos = pos.min(self.len());
        if keep_selection {
            if self.anchor.is_none() {
                self.anchor = Some(self.cursor);
            }
        } else {
            self.anchor = None;
        }
        self.cursor = pos;
    }

    fn replace_range(&mut self, start: usize, end: usize, text: &str) {
        let len = self.len();
        let end = end.min(len);
        let start = start.min(end);
        self.snapshot();

        let (bs, be) = (self.byte_offset(start), self.byte_offset(end));
        self.text.replace_range(bs..be, text);

        let inserted = text.chars().count();
        if self.cursor >= start && self.cursor <= end {
            self.cursor = start + inserted;
        } else if self.cursor > end {
            self.cursor = self.cursor + inserted - (end - start);
        }
        self.anchor = None;
    }

    fn insert_text(&mut self, text: &str) {
        if let Some((start, end)) = self.selection() {
            self.replace_range(start, end, text);
        } else {
            let pos = self.cursor;
            self.replace_range(pos, pos, text);
        }
    }

    fn set_highlight_ranges(&mut self, ranges: &[Highlight]) {
        self.highlights = ranges.to_vec();
    }

    fn navigate(&mut self, motion: Motion) {
        let target = match motion {
            Motion::CharLeft => self.cursor.saturating_sub(1),
            Motion::CharRight => (self.cursor + 1).min(self.len()),
            Motion::WordLeft => self.word_left(),
            Motion::WordRight => self.word_right(),
            Motion::LineUp => self.line_up(),
            Motion::LineDown => self.line_down(),
        };
        self.set_cursor(target, false);
    }

    fn perform(&mut self, command: EditCommand) {
        match command {
            EditCommand::DeleteBackward => {
                if !self.delete_selection() && self.cursor > 0 {
                    let pos = self.cursor;
                    self.replace_range(pos - 1, pos, "");
                }
            }
            EditCommand::DeleteForward => {
                if !self.delete_selection() && self.cursor < self.len() {
                    let pos = self.cursor;
                    self.replace_range(pos, pos + 1, "");
                    self.cursor = pos;
                }
            }
            EditCommand::SelectAll => {
                self.anchor = Some(0);
                self.cursor = self.len();
            }
            EditCommand::Undo => {
                if let Some(snapshot) = self.undo.pop_back() {
                    self.text = snapshot.text;
                    self.cursor = snapshot.cursor;
                    self.anchor = None;
                }
            }
        }
    }
}
