//! Physical-key folding for mirrored one-handed typing.
//!
//! Every key on the typing hand stands in for itself and for its mirror on the
//! other half of the keyboard (q/p, a/;, z/., ...). Folding maps a character to
//! the canonical representative of its key, so two words that are typed with
//! the same physical keys share the same fold key.
//!
//! The table below folds case and shifted symbols in a single step. It is the
//! only canonicalization used anywhere in the crate: building, lookup, and
//! re-keying of persisted dictionaries all go through `fold_word`.

/// Canonical key sequence of a word (see `fold_word`).
pub type FoldKey = String;

/// Map a character to the canonical member of its physical-key class.
///
/// Characters without a mirrored key (digits, apostrophe, hyphen, non-ASCII)
/// fold to themselves.
pub fn fold_char(c: char) -> char {
    match c {
        'q' | 'p' | 'Q' | 'P' => 'q',
        'w' | 'o' | 'W' | 'O' => 'w',
        'e' | 'i' | 'E' | 'I' => 'e',
        'r' | 'u' | 'R' | 'U' => 'r',
        't' | 'y' | 'T' | 'Y' => 't',

        'a' | ';' | 'A' | ':' => 'a',
        's' | 'l' | 'S' | 'L' => 's',
        'd' | 'k' | 'D' | 'K' => 'd',
        'f' | 'j' | 'F' | 'J' => 'f',
        'g' | 'h' | 'G' | 'H' => 'g',

        'z' | '.' | 'Z' | '>' => 'z',
        'x' | ',' | 'X' | '<' => 'x',
        'c' | 'm' | 'C' | 'M' => 'c',
        'v' | 'n' | 'V' | 'N' => 'v',
        'b' | 'B' => 'b',

        other => other,
    }
}

/// Fold every character of `word`.
///
/// ```
/// use onehand_core::fold::fold_word;
/// assert_eq!(fold_word("the"), fold_word("thi"));
/// assert_eq!(fold_word(":<>"), "axz");
/// ```
pub fn fold_word(word: &str) -> FoldKey {
    word.chars().map(fold_char).collect()
}

/// Left-hand letter to the punctuation on its mirrored key.
///
/// `a z x` become `; . ,` and their capitals become `: > <`.
pub fn symbol_for_letter(c: char) -> char {
    match c {
        'a' => ';',
        'z' => '.',
        'x' => ',',
        'A' => ':',
        'Z' => '>',
        'X' => '<',
        other => other,
    }
}

/// Shifted punctuation back to its unshifted form (`:` → `;`, `>` → `.`, `<` → `,`).
pub fn lower_symbol(c: char) -> char {
    match c {
        ':' => ';',
        '>' => '.',
        '<' => ',',
        other => other,
    }
}

/// True for uppercase letters and for the shifted symbols that share a key with
/// `a`, `z` and `x`, which is how a capital is typed with the other hand.
pub fn is_capital(c: char) -> bool {
    c.is_uppercase() || matches!(c, ':' | '<' | '>')
}

/// Python-style "is lowercase": at least one cased character, and none uppercase.
pub fn is_all_lowercase(word: &str) -> bool {
    let mut has_cased = false;
    for c in word.chars() {
        if c.is_uppercase() {
            return false;
        }
        if c.is_lowercase() {
            has_cased = true;
        }
    }
    has_cased
}

/// Upper-case the first character, leaving the rest untouched.
pub fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lower-case the first character, leaving the rest untouched.
pub fn uncapitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
