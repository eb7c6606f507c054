use anyhow::{anyhow, bail, Result};
use onehand_core::{Config, Dictionary, ImeEngine, KeyEvent, TextBuffer};
use std::fmt::Write;

/// Parse a keystroke script.
///
/// Plain characters are typed as-is (space and newline become the Space and
/// Enter keys). Braces name special keys: `{enter}`, `{space}`, `{bs}`,
/// `{del}`, `{left}`, `{right}`, `{up}`, `{down}` and `{C-x}` for Ctrl+x.
/// `{{` types a literal brace.
pub fn parse_keys(script: &str) -> Result<Vec<KeyEvent>> {
    let mut keys = Vec::new();
    let mut chars = script.chars();
    while let Some(c) = chars.next() {
        let key = match c {
            ' ' => KeyEvent::Space,
            '\n' => KeyEvent::Enter,
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('{') if name.is_empty() => break,
                        Some('}') => break,
                        Some(ch) => name.push(ch),
                        None => bail!("unterminated key name {{{name}"),
                    }
                }
                if name.is_empty() {
                    KeyEvent::Char('{')
                } else {
                    named_key(&name)?
                }
            }
            c => KeyEvent::Char(c),
        };
        keys.push(key);
    }
    Ok(keys)
}

fn named_key(name: &str) -> Result<KeyEvent> {
    let key = match name {
        "enter" => KeyEvent::Enter,
        "space" => KeyEvent::Space,
        "bs" => KeyEvent::Backspace,
        "del" => KeyEvent::Delete,
        "left" => KeyEvent::Left,
        "right" => KeyEvent::Right,
        "up" => KeyEvent::Up,
        "down" => KeyEvent::Down,
        _ => {
            let ctrl = name
                .strip_prefix("C-")
                .ok_or_else(|| anyhow!("unknown key {{{name}}}"))?;
            let mut chars = ctrl.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyEvent::Ctrl(c),
                _ => bail!("unknown key {{{name}}}"),
            }
        }
    };
    Ok(key)
}

/// Type `keys` into an empty buffer and report the resulting text, mode and
/// highlight.
pub fn run(dictionary: Dictionary, config: &Config, keys: &[KeyEvent]) -> String {
    let mut engine = ImeEngine::with_config(dictionary, config.clone());
    let mut buffer = TextBuffer::new();
    for &key in keys {
        engine.process_key(key, &mut buffer);
    }

    let mut report = String::new();
    let _ = writeln!(report, "{}", buffer.text());
    let _ = writeln!(report, "-- mode: {}", engine.mode().label());
    for hl in buffer.highlights() {
        let _ = writeln!(
            report,
            "-- highlight: {:?} {:?} [{}, {})",
            hl.tag,
            buffer.highlighted_text(hl),
            hl.start,
            hl.end
        );
    }
    if !engine.context().candidates.is_empty() {
        let _ = writeln!(report, "-- candidates: {}", engine.context().candidates.join(" "));
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_named_keys() {
        let keys = parse_keys("i {C-e}{bs}{{\n").unwrap();
        assert_eq!(
            keys,
            [
                KeyEvent::Char('i'),
                KeyEvent::Space,
                KeyEvent::Ctrl('e'),
                KeyEvent::Backspace,
                KeyEvent::Char('{'),
                KeyEvent::Enter,
            ]
        );
    }

    #[test]
    fn rejects_bad_key_names() {
        assert!(parse_keys("{nope}").is_err());
        assert!(parse_keys("{C-ab}").is_err());
        assert!(parse_keys("{enter").is_err());
    }

    #[test]
    fn replays_insert_and_wordcheck() {
        let dict = Dictionary::from_words(&["the", "and", "e"]);
        let config = Config {
            autocaps: false,
            ..Config::default()
        };

        let report = run(dict.clone(), &config, &parse_keys("thi ;nd ").unwrap());
        assert!(report.starts_with("the and \n-- mode: Insert\n"));

        let report = run(dict, &config, &parse_keys("thi{C-e}").unwrap());
        assert!(report.starts_with("thi\n-- mode: WordCheck\n"));
        assert!(report.contains("-- highlight: Alternate \"thi\" [0, 3)"));
        assert!(report.contains("-- candidates: the The"));
    }
}
