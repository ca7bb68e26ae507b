//! G-Code line tokenizer

use super::{Command, Word};
use flowtower_core::parse_number_prefix;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::OnceLock;

/// One non-blank program line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedLine {
    pub command: Command,
    /// Uppercased first token
    pub mnemonic: String,
    pub words: Vec<Word>,
    /// Status text for `M117`, taken from the raw line so it keeps any `;`
    pub message: Option<String>,
}

impl ParsedLine {
    /// Value of the last word with this letter.
    pub fn value(&self, letter: char) -> Option<f64> {
        self.words
            .iter()
            .rev()
            .find(|word| word.letter == letter)
            .map(|word| word.value)
    }
}

/// Drop everything from the first `;` to the end of the line.
pub fn strip_comment(line: &str) -> Cow<'_, str> {
    static COMMENT_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = COMMENT_REGEX.get_or_init(|| Regex::new(r";.*").expect("invalid regex pattern"));
    regex.replace(line, "")
}

fn parse_word(token: &str) -> Option<Word> {
    let mut chars = token.chars();
    let letter = chars.next()?.to_ascii_uppercase();
    let value = parse_number_prefix(chars.as_str()).unwrap_or(0.0);
    Some(Word::new(letter, value))
}

fn status_message(raw: &str) -> String {
    raw.split_whitespace().skip(1).collect::<Vec<_>>().join(" ")
}

/// Tokenize a raw line. Blank and comment-only lines give `None`.
///
/// Parameter values that do not parse are read as `0`.
pub fn parse_line(raw: &str) -> Option<ParsedLine> {
    let stripped = strip_comment(raw);
    let mut tokens = stripped.split_whitespace();
    let mnemonic = tokens.next()?.to_uppercase();
    let command = Command::from_mnemonic(&mnemonic);
    let words = tokens.filter_map(parse_word).collect();
    let message = (command == Command::StatusMessage).then(|| status_message(raw));

    Some(ParsedLine {
        command,
        mnemonic,
        words,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_comment() {
        assert_eq!(strip_comment("G1 X1 ; move"), "G1 X1 ");
        assert_eq!(strip_comment("; only a comment"), "");
        assert_eq!(strip_comment("G28"), "G28");
    }

    #[test]
    fn test_blank_lines() {
        assert!(parse_line("").is_none());
        assert!(parse_line("   \t ").is_none());
        assert!(parse_line(";####### Settings").is_none());
    }

    #[test]
    fn test_parse_move() {
        let line = parse_line("g1 x10.5 Y-3 e0.25 F1800 ; comment").unwrap();
        assert_eq!(line.mnemonic, "G1");
        assert_eq!(line.command, Command::LinearMove { rapid: false });
        assert_eq!(line.value('X'), Some(10.5));
        assert_eq!(line.value('Y'), Some(-3.0));
        assert_eq!(line.value('E'), Some(0.25));
        assert_eq!(line.value('Z'), None);
    }

    #[test]
    fn test_unparseable_values_are_zero() {
        let line = parse_line("G0 Xabc Y").unwrap();
        assert_eq!(line.value('X'), Some(0.0));
        assert_eq!(line.value('Y'), Some(0.0));
    }

    #[test]
    fn test_last_word_wins() {
        let line = parse_line("G0 X1 X2").unwrap();
        assert_eq!(line.value('X'), Some(2.0));
    }

    #[test]
    fn test_status_message_keeps_semicolon() {
        let line = parse_line("M117 200°C // 8mm3/s; F24.95mm/min").unwrap();
        assert_eq!(line.command, Command::StatusMessage);
        assert_eq!(
            line.message.as_deref(),
            Some("200°C // 8mm3/s; F24.95mm/min")
        );
    }

    #[test]
    fn test_message_only_for_m117() {
        assert!(parse_line("M104 S200").unwrap().message.is_none());
    }
}
