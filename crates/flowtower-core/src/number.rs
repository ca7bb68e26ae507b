//! Lenient number parsing.
//!
//! Settings arrive from files, command-line flags and hand-edited programs, so
//! parsing takes the longest leading numeric prefix and never fails loudly.

use regex::Regex;
use std::sync::OnceLock;

fn number_prefix_regex() -> &'static Regex {
    static NUMBER_PREFIX: OnceLock<Regex> = OnceLock::new();
    NUMBER_PREFIX.get_or_init(|| {
        Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?")
            .expect("invalid regex pattern")
    })
}

/// Parse the longest leading decimal number in `text`.
///
/// Leading whitespace is ignored. Returns `None` when no digits are found or
/// the value is not finite.
pub fn parse_number_prefix(text: &str) -> Option<f64> {
    let trimmed = text.trim_start();
    let found = number_prefix_regex().find(trimmed)?;
    found
        .as_str()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Parse a user supplied value, accepting `,` as the decimal separator.
pub fn parse_lenient(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    parse_number_prefix(&trimmed.replace(',', "."))
}
