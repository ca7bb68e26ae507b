//! Locale-safe number formatting for generated G-code.
//!
//! Every line written through [`GcodeWriter`] uses `.` as the decimal
//! separator, whatever produced the text.

use std::fmt::Write;

/// Format a number the way firmware expects to read it.
///
/// Uses the shortest representation that round-trips (`4`, `10.5`), prints
/// negative zero as `0`, and maps non-finite values to `0` so `NaN` can never
/// reach a program.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() || value == 0.0 {
        return "0".to_string();
    }
    format!("{}", value)
}

/// Round `value` to `decimals` places, half away from zero.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Line buffer for a G-code program.
#[derive(Debug, Default, Clone)]
pub struct GcodeWriter {
    lines: Vec<String>,
}

impl GcodeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one line, replacing any `,` with `.`.
    pub fn line(&mut self, text: impl AsRef<str>) {
        self.lines.push(text.as_ref().replace(',', "."));
    }

    /// Append an empty separator line.
    pub fn blank(&mut self) {
        self.lines.push(String::new());
    }

    /// Append a `; ...` comment line.
    pub fn comment(&mut self, text: impl AsRef<str>) {
        let mut line = String::with_capacity(text.as_ref().len() + 2);
        let _ = write!(line, "; {}", text.as_ref());
        self.line(line);
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Join the buffered lines with `\n` (no trailing newline).
    pub fn finish(self) -> String {
        self.lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_format_number_integers_and_fractions() {
        assert_eq!(format_number(4.0), "4");
        assert_eq!(format_number(10.5), "10.5");
        assert_eq!(format_number(-1.0), "-1");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
    }

    #[test]
    fn test_format_number_never_emits_nan() {
        assert_eq!(format_number(f64::NAN), "0");
        assert_eq!(format_number(f64::INFINITY), "0");
        assert_eq!(format_number(-0.0), "0");
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(9.976, 2), 9.98);
        assert_eq!(round_to(2.0, 2), 2.0);
    }

    #[test]
    fn test_writer_replaces_commas() {
        let mut writer = GcodeWriter::new();
        writer.line("G1 X1,5 Y2");
        writer.blank();
        writer.comment("a,b");
        assert_eq!(writer.len(), 3);
        assert_eq!(writer.finish(), "G1 X1.5 Y2\n\n; a.b");
    }

    proptest! {
        #[test]
        fn prop_format_number_round_trips(value in -1.0e9f64..1.0e9) {
            let text = format_number(value);
            prop_assert!(!text.contains('e'));
            let parsed: f64 = text.parse().unwrap();
            prop_assert_eq!(parsed, value);
        }
    }
}
