//! Recognized G-code commands

use serde::{Deserialize, Serialize};

/// Commands the interpreter acts on. Everything else is [`Command::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// G90
    AbsolutePositioning,
    /// G91
    RelativePositioning,
    /// M82
    AbsoluteExtrusion,
    /// M83
    RelativeExtrusion,
    /// G92
    SetPosition,
    /// G0 (rapid) or G1; both are interpreted identically
    LinearMove { rapid: bool },
    /// M117
    StatusMessage,
    /// Temperature, fan, dwell and anything unrecognized
    Other(String),
}

impl Command {
    /// Recognize an uppercase mnemonic. Leading zeros are ignored (`G01` is `G1`).
    pub fn from_mnemonic(mnemonic: &str) -> Self {
        let mut chars = mnemonic.chars();
        let letter = chars.next();
        let number = chars.as_str().parse::<u32>().ok();

        match (letter, number) {
            (Some('G'), Some(0)) => Self::LinearMove { rapid: true },
            (Some('G'), Some(1)) => Self::LinearMove { rapid: false },
            (Some('G'), Some(90)) => Self::AbsolutePositioning,
            (Some('G'), Some(91)) => Self::RelativePositioning,
            (Some('G'), Some(92)) => Self::SetPosition,
            (Some('M'), Some(82)) => Self::AbsoluteExtrusion,
            (Some('M'), Some(83)) => Self::RelativeExtrusion,
            (Some('M'), Some(117)) => Self::StatusMessage,
            _ => Self::Other(mnemonic.to_string()),
        }
    }

    pub fn is_motion(&self) -> bool {
        matches!(self, Self::LinearMove { .. })
    }
}

/// A parameter word such as `X10.5`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub letter: char,
    pub value: f64,
}

impl Word {
    pub fn new(letter: char, value: f64) -> Self {
        Self { letter, value }
    }
}
