//! G-Code interpretation
//!
//! This module provides:
//! - Line tokenizing and comment stripping
//! - Command recognition
//! - Machine state tracking
//! - Replay of a whole program into observer sinks

pub mod command;
pub mod parser;
pub mod replay;
pub mod state;

pub use command::*;
pub use parser::*;
pub use replay::*;
pub use state::*;
