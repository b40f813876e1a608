//! cuterm Library
//!
//! Connects the local terminal to a serial line: keystrokes go to the
//! line, line output comes back to the terminal, and `~` escapes at the
//! start of a line run local commands.

pub mod cli;
pub mod core;
pub mod domain;
pub mod infrastructure;

pub use crate::core::bridge::IoBridge;
pub use crate::core::command::{CommandAction, CommandContext, CommandHandler};
pub use crate::core::session::{Session, SessionEnd, SessionStatistics, TerminationSignal};
pub use crate::domain::config::{CutermConfig, DeviceConfig};
pub use crate::domain::error::{CutermError, CutermResult};
