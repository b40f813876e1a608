// Core module - Relay logic independent of real devices
pub mod bridge;
pub mod command;
pub mod endpoint;
pub mod escape;
pub mod session;

pub use bridge::IoBridge;
pub use command::{CommandAction, CommandContext, CommandHandler};
pub use escape::{Classification, EscapeState, EscapeStateMachine};
