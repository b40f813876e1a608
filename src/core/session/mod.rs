// Session module - Relay session state
pub mod session;
pub mod state;

pub use session::Session;
pub use state::{SessionEnd, SessionStatistics, SessionStatus, TerminationSignal};
