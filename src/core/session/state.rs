use std::fmt;
use std::io;

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Modes configured, not relaying yet
    Initializing,
    /// Relaying between terminal and line
    Connected,
    /// Shutting down, terminal mode being restored
    Terminating,
    /// Terminal restored and handles released
    Closed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Initializing => write!(f, "Initializing"),
            SessionStatus::Connected => write!(f, "Connected"),
            SessionStatus::Terminating => write!(f, "Terminating"),
            SessionStatus::Closed => write!(f, "Closed"),
        }
    }
}

/// Process signals that end a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationSignal {
    HangUp,
    Terminate,
}

impl TerminationSignal {
    pub fn name(&self) -> &'static str {
        match self {
            TerminationSignal::HangUp => "SIGHUP",
            TerminationSignal::Terminate => "SIGTERM",
        }
    }
}

impl fmt::Display for TerminationSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why the relay stopped
#[derive(Debug)]
pub enum SessionEnd {
    /// Local input reached end of file
    LocalClosed,
    /// Reading local input failed
    LocalError(io::Error),
    /// The line reported end of file (hang-up)
    DeviceClosed,
    /// Reading from or writing to the line failed
    DeviceError(io::Error),
    /// A command asked to disconnect
    Disconnected,
    Signal(TerminationSignal),
}

impl SessionEnd {
    /// Notice printed once the terminal is back in its original mode
    pub fn notice(&self) -> String {
        match self {
            SessionEnd::Signal(signal) => format!("\r\n[{}]\n", signal),
            _ => "\r\n[EOT]\n".to_string(),
        }
    }

    pub fn is_signal(&self) -> bool {
        matches!(self, SessionEnd::Signal(_))
    }
}

impl fmt::Display for SessionEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionEnd::LocalClosed => write!(f, "local input closed"),
            SessionEnd::LocalError(e) => write!(f, "local input error: {}", e),
            SessionEnd::DeviceClosed => write!(f, "line closed"),
            SessionEnd::DeviceError(e) => write!(f, "line error: {}", e),
            SessionEnd::Disconnected => write!(f, "disconnected by command"),
            SessionEnd::Signal(signal) => write!(f, "received {}", signal),
        }
    }
}

/// Session statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStatistics {
    /// Bytes written to the line, after CR LF expansion
    pub bytes_sent: u64,
    /// Bytes read from the line
    pub bytes_received: u64,
    /// Bytes appended to the recording sink
    pub bytes_recorded: u64,
    pub recording_errors: u64,
    pub commands_dispatched: u64,
    pub command_errors: u64,
}
