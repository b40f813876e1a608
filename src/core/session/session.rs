use crate::core::endpoint::RecordingSink;
use crate::core::escape::EscapeStateMachine;
use crate::core::session::state::{SessionEnd, SessionStatistics, SessionStatus};
use crate::domain::{config::DeviceConfig, error::CutermResult};
use crate::infrastructure::terminal::{TerminalDevice, TerminalModeManager};
use tracing::{debug, info, warn};

/// State owned by one relay session.
///
/// Holds the terminal mode snapshot, the optional recording sink and the
/// escape classifier. Only the relay task touches it.
pub struct Session<T: TerminalDevice> {
    config: DeviceConfig,
    terminal: TerminalModeManager<T>,
    escape: EscapeStateMachine,
    recording: Option<Box<dyn RecordingSink>>,
    status: SessionStatus,
    statistics: SessionStatistics,
}

impl<T: TerminalDevice> Session<T> {
    /// Capture the terminal's mode. Raw mode is not applied until
    /// [`Session::connect`].
    pub fn new(config: DeviceConfig, terminal: T) -> CutermResult<Self> {
        let mut terminal = TerminalModeManager::new(terminal);
        terminal.capture()?;
        let escape = EscapeStateMachine::new(terminal.is_interactive());

        Ok(Self {
            config,
            terminal,
            escape,
            recording: None,
            status: SessionStatus::Initializing,
            statistics: SessionStatistics::default(),
        })
    }

    pub fn with_recording(mut self, sink: Box<dyn RecordingSink>) -> Self {
        self.recording = Some(sink);
        self
    }

    /// Put the terminal in raw mode and start relaying
    pub fn connect(&mut self) -> CutermResult<()> {
        self.terminal.apply_raw()?;
        self.status = SessionStatus::Connected;
        info!(
            "Session connected to {} at {} baud",
            self.config.path, self.config.baud_rate
        );
        Ok(())
    }

    /// Tear the session down: restore the terminal and flush the
    /// recording. Later calls do nothing.
    pub fn close(&mut self, end: Option<&SessionEnd>) {
        if self.status == SessionStatus::Closed {
            return;
        }
        self.status = SessionStatus::Terminating;
        if let Some(end) = end {
            info!("Session terminating: {}", end);
        }

        // Restore errors are already logged; nothing else can be done.
        let _ = self.terminal.restore();

        if let Some(mut sink) = self.recording.take() {
            if let Err(e) = sink.flush() {
                warn!("Failed to flush recording: {}", e);
            }
        }

        self.status = SessionStatus::Closed;
        info!("Session closed: {:?}", self.statistics);
    }

    /// Copy bytes from the line into the recording sink, if any. A
    /// failing sink is reported and the session carries on.
    pub fn record(&mut self, bytes: &[u8]) {
        let Some(sink) = self.recording.as_mut() else {
            return;
        };

        match sink.append(bytes) {
            Ok(()) => self.statistics.bytes_recorded += bytes.len() as u64,
            Err(e) => {
                self.statistics.recording_errors += 1;
                warn!("Recording error: {}", e);
            }
        }
    }

    pub fn escape_mut(&mut self) -> &mut EscapeStateMachine {
        &mut self.escape
    }

    pub fn escape(&self) -> &EscapeStateMachine {
        &self.escape
    }

    pub fn local_echo(&self) -> bool {
        self.config.local_echo
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn statistics(&self) -> &SessionStatistics {
        &self.statistics
    }

    pub fn statistics_mut(&mut self) -> &mut SessionStatistics {
        &mut self.statistics
    }

    pub fn is_interactive(&self) -> bool {
        self.terminal.is_interactive()
    }

    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }
}

impl<T: TerminalDevice> Drop for Session<T> {
    fn drop(&mut self) {
        if self.status != SessionStatus::Closed {
            debug!("Session dropped while {}, restoring terminal", self.status);
            self.close(None);
        }
    }
}
