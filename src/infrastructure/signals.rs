use crate::core::session::TerminationSignal;
use crate::domain::error::{CutermError, CutermResult};
use tokio::signal::unix::{signal, Signal, SignalKind};
use tracing::info;

/// Turns hang-up and terminate into a session shutdown request
pub struct SignalBridge {
    hangup: Signal,
    terminate: Signal,
}

impl SignalBridge {
    /// Register for termination signals and ignore interrupt and quit
    /// for the rest of the process
    pub fn install() -> CutermResult<Self> {
        ignore_signal(libc::SIGINT)?;
        ignore_signal(libc::SIGQUIT)?;

        let hangup = signal(SignalKind::hangup()).map_err(CutermError::Signal)?;
        let terminate = signal(SignalKind::terminate()).map_err(CutermError::Signal)?;

        Ok(Self { hangup, terminate })
    }

    /// Wait for the next termination signal
    pub async fn next_termination(&mut self) -> TerminationSignal {
        let signal = tokio::select! {
            _ = self.hangup.recv() => TerminationSignal::HangUp,
            _ = self.terminate.recv() => TerminationSignal::Terminate,
        };
        info!("Received {}", signal);
        signal
    }
}

fn ignore_signal(signum: libc::c_int) -> CutermResult<()> {
    if unsafe { libc::signal(signum, libc::SIG_IGN) } == libc::SIG_ERR {
        return Err(CutermError::Signal(std::io::Error::last_os_error()));
    }
    Ok(())
}
