//! Local terminal mode handling.
//!
//! The mode captured at startup is the only one ever put back; raw mode is
//! derived from it rather than built from scratch.

use crate::domain::error::{CutermError, CutermResult};
use std::io;
use std::os::unix::io::RawFd;
use tracing::{debug, warn};

pub type Termios = libc::termios;

/// Value that switches a special control character off
#[cfg(any(target_os = "linux", target_os = "android"))]
pub const VDISABLE: libc::cc_t = 0;
#[cfg(not(any(target_os = "linux", target_os = "android")))]
pub const VDISABLE: libc::cc_t = 0xff;

/// Mode access for one terminal descriptor
pub trait TerminalDevice {
    fn is_terminal(&self) -> bool;

    fn get_mode(&self) -> io::Result<Termios>;

    /// Apply `mode`, discarding unread input first
    fn set_mode(&self, mode: &Termios) -> io::Result<()>;
}

/// A terminal reached through a raw descriptor, usually stdin
#[derive(Debug, Clone, Copy)]
pub struct FdTerminal {
    fd: RawFd,
}

impl FdTerminal {
    pub fn new(fd: RawFd) -> Self {
        Self { fd }
    }

    pub fn stdin() -> Self {
        Self::new(libc::STDIN_FILENO)
    }
}

impl TerminalDevice for FdTerminal {
    fn is_terminal(&self) -> bool {
        unsafe { libc::isatty(self.fd) == 1 }
    }

    fn get_mode(&self) -> io::Result<Termios> {
        let mut mode = std::mem::MaybeUninit::<Termios>::uninit();
        if unsafe { libc::tcgetattr(self.fd, mode.as_mut_ptr()) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(unsafe { mode.assume_init() })
    }

    fn set_mode(&self, mode: &Termios) -> io::Result<()> {
        if unsafe { libc::tcsetattr(self.fd, libc::TCSAFLUSH, mode) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

/// Derive the relay's working mode from the saved one
pub fn raw_mode(saved: &Termios) -> Termios {
    let mut mode = *saved;

    mode.c_lflag &= !(libc::ICANON | libc::IEXTEN | libc::ECHO);
    mode.c_iflag &= !(libc::INPCK | libc::ICRNL);
    mode.c_iflag &= !libc::IXON;
    mode.c_oflag &= !libc::OPOST;

    mode.c_cc[libc::VMIN] = 1;
    mode.c_cc[libc::VTIME] = 0;

    // Let these through as data instead of signals or line editing.
    mode.c_cc[libc::VDISCARD] = VDISABLE;
    #[cfg(any(
        target_os = "macos",
        target_os = "ios",
        target_os = "freebsd",
        target_os = "openbsd",
        target_os = "netbsd",
        target_os = "dragonfly"
    ))]
    {
        mode.c_cc[libc::VDSUSP] = VDISABLE;
    }
    mode.c_cc[libc::VINTR] = VDISABLE;
    mode.c_cc[libc::VLNEXT] = VDISABLE;
    mode.c_cc[libc::VQUIT] = VDISABLE;
    mode.c_cc[libc::VSUSP] = VDISABLE;

    mode
}

/// Saves, switches and restores the local terminal mode
pub struct TerminalModeManager<T: TerminalDevice> {
    device: T,
    saved: Option<Termios>,
}

impl<T: TerminalDevice> TerminalModeManager<T> {
    pub fn new(device: T) -> Self {
        Self {
            device,
            saved: None,
        }
    }

    /// Remember the current mode. Does nothing when input is not a
    /// terminal, and never replaces a mode that was already captured.
    pub fn capture(&mut self) -> CutermResult<()> {
        if self.saved.is_some() {
            return Ok(());
        }
        if !self.device.is_terminal() {
            debug!("Local input is not a terminal, leaving its mode alone");
            return Ok(());
        }

        let mode = self
            .device
            .get_mode()
            .map_err(|source| CutermError::TerminalConfig {
                operation: "tcgetattr",
                source,
            })?;
        self.saved = Some(mode);
        Ok(())
    }

    /// Switch to raw mode
    pub fn apply_raw(&self) -> CutermResult<()> {
        let Some(saved) = &self.saved else {
            return Ok(());
        };

        self.device
            .set_mode(&raw_mode(saved))
            .map_err(|source| CutermError::TerminalConfig {
                operation: "tcsetattr",
                source,
            })
    }

    /// Put the captured mode back. Safe to call any number of times.
    pub fn restore(&self) -> CutermResult<()> {
        let Some(saved) = &self.saved else {
            return Ok(());
        };

        self.device.set_mode(saved).map_err(|source| {
            warn!("Failed to restore terminal mode: {}", source);
            CutermError::TerminalConfig {
                operation: "tcsetattr",
                source,
            }
        })
    }

    /// Whether local input is an interactive terminal
    pub fn is_interactive(&self) -> bool {
        self.saved.is_some()
    }

    pub fn saved_mode(&self) -> Option<&Termios> {
        self.saved.as_ref()
    }

    pub fn device(&self) -> &T {
        &self.device
    }
}
