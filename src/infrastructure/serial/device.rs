use crate::domain::{
    config::DeviceConfig,
    error::{CutermError, CutermResult},
};
use crate::infrastructure::serial::line::LineModeConfigurator;
use std::fs::File;
use std::io::{self, Read, Write};
use std::os::unix::io::{AsRawFd, FromRawFd, IntoRawFd, RawFd};
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use tokio::io::unix::AsyncFd;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tracing::info;

/// An open, configured serial line driven by the tokio reactor
#[derive(Debug)]
pub struct SerialLine {
    inner: AsyncFd<File>,
}

impl SerialLine {
    /// Open the line exclusively and configure it for relaying
    pub fn open(config: &DeviceConfig) -> CutermResult<Self> {
        let port = serialport::new(config.path.as_str(), config.baud_rate)
            .open_native()
            .map_err(|source| CutermError::DeviceOpen {
                path: config.path.clone(),
                source,
            })?;

        LineModeConfigurator::configure(port.as_raw_fd(), config)?;

        let file = unsafe { File::from_raw_fd(port.into_raw_fd()) };
        let line = Self::from_file(file)?;

        info!("Opened {} at {} baud", config.path, config.baud_rate);
        Ok(line)
    }

    /// Wrap an already configured descriptor
    pub fn from_file(file: File) -> CutermResult<Self> {
        set_nonblocking(file.as_raw_fd())?;
        let inner = AsyncFd::new(file)?;
        Ok(Self { inner })
    }

    /// Second handle on the same line for out-of-band control
    pub fn control(&self) -> CutermResult<LineControl> {
        let file = self.inner.get_ref().try_clone()?;
        Ok(LineControl { file })
    }
}

fn set_nonblocking(fd: RawFd) -> CutermResult<()> {
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
    if flags < 0 {
        return Err(CutermError::line("fcntl(F_GETFL)"));
    }
    if unsafe { libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) } < 0 {
        return Err(CutermError::line("fcntl(F_SETFL)"));
    }
    Ok(())
}

impl AsRawFd for SerialLine {
    fn as_raw_fd(&self) -> RawFd {
        self.inner.as_raw_fd()
    }
}

impl AsyncRead for SerialLine {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        loop {
            let mut guard = ready!(self.inner.poll_read_ready(cx))?;

            let unfilled = buf.initialize_unfilled();
            match guard.try_io(|inner| inner.get_ref().read(unfilled)) {
                Ok(Ok(len)) => {
                    buf.advance(len);
                    return Poll::Ready(Ok(()));
                }
                Ok(Err(err)) => return Poll::Ready(Err(err)),
                Err(_would_block) => continue,
            }
        }
    }
}

impl AsyncWrite for SerialLine {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        loop {
            let mut guard = ready!(self.inner.poll_write_ready(cx))?;

            match guard.try_io(|inner| inner.get_ref().write(buf)) {
                Ok(result) => return Poll::Ready(result),
                Err(_would_block) => continue,
            }
        }
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

/// Out-of-band operations on the line
#[derive(Debug)]
pub struct LineControl {
    file: File,
}

impl LineControl {
    /// Hold the line in the spacing state for the default duration
    pub fn send_break(&self) -> io::Result<()> {
        if unsafe { libc::tcsendbreak(self.file.as_raw_fd(), 0) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}
