//! The relay loop between the local terminal and the serial line.
//!
//! One task waits on local input, the line and the shutdown future, and
//! handles whichever is ready first to completion before waiting again.

use crate::core::command::{CommandAction, CommandContext, CommandHandler};
use crate::core::endpoint::{DuplexEndpoint, ReadableEndpoint, WritableEndpoint};
use crate::core::escape::{expand_outbound, Classification, CR, LF};
use crate::core::session::{Session, SessionEnd, TerminationSignal};
use crate::domain::error::{CutermError, CutermResult};
use crate::infrastructure::terminal::TerminalDevice;
use std::future::Future;
use std::io;
use tokio::io::{AsyncReadExt, AsyncWriteExt, ReadHalf, WriteHalf};
use tracing::{debug, info, trace, warn};

const BUFFER_SIZE: usize = 4096;

pub struct IoBridge<I, O, D> {
    local_in: I,
    local_out: O,
    device_rx: ReadHalf<D>,
    device_tx: WriteHalf<D>,
}

impl<I, O, D> IoBridge<I, O, D>
where
    I: ReadableEndpoint,
    O: WritableEndpoint,
    D: DuplexEndpoint,
{
    pub fn new(local_in: I, local_out: O, device: D) -> Self {
        let (device_rx, device_tx) = tokio::io::split(device);
        Self {
            local_in,
            local_out,
            device_rx,
            device_tx,
        }
    }

    /// Relay until an endpoint closes or fails, a command disconnects, or
    /// `shutdown` resolves. Only a failure to write local output is an
    /// error; everything else is a normal end of session.
    pub async fn run<T, S>(
        &mut self,
        session: &mut Session<T>,
        handler: &mut dyn CommandHandler,
        shutdown: S,
    ) -> CutermResult<SessionEnd>
    where
        T: TerminalDevice,
        S: Future<Output = TerminationSignal>,
    {
        tokio::pin!(shutdown);
        let mut local_buf = [0u8; BUFFER_SIZE];
        let mut device_buf = [0u8; BUFFER_SIZE];

        loop {
            let end = tokio::select! {
                biased;

                signal = &mut shutdown => Some(SessionEnd::Signal(signal)),

                read = self.local_in.read(&mut local_buf) => match read {
                    Ok(0) => Some(SessionEnd::LocalClosed),
                    Ok(n) => self.relay_local(&local_buf[..n], session, handler).await?,
                    Err(e) => Some(SessionEnd::LocalError(e)),
                },

                read = self.device_rx.read(&mut device_buf) => match read {
                    Ok(0) => Some(SessionEnd::DeviceClosed),
                    Ok(n) => {
                        self.relay_device(&device_buf[..n], session).await?;
                        None
                    }
                    Err(e) => Some(SessionEnd::DeviceError(e)),
                },
            };

            if let Some(end) = end {
                info!("Relay stopping: {}", end);
                return Ok(end);
            }
        }
    }

    /// Classify keystrokes and act on them in order
    async fn relay_local<T: TerminalDevice>(
        &mut self,
        bytes: &[u8],
        session: &mut Session<T>,
        handler: &mut dyn CommandHandler,
    ) -> CutermResult<Option<SessionEnd>> {
        let mut outbound = Vec::with_capacity(bytes.len() * 2);

        for &byte in bytes {
            match session.escape_mut().classify(byte) {
                Classification::Forward => expand_outbound(byte, &mut outbound),
                Classification::EscapeTrigger => {
                    // Anything typed before the escape goes out first.
                    if let Some(end) = self.forward(&mut outbound, session).await? {
                        return Ok(Some(end));
                    }
                    self.write_local(b"~").await?;
                }
                Classification::CommandByte(selector) => {
                    self.write_local(&[selector, CR, LF]).await?;
                    if let Some(end) = self.dispatch(selector, session, handler).await {
                        return Ok(Some(end));
                    }
                }
            }
        }

        self.forward(&mut outbound, session).await
    }

    /// Write pending keystrokes to the line, echoing them if asked to
    async fn forward<T: TerminalDevice>(
        &mut self,
        outbound: &mut Vec<u8>,
        session: &mut Session<T>,
    ) -> CutermResult<Option<SessionEnd>> {
        if outbound.is_empty() {
            return Ok(None);
        }

        if session.local_echo() {
            if let Err(e) = write_flush(&mut self.local_out, outbound.as_slice()).await {
                debug!("Local echo failed: {}", e);
            }
        }

        trace!("tx {}", hex::encode(&outbound[..]));
        let result = write_flush(&mut self.device_tx, outbound.as_slice()).await;
        let sent = outbound.len() as u64;
        outbound.clear();

        match result {
            Ok(()) => {
                session.statistics_mut().bytes_sent += sent;
                Ok(None)
            }
            Err(e) => Ok(Some(SessionEnd::DeviceError(e))),
        }
    }

    /// Run one escape command. The escape state has already moved on,
    /// so a failing command cannot leave the classifier stuck.
    async fn dispatch<T: TerminalDevice>(
        &mut self,
        selector: u8,
        session: &mut Session<T>,
        handler: &mut dyn CommandHandler,
    ) -> Option<SessionEnd> {
        session.statistics_mut().commands_dispatched += 1;

        let mut ctx = CommandContext {
            local_out: &mut self.local_out,
            device: &mut self.device_tx,
        };

        match handler.handle(selector, &mut ctx).await {
            Ok(CommandAction::Continue) => None,
            Ok(CommandAction::Disconnect) => Some(SessionEnd::Disconnected),
            Err(e) => {
                session.statistics_mut().command_errors += 1;
                warn!(
                    "{}",
                    CutermError::CommandDispatch(format!("~{}: {}", selector as char, e))
                );
                None
            }
        }
    }

    /// Show line output, recording it first
    async fn relay_device<T: TerminalDevice>(
        &mut self,
        bytes: &[u8],
        session: &mut Session<T>,
    ) -> CutermResult<()> {
        trace!("rx {}", hex::encode(bytes));
        session.statistics_mut().bytes_received += bytes.len() as u64;
        session.record(bytes);
        self.write_local(bytes).await
    }

    async fn write_local(&mut self, bytes: &[u8]) -> CutermResult<()> {
        write_flush(&mut self.local_out, bytes)
            .await
            .map_err(CutermError::LocalOutput)
    }

    /// Hand the endpoints back, e.g. to inspect in-memory ones
    pub fn into_parts(self) -> (I, O, D) {
        let device = self.device_rx.unsplit(self.device_tx);
        (self.local_in, self.local_out, device)
    }
}

async fn write_flush<W: WritableEndpoint + ?Sized>(writer: &mut W, bytes: &[u8]) -> io::Result<()> {
    writer.write_all(bytes).await?;
    writer.flush().await
}
