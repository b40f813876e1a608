use crate::core::endpoint::WritableEndpoint;
use crate::domain::error::CutermResult;
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

/// What the relay should do once a command returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandAction {
    Continue,
    /// End the session as if the line had closed
    Disconnect,
}

/// Writers a command may use while it runs
pub struct CommandContext<'a> {
    pub local_out: &'a mut dyn WritableEndpoint,
    pub device: &'a mut dyn WritableEndpoint,
}

impl CommandContext<'_> {
    /// Print to the local terminal. The terminal is raw, so callers end
    /// lines with CR LF.
    pub async fn write_local(&mut self, bytes: &[u8]) -> CutermResult<()> {
        self.local_out.write_all(bytes).await?;
        self.local_out.flush().await?;
        Ok(())
    }

    pub async fn write_device(&mut self, bytes: &[u8]) -> CutermResult<()> {
        self.device.write_all(bytes).await?;
        self.device.flush().await?;
        Ok(())
    }
}

/// Runs the command selected by the byte after `~`.
///
/// Must not read from local input.
#[async_trait]
pub trait CommandHandler: Send {
    async fn handle(
        &mut self,
        selector: u8,
        ctx: &mut CommandContext<'_>,
    ) -> CutermResult<CommandAction>;
}

/// Handler with no commands at all; every selector is ignored
#[derive(Debug, Default)]
pub struct NoCommands;

#[async_trait]
impl CommandHandler for NoCommands {
    async fn handle(
        &mut self,
        _selector: u8,
        _ctx: &mut CommandContext<'_>,
    ) -> CutermResult<CommandAction> {
        Ok(CommandAction::Continue)
    }
}
