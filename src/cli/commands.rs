use crate::cli::args::Args;
use crate::cli::output::{connected_notice, write_notice, ConsoleWriter, OutputWriter, PortRow};
use crate::core::bridge::IoBridge;
use crate::core::command::{CommandAction, CommandContext, CommandHandler};
use crate::core::escape::ESCAPE_CHAR;
use crate::core::session::Session;
use crate::domain::config::{CutermConfig, DeviceConfig};
use crate::domain::error::{CutermError, CutermResult};
use crate::infrastructure::config::ConfigManager;
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::path::{expand_tilde, resolve_device_path};
use crate::infrastructure::serial::{LineControl, SerialLine};
use crate::infrastructure::signals::SignalBridge;
use crate::infrastructure::terminal::FdTerminal;
use async_trait::async_trait;
use std::fs::OpenOptions;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::{debug, info};

const HELP: &str = "\
~.  drop connection and exit\r\n\
~#  send break\r\n\
~~  send a literal ~\r\n\
~?  get this summary\r\n";

/// Execute CLI command
pub async fn execute_command(args: Args) -> CutermResult<()> {
    let writer = ConsoleWriter::new(args.output);

    let config_manager = match &args.config {
        Some(path) => ConfigManager::with_path(expand_tilde(path)),
        None => ConfigManager::new()?,
    };

    if args.init_config {
        let path = config_manager.init_config()?;
        writer.write_message(&format!("Configuration initialized at '{}'", path.display()))?;
        return Ok(());
    }

    let config = effective_config(&args, config_manager.load_config()?);

    let log_file = args
        .log_file
        .as_deref()
        .or(config.global.log_file.as_deref())
        .map(|path| PathBuf::from(expand_tilde(path)));
    init_logging(&config.global.log_level, args.verbose, log_file.as_deref())?;
    debug!("Using configuration {}", config_manager.config_path().display());

    if args.list {
        return list_ports(&writer);
    }

    if args.show_config {
        writer.write_config(&config)?;
        return Ok(());
    }

    let device = DeviceConfig::from(&config.line);
    let record = config
        .line
        .record_file
        .as_deref()
        .map(|path| PathBuf::from(expand_tilde(path)));

    run_session(device, record).await
}

/// Fold command line options over the loaded file
fn effective_config(args: &Args, mut config: CutermConfig) -> CutermConfig {
    if let Some(line) = &args.line {
        config.line.device = line.clone();
    }
    config.line.device = resolve_device_path(&config.line.device);

    if let Some(speed) = args.speed {
        config.line.baud_rate = speed;
    }
    if args.half_duplex {
        config.line.local_echo = true;
    }
    if let Some(record) = &args.record {
        config.line.record_file = Some(record.clone());
    }
    config
}

fn list_ports(writer: &ConsoleWriter) -> CutermResult<()> {
    let ports = serialport::available_ports().map_err(|e| CutermError::Config {
        message: format!("Failed to enumerate serial ports: {}", e),
    })?;
    let rows: Vec<PortRow> = ports.iter().map(PortRow::from).collect();
    writer.write_ports(&rows)?;
    Ok(())
}

/// Open the line, take over the terminal and relay until the session ends.
async fn run_session(device: DeviceConfig, record: Option<PathBuf>) -> CutermResult<()> {
    let line = SerialLine::open(&device)?;
    let control = line.control()?;

    let mut session = Session::new(device.clone(), FdTerminal::stdin())?;
    if let Some(path) = record {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(CutermError::Recording)?;
        info!("Recording line output to {}", path.display());
        session = session.with_recording(Box::new(BufWriter::new(file)));
    }

    let mut signals = SignalBridge::install()?;
    session.connect()?;
    write_notice(&connected_notice(device.baud_rate)).map_err(CutermError::LocalOutput)?;

    let mut bridge = IoBridge::new(tokio::io::stdin(), tokio::io::stdout(), line);
    let mut commands = BasicCommands::new(Some(control));

    match bridge
        .run(&mut session, &mut commands, signals.next_termination())
        .await
    {
        Ok(end) => {
            session.close(Some(&end));
            write_notice(&end.notice()).map_err(CutermError::LocalOutput)?;
            Ok(())
        }
        Err(e) => {
            session.close(None);
            Err(e)
        }
    }
}

/// Escape commands available in the binary
pub struct BasicCommands {
    line: Option<LineControl>,
}

impl BasicCommands {
    /// Without a line handle `~#` reports that break is unavailable
    pub fn new(line: Option<LineControl>) -> Self {
        Self { line }
    }
}

#[async_trait]
impl CommandHandler for BasicCommands {
    async fn handle(
        &mut self,
        selector: u8,
        ctx: &mut CommandContext<'_>,
    ) -> CutermResult<CommandAction> {
        match selector {
            b'.' => return Ok(CommandAction::Disconnect),
            b'#' => match &self.line {
                Some(line) => {
                    line.send_break().map_err(|e| {
                        CutermError::CommandDispatch(format!("tcsendbreak: {}", e))
                    })?;
                    debug!("Break sent");
                }
                None => ctx.write_local(b"Break is not available\r\n").await?,
            },
            ESCAPE_CHAR => ctx.write_device(&[ESCAPE_CHAR]).await?,
            b'?' => ctx.write_local(HELP.as_bytes()).await?,
            other => {
                let note = format!(
                    "Unknown command {}; ~? for help\r\n",
                    std::ascii::escape_default(other)
                );
                ctx.write_local(note.as_bytes()).await?;
            }
        }
        Ok(CommandAction::Continue)
    }
}
