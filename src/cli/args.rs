use clap::{ArgAction, Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;

/// Command line arguments for cuterm
#[derive(Parser, Debug)]
#[command(
    name = "cuterm",
    version = env!("CARGO_PKG_VERSION"),
    about = "Connect the terminal to a serial line",
    long_about = "Relays keystrokes to a serial line and line output back to the terminal. \
                  Type ~. at the start of a line to disconnect, ~? for other escapes.",
    disable_help_flag = true
)]
pub struct Args {
    /// Serial line to use; a bare name is looked up under /dev
    #[arg(short = 'l', long = "line", value_name = "LINE")]
    pub line: Option<String>,

    /// Line speed (also accepted as -<speed>)
    #[arg(short = 's', long = "speed", value_name = "SPEED")]
    pub speed: Option<u32>,

    /// Echo typed characters locally
    #[arg(short = 'h', long = "halfduplex")]
    pub half_duplex: bool,

    /// Append everything received from the line to this file
    #[arg(short = 'r', long = "record", value_name = "FILE")]
    pub record: Option<String>,

    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Write diagnostics to this file instead of stderr
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<String>,

    /// List available serial ports and exit
    #[arg(long)]
    pub list: bool,

    /// Print the effective configuration and exit
    #[arg(long = "show-config")]
    pub show_config: bool,

    /// Write a default configuration file and exit
    #[arg(long = "init-config")]
    pub init_config: bool,

    /// Output format for --list and --show-config
    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    pub help: Option<bool>,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
    /// Table output
    Table,
}

impl Args {
    /// Parse the process arguments, accepting the old `-9600` speed form
    pub fn parse_normalized() -> Self {
        Self::parse_from(normalize_speed_args(std::env::args_os()))
    }
}

/// Rewrite `-<digits>` as `-s<digits>` up to the first `--`
pub fn normalize_speed_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut seen_separator = false;

    args.into_iter()
        .enumerate()
        .map(|(index, arg)| {
            if index == 0 || seen_separator {
                return arg;
            }
            if arg == "--" {
                seen_separator = true;
                return arg;
            }

            match arg.to_str() {
                Some(text)
                    if text.len() > 1
                        && text.starts_with('-')
                        && text.as_bytes()[1].is_ascii_digit() =>
                {
                    OsString::from(format!("-s{}", &text[1..]))
                }
                _ => arg,
            }
        })
        .collect()
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Table => write!(f, "table"),
        }
    }
}
