use crate::cli::args::OutputFormat;
use crate::domain::config::CutermConfig;
use serde::Serialize;
use std::io::{self, Write};
use tabled::{Table, Tabled};

/// Output writer trait for different formats
pub trait OutputWriter {
    fn write_ports(&self, ports: &[PortRow]) -> Result<(), OutputError>;
    fn write_config(&self, config: &CutermConfig) -> Result<(), OutputError>;
    fn write_message(&self, message: &str) -> Result<(), OutputError>;
    fn write_error(&self, error: &str) -> Result<(), OutputError>;
}

/// Output formatting errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("TOML serialization error: {0}")]
    TomlError(#[from] toml::ser::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl From<OutputError> for crate::domain::error::CutermError {
    fn from(err: OutputError) -> Self {
        Self::Output(err.to_string())
    }
}

/// One serial port as shown by `--list`
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct PortRow {
    pub name: String,
    pub kind: String,
    pub description: String,
}

impl From<&serialport::SerialPortInfo> for PortRow {
    fn from(port: &serialport::SerialPortInfo) -> Self {
        let (kind, description) = match &port.port_type {
            serialport::SerialPortType::UsbPort(usb) => {
                let product = [usb.manufacturer.as_deref(), usb.product.as_deref()]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(" ");
                (
                    "usb",
                    format!("{:04x}:{:04x} {}", usb.vid, usb.pid, product)
                        .trim_end()
                        .to_string(),
                )
            }
            serialport::SerialPortType::PciPort => ("pci", String::new()),
            serialport::SerialPortType::BluetoothPort => ("bluetooth", String::new()),
            serialport::SerialPortType::Unknown => ("unknown", String::new()),
        };

        Self {
            name: port.port_name.clone(),
            kind: kind.to_string(),
            description,
        }
    }
}

/// Console output writer
pub struct ConsoleWriter {
    format: OutputFormat,
}

impl ConsoleWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    fn render_ports(&self, ports: &[PortRow]) -> Result<String, OutputError> {
        let rendered = match self.format {
            OutputFormat::Text => ports
                .iter()
                .map(|port| {
                    if port.description.is_empty() {
                        format!("{} ({})", port.name, port.kind)
                    } else {
                        format!("{} ({}, {})", port.name, port.kind, port.description)
                    }
                })
                .collect::<Vec<_>>()
                .join("\n"),
            OutputFormat::Json => serde_json::to_string_pretty(ports)?,
            OutputFormat::Table => {
                if ports.is_empty() {
                    String::new()
                } else {
                    Table::new(ports.to_vec()).to_string()
                }
            }
        };
        Ok(rendered)
    }

    fn render_config(&self, config: &CutermConfig) -> Result<String, OutputError> {
        let rendered = match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(config)?,
            _ => toml::to_string_pretty(config)?,
        };
        Ok(rendered)
    }
}

impl OutputWriter for ConsoleWriter {
    fn write_ports(&self, ports: &[PortRow]) -> Result<(), OutputError> {
        if ports.is_empty() && !matches!(self.format, OutputFormat::Json) {
            println!("No serial ports found");
            return Ok(());
        }
        println!("{}", self.render_ports(ports)?);
        Ok(())
    }

    fn write_config(&self, config: &CutermConfig) -> Result<(), OutputError> {
        println!("{}", self.render_config(config)?);
        Ok(())
    }

    fn write_message(&self, message: &str) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "message": message,
                    "level": "info"
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            _ => {
                println!("{}", message);
            }
        }
        Ok(())
    }

    fn write_error(&self, error: &str) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "error": error,
                    "level": "error"
                });
                eprintln!("{}", serde_json::to_string_pretty(&output)?);
            }
            _ => {
                eprintln!("cuterm: {}", error);
            }
        }
        Ok(())
    }
}

/// Printed once the line is configured and the terminal is raw
pub fn connected_notice(baud_rate: u32) -> String {
    format!("Connected (speed {})\r\n", baud_rate)
}

/// Write a session notice straight to stdout
pub fn write_notice(notice: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(notice.as_bytes())?;
    stdout.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::session::{SessionEnd, TerminationSignal};

    fn ports() -> Vec<PortRow> {
        vec![
            PortRow {
                name: "/dev/ttyUSB0".to_string(),
                kind: "usb".to_string(),
                description: "0403:6001 FTDI FT232R".to_string(),
            },
            PortRow {
                name: "/dev/ttyS0".to_string(),
                kind: "unknown".to_string(),
                description: String::new(),
            },
        ]
    }

    #[test]
    fn test_text_ports() {
        let writer = ConsoleWriter::new(OutputFormat::Text);
        let text = writer.render_ports(&ports()).unwrap();
        assert_eq!(
            text,
            "/dev/ttyUSB0 (usb, 0403:6001 FTDI FT232R)\n/dev/ttyS0 (unknown)"
        );
    }

    #[test]
    fn test_json_ports() {
        let writer = ConsoleWriter::new(OutputFormat::Json);
        let json = writer.render_ports(&ports()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["name"], "/dev/ttyUSB0");
        assert_eq!(value[1]["kind"], "unknown");
    }

    #[test]
    fn test_table_ports() {
        let writer = ConsoleWriter::new(OutputFormat::Table);
        let table = writer.render_ports(&ports()).unwrap();
        assert!(table.contains("name"));
        assert!(table.contains("/dev/ttyS0"));
    }

    #[test]
    fn test_config_rendering() {
        let writer = ConsoleWriter::new(OutputFormat::Text);
        let text = writer.render_config(&CutermConfig::default()).unwrap();
        assert!(text.contains("baud_rate = 9600"));

        let writer = ConsoleWriter::new(OutputFormat::Json);
        let json = writer.render_config(&CutermConfig::default()).unwrap();
        assert!(json.contains("\"baud_rate\": 9600"));
    }

    #[test]
    fn test_notices() {
        assert_eq!(connected_notice(9600), "Connected (speed 9600)\r\n");
        assert_eq!(SessionEnd::DeviceClosed.notice(), "\r\n[EOT]\n");
        assert_eq!(
            SessionEnd::Signal(TerminationSignal::HangUp).notice(),
            "\r\n[SIGHUP]\n"
        );
    }
}
