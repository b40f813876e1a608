use serde::{Deserialize, Serialize};

/// Default serial line when neither the config file nor `-l` names one
#[cfg(any(target_os = "linux", target_os = "android"))]
pub const DEFAULT_DEVICE: &str = "/dev/ttyS0";
#[cfg(not(any(target_os = "linux", target_os = "android")))]
pub const DEFAULT_DEVICE: &str = "/dev/cua00";

/// Default line speed
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// cuterm configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CutermConfig {
    /// Global configuration
    #[serde(default)]
    pub global: GlobalConfig,
    /// Serial line defaults
    #[serde(default)]
    pub line: LineDefaults,
}

/// Global configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Default log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Write diagnostics here instead of stderr
    #[serde(default)]
    pub log_file: Option<String>,
}

/// Line settings used when the command line does not override them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineDefaults {
    #[serde(default = "default_device")]
    pub device: String,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Echo forwarded keystrokes locally (half duplex)
    #[serde(default)]
    pub local_echo: bool,
    /// Append everything received from the line to this file
    #[serde(default)]
    pub record_file: Option<String>,
}

/// Everything the relay needs to know about the line it drives.
///
/// Built once from the config file and command line, then consumed by
/// the line configurator and the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub path: String,
    pub baud_rate: u32,
    pub local_echo: bool,
}

impl DeviceConfig {
    pub fn new(path: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            path: path.into(),
            baud_rate,
            local_echo: false,
        }
    }

    pub fn with_local_echo(mut self, local_echo: bool) -> Self {
        self.local_echo = local_echo;
        self
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DEVICE, DEFAULT_BAUD_RATE)
    }
}

impl From<&LineDefaults> for DeviceConfig {
    fn from(line: &LineDefaults) -> Self {
        Self::new(line.device.clone(), line.baud_rate).with_local_echo(line.local_echo)
    }
}

// Default value functions
fn default_log_level() -> String {
    "warn".to_string()
}

fn default_device() -> String {
    DEFAULT_DEVICE.to_string()
}

fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_file: None,
        }
    }
}

impl Default for LineDefaults {
    fn default() -> Self {
        Self {
            device: default_device(),
            baud_rate: default_baud_rate(),
            local_echo: false,
            record_file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialization() {
        let config = CutermConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: CutermConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(deserialized.line.baud_rate, DEFAULT_BAUD_RATE);
        assert_eq!(deserialized.global.log_level, "warn");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: CutermConfig = toml::from_str(
            r#"
            [line]
            baud_rate = 115200
            "#,
        )
        .unwrap();

        assert_eq!(config.line.baud_rate, 115200);
        assert_eq!(config.line.device, DEFAULT_DEVICE);
        assert!(!config.line.local_echo);
        assert!(config.line.record_file.is_none());
        assert_eq!(config.global.log_level, "warn");
    }

    #[test]
    fn test_empty_config() {
        let config: CutermConfig = toml::from_str("").unwrap();
        assert_eq!(config.line.device, DEFAULT_DEVICE);
        assert!(config.global.log_file.is_none());
    }

    #[test]
    fn test_device_config_from_line_defaults() {
        let line = LineDefaults {
            device: "/dev/ttyUSB0".to_string(),
            baud_rate: 57600,
            local_echo: true,
            record_file: None,
        };

        let device = DeviceConfig::from(&line);
        assert_eq!(device, DeviceConfig::new("/dev/ttyUSB0", 57600).with_local_echo(true));
    }
}
