use thiserror::Error;

/// cuterm unified error type
#[derive(Error, Debug)]
pub enum CutermError {
    /// Local terminal mode could not be read or applied
    #[error("{operation}: {source}")]
    TerminalConfig {
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// Serial line mode could not be built or applied
    #[error("{operation}: {message}")]
    LineConfig {
        operation: &'static str,
        message: String,
    },

    #[error("open(\"{path}\"): {source}")]
    DeviceOpen {
        path: String,
        #[source]
        source: serialport::Error,
    },

    #[error("Recording error: {0}")]
    Recording(std::io::Error),

    #[error("Local output error: {0}")]
    LocalOutput(std::io::Error),

    #[error("Signal setup error: {0}")]
    Signal(std::io::Error),

    #[error("Command failed: {0}")]
    CommandDispatch(String),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Output error: {0}")]
    Output(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CutermError {
    /// Wrap the last OS error for a failed line call
    pub fn line(operation: &'static str) -> Self {
        Self::LineConfig {
            operation,
            message: std::io::Error::last_os_error().to_string(),
        }
    }
}

pub type CutermResult<T> = Result<T, CutermError>;
