// Serial module - Serial line setup and async access
pub mod device;
pub mod line;

pub use device::{LineControl, SerialLine};
pub use line::LineModeConfigurator;
