// Infrastructure module - Real terminals, lines, signals and files
pub mod config;
pub mod logging;
pub mod path;
pub mod serial;
pub mod signals;
pub mod terminal;
