pub mod config;
pub mod logging;

pub use config::{Cli, Config};
pub use logging::init_logging;
