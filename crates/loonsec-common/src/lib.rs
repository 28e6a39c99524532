//! LoonSec Common - Shared configuration and logging utilities

pub mod config;
pub mod logging;

pub use config::{Config, ConfigBuilder, LoggingConfig, NvdConfig};
pub use logging::{init_logging, LogFormat};
