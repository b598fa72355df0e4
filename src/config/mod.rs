//! Configuration loading and validation

pub mod loader;
pub mod schema;

pub use loader::load_config;
pub use schema::{AmnesiaConfig, ApplicationConfig, DumpConfig, ExportConfig, LoggingConfig};
