// gpu-tools Library - Public API

// Re-export error types
pub mod error;
pub use error::{GpuError, Result};

// Module declarations
pub mod commands;
pub mod core;
pub mod platform;
pub mod ui;

// Re-export commonly used types
pub use crate::core::config::Config;
pub use crate::core::runner::{CommandRunner, SystemRunner};
pub use crate::core::telemetry::{GpuDriverInfo, GpuInfo, GpuInfoList, GpuInfoLoader, Registry};

// Initialize logging, RUST_LOG overrides the default level
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
}
