// Core telemetry logic module

pub mod config;
pub mod runner;
pub mod telemetry;

// Re-export commonly used items
pub use config::Config;
pub use runner::{CommandRunner, ScriptedRunner, SystemRunner, ToolCommand, ToolOutput};
pub use telemetry::{
    collect_all, DriverInfoProvider, GpuDriverInfo, GpuInfo, GpuInfoList, GpuInfoLoader,
    Registry, VendorReport,
};
