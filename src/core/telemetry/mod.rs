//! Vendor-neutral accelerator telemetry.
//!
//! This module holds the canonical record every adapter normalizes into,
//! the shared value/unit normalizers, the adapter capability traits and the
//! registry that enumerates adapters.

pub mod collector;
mod loader;
pub mod normalize;
mod registry;
mod types;

pub use collector::{collect_all, VendorReport};
pub use loader::{DriverInfoProvider, GpuInfoLoader};
pub use registry::Registry;
pub use types::{GpuDriverInfo, GpuInfo, GpuInfoList};
