use super::types::{GpuDriverInfo, GpuInfoList};
use crate::error::Result;

/// Capability shared by every vendor adapter
///
/// Implementations live in the platform layer, one per vendor tool.
pub trait GpuInfoLoader: Send + Sync {
    /// Invoke the vendor tool and normalize its output
    ///
    /// Returns an empty list when the tool reports no devices.
    fn load(&self) -> Result<GpuInfoList>;

    /// Best-effort probe of whether `load` is likely to succeed
    fn available(&self) -> bool;

    /// Constant vendor name
    fn vendor(&self) -> &'static str;

    /// Driver version capability, for adapters that can report it
    fn driver_info_provider(&self) -> Option<&dyn DriverInfoProvider> {
        None
    }
}

/// Optional capability: report the installed driver stack
pub trait DriverInfoProvider {
    fn driver_info(&self) -> Result<GpuDriverInfo>;
}
