use crate::core::telemetry::{GpuInfoList, GpuInfoLoader};
use crate::error::Result;

/// Placeholder for hosts without an accelerator
///
/// Always available and never reports a device.
#[derive(Debug, Default, Clone, Copy)]
pub struct CpuLoader;

impl GpuInfoLoader for CpuLoader {
    fn load(&self) -> Result<GpuInfoList> {
        Ok(GpuInfoList::empty())
    }

    fn available(&self) -> bool {
        true
    }

    fn vendor(&self) -> &'static str {
        "CPU"
    }
}
