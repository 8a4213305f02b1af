//! Host-facing code: vendor adapters and sysfs access.

pub mod drm;
pub mod gpu;

pub use drm::SysfsDrm;
pub use gpu::Platform;
