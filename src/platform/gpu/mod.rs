//! Vendor adapters.
//!
//! One loader per vendor tool: AMD (rocm-smi), AMD on RISC-V (DRM sysfs),
//! a CPU placeholder, Denglin (dlsmi), Enflame (efsmi), Iluvatar (ixsmi),
//! MetaX (mx-smi) and NVIDIA (nvidia-smi).

mod amd;
mod amd_riscv;
mod cpu;
mod denglin;
mod enflame;
mod iluvatar;
mod metax;
mod nvidia;

pub use amd::{parse_rocm_smi, AmdLoader, ROCM_SMI_PATH};
pub use amd_riscv::AmdRiscvLoader;
pub use cpu::CpuLoader;
pub use denglin::{parse_dlsmi_output, DenglinLoader};
pub use enflame::{parse_efsmi_output, EnflameLoader};
pub use iluvatar::{parse_ixsmi, scan_corex_smi_paths, IluvatarLoader, COREX_ROOT};
pub use metax::{parse_mx_output, MetaxLoader, MX_SMI_PATH};
pub use nvidia::{parse_nvidia_csv, parse_version, NvidiaLoader, NVIDIA_SMI};

use std::sync::Arc;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::core::config::Config;
use crate::core::runner::CommandRunner;
use crate::core::telemetry::{GpuInfoLoader, Registry};
use crate::platform::drm::{SysfsDrm, DRM_ROOT};

/// Operating system and architecture an adapter is gated on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub os: &'static str,
    pub arch: &'static str,
}

impl Platform {
    /// The platform this binary was built for
    pub fn current() -> Self {
        Self {
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
        }
    }

    pub fn is(&self, os: &str, arch: &str) -> bool {
        self.os == os && self.arch == arch
    }
}

/// Name of the first element of an XML document
pub(crate) fn xml_root_name(xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return Some(String::from_utf8_lossy(e.name().as_ref()).into_owned())
            }
            Ok(Event::Eof) | Err(_) => return None,
            Ok(_) => {}
        }
    }
}

impl Registry {
    /// Registry holding every built-in adapter not disabled in `config`
    ///
    /// Registration order: AMD, AMD-riscv, CPU, Denglin, Enflame, Iluvatar,
    /// MetaX, NVIDIA.
    pub fn with_defaults(runner: Arc<dyn CommandRunner>, config: &Config) -> Self {
        let rocm_smi = config.rocm_smi_path.as_deref().unwrap_or(ROCM_SMI_PATH);
        let mx_smi = config.mx_smi_path.as_deref().unwrap_or(MX_SMI_PATH);
        let corex_root = config.corex_root.as_deref().unwrap_or(COREX_ROOT);
        let drm_root = config.drm_root.as_deref().unwrap_or(DRM_ROOT);

        let loaders: Vec<Box<dyn GpuInfoLoader>> = vec![
            Box::new(AmdLoader::with_path(runner.clone(), rocm_smi)),
            Box::new(AmdRiscvLoader::new(SysfsDrm::new(drm_root))),
            Box::new(CpuLoader),
            Box::new(DenglinLoader::new(runner.clone())),
            Box::new(EnflameLoader::new(runner.clone())),
            Box::new(IluvatarLoader::with_root(
                runner.clone(),
                corex_root,
                Platform::current(),
            )),
            Box::new(MetaxLoader::with_path(runner.clone(), mx_smi)),
            Box::new(NvidiaLoader::new(runner)),
        ];

        let mut registry = Registry::new();
        for loader in loaders {
            if config.is_vendor_enabled(loader.vendor()) {
                registry.register(loader);
            } else {
                log::info!("Skipping disabled vendor {}", loader.vendor());
            }
        }
        registry
    }
}
