use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::core::runner::{CommandRunner, ToolCommand};
use crate::core::telemetry::normalize::{mib_to_bytes, truncate_to_integer};
use crate::core::telemetry::{GpuInfo, GpuInfoList, GpuInfoLoader};
use crate::error::{GpuError, Result};

use super::{xml_root_name, Platform};

pub const COREX_ROOT: &str = "/usr/local";

const ROOT_ELEMENT: &str = "ixsmi_log";

/// Iluvatar CoreX loader backed by `ixsmi -q -x`
///
/// The tool lives inside a versioned `corex*` install directory and needs
/// that install's `bin` and `lib` directories on its search paths.
pub struct IluvatarLoader {
    runner: Arc<dyn CommandRunner>,
    corex_root: PathBuf,
    platform: Platform,
}

impl IluvatarLoader {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self::with_root(runner, COREX_ROOT, Platform::current())
    }

    pub fn with_root<P: Into<PathBuf>>(
        runner: Arc<dyn CommandRunner>,
        corex_root: P,
        platform: Platform,
    ) -> Self {
        Self {
            runner,
            corex_root: corex_root.into(),
            platform,
        }
    }

    fn find_smi_path(&self) -> Option<PathBuf> {
        scan_corex_smi_paths(&self.corex_root)
            .into_iter()
            .find(|path| path.exists())
    }
}

impl GpuInfoLoader for IluvatarLoader {
    fn load(&self) -> Result<GpuInfoList> {
        let smi_path = self
            .find_smi_path()
            .ok_or_else(|| GpuError::execution("ixsmi", "ixsmi not found"))?;

        let output = self.runner.run(&query_command(&smi_path))?;
        log::debug!("ixsmi returned {} bytes", output.stdout.len());
        parse_ixsmi(&output.as_text())
    }

    fn available(&self) -> bool {
        if !self.platform.is("linux", "x86_64") {
            log::info!(
                "Iluvatar unavailable on {}/{}",
                self.platform.os,
                self.platform.arch
            );
            return false;
        }

        let Some(smi_path) = self.find_smi_path() else {
            log::info!("No ixsmi under {}", self.corex_root.display());
            return false;
        };
        let program = smi_path.display().to_string();

        if self.runner.lookup(&program).is_none() {
            log::warn!("ixsmi at {} is not executable", program);
            return false;
        }

        match self.runner.run(&query_command(&smi_path)) {
            Ok(_) => {
                log::info!("Iluvatar available through {}", program);
                true
            }
            Err(e) => {
                log::warn!("ixsmi probe failed: {}", e);
                false
            }
        }
    }

    fn vendor(&self) -> &'static str {
        "Iluvatar"
    }
}

/// Every `<root>/corex*/bin/ixsmi` that exists, sorted
pub fn scan_corex_smi_paths(root: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            log::debug!("Cannot read {}: {}", root.display(), e);
            return Vec::new();
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .filter(|entry| entry.path().is_dir())
        .filter(|entry| entry.file_name().to_string_lossy().starts_with("corex"))
        .map(|entry| entry.path().join("bin").join("ixsmi"))
        .filter(|smi| smi.exists())
        .collect();

    paths.sort();
    paths
}

/// `ixsmi -q -x` with the install's directories prepended for the child only
fn query_command(smi_path: &Path) -> ToolCommand {
    let bin_dir = smi_path.parent().unwrap_or(smi_path);
    let install_dir = bin_dir.parent().unwrap_or(bin_dir);

    let path = join_search_path(&[
        bin_dir.display().to_string(),
        env::var("PATH").unwrap_or_default(),
    ]);
    let ld_library_path = join_search_path(&[
        env::var("LD_LIBRARY_PATH").unwrap_or_default(),
        install_dir.join("lib").display().to_string(),
        install_dir.join("lib64").display().to_string(),
    ]);

    ToolCommand::new(smi_path.display().to_string())
        .args(["-q", "-x"])
        .env("PATH", path)
        .env("LD_LIBRARY_PATH", ld_library_path)
}

fn join_search_path(parts: &[String]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(":")
}

#[derive(Debug, Default, Deserialize)]
struct IxsmiLog {
    #[serde(rename = "gpu", default)]
    gpus: Vec<IxsmiGpu>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IxsmiGpu {
    #[serde(rename = "@id")]
    id: String,
    product_name: String,
    serial: String,
    memory_usage: IxsmiMemory,
    utilization: IxsmiUtilization,
    temperature: IxsmiTemperature,
    pci: IxsmiPci,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IxsmiMemory {
    total: String,
    used: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IxsmiUtilization {
    gpu_util: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IxsmiTemperature {
    gpu_temp: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IxsmiPci {
    pci_domain: String,
    pci_bus_id: String,
}

/// Parse the `<ixsmi_log>` document printed by `ixsmi -q -x`
pub fn parse_ixsmi(output: &str) -> Result<GpuInfoList> {
    match xml_root_name(output) {
        Some(root) if root == ROOT_ELEMENT => {}
        Some(root) => {
            return Err(GpuError::parse(
                "ixsmi",
                format!("expected <{}>, found <{}>", ROOT_ELEMENT, root),
            ))
        }
        None => return Err(GpuError::parse("ixsmi", "no root element")),
    }

    let log: IxsmiLog =
        quick_xml::de::from_str(output).map_err(|e| GpuError::parse("ixsmi", e.to_string()))?;

    let gpu_infos = log
        .gpus
        .into_iter()
        .enumerate()
        .map(|(idx, gpu)| {
            let product = gpu.product_name.trim().to_string();
            let mut info = GpuInfo {
                device_id: gpu.id.trim().to_string(),
                serial_number: gpu.serial.trim().to_string(),
                vram_total: mib_to_bytes(&gpu.memory_usage.total),
                vram_used: mib_to_bytes(&gpu.memory_usage.used),
                gpu_use: truncate_to_integer(&gpu.utilization.gpu_util),
                card_series: product.clone(),
                card_model: product,
                card_vendor: "Iluvatar".to_string(),
                pci_bus: pci_bus(&gpu.pci),
                ..GpuInfo::with_index(idx)
            };
            info.set_temperatures(&truncate_to_integer(&gpu.temperature.gpu_temp));
            info
        })
        .collect::<Vec<_>>();

    Ok(GpuInfoList::new(gpu_infos))
}

/// Bus id with its first component replaced by the PCI domain
fn pci_bus(pci: &IxsmiPci) -> String {
    let bus_id = pci.pci_bus_id.trim();
    if bus_id.is_empty() {
        return String::new();
    }
    let mut parts: Vec<&str> = bus_id.split(':').collect();
    parts[0] = pci.pci_domain.trim();
    parts.join(":")
}
