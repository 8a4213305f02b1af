use std::fs;
use std::sync::Arc;

use crate::core::runner::{CommandRunner, ToolCommand};
use crate::core::telemetry::normalize::{
    format_fixed, mib_to_bytes_i64, parse_leading_f64, parse_leading_i64,
};
use crate::core::telemetry::{
    DriverInfoProvider, GpuDriverInfo, GpuInfo, GpuInfoList, GpuInfoLoader,
};
use crate::error::{GpuError, Result};

pub const NVIDIA_SMI: &str = "nvidia-smi";

const QUERY_ARGS: [&str; 2] = [
    "--format=csv,noheader",
    "--query-gpu=index,name,memory.total,memory.used,utilization.gpu,temperature.gpu,pci.bus_id",
];

/// Minimum columns a row needs (index through temperature)
const REQUIRED_COLUMNS: usize = 6;

const PROC_MODULES: &str = "/proc/modules";

/// NVIDIA loader backed by `nvidia-smi` CSV queries
pub struct NvidiaLoader {
    runner: Arc<dyn CommandRunner>,
}

impl NvidiaLoader {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

impl GpuInfoLoader for NvidiaLoader {
    fn load(&self) -> Result<GpuInfoList> {
        let cmd = ToolCommand::new(NVIDIA_SMI).args(QUERY_ARGS);
        let output = self.runner.run(&cmd)?;
        Ok(parse_nvidia_csv(&output.as_text()))
    }

    fn available(&self) -> bool {
        self.runner.lookup(NVIDIA_SMI).is_some()
    }

    fn vendor(&self) -> &'static str {
        "NVIDIA"
    }

    fn driver_info_provider(&self) -> Option<&dyn DriverInfoProvider> {
        Some(self)
    }
}

impl DriverInfoProvider for NvidiaLoader {
    fn driver_info(&self) -> Result<GpuDriverInfo> {
        let cmd = ToolCommand::new(NVIDIA_SMI).args(["--version"]).merge_stderr();
        let output = self.runner.run(&cmd)?;

        let mut info = parse_version(&output.as_text())?;
        info.vendor = self.vendor().to_string();
        info.installed = true;
        info.install_path = self
            .runner
            .lookup(NVIDIA_SMI)
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        info.kernel_module = "nvidia".to_string();
        info.module_loaded = fs::read_to_string(PROC_MODULES)
            .map(|modules| is_module_loaded(&modules, "nvidia"))
            .unwrap_or(false);
        Ok(info)
    }
}

/// Parse `nvidia-smi --format=csv,noheader` rows
///
/// Example row:
/// `0, NVIDIA GeForce RTX 4080 SUPER, 16376 MiB, 1309 MiB, 0 %, 41, 00000000:01:00.0`
///
/// Short rows and rows with a non-numeric index are skipped.
pub fn parse_nvidia_csv(output: &str) -> GpuInfoList {
    let mut gpu_infos = Vec::new();

    for line in output.lines() {
        let row: Vec<&str> = line.split(',').map(str::trim).collect();
        if row.len() < REQUIRED_COLUMNS {
            continue;
        }

        let index = match row[0].parse::<usize>() {
            Ok(index) => index,
            Err(_) => {
                log::warn!("Skipping nvidia-smi row with index {:?}", row[0]);
                continue;
            }
        };

        let memory_total = mib_to_bytes_i64(parse_leading_i64(row[2]).unwrap_or(0));
        let memory_used = mib_to_bytes_i64(parse_leading_i64(row[3]).unwrap_or(0));
        let utilization = parse_leading_f64(row[4]).unwrap_or(0.0);
        let temperature = format_fixed(parse_leading_f64(row[5]).unwrap_or(0.0), 1);
        let pci_bus = row
            .get(6)
            .copied()
            .map(|bus| bus.strip_prefix("0000").unwrap_or(bus).to_string())
            .unwrap_or_default();

        let mut info = GpuInfo {
            device_id: index.to_string(),
            card_model: row[1].to_string(),
            card_vendor: "NVIDIA".to_string(),
            card_series: "NVIDIA".to_string(),
            vram_total: memory_total.to_string(),
            vram_used: memory_used.to_string(),
            gpu_use: format_fixed(utilization, 1),
            pci_bus,
            ..GpuInfo::with_index(index)
        };
        info.set_temperatures(&temperature);
        gpu_infos.push(info);
    }

    GpuInfoList::new(gpu_infos)
}

/// Parse `nvidia-smi --version` key/value lines
///
/// All of the client, driver and CUDA versions must be present.
pub fn parse_version(version_info: &str) -> Result<GpuDriverInfo> {
    let mut info = GpuDriverInfo::default();

    for line in version_info.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };

        let value = value.trim().to_string();
        match key.trim() {
            "NVIDIA-SMI version" => info.client_version = value,
            "DRIVER version" => info.version = value,
            "CUDA Version" => info.lib_version = value,
            _ => {}
        }
    }

    if info.client_version.is_empty() || info.version.is_empty() || info.lib_version.is_empty() {
        return Err(GpuError::parse(
            "nvidia-smi --version",
            "missing required fields",
        ));
    }

    Ok(info)
}

fn is_module_loaded(proc_modules: &str, module: &str) -> bool {
    proc_modules
        .lines()
        .any(|line| line.split_whitespace().next() == Some(module))
}
