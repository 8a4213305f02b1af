use std::sync::Arc;

use serde::Deserialize;

use crate::core::runner::{CommandRunner, ToolCommand};
use crate::core::telemetry::normalize::{convert_size_to_bytes, or_default, parse_numeric_field};
use crate::core::telemetry::{GpuInfo, GpuInfoList, GpuInfoLoader};
use crate::error::{GpuError, Result};

/// Tried in order, the first one that runs wins
const DLSMI_CANDIDATES: [&str; 3] = ["dlsmi", "/usr/bin/dlsmi", "/usr/local/bin/dlsmi"];

const DEFAULT_VENDOR: &str = "Denglin";

/// Denglin loader backed by `dlsmi query --xml-format`
pub struct DenglinLoader {
    runner: Arc<dyn CommandRunner>,
}

impl DenglinLoader {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    fn query(&self) -> Result<Vec<u8>> {
        let mut last_err = None;
        for program in DLSMI_CANDIDATES {
            let cmd = ToolCommand::new(program)
                .args(["query", "--xml-format"])
                .merge_stderr();
            match self.runner.run(&cmd) {
                Ok(output) => return Ok(output.stdout),
                Err(e) => {
                    log::debug!("dlsmi candidate {} failed: {}", program, e);
                    last_err = Some(e);
                }
            }
        }

        Err(last_err
            .unwrap_or_else(|| GpuError::execution("dlsmi", "dlsmi command not found")))
    }
}

impl GpuInfoLoader for DenglinLoader {
    fn load(&self) -> Result<GpuInfoList> {
        let output = self.query()?;
        parse_dlsmi_output(&String::from_utf8_lossy(&output))
    }

    fn available(&self) -> bool {
        DLSMI_CANDIDATES
            .iter()
            .any(|p| self.runner.lookup(p).is_some())
    }

    fn vendor(&self) -> &'static str {
        DEFAULT_VENDOR
    }
}

#[derive(Debug, Default, Deserialize)]
struct DlsmiLog {
    #[serde(rename = "gpu", default)]
    gpus: Vec<DlsmiGpu>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DlsmiGpu {
    #[serde(rename = "@id")]
    id: String,
    product_name: String,
    product_brand: String,
    product_architecture: String,
    serial_number: String,
    fw_version: String,
    board_part_number: String,
    pci: DlsmiPci,
    memory_usage: DlsmiMemory,
    utilization: DlsmiUtilization,
    temperature: DlsmiTemperature,
    power_readings: DlsmiPowerReadings,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DlsmiPci {
    bus_id: String,
    device_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DlsmiMemory {
    total: String,
    used: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DlsmiUtilization {
    gpu: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DlsmiTemperature {
    gpu_current_temp: String,
    gpu_slowdown_temp: String,
    memory_current_temp: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DlsmiPowerReadings {
    power_draw: String,
}

/// Parse the XML document printed by `dlsmi query --xml-format`
///
/// Devices are indexed by their position in the document.
pub fn parse_dlsmi_output(output: &str) -> Result<GpuInfoList> {
    let log: DlsmiLog =
        quick_xml::de::from_str(output).map_err(|e| GpuError::parse("dlsmi", e.to_string()))?;

    let gpu_infos = log
        .gpus
        .into_iter()
        .enumerate()
        .map(|(idx, gpu)| {
            let id = gpu.id.trim();
            GpuInfo {
                device_id: or_default(&gpu.pci.device_id, id),
                device_rev: gpu.fw_version.trim().to_string(),
                serial_number: gpu.serial_number.trim().to_string(),
                card_series: gpu.product_architecture.trim().to_string(),
                card_model: gpu.product_name.trim().to_string(),
                card_vendor: or_default(&gpu.product_brand, DEFAULT_VENDOR),
                card_sku: gpu.board_part_number.trim().to_string(),
                pci_bus: or_default(&gpu.pci.bus_id, id),
                vram_total: convert_size_to_bytes(&gpu.memory_usage.total),
                vram_used: convert_size_to_bytes(&gpu.memory_usage.used),
                gpu_use: parse_numeric_field(&gpu.utilization.gpu),
                temperature_edge: parse_numeric_field(&gpu.temperature.gpu_current_temp),
                temperature_junction: parse_numeric_field(&gpu.temperature.gpu_slowdown_temp),
                temperature_memory: parse_numeric_field(&gpu.temperature.memory_current_temp),
                average_power: parse_numeric_field(&gpu.power_readings.power_draw),
                ..GpuInfo::with_index(idx)
            }
        })
        .collect::<Vec<_>>();

    Ok(GpuInfoList::new(gpu_infos))
}
