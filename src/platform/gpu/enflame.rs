use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::runner::{CommandRunner, ToolCommand};
use crate::core::telemetry::normalize::{mib_to_bytes, numeric_text};
use crate::core::telemetry::{GpuInfo, GpuInfoList, GpuInfoLoader};
use crate::error::Result;

const EFSMI_CANDIDATES: [&str; 2] = ["efsmi", "/usr/bin/efsmi"];
const QUERY_ARGS: [&str; 3] = ["-q", "-d", "TEMP,MEMORY,USAGE,PCIE"];

const DEVICE_MARKER: &str = "DEV ID";

static VALUE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r":\s+(.+)").expect("valid regex"));

/// Enflame GCU loader backed by `efsmi -q`
pub struct EnflameLoader {
    runner: Arc<dyn CommandRunner>,
}

impl EnflameLoader {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

impl GpuInfoLoader for EnflameLoader {
    fn load(&self) -> Result<GpuInfoList> {
        let primary = ToolCommand::new(EFSMI_CANDIDATES[0])
            .args(QUERY_ARGS)
            .merge_stderr();
        let output = match self.runner.run(&primary) {
            Ok(output) => output,
            Err(e) => {
                log::debug!("efsmi on PATH failed ({}), trying {}", e, EFSMI_CANDIDATES[1]);
                let fallback = ToolCommand::new(EFSMI_CANDIDATES[1])
                    .args(QUERY_ARGS)
                    .merge_stderr();
                self.runner.run(&fallback)?
            }
        };
        Ok(parse_efsmi_output(&output.as_text()))
    }

    fn available(&self) -> bool {
        EFSMI_CANDIDATES
            .iter()
            .any(|p| self.runner.lookup(p).is_some())
    }

    fn vendor(&self) -> &'static str {
        "Enflame"
    }
}

/// Scrape `efsmi -q -d TEMP,MEMORY,USAGE,PCIE` output
///
/// ```text
/// DEV ID 0
///     Device Mem Info
///         Mem Size                : 42976 MiB
///         Mem Usage               : 1129 MiB
///     Temperature Info
///         GCU Temp                : 34 C
///     Device Usage Info
///         GCU Usage               : 0.0 %
/// ```
///
/// Label matching is substring based and the first matching label wins.
pub fn parse_efsmi_output(output: &str) -> GpuInfoList {
    let mut gpu_infos = Vec::new();
    let mut current: Option<GpuInfo> = None;

    for line in output.lines().map(str::trim) {
        if let Some(device_id) = line.strip_prefix(DEVICE_MARKER) {
            if let Some(gpu) = current.take() {
                gpu_infos.push(gpu);
            }
            current = Some(GpuInfo {
                device_id: device_id.trim().to_string(),
                card_vendor: "Enflame".to_string(),
                card_model: "Enflame GCU".to_string(),
                ..GpuInfo::with_index(gpu_infos.len())
            });
            continue;
        }

        let Some(gpu) = current.as_mut() else {
            continue;
        };
        let Some(value) = VALUE_RE.captures(line).and_then(|c| c.get(1)) else {
            continue;
        };
        apply_field(gpu, line, value.as_str());
    }

    if let Some(gpu) = current {
        gpu_infos.push(gpu);
    }

    GpuInfoList::new(gpu_infos)
}

fn apply_field(gpu: &mut GpuInfo, line: &str, value: &str) {
    if line.contains("Mem Size") || line.contains("Total Size") {
        if let Some(bytes) = mib_value(value) {
            gpu.vram_total = bytes;
        }
    } else if line.contains("Mem Usage") || line.contains("Used Size") {
        if let Some(bytes) = mib_value(value) {
            gpu.vram_used = bytes;
        }
    } else if line.contains("GCU Temp") {
        gpu.set_temperatures(&numeric_text(value));
    } else if line.contains("GCU Usage") {
        gpu.gpu_use = numeric_text(value);
    } else if line.contains("Domain") {
        gpu.pci_bus = value.trim().to_string();
    } else if line.contains("Bus") {
        gpu.pci_bus = format!("{}:{}", gpu.pci_bus, value.trim());
    } else if line.contains("Dev  ") {
        gpu.pci_bus = format!("{}:{}", gpu.pci_bus, value.trim());
    } else if line.contains("Func") {
        gpu.pci_bus = format!("{}.{}", gpu.pci_bus, value.trim());
    }
}

/// Bytes for a "<n> MiB" value; other units are left alone
fn mib_value(value: &str) -> Option<String> {
    let parts: Vec<&str> = value.split(' ').collect();
    if parts.len() >= 2 && parts[1] == "MiB" && parts[0].parse::<f64>().is_ok() {
        Some(mib_to_bytes(parts[0]))
    } else {
        None
    }
}
