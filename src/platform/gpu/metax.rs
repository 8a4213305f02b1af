use std::sync::Arc;

use crate::core::runner::{CommandRunner, ToolCommand};
use crate::core::telemetry::normalize::{kib_to_bytes, numeric_text};
use crate::core::telemetry::{GpuInfo, GpuInfoList, GpuInfoLoader};
use crate::error::Result;

pub const MX_SMI_PATH: &str = "/usr/bin/mx-smi";

const QUERY_ARGS: [&str; 3] = ["--show-temperature", "--show-usage", "--show-memory"];

/// MetaX loader backed by `mx-smi`
pub struct MetaxLoader {
    runner: Arc<dyn CommandRunner>,
    smi_path: String,
}

impl MetaxLoader {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self::with_path(runner, MX_SMI_PATH)
    }

    pub fn with_path<S: Into<String>>(runner: Arc<dyn CommandRunner>, smi_path: S) -> Self {
        Self {
            runner,
            smi_path: smi_path.into(),
        }
    }
}

impl GpuInfoLoader for MetaxLoader {
    fn load(&self) -> Result<GpuInfoList> {
        let cmd = ToolCommand::new(self.smi_path.as_str())
            .args(QUERY_ARGS)
            .merge_stderr();
        let output = self.runner.run(&cmd)?;
        Ok(parse_mx_output(&output.as_text()))
    }

    fn available(&self) -> bool {
        self.runner
            .run(&ToolCommand::new(self.smi_path.as_str()))
            .is_ok()
    }

    fn vendor(&self) -> &'static str {
        "mx"
    }
}

/// Scrape `mx-smi --show-temperature --show-usage --show-memory` output
///
/// Devices start at a `GPU#<n>  <model>  <bus>` line. When the tool reports
/// `Attached GPUs`, extra records beyond that count are dropped.
pub fn parse_mx_output(output: &str) -> GpuInfoList {
    let mut gpu_infos: Vec<GpuInfo> = Vec::new();
    let mut current: Option<GpuInfo> = None;
    let mut attached = 0usize;

    for line in output.lines() {
        if line.contains("Attached GPUs") {
            if let Some(count) = single_value(line).and_then(|v| v.parse::<usize>().ok()) {
                attached = count;
            }
            continue;
        }

        if line.contains("GPU#") && line.contains("MX") {
            if let Some(gpu) = current.take() {
                gpu_infos.push(gpu);
            }
            current = Some(parse_device_header(line, gpu_infos.len()));
            continue;
        }

        if let Some(gpu) = current.as_mut() {
            apply_field(gpu, line);
        }
    }

    if let Some(gpu) = current {
        gpu_infos.push(gpu);
    }

    if attached > 0 && gpu_infos.len() > attached {
        gpu_infos.truncate(attached);
    }

    GpuInfoList::new(gpu_infos)
}

/// `GPU#0  MXN260  0000:0f:00.0`
fn parse_device_header(line: &str, fallback_index: usize) -> GpuInfo {
    let fields: Vec<&str> = line.split_whitespace().collect();

    let index = fields
        .iter()
        .find_map(|f| f.strip_prefix("GPU#"))
        .and_then(|n| n.parse::<usize>().ok())
        .unwrap_or(fallback_index);

    let mut gpu = GpuInfo {
        card_vendor: "MetaX".to_string(),
        ..GpuInfo::with_index(index)
    };
    if fields.len() >= 2 {
        gpu.card_model = fields[1].to_string();
    }
    if fields.len() > 2 {
        gpu.pci_bus = fields[fields.len() - 1].to_string();
    }
    gpu
}

fn apply_field(gpu: &mut GpuInfo, line: &str) {
    if !line.contains(':') || line.contains("vis_vram") {
        return;
    }

    if line.contains("hotspot") {
        if let Some(temp) = single_value(line) {
            gpu.temperature_edge = numeric_text(temp.trim_end_matches("°C"));
        }
    } else if line.contains("vram total") {
        if let Some(bytes) = single_value(line).and_then(kb_to_bytes) {
            gpu.vram_total = bytes;
        }
    } else if line.contains("vram used") {
        if let Some(bytes) = single_value(line).and_then(kb_to_bytes) {
            gpu.vram_used = bytes;
        }
    } else if line.contains("GPU")
        && line.contains('%')
        && !line.contains("VPUE")
        && !line.contains("VPUD")
    {
        if let Some(usage) = single_value(line) {
            gpu.gpu_use = numeric_text(usage.trim_end_matches('%'));
        }
    }
}

/// Value of a `label : value` line holding exactly one colon
fn single_value(line: &str) -> Option<&str> {
    let mut parts = line.split(':');
    let (_, value) = (parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    Some(value.trim())
}

fn kb_to_bytes(value: &str) -> Option<String> {
    value
        .trim_end_matches("KB")
        .trim()
        .parse::<i64>()
        .ok()
        .map(kib_to_bytes)
}
