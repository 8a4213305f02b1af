use std::sync::Arc;

use serde_json::{Map, Value};

use crate::core::runner::{CommandRunner, ToolCommand};
use crate::core::telemetry::normalize::numeric_text;
use crate::core::telemetry::{GpuInfo, GpuInfoList, GpuInfoLoader};
use crate::error::{GpuError, Result};

pub const ROCM_SMI_PATH: &str = "/usr/bin/rocm-smi";

/// rocm-smi is a Python script; make sure python3 resolves for the child
const ROCM_SMI_ENV_PATH: &str = "/usr/bin:/usr/local/bin:/bin:/usr/sbin:/sbin";

const QUERY_ARGS: [&str; 10] = [
    "-i",
    "--showmeminfo",
    "vram",
    "--showpower",
    "--showserial",
    "--showuse",
    "--showtemp",
    "--showproductname",
    "--showbus",
    "--json",
];

/// AMD loader backed by `rocm-smi --json`
pub struct AmdLoader {
    runner: Arc<dyn CommandRunner>,
    smi_path: String,
}

impl AmdLoader {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self::with_path(runner, ROCM_SMI_PATH)
    }

    pub fn with_path<S: Into<String>>(runner: Arc<dyn CommandRunner>, smi_path: S) -> Self {
        Self {
            runner,
            smi_path: smi_path.into(),
        }
    }

    fn command(&self) -> ToolCommand {
        ToolCommand::new(self.smi_path.as_str()).env("PATH", ROCM_SMI_ENV_PATH)
    }
}

impl GpuInfoLoader for AmdLoader {
    fn load(&self) -> Result<GpuInfoList> {
        let cmd = self.command().args(QUERY_ARGS);
        let output = self.runner.run(&cmd)?;
        parse_rocm_smi(&output.stdout)
    }

    fn available(&self) -> bool {
        match self.runner.run(&self.command()) {
            Ok(_) => true,
            Err(e) => {
                log::debug!("rocm-smi probe failed: {}", e);
                false
            }
        }
    }

    fn vendor(&self) -> &'static str {
        "AMD"
    }
}

/// Parse `rocm-smi --json` output keyed by `card<N>`
///
/// Cards are returned in the order the tool printed them.
pub fn parse_rocm_smi(output: &[u8]) -> Result<GpuInfoList> {
    let cards: Map<String, Value> =
        serde_json::from_slice(output).map_err(|e| GpuError::parse("rocm-smi", e.to_string()))?;

    let mut gpu_infos = Vec::with_capacity(cards.len());
    for (card, fields) in cards {
        let index = card
            .strip_prefix("card")
            .unwrap_or(card.as_str())
            .parse::<usize>()
            .map_err(|e| {
                GpuError::parse("rocm-smi", format!("invalid card key {:?}: {}", card, e))
            })?;

        let mut info: GpuInfo = serde_json::from_value(fields)
            .map_err(|e| GpuError::parse("rocm-smi", format!("{}: {}", card, e)))?;
        info.index = index;
        trim_fields(&mut info);
        normalize_readings(&mut info);
        gpu_infos.push(info);
    }

    Ok(GpuInfoList::new(gpu_infos))
}

fn trim_fields(info: &mut GpuInfo) {
    for field in [
        &mut info.device_id,
        &mut info.device_rev,
        &mut info.temperature_edge,
        &mut info.temperature_junction,
        &mut info.temperature_memory,
        &mut info.average_power,
        &mut info.gpu_use,
        &mut info.serial_number,
        &mut info.vram_total,
        &mut info.vram_used,
        &mut info.card_series,
        &mut info.card_model,
        &mut info.card_vendor,
        &mut info.card_sku,
        &mut info.pci_bus,
    ] {
        let trimmed = field.trim();
        if trimmed.len() != field.len() {
            *field = trimmed.to_string();
        }
    }
}

/// Numeric readings the tool could not take ("N/A") become "0"
fn normalize_readings(info: &mut GpuInfo) {
    for field in [
        &mut info.temperature_edge,
        &mut info.temperature_junction,
        &mut info.temperature_memory,
        &mut info.average_power,
        &mut info.gpu_use,
        &mut info.vram_total,
        &mut info.vram_used,
    ] {
        *field = numeric_text(field.as_str());
    }
}
