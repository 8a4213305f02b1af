use crate::core::telemetry::normalize::format_fixed;
use crate::core::telemetry::{GpuInfo, GpuInfoList, GpuInfoLoader};
use crate::error::{GpuError, Result};
use crate::platform::drm::{DrmCard, SysfsDrm};

use super::Platform;

/// AMD loader for RISC-V hosts, reading amdgpu sysfs attributes directly
pub struct AmdRiscvLoader {
    drm: SysfsDrm,
    platform: Platform,
}

impl AmdRiscvLoader {
    pub fn new(drm: SysfsDrm) -> Self {
        Self::with_platform(drm, Platform::current())
    }

    pub fn with_platform(drm: SysfsDrm, platform: Platform) -> Self {
        Self { drm, platform }
    }
}

impl GpuInfoLoader for AmdRiscvLoader {
    fn load(&self) -> Result<GpuInfoList> {
        let cards = self.drm.cards().map_err(|e| {
            GpuError::execution(self.drm.root().display().to_string(), e.to_string())
        })?;

        let gpu_infos = cards
            .iter()
            .map(card_to_info)
            .collect::<Result<Vec<_>>>()?;
        Ok(GpuInfoList::new(gpu_infos))
    }

    fn available(&self) -> bool {
        if !self.platform.is("linux", "riscv64") {
            log::info!(
                "AMD-riscv unavailable on {}/{}",
                self.platform.os,
                self.platform.arch
            );
            return false;
        }

        let entries = match self.drm.entries() {
            Ok(entries) => entries,
            Err(e) => {
                log::info!("AMD-riscv cannot list {}: {}", self.drm.root().display(), e);
                return false;
            }
        };
        if !entries.iter().any(|name| name == "card0") {
            log::info!("AMD-riscv found no card0 in {:?}", entries);
            return false;
        }

        let device_id = self.drm.device_id("card0");
        if device_id.is_empty() {
            log::info!("AMD-riscv card0 reports no device id");
            return false;
        }

        log::info!("AMD-riscv card0 device {}", device_id);
        true
    }

    fn vendor(&self) -> &'static str {
        "AMD-riscv"
    }
}

fn card_to_info(card: &DrmCard) -> Result<GpuInfo> {
    let index = card
        .name
        .strip_prefix("card")
        .unwrap_or(card.name.as_str())
        .parse::<usize>()
        .map_err(|e| GpuError::parse("drm", format!("invalid card name {:?}: {}", card.name, e)))?;

    let stats = &card.stats;
    Ok(GpuInfo {
        device_id: card.device_id.clone(),
        serial_number: card.device_id.clone(),
        card_series: card.device_id.clone(),
        temperature_edge: format_fixed(stats.temp_edge, 2),
        temperature_junction: format_fixed(stats.temp_junction, 2),
        temperature_memory: format_fixed(stats.temp_memory, 2),
        gpu_use: format_fixed(stats.gpu_busy_percent, 2),
        vram_total: stats.vram_total.to_string(),
        vram_used: stats.vram_used.to_string(),
        ..GpuInfo::with_index(index)
    })
}
