//! DRM class directory reader.
//!
//! Enumerates `card<N>` entries under `/sys/class/drm` and reads the amdgpu
//! attributes exposed for each one. Missing or unreadable attributes read as
//! zero.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

pub const DRM_ROOT: &str = "/sys/class/drm";

/// Readings taken from one card's `device` directory
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrmStats {
    pub gpu_busy_percent: f64,
    pub vram_total: u64,
    pub vram_used: u64,
    /// Degrees Celsius, from hwmon temp1_input
    pub temp_edge: f64,
    /// temp2_input
    pub temp_junction: f64,
    /// temp3_input
    pub temp_memory: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrmCard {
    /// Entry name, e.g. `card0`
    pub name: String,
    /// PCI device id from `device/device`
    pub device_id: String,
    pub stats: DrmStats,
}

/// Sysfs view of a DRM class directory
#[derive(Debug, Clone)]
pub struct SysfsDrm {
    root: PathBuf,
}

impl Default for SysfsDrm {
    fn default() -> Self {
        Self::new(DRM_ROOT)
    }
}

impl SysfsDrm {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Names of every entry in the DRM directory, sorted
    pub fn entries(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    /// PCI device id of a card, empty when unreadable
    pub fn device_id(&self, card: &str) -> String {
        read_attribute(&self.root.join(card).join("device"), "device").unwrap_or_default()
    }

    /// Every card entry that is not a connector and has a device directory
    pub fn cards(&self) -> Result<Vec<DrmCard>> {
        let mut cards = Vec::new();

        for name in self.entries()? {
            if !name.starts_with("card") || name.contains('-') {
                continue;
            }

            let device_path = self.root.join(&name).join("device");
            if !device_path.is_dir() {
                log::debug!("DRM entry {} has no device directory", name);
                continue;
            }

            cards.push(DrmCard {
                device_id: self.device_id(&name),
                stats: read_stats(&device_path),
                name,
            });
        }

        Ok(cards)
    }
}

fn read_stats(device_path: &Path) -> DrmStats {
    let hwmon = find_hwmon(device_path);
    let temp = |sensor: &str| {
        hwmon
            .as_deref()
            .and_then(|dir| read_number::<f64>(dir, sensor))
            .map(|millidegrees| millidegrees / 1000.0)
            .unwrap_or(0.0)
    };

    DrmStats {
        gpu_busy_percent: read_number(device_path, "gpu_busy_percent").unwrap_or(0.0),
        vram_total: read_number(device_path, "mem_info_vram_total").unwrap_or(0),
        vram_used: read_number(device_path, "mem_info_vram_used").unwrap_or(0),
        temp_edge: temp("temp1_input"),
        temp_junction: temp("temp2_input"),
        temp_memory: temp("temp3_input"),
    }
}

/// First `hwmon/hwmon*` directory of a device
fn find_hwmon(device_path: &Path) -> Option<PathBuf> {
    let mut dirs: Vec<PathBuf> = fs::read_dir(device_path.join("hwmon"))
        .ok()?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    dirs.into_iter().next()
}

fn read_attribute(dir: &Path, name: &str) -> Option<String> {
    fs::read_to_string(dir.join(name))
        .ok()
        .map(|content| content.trim().to_string())
}

fn read_number<T: std::str::FromStr>(dir: &Path, name: &str) -> Option<T> {
    read_attribute(dir, name)?.parse::<T>().ok()
}
