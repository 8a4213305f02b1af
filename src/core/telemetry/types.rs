use serde::{Deserialize, Serialize};

/// Canonical, vendor-neutral telemetry for one accelerator
///
/// Every numeric field is kept as text so the precision reported by the
/// vendor tool survives normalization. Memory fields always hold bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpuInfo {
    #[serde(rename = "num")]
    pub index: usize,
    #[serde(rename = "Device ID")]
    pub device_id: String,
    #[serde(rename = "Device Rev")]
    pub device_rev: String,
    #[serde(rename = "Temperature (Sensor edge) (C)")]
    pub temperature_edge: String,
    #[serde(rename = "Temperature (Sensor junction) (C)")]
    pub temperature_junction: String,
    #[serde(rename = "Temperature (Sensor memory) (C)")]
    pub temperature_memory: String,
    #[serde(rename = "Average Graphics Package Power (W)")]
    pub average_power: String,
    #[serde(rename = "GPU use (%)")]
    pub gpu_use: String,
    #[serde(rename = "Serial Number")]
    pub serial_number: String,
    #[serde(rename = "VRAM Total Memory (B)")]
    pub vram_total: String,
    #[serde(rename = "VRAM Total Used Memory (B)")]
    pub vram_used: String,
    #[serde(rename = "Card series")]
    pub card_series: String,
    #[serde(rename = "Card model")]
    pub card_model: String,
    #[serde(rename = "Card vendor")]
    pub card_vendor: String,
    #[serde(rename = "Card SKU")]
    pub card_sku: String,
    #[serde(rename = "PCI Bus")]
    pub pci_bus: String,
}

impl Default for GpuInfo {
    fn default() -> Self {
        let zero = || "0".to_string();
        Self {
            index: 0,
            device_id: String::new(),
            device_rev: String::new(),
            temperature_edge: zero(),
            temperature_junction: zero(),
            temperature_memory: zero(),
            average_power: zero(),
            gpu_use: zero(),
            serial_number: String::new(),
            vram_total: zero(),
            vram_used: zero(),
            card_series: String::new(),
            card_model: String::new(),
            card_vendor: String::new(),
            card_sku: String::new(),
            pci_bus: String::new(),
        }
    }
}

impl GpuInfo {
    /// Record seeded with defaults for the given index
    pub fn with_index(index: usize) -> Self {
        Self {
            index,
            ..Default::default()
        }
    }

    /// Set all three temperature sensors to the same reading
    pub fn set_temperatures(&mut self, value: &str) {
        self.temperature_edge = value.to_string();
        self.temperature_junction = value.to_string();
        self.temperature_memory = value.to_string();
    }
}

/// Snapshot of every device reported by one poll of one adapter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GpuInfoList {
    #[serde(rename = "GPUInfos")]
    pub gpu_infos: Vec<GpuInfo>,
}

impl GpuInfoList {
    pub fn new(gpu_infos: Vec<GpuInfo>) -> Self {
        Self { gpu_infos }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.gpu_infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gpu_infos.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GpuInfo> {
        self.gpu_infos.iter()
    }
}

impl From<Vec<GpuInfo>> for GpuInfoList {
    fn from(gpu_infos: Vec<GpuInfo>) -> Self {
        Self { gpu_infos }
    }
}

impl IntoIterator for GpuInfoList {
    type Item = GpuInfo;
    type IntoIter = std::vec::IntoIter<GpuInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.gpu_infos.into_iter()
    }
}

/// Information about an installed GPU driver stack
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GpuDriverInfo {
    /// GPU vendor (e.g. NVIDIA)
    pub vendor: String,
    /// Driver version (e.g. "535.113.01")
    pub version: String,
    pub installed: bool,
    /// Where the vendor tool was found, empty if unknown
    pub install_path: String,
    /// Version of the client utility (e.g. nvidia-smi)
    pub client_version: String,
    /// Version of the driver library (e.g. CUDA)
    pub lib_version: String,
    pub driver_date: String,
    pub kernel_module: String,
    pub module_loaded: bool,
    pub driver_type: String,
}
