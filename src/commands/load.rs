use crate::core::telemetry::{collect_all, GpuInfo, Registry, VendorReport};
use crate::ui::{format_reading, format_vram};
use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::{Map, Value};

/// Load telemetry from every available adapter, or from the named one
///
/// A failing adapter is reported and the others are still printed.
pub fn execute(registry: &Registry, vendor: Option<&str>, json: bool) -> Result<()> {
    let reports = match vendor {
        Some(name) => {
            let loader = registry
                .find(name)
                .with_context(|| format!("Unknown or disabled vendor: {}", name))?;
            vec![VendorReport {
                vendor: loader.vendor(),
                available: loader.available(),
                result: Some(loader.load()),
            }]
        }
        None => collect_all(registry),
    };

    for report in &reports {
        if let Some(Err(e)) = &report.result {
            eprintln!("{} {}: {}", "✗".red(), report.vendor, e);
        }
    }

    if json {
        println!("{}", render_json(&reports)?);
        return Ok(());
    }

    let mut printed = 0;
    for report in &reports {
        let Some(list) = report.snapshot() else {
            continue;
        };
        if list.is_empty() {
            continue;
        }

        println!("{}", report.vendor.bold());
        for gpu in list.iter() {
            print_gpu(gpu);
        }
        printed += list.len();
    }

    if printed == 0 {
        println!("{}", "No GPU devices found".yellow());
    }

    Ok(())
}

/// Snapshots keyed by vendor, in registration order
pub fn render_json(reports: &[VendorReport]) -> Result<String> {
    let mut out = Map::new();
    for report in reports {
        if let Some(list) = report.snapshot() {
            out.insert(
                report.vendor.to_string(),
                serde_json::to_value(list).context("Failed to serialize GPU list")?,
            );
        }
    }
    serde_json::to_string_pretty(&Value::Object(out)).context("Failed to serialize report")
}

fn print_gpu(gpu: &GpuInfo) {
    let name = if gpu.card_model.is_empty() {
        gpu.device_id.as_str()
    } else {
        gpu.card_model.as_str()
    };
    println!("  [{}] {} {}", gpu.index, name.cyan(), gpu.pci_bus.dimmed());
    println!(
        "      temp {} / {} / {}  use {}  power {}",
        format_reading(&gpu.temperature_edge, " °C"),
        format_reading(&gpu.temperature_junction, " °C"),
        format_reading(&gpu.temperature_memory, " °C"),
        format_reading(&gpu.gpu_use, "%"),
        format_reading(&gpu.average_power, " W"),
    );
    println!(
        "      vram {} / {}",
        format_vram(&gpu.vram_used),
        format_vram(&gpu.vram_total)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::telemetry::GpuInfoList;
    use crate::error::GpuError;

    #[test]
    fn test_render_json_skips_failed_and_unavailable() {
        let reports = vec![
            VendorReport {
                vendor: "NVIDIA",
                available: true,
                result: Some(Ok(GpuInfoList::new(vec![GpuInfo::with_index(0)]))),
            },
            VendorReport {
                vendor: "AMD",
                available: true,
                result: Some(Err(GpuError::execution("rocm-smi", "exit status: 2"))),
            },
            VendorReport {
                vendor: "CPU",
                available: false,
                result: None,
            },
        ];

        let json = render_json(&reports).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert_eq!(value["NVIDIA"]["GPUInfos"][0]["num"], 0);
    }
}
