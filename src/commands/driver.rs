use crate::core::telemetry::{GpuDriverInfo, Registry};
use anyhow::{Context, Result};
use colored::Colorize;

/// Print driver information from every adapter that can report it
pub fn execute(registry: &Registry, json: bool) -> Result<()> {
    let mut infos: Vec<GpuDriverInfo> = Vec::new();

    for loader in registry.all() {
        let Some(provider) = loader.driver_info_provider() else {
            continue;
        };
        match provider.driver_info() {
            Ok(info) => infos.push(info),
            Err(e) => log::warn!("{} driver info unavailable: {}", loader.vendor(), e),
        }
    }

    if json {
        let out = serde_json::to_string_pretty(&infos).context("Failed to serialize driver info")?;
        println!("{}", out);
        return Ok(());
    }

    if infos.is_empty() {
        println!("{}", "No driver information available".yellow());
        return Ok(());
    }

    for info in &infos {
        println!("{}", info.vendor.bold());
        println!("  driver   {}", info.version);
        println!("  client   {}", info.client_version);
        println!("  library  {}", info.lib_version);
        if !info.install_path.is_empty() {
            println!("  path     {}", info.install_path.dimmed());
        }
        if !info.kernel_module.is_empty() {
            let state = if info.module_loaded {
                "loaded".green()
            } else {
                "not loaded".red()
            };
            println!("  module   {} ({})", info.kernel_module, state);
        }
    }

    Ok(())
}
