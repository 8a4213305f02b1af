use crate::core::telemetry::Registry;
use crate::ui::availability_label;
use anyhow::Result;
use colored::Colorize;

/// Print every registered adapter and whether its tool can be used here
pub fn execute(registry: &Registry) -> Result<()> {
    if registry.is_empty() {
        println!("{}", "No GPU loaders registered (all vendors disabled?)".yellow());
        return Ok(());
    }

    println!("{}", "GPU loaders".bold());
    for loader in registry.all() {
        let driver = if loader.driver_info_provider().is_some() {
            " (driver info)".dimmed().to_string()
        } else {
            String::new()
        };
        println!(
            "  {:<10} {}{}",
            loader.vendor(),
            availability_label(loader.available()),
            driver
        );
    }

    Ok(())
}
