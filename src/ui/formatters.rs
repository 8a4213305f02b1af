use colored::{ColoredString, Colorize};
use humansize::{format_size, BINARY};

/// Byte count as reported by an adapter, shown in binary units
///
/// Values that are not a byte count are returned unchanged.
pub fn format_vram(bytes: &str) -> String {
    match bytes.trim().parse::<u64>() {
        Ok(n) => format_size(n, BINARY),
        Err(_) => bytes.to_string(),
    }
}

/// Normalized reading followed by its unit, e.g. "44 °C"
pub fn format_reading(value: &str, unit: &str) -> String {
    if value.is_empty() {
        return "-".to_string();
    }
    format!("{}{}", value, unit)
}

pub fn availability_label(available: bool) -> ColoredString {
    if available {
        "available".green()
    } else {
        "not available".dimmed()
    }
}
