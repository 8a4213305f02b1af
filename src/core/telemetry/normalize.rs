//! Value and unit normalization shared by every adapter.
//!
//! All helpers are lenient: anything they cannot read confidently becomes
//! `"0"` instead of an error.

pub const KIB: f64 = 1024.0;
pub const MIB: f64 = 1024.0 * 1024.0;
pub const GIB: f64 = 1024.0 * 1024.0 * 1024.0;
pub const TIB: f64 = 1024.0 * 1024.0 * 1024.0 * 1024.0;

const INTEGER_EPSILON: f64 = 1e-6;

/// A value is present when it is non-empty after trimming and not "N/A"
pub fn is_present(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty() && !trimmed.eq_ignore_ascii_case("N/A")
}

/// First whitespace-separated token of a present value
pub fn first_token(value: &str) -> Option<&str> {
    if !is_present(value) {
        return None;
    }
    value.split_whitespace().next()
}

/// Parse the leading token as a float, tolerating a leading '+'
pub fn parse_leading_f64(value: &str) -> Option<f64> {
    first_token(value)?.trim_start_matches('+').parse::<f64>().ok()
}

/// Parse the leading token as an integer
pub fn parse_leading_i64(value: &str) -> Option<i64> {
    first_token(value)?.parse::<i64>().ok()
}

/// Format a float as an integer when it is one, else with up to two decimals
pub fn format_number(num: f64) -> String {
    if (num - num.round()).abs() < INTEGER_EPSILON {
        return format!("{}", num.round() as i64);
    }
    let fixed = format!("{:.2}", num);
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Normalize a numeric reading such as "53 C", "6.29 W" or "N/A"
pub fn parse_numeric_field(value: &str) -> String {
    match parse_leading_f64(value) {
        Some(num) => format_number(num),
        None => "0".to_string(),
    }
}

/// Fixed-decimal formatting used by adapters that report floats directly
pub fn format_fixed(num: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, num)
}

/// Byte multiplier for a size unit such as "MiB", "KB" or "GBs"
pub fn unit_multiplier(unit: &str) -> f64 {
    let unit = unit.to_uppercase();
    let unit = unit.trim_end_matches('S');
    match unit {
        "" | "B" => 1.0,
        "KB" | "KIB" => KIB,
        "MB" | "MIB" => MIB,
        "GB" | "GIB" => GIB,
        "TB" | "TIB" => TIB,
        other if other.contains("IB") => {
            if other.starts_with('K') {
                KIB
            } else if other.starts_with('M') {
                MIB
            } else if other.starts_with('G') {
                GIB
            } else {
                1.0
            }
        }
        _ => 1.0,
    }
}

/// Convert "32768 MiB", "1024 KB" or a bare byte count to a byte count
pub fn convert_size_to_bytes(value: &str) -> String {
    if !is_present(value) {
        return "0".to_string();
    }
    let mut fields = value.split_whitespace();
    let num = match fields.next().and_then(|f| f.parse::<f64>().ok()) {
        Some(num) => num,
        None => return "0".to_string(),
    };
    let multiplier = fields.next().map(unit_multiplier).unwrap_or(1.0);
    format!("{}", (num * multiplier).round() as i64)
}

/// Leading value in MiB converted to bytes, "0" when unreadable
pub fn mib_to_bytes(value: &str) -> String {
    match parse_leading_f64(value) {
        Some(mib) => format!("{}", (mib * MIB).round() as i64),
        None => "0".to_string(),
    }
}

/// Integer KiB converted to bytes, "0" when the product overflows
pub fn kib_to_bytes(kib: i64) -> String {
    match kib.checked_mul(1024) {
        Some(bytes) => bytes.to_string(),
        None => "0".to_string(),
    }
}

/// Integer MiB converted to bytes, 0 when the product overflows
pub fn mib_to_bytes_i64(mib: i64) -> i64 {
    mib.checked_mul(MIB as i64).unwrap_or(0)
}

/// Leading token kept as the tool printed it when it reads as a number
///
/// "44.00 °C" stays "44.00"; "N/A", empty and non-numeric text become "0".
pub fn numeric_text(value: &str) -> String {
    match first_token(value) {
        Some(token)
            if token
                .trim_start_matches('+')
                .parse::<f64>()
                .map(f64::is_finite)
                .unwrap_or(false) =>
        {
            token.to_string()
        }
        _ => "0".to_string(),
    }
}

/// Leading value truncated to an integer, "0" when unreadable
pub fn truncate_to_integer(value: &str) -> String {
    match parse_leading_f64(value) {
        Some(num) => format!("{}", num.trunc() as i64),
        None => "0".to_string(),
    }
}

/// Trimmed value, or `fallback` when the value is absent
pub fn or_default(value: &str, fallback: &str) -> String {
    if is_present(value) {
        value.trim().to_string()
    } else {
        fallback.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presence() {
        assert!(is_present("12"));
        assert!(!is_present("   "));
        assert!(!is_present("n/a"));
        assert!(!is_present(" N/A "));
    }

    #[test]
    fn test_format_number_near_integer() {
        assert_eq!(format_number(53.0), "53");
        assert_eq!(format_number(52.9999999), "53");
        assert_eq!(format_number(6.29), "6.29");
        assert_eq!(format_number(6.5), "6.5");
        assert_eq!(format_number(6.123), "6.12");
        assert_eq!(format_number(-3.0), "-3");
    }

    #[test]
    fn test_parse_numeric_field() {
        assert_eq!(parse_numeric_field("53 C"), "53");
        assert_eq!(parse_numeric_field("6.29 W"), "6.29");
        assert_eq!(parse_numeric_field("+41.50"), "41.5");
        assert_eq!(parse_numeric_field("N/A"), "0");
        assert_eq!(parse_numeric_field(""), "0");
        assert_eq!(parse_numeric_field("hot"), "0");
    }

    #[test]
    fn test_size_conversion() {
        assert_eq!(convert_size_to_bytes("1 MiB"), "1048576");
        assert_eq!(convert_size_to_bytes("1 KiB"), "1024");
        assert_eq!(convert_size_to_bytes("1 KB"), "1024");
        assert_eq!(convert_size_to_bytes("2 GiB"), "2147483648");
        assert_eq!(convert_size_to_bytes("512"), "512");
        assert_eq!(convert_size_to_bytes("32768 MiBs"), "34359738368");
        assert_eq!(convert_size_to_bytes("N/A"), "0");
        assert_eq!(convert_size_to_bytes("lots MiB"), "0");
    }

    #[test]
    fn test_mib_and_kib_helpers() {
        assert_eq!(mib_to_bytes("1 MiB"), "1048576");
        assert_eq!(mib_to_bytes("27780 MiB"), "29129441280");
        assert_eq!(mib_to_bytes("N/A"), "0");
        assert_eq!(kib_to_bytes(1), "1024");
        assert_eq!(kib_to_bytes(67108864), "68719476736");
        assert_eq!(kib_to_bytes(99999999999999999), "0");
        assert_eq!(mib_to_bytes_i64(16376), 17171480576);
        assert_eq!(mib_to_bytes_i64(99999999999999), 0);
    }

    #[test]
    fn test_numeric_text_keeps_tool_precision() {
        assert_eq!(numeric_text("44.00 °C"), "44.00");
        assert_eq!(numeric_text(" 0.0 "), "0.0");
        assert_eq!(numeric_text("+41"), "+41");
        assert_eq!(numeric_text("N/A"), "0");
        assert_eq!(numeric_text(""), "0");
        assert_eq!(numeric_text("hot C"), "0");
        assert_eq!(numeric_text("nan"), "0");
    }

    #[test]
    fn test_truncate_and_fallback() {
        assert_eq!(truncate_to_integer("44 C"), "44");
        assert_eq!(truncate_to_integer("44.7 C"), "44");
        assert_eq!(truncate_to_integer("N/A"), "0");
        assert_eq!(or_default(" Goldwasser ", "Denglin"), "Goldwasser");
        assert_eq!(or_default("N/A", "Denglin"), "Denglin");
        assert_eq!(format_fixed(41.0, 1), "41.0");
        assert_eq!(format_fixed(36.256, 2), "36.26");
    }
}
