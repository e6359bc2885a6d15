//! Text formatting of statistic values. None of these functions fail.

use cgmath::Vector3;

const BYTE_UNITS: [&str; 9] = ["Bytes", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Renders a byte count with 1024-based units, e.g. `1536` -> `"1.5 KB"`.
///
/// The value is rounded to `decimals` places and trailing zeros are dropped,
/// so `1024` becomes `"1 KB"`. Zero, negative and non-finite input all render
/// as `"0 Bytes"`.
pub fn format_bytes(bytes: f64, decimals: usize) -> String {
    if !bytes.is_finite() || bytes <= 0.0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes;
    let mut unit = 0;
    while value >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{} {}", trim_fixed(value, decimals), BYTE_UNITS[unit])
}

fn trim_fixed(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value);
    if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        fixed
    }
}

/// `"W x H x D"` with two decimals per axis.
pub fn format_dimensions(size: Vector3<f32>) -> String {
    format!("{:.2} x {:.2} x {:.2}", size.x, size.y, size.z)
}

/// Integer with digit grouping, e.g. `1234567` -> `"1,234,567"`.
pub fn format_count(count: u64, separator: char) -> String {
    let digits = count.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(digit);
    }
    grouped
}

/// Rounds an accumulated triangle count and groups its digits. Values that
/// are not a valid count come back as `None`.
pub fn format_triangles(triangles: f64, separator: char) -> Option<String> {
    if !triangles.is_finite() || triangles < 0.0 {
        return None;
    }
    Some(format_count(triangles.round() as u64, separator))
}
