use std::time::Duration;

/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use bikeshare_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let negative = value < 0.0;
    let factor = 10_f64.powi(decimals as i32);
    let rounded = (value.abs() * factor).round() / factor;

    let integer_part = rounded.trunc() as u64;
    let grouped = group_thousands(&integer_part.to_string());

    let result = if decimals == 0 {
        grouped
    } else {
        let frac_str = format!(
            "{:.prec$}",
            rounded - rounded.trunc(),
            prec = decimals as usize
        );
        // "0.50" -> ".50"
        format!("{}{}", grouped, &frac_str[1..])
    };

    if negative && rounded != 0.0 {
        format!("-{}", result)
    } else {
        result
    }
}

/// Render a number of seconds as days/hours/minutes/seconds.
///
/// Zero-valued leading units are dropped; seconds are always shown.
///
/// # Examples
///
/// ```
/// use bikeshare_core::formatting::format_seconds;
///
/// assert_eq!(format_seconds(45.0), "45s");
/// assert_eq!(format_seconds(3_725.0), "1h 2m 5s");
/// assert_eq!(format_seconds(90_061.0), "1d 1h 1m 1s");
/// ```
pub fn format_seconds(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let secs = total % 60;

    let mut parts = Vec::with_capacity(4);
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if days > 0 || hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if days > 0 || hours > 0 || minutes > 0 {
        parts.push(format!("{}m", minutes));
    }
    parts.push(format!("{}s", secs));
    parts.join(" ")
}

/// Wall-clock time of a statistic query, in seconds to five decimals.
pub fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.5}", elapsed.as_secs_f64())
}

/// Start hour rendered as a clock time, e.g. `17` → `"17:00"`.
pub fn format_hour(hour: u32) -> String {
    format!("{}:00", hour)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
