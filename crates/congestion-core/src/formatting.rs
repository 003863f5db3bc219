/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use congestion_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let negative = value < 0.0;
    let abs_value = value.abs();

    // Nudge by a relative epsilon so exact decimal midpoints round up.
    let factor = 10_f64.powi(decimals as i32);
    let epsilon = f64::EPSILON * abs_value * factor;
    let rounded = ((abs_value * factor) + epsilon).round() / factor;

    let grouped = group_thousands(&(rounded.trunc() as u64).to_string());

    let result = if decimals == 0 {
        grouped
    } else {
        let frac_str = format!("{:.prec$}", rounded.fract(), prec = decimals as usize);
        // `frac_str` is "0.xx"; keep only ".xx".
        format!("{}{}", grouped, &frac_str[1..])
    };

    if negative && result.chars().any(|c| c != '0' && c != '.' && c != ',') {
        format!("-{}", result)
    } else {
        result
    }
}

/// Round half up (towards positive infinity), the rounding used for
/// histogram bin labels. `f64::round` would send `-2.5` to `-3`; this sends
/// it to `-2`.
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Label for a histogram bin spanning `[start, end)`, e.g. `"10-15"`.
///
/// ```
/// use congestion_core::formatting::format_bin_label;
///
/// assert_eq!(format_bin_label(9.6, 14.5), "10-15");
/// assert_eq!(format_bin_label(-2.5, 0.4), "-2-0");
/// ```
pub fn format_bin_label(start: f64, end: f64) -> String {
    format!(
        "{}-{}",
        round_half_up(start) as i64,
        round_half_up(end) as i64
    )
}

/// Label for a single statistic, one decimal place, e.g. `"Median: 12.3"`.
pub fn format_stat(name: &str, value: f64) -> String {
    format!("{}: {:.1}", name, value)
}

/// Calculate `(part / whole) * 100`, rounded to `decimal_places`.
///
/// Returns `0.0` if `whole` is zero.
pub fn percentage(part: f64, whole: f64, decimal_places: u32) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    let raw = (part / whole) * 100.0;
    let factor = 10_f64.powi(decimal_places as i32);
    (raw * factor).round() / factor
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = s.len() % 3;
    for (i, c) in s.chars().enumerate() {
        if i != 0 && i % 3 == remainder {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
