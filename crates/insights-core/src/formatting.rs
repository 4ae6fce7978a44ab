/// `part / whole * 100`, or `0.0` when `whole` is zero.
///
/// Never returns NaN or infinity, so it is safe for empty datasets.
///
/// # Examples
///
/// ```
/// use insights_core::formatting::share_percent;
///
/// assert!((share_percent(2, 3) - 66.666_666).abs() < 1e-5);
/// assert_eq!(share_percent(5, 0), 0.0);
/// ```
pub fn share_percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 / whole as f64) * 100.0
}

/// Round `value` to `places` decimal places.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10_f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Render a percentage with one decimal place, e.g. `"66.7%"`.
///
/// ```
/// use insights_core::formatting::format_percent;
///
/// assert_eq!(format_percent(66.666), "66.7%");
/// assert_eq!(format_percent(0.0), "0.0%");
/// ```
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", round_to(value, 1))
}

/// Render a count with thousands separators.
///
/// ```
/// use insights_core::formatting::format_count;
///
/// assert_eq!(format_count(1_234_567), "1,234,567");
/// assert_eq!(format_count(42), "42");
/// ```
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let lead = digits.len() % 3;
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i != 0 && i % 3 == lead {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Shorten `text` to at most `max_chars` characters, marking the cut with `…`.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(1);
    let mut out: String = text.chars().take(keep).collect();
    out.push('…');
    out
}
