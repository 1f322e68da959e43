//! Number formatting for the terminal report. Missing values always
//! render as `N/A`.

use analysis_core::Metric;

/// Dollar amounts with B/M suffixes above a million, thousands
/// separators below.
pub fn format_currency(value: Metric<f64>) -> String {
    match value.as_f64() {
        None => "N/A".to_string(),
        Some(v) if v.abs() >= 1e9 => format!("${:.2}B", v / 1e9),
        Some(v) if v.abs() >= 1e6 => format!("${:.2}M", v / 1e6),
        Some(v) => format!("${}", group_thousands(v)),
    }
}

/// Fractional rates rendered as percentages, two decimals.
pub fn format_percentage(value: Metric<f64>) -> String {
    match value.as_f64() {
        Some(v) => format!("{:.2}%", v * 100.0),
        None => "N/A".to_string(),
    }
}

/// Scores (and already-percent figures) at one decimal.
pub fn format_score(value: Metric<f64>) -> String {
    match value.as_f64() {
        Some(v) => format!("{:.1}", v),
        None => "N/A".to_string(),
    }
}

/// Values already expressed in percentage points (e.g. undervaluation),
/// one decimal plus the sign.
pub fn format_percent_points(value: Metric<f64>) -> String {
    match value.as_f64() {
        Some(v) => format!("{:.1}%", v),
        None => "N/A".to_string(),
    }
}

/// Plain two-decimal rendering for ratios.
pub fn format_general(value: Metric<f64>) -> String {
    match value.as_f64() {
        Some(v) => format!("{:.2}", v),
        None => "N/A".to_string(),
    }
}

/// Round to a whole number and insert comma separators.
fn group_thousands(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if rounded < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}
