//! Shared helper functions for CLI commands
//!
//! Number formatting lives here so every report rounds the same way.

use crate::core::component::Mtbf;

/// Format an MTBF in hours with `precision` decimals (`∞` for the sentinel)
pub fn format_hours(mtbf: Mtbf, precision: usize) -> String {
    format!("{:.*}", precision, mtbf)
}

/// Format a failure rate (failures/hour)
///
/// Rates below 1e-4 switch to scientific notation so they stay readable.
pub fn format_rate(rate: f64) -> String {
    if rate != 0.0 && rate.abs() < 1e-4 {
        format!("{:.4e}", rate)
    } else {
        format!("{:.6}", rate)
    }
}

/// Format a probability in [0, 1]
pub fn format_probability(p: f64) -> String {
    format!("{:.4}", p)
}

/// Format a probability as a percentage
pub fn format_percent(p: f64) -> String {
    format!("{:.2}%", p * 100.0)
}

/// Truncate a string to `max_len` characters, marking the cut with "…"
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 1 {
        s.chars().take(max_len).collect()
    } else {
        format!("{}…", s.chars().take(max_len - 1).collect::<String>())
    }
}

/// Parse a `key=value` pair from `--param`
pub fn parse_key_value(s: &str) -> Result<(String, f64), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing parameter name in '{}'", s));
    }
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", value.trim()))?;
    Ok((key.to_string(), value))
}
