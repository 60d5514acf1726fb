//! Prometheus text exposition readback
//!
//! Both Prometheus-flavoured backends can render their state as text. Summing
//! the samples of one series name is enough to verify operation counts.

use meterbench_domain::{MeterBenchError, Result};

/// Sum every sample of `name` (or `name_total`) across all label sets.
///
/// Comment lines are skipped. Returns `Ok(None)` when no sample matches.
///
/// # Errors
/// Returns `MeterBenchError::Readback` if a matching sample has no value or
/// the value is not a number.
pub fn sum_samples(text: &str, name: &str) -> Result<Option<f64>> {
    let mut total = None;

    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let series = line.split(['{', ' ', '\t']).next().unwrap_or_default();
        if series != name && series.strip_suffix("_total") != Some(name) {
            continue;
        }

        let raw = line
            .rsplit([' ', '\t'])
            .next()
            .filter(|token| !token.is_empty() && !token.ends_with('}'))
            .ok_or_else(|| MeterBenchError::Readback(format!("sample without value: {line}")))?;
        let value: f64 = raw
            .parse()
            .map_err(|e| MeterBenchError::Readback(format!("invalid sample '{raw}': {e}")))?;

        *total.get_or_insert(0.0) += value;
    }

    Ok(total)
}

/// Convert a summed `_count` series into an observation count.
// Counts are exact integers well below 2^53.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn sample_count(total: Option<f64>) -> Option<u64> {
    total.map(|count| count.max(0.0).round() as u64)
}
