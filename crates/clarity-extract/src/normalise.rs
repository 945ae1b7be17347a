//! OCR value corrections.
//!
//! Two best-effort fixes applied in order:
//! 1. **Missing decimal**: OCR often drops the point in values like "12.5",
//!    producing "125". When a value without a decimal point exceeds a normal
//!    band that tops out below 100, it is scaled back down.
//! 2. **Lakh**: counts written as "2.5 lakh" are multiplied by 100,000.
//!
//! Neither correction can fail; if its condition is not met the value is left as is.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::knowledge_base::BiomarkerDefinition;
use clarity_common::ExtractedMeasurement;

pub const LAKH: f64 = 100_000.0;

fn lakh_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\blakh\b").expect("lakh regex is valid"))
}

/// Apply both corrections and return the measurement with its value replaced.
pub fn normalize(measurement: &ExtractedMeasurement, definition: &BiomarkerDefinition) -> ExtractedMeasurement {
    let mut value = measurement.value;

    if !measurement.has_decimal() {
        if let Some(fixed) = correct_missing_decimal(value, definition.reference_high) {
            debug!("Decimal correction for {}: {} -> {}", definition.key, value, fixed);
            value = fixed;
        }
    }

    if lakh_regex().is_match(&measurement.context_window) {
        debug!("Lakh correction for {}: {} -> {}", definition.key, value, value * LAKH);
        value *= LAKH;
    }

    measurement.with_value(value)
}

/// Scaled value if the missing-decimal heuristic applies, else `None`.
fn correct_missing_decimal(value: f64, reference_high: Option<f64>) -> Option<f64> {
    let high = reference_high?;
    if high >= 100.0 || value <= high {
        return None;
    }

    if (100.0..1000.0).contains(&value) {
        Some(value / 10.0)
    } else if value >= 1000.0 {
        Some(value / 100.0)
    } else {
        None
    }
}
