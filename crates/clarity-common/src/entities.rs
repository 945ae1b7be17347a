//! Value objects produced by the extraction pipeline.
//! Measurements are intermediate; findings are the terminal output handed to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Classification outcome for a single biomarker value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Low,
    Normal,
    High,
    Borderline,
}

impl Status {
    /// Key used in knowledge base explanation mappings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Low => "low",
            Status::Normal => "normal",
            Status::High => "high",
            Status::Borderline => "borderline",
        }
    }

    /// Capitalised label for display, e.g. "Borderline".
    pub fn label(&self) -> &'static str {
        match self {
            Status::Low => "Low",
            Status::Normal => "Normal",
            Status::High => "High",
            Status::Borderline => "Borderline",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Extracted measurement
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedMeasurement {
    pub biomarker_key: String,
    pub value: f64,
    /// Numeric token exactly as it appeared in the text, e.g. "1,234.5"
    pub raw_token: String,
    pub matched_alias_text: String,
    /// Text following the alias that the value was read from.
    pub context_window: String,
}

impl ExtractedMeasurement {
    /// True if the OCR token carried a decimal point.
    pub fn has_decimal(&self) -> bool {
        self.raw_token.contains('.')
    }

    /// Copy of this measurement with only the value replaced.
    pub fn with_value(&self, value: f64) -> Self {
        Self { value, ..self.clone() }
    }
}

// ---------------------------------------------------------------------------
// Interpreted finding
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpretedFinding {
    pub display_name: String,
    pub value: f64,
    pub unit: String,
    pub status: Status,
    pub explanation: String,
    pub biomarker_key: String,
    pub timestamp: DateTime<Utc>,
}
