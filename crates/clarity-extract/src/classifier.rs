//! Status classification against a [`RangeRule`].
//!
//! Every `<=` cutoff is inclusive toward the less severe category, so a value
//! sitting exactly on a boundary gets the lower classification.

use crate::knowledge_base::BiomarkerDefinition;
use crate::range_rule::RangeRule;
use clarity_common::Status;

/// Random glucose readings below this are classified as low.
pub const RANDOM_LOW_CUTOFF: f64 = 70.0;

pub const NO_EXPLANATION: &str = "No explanation available.";

/// Classify `value` under `rule`.
pub fn classify(value: f64, rule: &RangeRule) -> Status {
    match *rule {
        // female band is carried but not evaluated: there is no sex input
        RangeRule::SexSpecific { male, .. } => banded(value, male.low, male.high),
        RangeRule::SingleBand { low, high } => banded(value, low, high),
        RangeRule::DesirableBorderline { desirable, borderline } => {
            if value < desirable {
                Status::Normal
            } else if value <= borderline {
                Status::Borderline
            } else {
                Status::High
            }
        }
        RangeRule::OptimalNearOptimalBorderline { optimal, near_optimal, borderline } => {
            if value < optimal {
                Status::Low
            } else if value <= near_optimal {
                Status::Normal
            } else if value <= borderline {
                Status::Borderline
            } else {
                Status::High
            }
        }
        RangeRule::RandomThreshold { threshold } => banded(value, RANDOM_LOW_CUTOFF, threshold),
    }
}

/// Like [`classify`], but a missing rule is treated as normal.
pub fn status_for(value: f64, rule: Option<&RangeRule>) -> Status {
    rule.map_or(Status::Normal, |r| classify(value, r))
}

/// Explanation text for `status`, or [`NO_EXPLANATION`].
pub fn explanation_for(definition: &BiomarkerDefinition, status: Status) -> String {
    definition
        .explanations
        .get(status.as_str())
        .cloned()
        .unwrap_or_else(|| NO_EXPLANATION.to_string())
}

fn banded(value: f64, low: f64, high: f64) -> Status {
    if value < low {
        Status::Low
    } else if value > high {
        Status::High
    } else {
        Status::Normal
    }
}
