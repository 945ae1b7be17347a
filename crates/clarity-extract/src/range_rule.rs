//! Reference-range schemas.
//!
//! Knowledge base documents describe ranges in five different shapes. They are
//! decoded once, at load time, into a single [`RangeRule`] variant so that the
//! classifier never has to guess which shape it was given.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// A closed reference band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub low: f64,
    pub high: f64,
}

impl Band {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }
}

/// Classification schema for one biomarker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RangeRule {
    /// Separate male and female bands. Only the male band is evaluated.
    SexSpecific { male: Band, female: Band },
    /// Generic "normal" band.
    SingleBand { low: f64, high: f64 },
    /// Below `desirable` is normal, up to `borderline` is borderline, above is high.
    DesirableBorderline { desirable: f64, borderline: f64 },
    /// Lipid-style ladder: low / normal / borderline / high.
    OptimalNearOptimalBorderline { optimal: f64, near_optimal: f64, borderline: f64 },
    /// Random glucose style: below 70 is low, above `threshold` is high.
    RandomThreshold { threshold: f64 },
}

impl RangeRule {
    pub fn kind(&self) -> &'static str {
        match self {
            RangeRule::SexSpecific { .. } => "sex_specific",
            RangeRule::SingleBand { .. } => "single_band",
            RangeRule::DesirableBorderline { .. } => "desirable_borderline",
            RangeRule::OptimalNearOptimalBorderline { .. } => "optimal_near_optimal_borderline",
            RangeRule::RandomThreshold { .. } => "random_threshold",
        }
    }

    /// Upper bound of the clinically normal band, where the schema has one.
    pub fn reference_high(&self) -> Option<f64> {
        match self {
            RangeRule::SexSpecific { male, .. } => Some(male.high),
            RangeRule::SingleBand { high, .. } => Some(*high),
            _ => None,
        }
    }

    /// Decode the loosely-shaped `ranges` object of a knowledge base document.
    ///
    /// Shapes are tried in a fixed precedence order; `None` means no shape was
    /// complete enough to classify with.
    pub fn from_raw(raw: &RawRanges) -> Option<Self> {
        if let (Some(male), Some(female)) = (raw.male.and_then(RawBand::complete), raw.female.and_then(RawBand::complete)) {
            return Some(RangeRule::SexSpecific { male, female });
        }

        if let Some(normal) = raw.normal {
            if let (Some(low), Some(high)) = (normal.low, normal.high) {
                return Some(RangeRule::SingleBand { low, high });
            }
        }

        if let (Some(desirable), Some(borderline)) = (raw.desirable, raw.borderline) {
            return Some(RangeRule::DesirableBorderline { desirable, borderline });
        }

        if let (Some(optimal), Some(near_optimal), Some(borderline)) = (raw.optimal, raw.near_optimal, raw.borderline) {
            return Some(RangeRule::OptimalNearOptimalBorderline { optimal, near_optimal, borderline });
        }

        if let Some(threshold) = raw.normal.and_then(|n| n.random) {
            return Some(RangeRule::RandomThreshold { threshold });
        }

        None
    }
}

// ── Document shapes ──────────────────────────────────────────────────────────

/// `ranges` object as written in a knowledge base document.
///
/// Built with [`RawRanges::from_value`], which never fails: numbers written as
/// strings are accepted and any other unusable field is treated as absent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawRanges {
    pub male: Option<RawBand>,
    pub female: Option<RawBand>,
    pub normal: Option<RawNormal>,
    pub desirable: Option<f64>,
    pub borderline: Option<f64>,
    pub optimal: Option<f64>,
    pub near_optimal: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawBand {
    pub low: Option<f64>,
    pub high: Option<f64>,
}

impl RawBand {
    fn complete(self) -> Option<Band> {
        Some(Band::new(self.low?, self.high?))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawNormal {
    pub low: Option<f64>,
    pub high: Option<f64>,
    pub random: Option<f64>,
}

impl RawRanges {
    pub fn from_value(value: &Value) -> Self {
        if !value.is_null() && !value.is_object() {
            warn!("Ignoring ranges that are not an object: {}", value);
        }
        Self {
            male: section(value, "male").map(|m| RawBand { low: number(m, "low"), high: number(m, "high") }),
            female: section(value, "female").map(|f| RawBand { low: number(f, "low"), high: number(f, "high") }),
            normal: section(value, "normal").map(|n| RawNormal {
                low: number(n, "low"),
                high: number(n, "high"),
                random: number(n, "random"),
            }),
            desirable: number(value, "desirable"),
            borderline: number(value, "borderline"),
            optimal: number(value, "optimal"),
            near_optimal: number(value, "near_optimal"),
        }
    }

    /// Upper bound consulted by the missing-decimal correction: the male high,
    /// else the normal high. Partial bands count, so this can be set even when
    /// [`RangeRule::from_raw`] yields no rule or a different one. Zero is
    /// treated as unset.
    pub fn reference_high(&self) -> Option<f64> {
        let nonzero = |h: &f64| *h != 0.0;
        self.male
            .and_then(|m| m.high.filter(nonzero))
            .or_else(|| self.normal.and_then(|n| n.high.filter(nonzero)))
    }
}

fn section<'a>(value: &'a Value, field: &str) -> Option<&'a Value> {
    let section = value.get(field).filter(|v| !v.is_null())?;
    if section.is_object() {
        Some(section)
    } else {
        warn!("Ignoring range section '{}' that is not an object: {}", field, section);
        None
    }
}

fn number(value: &Value, field: &str) -> Option<f64> {
    let raw = value.get(field).filter(|v| !v.is_null())?;
    let parsed = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    };
    if parsed.is_none() {
        warn!("Ignoring range field '{}' with unusable value {}", field, raw);
    }
    parsed
}
