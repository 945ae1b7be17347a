//! Alias matching and windowed value extraction.
//!
//! For each alias pattern, in knowledge base order, the first mention in the
//! text is located and the first number within a short window after it is
//! taken as that biomarker's value. At most one measurement is produced per
//! pattern; a mention with no readable number produces nothing.

use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::knowledge_base::KnowledgeBase;
use clarity_common::ExtractedMeasurement;

/// Number of characters after an alias that are searched for its value.
pub const CONTEXT_WINDOW_CHARS: usize = 50;

/// Thousands-grouped numbers (`1,234` / `1,234.5`), then plain decimals and integers.
fn number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[0-9]{1,3}(?:,[0-9]{3})+(?:\.[0-9]+)?|[0-9]+(?:\.[0-9]+)?")
            .expect("numeric token regex is valid")
    })
}

/// Turn an alias alternation into a case-insensitive regex.
/// Literal spaces match any run of whitespace, including none.
pub fn alias_regex(pattern: &str) -> Result<Regex, regex::Error> {
    let flexible = pattern.replace(' ', r"\s*");
    Regex::new(&format!("(?i)({flexible})"))
}

struct CompiledAlias {
    biomarker: String,
    regex: Regex,
}

/// Alias regexes compiled once for a knowledge base.
pub struct BiomarkerMatcher {
    aliases: Vec<CompiledAlias>,
}

impl BiomarkerMatcher {
    pub fn new(knowledge_base: &KnowledgeBase) -> Self {
        let aliases = knowledge_base
            .patterns()
            .iter()
            .filter_map(|p| match alias_regex(&p.pattern) {
                Ok(regex) => Some(CompiledAlias { biomarker: p.biomarker.clone(), regex }),
                Err(e) => {
                    warn!("Skipping alias pattern for {}: {}", p.biomarker, e);
                    None
                }
            })
            .collect();
        Self { aliases }
    }

    /// Number of usable alias patterns.
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Scan `text` and return one measurement per matched alias pattern, in pattern order.
    pub fn find_candidates(&self, text: &str) -> Vec<ExtractedMeasurement> {
        self.aliases
            .iter()
            .filter_map(|alias| extract_after_alias(&alias.biomarker, &alias.regex, text))
            .collect()
    }
}

/// One-shot convenience over [`BiomarkerMatcher`].
pub fn find_candidates(text: &str, knowledge_base: &KnowledgeBase) -> Vec<ExtractedMeasurement> {
    BiomarkerMatcher::new(knowledge_base).find_candidates(text)
}

fn extract_after_alias(biomarker: &str, regex: &Regex, text: &str) -> Option<ExtractedMeasurement> {
    let mention = regex.find(text)?;
    let window = context_window(&text[mention.end()..]);

    let Some(token) = number_regex().find(window) else {
        debug!("'{}' found for {} but no number follows it", mention.as_str(), biomarker);
        return None;
    };

    let value: f64 = match token.as_str().replace(',', "").parse() {
        Ok(v) => v,
        Err(_) => {
            debug!("Unparseable value '{}' for {}", token.as_str(), biomarker);
            return None;
        }
    };

    Some(ExtractedMeasurement {
        biomarker_key: biomarker.to_string(),
        value,
        raw_token: token.as_str().to_string(),
        matched_alias_text: mention.as_str().to_string(),
        context_window: window.to_string(),
    })
}

/// The first [`CONTEXT_WINDOW_CHARS`] characters of `tail`.
fn context_window(tail: &str) -> &str {
    let end = tail
        .char_indices()
        .nth(CONTEXT_WINDOW_CHARS)
        .map_or(tail.len(), |(idx, _)| idx);
    &tail[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kb(patterns: &[(&str, &str)]) -> KnowledgeBase {
        patterns
            .iter()
            .fold(KnowledgeBase::builder(), |b, (pattern, key)| b.pattern(*pattern, *key))
            .build()
            .unwrap()
    }

    fn first_token(s: &str) -> Option<&str> {
        number_regex().find(s).map(|m| m.as_str())
    }

    #[test]
    fn test_number_token_shapes() {
        assert_eq!(first_token(": 1,234.5 /uL"), Some("1,234.5"));
        assert_eq!(first_token(" 12.5 g/dL"), Some("12.5"));
        assert_eq!(first_token(" 250,000 cells"), Some("250,000"));
        assert_eq!(first_token(" 125 mg"), Some("125"));
        assert_eq!(first_token(" 1234 mg"), Some("1234"));
        assert_eq!(first_token(" none"), None);
    }

    #[test]
    fn test_extracts_first_number_after_alias() {
        let kb = kb(&[("hemoglobin|hgb|hb", "hemoglobin")]);
        let found = find_candidates("Patient: J. Doe\nHemoglobin (HGB): 13.2 g/dL 12-16", &kb);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].biomarker_key, "hemoglobin");
        assert_eq!(found[0].matched_alias_text, "Hemoglobin");
        assert_eq!(found[0].value, 13.2);
        assert_eq!(found[0].raw_token, "13.2");
    }

    #[test]
    fn test_space_in_alias_tolerates_ocr_spacing() {
        let kb = kb(&[("total cholesterol", "total_cholesterol")]);
        let found = find_candidates("TOTALCHOLESTEROL 212 mg/dL", &kb);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].value, 212.0);

        let found = find_candidates("Total   Cholesterol: 180", &kb);
        assert_eq!(found[0].value, 180.0);
    }

    #[test]
    fn test_grouped_value_is_stripped() {
        let kb = kb(&[("platelet", "platelets")]);
        let found = find_candidates("Platelet count 2,50,000", &kb);
        // Indian grouping is not thousands grouping; only the leading group reads
        assert_eq!(found[0].raw_token, "2");

        let found = find_candidates("Platelet count 250,000 /uL", &kb);
        assert_eq!(found[0].value, 250000.0);
    }

    #[test]
    fn test_no_number_in_window() {
        let kb = kb(&[("glucose", "glucose")]);
        let text = format!("Glucose{} 95", " ".repeat(60));
        assert!(find_candidates(&text, &kb).is_empty());
        assert!(find_candidates("Glucose: pending", &kb).is_empty());
    }

    #[test]
    fn test_window_is_fifty_characters() {
        let accented = "é".repeat(80);
        let window = context_window(&accented);
        assert_eq!(window.chars().count(), CONTEXT_WINDOW_CHARS);
        assert_eq!(context_window("short"), "short");
    }

    #[test]
    fn test_absent_alias_yields_nothing() {
        let kb = kb(&[("hemoglobin|hgb", "hemoglobin"), ("glucose", "glucose")]);
        let found = find_candidates("Glucose 101 mg/dL", &kb);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].biomarker_key, "glucose");
    }

    #[test]
    fn test_invalid_pattern_is_skipped() {
        let kb = kb(&[("(unclosed", "broken"), ("glucose", "glucose")]);
        let matcher = BiomarkerMatcher::new(&kb);
        assert_eq!(matcher.len(), 1);
        assert_eq!(matcher.find_candidates("glucose 90").len(), 1);
    }

    #[test]
    fn test_results_follow_pattern_order() {
        let kb = kb(&[("glucose", "glucose"), ("hemoglobin", "hemoglobin")]);
        let found = find_candidates("Hemoglobin 14.1\nGlucose 88", &kb);
        let keys: Vec<_> = found.iter().map(|m| m.biomarker_key.as_str()).collect();
        assert_eq!(keys, vec!["glucose", "hemoglobin"]);
    }
}
