//! Biomarker knowledge base.
//!
//! The knowledge base is an immutable value: documents are decoded and any
//! extra aliases are merged in by [`KnowledgeBaseBuilder`] before anything
//! reads it. Pattern order is significant and defines result ordering.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::range_rule::{RangeRule, RawRanges};
use crate::{ExtractError, Result};

/// Reference entry for one biomarker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BiomarkerDefinition {
    pub key: String,
    pub display_name: String,
    pub unit: String,
    /// `None` when the document's `ranges` matched no known schema.
    pub range_rule: Option<RangeRule>,
    /// Upper bound used by the missing-decimal correction. Taken from the
    /// document's male or normal band even when that band is incomplete.
    pub reference_high: Option<f64>,
    /// Status key ("low", "normal", ...) → explanation text.
    pub explanations: BTreeMap<String, String>,
}

/// Alias alternation identifying a biomarker in free text, e.g. "hemoglobin|hgb|hb".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasPattern {
    pub pattern: String,
    pub biomarker: String,
}

#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    biomarkers: HashMap<String, BiomarkerDefinition>,
    patterns: Vec<AliasPattern>,
}

// ── Document shapes ──────────────────────────────────────────────────────────

// Entries are kept as raw values so one malformed biomarker or pattern is
// skipped on its own instead of failing the whole document.
#[derive(Debug, Deserialize)]
struct KnowledgeBaseDocument {
    #[serde(default)]
    biomarkers: BTreeMap<String, Value>,
    #[serde(default)]
    common_patterns: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct BiomarkerEntry {
    #[serde(default)]
    name: String,
    #[serde(default)]
    unit: String,
    #[serde(default)]
    ranges: Value,
    #[serde(default)]
    explanations: BTreeMap<String, String>,
}

impl KnowledgeBase {
    pub fn builder() -> KnowledgeBaseBuilder {
        KnowledgeBaseBuilder::default()
    }

    /// Parse a JSON knowledge base document.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let doc: KnowledgeBaseDocument = serde_json::from_str(s)?;
        Self::builder().document(doc).build()
    }

    /// Parse a YAML knowledge base document.
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let doc: KnowledgeBaseDocument = serde_yaml::from_str(s)?;
        Self::builder().document(doc).build()
    }

    /// Load a document from disk; `.yaml`/`.yml` files are read as YAML, anything else as JSON.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        KnowledgeBaseBuilder::from_path(path)?.build()
    }

    pub fn get(&self, key: &str) -> Option<&BiomarkerDefinition> {
        self.biomarkers.get(key)
    }

    /// Alias patterns in match order.
    pub fn patterns(&self) -> &[AliasPattern] {
        &self.patterns
    }

    /// All alias patterns that identify `key`.
    pub fn alias_patterns_for<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.patterns.iter().filter(move |p| p.biomarker == key).map(|p| p.pattern.as_str())
    }

    pub fn biomarker_count(&self) -> usize {
        self.biomarkers.len()
    }

    /// True when there is nothing to match or nothing to classify against.
    pub fn is_empty(&self) -> bool {
        self.biomarkers.is_empty() || self.patterns.is_empty()
    }
}

/// Assembles a [`KnowledgeBase`] from documents and programmatic entries.
#[derive(Debug, Default)]
pub struct KnowledgeBaseBuilder {
    biomarkers: HashMap<String, BiomarkerDefinition>,
    patterns: Vec<AliasPattern>,
    extra_aliases: Vec<(String, String)>,
}

impl KnowledgeBaseBuilder {
    /// Start from a JSON or YAML document on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let doc: KnowledgeBaseDocument = if is_yaml {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };
        Ok(Self::default().document(doc))
    }

    fn document(mut self, doc: KnowledgeBaseDocument) -> Self {
        for (key, raw_entry) in doc.biomarkers {
            let entry: BiomarkerEntry = match serde_json::from_value(raw_entry) {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping malformed biomarker '{}': {}", key, e);
                    continue;
                }
            };
            let ranges = RawRanges::from_value(&entry.ranges);
            let range_rule = RangeRule::from_raw(&ranges);
            if range_rule.is_none() {
                warn!("Biomarker '{}' has no recognised range schema; it will classify as normal", key);
            }
            let display_name = if entry.name.is_empty() { key.clone() } else { entry.name };
            self = self.biomarker(BiomarkerDefinition {
                key,
                display_name,
                unit: entry.unit,
                range_rule,
                reference_high: ranges.reference_high(),
                explanations: entry.explanations,
            });
        }
        for raw_pattern in doc.common_patterns {
            match serde_json::from_value::<AliasPattern>(raw_pattern) {
                Ok(pattern) => self.patterns.push(pattern),
                Err(e) => warn!("Skipping malformed alias pattern: {}", e),
            }
        }
        self
    }

    pub fn biomarker(mut self, definition: BiomarkerDefinition) -> Self {
        self.biomarkers.insert(definition.key.clone(), definition);
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>, biomarker: impl Into<String>) -> Self {
        self.patterns.push(AliasPattern { pattern: pattern.into(), biomarker: biomarker.into() });
        self
    }

    /// Make sure `alias` is recognised for `biomarker`.
    ///
    /// The alias is appended to the biomarker's first pattern unless one of
    /// that pattern's `|`-separated fragments already equals it, ignoring case.
    /// A biomarker without any pattern gets a new one at the end of the match order.
    pub fn extra_alias(mut self, biomarker: impl Into<String>, alias: impl Into<String>) -> Self {
        self.extra_aliases.push((biomarker.into(), alias.into()));
        self
    }

    pub fn build(mut self) -> Result<KnowledgeBase> {
        for (biomarker, alias) in std::mem::take(&mut self.extra_aliases) {
            let alias = alias.trim().to_string();
            if alias.is_empty() {
                return Err(ExtractError::KnowledgeBase(format!("empty extra alias for '{biomarker}'")));
            }

            match self.patterns.iter_mut().find(|p| p.biomarker == biomarker) {
                Some(existing) if has_fragment(&existing.pattern, &alias) => {}
                Some(existing) => {
                    debug!("Adding alias '{}' to pattern for {}", alias, biomarker);
                    existing.pattern.push('|');
                    existing.pattern.push_str(&alias);
                }
                None => self.patterns.push(AliasPattern { pattern: alias, biomarker }),
            }
        }

        for p in &self.patterns {
            if !self.biomarkers.contains_key(&p.biomarker) {
                warn!("Pattern '{}' refers to unknown biomarker '{}'", p.pattern, p.biomarker);
            }
        }

        Ok(KnowledgeBase { biomarkers: self.biomarkers, patterns: self.patterns })
    }
}

fn has_fragment(pattern: &str, alias: &str) -> bool {
    pattern.split('|').any(|fragment| fragment.trim().eq_ignore_ascii_case(alias))
}
