//! Knowledge base resolution for the binary: configured document, else a
//! built-in single-biomarker fallback.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{info, warn};

use clarity_extract::{Band, BiomarkerDefinition, KnowledgeBase, KnowledgeBaseBuilder, RangeRule};

use crate::config::KnowledgeBaseConfig;

/// Minimal knowledge base used when no document can be loaded.
pub fn fallback_knowledge_base() -> clarity_extract::Result<KnowledgeBase> {
    let explanations: BTreeMap<String, String> = [
        ("low", "Low hemoglobin may indicate anemia."),
        ("normal", "Your hemoglobin levels are healthy!"),
        ("high", "High hemoglobin could indicate dehydration."),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    KnowledgeBase::builder()
        .biomarker(BiomarkerDefinition {
            key: "hemoglobin".to_string(),
            display_name: "Hemoglobin".to_string(),
            unit: "g/dL".to_string(),
            range_rule: Some(RangeRule::SexSpecific {
                male: Band::new(13.5, 17.5),
                female: Band::new(12.0, 15.5),
            }),
            reference_high: Some(17.5),
            explanations,
        })
        .pattern("hemoglobin|hgb|hb", "hemoglobin")
        .build()
}

/// Load the knowledge base at `path` (or the configured one), merging configured extra aliases.
/// Falls back to [`fallback_knowledge_base`] if the document is missing, invalid or empty.
pub fn load_knowledge_base(config: &KnowledgeBaseConfig, path: Option<&Path>) -> clarity_extract::Result<KnowledgeBase> {
    let path = path.unwrap_or(config.path.as_path());

    let loaded = KnowledgeBaseBuilder::from_path(path).and_then(|builder| {
        config
            .extra_aliases
            .iter()
            .flat_map(|(key, aliases)| aliases.iter().map(move |alias| (key, alias)))
            .fold(builder, |b, (key, alias)| b.extra_alias(key.as_str(), alias.as_str()))
            .build()
    });

    match loaded {
        Ok(kb) if !kb.is_empty() => {
            info!("Knowledge base loaded from {} ({} biomarkers)", path.display(), kb.biomarker_count());
            Ok(kb)
        }
        Ok(_) => {
            warn!("Knowledge base {} is empty. Using fallback data.", path.display());
            fallback_knowledge_base()
        }
        Err(e) => {
            warn!("Could not load knowledge base {}: {}. Using fallback data.", path.display(), e);
            fallback_knowledge_base()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_without_aliases() -> KnowledgeBaseConfig {
        KnowledgeBaseConfig { extra_aliases: BTreeMap::new(), ..KnowledgeBaseConfig::default() }
    }

    #[test]
    fn test_fallback_has_hemoglobin() {
        let kb = fallback_knowledge_base().unwrap();
        assert_eq!(kb.biomarker_count(), 1);
        assert_eq!(kb.patterns()[0].pattern, "hemoglobin|hgb|hb");
    }

    #[test]
    fn test_missing_document_uses_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let kb = load_knowledge_base(&config_without_aliases(), Some(dir.path().join("missing.json").as_path())).unwrap();
        assert!(kb.get("hemoglobin").is_some());
        assert_eq!(kb.biomarker_count(), 1);
    }

    #[test]
    fn test_empty_document_uses_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.json");
        std::fs::write(&path, r#"{"biomarkers": {}, "common_patterns": []}"#).unwrap();
        let kb = load_knowledge_base(&config_without_aliases(), Some(path.as_path())).unwrap();
        assert!(kb.get("hemoglobin").is_some());
    }

    #[test]
    fn test_configured_aliases_are_merged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.yaml");
        std::fs::write(
            &path,
            "biomarkers:\n  total_cholesterol:\n    name: Total Cholesterol\n    unit: mg/dL\n    ranges: {desirable: 200, borderline: 239}\ncommon_patterns:\n  - {pattern: total cholesterol, biomarker: total_cholesterol}\n",
        )
        .unwrap();
        let kb = load_knowledge_base(&KnowledgeBaseConfig::default(), Some(path.as_path())).unwrap();
        assert_eq!(kb.patterns()[0].pattern, "total cholesterol|cholesterol");
    }

    #[test]
    fn test_default_aliases_reach_bundled_knowledge_base() {
        let bundled = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/knowledge_base.json");
        let kb = load_knowledge_base(&KnowledgeBaseConfig::default(), Some(bundled.as_path())).unwrap();
        assert_eq!(
            kb.alias_patterns_for("total_cholesterol").collect::<Vec<_>>(),
            vec!["total cholesterol|serum cholesterol|cholesterol"]
        );

        let findings = clarity_extract::interpret("Cholesterol: 245 mg/dL", &kb).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].biomarker_key, "total_cholesterol");
        assert_eq!(findings[0].status, clarity_common::Status::High);
    }
}
