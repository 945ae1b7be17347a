//! Interpretation pipeline: matcher → normaliser → classifier.
//!
//! A pipeline owns an immutable knowledge base and the alias regexes compiled
//! from it, so it can be built once and shared across threads.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::classifier::{explanation_for, status_for};
use crate::knowledge_base::KnowledgeBase;
use crate::matcher::BiomarkerMatcher;
use crate::normalise::normalize;
use crate::{ExtractError, Result};
use clarity_common::InterpretedFinding;

pub struct InterpretationPipeline {
    knowledge_base: KnowledgeBase,
    matcher: BiomarkerMatcher,
}

impl InterpretationPipeline {
    /// Build a pipeline. Fails only if the knowledge base has nothing in it.
    pub fn new(knowledge_base: KnowledgeBase) -> Result<Self> {
        if knowledge_base.is_empty() {
            return Err(ExtractError::EmptyKnowledgeBase);
        }
        let matcher = BiomarkerMatcher::new(&knowledge_base);
        Ok(Self { knowledge_base, matcher })
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.knowledge_base
    }

    /// Interpret one document, stamping findings with the current time.
    pub fn interpret(&self, text: &str) -> Result<Vec<InterpretedFinding>> {
        self.interpret_at(text, Utc::now())
    }

    /// Interpret one document, stamping every finding with `timestamp`.
    ///
    /// An empty result means no known biomarker was found; it is not an error.
    pub fn interpret_at(&self, text: &str, timestamp: DateTime<Utc>) -> Result<Vec<InterpretedFinding>> {
        if text.trim().is_empty() {
            return Err(ExtractError::EmptyInput);
        }

        let candidates = self.matcher.find_candidates(text);
        let n_candidates = candidates.len();

        let findings: Vec<InterpretedFinding> = candidates
            .into_iter()
            .filter_map(|candidate| {
                let Some(definition) = self.knowledge_base.get(&candidate.biomarker_key) else {
                    debug!("Dropping candidate for unknown biomarker '{}'", candidate.biomarker_key);
                    return None;
                };

                let measurement = normalize(&candidate, definition);
                let status = status_for(measurement.value, definition.range_rule.as_ref());
                debug!("{} = {} -> {}", definition.key, measurement.value, status);

                Some(InterpretedFinding {
                    display_name: definition.display_name.clone(),
                    value: measurement.value,
                    unit: definition.unit.clone(),
                    status,
                    explanation: explanation_for(definition, status),
                    biomarker_key: measurement.biomarker_key,
                    timestamp,
                })
            })
            .collect();

        info!("Interpreted {} biomarkers ({} candidates)", findings.len(), n_candidates);
        Ok(findings)
    }

    /// Interpret many documents. Uses rayon for batches larger than 10 when
    /// the `parallel` feature is enabled; results keep input order.
    pub fn interpret_batch(&self, texts: &[&str]) -> Vec<Result<Vec<InterpretedFinding>>> {
        let timestamp = Utc::now();

        #[cfg(feature = "parallel")]
        {
            if texts.len() > 10 {
                use rayon::prelude::*;
                return texts.par_iter()
                    .map(|text| self.interpret_at(text, timestamp))
                    .collect();
            }
        }
        texts.iter()
            .map(|text| self.interpret_at(text, timestamp))
            .collect()
    }
}

/// One-shot convenience: build a pipeline over a borrowed knowledge base and run it once.
pub fn interpret(text: &str, knowledge_base: &KnowledgeBase) -> Result<Vec<InterpretedFinding>> {
    InterpretationPipeline::new(knowledge_base.clone())?.interpret(text)
}
