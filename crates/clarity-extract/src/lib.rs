//! Biomarker extraction and interpretation for OCR'd lab reports.
//!
//! Finds biomarker mentions in noisy text, reads the nearest value after each
//! mention, repairs common OCR distortions and classifies the value against
//! the biomarker's reference range.
//!
//! # Example
//!
//! ```rust,no_run
//! use clarity_extract::{InterpretationPipeline, KnowledgeBase};
//!
//! fn main() -> clarity_extract::Result<()> {
//!     let kb = KnowledgeBase::from_path("data/knowledge_base.json")?;
//!     let pipeline = InterpretationPipeline::new(kb)?;
//!
//!     for finding in pipeline.interpret("Hemoglobin: 125 g/dL")? {
//!         println!("{}: {} {} ({})", finding.display_name, finding.value, finding.unit, finding.status);
//!     }
//!     Ok(())
//! }
//! ```

pub mod classifier;
pub mod knowledge_base;
pub mod matcher;
pub mod normalise;
pub mod pipeline;
pub mod range_rule;

pub use classifier::{classify, explanation_for, status_for, NO_EXPLANATION};
pub use knowledge_base::{AliasPattern, BiomarkerDefinition, KnowledgeBase, KnowledgeBaseBuilder};
pub use matcher::{find_candidates, BiomarkerMatcher};
pub use normalise::normalize;
pub use pipeline::{interpret, InterpretationPipeline};
pub use range_rule::{Band, RangeRule};

pub use clarity_common::{ExtractedMeasurement, InterpretedFinding, Status};

pub type Result<T> = std::result::Result<T, ExtractError>;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Nothing to process: input text is empty")]
    EmptyInput,

    #[error("Knowledge base has no biomarkers or no alias patterns")]
    EmptyKnowledgeBase,

    #[error("Invalid knowledge base: {0}")]
    KnowledgeBase(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
