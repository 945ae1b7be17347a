//! clarity-common: shared value types passed between the Clarity crates.

pub mod entities;

pub use entities::{ExtractedMeasurement, InterpretedFinding, Status};
