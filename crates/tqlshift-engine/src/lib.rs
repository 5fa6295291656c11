//! Position injection engine for staged pipeline definitions.
//!
//! Classifies each definition document by its source reader, pulls the
//! latest resume position out of the pipeline's checkpoint history, and
//! writes that position into the document's start field.

pub mod access;
pub mod classify;
pub mod config;
pub mod error;
pub mod extract;
pub mod import;
pub mod orchestrator;
pub mod patch;
pub mod result;
pub mod stage;

// Re-export public API for convenience
pub use classify::{classify, detect_reader};
pub use error::StageError;
pub use extract::{extract, extract_latest};
pub use orchestrator::{resolve, update_stage, CheckpointSource, PipelineOutcome, UpdateOptions};
pub use patch::{patch, start_field, PatchOutcome};
pub use result::{PipelineReport, PipelineStatus, RunReport, RunSummary};
pub use stage::{Stage, StagedDocument};
