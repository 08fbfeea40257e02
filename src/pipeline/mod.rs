//! Pipeline orchestration
//!
//! Composes the preprocessing stages into a single deterministic run from a
//! raw maintenance table to model-ready train/test partitions.

mod config;
mod orchestrator;

pub use config::{BalancingConfig, PipelineConfig, ScalingConfig, SplitConfig};
pub use orchestrator::{run_pipeline, PipelineOutput};
