//! Run orchestration for Prospector.
//!
//! Wires the discovery, merge, contact-extraction, and export crates
//! into one cancellable pipeline. Callers build a [`PipelineConfig`],
//! hand in an [`AdapterRegistry`](prospector_sources::AdapterRegistry),
//! and get back a [`RunReport`] describing what was written where.

pub mod pipeline;

pub use pipeline::{
    CancelFlag, PipelineConfig, ProgressReporter, RunReport, RunState, SilentProgress,
    run_pipeline,
};
