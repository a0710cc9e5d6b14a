//! Shared types, error model, and configuration for Prospector.
//!
//! This crate is the foundation depended on by all other Prospector crates.
//! It provides:
//! - [`ProspectorError`], the unified error type
//! - Domain types ([`SearchCriteria`], [`RawBusinessRecord`], [`BusinessProfile`],
//!   [`Contact`], [`RunResult`])
//! - Configuration ([`AppConfig`], [`RunConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, MergeConfig, RunConfig, ScoringConfig, ScoringWeights,
    SourcesConfig, config_dir, config_file_path, init_config, load_config, load_config_from,
    resolve_export_root, validate_config,
};
pub use error::{ProspectorError, Result};
pub use types::{
    AlternativeValue, BusinessProfile, Contact, EXPORT_SCHEMA_VERSION, Evidence, FieldValue,
    RawBusinessRecord, RunId, RunResult, SearchCriteria, SourceCategory, SourceStats, field,
};
