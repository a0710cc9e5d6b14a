//! Deterministic on-disk export of finished runs.
//!
//! One directory per run, claimed atomically at creation time, holding
//! the master summary, run statistics, and a per-business artifact tree.

pub mod documents;
pub mod manager;
pub mod paths;

pub use documents::{ContactRow, MasterSummaryDoc, StatisticsDoc, SummaryRow, summary_text};
pub use manager::{ExportOptions, export};
pub use paths::{run_dir_name, safe_component};
