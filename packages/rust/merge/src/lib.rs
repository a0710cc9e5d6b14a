//! Profile merging for Prospector.
//!
//! Turns raw per-source records into canonical [`BusinessProfile`]s:
//! normalization-key grouping, rank-based conflict resolution, per-field
//! confidence, and deterministic output ordering.
//!
//! [`BusinessProfile`]: prospector_shared::BusinessProfile

pub mod merger;
pub mod normalize;

pub use merger::{MergeOptions, merge};
pub use normalize::{merge_key, normalize_token, profile_id};
