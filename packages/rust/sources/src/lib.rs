//! Source adapters and the discovery aggregator.
//!
//! Every data source sits behind the [`SourceAdapter`] trait; the
//! [`AdapterRegistry`] holds them in pinned order and the aggregator
//! fans a search out across all of them concurrently. The built-in
//! adapters are deterministic stand-ins that synthesize plausible,
//! overlapping directory and social listings from the search criteria.

pub mod adapters;
pub mod aggregator;

pub use adapters::{AdapterRegistry, SourceAdapter};
pub use aggregator::{DiscoveryOptions, DiscoveryResult, discover};
