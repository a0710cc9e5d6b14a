//! Source adapter trait, registry, and built-in stub adapters.
//!
//! Adapters are the pluggable edge of the pipeline: anything implementing
//! [`SourceAdapter`] can feed the aggregator. The built-ins serve
//! deterministic sample data so the full pipeline runs without network
//! access; real providers would slot in behind the same trait.

mod catalog;
mod google_maps;
mod linkedin;
mod yellow_pages;
mod yelp;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use prospector_shared::{RawBusinessRecord, Result, SearchCriteria, SourceCategory};

pub use google_maps::GoogleMapsAdapter;
pub use linkedin::LinkedinAdapter;
pub use yellow_pages::YellowPagesAdapter;
pub use yelp::YelpAdapter;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// One business-data provider.
///
/// `fetch` must return `Ok(vec![])` for an ordinary "no results"; an `Err`
/// signals provider failure and is recorded against the source, never
/// propagated to sibling adapters.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Stable source name; keys per-source stats and reliability ranks.
    fn source_name(&self) -> &str;

    /// Category for export grouping.
    fn category(&self) -> SourceCategory;

    /// Fetch raw records matching the criteria.
    async fn fetch(&self, criteria: &SearchCriteria) -> Result<Vec<RawBusinessRecord>>;
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Holds registered adapters in a pinned order.
///
/// Registration order is the iteration order everywhere downstream, which
/// is what makes equal-rank merge conflicts deterministic.
pub struct AdapterRegistry {
    adapters: Vec<Arc<dyn SourceAdapter>>,
}

impl AdapterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            adapters: Vec::new(),
        }
    }

    /// Create a registry with all built-in stub adapters.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(GoogleMapsAdapter));
        registry.register(Arc::new(YelpAdapter));
        registry.register(Arc::new(YellowPagesAdapter));
        registry.register(Arc::new(LinkedinAdapter));
        registry
    }

    /// Register an adapter. Re-registering a source name replaces the
    /// existing adapter in place, keeping its position in the order.
    pub fn register(&mut self, adapter: Arc<dyn SourceAdapter>) {
        let name = adapter.source_name().to_string();
        if let Some(existing) = self
            .adapters
            .iter_mut()
            .find(|a| a.source_name() == name)
        {
            debug!(source = %name, "replacing registered adapter");
            *existing = adapter;
        } else {
            self.adapters.push(adapter);
        }
    }

    /// Adapters in registration order.
    pub fn adapters(&self) -> &[Arc<dyn SourceAdapter>] {
        &self.adapters
    }

    /// Look up an adapter by source name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn SourceAdapter>> {
        self.adapters.iter().find(|a| a.source_name() == name)
    }

    /// Registered source names, in order.
    pub fn names(&self) -> Vec<&str> {
        self.adapters.iter().map(|a| a.source_name()).collect()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Assemble a record, dropping effectively-empty field values so absent
/// data stays absent instead of becoming "".
pub(crate) fn build_record(
    source_name: &str,
    category: SourceCategory,
    source_id: String,
    pairs: Vec<(&str, String)>,
) -> RawBusinessRecord {
    let mut fields = std::collections::BTreeMap::new();
    for (name, value) in pairs {
        if !value.trim().is_empty() {
            fields.insert(name.to_string(), value);
        }
    }
    RawBusinessRecord {
        source_id,
        source_name: source_name.to_string(),
        category,
        fields,
        fetched_at: chrono::Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_order_is_pinned() {
        let registry = AdapterRegistry::with_defaults();
        assert_eq!(
            registry.names(),
            vec!["google_maps", "yelp", "yellow_pages", "linkedin"]
        );
    }

    #[test]
    fn reregistration_replaces_in_place() {
        let mut registry = AdapterRegistry::with_defaults();
        let before: Vec<String> = registry.names().iter().map(|s| s.to_string()).collect();
        registry.register(Arc::new(YelpAdapter));
        assert_eq!(registry.names(), before);
        assert_eq!(registry.len(), 4);
        assert!(registry.get("yelp").is_some());
        assert!(registry.get("unknown").is_none());
    }
}
