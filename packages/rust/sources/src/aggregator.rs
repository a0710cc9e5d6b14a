//! Concurrent, fault-isolated discovery across source adapters.
//!
//! Fans the search criteria out to every registered adapter, bounded by a
//! semaphore, with a per-call timeout. One adapter failing or timing out
//! contributes zero records and a failure count; it never aborts
//! siblings. Results are reassembled in registration order so everything
//! downstream is deterministic.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

use prospector_merge::merge_key;
use prospector_shared::config::RunConfig;
use prospector_shared::{ProspectorError, RawBusinessRecord, Result, SearchCriteria, SourceStats};

use crate::adapters::AdapterRegistry;

// ---------------------------------------------------------------------------
// Options and result
// ---------------------------------------------------------------------------

/// Knobs for one discovery pass.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Maximum simultaneously in-flight adapter calls.
    pub max_concurrency: usize,
    /// Per-adapter-call timeout; expiry counts as failure.
    pub adapter_timeout: Duration,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            adapter_timeout: Duration::from_secs(20),
        }
    }
}

impl From<&RunConfig> for DiscoveryOptions {
    fn from(config: &RunConfig) -> Self {
        Self {
            max_concurrency: config.max_concurrency,
            adapter_timeout: config.adapter_timeout,
        }
    }
}

/// Everything a discovery pass produced.
#[derive(Debug, Clone)]
pub struct DiscoveryResult {
    /// Collected records in pinned adapter order, capped at the
    /// criteria's candidate limit.
    pub records: Vec<RawBusinessRecord>,
    /// Fetch counters per source.
    pub per_source_stats: BTreeMap<String, SourceStats>,
    /// Wall time of the fan-out.
    pub duration: Duration,
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// Query every registered adapter concurrently and collect the records.
#[instrument(skip_all, fields(
    industry = %criteria.industry,
    location = %criteria.location,
    limit = criteria.limit,
))]
pub async fn discover(
    criteria: &SearchCriteria,
    registry: &AdapterRegistry,
    options: &DiscoveryOptions,
) -> Result<DiscoveryResult> {
    let start_time = std::time::Instant::now();

    if registry.is_empty() {
        warn!("no adapters registered, discovery returns nothing");
    }

    let semaphore = Arc::new(Semaphore::new(options.max_concurrency.max(1)));
    let mut handles = Vec::with_capacity(registry.len());

    info!(
        sources = registry.len(),
        max_concurrency = options.max_concurrency,
        timeout_secs = options.adapter_timeout.as_secs(),
        "starting discovery"
    );

    for adapter in registry.adapters() {
        let adapter = Arc::clone(adapter);
        let sem = semaphore.clone();
        let criteria = criteria.clone();
        let timeout = options.adapter_timeout;

        handles.push(tokio::spawn(async move {
            let _permit = sem.acquire().await.expect("semaphore closed");
            match tokio::time::timeout(timeout, adapter.fetch(&criteria)).await {
                Ok(result) => result,
                Err(_) => Err(ProspectorError::adapter(
                    adapter.source_name(),
                    format!("timed out after {:?}", timeout),
                )),
            }
        }));
    }

    // Collect in registration order regardless of completion order.
    let mut per_source_stats: BTreeMap<String, SourceStats> = BTreeMap::new();
    let mut collected: Vec<RawBusinessRecord> = Vec::new();

    for (adapter, handle) in registry.adapters().iter().zip(handles) {
        let name = adapter.source_name();
        let stats = per_source_stats.entry(name.to_string()).or_default();
        stats.attempted += 1;

        match handle.await {
            Ok(Ok(records)) => {
                stats.succeeded += 1;
                debug!(source = name, records = records.len(), "source fetch succeeded");
                for mut record in records {
                    // Stamp identity from the registry, not the record;
                    // downstream trusts these two fields.
                    record.source_name = name.to_string();
                    record.category = adapter.category();
                    collected.push(record);
                }
            }
            Ok(Err(e)) => {
                stats.failed += 1;
                warn!(source = name, error = %e, "source fetch failed");
            }
            Err(e) => {
                stats.failed += 1;
                warn!(source = name, error = %e, "source task aborted");
            }
        }
    }

    let records = cap_candidates(collected, criteria.limit);
    let duration = start_time.elapsed();

    info!(
        records = records.len(),
        sources_failed = per_source_stats.values().filter(|s| s.failed > 0).count(),
        duration_ms = duration.as_millis(),
        "discovery completed"
    );

    Ok(DiscoveryResult {
        records,
        per_source_stats,
        duration,
    })
}

/// Keep records only while their normalization key falls within the first
/// `limit` distinct keys, in arrival order. Later records for an admitted
/// candidate still pass (they corroborate), records for new candidates
/// beyond the limit are dropped. Keyless records pass through; the merger
/// warns and skips them.
fn cap_candidates(records: Vec<RawBusinessRecord>, limit: usize) -> Vec<RawBusinessRecord> {
    let mut admitted: Vec<String> = Vec::new();
    let mut kept = Vec::new();

    for record in records {
        let Some(name) = record.name() else {
            kept.push(record);
            continue;
        };
        let key = merge_key(name, record.location().unwrap_or(""));

        if admitted.iter().any(|k| *k == key) {
            kept.push(record);
        } else if admitted.len() < limit {
            admitted.push(key);
            kept.push(record);
        } else {
            debug!(key, source = %record.source_name, "candidate limit reached, dropping record");
        }
    }

    kept
}
