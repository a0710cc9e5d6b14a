//! End-to-end run pipeline: criteria → discover → merge → enrich → export.
//!
//! Stages run strictly in order; each consumes only the previous
//! stage's output. Per-source and per-profile failures are absorbed
//! into stats/warnings; only conditions that prevent a valid result or
//! any export artifact fail the run. A cancellation flag is checked at
//! every stage boundary.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use chrono::Utc;
use tracing::{info, instrument, warn};

use prospector_contacts::extract_contacts;
use prospector_export::{ExportOptions, export};
use prospector_merge::{MergeOptions, merge};
use prospector_shared::config::RunConfig;
use prospector_shared::{
    ProspectorError, Result, RunId, RunResult, SearchCriteria, SourceStats,
};
use prospector_sources::{AdapterRegistry, DiscoveryOptions, discover};

// ---------------------------------------------------------------------------
// Run state
// ---------------------------------------------------------------------------

/// Lifecycle of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Pending,
    Discovering,
    Merging,
    Enriching,
    Exporting,
    Completed,
    Failed,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Discovering => "discovering",
            Self::Merging => "merging",
            Self::Enriching => "enriching",
            Self::Exporting => "exporting",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

/// Cooperative cancellation flag, checked at stage boundaries. Cloning
/// shares the flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; the run stops before its next stage.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// Config / report
// ---------------------------------------------------------------------------

/// Everything one run needs, assembled by the caller before the run
/// starts and never re-read mid-run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Validated search input.
    pub criteria: SearchCriteria,
    /// Export destination root.
    pub export_root: PathBuf,
    /// Replace an existing run directory instead of failing.
    pub overwrite: bool,
    /// Runtime knobs from the config file.
    pub run: RunConfig,
}

/// Result of a completed run.
#[derive(Debug)]
pub struct RunReport {
    /// The finalized run data, as exported.
    pub result: RunResult,
    /// The run directory that was written.
    pub export_path: PathBuf,
    /// Total wall time.
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting run status.
pub trait ProgressReporter: Send + Sync {
    /// Called when the run enters a new stage.
    fn stage(&self, state: RunState);
    /// Called once per source after discovery finishes.
    fn source_finished(&self, source: &str, stats: &SourceStats);
    /// Called when the run completes.
    fn done(&self, report: &RunReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn stage(&self, _state: RunState) {}
    fn source_finished(&self, _source: &str, _stats: &SourceStats) {}
    fn done(&self, _report: &RunReport) {}
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run the full pipeline.
///
/// 1. Discover: fan criteria out across the registry
/// 2. Merge: reconcile raw records into canonical profiles
/// 3. Enrich: extract and score contacts per profile
/// 4. Export: write the run directory
#[instrument(skip_all, fields(
    industry = %config.criteria.industry,
    location = %config.criteria.location,
))]
pub async fn run_pipeline(
    config: &PipelineConfig,
    registry: &AdapterRegistry,
    progress: &dyn ProgressReporter,
    cancel: &CancelFlag,
) -> Result<RunReport> {
    match run_stages(config, registry, progress, cancel).await {
        Ok(report) => {
            progress.stage(RunState::Completed);
            progress.done(&report);
            Ok(report)
        }
        Err(e) => {
            progress.stage(RunState::Failed);
            Err(e)
        }
    }
}

async fn run_stages(
    config: &PipelineConfig,
    registry: &AdapterRegistry,
    progress: &dyn ProgressReporter,
    cancel: &CancelFlag,
) -> Result<RunReport> {
    let start = Instant::now();
    let run_id = RunId::new();
    let started_at = Utc::now();

    info!(%run_id, "starting run");

    // --- Stage 1: Discovering ---
    ensure_not_cancelled(cancel, RunState::Discovering)?;
    progress.stage(RunState::Discovering);

    let discovery = discover(
        &config.criteria,
        registry,
        &DiscoveryOptions::from(&config.run),
    )
    .await?;

    let mut warnings: Vec<String> = Vec::new();
    for (source, stats) in &discovery.per_source_stats {
        progress.source_finished(source, stats);
        if stats.failed > 0 {
            warnings.push(format!(
                "source '{source}' failed {}/{} fetches",
                stats.failed, stats.attempted
            ));
        }
    }

    // --- Stage 2: Merging ---
    ensure_not_cancelled(cancel, RunState::Merging)?;
    progress.stage(RunState::Merging);

    let mut profiles = merge(&discovery.records, &MergeOptions::from(&config.run));

    // --- Stage 3: Enriching ---
    ensure_not_cancelled(cancel, RunState::Enriching)?;
    progress.stage(RunState::Enriching);

    for profile in &mut profiles {
        match extract_contacts(profile, &config.run.scoring_weights) {
            Ok(contacts) => profile.contacts = contacts,
            Err(e) => {
                warn!(
                    profile = %profile.display_name(),
                    error = %e,
                    "contact extraction failed, exporting profile without contacts"
                );
                warnings.push(e.to_string());
                profile.contacts = Vec::new();
            }
        }
    }

    // --- Stage 4: Exporting ---
    ensure_not_cancelled(cancel, RunState::Exporting)?;
    progress.stage(RunState::Exporting);

    // The result is finalized before export; the exporter sees exactly
    // what the caller will.
    let result = RunResult {
        run_id,
        criteria: config.criteria.clone(),
        profiles,
        per_source_stats: discovery.per_source_stats,
        warnings,
        started_at,
        finished_at: Utc::now(),
    };

    let export_options = ExportOptions {
        overwrite: config.overwrite,
        decision_maker_threshold: config.run.decision_maker_threshold,
    };
    let export_path = export(&result, &config.export_root, &export_options)?;

    let report = RunReport {
        result,
        export_path,
        elapsed: start.elapsed(),
    };

    info!(
        run_id = %report.result.run_id,
        profiles = report.result.profiles.len(),
        contacts = report.result.contact_count(),
        export = %report.export_path.display(),
        elapsed_ms = report.elapsed.as_millis(),
        "run complete"
    );

    Ok(report)
}

fn ensure_not_cancelled(cancel: &CancelFlag, next: RunState) -> Result<()> {
    if cancel.is_cancelled() {
        warn!(stage = %next, "run cancelled at stage boundary");
        return Err(ProspectorError::cancelled(next.as_str()));
    }
    Ok(())
}
