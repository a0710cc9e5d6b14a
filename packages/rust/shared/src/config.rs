//! Application configuration for Prospector.
//!
//! User config lives at `~/.prospector/prospector.toml`.
//! CLI flags override config file values, which override defaults.
//! Configuration is loaded once at startup; the pipeline receives an
//! immutable [`RunConfig`] and never re-reads it mid-run.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ProspectorError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "prospector.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".prospector";

// ---------------------------------------------------------------------------
// Config structs (matching prospector.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Source adapter settings.
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Profile merge tuning.
    #[serde(default)]
    pub merge: MergeConfig,

    /// Contact scoring tuning.
    #[serde(default)]
    pub scoring: ScoringConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default export root directory.
    #[serde(default = "default_export_root")]
    pub export_root: String,

    /// Default candidate limit per run.
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,

    /// Maximum concurrent adapter calls.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: u32,

    /// Per-adapter-call timeout in seconds.
    #[serde(default = "default_adapter_timeout_secs")]
    pub adapter_timeout_secs: u64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            export_root: default_export_root(),
            search_limit: default_search_limit(),
            max_concurrency: default_max_concurrency(),
            adapter_timeout_secs: default_adapter_timeout_secs(),
        }
    }
}

fn default_export_root() -> String {
    "~/prospector-exports".into()
}
fn default_search_limit() -> usize {
    10
}
fn default_max_concurrency() -> u32 {
    4
}
fn default_adapter_timeout_secs() -> u64 {
    20
}

/// `[sources]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Conflict-resolution reliability ranks, higher wins. Sources not
    /// listed here rank 0 (lowest).
    #[serde(default = "default_reliability")]
    pub reliability: BTreeMap<String, u32>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            reliability: default_reliability(),
        }
    }
}

fn default_reliability() -> BTreeMap<String, u32> {
    BTreeMap::from([
        ("google_maps".to_string(), 3),
        ("yelp".to_string(), 2),
        ("linkedin".to_string(), 2),
        ("yellow_pages".to_string(), 1),
    ])
}

/// `[merge]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Confidence assigned to a field only one source supplied within a
    /// multi-source profile. A neutral prior; raise to 1.0 to treat
    /// one-supplier fields as uncontested.
    #[serde(default = "default_single_source_confidence")]
    pub single_source_confidence: f64,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            single_source_confidence: default_single_source_confidence(),
        }
    }
}

fn default_single_source_confidence() -> f64 {
    0.5
}

/// `[scoring]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Contacts scoring at or above this are decision makers.
    #[serde(default = "default_decision_maker_threshold")]
    pub decision_maker_threshold: f64,

    /// Signal weights; sum-normalized before use, so any non-negative
    /// values work.
    #[serde(default)]
    pub weights: ScoringWeights,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            decision_maker_threshold: default_decision_maker_threshold(),
            weights: ScoringWeights::default(),
        }
    }
}

fn default_decision_maker_threshold() -> f64 {
    0.6
}

/// `[scoring.weights]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    /// Title seniority keyword match (highest by default).
    #[serde(default = "default_weight_title")]
    pub title_seniority: f64,

    /// Email at the business's own website domain.
    #[serde(default = "default_weight_domain_email")]
    pub domain_email: f64,

    /// Any phone number present.
    #[serde(default = "default_weight_phone")]
    pub phone: f64,

    /// Independent evidence snippet count (capped).
    #[serde(default = "default_weight_evidence")]
    pub evidence: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            title_seniority: default_weight_title(),
            domain_email: default_weight_domain_email(),
            phone: default_weight_phone(),
            evidence: default_weight_evidence(),
        }
    }
}

fn default_weight_title() -> f64 {
    0.5
}
fn default_weight_domain_email() -> f64 {
    0.2
}
fn default_weight_phone() -> f64 {
    0.1
}
fn default_weight_evidence() -> f64 {
    0.2
}

impl ScoringWeights {
    /// Sum of all weights.
    pub fn total(&self) -> f64 {
        self.title_seniority + self.domain_email + self.phone + self.evidence
    }

    /// Copy with weights scaled to sum to 1.0. A zero-sum table falls
    /// back to the defaults so scoring stays defined.
    pub fn normalized(&self) -> Self {
        let total = self.total();
        if total <= 0.0 {
            return Self::default().normalized();
        }
        Self {
            title_seniority: self.title_seniority / total,
            domain_email: self.domain_email / total,
            phone: self.phone / total,
            evidence: self.evidence / total,
        }
    }
}

// ---------------------------------------------------------------------------
// Run config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Immutable runtime configuration handed to the orchestrator.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Maximum concurrent adapter calls.
    pub max_concurrency: usize,
    /// Per-adapter-call timeout.
    pub adapter_timeout: Duration,
    /// Source reliability ranks for merge conflict resolution.
    pub reliability_ranks: BTreeMap<String, u32>,
    /// Confidence prior for one-supplier fields in merged profiles.
    pub single_source_confidence: f64,
    /// Contact scoring weights (raw; the scorer normalizes).
    pub scoring_weights: ScoringWeights,
    /// Decision-maker score threshold.
    pub decision_maker_threshold: f64,
}

impl From<&AppConfig> for RunConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_concurrency: config.defaults.max_concurrency.max(1) as usize,
            adapter_timeout: Duration::from_secs(config.defaults.adapter_timeout_secs.max(1)),
            reliability_ranks: config.sources.reliability.clone(),
            single_source_confidence: config.merge.single_source_confidence,
            scoring_weights: config.scoring.weights.clone(),
            decision_maker_threshold: config.scoring.decision_maker_threshold,
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.prospector/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ProspectorError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.prospector/prospector.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ProspectorError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        ProspectorError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    validate_config(&config)?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ProspectorError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ProspectorError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ProspectorError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check tuning values are sane before a run starts.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    if config.defaults.search_limit == 0 {
        return Err(ProspectorError::validation("search_limit must be at least 1"));
    }

    let w = &config.scoring.weights;
    for (name, value) in [
        ("title_seniority", w.title_seniority),
        ("domain_email", w.domain_email),
        ("phone", w.phone),
        ("evidence", w.evidence),
    ] {
        if value < 0.0 || !value.is_finite() {
            return Err(ProspectorError::validation(format!(
                "scoring weight '{name}' must be a non-negative number, got {value}"
            )));
        }
    }

    let threshold = config.scoring.decision_maker_threshold;
    if !(0.0..=1.0).contains(&threshold) {
        return Err(ProspectorError::validation(format!(
            "decision_maker_threshold must be in [0, 1], got {threshold}"
        )));
    }

    let prior = config.merge.single_source_confidence;
    if !(0.0..=1.0).contains(&prior) {
        return Err(ProspectorError::validation(format!(
            "single_source_confidence must be in [0, 1], got {prior}"
        )));
    }

    Ok(())
}

/// Resolve the export root: an explicit override wins, otherwise the
/// configured default with a leading `~/` expanded to the home directory.
pub fn resolve_export_root(config: &AppConfig, override_path: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = override_path {
        return Ok(path);
    }

    let configured = &config.defaults.export_root;
    if let Some(rest) = configured.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| ProspectorError::config("could not determine home directory"))?;
        return Ok(home.join(rest));
    }
    Ok(PathBuf::from(configured))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("export_root"));
        assert!(toml_str.contains("google_maps"));
        assert!(toml_str.contains("decision_maker_threshold"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.max_concurrency, 4);
        assert_eq!(parsed.sources.reliability["google_maps"], 3);
        assert_eq!(parsed.scoring.decision_maker_threshold, 0.6);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[defaults]
search_limit = 25

[sources.reliability]
google_maps = 5
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.defaults.search_limit, 25);
        assert_eq!(config.defaults.max_concurrency, 4);
        assert_eq!(config.sources.reliability["google_maps"], 5);
        // Unlisted sources are simply absent, ranking 0 at merge time.
        assert!(!config.sources.reliability.contains_key("yelp"));
    }

    #[test]
    fn run_config_from_app_config() {
        let app = AppConfig::default();
        let run = RunConfig::from(&app);
        assert_eq!(run.max_concurrency, 4);
        assert_eq!(run.adapter_timeout, Duration::from_secs(20));
        assert_eq!(run.reliability_ranks["yellow_pages"], 1);
        assert_eq!(run.decision_maker_threshold, 0.6);
    }

    #[test]
    fn weights_sum_normalize() {
        let weights = ScoringWeights {
            title_seniority: 2.0,
            domain_email: 1.0,
            phone: 0.5,
            evidence: 0.5,
        };
        let norm = weights.normalized();
        assert!((norm.total() - 1.0).abs() < 1e-9);
        assert!((norm.title_seniority - 0.5).abs() < 1e-9);

        // Zero-sum tables fall back to defaults rather than dividing by zero.
        let zero = ScoringWeights {
            title_seniority: 0.0,
            domain_email: 0.0,
            phone: 0.0,
            evidence: 0.0,
        };
        assert!((zero.normalized().total() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn validation_rejects_bad_tuning() {
        let mut config = AppConfig::default();
        config.scoring.weights.phone = -0.1;
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.scoring.decision_maker_threshold = 1.5;
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.merge.single_source_confidence = -0.2;
        assert!(validate_config(&config).is_err());

        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn export_root_resolution() {
        let config = AppConfig::default();
        let explicit = resolve_export_root(&config, Some(PathBuf::from("/tmp/out"))).expect("ok");
        assert_eq!(explicit, PathBuf::from("/tmp/out"));

        let resolved = resolve_export_root(&config, None).expect("ok");
        assert!(resolved.ends_with("prospector-exports"));
        assert!(!resolved.to_string_lossy().contains('~'));
    }
}
