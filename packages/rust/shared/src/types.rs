//! Core domain types for the Prospector pipeline.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ProspectorError, Result};

/// Current schema version stamped into exported documents.
pub const EXPORT_SCHEMA_VERSION: u32 = 1;

/// Well-known field names shared between adapters, merger, extractor, and
/// export. Adapters may emit additional fields; these are the ones the
/// pipeline treats specially.
pub mod field {
    /// Business display name. Required on every record; keyless records
    /// are dropped during merge.
    pub const NAME: &str = "name";
    /// Location token (city/state) the record was found under.
    pub const LOCATION: &str = "location";
    pub const ADDRESS: &str = "address";
    pub const PHONE: &str = "phone";
    pub const WEBSITE: &str = "website";
    pub const EMAIL: &str = "email";
    pub const DESCRIPTION: &str = "description";
    pub const CATEGORY: &str = "category";
    pub const RATING: &str = "rating";
    pub const REVIEW_COUNT: &str = "review_count";
    /// Short quoted review or news blurb.
    pub const REVIEW_SNIPPET: &str = "review_snippet";
    pub const HOURS: &str = "hours";
    /// Free-text staff listing ("Jane Doe, CEO; ...").
    pub const STAFF: &str = "staff";
    /// Social/company bio text.
    pub const SOCIAL_BIO: &str = "social_bio";
    pub const EMPLOYEE_COUNT: &str = "employee_count";
    pub const YEARS_IN_BUSINESS: &str = "years_in_business";
}

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper for pipeline run identifiers (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// SearchCriteria
// ---------------------------------------------------------------------------

/// Immutable input to a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCriteria {
    /// Industry/vertical to search for (e.g., "restaurants").
    pub industry: String,
    /// Location token (e.g., "New York, NY").
    pub location: String,
    /// Upper bound on candidate businesses entering the merge stage.
    pub limit: usize,
}

impl SearchCriteria {
    /// Build validated criteria. Industry and location must be non-empty,
    /// limit must be at least 1.
    pub fn new(
        industry: impl Into<String>,
        location: impl Into<String>,
        limit: usize,
    ) -> Result<Self> {
        let industry = industry.into();
        let location = location.into();

        if industry.trim().is_empty() {
            return Err(ProspectorError::validation("industry must not be empty"));
        }
        if location.trim().is_empty() {
            return Err(ProspectorError::validation("location must not be empty"));
        }
        if limit == 0 {
            return Err(ProspectorError::validation("limit must be at least 1"));
        }

        Ok(Self {
            industry,
            location,
            limit,
        })
    }
}

// ---------------------------------------------------------------------------
// SourceCategory
// ---------------------------------------------------------------------------

/// Coarse grouping of sources, used to bucket raw per-source documents in
/// the export tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceCategory {
    /// Business directory / listing providers.
    Directory,
    /// Social platforms (bios, staff listings).
    SocialMedia,
}

impl SourceCategory {
    /// Directory name used in the export layout.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Directory => "directory",
            Self::SocialMedia => "social_media",
        }
    }
}

impl std::fmt::Display for SourceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dir_name())
    }
}

// ---------------------------------------------------------------------------
// RawBusinessRecord
// ---------------------------------------------------------------------------

/// One business as reported by one adapter call. Never mutated after
/// creation; the merger reads, it does not write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBusinessRecord {
    /// Provider-scoped identifier for the business (e.g., a place id).
    pub source_id: String,
    /// Name of the adapter that produced this record.
    pub source_name: String,
    /// Category of the producing source; stamped by the aggregator.
    pub category: SourceCategory,
    /// Field name to raw value. Ordered so downstream output is stable.
    pub fields: BTreeMap<String, String>,
    /// When the adapter fetched this record.
    pub fetched_at: DateTime<Utc>,
}

impl RawBusinessRecord {
    /// Trimmed field value, `None` when absent or effectively empty.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// The raw business name, if usable.
    pub fn name(&self) -> Option<&str> {
        self.field(field::NAME)
    }

    /// The raw location token, if present.
    pub fn location(&self) -> Option<&str> {
        self.field(field::LOCATION)
    }
}

// ---------------------------------------------------------------------------
// BusinessProfile
// ---------------------------------------------------------------------------

/// The winning value for one profile field, with provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValue {
    /// Selected value after conflict resolution.
    pub value: String,
    /// Source ids that supplied or agreed with the winning value.
    pub source_ids: Vec<String>,
    /// Agreement confidence in [0, 1].
    pub confidence: f64,
    /// Losing values retained for auditability.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<AlternativeValue>,
}

/// A conflicting value that lost rank-based resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeValue {
    pub value: String,
    pub source_id: String,
}

/// Canonical merged business entity. Built by the merger, then read-only
/// for the rest of the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessProfile {
    /// Stable identifier derived from the normalization key.
    pub profile_id: String,
    /// Observed name variants across sources.
    pub names: BTreeSet<String>,
    /// Reconciled fields with per-field provenance and confidence.
    pub fields: BTreeMap<String, FieldValue>,
    /// Extracted contacts, scored. Empty until the enrichment stage.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contacts: Vec<Contact>,
    /// Contributing raw records in pinned source order; feeds the
    /// per-source export documents.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<RawBusinessRecord>,
    /// Earliest contributing fetch time.
    pub created_at: DateTime<Utc>,
    /// Latest contributing fetch time.
    pub updated_at: DateTime<Utc>,
}

impl BusinessProfile {
    /// The winning display name: the merged `name` field when present,
    /// otherwise the first observed variant, otherwise the profile id.
    pub fn display_name(&self) -> &str {
        if let Some(fv) = self.fields.get(field::NAME) {
            return &fv.value;
        }
        self.names
            .iter()
            .next()
            .map(String::as_str)
            .unwrap_or(&self.profile_id)
    }

    /// Winning value for a field, if present.
    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|fv| fv.value.as_str())
    }

    /// Mean field confidence; 0.0 for a fieldless profile.
    pub fn aggregate_confidence(&self) -> f64 {
        if self.fields.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.fields.values().map(|fv| fv.confidence).sum();
        sum / self.fields.len() as f64
    }

    /// Names of sources that contributed records to this profile.
    pub fn source_names(&self) -> BTreeSet<&str> {
        self.records
            .iter()
            .map(|r| r.source_name.as_str())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Contact
// ---------------------------------------------------------------------------

/// One snippet of text that mentioned a contact, with its origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub source_id: String,
    pub snippet: String,
}

/// A person extracted from a profile's text fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// Person name as first observed.
    pub name: String,
    /// Best title seen for this person, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_title: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub emails: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub phones: BTreeSet<String>,
    /// Heuristic decision-maker confidence in [0, 1].
    pub decision_maker_score: f64,
    /// Snippets that mentioned this person, in extraction order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evidence: Vec<Evidence>,
}

impl Contact {
    /// Whether this contact clears the decision-maker threshold.
    pub fn is_decision_maker(&self, threshold: f64) -> bool {
        self.decision_maker_score >= threshold
    }
}

// ---------------------------------------------------------------------------
// RunResult
// ---------------------------------------------------------------------------

/// Fetch counters for one source across a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStats {
    /// Fetch calls issued.
    pub attempted: usize,
    /// Calls that returned records (or an empty success).
    pub succeeded: usize,
    /// Calls that errored or timed out.
    pub failed: usize,
}

/// The finalized output of one pipeline run, consumed by the exporter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Unique run identifier.
    pub run_id: RunId,
    /// Criteria the run was executed for.
    pub criteria: SearchCriteria,
    /// Profiles in deterministic order (descending confidence, then key).
    pub profiles: Vec<BusinessProfile>,
    /// Per-source fetch counters.
    pub per_source_stats: BTreeMap<String, SourceStats>,
    /// Non-fatal degradations recorded during the run.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunResult {
    /// Total contacts across all profiles.
    pub fn contact_count(&self) -> usize {
        self.profiles.iter().map(|p| p.contacts.len()).sum()
    }

    /// Contacts clearing the given decision-maker threshold.
    pub fn decision_maker_count(&self, threshold: f64) -> usize {
        self.profiles
            .iter()
            .flat_map(|p| &p.contacts)
            .filter(|c| c.is_decision_maker(threshold))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_profile() -> BusinessProfile {
        let mut fields = BTreeMap::new();
        fields.insert(
            field::NAME.to_string(),
            FieldValue {
                value: "Joe's Pizza".into(),
                source_ids: vec!["gm-1".into()],
                confidence: 1.0,
                alternatives: vec![],
            },
        );
        fields.insert(
            field::PHONE.to_string(),
            FieldValue {
                value: "+1-212-555-0100".into(),
                source_ids: vec!["gm-1".into()],
                confidence: 0.5,
                alternatives: vec![AlternativeValue {
                    value: "+1-212-555-0199".into(),
                    source_id: "yelp-1".into(),
                }],
            },
        );
        BusinessProfile {
            profile_id: "abc123".into(),
            names: BTreeSet::from(["Joe's Pizza".to_string()]),
            fields,
            contacts: vec![],
            records: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn run_id_roundtrip() {
        let id = RunId::new();
        let s = id.to_string();
        let parsed: RunId = s.parse().expect("parse RunId");
        assert_eq!(id, parsed);
    }

    #[test]
    fn criteria_validation() {
        assert!(SearchCriteria::new("restaurants", "New York, NY", 5).is_ok());
        assert!(SearchCriteria::new("", "New York, NY", 5).is_err());
        assert!(SearchCriteria::new("restaurants", "  ", 5).is_err());
        assert!(SearchCriteria::new("restaurants", "New York, NY", 0).is_err());
    }

    #[test]
    fn profile_serialization_omits_empty_sections() {
        let profile = sample_profile();
        let json = serde_json::to_string_pretty(&profile).expect("serialize");

        // Empty contacts/records are skipped; populated alternatives are not.
        assert!(!json.contains("\"contacts\""));
        assert!(!json.contains("\"records\""));
        assert!(json.contains("\"alternatives\""));

        let parsed: BusinessProfile = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed.display_name(), "Joe's Pizza");
        assert_eq!(parsed.fields[field::PHONE].alternatives.len(), 1);
    }

    #[test]
    fn aggregate_confidence_is_mean() {
        let profile = sample_profile();
        assert!((profile.aggregate_confidence() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn display_name_falls_back_to_variants() {
        let mut profile = sample_profile();
        profile.fields.remove(field::NAME);
        assert_eq!(profile.display_name(), "Joe's Pizza");
        profile.names.clear();
        assert_eq!(profile.display_name(), "abc123");
    }

    #[test]
    fn decision_maker_threshold() {
        let contact = Contact {
            name: "Jane Doe".into(),
            role_title: Some("CEO".into()),
            emails: BTreeSet::new(),
            phones: BTreeSet::new(),
            decision_maker_score: 0.7,
            evidence: vec![],
        };
        assert!(contact.is_decision_maker(0.6));
        assert!(!contact.is_decision_maker(0.8));
    }

    #[test]
    fn source_category_dir_names() {
        assert_eq!(SourceCategory::Directory.dir_name(), "directory");
        assert_eq!(SourceCategory::SocialMedia.dir_name(), "social_media");
        let json = serde_json::to_string(&SourceCategory::SocialMedia).expect("serialize");
        assert_eq!(json, "\"social_media\"");
    }
}
