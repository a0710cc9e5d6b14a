//! Serializable export documents and the human-readable summary.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use prospector_shared::{
    BusinessProfile, Contact, RunId, RunResult, SearchCriteria, SourceStats,
    EXPORT_SCHEMA_VERSION, field,
};

// ---------------------------------------------------------------------------
// Master summary
// ---------------------------------------------------------------------------

/// One profile row. The same shape backs `master_summary.json` and
/// the CSV table, so the column order is the field order here.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryRow {
    pub profile_id: String,
    pub name: String,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    /// Contributing source names, comma-joined.
    pub sources: String,
    pub confidence: f64,
    pub contacts: usize,
    pub decision_makers: usize,
}

impl SummaryRow {
    /// CSV header, matching the field order above.
    pub const CSV_HEADER: &'static [&'static str] = &[
        "profile_id",
        "name",
        "location",
        "phone",
        "website",
        "sources",
        "confidence",
        "contacts",
        "decision_makers",
    ];
}

#[derive(Debug, Clone, Serialize)]
pub struct MasterSummaryDoc {
    pub schema_version: u32,
    pub run_id: RunId,
    pub criteria: SearchCriteria,
    pub generated_at: DateTime<Utc>,
    pub profile_count: usize,
    pub profiles: Vec<SummaryRow>,
}

pub fn summary_rows(result: &RunResult, threshold: f64) -> Vec<SummaryRow> {
    result
        .profiles
        .iter()
        .map(|profile| SummaryRow {
            profile_id: profile.profile_id.clone(),
            name: profile.display_name().to_string(),
            location: profile.field_value(field::LOCATION).map(str::to_string),
            phone: profile.field_value(field::PHONE).map(str::to_string),
            website: profile.field_value(field::WEBSITE).map(str::to_string),
            sources: profile
                .source_names()
                .into_iter()
                .collect::<Vec<_>>()
                .join(", "),
            confidence: profile.aggregate_confidence(),
            contacts: profile.contacts.len(),
            decision_makers: decision_makers_of(profile, threshold).count(),
        })
        .collect()
}

pub fn master_summary_doc(result: &RunResult, rows: Vec<SummaryRow>) -> MasterSummaryDoc {
    MasterSummaryDoc {
        schema_version: EXPORT_SCHEMA_VERSION,
        run_id: result.run_id.clone(),
        criteria: result.criteria.clone(),
        generated_at: Utc::now(),
        profile_count: rows.len(),
        profiles: rows,
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct StatisticsDoc {
    pub schema_version: u32,
    pub pipeline_version: String,
    pub run_id: RunId,
    pub criteria: SearchCriteria,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_secs: f64,
    pub per_source: BTreeMap<String, SourceStats>,
    pub totals: Totals,
    pub averages: Averages,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Totals {
    pub records: usize,
    pub profiles: usize,
    pub contacts: usize,
    pub decision_makers: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Averages {
    pub profile_confidence: f64,
    pub decision_maker_score: f64,
}

pub fn statistics_doc(result: &RunResult, threshold: f64) -> StatisticsDoc {
    let profiles = &result.profiles;

    let profile_confidence = if profiles.is_empty() {
        0.0
    } else {
        profiles.iter().map(|p| p.aggregate_confidence()).sum::<f64>() / profiles.len() as f64
    };

    let dm_scores: Vec<f64> = profiles
        .iter()
        .flat_map(|p| decision_makers_of(p, threshold))
        .map(|c| c.decision_maker_score)
        .collect();
    let decision_maker_score = if dm_scores.is_empty() {
        0.0
    } else {
        dm_scores.iter().sum::<f64>() / dm_scores.len() as f64
    };

    StatisticsDoc {
        schema_version: EXPORT_SCHEMA_VERSION,
        pipeline_version: env!("CARGO_PKG_VERSION").to_string(),
        run_id: result.run_id.clone(),
        criteria: result.criteria.clone(),
        started_at: result.started_at,
        finished_at: result.finished_at,
        duration_secs: (result.finished_at - result.started_at).num_milliseconds() as f64
            / 1000.0,
        per_source: result.per_source_stats.clone(),
        totals: Totals {
            records: profiles.iter().map(|p| p.records.len()).sum(),
            profiles: profiles.len(),
            contacts: result.contact_count(),
            decision_makers: result.decision_maker_count(threshold),
        },
        averages: Averages {
            profile_confidence,
            decision_maker_score,
        },
        warnings: result.warnings.clone(),
    }
}

// ---------------------------------------------------------------------------
// Contact tables
// ---------------------------------------------------------------------------

/// Flattened contact row for the CSV tables.
#[derive(Debug, Clone, Serialize)]
pub struct ContactRow {
    pub name: String,
    pub role_title: Option<String>,
    /// Semicolon-joined.
    pub emails: String,
    /// Semicolon-joined.
    pub phones: String,
    pub decision_maker_score: f64,
    pub evidence_count: usize,
}

impl ContactRow {
    /// CSV header, matching the field order above.
    pub const CSV_HEADER: &'static [&'static str] = &[
        "name",
        "role_title",
        "emails",
        "phones",
        "decision_maker_score",
        "evidence_count",
    ];
}

pub fn contact_rows(contacts: &[&Contact]) -> Vec<ContactRow> {
    contacts
        .iter()
        .map(|contact| ContactRow {
            name: contact.name.clone(),
            role_title: contact.role_title.clone(),
            emails: contact
                .emails
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(";"),
            phones: contact
                .phones
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(";"),
            decision_maker_score: contact.decision_maker_score,
            evidence_count: contact.evidence.len(),
        })
        .collect()
}

/// Contacts clearing the threshold, in stored (score-descending) order.
pub fn decision_makers_of(
    profile: &BusinessProfile,
    threshold: f64,
) -> impl Iterator<Item = &Contact> {
    profile
        .contacts
        .iter()
        .filter(move |c| c.is_decision_maker(threshold))
}

// ---------------------------------------------------------------------------
// Human-readable summary
// ---------------------------------------------------------------------------

/// Render `summary.txt` for one business. Sections with no data are
/// omitted entirely.
pub fn summary_text(profile: &BusinessProfile, threshold: f64) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!("Business Summary: {}", profile.display_name()));
    lines.push("=".repeat(50));

    let mut details: Vec<String> = Vec::new();
    for (label, name) in [
        ("Location", field::LOCATION),
        ("Phone", field::PHONE),
        ("Website", field::WEBSITE),
    ] {
        if let Some(value) = profile.field_value(name) {
            details.push(format!("{label}: {value}"));
        }
    }
    if !details.is_empty() {
        lines.push(String::new());
        lines.append(&mut details);
    }

    lines.push(String::new());
    lines.push(format!(
        "Profile confidence: {:.2}",
        profile.aggregate_confidence()
    ));
    let sources = profile.source_names();
    if !sources.is_empty() {
        lines.push(format!(
            "Sources: {}",
            sources.into_iter().collect::<Vec<_>>().join(", ")
        ));
    }

    if !profile.contacts.is_empty() {
        lines.push(String::new());
        lines.push(format!("Contacts found: {}", profile.contacts.len()));
        let dms: Vec<&Contact> = decision_makers_of(profile, threshold).collect();
        lines.push(format!("Decision makers: {}", dms.len()));
        for dm in dms {
            let title = dm.role_title.as_deref().unwrap_or("no title");
            lines.push(format!(
                "  - {} ({title}) [score {:.2}]",
                dm.name, dm.decision_maker_score
            ));
        }
    }

    let mut text = lines.join("\n");
    text.push('\n');
    text
}
