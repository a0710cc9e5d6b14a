//! Run export: claims the run directory and writes the artifact tree.
//!
//! Layout per run:
//! ```text
//! <destination_root>/<industry>_<location>_<YYYYMMDD>_<HHMMSS>/
//! ├── master_summary.json
//! ├── master_summary.csv
//! ├── statistics.json
//! └── <business>/
//!     ├── profile.json
//!     ├── summary.txt
//!     ├── sources/<category>/<source_name>.json
//!     └── contacts/            (only when contacts exist)
//!         ├── all_contacts.json
//!         ├── all_contacts.csv
//!         ├── decision_makers.json
//!         └── decision_makers.csv
//! ```
//!
//! Creating the run directory is the atomicity point: a second export
//! for the same criteria in the same second loses with DuplicateRun
//! unless overwrite was requested.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use prospector_shared::{
    BusinessProfile, Contact, ProspectorError, RawBusinessRecord, Result, RunResult,
};

use crate::documents::{
    ContactRow, SummaryRow, contact_rows, decision_makers_of, master_summary_doc, statistics_doc,
    summary_rows, summary_text,
};
use crate::paths::{business_dir_name, run_dir_name, safe_component};

/// Knobs for one export.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Replace an existing run directory instead of failing.
    pub overwrite: bool,
    /// Minimum score for the decision-makers view.
    pub decision_maker_threshold: f64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            overwrite: false,
            decision_maker_threshold: 0.6,
        }
    }
}

/// Export a finished run under `destination_root`.
///
/// Returns the created run directory. Any write failure inside the run
/// directory is fatal (StorageUnwritable).
#[instrument(skip_all, fields(run_id = %result.run_id, profiles = result.profiles.len()))]
pub fn export(
    result: &RunResult,
    destination_root: &Path,
    options: &ExportOptions,
) -> Result<PathBuf> {
    let dir_name = run_dir_name(&result.criteria, &result.started_at);
    let run_dir = claim_run_dir(destination_root, &dir_name, options.overwrite)?;

    info!(path = %run_dir.display(), "exporting run");

    let rows = summary_rows(result, options.decision_maker_threshold);
    write_csv(
        &run_dir.join("master_summary.csv"),
        SummaryRow::CSV_HEADER,
        &rows,
    )?;
    write_json(
        &run_dir.join("master_summary.json"),
        &master_summary_doc(result, rows),
    )?;
    write_json(
        &run_dir.join("statistics.json"),
        &statistics_doc(result, options.decision_maker_threshold),
    )?;

    let mut taken: BTreeSet<String> = BTreeSet::new();
    for profile in &result.profiles {
        let business_dir = unique_business_dir(&run_dir, profile, &mut taken)?;
        write_business(&business_dir, profile, options)?;
    }

    info!(
        businesses = result.profiles.len(),
        path = %run_dir.display(),
        "export complete"
    );

    Ok(run_dir)
}

// ---------------------------------------------------------------------------
// Run directory claim
// ---------------------------------------------------------------------------

fn claim_run_dir(root: &Path, name: &str, overwrite: bool) -> Result<PathBuf> {
    std::fs::create_dir_all(root)
        .map_err(|e| ProspectorError::storage_unwritable(root, e))?;

    let run_dir = root.join(name);
    // create_dir (not create_dir_all) so an existing directory is
    // observed as a conflict, atomically.
    match std::fs::create_dir(&run_dir) {
        Ok(()) => Ok(run_dir),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            if !overwrite {
                return Err(ProspectorError::DuplicateRun { path: run_dir });
            }
            warn!(path = %run_dir.display(), "overwriting previous run directory");
            std::fs::remove_dir_all(&run_dir)
                .map_err(|e| ProspectorError::storage_unwritable(&run_dir, e))?;
            std::fs::create_dir(&run_dir)
                .map_err(|e| ProspectorError::storage_unwritable(&run_dir, e))?;
            Ok(run_dir)
        }
        Err(e) => Err(ProspectorError::storage_unwritable(&run_dir, e)),
    }
}

fn unique_business_dir(
    run_dir: &Path,
    profile: &BusinessProfile,
    taken: &mut BTreeSet<String>,
) -> Result<PathBuf> {
    let base = business_dir_name(profile);
    let name = if taken.contains(&base) {
        let suffix = profile.profile_id.get(..8).unwrap_or(&profile.profile_id);
        format!("{base}_{suffix}")
    } else {
        base
    };
    taken.insert(name.clone());

    let dir = run_dir.join(&name);
    std::fs::create_dir_all(&dir).map_err(|e| ProspectorError::storage_unwritable(&dir, e))?;
    Ok(dir)
}

// ---------------------------------------------------------------------------
// Per-business documents
// ---------------------------------------------------------------------------

fn write_business(
    dir: &Path,
    profile: &BusinessProfile,
    options: &ExportOptions,
) -> Result<()> {
    write_json(&dir.join("profile.json"), profile)?;
    write_text(
        &dir.join("summary.txt"),
        &summary_text(profile, options.decision_maker_threshold),
    )?;
    write_source_documents(dir, profile)?;

    // No contacts, no contacts/ directory.
    if !profile.contacts.is_empty() {
        write_contact_documents(dir, profile, options.decision_maker_threshold)?;
    }

    debug!(path = %dir.display(), "wrote business directory");
    Ok(())
}

/// Raw records grouped by category and source, one JSON document per
/// contributing source.
fn write_source_documents(dir: &Path, profile: &BusinessProfile) -> Result<()> {
    let mut groups: BTreeMap<(&'static str, String), Vec<&RawBusinessRecord>> = BTreeMap::new();
    for record in &profile.records {
        groups
            .entry((record.category.dir_name(), record.source_name.clone()))
            .or_default()
            .push(record);
    }

    for ((category_dir, source_name), records) in groups {
        let out_dir = dir.join("sources").join(category_dir);
        std::fs::create_dir_all(&out_dir)
            .map_err(|e| ProspectorError::storage_unwritable(&out_dir, e))?;
        let file = out_dir.join(format!("{}.json", safe_component(&source_name)));
        write_json(&file, &records)?;
    }
    Ok(())
}

fn write_contact_documents(
    dir: &Path,
    profile: &BusinessProfile,
    threshold: f64,
) -> Result<()> {
    let contacts_dir = dir.join("contacts");
    std::fs::create_dir_all(&contacts_dir)
        .map_err(|e| ProspectorError::storage_unwritable(&contacts_dir, e))?;

    let all: Vec<&Contact> = profile.contacts.iter().collect();
    write_json(&contacts_dir.join("all_contacts.json"), &all)?;
    write_csv(
        &contacts_dir.join("all_contacts.csv"),
        ContactRow::CSV_HEADER,
        &contact_rows(&all),
    )?;

    let dms: Vec<&Contact> = decision_makers_of(profile, threshold).collect();
    write_json(&contacts_dir.join("decision_makers.json"), &dms)?;
    write_csv(
        &contacts_dir.join("decision_makers.csv"),
        ContactRow::CSV_HEADER,
        &contact_rows(&dms),
    )?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Write helpers
// ---------------------------------------------------------------------------

/// Write a JSON file (pretty-printed).
fn write_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| ProspectorError::serialize(format!("{}: {e}", path.display())))?;
    std::fs::write(path, json).map_err(|e| ProspectorError::storage_unwritable(path, e))?;
    debug!(path = %path.display(), "wrote JSON file");
    Ok(())
}

fn write_text(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).map_err(|e| ProspectorError::storage_unwritable(path, e))?;
    debug!(path = %path.display(), "wrote text file");
    Ok(())
}

/// Write a CSV table. Serde derives the header from the row type, but
/// only on the first serialize, so an empty table writes `header` itself.
fn write_csv<T: Serialize>(path: &Path, header: &[&str], rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if rows.is_empty() {
        writer
            .write_record(header)
            .map_err(|e| ProspectorError::serialize(format!("{}: {e}", path.display())))?;
    }
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| ProspectorError::serialize(format!("{}: {e}", path.display())))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ProspectorError::serialize(format!("{}: {e}", path.display())))?;
    std::fs::write(path, bytes).map_err(|e| ProspectorError::storage_unwritable(path, e))?;
    debug!(path = %path.display(), rows = rows.len(), "wrote CSV file");
    Ok(())
}
