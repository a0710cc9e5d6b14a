//! Record deduplication and conflict resolution.
//!
//! Records sharing a normalization key collapse into one profile. Field
//! conflicts are settled by source reliability rank; on equal rank the
//! earlier-processed record wins, which is deterministic because records
//! arrive in pinned adapter order. Losing values are retained as
//! alternatives, never discarded.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use tracing::{debug, instrument, warn};

use prospector_shared::config::RunConfig;
use prospector_shared::types::{
    AlternativeValue, BusinessProfile, FieldValue, RawBusinessRecord,
};

use crate::normalize::{merge_key, profile_id};

// ---------------------------------------------------------------------------
// MergeOptions
// ---------------------------------------------------------------------------

/// Tuning inputs for a merge pass.
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Source reliability ranks; unlisted sources rank 0.
    pub reliability_ranks: BTreeMap<String, u32>,
    /// Confidence for a field only one source supplied within a
    /// multi-record profile. A neutral prior, tunable via config.
    pub single_source_confidence: f64,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            reliability_ranks: BTreeMap::new(),
            single_source_confidence: 0.5,
        }
    }
}

impl From<&RunConfig> for MergeOptions {
    fn from(config: &RunConfig) -> Self {
        Self {
            reliability_ranks: config.reliability_ranks.clone(),
            single_source_confidence: config.single_source_confidence,
        }
    }
}

impl MergeOptions {
    fn rank(&self, source_name: &str) -> u32 {
        self.reliability_ranks.get(source_name).copied().unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// One field value under consideration, with enough context to resolve
/// conflicts deterministically.
struct Candidate<'a> {
    value: &'a str,
    source_id: &'a str,
    source_name: &'a str,
    rank: u32,
    /// Global arrival index; lower wins rank ties.
    order: usize,
}

/// Merge raw records into canonical profiles.
///
/// Output is deterministically ordered: descending mean field confidence,
/// ties broken by normalization key. Records without a usable name cannot
/// be keyed and are skipped with a warning.
#[instrument(skip_all, fields(records = records.len()))]
pub fn merge(records: &[RawBusinessRecord], options: &MergeOptions) -> Vec<BusinessProfile> {
    let mut groups: BTreeMap<String, Vec<(usize, &RawBusinessRecord)>> = BTreeMap::new();

    for (order, record) in records.iter().enumerate() {
        let Some(name) = record.name() else {
            warn!(
                source = %record.source_name,
                source_id = %record.source_id,
                "record has no usable name, skipping"
            );
            continue;
        };
        let key = merge_key(name, record.location().unwrap_or(""));
        groups.entry(key).or_default().push((order, record));
    }

    let mut keyed: Vec<(String, BusinessProfile)> = groups
        .into_iter()
        .map(|(key, group)| {
            let profile = build_profile(&key, &group, options);
            (key, profile)
        })
        .collect();

    keyed.sort_by(|(key_a, a), (key_b, b)| {
        b.aggregate_confidence()
            .total_cmp(&a.aggregate_confidence())
            .then_with(|| key_a.cmp(key_b))
    });

    let profiles: Vec<BusinessProfile> = keyed.into_iter().map(|(_, p)| p).collect();
    debug!(profiles = profiles.len(), "merge completed");
    profiles
}

fn build_profile(
    key: &str,
    group: &[(usize, &RawBusinessRecord)],
    options: &MergeOptions,
) -> BusinessProfile {
    let single_record = group.len() == 1;

    // Collect candidates per field name across the group, in arrival order.
    let mut by_field: BTreeMap<&str, Vec<Candidate<'_>>> = BTreeMap::new();
    let mut names = BTreeSet::new();

    for (order, record) in group {
        if let Some(name) = record.name() {
            names.insert(name.to_string());
        }
        for field_name in record.fields.keys() {
            let Some(value) = record.field(field_name) else {
                continue;
            };
            by_field.entry(field_name.as_str()).or_default().push(Candidate {
                value,
                source_id: &record.source_id,
                source_name: &record.source_name,
                rank: options.rank(&record.source_name),
                order: *order,
            });
        }
    }

    let mut fields = BTreeMap::new();
    for (field_name, candidates) in &by_field {
        // Highest rank wins; on equal rank the earlier arrival wins.
        let Some(winner) = candidates
            .iter()
            .max_by(|a, b| a.rank.cmp(&b.rank).then_with(|| b.order.cmp(&a.order)))
        else {
            continue;
        };

        if let Some(loser) = candidates
            .iter()
            .find(|c| c.rank == winner.rank && c.value != winner.value)
        {
            debug!(
                key,
                field = *field_name,
                winner = winner.source_name,
                loser = loser.source_name,
                "equal-rank conflict resolved by arrival order"
            );
        }

        let suppliers: BTreeSet<&str> = candidates.iter().map(|c| c.source_name).collect();
        let agreeing: BTreeSet<&str> = candidates
            .iter()
            .filter(|c| c.value == winner.value)
            .map(|c| c.source_name)
            .collect();

        let confidence = if single_record {
            1.0
        } else if suppliers.len() == 1 {
            options.single_source_confidence
        } else {
            agreeing.len() as f64 / suppliers.len() as f64
        };

        let mut source_ids: Vec<String> = Vec::new();
        for c in candidates.iter().filter(|c| c.value == winner.value) {
            if !source_ids.iter().any(|s| s == c.source_id) {
                source_ids.push(c.source_id.to_string());
            }
        }

        let mut alternatives: Vec<AlternativeValue> = Vec::new();
        for c in candidates.iter().filter(|c| c.value != winner.value) {
            let already = alternatives
                .iter()
                .any(|a| a.value == c.value && a.source_id == c.source_id);
            if !already {
                alternatives.push(AlternativeValue {
                    value: c.value.to_string(),
                    source_id: c.source_id.to_string(),
                });
            }
        }

        fields.insert(
            field_name.to_string(),
            FieldValue {
                value: winner.value.to_string(),
                source_ids,
                confidence,
                alternatives,
            },
        );
    }

    let created_at = group
        .iter()
        .map(|(_, r)| r.fetched_at)
        .min()
        .unwrap_or_else(Utc::now);
    let updated_at = group
        .iter()
        .map(|(_, r)| r.fetched_at)
        .max()
        .unwrap_or_else(Utc::now);

    BusinessProfile {
        profile_id: profile_id(key),
        names,
        fields,
        contacts: Vec::new(),
        records: group.iter().map(|(_, r)| (*r).clone()).collect(),
        created_at,
        updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use prospector_shared::types::{SourceCategory, field};

    fn rec(
        source_name: &str,
        source_id: &str,
        pairs: &[(&str, &str)],
    ) -> RawBusinessRecord {
        let mut fields = BTreeMap::new();
        for (k, v) in pairs {
            fields.insert(k.to_string(), v.to_string());
        }
        RawBusinessRecord {
            source_id: source_id.into(),
            source_name: source_name.into(),
            category: SourceCategory::Directory,
            fields,
            fetched_at: Utc.with_ymd_and_hms(2025, 8, 25, 12, 0, 0).unwrap(),
        }
    }

    fn ranked_options() -> MergeOptions {
        MergeOptions {
            reliability_ranks: BTreeMap::from([
                ("google_maps".to_string(), 3),
                ("yelp".to_string(), 2),
                ("yellow_pages".to_string(), 1),
            ]),
            single_source_confidence: 0.5,
        }
    }

    #[test]
    fn colliding_keys_merge_into_one_profile() {
        let records = vec![
            rec(
                "google_maps",
                "gm-1",
                &[
                    (field::NAME, "Joe's Pizza"),
                    (field::LOCATION, "New York, NY"),
                    (field::PHONE, "(212) 555-0100"),
                ],
            ),
            rec(
                "yelp",
                "yelp-1",
                &[
                    (field::NAME, "JOES PIZZA"),
                    (field::LOCATION, "new york ny"),
                    (field::PHONE, "(212) 555-0100"),
                ],
            ),
            rec(
                "google_maps",
                "gm-2",
                &[
                    (field::NAME, "Harbor Grill"),
                    (field::LOCATION, "New York, NY"),
                ],
            ),
        ];

        let profiles = merge(&records, &ranked_options());
        assert_eq!(profiles.len(), 2);

        let joes = profiles
            .iter()
            .find(|p| p.display_name() == "Joe's Pizza")
            .expect("merged profile");
        assert_eq!(joes.records.len(), 2);
        assert_eq!(joes.names.len(), 2);

        let phone = &joes.fields[field::PHONE];
        assert!(phone.source_ids.contains(&"gm-1".to_string()));
        assert!(phone.source_ids.contains(&"yelp-1".to_string()));
    }

    #[test]
    fn rank_resolves_conflicts_and_keeps_alternatives() {
        let records = vec![
            rec(
                "yelp",
                "yelp-1",
                &[
                    (field::NAME, "Joe's Pizza"),
                    (field::LOCATION, "New York, NY"),
                    (field::PHONE, "(212) 555-0199"),
                ],
            ),
            rec(
                "google_maps",
                "gm-1",
                &[
                    (field::NAME, "Joe's Pizza"),
                    (field::LOCATION, "New York, NY"),
                    (field::PHONE, "(212) 555-0100"),
                ],
            ),
        ];

        let profiles = merge(&records, &ranked_options());
        assert_eq!(profiles.len(), 1);

        // google_maps outranks yelp even though yelp arrived first.
        let phone = &profiles[0].fields[field::PHONE];
        assert_eq!(phone.value, "(212) 555-0100");
        assert_eq!(phone.source_ids, vec!["gm-1".to_string()]);
        assert!((phone.confidence - 0.5).abs() < 1e-9);
        assert_eq!(phone.alternatives.len(), 1);
        assert_eq!(phone.alternatives[0].value, "(212) 555-0199");
        assert_eq!(phone.alternatives[0].source_id, "yelp-1");
    }

    #[test]
    fn equal_rank_conflict_resolved_by_arrival_order() {
        let records = vec![
            rec(
                "unranked_a",
                "a-1",
                &[
                    (field::NAME, "Corner Deli"),
                    (field::LOCATION, "Austin, TX"),
                    (field::WEBSITE, "https://first.example.com"),
                ],
            ),
            rec(
                "unranked_b",
                "b-1",
                &[
                    (field::NAME, "Corner Deli"),
                    (field::LOCATION, "Austin, TX"),
                    (field::WEBSITE, "https://second.example.com"),
                ],
            ),
        ];

        let profiles = merge(&records, &MergeOptions::default());
        let website = &profiles[0].fields[field::WEBSITE];
        assert_eq!(website.value, "https://first.example.com");
        assert_eq!(website.alternatives[0].source_id, "b-1");
    }

    #[test]
    fn single_record_profile_is_uncontested() {
        let records = vec![rec(
            "yellow_pages",
            "yp-1",
            &[
                (field::NAME, "Harbor Grill"),
                (field::LOCATION, "Boston, MA"),
                (field::PHONE, "(617) 555-0155"),
            ],
        )];

        let profiles = merge(&records, &ranked_options());
        assert_eq!(profiles.len(), 1);
        for fv in profiles[0].fields.values() {
            assert_eq!(fv.confidence, 1.0);
        }
    }

    #[test]
    fn single_supplier_field_takes_the_prior() {
        let records = vec![
            rec(
                "google_maps",
                "gm-1",
                &[
                    (field::NAME, "Blue Olive Bistro"),
                    (field::LOCATION, "Chicago, IL"),
                    (field::WEBSITE, "https://blueolive.example.com"),
                ],
            ),
            rec(
                "yelp",
                "yelp-1",
                &[
                    (field::NAME, "Blue Olive Bistro"),
                    (field::LOCATION, "Chicago, IL"),
                ],
            ),
        ];

        let profiles = merge(&records, &ranked_options());
        let website = &profiles[0].fields[field::WEBSITE];
        assert!((website.confidence - 0.5).abs() < 1e-9);

        // The prior is tunable; raising it treats one-supplier fields as
        // uncontested.
        let mut options = ranked_options();
        options.single_source_confidence = 1.0;
        let profiles = merge(&records, &options);
        assert_eq!(profiles[0].fields[field::WEBSITE].confidence, 1.0);
    }

    #[test]
    fn agreement_outvotes_a_dissenter() {
        let records = vec![
            rec(
                "google_maps",
                "gm-1",
                &[
                    (field::NAME, "Saffron House"),
                    (field::LOCATION, "Seattle, WA"),
                    (field::PHONE, "(206) 555-0101"),
                ],
            ),
            rec(
                "yelp",
                "yelp-1",
                &[
                    (field::NAME, "Saffron House"),
                    (field::LOCATION, "Seattle, WA"),
                    (field::PHONE, "(206) 555-0999"),
                ],
            ),
            rec(
                "yellow_pages",
                "yp-1",
                &[
                    (field::NAME, "SAFFRON HOUSE"),
                    (field::LOCATION, "Seattle, WA"),
                    (field::PHONE, "(206) 555-0101"),
                ],
            ),
        ];

        let profiles = merge(&records, &ranked_options());
        assert_eq!(profiles.len(), 1);

        let phone = &profiles[0].fields[field::PHONE];
        assert_eq!(phone.value, "(206) 555-0101");
        assert!((phone.confidence - 2.0 / 3.0).abs() < 1e-9);
        // Confidence bounds hold everywhere.
        for fv in profiles[0].fields.values() {
            assert!((0.0..=1.0).contains(&fv.confidence));
        }
    }

    #[test]
    fn merge_is_idempotent_and_deterministically_ordered() {
        let records = vec![
            rec(
                "google_maps",
                "gm-1",
                &[
                    (field::NAME, "Twin Peaks Diner"),
                    (field::LOCATION, "Denver, CO"),
                    (field::PHONE, "(303) 555-0101"),
                ],
            ),
            rec(
                "yelp",
                "yelp-1",
                &[
                    (field::NAME, "Twin Peaks Diner"),
                    (field::LOCATION, "Denver, CO"),
                    (field::PHONE, "(303) 555-0202"),
                ],
            ),
            rec(
                "yelp",
                "yelp-2",
                &[
                    (field::NAME, "Maple Kitchen"),
                    (field::LOCATION, "Denver, CO"),
                    (field::PHONE, "(303) 555-0303"),
                ],
            ),
        ];

        let first = merge(&records, &ranked_options());
        let second = merge(&records, &ranked_options());

        let a = serde_json::to_string(&first).expect("serialize");
        let b = serde_json::to_string(&second).expect("serialize");
        assert_eq!(a, b);

        // Maple Kitchen is single-record (all fields 1.0) and outranks the
        // contested diner profile in the ordering.
        assert_eq!(first[0].display_name(), "Maple Kitchen");
        assert_eq!(first[1].display_name(), "Twin Peaks Diner");
    }

    #[test]
    fn keyless_records_are_skipped() {
        let records = vec![
            rec("google_maps", "gm-1", &[(field::PHONE, "(212) 555-0100")]),
            rec(
                "yelp",
                "yelp-1",
                &[(field::NAME, "   "), (field::LOCATION, "New York, NY")],
            ),
            rec(
                "yelp",
                "yelp-2",
                &[(field::NAME, "Corner Deli"), (field::LOCATION, "New York, NY")],
            ),
        ];

        let profiles = merge(&records, &ranked_options());
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].display_name(), "Corner Deli");
    }

    #[test]
    fn joes_pizza_scenario() {
        // Two adapters each return one record for the same pizzeria with
        // differing phones and a shared address.
        let records = vec![
            rec(
                "google_maps",
                "gm-1",
                &[
                    (field::NAME, "Joe's Pizza"),
                    (field::LOCATION, "New York, NY"),
                    (field::ADDRESS, "101 Main St, New York, NY"),
                    (field::PHONE, "(212) 555-0100"),
                    (field::WEBSITE, "https://joes-pizza.example.com"),
                ],
            ),
            rec(
                "yelp",
                "yelp-1",
                &[
                    (field::NAME, "Joes Pizza"),
                    (field::LOCATION, "New York, NY"),
                    (field::ADDRESS, "101 Main St, New York, NY"),
                    (field::PHONE, "(212) 555-0199"),
                ],
            ),
        ];

        let profiles = merge(&records, &ranked_options());
        assert_eq!(profiles.len(), 1);
        let profile = &profiles[0];
        assert_eq!(profile.display_name(), "Joe's Pizza");

        // Both phones surface: one primary, one alternative.
        let phone = &profile.fields[field::PHONE];
        assert_eq!(phone.value, "(212) 555-0100");
        assert_eq!(phone.alternatives.len(), 1);
        assert!((phone.confidence - 0.5).abs() < 1e-9);

        // Both sources agree on the address.
        assert_eq!(profile.fields[field::ADDRESS].confidence, 1.0);

        // Website came from one source only: neutral prior by default,
        // uncontested when the prior is raised.
        assert!((profile.fields[field::WEBSITE].confidence - 0.5).abs() < 1e-9);
        let mut options = ranked_options();
        options.single_source_confidence = 1.0;
        let retuned = merge(&records, &options);
        assert_eq!(retuned[0].fields[field::WEBSITE].confidence, 1.0);
    }
}
