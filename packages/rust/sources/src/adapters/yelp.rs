//! Stub adapter modeled on a review-site directory.
//!
//! Overlaps with the maps stub on the first businesses but reports them
//! under name variants and with a conflicting phone, so rank-based
//! conflict resolution has something to do on every run.

use async_trait::async_trait;
use tracing::debug;

use prospector_shared::{RawBusinessRecord, Result, SearchCriteria, SourceCategory, field};

use super::{SourceAdapter, build_record, catalog};

const SOURCE_NAME: &str = "yelp";
const MAX_RESULTS: usize = 3;

pub struct YelpAdapter;

/// Punctuation/casing variant of the canonical name. Normalizes to the
/// same merge key.
fn variant_name(entry: &catalog::CatalogEntry) -> String {
    if entry.index % 2 == 0 {
        entry.name.replace('\'', "")
    } else {
        entry.name.to_uppercase()
    }
}

#[async_trait]
impl SourceAdapter for YelpAdapter {
    fn source_name(&self) -> &str {
        SOURCE_NAME
    }

    fn category(&self) -> SourceCategory {
        SourceCategory::Directory
    }

    async fn fetch(&self, criteria: &SearchCriteria) -> Result<Vec<RawBusinessRecord>> {
        debug!(
            industry = %criteria.industry,
            location = %criteria.location,
            limit = criteria.limit,
            "serving stub review-site results"
        );

        let entries = catalog::sample_businesses(criteria, criteria.limit.min(MAX_RESULTS));
        Ok(entries
            .iter()
            .map(|e| {
                let description = format!(
                    "{} is a {} favorite in {} with a loyal lunch crowd.",
                    e.name, e.category, criteria.location
                );
                let review = format!(
                    "\"Busy at noon but the line moves; best {} around.\"",
                    e.category.to_lowercase()
                );
                build_record(
                    SOURCE_NAME,
                    SourceCategory::Directory,
                    format!("yelp-{:03}", e.index + 1),
                    vec![
                        (field::NAME, variant_name(e)),
                        (field::LOCATION, criteria.location.clone()),
                        (field::ADDRESS, e.address(&criteria.location)),
                        (field::PHONE, e.alt_phone.clone()),
                        (field::WEBSITE, e.website()),
                        (field::CATEGORY, e.category.clone()),
                        (field::RATING, format!("4.{}", (e.index * 7 + 3) % 10)),
                        (field::REVIEW_COUNT, (25 + e.index * 31).to_string()),
                        (field::DESCRIPTION, description),
                        (field::REVIEW_SNIPPET, review),
                    ],
                )
            })
            .collect())
    }
}
