//! Stub adapter modeled on a maps/places directory provider.
//!
//! Richest of the directory stubs: full address, phone, website, rating,
//! and hours for up to five businesses per criteria pair.

use async_trait::async_trait;
use tracing::debug;

use prospector_shared::{RawBusinessRecord, Result, SearchCriteria, SourceCategory, field};

use super::{SourceAdapter, build_record, catalog};

const SOURCE_NAME: &str = "google_maps";
const MAX_RESULTS: usize = 5;

pub struct GoogleMapsAdapter;

#[async_trait]
impl SourceAdapter for GoogleMapsAdapter {
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
            "serving stub directory results"
        );

        let entries = catalog::sample_businesses(criteria, criteria.limit.min(MAX_RESULTS));
        Ok(entries
            .iter()
            .map(|e| {
                build_record(
                    SOURCE_NAME,
                    SourceCategory::Directory,
                    format!("gm-{:03}", e.index + 1),
                    vec![
                        (field::NAME, e.name.clone()),
                        (field::LOCATION, criteria.location.clone()),
                        (field::ADDRESS, e.address(&criteria.location)),
                        (field::PHONE, e.phone.clone()),
                        (field::WEBSITE, e.website()),
                        (field::CATEGORY, e.category.clone()),
                        (field::RATING, format!("4.{}", (e.index * 3 + 1) % 10)),
                        (field::REVIEW_COUNT, (40 + e.index * 27).to_string()),
                        (field::HOURS, "Mon-Sat 9:00-21:00".to_string()),
                    ],
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn caps_at_five_and_respects_limit() {
        let adapter = GoogleMapsAdapter;

        let criteria = SearchCriteria::new("restaurants", "New York, NY", 50).expect("criteria");
        let records = adapter.fetch(&criteria).await.expect("fetch");
        assert_eq!(records.len(), MAX_RESULTS);

        let criteria = SearchCriteria::new("restaurants", "New York, NY", 2).expect("criteria");
        let records = adapter.fetch(&criteria).await.expect("fetch");
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn records_are_deterministic_and_complete() {
        let adapter = GoogleMapsAdapter;
        let criteria = SearchCriteria::new("restaurants", "New York, NY", 3).expect("criteria");

        let a = adapter.fetch(&criteria).await.expect("fetch");
        let b = adapter.fetch(&criteria).await.expect("fetch");
        assert_eq!(a[0].fields, b[0].fields);

        let first = &a[0];
        assert_eq!(first.source_id, "gm-001");
        assert_eq!(first.field(field::NAME), Some("Joe's Pizza"));
        assert_eq!(first.field(field::LOCATION), Some("New York, NY"));
        assert!(first.field(field::PHONE).is_some());
        assert!(first.field(field::WEBSITE).is_some());
    }
}
