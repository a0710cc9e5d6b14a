//! Stub adapter modeled on a legacy phone-directory listing.
//!
//! Sparse records: name, phone, tenure. The phone matches the maps stub,
//! so where the review stub dissents this source breaks the tie by
//! agreement.

use async_trait::async_trait;
use tracing::debug;

use prospector_shared::{RawBusinessRecord, Result, SearchCriteria, SourceCategory, field};

use super::{SourceAdapter, build_record, catalog};

const SOURCE_NAME: &str = "yellow_pages";
const MAX_RESULTS: usize = 2;

pub struct YellowPagesAdapter;

#[async_trait]
impl SourceAdapter for YellowPagesAdapter {
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
            "serving stub phone-directory results"
        );

        let entries = catalog::sample_businesses(criteria, criteria.limit.min(MAX_RESULTS));
        Ok(entries
            .iter()
            .map(|e| {
                build_record(
                    SOURCE_NAME,
                    SourceCategory::Directory,
                    format!("yp-{:03}", e.index + 1),
                    vec![
                        (field::NAME, e.name.to_uppercase()),
                        (field::LOCATION, criteria.location.clone()),
                        (field::PHONE, e.phone.clone()),
                        (field::CATEGORY, e.category.clone()),
                        (
                            field::YEARS_IN_BUSINESS,
                            ((e.index * 7 + 5) % 25 + 1).to_string(),
                        ),
                    ],
                )
            })
            .collect())
    }
}
