//! Stub adapter modeled on a professional social network.
//!
//! The social source: company descriptions, staff listings with titles
//! and work emails, and a bio mentioning a reachable phone. This is the
//! material the contact extractor feeds on.

use async_trait::async_trait;
use tracing::debug;

use prospector_shared::{RawBusinessRecord, Result, SearchCriteria, SourceCategory, field};

use super::{SourceAdapter, build_record, catalog};

const SOURCE_NAME: &str = "linkedin";
const MAX_RESULTS: usize = 3;

pub struct LinkedinAdapter;

#[async_trait]
impl SourceAdapter for LinkedinAdapter {
    fn source_name(&self) -> &str {
        SOURCE_NAME
    }

    fn category(&self) -> SourceCategory {
        SourceCategory::SocialMedia
    }

    async fn fetch(&self, criteria: &SearchCriteria) -> Result<Vec<RawBusinessRecord>> {
        debug!(
            industry = %criteria.industry,
            location = %criteria.location,
            limit = criteria.limit,
            "serving stub social results"
        );

        let entries = catalog::sample_businesses(criteria, criteria.limit.min(MAX_RESULTS));
        Ok(entries
            .iter()
            .map(|e| {
                let principal = catalog::person_name(e.index, 0);
                let ops = catalog::person_name(e.index, 1);
                let sales = catalog::person_name(e.index, 2);
                let principal_title = ["CEO", "Owner", "Founder"][e.index % 3];

                let staff = format!(
                    "{principal}, {principal_title} - {}; {ops}, Operations Manager - {}; {sales}, Senior Sales Lead - {}",
                    catalog::person_email(&principal, &e.domain),
                    catalog::person_email(&ops, &e.domain),
                    catalog::person_email(&sales, &e.domain),
                );
                let description = format!(
                    "{} serves {} from {}. Founded by {principal}.",
                    e.name, criteria.location, e.street
                );
                let social_bio = format!(
                    "Family-run since {}. Questions? Call {principal} at {}.",
                    1985 + e.index * 7,
                    e.phone
                );

                build_record(
                    SOURCE_NAME,
                    SourceCategory::SocialMedia,
                    format!("li-{:03}", e.index + 1),
                    vec![
                        (field::NAME, e.name.clone()),
                        (field::LOCATION, criteria.location.clone()),
                        (field::WEBSITE, e.website()),
                        (field::DESCRIPTION, description),
                        (field::STAFF, staff),
                        (field::SOCIAL_BIO, social_bio),
                        (field::EMPLOYEE_COUNT, (12 + 8 * e.index).to_string()),
                    ],
                )
            })
            .collect())
    }
}
