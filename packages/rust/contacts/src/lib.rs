//! Contact extraction and decision-maker scoring.
//!
//! Turns the free text retained on a merged profile into deduplicated,
//! scored [`Contact`](prospector_shared::Contact) entries. Extraction
//! never drops a low-confidence contact; callers filter by score.

pub mod extractor;
pub mod scorer;

pub use extractor::extract_contacts;
pub use scorer::{decision_makers, score_contact, title_tier, website_host};
