//! Deterministic sample-business catalog backing the stub adapters.
//!
//! Every value is a pure function of the search criteria, so repeated runs
//! and tests see identical data. The first few businesses for any criteria
//! pair are served by several adapters under casing/punctuation variants,
//! which keeps the merge and conflict paths exercised end to end.

use sha2::{Digest, Sha256};

use prospector_shared::SearchCriteria;

/// One catalog business, shared by all stub adapters.
pub(crate) struct CatalogEntry {
    pub index: usize,
    /// Canonical display name.
    pub name: String,
    pub street: String,
    /// Phone reported by directory sources that agree.
    pub phone: String,
    /// Conflicting phone variant reported by one dissenting source.
    pub alt_phone: String,
    /// Website host (no scheme).
    pub domain: String,
    pub category: String,
}

impl CatalogEntry {
    pub fn website(&self) -> String {
        format!("https://www.{}", self.domain)
    }

    pub fn address(&self, location: &str) -> String {
        format!("{}, {}", self.street, location)
    }
}

/// Build the first `count` businesses for the given criteria.
pub(crate) fn sample_businesses(criteria: &SearchCriteria, count: usize) -> Vec<CatalogEntry> {
    let stems = name_stems(&criteria.industry);
    let area = area_code(&criteria.location);

    (0..count.min(stems.len()))
        .map(|index| {
            let name = stems[index].clone();
            let last_four = 100 + index * 11;
            CatalogEntry {
                index,
                street: format!("{} {}", 100 + index * 10, STREETS[index % STREETS.len()]),
                phone: format!("({area}) 555-{last_four:04}"),
                alt_phone: format!("({area}) 555-{:04}", last_four + 9),
                domain: format!("{}.example.com", slugify(&name)),
                category: criteria.industry.clone(),
                name,
            }
        })
        .collect()
}

const STREETS: &[&str] = &["Main St", "Second Ave", "Third St", "Harbor Blvd", "Fifth Ave"];

/// Curated name pools for a few common industries; anything else gets a
/// templated roster.
fn name_stems(industry: &str) -> Vec<String> {
    let known: Option<&[&str]> = match industry.trim().to_lowercase().as_str() {
        "restaurants" | "restaurant" => Some(&[
            "Joe's Pizza",
            "The Golden Fork",
            "Harbor Grill",
            "Blue Olive Bistro",
            "Corner Deli",
        ]),
        "technology" | "tech" => Some(&[
            "Bitwise Labs",
            "Northstar Software",
            "Quantum Leap Systems",
            "Cobalt Analytics",
            "Iron Gate Security",
        ]),
        "retail" => Some(&[
            "Main Street Mercantile",
            "The Velvet Hanger",
            "Urban Outpost",
            "Page & Bloom Books",
            "Copper Kettle Goods",
        ]),
        _ => None,
    };

    match known {
        Some(names) => names.iter().map(|n| n.to_string()).collect(),
        None => {
            let title = title_case(industry);
            ["Summit", "Premier", "Metro", "Cornerstone", "Harborview"]
                .iter()
                .map(|stem| format!("{stem} {title}"))
                .collect()
        }
    }
}

/// Deterministic three-digit area code in 200..=899, derived from the
/// location string.
pub(crate) fn area_code(location: &str) -> u32 {
    let digest = Sha256::digest(location.trim().to_lowercase().as_bytes());
    200 + (u32::from(digest[0]) * 256 + u32::from(digest[1])) % 700
}

/// Lowercase a name into a hostname-safe slug.
pub(crate) fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_dash = false;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch.to_ascii_lowercase());
        } else if ch.is_whitespace() || ch == '-' || ch == '&' {
            pending_dash = true;
        }
        // Apostrophes and other punctuation vanish.
    }
    out
}

fn title_case(input: &str) -> String {
    input
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// People (for social/staff listings)
// ---------------------------------------------------------------------------

const FIRST_NAMES: &[&str] = &[
    "Jane", "Marcus", "Elena", "David", "Priya", "Tomas", "Alice", "Victor",
];
const LAST_NAMES: &[&str] = &[
    "Smith", "Reyes", "Petrova", "Kim", "Sharma", "Nguyen", "Walker", "Moreno",
];

/// Deterministic person name for a business seat. Seats within one
/// business never collide.
pub(crate) fn person_name(business_index: usize, seat: usize) -> String {
    let first = FIRST_NAMES[(business_index + seat * 3) % FIRST_NAMES.len()];
    let last = LAST_NAMES[(business_index * 2 + seat) % LAST_NAMES.len()];
    format!("{first} {last}")
}

/// Work email for a person at a business domain.
pub(crate) fn person_email(person: &str, domain: &str) -> String {
    format!("{}@{domain}", person.to_lowercase().replace(' ', "."))
}
