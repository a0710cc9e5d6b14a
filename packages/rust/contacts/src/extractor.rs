//! Contact extraction from profile text.
//!
//! Scans the free-text fields of every raw record retained on a profile
//! (descriptions, staff listings, social bios, review snippets) for
//! person names co-located with emails, phones, or title keywords.
//! Mentions of the same person across records are merged by normalized
//! name, then each contact is scored once over its accumulated state.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use prospector_merge::normalize_token;
use prospector_shared::config::ScoringWeights;
use prospector_shared::{
    BusinessProfile, Contact, Evidence, ProspectorError, Result, field,
};

use crate::scorer::{self, is_title_keyword, title_tier};

/// Profile record fields worth scanning for people.
const TEXT_FIELDS: &[&str] = &[
    field::DESCRIPTION,
    field::STAFF,
    field::SOCIAL_BIO,
    field::REVIEW_SNIPPET,
];

/// Longest evidence snippet kept verbatim.
const SNIPPET_MAX: usize = 160;

// ---------------------------------------------------------------------------
// Patterns, compiled once per process
// ---------------------------------------------------------------------------

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid regex")
});

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b").expect("valid regex"));

// "Jane Smith, CEO" / "Marcus Reyes, Operations Manager". Title words
// are capitalized (allowing "of" as a connector), so prose after a
// name-comma does not get swallowed.
static NAME_TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Z][a-z]+(?: [A-Z][a-z]+){1,2}),\s+([A-Z][A-Za-z]*(?: (?:of|[A-Z][A-Za-z]*)){0,3})")
        .expect("valid regex")
});

// "Owner Maria Lopez", "CEO Jane Smith".
static TITLE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(ceo|president|owner|founder|vice president|vp|managing director|director|manager|head|chief)\b(?-i)\s+([A-Z][a-z]+(?: [A-Z][a-z]+){1,2})",
    )
    .expect("valid regex")
});

static FOUNDED_BY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[Ff]ounded by ([A-Z][a-z]+(?: [A-Z][a-z]+){1,2})").expect("valid regex")
});

// Runs of capitalized words that might be a person name.
static PERSON_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z][a-z]+(?: [A-Z][a-z]+){1,3}\b").expect("valid regex"));

// Capitalized sentence openers that glue onto name runs.
const LEADING_STOPWORDS: &[&str] = &[
    "call", "contact", "email", "visit", "ask", "meet", "the", "our", "questions", "welcome",
];

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Extract and score every contact mentioned in the profile's records.
///
/// Low-confidence contacts are kept with a near-zero score; filtering
/// by score is the caller's concern. Output is sorted by score
/// descending, ties by name.
#[instrument(skip_all, fields(profile = %profile.display_name()))]
pub fn extract_contacts(
    profile: &BusinessProfile,
    weights: &ScoringWeights,
) -> Result<Vec<Contact>> {
    validate_weights(profile, weights)?;

    let host = scorer::website_host(profile);
    let mut builders: BTreeMap<String, ContactBuilder> = BTreeMap::new();

    for record in &profile.records {
        for field_name in TEXT_FIELDS {
            if let Some(text) = record.field(field_name) {
                scan_text(&mut builders, text, &record.source_id);
            }
        }
    }

    let mut contacts: Vec<Contact> = builders
        .into_values()
        .map(|builder| {
            let mut contact = Contact {
                name: builder.name,
                role_title: builder.title,
                emails: builder.emails,
                phones: builder.phones,
                decision_maker_score: 0.0,
                evidence: builder.evidence,
            };
            contact.decision_maker_score =
                scorer::score_contact(&contact, host.as_deref(), weights);
            contact
        })
        .collect();

    contacts.sort_by(|a, b| {
        b.decision_maker_score
            .total_cmp(&a.decision_maker_score)
            .then_with(|| a.name.cmp(&b.name))
    });

    debug!(contacts = contacts.len(), "contact extraction finished");
    Ok(contacts)
}

fn validate_weights(profile: &BusinessProfile, weights: &ScoringWeights) -> Result<()> {
    let labeled = [
        ("title_seniority", weights.title_seniority),
        ("domain_email", weights.domain_email),
        ("phone", weights.phone),
        ("evidence", weights.evidence),
    ];
    for (label, value) in labeled {
        if !value.is_finite() || value < 0.0 {
            return Err(ProspectorError::extraction(
                profile.display_name(),
                format!("scoring weight {label} must be a non-negative number, got {value}"),
            ));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Text scanning
// ---------------------------------------------------------------------------

struct ContactBuilder {
    name: String,
    title: Option<String>,
    emails: BTreeSet<String>,
    phones: BTreeSet<String>,
    evidence: Vec<Evidence>,
}

impl ContactBuilder {
    fn new(name: String) -> Self {
        Self {
            name,
            title: None,
            emails: BTreeSet::new(),
            phones: BTreeSet::new(),
            evidence: Vec::new(),
        }
    }

    // Keep the highest-tier title seen for this person.
    fn absorb_title(&mut self, title: Option<String>) {
        let new_tier = title.as_deref().map(title_tier).unwrap_or(-1.0);
        let old_tier = self.title.as_deref().map(title_tier).unwrap_or(-1.0);
        if new_tier > old_tier {
            self.title = title;
        }
    }

    fn push_evidence(&mut self, evidence: Evidence) {
        let duplicate = self
            .evidence
            .iter()
            .any(|e| e.source_id == evidence.source_id && e.snippet == evidence.snippet);
        if !duplicate {
            self.evidence.push(evidence);
        }
    }
}

struct Mention {
    name: String,
    title: Option<String>,
}

fn scan_text(builders: &mut BTreeMap<String, ContactBuilder>, text: &str, source_id: &str) {
    for segment in split_segments(text) {
        let emails: Vec<&str> = EMAIL_RE.find_iter(segment).map(|m| m.as_str()).collect();
        let phones: Vec<&str> = PHONE_RE.find_iter(segment).map(|m| m.as_str()).collect();
        let mentions = collect_mentions(segment);
        let sole_mention = mentions.len() == 1;

        for mention in mentions {
            // A bare name needs a co-located signal to count.
            if mention.title.is_none()
                && emails.is_empty()
                && phones.is_empty()
                && !is_title_keyword(segment)
            {
                continue;
            }

            let key = normalize_token(&mention.name);
            if key.is_empty() {
                continue;
            }
            let builder = builders
                .entry(key)
                .or_insert_with(|| ContactBuilder::new(mention.name.clone()));
            builder.absorb_title(mention.title);
            for email in emails_for(&mention.name, &emails, sole_mention) {
                builder.emails.insert(email);
            }
            if sole_mention {
                for phone in &phones {
                    builder.phones.insert((*phone).to_string());
                }
            }
            builder.push_evidence(Evidence {
                source_id: source_id.to_string(),
                snippet: snippet_of(segment),
            });
        }
    }
}

fn split_segments(text: &str) -> Vec<&str> {
    text.split([';', '\n'])
        .flat_map(|part| part.split(". "))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn collect_mentions(segment: &str) -> Vec<Mention> {
    let mut mentions: Vec<Mention> = Vec::new();

    for cap in NAME_TITLE_RE.captures_iter(segment) {
        let title = cap[2].trim().to_string();
        let title = is_title_keyword(&title).then_some(title);
        push_mention(&mut mentions, cap[1].to_string(), title);
    }
    for cap in TITLE_NAME_RE.captures_iter(segment) {
        push_mention(&mut mentions, cap[2].to_string(), Some(cap[1].to_string()));
    }
    for cap in FOUNDED_BY_RE.captures_iter(segment) {
        push_mention(&mut mentions, cap[1].to_string(), Some("Founder".to_string()));
    }
    for m in PERSON_RUN_RE.find_iter(segment) {
        if let Some(name) = trim_person_run(m.as_str()) {
            push_mention(&mut mentions, name, None);
        }
    }

    mentions
}

fn push_mention(mentions: &mut Vec<Mention>, name: String, title: Option<String>) {
    let key = normalize_token(&name);
    if key.is_empty() {
        return;
    }
    if let Some(existing) = mentions
        .iter_mut()
        .find(|m| normalize_token(&m.name) == key)
    {
        let new_tier = title.as_deref().map(title_tier).unwrap_or(-1.0);
        let old_tier = existing.title.as_deref().map(title_tier).unwrap_or(-1.0);
        if new_tier > old_tier {
            existing.title = title;
        }
    } else {
        mentions.push(Mention { name, title });
    }
}

fn trim_person_run(run: &str) -> Option<String> {
    let mut tokens: Vec<&str> = run.split(' ').collect();
    while let Some(first) = tokens.first() {
        if LEADING_STOPWORDS.contains(&first.to_lowercase().as_str()) {
            tokens.remove(0);
        } else {
            break;
        }
    }
    // Two or three remaining words reads like a person name.
    if tokens.len() < 2 || tokens.len() > 3 {
        return None;
    }
    Some(tokens.join(" "))
}

fn emails_for(name: &str, emails: &[&str], sole_mention: bool) -> Vec<String> {
    let normalized = normalize_token(name);
    let tokens: Vec<&str> = normalized.split(' ').filter(|t| !t.is_empty()).collect();
    let matched: Vec<String> = emails
        .iter()
        .filter(|email| {
            let local = email
                .rsplit_once('@')
                .map(|(local, _)| local)
                .unwrap_or(email)
                .to_lowercase();
            tokens.iter().any(|t| local.contains(t))
        })
        .map(|email| email.to_lowercase())
        .collect();
    if matched.is_empty() && sole_mention {
        return emails.iter().map(|email| email.to_lowercase()).collect();
    }
    matched
}

fn snippet_of(segment: &str) -> String {
    if segment.len() <= SNIPPET_MAX {
        return segment.to_string();
    }
    let mut end = SNIPPET_MAX;
    while !segment.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &segment[..end])
}
