//! Decision-maker scoring.
//!
//! Each contact gets a weighted sum over four signals: title seniority,
//! an email at the business's own domain, phone presence, and the
//! amount of independent evidence. Weights are sum-normalized before
//! use, so any non-negative weight table yields scores in [0, 1].

use prospector_shared::config::ScoringWeights;
use prospector_shared::{BusinessProfile, Contact, field};
use url::Url;

// Keyword tiers for title seniority. Matched as lowercase substrings,
// executive first: "Managing Director" is executive, not managerial.
const EXECUTIVE_TITLES: &[&str] = &[
    "ceo",
    "president",
    "owner",
    "founder",
    "chief",
    "vp",
    "vice president",
    "managing director",
];
const MANAGERIAL_TITLES: &[&str] = &["manager", "director", "head", "principal"];
const SENIOR_TITLES: &[&str] = &["senior", "lead"];

/// Most evidence snippets that still move the score.
const EVIDENCE_CAP: usize = 3;

/// Seniority signal for a title: executive 1.0, managerial 0.5,
/// senior-IC 0.25, anything else 0.0.
pub fn title_tier(title: &str) -> f64 {
    let title = title.to_lowercase();
    if EXECUTIVE_TITLES.iter().any(|kw| title.contains(kw)) {
        1.0
    } else if MANAGERIAL_TITLES.iter().any(|kw| title.contains(kw)) {
        0.5
    } else if SENIOR_TITLES.iter().any(|kw| title.contains(kw)) {
        0.25
    } else {
        0.0
    }
}

/// True if the title carries any seniority keyword at all.
pub fn is_title_keyword(title: &str) -> bool {
    title_tier(title) > 0.0
}

/// The profile's website host, lowercased, with any leading `www.`
/// stripped. `None` when the profile has no parseable website.
pub fn website_host(profile: &BusinessProfile) -> Option<String> {
    let raw = profile.field_value(field::WEBSITE)?.trim().to_string();
    let host = Url::parse(&raw)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .or_else(|| {
            Url::parse(&format!("https://{raw}"))
                .ok()
                .and_then(|u| u.host_str().map(str::to_string))
        })?;
    Some(strip_www(&host.to_lowercase()).to_string())
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

fn email_domain(email: &str) -> Option<String> {
    let (_, domain) = email.rsplit_once('@')?;
    Some(strip_www(&domain.to_lowercase()).to_string())
}

/// Compute the decision-maker score for one contact.
///
/// Deterministic in the contact's accumulated state; adding evidence
/// or a stronger title never lowers the score.
pub fn score_contact(contact: &Contact, website_host: Option<&str>, weights: &ScoringWeights) -> f64 {
    let weights = weights.normalized();

    let title_signal = contact
        .role_title
        .as_deref()
        .map(title_tier)
        .unwrap_or(0.0);

    let domain_signal = match website_host {
        Some(host) => {
            let hit = contact
                .emails
                .iter()
                .filter_map(|e| email_domain(e))
                .any(|d| d == host);
            if hit { 1.0 } else { 0.0 }
        }
        None => 0.0,
    };

    let phone_signal = if contact.phones.is_empty() { 0.0 } else { 1.0 };

    let evidence_signal = contact.evidence.len().min(EVIDENCE_CAP) as f64 / EVIDENCE_CAP as f64;

    weights.title_seniority * title_signal
        + weights.domain_email * domain_signal
        + weights.phone * phone_signal
        + weights.evidence * evidence_signal
}

/// Contacts at or above the threshold, sorted by score descending,
/// ties broken by name.
pub fn decision_makers(contacts: &[Contact], threshold: f64) -> Vec<Contact> {
    let mut picked: Vec<Contact> = contacts
        .iter()
        .filter(|c| c.is_decision_maker(threshold))
        .cloned()
        .collect();
    picked.sort_by(|a, b| {
        b.decision_maker_score
            .total_cmp(&a.decision_maker_score)
            .then_with(|| a.name.cmp(&b.name))
    });
    picked
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn contact(title: Option<&str>, emails: &[&str], phones: &[&str], evidence: usize) -> Contact {
        Contact {
            name: "Test Person".into(),
            role_title: title.map(String::from),
            emails: emails.iter().map(|e| e.to_string()).collect::<BTreeSet<_>>(),
            phones: phones.iter().map(|p| p.to_string()).collect::<BTreeSet<_>>(),
            decision_maker_score: 0.0,
            evidence: (0..evidence)
                .map(|i| prospector_shared::Evidence {
                    source_id: format!("src-{i}"),
                    snippet: format!("snippet {i}"),
                })
                .collect(),
        }
    }

    #[test]
    fn title_tiers() {
        assert_eq!(title_tier("CEO"), 1.0);
        assert_eq!(title_tier("Founder"), 1.0);
        assert_eq!(title_tier("Managing Director"), 1.0);
        assert_eq!(title_tier("Operations Manager"), 0.5);
        assert_eq!(title_tier("Head of Kitchen"), 0.5);
        assert_eq!(title_tier("Senior Sales Lead"), 0.25);
        assert_eq!(title_tier("Barista"), 0.0);
    }

    #[test]
    fn executive_with_domain_email_outscores_senior_ic() {
        let weights = ScoringWeights::default();
        let exec = contact(Some("CEO"), &["jane@acme.example.com"], &[], 2);
        let ic = contact(Some("Senior Sales Lead"), &["pat@gmail.com"], &[], 2);

        let exec_score = score_contact(&exec, Some("acme.example.com"), &weights);
        let ic_score = score_contact(&ic, Some("acme.example.com"), &weights);

        assert!(exec_score > ic_score);
        assert!(exec_score >= 0.6, "got {exec_score}");
        assert!(ic_score < 0.6, "got {ic_score}");
    }

    #[test]
    fn score_never_leaves_unit_interval() {
        // A lopsided weight table still normalizes to [0, 1].
        let weights = ScoringWeights {
            title_seniority: 40.0,
            domain_email: 1.0,
            phone: 900.0,
            evidence: 0.5,
        };
        let maxed = contact(Some("CEO"), &["a@b.example.com"], &["(206) 555-0100"], 10);
        let score = score_contact(&maxed, Some("b.example.com"), &weights);
        assert!((0.0..=1.0).contains(&score), "got {score}");
    }

    #[test]
    fn more_evidence_never_lowers_the_score() {
        let weights = ScoringWeights::default();
        let sparse = contact(Some("Manager"), &[], &[], 1);
        let rich = contact(Some("Manager"), &[], &[], 3);
        assert!(score_contact(&rich, None, &weights) >= score_contact(&sparse, None, &weights));
    }

    #[test]
    fn www_prefix_does_not_break_domain_match() {
        let weights = ScoringWeights {
            title_seniority: 0.0,
            domain_email: 1.0,
            phone: 0.0,
            evidence: 0.0,
        };
        let c = contact(None, &["info@acme.example.com"], &[], 1);
        // Host arrives with www. already stripped by website_host().
        assert_eq!(score_contact(&c, Some("acme.example.com"), &weights), 1.0);
        assert_eq!(score_contact(&c, Some("other.example.com"), &weights), 0.0);
    }

    #[test]
    fn decision_makers_sorted_by_score() {
        let mut a = contact(Some("CEO"), &[], &[], 1);
        a.name = "Alpha".into();
        a.decision_maker_score = 0.9;
        let mut b = contact(Some("Manager"), &[], &[], 1);
        b.name = "Beta".into();
        b.decision_maker_score = 0.65;
        let mut c = contact(None, &[], &[], 1);
        c.name = "Gamma".into();
        c.decision_maker_score = 0.1;

        let picked = decision_makers(&[b, c, a], 0.6);
        let names: Vec<_> = picked.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Beta"]);
    }
}
