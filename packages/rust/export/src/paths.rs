//! Path-safe naming for run and business directories.

use chrono::{DateTime, Utc};
use prospector_merge::normalize_token;
use prospector_shared::{BusinessProfile, SearchCriteria};

/// Longest sanitized component kept in a directory name.
const COMPONENT_CAP: usize = 50;

/// Sanitize one directory-name component: lowercase, every run of
/// non-alphanumeric characters collapsed to a single `_`, trimmed and
/// capped. Never empty.
pub fn safe_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
    }
    // ASCII by construction, so byte truncation is safe.
    out.truncate(COMPONENT_CAP);
    while out.ends_with('_') {
        out.pop();
    }
    if out.is_empty() {
        "unknown".to_string()
    } else {
        out
    }
}

/// Run directory name: `{industry}_{location}_{YYYYMMDD}_{HHMMSS}`,
/// timestamp in UTC.
pub fn run_dir_name(criteria: &SearchCriteria, started_at: &DateTime<Utc>) -> String {
    format!(
        "{}_{}_{}",
        safe_component(&criteria.industry),
        safe_component(&criteria.location),
        started_at.format("%Y%m%d_%H%M%S"),
    )
}

/// Business directory name from the normalized profile name. Collision
/// handling (profile-id suffixing) is the caller's concern.
pub fn business_dir_name(profile: &BusinessProfile) -> String {
    safe_component(&normalize_token(profile.display_name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn components_are_sanitized_and_collapsed() {
        assert_eq!(safe_component("Seattle, WA"), "seattle_wa");
        assert_eq!(safe_component("coffee & tea!!"), "coffee_tea");
        assert_eq!(safe_component("__already__safe__"), "already_safe");
        assert_eq!(safe_component("***"), "unknown");
    }

    #[test]
    fn long_components_are_capped() {
        let long = "a".repeat(80);
        assert_eq!(safe_component(&long).len(), 50);
    }

    #[test]
    fn run_dir_name_embeds_utc_timestamp() {
        let criteria = SearchCriteria::new("restaurants", "Seattle, WA", 5).unwrap();
        let started = Utc.with_ymd_and_hms(2025, 8, 25, 14, 30, 12).unwrap();
        assert_eq!(
            run_dir_name(&criteria, &started),
            "restaurants_seattle_wa_20250825_143012"
        );
    }

    #[test]
    fn business_dir_uses_normalized_name() {
        let mut profile = BusinessProfile {
            profile_id: "abc123".into(),
            names: std::iter::once("Joe's Pizza".to_string()).collect(),
            fields: Default::default(),
            contacts: vec![],
            records: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(business_dir_name(&profile), "joes_pizza");

        profile.names.clear();
        assert_eq!(business_dir_name(&profile), "abc123");
    }
}
