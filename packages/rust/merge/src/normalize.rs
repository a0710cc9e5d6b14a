//! Normalization keys for business identity.
//!
//! Two records describe the same business when their normalized name and
//! location tokens match. Normalization lowercases, drops punctuation
//! outright (so "Joe's" and "Joes" collide), and collapses whitespace.

use sha2::{Digest, Sha256};

/// Hex length of a [`profile_id`].
const PROFILE_ID_LEN: usize = 16;

/// Normalize a name or location token: lowercase, punctuation removed,
/// whitespace collapsed to single spaces.
pub fn normalize_token(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_space = false;

    for ch in input.chars() {
        if ch.is_whitespace() {
            pending_space = true;
        } else if ch.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.extend(ch.to_lowercase());
        }
        // Punctuation contributes nothing, not even a boundary.
    }

    out
}

/// Merge key for a (name, location) pair. The separator cannot appear in
/// normalized tokens, so distinct pairs never collide.
pub fn merge_key(name: &str, location: &str) -> String {
    format!("{}|{}", normalize_token(name), normalize_token(location))
}

/// Stable profile identifier derived from a merge key.
pub fn profile_id(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    let digest = hasher.finalize();
    format!("{digest:x}")[..PROFILE_ID_LEN].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_normalization() {
        assert_eq!(normalize_token("Joe's Pizza"), "joes pizza");
        assert_eq!(normalize_token("JOES  PIZZA!!"), "joes pizza");
        assert_eq!(normalize_token("  New York, NY "), "new york ny");
        assert_eq!(normalize_token("Café São"), "café são");
        assert_eq!(normalize_token("---"), "");
    }

    #[test]
    fn variants_share_a_key() {
        let a = merge_key("Joe's Pizza", "New York, NY");
        let b = merge_key("JOES PIZZA", "new york ny");
        assert_eq!(a, b);

        let other = merge_key("Joe's Pizza", "Brooklyn, NY");
        assert_ne!(a, other);
    }

    #[test]
    fn profile_id_is_stable_and_short() {
        let key = merge_key("Joe's Pizza", "New York, NY");
        let id = profile_id(&key);
        assert_eq!(id.len(), 16);
        assert_eq!(id, profile_id(&key));
        assert_ne!(id, profile_id(&merge_key("Joe's Pizza", "Brooklyn, NY")));
    }
}
