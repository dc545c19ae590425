//! Hashtag record and slug helpers.

use serde::{Deserialize, Serialize};

/// A stored hashtag. `name` is unique and exact-case; `slug` is unique and URL-safe.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

impl Tag {
    pub fn new(id: i64, name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            slug: slug.into(),
        }
    }
}

/// Lowercases `name`, drops characters that are neither word characters nor separators,
/// and collapses whitespace/hyphen runs into a single `-`. Returns `"tag"` when nothing is left.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.trim().chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() || c == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '-' {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        "tag".to_string()
    } else {
        slug
    }
}

/// The `attempt`-th slug to try for `base`: `base`, `base_1`, `base_2`, ...
pub fn slug_candidate(base: &str, attempt: usize) -> String {
    if attempt == 0 {
        base.to_string()
    } else {
        format!("{}_{}", base, attempt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_lowercases_and_joins_words() {
        assert_eq!(slugify("Rust Lang"), "rust-lang");
        assert_eq!(slugify("foo"), "foo");
        assert_eq!(slugify("Foo--Bar  baz"), "foo-bar-baz");
    }

    #[test]
    fn test_slugify_drops_punctuation() {
        assert_eq!(slugify("c++!"), "c");
        assert_eq!(slugify("snake_case"), "snake_case");
        assert_eq!(slugify("música"), "música");
    }

    #[test]
    fn test_slugify_empty_falls_back() {
        assert_eq!(slugify(""), "tag");
        assert_eq!(slugify("?!"), "tag");
    }

    #[test]
    fn test_slug_candidate_suffixes() {
        assert_eq!(slug_candidate("foo", 0), "foo");
        assert_eq!(slug_candidate("foo", 1), "foo_1");
        assert_eq!(slug_candidate("foo", 12), "foo_12");
    }
}
