//! Hashtag and mention extraction.
//!
//! Both extractors work on whitespace-separated tokens and keep the first occurrence of each
//! name. Names are not validated or case-folded.

use social_core::{Result, UserDirectory, UserRef};

/// Names of `#`-prefixed tokens, with `.`, `;` and `,` treated as whitespace first.
///
/// `"hello #foo, #bar."` yields `["foo", "bar"]`.
pub fn extract_hashtags(text: &str) -> Vec<String> {
    let normalized = text.replace(['.', ';', ','], " ");
    distinct_prefixed(normalized.split_whitespace(), '#')
}

/// Candidate usernames of `@`-prefixed tokens. Punctuation is kept, so `@alice,` yields `alice,`.
pub fn extract_mention_candidates(text: &str) -> Vec<String> {
    distinct_prefixed(text.split_whitespace(), '@')
}

/// Registered users mentioned in `text`; candidates with no matching user are dropped.
pub async fn extract_mentioned_users(
    text: &str,
    directory: &dyn UserDirectory,
) -> Result<Vec<UserRef>> {
    let candidates = extract_mention_candidates(text);
    if candidates.is_empty() {
        return Ok(Vec::new());
    }
    directory.find_by_usernames(&candidates).await
}

fn distinct_prefixed<'a>(words: impl Iterator<Item = &'a str>, prefix: char) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for word in words {
        if let Some(name) = word.strip_prefix(prefix) {
            if !name.is_empty() && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    names
}
