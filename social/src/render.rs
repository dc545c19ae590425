//! HTML rendering of message text.
//!
//! Two passes over the text: `@name` tokens become profile links when the user exists, then
//! `#name` tokens become hashtag-listing links when the tag already exists. Anything that does
//! not resolve is left as written. The raw text is HTML-escaped before either pass.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use social_core::{Result, TagRegistry, UserDirectory};
use tracing::debug;

static MENTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@(\w+)").expect("mention regex pattern is valid"));
static HASHTAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#(\w+)").expect("hashtag regex pattern is valid"));
// After escaping, every '<' in the text starts a tag emitted by the mention pass.
static ANCHOR_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<a [^>]*>").expect("anchor tag regex pattern is valid"));

/// Builds profile and hashtag-listing URLs from configured prefixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkBuilder {
    profile_prefix: String,
    hashtag_prefix: String,
}

impl LinkBuilder {
    pub fn new(profile_prefix: impl Into<String>, hashtag_prefix: impl Into<String>) -> Self {
        Self {
            profile_prefix: profile_prefix.into(),
            hashtag_prefix: hashtag_prefix.into(),
        }
    }

    /// `{profile_prefix}{username}/`
    pub fn profile_url(&self, username: &str) -> String {
        format!("{}{}/", self.profile_prefix, username)
    }

    /// `{hashtag_prefix}{slug}/`
    pub fn hashtag_url(&self, slug: &str) -> String {
        format!("{}{}/", self.hashtag_prefix, slug)
    }
}

impl Default for LinkBuilder {
    fn default() -> Self {
        Self::new("/users/", "/social/hashtag/")
    }
}

/// Renders `text` to HTML. Tags are looked up, never created.
pub async fn to_html(
    text: &str,
    users: &dyn UserDirectory,
    tags: &dyn TagRegistry,
    links: &LinkBuilder,
) -> Result<String> {
    let escaped = escape_html(text);
    let html = link_mentions(&escaped, users, links).await?;
    link_hashtags(&html, tags, links).await
}

async fn link_mentions(text: &str, users: &dyn UserDirectory, links: &LinkBuilder) -> Result<String> {
    let names = captured_names(&MENTION_RE, text);
    if names.is_empty() {
        return Ok(text.to_string());
    }

    let known: HashMap<String, String> = users
        .find_by_usernames(&names)
        .await?
        .into_iter()
        .map(|user| {
            let url = links.profile_url(&user.username);
            (user.username, url)
        })
        .collect();
    debug!(candidates = names.len(), resolved = known.len(), "Resolved mentions");

    Ok(MENTION_RE
        .replace_all(text, |caps: &Captures| match known.get(&caps[1]) {
            Some(url) => format!(r#"<a href="{}">@{}</a>"#, url, &caps[1]),
            None => caps[0].to_string(),
        })
        .into_owned())
}

async fn link_hashtags(text: &str, tags: &dyn TagRegistry, links: &LinkBuilder) -> Result<String> {
    let mut names = Vec::new();
    for segment in outside_anchor_tags(text) {
        for name in captured_names(&HASHTAG_RE, segment) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    if names.is_empty() {
        return Ok(text.to_string());
    }

    let known: HashMap<String, String> = tags
        .find_by_names(&names)
        .await?
        .into_iter()
        .map(|tag| {
            let url = links.hashtag_url(&tag.slug);
            (tag.name, url)
        })
        .collect();
    debug!(candidates = names.len(), resolved = known.len(), "Resolved hashtags");

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for tag in ANCHOR_TAG_RE.find_iter(text) {
        out.push_str(&link_known_hashtags(&text[last..tag.start()], &known));
        out.push_str(tag.as_str());
        last = tag.end();
    }
    out.push_str(&link_known_hashtags(&text[last..], &known));
    Ok(out)
}

fn link_known_hashtags(text: &str, known: &HashMap<String, String>) -> String {
    HASHTAG_RE
        .replace_all(text, |caps: &Captures| match known.get(&caps[1]) {
            Some(url) => format!(r#"<a href="{}">#{}</a>"#, url, &caps[1]),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// The stretches of `html` between `<a ...>` opening tags.
fn outside_anchor_tags(html: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut last = 0;
    for tag in ANCHOR_TAG_RE.find_iter(html) {
        segments.push(&html[last..tag.start()]);
        last = tag.end();
    }
    segments.push(&html[last..]);
    segments
}

fn captured_names(re: &Regex, text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in re.captures_iter(text) {
        let name = &caps[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

// Escapes contain neither '@' nor '#'.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inmemory::{InMemoryTagRegistry, InMemoryUserDirectory};

    async fn fixtures() -> (InMemoryUserDirectory, InMemoryTagRegistry) {
        let users = InMemoryUserDirectory::new();
        users.register("alice").await;
        let tags = InMemoryTagRegistry::new();
        tags.get_or_create_tag("Rust Lang").await;
        tags.get_or_create_tag("foo").await;
        (users, tags)
    }

    #[tokio::test]
    async fn test_known_mention_linked_unknown_hashtag_literal() {
        let users = InMemoryUserDirectory::new();
        users.register("alice").await;
        let tags = InMemoryTagRegistry::new();

        let html = to_html("@alice hi #foo", &users, &tags, &LinkBuilder::default())
            .await
            .unwrap();

        assert_eq!(html, r#"<a href="/users/alice/">@alice</a> hi #foo"#);
    }

    #[tokio::test]
    async fn test_known_hashtag_uses_slug() {
        let users = InMemoryUserDirectory::new();
        let tags = InMemoryTagRegistry::new();
        tags.get_or_create_tag("Rust").await;

        let html = to_html("learn #Rust today", &users, &tags, &LinkBuilder::default())
            .await
            .unwrap();

        assert_eq!(html, r#"learn <a href="/social/hashtag/rust/">#Rust</a> today"#);
    }

    #[tokio::test]
    async fn test_unknown_mention_and_case_mismatch_unchanged() {
        let (users, tags) = fixtures().await;

        let html = to_html("@bob @Alice #Foo", &users, &tags, &LinkBuilder::default())
            .await
            .unwrap();

        assert_eq!(html, "@bob @Alice #Foo");
    }

    #[tokio::test]
    async fn test_word_boundary_and_repeats() {
        let (users, tags) = fixtures().await;

        let html = to_html("@alice, @alice's #foo.", &users, &tags, &LinkBuilder::default())
            .await
            .unwrap();

        assert_eq!(
            html,
            concat!(
                r#"<a href="/users/alice/">@alice</a>, "#,
                r#"<a href="/users/alice/">@alice</a>'s "#,
                r#"<a href="/social/hashtag/foo/">#foo</a>."#
            )
        );
    }

    #[tokio::test]
    async fn test_markup_is_escaped() {
        let (users, tags) = fixtures().await;

        let html = to_html(r#"<b>"hi"</b> & @alice"#, &users, &tags, &LinkBuilder::default())
            .await
            .unwrap();

        assert_eq!(
            html,
            r#"&lt;b&gt;&quot;hi&quot;&lt;/b&gt; &amp; <a href="/users/alice/">@alice</a>"#
        );
    }

    #[tokio::test]
    async fn test_custom_link_prefixes() {
        let (users, tags) = fixtures().await;
        let links = LinkBuilder::new("https://example.org/u/", "https://example.org/t/");

        let html = to_html("@alice #foo", &users, &tags, &links).await.unwrap();

        assert_eq!(
            html,
            r#"<a href="https://example.org/u/alice/">@alice</a> <a href="https://example.org/t/foo/">#foo</a>"#
        );
    }

    #[tokio::test]
    async fn test_hashtag_in_profile_url_not_relinked() {
        let (users, tags) = fixtures().await;
        tags.get_or_create_tag("users").await;
        let links = LinkBuilder::new("/app#users/", "/social/hashtag/");

        let html = to_html("@alice #users", &users, &tags, &links).await.unwrap();

        assert_eq!(
            html,
            r#"<a href="/app#users/alice/">@alice</a> <a href="/social/hashtag/users/">#users</a>"#
        );
    }

    #[tokio::test]
    async fn test_plain_text_and_empty() {
        let (users, tags) = fixtures().await;

        assert_eq!(
            to_html("just text", &users, &tags, &LinkBuilder::default())
                .await
                .unwrap(),
            "just text"
        );
        assert_eq!(
            to_html("", &users, &tags, &LinkBuilder::default())
                .await
                .unwrap(),
            ""
        );
    }
}
