//! Rich-text markup as seen by the core.
//!
//! The editor itself is external. All the core needs is a markup string that
//! can be read and written as plain text.

use std::sync::LazyLock;

use regex::Regex;

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("Invalid tag regex pattern"));

static WHITESPACE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex pattern"));

/// Markup produced by the rich-text editor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RichText(String);

impl RichText {
    #[must_use]
    pub fn new(markup: impl Into<String>) -> Self {
        Self(markup.into())
    }

    #[must_use]
    pub fn as_markup(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_markup(self) -> String {
        self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Readable text: every tag becomes a space, basic entities are decoded
    /// and runs of whitespace collapse to one space.
    #[must_use]
    pub fn plain_text(&self) -> String {
        let without_tags = TAG_PATTERN.replace_all(&self.0, " ");
        let decoded = decode_entities(&without_tags);
        WHITESPACE_PATTERN
            .replace_all(&decoded, " ")
            .trim()
            .to_string()
    }

    /// Wraps each non-empty line in a paragraph, escaping markup characters.
    #[must_use]
    pub fn from_plain_text(text: &str) -> Self {
        let markup = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| format!("<p>{}</p>", encode_entities(line)))
            .collect::<String>();
        Self(markup)
    }
}

impl From<String> for RichText {
    fn from(markup: String) -> Self {
        Self(markup)
    }
}

impl From<&str> for RichText {
    fn from(markup: &str) -> Self {
        Self(markup.to_string())
    }
}

impl std::fmt::Display for RichText {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.0)
    }
}

// `&amp;` last, so `&amp;lt;` decodes to `&lt;` and not `<`.
fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn encode_entities(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
