//! Parsed article records produced by the input parser.
//!
//! A [`ParsedArticle`] is a plain value: every field is always a string or a
//! list, never absent. An article with no image has an empty `image_url`.

use serde::{Deserialize, Serialize};

use crate::sources::SourceList;

/// A citation record attached to an article.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Source {
    /// Human-readable label (anchor text, list title or hostname).
    pub title: String,
    /// Absolute URL of the cited page.
    pub url: String,
}

impl Source {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self { title: title.into(), url: url.into() }
    }
}

/// One article recovered from raw input.
///
/// Instances are created fresh on every parse. To narrow the sources, build a
/// new value with [`ParsedArticle::with_sources`] rather than editing in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedArticle {
    /// Best-effort headline.
    pub title: String,

    /// First discovered image reference, or empty.
    pub image_url: String,

    /// Body text, paragraphs separated by a blank line.
    pub text: String,

    /// Sources in discovery order, unique by URL.
    pub sources: Vec<Source>,
}

impl ParsedArticle {
    /// Creates an article, de-duplicating `sources` by URL.
    pub fn new(title: String, image_url: String, text: String, sources: Vec<Source>) -> Self {
        let sources = sources.into_iter().collect::<SourceList>().into_vec();
        Self { title, image_url, text, sources }
    }

    /// Returns a copy of this article carrying a different source list.
    pub fn with_sources(&self, sources: Vec<Source>) -> Self {
        Self::new(self.title.clone(), self.image_url.clone(), self.text.clone(), sources)
    }

    /// True when title, text and image are all blank.
    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty() && self.text.trim().is_empty() && self.image_url.trim().is_empty()
    }

    /// Number of words in the body.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Fill an empty title from the body and an empty body from the title.
    ///
    /// `title_chars` bounds the derived title length in characters.
    pub(crate) fn backfill(&mut self, title_chars: usize) {
        if self.text.is_empty() && !self.title.is_empty() {
            self.text = self.title.clone();
        }
        if self.title.is_empty() && !self.text.is_empty() {
            self.title = self.text.chars().take(title_chars).collect();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_deduplicates_sources() {
        let article = ParsedArticle::new(
            "Title".to_string(),
            String::new(),
            "Body".to_string(),
            vec![
                Source::new("One", "https://a.example/1"),
                Source::new("Duplicate", "https://a.example/1"),
                Source::new("Two", "https://b.example/2"),
            ],
        );

        assert_eq!(article.sources.len(), 2);
        assert_eq!(article.sources[0].title, "One");
    }

    #[test]
    fn test_with_sources_leaves_original_untouched() {
        let article = ParsedArticle::new(
            "Title".to_string(),
            String::new(),
            "Body".to_string(),
            vec![Source::new("One", "https://a.example/1")],
        );

        let narrowed = article.with_sources(Vec::new());
        assert!(narrowed.sources.is_empty());
        assert_eq!(article.sources.len(), 1);
        assert_eq!(narrowed.title, article.title);
    }

    #[test]
    fn test_backfill_title_from_text() {
        let mut article = ParsedArticle { text: "x".repeat(100), ..Default::default() };
        article.backfill(70);
        assert_eq!(article.title.chars().count(), 70);
    }

    #[test]
    fn test_backfill_text_from_title() {
        let mut article = ParsedArticle { title: "Only a title".to_string(), ..Default::default() };
        article.backfill(70);
        assert_eq!(article.text, "Only a title");
    }

    #[test]
    fn test_serialization_uses_camel_case() {
        let article = ParsedArticle { image_url: "https://img.example/a.png".to_string(), ..Default::default() };
        let json = serde_json::to_string(&article).unwrap();
        assert!(json.contains(r#""imageUrl":"https://img.example/a.png""#));
    }

    #[test]
    fn test_is_blank() {
        assert!(ParsedArticle::default().is_blank());
        assert!(!ParsedArticle { title: "T".to_string(), ..Default::default() }.is_blank());
    }
}
