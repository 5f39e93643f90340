//! Raw input parsing API.
//!
//! This module provides the entry point for turning pasted text into
//! [`ParsedArticle`] records. Input is classified into one of three dialects,
//! tried in priority order, each falling through to the next when it yields
//! nothing:
//!
//! 1. [`Dialect::Protocol`]: `ARTICLE <n> TITLE` multi-article text
//! 2. [`Dialect::Html`]: raw HTML (requires the `dom` feature)
//! 3. [`Dialect::PlainText`]: line-oriented fallback
//!
//! # Example
//!
//! ```rust
//! use horus_core::parse_raw_input;
//!
//! let articles = parse_raw_input("My Title\nSome body text.\nhttps://example.com/ref");
//! assert_eq!(articles.len(), 1);
//! assert_eq!(articles[0].title, "My Title");
//! assert_eq!(articles[0].sources[0].title, "example.com");
//! ```

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};
use url::Url;

use crate::article::ParsedArticle;
use crate::perplexity::{looks_like_protocol, parse_protocol};
use crate::plain_text::parse_plain_text;

static HTML_START_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<[a-z][a-z0-9-]*(?:\s[^<>]*)?/?>").expect("html tag regex"));

/// The raw-input formats recognized by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `***`-separated `ARTICLE <n> TITLE` blocks.
    Protocol,
    /// Markup containing at least one HTML start tag.
    Html,
    /// Anything else.
    PlainText,
}

/// Configuration for the input parser.
///
/// # Example
///
/// ```rust
/// use horus_core::ParserConfig;
///
/// let config = ParserConfig::builder()
///     .min_paragraph_chars(40)
///     .title_fallback_chars(60)
///     .build();
/// assert_eq!(config.min_paragraph_chars, 40);
/// ```
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Address of the page the HTML came from (default: none).
    ///
    /// Resolves relative links and images; links to this host are not
    /// treated as sources.
    pub base_url: Option<Url>,

    /// Plain-text title lines must be longer than this (default: 5).
    pub min_title_chars: usize,

    /// HTML body fragments must be longer than this (default: 20).
    pub min_paragraph_chars: usize,

    /// HTML link labels must be longer than this (default: 5).
    pub min_source_title_chars: usize,

    /// Length of a title derived from body text (default: 70).
    pub title_fallback_chars: usize,

    /// Heading text that marks a source-list container (default: "المصادر").
    pub sources_heading: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            min_title_chars: 5,
            min_paragraph_chars: 20,
            min_source_title_chars: 5,
            title_fallback_chars: 70,
            sources_heading: "المصادر".to_string(),
        }
    }
}

impl ParserConfig {
    /// Creates a new builder for ParserConfig.
    pub fn builder() -> ParserConfigBuilder {
        ParserConfigBuilder::new()
    }
}

/// Builder for ParserConfig.
pub struct ParserConfigBuilder {
    config: ParserConfig,
}

impl ParserConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: ParserConfig::default() }
    }

    /// Sets the base URL.
    pub fn base_url(mut self, value: Url) -> Self {
        self.config.base_url = Some(value);
        self
    }

    /// Sets the minimum plain-text title length.
    pub fn min_title_chars(mut self, value: usize) -> Self {
        self.config.min_title_chars = value;
        self
    }

    /// Sets the minimum HTML paragraph length.
    pub fn min_paragraph_chars(mut self, value: usize) -> Self {
        self.config.min_paragraph_chars = value;
        self
    }

    /// Sets the minimum HTML link label length.
    pub fn min_source_title_chars(mut self, value: usize) -> Self {
        self.config.min_source_title_chars = value;
        self
    }

    /// Sets the derived title length.
    pub fn title_fallback_chars(mut self, value: usize) -> Self {
        self.config.title_fallback_chars = value;
        self
    }

    /// Sets the source-list heading text.
    pub fn sources_heading(mut self, value: impl Into<String>) -> Self {
        self.config.sources_heading = value.into();
        self
    }

    /// Builds the config.
    pub fn build(self) -> ParserConfig {
        self.config
    }
}

impl Default for ParserConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Main entry point for input parsing.
///
/// # Example
///
/// ```rust
/// use horus_core::{InputParser, ParserConfig};
///
/// let parser = InputParser::with_config(ParserConfig::default());
/// let articles = parser.parse("<h1>Hello</h1><p>World content here that is long enough.</p>");
/// assert_eq!(articles[0].title, "Hello");
/// ```
#[derive(Debug, Clone, Default)]
pub struct InputParser {
    config: ParserConfig,
}

impl InputParser {
    /// Creates a parser with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parser with a custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// The configuration this parser applies.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parses raw input into articles. Never fails; blank input gives `[]`.
    #[instrument(level = "debug", skip(self, raw), fields(len = raw.len()))]
    pub fn parse(&self, raw: &str) -> Vec<ParsedArticle> {
        if raw.trim().is_empty() {
            return Vec::new();
        }

        if looks_like_protocol(raw) {
            let articles = parse_protocol(raw);
            if !articles.is_empty() {
                debug!(dialect = ?Dialect::Protocol, count = articles.len(), "parsed input");
                return articles;
            }
            debug!("protocol marker found but no articles parsed, falling through");
        }

        if HTML_START_TAG.is_match(raw) {
            if let Some(article) = self.parse_html(raw) {
                debug!(dialect = ?Dialect::Html, "parsed input");
                return vec![article];
            }
            debug!("markup found but no title or body extracted, falling through");
        }

        debug!(dialect = ?Dialect::PlainText, "parsing input");
        parse_plain_text(raw, &self.config)
    }

    /// The dialect that would be tried first for `raw`.
    pub fn detect(&self, raw: &str) -> Dialect {
        detect_dialect(raw)
    }

    #[cfg(feature = "dom")]
    fn parse_html(&self, raw: &str) -> Option<ParsedArticle> {
        crate::html_article::parse_html_article(raw, &self.config)
    }

    #[cfg(not(feature = "dom"))]
    fn parse_html(&self, _raw: &str) -> Option<ParsedArticle> {
        None
    }
}

/// The first dialect whose detector matches `raw`.
pub fn detect_dialect(raw: &str) -> Dialect {
    if looks_like_protocol(raw) {
        Dialect::Protocol
    } else if HTML_START_TAG.is_match(raw) {
        Dialect::Html
    } else {
        Dialect::PlainText
    }
}

/// Convenience function: parse raw input with defaults.
pub fn parse_raw_input(raw: &str) -> Vec<ParsedArticle> {
    InputParser::new().parse(raw)
}
