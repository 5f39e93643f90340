use crate::Result;
use crate::article::ParsedArticle;
use serde::Serialize;

/// Configuration for JSON output
#[derive(Debug, Clone, Default)]
pub struct JsonConfig {
    /// Pretty print JSON output
    pub pretty: bool,
    /// Wrap the article list in an object with a count
    pub include_summary: bool,
}

/// Article list with counts, for `include_summary` output
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonOutput<'a> {
    pub article_count: usize,
    pub source_count: usize,
    pub articles: &'a [ParsedArticle],
}

/// Serialize articles as a JSON array of `{title, imageUrl, text, sources}`
pub fn articles_to_json(articles: &[ParsedArticle], pretty: bool) -> Result<String> {
    to_json(&articles, pretty)
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    if pretty { Ok(serde_json::to_string_pretty(value)?) } else { Ok(serde_json::to_string(value)?) }
}

/// JSON formatter with configurable options
pub struct JsonFormatter {
    config: JsonConfig,
}

impl JsonFormatter {
    pub fn new(config: JsonConfig) -> Self {
        Self { config }
    }

    pub fn convert(&self, articles: &[ParsedArticle]) -> Result<String> {
        if !self.config.include_summary {
            return articles_to_json(articles, self.config.pretty);
        }
        let output = JsonOutput {
            article_count: articles.len(),
            source_count: articles.iter().map(|a| a.sources.len()).sum(),
            articles,
        };
        to_json(&output, self.config.pretty)
    }
}
