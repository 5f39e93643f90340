pub mod article;
#[cfg(feature = "blogger")]
pub mod blogger;
pub mod citations;
#[cfg(feature = "dom")]
pub mod dom_tree;
pub mod error;
pub mod formatters;
#[cfg(feature = "dom")]
pub mod html_article;
pub mod ingest;
pub mod json_island;
#[cfg(feature = "dom")]
pub mod parse;
pub mod perplexity;
pub mod plain_text;
pub mod schema;
pub mod slug;
pub mod sources;

pub use article::{ParsedArticle, Source};
#[cfg(feature = "blogger")]
pub use blogger::import_blogger_feed;
pub use citations::{
    CitationConfig, CitationConfigBuilder, CitationRewriter, RewriteOutcome, citation_numbers, rewrite_citations,
};
pub use error::{HorusError, Result};
pub use formatters::{JsonConfig, JsonFormatter, TextConfig, TextFormatter, articles_to_json, articles_to_text};
#[cfg(feature = "dom")]
pub use html_article::parse_html_article;
pub use ingest::{Dialect, InputParser, ParserConfig, ParserConfigBuilder, detect_dialect, parse_raw_input};
pub use json_island::extract_json_string;
#[cfg(feature = "dom")]
pub use parse::Document;
pub use perplexity::{looks_like_protocol, parse_protocol};
pub use plain_text::parse_plain_text;
pub use schema::{apply_schema_correction, extract_schema_blocks, replace_schema_blocks};
pub use slug::slugify;
pub use sources::{
    SourceList, hostname_of, merge_sources, parse_manual_sources, read_source_file, select_sources,
    strip_numbering_prefix,
};
