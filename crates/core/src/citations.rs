//! Citation rewriting for generated article HTML.
//!
//! [`CitationRewriter`] rebuilds the article's source list from an ordered
//! list of selected [`Source`]s and links every in-range `[n]` marker in the
//! body to the matching list entry:
//!
//! - list item `i` has `id="ref{i}"` and a back-link to `#cite{i}`
//! - marker `[n]` becomes `<a href="#ref{n}" id="cite{n}">[n]</a>`
//!
//! Existing `cite*` anchors are unwrapped first, so running the rewrite again
//! on its own output changes nothing.
//!
//! ```rust
//! use horus_core::{Source, rewrite_citations};
//!
//! let html = "<p>See [1].</p><h2>المصادر</h2><ul><li>old</li></ul>";
//! let sources = [Source::new("Report", "https://news.example.com/a")];
//!
//! let once = rewrite_citations(html, &sources);
//! assert!(once.contains(r#"id="cite1""#));
//! assert_eq!(rewrite_citations(&once, &sources), once);
//! ```

#[cfg(feature = "dom")]
use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use crate::article::Source;

#[cfg(feature = "dom")]
use crate::dom_tree::{
    append_children, graft_fragment, insert_after, nearest_ancestor, remove_children, replace_with, tag_of,
    text_node, unwrap_to_text,
};
#[cfg(feature = "dom")]
use crate::parse::{Document, Element};
#[cfg(feature = "dom")]
use crate::sources::strip_numbering_prefix;
#[cfg(feature = "dom")]
use ego_tree::{NodeId, NodeRef};
#[cfg(feature = "dom")]
use scraper::node::Node;

static CITATION_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[(\d+)\]").expect("citation marker regex"));

#[cfg(feature = "dom")]
static FULL_DOCUMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*<(?:!doctype|html|head|body)[\s>]").expect("full document regex"));

/// Configuration for citation rewriting.
#[derive(Debug, Clone)]
pub struct CitationConfig {
    /// Heading text that locates the source list (default: "المصادر").
    pub sources_heading: String,

    /// `rel` of external source links (default: "noopener noreferrer nofollow").
    pub link_rel: String,

    /// `target` of external source links (default: "_blank").
    pub link_target: String,

    /// Append a list when neither a heading nor an earlier list exists (default: true).
    pub create_missing_list: bool,
}

impl Default for CitationConfig {
    fn default() -> Self {
        Self {
            sources_heading: "المصادر".to_string(),
            link_rel: "noopener noreferrer nofollow".to_string(),
            link_target: "_blank".to_string(),
            create_missing_list: true,
        }
    }
}

impl CitationConfig {
    pub fn builder() -> CitationConfigBuilder {
        CitationConfigBuilder::default()
    }
}

/// Builder for CitationConfig.
#[derive(Default)]
pub struct CitationConfigBuilder {
    config: CitationConfig,
}

impl CitationConfigBuilder {
    pub fn sources_heading(mut self, value: impl Into<String>) -> Self {
        self.config.sources_heading = value.into();
        self
    }

    pub fn link_rel(mut self, value: impl Into<String>) -> Self {
        self.config.link_rel = value.into();
        self
    }

    pub fn link_target(mut self, value: impl Into<String>) -> Self {
        self.config.link_target = value.into();
        self
    }

    pub fn create_missing_list(mut self, value: bool) -> Self {
        self.config.create_missing_list = value;
        self
    }

    pub fn build(self) -> CitationConfig {
        self.config
    }
}

/// Result of a rewrite: the new HTML plus counts for status reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOutcome {
    pub html: String,
    /// Number of list items written, 0 if no list was touched.
    pub sources_rebuilt: usize,
    /// Number of `[n]` markers turned into links.
    pub citations_linked: usize,
}

impl RewriteOutcome {
    fn passthrough(html: &str) -> Self {
        Self { html: html.to_string(), sources_rebuilt: 0, citations_linked: 0 }
    }
}

/// Rebuilds source lists and citation links in article HTML.
#[derive(Debug, Clone, Default)]
pub struct CitationRewriter {
    config: CitationConfig,
}

/// Where the rebuilt list goes.
#[cfg(feature = "dom")]
enum ListSite {
    /// Existing list: replace its items.
    Replace(NodeId),
    /// Heading with no list after it: insert a new list after the heading.
    After(NodeId),
    /// No heading: append a new list to this container.
    Append(NodeId),
    Skip,
}

impl CitationRewriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CitationConfig) -> Self {
        Self { config }
    }

    /// Rewrite `html` so its source list and `[n]` links match `sources`.
    ///
    /// Never fails. Malformed markup is handled best-effort; without the `dom`
    /// feature the HTML is returned unchanged.
    #[instrument(level = "debug", skip(self, html, sources), fields(len = html.len(), sources = sources.len()))]
    pub fn rewrite(&self, html: &str, sources: &[Source]) -> RewriteOutcome {
        #[cfg(feature = "dom")]
        {
            self.rewrite_dom(html, sources)
        }
        #[cfg(not(feature = "dom"))]
        {
            debug!("no DOM support compiled in, passing html through");
            let _ = sources;
            RewriteOutcome::passthrough(html)
        }
    }

    #[cfg(feature = "dom")]
    fn rewrite_dom(&self, html: &str, sources: &[Source]) -> RewriteOutcome {
        if html.trim().is_empty() && sources.is_empty() {
            return RewriteOutcome::passthrough(html);
        }

        let mut doc = Document::parse_fragment(&body_markup(html));

        let site = self.locate_list(&doc, !sources.is_empty());
        let sources_rebuilt = if self.write_list(&mut doc, site, sources) { sources.len() } else { 0 };
        let stale = unwrap_stale_citations(&mut doc);
        let citations_linked = link_markers(&mut doc, sources.len());

        debug!(sources_rebuilt, stale, citations_linked, "rewrote citations");
        RewriteOutcome { html: doc.inner_html(), sources_rebuilt, citations_linked }
    }

    #[cfg(feature = "dom")]
    fn locate_list(&self, doc: &Document, has_sources: bool) -> ListSite {
        let headings = doc.select("h2, h3").unwrap_or_default();
        let heading = headings
            .iter()
            .find(|h| h.text().contains(self.config.sources_heading.as_str()));

        if let Some(heading) = heading {
            return match heading.next_element_sibling() {
                Some(next) if next.tag_name() == "ul" => ListSite::Replace(next.id()),
                _ => ListSite::After(heading.id()),
            };
        }

        let root = doc.html().root_element();
        let earlier = doc
            .html()
            .tree
            .root()
            .descendants()
            .find(|node| matches!(tag_of(*node), Some("ul" | "ol")) && is_source_list(*node));

        match earlier {
            Some(list) => ListSite::Replace(list.id()),
            None if self.config.create_missing_list && has_sources => ListSite::Append(root.id()),
            None => ListSite::Skip,
        }
    }

    #[cfg(feature = "dom")]
    fn write_list(&self, doc: &mut Document, site: ListSite, sources: &[Source]) -> bool {
        let items = self.render_items(sources);
        let tree = &mut doc.html_mut().tree;

        match site {
            ListSite::Replace(list) => {
                remove_children(tree, list);
                let nodes = graft_fragment(tree, &items);
                append_children(tree, list, &nodes);
            }
            ListSite::After(heading) => {
                let nodes = graft_fragment(tree, &format!("<ul>{}</ul>", items));
                insert_after(tree, heading, &nodes);
            }
            ListSite::Append(container) => {
                let nodes = graft_fragment(tree, &format!("<ul>{}</ul>", items));
                append_children(tree, container, &nodes);
            }
            ListSite::Skip => return false,
        }
        true
    }

    #[cfg(feature = "dom")]
    fn render_items(&self, sources: &[Source]) -> String {
        use html_escape::{encode_double_quoted_attribute, encode_text};

        sources
            .iter()
            .enumerate()
            .map(|(index, source)| {
                let n = index + 1;
                format!(
                    r##"<li id="ref{n}"><a href="#cite{n}">[{n}]</a> - <a href="{url}" target="{target}" rel="{rel}">{title}</a></li>"##,
                    url = encode_double_quoted_attribute(&source.url),
                    target = encode_double_quoted_attribute(&self.config.link_target),
                    rel = encode_double_quoted_attribute(&self.config.link_rel),
                    title = encode_text(&strip_numbering_prefix(&source.title)),
                )
            })
            .collect()
    }
}

/// Convenience function: rewrite with default settings, returning only the HTML.
pub fn rewrite_citations(html: &str, sources: &[Source]) -> String {
    CitationRewriter::new().rewrite(html, sources).html
}

/// Numbers of the `[n]` markers in `text`, in order of appearance.
pub fn citation_numbers(text: &str) -> Vec<usize> {
    CITATION_MARKER
        .captures_iter(text)
        .filter_map(|caps| caps[1].parse().ok())
        .collect()
}

/// A list is the source list when one of its items carries a `ref*` id.
#[cfg(feature = "dom")]
fn is_source_list(list: NodeRef<'_, Node>) -> bool {
    list.children().any(|child| {
        child
            .value()
            .as_element()
            .is_some_and(|el| el.name() == "li" && el.id().is_some_and(|id| id.starts_with("ref")))
    })
}

#[cfg(feature = "dom")]
fn is_excluded(node: NodeRef<'_, Node>) -> bool {
    nearest_ancestor(node, &["a", "script", "style"]).is_some()
        || nearest_ancestor(node, &["ul", "ol"]).is_some_and(is_source_list)
}

#[cfg(feature = "dom")]
fn unwrap_stale_citations(doc: &mut Document) -> usize {
    let stale: Vec<NodeId> = doc
        .select(r#"a[id^="cite"]"#)
        .map(|found| found.iter().map(Element::id).collect())
        .unwrap_or_default();

    let tree = &mut doc.html_mut().tree;
    for id in &stale {
        unwrap_to_text(tree, *id);
    }
    stale.len()
}

#[cfg(feature = "dom")]
fn link_markers(doc: &mut Document, count: usize) -> usize {
    if count == 0 {
        return 0;
    }

    let targets: Vec<(NodeId, String)> = doc
        .html()
        .tree
        .root()
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            if !CITATION_MARKER.is_match(&text.text) || is_excluded(node) {
                return None;
            }
            Some((node.id(), String::from(&*text.text)))
        })
        .collect();

    let tree = &mut doc.html_mut().tree;
    let mut linked = 0;

    for (id, text) in targets {
        let mut nodes = Vec::new();
        let mut last = 0;
        let mut changed = false;

        for caps in CITATION_MARKER.captures_iter(&text) {
            let Some(n) = caps[1].parse::<usize>().ok().filter(|n| (1..=count).contains(n)) else {
                continue;
            };
            let Some(marker) = caps.get(0) else {
                continue;
            };

            if marker.start() > last {
                nodes.push(tree.orphan(text_node(&text[last..marker.start()])).id());
            }
            nodes.extend(graft_fragment(tree, &format!(r##"<a href="#ref{n}" id="cite{n}">[{n}]</a>"##)));
            last = marker.end();
            linked += 1;
            changed = true;
        }

        if !changed {
            continue;
        }
        if last < text.len() {
            nodes.push(tree.orphan(text_node(&text[last..])).id());
        }
        replace_with(tree, id, &nodes);
    }

    linked
}

/// The `<body>` content of a full document. Fragments pass through as-is.
#[cfg(feature = "dom")]
fn body_markup(html: &str) -> Cow<'_, str> {
    if !FULL_DOCUMENT.is_match(html) {
        return Cow::Borrowed(html);
    }
    let doc = Document::parse(html);
    match doc.select("body").ok().and_then(|found| found.into_iter().next()) {
        Some(body) => Cow::Owned(body.inner_html()),
        None => Cow::Borrowed(html),
    }
}


#[cfg(all(test, not(feature = "dom")))]
mod passthrough_tests {
    use super::*;

    #[test]
    fn test_rewrite_returns_html_unchanged() {
        let html = "<p>See [1].</p><h2>المصادر</h2><ul><li>old</li></ul>";
        let sources = [Source::new("Report", "https://news.example.com/a")];
        let outcome = CitationRewriter::new().rewrite(html, &sources);

        assert_eq!(outcome.html, html);
        assert_eq!(outcome.sources_rebuilt, 0);
        assert_eq!(outcome.citations_linked, 0);
        assert_eq!(rewrite_citations(html, &sources), html);
    }
}
