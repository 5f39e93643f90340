use crate::article::ParsedArticle;

/// Configuration for plain text output
#[derive(Debug, Clone)]
pub struct TextConfig {
    /// Wrap body lines at specified width (0 = no wrapping)
    pub line_width: usize,

    /// List sources under each article
    pub include_sources: bool,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self { line_width: 0, include_sources: true }
    }
}

/// Plain text formatter for reviewing parsed articles
pub struct TextFormatter {
    config: TextConfig,
}

impl TextFormatter {
    pub fn new(config: TextConfig) -> Self {
        Self { config }
    }

    pub fn convert(&self, articles: &[ParsedArticle]) -> String {
        convert_to_text(articles, &self.config)
    }
}

/// Render articles with default settings
pub fn articles_to_text(articles: &[ParsedArticle]) -> String {
    convert_to_text(articles, &TextConfig::default())
}

/// Render articles as readable text, separated by a blank line
pub fn convert_to_text(articles: &[ParsedArticle], config: &TextConfig) -> String {
    articles
        .iter()
        .map(|article| render_article(article, config))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_article(article: &ParsedArticle, config: &TextConfig) -> String {
    let mut output = String::new();

    output.push_str(&article.title);
    output.push('\n');
    output.push_str(&"=".repeat(article.title.chars().count()));
    output.push('\n');

    if !article.image_url.is_empty() {
        output.push_str(&format!("Image: {}\n", article.image_url));
    }

    if !article.text.is_empty() {
        output.push('\n');
        output.push_str(&wrap_text(&article.text, config.line_width));
        output.push('\n');
    }

    if config.include_sources && !article.sources.is_empty() {
        output.push_str("\nSources:\n");
        for (index, source) in article.sources.iter().enumerate() {
            output.push_str(&format!("[{}] {} - {}\n", index + 1, source.title, source.url));
        }
    }

    output.trim_end().to_string()
}

/// Wrap text to specified line width, keeping paragraph breaks
fn wrap_text(text: &str, width: usize) -> String {
    if width == 0 {
        return text.to_string();
    }

    text.split("\n\n")
        .map(|p| {
            p.lines()
                .map(|line| {
                    let words: Vec<&str> = line.split_whitespace().collect();
                    if words.is_empty() { String::new() } else { wrap_words(&words, width) }
                })
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Wrap a slice of words to specified width
fn wrap_words(words: &[&str], width: usize) -> String {
    let mut lines = Vec::new();
    let mut current_line = Vec::new();
    let mut current_length = 0;

    for &word in words {
        let word_len = word.chars().count();

        if current_length == 0 {
            current_line.push(word);
            current_length = word_len;
        } else if current_length + 1 + word_len <= width {
            current_length += 1 + word_len;
            current_line.push(word);
        } else {
            lines.push(current_line.join(" "));
            current_line = vec![word];
            current_length = word_len;
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line.join(" "));
    }

    lines.join("\n")
}
