use std::collections::HashSet;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use horus_core::{
    CitationRewriter, HorusError, InputParser, JsonConfig, JsonFormatter, ParsedArticle, ParserConfig, Source,
    apply_schema_correction, articles_to_text, extract_json_string, import_blogger_feed, merge_sources,
    parse_manual_sources, read_source_file, select_sources, slugify,
};
use owo_colors::OwoColorize;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use url::Url;

mod echo;

use echo::{
    format_size, print_article_summary, print_banner, print_detail, print_info, print_step, print_success,
    print_timing, print_warning,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Output format for parsed articles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Json,
    Text,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" | "txt" => Ok(Self::Text),
            _ => Err(format!("Invalid format: {}. Valid options: json, text", s)),
        }
    }
}

/// Parse pasted research text into articles and finalize article HTML
#[derive(Parser, Debug)]
#[command(name = "horus")]
#[command(author = "Horus Contributors")]
#[command(version)]
#[command(about = "Parse research text into articles and finalize article citations", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse raw input (multi-article protocol, HTML or plain text) into articles
    Parse {
        /// Input file, or "-" for stdin
        #[arg(value_name = "INPUT")]
        input: String,

        /// Output format (json, text)
        #[arg(short, long, default_value = "json", value_name = "FORMAT")]
        format: OutputFormat,

        /// Address the HTML came from; resolves relative links and filters same-site links
        #[arg(long, value_name = "URL")]
        base_url: Option<String>,

        /// Output file (default: stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Rebuild the source list and link [n] citation markers in article HTML
    Cite {
        /// Article HTML file, or "-" for stdin
        #[arg(value_name = "HTML")]
        html: String,

        /// JSON file holding [{"title": .., "url": ..}]
        #[arg(short, long, value_name = "FILE")]
        sources: PathBuf,

        /// Keep only these source URLs (repeatable)
        #[arg(long, value_name = "URL")]
        select: Vec<String>,

        /// File with extra source URLs, one per line
        #[arg(long, value_name = "FILE")]
        manual: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Print the JSON value embedded in a model response
    ExtractJson {
        /// Input file, or "-" for stdin
        #[arg(value_name = "INPUT")]
        input: String,
    },

    /// Replace article structured data with the JSON from a model response
    Schema {
        /// Article HTML file, or "-" for stdin
        #[arg(value_name = "HTML")]
        html: String,

        /// Model response file holding the corrected JSON-LD
        #[arg(short, long, value_name = "FILE")]
        response: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Import posts from a Blogger export feed
    Import {
        /// Feed XML file, or "-" for stdin
        #[arg(value_name = "XML")]
        xml: String,

        /// Output format (json, text)
        #[arg(short, long, default_value = "json", value_name = "FORMAT")]
        format: OutputFormat,

        /// Output file (default: stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Print the URL slug for a title
    Slug {
        #[arg(value_name = "TEXT")]
        text: String,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn read_input(input: &str, verbose: bool) -> anyhow::Result<String> {
    let content = if input == "-" {
        if verbose {
            print_step(1, 3, "Reading from stdin");
        }
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        buffer
    } else {
        if verbose {
            print_step(1, 3, &format!("Reading from file {}", input.bright_white()));
        }
        fs::read_to_string(input).with_context(|| format!("Failed to read file: {}", input))?
    };

    if verbose {
        print_detail("Size", &format_size(content.len()));
        eprintln!();
    }
    Ok(content)
}

fn read_file(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

fn write_output(output: Option<&Path>, content: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => println!("{}", content),
    }
    Ok(())
}

fn render_articles(articles: &[ParsedArticle], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => JsonFormatter::new(JsonConfig { pretty: true, include_summary: false })
            .convert(articles)
            .context("Failed to serialize articles"),
        OutputFormat::Text => Ok(articles_to_text(articles)),
    }
}

fn run_parse(
    input: &str, format: OutputFormat, base_url: Option<&str>, output: Option<&Path>, verbose: bool,
) -> anyhow::Result<()> {
    let raw = read_input(input, verbose)?;

    let mut config = ParserConfig::default();
    if let Some(base) = base_url {
        let url = Url::parse(base).map_err(|e| HorusError::InvalidUrl(format!("{}: {}", base, e)))?;
        config.base_url = Some(url);
    }
    let parser = InputParser::with_config(config);

    if verbose {
        print_step(2, 3, "Parsing input");
        print_detail("Dialect", &format!("{:?}", parser.detect(&raw)));
        if let Some(base) = &parser.config().base_url {
            print_detail("Base URL", base.as_str());
        }
    }

    let started = Instant::now();
    let articles = parser.parse(&raw);

    if verbose {
        print_timing("Parse", started.elapsed());
        print_article_summary(&articles);
        print_step(3, 3, "Writing output");
        print_detail("Format", &format!("{:?}", format));
        eprintln!();
    }

    if articles.is_empty() {
        print_warning("No articles found in input");
    }

    write_output(output, &render_articles(&articles, format)?)
}

fn load_sources(path: &Path, select: &[String], manual: Option<&Path>) -> anyhow::Result<Vec<Source>> {
    let sources =
        read_source_file(path).with_context(|| format!("Failed to load sources JSON: {}", path.display()))?;

    let mut sources = if select.is_empty() {
        sources
    } else {
        let selected: HashSet<String> = select.iter().cloned().collect();
        select_sources(&sources, &selected)
    };

    if let Some(manual) = manual {
        let extra = parse_manual_sources(&read_file(manual)?);
        debug!("merging {} manual sources", extra.len());
        sources = merge_sources(&sources, &extra);
    }
    Ok(sources)
}

fn run_cite(
    html: &str, sources: &Path, select: &[String], manual: Option<&Path>, output: Option<&Path>, verbose: bool,
) -> anyhow::Result<()> {
    let html = read_input(html, verbose)?;
    let sources = load_sources(sources, select, manual)?;

    if verbose {
        print_step(2, 3, "Rewriting citations");
        print_detail("Sources", &sources.len().to_string());
    }

    let outcome = CitationRewriter::new().rewrite(&html, &sources);

    if verbose {
        print_step(3, 3, "Writing output");
        eprintln!();
    }

    print_success(&format!(
        "Rebuilt {} sources, linked {} citations",
        outcome.sources_rebuilt, outcome.citations_linked
    ));
    if outcome.citations_linked == 0 {
        print_warning("No citation markers were linked");
    }

    write_output(output, &outcome.html)
}

fn run_extract_json(input: &str, verbose: bool) -> anyhow::Result<()> {
    let text = read_input(input, verbose)?;
    let json = extract_json_string(&text).context("No JSON value found in input")?;
    println!("{}", json);
    Ok(())
}

fn run_schema(html: &str, response: &Path, output: Option<&Path>, verbose: bool) -> anyhow::Result<()> {
    let html = read_input(html, verbose)?;
    let response = read_file(response)?;

    if verbose {
        print_step(2, 3, "Applying structured data correction");
    }
    let corrected = apply_schema_correction(&html, &response).context("Failed to apply schema correction")?;

    if verbose {
        print_step(3, 3, "Writing output");
        eprintln!();
    }
    write_output(output, &corrected)
}

fn run_import(xml: &str, format: OutputFormat, output: Option<&Path>, verbose: bool) -> anyhow::Result<()> {
    let feed = read_input(xml, verbose)?;

    if verbose {
        print_step(2, 3, "Importing feed entries");
    }
    let articles = import_blogger_feed(&feed, &ParserConfig::default()).context("Failed to import feed")?;

    if verbose {
        print_article_summary(&articles);
        print_step(3, 3, "Writing output");
        eprintln!();
    }
    print_success(&format!("Imported {} posts", articles.len()));

    write_output(output, &render_articles(&articles, format)?)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    if args.verbose {
        print_banner();
        print_info("Debug logging enabled");
        eprintln!();
    }

    match args.command {
        Command::Parse { input, format, base_url, output } => {
            run_parse(&input, format, base_url.as_deref(), output.as_deref(), args.verbose)
        }
        Command::Cite { html, sources, select, manual, output } => {
            run_cite(&html, &sources, &select, manual.as_deref(), output.as_deref(), args.verbose)
        }
        Command::ExtractJson { input } => run_extract_json(&input, args.verbose),
        Command::Schema { html, response, output } => run_schema(&html, &response, output.as_deref(), args.verbose),
        Command::Import { xml, format, output } => run_import(&xml, format, output.as_deref(), args.verbose),
        Command::Slug { text } => {
            println!("{}", slugify(&text));
            Ok(())
        }
    }
}
