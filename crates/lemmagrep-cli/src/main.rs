//! `lemmagrep` command-line entry point.

mod config;
mod corpus;
mod report;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use lemmagrep_search::{CooccurrenceTrainer, SemanticGrep};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{LemmagrepConfig, LogFormat};
use crate::report::QueryReport;

#[derive(Parser)]
#[command(
    name = "lemmagrep",
    about = "lemmagrep: find corpus lines related to a word, not just lines containing it"
)]
struct Cli {
    /// Path to config file (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Neighbours per query lemma (overrides config; 0 = exact lemma match)
    #[arg(short = 'n', long)]
    top_n: Option<usize>,

    /// Matches printed per query (overrides config; 0 = all)
    #[arg(short, long)]
    max_results: Option<usize>,

    /// Print one JSON report per query instead of text
    #[arg(long)]
    json: bool,

    /// Corpus file, one retrieval unit per line
    corpus: PathBuf,

    /// Query words; all of them reuse the same index and model
    #[arg(required = true)]
    queries: Vec<String>,
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => LemmagrepConfig::load(path).await?,
        None => LemmagrepConfig::default(),
    };
    if let Some(top_n) = cli.top_n {
        config.query.top_n = top_n;
    }
    if let Some(max_results) = cli.max_results {
        config.query.max_results = max_results;
    }

    init_tracing(config.log_format);

    // Relative paths in the config resolve against its directory
    let config_dir = cli
        .config
        .as_deref()
        .and_then(Path::parent)
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();

    let normalizer = Arc::new(config.normalizer.build(&config_dir)?);
    let lines = corpus::load_corpus(&cli.corpus, &config.corpus).await?;
    let trainer = CooccurrenceTrainer::new(config.model.clone())?;
    let options = config.corpus.index_options();
    let lazy = config.query.lazy_training;

    let grep = tokio::task::spawn_blocking(move || {
        if lazy {
            SemanticGrep::train_lazily(&lines, normalizer, trainer, options)
        } else {
            SemanticGrep::train(&lines, normalizer, &trainer, options)
        }
    })
    .await??;
    info!(
        records = grep.index().len(),
        lemmas = grep.index().vocabulary_size(),
        "Ready to search"
    );

    for query in &cli.queries {
        let outcome = grep.grep(query, config.query.top_n);
        let report = QueryReport::new(query, &outcome, &config.query);
        if cli.json {
            println!("{}", report.to_json()?);
        } else {
            println!("{}", report.to_text(config.query.display_width));
        }
    }

    Ok(())
}
