//! # Answer Harness CLI (`ah`)
//!
//! The index lives in memory, so every one-shot command ingests the corpus
//! first and then runs its query against the fresh index.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `ah ingest` | Build the index and report chunk / document counts |
//! | `ah search "<question>"` | Print the top-ranked chunks |
//! | `ah ask "<question>"` | Print an assembled answer with sources |
//! | `ah serve` | Start the JSON HTTP server |
//!
//! ## Examples
//!
//! ```bash
//! ah --config ./config/answer.toml ingest
//! ah search "inventory setup" --top-k 3 --json
//! ah ask "How do I set up warehouses?" --industry retail --scenario "multi-site"
//! ah serve --config ./config/answer.toml
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use answer_harness::answer::preview;
use answer_harness::config::{self, Config};
use answer_harness::engine::{AskRequest, Engine, SearchRequest};
use answer_harness::models::{AskResponse, IngestReport, SearchHit};
use answer_harness::server;

/// Answer Harness: ask questions of a local document corpus.
#[derive(Parser)]
#[command(name = "ah", version, about)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/answer.toml")]
    config: PathBuf,

    /// Log at info level instead of warn (`RUST_LOG` overrides both).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from the configured corpus and uploads.
    Ingest,

    /// Rank chunks against a question.
    Search {
        question: String,

        /// Number of results (defaults to `[retrieval].top_k`).
        #[arg(long)]
        top_k: Option<usize>,

        /// Print results as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Answer a question with source attribution and a confidence score.
    Ask {
        question: String,

        /// Advisory industry context.
        #[arg(long)]
        industry: Option<String>,

        /// Advisory scenario context.
        #[arg(long)]
        scenario: Option<String>,

        #[arg(long)]
        top_k: Option<usize>,

        /// Skip external generation even if it is configured.
        #[arg(long)]
        no_generate: bool,

        /// Print the answer as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Start the HTTP server.
    ///
    /// Binds to `[server].bind` and ingests once before accepting requests.
    Serve,
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "info" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Builds the engine and runs the ingest every one-shot command starts with.
async fn ingested(cfg: &Config) -> Result<(Engine, IngestReport)> {
    let engine = Engine::from_config(cfg)?;
    let report = engine.ingest().await?;
    Ok((engine, report))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Ingest => {
            let (_, report) = ingested(&cfg).await?;
            println!("ingest");
            println!("  documents read: {}", report.documents);
            println!("  chunks indexed: {}", report.indexed);
            for path in &report.skipped {
                println!("  skipped: {}", path);
            }
            println!("ok");
        }
        Commands::Search {
            question,
            top_k,
            json,
        } => {
            let (engine, _) = ingested(&cfg).await?;
            let results = engine.search(&SearchRequest {
                question: Some(question),
                top_k,
            })?;
            let hits: Vec<SearchHit> = results.iter().map(SearchHit::from).collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&hits)?);
            } else if hits.is_empty() {
                println!("No results.");
            } else {
                for (i, hit) in hits.iter().enumerate() {
                    println!("{}. [{:.2}] {}", i + 1, hit.score, hit.id);
                    println!("    source: {}", hit.source);
                    println!("    excerpt: \"{}\"", preview(&hit.text, cfg.retrieval.preview_chars));
                    println!();
                }
            }
        }
        Commands::Ask {
            question,
            industry,
            scenario,
            top_k,
            no_generate,
            json,
        } => {
            let (engine, _) = ingested(&cfg).await?;
            let answer = engine
                .ask(&AskRequest {
                    question: Some(question),
                    industry,
                    scenario,
                    top_k,
                    use_external_generation: Some(!no_generate),
                })
                .await?;
            let response = AskResponse::from(&answer);

            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                println!("{}", response.answer);
                println!();
                println!("confidence: {:.2}", response.confidence);
                for hit in &response.sources {
                    println!("  source: {} [{:.2}]", hit.id, hit.score);
                }
            }
        }
    }

    Ok(())
}
