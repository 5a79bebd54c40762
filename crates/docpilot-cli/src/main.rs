#![deny(unsafe_code)]

//! Docpilot CLI: ask the documentation assistant, or query the docs directly.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use docpilot_config::AppConfig;
use docpilot_core::build_info;
use docpilot_core::{Assistant, ConversationTurn, DocSearch};

/// Docpilot: a documentation assistant grounded in your product docs.
#[derive(Parser, Debug)]
#[command(
    name = "docpilot",
    version,
    long_version = build_info::LONG_VERSION,
    about,
    long_about = None
)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, default_value = "docpilot.toml")]
    config: PathBuf,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask the assistant a question.
    Ask {
        /// The question to ask.
        question: String,

        /// JSON file holding earlier turns: `[{"role": "user", "content": "..."}]`.
        #[arg(long)]
        history: Option<PathBuf>,
    },

    /// Search the documentation without involving the model.
    Search {
        query: String,

        /// Maximum number of sections to show.
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// List the section titles of the configured corpus.
    Sections,

    /// Validate and display configuration.
    Config {
        /// Show the resolved configuration.
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, found) = load_config(&cli.config).await?;
    init_logging(&config, cli.verbose);
    if !found {
        info!(path = %cli.config.display(), "config file not found, using defaults");
    }

    match cli.command {
        Commands::Ask { question, history } => {
            cmd_ask(&config, &question, history.as_deref()).await?
        }
        Commands::Search { query, limit } => cmd_search(&config, &query, limit).await?,
        Commands::Sections => cmd_sections(&config).await?,
        Commands::Config { show } => cmd_config(&cli.config, &config, show)?,
    }

    Ok(())
}

/// `-v` flags win over `[logging] level`; `RUST_LOG` wins over both.
fn init_logging(config: &AppConfig, verbose: u8) {
    let level = match verbose {
        0 => config.logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn cmd_ask(config: &AppConfig, question: &str, history: Option<&Path>) -> Result<()> {
    let mut turns = match history {
        Some(path) => load_history(path).await?,
        None => Vec::new(),
    };
    turns.push(ConversationTurn::user(question));

    let assistant = Assistant::from_config(config)?;
    let reply = assistant.respond(&turns).await?;

    println!("{}", reply.content());
    if let Some(calls) = reply.tool_calls() {
        let queries: Vec<&str> = calls
            .iter()
            .filter_map(|c| c.arguments.get("query").and_then(|q| q.as_str()))
            .collect();
        eprintln!("\nsearched documentation for: {}", queries.join(", "));
    }
    Ok(())
}

async fn cmd_search(config: &AppConfig, query: &str, limit: Option<usize>) -> Result<()> {
    let search = DocSearch::from_config(&config.docs);
    let results = search
        .search(query, limit.unwrap_or(config.docs.search_limit))
        .await?;
    if results.is_empty() {
        println!("No documentation found for query: {query}");
    }
    for (i, result) in results.iter().enumerate() {
        println!("{:>2}. {} ({:.1})", i + 1, result.section, result.relevance);
    }
    Ok(())
}

async fn cmd_sections(config: &AppConfig) -> Result<()> {
    let search = DocSearch::from_config(&config.docs);
    let sections = search.sections().await?;
    for section in sections.iter() {
        println!("{}", section.title);
    }
    info!(corpus = search.source_id(), count = sections.len(), "listed sections");
    Ok(())
}

fn cmd_config(config_path: &Path, config: &AppConfig, show: bool) -> Result<()> {
    if show {
        let toml_str = toml::to_string_pretty(&redacted(config)).context("serialising config")?;
        println!("{toml_str}");
    } else {
        println!("Configuration at '{}' is valid.", config_path.display());
    }
    Ok(())
}

/// Load the config file, falling back to defaults when it does not exist.
/// The flag reports whether the file was found.
async fn load_config(path: &Path) -> Result<(AppConfig, bool)> {
    if tokio::fs::try_exists(path).await.unwrap_or(false) {
        let config = AppConfig::load(path)
            .await
            .with_context(|| format!("loading {}", path.display()))?;
        Ok((config, true))
    } else {
        Ok((AppConfig::default(), false))
    }
}

async fn load_history(path: &Path) -> Result<Vec<ConversationTurn>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading history {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing history {}", path.display()))
}

/// A copy of `config` with credentials masked.
fn redacted(config: &AppConfig) -> AppConfig {
    const MASK: &str = "********";
    let mut config = config.clone();
    if !config.llm.api_key.is_empty() {
        config.llm.api_key = MASK.to_string();
    }
    if !config.telemetry.secret_key.is_empty() {
        config.telemetry.secret_key = MASK.to_string();
    }
    config
}
