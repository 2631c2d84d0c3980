//! Command dispatch for the `ragrank` binary.

use std::path::PathBuf;

use ragrank::{HybridSearchResult, Retriever, SearchStrategy};
use ragrank_core::{Error, Result};
use tracing_subscriber::EnvFilter;

use crate::cli::{CliArgs, Command};
use crate::config::{APP_NAME, AppConfig};
use crate::{config_handlers, corpus};

/// Characters of document content shown per text-mode result.
const PREVIEW_CHARS: usize = 120;

/// Initialise tracing-based logging.
///
/// Uses `RUST_LOG` env var if set, otherwise defaults based on verbosity flags.
pub fn init_logging(verbose: bool, quiet: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if quiet {
        EnvFilter::new("warn")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    // Ignore error if a subscriber is already set (e.g. in tests).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run the CLI with the given arguments.
pub async fn run(args: CliArgs) -> Result<()> {
    init_logging(args.verbose, args.quiet);
    let config_path = args.config.as_deref();

    match args.command {
        Some(Command::Query {
            text,
            k,
            corpus,
            strategy,
            json,
        }) => {
            let mut config = AppConfig::load(config_path)?;
            if let Some(strategy) = strategy {
                config.scoring.strategy = strategy.parse::<SearchStrategy>()?;
            }
            let retriever = load_retriever(&config, corpus.as_deref()).await?;
            let results = retriever.query(&text, k).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                print!("{}", format_results(&results));
            }
            Ok(())
        }
        Some(Command::Inspect { corpus }) => {
            let config = AppConfig::load(config_path)?;
            let retriever = load_retriever(&config, corpus.as_deref()).await?;
            print!("{}", inspect_report(&retriever).await?);
            Ok(())
        }
        Some(Command::Version) => {
            println!("{APP_NAME} {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some(Command::Config(config_cmd)) => {
            config_handlers::handle_config_command(config_path, config_cmd.command)
        }
        None => {
            println!(
                "{APP_NAME} {} - use --help for usage",
                env!("CARGO_PKG_VERSION")
            );
            Ok(())
        }
    }
}

/// Pick the corpus file: the explicit flag, else `corpus.path`.
pub fn resolve_corpus_path(config: &AppConfig, explicit: Option<&str>) -> Result<PathBuf> {
    explicit
        .or(config.corpus.path.as_deref())
        .map(PathBuf::from)
        .ok_or_else(|| {
            Error::config("No corpus given. Pass --corpus or set corpus.path in the config file.")
        })
}

/// Build a retriever from `config` and index the corpus file.
pub async fn load_retriever(config: &AppConfig, corpus: Option<&str>) -> Result<Retriever> {
    let path = resolve_corpus_path(config, corpus)?;
    let documents = corpus::load_corpus(&path)?;

    let retriever = Retriever::from_config(&config.retrieval())?;
    retriever.add_documents(documents).await?;
    Ok(retriever)
}

/// Human-readable rendering of ranked results.
pub fn format_results(results: &[HybridSearchResult]) -> String {
    if results.is_empty() {
        return "No results.\n".to_string();
    }

    let mut out = String::new();
    for (rank, result) in results.iter().enumerate() {
        out.push_str(&format!(
            "{:>2}. [{:.4}] ({})",
            rank + 1,
            result.score,
            result.source
        ));
        if let Some(source) = result.document.source() {
            out.push_str(&format!(" {source}"));
        }
        out.push('\n');
        out.push_str(&format!(
            "    {}\n",
            result.document.preview(PREVIEW_CHARS)
        ));
    }
    out
}

/// Summary of the loaded corpus and indexes.
pub async fn inspect_report(retriever: &Retriever) -> Result<String> {
    let snapshot = retriever.snapshot();
    let stored = retriever.store().document_count().await?;

    let mut out = String::new();
    out.push_str(&format!("Strategy:        {}\n", retriever.strategy()));
    out.push_str(&format!(
        "Hybrid weights:  vector {} / lexical {}\n",
        retriever.combiner().weights().vector_weight,
        retriever.combiner().weights().lexical_weight
    ));
    out.push_str(&format!("Default k:       {}\n", retriever.default_k()));
    out.push_str(&format!(
        "Snapshot:        generation {} built {}\n",
        snapshot.generation(),
        snapshot.built_at().to_rfc3339()
    ));
    out.push_str(&format!(
        "Documents:       {} ({} distinct)\n",
        snapshot.len(),
        snapshot.distinct_len()
    ));
    out.push_str(&format!(
        "Vector store:    {} ({stored} embedded)\n",
        retriever.store().name()
    ));
    match retriever.lexical().stats() {
        Some(stats) => out.push_str(&format!(
            "Lexical index:   {} ({} documents, {} terms, avg length {:.2})\n",
            retriever.lexical().name(),
            stats.documents,
            stats.vocabulary,
            stats.average_length
        )),
        None => out.push_str(&format!(
            "Lexical index:   {} (not initialized)\n",
            retriever.lexical().name()
        )),
    }
    Ok(out)
}

// ============================================================================
// Tests
// ============================================================================
