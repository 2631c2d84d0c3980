//! End-to-end tests: config file + corpus file through to ranked results.

use std::io::Write;

use ragrank::{MatchSource, SearchStrategy};
use ragrank_cli::app::{inspect_report, load_retriever};
use ragrank_cli::config_handlers::{set_in_file, write_default_config};
use ragrank_cli::AppConfig;

const CORPUS: &[&str] = &[
    r#"{"content": "configure the rate limiting plugin on a route", "metadata": {"source": "plugins/rate-limiting.md"}}"#,
    r#"{"content": "postgres replication keeps the data plane in sync", "metadata": {"source": "deploy/postgres.md"}}"#,
    r#"{"content": "kong gateway routes traffic to upstream services", "metadata": {"source": "intro.md"}}"#,
    r#"{"content": "upstream health checks mark targets unhealthy"}"#,
];

fn write_corpus(dir: &tempfile::TempDir) -> String {
    let path = dir.path().join("corpus.jsonl");
    let mut file = std::fs::File::create(&path).unwrap();
    for line in CORPUS {
        writeln!(file, "{line}").unwrap();
    }
    path.to_string_lossy().into_owned()
}

fn write_config(dir: &tempfile::TempDir, corpus: &str) -> String {
    let path = dir.path().join("config.toml");
    write_default_config(&path, false).unwrap();
    set_in_file(&path, "corpus.path", corpus).unwrap();
    path.to_string_lossy().into_owned()
}

#[tokio::test]
async fn test_query_with_corpus_from_config() {
    let dir = tempfile::TempDir::new().unwrap();
    let corpus = write_corpus(&dir);
    let config_path = write_config(&dir, &corpus);

    let config = AppConfig::load(Some(&config_path)).unwrap();
    let retriever = load_retriever(&config, None).await.unwrap();
    let results = retriever.query("postgres replication", None).await;

    assert_eq!(results.len(), 4);
    assert_eq!(results[0].document.source(), Some("deploy/postgres.md"));
    for pair in results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[tokio::test]
async fn test_lexical_strategy_from_config_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let corpus = write_corpus(&dir);
    let config_path = write_config(&dir, &corpus);
    set_in_file(dir.path().join("config.toml").as_path(), "scoring.type", "bm25").unwrap();
    set_in_file(
        dir.path().join("config.toml").as_path(),
        "scoring.parameters.k",
        "2",
    )
    .unwrap();

    let config = AppConfig::load(Some(&config_path)).unwrap();
    assert_eq!(config.scoring.strategy, SearchStrategy::Lexical);

    let retriever = load_retriever(&config, None).await.unwrap();
    let results = retriever.query("upstream services health", None).await;

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.source == MatchSource::Lexical));
    assert!(results.iter().all(|r| r.score > 0.0));
    assert!(results.iter().all(|r| r.document.content.contains("upstream")));
}

#[tokio::test]
async fn test_inspect_after_load() {
    let dir = tempfile::TempDir::new().unwrap();
    let corpus = write_corpus(&dir);

    let retriever = load_retriever(&AppConfig::default(), Some(&corpus))
        .await
        .unwrap();
    let report = inspect_report(&retriever).await.unwrap();

    assert!(report.contains("4 embedded"));
    assert!(report.contains("bm25"));
}

#[tokio::test]
async fn test_missing_corpus_is_an_error() {
    let err = load_retriever(&AppConfig::default(), Some("/nonexistent/corpus.jsonl"))
        .await
        .err()
        .unwrap();
    assert!(err.to_string().contains("/nonexistent/corpus.jsonl"));
}
