//! JSON-lines corpus loading.
//!
//! Each non-blank line is an object with a `content` string and an optional
//! `metadata` object:
//!
//! ```text
//! {"content": "Kong routes traffic", "metadata": {"source": "intro.md"}}
//! ```
//!
//! Non-string metadata values are kept in their JSON text form.

use std::path::Path;

use ragrank::Document;
use ragrank_core::{Error, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct CorpusRecord {
    content: String,
    #[serde(default)]
    metadata: serde_json::Map<String, serde_json::Value>,
}

impl From<CorpusRecord> for Document {
    fn from(record: CorpusRecord) -> Self {
        let metadata = record
            .metadata
            .into_iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(key, value)| match value {
                serde_json::Value::String(s) => (key, s),
                other => (key, other.to_string()),
            })
            .collect();
        Document {
            content: record.content,
            metadata,
        }
    }
}

/// Load a JSON-lines corpus file.
pub fn load_corpus(path: impl AsRef<Path>) -> Result<Vec<Document>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
    let documents = parse_corpus(&text)
        .map_err(|e| Error::invalid_data(format!("{}: {e}", path.display())))?;
    log::info!("Loaded {} documents from {}", documents.len(), path.display());
    Ok(documents)
}

/// Parse JSON-lines text into documents, skipping blank lines.
pub fn parse_corpus(text: &str) -> Result<Vec<Document>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str::<CorpusRecord>(line)
                .map(Document::from)
                .map_err(|e| Error::invalid_data(format!("line {}: {e}", idx + 1)))
        })
        .collect()
}
