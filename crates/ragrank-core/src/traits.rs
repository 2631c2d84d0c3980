//! Core traits shared across ragrank crates.
//!
//! The primary trait is [`DocumentLookup`], the corpus-lookup collaborator
//! the hybrid combiner uses to resolve hits that only the lexical side
//! produced. The lexical scorer only knows document *content*, so those hits
//! have to be mapped back to full [`Document`]s before they can be returned.

use std::collections::HashMap;

use crate::Result;
use crate::document::Document;

/// Resolve document content to the full [`Document`] it belongs to.
///
/// # Contract
///
/// - `Ok(Some(doc))`: the content is known.
/// - `Ok(None)`: the content is not part of the corpus; the caller drops
///   the candidate.
/// - `Err(_)`: the lookup itself failed; the caller treats this as a
///   failure of the whole operation.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use ragrank_core::{Document, DocumentLookup};
///
/// let mut corpus = HashMap::new();
/// corpus.insert("doc A".to_string(), Document::new("doc A"));
///
/// let found = corpus.lookup("doc A").unwrap();
/// assert_eq!(found.map(|d| d.content), Some("doc A".to_string()));
/// assert!(corpus.lookup("doc Z").unwrap().is_none());
/// ```
pub trait DocumentLookup: Send + Sync {
    /// Find the document whose content is exactly `content`.
    fn lookup(&self, content: &str) -> Result<Option<Document>>;
}

impl DocumentLookup for HashMap<String, Document> {
    fn lookup(&self, content: &str) -> Result<Option<Document>> {
        Ok(self.get(content).cloned())
    }
}

impl DocumentLookup for [Document] {
    fn lookup(&self, content: &str) -> Result<Option<Document>> {
        Ok(self.iter().find(|d| d.content == content).cloned())
    }
}
