//! Corpus store: the local reference documents replies can cite.
//!
//! Documents are loaded once at startup from a [`CorpusSource`] and kept in
//! insertion order so that matching scans them in a stable order.

mod directory;

pub use directory::DirectorySource;

use indexmap::IndexMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("corpus source {location} is unreadable: {source}")]
    Unreadable {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no documents found in {0}")]
    Empty(String),
}

/// A reference document. The id is derived from the source name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub text: String,
}

/// Anything that can enumerate `(name, content)` documents.
pub trait CorpusSource {
    /// Human-readable location used in log lines and errors.
    fn location(&self) -> String;

    /// Enumerate all documents in a stable order.
    fn documents(&self) -> Result<Vec<Document>, CorpusError>;
}

/// In-memory corpus keyed by document id.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    documents: IndexMap<String, String>,
}

impl Corpus {
    /// Load every document exposed by `source`.
    ///
    /// When two documents share an id the later text wins; the entry keeps
    /// the position of the first occurrence.
    pub fn load(source: &dyn CorpusSource) -> Result<Self, CorpusError> {
        let location = source.location();
        tracing::info!("Loading corpus from {}", location);

        let corpus: Corpus = source.documents()?.into_iter().collect();
        if corpus.is_empty() {
            return Err(CorpusError::Empty(location));
        }

        tracing::info!(count = corpus.len(), "Loaded corpus documents");
        Ok(corpus)
    }

    pub fn insert(&mut self, document: Document) {
        if self.documents.contains_key(&document.id) {
            tracing::warn!(id = %document.id, "Duplicate document id, keeping the later text");
        }
        self.documents.insert(document.id, document.text);
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.documents.get(id).map(String::as_str)
    }

    /// Iterate `(id, text)` pairs in load order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.documents
            .iter()
            .map(|(id, text)| (id.as_str(), text.as_str()))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl FromIterator<Document> for Corpus {
    fn from_iter<I: IntoIterator<Item = Document>>(iter: I) -> Self {
        let mut corpus = Corpus::default();
        for document in iter {
            corpus.insert(document);
        }
        corpus
    }
}
