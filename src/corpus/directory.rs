//! Directory-backed corpus source: one `.txt` file per document.

use std::path::PathBuf;

use walkdir::WalkDir;

use super::{CorpusError, CorpusSource, Document};

const DOCUMENT_EXTENSION: &str = "txt";

/// Reads `*.txt` files from the top level of a directory.
///
/// The file stem becomes the document id, so `install-guide.txt` is cited
/// as `install-guide`. Entries are visited in file-name order.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn unreadable(&self, source: std::io::Error) -> CorpusError {
        CorpusError::Unreadable {
            location: self.root.display().to_string(),
            source,
        }
    }
}

impl CorpusSource for DirectorySource {
    fn location(&self) -> String {
        self.root.display().to_string()
    }

    fn documents(&self) -> Result<Vec<Document>, CorpusError> {
        if !self.root.is_dir() {
            return Err(self.unreadable(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "not a directory",
            )));
        }

        let mut documents = Vec::new();
        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry.map_err(|e| self.unreadable(e.into()))?;
            let path = entry.path();

            if !entry.file_type().is_file()
                || path.extension().and_then(|e| e.to_str()) != Some(DOCUMENT_EXTENSION)
            {
                continue;
            }

            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                tracing::warn!("Skipping document with non UTF-8 name: {}", path.display());
                continue;
            };

            let text = std::fs::read_to_string(path).map_err(|e| self.unreadable(e))?;
            documents.push(Document {
                id: id.to_string(),
                text,
            });
        }

        Ok(documents)
    }
}
