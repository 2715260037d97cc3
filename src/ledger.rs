//! Durable ledger of forum posts that have already been handled.
//!
//! The backing file holds one post id per line and is only ever appended to.
//! The whole file is read into memory when the ledger is opened; every
//! [`Ledger::append`] updates the in-memory set and syncs the new line to disk
//! before returning, so a crash loses at most the action in flight.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    seen: HashSet<String>,
    /// The file on disk does not end with a newline yet.
    unterminated: bool,
}

impl Ledger {
    /// Open the ledger at `path`. A missing file is an empty ledger.
    pub fn open(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();

        let contents = if path.exists() {
            std::fs::read_to_string(&path)?
        } else {
            String::new()
        };

        let seen: HashSet<String> = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        let unterminated = !contents.is_empty() && !contents.ends_with('\n');

        tracing::info!(
            entries = seen.len(),
            "Loaded ledger from {}",
            path.display()
        );

        Ok(Self {
            path,
            seen,
            unterminated,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Record `id` as handled.
    ///
    /// The in-memory set is updated first, so even when the write fails the id
    /// is not revisited for the rest of the run.
    pub fn append(&mut self, id: &str) -> std::io::Result<()> {
        self.seen.insert(id.to_string());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        if self.unterminated {
            writeln!(file)?;
        }
        writeln!(file, "{}", id)?;
        file.sync_all()?;
        self.unterminated = false;

        tracing::debug!(id, "Recorded post in ledger");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let ledger = Ledger::open(dir.path().join("commented_posts.log")).unwrap();
        assert!(ledger.is_empty());
        assert!(!ledger.contains("abc123"));
    }

    #[test]
    fn test_append_is_visible_immediately_and_after_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("commented_posts.log");

        let mut ledger = Ledger::open(&path).unwrap();
        ledger.append("abc123").unwrap();
        assert!(ledger.contains("abc123"));

        // Simulate a crash right after the append: drop and reopen.
        drop(ledger);
        let reopened = Ledger::open(&path).unwrap();
        assert!(reopened.contains("abc123"));
        assert_eq!(reopened.len(), 1);
    }

    #[test]
    fn test_duplicate_append_is_harmless() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("commented_posts.log");

        let mut ledger = Ledger::open(&path).unwrap();
        ledger.append("abc123").unwrap();
        ledger.append("abc123").unwrap();
        assert_eq!(ledger.len(), 1);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "abc123\nabc123\n");
        assert_eq!(Ledger::open(&path).unwrap().len(), 1);
    }

    #[test]
    fn test_existing_log_is_appended_not_rewritten() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("commented_posts.log");
        std::fs::write(&path, "old1\n\n  old2  \n").unwrap();

        let mut ledger = Ledger::open(&path).unwrap();
        assert!(ledger.contains("old1"));
        assert!(ledger.contains("old2"));
        ledger.append("new1").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "old1\n\n  old2  \nnew1\n");
    }

    #[test]
    fn test_unterminated_last_line_is_not_merged() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("commented_posts.log");
        std::fs::write(&path, "old1").unwrap();

        let mut ledger = Ledger::open(&path).unwrap();
        ledger.append("new1").unwrap();
        ledger.append("new2").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "old1\nnew1\nnew2\n");
    }

    #[test]
    fn test_creates_parent_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state/ledger.log");
        let mut ledger = Ledger::open(&path).unwrap();
        ledger.append("p1").unwrap();
        assert!(path.exists());
    }
}
