//! Configuration sources.
//!
//! A source yields raw configuration text plus a cheap [`Fingerprint`] used
//! to decide whether the text changed since the last read. Only sources touch
//! the filesystem; parsing and resolution work on the returned text.

use crate::error::SourceError;
use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Change detector for a source's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fingerprint {
    /// File length and modification time.
    File {
        len: u64,
        modified: Option<SystemTime>,
    },
    /// Monotonic revision of an in-memory source.
    Revision(u64),
}

/// Where configuration text comes from.
pub trait ConfigSource {
    /// Current fingerprint. Must be cheap; it is checked on every load.
    fn fingerprint(&self) -> Result<Fingerprint, SourceError>;

    /// Read the full text.
    fn read(&self) -> Result<String, SourceError>;

    /// Human-readable name for logs.
    fn describe(&self) -> String;
}

/// A configuration file on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for FileSource {
    fn fingerprint(&self) -> Result<Fingerprint, SourceError> {
        let metadata =
            std::fs::metadata(&self.path).map_err(|e| SourceError::from_io(&self.path, e))?;
        Ok(Fingerprint::File {
            len: metadata.len(),
            modified: metadata.modified().ok(),
        })
    }

    fn read(&self) -> Result<String, SourceError> {
        std::fs::read_to_string(&self.path).map_err(|e| SourceError::from_io(&self.path, e))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory text, for embedding and tests.
///
/// Every [`set_text`](Self::set_text) or [`touch`](Self::touch) bumps the
/// revision. Reads are counted.
#[derive(Debug, Default)]
pub struct MemorySource {
    text: String,
    revision: u64,
    reads: Cell<usize>,
}

impl MemorySource {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            revision: 0,
            reads: Cell::new(0),
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.revision += 1;
    }

    /// Mark as changed without changing the text.
    pub fn touch(&mut self) {
        self.revision += 1;
    }

    /// Number of full reads so far.
    pub fn reads(&self) -> usize {
        self.reads.get()
    }
}

impl ConfigSource for MemorySource {
    fn fingerprint(&self) -> Result<Fingerprint, SourceError> {
        Ok(Fingerprint::Revision(self.revision))
    }

    fn read(&self) -> Result<String, SourceError> {
        self.reads.set(self.reads.get() + 1);
        Ok(self.text.clone())
    }

    fn describe(&self) -> String {
        format!("<memory rev {}>", self.revision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_source_reads_content() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.conf");
        std::fs::write(&path, "[ftp]\npath = /tmp/\n").unwrap();

        let source = FileSource::new(&path);
        assert_eq!(source.read().unwrap(), "[ftp]\npath = /tmp/\n");
        assert_eq!(source.path(), path.as_path());
        assert!(source.describe().ends_with("settings.conf"));
    }

    #[test]
    fn test_file_fingerprint_tracks_length() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.conf");
        std::fs::write(&path, "").unwrap();

        let source = FileSource::new(&path);
        let before = source.fingerprint().unwrap();
        assert_eq!(source.fingerprint().unwrap(), before);

        std::fs::write(&path, "1").unwrap();
        let after = source.fingerprint().unwrap();
        assert_ne!(after, before);
        assert!(matches!(after, Fingerprint::File { len: 1, .. }));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let temp = TempDir::new().unwrap();
        let source = FileSource::new(temp.path().join("missing.conf"));
        assert!(matches!(
            source.fingerprint(),
            Err(SourceError::NotFound { .. })
        ));
        assert!(matches!(source.read(), Err(SourceError::NotFound { .. })));
    }

    #[test]
    fn test_memory_source_revisions() {
        let mut source = MemorySource::new("[a]");
        assert_eq!(source.fingerprint().unwrap(), Fingerprint::Revision(0));

        source.touch();
        assert_eq!(source.fingerprint().unwrap(), Fingerprint::Revision(1));

        source.set_text("[b]");
        assert_eq!(source.fingerprint().unwrap(), Fingerprint::Revision(2));
        assert_eq!(source.read().unwrap(), "[b]");
        assert_eq!(source.reads(), 1);
    }
}
