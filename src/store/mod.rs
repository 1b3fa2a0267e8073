/*!
# Diagnostic Log

Файловый журнал диагностик: один JSON-массив, который целиком читается и
перезаписывается при каждом изменении.

Guarantees:
- insertion order is chronological order, entries are never edited in place;
- missing, unreadable or corrupt storage reads as an empty log (with a
  warning), so an append after corruption starts a fresh array;
- writes go through a temp file and a rename, and the read-modify-write cycle
  is serialized by an in-process mutex; separate processes still race
  (last writer wins).
*/

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::core::{read_text_file, write_atomic, StoreError};
use crate::diagnostics::Diagnostic;

/// Largest count [`DiagnosticLog::recent`] and `getDslErrors` ever serve.
pub const MAX_RECENT_LIMIT: usize = 100;

/// Default upper bound for [`DiagnosticLog::recent`].
pub const DEFAULT_MAX_RECENT: usize = MAX_RECENT_LIMIT;

/// Append-only diagnostic log backed by a JSON file
#[derive(Debug)]
pub struct DiagnosticLog {
    path: PathBuf,
    max_recent: usize,
    write_lock: Mutex<()>,
}

impl DiagnosticLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self::with_max_recent(path, DEFAULT_MAX_RECENT)
    }

    /// `max_recent` is clamped to `1..=MAX_RECENT_LIMIT`.
    pub fn with_max_recent<P: AsRef<Path>>(path: P, max_recent: usize) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            max_recent: max_recent.clamp(1, MAX_RECENT_LIMIT),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn max_recent(&self) -> usize {
        self.max_recent
    }

    /// Appends one diagnostic and rewrites the whole file.
    pub fn append(&self, diagnostic: Diagnostic) -> Result<usize, StoreError> {
        let _guard = self.lock();

        let mut entries = self.read_or_empty();
        entries.push(diagnostic);
        self.write_entries(&entries)?;

        tracing::debug!(
            "Appended diagnostic #{} to {}",
            entries.len(),
            self.path.display()
        );
        Ok(entries.len())
    }

    /// The last `count` diagnostics in insertion order.
    ///
    /// `count` is clamped to `1..=max_recent`.
    pub fn recent(&self, count: usize) -> Vec<Diagnostic> {
        let count = count.clamp(1, self.max_recent);
        let mut entries = self.all();
        let skip = entries.len().saturating_sub(count);
        entries.drain(..skip);
        entries
    }

    /// Every stored diagnostic, oldest first.
    pub fn all(&self) -> Vec<Diagnostic> {
        let _guard = self.lock();
        self.read_or_empty()
    }

    pub fn len(&self) -> usize {
        self.all().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replaces the stored sequence with an empty one.
    pub fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.lock();
        self.write_entries(&[])?;
        tracing::info!("Diagnostic log cleared: {}", self.path.display());
        Ok(())
    }

    /// Strict read: distinguishes a missing file from a broken one.
    pub fn load(&self) -> Result<Vec<Diagnostic>, StoreError> {
        let content = match read_text_file(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn read_or_empty(&self) -> Vec<Diagnostic> {
        match self.load() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("{}; treating the diagnostic log as empty", e);
                Vec::new()
            }
        }
    }

    fn write_entries(&self, entries: &[Diagnostic]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(entries)?;
        write_atomic(&self.path, &json).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // The guarded data is (), a poisoned lock carries no broken state
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Removes the log file entirely (used by `clear --purge`).
pub fn remove_log_file(path: &Path) -> Result<(), StoreError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(source) => Err(StoreError::Write {
            path: path.to_path_buf(),
            source,
        }),
    }
}
