//! Read-only, line-delimited JSON collections.
//!
//! A dataset root holds one file per entity kind. Files are never written
//! during a run, so every scan sees the same records in the same order.

use crate::error::{Result, StoreError};
use revsim_core::{AccessError, EntityKind, Record};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

const EXTENSIONS: [&str; 3] = ["json", "jsonl", "ndjson"];

#[derive(Debug)]
pub struct JsonlCollection {
    kind: EntityKind,
    path: PathBuf,
    scans: AtomicUsize,
}

impl JsonlCollection {
    /// Finds the collection for `kind` inside `root`.
    ///
    /// # Errors
    /// [`StoreError::MissingCollection`] if no `<kind>.{json,jsonl,ndjson}`
    /// file exists.
    pub fn locate(root: &Path, kind: EntityKind) -> Result<Self> {
        EXTENSIONS
            .iter()
            .map(|ext| root.join(format!("{}.{ext}", kind.file_stem())))
            .find(|path| path.is_file())
            .map(|path| Self::open(kind, path))
            .ok_or_else(|| StoreError::MissingCollection {
                kind,
                root: root.to_path_buf(),
            })
    }

    #[must_use]
    pub fn open(kind: EntityKind, path: PathBuf) -> Self {
        Self {
            kind,
            path,
            scans: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of passes started over the backing file.
    #[must_use]
    pub fn scan_count(&self) -> usize {
        self.scans.load(Ordering::Relaxed)
    }

    /// Visits records in file order until `visit` breaks or the file ends.
    /// Blank lines are skipped.
    ///
    /// # Errors
    /// I/O failures and lines that are not JSON objects.
    pub fn scan<F>(&self, mut visit: F) -> std::result::Result<(), AccessError>
    where
        F: FnMut(Record) -> ControlFlow<()>,
    {
        self.scans.fetch_add(1, Ordering::Relaxed);
        let io_err = |source| AccessError::Io {
            kind: self.kind,
            source,
        };
        let reader = BufReader::new(File::open(&self.path).map_err(io_err)?);

        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(io_err)?;
            if line.trim().is_empty() {
                continue;
            }
            let record: Record =
                serde_json::from_str(&line).map_err(|source| AccessError::Malformed {
                    kind: self.kind,
                    line: idx + 1,
                    source,
                })?;
            if visit(record).is_break() {
                break;
            }
        }
        Ok(())
    }

    /// First record whose `field` equals `value`.
    pub fn find(&self, field: &str, value: &str) -> std::result::Result<Option<Record>, AccessError> {
        let mut found = None;
        self.scan(|record| {
            if record.str_field(field) == Some(value) {
                found = Some(record);
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })?;
        Ok(found)
    }

    /// Every record whose `field` equals `value`, in file order.
    pub fn filter(&self, field: &str, value: &str) -> std::result::Result<Vec<Record>, AccessError> {
        let mut matches = Vec::new();
        self.scan(|record| {
            if record.str_field(field) == Some(value) {
                matches.push(record);
            }
            ControlFlow::Continue(())
        })?;
        Ok(matches)
    }

    pub fn load_all(&self) -> std::result::Result<Vec<Record>, AccessError> {
        let mut records = Vec::new();
        self.scan(|record| {
            records.push(record);
            ControlFlow::Continue(())
        })?;
        Ok(records)
    }
}
