//! Zip archive mounting.
//!
//! Roots may be zip containers (`.jar`, `.zip`) rather than directories.
//! [`ArchiveMount`] opens each archive at most once and hands out shared
//! [`ArchiveHandle`]s that answer existence queries from an in-memory entry
//! index and stream individual entries on demand.
//!
//! # Concurrency
//!
//! Opens are serialized per archive path: two threads mounting the same path
//! at the same time result in a single open, and the loser of the race picks
//! up the handle the winner stored. Mounting different archives proceeds in
//! parallel. Once a handle is stored, lookups only touch the concurrent map.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::{debug, info};
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::{ResourceError, ResourceResult};

/// Upper bound on the buffer reserved up front when reading an entry.
const MAX_PREALLOC: u64 = 1 << 20;

/// An open, read-only zip archive.
///
/// The entry index is built once when the archive is opened. Entry names are
/// normalized to forward-slash relative paths without a leading `/`, and every
/// parent directory of a file is recorded even when the archive has no
/// explicit directory entry for it.
pub struct ArchiveHandle {
    path: PathBuf,

    /// Normalized file name -> raw entry name as stored in the archive.
    files: BTreeMap<String, String>,

    /// Normalized directory names, without trailing slash.
    dirs: BTreeSet<String>,

    reader: Mutex<ZipArchive<BufReader<File>>>,
}

impl ArchiveHandle {
    /// Open the archive at `path` and index its entries.
    pub fn open(path: impl Into<PathBuf>) -> ResourceResult<Self> {
        let path = path.into();
        let archive_open_error = |source: ZipError| ResourceError::ArchiveOpen {
            path: path.clone(),
            source,
        };

        let file = File::open(&path).map_err(|e| archive_open_error(ZipError::Io(e)))?;
        let archive = ZipArchive::new(BufReader::new(file)).map_err(archive_open_error)?;

        let mut files = BTreeMap::new();
        let mut dirs = BTreeSet::new();
        for raw in archive.file_names() {
            let name = normalize_entry(raw);
            if name.is_empty() {
                continue;
            }
            if raw.ends_with('/') {
                dirs.insert(name.to_string());
            } else {
                files.insert(name.to_string(), raw.to_string());
            }
            // Record implied parents
            let mut parent = name;
            while let Some(pos) = parent.rfind('/') {
                parent = &parent[..pos];
                if !dirs.insert(parent.to_string()) {
                    break;
                }
            }
        }

        Ok(Self {
            path,
            files,
            dirs,
            reader: Mutex::new(archive),
        })
    }

    /// Filesystem path of the archive container.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of file entries in the archive.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Check whether `entry` names a file in the archive.
    pub fn contains_file(&self, entry: &str) -> bool {
        self.files.contains_key(normalize_entry(entry))
    }

    /// Check whether `entry` names a directory in the archive.
    ///
    /// The empty name is the archive root and always exists.
    pub fn contains_dir(&self, entry: &str) -> bool {
        let entry = normalize_entry(entry);
        entry.is_empty() || self.dirs.contains(entry)
    }

    /// Check whether `entry` names a file or a directory.
    pub fn contains(&self, entry: &str) -> bool {
        self.contains_file(entry) || self.contains_dir(entry)
    }

    /// All file entries at or below `prefix`, in sorted order.
    ///
    /// A prefix naming a file yields just that file. An empty prefix yields
    /// every file in the archive.
    pub fn files_under(&self, prefix: &str) -> Vec<String> {
        let prefix = normalize_entry(prefix);
        if prefix.is_empty() {
            return self.files.keys().cloned().collect();
        }
        let dir_prefix = format!("{}/", prefix);
        self.files
            .range(prefix.to_string()..)
            .map(|(name, _)| name)
            .take_while(|name| name.starts_with(prefix))
            .filter(|name| name.as_str() == prefix || name.starts_with(&dir_prefix))
            .cloned()
            .collect()
    }

    /// Open a byte stream over a file entry.
    ///
    /// The entry is decompressed into memory so the returned stream does not
    /// hold the archive lock.
    pub fn open_entry(&self, entry: &str) -> io::Result<Box<dyn Read + Send>> {
        let raw = self.files.get(normalize_entry(entry)).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no entry '{}' in {}", entry, self.path.display()),
            )
        })?;

        let mut archive = self.reader.lock();
        let mut file = archive
            .by_name(raw)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        // The header size is untrusted; cap the hint and let the read grow it
        let hint = file.size().min(MAX_PREALLOC) as usize;
        let mut bytes = Vec::with_capacity(hint);
        file.read_to_end(&mut bytes)?;
        Ok(Box::new(Cursor::new(bytes)))
    }
}

impl fmt::Debug for ArchiveHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveHandle")
            .field("path", &self.path)
            .field("files", &self.files.len())
            .field("dirs", &self.dirs.len())
            .finish()
    }
}

/// Process-lifetime registry of open archives, keyed by archive path.
///
/// Handles are never closed. Archives are read-only and their number is
/// bounded by the distinct roots a process encounters.
#[derive(Debug, Default)]
pub struct ArchiveMount {
    handles: DashMap<PathBuf, Arc<ArchiveHandle>>,
    opening: DashMap<PathBuf, Arc<Mutex<()>>>,
}

impl ArchiveMount {
    /// Create an empty mount registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the handle for the archive at `path`, opening it if needed.
    ///
    /// A failed open is not remembered; the next call tries again.
    pub fn mount(&self, path: &Path) -> ResourceResult<Arc<ArchiveHandle>> {
        if let Some(handle) = self.handles.get(path) {
            return Ok(Arc::clone(handle.value()));
        }

        let guard = Arc::clone(
            self.opening
                .entry(path.to_path_buf())
                .or_default()
                .value(),
        );
        let _lock = guard.lock();

        // Another thread may have finished the open while we waited.
        if let Some(handle) = self.handles.get(path) {
            debug!(archive = %path.display(), "Archive opened by concurrent caller");
            return Ok(Arc::clone(handle.value()));
        }

        let handle = Arc::new(ArchiveHandle::open(path)?);
        info!(
            archive = %path.display(),
            files = handle.file_count(),
            "Mounted archive"
        );
        self.handles
            .insert(path.to_path_buf(), Arc::clone(&handle));
        Ok(handle)
    }

    /// Get an already mounted handle without opening anything.
    pub fn get(&self, path: &Path) -> Option<Arc<ArchiveHandle>> {
        self.handles.get(path).map(|h| Arc::clone(h.value()))
    }

    /// Number of archives currently mounted.
    pub fn mounted(&self) -> usize {
        self.handles.len()
    }
}

/// Strip leading `/` and `./` so entry names compare consistently.
fn normalize_entry(entry: &str) -> &str {
    let mut entry = entry;
    loop {
        if let Some(rest) = entry.strip_prefix('/') {
            entry = rest;
        } else if let Some(rest) = entry.strip_prefix("./") {
            entry = rest;
        } else {
            break;
        }
    }
    entry.trim_end_matches('/')
}
