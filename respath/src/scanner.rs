//! Recursive resource discovery.
//!
//! [`RecursiveScanner`] walks directories and archives collecting every file
//! whose name ends with a suffix (`.feature` by default) and returns each as a
//! [`Resource`] whose logical path resolves back to the same file.
//!
//! # Search Modes
//!
//! - **Archive scoped** (`classpath:some/dir`): if the first root holding
//!   `some/dir` is an archive, only that archive subtree is walked. Otherwise
//!   every root containing `some/dir` is walked in root order. Roots that lack
//!   the path are skipped. Logical paths are `classpath:` + the path relative
//!   to the root.
//! - **Plain scoped** (`some/dir`): the literal filesystem path is walked.
//!   Logical paths are `file:` + the path relative to the working directory.
//!
//! Traversal is sorted by file name, so results are deterministic. Symbolic
//! links are not followed.
//!
//! A shadowed file (same relative path in two roots) is reported once per
//! root. Its logical path resolves to the copy in the earlier root.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::archive::{ArchiveHandle, ArchiveMount};
use crate::error::{ResourceError, ResourceResult};
use crate::resource::Resource;
use crate::root::{LoaderContext, LookupOutcome, Root, RootEntry};
use crate::scheme::{self, CLASSPATH_PREFIX, FILE_PREFIX};

/// Default suffix for scenario definition files.
pub const DEFAULT_SUFFIX: &str = ".feature";

/// How a search path is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanMode {
    /// Search every root (directories and archives).
    ArchiveScoped,
    /// Walk a literal filesystem path.
    PlainScoped,
}

/// One search request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchSpec {
    pub mode: ScanMode,
    /// Search path as written, prefix included.
    pub search_path: String,
}

impl SearchSpec {
    /// Search all roots for `search_path` (with or without `classpath:`).
    pub fn archive_scoped(search_path: impl Into<String>) -> Self {
        Self {
            mode: ScanMode::ArchiveScoped,
            search_path: search_path.into(),
        }
    }

    /// Walk the literal filesystem path `search_path`.
    pub fn plain_scoped(search_path: impl Into<String>) -> Self {
        Self {
            mode: ScanMode::PlainScoped,
            search_path: search_path.into(),
        }
    }

    /// Pick the mode from the path's prefix: `classpath:` is archive scoped,
    /// anything else is plain scoped.
    pub fn parse(text: &str) -> Self {
        if scheme::is_classpath(text) {
            Self::archive_scoped(text)
        } else {
            Self::plain_scoped(text)
        }
    }

    /// The search path with any scheme prefix removed.
    pub fn stripped_path(&self) -> &str {
        scheme::classify(&self.search_path).1
    }
}

impl fmt::Display for SearchSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            ScanMode::ArchiveScoped => write!(f, "{} (all roots)", self.search_path),
            ScanMode::PlainScoped => write!(f, "{} (filesystem)", self.search_path),
        }
    }
}

/// Walks roots collecting files by suffix.
#[derive(Debug, Clone)]
pub struct RecursiveScanner {
    loader: LoaderContext,
    mounts: Arc<ArchiveMount>,
    suffix: String,
}

impl RecursiveScanner {
    /// Create a scanner for `suffix` with its own archive registry.
    pub fn new(loader: LoaderContext, suffix: impl Into<String>) -> Self {
        Self::with_mounts(loader, Arc::new(ArchiveMount::new()), suffix)
    }

    /// Create a scanner sharing an archive registry.
    pub fn with_mounts(
        loader: LoaderContext,
        mounts: Arc<ArchiveMount>,
        suffix: impl Into<String>,
    ) -> Self {
        Self {
            loader,
            mounts,
            suffix: suffix.into(),
        }
    }

    /// The filename suffix being matched.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Scan every root from the top.
    pub fn scan_classpath(&self) -> ResourceResult<Vec<Resource>> {
        self.scan(&SearchSpec::archive_scoped(CLASSPATH_PREFIX))
    }

    /// Parse each path with [`SearchSpec::parse`] and scan them in order.
    pub fn scan_paths<S: AsRef<str>>(&self, paths: &[S]) -> ResourceResult<Vec<Resource>> {
        let specs: Vec<SearchSpec> = paths
            .iter()
            .map(|p| SearchSpec::parse(p.as_ref()))
            .collect();
        self.scan_all(&specs)
    }

    /// Scan several specs, concatenating results in spec order.
    pub fn scan_all(&self, specs: &[SearchSpec]) -> ResourceResult<Vec<Resource>> {
        let mut resources = Vec::new();
        for spec in specs {
            resources.extend(self.scan(spec)?);
        }
        Ok(resources)
    }

    /// Scan a single spec.
    ///
    /// # Errors
    ///
    /// Walk failures abort with [`ResourceError::ScanIo`]; archives that exist
    /// but cannot be opened abort with [`ResourceError::ArchiveOpen`]. Nothing
    /// collected before the failure is returned.
    pub fn scan(&self, spec: &SearchSpec) -> ResourceResult<Vec<Resource>> {
        let mut found = Vec::new();
        match spec.mode {
            ScanMode::ArchiveScoped => self.scan_roots(spec.stripped_path(), &mut found)?,
            ScanMode::PlainScoped => self.scan_filesystem(spec.stripped_path(), &mut found)?,
        }
        info!(
            search = %spec,
            suffix = %self.suffix,
            found = found.len(),
            "Scan complete"
        );
        Ok(found)
    }

    fn scan_roots(&self, search_path: &str, found: &mut Vec<Resource>) -> ResourceResult<()> {
        let search_path = search_path.trim_matches('/');

        // A direct hit inside an archive is walked through that archive alone.
        // An empty search path means "everything", which always spans all roots.
        let direct = if search_path.is_empty() {
            None
        } else {
            self.loader.find(search_path, &self.mounts)?
        };
        if let Some(url) = direct {
            if let RootEntry::Archive { archive, entry } = url.entry {
                debug!(
                    archive = %archive.path().display(),
                    search_path,
                    "Search path resolved inside archive"
                );
                self.collect_archive(&archive, &entry, found);
                return Ok(());
            }
        }

        for root in self.loader.roots()? {
            match root.probe(search_path, &self.mounts) {
                LookupOutcome::NotPresent => {
                    debug!(root = %root, search_path, "Search path not in root, skipping");
                }
                LookupOutcome::Unreadable(e) => return Err(e),
                LookupOutcome::Present(RootEntry::Path(start)) => {
                    self.collect_directory(&root, &start, found)?;
                }
                LookupOutcome::Present(RootEntry::Archive { archive, entry }) => {
                    self.collect_archive(&archive, &entry, found);
                }
            }
        }
        Ok(())
    }

    fn collect_directory(
        &self,
        root: &Root,
        start: &Path,
        found: &mut Vec<Resource>,
    ) -> ResourceResult<()> {
        for path in self.walk(start)? {
            let relative = path.strip_prefix(&root.base_path).unwrap_or(&path);
            let logical = format!("{}{}", CLASSPATH_PREFIX, scheme::to_logical_name(relative));
            found.push(Resource::file(path, logical));
        }
        Ok(())
    }

    fn collect_archive(
        &self,
        archive: &Arc<ArchiveHandle>,
        prefix: &str,
        found: &mut Vec<Resource>,
    ) {
        for entry in archive.files_under(prefix) {
            let file_name = entry.rsplit('/').next().unwrap_or(&entry);
            if !file_name.ends_with(&self.suffix) {
                continue;
            }
            let logical = format!("{}{}", CLASSPATH_PREFIX, entry);
            found.push(Resource::archive_entry(Arc::clone(archive), entry, logical));
        }
    }

    fn scan_filesystem(&self, search_path: &str, found: &mut Vec<Resource>) -> ResourceResult<()> {
        let start = PathBuf::from(search_path);
        let cwd = if start.is_absolute() {
            std::env::current_dir().ok()
        } else {
            None
        };

        for path in self.walk(&start)? {
            let relative = cwd
                .as_deref()
                .and_then(|cwd| path.strip_prefix(cwd).ok())
                .unwrap_or(&path);
            let logical = format!("{}{}", FILE_PREFIX, relative.display());
            found.push(Resource::file(path, logical));
        }
        Ok(())
    }

    /// Walk `start` and return every regular file matching the suffix.
    fn walk(&self, start: &Path) -> ResourceResult<Vec<PathBuf>> {
        let mut matches = Vec::new();
        for entry in WalkDir::new(start).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(start).to_path_buf();
                ResourceError::ScanIo {
                    path,
                    source: io::Error::from(e),
                }
            })?;
            if entry.file_type().is_dir() {
                continue;
            }
            if entry.file_type().is_symlink() && !entry.path().is_file() {
                continue;
            }
            if entry.file_name().to_string_lossy().ends_with(&self.suffix) {
                matches.push(entry.into_path());
            }
        }
        Ok(matches)
    }
}
