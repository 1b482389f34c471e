//! Root enumeration.
//!
//! A [`LoaderContext`] lists the locations a resolver may search, in priority
//! order. Each location is a plain directory or a zip archive. The context is
//! passed explicitly to every resolver and scanner; nothing is looked up from
//! thread-local or global state.
//!
//! # Root Forms
//!
//! | Form | Example |
//! |------|---------|
//! | Bare path | `src/test/resources`, `lib/fixtures.jar` |
//! | File URI | `file:///opt/app/resources` |
//! | Jar URI | `jar:file:///opt/app/fixtures.jar!/` |
//!
//! A location that is a regular file is treated as an archive. Anything else
//! (including a directory that does not exist yet) is a plain directory root
//! that simply never matches.

use std::ffi::OsStr;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, trace};
use url::Url;
use zip::result::ZipError;

use crate::archive::{ArchiveHandle, ArchiveMount};
use crate::config::ResolverConfig;
use crate::error::{ResourceError, ResourceResult};

/// Kind of root location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootKind {
    /// A directory on the host filesystem.
    PlainDirectory,
    /// The root of a zip archive.
    ArchiveRoot,
}

impl fmt::Display for RootKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RootKind::PlainDirectory => write!(f, "directory"),
            RootKind::ArchiveRoot => write!(f, "archive"),
        }
    }
}

/// One enumerated search location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Root {
    /// Directory or archive.
    pub kind: RootKind,
    /// Directory path, or path of the archive file.
    pub base_path: PathBuf,
}

impl Root {
    /// Create a plain directory root.
    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: RootKind::PlainDirectory,
            base_path: path.into(),
        }
    }

    /// Create an archive root.
    pub fn archive(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: RootKind::ArchiveRoot,
            base_path: path.into(),
        }
    }

    /// Check whether this root is backed by an archive.
    pub fn is_archive(&self) -> bool {
        matches!(self.kind, RootKind::ArchiveRoot)
    }

    /// Probe for `relative` (file or directory) inside this root.
    ///
    /// Absence, including an archive file that does not exist, is reported as
    /// [`LookupOutcome::NotPresent`]. A location that exists but cannot be
    /// inspected, or an archive that exists but cannot be opened, is
    /// [`LookupOutcome::Unreadable`].
    pub fn probe(&self, relative: &str, mounts: &ArchiveMount) -> LookupOutcome {
        match self.kind {
            RootKind::PlainDirectory => {
                let path = join_relative(&self.base_path, relative);
                match std::fs::metadata(&path) {
                    Ok(_) => LookupOutcome::Present(RootEntry::Path(path)),
                    Err(e) if e.kind() == io::ErrorKind::NotFound => LookupOutcome::NotPresent,
                    // A file in the middle of the path (ENOTDIR) also means absent
                    Err(_) if !path.parent().is_some_and(Path::is_dir) => {
                        LookupOutcome::NotPresent
                    }
                    Err(e) => LookupOutcome::Unreadable(ResourceError::ScanIo { path, source: e }),
                }
            }
            RootKind::ArchiveRoot => match mounts.mount(&self.base_path) {
                Ok(archive) => {
                    if archive.contains(relative) {
                        LookupOutcome::Present(RootEntry::Archive {
                            archive,
                            entry: relative.trim_matches('/').to_string(),
                        })
                    } else {
                        LookupOutcome::NotPresent
                    }
                }
                // A jar root whose file is gone is skipped like a missing directory
                Err(ResourceError::ArchiveOpen {
                    source: ZipError::Io(ref e),
                    ..
                }) if e.kind() == io::ErrorKind::NotFound => {
                    debug!(root = %self, "Archive root does not exist, skipping");
                    LookupOutcome::NotPresent
                }
                Err(e) => LookupOutcome::Unreadable(e),
            },
        }
    }
}

impl fmt::Display for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.base_path.display(), self.kind)
    }
}

/// A location found inside a root.
#[derive(Debug, Clone)]
pub enum RootEntry {
    /// A file or directory on the host filesystem.
    Path(PathBuf),
    /// A file or directory inside a mounted archive.
    Archive {
        archive: Arc<ArchiveHandle>,
        entry: String,
    },
}

impl RootEntry {
    /// Whether the entry lives inside an archive.
    pub fn is_archive(&self) -> bool {
        matches!(self, RootEntry::Archive { .. })
    }

    /// Whether the entry is a regular file (as opposed to a directory).
    pub fn is_file(&self) -> bool {
        match self {
            RootEntry::Path(path) => path.is_file(),
            RootEntry::Archive { archive, entry } => archive.contains_file(entry),
        }
    }
}

/// Result of probing one root for a relative path.
#[derive(Debug)]
pub enum LookupOutcome {
    /// The root does not contain the path. Expected when several roots exist.
    NotPresent,
    /// The path exists in this root.
    Present(RootEntry),
    /// The path exists but could not be inspected.
    Unreadable(ResourceError),
}

/// A relative path located by [`LoaderContext::find`].
#[derive(Debug, Clone)]
pub struct ResourceUrl {
    /// The root the path was found in.
    pub root: Root,
    /// Where the path lives.
    pub entry: RootEntry,
}

impl ResourceUrl {
    /// Whether the located path is inside an archive.
    pub fn is_archive(&self) -> bool {
        self.entry.is_archive()
    }
}

/// Ordered set of root locations visible to a resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoaderContext {
    roots: Vec<String>,
}

impl LoaderContext {
    /// Create a context from root URIs or paths, highest priority first.
    pub fn new<I, S>(roots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a context from a platform path list held in an environment
    /// variable (`:`-separated on Unix, `;` on Windows).
    ///
    /// An unset variable yields an empty context.
    pub fn from_env(var: impl AsRef<OsStr>) -> Self {
        let roots = std::env::var_os(var)
            .map(|value| {
                std::env::split_paths(&value)
                    .filter(|p| !p.as_os_str().is_empty())
                    .map(|p| p.to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        Self { roots }
    }

    /// Create a context from the roots listed in a configuration.
    pub fn from_config(config: &ResolverConfig) -> Self {
        Self::new(config.roots.iter().cloned())
    }

    /// Append a root with the lowest priority.
    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.roots.push(root.into());
        self
    }

    /// The raw root URIs, in priority order.
    pub fn uris(&self) -> &[String] {
        &self.roots
    }

    /// Check whether no roots are configured.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Convert every configured URI into a [`Root`], preserving order.
    pub fn roots(&self) -> ResourceResult<Vec<Root>> {
        enumerate_roots(self)
    }

    /// Map a relative path to the first root that contains it.
    ///
    /// Directories count as hits, so `find("")` returns the first root.
    pub fn find(
        &self,
        relative: &str,
        mounts: &ArchiveMount,
    ) -> ResourceResult<Option<ResourceUrl>> {
        for root in self.roots()? {
            match root.probe(relative, mounts) {
                LookupOutcome::Present(entry) => {
                    trace!(root = %root, relative, "Found path in root");
                    return Ok(Some(ResourceUrl { root, entry }));
                }
                LookupOutcome::NotPresent => continue,
                LookupOutcome::Unreadable(e) => return Err(e),
            }
        }
        Ok(None)
    }
}

/// Convert every URI in `context` into a [`Root`], in the order given.
///
/// Fails with [`ResourceError::RootResolution`] on the first URI that cannot
/// be turned into a filesystem location.
pub fn enumerate_roots(context: &LoaderContext) -> ResourceResult<Vec<Root>> {
    let roots = context
        .uris()
        .iter()
        .map(String::as_str)
        .map(parse_root)
        .collect::<ResourceResult<Vec<_>>>()?;
    debug!(count = roots.len(), "Enumerated resource roots");
    Ok(roots)
}

/// Convert a single root URI or path into a [`Root`].
pub fn parse_root(uri: &str) -> ResourceResult<Root> {
    let root_error = |reason: String| ResourceError::RootResolution {
        uri: uri.to_string(),
        reason,
    };

    if let Some(rest) = uri.strip_prefix("jar:") {
        let (archive_uri, inner) = rest
            .split_once("!/")
            .ok_or_else(|| root_error("missing '!/' separator".to_string()))?;
        if !inner.is_empty() {
            return Err(root_error(format!(
                "nested archive roots are not supported: '{}'",
                inner
            )));
        }
        let path = file_uri_to_path(archive_uri).map_err(root_error)?;
        return Ok(Root::archive(path));
    }

    let path = if uri.starts_with("file:") {
        file_uri_to_path(uri).map_err(root_error)?
    } else if uri.is_empty() {
        return Err(root_error("empty root".to_string()));
    } else {
        PathBuf::from(uri)
    };

    if path.is_file() {
        Ok(Root::archive(path))
    } else {
        Ok(Root::directory(path))
    }
}

fn file_uri_to_path(uri: &str) -> Result<PathBuf, String> {
    let url = Url::parse(uri).map_err(|e| format!("invalid URI: {}", e))?;
    if url.scheme() != "file" {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    url.to_file_path()
        .map_err(|_| "URI does not name a local path".to_string())
}

/// Join a forward-slash relative path onto a base directory.
pub(crate) fn join_relative(base: &Path, relative: &str) -> PathBuf {
    relative
        .split('/')
        .filter(|segment| !segment.is_empty())
        .fold(base.to_path_buf(), |path, segment| path.join(segment))
}
