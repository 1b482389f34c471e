//! Resolved resources.
//!
//! A [`Resource`] pairs a concrete location with the logical path that names
//! it. Feeding the logical path back into the resolver yields a resource with
//! an equal [`Location`].

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::archive::ArchiveHandle;
use crate::error::{ResourceError, ResourceResult};
use crate::scheme::{self, ResourceKind};

/// Where a resource's bytes live.
#[derive(Clone)]
pub enum Location {
    /// A file on the host filesystem.
    File(PathBuf),
    /// A file entry inside a mounted archive.
    ArchiveEntry {
        archive: Arc<ArchiveHandle>,
        entry: String,
    },
}

impl Location {
    /// Filesystem path, for file-backed locations.
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Location::File(path) => Some(path),
            Location::ArchiveEntry { .. } => None,
        }
    }

    /// Whether the location is inside an archive.
    pub fn is_archive(&self) -> bool {
        matches!(self, Location::ArchiveEntry { .. })
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Location::File(a), Location::File(b)) => a == b,
            (
                Location::ArchiveEntry {
                    archive: a,
                    entry: entry_a,
                },
                Location::ArchiveEntry {
                    archive: b,
                    entry: entry_b,
                },
            ) => a.path() == b.path() && entry_a == entry_b,
            _ => false,
        }
    }
}

impl Eq for Location {}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::File(path) => write!(f, "{}", path.display()),
            Location::ArchiveEntry { archive, entry } => {
                write!(f, "{}!/{}", archive.path().display(), entry)
            }
        }
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::File(path) => f.debug_tuple("File").field(path).finish(),
            Location::ArchiveEntry { archive, entry } => f
                .debug_struct("ArchiveEntry")
                .field("archive", &archive.path())
                .field("entry", entry)
                .finish(),
        }
    }
}

/// A resolved resource: an openable location plus its logical path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    location: Location,
    logical_path: String,
}

impl Resource {
    /// Create a resource backed by a host file.
    pub fn file(path: impl Into<PathBuf>, logical_path: impl Into<String>) -> Self {
        Self {
            location: Location::File(path.into()),
            logical_path: logical_path.into(),
        }
    }

    /// Create a resource backed by an archive entry.
    pub fn archive_entry(
        archive: Arc<ArchiveHandle>,
        entry: impl Into<String>,
        logical_path: impl Into<String>,
    ) -> Self {
        Self {
            location: Location::ArchiveEntry {
                archive,
                entry: entry.into(),
            },
            logical_path: logical_path.into(),
        }
    }

    /// The concrete location.
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// The logical path that re-resolves to this resource.
    pub fn logical_path(&self) -> &str {
        &self.logical_path
    }

    /// Content kind, from the logical path's suffix.
    pub fn kind(&self) -> ResourceKind {
        ResourceKind::from_path(&self.logical_path)
    }

    /// Dotted name derived from the logical path, e.g. `a.b.users`.
    pub fn package_qualified_name(&self) -> String {
        scheme::to_package_qualified_name(Some(&self.logical_path))
    }

    /// Check whether two resources point at the same bytes.
    pub fn same_location(&self, other: &Resource) -> bool {
        self.location == other.location
    }

    /// Open a fresh byte stream. The caller owns and closes it.
    pub fn open(&self) -> ResourceResult<Box<dyn Read + Send>> {
        let read_error = |source| ResourceError::Read {
            path: self.logical_path.clone(),
            source,
        };
        match &self.location {
            Location::File(path) => {
                let file = File::open(path).map_err(read_error)?;
                Ok(Box::new(BufReader::new(file)))
            }
            Location::ArchiveEntry { archive, entry } => {
                archive.open_entry(entry).map_err(read_error)
            }
        }
    }

    /// Read the whole resource.
    pub fn read_bytes(&self) -> ResourceResult<Vec<u8>> {
        let mut bytes = Vec::new();
        self.open()?
            .read_to_end(&mut bytes)
            .map_err(|source| ResourceError::Read {
                path: self.logical_path.clone(),
                source,
            })?;
        Ok(bytes)
    }

    /// Read the whole resource as UTF-8 text.
    pub fn read_to_string(&self) -> ResourceResult<String> {
        let mut text = String::new();
        self.open()?
            .read_to_string(&mut text)
            .map_err(|source| ResourceError::Read {
                path: self.logical_path.clone(),
                source,
            })?;
        Ok(text)
    }

    /// A serializable description of this resource.
    pub fn summary(&self) -> ResourceSummary {
        ResourceSummary {
            logical_path: self.logical_path.clone(),
            location: self.location.to_string(),
            kind: self.kind(),
            archived: self.location.is_archive(),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.logical_path, self.location)
    }
}

/// Serializable view of a [`Resource`], used for machine-readable output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceSummary {
    pub logical_path: String,
    pub location: String,
    pub kind: ResourceKind,
    pub archived: bool,
}
