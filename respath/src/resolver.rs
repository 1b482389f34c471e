//! Resource resolution.
//!
//! [`ResourceResolver`] turns a path string into a single [`Resource`]:
//!
//! - `classpath:` paths are tried against every root in order; first hit wins
//! - `file:` paths are opened directly, relative to the working directory
//! - plain paths are joined to the directory of the file being processed
//!
//! # Example
//!
//! ```ignore
//! use respath::{LoaderContext, ResourceResolver};
//!
//! let resolver = ResourceResolver::new(LoaderContext::new(["build/resources", "src/resources"]));
//! let users = resolver.resolve("classpath:users/create.feature", None)?;
//! let payload = resolver.resolve("payload.json", Some(Path::new("src/resources/users")))?;
//! ```

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, trace};

use crate::archive::ArchiveMount;
use crate::error::{ResourceError, ResourceResult};
use crate::resource::Resource;
use crate::root::{LoaderContext, LookupOutcome, RootEntry, RootKind};
use crate::scanner::RecursiveScanner;
use crate::scheme::{self, PathScheme, ResourceKind, CLASSPATH_PREFIX};

/// A resolved resource together with the metadata the content interpreter
/// needs to decide what to do with it.
#[derive(Debug, Clone)]
pub struct LoadedResource {
    /// The resolved resource.
    pub resource: Resource,
    /// Kind decided by filename suffix.
    pub kind: ResourceKind,
    /// The `@tag` selector that followed the path, if any.
    pub call_tag: Option<String>,
}

/// Resolves path strings against a [`LoaderContext`].
///
/// Holds no mutable state besides the shared [`ArchiveMount`], so a single
/// resolver can serve many threads.
#[derive(Debug, Clone)]
pub struct ResourceResolver {
    loader: LoaderContext,
    mounts: Arc<ArchiveMount>,
}

impl ResourceResolver {
    /// Create a resolver with its own archive registry.
    pub fn new(loader: LoaderContext) -> Self {
        Self::with_mounts(loader, Arc::new(ArchiveMount::new()))
    }

    /// Create a resolver sharing an existing archive registry.
    pub fn with_mounts(loader: LoaderContext, mounts: Arc<ArchiveMount>) -> Self {
        Self { loader, mounts }
    }

    /// The roots this resolver searches.
    pub fn loader(&self) -> &LoaderContext {
        &self.loader
    }

    /// The shared archive registry.
    pub fn mounts(&self) -> &Arc<ArchiveMount> {
        &self.mounts
    }

    /// Create a scanner over the same roots and archive registry.
    pub fn scanner(&self, suffix: impl Into<String>) -> RecursiveScanner {
        RecursiveScanner::with_mounts(self.loader.clone(), Arc::clone(&self.mounts), suffix)
    }

    /// Resolve `path` to a resource.
    ///
    /// `context` is the directory of the file currently being processed. It
    /// is only consulted for plain paths; without one, plain paths are taken
    /// relative to the working directory.
    ///
    /// # Errors
    ///
    /// [`ResourceError::ResourceNotFound`] when no candidate exists. Archive
    /// roots that exist but cannot be opened surface as
    /// [`ResourceError::ArchiveOpen`].
    pub fn resolve(&self, path: &str, context: Option<&Path>) -> ResourceResult<Resource> {
        let (path_scheme, remainder) = scheme::classify(path);
        match path_scheme {
            PathScheme::ArchivePrefixed => self.resolve_classpath(path, remainder),
            PathScheme::FilePrefixed => resolve_file(path, remainder),
            PathScheme::Plain => resolve_relative(path, context),
        }
    }

    fn resolve_classpath(&self, path: &str, relative: &str) -> ResourceResult<Resource> {
        for root in self.loader.roots()? {
            match root.probe(relative, &self.mounts) {
                LookupOutcome::Present(entry) if entry.is_file() => {
                    debug!(path, root = %root, "Resolved classpath resource");
                    return Ok(match entry {
                        RootEntry::Path(file) => Resource::file(file, path),
                        RootEntry::Archive { archive, entry } => {
                            Resource::archive_entry(archive, entry, path)
                        }
                    });
                }
                LookupOutcome::Present(_) | LookupOutcome::NotPresent => {
                    trace!(path, root = %root, "Not in root");
                }
                LookupOutcome::Unreadable(e) => return Err(e),
            }
        }
        Err(ResourceError::not_found(path))
    }

    /// Split off an `@tag` suffix, resolve the path and classify its kind.
    ///
    /// This is the entry point for loading auxiliary files referenced from a
    /// definition file, e.g. `read('classpath:users/create.feature@smoke')`.
    pub fn load(&self, text: &str, context: Option<&Path>) -> ResourceResult<LoadedResource> {
        let (path, tag) = scheme::split_tags(text);
        let resource = self.resolve(path, context)?;
        Ok(LoadedResource {
            kind: ResourceKind::from_path(path),
            call_tag: tag.map(str::to_string),
            resource,
        })
    }

    /// Resolve and open a byte stream in one step.
    pub fn open(&self, path: &str, context: Option<&Path>) -> ResourceResult<Box<dyn Read + Send>> {
        self.resolve(path, context)?.open()
    }

    /// Resolve and read a resource as text.
    ///
    /// Any failure, whether resolving or reading, is reported as
    /// [`ResourceError::ResourceNotFound`] naming `path`.
    pub fn read_to_string(&self, path: &str, context: Option<&Path>) -> ResourceResult<String> {
        self.resolve(path, context)
            .and_then(|resource| resource.read_to_string())
            .map_err(|e| {
                debug!(path, error = %e, "Could not find or read file");
                ResourceError::not_found(path)
            })
    }

    /// Resolve `name` inside the directory named by `logical_dir`.
    ///
    /// `logical_dir` must carry a `classpath:` or `file:` prefix.
    pub fn resolve_in(&self, logical_dir: &str, name: &str) -> ResourceResult<Resource> {
        let joined = format!(
            "{}/{}",
            logical_dir.trim_end_matches('/'),
            name.trim_start_matches('/')
        );
        self.resolve(&joined, None)
    }

    /// Turn a host file path back into a `classpath:` logical path.
    ///
    /// The first plain-directory root containing `file` wins. Paths are
    /// compared lexically, so `file` and the roots should be spelled the
    /// same way (both absolute, or both relative to the same directory).
    pub fn to_logical_path(&self, file: &Path) -> ResourceResult<Option<String>> {
        for root in self.loader.roots()? {
            if root.kind != RootKind::PlainDirectory {
                continue;
            }
            if let Ok(relative) = file.strip_prefix(&root.base_path) {
                return Ok(Some(format!(
                    "{}{}",
                    CLASSPATH_PREFIX,
                    scheme::to_logical_name(relative)
                )));
            }
        }
        Ok(None)
    }
}

fn resolve_file(path: &str, remainder: &str) -> ResourceResult<Resource> {
    let file = PathBuf::from(remainder);
    if !file.is_file() {
        return Err(ResourceError::not_found(path));
    }
    Ok(Resource::file(file, path))
}

fn resolve_relative(path: &str, context: Option<&Path>) -> ResourceResult<Resource> {
    let file = match context {
        Some(dir) => dir.join(path),
        None => PathBuf::from(path),
    };
    if !file.is_file() {
        error!(
            path,
            resolved = %file.display(),
            "Relative path resolution failed"
        );
        return Err(ResourceError::not_found(file.to_string_lossy()));
    }
    let logical_path = file.to_string_lossy().into_owned();
    Ok(Resource::file(file, logical_path))
}
