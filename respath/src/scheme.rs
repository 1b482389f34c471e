//! Path scheme classification.
//!
//! Resource references come in three shapes:
//!
//! - `classpath:a/b/c.json` - resolved against every root, archives included
//! - `file:some/dir/c.json` - resolved as a direct filesystem path
//! - `c.json` - resolved relative to the file currently being processed
//!
//! Everything here is pure string inspection. No I/O, no errors.

use std::fmt;
use std::path::Path;

use serde::Serialize;

/// Scheme marker for paths resolved against all roots.
pub const CLASSPATH_PREFIX: &str = "classpath:";

/// Scheme marker for paths resolved directly on the filesystem.
pub const FILE_PREFIX: &str = "file:";

/// Name reported for resources that have no backing path.
pub const IN_MEMORY: &str = "(in memory)";

/// Scheme of a resource reference, derived from its prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathScheme {
    /// `classpath:` prefix.
    ArchivePrefixed,
    /// `file:` prefix.
    FilePrefixed,
    /// No recognized prefix.
    Plain,
}

impl PathScheme {
    /// The prefix string for this scheme (empty for plain paths).
    pub fn prefix(&self) -> &'static str {
        match self {
            PathScheme::ArchivePrefixed => CLASSPATH_PREFIX,
            PathScheme::FilePrefixed => FILE_PREFIX,
            PathScheme::Plain => "",
        }
    }
}

impl fmt::Display for PathScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathScheme::ArchivePrefixed => write!(f, "classpath"),
            PathScheme::FilePrefixed => write!(f, "file"),
            PathScheme::Plain => write!(f, "plain"),
        }
    }
}

/// Classify a path string, returning its scheme and the remainder with the
/// prefix stripped.
///
/// # Example
///
/// ```
/// use respath::scheme::{classify, PathScheme};
///
/// assert_eq!(classify("classpath:a/b.json"), (PathScheme::ArchivePrefixed, "a/b.json"));
/// assert_eq!(classify("file:/tmp/b.json"), (PathScheme::FilePrefixed, "/tmp/b.json"));
/// assert_eq!(classify("b.json"), (PathScheme::Plain, "b.json"));
/// ```
pub fn classify(path: &str) -> (PathScheme, &str) {
    if let Some(rest) = path.strip_prefix(CLASSPATH_PREFIX) {
        (PathScheme::ArchivePrefixed, rest)
    } else if let Some(rest) = path.strip_prefix(FILE_PREFIX) {
        (PathScheme::FilePrefixed, rest)
    } else {
        (PathScheme::Plain, path)
    }
}

/// Check whether the path carries the `classpath:` prefix.
pub fn is_classpath(path: &str) -> bool {
    path.starts_with(CLASSPATH_PREFIX)
}

/// Check whether the path carries the `file:` prefix.
pub fn is_file_path(path: &str) -> bool {
    path.starts_with(FILE_PREFIX)
}

/// Strip everything up to and including the first `:`.
///
/// Unlike [`classify`] this does not care which scheme is present.
pub fn remove_prefix(path: &str) -> &str {
    match path.find(':') {
        Some(pos) => &path[pos + 1..],
        None => path,
    }
}

/// Split a raw reference into its path and an optional `@`-tag suffix.
///
/// The split happens at the first `@`. Both halves are trimmed and the tag
/// keeps its leading `@`, since callers hand it straight to a tag selector.
///
/// # Example
///
/// ```
/// use respath::scheme::split_tags;
///
/// assert_eq!(split_tags("b/c/d.json@smoke"), ("b/c/d.json", Some("@smoke")));
/// assert_eq!(split_tags("  b/c/d.json  "), ("b/c/d.json", None));
/// ```
pub fn split_tags(raw: &str) -> (&str, Option<&str>) {
    match raw.find('@') {
        Some(pos) => (raw[..pos].trim(), Some(raw[pos..].trim())),
        None => (raw.trim(), None),
    }
}

/// Content kind of a resource, decided by filename suffix alone.
///
/// The content interpreter uses this to pick a parser; this crate never looks
/// inside the bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Json,
    Xml,
    JavaScript,
    Yaml,
    Text,
    GraphQl,
    Feature,
    /// Anything unrecognized is streamed as raw bytes.
    Binary,
}

impl ResourceKind {
    /// Decide the kind of a path or logical name. Suffix matching is
    /// case-sensitive.
    pub fn from_path(path: &str) -> Self {
        if path.ends_with(".json") {
            ResourceKind::Json
        } else if path.ends_with(".xml") {
            ResourceKind::Xml
        } else if path.ends_with(".js") {
            ResourceKind::JavaScript
        } else if path.ends_with(".yaml") || path.ends_with(".yml") {
            ResourceKind::Yaml
        } else if path.ends_with(".txt") {
            ResourceKind::Text
        } else if path.ends_with(".graphql") || path.ends_with(".gql") {
            ResourceKind::GraphQl
        } else if path.ends_with(".feature") {
            ResourceKind::Feature
        } else {
            ResourceKind::Binary
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Json => "json",
            ResourceKind::Xml => "xml",
            ResourceKind::JavaScript => "javascript",
            ResourceKind::Yaml => "yaml",
            ResourceKind::Text => "text",
            ResourceKind::GraphQl => "graphql",
            ResourceKind::Feature => "feature",
            ResourceKind::Binary => "binary",
        };
        write!(f, "{}", name)
    }
}

/// Turn a logical path into a dotted package-style name.
///
/// `classpath:com/acme/users.feature` becomes `com.acme.users`. Paths are
/// assumed to use forward slashes.
pub fn to_package_qualified_name(path: Option<&str>) -> String {
    let Some(path) = path else {
        return IN_MEMORY.to_string();
    };
    let dotted = remove_prefix(path).replace('/', ".");
    match dotted.strip_suffix(".feature") {
        Some(stripped) => stripped.to_string(),
        None => dotted,
    }
}

/// Replace the extension after the last `.`, or append one if there is none.
pub fn replace_file_extension(path: &str, extension: &str) -> String {
    match path.rfind('.') {
        Some(pos) => format!("{}{}", &path[..=pos], extension),
        None => format!("{}.{}", path, extension),
    }
}

/// Render a relative path as a logical name with forward slashes.
pub(crate) fn to_logical_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
