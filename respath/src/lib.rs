//! respath - resource path resolution across directories and archives
//!
//! Resolves logical resource paths (`classpath:a/b/x.feature`,
//! `file:/abs/x.json`, or plain relative paths) against an ordered list of
//! roots, and recursively scans roots for resources matching a suffix.
//!
//! Roots are plain directories or zip/jar archives. Earlier roots shadow
//! later ones, and every resource carries a logical path that resolves back
//! to the same location.
//!
//! ```no_run
//! use respath::{LoaderContext, ResourceResolver};
//!
//! let loader = LoaderContext::new(["build/resources", "src/resources"]);
//! let resolver = ResourceResolver::new(loader);
//! let resource = resolver.resolve("classpath:a/b/x.feature", None)?;
//! println!("{}", resource.read_to_string()?);
//! # Ok::<(), respath::ResourceError>(())
//! ```

pub mod archive;
pub mod config;
pub mod error;
pub mod logging;
pub mod resolver;
pub mod resource;
pub mod root;
pub mod scanner;
pub mod scheme;

pub use archive::{ArchiveHandle, ArchiveMount};
pub use config::{default_config_path, ResolverConfig};
pub use error::{ResourceError, ResourceResult};
pub use logging::{init_logging, LogConfig, LoggingError};
pub use resolver::{LoadedResource, ResourceResolver};
pub use resource::{Location, Resource, ResourceSummary};
pub use root::{enumerate_roots, parse_root, LoaderContext, LookupOutcome, Root, RootKind};
pub use scanner::{RecursiveScanner, ScanMode, SearchSpec, DEFAULT_SUFFIX};
pub use scheme::{PathScheme, ResourceKind, CLASSPATH_PREFIX, FILE_PREFIX};
