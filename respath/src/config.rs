//! Resolver configuration.
//!
//! Settings can be built in code with the `with_*` methods or loaded from an
//! INI file:
//!
//! ```ini
//! [resources]
//! roots = build/resources, src/resources, lib/fixtures.jar
//!
//! [scan]
//! suffix = .feature
//! paths = classpath:features
//!
//! [logging]
//! level = info
//! file = /tmp/respath.log
//! ```
//!
//! List values are comma-separated and there is no quoting, so a root whose
//! path contains a comma cannot be listed here; pass it with `--root` or
//! [`LoaderContext::new`](crate::LoaderContext::new) instead. Missing keys keep
//! their defaults.

use std::path::{Path, PathBuf};

use ini::Ini;

use crate::error::{ResourceError, ResourceResult};
use crate::logging::LogConfig;
use crate::scanner::DEFAULT_SUFFIX;

const SECTION_RESOURCES: &str = "resources";
const SECTION_SCAN: &str = "scan";
const SECTION_LOGGING: &str = "logging";

/// Default location of the configuration file
/// (`~/.config/respath/config.ini` on Linux).
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("respath")
        .join("config.ini")
}

/// Configuration for resolvers and scanners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Root URIs or paths, highest priority first.
    pub roots: Vec<String>,

    /// Filename suffix matched by scans.
    pub suffix: String,

    /// Search paths scanned when none are given explicitly.
    pub scan_paths: Vec<String>,

    /// Logging settings.
    pub logging: LogConfig,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            suffix: DEFAULT_SUFFIX.to_string(),
            scan_paths: vec!["classpath:".to_string()],
            logging: LogConfig::default(),
        }
    }
}

impl ResolverConfig {
    /// Create a configuration searching the given roots.
    pub fn new<I, S>(roots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Add a root with the lowest priority.
    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.roots.push(root.into());
        self
    }

    /// Set the suffix matched by scans.
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Replace the default scan paths.
    pub fn with_scan_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scan_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Set the logging configuration.
    pub fn with_logging(mut self, logging: LogConfig) -> Self {
        self.logging = logging;
        self
    }

    /// Load configuration from `path`.
    ///
    /// A missing file yields the defaults; an unreadable or malformed file is
    /// an error.
    pub fn load(path: &Path) -> ResourceResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let ini = Ini::load_from_file(path).map_err(|e| {
            ResourceError::Config(format!("failed to load {}: {}", path.display(), e))
        })?;
        Ok(Self::from_ini(&ini))
    }

    /// Parse configuration from INI text.
    pub fn from_ini_str(text: &str) -> ResourceResult<Self> {
        let ini = Ini::load_from_str(text)
            .map_err(|e| ResourceError::Config(format!("invalid configuration: {}", e)))?;
        Ok(Self::from_ini(&ini))
    }

    fn from_ini(ini: &Ini) -> Self {
        let mut config = Self::default();

        if let Some(section) = ini.section(Some(SECTION_RESOURCES)) {
            if let Some(roots) = section.get("roots") {
                config.roots = split_list(roots);
            }
        }

        if let Some(section) = ini.section(Some(SECTION_SCAN)) {
            if let Some(suffix) = section.get("suffix").map(str::trim) {
                if !suffix.is_empty() {
                    config.suffix = suffix.to_string();
                }
            }
            if let Some(paths) = section.get("paths") {
                config.scan_paths = split_list(paths);
            }
        }

        if let Some(section) = ini.section(Some(SECTION_LOGGING)) {
            if let Some(level) = section.get("level").map(str::trim) {
                if !level.is_empty() {
                    config.logging.level = level.to_string();
                }
            }
            if let Some(file) = section.get("file").map(str::trim) {
                config.logging.file = (!file.is_empty()).then(|| PathBuf::from(file));
            }
        }

        config
    }

    /// Render the configuration as INI text.
    pub fn to_ini_string(&self) -> String {
        let mut ini = Ini::new();
        ini.with_section(Some(SECTION_RESOURCES))
            .set("roots", self.roots.join(", "));
        ini.with_section(Some(SECTION_SCAN))
            .set("suffix", self.suffix.as_str())
            .set("paths", self.scan_paths.join(", "));
        let mut logging = ini.with_section(Some(SECTION_LOGGING));
        logging.set("level", self.logging.level.as_str());
        if let Some(file) = &self.logging.file {
            logging.set("file", file.to_string_lossy());
        }

        let mut out = Vec::new();
        // Writing into a Vec cannot fail
        let _ = ini.write_to(&mut out);
        String::from_utf8_lossy(&out).into_owned()
    }

    /// Write the configuration to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> ResourceResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ResourceError::Config(format!("failed to create {}: {}", parent.display(), e))
            })?;
        }
        std::fs::write(path, self.to_ini_string()).map_err(|e| {
            ResourceError::Config(format!("failed to write {}: {}", path.display(), e))
        })
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ResolverConfig::default();
        assert!(config.roots.is_empty());
        assert_eq!(config.suffix, ".feature");
        assert_eq!(config.scan_paths, vec!["classpath:"]);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_builder_pattern() {
        let config = ResolverConfig::new(["build/resources"])
            .with_root("src/resources")
            .with_suffix(".json")
            .with_scan_paths(["classpath:users", "local/dir"]);

        assert_eq!(config.roots, vec!["build/resources", "src/resources"]);
        assert_eq!(config.suffix, ".json");
        assert_eq!(config.scan_paths.len(), 2);
    }

    #[test]
    fn test_parse_ini() {
        let config = ResolverConfig::from_ini_str(
            "[resources]\n\
             roots = build/resources , src/resources,,lib/a.jar\n\
             [scan]\n\
             suffix = .feature\n\
             paths = classpath:features\n\
             [logging]\n\
             level = debug\n\
             file = /tmp/respath.log\n",
        )
        .unwrap();

        assert_eq!(
            config.roots,
            vec!["build/resources", "src/resources", "lib/a.jar"]
        );
        assert_eq!(config.scan_paths, vec!["classpath:features"]);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, Some(PathBuf::from("/tmp/respath.log")));
    }

    #[test]
    fn test_list_values_split_on_every_comma() {
        let config =
            ResolverConfig::from_ini_str("[resources]\nroots = /data/a,b, /data/c\n").unwrap();
        assert_eq!(config.roots, vec!["/data/a", "b", "/data/c"]);
    }

    #[test]
    fn test_partial_ini_keeps_defaults() {
        let config = ResolverConfig::from_ini_str("[resources]\nroots = a\n").unwrap();
        assert_eq!(config.roots, vec!["a"]);
        assert_eq!(config.suffix, DEFAULT_SUFFIX);
        assert_eq!(config.scan_paths, vec!["classpath:"]);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let config = ResolverConfig::load(&temp.path().join("absent.ini")).unwrap();
        assert_eq!(config, ResolverConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/config.ini");
        let config = ResolverConfig::new(["one", "two"]).with_suffix(".yml");

        config.save(&path).unwrap();
        let loaded = ResolverConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_default_config_path_ends_with_file_name() {
        let path = default_config_path();
        assert!(path.ends_with("respath/config.ini"));
    }
}
