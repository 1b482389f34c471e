//! Common types and utilities shared across CLI commands.

use std::path::PathBuf;

use respath::{default_config_path, LoaderContext, ResolverConfig, ResourceResolver};
use tracing::debug;

use crate::error::CliError;

/// Environment variable consulted for roots when neither `--root` nor the
/// config file names any. Uses the platform path-list separator.
pub const ROOTS_ENV: &str = "RESPATH_ROOTS";

/// Flags accepted by every command.
#[derive(Debug, Clone, Default)]
pub struct GlobalArgs {
    pub roots: Vec<String>,
    pub config: Option<PathBuf>,
    pub verbose: bool,
    pub log_file: Option<PathBuf>,
}

impl GlobalArgs {
    /// The config file in effect: `--config` or the default location.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(default_config_path)
    }
}

/// Load the configuration file and apply command-line overrides.
///
/// An explicitly named config file must exist; the default one is optional.
pub fn load_config(args: &GlobalArgs) -> Result<ResolverConfig, CliError> {
    let path = args.config_path();
    if args.config.is_some() && !path.exists() {
        return Err(CliError::Config(format!(
            "config file not found: {}",
            path.display()
        )));
    }
    let config = ResolverConfig::load(&path)?;
    Ok(apply_overrides(config, args))
}

/// Apply CLI flags on top of a loaded configuration.
///
/// `--root` flags replace the configured roots rather than extending them.
pub fn apply_overrides(mut config: ResolverConfig, args: &GlobalArgs) -> ResolverConfig {
    if !args.roots.is_empty() {
        config.roots = args.roots.clone();
    }
    if args.verbose {
        config.logging = config.logging.verbose();
    }
    if let Some(file) = &args.log_file {
        config.logging.file = Some(file.clone());
    }
    config
}

/// Build the loader context, falling back to [`ROOTS_ENV`] when no roots are
/// configured.
pub fn loader_context(config: &ResolverConfig) -> LoaderContext {
    let context = LoaderContext::from_config(config);
    if !context.is_empty() {
        return context;
    }
    let from_env = LoaderContext::from_env(ROOTS_ENV);
    if !from_env.is_empty() {
        debug!(var = ROOTS_ENV, roots = from_env.uris().len(), "Using roots from environment");
    }
    from_env
}

/// Build a resolver for the configured roots.
pub fn resolver(config: &ResolverConfig) -> ResourceResolver {
    ResourceResolver::new(loader_context(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_root_flags_replace_configured_roots() {
        let config = ResolverConfig::new(["from/config"]);
        let args = GlobalArgs {
            roots: vec!["a".to_string(), "b".to_string()],
            ..Default::default()
        };

        let config = apply_overrides(config, &args);
        assert_eq!(config.roots, vec!["a", "b"]);
    }

    #[test]
    fn test_no_flags_keep_config() {
        let config = ResolverConfig::new(["from/config"]);
        let config = apply_overrides(config, &GlobalArgs::default());
        assert_eq!(config.roots, vec!["from/config"]);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_logging_flags() {
        let args = GlobalArgs {
            verbose: true,
            log_file: Some(PathBuf::from("/tmp/respath.log")),
            ..Default::default()
        };
        let config = apply_overrides(ResolverConfig::default(), &args);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, Some(PathBuf::from("/tmp/respath.log")));
    }

    #[test]
    fn test_explicit_missing_config_is_an_error() {
        let temp = TempDir::new().unwrap();
        let args = GlobalArgs {
            config: Some(temp.path().join("missing.ini")),
            ..Default::default()
        };
        assert!(matches!(load_config(&args), Err(CliError::Config(_))));
    }

    #[test]
    fn test_explicit_config_is_loaded() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("respath.ini");
        std::fs::write(&path, "[resources]\nroots = x, y\n[scan]\nsuffix = .json\n").unwrap();
        let args = GlobalArgs {
            config: Some(path),
            ..Default::default()
        };

        let config = load_config(&args).unwrap();
        assert_eq!(config.roots, vec!["x", "y"]);
        assert_eq!(config.suffix, ".json");
    }
}
