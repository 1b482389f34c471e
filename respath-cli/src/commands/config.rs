//! Configuration management CLI commands.
//!
//! Provides `config path`, `config show`, and `config init`.

use clap::Subcommand;
use respath::ResolverConfig;

use super::common::{self, GlobalArgs};
use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// Print the effective configuration, after command-line overrides
    Show,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run a config subcommand.
///
/// Runs before the config file is loaded, so `path` and `init` work even when
/// the file is missing.
pub fn run(command: ConfigCommands, globals: &GlobalArgs) -> Result<(), CliError> {
    match command {
        ConfigCommands::Path => run_path(globals),
        ConfigCommands::Show => run_show(&common::load_config(globals)?),
        ConfigCommands::Init { force } => run_init(globals, force),
    }
}

/// Show the configuration file path.
fn run_path(globals: &GlobalArgs) -> Result<(), CliError> {
    println!("{}", globals.config_path().display());
    Ok(())
}

/// Show the effective configuration.
fn run_show(config: &ResolverConfig) -> Result<(), CliError> {
    print!("{}", config.to_ini_string());
    Ok(())
}

/// Write a default configuration file.
fn run_init(globals: &GlobalArgs, force: bool) -> Result<(), CliError> {
    let path = globals.config_path();
    if path.exists() && !force {
        return Err(CliError::Config(format!(
            "{} already exists. Use --force to overwrite.",
            path.display()
        )));
    }

    ResolverConfig::default().save(&path)?;

    println!("Configuration file: {}", path.display());
    println!();
    println!("Edit this file to set resource roots and scan defaults.");
    println!("CLI arguments override config file values when specified.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn globals_for(path: std::path::PathBuf) -> GlobalArgs {
        GlobalArgs {
            config: Some(path),
            ..Default::default()
        }
    }

    #[test]
    fn test_init_writes_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("respath/config.ini");

        run_init(&globals_for(path.clone()), false).unwrap();
        assert_eq!(
            ResolverConfig::load(&path).unwrap(),
            ResolverConfig::default()
        );
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        std::fs::write(&path, "[resources]\nroots = keep\n").unwrap();

        assert!(matches!(
            run_init(&globals_for(path.clone()), false),
            Err(CliError::Config(_))
        ));
        assert_eq!(ResolverConfig::load(&path).unwrap().roots, vec!["keep"]);

        run_init(&globals_for(path.clone()), true).unwrap();
        assert!(ResolverConfig::load(&path).unwrap().roots.is_empty());
    }
}
