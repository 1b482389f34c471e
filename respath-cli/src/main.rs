//! respath CLI - inspect resource roots, resolve paths and scan for resources.

mod commands;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use respath::{init_logging, ResolverConfig};
use tracing::debug;

use commands::common::{self, GlobalArgs};
use commands::config::ConfigCommands;
use commands::resolve::ResolveArgs;
use commands::scan::ScanArgs;
use error::CliError;

#[derive(Parser)]
#[command(name = "respath")]
#[command(about = "Resolve logical resource paths across directories and archives", long_about = None)]
#[command(version)]
struct Cli {
    /// Resource root (directory, archive, file: or jar: URI); repeatable,
    /// highest priority first. Replaces the configured roots.
    #[arg(long = "root", global = true, value_name = "URI")]
    roots: Vec<String>,

    /// Configuration file (default: ~/.config/respath/config.ini)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also write logs to this file
    #[arg(long, global = true, value_name = "FILE")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a path (classpath:, file: or relative) to its location
    Resolve {
        /// Path to resolve, optionally followed by @tag
        path: String,

        /// Directory that relative paths are resolved against
        #[arg(long, value_name = "DIR")]
        relative_to: Option<PathBuf>,

        /// Print the resource contents instead of its location
        #[arg(long)]
        print: bool,
    },

    /// Recursively list resources whose file name ends with a suffix
    Scan {
        /// Search paths (classpath:dir searches all roots, anything else is a
        /// filesystem path). Defaults to the configured scan paths.
        paths: Vec<String>,

        /// File name suffix to match (default: .feature)
        #[arg(long)]
        suffix: Option<String>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the search roots in priority order
    Roots,

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let globals = GlobalArgs {
        roots: cli.roots,
        config: cli.config,
        verbose: cli.verbose,
        log_file: cli.log_file,
    };

    match cli.command {
        Commands::Config { command } => {
            // The config file may not exist yet, so only flags drive logging here
            let logging = common::apply_overrides(ResolverConfig::default(), &globals).logging;
            let _guard = init_logging(&logging)?;
            commands::config::run(command, &globals)
        }
        Commands::Resolve {
            path,
            relative_to,
            print,
        } => with_config(&globals, |config| {
            commands::resolve::run(
                ResolveArgs {
                    path,
                    relative_to,
                    print,
                },
                config,
            )
        }),
        Commands::Scan {
            paths,
            suffix,
            json,
        } => with_config(&globals, |config| {
            commands::scan::run(
                ScanArgs {
                    paths,
                    suffix,
                    json,
                },
                config,
            )
        }),
        Commands::Roots => with_config(&globals, commands::roots::run),
    }
}

/// Load the configuration, install logging, then run `command`.
fn with_config<F>(globals: &GlobalArgs, command: F) -> Result<(), CliError>
where
    F: FnOnce(&ResolverConfig) -> Result<(), CliError>,
{
    let config = common::load_config(globals)?;
    let _guard = init_logging(&config.logging)?;
    debug!(
        config = %globals.config_path().display(),
        roots = config.roots.len(),
        "Loaded configuration"
    );
    command(&config)
}
