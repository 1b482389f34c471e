//! Resolve command - map a logical path to a concrete location.

use std::io::{self, Write};
use std::path::PathBuf;

use respath::{ResolverConfig, Resource};

use super::common;
use crate::error::CliError;

/// Arguments for the resolve command.
pub struct ResolveArgs {
    pub path: String,
    pub relative_to: Option<PathBuf>,
    pub print: bool,
}

/// Run the resolve command.
pub fn run(args: ResolveArgs, config: &ResolverConfig) -> Result<(), CliError> {
    let resolver = common::resolver(config);
    let loaded = resolver.load(&args.path, args.relative_to.as_deref())?;

    if args.print {
        let bytes = loaded.resource.read_bytes()?;
        io::stdout().write_all(&bytes).map_err(CliError::Output)?;
        return Ok(());
    }

    println!("{}", describe(&loaded.resource));
    println!("  kind: {}", loaded.kind);
    if let Some(tag) = &loaded.call_tag {
        println!("  tag:  {}", tag);
    }
    Ok(())
}

fn describe(resource: &Resource) -> String {
    format!("{}\t{}", resource.logical_path(), resource.location())
}
