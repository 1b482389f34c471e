//! Scan command - list resources matching a suffix.

use respath::{ResolverConfig, Resource, ResourceSummary};

use super::common;
use crate::error::CliError;

/// Arguments for the scan command.
pub struct ScanArgs {
    /// Search paths; the configured scan paths are used when empty.
    pub paths: Vec<String>,
    pub suffix: Option<String>,
    pub json: bool,
}

/// Run the scan command.
pub fn run(args: ScanArgs, config: &ResolverConfig) -> Result<(), CliError> {
    let suffix = args.suffix.unwrap_or_else(|| config.suffix.clone());
    if suffix.is_empty() {
        return Err(CliError::Config("--suffix must not be empty".to_string()));
    }

    let paths = if args.paths.is_empty() {
        config.scan_paths.clone()
    } else {
        args.paths
    };

    let scanner = common::resolver(config).scanner(suffix);
    let found = scanner.scan_paths(&paths)?;

    if args.json {
        println!("{}", render_json(&found)?);
    } else {
        for resource in &found {
            println!("{}\t{}", resource.logical_path(), resource.location());
        }
    }
    Ok(())
}

fn render_json(found: &[Resource]) -> Result<String, CliError> {
    let summaries: Vec<ResourceSummary> = found.iter().map(Resource::summary).collect();
    Ok(serde_json::to_string_pretty(&summaries)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_json_lists_summaries() {
        let found = vec![
            Resource::file("/r/a.feature", "classpath:a.feature"),
            Resource::file("/r/b.feature", "classpath:b.feature"),
        ];

        let json: serde_json::Value = serde_json::from_str(&render_json(&found).unwrap()).unwrap();
        let items = json.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["logical_path"], "classpath:a.feature");
        assert_eq!(items[1]["kind"], "feature");
    }

    #[test]
    fn test_render_json_empty() {
        assert_eq!(render_json(&[]).unwrap(), "[]");
    }
}
