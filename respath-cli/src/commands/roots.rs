//! Roots command - show the search roots in priority order.

use respath::{ResolverConfig, Root};

use super::common;
use crate::error::CliError;

/// Run the roots command.
pub fn run(config: &ResolverConfig) -> Result<(), CliError> {
    let context = common::loader_context(config);
    if context.is_empty() {
        println!("No resource roots configured.");
        println!(
            "Use --root, set [resources] roots in {}, or set {}.",
            respath::default_config_path().display(),
            common::ROOTS_ENV
        );
        return Ok(());
    }

    for (index, root) in context.roots()?.iter().enumerate() {
        println!("{}", describe(index, root));
    }
    Ok(())
}

fn describe(index: usize, root: &Root) -> String {
    let status = if root.base_path.exists() {
        ""
    } else {
        "  (missing)"
    };
    format!(
        "[{}] {:<9} {}{}",
        index + 1,
        root.kind.to_string(),
        root.base_path.display(),
        status
    )
}
