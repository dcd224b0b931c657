//! Clean command - removes the output directory

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use hardboiled_core::ProjectConfig;
use hardboiled_generator::SiteBuilder;

use super::project_path;

/// Run the clean command.
pub fn run(base: &Path, project_file: &Path) -> Result<()> {
    let project = ProjectConfig::load_with_env(&project_path(base, project_file))
        .wrap_err("Failed to load project configuration")?;
    let builder = SiteBuilder::from_settings(base, &project.build);

    tracing::info!(build_dir = ?builder.build_dir(), "Cleaning output directory");
    builder.clean().wrap_err("Failed to remove output directory")?;

    println!("Removed {}", builder.build_dir().display());
    Ok(())
}
