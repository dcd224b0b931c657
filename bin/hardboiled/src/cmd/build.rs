//! Build command - generates the static site

use std::{path::Path, time::Instant};

use color_eyre::eyre::{Result, WrapErr};
use hardboiled_core::{current_year, env, ProjectConfig, SiteConfig, SiteSettings};
use hardboiled_generator::SiteBuilder;

use super::project_path;

/// Counts reported after a build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    /// Pages rendered.
    pub pages: usize,

    /// Static files copied.
    pub assets: usize,
}

/// Run the build command.
///
/// Builds the site rooted at `base` and prints a success message.
pub fn run(base: &Path, project_file: &Path) -> Result<()> {
    let start = Instant::now();
    let summary = build_site(base, project_file)?;

    println!("Site built successfully!");
    tracing::info!(
        pages = summary.pages,
        assets = summary.assets,
        duration_ms = start.elapsed().as_millis() as u64,
        "Build completed"
    );

    Ok(())
}

/// Load configuration and run the full pipeline.
pub fn build_site(base: &Path, project_file: &Path) -> Result<BuildSummary> {
    let env_file = base.join(env::DEFAULT_ENV_FILE);
    if env::load(Some(&env_file)) {
        tracing::info!(?env_file, "Loaded environment file");
    }

    let project_file = project_path(base, project_file);
    let project =
        ProjectConfig::load_with_env(&project_file).wrap_err("Failed to load project configuration")?;
    tracing::debug!(?project, "Loaded project configuration");

    let mut builder = SiteBuilder::from_settings(base, &project.build);
    builder
        .ensure_build_dirs(&project.build.subdirs)
        .wrap_err("Failed to create build directories")?;

    let stats = builder
        .copy_static_assets(&project.build.exclude)
        .wrap_err("Failed to copy static assets")?;

    builder.add_global("current_year", current_year());
    builder.register_static_url();

    let context = SiteSettings::from_env().to_context();
    let pages = builder
        .render_pages(&project.pages, &context)
        .wrap_err("Failed to render pages")?;

    Ok(BuildSummary {
        pages,
        assets: stats.files,
    })
}
