//! Build orchestration.
//!
//! [`SiteBuilder`] resolves the template, static and output directories
//! against a base path and drives directory setup, asset copying and page
//! rendering. Everything runs synchronously on the calling thread; the first
//! failure is returned and leaves any partial output in place.

use std::{
    fs,
    path::{Path, PathBuf},
};

use hardboiled_core::{BuildContext, BuildSettings, CoreError, PageEntry};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    assets::{AssetCopier, AssetError, CopyStats, StaticUrl},
    template::{TemplateEngine, TemplateError},
};

/// Default template source directory.
pub const DEFAULT_TEMPLATE_DIR: &str = "src/templates";

/// Default static asset source directory.
pub const DEFAULT_STATIC_DIR: &str = "src/static";

/// Default output directory.
pub const DEFAULT_BUILD_DIR: &str = "build";

/// Subdirectory of the output directory static assets are copied to.
pub const STATIC_OUTPUT_DIR: &str = "static";

/// Build errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Template error.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Asset error.
    #[error("asset error: {0}")]
    Asset(#[from] AssetError),

    /// Core error.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl BuildError {
    /// Whether this is a "template not found" failure.
    #[must_use]
    pub fn is_template_not_found(&self) -> bool {
        matches!(self, Self::Template(TemplateError::NotFound(_)))
    }
}

/// Result type for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;

/// One unit of rendering work: a template and where its output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Template name inside the template directory.
    pub template: String,

    /// Output path inside the build directory.
    pub output: String,
}

impl Page {
    /// A page whose output path equals its template name.
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        Self {
            output: template.clone(),
            template,
        }
    }

    /// A page rendered to a different output path.
    #[must_use]
    pub fn with_output(template: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            output: output.into(),
        }
    }
}

impl From<&str> for Page {
    fn from(template: &str) -> Self {
        Self::new(template)
    }
}

impl From<String> for Page {
    fn from(template: String) -> Self {
        Self::new(template)
    }
}

impl From<(&str, &str)> for Page {
    fn from((template, output): (&str, &str)) -> Self {
        Self::with_output(template, output)
    }
}

impl From<(String, String)> for Page {
    fn from((template, output): (String, String)) -> Self {
        Self::with_output(template, output)
    }
}

impl From<&PageEntry> for Page {
    fn from(entry: &PageEntry) -> Self {
        Self::with_output(entry.template.clone(), entry.output())
    }
}

/// Static site builder.
#[derive(Debug)]
pub struct SiteBuilder {
    base_path: PathBuf,
    static_dir: PathBuf,
    build_dir: PathBuf,
    engine: TemplateEngine,
}

impl SiteBuilder {
    /// Create a builder with the default layout under `base_path`.
    #[must_use]
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        let base_path = base_path.into();
        Self {
            static_dir: base_path.join(DEFAULT_STATIC_DIR),
            build_dir: base_path.join(DEFAULT_BUILD_DIR),
            engine: TemplateEngine::new(base_path.join(DEFAULT_TEMPLATE_DIR)),
            base_path,
        }
    }

    /// Create a builder rooted at the current working directory.
    pub fn from_current_dir() -> Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    /// Create a builder using a project layout.
    #[must_use]
    pub fn from_settings(base_path: impl Into<PathBuf>, settings: &BuildSettings) -> Self {
        Self::new(base_path)
            .with_template_dir(&settings.template_dir)
            .with_static_dir(&settings.static_dir)
            .with_build_dir(&settings.build_dir)
    }

    /// Set the template directory, relative to the base path.
    #[must_use]
    pub fn with_template_dir(mut self, dir: impl AsRef<Path>) -> Self {
        let dir = self.base_path.join(dir);
        self.engine.set_template_dir(dir);
        self
    }

    /// Set the static asset directory, relative to the base path.
    #[must_use]
    pub fn with_static_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.static_dir = self.base_path.join(dir);
        self
    }

    /// Set the output directory, relative to the base path.
    #[must_use]
    pub fn with_build_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.build_dir = self.base_path.join(dir);
        self
    }

    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    #[must_use]
    pub fn template_dir(&self) -> &Path {
        self.engine.template_dir()
    }

    #[must_use]
    pub fn static_dir(&self) -> &Path {
        &self.static_dir
    }

    #[must_use]
    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    /// Variables registered with [`add_global`](Self::add_global).
    #[must_use]
    pub fn globals(&self) -> &BuildContext {
        self.engine.globals()
    }

    /// Create the output directory and `subdirs` inside it.
    pub fn ensure_build_dirs<S: AsRef<Path>>(&self, subdirs: &[S]) -> Result<()> {
        fs::create_dir_all(&self.build_dir)?;

        for subdir in subdirs {
            let dir = self.build_dir.join(subdir);
            fs::create_dir_all(&dir)?;
            debug!(dir = %dir.display(), "ensured build directory");
        }

        Ok(())
    }

    /// Copy static assets into `<build_dir>/static`.
    ///
    /// Top-level entries matching any of `exclude_patterns` are skipped.
    pub fn copy_static_assets<S: AsRef<str>>(&self, exclude_patterns: &[S]) -> Result<CopyStats> {
        let copier = AssetCopier::new(exclude_patterns)?;
        let stats = copier.copy(&self.static_dir, &self.build_dir.join(STATIC_OUTPUT_DIR))?;
        Ok(stats)
    }

    /// Render a template and write it to `<build_dir>/<output>`.
    ///
    /// `output` defaults to the template name. Returns the rendered text.
    pub fn render_template(
        &mut self,
        template: &str,
        context: &BuildContext,
        output: Option<&str>,
    ) -> Result<String> {
        let output = output.unwrap_or(template);
        let html = self.engine.render(template, context)?;

        let output_path = self.build_dir.join(output);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&output_path, &html)?;

        debug!(template, path = %output_path.display(), "wrote page");
        Ok(html)
    }

    /// Render pages in order with a shared context.
    ///
    /// Stops at the first failure. Returns the number of pages written.
    pub fn render_pages<I, P>(&mut self, pages: I, context: &BuildContext) -> Result<usize>
    where
        I: IntoIterator<Item = P>,
        P: Into<Page>,
    {
        let mut count = 0;
        for page in pages {
            let page = page.into();
            self.render_template(&page.template, context, Some(&page.output))?;
            count += 1;
        }

        info!(count, "rendered pages");
        Ok(count)
    }

    /// Register a variable visible to every later render.
    pub fn add_global(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.engine.add_global(name, value);
    }

    /// Register a callable global, used as `{{ name(arg=value) }}`.
    pub fn add_function<F: tera::Function + 'static>(&mut self, name: &str, function: F) {
        self.engine.add_function(name, function);
    }

    /// Register a filter, used as `{{ value | name }}`.
    pub fn add_filter<F: tera::Filter + 'static>(&mut self, name: &str, filter: F) {
        self.engine.add_filter(name, filter);
    }

    /// Register `static_url(path=...)`, returning cache-busted asset URLs.
    pub fn register_static_url(&mut self) {
        let helper = StaticUrl::new(self.static_dir.clone(), format!("/{STATIC_OUTPUT_DIR}"));
        self.engine.add_function("static_url", helper);
    }

    /// Remove the output directory and everything in it.
    pub fn clean(&self) -> Result<()> {
        if self.build_dir.exists() {
            debug!(dir = %self.build_dir.display(), "cleaning output directory");
            fs::remove_dir_all(&self.build_dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_default_paths() {
        let dir = TempDir::new().unwrap();
        let builder = SiteBuilder::new(dir.path());

        assert_eq!(builder.template_dir(), dir.path().join("src/templates"));
        assert_eq!(builder.static_dir(), dir.path().join("src/static"));
        assert_eq!(builder.build_dir(), dir.path().join("build"));
        assert_eq!(builder.base_path(), dir.path());
    }

    #[test]
    fn test_custom_paths() {
        let dir = TempDir::new().unwrap();
        let builder = SiteBuilder::new(dir.path())
            .with_template_dir("templates")
            .with_static_dir("assets")
            .with_build_dir("dist");

        assert_eq!(builder.template_dir(), dir.path().join("templates"));
        assert_eq!(builder.static_dir(), dir.path().join("assets"));
        assert_eq!(builder.build_dir(), dir.path().join("dist"));
    }

    #[test]
    fn test_from_current_dir() {
        let builder = SiteBuilder::from_current_dir().unwrap();
        let cwd = std::env::current_dir().unwrap();

        assert_eq!(builder.base_path(), cwd);
        assert_eq!(builder.build_dir(), cwd.join("build"));
    }

    #[test]
    fn test_from_settings() {
        let dir = TempDir::new().unwrap();
        let settings = BuildSettings {
            template_dir: "t".to_string(),
            static_dir: "s".to_string(),
            build_dir: "out".to_string(),
            ..BuildSettings::default()
        };
        let builder = SiteBuilder::from_settings(dir.path(), &settings);

        assert_eq!(builder.template_dir(), dir.path().join("t"));
        assert_eq!(builder.static_dir(), dir.path().join("s"));
        assert_eq!(builder.build_dir(), dir.path().join("out"));
    }

    #[test]
    fn test_page_conversions() {
        assert_eq!(Page::from("index.html"), Page::new("index.html"));
        assert_eq!(Page::from("index.html").output, "index.html");
        assert_eq!(
            Page::from(("index.html", "home.html")),
            Page::with_output("index.html", "home.html")
        );

        let entry = PageEntry {
            template: "about.html".to_string(),
            output: None,
        };
        assert_eq!(Page::from(&entry).output, "about.html");
    }

    #[test]
    fn test_add_global_is_recorded() {
        let dir = TempDir::new().unwrap();
        let mut builder = SiteBuilder::new(dir.path());
        builder.add_global("site_name", "Test Site");

        assert_eq!(
            builder.globals().get("site_name"),
            Some(&Value::String("Test Site".to_string()))
        );
    }

    #[test]
    fn test_ensure_build_dirs_collision_fails() {
        let dir = TempDir::new().unwrap();
        let builder = SiteBuilder::new(dir.path());
        fs::create_dir_all(builder.build_dir()).unwrap();
        fs::write(builder.build_dir().join("css"), "not a directory").unwrap();

        let err = builder.ensure_build_dirs(&["css/sub"]).unwrap_err();
        assert!(matches!(err, BuildError::Io(_)));
    }

    #[test]
    fn test_clean_nonexistent() {
        let dir = TempDir::new().unwrap();
        let builder = SiteBuilder::new(dir.path());
        builder.clean().unwrap();
        assert!(!builder.build_dir().exists());
    }
}
