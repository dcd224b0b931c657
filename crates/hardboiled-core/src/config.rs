//! Site and project configuration.
//!
//! Two kinds of configuration live here:
//!
//! - [`SiteConfig`]: site values (name, URL, ...) exposed to templates. Any
//!   serializable struct can opt in; its uppercase fields become the build
//!   context.
//! - [`ProjectConfig`]: the project layout read from `hardboiled.toml`, used
//!   by the CLI driver to know where templates and assets live and which
//!   pages to render.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    context::BuildContext,
    env,
    error::{CoreError, Result},
};

/// Default project configuration file name.
pub const PROJECT_FILE: &str = "hardboiled.toml";

/// Configuration exposed to templates.
///
/// Implementors declare their fields through `Serialize`. Only keys that are
/// entirely uppercase and do not start with an underscore are exported, with
/// their exact names and value types.
pub trait SiteConfig: Serialize {
    /// Convert the uppercase fields into a template context.
    fn to_context(&self) -> BuildContext {
        match serde_json::to_value(self) {
            Ok(Value::Object(fields)) => fields
                .into_iter()
                .filter(|(key, _)| is_exported_key(key))
                .collect(),
            Ok(other) => {
                warn!(kind = value_kind(&other), "site config is not a map, exporting nothing");
                BuildContext::new()
            }
            Err(e) => {
                warn!(error = %e, "failed to serialize site config, exporting nothing");
                BuildContext::new()
            }
        }
    }
}

/// Uppercase and not private: at least one cased character, none lowercase.
fn is_exported_key(key: &str) -> bool {
    !key.starts_with('_')
        && key.chars().any(char::is_uppercase)
        && !key.chars().any(char::is_lowercase)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Standard site settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct SiteSettings {
    /// Site name.
    pub site_name: String,

    /// Public base URL.
    pub site_url: String,

    /// Site description for meta tags.
    pub site_description: String,
}

impl SiteSettings {
    /// Read `SITE_NAME`, `SITE_URL` and `SITE_DESCRIPTION`, with defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            site_name: env::get_or("SITE_NAME", defaults.site_name),
            site_url: env::get_or("SITE_URL", defaults.site_url),
            site_description: env::get_or("SITE_DESCRIPTION", defaults.site_description),
        }
    }
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            site_name: "My Site".to_string(),
            site_url: "https://example.com".to_string(),
            site_description: "A static site built with hardboiled".to_string(),
        }
    }
}

impl SiteConfig for SiteSettings {}

/// Project layout configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Directory layout and copy settings.
    #[serde(default)]
    pub build: BuildSettings,

    /// Pages to render, in order.
    #[serde(default = "default_pages")]
    pub pages: Vec<PageEntry>,
}

/// Directory layout, relative to the project base path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSettings {
    /// Template source directory.
    #[serde(default = "default_template_dir")]
    pub template_dir: String,

    /// Static asset source directory.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    /// Output directory.
    #[serde(default = "default_build_dir")]
    pub build_dir: String,

    /// Subdirectories created inside the output directory before the build.
    #[serde(default = "default_subdirs")]
    pub subdirs: Vec<String>,

    /// Glob patterns for top-level static entries that are not copied.
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// One page: a template and the output path it renders to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageEntry {
    /// Template name inside the template directory.
    pub template: String,

    /// Output path inside the build directory. Defaults to the template name.
    #[serde(default)]
    pub output: Option<String>,
}

impl PageEntry {
    /// Output path, falling back to the template name.
    #[must_use]
    pub fn output(&self) -> &str {
        self.output.as_deref().unwrap_or(&self.template)
    }
}

// Default value functions
fn default_template_dir() -> String {
    "src/templates".to_string()
}

fn default_static_dir() -> String {
    "src/static".to_string()
}

fn default_build_dir() -> String {
    "build".to_string()
}

fn default_subdirs() -> Vec<String> {
    vec!["static/css".to_string()]
}

fn default_pages() -> Vec<PageEntry> {
    vec![PageEntry {
        template: "index.html".to_string(),
        output: None,
    }]
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            template_dir: default_template_dir(),
            static_dir: default_static_dir(),
            build_dir: default_build_dir(),
            subdirs: default_subdirs(),
            exclude: Vec::new(),
        }
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            build: BuildSettings::default(),
            pages: default_pages(),
        }
    }
}

impl ProjectConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let config: ProjectConfig = toml::from_str(&content).map_err(|e| {
            CoreError::config_with_source(
                format!("Failed to parse config file: {}", path.display()),
                e,
            )
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `path`, or the defaults when it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            debug!(path = %path.display(), "no project file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with `HARDBOILED__SECTION__KEY` environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(config::Environment::with_prefix("HARDBOILED").separator("__"))
            .build()?;

        let config: ProjectConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        let dirs = [
            ("build.template_dir", &self.build.template_dir),
            ("build.static_dir", &self.build.static_dir),
            ("build.build_dir", &self.build.build_dir),
        ];
        for (name, value) in dirs {
            if value.trim().is_empty() {
                return Err(CoreError::config(format!("{name} cannot be empty")));
            }
        }

        if let Some(index) = self.pages.iter().position(|p| p.template.trim().is_empty()) {
            return Err(CoreError::config(format!(
                "pages[{index}].template cannot be empty"
            )));
        }

        if self.pages.is_empty() {
            warn!("no pages configured, only static assets will be copied");
        }

        Ok(())
    }
}
