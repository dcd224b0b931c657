//! Template engine for page generation.
//!
//! Wraps Tera with a directory-backed template source. A fresh template set is
//! read from the template directory for every render, so inheritance and
//! includes always see the files currently on disk. Files that fail to load
//! are skipped unless the requested template needs them. Every template is
//! rendered with HTML autoescaping.

use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::{Component, Path, PathBuf},
};

use hardboiled_core::BuildContext;
use serde_json::Value;
use tera::Tera;
use thiserror::Error;
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

/// Template errors.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Template name does not resolve inside the template directory.
    #[error("template not found: {0}")]
    NotFound(String),

    /// The requested template, or a template it extends, failed to parse.
    #[error("failed to load template '{template}'")]
    Load {
        template: String,
        #[source]
        source: tera::Error,
    },

    /// The requested template could not be read as UTF-8 text.
    #[error("failed to read template {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Rendering failed.
    #[error("failed to render template '{template}'")]
    Render {
        template: String,
        #[source]
        source: tera::Error,
    },

    /// Walking the template directory failed.
    #[error("failed to read template directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Result type for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;

/// Named arguments passed to filters and functions.
pub type Args = HashMap<String, Value>;

/// A parsed template file and the templates it cannot load without.
struct Source {
    content: String,
    requires: Vec<String>,
}

/// Directory-backed template engine.
pub struct TemplateEngine {
    template_dir: PathBuf,
    // Escape settings, functions and filters only. Templates are added to a
    // clone per render.
    registry: Tera,
    globals: BuildContext,
}

impl std::fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateEngine")
            .field("template_dir", &self.template_dir)
            .field("globals", &self.globals)
            .finish_non_exhaustive()
    }
}

impl TemplateEngine {
    /// Create an engine reading templates from `template_dir`.
    #[must_use]
    pub fn new(template_dir: impl Into<PathBuf>) -> Self {
        let mut registry = Tera::default();
        // An empty suffix matches every template name.
        registry.autoescape_on(vec![""]);
        registry.set_escape_fn(escape_html);

        Self {
            template_dir: template_dir.into(),
            registry,
            globals: BuildContext::new(),
        }
    }

    /// Directory templates are loaded from.
    #[must_use]
    pub fn template_dir(&self) -> &Path {
        &self.template_dir
    }

    /// Replace the template directory.
    pub fn set_template_dir(&mut self, template_dir: impl Into<PathBuf>) {
        self.template_dir = template_dir.into();
    }

    /// Variables visible to every render.
    #[must_use]
    pub fn globals(&self) -> &BuildContext {
        &self.globals
    }

    /// Register a global variable.
    pub fn add_global(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.globals.insert(name, value);
    }

    /// Register a callable global, used as `{{ name(arg=value) }}`.
    ///
    /// Closures take their named arguments as [`Args`].
    pub fn add_function<F: tera::Function + 'static>(&mut self, name: &str, function: F) {
        self.registry.register_function(name, function);
    }

    /// Register a filter, used as `{{ value | name }}`.
    ///
    /// Closures receive the piped value and the filter's [`Args`].
    pub fn add_filter<F: tera::Filter + 'static>(&mut self, name: &str, filter: F) {
        self.registry.register_filter(name, filter);
    }

    /// Path a template name resolves to, if it stays inside the template
    /// directory and is not hidden.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        let relative = Path::new(name);
        let visible = relative.components().all(|c| match c {
            Component::Normal(part) => !is_hidden(part),
            Component::CurDir => true,
            _ => false,
        });
        if !visible || name.is_empty() {
            return None;
        }

        let path = self.template_dir.join(relative);
        path.is_file().then_some(path)
    }

    /// Render a template against the globals and `context`.
    ///
    /// Keys in `context` shadow globals of the same name.
    pub fn render(&self, name: &str, context: &BuildContext) -> Result<String> {
        if self.resolve(name).is_none() {
            return Err(TemplateError::NotFound(name.to_string()));
        }

        let requested = template_name(Path::new(name));
        let tera = self.load_templates(&requested)?;

        let mut tera_context = tera::Context::new();
        for (key, value) in self.globals.iter().chain(context.iter()) {
            tera_context.insert(key.as_str(), value);
        }

        tera.render(&requested, &tera_context)
            .map_err(|source| TemplateError::Render {
                template: name.to_string(),
                source,
            })
    }

    /// Build a template set from the files currently under the template
    /// directory.
    ///
    /// Unreadable or unparsable files are skipped with a warning, as are
    /// templates whose parent or macro files are missing. Failures in
    /// `requested` itself are errors.
    fn load_templates(&self, requested: &str) -> Result<Tera> {
        let mut sources = BTreeMap::new();
        let walker = WalkDir::new(&self.template_dir)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));
        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.template_dir) else {
                continue;
            };
            let name = template_name(relative);

            let content = match fs::read_to_string(entry.path()) {
                Ok(content) => content,
                Err(source) if name == requested => {
                    return Err(TemplateError::Read {
                        path: entry.path().to_path_buf(),
                        source,
                    });
                }
                Err(e) => {
                    warn!(name = %name, error = %e, "skipping unreadable template");
                    continue;
                }
            };

            match tera::Template::new(&name, None, &content) {
                Ok(parsed) => {
                    trace!(name = %name, "loading template");
                    let requires = parsed
                        .parent
                        .into_iter()
                        .chain(parsed.imported_macro_files.into_iter().map(|(file, _)| file))
                        .collect();
                    sources.insert(name, Source { content, requires });
                }
                Err(e) if name == requested => {
                    return Err(TemplateError::Load {
                        template: name.clone(),
                        source: tera::Error::chain(format!("Failed to parse '{name}'"), e),
                    });
                }
                Err(e) => {
                    warn!(name = %name, error = %e, "skipping template that failed to parse");
                }
            }
        }

        // Drop templates that depend on something skipped or absent, until
        // only complete chains remain.
        loop {
            let incomplete: Vec<String> = sources
                .iter()
                .filter(|(name, source)| {
                    name.as_str() != requested
                        && source.requires.iter().any(|r| !sources.contains_key(r))
                })
                .map(|(name, _)| name.clone())
                .collect();
            if incomplete.is_empty() {
                break;
            }
            for name in incomplete {
                warn!(name = %name, "skipping template with a missing parent or import");
                sources.remove(&name);
            }
        }

        debug!(
            dir = %self.template_dir.display(),
            count = sources.len(),
            "loaded templates"
        );

        let mut tera = self.registry.clone();
        tera.add_raw_templates(
            sources
                .iter()
                .map(|(name, source)| (name.as_str(), source.content.as_str())),
        )
        .map_err(|source| TemplateError::Load {
            template: requested.to_string(),
            source,
        })?;
        Ok(tera)
    }
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

/// Tera template name for a relative path, always `/`-separated.
fn template_name(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Escape HTML-unsafe characters the way Jinja-style engines do.
///
/// Unlike Tera's default, `/` is left alone so URLs stay readable.
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&#34;"),
            '\'' => output.push_str("&#39;"),
            _ => output.push(c),
        }
    }
    output
}
