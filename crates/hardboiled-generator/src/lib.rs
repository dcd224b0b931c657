//! Hardboiled Generator Library
//!
//! Static site generation engine for hardboiled.
//!
//! # Modules
//!
//! - [`template`] - Tera-backed template engine with globals and filters
//! - [`assets`] - Static asset copying and cache-busting URLs
//! - [`builder`] - Build orchestration

pub mod assets;
pub mod builder;
pub mod template;

pub use assets::{AssetCopier, AssetError, CopyStats, StaticUrl};
pub use builder::{BuildError, Page, SiteBuilder};
pub use template::{TemplateEngine, TemplateError};
