//! Hardboiled Core Library
//!
//! Core types, configuration, and helpers for the hardboiled static site generator.

pub mod config;
pub mod context;
pub mod date;
pub mod env;
pub mod error;
pub mod hash;

pub use config::{BuildSettings, PageEntry, ProjectConfig, SiteConfig, SiteSettings};
pub use context::BuildContext;
pub use date::{current_year, format_date, DEFAULT_DATE_FORMAT};
pub use error::{CoreError, Result};
pub use hash::{get_file_hash, get_file_hash_short, HashAlgorithm, DEFAULT_SHORT_HASH_LEN};
