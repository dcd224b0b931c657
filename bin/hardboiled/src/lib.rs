//! Hardboiled CLI Library
//!
//! Command implementations for the hardboiled binary, exposed as a library so
//! they can be driven from tests and other build scripts.
//!
//! # Modules
//!
//! - [`cmd`] - Command implementations (build, clean)
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use hardboiled::cmd;
//!
//! cmd::build::run(Path::new("."), Path::new("hardboiled.toml")).unwrap();
//! ```

pub mod cmd;

pub use hardboiled_core::{BuildContext, ProjectConfig, SiteConfig, SiteSettings};
pub use hardboiled_generator::{Page, SiteBuilder};

/// Initialize tracing with the specified verbosity level.
///
/// # Arguments
///
/// * `verbose` - Verbosity level (0 = WARN, 1 = INFO, 2 = DEBUG, 3+ = TRACE)
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}
