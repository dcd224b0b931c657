//! Hardboiled CLI
//!
//! Single binary static site generator. Running it with no subcommand builds
//! the site in the current directory.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};

/// Command-line interface for hardboiled.
#[derive(Parser)]
#[command(
    name = "hardboiled",
    version,
    about = "A minimal static site generator"
)]
struct Cli {
    /// Path to the project file, relative to the base path
    #[arg(short, long, default_value = "hardboiled.toml")]
    project: PathBuf,

    /// Project base path (defaults to the current directory)
    #[arg(short, long)]
    base: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available CLI commands.
#[derive(clap::Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Build the site (default)
    Build,
    /// Remove the output directory
    Clean,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    hardboiled::init_tracing(cli.verbose);

    let base = match cli.base {
        Some(base) => base,
        None => std::env::current_dir().wrap_err("Failed to resolve current directory")?,
    };

    match cli.command.unwrap_or(Commands::Build) {
        Commands::Build => hardboiled::cmd::build::run(&base, &cli.project)?,
        Commands::Clean => hardboiled::cmd::clean::run(&base, &cli.project)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_cli_no_arguments() {
        let cli = Cli::parse_from(["hardboiled"]);

        assert_eq!(cli.project, PathBuf::from("hardboiled.toml"));
        assert!(cli.base.is_none());
        assert_eq!(cli.verbose, 0);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_build_command_parsing() {
        let cli = Cli::parse_from(["hardboiled", "build"]);
        assert_eq!(cli.command, Some(Commands::Build));
    }

    #[test]
    fn test_cli_clean_command_parsing() {
        let cli = Cli::parse_from(["hardboiled", "--base", "site", "clean"]);

        assert_eq!(cli.command, Some(Commands::Clean));
        assert_eq!(cli.base, Some(PathBuf::from("site")));
    }

    #[test]
    fn test_cli_verbosity_flags() {
        let cli = Cli::parse_from(["hardboiled", "-vvv", "build"]);
        assert_eq!(cli.verbose, 3);
    }

    #[test]
    fn test_cli_custom_project_path() {
        let cli = Cli::parse_from(["hardboiled", "--project", "site.toml"]);
        assert_eq!(cli.project, PathBuf::from("site.toml"));
    }
}
