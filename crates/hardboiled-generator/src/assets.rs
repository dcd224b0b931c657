//! Static asset handling.
//!
//! Copies the direct children of the static source directory into the
//! output tree and provides a cache-busting `static_url` template function.

use std::{
    fs::{self, File, FileTimes},
    io,
    path::{Component, Path, PathBuf},
};

use glob::{MatchOptions, Pattern};
use hardboiled_core::{get_file_hash_short, DEFAULT_SHORT_HASH_LEN};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::template::Args;

/// Asset processing errors.
#[derive(Debug, Error)]
pub enum AssetError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Invalid exclude pattern.
    #[error("invalid exclude pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// Walking a directory failed.
    #[error("failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// Invalid asset path.
    #[error("invalid asset path: {0}")]
    InvalidPath(PathBuf),
}

/// Result type for asset operations.
pub type Result<T> = std::result::Result<T, AssetError>;

/// Counts from a copy run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    /// Top-level entries copied.
    pub entries: usize,

    /// Files written, including those inside copied directories.
    pub files: usize,

    /// Top-level entries skipped by an exclude pattern.
    pub excluded: usize,
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Copies static assets, skipping top-level entries matched by exclude globs.
///
/// A pattern with N segments is matched against the last N components of
/// each entry path, so `*.css` matches `style.css` but not the `css`
/// directory. Patterns starting with `/` must match the whole path. Entries
/// inside copied directories are never filtered.
#[derive(Debug, Default)]
pub struct AssetCopier {
    exclude: Vec<Pattern>,
}

impl AssetCopier {
    /// Create a copier with the given exclude patterns.
    pub fn new<S: AsRef<str>>(exclude_patterns: &[S]) -> Result<Self> {
        let exclude = exclude_patterns
            .iter()
            .map(|p| Pattern::new(p.as_ref()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { exclude })
    }

    /// Whether `path` matches any exclude pattern.
    #[must_use]
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.exclude.iter().any(|pattern| matches_suffix(pattern, path))
    }

    /// Copy every direct child of `source_dir` into `dest_dir`.
    ///
    /// Does nothing if `source_dir` does not exist. Existing destination
    /// directories are replaced wholesale.
    pub fn copy(&self, source_dir: &Path, dest_dir: &Path) -> Result<CopyStats> {
        let mut stats = CopyStats::default();

        if !source_dir.exists() {
            debug!(source = %source_dir.display(), "static directory does not exist, skipping");
            return Ok(stats);
        }

        info!(
            source = %source_dir.display(),
            dest = %dest_dir.display(),
            "copying static assets"
        );

        fs::create_dir_all(dest_dir)?;

        for entry in fs::read_dir(source_dir)? {
            let entry = entry?;
            let path = entry.path();

            if self.is_excluded(&path) {
                debug!(path = %path.display(), "excluded");
                stats.excluded += 1;
                continue;
            }

            let dest = dest_dir.join(entry.file_name());
            if path.is_dir() {
                if dest.is_dir() {
                    fs::remove_dir_all(&dest)?;
                } else if dest.exists() {
                    fs::remove_file(&dest)?;
                }
                stats.files += copy_dir_all(&path, &dest)?;
            } else {
                copy_file(&path, &dest)?;
                stats.files += 1;
            }
            stats.entries += 1;
        }

        info!(
            entries = stats.entries,
            files = stats.files,
            excluded = stats.excluded,
            "static assets copied"
        );
        Ok(stats)
    }
}

/// Match `pattern` against the trailing components of `path`.
fn matches_suffix(pattern: &Pattern, path: &Path) -> bool {
    let raw = pattern.as_str();
    if raw.starts_with('/') {
        return pattern.matches_path_with(path, MATCH_OPTIONS);
    }

    let segments = raw.split('/').filter(|s| !s.is_empty()).count();
    let parts: Vec<_> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect();
    if segments == 0 || parts.len() < segments {
        return false;
    }

    let tail = parts[parts.len() - segments..].join("/");
    pattern.matches_with(&tail, MATCH_OPTIONS)
}

/// Recursively copy `source` to `dest`, returning the number of files copied.
pub fn copy_dir_all(source: &Path, dest: &Path) -> Result<usize> {
    let mut files = 0;
    for entry in WalkDir::new(source).follow_links(true) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|_| AssetError::InvalidPath(entry.path().to_path_buf()))?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            copy_file(entry.path(), &target)?;
            files += 1;
        }
    }
    Ok(files)
}

/// Copy a single file byte-for-byte, keeping permissions and timestamps.
pub fn copy_file(source: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut reader = File::open(source)?;
    let metadata = reader.metadata()?;
    let mut writer = File::create(dest)?;
    io::copy(&mut reader, &mut writer)?;

    let mut times = FileTimes::new();
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    writer.set_times(times)?;
    drop(writer);

    fs::set_permissions(dest, metadata.permissions())?;

    debug!(
        src = %source.display(),
        dest = %dest.display(),
        "copied asset"
    );
    Ok(())
}

/// Template function producing cache-busted static URLs.
///
/// `{{ static_url(path="css/main.css") }}` renders as
/// `/static/css/main.css?v=1a2b3c4d`, where the query is a short hash of the
/// source file's contents.
#[derive(Debug, Clone)]
pub struct StaticUrl {
    static_dir: PathBuf,
    url_prefix: String,
}

impl StaticUrl {
    /// Hash files under `static_dir` and prefix URLs with `url_prefix`.
    #[must_use]
    pub fn new(static_dir: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            static_dir: static_dir.into(),
            url_prefix: url_prefix.into(),
        }
    }

    /// Cache-busted URL for an asset path relative to the static directory.
    pub fn url_for(&self, asset: &str) -> tera::Result<String> {
        let relative = Path::new(asset.trim_start_matches('/'));
        let inside = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !inside || asset.is_empty() {
            return Err(tera::Error::msg(format!(
                "static_url: invalid asset path '{asset}'"
            )));
        }

        let source = self.static_dir.join(relative);
        let hash = get_file_hash_short(&source, DEFAULT_SHORT_HASH_LEN).map_err(|e| {
            tera::Error::chain(format!("static_url: cannot hash '{asset}'"), e)
        })?;

        let prefix = self.url_prefix.trim_end_matches('/');
        let path = asset.trim_start_matches('/');
        Ok(format!("{prefix}/{path}?v={hash}"))
    }
}

impl tera::Function for StaticUrl {
    fn call(&self, args: &Args) -> tera::Result<Value> {
        let asset = args
            .get("path")
            .and_then(Value::as_str)
            .ok_or_else(|| tera::Error::msg("static_url requires a string 'path' argument"))?;
        self.url_for(asset).map(Value::String)
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use tempfile::TempDir;

    use super::*;

    fn static_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("style.css"), "body { color: black; }").unwrap();
        fs::write(dir.path().join("app.js"), "console.log(1);").unwrap();
        fs::create_dir_all(dir.path().join("css/nested")).unwrap();
        fs::write(dir.path().join("css/main.css"), ".main { display: block; }").unwrap();
        fs::write(dir.path().join("css/nested/deep.css"), "a {}").unwrap();
        dir
    }

    #[test]
    fn test_copy_everything() {
        let source = static_tree();
        let dest = TempDir::new().unwrap();

        let stats = AssetCopier::default()
            .copy(source.path(), dest.path())
            .unwrap();

        assert!(dest.path().join("style.css").exists());
        assert!(dest.path().join("app.js").exists());
        assert!(dest.path().join("css/main.css").exists());
        assert!(dest.path().join("css/nested/deep.css").exists());
        assert_eq!(stats.entries, 3);
        assert_eq!(stats.files, 4);
        assert_eq!(stats.excluded, 0);
    }

    #[test]
    fn test_exclude_applies_to_top_level_only() {
        let source = static_tree();
        let dest = TempDir::new().unwrap();

        let stats = AssetCopier::new(&["*.css"])
            .unwrap()
            .copy(source.path(), dest.path())
            .unwrap();

        assert!(!dest.path().join("style.css").exists());
        assert!(dest.path().join("app.js").exists());
        assert!(dest.path().join("css/main.css").exists());
        assert!(dest.path().join("css/nested/deep.css").exists());
        assert_eq!(stats.excluded, 1);
    }

    #[test]
    fn test_exclude_directory_by_name() {
        let source = static_tree();
        let dest = TempDir::new().unwrap();

        AssetCopier::new(&["css"])
            .unwrap()
            .copy(source.path(), dest.path())
            .unwrap();

        assert!(!dest.path().join("css").exists());
        assert!(dest.path().join("style.css").exists());
    }

    #[test]
    fn test_exclude_is_case_sensitive() {
        let source = static_tree();
        let dest = TempDir::new().unwrap();

        AssetCopier::new(&["*.CSS"])
            .unwrap()
            .copy(source.path(), dest.path())
            .unwrap();

        assert!(dest.path().join("style.css").exists());
    }

    #[test]
    fn test_multi_segment_pattern_matches_suffix() {
        let copier = AssetCopier::new(&["static/*.js"]).unwrap();

        assert!(copier.is_excluded(Path::new("/site/static/app.js")));
        assert!(!copier.is_excluded(Path::new("/site/assets/app.js")));
        assert!(!copier.is_excluded(Path::new("app.js")));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = AssetCopier::new(&["[unclosed"]).unwrap_err();
        assert!(matches!(err, AssetError::Pattern(_)));
    }

    #[test]
    fn test_missing_source_is_noop() {
        let dest = TempDir::new().unwrap();
        let target = dest.path().join("static");

        let stats = AssetCopier::default()
            .copy(&dest.path().join("missing"), &target)
            .unwrap();

        assert_eq!(stats, CopyStats::default());
        assert!(!target.exists());
    }

    #[test]
    fn test_directory_is_replaced() {
        let source = static_tree();
        let dest = TempDir::new().unwrap();
        fs::create_dir_all(dest.path().join("css")).unwrap();
        fs::write(dest.path().join("css/stale.css"), "old").unwrap();

        AssetCopier::default()
            .copy(source.path(), dest.path())
            .unwrap();

        assert!(!dest.path().join("css/stale.css").exists());
        assert!(dest.path().join("css/main.css").exists());
    }

    #[test]
    fn test_copy_file_preserves_contents_and_mtime() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("logo.bin");
        let dest = dir.path().join("out/logo.bin");
        fs::write(&source, [0u8, 159, 146, 150, 255]).unwrap();

        let past = SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000);
        File::options()
            .write(true)
            .open(&source)
            .unwrap()
            .set_modified(past)
            .unwrap();

        copy_file(&source, &dest).unwrap();

        assert_eq!(fs::read(&dest).unwrap(), vec![0u8, 159, 146, 150, 255]);
        let modified = fs::metadata(&dest).unwrap().modified().unwrap();
        assert_eq!(modified, past);
    }

    #[test]
    fn test_static_url() {
        let source = static_tree();
        let helper = StaticUrl::new(source.path(), "/static/");

        let expected_hash =
            get_file_hash_short(&source.path().join("css/main.css"), DEFAULT_SHORT_HASH_LEN)
                .unwrap();
        assert_eq!(
            helper.url_for("css/main.css").unwrap(),
            format!("/static/css/main.css?v={expected_hash}")
        );
    }

    #[test]
    fn test_static_url_rejects_bad_paths() {
        let source = static_tree();
        let helper = StaticUrl::new(source.path(), "/static");

        assert!(helper.url_for("../secret.txt").is_err());
        assert!(helper.url_for("missing.css").is_err());
        assert!(helper.url_for("").is_err());
    }

    #[test]
    fn test_static_url_function_args() {
        let source = static_tree();
        let helper = StaticUrl::new(source.path(), "/static");

        let mut args = Args::new();
        args.insert("path".to_string(), Value::String("app.js".to_string()));
        let value = tera::Function::call(&helper, &args).unwrap();
        assert!(value.as_str().unwrap().starts_with("/static/app.js?v="));

        assert!(tera::Function::call(&helper, &Args::new()).is_err());
    }
}
