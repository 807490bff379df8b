//! Maps a record's import path onto its implementation file under the
//! versions root, and removes it after a successful registry delete.

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::warn;

use crate::error::CoreError;

const SOURCE_EXTENSIONS: [&str; 2] = ["tsx", "ts"];

/// Result of the companion file phase of a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRemoval {
    Removed,
    NotFound,
    Failed,
}

/// Resolve an import path such as `./src/v1-draft` to a file under
/// `root`. Anything that could escape the root is refused. Extensionless
/// paths probe the source extensions the bundler would.
pub fn resolve(root: &Path, import_path: &str) -> Result<PathBuf, CoreError> {
    if import_path.is_empty() || import_path.contains('\\') {
        return Err(CoreError::UnsafePath(import_path.to_string()));
    }
    let relative = Path::new(import_path.strip_prefix("./").unwrap_or(import_path));
    if relative.is_absolute()
        || relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
    {
        return Err(CoreError::UnsafePath(import_path.to_string()));
    }
    let base = root.join(relative);
    if base.extension().is_some() {
        return Ok(base);
    }
    for ext in SOURCE_EXTENSIONS {
        let candidate = base.with_extension(ext);
        if candidate.exists() {
            return Ok(candidate);
        }
    }
    Ok(base.with_extension(SOURCE_EXTENSIONS[0]))
}

/// Existence-checked removal of the file `import_path` refers to. Never
/// raises: the registry edit that preceded this is authoritative, so a
/// failure here is reported, not propagated.
pub fn remove(root: &Path, import_path: &str) -> FileRemoval {
    let path = match resolve(root, import_path) {
        Ok(path) => path,
        Err(err) => {
            warn!(%err, "refusing companion file removal");
            return FileRemoval::Failed;
        }
    };
    if !path.exists() {
        return FileRemoval::NotFound;
    }
    match fs::remove_file(&path) {
        Ok(()) => FileRemoval::Removed,
        Err(err) => {
            warn!(%err, "companion file removal failed");
            FileRemoval::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_probes_source_extensions() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("v1-draft.tsx"), "export default null\n").unwrap();

        let path = resolve(tmp.path(), "./src/v1-draft").unwrap();
        assert_eq!(path, src.join("v1-draft.tsx"));
    }

    #[test]
    fn test_resolve_keeps_an_explicit_extension() {
        let tmp = TempDir::new().unwrap();
        let path = resolve(tmp.path(), "./src/v1-draft.ts").unwrap();
        assert_eq!(path, tmp.path().join("src/v1-draft.ts"));
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let tmp = TempDir::new().unwrap();
        for bad in ["../secrets", "./src/../../etc/passwd", "/etc/passwd", "src\\v1"] {
            assert!(
                matches!(resolve(tmp.path(), bad), Err(CoreError::UnsafePath(_))),
                "{bad} should be refused"
            );
        }
    }

    #[test]
    fn test_remove_reports_missing_and_removed() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(&src).unwrap();
        let file = src.join("v1-draft.tsx");
        fs::write(&file, "export default null\n").unwrap();

        assert_eq!(remove(tmp.path(), "./src/v1-draft"), FileRemoval::Removed);
        assert!(!file.exists());
        assert_eq!(remove(tmp.path(), "./src/v1-draft"), FileRemoval::NotFound);
        assert_eq!(remove(tmp.path(), "../outside"), FileRemoval::Failed);
    }
}
