//! Write a file set to disk.
//!
//! Filenames come from model output and the database, so each one is
//! checked before anything is written: absolute paths and `..` components
//! are rejected for the whole set.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::types::{FileSet, ForgeError, Result, ResultExt};

/// Resolve `name` under `root`, refusing anything that could escape it
pub fn safe_path(root: &Path, name: &str) -> Result<PathBuf> {
    let relative = Path::new(name);
    if name.trim().is_empty() {
        return Err(ForgeError::invalid("Empty filename"));
    }

    for component in relative.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            _ => {
                return Err(ForgeError::invalid(format!(
                    "Refusing to write '{}' outside the output directory",
                    name
                )));
            }
        }
    }

    Ok(root.join(relative))
}

/// Write every file under `root`, creating directories as needed.
/// Returns the written paths in filename order.
pub fn export_files(files: &FileSet, root: &Path) -> Result<Vec<PathBuf>> {
    let targets = files
        .iter()
        .map(|(name, content)| safe_path(root, name).map(|path| (path, content)))
        .collect::<Result<Vec<_>>>()?;

    fs::create_dir_all(root)
        .with_context_fn(|| format!("Failed to create {}", root.display()))?;

    let mut written = Vec::with_capacity(targets.len());
    for (path, content) in targets {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content).with_context_fn(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }

    tracing::info!("Exported {} files to {}", written.len(), root.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_writes_nested_files() {
        let temp_dir = TempDir::new().unwrap();
        let mut files = FileSet::new();
        files.insert("app.py", "print(1)");
        files.insert("static/app.js", "console.log(1)");

        let written = export_files(&files, temp_dir.path()).unwrap();

        assert_eq!(written.len(), 2);
        assert_eq!(fs::read_to_string(temp_dir.path().join("app.py")).unwrap(), "print(1)");
        assert!(temp_dir.path().join("static/app.js").exists());
    }

    #[test]
    fn test_rejects_escaping_names_before_writing() {
        let temp_dir = TempDir::new().unwrap();
        let mut files = FileSet::new();
        files.insert("a.txt", "fine");
        files.insert("../evil.txt", "nope");

        let err = export_files(&files, &temp_dir.path().join("out")).unwrap_err();

        assert!(matches!(err, ForgeError::InvalidRequest(_)));
        assert!(!temp_dir.path().join("out").exists());
        assert!(!temp_dir.path().join("evil.txt").exists());
    }

    #[test]
    fn test_safe_path() {
        let root = Path::new("/tmp/out");
        assert!(safe_path(root, "/etc/passwd").is_err());
        assert!(safe_path(root, "a/../../b").is_err());
        assert!(safe_path(root, "").is_err());
        assert_eq!(safe_path(root, "./app.py").unwrap(), root.join("./app.py"));
    }
}
