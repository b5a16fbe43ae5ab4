use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::natural::natural_sort_by_key;
use crate::plan::FileEntry;

#[derive(Debug, Error)]
pub enum ListError {
    #[error("failed to read directory {}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// List the non-directory entries directly inside `dir`, naturally sorted
/// by name.
///
/// An empty path yields an empty listing. Names that are not valid UTF-8
/// are skipped.
pub fn list_entries(dir: &Path) -> Result<Vec<FileEntry>, ListError> {
    if dir.as_os_str().is_empty() {
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|source| ListError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;

        if entry.file_type().is_dir() {
            continue;
        }

        let Some(name) = entry.file_name().to_str() else {
            warn!(path = %entry.path().display(), "Skipping entry with non UTF-8 name");
            continue;
        };

        entries.push(FileEntry {
            name: name.to_string(),
            path: entry.path().to_path_buf(),
        });
    }

    natural_sort_by_key(&mut entries, |entry| entry.name.as_str());
    debug!(dir = %dir.display(), count = entries.len(), "Listed directory");

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_lists_files_only_in_natural_order() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["img10.jpg", "img2.jpg", "IMG1.jpg", ".hidden"] {
            fs::write(temp_dir.path().join(name), "").unwrap();
        }
        fs::create_dir(temp_dir.path().join("subdir")).unwrap();
        fs::write(temp_dir.path().join("subdir").join("nested.txt"), "").unwrap();

        let entries = list_entries(temp_dir.path()).unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();

        assert_eq!(names, vec![".hidden", "IMG1.jpg", "img2.jpg", "img10.jpg"]);
        assert_eq!(entries[1].path, temp_dir.path().join("IMG1.jpg"));
    }

    #[test]
    fn test_empty_path_lists_nothing() {
        assert!(list_entries(Path::new("")).unwrap().is_empty());
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");

        let error = list_entries(&missing).unwrap_err();
        assert!(error.to_string().starts_with("failed to read directory"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_listed() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("real.txt"), "").unwrap();
        std::os::unix::fs::symlink(
            temp_dir.path().join("real.txt"),
            temp_dir.path().join("link.txt"),
        )
        .unwrap();

        let names: Vec<_> = list_entries(temp_dir.path())
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["link.txt", "real.txt"]);
    }
}
