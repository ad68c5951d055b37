//! Tools for working with the file system.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Returns the name of the given path.
pub fn try_name(path: impl AsRef<Path>) -> Result<String> {
    let name = path
        .as_ref()
        .file_name()
        .ok_or(Error::Path("Failed to get name".to_string()))?;
    let name = name
        .to_str()
        .ok_or(Error::Path("Failed to convert name".to_string()))?;

    Ok(name.to_string())
}

/// Returns the name of the given path without its last extension.
///
/// `clip.final.mp4` becomes `clip.final`, and a dotfile such as `.mp4` is kept whole.
pub fn try_without_extension(path: impl AsRef<Path>) -> Result<String> {
    let stem = path
        .as_ref()
        .file_stem()
        .ok_or(Error::Path("Failed to get name".to_string()))?;
    let stem = stem
        .to_str()
        .ok_or(Error::Path("Failed to convert name".to_string()))?;

    Ok(stem.to_string())
}

/// Returns the extension of the given path, if it has one.
pub fn extension(path: impl AsRef<Path>) -> Option<String> {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_string)
}

/// Creates a new directory at the given destination.
/// If the directory already exists, nothing is done.
///
/// # Arguments
///
/// * `destination` - The path to create the directory at.
pub fn create_dir(destination: impl AsRef<Path>) -> Result<()> {
    std::fs::create_dir_all(destination)?;
    Ok(())
}

/// Lists the regular files directly inside the given directory.
/// Sub-directories are not descended into.
///
/// # Arguments
///
/// * `directory` - The directory to list.
pub async fn list_files(directory: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(directory).await?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            files.push(entry.path());
        }
    }

    files.sort();
    Ok(files)
}

/// Removes a temporary file and logs any errors.
/// Does not propagate errors to avoid interrupting the execution flow.
///
/// # Arguments
///
/// * `file_path` - The path of the file to delete
///
/// # Returns
///
/// `true` if the file was successfully deleted, `false` otherwise
pub async fn remove_temp_file(file_path: impl AsRef<Path> + std::fmt::Debug) -> bool {
    let result = tokio::fs::remove_file(&file_path).await;

    #[cfg(feature = "tracing")]
    if let Err(ref e) = result {
        tracing::warn!("Failed to remove temporary file {:?}: {}", file_path, e);
    }

    result.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_without_extension_strips_only_last() {
        assert_eq!(try_without_extension("clip.final.mp4").unwrap(), "clip.final");
        assert_eq!(try_without_extension("videos/clip").unwrap(), "clip");
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension("a/b/clip.m4a").as_deref(), Some("m4a"));
        assert_eq!(extension("clip"), None);
    }

    #[tokio::test]
    async fn test_list_files_skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.mp4"), b"b").unwrap();
        std::fs::write(dir.path().join("a.mp4"), b"a").unwrap();
        std::fs::create_dir(dir.path().join("nested.mp4")).unwrap();

        let files = list_files(dir.path()).await.unwrap();

        assert_eq!(
            files,
            vec![dir.path().join("a.mp4"), dir.path().join("b.mp4")]
        );
    }

    #[tokio::test]
    async fn test_remove_temp_file_reports_missing() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("tmp_clip.part");
        std::fs::write(&file, b"x").unwrap();

        assert!(remove_temp_file(&file).await);
        assert!(!remove_temp_file(&file).await);
    }
}
