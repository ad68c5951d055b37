//! Moving a finished download to its final name.

use log::{debug, warn};
use sheetdl_engines::utils::file_system;
use std::io;
use std::path::{Path, PathBuf};

/// Places the first artifact at `final_path` and discards the rest.
///
/// An existing file at `final_path` is replaced, so a rerun converges to the
/// latest download. Leftover artifacts are removed best-effort: a failed removal
/// is logged and does not fail the placement.
///
/// # Errors
///
/// Fails when there is no artifact, or when the stale final file cannot be
/// removed or the artifact cannot be renamed.
pub async fn place(artifacts: &[PathBuf], final_path: &Path) -> io::Result<()> {
    let (chosen, extras) = artifacts.split_first().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("nothing to place at {}", final_path.display()),
        )
    })?;

    match tokio::fs::remove_file(final_path).await {
        Ok(()) => debug!("Removed previous {}", final_path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    tokio::fs::rename(chosen, final_path).await?;
    debug!("Moved {} to {}", chosen.display(), final_path.display());

    for extra in extras {
        if !file_system::remove_temp_file(extra).await {
            warn!("Could not remove leftover {}", extra.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn test_place_replaces_existing_and_discards_extras() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("tmp_clip.mp4");
        let extra = dir.path().join("tmp_clip.f140.m4a");
        let target = dir.path().join("clip.mp4");
        fs::write(&first, b"new").unwrap();
        fs::write(&extra, b"side").unwrap();
        fs::write(&target, b"old").unwrap();

        place(&[first.clone(), extra.clone()], &target).await.unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"new");
        assert!(!first.exists());
        assert!(!extra.exists());
    }

    #[tokio::test]
    async fn test_place_tolerates_vanished_extra() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("tmp_clip");
        let target = dir.path().join("clip.mp4");
        fs::write(&first, b"new").unwrap();

        place(&[first, dir.path().join("tmp_clip.gone")], &target)
            .await
            .unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_place_without_artifacts_fails() {
        let dir = tempfile::tempdir().unwrap();

        let err = place(&[], &dir.path().join("clip.mp4")).await.unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
