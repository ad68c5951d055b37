//! Repairing downloads that ended up as separate video and audio files.
//!
//! For every `<base>.<video ext>` directly inside the output directory with a
//! `<base>.<audio ext>` next to it, the two are merged into
//! `<base>_muxed.<video ext>`, which then replaces the original video. The audio
//! sidecar is kept.

use crate::error::RepairError;
use log::{error, info, warn};
use sheetdl_engines::MuxEngine;
use sheetdl_engines::error::Error as EngineError;
use sheetdl_engines::utils::file_system;
use std::path::{Path, PathBuf};

/// Extensions that make up a video/audio pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairExtensions {
    pub video: String,
    pub audio: String,
}

impl Default for PairExtensions {
    fn default() -> Self {
        Self {
            video: "mp4".to_string(),
            audio: "m4a".to_string(),
        }
    }
}

/// A video and the audio sidecar sharing its base name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MuxPair {
    pub video: PathBuf,
    pub audio: PathBuf,
}

/// A pair the mux engine could not merge. The original video is untouched.
#[derive(Debug)]
pub struct FailedPair {
    pub pair: MuxPair,
    pub error: EngineError,
}

#[derive(Debug, Default)]
pub struct RemuxSummary {
    /// Videos found in the directory.
    pub scanned: usize,
    /// Pairs merged into their video file.
    pub merged: usize,
    pub failed: Vec<FailedPair>,
    /// No video in the directory had an audio sidecar.
    pub skipped_no_pair: bool,
}

/// Finds every video in `output_dir` that has an audio sidecar.
///
/// Returns the number of videos scanned along with the pairs, in name order.
///
/// # Errors
///
/// [`RepairError::DirectoryMissing`] when `output_dir` is not a directory.
pub async fn find_pairs(
    output_dir: &Path,
    extensions: &PairExtensions,
) -> Result<(usize, Vec<MuxPair>), RepairError> {
    if !output_dir.is_dir() {
        return Err(RepairError::DirectoryMissing(output_dir.to_path_buf()));
    }

    let videos: Vec<PathBuf> = file_system::list_files(output_dir)
        .await?
        .into_iter()
        .filter(|path| file_system::extension(path).as_deref() == Some(extensions.video.as_str()))
        .collect();

    let pairs = videos
        .iter()
        .filter_map(|video| {
            let audio = video.with_extension(&extensions.audio);
            audio.is_file().then(|| MuxPair {
                video: video.clone(),
                audio,
            })
        })
        .collect();

    Ok((videos.len(), pairs))
}

/// Merges every video/audio pair in `output_dir` in place.
///
/// A failed merge is recorded in the summary and the pass continues with the
/// next pair.
///
/// # Errors
///
/// [`RepairError::DirectoryMissing`] when `output_dir` is not a directory.
pub async fn remux_all(
    output_dir: &Path,
    engine: &dyn MuxEngine,
    extensions: &PairExtensions,
) -> Result<RemuxSummary, RepairError> {
    let (scanned, pairs) = find_pairs(output_dir, extensions).await?;

    let mut summary = RemuxSummary {
        scanned,
        skipped_no_pair: pairs.is_empty(),
        ..RemuxSummary::default()
    };

    if pairs.is_empty() {
        info!(
            "No .{} + .{} pair found in {}",
            extensions.video,
            extensions.audio,
            output_dir.display()
        );
        return Ok(summary);
    }

    for pair in pairs {
        match merge(&pair, engine, &extensions.video).await {
            Ok(()) => summary.merged += 1,
            Err(error) => {
                error!(
                    "Failed to merge {} + {}: {}",
                    pair.video.display(),
                    pair.audio.display(),
                    error
                );
                summary.failed.push(FailedPair { pair, error });
            }
        }
    }

    Ok(summary)
}

async fn merge(pair: &MuxPair, engine: &dyn MuxEngine, video_extension: &str) -> Result<(), EngineError> {
    let base = file_system::try_without_extension(&pair.video)?;
    let muxed = pair
        .video
        .with_file_name(format!("{base}_muxed.{video_extension}"));

    info!(
        "Merging {} + {} -> {} (overwriting) with {}",
        pair.video.display(),
        pair.audio.display(),
        pair.video.display(),
        engine.name()
    );

    if let Err(e) = engine.mux(&pair.video, &pair.audio, &muxed).await {
        if muxed.exists() && !file_system::remove_temp_file(&muxed).await {
            warn!("Could not remove partial {}", muxed.display());
        }
        return Err(e);
    }

    if let Err(e) = tokio::fs::rename(&muxed, &pair.video).await {
        if !file_system::remove_temp_file(&muxed).await {
            warn!("Could not remove {}", muxed.display());
        }
        return Err(e.into());
    }
    Ok(())
}
