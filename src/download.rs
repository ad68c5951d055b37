//! The two-attempt download strategy.
//!
//! Every row is fetched under a temporary name first. The precise profile
//! (1080p mp4) is tried once; only when it has definitively failed is the
//! best-effort profile tried. Whatever the engine left under the temporary name
//! is then handed to [`placement::place`](crate::placement::place).

use crate::error::FetchError;
use crate::placement;
use crate::table::SourceRow;
use log::{debug, info, warn};
use sheetdl_engines::error::Error as EngineError;
use sheetdl_engines::utils::file_system;
use sheetdl_engines::{FetchEngine, FetchRequest, QualityProfile};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One row on its way to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadJob {
    pub url: String,
    pub final_filename: String,
    /// `<prefix><file stem>`, the name the engine writes under.
    pub temp_name_prefix: String,
}

impl DownloadJob {
    /// Derives the job for a row.
    ///
    /// # Errors
    ///
    /// [`FetchError::InvalidFilename`] when the file name is not a plain name
    /// inside the output directory, or starts with `temp_prefix` and so could
    /// collide with another row's temp name.
    pub fn new(row: &SourceRow, temp_prefix: &str) -> Result<Self, FetchError> {
        let invalid = || FetchError::InvalidFilename(row.filename.clone());

        let name = file_system::try_name(&row.filename).map_err(|_| invalid())?;
        if name != row.filename || (!temp_prefix.is_empty() && name.starts_with(temp_prefix)) {
            return Err(invalid());
        }
        let stem = file_system::try_without_extension(&row.filename).map_err(|_| invalid())?;

        Ok(Self {
            url: row.url.clone(),
            final_filename: row.filename.clone(),
            temp_name_prefix: format!("{temp_prefix}{stem}"),
        })
    }

    /// Whether a file in the output directory was written for this job.
    ///
    /// That is the temp name itself or the temp name followed by a suffix the
    /// engine chose (`tmp_clip.mp4`, `tmp_clip.f137.mp4.part`), but never
    /// another job's name that merely shares the prefix (`tmp_clip2.mp4`).
    pub fn owns(&self, file_name: &str) -> bool {
        match file_name.strip_prefix(self.temp_name_prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('.'),
            None => false,
        }
    }
}

/// The tagged result of one fetch attempt.
#[derive(Debug)]
pub enum AttemptOutcome {
    Succeeded(QualityProfile),
    Failed(QualityProfile, EngineError),
}

/// Runs download jobs against one output directory.
#[derive(Clone)]
pub struct Downloader {
    engine: Arc<dyn FetchEngine>,
    output_dir: PathBuf,
    temp_prefix: String,
    merge_container: String,
}

impl Downloader {
    pub fn new(
        engine: Arc<dyn FetchEngine>,
        output_dir: impl Into<PathBuf>,
        temp_prefix: impl Into<String>,
        merge_container: impl Into<String>,
    ) -> Self {
        Self {
            engine,
            output_dir: output_dir.into(),
            temp_prefix: temp_prefix.into(),
            merge_container: merge_container.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Downloads one row and places it under its requested name.
    ///
    /// Returns the final path.
    ///
    /// # Errors
    ///
    /// Any [`FetchError`]; the caller should report it and move on to the next row.
    pub async fn download(&self, row: &SourceRow) -> Result<PathBuf, FetchError> {
        let job = DownloadJob::new(row, &self.temp_prefix)?;
        info!("Downloading {} -> {}", job.url, job.final_filename);

        let artifacts = self.fetch(&job).await?;
        let final_path = self.output_dir.join(&job.final_filename);
        placement::place(&artifacts, &final_path).await?;

        Ok(final_path)
    }

    /// Runs the attempts for a job and returns the artifacts it produced,
    /// authoritative one first.
    ///
    /// # Errors
    ///
    /// [`FetchError::EngineFailure`] when both attempts fail,
    /// [`FetchError::ArtifactMissing`] when the engine left nothing behind.
    pub async fn fetch(&self, job: &DownloadJob) -> Result<Vec<PathBuf>, FetchError> {
        // Leftovers from an interrupted run must not be mistaken for this run's output.
        for stale in self.artifacts(job).await? {
            debug!("Removing stale {}", stale.display());
            if !file_system::remove_temp_file(&stale).await {
                warn!("Could not remove stale {}", stale.display());
            }
        }

        let precise = match self.attempt(job, QualityProfile::Precise).await {
            AttemptOutcome::Succeeded(_) => None,
            AttemptOutcome::Failed(_, e) => {
                warn!(
                    "1080p download failed for {}, trying best available quality: {}",
                    job.url, e
                );
                Some(e)
            }
        };

        if let Some(precise) = precise {
            if let AttemptOutcome::Failed(_, best_effort) =
                self.attempt(job, QualityProfile::BestEffort).await
            {
                return Err(FetchError::EngineFailure {
                    url: job.url.clone(),
                    precise,
                    best_effort,
                });
            }
        }

        let artifacts = self.artifacts(job).await?;
        if artifacts.is_empty() {
            return Err(FetchError::ArtifactMissing {
                filename: job.final_filename.clone(),
            });
        }
        if artifacts.len() > 1 {
            debug!(
                "Engine left {} files for {}, keeping {}",
                artifacts.len(),
                job.final_filename,
                artifacts[0].display()
            );
        }

        Ok(artifacts)
    }

    /// Runs one attempt to completion.
    pub async fn attempt(&self, job: &DownloadJob, profile: QualityProfile) -> AttemptOutcome {
        let request = FetchRequest::new(
            job.url.clone(),
            self.output_dir.join(&job.temp_name_prefix),
            profile,
            self.merge_container.clone(),
        );
        debug!("Attempting {} download with {}", profile, self.engine.name());

        match self.engine.fetch(&request).await {
            Ok(()) => AttemptOutcome::Succeeded(profile),
            Err(e) => AttemptOutcome::Failed(profile, e),
        }
    }

    /// The files in the output directory written for `job`, shortest name first.
    async fn artifacts(&self, job: &DownloadJob) -> Result<Vec<PathBuf>, FetchError> {
        let mut artifacts: Vec<PathBuf> = file_system::list_files(&self.output_dir)
            .await
            .map_err(FetchError::Scan)?
            .into_iter()
            .filter(|path| {
                file_system::try_name(path)
                    .map(|name| job.owns(&name))
                    .unwrap_or(false)
            })
            .collect();

        artifacts.sort_by_key(|path| (path.as_os_str().len(), path.clone()));
        Ok(artifacts)
    }
}
