//! The fetch engine seam and its yt-dlp implementation.

use crate::error::{Error, Result};
use crate::executor::Executor;
use crate::model::QualityProfile;
use async_trait::async_trait;
use derive_more::Constructor;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// One request to the fetch engine.
#[derive(Constructor, Clone, Debug, PartialEq)]
pub struct FetchRequest {
    /// The source URL.
    pub url: String,
    /// Where the engine writes its output; the engine may append its own extension.
    pub output_template: PathBuf,
    /// The quality asked for.
    pub profile: QualityProfile,
    /// The container forced on merged output, e.g. `mp4`.
    pub merge_container: String,
}

/// An external program able to download a URL to a path.
#[async_trait]
pub trait FetchEngine: Send + Sync {
    /// Name of the engine (for logging).
    fn name(&self) -> &'static str;

    /// Runs one fetch to completion.
    ///
    /// # Errors
    ///
    /// Any failure signal from the engine, including a non-zero exit.
    async fn fetch(&self, request: &FetchRequest) -> Result<()>;
}

/// The yt-dlp fetch engine.
///
/// # Examples
///
/// ```rust,no_run
/// # use sheetdl_engines::fetcher::{FetchEngine, FetchRequest, YtDlp};
/// # use sheetdl_engines::model::QualityProfile;
/// # use std::path::PathBuf;
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let engine = YtDlp::locate(None)?;
/// let request = FetchRequest::new(
///     "https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string(),
///     PathBuf::from("videos/tmp_intro"),
///     QualityProfile::Precise,
///     "mp4".to_string(),
/// );
///
/// engine.fetch(&request).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct YtDlp {
    /// The path to the yt-dlp executable.
    pub executable: PathBuf,
    /// The timeout for a single fetch, `None` by default.
    pub timeout: Option<Duration>,
}

impl fmt::Display for YtDlp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "YtDlp: executable={:?}", self.executable)
    }
}

impl YtDlp {
    /// Creates a fetch engine backed by the given yt-dlp executable.
    pub fn new(executable: PathBuf) -> Self {
        Self {
            executable,
            timeout: None,
        }
    }

    /// Creates a fetch engine from an explicit executable path, or from `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingEngine`] when yt-dlp cannot be found.
    pub fn locate(explicit: Option<PathBuf>) -> Result<Self> {
        crate::utils::locate_executable("yt-dlp", explicit).map(Self::new)
    }

    /// Sets the timeout for a single fetch.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the yt-dlp argument list for a request.
    pub fn arguments(request: &FetchRequest) -> Result<Vec<String>> {
        let output = request
            .output_template
            .to_str()
            .ok_or(Error::Path("Invalid output template".to_string()))?;

        Ok(vec![
            "-f".to_string(),
            request.profile.selector().to_string(),
            "--merge-output-format".to_string(),
            request.merge_container.clone(),
            "--force-overwrites".to_string(),
            "-o".to_string(),
            output.to_string(),
            request.url.clone(),
        ])
    }
}

#[async_trait]
impl FetchEngine for YtDlp {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<()> {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            "Fetching {} with the {} profile into {:?}",
            request.url,
            request.profile,
            request.output_template
        );

        let executor = Executor {
            executable_path: self.executable.clone(),
            timeout: self.timeout,
            args: Self::arguments(request)?,
        };

        executor.execute().await?;
        Ok(())
    }
}
