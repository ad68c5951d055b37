//! The mux engine seam and its ffmpeg implementation.

use crate::error::{Error, Result};
use crate::executor::Executor;
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// An external program able to merge a video stream and an audio stream.
#[async_trait]
pub trait MuxEngine: Send + Sync {
    /// Name of the engine (for logging).
    fn name(&self) -> &'static str;

    /// Writes `output` from the video stream of `video` and the audio stream of `audio`.
    ///
    /// # Errors
    ///
    /// Any failure signal from the engine, including a non-zero exit.
    async fn mux(&self, video: &Path, audio: &Path, output: &Path) -> Result<()>;
}

/// The ffmpeg mux engine: the video stream is copied, the audio is re-encoded.
#[derive(Clone, Debug)]
pub struct Ffmpeg {
    /// The path to the ffmpeg executable.
    pub executable: PathBuf,
    /// The codec the audio stream is re-encoded to.
    pub audio_codec: String,
    /// The timeout for a single merge, `None` by default.
    pub timeout: Option<Duration>,
}

impl fmt::Display for Ffmpeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ffmpeg: executable={:?}, audio_codec={}",
            self.executable, self.audio_codec
        )
    }
}

impl Ffmpeg {
    /// Creates a mux engine backed by the given ffmpeg executable, re-encoding audio to AAC.
    pub fn new(executable: PathBuf) -> Self {
        Self {
            executable,
            audio_codec: "aac".to_string(),
            timeout: None,
        }
    }

    /// Creates a mux engine from an explicit executable path, or from `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingEngine`] when ffmpeg cannot be found.
    pub fn locate(explicit: Option<PathBuf>) -> Result<Self> {
        crate::utils::locate_executable("ffmpeg", explicit).map(Self::new)
    }

    /// Sets the timeout for a single merge.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the codec the audio stream is re-encoded to.
    pub fn with_audio_codec(mut self, codec: impl Into<String>) -> Self {
        self.audio_codec = codec.into();
        self
    }

    /// Builds the ffmpeg argument list for one merge.
    pub fn arguments(&self, video: &Path, audio: &Path, output: &Path) -> Result<Vec<String>> {
        let video = video
            .to_str()
            .ok_or(Error::Path("Invalid video path".to_string()))?;
        let audio = audio
            .to_str()
            .ok_or(Error::Path("Invalid audio path".to_string()))?;
        let output = output
            .to_str()
            .ok_or(Error::Path("Invalid output path".to_string()))?;

        let args = vec![
            "-y",
            "-i",
            video,
            "-i",
            audio,
            "-c:v",
            "copy",
            "-c:a",
            self.audio_codec.as_str(),
            "-strict",
            "experimental",
            output,
        ];

        Ok(crate::utils::to_owned(args))
    }
}

#[async_trait]
impl MuxEngine for Ffmpeg {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    async fn mux(&self, video: &Path, audio: &Path, output: &Path) -> Result<()> {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            "Combining video {:?} and audio {:?} into {:?}",
            video,
            audio,
            output
        );

        let executor = Executor {
            executable_path: self.executable.clone(),
            timeout: self.timeout,
            args: self.arguments(video, audio, output)?,
        };

        executor.execute().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arguments_copy_video_and_reencode_audio() {
        let ffmpeg = Ffmpeg::new(PathBuf::from("ffmpeg")).with_audio_codec("libopus");
        let args = ffmpeg
            .arguments(
                Path::new("v/clip.mp4"),
                Path::new("v/clip.m4a"),
                Path::new("v/clip_muxed.mp4"),
            )
            .unwrap();

        assert_eq!(
            args,
            vec![
                "-y",
                "-i",
                "v/clip.mp4",
                "-i",
                "v/clip.m4a",
                "-c:v",
                "copy",
                "-c:a",
                "libopus",
                "-strict",
                "experimental",
                "v/clip_muxed.mp4",
            ]
        );
    }
}
