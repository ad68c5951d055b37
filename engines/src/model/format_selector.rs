//! Format selector profiles passed to the fetch engine.

use std::fmt;

/// Represents the quality a fetch attempt asks the engine for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QualityProfile {
    /// 1080p mp4 video with m4a audio merged in, degrading inside the selector
    /// when the exact pair is not offered.
    Precise,
    /// Best available video and audio, whatever the resolution.
    BestEffort,
}

impl QualityProfile {
    /// The format selector string understood by yt-dlp's `-f` option.
    pub fn selector(&self) -> &'static str {
        match self {
            QualityProfile::Precise => {
                "bestvideo[height=1080][ext=mp4]+bestaudio[ext=m4a]/best[height=1080][ext=mp4]/bestvideo+bestaudio/best"
            }
            QualityProfile::BestEffort => "bestvideo+bestaudio/best",
        }
    }
}

impl fmt::Display for QualityProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityProfile::Precise => write!(f, "precise"),
            QualityProfile::BestEffort => write!(f, "best-effort"),
        }
    }
}
