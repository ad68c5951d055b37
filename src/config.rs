//! Settings shared by every entry point, read from `config.toml` and overridden on the command line.

use crate::table::TableFormat;
use clap::ValueEnum;
use log::{debug, error};
use serde::{Deserialize, Serialize};
use sheetdl_engines::error::Result as EngineResult;
use sheetdl_engines::{Ffmpeg, YtDlp};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR: &str = "sheetdl";
const CONFIG_FILE: &str = "config.toml";

/// The table layouts sheetdl knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TableLayout {
    /// Comma separated, lines optionally prefixed with `<index>|`.
    #[default]
    IndexedCsv,
    /// Pipe separated, no index prefix.
    Pipe,
}

impl TableLayout {
    pub fn format(&self) -> TableFormat {
        match self {
            TableLayout::IndexedCsv => TableFormat::INDEXED_CSV,
            TableLayout::Pipe => TableFormat::PIPE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where final files are placed and where the repair pass looks.
    pub output_dir: PathBuf,
    /// Explicit yt-dlp executable; looked up on `PATH` when unset.
    pub yt_dlp: Option<PathBuf>,
    /// Explicit ffmpeg executable; looked up on `PATH` when unset.
    pub ffmpeg: Option<PathBuf>,
    pub table_format: TableLayout,
    /// Marker in front of temporary download names.
    pub temp_prefix: String,
    /// Container the fetch engine merges into.
    pub merge_container: String,
    /// Extension of the videos the repair pass scans for.
    pub video_extension: String,
    /// Extension of the audio sidecars the repair pass pairs with.
    pub audio_extension: String,
    /// Codec the repair pass re-encodes audio to.
    pub audio_codec: String,
    /// Kill an engine run after this many seconds; unset waits for it to exit.
    pub timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("videos"),
            yt_dlp: None,
            ffmpeg: None,
            table_format: TableLayout::default(),
            temp_prefix: "tmp_".to_string(),
            merge_container: "mp4".to_string(),
            video_extension: "mp4".to_string(),
            audio_extension: "m4a".to_string(),
            audio_codec: "aac".to_string(),
            timeout_secs: None,
        }
    }
}

impl Config {
    /// The user-level config file, if the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// The fetch engine, located from `yt_dlp` or `PATH`.
    ///
    /// # Errors
    ///
    /// Fails when yt-dlp cannot be found. Only downloading needs it.
    pub fn fetch_engine(&self) -> EngineResult<YtDlp> {
        Ok(YtDlp::locate(self.yt_dlp.clone())?.with_timeout(self.timeout()))
    }

    /// The mux engine, located from `ffmpeg` or `PATH`.
    ///
    /// # Errors
    ///
    /// Fails when ffmpeg cannot be found. Only the repair pass needs it.
    pub fn mux_engine(&self) -> EngineResult<Ffmpeg> {
        Ok(Ffmpeg::locate(self.ffmpeg.clone())?
            .with_audio_codec(&self.audio_codec)
            .with_timeout(self.timeout()))
    }

    /// Loads the config at `path`, falling back to defaults.
    ///
    /// A missing or empty file yields the defaults. A malformed file is reported
    /// and also yields the defaults; it is never fatal.
    pub fn load(path: &Path) -> Self {
        if !path.is_file() {
            debug!("No config file at {}, using defaults", path.display());
            return Self::default();
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                error!("Could not read config file {}: {}", path.display(), e);
                return Self::default();
            }
        };

        match toml::from_str::<Config>(&content) {
            Ok(config) => {
                debug!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                error!("Malformed config file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();

        assert_eq!(Config::load(&dir.path().join(CONFIG_FILE)), Config::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "output_dir = \"out\"\ntable_format = \"pipe\"\n").unwrap();

        let config = Config::load(&path);

        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.table_format, TableLayout::Pipe);
        assert_eq!(config.temp_prefix, "tmp_");
        assert_eq!(config.table_format.format(), TableFormat::PIPE);
    }

    #[test]
    fn test_mux_engine_does_not_need_yt_dlp() {
        let dir = tempfile::tempdir().unwrap();
        let ffmpeg = dir.path().join("ffmpeg");
        fs::write(&ffmpeg, b"").unwrap();
        let config = Config {
            yt_dlp: Some(dir.path().join("missing-yt-dlp")),
            ffmpeg: Some(ffmpeg.clone()),
            audio_codec: "libopus".to_string(),
            timeout_secs: Some(90),
            ..Config::default()
        };

        let engine = config.mux_engine().unwrap();

        assert_eq!(engine.executable, ffmpeg);
        assert_eq!(engine.audio_codec, "libopus");
        assert_eq!(engine.timeout, Some(Duration::from_secs(90)));
        assert!(config.fetch_engine().is_err());
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "output_dir = [").unwrap();

        assert_eq!(Config::load(&path), Config::default());
    }
}
