//! Scripted stand-ins for the fetch and mux engines.

use async_trait::async_trait;
use sheetdl_engines::error::{Error, Result};
use sheetdl_engines::{FetchEngine, FetchRequest, MuxEngine};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// What the fake fetch engine does on one call.
#[derive(Debug, Clone)]
pub enum Step {
    /// Exit non-zero without writing anything.
    Fail,
    /// Exit zero after writing one file per suffix next to the output template.
    /// Each file holds the profile name of the attempt that wrote it.
    Write(Vec<&'static str>),
}

#[derive(Debug, Default)]
pub struct ScriptedFetch {
    steps: Mutex<VecDeque<Step>>,
    pub calls: Mutex<Vec<FetchRequest>>,
}

impl ScriptedFetch {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<FetchRequest> {
        self.calls.lock().unwrap().clone()
    }
}

pub fn failure() -> Error {
    Error::Command {
        code: 1,
        stderr: "scripted failure".to_string(),
    }
}

#[async_trait]
impl FetchEngine for ScriptedFetch {
    fn name(&self) -> &'static str {
        "scripted-fetch"
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<()> {
        self.calls.lock().unwrap().push(request.clone());
        let step = self.steps.lock().unwrap().pop_front().unwrap_or(Step::Fail);

        match step {
            Step::Fail => Err(failure()),
            Step::Write(suffixes) => {
                for suffix in suffixes {
                    let mut name = request.output_template.as_os_str().to_owned();
                    name.push(suffix);
                    std::fs::write(PathBuf::from(name), request.profile.to_string())?;
                }
                Ok(())
            }
        }
    }
}

/// A mux engine writing `<video bytes>+<audio bytes>` to the output, failing
/// for videos whose name is listed in `fail_on`.
#[derive(Debug, Default)]
pub struct ScriptedMux {
    pub fail_on: Vec<&'static str>,
    pub calls: Mutex<Vec<(PathBuf, PathBuf, PathBuf)>>,
}

#[async_trait]
impl MuxEngine for ScriptedMux {
    fn name(&self) -> &'static str {
        "scripted-mux"
    }

    async fn mux(&self, video: &Path, audio: &Path, output: &Path) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((video.to_path_buf(), audio.to_path_buf(), output.to_path_buf()));

        let video_name = video.file_name().and_then(|name| name.to_str()).unwrap_or_default();
        if self.fail_on.iter().any(|name| *name == video_name) {
            std::fs::write(output, b"partial")?;
            return Err(failure());
        }

        let mut merged = std::fs::read(video)?;
        merged.push(b'+');
        merged.extend(std::fs::read(audio)?);
        std::fs::write(output, merged)?;
        Ok(())
    }
}
