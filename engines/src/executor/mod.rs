//! A tool for executing commands.

use crate::error::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Represents a command executor.
///
/// # Example
///
/// ```rust,no_run
/// # use sheetdl_engines::utils;
/// # use std::path::PathBuf;
/// # use sheetdl_engines::executor::Executor;
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let args = vec!["--version"];
///
/// let executor = Executor {
///     executable_path: PathBuf::from("yt-dlp"),
///     timeout: None,
///     args: utils::to_owned(args),
/// };
///
/// let output = executor.execute().await?;
/// println!("Output: {}", output.stdout);
///
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Executor {
    /// The path to the command executable.
    pub executable_path: PathBuf,
    /// The timeout for the process, `None` waits until it exits.
    pub timeout: Option<Duration>,

    /// The arguments to pass to the command.
    pub args: Vec<String>,
}

/// Represents the output of a process.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessOutput {
    /// The stdout of the process.
    pub stdout: String,
    /// The stderr of the process.
    pub stderr: String,
    /// The exit code of the process.
    pub code: i32,
}

impl Executor {
    /// Executes the command and returns the output.
    ///
    /// # Errors
    ///
    /// This function will return an error if the command could not be spawned, if it exited
    /// with a non-zero code, or if the process timed out.
    pub async fn execute(&self) -> Result<ProcessOutput> {
        #[cfg(feature = "tracing")]
        tracing::debug!("Executing command: {:?}", self);

        let mut command = tokio::process::Command::new(&self.executable_path);
        command.stdout(std::process::Stdio::piped());
        command.stderr(std::process::Stdio::piped());
        command.stdin(std::process::Stdio::null());

        #[cfg(target_os = "windows")]
        {
            use std::os::windows::process::CommandExt;
            command.creation_flags(0x08000000);
        }

        command.args(&self.args);
        let mut child = command.spawn()?;

        // Both engines print progress continuously, so drain the pipes while waiting.
        let stdout_handle = child
            .stdout
            .take()
            .ok_or_else(|| Error::Output("Failed to capture stdout".to_string()))?;
        let stderr_handle = child
            .stderr
            .take()
            .ok_or_else(|| Error::Output("Failed to capture stderr".to_string()))?;

        let stdout_task = tokio::spawn(async move {
            let mut buffer = Vec::new();
            tokio::io::copy(&mut tokio::io::BufReader::new(stdout_handle), &mut buffer).await?;
            Ok::<Vec<u8>, std::io::Error>(buffer)
        });

        let stderr_task = tokio::spawn(async move {
            let mut buffer = Vec::new();
            tokio::io::copy(&mut tokio::io::BufReader::new(stderr_handle), &mut buffer).await?;
            Ok::<Vec<u8>, std::io::Error>(buffer)
        });

        let exit_status = match self.timeout {
            None => child.wait().await?,
            Some(timeout) => match tokio::time::timeout(timeout, child.wait()).await {
                Ok(result) => result?,
                Err(_) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!("Process timed out after {:?}, killing it", timeout);

                    if let Err(_e) = child.kill().await {
                        #[cfg(feature = "tracing")]
                        tracing::error!("Failed to kill process after timeout: {}", _e);
                    }

                    return Err(Error::Timeout(timeout));
                }
            },
        };

        let stdout_result = stdout_task.await??;
        let stderr_result = stderr_task.await??;

        // Engines may print file names in the platform encoding, so stay lossy here.
        let stdout = String::from_utf8_lossy(&stdout_result).into_owned();
        let stderr = String::from_utf8_lossy(&stderr_result).into_owned();

        let code = exit_status.code().unwrap_or(-1);
        if exit_status.success() {
            return Ok(ProcessOutput {
                stdout,
                stderr,
                code,
            });
        }

        Err(Error::Command {
            code,
            stderr: stderr.trim().to_string(),
        })
    }
}
