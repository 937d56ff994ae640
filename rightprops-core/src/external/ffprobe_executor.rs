//! Execution of ffprobe as a child process.
//!
//! The [`FfprobeExecutor`] trait is the seam between the reconciliation
//! engine and the external tool. [`TokioFfprobeExecutor`] is the production
//! implementation; a scripted one lives in `external::mocks` behind the
//! `test-mocks` feature.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use super::request::ProbeRequest;
use crate::error::{CoreError, CoreResult, command_failed_error, command_start_error};

/// Runs ffprobe requests against a single input file.
#[async_trait]
pub trait FfprobeExecutor: Send + Sync {
    /// Runs `request` against `input` and hands each stdout line to
    /// `on_line` as soon as it is read.
    ///
    /// Returns [`CoreError::Cancelled`] once `cancel` fires; the child
    /// process is killed in that case.
    async fn stream_lines(
        &self,
        request: &ProbeRequest,
        input: &Path,
        cancel: &CancellationToken,
        on_line: &mut (dyn for<'a> FnMut(&'a str) + Send),
    ) -> CoreResult<()>;

    /// Runs `request` and collects the whole stdout.
    async fn read_to_string(
        &self,
        request: &ProbeRequest,
        input: &Path,
        cancel: &CancellationToken,
    ) -> CoreResult<String> {
        let mut output = String::new();
        self.stream_lines(request, input, cancel, &mut |line: &str| {
            output.push_str(line);
            output.push('\n');
        })
        .await?;
        Ok(output)
    }
}

/// Spawns the configured ffprobe binary with tokio.
#[derive(Debug, Clone)]
pub struct TokioFfprobeExecutor {
    ffprobe_bin: PathBuf,
}

impl TokioFfprobeExecutor {
    pub fn new(ffprobe_bin: impl Into<PathBuf>) -> Self {
        Self {
            ffprobe_bin: ffprobe_bin.into(),
        }
    }
}

#[async_trait]
impl FfprobeExecutor for TokioFfprobeExecutor {
    async fn stream_lines(
        &self,
        request: &ProbeRequest,
        input: &Path,
        cancel: &CancellationToken,
        on_line: &mut (dyn for<'a> FnMut(&'a str) + Send),
    ) -> CoreResult<()> {
        let args = request.args();
        let cmd_name = self.ffprobe_bin.display().to_string();
        log::debug!("Running: {} {} {}", cmd_name, args.join(" "), input.display());

        let mut child = Command::new(&self.ffprobe_bin)
            .args(&args)
            .arg(input)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| command_start_error(cmd_name.clone(), e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| CoreError::OperationFailed("ffprobe stdout was not captured".into()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| CoreError::OperationFailed("ffprobe stderr was not captured".into()))?;

        // Drained separately so a chatty stderr cannot stall stdout.
        let stderr_task = tokio::spawn(async move {
            let mut text = String::new();
            let _ = stderr.read_to_string(&mut text).await;
            text
        });

        let mut lines = BufReader::new(stdout).lines();
        let mut saw_output = false;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    let _ = child.kill().await;
                    return Err(CoreError::Cancelled);
                }
                line = lines.next_line() => match line? {
                    Some(line) => {
                        saw_output = true;
                        on_line(&line);
                    }
                    None => break,
                }
            }
        }

        let status = tokio::select! {
            _ = cancel.cancelled() => {
                let _ = child.kill().await;
                return Err(CoreError::Cancelled);
            }
            status = child.wait() => status?,
        };

        let stderr_text = stderr_task
            .await
            .map_err(|e| CoreError::TaskJoin(e.to_string()))?;
        let stderr_text = stderr_text.trim();
        if !stderr_text.is_empty() {
            log::warn!("ffprobe reported on '{}': {}", input.display(), stderr_text);
        }

        if !status.success() && !saw_output {
            return Err(command_failed_error(cmd_name, status, stderr_text));
        }

        Ok(())
    }
}
