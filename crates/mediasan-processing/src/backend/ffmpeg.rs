use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use super::{AvTranscoder, TranscodeProfile};

/// Transcoder backed by an external `ffmpeg` binary.
///
/// The child is spawned with `kill_on_drop`, so a caller that stops awaiting
/// (for example on timeout) also terminates the process.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    ffmpeg_path: String,
    debug: bool,
}

impl FfmpegTranscoder {
    pub fn new(ffmpeg_path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            debug: false,
        }
    }

    /// Log command lines and process output at info level.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.ffmpeg_path
    }

    /// Input is read only from the local file, with the demuxer pinned to the
    /// profile's container instead of probed from the bytes.
    pub fn build_args(input: &Path, output: &Path, profile: &TranscodeProfile) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "-hide_banner",
            "-nostdin",
            "-y",
            "-protocol_whitelist",
            "file",
            "-f",
            profile.input_format(),
            "-i",
        ]
        .iter()
        .map(OsString::from)
        .collect();
        args.push(input.as_os_str().to_owned());
        args.extend(["-map_metadata", "-1"].iter().map(OsString::from));
        args.extend(profile.encoder_args().iter().map(OsString::from));
        args.push(output.as_os_str().to_owned());
        args
    }
}

#[async_trait]
impl AvTranscoder for FfmpegTranscoder {
    async fn transcode(&self, input: &Path, output: &Path, profile: &TranscodeProfile) -> Result<()> {
        let args = Self::build_args(input, output, profile);

        if self.debug {
            let rendered: Vec<_> = args.iter().map(|a| a.to_string_lossy()).collect();
            tracing::info!(
                command = %format!("{} {}", self.ffmpeg_path, rendered.join(" ")),
                "Starting ffmpeg"
            );
        }

        let result = Command::new(&self.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .with_context(|| format!("Failed to execute {}", self.ffmpeg_path))?;

        let stderr = String::from_utf8_lossy(&result.stderr);
        if self.debug {
            tracing::info!(
                status = %result.status,
                stdout = %String::from_utf8_lossy(&result.stdout),
                stderr = %stderr,
                "ffmpeg finished"
            );
        }

        if !result.status.success() {
            return Err(anyhow!(
                "FFmpeg transcode failed ({}): {}",
                result.status,
                stderr.trim()
            ));
        }

        Ok(())
    }
}
