//! Video-to-waveform transcoding through the external `ffmpeg` binary.
//!
//! ffmpeg runs as one blocking subprocess per record with its output captured.
//! The pipeline only needs the "give me a mono WAV for this video" capability,
//! so that seam is a trait; tests substitute an implementation that
//! synthesizes audio instead of shelling out.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use thiserror::Error;

/// Failure modes of one transcode invocation.
#[derive(Debug, Error)]
pub enum TranscodeError {
    /// The transcoder process could not be launched at all, typically because
    /// the binary is not installed or not on `PATH`.
    #[error("failed to launch '{}': {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The process ran but reported failure.
    #[error("'{}' failed ({status}): {stderr}", program.display())]
    Failed {
        program: PathBuf,
        status: ExitStatus,
        stderr: String,
    },
}

/// Extracts the audio track of a video file into a waveform file.
pub trait Transcoder {
    /// Transcode `video` into a mono 16-bit PCM WAV at `waveform`.
    ///
    /// Implementations overwrite any existing file at `waveform`, so a
    /// half-written waveform from an interrupted run cannot leak into the
    /// next one.
    fn to_waveform(&self, video: &Path, waveform: &Path) -> Result<(), TranscodeError>;
}

/// [`Transcoder`] backed by the `ffmpeg` command-line tool.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    program: PathBuf,
}

impl FfmpegTranscoder {
    /// Resolve `ffmpeg` from `PATH`.
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("ffmpeg"),
        }
    }

    /// Use a specific executable instead of resolving `ffmpeg` from `PATH`.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, video: &Path, waveform: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-nostdin")
            .arg("-y")
            .arg("-i")
            .arg(video)
            .arg("-ac")
            .arg("1")
            .arg("-acodec")
            .arg("pcm_s16le")
            .arg(waveform);
        cmd
    }
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcoder for FfmpegTranscoder {
    fn to_waveform(&self, video: &Path, waveform: &Path) -> Result<(), TranscodeError> {
        let output = self
            .command(video, waveform)
            .output()
            .map_err(|source| TranscodeError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(TranscodeError::Failed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        tracing::debug!(
            video = %video.display(),
            waveform = %waveform.display(),
            "transcoded video to waveform"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::ffi::OsStr;

    #[test]
    fn builds_a_non_interactive_mono_pcm_invocation() {
        let transcoder = FfmpegTranscoder::new();
        let cmd = transcoder.command(Path::new("clip.mp4"), Path::new("clip.wav"));

        assert_eq!(cmd.get_program(), "ffmpeg");
        let args: Vec<&OsStr> = cmd.get_args().collect();
        let expected = [
            "-nostdin", "-y", "-i", "clip.mp4", "-ac", "1", "-acodec", "pcm_s16le", "clip.wav",
        ];
        assert_eq!(args, expected.map(OsStr::new));
    }

    #[test]
    fn missing_binary_reports_a_spawn_error() {
        let transcoder = FfmpegTranscoder::with_program("/definitely/not/ffmpeg");
        let err = transcoder
            .to_waveform(Path::new("clip.mp4"), Path::new("clip.wav"))
            .unwrap_err();

        assert!(matches!(err, TranscodeError::Spawn { .. }));
        assert!(err.to_string().contains("/definitely/not/ffmpeg"));
    }
}
