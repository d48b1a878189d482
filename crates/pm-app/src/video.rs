use std::io::Write as _;
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};

use image::RgbaImage;

use crate::error::AppError;

#[derive(Clone, Debug)]
pub struct VideoConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub out_path: PathBuf,
}

impl VideoConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.width == 0 || self.height == 0 {
            return Err(AppError::video("video width/height must be non-zero"));
        }
        if self.fps == 0 {
            return Err(AppError::video("video fps must be non-zero"));
        }
        if self.width % 2 != 0 || self.height % 2 != 0 {
            // yuv420p subsamples chroma in 2x2 blocks
            return Err(AppError::video(
                "video width/height must be even (required for yuv420p output)",
            ));
        }
        Ok(())
    }
}

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Streams raw RGBA frames into a system `ffmpeg` process producing a
/// VP9 webm. Using the binary instead of linking FFmpeg keeps the build
/// free of native dev headers.
pub struct VideoEncoder {
    cfg: VideoConfig,
    child: Child,
    stdin: Option<ChildStdin>,
}

impl VideoEncoder {
    pub fn new(cfg: VideoConfig) -> Result<Self, AppError> {
        cfg.validate()?;

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        cmd.args([
            "-y",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &cfg.fps.to_string(),
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            "libvpx-vp9",
            "-pix_fmt",
            "yuv420p",
            "-crf",
            "32",
            "-b:v",
            "0",
        ])
        .arg(&cfg.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            AppError::video(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| AppError::video("failed to open ffmpeg stdin"))?;

        Ok(Self {
            cfg,
            child,
            stdin: Some(stdin),
        })
    }

    pub fn write_frame(&mut self, frame: &RgbaImage) -> Result<(), AppError> {
        if frame.width() != self.cfg.width || frame.height() != self.cfg.height {
            return Err(AppError::video(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width(),
                frame.height(),
                self.cfg.width,
                self.cfg.height
            )));
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(AppError::video("video encoder is already finalized"));
        };

        stdin
            .write_all(frame.as_raw())
            .map_err(|e| AppError::video(format!("failed to write frame to ffmpeg stdin: {e}")))
    }

    pub fn finish(mut self) -> Result<(), AppError> {
        drop(self.stdin.take());

        let output = self
            .child
            .wait_with_output()
            .map_err(|e| AppError::video(format!("failed to wait for ffmpeg: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::video(format!(
                "ffmpeg exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}
