//! Video encoding
//!
//! `VideoSink` paints every pushed view, spools the raw RGB24 frames to a
//! temporary file, and on `finish` hands the spool to ffmpeg:
//!
//! ```text
//! ffmpeg -f rawvideo -pix_fmt rgb24 -s WxH -r FPS -i <spool> [plan args] <output>
//! ```
//!
//! Encoder plans are tried in order (H.264, then MPEG-4 Part 2) so a minimal
//! ffmpeg build still produces a playable file. A run with no frames skips
//! encoding and writes nothing.

use crate::models::scenario::Scenario;
use crate::playback::raster::SceneLayout;
use crate::playback::{FrameSink, PlaybackConfig, PlaybackError, PlaybackTiming};
use crate::render::view::FrameView;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::NamedTempFile;
use tracing::{info, warn};

/// One way of invoking ffmpeg
#[derive(Debug, Clone)]
struct EncoderPlan {
    description: &'static str,
    args: Vec<&'static str>,
    faststart: bool,
}

fn encoder_plans() -> Vec<EncoderPlan> {
    vec![
        EncoderPlan {
            description: "H.264 (libx264)",
            args: vec![
                "-c:v", "libx264", "-preset", "medium", "-crf", "18", "-pix_fmt", "yuv420p",
            ],
            faststart: true,
        },
        EncoderPlan {
            description: "MPEG-4 Part 2",
            args: vec!["-c:v", "mpeg4", "-q:v", "3", "-pix_fmt", "yuv420p"],
            faststart: false,
        },
    ]
}

/// yuv420p needs even dimensions
fn even_dimension(value: u32) -> usize {
    let value = value.max(2) as usize;
    value - value % 2
}

/// Production sink: raster frames encoded into a video file
pub struct VideoSink {
    layout: SceneLayout,
    output: PathBuf,
    ffmpeg: PathBuf,
    fps: u32,

    /// Trace time between frames, for reporting
    dt: f64,
    spool: Option<BufWriter<NamedTempFile>>,
    frames: usize,
}

impl VideoSink {
    pub fn new(scenario: &Scenario, config: &PlaybackConfig) -> Self {
        let width = even_dimension(config.width);
        let height = even_dimension(config.height);
        if width as u32 != config.width || height as u32 != config.height {
            warn!(
                requested_width = config.width,
                requested_height = config.height,
                width,
                height,
                "adjusting frame size for yuv420p encoder compatibility"
            );
        }

        Self {
            layout: SceneLayout::new(scenario, width, height),
            output: config.output.clone(),
            ffmpeg: config.ffmpeg.clone(),
            fps: config.fps.unwrap_or(1).max(1),
            dt: 0.0,
            spool: None,
            frames: 0,
        }
    }

    pub fn layout(&self) -> &SceneLayout {
        &self.layout
    }

    /// Frames painted so far
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Trace time covered by the painted frames
    pub fn trace_seconds(&self) -> f64 {
        self.frames as f64 * self.dt
    }

    fn spool(&mut self) -> Result<&mut BufWriter<NamedTempFile>, PlaybackError> {
        if self.spool.is_none() {
            let file = NamedTempFile::new()?;
            self.spool = Some(BufWriter::new(file));
        }
        self.spool
            .as_mut()
            .ok_or_else(|| PlaybackError::Encode("frame spool unavailable".to_string()))
    }

    fn encode(&self, raw_path: &Path) -> Result<PathBuf, PlaybackError> {
        if let Some(parent) = self.output.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let dims = format!("{}x{}", self.layout.width(), self.layout.height());
        let fps = self.fps.to_string();
        let frames = self.frames.to_string();
        let mut failures: Vec<(&'static str, String)> = Vec::new();

        for plan in encoder_plans() {
            let mut cmd = Command::new(&self.ffmpeg);
            cmd.args(["-hide_banner", "-loglevel", "error", "-y"])
                .args(["-f", "rawvideo", "-pix_fmt", "rgb24"])
                .arg("-s")
                .arg(&dims)
                .arg("-r")
                .arg(&fps)
                .arg("-i")
                .arg(raw_path)
                .arg("-frames:v")
                .arg(&frames)
                .args(&plan.args);
            if plan.faststart {
                cmd.args(["-movflags", "+faststart"]);
            }
            cmd.arg(&self.output);

            info!(frames = self.frames, encoder = plan.description, "encoding video");
            match cmd.output() {
                Ok(output) if output.status.success() => return Ok(self.output.clone()),
                Ok(output) => {
                    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
                    warn!(encoder = plan.description, %stderr, "encoder failed");
                    failures.push((plan.description, stderr));
                }
                Err(err) => {
                    warn!(encoder = plan.description, error = %err, "could not run ffmpeg");
                    failures.push((plan.description, err.to_string()));
                }
            }
        }

        let report = failures
            .iter()
            .map(|(description, err)| format!("- {description}: {err}"))
            .collect::<Vec<_>>()
            .join("\n");
        Err(PlaybackError::Encode(format!(
            "no ffmpeg encoder succeeded ({}):\n{report}",
            self.ffmpeg.display()
        )))
    }
}

impl FrameSink for VideoSink {
    fn begin(&mut self, timing: PlaybackTiming) -> Result<(), PlaybackError> {
        self.fps = timing.fps.max(1);
        self.dt = timing.dt;
        Ok(())
    }

    fn push(&mut self, view: &FrameView) -> Result<(), PlaybackError> {
        let frame = self.layout.paint(view)?;
        self.spool()?.write_all(&frame)?;
        self.frames += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), PlaybackError> {
        let Some(spool) = self.spool.take() else {
            warn!("no frames collected; skipping video encoding");
            return Ok(());
        };
        let raw_file = spool.into_inner().map_err(|e| e.into_error())?;
        let raw_path = raw_file.into_temp_path();

        let output = self.encode(&raw_path)?;
        info!(
            frames = self.frames,
            path = %output.display(),
            width = self.layout.width(),
            height = self.layout.height(),
            fps = self.fps,
            trace_seconds = self.trace_seconds(),
            "video written"
        );
        raw_path.close()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::view::{AgentVisual, LeaderBanner};

    fn scenario() -> Scenario {
        Scenario::from_json_str(r#"{"area":[0,10,0,10],"num_agents":1}"#).unwrap()
    }

    #[test]
    fn test_dimensions_are_made_even() {
        assert_eq!(even_dimension(1001), 1000);
        assert_eq!(even_dimension(1000), 1000);
        assert_eq!(even_dimension(0), 2);
    }

    #[test]
    fn test_finish_without_frames_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("empty.mp4");
        let config = PlaybackConfig {
            output: output.clone(),
            ffmpeg: PathBuf::from("/nonexistent/ffmpeg"),
            ..PlaybackConfig::default()
        };
        let mut sink = VideoSink::new(&scenario(), &config);
        sink.begin(PlaybackTiming { dt: 0.1, fps: 10 }).unwrap();
        sink.finish().unwrap();
        assert!(!output.exists());
    }

    #[test]
    fn test_missing_ffmpeg_reports_every_plan() {
        let dir = tempfile::tempdir().unwrap();
        let config = PlaybackConfig {
            output: dir.path().join("out.mp4"),
            width: 64,
            height: 64,
            ffmpeg: PathBuf::from("/nonexistent/ffmpeg"),
            ..PlaybackConfig::default()
        };
        let mut sink = VideoSink::new(&scenario(), &config);
        let view = FrameView {
            t: 0.0,
            leader: LeaderBanner::Reelecting,
            agents: vec![AgentVisual::unseen(0)],
            tasks: Vec::new(),
        };
        sink.push(&view).unwrap();
        assert_eq!(sink.frames(), 1);

        match sink.finish() {
            Err(PlaybackError::Encode(report)) => {
                assert!(report.contains("H.264"));
                assert!(report.contains("MPEG-4"));
            }
            other => panic!("expected encode failure, got {other:?}"),
        }
    }
}
