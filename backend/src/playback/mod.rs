//! Playback: feeding frames through the renderer into a video
//!
//! - **driver**: iterates a trace, renders each frame, hands views to a sink
//! - **raster**: paints a `FrameView` into an RGB24 buffer
//! - **glyphs**: built-in bitmap font for banners, labels and the legend
//! - **encoder**: `VideoSink`, spools frames and encodes them with ffmpeg
//!
//! Tool paths and frame sizes live in `PlaybackConfig`, passed in at start-up.
//! There is no process-wide plotting state.

pub mod driver;
pub mod encoder;
pub mod glyphs;
pub mod raster;

use crate::core::clock::TRAIL_WINDOW;
use crate::render::view::FrameView;
use crate::trace::TraceError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

pub use driver::{PlaybackDriver, PlaybackSummary};
pub use encoder::VideoSink;
pub use raster::SceneLayout;

/// Errors raised during playback
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error(transparent)]
    Trace(#[from] TraceError),

    #[error("Failed to draw frame: {0}")]
    Render(String),

    #[error("Video encoding failed: {0}")]
    Encode(String),

    #[error("I/O error during playback: {0}")]
    Io(#[from] std::io::Error),
}

/// Playback configuration
///
/// # Fields
///
/// * `output` - Video file to write
/// * `width` / `height` - Frame size in pixels (rounded down to even values)
/// * `fps` - Frame rate override; `None` plays back in real trace time
/// * `ffmpeg` - ffmpeg binary used by the encoder
/// * `trail_window` - Trace time covered by agent trails
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub fps: Option<u32>,
    pub ffmpeg: PathBuf,
    pub trail_window: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("simulation.mp4"),
            width: 1000,
            height: 1000,
            fps: None,
            ffmpeg: PathBuf::from("ffmpeg"),
            trail_window: TRAIL_WINDOW,
        }
    }
}

/// Timing a sink needs before the first frame arrives
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackTiming {
    pub dt: f64,
    pub fps: u32,
}

/// Destination for rendered frame views
///
/// The driver calls `begin` once, `push` once per frame in trace order, then
/// `finish` once, even when the trace is empty.
pub trait FrameSink {
    fn begin(&mut self, _timing: PlaybackTiming) -> Result<(), PlaybackError> {
        Ok(())
    }

    fn push(&mut self, view: &FrameView) -> Result<(), PlaybackError>;

    fn finish(&mut self) -> Result<(), PlaybackError>;
}

impl FrameSink for Vec<FrameView> {
    fn push(&mut self, view: &FrameView) -> Result<(), PlaybackError> {
        Vec::push(self, view.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), PlaybackError> {
        Ok(())
    }
}
