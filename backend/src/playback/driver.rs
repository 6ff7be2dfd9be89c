//! Playback Driver
//!
//! Single-pass, frame-sequential loop:
//!
//! ```text
//! 1. Derive the frame clock from the first two frames
//! 2. Build a renderer for the scenario
//! 3. For each frame, in trace order: render, then push the view to the sink
//! 4. Finish the sink and report a summary
//! ```
//!
//! An empty trace is not fatal: the clock falls back to the default spacing,
//! the sink is opened and finished without frames, and nothing is encoded.

use crate::core::clock::FrameClock;
use crate::models::scenario::Scenario;
use crate::playback::{FrameSink, PlaybackConfig, PlaybackError, PlaybackTiming};
use crate::render::renderer::FrameRenderer;
use crate::render::view::PhaseCounts;
use crate::trace::{TraceError, TraceStream};
use tracing::{debug, info, warn};

/// Outcome of a playback run
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSummary {
    /// Frames rendered and pushed to the sink
    pub frames: usize,

    pub dt: f64,
    pub fps: u32,
    pub trail_capacity: usize,

    /// Task phases as of the last frame (all inactive for an empty trace)
    pub final_phases: PhaseCounts,
}

/// Drives one playback run
///
/// # Example
/// ```
/// use swarm_replay_core::{FrameView, PlaybackConfig, PlaybackDriver, Scenario, TraceStream};
///
/// let scenario = Scenario::from_json_str(r#"{"area":[0,10,0,10],"num_agents":1}"#).unwrap();
/// let trace = TraceStream::from_text("{\"t\":0}\n{\"t\":0.25}\n").unwrap();
///
/// let mut views: Vec<FrameView> = Vec::new();
/// let summary = PlaybackDriver::new(PlaybackConfig::default())
///     .run(&scenario, &trace, &mut views)
///     .unwrap();
///
/// assert_eq!(summary.frames, 2);
/// assert_eq!(summary.fps, 4);
/// assert_eq!(views.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct PlaybackDriver {
    config: PlaybackConfig,
}

impl PlaybackDriver {
    pub fn new(config: PlaybackConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Feed every frame of `trace` through a renderer into `sink`
    pub fn run<S: FrameSink>(
        &self,
        scenario: &Scenario,
        trace: &TraceStream,
        sink: &mut S,
    ) -> Result<PlaybackSummary, PlaybackError> {
        let (clock, empty) = match trace.frame_clock() {
            Ok(clock) => (clock, false),
            Err(TraceError::EmptyTrace) => {
                warn!("trace contains no frames; nothing will be rendered");
                (FrameClock::fallback(), true)
            }
            Err(err) => return Err(err.into()),
        };
        if clock.is_fallback() && !empty {
            warn!(
                dt = clock.dt(),
                "could not derive frame spacing from the trace; using the default"
            );
        }

        let timing = PlaybackTiming {
            dt: clock.dt(),
            fps: self.fps_for(&clock),
        };
        let mut renderer =
            FrameRenderer::with_trail_window(scenario, &clock, self.config.trail_window);
        info!(
            dt = timing.dt,
            fps = timing.fps,
            trail = renderer.history().capacity(),
            agents = scenario.num_agents(),
            tasks = scenario.tasks().len(),
            "starting playback"
        );

        sink.begin(timing)?;
        let mut final_phases = PhaseCounts {
            inactive: scenario.tasks().len(),
            ..PhaseCounts::default()
        };
        if !empty {
            for frame in trace.frames()? {
                let frame = frame?;
                let view = renderer.render(&frame);
                final_phases = view.phase_counts();
                sink.push(&view)?;
                debug!(t = frame.t, "rendered frame");
            }
        }
        sink.finish()?;

        let summary = PlaybackSummary {
            frames: renderer.frames_rendered(),
            dt: timing.dt,
            fps: timing.fps,
            trail_capacity: renderer.history().capacity(),
            final_phases,
        };
        info!(
            frames = summary.frames,
            completed = final_phases.completed,
            missed = final_phases.missed,
            pending = final_phases.pending,
            "playback finished"
        );
        Ok(summary)
    }

    fn fps_for(&self, clock: &FrameClock) -> u32 {
        self.config
            .fps
            .filter(|&fps| fps > 0)
            .unwrap_or_else(|| clock.fps())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::view::FrameView;

    #[test]
    fn test_fps_override() {
        let scenario =
            Scenario::from_json_str(r#"{"area":[0,10,0,10],"num_agents":1}"#).unwrap();
        let trace = TraceStream::from_text("{\"t\":0}\n{\"t\":1}\n").unwrap();
        let config = PlaybackConfig {
            fps: Some(24),
            ..PlaybackConfig::default()
        };
        let mut views: Vec<FrameView> = Vec::new();
        let summary = PlaybackDriver::new(config)
            .run(&scenario, &trace, &mut views)
            .unwrap();
        assert_eq!(summary.fps, 24);
        assert_eq!(summary.dt, 1.0);
    }

    #[test]
    fn test_zero_fps_override_is_ignored() {
        let driver = PlaybackDriver::new(PlaybackConfig {
            fps: Some(0),
            ..PlaybackConfig::default()
        });
        assert_eq!(driver.fps_for(&FrameClock::from_timestamps(0.0, 0.5)), 2);
    }
}
