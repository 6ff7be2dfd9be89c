//! Frame spacing for trace playback
//!
//! A trace is a sequence of timestamped frames. The spacing between the
//! first two timestamps (`dt`) drives three derived quantities:
//! - how many positions an agent trail keeps (`trail_capacity`)
//! - the video frame rate (`fps`)
//! - the nominal interval between frames in milliseconds
//!
//! # Critical Invariants
//!
//! 1. `dt` is always finite and strictly positive
//! 2. No derived quantity ever divides by zero
//! 3. Trail capacity and fps are never below 1

use serde::{Deserialize, Serialize};

/// Frame spacing used when a trace has fewer than two frames, or when the
/// first two timestamps do not give a usable (positive, finite) difference.
pub const DEFAULT_FRAME_SPACING: f64 = 0.1;

/// Duration of trace time covered by an agent trail.
pub const TRAIL_WINDOW: f64 = 60.0;

const FPS_TOLERANCE: f64 = 1e-9;

/// Frame spacing derived once per playback run
///
/// # Example
/// ```
/// use swarm_replay_core::FrameClock;
///
/// let clock = FrameClock::from_timestamps(0.0, 0.5);
/// assert_eq!(clock.dt(), 0.5);
/// assert_eq!(clock.trail_capacity(60.0), 120);
/// assert_eq!(clock.fps(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameClock {
    /// Spacing between consecutive frames, in trace time units
    dt: f64,

    /// True when `dt` came from `DEFAULT_FRAME_SPACING` rather than the trace
    fallback: bool,
}

impl FrameClock {
    /// Derive the clock from the first two frame timestamps
    ///
    /// A non-positive or non-finite difference falls back to
    /// `DEFAULT_FRAME_SPACING`.
    pub fn from_timestamps(first: f64, second: f64) -> Self {
        let dt = second - first;
        if dt.is_finite() && dt > 0.0 {
            Self {
                dt,
                fallback: false,
            }
        } else {
            Self::fallback()
        }
    }

    /// Clock for traces with zero or one frame
    ///
    /// # Example
    /// ```
    /// use swarm_replay_core::{FrameClock, DEFAULT_FRAME_SPACING};
    ///
    /// let clock = FrameClock::fallback();
    /// assert_eq!(clock.dt(), DEFAULT_FRAME_SPACING);
    /// assert!(clock.is_fallback());
    /// ```
    pub fn fallback() -> Self {
        Self {
            dt: DEFAULT_FRAME_SPACING,
            fallback: true,
        }
    }

    /// Derive the clock from whatever leading timestamps are available
    pub fn from_leading(timestamps: &[f64]) -> Self {
        match timestamps {
            [first, second, ..] => Self::from_timestamps(*first, *second),
            _ => Self::fallback(),
        }
    }

    /// Spacing between frames
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Whether the spacing is the documented fallback
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    /// Number of positions a trail covering `window` time units holds
    ///
    /// `round(window / dt)`, clamped to at least one entry.
    pub fn trail_capacity(&self, window: f64) -> usize {
        let frames = (window / self.dt).round();
        if frames.is_finite() && frames >= 1.0 {
            frames as usize
        } else {
            1
        }
    }

    /// Video frame rate that plays the trace back in real trace time
    ///
    /// `floor(1 / dt)`, clamped to at least one frame per second. A tiny
    /// tolerance keeps spacings like `0.30000000000000004 - 0.2` at 10 fps.
    pub fn fps(&self) -> u32 {
        let fps = (1.0 / self.dt + FPS_TOLERANCE).floor();
        if fps.is_finite() && fps >= 1.0 {
            fps.min(u32::MAX as f64) as u32
        } else {
            1
        }
    }

    /// Nominal interval between frames in milliseconds
    pub fn interval_ms(&self) -> f64 {
        self.dt * 1000.0
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::fallback()
    }
}
