//! Core timing primitives shared by the renderer and the playback driver

pub mod clock;

pub use clock::{FrameClock, DEFAULT_FRAME_SPACING, TRAIL_WINDOW};
