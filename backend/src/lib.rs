//! Swarm Replay Core - trace playback engine
//!
//! Replays a recorded multi-agent swarm run (a scenario plus a per-tick trace)
//! as an animated top-down video.
//!
//! # Architecture
//!
//! - **core**: Frame spacing and trail sizing
//! - **models**: Domain types (Scenario, Task, TraceFrame, HistoryBuffer)
//! - **trace**: Restartable trace reader for both on-disk layouts
//! - **render**: Task phase rule and the per-frame rendering state machine
//! - **playback**: Driver loop, rasterizer and ffmpeg encoder
//!
//! # Critical Invariants
//!
//! 1. Frames are applied strictly in trace order, one at a time
//! 2. Trail length never exceeds the capacity fixed at start-up
//! 3. A task shows exactly one phase per frame

// Module declarations
pub mod core;
pub mod models;
pub mod playback;
pub mod render;
pub mod trace;

// Re-exports for convenience
pub use crate::core::clock::{FrameClock, DEFAULT_FRAME_SPACING, TRAIL_WINDOW};
pub use models::{
    frame::{AgentId, AgentState, LeaderInfo, TaskStatus, TraceFrame},
    history::HistoryBuffer,
    position::Position,
    scenario::{Area, Scenario, ScenarioError, Task, TaskId, DEFAULT_SERVICE_RADIUS},
};
pub use playback::{
    FrameSink, PlaybackConfig, PlaybackDriver, PlaybackError, PlaybackSummary, PlaybackTiming,
    SceneLayout, VideoSink,
};
pub use render::{
    classify::{classify, classify_task, TaskPhase},
    palette::{agent_color, Rgb},
    renderer::FrameRenderer,
    view::{AgentVisual, FrameView, LeaderBanner, MarkerShape, PhaseCounts, TaskVisual},
};
pub use trace::{TraceError, TraceFormat, TraceStream};
