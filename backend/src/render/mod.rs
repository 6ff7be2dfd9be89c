//! Frame rendering state machine
//!
//! - **classify**: task phase rule (pure)
//! - **palette**: colours, independent of any graphics crate
//! - **view**: immutable per-frame entity descriptions
//! - **renderer**: applies frames in order and produces views

pub mod classify;
pub mod palette;
pub mod renderer;
pub mod view;

pub use classify::{classify, classify_task, TaskPhase};
pub use palette::{agent_color, Rgb};
pub use renderer::FrameRenderer;
pub use view::{
    AgentVisual, FrameView, LeaderBanner, MarkerShape, PhaseCounts, TaskVisual,
    BASE_MARKER_SIZE, LEADER_MARKER_SIZE,
};
