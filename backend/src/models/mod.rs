//! Domain models for trace playback

pub mod frame;
pub mod history;
pub mod position;
pub mod scenario;

// Re-exports
pub use frame::{AgentId, AgentState, LeaderInfo, TaskStatus, TraceFrame};
pub use history::HistoryBuffer;
pub use position::Position;
pub use scenario::{Area, Scenario, ScenarioError, Task, TaskId, DEFAULT_SERVICE_RADIUS};
