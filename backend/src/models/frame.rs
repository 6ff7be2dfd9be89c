//! Trace frames
//!
//! One frame is a snapshot of the swarm at time `t`:
//! - per-agent position and alive flag
//! - per-task completion flag
//! - current leader and term, or nothing while an election runs
//!
//! Frames are plain data. Anomalies inside a frame (unknown ids, missing
//! `alive` flags) are tolerated here and resolved by the renderer.

use crate::models::position::Position;
use crate::models::scenario::TaskId;
use serde::{Deserialize, Serialize};

/// Agent identifier as it appears in a trace
///
/// Signed so that out-of-range values (including negative ones) survive
/// parsing and can be skipped by the renderer instead of failing the frame.
pub type AgentId = i64;

fn default_alive() -> bool {
    true
}

/// State of one agent in one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub id: AgentId,
    pub x: f64,
    pub y: f64,

    /// Missing flags read as alive
    #[serde(default = "default_alive")]
    pub alive: bool,
}

impl AgentState {
    pub fn new(id: AgentId, position: Position, alive: bool) -> Self {
        Self {
            id,
            x: position.x,
            y: position.y,
            alive,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

/// Completion flag of one task in one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaskStatus {
    pub id: TaskId,
    #[serde(default)]
    pub done: bool,
}

/// Leader field of a frame
///
/// `{}` and `{"term": 3}` both mean "no leader": only a present `id` counts.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LeaderInfo {
    #[serde(default)]
    pub id: Option<AgentId>,
    #[serde(default)]
    pub term: Option<u64>,
}

/// One timestamped simulation frame
///
/// # Example
/// ```
/// use swarm_replay_core::{AgentState, Position, TraceFrame};
///
/// let frame = TraceFrame::new(2.5)
///     .with_agent(AgentState::new(0, Position::new(1.0, 2.0), true))
///     .with_task(7, false)
///     .with_leader(0, 3);
///
/// assert_eq!(frame.leader_id(), Some(0));
/// assert_eq!(frame.leader_term(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceFrame {
    pub t: f64,
    #[serde(default)]
    pub agents: Vec<AgentState>,
    #[serde(default)]
    pub tasks: Vec<TaskStatus>,
    #[serde(default)]
    pub leader: Option<LeaderInfo>,
}

impl TraceFrame {
    /// Empty frame at time `t` with no leader
    pub fn new(t: f64) -> Self {
        Self {
            t,
            agents: Vec::new(),
            tasks: Vec::new(),
            leader: None,
        }
    }

    /// Add an agent state (builder pattern)
    pub fn with_agent(mut self, agent: AgentState) -> Self {
        self.agents.push(agent);
        self
    }

    /// Add a task status (builder pattern)
    pub fn with_task(mut self, id: TaskId, done: bool) -> Self {
        self.tasks.push(TaskStatus { id, done });
        self
    }

    /// Set the leader (builder pattern)
    pub fn with_leader(mut self, id: AgentId, term: u64) -> Self {
        self.leader = Some(LeaderInfo {
            id: Some(id),
            term: Some(term),
        });
        self
    }

    /// Current leader id; `None` while re-electing
    pub fn leader_id(&self) -> Option<AgentId> {
        self.leader.and_then(|leader| leader.id)
    }

    /// Current leader term, 0 when the frame omits it
    pub fn leader_term(&self) -> u64 {
        self.leader.and_then(|leader| leader.term).unwrap_or(0)
    }
}
