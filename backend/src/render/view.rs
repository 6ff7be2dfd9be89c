//! Immutable per-frame descriptions of every drawable entity
//!
//! The renderer produces a `FrameView`; a rendering backend applies it to
//! whatever stateful drawables its graphics library uses. Nothing in here
//! knows about pixels.

use crate::models::frame::{AgentId, TraceFrame};
use crate::models::position::Position;
use crate::models::scenario::{Task, TaskId};
use crate::render::classify::TaskPhase;
use crate::render::palette::{agent_color, Rgb, BLACK};
use serde::{Deserialize, Serialize};

/// Marker size of an ordinary agent
pub const BASE_MARKER_SIZE: f64 = 6.0;
/// Marker size of the current leader
pub const LEADER_MARKER_SIZE: f64 = 10.0;

const ALIVE_MARKER_ALPHA: f64 = 1.0;
const DEAD_MARKER_ALPHA: f64 = 0.2;
const ALIVE_TRAIL_ALPHA: f64 = 0.3;
const DEAD_TRAIL_ALPHA: f64 = 0.1;
const TRAIL_WIDTH: u32 = 1;

/// Vertical offset of a task label above the task, in area units
pub const TASK_LABEL_OFFSET: f64 = 5.0;
/// Opacity of the cross marking a task's exact position
pub const TASK_CROSS_ALPHA: f64 = 0.2;

// ============================================================================
// Leader Banner
// ============================================================================

/// Two-state leader banner, re-evaluated every frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaderBanner {
    Active { id: AgentId, term: u64 },
    Reelecting,
}

impl LeaderBanner {
    /// Banner for a frame; no memory of earlier leaders
    pub fn from_frame(frame: &TraceFrame) -> Self {
        match frame.leader_id() {
            Some(id) => LeaderBanner::Active {
                id,
                term: frame.leader_term(),
            },
            None => LeaderBanner::Reelecting,
        }
    }

    pub fn text(&self) -> String {
        match self {
            LeaderBanner::Active { id, term } => {
                format!("Current Leader: Agent {id} (Term {term})")
            }
            LeaderBanner::Reelecting => "Leader: RE-ELECTING...".to_string(),
        }
    }

    pub fn is_reelecting(&self) -> bool {
        matches!(self, LeaderBanner::Reelecting)
    }
}

// ============================================================================
// Agents
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerShape {
    Circle,
    Diamond,
}

/// Visual state of one agent marker and its trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentVisual {
    /// Agent index; binds the agent to its colour and legend entry
    pub index: usize,
    pub label: String,
    pub color: Rgb,

    /// `None` until the agent first appears in a frame
    pub position: Option<Position>,
    pub alive: bool,
    pub is_leader: bool,
    pub shape: MarkerShape,
    pub marker_size: f64,
    pub marker_alpha: f64,

    /// Trail points, oldest first
    pub trail: Vec<Position>,
    pub trail_alpha: f64,
    pub trail_width: u32,
}

impl AgentVisual {
    /// Agent that has not appeared in any frame yet
    pub fn unseen(index: usize) -> Self {
        Self {
            index,
            label: format!("Agent {index}"),
            color: agent_color(index),
            position: None,
            alive: true,
            is_leader: false,
            shape: MarkerShape::Circle,
            marker_size: BASE_MARKER_SIZE,
            marker_alpha: ALIVE_MARKER_ALPHA,
            trail: Vec::new(),
            trail_alpha: ALIVE_TRAIL_ALPHA,
            trail_width: TRAIL_WIDTH,
        }
    }

    /// Agent as reported by the current frame
    pub fn observed(
        index: usize,
        position: Position,
        alive: bool,
        is_leader: bool,
        trail: Vec<Position>,
    ) -> Self {
        let (shape, marker_size) = if is_leader {
            (MarkerShape::Diamond, LEADER_MARKER_SIZE)
        } else {
            (MarkerShape::Circle, BASE_MARKER_SIZE)
        };
        let (marker_alpha, trail_alpha) = if alive {
            (ALIVE_MARKER_ALPHA, ALIVE_TRAIL_ALPHA)
        } else {
            (DEAD_MARKER_ALPHA, DEAD_TRAIL_ALPHA)
        };

        Self {
            position: Some(position),
            alive,
            is_leader,
            shape,
            marker_size,
            marker_alpha,
            trail,
            trail_alpha,
            ..Self::unseen(index)
        }
    }
}

// ============================================================================
// Tasks
// ============================================================================

/// Visual state of one task marker and its label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskVisual {
    pub id: TaskId,
    pub phase: TaskPhase,
    pub position: Position,

    /// Service radius, in area units
    pub radius: f64,
    pub marker_color: Rgb,
    pub marker_alpha: f64,
    pub cross_alpha: f64,

    pub label: String,
    pub label_position: Position,
    pub label_color: Rgb,
    pub label_alpha: f64,
}

impl TaskVisual {
    pub fn new(task: &Task, phase: TaskPhase, radius: f64) -> Self {
        Self {
            id: task.id(),
            phase,
            position: task.position(),
            radius,
            marker_color: phase.marker_color(),
            marker_alpha: phase.marker_alpha(),
            cross_alpha: TASK_CROSS_ALPHA,
            label: format!("T{}", task.id()),
            label_position: task.position().offset(0.0, TASK_LABEL_OFFSET),
            label_color: BLACK,
            label_alpha: phase.label_alpha(),
        }
    }
}

/// Number of tasks in each phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PhaseCounts {
    pub inactive: usize,
    pub pending: usize,
    pub completed: usize,
    pub missed: usize,
}

impl PhaseCounts {
    pub fn add(&mut self, phase: TaskPhase) {
        match phase {
            TaskPhase::Inactive => self.inactive += 1,
            TaskPhase::Pending => self.pending += 1,
            TaskPhase::Completed => self.completed += 1,
            TaskPhase::Missed => self.missed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.inactive + self.pending + self.completed + self.missed
    }
}

// ============================================================================
// Frame View
// ============================================================================

/// Everything a backend needs to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameView {
    pub t: f64,
    pub leader: LeaderBanner,

    /// One entry per agent index, in index order
    pub agents: Vec<AgentVisual>,

    /// One entry per scenario task, in scenario order
    pub tasks: Vec<TaskVisual>,
}

impl FrameView {
    pub fn time_text(&self) -> String {
        format!("Time: {:.1}s", self.t)
    }

    pub fn leader_text(&self) -> String {
        self.leader.text()
    }

    pub fn task(&self, id: TaskId) -> Option<&TaskVisual> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn agent(&self, index: usize) -> Option<&AgentVisual> {
        self.agents.get(index)
    }

    pub fn phase_counts(&self) -> PhaseCounts {
        let mut counts = PhaseCounts::default();
        for task in &self.tasks {
            counts.add(task.phase);
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_text() {
        let active = LeaderBanner::Active { id: 3, term: 7 };
        assert_eq!(active.text(), "Current Leader: Agent 3 (Term 7)");
        assert_eq!(LeaderBanner::Reelecting.text(), "Leader: RE-ELECTING...");
    }

    #[test]
    fn test_dead_trail_is_dimmer_than_alive() {
        let alive = AgentVisual::observed(0, Position::default(), true, false, Vec::new());
        let dead = AgentVisual::observed(0, Position::default(), false, false, Vec::new());
        assert!(dead.trail_alpha < alive.trail_alpha);
        assert!(dead.marker_alpha < alive.marker_alpha);
        assert!(dead.trail_alpha < dead.marker_alpha);
    }

    #[test]
    fn test_time_text_has_one_decimal() {
        let view = FrameView {
            t: 12.345,
            leader: LeaderBanner::Reelecting,
            agents: Vec::new(),
            tasks: Vec::new(),
        };
        assert_eq!(view.time_text(), "Time: 12.3s");
    }
}
