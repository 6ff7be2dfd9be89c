//! Task phase classification
//!
//! The one business rule with a subtle ordering. Checks run in this order
//! and the first match wins:
//!
//! ```text
//! 1. t < t0          -> Inactive
//! 2. done            -> Completed   (even at or past the deadline)
//! 3. t > deadline    -> Missed
//! 4. otherwise       -> Pending
//! ```

use crate::models::scenario::Task;
use crate::render::palette::{Rgb, FAILURE, NEUTRAL, SUCCESS};
use serde::{Deserialize, Serialize};

/// Rendered status of a task in one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskPhase {
    /// Not yet activated; marker and label are invisible
    Inactive,

    /// Activated, not done, deadline not passed
    Pending,

    /// Reported done by the trace
    Completed,

    /// Deadline passed without completion
    Missed,
}

impl TaskPhase {
    pub const ALL: [TaskPhase; 4] = [
        TaskPhase::Inactive,
        TaskPhase::Pending,
        TaskPhase::Completed,
        TaskPhase::Missed,
    ];

    pub fn marker_color(&self) -> Rgb {
        match self {
            TaskPhase::Inactive | TaskPhase::Pending => NEUTRAL,
            TaskPhase::Completed => SUCCESS,
            TaskPhase::Missed => FAILURE,
        }
    }

    /// Completed and missed share a tier; pending sits below it
    pub fn marker_alpha(&self) -> f64 {
        match self {
            TaskPhase::Inactive => 0.0,
            TaskPhase::Pending => 0.15,
            TaskPhase::Completed | TaskPhase::Missed => 0.3,
        }
    }

    pub fn label_alpha(&self) -> f64 {
        match self {
            TaskPhase::Inactive => 0.0,
            _ => 1.0,
        }
    }
}

/// Classify a task at time `t`
///
/// Pure: the result depends only on the arguments.
///
/// # Example
/// ```
/// use swarm_replay_core::{classify_task, TaskPhase};
///
/// assert_eq!(classify_task(0.0, 0.0, 10.0, false), TaskPhase::Pending);
/// assert_eq!(classify_task(11.0, 0.0, 10.0, false), TaskPhase::Missed);
/// assert_eq!(classify_task(11.0, 0.0, 10.0, true), TaskPhase::Completed);
/// ```
pub fn classify_task(t: f64, t0: f64, deadline: f64, done: bool) -> TaskPhase {
    if t < t0 {
        TaskPhase::Inactive
    } else if done {
        TaskPhase::Completed
    } else if t > deadline {
        TaskPhase::Missed
    } else {
        TaskPhase::Pending
    }
}

/// Classify using a scenario task's metadata
pub fn classify(task: &Task, t: f64, done: bool) -> TaskPhase {
    classify_task(t, task.t0(), task.deadline(), done)
}
