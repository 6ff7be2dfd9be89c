//! Scenario model
//!
//! Static description of a swarm run:
//! - Operating area (xmin, xmax, ymin, ymax)
//! - Number of agents
//! - Service radius drawn around every task
//! - Tasks with position, activation time (`t0`) and deadline
//!
//! A scenario is loaded once, validated, and then only read. Every structural
//! problem is reported up front as a `ScenarioError` so rendering never starts
//! on a half-valid scenario.
//!
//! # Critical Invariants
//!
//! 1. `area` has xmin < xmax and ymin < ymax
//! 2. `num_agents >= 1`
//! 3. Task ids are unique and every task has `deadline >= t0`

use crate::models::position::Position;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Service radius used when the scenario document omits one
pub const DEFAULT_SERVICE_RADIUS: f64 = 15.0;

/// Unique task identifier
pub type TaskId = u64;

/// Errors raised while loading a scenario (all fatal)
#[derive(Debug, Error, PartialEq)]
pub enum ScenarioError {
    #[error("Malformed scenario: {0}")]
    Parse(String),

    #[error("Malformed scenario: area must have exactly 4 numbers, got {0}")]
    AreaArity(usize),

    #[error("Malformed scenario: degenerate area x=[{xmin}, {xmax}] y=[{ymin}, {ymax}]")]
    DegenerateArea {
        xmin: f64,
        xmax: f64,
        ymin: f64,
        ymax: f64,
    },

    #[error("Malformed scenario: num_agents must be at least 1, got {0}")]
    NoAgents(i64),

    #[error("Malformed scenario: service_radius must be positive, got {0}")]
    InvalidServiceRadius(f64),

    #[error("Malformed scenario: task {id} has deadline {deadline} before t0 {t0}")]
    DeadlineBeforeActivation { id: TaskId, t0: f64, deadline: f64 },

    #[error("Malformed scenario: task {0} has a non-finite position or time")]
    NonFiniteTask(TaskId),

    #[error("Malformed scenario: duplicate task id {0}")]
    DuplicateTask(TaskId),

    #[error("Failed to read scenario {path}: {message}")]
    Io { path: String, message: String },
}

/// Rectangular operating area
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl Area {
    /// Build an area from the `[xmin, xmax, ymin, ymax]` document layout
    pub fn from_bounds(bounds: &[f64]) -> Result<Self, ScenarioError> {
        let [xmin, xmax, ymin, ymax] = bounds else {
            return Err(ScenarioError::AreaArity(bounds.len()));
        };
        let area = Self {
            xmin: *xmin,
            xmax: *xmax,
            ymin: *ymin,
            ymax: *ymax,
        };
        // `!(a < b)` also rejects NaN bounds
        if !(area.xmin < area.xmax) || !(area.ymin < area.ymax) {
            return Err(ScenarioError::DegenerateArea {
                xmin: area.xmin,
                xmax: area.xmax,
                ymin: area.ymin,
                ymax: area.ymax,
            });
        }
        Ok(area)
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }
}

/// A task the swarm has to service
///
/// Immutable for the whole run. Its rendered phase is derived per frame by
/// the renderer and never stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    position: Position,
    t0: f64,
    deadline: f64,
}

impl Task {
    /// Create a task
    ///
    /// # Example
    /// ```
    /// use swarm_replay_core::{Position, Task};
    ///
    /// let task = Task::new(1, Position::new(5.0, 5.0), 0.0, 10.0);
    /// assert_eq!(task.id(), 1);
    /// assert_eq!(task.deadline(), 10.0);
    /// ```
    pub fn new(id: TaskId, position: Position, t0: f64, deadline: f64) -> Self {
        Self {
            id,
            position,
            t0,
            deadline,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Activation time; the task is inactive before it
    pub fn t0(&self) -> f64 {
        self.t0
    }

    pub fn deadline(&self) -> f64 {
        self.deadline
    }

    fn validate(&self) -> Result<(), ScenarioError> {
        if !self.position.is_finite() || !self.t0.is_finite() || !self.deadline.is_finite() {
            return Err(ScenarioError::NonFiniteTask(self.id));
        }
        if self.deadline < self.t0 {
            return Err(ScenarioError::DeadlineBeforeActivation {
                id: self.id,
                t0: self.t0,
                deadline: self.deadline,
            });
        }
        Ok(())
    }
}

// ============================================================================
// Document Layout
// ============================================================================

#[derive(Debug, Deserialize)]
struct ScenarioDocument {
    #[serde(default)]
    name: String,
    area: Vec<f64>,
    #[serde(default)]
    service_radius: Option<f64>,
    num_agents: i64,
    #[serde(default)]
    tasks: Vec<TaskDocument>,
}

#[derive(Debug, Deserialize)]
struct TaskDocument {
    id: TaskId,
    x: f64,
    y: f64,
    t0: f64,
    deadline: f64,
}

// ============================================================================
// Scenario
// ============================================================================

/// Validated, read-only scenario
///
/// # Example
/// ```
/// use swarm_replay_core::Scenario;
///
/// let scenario = Scenario::from_json_str(
///     r#"{"area":[0,100,0,100],"num_agents":1,
///         "tasks":[{"id":1,"x":5,"y":5,"t0":0,"deadline":10}]}"#,
/// ).unwrap();
///
/// assert_eq!(scenario.num_agents(), 1);
/// assert_eq!(scenario.service_radius(), 15.0);
/// assert_eq!(scenario.task(1).unwrap().deadline(), 10.0);
/// ```
#[derive(Debug, Clone)]
pub struct Scenario {
    name: String,
    area: Area,
    service_radius: f64,
    num_agents: usize,

    /// Tasks in document order (drawing order)
    tasks: Vec<Task>,

    /// Task id → index into `tasks`
    task_index: HashMap<TaskId, usize>,
}

impl Scenario {
    /// Build and validate a scenario from already-parsed parts
    pub fn new(
        name: impl Into<String>,
        area: Area,
        service_radius: f64,
        num_agents: usize,
        tasks: Vec<Task>,
    ) -> Result<Self, ScenarioError> {
        Area::from_bounds(&[area.xmin, area.xmax, area.ymin, area.ymax])?;
        if num_agents == 0 {
            return Err(ScenarioError::NoAgents(0));
        }
        if !(service_radius.is_finite() && service_radius > 0.0) {
            return Err(ScenarioError::InvalidServiceRadius(service_radius));
        }

        let mut task_index = HashMap::with_capacity(tasks.len());
        for (index, task) in tasks.iter().enumerate() {
            task.validate()?;
            if task_index.insert(task.id(), index).is_some() {
                return Err(ScenarioError::DuplicateTask(task.id()));
            }
        }

        Ok(Self {
            name: name.into(),
            area,
            service_radius,
            num_agents,
            tasks,
            task_index,
        })
    }

    /// Parse a scenario document
    pub fn from_json_str(json: &str) -> Result<Self, ScenarioError> {
        let document: ScenarioDocument =
            serde_json::from_str(json).map_err(|e| ScenarioError::Parse(e.to_string()))?;
        Self::from_document(document)
    }

    /// Read and parse a scenario document from disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ScenarioError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&json)
    }

    fn from_document(document: ScenarioDocument) -> Result<Self, ScenarioError> {
        let area = Area::from_bounds(&document.area)?;
        if document.num_agents < 1 {
            return Err(ScenarioError::NoAgents(document.num_agents));
        }
        let num_agents = usize::try_from(document.num_agents)
            .map_err(|_| ScenarioError::NoAgents(document.num_agents))?;
        let tasks = document
            .tasks
            .into_iter()
            .map(|t| Task::new(t.id, Position::new(t.x, t.y), t.t0, t.deadline))
            .collect();

        Self::new(
            document.name,
            area,
            document.service_radius.unwrap_or(DEFAULT_SERVICE_RADIUS),
            num_agents,
            tasks,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn area(&self) -> Area {
        self.area
    }

    pub fn service_radius(&self) -> f64 {
        self.service_radius
    }

    pub fn num_agents(&self) -> usize {
        self.num_agents
    }

    /// Tasks in document order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// O(1) lookup by id
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.task_index.get(&id).map(|&index| &self.tasks[index])
    }

    /// Position of the task in `tasks()`, if the id is known
    pub fn task_index(&self, id: TaskId) -> Option<usize> {
        self.task_index.get(&id).copied()
    }

    /// Title shown above the rendered plot
    pub fn title(&self) -> String {
        if self.name.is_empty() {
            "Swarm Simulation".to_string()
        } else {
            format!("Swarm Simulation: {}", self.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_rejects_nan_bounds() {
        let err = Area::from_bounds(&[0.0, f64::NAN, 0.0, 1.0]).unwrap_err();
        assert!(matches!(err, ScenarioError::DegenerateArea { .. }));
    }

    #[test]
    fn test_area_extent() {
        let area = Area::from_bounds(&[0.0, 10.0, -5.0, 5.0]).unwrap();
        assert_eq!(area.width(), 10.0);
        assert_eq!(area.height(), 10.0);
    }

    #[test]
    fn test_title_without_name() {
        let scenario = Scenario::from_json_str(r#"{"area":[0,1,0,1],"num_agents":1}"#).unwrap();
        assert_eq!(scenario.title(), "Swarm Simulation");
        assert!(scenario.tasks().is_empty());
    }
}
