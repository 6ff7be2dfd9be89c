//! Per-agent trail history
//!
//! Each agent owns a bounded FIFO of its most recent positions. The buffer
//! only ever grows from frames where the agent is alive, so a dead agent's
//! trail freezes at its last recorded extent.
//!
//! # Critical Invariants
//!
//! 1. `len(agent) <= capacity` at all times
//! 2. Entries are kept oldest first, in recording order
//! 3. Eviction is strict FIFO: the oldest entry leaves first

use crate::models::position::Position;
use std::collections::VecDeque;

/// Bounded trailing window of positions for every agent
///
/// # Example
/// ```
/// use swarm_replay_core::{HistoryBuffer, Position};
///
/// let mut history = HistoryBuffer::new(1, 2);
/// history.record(0, Position::new(0.0, 0.0));
/// history.record(0, Position::new(1.0, 0.0));
/// history.record(0, Position::new(2.0, 0.0));
///
/// assert_eq!(
///     history.snapshot(0),
///     vec![Position::new(1.0, 0.0), Position::new(2.0, 0.0)]
/// );
/// ```
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    trails: Vec<VecDeque<Position>>,
    capacity: usize,
}

impl HistoryBuffer {
    /// Create empty trails for `num_agents` agents
    ///
    /// Trails grow on demand; `capacity` only bounds them.
    ///
    /// # Panics
    /// Panics if `capacity` is zero
    pub fn new(num_agents: usize, capacity: usize) -> Self {
        assert!(capacity > 0, "history capacity must be positive");
        Self {
            trails: vec![VecDeque::new(); num_agents],
            capacity,
        }
    }

    /// Append a position, evicting the oldest entry when full
    ///
    /// Returns false (and records nothing) for an unknown agent index.
    pub fn record(&mut self, agent: usize, position: Position) -> bool {
        let Some(trail) = self.trails.get_mut(agent) else {
            return false;
        };
        if trail.len() == self.capacity {
            trail.pop_front();
        }
        trail.push_back(position);
        true
    }

    /// Positions for one agent, oldest first
    pub fn snapshot(&self, agent: usize) -> Vec<Position> {
        self.trails
            .get(agent)
            .map(|trail| trail.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn len(&self, agent: usize) -> usize {
        self.trails.get(agent).map_or(0, VecDeque::len)
    }

    pub fn is_empty(&self, agent: usize) -> bool {
        self.len(agent) == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn num_agents(&self) -> usize {
        self.trails.len()
    }
}
