//! Frame Renderer
//!
//! Turns one trace frame into a `FrameView`. Called once per frame, in
//! trace order, by a single owner.
//!
//! # Per-frame pass
//!
//! ```text
//! For each frame:
//! 1. Leader banner from the frame's leader field (no carry-over)
//! 2. Agents: record alive positions, derive marker and trail visuals
//! 3. Tasks: classify every task the frame mentions
//! 4. Assemble the view from the latest agent and task state
//! ```
//!
//! # State kept between frames
//!
//! - The history buffer (trails)
//! - The last visual of each agent, for agents a frame does not mention
//! - The last phase of each task, for tasks a frame does not mention
//!
//! Agent ids outside `0..num_agents` and task ids unknown to the scenario are
//! skipped without failing the frame.

use crate::core::clock::{FrameClock, TRAIL_WINDOW};
use crate::models::frame::{AgentId, TraceFrame};
use crate::models::history::HistoryBuffer;
use crate::models::scenario::Scenario;
use crate::render::classify::{classify, TaskPhase};
use crate::render::view::{AgentVisual, FrameView, LeaderBanner, TaskVisual};
use tracing::trace;

/// Stateful per-run renderer
///
/// # Example
/// ```
/// use swarm_replay_core::{
///     AgentState, FrameClock, FrameRenderer, Position, Scenario, TaskPhase, TraceFrame,
/// };
///
/// let scenario = Scenario::from_json_str(
///     r#"{"area":[0,100,0,100],"num_agents":1,
///         "tasks":[{"id":1,"x":5,"y":5,"t0":0,"deadline":10}]}"#,
/// ).unwrap();
/// let mut renderer = FrameRenderer::new(&scenario, &FrameClock::from_timestamps(0.0, 1.0));
///
/// let frame = TraceFrame::new(0.0)
///     .with_agent(AgentState::new(0, Position::new(1.0, 1.0), true))
///     .with_task(1, false);
/// let view = renderer.render(&frame);
///
/// assert_eq!(view.task(1).unwrap().phase, TaskPhase::Pending);
/// assert!(view.leader.is_reelecting());
/// ```
#[derive(Debug, Clone)]
pub struct FrameRenderer<'a> {
    scenario: &'a Scenario,
    history: HistoryBuffer,

    /// Last known visual per agent index
    agents: Vec<AgentVisual>,

    /// Last known phase per scenario task, in scenario order
    task_phases: Vec<TaskPhase>,

    frames_rendered: usize,
}

impl<'a> FrameRenderer<'a> {
    /// Renderer whose trails cover the default 60 time units
    pub fn new(scenario: &'a Scenario, clock: &FrameClock) -> Self {
        Self::with_trail_window(scenario, clock, TRAIL_WINDOW)
    }

    /// Renderer whose trails cover `window` time units
    pub fn with_trail_window(scenario: &'a Scenario, clock: &FrameClock, window: f64) -> Self {
        let num_agents = scenario.num_agents();
        Self {
            scenario,
            history: HistoryBuffer::new(num_agents, clock.trail_capacity(window)),
            agents: (0..num_agents).map(AgentVisual::unseen).collect(),
            task_phases: vec![TaskPhase::Inactive; scenario.tasks().len()],
            frames_rendered: 0,
        }
    }

    /// Apply one frame and describe every entity
    pub fn render(&mut self, frame: &TraceFrame) -> FrameView {
        let leader = LeaderBanner::from_frame(frame);
        self.update_agents(frame);
        self.update_tasks(frame);
        self.frames_rendered += 1;

        FrameView {
            t: frame.t,
            leader,
            agents: self.agent_visuals(),
            tasks: self.task_visuals(),
        }
    }

    fn update_agents(&mut self, frame: &TraceFrame) {
        let leader_id = frame.leader_id();
        for state in &frame.agents {
            let Some(index) = self.agent_index(state.id) else {
                trace!(agent = state.id, t = frame.t, "skipping out-of-range agent id");
                continue;
            };

            let position = state.position();
            if state.alive {
                self.history.record(index, position);
            }

            self.agents[index] = AgentVisual::observed(
                index,
                position,
                state.alive,
                leader_id == Some(state.id),
                Vec::new(),
            );
        }
    }

    fn update_tasks(&mut self, frame: &TraceFrame) {
        for status in &frame.tasks {
            let Some(index) = self.scenario.task_index(status.id) else {
                trace!(task = status.id, t = frame.t, "skipping unknown task id");
                continue;
            };
            let task = &self.scenario.tasks()[index];
            self.task_phases[index] = classify(task, frame.t, status.done);
        }
    }

    /// Stored visuals carry no trail; it is copied out of the history once per frame
    fn agent_visuals(&self) -> Vec<AgentVisual> {
        self.agents
            .iter()
            .map(|agent| AgentVisual {
                trail: self.history.snapshot(agent.index),
                ..agent.clone()
            })
            .collect()
    }

    fn task_visuals(&self) -> Vec<TaskVisual> {
        let radius = self.scenario.service_radius();
        self.scenario
            .tasks()
            .iter()
            .zip(&self.task_phases)
            .map(|(task, phase)| TaskVisual::new(task, *phase, radius))
            .collect()
    }

    fn agent_index(&self, id: AgentId) -> Option<usize> {
        usize::try_from(id)
            .ok()
            .filter(|&index| index < self.scenario.num_agents())
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn frames_rendered(&self) -> usize {
        self.frames_rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::frame::AgentState;
    use crate::models::position::Position;

    fn two_agent_scenario() -> Scenario {
        Scenario::from_json_str(r#"{"area":[0,10,0,10],"num_agents":2,"tasks":[]}"#).unwrap()
    }

    #[test]
    fn test_unseen_agents_have_no_position() {
        let scenario = two_agent_scenario();
        let mut renderer = FrameRenderer::new(&scenario, &FrameClock::fallback());
        let view = renderer.render(
            &TraceFrame::new(0.0).with_agent(AgentState::new(0, Position::new(1.0, 1.0), true)),
        );
        assert_eq!(view.agents.len(), 2);
        assert!(view.agents[0].position.is_some());
        assert!(view.agents[1].position.is_none());
        assert_eq!(renderer.frames_rendered(), 1);
    }

    #[test]
    fn test_trail_is_copied_only_into_the_view() {
        let scenario = two_agent_scenario();
        let mut renderer = FrameRenderer::new(&scenario, &FrameClock::fallback());
        let mut view = None;
        for i in 0..3 {
            let position = Position::new(i as f64, 0.0);
            view = Some(renderer.render(
                &TraceFrame::new(i as f64 * 0.1).with_agent(AgentState::new(0, position, true)),
            ));
        }

        let view = view.unwrap();
        assert_eq!(view.agents[0].trail.len(), 3);
        assert_eq!(view.agents[0].trail, renderer.history().snapshot(0));
        assert!(renderer.agents.iter().all(|agent| agent.trail.is_empty()));
    }

    #[test]
    fn test_negative_agent_id_is_skipped() {
        let scenario = two_agent_scenario();
        let mut renderer = FrameRenderer::new(&scenario, &FrameClock::fallback());
        let view = renderer.render(
            &TraceFrame::new(0.0).with_agent(AgentState::new(-1, Position::new(1.0, 1.0), true)),
        );
        assert!(view.agents.iter().all(|agent| agent.position.is_none()));
        assert!(renderer.history().is_empty(0));
        assert!(renderer.history().is_empty(1));
    }
}
