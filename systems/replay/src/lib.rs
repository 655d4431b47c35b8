#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Replay session that turns step changes into rendering commands.
//!
//! The session owns every piece of mutable display state: the edges on screen,
//! the marker set, agent positions and counter readouts. It is driven from a
//! single update cycle; callers hand it a step and receive the commands that
//! bring the scene to that step.

use flash_point_core::{Marker, RenderCommand, Timeline};
use flash_point_system_bootstrap::Bootstrap;
use flash_point_system_markers::{Agents, Counters, MarkerSet, Markers};
use flash_point_system_step_delta::StepDelta;
use flash_point_world::Board;

/// One replay of a simulation transcript over a reconciled board.
#[derive(Debug)]
pub struct Replay {
    timeline: Timeline,
    initial_markers: Vec<Marker>,
    edges: StepDelta,
    markers: Markers,
    agents: Agents,
    counters: Counters,
    started: bool,
    current: Option<usize>,
}

impl Replay {
    /// Creates a replay from the reconciled board, its initial markers and the
    /// recorded steps.
    #[must_use]
    pub fn new(board: Board, initial_markers: Vec<Marker>, timeline: Timeline) -> Self {
        Self {
            timeline,
            initial_markers,
            edges: StepDelta::new(board),
            markers: Markers::default(),
            agents: Agents::default(),
            counters: Counters::default(),
            started: false,
            current: None,
        }
    }

    /// Recorded steps.
    #[must_use]
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Board state matching what is on screen.
    #[must_use]
    pub fn board(&self) -> &Board {
        self.edges.board()
    }

    /// Step currently displayed.
    #[must_use]
    pub fn current_step(&self) -> Option<usize> {
        self.current
    }

    /// Builds the board and displays the first step.
    pub fn start(&mut self, out: &mut Vec<RenderCommand>) {
        let _ = self.show(0, out);
    }

    /// Displays the requested step, clamped to the recorded range.
    ///
    /// Returns the step actually shown, or `None` when nothing was recorded.
    pub fn show(&mut self, step: usize, out: &mut Vec<RenderCommand>) -> Option<usize> {
        self.ensure_built(out);

        let Some(target) = self.timeline.clamp(step) else {
            tracing::warn!(requested = step, "no steps recorded");
            return None;
        };
        if target != step {
            tracing::debug!(requested = step, shown = target, "step clamped");
        }

        self.edges.seek(&self.timeline, target, out);
        if let Some(frame) = self.timeline.frame(target) {
            let next: MarkerSet = frame.markers.iter().collect();
            self.markers.show(next, out);
            self.agents.show(&frame.agents, out);
            self.counters.show(frame.counters, out);
        }

        self.current = Some(target);
        Some(target)
    }

    fn ensure_built(&mut self, out: &mut Vec<RenderCommand>) {
        if self.started {
            return;
        }
        Bootstrap.build(self.edges.board(), &self.initial_markers, out);
        self.markers = Markers::with_shown(self.initial_markers.iter().collect());
        self.started = true;
        tracing::info!(steps = self.timeline.len(), "board built");
    }
}
