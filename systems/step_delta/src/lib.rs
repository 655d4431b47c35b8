#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Step delta system that applies recorded edge events to the board.
//!
//! Events are indexed by the exact step they were recorded at and applied
//! once. Seeking anywhere other than the next step replays every event from
//! step zero on a copy of the reconciled baseline, then emits only the
//! difference against the edges currently on screen.

use std::collections::BTreeMap;

use flash_point_core::{BarrierKind, EdgeKey, GridError, RenderCommand, StepEvent, Timeline};
use flash_point_world::{query, Board, EdgeLookupError};

/// Reason an event could not be applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The event does not describe a valid edge.
    Invalid(GridError),
    /// The edge is not in the renderable set.
    Lookup(EdgeLookupError),
}

/// Event that was skipped while applying a step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedEvent {
    /// The offending event.
    pub event: StepEvent,
    /// Why it was skipped.
    pub reason: SkipReason,
}

/// Outcome of applying the events of a single step.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Edges removed from the renderable set, in event order.
    pub removed: Vec<(EdgeKey, BarrierKind)>,
    /// Events that were logged and skipped.
    pub skipped: Vec<SkippedEvent>,
}

/// Applies the events recorded at `step` against the board.
///
/// Destroyed walls, destroyed doors and opened doors all remove their edge.
/// Lookup misses are logged and skipped.
pub fn apply_events(board: &mut Board, step: usize, events: &[StepEvent]) -> ApplyReport {
    let mut report = ApplyReport::default();
    for event in events {
        let key = match event.edge_key() {
            Ok(key) => key,
            Err(error) => {
                tracing::warn!(step, event = event.label(), %error, "skipping invalid edge event");
                report.skipped.push(SkippedEvent {
                    event: *event,
                    reason: SkipReason::Invalid(error),
                });
                continue;
            }
        };

        match board.remove_edge(key) {
            Ok(kind) => report.removed.push((key, kind)),
            Err(error) => {
                if let EdgeLookupError::AlreadyRemoved(_) = error {
                    tracing::debug!(step, event = event.label(), %error, "edge already removed");
                } else {
                    tracing::warn!(step, event = event.label(), %error, "edge lookup missed");
                }
                report.skipped.push(SkippedEvent {
                    event: *event,
                    reason: SkipReason::Lookup(error),
                });
            }
        }
    }
    report
}

/// Tracks the edges on screen and moves them between steps.
#[derive(Clone, Debug)]
pub struct StepDelta {
    baseline: Board,
    current: Board,
    shown: Option<usize>,
}

impl StepDelta {
    /// Creates the system from the freshly reconciled board.
    #[must_use]
    pub fn new(baseline: Board) -> Self {
        Self {
            current: baseline.clone(),
            baseline,
            shown: None,
        }
    }

    /// Board state matching the edges currently on screen.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.current
    }

    /// Step whose events were last applied, if any.
    #[must_use]
    pub fn shown_step(&self) -> Option<usize> {
        self.shown
    }

    /// Brings the displayed edges to the state after `step`.
    ///
    /// The step is clamped to the timeline. Advancing by exactly one step
    /// applies that step's events; any other jump replays from step zero.
    pub fn seek(&mut self, timeline: &Timeline, step: usize, out: &mut Vec<RenderCommand>) {
        let Some(target) = timeline.clamp(step) else {
            return;
        };
        if self.shown == Some(target) {
            return;
        }

        let next_in_sequence = self.shown.map(|shown| shown + 1) == Some(target);
        if next_in_sequence {
            let report = apply_events(&mut self.current, target, timeline.events_at(target));
            for (key, _) in report.removed {
                out.push(remove_command(&self.current, key));
            }
        } else {
            let mut replayed = self.baseline.clone();
            for past in 0..=target {
                let _ = apply_events(&mut replayed, past, timeline.events_at(past));
            }
            diff_edges(&self.current, &replayed, out);
            self.current = replayed;
        }

        tracing::debug!(step = target, "edges updated");
        self.shown = Some(target);
    }
}

/// Emits the commands that turn the edges of `before` into those of `after`.
pub fn diff_edges(before: &Board, after: &Board, out: &mut Vec<RenderCommand>) {
    let shown: BTreeMap<EdgeKey, BarrierKind> = query::renderable_edges(before).collect();
    let wanted: BTreeMap<EdgeKey, BarrierKind> = query::renderable_edges(after).collect();

    for (key, kind) in &shown {
        if wanted.get(key) != Some(kind) {
            out.push(remove_command(before, *key));
        }
    }
    for (key, kind) in &wanted {
        if shown.get(key) != Some(kind) {
            let (cell, direction) = query::anchor(after, *key);
            out.push(RenderCommand::PlaceWallOrDoor {
                cell,
                direction,
                kind: *kind,
            });
        }
    }
}

fn remove_command(board: &Board, key: EdgeKey) -> RenderCommand {
    let (cell, direction) = query::anchor(board, key);
    RenderCommand::RemoveEdge { cell, direction }
}
