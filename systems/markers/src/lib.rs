#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure systems that keep markers, agents and counters in sync with the
//! current step.
//!
//! Each step carries the complete marker set, agent roster and counter values.
//! The systems here remember what is on screen and emit only the commands
//! needed to reach the next step's state.

use std::collections::{BTreeMap, BTreeSet};

use flash_point_core::{
    AgentId, AgentPlacement, CellCoord, Counter, CounterValues, Marker, RenderCommand,
};

/// Complete set of fire, smoke and POI markers for one step.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MarkerSet {
    markers: BTreeSet<Marker>,
}

impl MarkerSet {
    /// Creates an empty marker set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports whether the set contains the marker.
    #[must_use]
    pub fn contains(&self, marker: &Marker) -> bool {
        self.markers.contains(marker)
    }

    /// Number of markers in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Reports whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Iterates the markers in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }

    /// Computes the additions and removals that turn `self` into `next`.
    #[must_use]
    pub fn diff(&self, next: &MarkerSet) -> MarkerDelta {
        MarkerDelta {
            added: next.markers.difference(&self.markers).copied().collect(),
            removed: self.markers.difference(&next.markers).copied().collect(),
        }
    }
}

impl FromIterator<Marker> for MarkerSet {
    fn from_iter<T: IntoIterator<Item = Marker>>(iter: T) -> Self {
        Self {
            markers: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<&'a Marker> for MarkerSet {
    fn from_iter<T: IntoIterator<Item = &'a Marker>>(iter: T) -> Self {
        iter.into_iter().copied().collect()
    }
}

/// Difference between two marker sets.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MarkerDelta {
    /// Markers present only in the newer set.
    pub added: Vec<Marker>,
    /// Markers present only in the older set.
    pub removed: Vec<Marker>,
}

/// Marker system that diffs successive marker sets.
#[derive(Clone, Debug, Default)]
pub struct Markers {
    shown: MarkerSet,
}

impl Markers {
    /// Creates the system with the markers already on screen.
    #[must_use]
    pub fn with_shown(shown: MarkerSet) -> Self {
        Self { shown }
    }

    /// Markers currently on screen.
    #[must_use]
    pub fn shown(&self) -> &MarkerSet {
        &self.shown
    }

    /// Replaces the shown set, emitting removals before additions.
    pub fn show(&mut self, next: MarkerSet, out: &mut Vec<RenderCommand>) {
        let delta = self.shown.diff(&next);
        for marker in delta.removed {
            out.push(RenderCommand::SetMarker {
                kind: marker.kind,
                cell: marker.cell,
                present: false,
            });
        }
        for marker in delta.added {
            out.push(RenderCommand::SetMarker {
                kind: marker.kind,
                cell: marker.cell,
                present: true,
            });
        }
        self.shown = next;
    }
}

/// Agent system that places new agents and moves the ones that changed cell.
#[derive(Clone, Debug, Default)]
pub struct Agents {
    positions: BTreeMap<AgentId, CellCoord>,
}

impl Agents {
    /// Cell the agent was last shown at.
    #[must_use]
    pub fn position(&self, agent: AgentId) -> Option<CellCoord> {
        self.positions.get(&agent).copied()
    }

    /// Shows the agents recorded for a step.
    ///
    /// Agents missing from the step keep their last position.
    pub fn show(&mut self, placements: &[AgentPlacement], out: &mut Vec<RenderCommand>) {
        for placement in placements {
            let previous = self.positions.insert(placement.id, placement.cell);
            if previous != Some(placement.cell) {
                out.push(RenderCommand::PlaceOrMoveAgent {
                    agent: placement.id,
                    cell: placement.cell,
                });
            }
        }
    }
}

/// Counter system that refreshes the readouts whose value changed.
#[derive(Clone, Debug, Default)]
pub struct Counters {
    shown: Option<CounterValues>,
}

impl Counters {
    /// Values currently displayed.
    #[must_use]
    pub fn shown(&self) -> Option<CounterValues> {
        self.shown
    }

    /// Displays the counter values for a step.
    pub fn show(&mut self, values: CounterValues, out: &mut Vec<RenderCommand>) {
        for counter in Counter::ALL {
            let value = values.get(counter);
            let unchanged = self
                .shown
                .is_some_and(|shown| shown.get(counter) == value);
            if !unchanged {
                out.push(RenderCommand::SetCounterDisplay { counter, value });
            }
        }
        self.shown = Some(values);
    }
}
