#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Rendering boundary for the Flash Point replay client.
//!
//! Systems produce [`RenderCommand`] batches; a [`RenderingBackend`] consumes
//! them. [`SceneModel`] keeps an in-memory picture of the scene, and
//! [`TextBackend`] writes one line per command with world-space positions
//! derived from a [`BoardLayout`].

mod text;

use std::{
    collections::{BTreeMap, BTreeSet},
    error::Error,
    fmt,
};

use anyhow::{bail, Result as AnyResult};
use flash_point_core::{
    AgentId, BarrierKind, CellCoord, Counter, Direction, MarkerKind, RenderCommand,
};
use glam::Vec2;

pub use text::{TextBackend, TextFormat};

/// Maps board coordinates into world units.
///
/// Rows run along the x axis and columns along the y axis, matching the
/// direction mapping where a row step is `Right` and a column step is `Up`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoardLayout {
    cell_size: f32,
}

impl BoardLayout {
    /// Creates a layout with the provided cell side length.
    ///
    /// Returns an error when the size is not a positive finite number.
    pub fn new(cell_size: f32) -> Result<Self, RenderingError> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(RenderingError::InvalidCellSize { cell_size });
        }
        Ok(Self { cell_size })
    }

    /// Side length of a cell in world units.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// World-space centre of a cell.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> Vec2 {
        Vec2::new(cell.row() as f32, cell.column() as f32) * self.cell_size
    }

    /// World-space midpoint of the given side of a cell.
    #[must_use]
    pub fn edge_midpoint(&self, cell: CellCoord, direction: Direction) -> Vec2 {
        let (row_offset, column_offset) = direction.offset();
        let offset = Vec2::new(row_offset as f32, column_offset as f32) * (self.cell_size / 2.0);
        self.cell_center(cell) + offset
    }
}

/// Backend that consumes rendering commands.
pub trait RenderingBackend {
    /// Applies a single command.
    fn apply(&mut self, command: &RenderCommand) -> AnyResult<()>;

    /// Applies a batch of commands in order.
    fn present(&mut self, commands: &[RenderCommand]) -> AnyResult<()> {
        for command in commands {
            self.apply(command)?;
        }
        Ok(())
    }
}

/// In-memory model of everything currently on screen.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SceneModel {
    cells: BTreeSet<CellCoord>,
    barriers: BTreeMap<(CellCoord, Direction), BarrierKind>,
    agents: BTreeMap<AgentId, CellCoord>,
    markers: BTreeSet<(MarkerKind, CellCoord)>,
    counters: BTreeMap<Counter, i64>,
}

impl SceneModel {
    /// Creates an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Placed cells.
    #[must_use]
    pub fn cells(&self) -> &BTreeSet<CellCoord> {
        &self.cells
    }

    /// Barrier anchored at the given side of a cell.
    #[must_use]
    pub fn barrier(&self, cell: CellCoord, direction: Direction) -> Option<BarrierKind> {
        self.barriers.get(&(cell, direction)).copied()
    }

    /// Number of barriers on screen.
    #[must_use]
    pub fn barrier_count(&self) -> usize {
        self.barriers.len()
    }

    /// Cell the agent is shown at.
    #[must_use]
    pub fn agent(&self, agent: AgentId) -> Option<CellCoord> {
        self.agents.get(&agent).copied()
    }

    /// Reports whether the marker is visible.
    #[must_use]
    pub fn has_marker(&self, kind: MarkerKind, cell: CellCoord) -> bool {
        self.markers.contains(&(kind, cell))
    }

    /// Number of visible markers.
    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Displayed counter value.
    #[must_use]
    pub fn counter(&self, counter: Counter) -> Option<i64> {
        self.counters.get(&counter).copied()
    }
}

impl RenderingBackend for SceneModel {
    fn apply(&mut self, command: &RenderCommand) -> AnyResult<()> {
        match *command {
            RenderCommand::PlaceCell { cell } => {
                let _ = self.cells.insert(cell);
            }
            RenderCommand::PlaceWallOrDoor {
                cell,
                direction,
                kind,
            } => {
                if let Some(existing) = self.barriers.insert((cell, direction), kind) {
                    bail!("{existing:?} already placed on the {direction} side of {cell}");
                }
            }
            RenderCommand::RemoveEdge { cell, direction } => {
                if self.barriers.remove(&(cell, direction)).is_none() {
                    bail!("nothing to remove on the {direction} side of {cell}");
                }
            }
            RenderCommand::PlaceOrMoveAgent { agent, cell } => {
                let _ = self.agents.insert(agent, cell);
            }
            RenderCommand::SetMarker {
                kind,
                cell,
                present,
            } => {
                let _ = if present {
                    self.markers.insert((kind, cell))
                } else {
                    self.markers.remove(&(kind, cell))
                };
            }
            RenderCommand::SetCounterDisplay { counter, value } => {
                let _ = self.counters.insert(counter, value);
            }
        }
        Ok(())
    }
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Cell size must be a positive finite number.
    InvalidCellSize {
        /// Provided size that failed validation.
        cell_size: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCellSize { cell_size } => {
                write!(f, "cell size must be positive (received {cell_size})")
            }
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_rejects_non_positive_cell_size() {
        for cell_size in [0.0, -3.0, f32::NAN] {
            assert!(BoardLayout::new(cell_size).is_err());
        }
    }

    #[test]
    fn edge_midpoints_sit_half_a_cell_from_the_centre() {
        let layout = BoardLayout::new(20.0).expect("valid layout");
        let cell = CellCoord::new(1, 2);

        assert_eq!(layout.cell_center(cell), Vec2::new(20.0, 40.0));
        assert_eq!(layout.edge_midpoint(cell, Direction::Right), Vec2::new(30.0, 40.0));
        assert_eq!(layout.edge_midpoint(cell, Direction::Down), Vec2::new(20.0, 30.0));
    }

    #[test]
    fn scene_rejects_removing_a_missing_barrier() {
        let mut scene = SceneModel::new();
        let result = scene.apply(&RenderCommand::RemoveEdge {
            cell: CellCoord::new(0, 0),
            direction: Direction::Up,
        });
        assert!(result.is_err());
    }

    #[test]
    fn scene_tracks_markers_and_counters() {
        let mut scene = SceneModel::new();
        let cell = CellCoord::new(3, 3);
        scene
            .present(&[
                RenderCommand::SetMarker {
                    kind: MarkerKind::Smoke,
                    cell,
                    present: true,
                },
                RenderCommand::SetCounterDisplay {
                    counter: Counter::AgentsDead,
                    value: 2,
                },
                RenderCommand::SetMarker {
                    kind: MarkerKind::Smoke,
                    cell,
                    present: false,
                },
            ])
            .expect("commands apply");

        assert!(!scene.has_marker(MarkerKind::Smoke, cell));
        assert_eq!(scene.counter(Counter::AgentsDead), Some(2));
    }
}
