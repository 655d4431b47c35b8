#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board state for the Flash Point replay client.
//!
//! The board is built once from a decoded [`BoardSpec`]: entrance cells are
//! opened towards the outside, walls and doors are reconciled so both sides of
//! every edge agree, and the result is stored as a canonical edge map keyed by
//! [`EdgeKey`]. Step events later remove edges from the renderable set through
//! [`Board::remove_edge`].

use std::collections::{btree_map::Entry, BTreeMap, BTreeSet};

use flash_point_core::{
    BarrierKind, BoardSpec, CellCoord, Direction, EdgeKey, EdgeKind, GridBounds, GridError,
    WallDescriptor,
};
use thiserror::Error;

/// Errors that prevent a board from being reconciled.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    /// The board document declared no cells.
    #[error("board declares no cells")]
    Empty,
    /// The same coordinate was declared twice.
    #[error("cell {0} is declared more than once")]
    DuplicateCell(CellCoord),
    /// A door connects cells that do not share an edge.
    #[error("invalid door declaration")]
    InvalidDoor(#[source] GridError),
}

/// Recoverable failures when removing an edge from the renderable set.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum EdgeLookupError {
    /// No edge with this key exists on the board.
    #[error("no edge {0} on the board")]
    Missing(EdgeKey),
    /// The edge exists but holds neither a wall nor a door.
    #[error("edge {0} is open")]
    Open(EdgeKey),
    /// The edge was already removed.
    #[error("edge {0} was already removed")]
    AlreadyRemoved(EdgeKey),
}

/// Lifecycle state of a canonical edge.
///
/// Edges start reconciled as `Open`, `Wall` or `Door`. Walls and doors move to
/// `Removed` exactly once; there is no transition back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeState {
    /// Nothing separates the two cells.
    Open,
    /// A wall separates the two cells.
    Wall,
    /// A door separates the two cells.
    Door,
    /// The barrier that used to occupy the edge is gone.
    Removed(BarrierKind),
}

impl EdgeState {
    /// Barrier currently rendered on the edge, if any.
    #[must_use]
    pub const fn barrier(self) -> Option<BarrierKind> {
        match self {
            Self::Wall => Some(BarrierKind::Wall),
            Self::Door => Some(BarrierKind::Door),
            Self::Open | Self::Removed(_) => None,
        }
    }

    const fn slot(self) -> EdgeKind {
        match self {
            Self::Wall => EdgeKind::Wall,
            Self::Door => EdgeKind::Door,
            Self::Open | Self::Removed(_) => EdgeKind::Open,
        }
    }

    fn merge_side(self, side: EdgeKind) -> Self {
        match (self, side) {
            (Self::Door, _) | (_, EdgeKind::Door) => Self::Door,
            (Self::Wall, _) | (_, EdgeKind::Wall) => Self::Wall,
            _ => Self::Open,
        }
    }
}

/// Reconciled board with symmetric per-edge state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    bounds: GridBounds,
    cells: BTreeMap<CellCoord, WallDescriptor>,
    edges: BTreeMap<EdgeKey, EdgeState>,
}

impl Board {
    /// Reconciles the decoded board into canonical edge state.
    ///
    /// Entrance cells are opened towards the outer boundary first. Every edge
    /// then takes `Wall` when either side reports a wall, and every declared
    /// door marks its edge `Door` on both sides. Each undirected door pair is
    /// processed once, whichever cell declared it. Doors with no cell on the
    /// board are skipped.
    pub fn reconcile(spec: &BoardSpec) -> Result<Self, BoardError> {
        let bounds = GridBounds::covering(spec.cells.iter().map(|cell| cell.cell))
            .ok_or(BoardError::Empty)?;

        let mut cells = BTreeMap::new();
        for declaration in &spec.cells {
            let walls = if declaration.is_entrance {
                declaration
                    .walls
                    .with_entrance_opened(declaration.cell, bounds)
            } else {
                declaration.walls
            };
            if cells.insert(declaration.cell, walls).is_some() {
                return Err(BoardError::DuplicateCell(declaration.cell));
            }
        }

        let mut edges: BTreeMap<EdgeKey, EdgeState> = BTreeMap::new();
        for (&cell, walls) in &cells {
            for direction in Direction::ALL {
                let key = EdgeKey::from_side(cell, direction);
                let state = edges.entry(key).or_insert(EdgeState::Open);
                *state = state.merge_side(walls.get(direction));
            }
        }

        let mut processed_doors = BTreeSet::new();
        for door in &spec.doors {
            let key = EdgeKey::between(door.from, door.to).map_err(BoardError::InvalidDoor)?;
            if !cells.contains_key(&door.from) && !cells.contains_key(&door.to) {
                tracing::warn!(edge = %key, "skipping door with no cell on the board");
                continue;
            }
            if !processed_doors.insert(key) {
                tracing::debug!(edge = %key, "door already reconciled");
                continue;
            }
            let _ = edges.insert(key, EdgeState::Door);
        }

        let mut board = Self {
            bounds,
            cells,
            edges,
        };
        let keys: Vec<EdgeKey> = board.edges.keys().copied().collect();
        for key in keys {
            board.write_sides(key);
        }
        Ok(board)
    }

    /// Removes the wall or door occupying the edge from the renderable set.
    ///
    /// Both sides of the edge become open. Returns the barrier that was
    /// removed.
    pub fn remove_edge(&mut self, key: EdgeKey) -> Result<BarrierKind, EdgeLookupError> {
        let removed = match self.edges.entry(key) {
            Entry::Vacant(_) => return Err(EdgeLookupError::Missing(key)),
            Entry::Occupied(mut entry) => match entry.get().to_owned() {
                EdgeState::Open => return Err(EdgeLookupError::Open(key)),
                EdgeState::Removed(_) => return Err(EdgeLookupError::AlreadyRemoved(key)),
                EdgeState::Wall => {
                    let _ = entry.insert(EdgeState::Removed(BarrierKind::Wall));
                    BarrierKind::Wall
                }
                EdgeState::Door => {
                    let _ = entry.insert(EdgeState::Removed(BarrierKind::Door));
                    BarrierKind::Door
                }
            },
        };
        self.write_sides(key);
        Ok(removed)
    }

    fn write_sides(&mut self, key: EdgeKey) {
        let Some(state) = self.edges.get(&key).copied() else {
            return;
        };
        for (cell, direction) in key.sides() {
            if let Some(walls) = self.cells.get_mut(&cell) {
                walls.set(direction, state.slot());
            }
        }
    }
}

/// Query functions that provide read-only access to the board state.
pub mod query {
    use flash_point_core::{
        BarrierKind, CellCoord, Direction, EdgeKey, GridBounds, WallDescriptor,
    };

    use super::{Board, EdgeState};

    /// Inclusive extent of the board.
    #[must_use]
    pub fn bounds(board: &Board) -> GridBounds {
        board.bounds
    }

    /// Iterates every cell together with its reconciled descriptor in row-major order.
    pub fn cells(board: &Board) -> impl Iterator<Item = (CellCoord, WallDescriptor)> + '_ {
        board.cells.iter().map(|(cell, walls)| (*cell, *walls))
    }

    /// Reconciled descriptor of a single cell.
    #[must_use]
    pub fn descriptor(board: &Board, cell: CellCoord) -> Option<WallDescriptor> {
        board.cells.get(&cell).copied()
    }

    /// Lifecycle state of an edge.
    #[must_use]
    pub fn edge_state(board: &Board, key: EdgeKey) -> Option<EdgeState> {
        board.edges.get(&key).copied()
    }

    /// Side of the edge used to address it in rendering commands.
    ///
    /// Prefers the first side whose cell is on the board, so boundary edges
    /// are anchored at their owning cell rather than the virtual cell outside.
    #[must_use]
    pub fn anchor(board: &Board, key: EdgeKey) -> (CellCoord, Direction) {
        let sides = key.sides();
        sides
            .into_iter()
            .find(|(cell, _)| board.cells.contains_key(cell))
            .unwrap_or(sides[0])
    }

    /// Iterates every edge that currently carries a wall or door.
    pub fn renderable_edges(board: &Board) -> impl Iterator<Item = (EdgeKey, BarrierKind)> + '_ {
        board
            .edges
            .iter()
            .filter_map(|(key, state)| state.barrier().map(|kind| (*key, kind)))
    }
}

#[cfg(test)]
mod tests {
    use flash_point_core::{
        BarrierKind, BoardSpec, CellCoord, CellSpec, Direction, DoorDeclaration, EdgeKey,
        EdgeKind, WallDescriptor,
    };

    use super::{query, Board, BoardError, EdgeLookupError, EdgeState};

    fn cell(row: i32, column: i32, walls: &str) -> CellSpec {
        CellSpec {
            cell: CellCoord::new(row, column),
            walls: WallDescriptor::parse(walls).expect("valid walls"),
            is_entrance: false,
        }
    }

    #[test]
    fn one_sided_wall_is_mirrored_onto_the_neighbour() {
        let spec = BoardSpec {
            cells: vec![cell(0, 0, "0001"), cell(1, 0, "0000")],
            ..BoardSpec::default()
        };
        let board = Board::reconcile(&spec).expect("board reconciles");

        let left = query::descriptor(&board, CellCoord::new(0, 0)).expect("cell");
        let right = query::descriptor(&board, CellCoord::new(1, 0)).expect("cell");
        assert_eq!(left.get(Direction::Right), EdgeKind::Wall);
        assert_eq!(right.get(Direction::Left), EdgeKind::Wall);
    }

    #[test]
    fn empty_board_is_rejected() {
        assert_eq!(
            Board::reconcile(&BoardSpec::default()),
            Err(BoardError::Empty)
        );
    }

    #[test]
    fn duplicate_cells_are_rejected() {
        let spec = BoardSpec {
            cells: vec![cell(0, 0, "1111"), cell(0, 0, "0000")],
            ..BoardSpec::default()
        };
        assert_eq!(
            Board::reconcile(&spec),
            Err(BoardError::DuplicateCell(CellCoord::new(0, 0)))
        );
    }

    #[test]
    fn diagonal_door_is_rejected() {
        let spec = BoardSpec {
            cells: vec![cell(0, 0, "1111"), cell(1, 1, "1111")],
            doors: vec![DoorDeclaration {
                from: CellCoord::new(0, 0),
                to: CellCoord::new(1, 1),
            }],
            ..BoardSpec::default()
        };
        assert!(matches!(
            Board::reconcile(&spec),
            Err(BoardError::InvalidDoor(_))
        ));
    }

    #[test]
    fn door_with_no_cell_on_the_board_is_skipped() {
        let spec = BoardSpec {
            cells: vec![cell(0, 0, "0000")],
            doors: vec![DoorDeclaration {
                from: CellCoord::new(5, 5),
                to: CellCoord::new(5, 6),
            }],
            ..BoardSpec::default()
        };
        let board = Board::reconcile(&spec).expect("board reconciles");
        let key = EdgeKey::between(CellCoord::new(5, 5), CellCoord::new(5, 6)).expect("adjacent");

        assert_eq!(query::edge_state(&board, key), None);
        assert_eq!(query::renderable_edges(&board).count(), 0);
    }

    #[test]
    fn boundary_edges_are_anchored_on_the_board() {
        let spec = BoardSpec {
            cells: vec![cell(0, 0, "1111"), cell(1, 0, "1111")],
            ..BoardSpec::default()
        };
        let board = Board::reconcile(&spec).expect("board reconciles");

        for (key, _) in query::renderable_edges(&board) {
            let (anchor, direction) = query::anchor(&board, key);
            assert!(
                query::descriptor(&board, anchor).is_some(),
                "edge {key} anchored off the board at {anchor}"
            );
            assert_eq!(EdgeKey::from_side(anchor, direction), key);
        }
        let inner = EdgeKey::between(CellCoord::new(0, 0), CellCoord::new(1, 0)).expect("adjacent");
        assert_eq!(
            query::anchor(&board, inner),
            (CellCoord::new(0, 0), Direction::Right)
        );
    }

    #[test]
    fn removed_edges_stay_removed() {
        let spec = BoardSpec {
            cells: vec![cell(0, 0, "1111"), cell(0, 1, "1111")],
            ..BoardSpec::default()
        };
        let mut board = Board::reconcile(&spec).expect("board reconciles");
        let key = EdgeKey::between(CellCoord::new(0, 0), CellCoord::new(0, 1)).expect("adjacent");

        assert_eq!(board.remove_edge(key), Ok(BarrierKind::Wall));
        assert_eq!(
            query::edge_state(&board, key),
            Some(EdgeState::Removed(BarrierKind::Wall))
        );
        assert_eq!(board.remove_edge(key), Err(EdgeLookupError::AlreadyRemoved(key)));

        let lower = query::descriptor(&board, CellCoord::new(0, 0)).expect("cell");
        let upper = query::descriptor(&board, CellCoord::new(0, 1)).expect("cell");
        assert_eq!(lower.get(Direction::Up), EdgeKind::Open);
        assert_eq!(upper.get(Direction::Down), EdgeKind::Open);
    }

    #[test]
    fn open_and_unknown_edges_are_lookup_misses() {
        let spec = BoardSpec {
            cells: vec![cell(0, 0, "0000"), cell(1, 0, "0000")],
            ..BoardSpec::default()
        };
        let mut board = Board::reconcile(&spec).expect("board reconciles");
        let open = EdgeKey::between(CellCoord::new(0, 0), CellCoord::new(1, 0)).expect("adjacent");
        let unknown =
            EdgeKey::between(CellCoord::new(8, 8), CellCoord::new(8, 9)).expect("adjacent");

        assert_eq!(board.remove_edge(open), Err(EdgeLookupError::Open(open)));
        assert_eq!(
            board.remove_edge(unknown),
            Err(EdgeLookupError::Missing(unknown))
        );
    }
}
