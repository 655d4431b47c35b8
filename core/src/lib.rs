#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Flash Point replay client.
//!
//! This crate defines the vocabulary that connects the transcript adapter,
//! the authoritative board, and the pure replay systems. Adapters decode the
//! simulation documents into [`BoardSpec`] and [`Timeline`] values, the world
//! reconciles the board into canonical [`EdgeKey`] state, and systems answer
//! every step change with a batch of [`RenderCommand`] values for whichever
//! rendering backend is attached.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of directional slots carried by every cell.
pub const SLOT_COUNT: usize = 4;

/// Errors raised while interpreting grid-level input.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GridError {
    /// Two cells were expected to share an edge but do not.
    #[error("cells {from} and {to} are not orthogonally adjacent")]
    NotAdjacent {
        /// Cell the relation was declared from.
        from: CellCoord,
        /// Cell the relation was declared towards.
        to: CellCoord,
    },
    /// A wall descriptor did not consist of exactly four `0`/`1` characters.
    #[error("invalid wall descriptor `{0}`; expected four characters of `0` or `1`")]
    InvalidWallDescriptor(String),
    /// A direction label was not one of `up`, `left`, `down` or `right`.
    #[error("unknown direction `{0}`")]
    UnknownDirection(String),
    /// A point-of-interest label was not recognised.
    #[error("unknown point of interest type `{0}`")]
    UnknownPoiType(String),
}

/// Location of a single board cell expressed as row and column indices.
///
/// Ordering is row-then-column, which is the order used to canonicalise
/// edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    row: i32,
    column: i32,
}

impl CellCoord {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(row: i32, column: i32) -> Self {
        Self { row, column }
    }

    /// Row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Returns the cell adjacent to this one in the provided direction.
    ///
    /// The result may lie outside the board; boundary edges are keyed
    /// against such virtual neighbours.
    #[must_use]
    pub const fn neighbor(self, direction: Direction) -> Self {
        let (row_offset, column_offset) = direction.offset();
        Self::new(self.row + row_offset, self.column + column_offset)
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// Compass directions addressing the four slots of a cell.
///
/// Row deltas run along the horizontal axis and column deltas along the
/// vertical axis: a step of `+1` in row is `Right`, a step of `+1` in column
/// is `Up`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Slot 0, towards increasing column indices.
    Up,
    /// Slot 1, towards decreasing row indices.
    Left,
    /// Slot 2, towards decreasing column indices.
    Down,
    /// Slot 3, towards increasing row indices.
    Right,
}

impl Direction {
    /// All directions in descriptor slot order.
    pub const ALL: [Direction; SLOT_COUNT] = [
        Direction::Up,
        Direction::Left,
        Direction::Down,
        Direction::Right,
    ];

    /// Descriptor slot addressed by the direction.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Up => 0,
            Self::Left => 1,
            Self::Down => 2,
            Self::Right => 3,
        }
    }

    /// Resolves a descriptor slot back into a direction.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Up),
            1 => Some(Self::Left),
            2 => Some(Self::Down),
            3 => Some(Self::Right),
            _ => None,
        }
    }

    /// Direction facing back across the same edge.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Left => Self::Right,
            Self::Down => Self::Up,
            Self::Right => Self::Left,
        }
    }

    /// Row and column offsets of a single step in this direction.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::Up => (0, 1),
            Self::Left => (-1, 0),
            Self::Down => (0, -1),
            Self::Right => (1, 0),
        }
    }

    /// Direction of travel from `near` to an orthogonally adjacent `far`.
    pub fn between(near: CellCoord, far: CellCoord) -> Result<Self, GridError> {
        let row_delta = far.row() - near.row();
        let column_delta = far.column() - near.column();
        match (row_delta, column_delta) {
            (1, 0) => Ok(Self::Right),
            (-1, 0) => Ok(Self::Left),
            (0, 1) => Ok(Self::Up),
            (0, -1) => Ok(Self::Down),
            _ => Err(GridError::NotAdjacent {
                from: near,
                to: far,
            }),
        }
    }

    /// Lowercase label used by the simulation documents.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Left => "left",
            Self::Down => "down",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Direction {
    type Err = GridError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "left" => Ok(Self::Left),
            "down" => Ok(Self::Down),
            "right" => Ok(Self::Right),
            _ => Err(GridError::UnknownDirection(value.to_owned())),
        }
    }
}

/// State of a single directional slot of a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Nothing separates the cell from its neighbour.
    #[default]
    Open,
    /// A wall blocks the edge.
    Wall,
    /// A door occupies the edge.
    Door,
}

impl EdgeKind {
    /// Renderable barrier represented by the slot, if any.
    #[must_use]
    pub const fn barrier(self) -> Option<BarrierKind> {
        match self {
            Self::Open => None,
            Self::Wall => Some(BarrierKind::Wall),
            Self::Door => Some(BarrierKind::Door),
        }
    }
}

/// Renderable obstruction placed on an edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarrierKind {
    /// Solid wall segment.
    Wall,
    /// Door segment.
    Door,
}

impl From<BarrierKind> for EdgeKind {
    fn from(kind: BarrierKind) -> Self {
        match kind {
            BarrierKind::Wall => Self::Wall,
            BarrierKind::Door => Self::Door,
        }
    }
}

/// Four-slot wall descriptor owned by every cell, indexed by [`Direction`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct WallDescriptor {
    slots: [EdgeKind; SLOT_COUNT],
}

impl WallDescriptor {
    /// Creates a descriptor from explicit slot states.
    #[must_use]
    pub const fn new(slots: [EdgeKind; SLOT_COUNT]) -> Self {
        Self { slots }
    }

    /// Descriptor with a wall in every slot.
    #[must_use]
    pub const fn enclosed() -> Self {
        Self::new([EdgeKind::Wall; SLOT_COUNT])
    }

    /// Parses the simulation's four-character form, `1` for wall and `0` for open.
    pub fn parse(raw: &str) -> Result<Self, GridError> {
        let bytes = raw.as_bytes();
        if bytes.len() != SLOT_COUNT {
            return Err(GridError::InvalidWallDescriptor(raw.to_owned()));
        }

        let mut slots = [EdgeKind::Open; SLOT_COUNT];
        for (slot, byte) in slots.iter_mut().zip(bytes) {
            *slot = match byte {
                b'1' => EdgeKind::Wall,
                b'0' => EdgeKind::Open,
                _ => return Err(GridError::InvalidWallDescriptor(raw.to_owned())),
            };
        }
        Ok(Self { slots })
    }

    /// State of the slot facing the provided direction.
    #[must_use]
    pub const fn get(&self, direction: Direction) -> EdgeKind {
        self.slots[direction.index()]
    }

    /// Overwrites the slot facing the provided direction.
    pub fn set(&mut self, direction: Direction, kind: EdgeKind) {
        self.slots[direction.index()] = kind;
    }

    /// Slot states in descriptor order.
    #[must_use]
    pub const fn slots(&self) -> [EdgeKind; SLOT_COUNT] {
        self.slots
    }

    /// Forces every slot facing the outer boundary open.
    ///
    /// Corner cells face several boundaries; each matching slot is opened
    /// independently.
    #[must_use]
    pub fn with_entrance_opened(mut self, cell: CellCoord, bounds: GridBounds) -> Self {
        for direction in bounds.boundary_directions(cell) {
            self.set(direction, EdgeKind::Open);
        }
        self
    }
}

impl FromStr for WallDescriptor {
    type Err = GridError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl fmt::Display for WallDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for slot in self.slots {
            let symbol = match slot {
                EdgeKind::Open => '0',
                EdgeKind::Wall => '1',
                EdgeKind::Door => 'D',
            };
            write!(f, "{symbol}")?;
        }
        Ok(())
    }
}

/// Inclusive extent of the board, anchored at `(0, 0)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridBounds {
    max_row: i32,
    max_column: i32,
}

impl GridBounds {
    /// Creates bounds with the provided maximum indices.
    #[must_use]
    pub const fn new(max_row: i32, max_column: i32) -> Self {
        Self {
            max_row,
            max_column,
        }
    }

    /// Smallest bounds anchored at the origin that cover every provided cell.
    #[must_use]
    pub fn covering(cells: impl IntoIterator<Item = CellCoord>) -> Option<Self> {
        cells.into_iter().fold(None, |bounds, cell| {
            let (max_row, max_column) = match bounds {
                Some(Self {
                    max_row,
                    max_column,
                }) => (max_row.max(cell.row()), max_column.max(cell.column())),
                None => (cell.row().max(0), cell.column().max(0)),
            };
            Some(Self::new(max_row, max_column))
        })
    }

    /// Largest row index on the board.
    #[must_use]
    pub const fn max_row(&self) -> i32 {
        self.max_row
    }

    /// Largest column index on the board.
    #[must_use]
    pub const fn max_column(&self) -> i32 {
        self.max_column
    }

    /// Reports whether the cell lies within the bounds.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.row() >= 0
            && cell.column() >= 0
            && cell.row() <= self.max_row
            && cell.column() <= self.max_column
    }

    /// Directions in which the cell faces the outer boundary.
    pub fn boundary_directions(&self, cell: CellCoord) -> impl Iterator<Item = Direction> {
        let bounds = *self;
        Direction::ALL
            .into_iter()
            .filter(move |direction| match direction {
                Direction::Up => cell.column() == bounds.max_column,
                Direction::Left => cell.row() == 0,
                Direction::Down => cell.column() == 0,
                Direction::Right => cell.row() == bounds.max_row,
            })
    }
}

/// Canonical identity of the boundary shared by two adjacent cells.
///
/// The pair is stored sorted so that `(a, b)` and `(b, a)` produce the same
/// key. The direction is derived from the pair and is never part of the
/// identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeKey {
    low: CellCoord,
    high: CellCoord,
}

impl EdgeKey {
    /// Builds the key of the edge between two adjacent cells in either order.
    pub fn between(first: CellCoord, second: CellCoord) -> Result<Self, GridError> {
        let _ = Direction::between(first, second)?;
        let (low, high) = if first <= second {
            (first, second)
        } else {
            (second, first)
        };
        Ok(Self { low, high })
    }

    /// Builds the key of the edge on the given side of a cell.
    #[must_use]
    pub fn from_side(cell: CellCoord, direction: Direction) -> Self {
        let neighbor = cell.neighbor(direction);
        if cell <= neighbor {
            Self {
                low: cell,
                high: neighbor,
            }
        } else {
            Self {
                low: neighbor,
                high: cell,
            }
        }
    }

    /// Smaller cell of the pair.
    #[must_use]
    pub const fn low(&self) -> CellCoord {
        self.low
    }

    /// Larger cell of the pair.
    #[must_use]
    pub const fn high(&self) -> CellCoord {
        self.high
    }

    /// Direction of the edge relative to the smaller cell.
    ///
    /// Always `Up` or `Right`, because the larger cell sits one row or one
    /// column above the smaller one.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        if self.high.row() > self.low.row() {
            Direction::Right
        } else {
            Direction::Up
        }
    }

    /// The two sides of the edge as (cell, slot direction) pairs.
    #[must_use]
    pub const fn sides(&self) -> [(CellCoord, Direction); 2] {
        let direction = self.direction();
        [(self.low, direction), (self.high, direction.opposite())]
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{} {}", self.low, self.high, self.direction())
    }
}

/// Board mutations recorded by the simulation at a particular step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepEvent {
    /// A wall on the given side of a cell collapsed.
    WallDestroyed {
        /// Cell that reported the destruction.
        cell: CellCoord,
        /// Side of the cell the wall occupied.
        direction: Direction,
    },
    /// A door between two cells was destroyed.
    DoorDestroyed {
        /// One of the cells sharing the door.
        first: CellCoord,
        /// The other cell sharing the door.
        second: CellCoord,
    },
    /// A door between two cells was opened; rendered the same as destroyed.
    DoorOpened {
        /// One of the cells sharing the door.
        first: CellCoord,
        /// The other cell sharing the door.
        second: CellCoord,
    },
}

impl StepEvent {
    /// Canonical key of the edge the event targets.
    pub fn edge_key(&self) -> Result<EdgeKey, GridError> {
        match *self {
            Self::WallDestroyed { cell, direction } => Ok(EdgeKey::from_side(cell, direction)),
            Self::DoorDestroyed { first, second } | Self::DoorOpened { first, second } => {
                EdgeKey::between(first, second)
            }
        }
    }

    /// Short label used in diagnostics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::WallDestroyed { .. } => "wall_destroyed",
            Self::DoorDestroyed { .. } => "door_destroyed",
            Self::DoorOpened { .. } => "door_opened",
        }
    }
}

/// Classification of a point of interest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoiKind {
    /// A victim awaiting rescue.
    Victim,
    /// A point of interest that turned out to be empty.
    FalseAlarm,
}

impl PoiKind {
    /// Resolves the single-letter code used by board marker agents.
    #[must_use]
    pub fn from_marker_code(code: &str) -> Option<Self> {
        match code {
            "v" => Some(Self::Victim),
            "f" => Some(Self::FalseAlarm),
            _ => None,
        }
    }

    /// Label used by the step transcript.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Victim => "victim",
            Self::FalseAlarm => "false_alarm",
        }
    }
}

impl FromStr for PoiKind {
    type Err = GridError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "victim" => Ok(Self::Victim),
            "false_alarm" => Ok(Self::FalseAlarm),
            _ => Err(GridError::UnknownPoiType(value.to_owned())),
        }
    }
}

/// Kind of marker displayed on a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    /// Active fire.
    Fire,
    /// Smoke.
    Smoke,
    /// Point of interest tagged with its type.
    Poi(PoiKind),
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fire => f.write_str("fire"),
            Self::Smoke => f.write_str("smoke"),
            Self::Poi(kind) => write!(f, "poi:{}", kind.label()),
        }
    }
}

/// Marker placed on a specific cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Marker {
    /// Kind of marker.
    pub kind: MarkerKind,
    /// Cell carrying the marker.
    pub cell: CellCoord,
}

impl Marker {
    /// Creates a new marker.
    #[must_use]
    pub const fn new(kind: MarkerKind, cell: CellCoord) -> Self {
        Self { kind, cell }
    }
}

/// Unique identifier assigned to a rescue agent by the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates a new agent identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent-{}", self.0)
    }
}

/// Position of an agent at the end of a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AgentPlacement {
    /// Agent identifier.
    pub id: AgentId,
    /// Cell occupied by the agent.
    pub cell: CellCoord,
    /// Cell the agent is heading towards, if any.
    pub target: Option<CellCoord>,
    /// Whether the agent is carrying a victim.
    pub carrying: bool,
}

/// Scalar counters reported by the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Counter {
    /// Structural damage the building can still absorb.
    StructuralDamageLeft,
    /// Victims lost.
    VictimsDead,
    /// Agents lost.
    AgentsDead,
    /// Victims carried to safety.
    SavedLives,
}

impl Counter {
    /// All counters in display order.
    pub const ALL: [Counter; 4] = [
        Counter::StructuralDamageLeft,
        Counter::SavedLives,
        Counter::VictimsDead,
        Counter::AgentsDead,
    ];

    /// Key of the counter's series in the step transcript.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::StructuralDamageLeft => "structural_damage_left",
            Self::VictimsDead => "victims_dead",
            Self::AgentsDead => "agents_dead",
            Self::SavedLives => "saved_lifes",
        }
    }

    const fn slot(self) -> usize {
        match self {
            Self::StructuralDamageLeft => 0,
            Self::VictimsDead => 1,
            Self::AgentsDead => 2,
            Self::SavedLives => 3,
        }
    }
}

/// Counter values recorded for one step. Missing values read as zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CounterValues {
    values: [i64; 4],
}

impl CounterValues {
    /// Value recorded for the counter.
    #[must_use]
    pub const fn get(&self, counter: Counter) -> i64 {
        self.values[counter.slot()]
    }

    /// Records a value for the counter.
    pub fn set(&mut self, counter: Counter, value: i64) {
        self.values[counter.slot()] = value;
    }
}

/// Everything the simulation recorded for a single step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepFrame {
    /// Agent positions at the end of the step.
    pub agents: Vec<AgentPlacement>,
    /// Complete fire, smoke and POI marker set for the step.
    pub markers: Vec<Marker>,
    /// Counter values for the step.
    pub counters: CounterValues,
    /// Edge events recorded during the step.
    pub events: Vec<StepEvent>,
}

/// Ordered simulation history indexed by step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Timeline {
    frames: Vec<StepFrame>,
}

impl Timeline {
    /// Creates a timeline from frames ordered by step index.
    #[must_use]
    pub fn new(frames: Vec<StepFrame>) -> Self {
        Self { frames }
    }

    /// Number of recorded steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Reports whether the timeline holds no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frame recorded for the step, if present.
    #[must_use]
    pub fn frame(&self, step: usize) -> Option<&StepFrame> {
        self.frames.get(step)
    }

    /// Edge events recorded at exactly the provided step.
    #[must_use]
    pub fn events_at(&self, step: usize) -> &[StepEvent] {
        self.frames
            .get(step)
            .map_or(&[], |frame| frame.events.as_slice())
    }

    /// Clamps a requested step into the recorded range.
    ///
    /// Returns `None` for an empty timeline.
    #[must_use]
    pub fn clamp(&self, step: usize) -> Option<usize> {
        self.last_step().map(|last| step.min(last))
    }

    /// Index of the final recorded step.
    #[must_use]
    pub fn last_step(&self) -> Option<usize> {
        self.frames.len().checked_sub(1)
    }
}

/// Cell declaration taken from the initial board document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellSpec {
    /// Location of the cell.
    pub cell: CellCoord,
    /// Raw wall descriptor before any adjustment.
    pub walls: WallDescriptor,
    /// Whether the cell is an entrance to the building.
    pub is_entrance: bool,
}

/// One-sided door declaration attached to a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DoorDeclaration {
    /// Cell carrying the declaration.
    pub from: CellCoord,
    /// Cell on the other side of the door.
    pub to: CellCoord,
}

/// Decoded initial board prior to reconciliation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoardSpec {
    /// Every cell on the board.
    pub cells: Vec<CellSpec>,
    /// Door declarations in document order.
    pub doors: Vec<DoorDeclaration>,
    /// Markers present before the first step.
    pub markers: Vec<Marker>,
}

/// Operations crossing the rendering boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RenderCommand {
    /// Places the floor of a cell.
    PlaceCell {
        /// Cell to place.
        cell: CellCoord,
    },
    /// Places a wall or door on the given side of a cell.
    PlaceWallOrDoor {
        /// Cell anchoring the edge.
        cell: CellCoord,
        /// Side of the cell the barrier occupies.
        direction: Direction,
        /// Barrier to place.
        kind: BarrierKind,
    },
    /// Removes whatever barrier occupies the given side of a cell.
    RemoveEdge {
        /// Cell anchoring the edge.
        cell: CellCoord,
        /// Side of the cell to clear.
        direction: Direction,
    },
    /// Places an agent avatar, or moves it if already present.
    PlaceOrMoveAgent {
        /// Agent to place.
        agent: AgentId,
        /// Cell the agent occupies.
        cell: CellCoord,
    },
    /// Shows or hides a marker.
    SetMarker {
        /// Kind of marker.
        kind: MarkerKind,
        /// Cell carrying the marker.
        cell: CellCoord,
        /// Whether the marker is visible.
        present: bool,
    },
    /// Updates a counter readout.
    SetCounterDisplay {
        /// Counter to update.
        counter: Counter,
        /// Value to display.
        value: i64,
    },
}

#[cfg(test)]
mod tests {
    use super::{
        CellCoord, Direction, EdgeKey, EdgeKind, GridBounds, GridError, StepEvent, Timeline,
        WallDescriptor,
    };

    #[test]
    fn direction_mapping_follows_row_and_column_deltas() {
        let near = CellCoord::new(2, 2);
        assert_eq!(Direction::between(near, CellCoord::new(3, 2)), Ok(Direction::Right));
        assert_eq!(Direction::between(near, CellCoord::new(1, 2)), Ok(Direction::Left));
        assert_eq!(Direction::between(near, CellCoord::new(2, 3)), Ok(Direction::Up));
        assert_eq!(Direction::between(near, CellCoord::new(2, 1)), Ok(Direction::Down));
    }

    #[test]
    fn diagonal_and_distant_cells_are_rejected() {
        let near = CellCoord::new(2, 2);
        for far in [
            CellCoord::new(3, 3),
            CellCoord::new(2, 4),
            CellCoord::new(2, 2),
        ] {
            assert_eq!(
                Direction::between(near, far),
                Err(GridError::NotAdjacent { from: near, to: far }),
            );
        }
    }

    #[test]
    fn opposite_is_an_involution() {
        for direction in Direction::ALL {
            assert_ne!(direction.opposite(), direction);
            assert_eq!(direction.opposite().opposite(), direction);
            assert_eq!(Direction::from_index(direction.index()), Some(direction));
        }
    }

    #[test]
    fn neighbor_round_trips_through_between() {
        let origin = CellCoord::new(4, 1);
        for direction in Direction::ALL {
            let neighbor = origin.neighbor(direction);
            assert_eq!(Direction::between(origin, neighbor), Ok(direction));
        }
    }

    #[test]
    fn edge_key_ignores_argument_order() {
        let a = CellCoord::new(1, 2);
        let b = CellCoord::new(1, 3);
        let forward = EdgeKey::between(a, b).expect("adjacent");
        let backward = EdgeKey::between(b, a).expect("adjacent");
        assert_eq!(forward, backward);
        assert_eq!(forward.low(), a);
        assert_eq!(forward.direction(), Direction::Up);
    }

    #[test]
    fn side_keys_match_pair_keys_from_both_cells() {
        let a = CellCoord::new(3, 0);
        let b = CellCoord::new(4, 0);
        let pair = EdgeKey::between(a, b).expect("adjacent");
        assert_eq!(EdgeKey::from_side(a, Direction::Right), pair);
        assert_eq!(EdgeKey::from_side(b, Direction::Left), pair);
        assert_eq!(pair.sides(), [(a, Direction::Right), (b, Direction::Left)]);
    }

    #[test]
    fn wall_descriptor_parses_simulation_strings() {
        let descriptor = WallDescriptor::parse("1001").expect("valid descriptor");
        assert_eq!(descriptor.get(Direction::Up), EdgeKind::Wall);
        assert_eq!(descriptor.get(Direction::Left), EdgeKind::Open);
        assert_eq!(descriptor.get(Direction::Down), EdgeKind::Open);
        assert_eq!(descriptor.get(Direction::Right), EdgeKind::Wall);
        assert_eq!(descriptor.to_string(), "1001");
    }

    #[test]
    fn wall_descriptor_rejects_malformed_input() {
        for raw in ["", "101", "10101", "10x1"] {
            assert!(
                WallDescriptor::parse(raw).is_err(),
                "`{raw}` should not parse as a wall descriptor"
            );
        }
    }

    #[test]
    fn corner_entrance_opens_every_boundary_slot() {
        let bounds = GridBounds::new(7, 5);
        let corner = CellCoord::new(0, 0);
        let opened = WallDescriptor::enclosed().with_entrance_opened(corner, bounds);
        assert_eq!(opened.get(Direction::Left), EdgeKind::Open);
        assert_eq!(opened.get(Direction::Down), EdgeKind::Open);
        assert_eq!(opened.get(Direction::Up), EdgeKind::Wall);
        assert_eq!(opened.get(Direction::Right), EdgeKind::Wall);
    }

    #[test]
    fn bounds_cover_all_cells() {
        let bounds = GridBounds::covering([
            CellCoord::new(0, 0),
            CellCoord::new(3, 1),
            CellCoord::new(1, 5),
        ])
        .expect("non-empty");
        assert_eq!(bounds, GridBounds::new(3, 5));
        assert!(GridBounds::covering([]).is_none());
    }

    #[test]
    fn non_adjacent_door_event_has_no_key() {
        let event = StepEvent::DoorDestroyed {
            first: CellCoord::new(0, 0),
            second: CellCoord::new(1, 1),
        };
        assert!(event.edge_key().is_err());
    }

    #[test]
    fn timeline_clamps_requested_steps() {
        let timeline = Timeline::new(vec![Default::default(); 3]);
        assert_eq!(timeline.clamp(1), Some(1));
        assert_eq!(timeline.clamp(42), Some(2));
        assert_eq!(Timeline::default().clamp(0), None);
    }
}
