use flash_point_core::{
    AgentId, AgentPlacement, CellCoord, Counter, Direction, GridError, Marker, MarkerKind,
    PoiKind, StepEvent, StepFrame, Timeline,
};
use serde::Deserialize;

use crate::{board::coord, TranscriptError};

const DOCUMENT: &str = "step";

/// Longest transcript accepted; higher step indices are rejected as malformed.
pub const MAX_STEPS: usize = 100_000;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StepDocument {
    agents: Vec<Series<AgentEntry>>,
    fire_expansion: Vec<Series<PositionEntry>>,
    smoke_expansion: Vec<Series<PositionEntry>>,
    pois: Vec<Series<PoiEntry>>,
    victims_dead: Vec<CountEntry>,
    agents_dead: Vec<CountEntry>,
    saved_lifes: Vec<CountEntry>,
    structural_damage_left: Vec<ValueEntry>,
    destroyed_walls: Vec<Series<WallEntry>>,
    destroyed_doors: Vec<Series<DoorEntry>>,
    open_doors: Vec<Series<DoorEntry>>,
}

#[derive(Debug, Deserialize)]
struct Series<T> {
    step: usize,
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct AgentEntry {
    agent_id: u32,
    position: [i32; 2],
    #[serde(default)]
    target: Option<[i32; 2]>,
    #[serde(default, alias = "lleva_puffle")]
    carry_state: Option<CarryFlag>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(untagged)]
enum CarryFlag {
    Flag(bool),
    Level(i64),
}

impl CarryFlag {
    fn carrying(self) -> bool {
        match self {
            Self::Flag(flag) => flag,
            Self::Level(level) => level != 0,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PositionEntry {
    position: [i32; 2],
}

#[derive(Debug, Deserialize)]
struct PoiEntry {
    position: [i32; 2],
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct CountEntry {
    step: usize,
    count: i64,
}

#[derive(Debug, Deserialize)]
struct ValueEntry {
    step: usize,
    value: i64,
}

#[derive(Debug, Deserialize)]
struct WallEntry {
    cell: [i32; 2],
    #[serde(default)]
    direction: Option<String>,
    #[serde(default)]
    neighbor: Option<[i32; 2]>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DoorEntry {
    Cells { cell1: [i32; 2], cell2: [i32; 2] },
    Pair([[i32; 2]; 2]),
}

impl DoorEntry {
    fn cells(&self) -> (CellCoord, CellCoord) {
        match *self {
            Self::Cells { cell1, cell2 } => (coord(cell1), coord(cell2)),
            Self::Pair([first, second]) => (coord(first), coord(second)),
        }
    }
}

/// Decodes the step transcript into a timeline.
///
/// The timeline spans the highest step mentioned by any series. Steps a series
/// does not mention keep empty data and zero counters. Step indices at or
/// above [`MAX_STEPS`] are an error. POIs of unknown type and walls without a
/// usable side are logged and skipped.
pub fn decode_steps(json: &str) -> Result<Timeline, TranscriptError> {
    if json.trim().is_empty() {
        return Err(TranscriptError::EmptyDocument { document: DOCUMENT });
    }
    let document: StepDocument =
        serde_json::from_str(json).map_err(|source| TranscriptError::Json {
            document: DOCUMENT,
            source,
        })?;

    let mut frames: Vec<StepFrame> = vec![StepFrame::default(); step_count(&document)?];

    for series in &document.agents {
        let frame = &mut frames[series.step];
        frame.agents.extend(series.data.iter().map(|entry| AgentPlacement {
            id: AgentId::new(entry.agent_id),
            cell: coord(entry.position),
            target: entry.target.map(coord),
            carrying: entry.carry_state.is_some_and(CarryFlag::carrying),
        }));
    }

    for (series, kind) in [
        (&document.fire_expansion, MarkerKind::Fire),
        (&document.smoke_expansion, MarkerKind::Smoke),
    ] {
        for entries in series {
            let frame = &mut frames[entries.step];
            frame.markers.extend(
                entries
                    .data
                    .iter()
                    .map(|entry| Marker::new(kind, coord(entry.position))),
            );
        }
    }

    for series in &document.pois {
        let frame = &mut frames[series.step];
        for entry in &series.data {
            let cell = coord(entry.position);
            match entry.kind.parse::<PoiKind>() {
                Ok(kind) => frame.markers.push(Marker::new(MarkerKind::Poi(kind), cell)),
                Err(error) => {
                    tracing::warn!(step = series.step, %cell, %error, "skipping point of interest");
                }
            }
        }
    }

    for (entries, counter) in [
        (&document.victims_dead, Counter::VictimsDead),
        (&document.agents_dead, Counter::AgentsDead),
        (&document.saved_lifes, Counter::SavedLives),
    ] {
        for entry in entries {
            frames[entry.step].counters.set(counter, entry.count);
        }
    }
    for entry in &document.structural_damage_left {
        frames[entry.step]
            .counters
            .set(Counter::StructuralDamageLeft, entry.value);
    }

    for series in &document.destroyed_walls {
        for entry in &series.data {
            match wall_event(entry) {
                Ok(event) => frames[series.step].events.push(event),
                Err(error) => {
                    tracing::warn!(step = series.step, cell = %coord(entry.cell), %error, "skipping destroyed wall");
                }
            }
        }
    }

    for series in &document.destroyed_doors {
        for entry in &series.data {
            let (first, second) = entry.cells();
            frames[series.step]
                .events
                .push(StepEvent::DoorDestroyed { first, second });
        }
    }

    for series in &document.open_doors {
        for entry in &series.data {
            let (first, second) = entry.cells();
            frames[series.step]
                .events
                .push(StepEvent::DoorOpened { first, second });
        }
    }

    tracing::info!(steps = frames.len(), "step document decoded");
    Ok(Timeline::new(frames))
}

/// The neighbour, when present, pins the edge and must be adjacent. The
/// direction label is read only when no neighbour is given.
fn wall_event(entry: &WallEntry) -> Result<StepEvent, GridError> {
    let cell = coord(entry.cell);
    let direction = match entry.neighbor {
        Some(neighbor) => Direction::between(cell, coord(neighbor))?,
        None => entry
            .direction
            .as_deref()
            .unwrap_or_default()
            .parse::<Direction>()?,
    };
    Ok(StepEvent::WallDestroyed { cell, direction })
}

fn step_count(document: &StepDocument) -> Result<usize, TranscriptError> {
    let series_steps = document
        .agents
        .iter()
        .map(|series| series.step)
        .chain(document.fire_expansion.iter().map(|series| series.step))
        .chain(document.smoke_expansion.iter().map(|series| series.step))
        .chain(document.pois.iter().map(|series| series.step))
        .chain(document.destroyed_walls.iter().map(|series| series.step))
        .chain(document.destroyed_doors.iter().map(|series| series.step))
        .chain(document.open_doors.iter().map(|series| series.step));
    let counter_steps = document
        .victims_dead
        .iter()
        .chain(&document.agents_dead)
        .chain(&document.saved_lifes)
        .map(|entry| entry.step)
        .chain(document.structural_damage_left.iter().map(|entry| entry.step));

    let Some(last) = series_steps.chain(counter_steps).max() else {
        return Ok(0);
    };
    last.checked_add(1)
        .filter(|count| *count <= MAX_STEPS)
        .ok_or(TranscriptError::StepOutOfRange {
            step: last,
            limit: MAX_STEPS,
        })
}

#[cfg(test)]
mod tests {
    use flash_point_core::{CellCoord, Counter, Direction, MarkerKind, PoiKind, StepEvent};
    use serde_json::json;

    use super::{decode_steps, MAX_STEPS};
    use crate::TranscriptError;

    #[test]
    fn wall_neighbor_takes_precedence_over_label() {
        let document = json!({
            "destroyed_walls": [
                { "step": 0, "data": [
                    { "cell": [2, 2], "direction": "up", "neighbor": [3, 2] },
                    { "cell": [2, 2], "direction": "left" },
                    { "cell": [2, 2], "direction": "sideways" }
                ] }
            ]
        });

        let timeline = decode_steps(&document.to_string()).expect("steps decode");

        assert_eq!(
            timeline.events_at(0),
            &[
                StepEvent::WallDestroyed {
                    cell: CellCoord::new(2, 2),
                    direction: Direction::Right,
                },
                StepEvent::WallDestroyed {
                    cell: CellCoord::new(2, 2),
                    direction: Direction::Left,
                },
            ],
        );
    }

    #[test]
    fn counters_default_to_zero_on_unmentioned_steps() {
        let document = json!({
            "saved_lifes": [{ "step": 2, "count": 1 }],
            "structural_damage_left": [{ "step": 0, "value": 24 }]
        });

        let timeline = decode_steps(&document.to_string()).expect("steps decode");

        assert_eq!(timeline.len(), 3);
        let first = timeline.frame(0).expect("frame").counters;
        let last = timeline.frame(2).expect("frame").counters;
        assert_eq!(first.get(Counter::StructuralDamageLeft), 24);
        assert_eq!(last.get(Counter::StructuralDamageLeft), 0);
        assert_eq!(last.get(Counter::SavedLives), 1);
    }

    #[test]
    fn non_adjacent_neighbor_skips_the_wall_instead_of_using_the_label() {
        let document = json!({
            "destroyed_walls": [
                { "step": 0, "data": [
                    { "cell": [2, 2], "direction": "left", "neighbor": [5, 5] },
                    { "cell": [2, 2], "direction": "down" }
                ] }
            ]
        });

        let timeline = decode_steps(&document.to_string()).expect("steps decode");

        assert_eq!(
            timeline.events_at(0),
            &[StepEvent::WallDestroyed {
                cell: CellCoord::new(2, 2),
                direction: Direction::Down,
            }],
            "a bad neighbour must not fall back to the direction label"
        );
    }

    #[test]
    fn unknown_poi_types_are_skipped() {
        let document = json!({
            "pois": [
                { "step": 1, "data": [
                    { "position": [1, 4], "type": "victim" },
                    { "position": [3, 3], "type": "hazmat" }
                ] }
            ]
        });

        let timeline = decode_steps(&document.to_string()).expect("steps decode");

        let markers = &timeline.frame(1).expect("frame").markers;
        assert_eq!(markers.len(), 1, "only the known POI should be kept");
        assert_eq!(markers[0].kind, MarkerKind::Poi(PoiKind::Victim));
        assert_eq!(markers[0].cell, CellCoord::new(1, 4));
    }

    #[test]
    fn oversized_step_indices_are_errors() {
        for step in [u64::MAX, 1_000_000_000_000, MAX_STEPS as u64] {
            let document = json!({ "saved_lifes": [{ "step": step, "count": 1 }] });

            let result = decode_steps(&document.to_string());

            assert!(
                matches!(result, Err(TranscriptError::StepOutOfRange { .. })),
                "step {step} should be rejected, got {result:?}"
            );
        }
    }

    #[test]
    fn last_accepted_step_fills_the_timeline() {
        let document = json!({ "saved_lifes": [{ "step": MAX_STEPS - 1, "count": 1 }] });

        let timeline = decode_steps(&document.to_string()).expect("steps decode");

        assert_eq!(timeline.len(), MAX_STEPS);
    }
}
