use flash_point_core::{
    BoardSpec, CellCoord, CellSpec, DoorDeclaration, Marker, MarkerKind, PoiKind, WallDescriptor,
};
use serde::Deserialize;

use crate::TranscriptError;

const DOCUMENT: &str = "board";

#[derive(Debug, Deserialize)]
struct CellState {
    cell_position: [i32; 2],
    #[serde(default)]
    agents: Vec<BoardAgent>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum BoardAgent {
    CellAgent {
        walls: String,
        #[serde(default)]
        is_entrance: bool,
    },
    MarkerAgent {
        #[serde(default)]
        marker_type: Option<String>,
    },
    FireMarkerAgent,
    DoorAgent {
        connected_cell: [i32; 2],
    },
    #[serde(other)]
    Other,
}

/// Decodes the initial board document.
///
/// Cells without a `CellAgent` get an open descriptor. Markers with an
/// unknown code and agents of unknown type are logged and skipped.
pub fn decode_board(json: &str) -> Result<BoardSpec, TranscriptError> {
    if json.trim().is_empty() {
        return Err(TranscriptError::EmptyDocument { document: DOCUMENT });
    }
    let cells: Vec<CellState> =
        serde_json::from_str(json).map_err(|source| TranscriptError::Json {
            document: DOCUMENT,
            source,
        })?;
    if cells.is_empty() {
        return Err(TranscriptError::EmptyBoard);
    }

    let mut spec = BoardSpec::default();
    for state in cells {
        let cell = coord(state.cell_position);
        let mut declaration = None;

        for agent in state.agents {
            match agent {
                BoardAgent::CellAgent { walls, is_entrance } => {
                    if declaration.is_some() {
                        continue;
                    }
                    let walls = WallDescriptor::parse(&walls)
                        .map_err(|source| TranscriptError::Walls { cell, source })?;
                    declaration = Some(CellSpec {
                        cell,
                        walls,
                        is_entrance,
                    });
                }
                BoardAgent::MarkerAgent { marker_type } => {
                    let code = marker_type.unwrap_or_default();
                    match PoiKind::from_marker_code(&code) {
                        Some(kind) => spec.markers.push(Marker::new(MarkerKind::Poi(kind), cell)),
                        None => {
                            tracing::warn!(%cell, marker_type = %code, "unknown marker type skipped");
                        }
                    }
                }
                BoardAgent::FireMarkerAgent => {
                    spec.markers.push(Marker::new(MarkerKind::Fire, cell));
                }
                BoardAgent::DoorAgent { connected_cell } => {
                    spec.doors.push(DoorDeclaration {
                        from: cell,
                        to: coord(connected_cell),
                    });
                }
                BoardAgent::Other => {
                    tracing::debug!(%cell, "ignoring agent of unknown type");
                }
            }
        }

        spec.cells.push(declaration.unwrap_or_else(|| {
            tracing::debug!(%cell, "cell has no CellAgent; treating it as open");
            CellSpec {
                cell,
                walls: WallDescriptor::default(),
                is_entrance: false,
            }
        }));
    }

    tracing::info!(
        cells = spec.cells.len(),
        doors = spec.doors.len(),
        markers = spec.markers.len(),
        "board document decoded"
    );
    Ok(spec)
}

pub(crate) fn coord([row, column]: [i32; 2]) -> CellCoord {
    CellCoord::new(row, column)
}
