#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that lays out the initial board.

use std::collections::BTreeSet;

use flash_point_core::{Marker, RenderCommand};
use flash_point_world::{query, Board};

/// Produces the commands that build the board before the first step.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Emits floors, then walls and doors, then the markers present on the board.
    ///
    /// Every renderable edge is placed once, anchored at a cell on the board.
    pub fn build(&self, board: &Board, markers: &[Marker], out: &mut Vec<RenderCommand>) {
        for (cell, _) in query::cells(board) {
            out.push(RenderCommand::PlaceCell { cell });
        }

        for (key, kind) in query::renderable_edges(board) {
            let (cell, direction) = query::anchor(board, key);
            out.push(RenderCommand::PlaceWallOrDoor {
                cell,
                direction,
                kind,
            });
        }

        let markers: BTreeSet<&Marker> = markers.iter().collect();
        for marker in markers {
            out.push(RenderCommand::SetMarker {
                kind: marker.kind,
                cell: marker.cell,
                present: true,
            });
        }
    }
}
