use std::io::Write;

use anyhow::{Context, Result as AnyResult};
use flash_point_core::RenderCommand;
use glam::Vec2;
use serde::Serialize;

use crate::{BoardLayout, RenderingBackend};

/// Line format written by [`TextBackend`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextFormat {
    /// Human-readable lines.
    #[default]
    Plain,
    /// One JSON object per line.
    JsonLines,
}

#[derive(Serialize)]
struct JsonLine<'a> {
    #[serde(flatten)]
    command: &'a RenderCommand,
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<[f32; 2]>,
}

/// Backend that writes each command as a line of text.
#[derive(Debug)]
pub struct TextBackend<W> {
    out: W,
    layout: BoardLayout,
    format: TextFormat,
}

impl<W: Write> TextBackend<W> {
    /// Creates a backend writing to `out`.
    pub fn new(out: W, layout: BoardLayout, format: TextFormat) -> Self {
        Self {
            out,
            layout,
            format,
        }
    }

    /// Consumes the backend and returns the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn position(&self, command: &RenderCommand) -> Option<Vec2> {
        match *command {
            RenderCommand::PlaceCell { cell }
            | RenderCommand::PlaceOrMoveAgent { cell, .. }
            | RenderCommand::SetMarker { cell, .. } => Some(self.layout.cell_center(cell)),
            RenderCommand::PlaceWallOrDoor {
                cell, direction, ..
            }
            | RenderCommand::RemoveEdge { cell, direction } => {
                Some(self.layout.edge_midpoint(cell, direction))
            }
            RenderCommand::SetCounterDisplay { .. } => None,
        }
    }

    fn plain(command: &RenderCommand) -> String {
        match *command {
            RenderCommand::PlaceCell { cell } => format!("cell {cell}"),
            RenderCommand::PlaceWallOrDoor {
                cell,
                direction,
                kind,
            } => format!("place {kind:?} {cell} {direction}"),
            RenderCommand::RemoveEdge { cell, direction } => format!("remove {cell} {direction}"),
            RenderCommand::PlaceOrMoveAgent { agent, cell } => format!("agent {agent} {cell}"),
            RenderCommand::SetMarker {
                kind,
                cell,
                present,
            } => {
                let verb = if present { "show" } else { "hide" };
                format!("{verb} {kind} {cell}")
            }
            RenderCommand::SetCounterDisplay { counter, value } => {
                format!("{} = {value}", counter.name())
            }
        }
    }
}

impl<W: Write> RenderingBackend for TextBackend<W> {
    fn apply(&mut self, command: &RenderCommand) -> AnyResult<()> {
        let position = self.position(command);
        match self.format {
            TextFormat::Plain => {
                let text = Self::plain(command);
                match position {
                    Some(at) => writeln!(self.out, "{text} at ({:.2}, {:.2})", at.x, at.y),
                    None => writeln!(self.out, "{text}"),
                }
                .context("failed to write command")?;
            }
            TextFormat::JsonLines => {
                let line = JsonLine {
                    command,
                    position: position.map(|at| at.to_array()),
                };
                serde_json::to_writer(&mut self.out, &line)
                    .context("failed to encode command")?;
                writeln!(self.out).context("failed to write command")?;
            }
        }
        Ok(())
    }

    fn present(&mut self, commands: &[RenderCommand]) -> AnyResult<()> {
        for command in commands {
            self.apply(command)?;
        }
        self.out.flush().context("failed to flush output")
    }
}

#[cfg(test)]
mod tests {
    use flash_point_core::{BarrierKind, CellCoord, Counter, Direction};

    use super::*;

    fn render(format: TextFormat, commands: &[RenderCommand]) -> String {
        let layout = BoardLayout::new(10.0).expect("valid layout");
        let mut backend = TextBackend::new(Vec::new(), layout, format);
        backend.present(commands).expect("commands render");
        String::from_utf8(backend.into_inner()).expect("utf-8 output")
    }

    #[test]
    fn plain_lines_carry_world_positions() {
        let output = render(
            TextFormat::Plain,
            &[
                RenderCommand::PlaceWallOrDoor {
                    cell: CellCoord::new(1, 0),
                    direction: Direction::Up,
                    kind: BarrierKind::Door,
                },
                RenderCommand::SetCounterDisplay {
                    counter: Counter::SavedLives,
                    value: 3,
                },
            ],
        );

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(
            lines[0].ends_with("at (10.00, 5.00)"),
            "edge commands should be anchored at the side midpoint: {}",
            lines[0]
        );
        assert!(!lines[1].contains(" at "), "counters have no position");
    }

    #[test]
    fn json_lines_are_tagged_by_operation() {
        let output = render(
            TextFormat::JsonLines,
            &[RenderCommand::PlaceCell {
                cell: CellCoord::new(2, 1),
            }],
        );

        let value: serde_json::Value =
            serde_json::from_str(output.trim()).expect("line is valid json");
        assert_eq!(value["op"], "place_cell");
        assert_eq!(value["position"], serde_json::json!([20.0, 10.0]));
    }
}
