use std::{io, path::PathBuf};

use flash_point_core::{CellCoord, GridError};
use thiserror::Error;

/// Errors raised while fetching or decoding simulation documents.
#[derive(Debug, Error)]
pub enum TranscriptError {
    /// The document was empty or whitespace.
    #[error("{document} document is empty")]
    EmptyDocument {
        /// Which document was empty.
        document: &'static str,
    },
    /// The document was not valid JSON of the expected shape.
    #[error("failed to parse {document} document")]
    Json {
        /// Which document failed to parse.
        document: &'static str,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
    /// The board document parsed but listed no cells.
    #[error("board document contains no cells")]
    EmptyBoard,
    /// A step index exceeded the supported transcript length.
    #[error("step {step} exceeds the supported transcript length of {limit} steps")]
    StepOutOfRange {
        /// Highest step index found in the document.
        step: usize,
        /// Maximum number of steps accepted.
        limit: usize,
    },
    /// A cell carried a malformed wall descriptor.
    #[error("invalid walls for cell {cell}")]
    Walls {
        /// Cell carrying the descriptor.
        cell: CellCoord,
        /// Underlying descriptor error.
        #[source]
        source: GridError,
    },
    /// A document could not be read.
    #[error("failed to read {}", .path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}
