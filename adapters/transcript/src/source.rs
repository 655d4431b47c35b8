use std::{
    fs,
    path::{Path, PathBuf},
};

use flash_point_core::{BoardSpec, Timeline};

use crate::{decode_board, decode_steps, TranscriptError};

/// Provider of the two raw simulation documents.
///
/// Each document is fetched exactly once per session; implementations do not
/// retry.
pub trait DocumentSource {
    /// Fetches the initial board document.
    fn board_document(&self) -> Result<String, TranscriptError>;

    /// Fetches the step transcript document.
    fn step_document(&self) -> Result<String, TranscriptError>;
}

/// Reads both documents from the filesystem.
#[derive(Clone, Debug)]
pub struct FileSource {
    board: PathBuf,
    steps: PathBuf,
}

impl FileSource {
    /// Creates a source reading the given board and step files.
    #[must_use]
    pub fn new(board: impl Into<PathBuf>, steps: impl Into<PathBuf>) -> Self {
        Self {
            board: board.into(),
            steps: steps.into(),
        }
    }
}

impl DocumentSource for FileSource {
    fn board_document(&self) -> Result<String, TranscriptError> {
        read(&self.board)
    }

    fn step_document(&self) -> Result<String, TranscriptError> {
        read(&self.steps)
    }
}

fn read(path: &Path) -> Result<String, TranscriptError> {
    fs::read_to_string(path).map_err(|source| TranscriptError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Serves documents held in memory.
#[derive(Clone, Debug, Default)]
pub struct InMemorySource {
    board: String,
    steps: String,
}

impl InMemorySource {
    /// Creates a source serving the provided documents.
    #[must_use]
    pub fn new(board: impl Into<String>, steps: impl Into<String>) -> Self {
        Self {
            board: board.into(),
            steps: steps.into(),
        }
    }
}

impl DocumentSource for InMemorySource {
    fn board_document(&self) -> Result<String, TranscriptError> {
        Ok(self.board.clone())
    }

    fn step_document(&self) -> Result<String, TranscriptError> {
        Ok(self.steps.clone())
    }
}

/// Fetches and decodes both documents.
pub fn load(source: &impl DocumentSource) -> Result<(BoardSpec, Timeline), TranscriptError> {
    let board = decode_board(&source.board_document()?)?;
    let timeline = decode_steps(&source.step_document()?)?;
    Ok((board, timeline))
}
