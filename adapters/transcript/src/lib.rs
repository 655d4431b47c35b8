#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Decoding of the simulation's JSON documents into core types.
//!
//! Two documents are consumed: the initial board, an array of cells with
//! nested agents, and the step transcript, an object of per-step series.
//! Both are fetched once through a [`DocumentSource`].

mod board;
mod error;
mod source;
mod steps;

pub use board::decode_board;
pub use error::TranscriptError;
pub use source::{load, DocumentSource, FileSource, InMemorySource};
pub use steps::{decode_steps, MAX_STEPS};
