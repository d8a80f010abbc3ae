pub mod chunker;
pub mod client;
pub mod merge;
pub mod orchestrator;
pub mod parser;
pub mod prompt;
pub mod sanitize;
pub mod types;
pub mod validation;

pub use chunker::*;
pub use client::*;
pub use merge::*;
pub use orchestrator::*;
pub use parser::*;
pub use prompt::*;
pub use sanitize::*;
pub use types::*;
pub use validation::*;

use thiserror::Error;

/// Errors surfaced by the statement analysis pipeline.
///
/// Quota exhaustion is its own variant because it is the one condition worth
/// surfacing distinctly to an end user (rate limited, retry later) rather
/// than as a generic upstream failure.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("cannot reach extraction service at {0}")]
    Connection(String),

    #[error("extraction service quota exceeded (status {status}): {body}")]
    QuotaExceeded { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("extraction service returned error (status {status}): {body}")]
    ApiStatus { status: u16, body: String },

    #[error("extraction service returned an empty response")]
    EmptyResponse,

    #[error("unparseable extraction response: {0}")]
    UnparseableResponse(String),

    #[error("chunk {index} failed validation: {reason}")]
    InvalidPayload { index: usize, reason: String },

    #[error("no usable data: none of the {chunks} chunks produced a valid extraction")]
    NoUsableData { chunks: usize },
}
