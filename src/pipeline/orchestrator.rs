//! End-to-end statement analysis: chunk the text, extract each chunk through
//! the chat client, validate the payloads, and merge the survivors.

use tracing::{info, info_span, warn};
use uuid::Uuid;

use super::chunker::chunk_text;
use super::merge::merge_extractions;
use super::parser::parse_payload;
use super::prompt::{build_extraction_prompt, EXTRACTION_SYSTEM_PROMPT};
use super::types::{AnalysisReport, ChatClient, RawChunk, StatementExtraction, TokenBudget};
use super::validation::validate_payload;
use super::PipelineError;

/// What to do when a chunk fails for a reason that is not local to its own
/// content (quota, transport, empty response).
///
/// Parse and validation failures are always local: that chunk is dropped and
/// the run continues regardless of policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChunkFailurePolicy {
    /// Abort the whole run on the first such failure.
    #[default]
    Strict,
    /// Skip the failed chunk and keep going with whatever survives.
    Lenient,
}

#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub max_chunk_size: usize,
    pub budget: TokenBudget,
    pub failure_policy: ChunkFailurePolicy,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: crate::config::DEFAULT_MAX_CHUNK_SIZE,
            budget: TokenBudget::default(),
            failure_policy: ChunkFailurePolicy::default(),
        }
    }
}

/// Drives the full analysis for one document.
pub struct StatementAnalyzer<C: ChatClient> {
    client: C,
    config: AnalyzerConfig,
}

impl<C: ChatClient> StatementAnalyzer<C> {
    pub fn new(client: C, config: AnalyzerConfig) -> Self {
        Self { client, config }
    }

    /// Analyze a full statement text and produce the merged report.
    ///
    /// Chunks whose responses fail to parse or validate are dropped and the
    /// run continues. Service-level failures follow the configured policy.
    /// If no chunk yields a valid payload the run fails with `NoUsableData`.
    pub fn analyze(&self, text: &str) -> Result<AnalysisReport, PipelineError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("analyze", %run_id);
        let _guard = span.enter();

        let chunks = chunk_text(text, self.config.max_chunk_size);
        if chunks.is_empty() {
            return Err(PipelineError::NoUsableData { chunks: 0 });
        }
        info!(chunks = chunks.len(), chars = text.len(), "statement chunked");

        let mut payloads: Vec<StatementExtraction> = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            match self.extract_chunk(chunk) {
                Ok(payload) => payloads.push(payload),
                Err(e) if is_chunk_local(&e) => {
                    warn!(chunk = chunk.index, error = %e, "dropping chunk");
                }
                Err(e) => match self.config.failure_policy {
                    ChunkFailurePolicy::Strict => return Err(e),
                    ChunkFailurePolicy::Lenient => {
                        warn!(chunk = chunk.index, error = %e, "skipping chunk");
                    }
                },
            }
        }

        if payloads.is_empty() {
            return Err(PipelineError::NoUsableData {
                chunks: chunks.len(),
            });
        }

        info!(
            valid = payloads.len(),
            dropped = chunks.len() - payloads.len(),
            "merging extractions"
        );
        Ok(merge_extractions(&payloads))
    }

    fn extract_chunk(&self, chunk: &RawChunk) -> Result<StatementExtraction, PipelineError> {
        let prompt = build_extraction_prompt(&chunk.text);
        let response = self
            .client
            .complete(EXTRACTION_SYSTEM_PROMPT, &prompt, &self.config.budget)?;
        let value = parse_payload(&response)?;
        validate_payload(chunk.index, &value)
    }
}

/// True when the failure concerns one chunk's own content rather than the
/// extraction service. Local failures never abort the run.
fn is_chunk_local(e: &PipelineError) -> bool {
    matches!(
        e,
        PipelineError::UnparseableResponse(_) | PipelineError::InvalidPayload { .. }
    )
}
