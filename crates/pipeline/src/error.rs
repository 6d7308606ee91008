use dealergpt_llm::LlmError;

/// Errors raised inside the pipeline.
///
/// The conversation service never surfaces these to callers; they end up as
/// a [`crate::Degraded`] answer and a log line.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Model error: {0}")]
    Llm(#[from] LlmError),

    #[error("{operation} timed out after {secs}s")]
    Timeout { operation: &'static str, secs: u64 },
}
