use thiserror::Error;

/// Closed set of generation failures. Each aborts the run; there is no retry
/// or repair loop.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("text generation HTTP {status}: {detail}")]
    Http { status: u16, detail: String },

    #[error("model returned an empty completion")]
    EmptyCompletion,

    #[error("text generation transport error: {0}")]
    Transport(String),
}
