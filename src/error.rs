use thiserror::Error;

/// Errors surfaced by the algorithmic core.
///
/// Empty inputs are never errors (components return empty results), and
/// degenerate statistics fall back to defined values, so the only failure
/// that propagates out of the core is malformed upstream data.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An input violated the wire contract: a reversed interval, a missing
    /// required field, or similar. The affected run aborts immediately.
    #[error("malformed input: {0}")]
    MalformedInput(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
