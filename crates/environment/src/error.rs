use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvironmentError {
    #[error("unknown level: {0:?}")]
    UnknownLevel(String),
    #[error("environment must be reset before stepping")]
    NeedsReset,
    #[error("environment is closed")]
    Closed,
    #[error("observation shape {shape:?} needs {expected} values, got {actual}")]
    ShapeMismatch {
        shape: Vec<usize>,
        expected: usize,
        actual: usize,
    },
    #[error("environment failure: {0}")]
    Backend(String),
}
