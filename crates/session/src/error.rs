use environment::EnvironmentError;
use shared::error::ProtocolError;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// A command arrived before any environment was created.
    Sequence,
    /// The message could not be read as a known command.
    Protocol,
    /// The environment failed or produced an unusable timestep.
    Environment,
}

/// Conditions that end the run without a response.
#[derive(Debug, Error)]
pub enum SessionFault {
    #[error("no environment created yet; `{command}` requires `new_environment` first")]
    NotInitialized { command: &'static str },
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("timestep has no `{0}` observation")]
    MissingObservation(&'static str),
    #[error("environment {operation} failed: {source}")]
    Environment {
        operation: &'static str,
        source: EnvironmentError,
    },
}

impl SessionFault {
    pub(crate) fn environment(operation: &'static str) -> impl FnOnce(EnvironmentError) -> Self {
        move |source| Self::Environment { operation, source }
    }

    pub fn kind(&self) -> FaultKind {
        match self {
            Self::NotInitialized { .. } => FaultKind::Sequence,
            Self::Protocol(_) => FaultKind::Protocol,
            Self::MissingObservation(_) | Self::Environment { .. } => FaultKind::Environment,
        }
    }
}
