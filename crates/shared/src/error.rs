use thiserror::Error;

/// A message that cannot be read as a command. Always fatal for the run: there
/// is no response shape that reports it.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("message is not a field/value mapping")]
    NotAMapping,
    #[error("message has no command field")]
    MissingCommand,
    #[error("invalid command: {0}")]
    UnknownCommand(String),
    #[error("malformed {command} command: {source}")]
    Malformed {
        command: String,
        source: serde_json::Error,
    },
}
