use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProtocolError;

pub const COMMAND_FIELD: &str = "command";

pub const ENVIRONMENT_CREATED: &str = "Environment created.";
pub const STATUS_CLOSED: &str = "closed";

/// A single client request. Every message carries exactly one command,
/// selected by its `command` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    NewEnvironment {
        level_name: String,
        seed: i64,
    },
    Reset,
    Step {
        #[serde(default)]
        action: Value,
    },
    Close,
}

impl Command {
    pub const NAMES: [&'static str; 4] = ["new_environment", "reset", "step", "close"];

    /// Parses a received message. The tag is checked before the payload so an
    /// unknown command is reported as such rather than as a field error.
    pub fn from_message(message: &Value) -> Result<Self, ProtocolError> {
        let Some(fields) = message.as_object() else {
            return Err(ProtocolError::NotAMapping);
        };
        let tag = match fields.get(COMMAND_FIELD) {
            Some(Value::String(tag)) => tag.as_str(),
            Some(other) => return Err(ProtocolError::UnknownCommand(other.to_string())),
            None => return Err(ProtocolError::MissingCommand),
        };
        if !Self::NAMES.contains(&tag) {
            return Err(ProtocolError::UnknownCommand(tag.to_string()));
        }

        serde_json::from_value(message.clone()).map_err(|source| ProtocolError::Malformed {
            command: tag.to_string(),
            source,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::NewEnvironment { .. } => "new_environment",
            Self::Reset => "reset",
            Self::Step { .. } => "step",
            Self::Close => "close",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentCreated {
    pub info: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResetResult {
    pub observation: Value,
    pub info: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub observation: Value,
    pub reward: Option<f64>,
    pub terminated: bool,
    pub truncated: bool,
    pub info: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Closed {
    pub status: String,
}

/// Outbound message. Serialized flat: the variant name never appears on the
/// wire, only the fields of the wrapped shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    EnvironmentCreated(EnvironmentCreated),
    Reset(ResetResult),
    Step(StepResult),
    Closed(Closed),
}

impl Response {
    pub fn environment_created() -> Self {
        Self::EnvironmentCreated(EnvironmentCreated {
            info: ENVIRONMENT_CREATED.to_string(),
        })
    }

    pub fn reset(observation: Value) -> Self {
        Self::Reset(ResetResult {
            observation,
            info: None,
        })
    }

    pub fn step(observation: Value, reward: Option<f64>, terminated: bool) -> Self {
        Self::Step(StepResult {
            observation,
            reward,
            terminated,
            truncated: false,
            info: None,
        })
    }

    pub fn closed() -> Self {
        Self::Closed(Closed {
            status: STATUS_CLOSED.to_string(),
        })
    }

    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
