//! Session controller: decides which commands are legal in the current state,
//! drives the environment handle, and shapes each outcome into a response.

use environment::{Environment, EnvironmentFactory, LevelConfig, Timestep, SYMBOLIC_OBSERVATION};
use serde_json::Value;
use shared::protocol::{Command, Response};
use tracing::debug;

pub mod action;
pub mod encode;
pub mod error;

pub use action::{normalize_action, NormalizedAction, NOOP_ACTION};
pub use encode::encode_observation;
pub use error::{FaultKind, SessionFault};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Ready,
}

/// What the run loop does once the reply has been sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Shutdown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub response: Response,
    pub control: Control,
    /// Raw action that was replaced by the no-op action, if any.
    pub coerced_action: Option<Value>,
}

impl Reply {
    fn proceed(response: Response) -> Self {
        Self {
            response,
            control: Control::Continue,
            coerced_action: None,
        }
    }

    fn shutdown(response: Response) -> Self {
        Self {
            response,
            control: Control::Shutdown,
            coerced_action: None,
        }
    }
}

/// The single session served by a process. Owns the environment handle, if
/// one has been created.
pub struct Session<F> {
    factory: F,
    environment: Option<Box<dyn Environment>>,
}

impl<F> Session<F>
where
    F: EnvironmentFactory,
{
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            environment: None,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.environment.is_some() {
            SessionState::Ready
        } else {
            SessionState::Uninitialized
        }
    }

    pub fn handle_message(&mut self, message: &Value) -> Result<Reply, SessionFault> {
        let command = Command::from_message(message)?;
        self.handle(command)
    }

    pub fn handle(&mut self, command: Command) -> Result<Reply, SessionFault> {
        match command {
            Command::NewEnvironment { level_name, seed } => self.new_environment(level_name, seed),
            Command::Reset => self.reset(),
            Command::Step { action } => self.step(&action),
            Command::Close => self.close(),
        }
    }

    fn new_environment(&mut self, level_name: String, seed: i64) -> Result<Reply, SessionFault> {
        if let Some(mut previous) = self.environment.take() {
            debug!("releasing previous environment");
            previous
                .close()
                .map_err(SessionFault::environment("close"))?;
        }

        let config = LevelConfig::session_default(level_name, seed);
        debug!(level = %config.level_name, seed, "creating new environment");
        let environment = self
            .factory
            .create(&config)
            .map_err(SessionFault::environment("create"))?;
        self.environment = Some(environment);
        Ok(Reply::proceed(Response::environment_created()))
    }

    fn reset(&mut self) -> Result<Reply, SessionFault> {
        let environment = self.ready("reset")?;
        debug!("resetting environment");
        let timestep = environment
            .reset()
            .map_err(SessionFault::environment("reset"))?;
        let observation = symbolic_observation(&timestep)?;
        Ok(Reply::proceed(Response::reset(observation)))
    }

    fn step(&mut self, raw: &Value) -> Result<Reply, SessionFault> {
        let environment = self.ready("step")?;
        let normalized = normalize_action(raw);
        debug!(
            action = normalized.action(),
            coerced = normalized.is_coerced(),
            "stepping environment"
        );
        let timestep = environment
            .step(normalized.action())
            .map_err(SessionFault::environment("step"))?;
        let observation = symbolic_observation(&timestep)?;

        let mut reply = Reply::proceed(Response::step(
            observation,
            timestep.reward,
            timestep.step_type.is_last(),
        ));
        if let NormalizedAction::Coerced { raw } = normalized {
            reply.coerced_action = Some(raw);
        }
        Ok(reply)
    }

    fn close(&mut self) -> Result<Reply, SessionFault> {
        let Some(mut environment) = self.environment.take() else {
            return Err(SessionFault::NotInitialized { command: "close" });
        };
        debug!("closing environment");
        environment
            .close()
            .map_err(SessionFault::environment("close"))?;
        Ok(Reply::shutdown(Response::closed()))
    }

    fn ready(&mut self, command: &'static str) -> Result<&mut Box<dyn Environment>, SessionFault> {
        self.environment
            .as_mut()
            .ok_or(SessionFault::NotInitialized { command })
    }
}

fn symbolic_observation(timestep: &Timestep) -> Result<Value, SessionFault> {
    timestep
        .symbolic_observation()
        .map(encode_observation)
        .ok_or(SessionFault::MissingObservation(SYMBOLIC_OBSERVATION))
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
