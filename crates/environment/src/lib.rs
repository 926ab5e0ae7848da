use std::collections::BTreeMap;

pub mod error;
pub mod observation;
pub mod sandbox;

pub use error::EnvironmentError;
pub use observation::{Observation, Tensor};
pub use sandbox::{SandboxEnvironment, SandboxFactory};

pub const SYMBOLIC_OBSERVATION: &str = "symbolic_obs";

pub const DEFAULT_NUM_TRIALS: u32 = 1000;
pub const DEFAULT_MAX_STEPS_PER_TRIAL: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepType {
    First,
    Mid,
    Last,
}

impl StepType {
    pub fn is_last(self) -> bool {
        matches!(self, Self::Last)
    }
}

/// Named observations produced by a single transition.
pub type ObservationBundle = BTreeMap<String, Observation>;

#[derive(Debug, Clone, PartialEq)]
pub struct Timestep {
    pub observation: ObservationBundle,
    pub reward: Option<f64>,
    pub step_type: StepType,
}

impl Timestep {
    pub fn symbolic_observation(&self) -> Option<&Observation> {
        self.observation.get(SYMBOLIC_OBSERVATION)
    }
}

/// Construction parameters handed to an [`EnvironmentFactory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelConfig {
    pub level_name: String,
    pub seed: i64,
    pub end_trial_action: bool,
    pub num_trials: u32,
    pub max_steps_per_trial: u32,
}

impl LevelConfig {
    /// The fixed configuration every session uses: trials end on an explicit
    /// action, 1000 trials of at most 1000 steps each.
    pub fn session_default(level_name: impl Into<String>, seed: i64) -> Self {
        Self {
            level_name: level_name.into(),
            seed,
            end_trial_action: true,
            num_trials: DEFAULT_NUM_TRIALS,
            max_steps_per_trial: DEFAULT_MAX_STEPS_PER_TRIAL,
        }
    }
}

/// A stateful simulation handle. Calls block the caller until the
/// simulation has advanced.
pub trait Environment: Send {
    fn reset(&mut self) -> Result<Timestep, EnvironmentError>;
    fn step(&mut self, action: i64) -> Result<Timestep, EnvironmentError>;
    fn close(&mut self) -> Result<(), EnvironmentError>;
}

pub trait EnvironmentFactory: Send {
    fn create(&self, config: &LevelConfig) -> Result<Box<dyn Environment>, EnvironmentError>;
}

impl<F> EnvironmentFactory for F
where
    F: Fn(&LevelConfig) -> Result<Box<dyn Environment>, EnvironmentError> + Send,
{
    fn create(&self, config: &LevelConfig) -> Result<Box<dyn Environment>, EnvironmentError> {
        self(config)
    }
}
