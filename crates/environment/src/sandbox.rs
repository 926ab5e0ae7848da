//! Deterministic built-in level.
//!
//! Every trial hides a target action; picking it pays a reward of `1.0`.
//! A trial ends on the end-trial action (when enabled) or after
//! `max_steps_per_trial` steps, and the episode ends after `num_trials`
//! trials. All randomness comes from the level seed, so two sandboxes built
//! from the same [`LevelConfig`] produce identical timesteps for identical
//! action sequences.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::{
    Environment, EnvironmentError, EnvironmentFactory, LevelConfig, ObservationBundle, StepType,
    Tensor, Timestep, SYMBOLIC_OBSERVATION,
};

/// Number of regular actions; `0` is the no-op.
pub const ACTION_COUNT: i64 = 8;
pub const END_TRIAL_ACTION: i64 = ACTION_COUNT;
pub const OBS_DIM: usize = 8;
const PROGRESS_FEATURES: usize = 4;

#[derive(Debug, Default, Clone, Copy)]
pub struct SandboxFactory;

impl EnvironmentFactory for SandboxFactory {
    fn create(&self, config: &LevelConfig) -> Result<Box<dyn Environment>, EnvironmentError> {
        Ok(Box::new(SandboxEnvironment::new(config.clone())?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    AwaitingReset,
    Running,
    Finished,
    Closed,
}

#[derive(Debug)]
pub struct SandboxEnvironment {
    config: LevelConfig,
    rng: ChaCha8Rng,
    phase: Phase,
    trial: u32,
    step_in_trial: u32,
    target: i64,
    last_action: i64,
    last_reward: f64,
}

impl SandboxEnvironment {
    pub fn new(mut config: LevelConfig) -> Result<Self, EnvironmentError> {
        if config.level_name.trim().is_empty() {
            return Err(EnvironmentError::UnknownLevel(config.level_name));
        }
        config.num_trials = config.num_trials.max(1);
        config.max_steps_per_trial = config.max_steps_per_trial.max(1);
        debug!(
            level = %config.level_name,
            seed = config.seed,
            num_trials = config.num_trials,
            max_steps_per_trial = config.max_steps_per_trial,
            "building sandbox level"
        );

        // Negative seeds keep their bit pattern.
        let rng = ChaCha8Rng::seed_from_u64(config.seed as u64);
        Ok(Self {
            config,
            rng,
            phase: Phase::AwaitingReset,
            trial: 0,
            step_in_trial: 0,
            target: 0,
            last_action: 0,
            last_reward: 0.0,
        })
    }

    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    pub fn trial(&self) -> u32 {
        self.trial
    }

    fn draw_target(&mut self) -> i64 {
        self.rng.gen_range(1..ACTION_COUNT)
    }

    fn ends_trial(&self, action: i64) -> bool {
        (self.config.end_trial_action && action == END_TRIAL_ACTION)
            || self.step_in_trial >= self.config.max_steps_per_trial
    }

    fn timestep(&mut self, reward: Option<f64>, step_type: StepType) -> Timestep {
        let mut features = Vec::with_capacity(OBS_DIM);
        features.push(f64::from(self.trial) / f64::from(self.config.num_trials));
        features.push(f64::from(self.step_in_trial) / f64::from(self.config.max_steps_per_trial));
        features.push(self.last_action as f64 / END_TRIAL_ACTION as f64);
        features.push(self.last_reward);
        for _ in PROGRESS_FEATURES..OBS_DIM {
            features.push(self.rng.gen::<f64>());
        }

        let mut observation = ObservationBundle::new();
        observation.insert(SYMBOLIC_OBSERVATION.to_string(), Tensor::vector(features).into());
        Timestep {
            observation,
            reward,
            step_type,
        }
    }
}

impl Environment for SandboxEnvironment {
    fn reset(&mut self) -> Result<Timestep, EnvironmentError> {
        if self.phase == Phase::Closed {
            return Err(EnvironmentError::Closed);
        }
        self.phase = Phase::Running;
        self.trial = 0;
        self.step_in_trial = 0;
        self.last_action = 0;
        self.last_reward = 0.0;
        self.target = self.draw_target();
        Ok(self.timestep(None, StepType::First))
    }

    fn step(&mut self, action: i64) -> Result<Timestep, EnvironmentError> {
        match self.phase {
            Phase::Running => {}
            Phase::Closed => return Err(EnvironmentError::Closed),
            Phase::AwaitingReset | Phase::Finished => return Err(EnvironmentError::NeedsReset),
        }

        let action = if (0..=END_TRIAL_ACTION).contains(&action) {
            action
        } else {
            debug!(action, "sandbox treats out-of-range action as no-op");
            0
        };

        self.step_in_trial += 1;
        let reward = if action != 0 && action == self.target {
            1.0
        } else {
            0.0
        };
        self.last_action = action;
        self.last_reward = reward;

        if self.ends_trial(action) {
            self.trial += 1;
            self.step_in_trial = 0;
            self.target = self.draw_target();
        }

        let step_type = if self.trial >= self.config.num_trials {
            self.phase = Phase::Finished;
            StepType::Last
        } else {
            StepType::Mid
        };
        Ok(self.timestep(Some(reward), step_type))
    }

    fn close(&mut self) -> Result<(), EnvironmentError> {
        self.phase = Phase::Closed;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/sandbox_tests.rs"]
mod tests;
