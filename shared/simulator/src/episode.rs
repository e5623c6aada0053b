//! Per-agent episode bookkeeping and the tunable environment parameters.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EpisodeEnd {
    /// No checkpoint reached within the step timeout.
    Timeout,
    /// Flew into something that isn't another aircraft.
    Crash,
    MaxStepReached,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub number: u32,
    pub steps: u32,
    pub reward: f64,
    pub end: EpisodeEnd,
}

/// Step counting and reward accumulation for one agent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    number: u32,
    step_count: u32,
    /// Zero means unlimited.
    max_step: u32,
    step_reward: f64,
    cumulative_reward: f64,
    end: Option<EpisodeEnd>,
    started: bool,
}

impl Episode {
    pub fn new(max_step: u32) -> Self {
        Self {
            max_step,
            ..Default::default()
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn step_count(&self) -> u32 {
        self.step_count
    }

    pub fn max_step(&self) -> u32 {
        self.max_step
    }

    pub fn set_max_step(&mut self, max_step: u32) {
        self.max_step = max_step;
    }

    /// Reward added during the current step.
    pub fn step_reward(&self) -> f64 {
        self.step_reward
    }

    pub fn cumulative_reward(&self) -> f64 {
        self.cumulative_reward
    }

    pub fn end_reason(&self) -> Option<EpisodeEnd> {
        self.end
    }

    pub fn is_done(&self) -> bool {
        self.end.is_some()
    }

    /// True before the first episode and after every ended one.
    pub fn needs_begin(&self) -> bool {
        !self.started || self.is_done()
    }

    pub fn summary(&self) -> Option<EpisodeSummary> {
        self.end.map(|end| EpisodeSummary {
            number: self.number,
            steps: self.step_count,
            reward: self.cumulative_reward,
            end,
        })
    }

    /// Starts a new episode, returning the summary of the one that ended.
    pub fn begin(&mut self) -> Option<EpisodeSummary> {
        let summary = self.summary();
        if self.started {
            self.number += 1;
        }
        self.started = true;
        self.step_count = 0;
        self.step_reward = 0.0;
        self.cumulative_reward = 0.0;
        self.end = None;
        summary
    }

    pub fn step(&mut self) {
        self.step_count += 1;
        self.step_reward = 0.0;
    }

    pub fn add_reward(&mut self, reward: f64) {
        self.step_reward += reward;
        self.cumulative_reward += reward;
    }

    /// Ends the episode. Only the first reason given is kept.
    pub fn end(&mut self, reason: EpisodeEnd) {
        if self.end.is_none() {
            self.end = Some(reason);
        }
    }

    pub fn check_max_step(&mut self) {
        if self.max_step > 0 && self.step_count >= self.max_step {
            self.end(EpisodeEnd::MaxStepReached);
        }
    }
}

/// Named scalars supplied by the trainer, e.g. a curriculum schedule.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentParameters {
    values: BTreeMap<String, f64>,
}

impl EnvironmentParameters {
    pub const CHECKPOINT_RADIUS: &'static str = "checkpoint_radius";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_with_default(&self, key: &str, default: f64) -> f64 {
        self.values.get(key).copied().unwrap_or(default)
    }

    pub fn set(&mut self, key: &str, value: f64) {
        self.values.insert(key.to_string(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<f64> {
        self.values.remove(key)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_log::test;

    #[test]
    fn test_lifecycle() {
        let mut episode = Episode::new(0);
        assert!(episode.needs_begin());
        assert_eq!(episode.begin(), None);
        assert!(!episode.needs_begin());

        episode.step();
        episode.add_reward(1.0);
        episode.step();
        episode.add_reward(-0.25);
        assert_eq!(episode.step_count(), 2);
        assert_eq!(episode.step_reward(), -0.25);
        assert_eq!(episode.cumulative_reward(), 0.75);

        episode.end(EpisodeEnd::Crash);
        episode.end(EpisodeEnd::Timeout);
        assert!(episode.needs_begin());
        assert_eq!(
            episode.begin(),
            Some(EpisodeSummary {
                number: 0,
                steps: 2,
                reward: 0.75,
                end: EpisodeEnd::Crash,
            })
        );
        assert_eq!(episode.number(), 1);
        assert_eq!(episode.step_count(), 0);
        assert_eq!(episode.cumulative_reward(), 0.0);
    }

    #[test]
    fn test_max_step() {
        let mut episode = Episode::new(3);
        episode.begin();
        for _ in 0..2 {
            episode.step();
            episode.check_max_step();
        }
        assert!(!episode.is_done());
        episode.step();
        episode.check_max_step();
        assert_eq!(episode.end_reason(), Some(EpisodeEnd::MaxStepReached));

        let mut unlimited = Episode::new(0);
        unlimited.begin();
        for _ in 0..10000 {
            unlimited.step();
            unlimited.check_max_step();
        }
        assert!(!unlimited.is_done());
    }

    #[test]
    fn test_environment_parameters() {
        let mut params = EnvironmentParameters::new();
        assert_eq!(
            params.get_with_default(EnvironmentParameters::CHECKPOINT_RADIUS, 0.0),
            0.0
        );
        params.set(EnvironmentParameters::CHECKPOINT_RADIUS, 50.0);
        assert_eq!(
            params.get_with_default(EnvironmentParameters::CHECKPOINT_RADIUS, 0.0),
            50.0
        );
        assert_eq!(
            params.remove(EnvironmentParameters::CHECKPOINT_RADIUS),
            Some(50.0)
        );
    }
}
