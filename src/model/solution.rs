//! Solution: the primary plan, one configuration per timestep.

use serde::Serialize;

use super::{Config, Pose};

/// An ordered sequence of configurations; index = timestep.
///
/// The parser appends rows as it reads them and does not enforce a common
/// row length. Consumers that need a rectangular plan validate it first
/// (see [`Playback::new`](crate::playback::Playback::new)).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Solution {
    configs: Vec<Config>,
}

impl Solution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_configs(configs: Vec<Config>) -> Self {
        Self { configs }
    }

    /// Appends a configuration as the next timestep.
    pub fn push(&mut self, config: Config) {
        self.configs.push(config);
    }

    /// Number of configurations (timesteps including the initial state).
    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    pub fn configs(&self) -> &[Config] {
        &self.configs
    }

    /// Final timestep `T`, or `None` for an empty solution.
    pub fn horizon(&self) -> Option<usize> {
        self.configs.len().checked_sub(1)
    }

    /// Agent count `N`, taken from the initial configuration.
    pub fn agent_count(&self) -> usize {
        self.configs.first().map_or(0, Vec::len)
    }

    pub fn pose(&self, timestep: usize, agent: usize) -> Option<&Pose> {
        self.configs.get(timestep)?.get(agent)
    }

    /// The agent's goal: its pose in the final configuration.
    pub fn goal(&self, agent: usize) -> Option<&Pose> {
        self.configs.last()?.get(agent)
    }

    /// The first timestep whose length differs from the initial one,
    /// with that length.
    pub fn first_length_mismatch(&self) -> Option<(usize, usize)> {
        let expected = self.agent_count();
        self.configs
            .iter()
            .enumerate()
            .find(|(_, c)| c.len() != expected)
            .map(|(t, c)| (t, c.len()))
    }
}
