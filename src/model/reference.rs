//! Reference paths: per-agent forecasts recorded at each step.

use serde::Serialize;

use super::Config;

/// The optional `local_guidance=` section of a plan.
///
/// For each agent, an ordered list of forecasts. Forecasts are appended in
/// the order they appear in the file, so list position matches the step
/// number only when the file lists every step in order without gaps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReferencePath {
    /// Declared forecast horizon. Informational only.
    pub history_size: Option<usize>,

    paths: Vec<Vec<Config>>,
}

impl ReferencePath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes sure `agent` has a (possibly empty) forecast list and returns it.
    ///
    /// `None` when `agent + 1` overflows. Callers bound the id before asking.
    pub fn ensure_agent(&mut self, agent: usize) -> Option<&mut Vec<Config>> {
        let len = agent.checked_add(1)?;
        if len > self.paths.len() {
            self.paths.resize_with(len, Vec::new);
        }
        self.paths.get_mut(agent)
    }

    /// Appends a forecast to the agent's list, growing the table as needed.
    pub fn push_forecast(&mut self, agent: usize, forecast: Config) {
        if let Some(list) = self.ensure_agent(agent) {
            list.push(forecast);
        }
    }

    /// Number of agent slots, including agents seen without any forecast.
    pub fn agent_count(&self) -> usize {
        self.paths.len()
    }

    /// All forecasts for an agent, oldest first.
    pub fn forecasts(&self, agent: usize) -> &[Config] {
        self.paths.get(agent).map_or(&[], Vec::as_slice)
    }

    /// The forecast at list position `step`, if the agent has one.
    pub fn forecast(&self, agent: usize, step: usize) -> Option<&Config> {
        self.paths.get(agent)?.get(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::graph::{Graph, Grid};
    use crate::model::{Orientation, Pose};

    #[test]
    fn table_grows_on_first_sighting() {
        let mut reference = ReferencePath::new();
        reference.ensure_agent(2);

        assert_eq!(reference.agent_count(), 3);
        assert!(reference.forecasts(0).is_empty());
        assert!(reference.forecasts(2).is_empty());
    }

    #[test]
    fn ensure_agent_never_shrinks() {
        let mut reference = ReferencePath::new();
        reference.ensure_agent(4);
        reference.ensure_agent(1);
        assert_eq!(reference.agent_count(), 5);
    }

    #[test]
    fn largest_id_does_not_overflow() {
        let mut reference = ReferencePath::new();
        assert!(reference.ensure_agent(usize::MAX).is_none());
        assert_eq!(reference.agent_count(), 0);
    }

    #[test]
    fn forecast_lookup_is_bounds_checked() {
        let grid = Grid::open(2, 2).unwrap();
        let pose = Pose::new(grid.node_at(1, 1).unwrap(), Orientation::None);

        let mut reference = ReferencePath::new();
        reference.push_forecast(1, vec![pose]);

        assert_eq!(reference.forecast(1, 0), Some(&vec![pose]));
        assert!(reference.forecast(1, 1).is_none());
        assert!(reference.forecast(0, 0).is_none());
        assert!(reference.forecast(7, 0).is_none());
    }
}
