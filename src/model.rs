//! Core data model for replaying plans.
//!
//! A plan is a sequence of configurations, one per timestep, each holding
//! one pose per agent. Plans can carry an optional reference section with
//! the forecast trajectory each agent was following at every step.

mod orientation;
mod pose;
mod reference;
mod solution;

pub use orientation::Orientation;
pub use pose::Pose;
pub use reference::ReferencePath;
pub use solution::Solution;

/// One pose per agent at a single timestep; index = agent id.
///
/// Inside a [`ReferencePath`] the same shape holds a single agent's
/// forecast instead, one pose per future offset.
pub type Config = Vec<Pose>;
