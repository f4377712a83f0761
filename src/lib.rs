//! Parse multi-agent grid plans and replay them in continuous time.
//!
//! A plan file lists, per timestep, the pose of every agent on a grid map,
//! optionally followed by a `local_guidance=` section of per-step forecasts.
//! [`parse`] turns the file into a [`model::Solution`] and
//! [`model::ReferencePath`]; [`playback`] interpolates between timesteps for
//! any renderer that wants smooth motion.

pub mod cli;
pub mod config;
pub mod graph;
pub mod logging;
pub mod model;
pub mod parse;
pub mod playback;
