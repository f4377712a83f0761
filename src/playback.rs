//! Playback: turning a parsed plan into poses at any point in time.
//!
//! [`Playback`] borrows a validated solution (and optionally its reference
//! paths) and answers read-only queries for a continuous time value. It never
//! mutates anything; the time, speed and flags it is asked about live in a
//! separate [`PlaybackState`] owned by the caller.

pub mod interpolate;
pub mod state;

use serde::Serialize;

use crate::model::{Pose, ReferencePath, Solution};

use interpolate::{blend_heading, lerp, split_time};
pub use state::{Command, LineMode, PlaybackSettings, PlaybackState, UnknownCommand};

/// Weight of the last forecast segment; the first always has weight 1.
pub const MIN_FORECAST_WEIGHT: f64 = 50.0 / 255.0;

/// Reasons a solution cannot be replayed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaybackError {
    #[error("solution has no configurations")]
    EmptySolution,

    #[error("timestep {timestep} has {found} poses, expected {expected}")]
    InconsistentConfigLength {
        timestep: usize,
        expected: usize,
        found: usize,
    },
}

/// An agent's interpolated state at some playback time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AgentState {
    pub agent: usize,
    pub x: f64,
    pub y: f64,
    /// Degrees in `[0, 360)`. `None` when the plan carries no heading here.
    pub heading: Option<f64>,
    /// The pose at the current timestep equals the agent's goal pose.
    pub at_goal: bool,
}

/// A line between two points in cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Segment {
    pub from: (f64, f64),
    pub to: (f64, f64),
    /// Rendering weight in `(0, 1]`.
    pub weight: f64,
}

/// One agent's forecast at a step, as a polyline.
///
/// Segments are ordered from the earliest predicted point, and their
/// weights decrease along the line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastTrace<'a> {
    pub agent: usize,
    pub poses: &'a [Pose],
    pub segments: Vec<Segment>,
}

/// Guide lines for one agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Guide {
    pub agent: usize,
    pub segments: Vec<Segment>,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame<'a> {
    pub time: f64,
    pub step: usize,
    pub agents: Vec<AgentState>,
    pub guides: Vec<Guide>,
    pub reference: Vec<ForecastTrace<'a>>,
}

/// Read-only replay of a solution.
#[derive(Debug, Clone, Copy)]
pub struct Playback<'a> {
    solution: &'a Solution,
    reference: Option<&'a ReferencePath>,
    horizon: usize,
}

impl<'a> Playback<'a> {
    /// Validates the solution and prepares it for replay.
    ///
    /// Fails when the solution is empty or its configurations differ in length.
    pub fn new(
        solution: &'a Solution,
        reference: Option<&'a ReferencePath>,
    ) -> Result<Self, PlaybackError> {
        let horizon = solution.horizon().ok_or(PlaybackError::EmptySolution)?;
        if let Some((timestep, found)) = solution.first_length_mismatch() {
            return Err(PlaybackError::InconsistentConfigLength {
                timestep,
                expected: solution.agent_count(),
                found,
            });
        }
        Ok(Self {
            solution,
            reference,
            horizon,
        })
    }

    /// The final timestep `T`.
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn agent_count(&self) -> usize {
        self.solution.agent_count()
    }

    /// Fresh playback state for this solution.
    pub fn start(&self, settings: PlaybackSettings) -> PlaybackState {
        PlaybackState::new(self.horizon, settings)
    }

    /// Interpolated state of one agent. `None` for unknown agents.
    pub fn agent_at(&self, agent: usize, time: f64) -> Option<AgentState> {
        let (t1, frac) = split_time(time, self.horizon);
        let current = self.solution.pose(t1, agent)?;
        let next = self.solution.pose(t1 + 1, agent);

        let (x1, y1) = current.position();
        let (x, y, heading) = match next {
            Some(next) => {
                let (x2, y2) = next.position();
                let heading = match (current.orientation.angle(), next.orientation.angle()) {
                    (Some(from), Some(to)) => Some(blend_heading(from, to, frac)),
                    _ => None,
                };
                (lerp(x1, x2, frac), lerp(y1, y2, frac), heading)
            }
            None => (x1, y1, current.orientation.angle()),
        };

        Some(AgentState {
            agent,
            x,
            y,
            heading,
            at_goal: self.solution.goal(agent) == Some(current),
        })
    }

    /// Interpolated state of every agent.
    pub fn agents_at(&self, time: f64) -> Vec<AgentState> {
        (0..self.agent_count())
            .filter_map(|agent| self.agent_at(agent, time))
            .collect()
    }

    /// Forecast polylines recorded at list position `step`.
    ///
    /// Agents with no forecast at that position are left out.
    pub fn overlay(&self, step: usize) -> Vec<ForecastTrace<'a>> {
        let Some(reference) = self.reference else {
            return Vec::new();
        };
        (0..reference.agent_count())
            .filter_map(|agent| {
                let poses = reference.forecast(agent, step)?;
                (!poses.is_empty()).then(|| ForecastTrace {
                    agent,
                    poses,
                    segments: forecast_segments(poses),
                })
            })
            .collect()
    }

    /// Guide lines for an agent at `time`.
    pub fn guide(&self, agent: usize, time: f64, mode: LineMode) -> Option<Guide> {
        let here = self.agent_at(agent, time)?;
        let from = (here.x, here.y);

        let segments = match mode {
            LineMode::None => Vec::new(),
            LineMode::Straight => {
                let goal = self.solution.goal(agent)?;
                vec![line(from, goal.position())]
            }
            LineMode::Path => {
                let (t1, _) = split_time(time, self.horizon);
                let mut segments = Vec::new();
                if let Some(next) = self.solution.pose(t1 + 1, agent) {
                    segments.push(line(from, next.position()));
                }
                for t in t1 + 1..self.horizon {
                    let (Some(a), Some(b)) =
                        (self.solution.pose(t, agent), self.solution.pose(t + 1, agent))
                    else {
                        continue;
                    };
                    if a.node != b.node {
                        segments.push(line(a.position(), b.position()));
                    }
                }
                segments
            }
        };

        Some(Guide { agent, segments })
    }

    /// Assembles a frame for the given state.
    pub fn frame(&self, state: &PlaybackState) -> Frame<'a> {
        let (step, _) = split_time(state.time, self.horizon);
        let guides = if state.line_mode == LineMode::None {
            Vec::new()
        } else {
            (0..self.agent_count())
                .filter_map(|agent| self.guide(agent, state.time, state.line_mode))
                .collect()
        };
        let reference = if state.show_reference {
            self.overlay(step)
        } else {
            Vec::new()
        };

        Frame {
            time: state.time,
            step,
            agents: self.agents_at(state.time),
            guides,
            reference,
        }
    }
}

fn line(from: (f64, f64), to: (f64, f64)) -> Segment {
    Segment {
        from,
        to,
        weight: 1.0,
    }
}

/// Consecutive segments of a forecast, fading from weight 1 towards [`MIN_FORECAST_WEIGHT`].
fn forecast_segments(poses: &[Pose]) -> Vec<Segment> {
    let last = poses.len().saturating_sub(1).max(1) as f64;
    poses
        .windows(2)
        .enumerate()
        .map(|(j, pair)| Segment {
            from: pair[0].position(),
            to: pair[1].position(),
            weight: lerp(1.0, MIN_FORECAST_WEIGHT, j as f64 / last),
        })
        .collect()
}
