//! Plan file parsing.
//!
//! A plan file is read line by line in a single pass. It has two sections:
//!
//! ```text
//! solver=...              # noise: ignored
//! 0:(5,16),(21,29),       # primary plan, one row per timestep
//! 1:(5,17),(21,28),
//! local_guidance=         # switches to the reference section, for good
//! history_size=3
//! step0:
//! agent0:(5,16),(5,17),(5,18),
//! agent1:(21,29),(21,28),
//! ```
//!
//! Lines that match nothing are skipped silently. Coordinates are resolved
//! against a [`Graph`] as they are read; a coordinate with no node behind it
//! aborts the whole parse.

pub mod token;

use std::{
    fs,
    io::{self, BufRead},
    path::Path,
};

use tracing::{debug, info, warn};

use crate::graph::Graph;
use crate::model::{Config, Pose, ReferencePath, Solution};

use token::{PLAN_ROW_MARKER, REFERENCE_MARKER, TokenError};

/// Errors that abort a parse.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("line {line}: invalid number {text:?}")]
    InvalidNumber { line: usize, text: String },

    #[error("line {line}: coordinate ({x},{y}) is outside the map or on a blocked cell")]
    MalformedCoordinate { line: usize, x: u32, y: u32 },

    #[error("line {line}: unknown orientation tag {tag:?}")]
    UnknownOrientation { line: usize, tag: String },

    #[error("line {line}: agent {agent} is out of range (limit {limit})")]
    AgentOutOfRange {
        line: usize,
        agent: usize,
        limit: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = core::result::Result<T, ParseError>;

/// Upper bound on reference agent ids when no primary plan was read first.
pub const MAX_REFERENCE_AGENTS: usize = 1 << 16;

/// Which section of the file the parser is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Reading primary-plan rows.
    Primary,

    /// Reading forecasts. Entered on the first `local_guidance=` line and never left.
    Reference {
        current_step: Option<usize>,
        /// Reset at every step header.
        current_agent: Option<usize>,
    },
}

/// Everything a plan file yields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPlan {
    pub solution: Solution,

    /// Present when the file has a `local_guidance=` section.
    pub reference: Option<ReferencePath>,
}

/// Line-at-a-time plan parser.
pub struct SolutionParser<'g, G: ?Sized> {
    graph: &'g G,
    mode: Mode,
    line: usize,
    solution: Solution,
    reference: Option<ReferencePath>,
}

impl<'g, G: Graph + ?Sized> SolutionParser<'g, G> {
    pub fn new(graph: &'g G) -> Self {
        Self {
            graph,
            mode: Mode::Primary,
            line: 0,
            solution: Solution::new(),
            reference: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Consumes one line of input.
    pub fn feed(&mut self, line: &str) -> Result<()> {
        self.line += 1;
        let line = line.trim_end();

        if line.contains(REFERENCE_MARKER) {
            if self.mode == Mode::Primary {
                info!(line = self.line, "found reference section");
                self.mode = Mode::Reference {
                    current_step: None,
                    current_agent: None,
                };
                self.reference = Some(ReferencePath::new());
            }
            return Ok(());
        }

        match self.mode {
            Mode::Primary => self.feed_primary(line),
            Mode::Reference { .. } => self.feed_reference(line),
        }
    }

    /// Finishes the parse and hands over what was read.
    pub fn finish(self) -> ParsedPlan {
        info!(
            timesteps = self.solution.len(),
            agents = self.solution.agent_count(),
            reference_agents = self.reference.as_ref().map(ReferencePath::agent_count),
            "plan loaded"
        );
        ParsedPlan {
            solution: self.solution,
            reference: self.reference,
        }
    }

    fn feed_primary(&mut self, line: &str) -> Result<()> {
        if !line.contains(PLAN_ROW_MARKER) {
            return Ok(());
        }

        let config = self.config_from(line)?;
        let timestep = self.solution.len();
        if config.is_empty() {
            warn!(line = self.line, timestep, "plan row has no coordinates");
        } else if timestep > 0 && config.len() != self.solution.agent_count() {
            warn!(
                line = self.line,
                timestep,
                expected = self.solution.agent_count(),
                found = config.len(),
                "plan row length differs from the initial configuration"
            );
        }
        debug!(timestep, agents = config.len(), "plan row");

        // Empty rows are kept: downstream validation decides what to do with them.
        self.solution.push(config);
        Ok(())
    }

    fn feed_reference(&mut self, line: &str) -> Result<()> {
        if let Some(size) = token::history_size(line) {
            let size = self.token(size)?;
            info!(history_size = size, "history size");
            self.reference_mut().history_size = Some(size);
            return Ok(());
        }

        if let Some(step) = token::step_header(line) {
            let step = self.token(step)?;
            self.mode = Mode::Reference {
                current_step: Some(step),
                current_agent: None,
            };
            return Ok(());
        }

        if let Some(header) = token::agent_header(line) {
            let (agent, rest) = self.token(header)?;
            let limit = self.agent_limit();
            if agent >= limit {
                return Err(ParseError::AgentOutOfRange {
                    line: self.line,
                    agent,
                    limit,
                });
            }
            let current_step = match &mut self.mode {
                Mode::Reference {
                    current_step,
                    current_agent,
                } => {
                    *current_agent = Some(agent);
                    *current_step
                }
                Mode::Primary => None,
            };

            let forecast = self.config_from(rest)?;
            debug!(step = ?current_step, agent, poses = forecast.len(), "forecast");

            if let Some(forecasts) = self.reference_mut().ensure_agent(agent) {
                if !forecast.is_empty() {
                    forecasts.push(forecast);
                }
            }
        }

        Ok(())
    }

    /// Reads every coordinate token in `text` and resolves it to a pose.
    fn config_from(&self, text: &str) -> Result<Config> {
        token::coordinates(text)
            .map(|token| {
                let token = self.token(token)?;
                let node = self.graph.node_at(token.x, token.y).ok_or(
                    ParseError::MalformedCoordinate {
                        line: self.line,
                        x: token.x,
                        y: token.y,
                    },
                )?;
                Ok(Pose::new(node, token.orientation))
            })
            .collect()
    }

    fn token<T>(&self, result: core::result::Result<T, TokenError>) -> Result<T> {
        let line = self.line;
        result.map_err(|e| match e {
            TokenError::InvalidNumber(text) => ParseError::InvalidNumber { line, text },
            TokenError::UnknownOrientation(tag) => ParseError::UnknownOrientation { line, tag },
        })
    }

    /// Reference agents must exist in the primary plan, when there is one.
    fn agent_limit(&self) -> usize {
        match self.solution.agent_count() {
            0 => MAX_REFERENCE_AGENTS,
            agents => agents,
        }
    }

    fn reference_mut(&mut self) -> &mut ReferencePath {
        self.reference.get_or_insert_with(ReferencePath::new)
    }
}

/// Parses a whole plan from any buffered reader.
///
/// Lines are decoded lossily, so stray non-UTF-8 bytes in noise lines are
/// skipped like any other unrecognised text.
pub fn parse_reader<G: Graph + ?Sized>(mut reader: impl BufRead, graph: &G) -> Result<ParsedPlan> {
    let mut parser = SolutionParser::new(graph);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        parser.feed(&String::from_utf8_lossy(&buf))?;
    }
    Ok(parser.finish())
}

/// Parses a whole plan held in memory.
pub fn parse_str<G: Graph + ?Sized>(text: &str, graph: &G) -> Result<ParsedPlan> {
    parse_reader(text.as_bytes(), graph)
}

/// Reads and parses a plan file.
pub fn read_file<G: Graph + ?Sized>(path: impl AsRef<Path>, graph: &G) -> Result<ParsedPlan> {
    let path = path.as_ref();
    info!(path = %path.display(), "reading solution file");
    let file = fs::File::open(path)?;
    parse_reader(io::BufReader::new(file), graph)
}
