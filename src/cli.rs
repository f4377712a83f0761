//! CLI interface for mapf-replay.
//!
//! Every subcommand loads a map and a plan, then answers one question about
//! the replay. Output is human-readable by default and JSON with `--json`.
//! `play` always writes JSON, one frame per line.

mod format;

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use crate::config::Config;
use crate::graph::{Graph, Grid};
use crate::parse::{self, ParsedPlan};
use crate::playback::{Command as PlaybackCommand, Frame, Playback};

use format::{format_agents, format_overlay, format_summary};

/// Replay multi-agent plans on grid maps.
#[derive(Debug, Parser)]
#[command(name = "mapf-replay", after_long_help = EXAMPLES_HELP)]
pub struct Cli {
    /// Read configuration from this file instead of `~/.mapf-replay/config.toml`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug events to stderr. `MAPF_REPLAY_LOG` takes precedence.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

const EXAMPLES_HELP: &str = r"Examples:
  mapf-replay inspect random-32-32-10.map result.txt
  mapf-replay sample random-32-32-10.map result.txt --time 3.5
  mapf-replay overlay random-32-32-10.map result.txt --step 2 --json
  mapf-replay play random-32-32-10.map result.txt --ticks 50 --at 10:lines";

/// Map and plan inputs shared by every subcommand.
#[derive(Debug, clap::Args)]
pub struct Inputs {
    /// Grid map in MovingAI `.map` format.
    map: PathBuf,

    /// Plan file written by the solver.
    plan: PathBuf,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Summarize a plan: map size, agents, timesteps, reference section.
    Inspect {
        #[command(flatten)]
        inputs: Inputs,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Print the interpolated state of every agent at a point in time.
    Sample {
        #[command(flatten)]
        inputs: Inputs,

        /// Playback time in timesteps. Clamped to the plan.
        #[arg(long)]
        time: f64,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Print the forecast polylines recorded at a step.
    Overlay {
        #[command(flatten)]
        inputs: Inputs,

        /// Position in each agent's forecast list.
        #[arg(long)]
        step: usize,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Run playback headlessly, writing one JSON frame per tick.
    ///
    /// Starts from the configured playback settings. Commands given with
    /// `--at` are applied before the tick they name.
    Play {
        #[command(flatten)]
        inputs: Inputs,

        /// Number of ticks to run.
        #[arg(long, default_value_t = 100)]
        ticks: usize,

        /// Initial speed in timesteps per tick. Clamped to the configured limits.
        #[arg(long)]
        speed: Option<f64>,

        /// Stop at the final timestep instead of wrapping to the start.
        #[arg(long)]
        no_loop: bool,

        /// Apply a command before a tick, e.g. `5:lines`. Can be repeated.
        ///
        /// Commands: play, loop, reset, forward, back, faster, slower,
        /// reference, lines.
        #[arg(long = "at", value_name = "TICK:COMMAND")]
        at: Vec<Scheduled>,
    },
}

impl Command {
    fn inputs(&self) -> &Inputs {
        match self {
            Self::Inspect { inputs, .. }
            | Self::Sample { inputs, .. }
            | Self::Overlay { inputs, .. }
            | Self::Play { inputs, .. } => inputs,
        }
    }
}

/// A playback command scheduled for a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduled {
    pub tick: usize,
    pub command: PlaybackCommand,
}

impl FromStr for Scheduled {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (tick, command) = s
            .split_once(':')
            .ok_or_else(|| format!("expected TICK:COMMAND, got {s:?}"))?;
        let tick = tick
            .trim()
            .parse()
            .map_err(|_| format!("invalid tick {tick:?}"))?;
        let command = command.trim().parse().map_err(|e| format!("{e}"))?;
        Ok(Self { tick, command })
    }
}

/// Run the CLI, returning an error message on failure.
pub fn run() -> Result<(), String> {
    let cli = Cli::parse();
    crate::logging::init(cli.verbose);

    let config = Config::load(cli.config.as_deref())?;
    let inputs = cli.command.inputs();
    check_inputs(inputs)?;
    let (grid, plan) = load(inputs)?;

    match cli.command {
        Command::Inspect { json, .. } => cmd_inspect(&grid, &plan, json),
        Command::Sample { time, json, .. } => cmd_sample(&plan, time, json),
        Command::Overlay { step, json, .. } => cmd_overlay(&plan, step, json),
        Command::Play {
            ticks,
            speed,
            no_loop,
            ref at,
            ..
        } => cmd_play(&config, &plan, ticks, speed, no_loop, at),
    }
}

/// Refuse missing inputs up front, with a usage hint.
fn check_inputs(inputs: &Inputs) -> Result<(), String> {
    for (what, path) in [("map", &inputs.map), ("plan", &inputs.plan)] {
        if !path.is_file() {
            return Err(format!(
                "{what} file not found: {}\n\n\
                 Usage: mapf-replay <COMMAND> <MAP> <PLAN>\n\
                 e.g.   mapf-replay inspect random-32-32-10.map result.txt",
                path.display()
            ));
        }
    }
    Ok(())
}

fn load(inputs: &Inputs) -> Result<(Grid, ParsedPlan), String> {
    let grid = Grid::load(&inputs.map)
        .map_err(|e| format!("failed to load map {}: {e}", inputs.map.display()))?;
    info!(
        path = %inputs.map.display(),
        width = grid.width(),
        height = grid.height(),
        "loaded map"
    );

    let plan = parse::read_file(&inputs.plan, &grid)
        .map_err(|e| format!("failed to parse plan {}: {e}", inputs.plan.display()))?;
    Ok((grid, plan))
}

fn playback(plan: &ParsedPlan) -> Result<Playback<'_>, String> {
    Playback::new(&plan.solution, plan.reference.as_ref())
        .map_err(|e| format!("cannot replay plan: {e}"))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), String> {
    let json =
        serde_json::to_string_pretty(value).map_err(|e| format!("failed to encode JSON: {e}"))?;
    println!("{json}");
    Ok(())
}

/// What `inspect` reports.
#[derive(Debug, Serialize)]
pub(crate) struct Summary {
    pub width: u32,
    pub height: u32,
    pub passable: usize,
    pub timesteps: usize,
    pub agents: usize,
    /// Why the plan cannot be replayed, if it cannot.
    pub problem: Option<String>,
    pub reference: Option<ReferenceSummary>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReferenceSummary {
    pub history_size: Option<usize>,
    pub agents: usize,
    /// Longest forecast list of any agent.
    pub steps: usize,
}

fn summarize(grid: &Grid, plan: &ParsedPlan) -> Summary {
    let reference = plan.reference.as_ref().map(|r| ReferenceSummary {
        history_size: r.history_size,
        agents: r.agent_count(),
        steps: (0..r.agent_count())
            .map(|agent| r.forecasts(agent).len())
            .max()
            .unwrap_or(0),
    });

    Summary {
        width: grid.width(),
        height: grid.height(),
        passable: grid.node_count(),
        timesteps: plan.solution.len(),
        agents: plan.solution.agent_count(),
        problem: Playback::new(&plan.solution, None).err().map(|e| e.to_string()),
        reference,
    }
}

fn cmd_inspect(grid: &Grid, plan: &ParsedPlan, json: bool) -> Result<(), String> {
    let summary = summarize(grid, plan);
    if json {
        return print_json(&summary);
    }
    print!("{}", format_summary(&summary));
    Ok(())
}

fn cmd_sample(plan: &ParsedPlan, time: f64, json: bool) -> Result<(), String> {
    let playback = playback(plan)?;
    let agents = playback.agents_at(time);
    if json {
        return print_json(&agents);
    }
    print!("{}", format_agents(&agents));
    Ok(())
}

fn cmd_overlay(plan: &ParsedPlan, step: usize, json: bool) -> Result<(), String> {
    if plan.reference.is_none() {
        return Err("plan has no reference section (local_guidance=)".to_string());
    }
    let playback = playback(plan)?;
    let traces = playback.overlay(step);
    if json {
        return print_json(&traces);
    }
    if traces.is_empty() {
        println!("No forecasts at step {step}");
        return Ok(());
    }
    print!("{}", format_overlay(&traces));
    Ok(())
}

/// One line of `play` output.
#[derive(Debug, Serialize)]
struct TickFrame<'a> {
    tick: usize,
    playing: bool,
    looping: bool,
    speed: f64,
    #[serde(flatten)]
    frame: Frame<'a>,
}

fn cmd_play(
    config: &Config,
    plan: &ParsedPlan,
    ticks: usize,
    speed: Option<f64>,
    no_loop: bool,
    scheduled: &[Scheduled],
) -> Result<(), String> {
    let playback = playback(plan)?;
    let mut state = playback.start(config.playback.clone());
    if let Some(speed) = speed {
        state.set_speed(speed);
    }
    if no_loop {
        state.looping = false;
    }

    for tick in 0..ticks {
        for s in scheduled.iter().filter(|s| s.tick == tick) {
            state.apply(s.command);
        }
        state.tick();

        let line = TickFrame {
            tick,
            playing: state.playing,
            looping: state.looping,
            speed: state.speed,
            frame: playback.frame(&state),
        };
        let json =
            serde_json::to_string(&line).map_err(|e| format!("failed to encode JSON: {e}"))?;
        println!("{json}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn scheduled_command_parses() {
        let s: Scheduled = "12:lines".parse().unwrap();
        assert_eq!(s.tick, 12);
        assert_eq!(s.command, PlaybackCommand::CycleLineMode);

        assert!("lines".parse::<Scheduled>().is_err());
        assert!("x:lines".parse::<Scheduled>().is_err());
        assert!("3:jump".parse::<Scheduled>().unwrap_err().contains("unknown command"));
    }

    #[test]
    fn play_arguments_parse() {
        let cli = Cli::try_parse_from([
            "mapf-replay",
            "play",
            "a.map",
            "plan.txt",
            "--ticks",
            "5",
            "--at",
            "1:faster",
            "--at",
            "2:reference",
            "--no-loop",
        ])
        .unwrap();

        let Command::Play {
            ticks, no_loop, at, ..
        } = cli.command
        else {
            panic!("expected play");
        };
        assert_eq!(ticks, 5);
        assert!(no_loop);
        assert_eq!(at.len(), 2);
    }

    #[test]
    fn missing_plan_prints_usage() {
        let dir = tempfile::tempdir().unwrap();
        let map = dir.path().join("a.map");
        fs::write(&map, "height 1\nwidth 1\nmap\n.\n").unwrap();

        let inputs = Inputs {
            map,
            plan: dir.path().join("missing.txt"),
        };
        let err = check_inputs(&inputs).unwrap_err();
        assert!(err.contains("plan file not found"));
        assert!(err.contains("Usage:"));
    }

    #[test]
    fn loads_map_and_plan_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let map = dir.path().join("a.map");
        let plan = dir.path().join("plan.txt");
        fs::write(&map, "type octile\nheight 2\nwidth 3\nmap\n...\n.@.\n").unwrap();
        fs::write(&plan, "0:(0,0),(2,1),\n1:(1,0),(2,0),\n").unwrap();

        let inputs = Inputs { map, plan };
        check_inputs(&inputs).unwrap();
        let (grid, plan) = load(&inputs).unwrap();

        let summary = summarize(&grid, &plan);
        assert_eq!((summary.width, summary.height), (3, 2));
        assert_eq!(summary.passable, 5);
        assert_eq!(summary.timesteps, 2);
        assert_eq!(summary.agents, 2);
        assert!(summary.problem.is_none());
        assert!(summary.reference.is_none());
    }

    #[test]
    fn blocked_coordinate_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        let map = dir.path().join("a.map");
        let plan = dir.path().join("plan.txt");
        fs::write(&map, "height 1\nwidth 2\nmap\n.@\n").unwrap();
        fs::write(&plan, "0:(1,0),\n").unwrap();

        let err = load(&Inputs { map, plan }).unwrap_err();
        assert!(err.contains("failed to parse plan"));
        assert!(err.contains("line 1"));
    }

    #[test]
    fn summary_reports_unplayable_plan() {
        let grid = Grid::open(4, 4).unwrap();
        let plan = parse::parse_str(
            "0:(0,0),(1,1),\n1:(0,1),\nlocal_guidance=\nhistory_size=2\nstep0:\nagent1:(1,1),(1,2),\n",
            &grid,
        )
        .unwrap();

        let summary = summarize(&grid, &plan);
        assert!(summary.problem.unwrap().contains("timestep 1"));
        let reference = summary.reference.unwrap();
        assert_eq!(reference.history_size, Some(2));
        assert_eq!(reference.agents, 2);
        assert_eq!(reference.steps, 1);
    }
}
