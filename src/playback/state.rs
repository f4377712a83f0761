//! Playback state and the commands that drive it.
//!
//! The engine itself is stateless. Everything that changes between frames
//! (time, speed, the play and loop flags, what is overlaid) lives here and
//! is only touched by [`PlaybackState::tick`] and [`PlaybackState::apply`].

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which guide lines to draw from each agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineMode {
    #[default]
    None,

    /// A straight line from the agent to its goal.
    Straight,

    /// The remaining moves of the agent's plan.
    Path,
}

impl LineMode {
    /// The mode after this one, in cycling order.
    pub fn next(self) -> Self {
        match self {
            Self::Straight => Self::Path,
            Self::Path => Self::None,
            Self::None => Self::Straight,
        }
    }
}

/// Initial values and limits for a playback session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PlaybackSettings {
    /// Time advanced per tick, in timesteps.
    pub speed: f64,
    pub speed_min: f64,
    pub speed_max: f64,
    /// Change applied by one speed-up or speed-down command.
    pub speed_step: f64,
    /// Start playing immediately.
    pub autoplay: bool,
    #[serde(rename = "loop")]
    pub looping: bool,
    pub show_reference: bool,
    pub line_mode: LineMode,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            speed: 0.1,
            speed_min: 0.001,
            speed_max: 1.0,
            speed_step: 0.001,
            autoplay: true,
            looping: true,
            show_reference: true,
            line_mode: LineMode::None,
        }
    }
}

impl PlaybackSettings {
    /// Checks `0 < speed_min <= speed <= speed_max` and `speed_step > 0`.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.speed_min > 0.0) {
            return Err(format!("speed-min must be > 0 (got {})", self.speed_min));
        }
        if !(self.speed_min <= self.speed_max) {
            return Err(format!(
                "speed-min ({}) must not exceed speed-max ({})",
                self.speed_min, self.speed_max
            ));
        }
        if !(self.speed_min..=self.speed_max).contains(&self.speed) {
            return Err(format!(
                "speed ({}) must be within [{}, {}]",
                self.speed, self.speed_min, self.speed_max
            ));
        }
        if !(self.speed_step > 0.0) {
            return Err(format!("speed-step must be > 0 (got {})", self.speed_step));
        }
        Ok(())
    }
}

/// A discrete command from the user or a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    TogglePlay,
    ToggleLoop,
    Reset,
    StepForward,
    StepBackward,
    SpeedUp,
    SpeedDown,
    ToggleReference,
    CycleLineMode,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown command {0:?} (expected play, loop, reset, forward, back, faster, slower, reference or lines)")]
pub struct UnknownCommand(pub String);

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "play" | "pause" => Ok(Self::TogglePlay),
            "loop" => Ok(Self::ToggleLoop),
            "reset" => Ok(Self::Reset),
            "forward" => Ok(Self::StepForward),
            "back" => Ok(Self::StepBackward),
            "faster" => Ok(Self::SpeedUp),
            "slower" => Ok(Self::SpeedDown),
            "reference" => Ok(Self::ToggleReference),
            "lines" => Ok(Self::CycleLineMode),
            other => Err(UnknownCommand(other.to_string())),
        }
    }
}

/// Mutable playback state for one session over a plan with horizon `T`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackState {
    /// Continuous playback time in `[0, T]`.
    pub time: f64,
    pub speed: f64,
    pub playing: bool,
    pub looping: bool,
    pub show_reference: bool,
    pub line_mode: LineMode,
    #[serde(skip)]
    horizon: usize,
    #[serde(skip)]
    settings: PlaybackSettings,
}

impl PlaybackState {
    pub fn new(horizon: usize, settings: PlaybackSettings) -> Self {
        Self {
            time: 0.0,
            speed: settings.speed,
            playing: settings.autoplay,
            looping: settings.looping,
            show_reference: settings.show_reference,
            line_mode: settings.line_mode,
            horizon,
            settings,
        }
    }

    /// Sets the speed, clamped to the configured limits.
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed.clamp(self.settings.speed_min, self.settings.speed_max);
    }

    /// Advances time by one tick of `speed`, if playing.
    ///
    /// Past the end, time wraps to 0 when looping and stops at `T` otherwise.
    pub fn tick(&mut self) {
        if !self.playing {
            return;
        }
        let end = self.end();
        let next = self.time + self.speed;
        self.time = if next <= end {
            next
        } else if self.looping {
            0.0
        } else {
            end
        };
    }

    pub fn apply(&mut self, command: Command) {
        match command {
            Command::TogglePlay => self.playing = !self.playing,
            Command::ToggleLoop => self.looping = !self.looping,
            Command::Reset => self.time = 0.0,
            Command::StepForward => self.time = (self.time + self.speed).min(self.end()),
            Command::StepBackward => self.time = (self.time - self.speed).max(0.0),
            Command::SpeedUp => {
                self.speed = (self.speed + self.settings.speed_step).min(self.settings.speed_max);
            }
            Command::SpeedDown => {
                self.speed = (self.speed - self.settings.speed_step).max(self.settings.speed_min);
            }
            Command::ToggleReference => self.show_reference = !self.show_reference,
            Command::CycleLineMode => self.line_mode = self.line_mode.next(),
        }
    }

    fn end(&self) -> f64 {
        self.horizon as f64
    }
}
