//! mapf-replay configuration.
//!
//! Loaded from `~/.mapf-replay/config.toml` when present. Every key is
//! optional; missing ones fall back to the built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::playback::PlaybackSettings;

/// mapf-replay configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Initial playback state and speed limits.
    pub playback: PlaybackSettings,
}

impl Config {
    /// Load config from `explicit`, or from the default path.
    ///
    /// A missing default file yields the defaults. A missing explicit file
    /// is an error, as is any unreadable or invalid file.
    pub fn load(explicit: Option<&Path>) -> Result<Self, String> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(format!("no config file found at {}", path.display()));
                }
                path.to_path_buf()
            }
            None => match Self::path() {
                Some(path) if path.exists() => path,
                _ => {
                    debug!("no config file, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        Self::from_file(&path)
    }

    /// Read and validate the config at `path`.
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;

        let config: Self = toml::from_str(&contents)
            .map_err(|e| format!("invalid config at {}: {e}", path.display()))?;

        config
            .playback
            .validate()
            .map_err(|e| format!("invalid config at {}: {e}", path.display()))?;

        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// The config file path: `~/.mapf-replay/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".mapf-replay").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::playback::LineMode;

    fn write(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn full_file_is_read() {
        let (_dir, path) = write(
            r#"
[playback]
speed = 0.25
speed-min = 0.05
speed-max = 2.0
speed-step = 0.05
autoplay = false
loop = false
show-reference = false
line-mode = "path"
"#,
        );

        let config = Config::load(Some(&path)).unwrap();
        let playback = config.playback;
        assert_eq!(playback.speed, 0.25);
        assert_eq!(playback.speed_max, 2.0);
        assert!(!playback.autoplay);
        assert!(!playback.looping);
        assert!(!playback.show_reference);
        assert_eq!(playback.line_mode, LineMode::Path);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let (_dir, path) = write("[playback]\nspeed = 0.5\n");

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.playback.speed, 0.5);
        assert_eq!(config.playback.speed_min, PlaybackSettings::default().speed_min);
        assert!(config.playback.looping);
    }

    #[test]
    fn empty_file_is_default() {
        let (_dir, path) = write("");
        assert_eq!(Config::load(Some(&path)).unwrap(), Config::default());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(err.contains("no config file"));
    }

    #[test]
    fn invalid_toml_names_the_file() {
        let (_dir, path) = write("[playback\n");

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(err.contains("invalid config"));
        assert!(err.contains("config.toml"));
    }

    #[test]
    fn unknown_line_mode_is_rejected() {
        let (_dir, path) = write("[playback]\nline-mode = \"zigzag\"\n");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn out_of_range_speed_is_rejected() {
        let (_dir, path) = write("[playback]\nspeed = 5.0\n");

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(err.contains("speed"));
    }
}
