/// CLI configuration
use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use trill_playback::PlayerConfig;

/// Default config file, read from the working directory when present
pub const DEFAULT_CONFIG_FILE: &str = "trill.toml";

/// Effective settings: file, then `TRILL_` environment, then flags
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    /// Frame loop period in milliseconds
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,

    #[serde(default)]
    pub player: PlayerConfig,
}

/// Command-line overrides, applied last
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub volume: Option<u8>,
    pub loop_enabled: Option<bool>,
    pub pan_enabled: Option<bool>,
    pub autoplay: Option<bool>,
    pub frame_interval_ms: Option<u64>,
}

impl Settings {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; without one, `trill.toml` is read if
    /// present. Environment variables use the `TRILL_` prefix and `__` for
    /// nesting, e.g. `TRILL_PLAYER__VOLUME=40`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::Config(format!(
                        "config file {} not found",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables (prefixed with TRILL_)
        settings = settings.add_source(
            config::Environment::with_prefix("TRILL")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        Ok(settings.build()?.try_deserialize()?)
    }

    /// Apply command-line overrides
    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(volume) = overrides.volume {
            self.player.volume = volume;
        }
        if let Some(loop_enabled) = overrides.loop_enabled {
            self.player.loop_enabled = loop_enabled;
        }
        if let Some(pan_enabled) = overrides.pan_enabled {
            self.player.pan_enabled = pan_enabled;
        }
        if let Some(autoplay) = overrides.autoplay {
            self.player.autoplay = autoplay;
        }
        if let Some(frame_interval_ms) = overrides.frame_interval_ms {
            self.frame_interval_ms = frame_interval_ms;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.player.volume > 100 {
            return Err(CliError::Config(format!(
                "volume {} is outside 0-100",
                self.player.volume
            )));
        }

        if !(1..=1000).contains(&self.frame_interval_ms) {
            return Err(CliError::Config(format!(
                "frame_interval_ms {} is outside 1-1000",
                self.frame_interval_ms
            )));
        }

        Ok(())
    }

    /// Settings rendered as TOML, in the shape `load` reads
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CliError::Config(e.to_string()))
    }
}

fn default_frame_interval_ms() -> u64 {
    16
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            frame_interval_ms: default_frame_interval_ms(),
            player: PlayerConfig::default(),
        }
    }
}
