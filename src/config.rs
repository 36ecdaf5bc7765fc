//! Startup configuration
//!
//! Every tunable of the renderer and controls lives in [`Config`]. Defaults
//! reproduce the classic look; a JSON file may override any subset of fields.

use std::f32::consts::FRAC_PI_4;
use std::fmt;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::caster::DEFAULT_STEP;
use crate::map::{Map, MapError};
use crate::projector::Shading;

/// Smallest allowed `step` as a fraction of `max_depth`.
pub const MIN_STEP_FRACTION: f32 = 1e-5;

/// What the left/right keys do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ControlScheme {
    /// A/D strafe, the pointer turns while captured
    #[default]
    Strafe,
    /// A/D turn by a fixed angle per frame, the pointer turns freely
    Turn,
}

impl ControlScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlScheme::Strafe => "strafe",
            ControlScheme::Turn => "turn",
        }
    }
}

/// Where the map comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapSource {
    Builtin(String),
    File(PathBuf),
}

impl Default for MapSource {
    fn default() -> Self {
        MapSource::Builtin("open".to_string())
    }
}

impl MapSource {
    pub fn load(&self) -> Result<Map, MapError> {
        match self {
            MapSource::Builtin(name) => Map::builtin(name),
            MapSource::File(path) => Map::load(path),
        }
    }
}

impl fmt::Display for MapSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapSource::Builtin(name) => write!(f, "built-in '{name}'"),
            MapSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // === Projection ===
    /// Horizontal field of view in radians
    pub fov: f32,
    /// Ray range in map cells; misses are drawn at this distance
    pub max_depth: f32,
    /// Ray march sample spacing in map cells
    pub step: f32,
    /// Distance at which wall shade reaches zero before the fog clamp
    pub shade_scale: f32,
    /// Fog colour and minimum wall brightness
    pub fog: u8,

    // === Viewport ===
    pub viewport_width: usize,
    pub viewport_height: usize,
    /// Block-average tile size, 1 disables downsampling
    pub downsample: usize,

    // === Controls ===
    pub scheme: ControlScheme,
    /// Cells per frame moving forward/backward
    pub move_speed: f32,
    /// Cells per frame strafing
    pub strafe_speed: f32,
    /// Radians per frame for key turning
    pub turn_speed: f32,
    /// Radians per pointer count
    pub pointer_sensitivity: f32,
    /// Pointer motion only turns while the cursor is captured
    pub require_capture: bool,

    pub map: MapSource,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fov: FRAC_PI_4,
            max_depth: 16.0,
            step: DEFAULT_STEP,
            shade_scale: 16.0,
            fog: 50,

            viewport_width: 1024,
            viewport_height: 768,
            downsample: 1,

            scheme: ControlScheme::Strafe,
            move_speed: 0.1,
            strafe_speed: 0.05,
            turn_speed: 0.025,
            pointer_sensitivity: 0.001,
            require_capture: true,

            map: MapSource::default(),
        }
    }
}

impl Config {
    /// Read a JSON config file; missing fields keep their defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Config = serde_json::from_str(&json).map_err(ConfigError::Json)?;
        config.validate()?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Pretty JSON of every field, loadable again with [`Config::load`]
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(ConfigError::Json)
    }

    /// Switch control scheme along with the pointer behaviour that goes with it
    pub fn apply_scheme(&mut self, scheme: ControlScheme) {
        self.scheme = scheme;
        match scheme {
            ControlScheme::Strafe => {
                self.pointer_sensitivity = 0.001;
                self.require_capture = true;
            }
            ControlScheme::Turn => {
                self.pointer_sensitivity = 0.005;
                self.require_capture = false;
            }
        }
    }

    pub fn shading(&self) -> Shading {
        Shading {
            shade_scale: self.shade_scale,
            fog: self.fog,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("fov", self.fov),
            ("max_depth", self.max_depth),
            ("step", self.step),
            ("shade_scale", self.shade_scale),
        ];
        for (field, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be a positive number, got {value}"),
                });
            }
        }
        if self.step >= self.max_depth {
            return Err(ConfigError::Invalid {
                field: "step",
                reason: format!("must be smaller than max_depth ({})", self.max_depth),
            });
        }
        if self.step < self.max_depth * MIN_STEP_FRACTION {
            return Err(ConfigError::Invalid {
                field: "step",
                reason: format!(
                    "{} is below max_depth * {MIN_STEP_FRACTION}",
                    self.step
                ),
            });
        }
        if self.viewport_width == 0 || self.viewport_height == 0 {
            return Err(ConfigError::Invalid {
                field: "viewport",
                reason: format!(
                    "{}x{} has no pixels",
                    self.viewport_width, self.viewport_height
                ),
            });
        }
        if self.downsample == 0 {
            return Err(ConfigError::Invalid {
                field: "downsample",
                reason: "block size must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Json(serde_json::Error),
    Invalid {
        field: &'static str,
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "could not read config {}: {source}", path.display())
            }
            Self::Json(e) => write!(f, "config JSON: {e}"),
            Self::Invalid { field, reason } => write!(f, "invalid {field}: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json(e) => Some(e),
            Self::Invalid { .. } => None,
        }
    }
}
