//! First-person grid ray caster.
//!
//! Per frame: `input` moves the `player` through the `map`, the `renderer`
//! casts one ray per screen column (`caster`), turns each hit into a shaded
//! strip (`projector`) and fills an RGBA frame that `scaler` can block-average
//! and stretch onto the window surface.

pub mod caster;
pub mod config;
pub mod input;
pub mod map;
pub mod player;
pub mod projector;
pub mod renderer;
pub mod scaler;

pub use caster::{HitResult, cast};
pub use config::{Config, ConfigError, ControlScheme, MapSource};
pub use input::{Action, Controller, InputState};
pub use map::{Cell, Map, MapError};
pub use player::Player;
pub use projector::{ColumnSpec, Shading, project};
pub use renderer::{Compositor, Frame};
