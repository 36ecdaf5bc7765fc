use std::f32::consts::FRAC_PI_2;

use crate::caster::HitResult;

/// Brightest wall shade, seen at distance 0.
const WALL_SHADE_MAX: f32 = 150.0;
/// Darkest floor shade, reached at (and above) the horizon.
const FLOOR_SHADE_MIN: f32 = 50.0;

/// Vertical layout of one screen column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub ceiling: i32,
    pub floor: i32,
    pub wall_shade: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Fog,
    Wall,
    Floor,
}

/// Shading constants shared by every column of a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shading {
    /// Distance at which walls fade completely into the fog.
    pub shade_scale: f32,
    /// Minimum wall brightness, also used as the fog colour.
    pub fog: u8,
}

/// Turns a hit distance into ceiling/floor rows and a wall shade.
pub fn project(hit: &HitResult, viewport_height: usize, shading: &Shading) -> ColumnSpec {
    let h = viewport_height as f32;
    // keeps very close hits from overflowing `floor`
    let ceiling = (h / 2.0 - h / hit.distance).floor().max(-h) as i32;
    let floor = viewport_height as i32 - ceiling;

    ColumnSpec {
        ceiling,
        floor,
        wall_shade: wall_shade(hit.distance, shading),
    }
}

/// `150 - floor(distance / scale * 150)`, never below the fog floor.
#[inline]
pub fn wall_shade(distance: f32, shading: &Shading) -> u8 {
    let shade = WALL_SHADE_MAX - ((distance / shading.shade_scale) * WALL_SHADE_MAX).floor();
    shade.max(shading.fog as f32) as u8
}

/// Floor gradient: brightest right below the horizon, dimming to the bottom.
#[inline]
pub fn floor_shade(row: usize, viewport_height: usize) -> u8 {
    let half = viewport_height as f32 / 2.0;
    let t = (row as f32 - half) / half;
    ((t * FRAC_PI_2).sin() * 255.0).max(FLOOR_SHADE_MIN).round() as u8
}

impl ColumnSpec {
    #[inline]
    pub fn classify(&self, row: i32) -> RowKind {
        if row < self.ceiling {
            RowKind::Fog
        } else if row > self.ceiling && row <= self.floor {
            RowKind::Wall
        } else {
            RowKind::Floor
        }
    }

    /// Height of the wall strip in rows.
    #[inline]
    pub fn strip_height(&self) -> i32 {
        self.floor - self.ceiling
    }

    /// Grey level of `row`; `floor_shade` is the precomputed floor gradient for it.
    #[inline]
    pub fn shade(&self, row: usize, floor_shade: u8, fog: u8) -> u8 {
        match self.classify(row as i32) {
            RowKind::Fog => fog,
            RowKind::Wall => self.wall_shade,
            RowKind::Floor => floor_shade,
        }
    }
}
