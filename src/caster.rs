//! Fixed-step ray march through the map grid.
//!
//! The ray samples one point every `step` map units and reports the first
//! sample that lands in a wall cell. There is no exact intersection: the
//! reported distance overshoots the true wall face by less than one step.
//!
//! A ray passing diagonally through the corner of a wall cell can sample the
//! open cells on either side and never the wall itself, so it tunnels
//! through. Walls are always at least one cell thick, which keeps this to
//! grazing corner hits as long as `step` stays well below one cell.

use crate::map::{Cell, Map};

/// Default sample spacing in map cells.
pub const DEFAULT_STEP: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitResult {
    pub distance: f32,
    /// `false` when the ray ran out of range or left the map.
    pub hit: bool,
}

impl HitResult {
    #[inline]
    pub fn miss(max_depth: f32) -> Self {
        Self {
            distance: max_depth,
            hit: false,
        }
    }
}

/// Marches from `origin` along `angle` (0 = +Y, increasing towards +X).
pub fn cast(origin: [f32; 2], angle: f32, map: &Map, max_depth: f32, step: f32) -> HitResult {
    if !(step > 0.0) {
        return HitResult::miss(max_depth);
    }

    let eye_x = angle.sin();
    let eye_y = angle.cos();

    // sample index instead of a running sum, so tiny steps cannot stall
    let samples = (max_depth / step).ceil() as u64;
    for n in 1..=samples {
        let distance = n as f32 * step;
        if distance >= max_depth {
            break;
        }

        let test_x = origin[0] + eye_x * distance;
        let test_y = origin[1] + eye_y * distance;

        // cell_at treats x >= width and y >= height as outside
        match map.cell_at(test_x, test_y) {
            None => return HitResult::miss(max_depth),
            Some(Cell::Wall) => {
                return HitResult {
                    distance,
                    hit: true,
                };
            }
            Some(Cell::Empty) => {}
        }
    }

    HitResult::miss(max_depth)
}
