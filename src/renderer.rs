use rayon::{
    iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

use crate::{
    caster::cast,
    config::Config,
    map::Map,
    player::Player,
    projector::{ColumnSpec, floor_shade, project},
    scaler::downsample,
};

/// RGBA8 pixel buffer, row-major.
pub struct Frame {
    pixels: Vec<u8>,
    width: usize,
    height: usize,
}

impl Frame {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height * 4],
            width,
            height,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// RGBA of the pixel at (x, y), `None` outside the frame.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }
}

/// Owns the frame buffer and per-column scratch, reused every frame.
pub struct Compositor {
    frame: Frame,
    columns: Vec<ColumnSpec>,
}

impl Compositor {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            frame: Frame::new(width, height),
            columns: Vec::with_capacity(width),
        }
    }

    #[inline]
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Casts one ray per column, shades every row and returns the finished
    /// frame, ready to present.
    pub fn render(&mut self, map: &Map, player: &Player, config: &Config) -> &Frame {
        let width = self.frame.width;
        let height = self.frame.height;
        if width == 0 || height == 0 {
            return &self.frame;
        }
        let shading = config.shading();

        (0..width)
            .into_par_iter()
            .map(|column| {
                let angle = player.ray_angle(column, width, config.fov);
                let hit = cast(player.pos, angle, map, config.max_depth, config.step);
                project(&hit, height, &shading)
            })
            .collect_into_vec(&mut self.columns);

        let columns = &self.columns;
        let fog = config.fog;
        self.frame
            .pixels
            .par_chunks_mut(width * 4)
            .enumerate()
            .for_each(|(row, line)| {
                let floor = floor_shade(row, height);
                for (px, strip) in line.chunks_exact_mut(4).zip(columns) {
                    let v = strip.shade(row, floor, fog);
                    px.copy_from_slice(&[v, v, v, 255]);
                }
            });

        downsample(&mut self.frame.pixels, width, config.downsample);

        &self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(width: usize, height: usize) -> Config {
        Config {
            viewport_width: width,
            viewport_height: height,
            ..Config::default()
        }
    }

    #[test]
    fn frame_has_one_rgba_pixel_per_cell() {
        let mut compositor = Compositor::new(40, 30);
        let map = Map::enclosed(16, 16);
        let player = Player::spawn(&map);
        let frame = compositor.render(&map, &player, &config(40, 30));
        assert_eq!(frame.pixels().len(), 40 * 30 * 4);
        assert!(frame.pixels().chunks_exact(4).all(|p| p[3] == 255));
        assert_eq!(frame.pixel(40, 0), None);
    }

    #[test]
    fn centre_column_is_fog_wall_floor_top_to_bottom() {
        let (w, h) = (64, 100);
        let mut compositor = Compositor::new(w, h);
        let map = Map::enclosed(16, 16);
        let player = Player::new([8.0, 8.0], 0.0);
        let frame = compositor.render(&map, &player, &config(w, h));

        // wall ~7 cells ahead: ceiling = floor(50 - 100/7) = 35
        let hit = cast(player.pos, 0.0, &map, 16.0, 0.1);
        assert!(hit.hit);
        let strip = project(&hit, h, &Config::default().shading());
        assert_eq!(strip.ceiling, 35);

        assert_eq!(frame.pixel(32, 0), Some([50, 50, 50, 255]));
        let v = strip.wall_shade;
        assert_eq!(frame.pixel(32, 50), Some([v, v, v, 255]));
        assert_eq!(frame.pixel(32, 99), Some([255, 255, 255, 255]));
    }

    #[test]
    fn downsampling_makes_uniform_blocks() {
        let (w, h) = (32, 24);
        let mut cfg = config(w, h);
        cfg.downsample = 4;
        let mut compositor = Compositor::new(w, h);
        let map = Map::builtin("maze").unwrap();
        let player = Player::spawn(&map);
        let frame = compositor.render(&map, &player, &cfg);

        assert_eq!(frame.pixels().len(), w * h * 4);
        for by in (0..h).step_by(4) {
            for bx in (0..w).step_by(4) {
                let first = frame.pixel(bx, by);
                for y in by..by + 4 {
                    for x in bx..bx + 4 {
                        assert_eq!(frame.pixel(x, y), first);
                    }
                }
            }
        }
    }
}
