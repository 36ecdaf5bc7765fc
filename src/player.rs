use crate::map::Map;

pub struct Player {
    pub pos: [f32; 2], // (x, y) in map cells, fractional
    pub heading: f32,  // radians, 0 looks along +Y; never normalized
}

impl Player {
    pub fn new(pos: [f32; 2], heading: f32) -> Self {
        Self { pos, heading }
    }

    /// Player standing on the map's spawn point, facing +Y.
    pub fn spawn(map: &Map) -> Self {
        Self::new(map.spawn_point(), 0.0)
    }

    #[inline]
    pub fn forward(&self) -> [f32; 2] {
        // forward vector (0, +1) rotated by heading = (s, c)
        [self.heading.sin(), self.heading.cos()]
    }

    #[inline]
    pub fn right(&self) -> [f32; 2] {
        // perpendicular to forward, matches increasing screen x
        [self.heading.cos(), -self.heading.sin()]
    }

    /// Angle of the ray through screen column `column` out of `columns`.
    #[inline]
    pub fn ray_angle(&self, column: usize, columns: usize, fov: f32) -> f32 {
        (self.heading - fov / 2.0) + (column as f32 / columns as f32) * fov
    }

    #[inline]
    pub fn turn(&mut self, delta: f32) {
        self.heading += delta;
    }

    /// Moves `amount` along `dir`. A step ending inside a wall is rejected
    /// whole, with no sliding along the wall. Returns whether it moved.
    pub fn try_move(&mut self, dir: [f32; 2], amount: f32, map: &Map) -> bool {
        let prev = self.pos;
        self.pos[0] += dir[0] * amount;
        self.pos[1] += dir[1] * amount;

        if map.is_blocked(self.pos[0], self.pos[1]) {
            self.pos = prev;
            return false;
        }
        true
    }
}
