use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

/// Precomputed mapping from dest pixels to the nearest source pixel
pub struct ScaleLut {
    dst_w: usize,
    dst_h: usize,
    src_x: Vec<usize>,
    src_y: Vec<usize>,
}

impl ScaleLut {
    pub fn empty() -> Self {
        Self {
            dst_w: 0,
            dst_h: 0,
            src_x: Vec::new(),
            src_y: Vec::new(),
        }
    }

    /// True when this table was built for a `dst_w` x `dst_h` target
    #[inline]
    pub fn fits(&self, dst_w: usize, dst_h: usize) -> bool {
        self.dst_w == dst_w && self.dst_h == dst_h
    }
}

pub fn build_scale_lut(dst_w: usize, dst_h: usize, src_w: usize, src_h: usize) -> ScaleLut {
    let axis = |dst: usize, src: usize| -> Vec<usize> {
        let s = src as f32 / dst as f32;
        (0..dst)
            .map(|d| ((d as f32 * s) as usize).min(src.saturating_sub(1)))
            .collect()
    };

    ScaleLut {
        dst_w,
        dst_h,
        src_x: axis(dst_w, src_w),
        src_y: axis(dst_h, src_h),
    }
}

#[inline]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    // 0RGB, the layout softbuffer expects
    (b as u32) | ((g as u32) << 8) | ((r as u32) << 16)
}

/// Parallel nearest-neighbour stretch of an RGBA frame into a packed surface
/// Rows are processed in parallel for cache friendly writes
pub fn blit_nearest_stretch(dst: &mut [u32], dw: usize, src: &[u8], sw: usize, lut: &ScaleLut) {
    dst.par_chunks_mut(dw).enumerate().for_each(|(y, dst_row)| {
        let row = lut.src_y[y] * sw;
        for (x, out) in dst_row.iter_mut().enumerate() {
            let i = (row + lut.src_x[x]) * 4;
            *out = pack_rgb(src[i], src[i + 1], src[i + 2]);
        }
    });
}

/// Block-average an RGBA buffer in place
/// Every `block` x `block` tile is replaced by its mean colour, tiles clipped
/// at the right and bottom edges average only the pixels they cover. The
/// buffer keeps its size; `block` <= 1 leaves it untouched.
pub fn downsample(pixels: &mut [u8], width: usize, block: usize) {
    if block <= 1 || width == 0 {
        return;
    }
    let stride = width * 4;

    pixels
        .par_chunks_mut(stride * block)
        .for_each(|band| {
            let rows = band.len() / stride;
            for x0 in (0..width).step_by(block) {
                let x1 = (x0 + block).min(width);

                let mut sum = [0u32; 4];
                for y in 0..rows {
                    for x in x0..x1 {
                        let i = y * stride + x * 4;
                        for c in 0..4 {
                            sum[c] += band[i + c] as u32;
                        }
                    }
                }

                let n = (rows * (x1 - x0)) as u32;
                let mean = sum.map(|s| ((s + n / 2) / n) as u8);
                for y in 0..rows {
                    for x in x0..x1 {
                        let i = y * stride + x * 4;
                        band[i..i + 4].copy_from_slice(&mean);
                    }
                }
            }
        });
}
