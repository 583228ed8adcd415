//! Block-matching motion compensation.
//!
//! Estimates a dense flow field between the previous and current raw
//! frames, then warps the staged frame along that field so moving
//! content lines up with where it sat one frame earlier. The estimator
//! is a plain SAD block search on the luma plane; block vectors are
//! bilinearly interpolated into a per-pixel field.

use crate::frame::VideoFrame;
use crate::transform::resize::{Interpolation, resize, sample_bilinear};

const DEFAULT_BLOCK_SIZE: u32 = 16;
const DEFAULT_SEARCH_RADIUS: u32 = 6;

#[derive(Debug, Clone, Copy)]
pub struct MotionCompensator {
    block_size: u32,
    search_radius: i64,
}

impl Default for MotionCompensator {
    fn default() -> Self {
        Self::new()
    }
}

impl MotionCompensator {
    pub fn new() -> Self {
        Self::with_params(DEFAULT_BLOCK_SIZE, DEFAULT_SEARCH_RADIUS)
    }

    pub fn with_params(block_size: u32, search_radius: u32) -> Self {
        Self {
            block_size: block_size.max(4),
            search_radius: search_radius.max(1) as i64,
        }
    }

    /// Warps `staged` so moving content is pulled back toward where it
    /// sat in the previous frame.
    ///
    /// Flow is estimated between the raw frames resampled to the staged
    /// resolution, so the field and the warp share a coordinate system.
    pub fn compensate(
        &self,
        previous_raw: &VideoFrame,
        current_raw: &VideoFrame,
        staged: &VideoFrame,
    ) -> VideoFrame {
        let prev = resize(previous_raw, staged.width, staged.height, Interpolation::Bilinear);
        let curr = resize(current_raw, staged.width, staged.height, Interpolation::Bilinear);
        let flow = self.estimate_flow(
            &prev.luma_plane(),
            &curr.luma_plane(),
            staged.width,
            staged.height,
        );
        warp(staged, &flow)
    }

    /// One vector per block: the displacement that moves the block's
    /// content from the previous frame to the current one. Zero motion
    /// is evaluated first and wins ties.
    fn estimate_flow(&self, prev: &[u8], curr: &[u8], width: u32, height: u32) -> FlowField {
        let block = self.block_size;
        let grid_w = width.div_ceil(block).max(1);
        let grid_h = height.div_ceil(block).max(1);
        let mut vectors = Vec::with_capacity((grid_w * grid_h) as usize);

        for gy in 0..grid_h {
            for gx in 0..grid_w {
                let bx = (gx * block) as i64;
                let by = (gy * block) as i64;
                let mut best_cost =
                    block_sad(prev, curr, width, height, block, bx, by, 0, 0, u64::MAX);
                let mut best = (0i64, 0i64);
                for dy in -self.search_radius..=self.search_radius {
                    for dx in -self.search_radius..=self.search_radius {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        let cost =
                            block_sad(prev, curr, width, height, block, bx, by, dx, dy, best_cost);
                        if cost < best_cost {
                            best_cost = cost;
                            best = (dx, dy);
                        }
                    }
                }
                vectors.push((best.0 as f32, best.1 as f32));
            }
        }

        FlowField {
            grid_w,
            grid_h,
            block,
            vectors,
        }
    }
}

/// SAD between the previous-frame block at `(bx, by)` and the
/// current-frame block displaced by `(dx, dy)`. Out-of-range samples
/// clamp to the border. Bails out once the running sum exceeds `limit`.
#[allow(clippy::too_many_arguments)]
fn block_sad(
    prev: &[u8],
    curr: &[u8],
    width: u32,
    height: u32,
    block: u32,
    bx: i64,
    by: i64,
    dx: i64,
    dy: i64,
    limit: u64,
) -> u64 {
    let max_x = width as i64 - 1;
    let max_y = height as i64 - 1;
    let at = |plane: &[u8], x: i64, y: i64| -> i64 {
        let x = x.clamp(0, max_x);
        let y = y.clamp(0, max_y);
        plane[(y * width as i64 + x) as usize] as i64
    };

    let mut sum = 0u64;
    for j in 0..block as i64 {
        for i in 0..block as i64 {
            let p = at(prev, bx + i, by + j);
            let c = at(curr, bx + i + dx, by + j + dy);
            sum += p.abs_diff(c);
        }
        if sum > limit {
            return sum;
        }
    }
    sum
}

/// Per-block motion vectors with bilinear lookup between block centers.
struct FlowField {
    grid_w: u32,
    grid_h: u32,
    block: u32,
    vectors: Vec<(f32, f32)>,
}

impl FlowField {
    fn cell(&self, gx: u32, gy: u32) -> (f32, f32) {
        self.vectors[(gy * self.grid_w + gx) as usize]
    }

    fn at(&self, x: f32, y: f32) -> (f32, f32) {
        let half = (self.block as f32 - 1.0) / 2.0;
        let u = ((x - half) / self.block as f32).clamp(0.0, (self.grid_w - 1) as f32);
        let v = ((y - half) / self.block as f32).clamp(0.0, (self.grid_h - 1) as f32);
        let u0 = u.floor() as u32;
        let v0 = v.floor() as u32;
        let u1 = (u0 + 1).min(self.grid_w - 1);
        let v1 = (v0 + 1).min(self.grid_h - 1);
        let tu = u - u0 as f32;
        let tv = v - v0 as f32;

        let (ax, ay) = self.cell(u0, v0);
        let (bx, by) = self.cell(u1, v0);
        let (cx, cy) = self.cell(u0, v1);
        let (dx, dy) = self.cell(u1, v1);

        let top_x = ax + (bx - ax) * tu;
        let top_y = ay + (by - ay) * tu;
        let bot_x = cx + (dx - cx) * tu;
        let bot_y = cy + (dy - cy) * tu;
        (top_x + (bot_x - top_x) * tv, top_y + (bot_y - top_y) * tv)
    }
}

fn warp(staged: &VideoFrame, flow: &FlowField) -> VideoFrame {
    let mut out = VideoFrame::new(staged.width, staged.height, staged.format);
    for y in 0..staged.height {
        for x in 0..staged.width {
            let (fx, fy) = flow.at(x as f32, y as f32);
            let px = sample_bilinear(staged, x as f32 + fx, y as f32 + fy);
            out.set_pixel(x, y, px);
        }
    }
    out
}

// ── Tests ──────────────────────────────────────────────────────────────
