//! Local contrast enhancement stage.
//!
//! Contrast-limited adaptive histogram equalization on the luma
//! channel. The frame is split into a tile grid, each tile gets a
//! clipped-histogram equalization lookup, and every pixel blends the
//! lookups of its four nearest tile centers. The resulting luma delta
//! is applied to all three channels, which keeps chroma offsets fixed.

use crate::frame::VideoFrame;

pub const CLIP_LIMIT: f32 = 2.0;
pub const TILE_GRID: u32 = 8;

/// Equalizes local contrast while preserving color.
pub fn equalize_contrast(frame: &VideoFrame) -> VideoFrame {
    let w = frame.width as usize;
    let h = frame.height as usize;
    let luma = frame.luma_plane();

    let tiles_x = (TILE_GRID.min(frame.width) as usize).max(1);
    let tiles_y = (TILE_GRID.min(frame.height) as usize).max(1);

    let mut luts = Vec::with_capacity(tiles_x * tiles_y);
    let mut centers_x = vec![0.0f32; tiles_x];
    let mut centers_y = vec![0.0f32; tiles_y];

    for ty in 0..tiles_y {
        let y0 = ty * h / tiles_y;
        let y1 = (ty + 1) * h / tiles_y;
        centers_y[ty] = (y0 + y1 - 1) as f32 / 2.0;
        for tx in 0..tiles_x {
            let x0 = tx * w / tiles_x;
            let x1 = (tx + 1) * w / tiles_x;
            centers_x[tx] = (x0 + x1 - 1) as f32 / 2.0;
            luts.push(tile_lut(&luma, w, x0, x1, y0, y1));
        }
    }

    let mut out = frame.clone();
    for y in 0..h {
        let (ty0, ty1, fy) = axis_blend(&centers_y, y as f32);
        for x in 0..w {
            let (tx0, tx1, fx) = axis_blend(&centers_x, x as f32);
            let old = luma[y * w + x];

            let top = lerp(
                luts[ty0 * tiles_x + tx0][old as usize] as f32,
                luts[ty0 * tiles_x + tx1][old as usize] as f32,
                fx,
            );
            let bottom = lerp(
                luts[ty1 * tiles_x + tx0][old as usize] as f32,
                luts[ty1 * tiles_x + tx1][old as usize] as f32,
                fx,
            );
            let new = lerp(top, bottom, fy);
            let delta = (new - old as f32).round() as i32;

            if delta != 0 {
                let mut px = out.pixel(x as u32, y as u32);
                for c in &mut px {
                    *c = (*c as i32 + delta).clamp(0, 255) as u8;
                }
                out.set_pixel(x as u32, y as u32, px);
            }
        }
    }
    out
}

/// Equalization lookup for one tile, with histogram clipping at
/// `CLIP_LIMIT` times the uniform bin height. Clipped mass is
/// redistributed evenly, remainder to the lowest bins.
fn tile_lut(luma: &[u8], stride: usize, x0: usize, x1: usize, y0: usize, y1: usize) -> [u8; 256] {
    let mut hist = [0u32; 256];
    for row in luma[y0 * stride..y1 * stride].chunks_exact(stride) {
        for &v in &row[x0..x1] {
            hist[v as usize] += 1;
        }
    }

    let area = ((x1 - x0) * (y1 - y0)) as u32;
    let clip = ((CLIP_LIMIT * area as f32 / 256.0) as u32).max(1);

    let mut excess = 0u32;
    for bin in hist.iter_mut() {
        if *bin > clip {
            excess += *bin - clip;
            *bin = clip;
        }
    }
    let bonus = excess / 256;
    let leftover = (excess % 256) as usize;
    for bin in hist.iter_mut() {
        *bin += bonus;
    }
    for bin in hist.iter_mut().take(leftover) {
        *bin += 1;
    }

    let scale = 255.0 / area as f32;
    let mut lut = [0u8; 256];
    let mut cum = 0u32;
    for (v, bin) in hist.iter().enumerate() {
        cum += bin;
        lut[v] = (cum as f32 * scale).round().clamp(0.0, 255.0) as u8;
    }
    lut
}

/// Finds the tile pair bracketing `pos` on one axis and the blend
/// fraction between their centers.
fn axis_blend(centers: &[f32], pos: f32) -> (usize, usize, f32) {
    let last = centers.len() - 1;
    if pos <= centers[0] {
        return (0, 0, 0.0);
    }
    if pos >= centers[last] {
        return (last, last, 0.0);
    }
    let mut k = 0;
    while k < last && centers[k + 1] < pos {
        k += 1;
    }
    let span = centers[k + 1] - centers[k];
    (k, k + 1, (pos - centers[k]) / span)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

// ── Tests ──────────────────────────────────────────────────────────────
