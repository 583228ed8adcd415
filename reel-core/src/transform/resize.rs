//! Resampling kernels for the base transform.
//!
//! All kernels use pixel-center coordinate mapping and clamp at the
//! borders. Same-size resizes short-circuit to a copy.

use crate::frame::VideoFrame;

/// Interpolation kernel selected by the handshake `algorithm` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Bilinear,
    /// Catmull-Rom cubic, 4 taps per axis.
    Bicubic,
    /// Lanczos with a = 3, 6 taps per axis.
    Lanczos,
}

impl Interpolation {
    /// Maps a wire-level algorithm name. Names are exact and lowercase;
    /// anything else is not a resize algorithm.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "bilinear" => Some(Self::Bilinear),
            "bicubic" => Some(Self::Bicubic),
            "lanczos" => Some(Self::Lanczos),
            _ => None,
        }
    }
}

/// Resamples `frame` to `width` x `height` with the given kernel.
pub fn resize(frame: &VideoFrame, width: u32, height: u32, kernel: Interpolation) -> VideoFrame {
    if frame.width == width && frame.height == height {
        return frame.clone();
    }
    match kernel {
        Interpolation::Bilinear => resize_bilinear(frame, width, height),
        Interpolation::Bicubic => resample(frame, width, height, 2, catmull_rom),
        Interpolation::Lanczos => resample(frame, width, height, 3, lanczos3),
    }
}

/// Samples `frame` at a fractional position with bilinear filtering,
/// clamping coordinates to the frame.
pub(crate) fn sample_bilinear(frame: &VideoFrame, fx: f32, fy: f32) -> [u8; 3] {
    let fx = fx.clamp(0.0, (frame.width - 1) as f32);
    let fy = fy.clamp(0.0, (frame.height - 1) as f32);
    let x0 = fx.floor() as u32;
    let y0 = fy.floor() as u32;
    let x1 = (x0 + 1).min(frame.width - 1);
    let y1 = (y0 + 1).min(frame.height - 1);
    let tx = fx - x0 as f32;
    let ty = fy - y0 as f32;

    let p00 = frame.pixel(x0, y0);
    let p10 = frame.pixel(x1, y0);
    let p01 = frame.pixel(x0, y1);
    let p11 = frame.pixel(x1, y1);

    let mut out = [0u8; 3];
    for c in 0..3 {
        let top = p00[c] as f32 + (p10[c] as f32 - p00[c] as f32) * tx;
        let bottom = p01[c] as f32 + (p11[c] as f32 - p01[c] as f32) * tx;
        out[c] = (top + (bottom - top) * ty).round().clamp(0.0, 255.0) as u8;
    }
    out
}

fn resize_bilinear(frame: &VideoFrame, width: u32, height: u32) -> VideoFrame {
    let sx = frame.width as f32 / width as f32;
    let sy = frame.height as f32 / height as f32;
    let mut out = VideoFrame::new(width, height, frame.format);
    for dy in 0..height {
        let src_y = (dy as f32 + 0.5) * sy - 0.5;
        for dx in 0..width {
            let src_x = (dx as f32 + 0.5) * sx - 0.5;
            out.set_pixel(dx, dy, sample_bilinear(frame, src_x, src_y));
        }
    }
    out
}

/// Separable windowed resampling shared by the wider kernels. Weights
/// are renormalized per output pixel, so truncation at the borders does
/// not shift brightness.
fn resample(
    frame: &VideoFrame,
    width: u32,
    height: u32,
    radius: i64,
    weight: fn(f32) -> f32,
) -> VideoFrame {
    let sx = frame.width as f32 / width as f32;
    let sy = frame.height as f32 / height as f32;
    let max_x = frame.width as i64 - 1;
    let max_y = frame.height as i64 - 1;
    let mut out = VideoFrame::new(width, height, frame.format);

    for dy in 0..height {
        let src_y = (dy as f32 + 0.5) * sy - 0.5;
        let base_y = src_y.floor() as i64;
        for dx in 0..width {
            let src_x = (dx as f32 + 0.5) * sx - 0.5;
            let base_x = src_x.floor() as i64;

            let mut acc = [0.0f32; 3];
            let mut total = 0.0f32;
            for ky in (base_y - radius + 1)..=(base_y + radius) {
                let wy = weight(src_y - ky as f32);
                if wy == 0.0 {
                    continue;
                }
                let py = ky.clamp(0, max_y) as u32;
                for kx in (base_x - radius + 1)..=(base_x + radius) {
                    let wx = weight(src_x - kx as f32);
                    if wx == 0.0 {
                        continue;
                    }
                    let px = kx.clamp(0, max_x) as u32;
                    let w = wx * wy;
                    let p = frame.pixel(px, py);
                    acc[0] += p[0] as f32 * w;
                    acc[1] += p[1] as f32 * w;
                    acc[2] += p[2] as f32 * w;
                    total += w;
                }
            }

            let mut px = [0u8; 3];
            if total != 0.0 {
                for c in 0..3 {
                    px[c] = (acc[c] / total).round().clamp(0.0, 255.0) as u8;
                }
            }
            out.set_pixel(dx, dy, px);
        }
    }
    out
}

/// Catmull-Rom spline (cubic with a = -0.5).
fn catmull_rom(t: f32) -> f32 {
    let x = t.abs();
    if x < 1.0 {
        1.5 * x * x * x - 2.5 * x * x + 1.0
    } else if x < 2.0 {
        -0.5 * x * x * x + 2.5 * x * x - 4.0 * x + 2.0
    } else {
        0.0
    }
}

fn lanczos3(t: f32) -> f32 {
    let x = t.abs();
    if x < 1e-6 {
        return 1.0;
    }
    if x >= 3.0 {
        return 0.0;
    }
    let pi_x = std::f32::consts::PI * x;
    3.0 * pi_x.sin() * (pi_x / 3.0).sin() / (pi_x * pi_x)
}

// ── Tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::PixelFormat;

    const KERNELS: [Interpolation; 3] = [
        Interpolation::Bilinear,
        Interpolation::Bicubic,
        Interpolation::Lanczos,
    ];

    fn gradient_frame(width: u32, height: u32) -> VideoFrame {
        let mut frame = VideoFrame::new(width, height, PixelFormat::Bgr8);
        for y in 0..height {
            for x in 0..width {
                frame.set_pixel(x, y, [(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8]);
            }
        }
        frame
    }

    #[test]
    fn parse_accepts_exact_names_only() {
        assert_eq!(Interpolation::parse("bilinear"), Some(Interpolation::Bilinear));
        assert_eq!(Interpolation::parse("bicubic"), Some(Interpolation::Bicubic));
        assert_eq!(Interpolation::parse("lanczos"), Some(Interpolation::Lanczos));
        assert_eq!(Interpolation::parse("Bilinear"), None);
        assert_eq!(Interpolation::parse("nearest"), None);
        assert_eq!(Interpolation::parse(""), None);
    }

    #[test]
    fn same_size_resize_is_identity() {
        let frame = gradient_frame(24, 18);
        for kernel in KERNELS {
            assert_eq!(resize(&frame, 24, 18, kernel), frame);
        }
    }

    #[test]
    fn resize_produces_requested_dimensions() {
        let frame = gradient_frame(192, 108);
        for kernel in KERNELS {
            let out = resize(&frame, 64, 36, kernel);
            assert_eq!((out.width, out.height), (64, 36));
            assert_eq!(out.data.len(), 64 * 36 * 3);
            assert_eq!(out.format, frame.format);
        }
    }

    #[test]
    fn solid_color_survives_every_kernel() {
        let mut frame = VideoFrame::new(40, 30, PixelFormat::Bgr8);
        for px in frame.data.chunks_exact_mut(3) {
            px.copy_from_slice(&[10, 130, 250]);
        }
        for kernel in KERNELS {
            let out = resize(&frame, 17, 9, kernel);
            for px in out.data.chunks_exact(3) {
                assert!((px[0] as i32 - 10).abs() <= 1);
                assert!((px[1] as i32 - 130).abs() <= 1);
                assert!((px[2] as i32 - 250).abs() <= 1);
            }
        }
    }

    #[test]
    fn bilinear_downscale_averages_neighbors() {
        let mut frame = VideoFrame::new(2, 1, PixelFormat::Rgb8);
        frame.set_pixel(0, 0, [100, 0, 0]);
        frame.set_pixel(1, 0, [200, 0, 0]);
        let out = resize(&frame, 1, 1, Interpolation::Bilinear);
        assert_eq!(out.pixel(0, 0), [150, 0, 0]);
    }

    #[test]
    fn upscale_works_too() {
        let frame = gradient_frame(16, 16);
        for kernel in KERNELS {
            let out = resize(&frame, 40, 40, kernel);
            assert_eq!((out.width, out.height), (40, 40));
        }
    }

    #[test]
    fn fractional_sampling_clamps_at_borders() {
        let frame = gradient_frame(8, 8);
        assert_eq!(sample_bilinear(&frame, -5.0, -5.0), frame.pixel(0, 0));
        assert_eq!(sample_bilinear(&frame, 100.0, 100.0), frame.pixel(7, 7));
        assert_eq!(sample_bilinear(&frame, 3.0, 4.0), frame.pixel(3, 4));
    }
}
