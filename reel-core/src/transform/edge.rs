//! Gradient edge detection stage.
//!
//! Sobel gradients on the luma plane with a double threshold: strong
//! edges pass outright, weak edges survive only next to a strong one.
//! The binary map is replicated across all three channels.

use crate::frame::VideoFrame;

pub const LOW_THRESHOLD: f32 = 100.0;
pub const HIGH_THRESHOLD: f32 = 200.0;

#[derive(Clone, Copy, PartialEq, Eq)]
enum EdgeClass {
    None,
    Weak,
    Strong,
}

/// Replaces the frame with its edge map.
pub fn edge_map(frame: &VideoFrame) -> VideoFrame {
    let w = frame.width as i64;
    let h = frame.height as i64;
    let luma = frame.luma_plane();
    let at = |x: i64, y: i64| -> i64 {
        let x = x.clamp(0, w - 1);
        let y = y.clamp(0, h - 1);
        luma[(y * w + x) as usize] as i64
    };

    let mut classes = vec![EdgeClass::None; (w * h) as usize];
    for y in 0..h {
        for x in 0..w {
            let gx = at(x + 1, y - 1) + 2 * at(x + 1, y) + at(x + 1, y + 1)
                - at(x - 1, y - 1)
                - 2 * at(x - 1, y)
                - at(x - 1, y + 1);
            let gy = at(x - 1, y + 1) + 2 * at(x, y + 1) + at(x + 1, y + 1)
                - at(x - 1, y - 1)
                - 2 * at(x, y - 1)
                - at(x + 1, y - 1);
            let magnitude = ((gx * gx + gy * gy) as f32).sqrt();
            classes[(y * w + x) as usize] = if magnitude >= HIGH_THRESHOLD {
                EdgeClass::Strong
            } else if magnitude >= LOW_THRESHOLD {
                EdgeClass::Weak
            } else {
                EdgeClass::None
            };
        }
    }

    let strong_neighbor = |x: i64, y: i64| -> bool {
        for ny in (y - 1)..=(y + 1) {
            for nx in (x - 1)..=(x + 1) {
                if nx < 0 || ny < 0 || nx >= w || ny >= h {
                    continue;
                }
                if classes[(ny * w + nx) as usize] == EdgeClass::Strong {
                    return true;
                }
            }
        }
        false
    };

    let mut out = VideoFrame::new(frame.width, frame.height, frame.format);
    for y in 0..h {
        for x in 0..w {
            let keep = match classes[(y * w + x) as usize] {
                EdgeClass::Strong => true,
                EdgeClass::Weak => strong_neighbor(x, y),
                EdgeClass::None => false,
            };
            if keep {
                out.set_pixel(x as u32, y as u32, [255, 255, 255]);
            }
        }
    }
    out
}

// ── Tests ──────────────────────────────────────────────────────────────
