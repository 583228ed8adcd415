//! In-memory frame representation used throughout the pipeline.
//!
//! Frames are tightly packed 24-bit pixel buffers with no row padding.
//! Sources decide the channel order they decode into; the encoder
//! normalizes to RGB before anything leaves the process.

/// Channel order of a packed 24-bit frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// Blue, green, red. The order most video decoders hand out.
    Bgr8,
    /// Red, green, blue. The order the wire container carries.
    Rgb8,
}

impl PixelFormat {
    /// Both layouts are 24-bit packed.
    pub const fn bytes_per_pixel(self) -> usize {
        3
    }
}

/// A single decoded video frame.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    /// Packed pixel data, row-major, `width * height * 3` bytes.
    pub data: Vec<u8>,
}

impl VideoFrame {
    /// Creates a zero-filled (black) frame.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        let len = width as usize * height as usize * format.bytes_per_pixel();
        Self {
            width,
            height,
            format,
            data: vec![0; len],
        }
    }

    /// Expected buffer length for the frame dimensions.
    pub fn byte_len(&self) -> usize {
        self.width as usize * self.height as usize * self.format.bytes_per_pixel()
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 3
    }

    /// Reads the pixel at `(x, y)` in the frame's native channel order.
    ///
    /// Coordinates must be in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = self.offset(x, y);
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Writes the pixel at `(x, y)` in the frame's native channel order.
    pub fn set_pixel(&mut self, x: u32, y: u32, value: [u8; 3]) {
        let i = self.offset(x, y);
        self.data[i..i + 3].copy_from_slice(&value);
    }

    /// BT.601 luma of the pixel at `(x, y)`, channel-order aware.
    pub fn luma(&self, x: u32, y: u32) -> u8 {
        let p = self.pixel(x, y);
        let (r, g, b) = match self.format {
            PixelFormat::Bgr8 => (p[2], p[1], p[0]),
            PixelFormat::Rgb8 => (p[0], p[1], p[2]),
        };
        // Integer approximation of 0.299 R + 0.587 G + 0.114 B.
        ((77 * r as u32 + 150 * g as u32 + 29 * b as u32) >> 8) as u8
    }

    /// Luma plane of the whole frame, one byte per pixel.
    pub fn luma_plane(&self) -> Vec<u8> {
        let mut plane = Vec::with_capacity(self.width as usize * self.height as usize);
        let (ri, gi, bi) = match self.format {
            PixelFormat::Bgr8 => (2, 1, 0),
            PixelFormat::Rgb8 => (0, 1, 2),
        };
        for px in self.data.chunks_exact(3) {
            let y = (77 * px[ri] as u32 + 150 * px[gi] as u32 + 29 * px[bi] as u32) >> 8;
            plane.push(y as u8);
        }
        plane
    }

    /// Returns the frame in RGB order, swapping channels if needed.
    pub fn to_rgb8(&self) -> VideoFrame {
        match self.format {
            PixelFormat::Rgb8 => self.clone(),
            PixelFormat::Bgr8 => {
                let mut data = Vec::with_capacity(self.data.len());
                for px in self.data.chunks_exact(3) {
                    data.extend_from_slice(&[px[2], px[1], px[0]]);
                }
                VideoFrame {
                    width: self.width,
                    height: self.height,
                    format: PixelFormat::Rgb8,
                    data,
                }
            }
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────
