//! Frame container encoding.
//!
//! Staged frames are normalized to RGB, compressed with zstd, and
//! wrapped in a small self-describing container before they are
//! base64'd into the outbound JSON.
//!
//! ## Container format
//!
//! **Header** (21 bytes, little-endian) followed by the payload:
//! ```text
//! magic:      [u8; 4]  "RLF1"
//! width:      u32      (4)
//! height:     u32      (4)
//! level:      u8       (1)  zstd level used
//! checksum:   u32      (4)  leading bytes of BLAKE3(payload)
//! length:     u32      (4)  payload byte count
//! payload:    [u8]     zstd-compressed RGB24, row-major
//! ```
//!
//! The checksum lets receivers reject corruption before spending time
//! on decompression.

use bytes::{Buf, BufMut, BytesMut};

use crate::error::ReelError;
use crate::frame::{PixelFormat, VideoFrame};

// ── Constants ────────────────────────────────────────────────────

pub const FRAME_MAGIC: &[u8; 4] = b"RLF1";
pub const HEADER_LEN: usize = 21;

const DEFAULT_LEVEL: i32 = 3;

// ── FrameEncoder ─────────────────────────────────────────────────

/// Turns staged frames into wire payloads.
///
/// Implementations own the codec choice; the session never looks
/// inside the bytes it sends.
pub trait FrameEncoder: Send + Sync {
    fn encode(&self, frame: &VideoFrame) -> Result<Vec<u8>, ReelError>;
}

// ── ZstdFrameEncoder ─────────────────────────────────────────────

/// The stock encoder: zstd-compressed RGB in the container above.
#[derive(Debug, Clone, Copy)]
pub struct ZstdFrameEncoder {
    level: i32,
}

impl Default for ZstdFrameEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ZstdFrameEncoder {
    pub fn new() -> Self {
        Self {
            level: DEFAULT_LEVEL,
        }
    }

    /// Clamps to zstd's practical level range.
    pub fn with_level(level: i32) -> Self {
        Self {
            level: level.clamp(1, 19),
        }
    }

    pub fn level(&self) -> i32 {
        self.level
    }
}

impl FrameEncoder for ZstdFrameEncoder {
    fn encode(&self, frame: &VideoFrame) -> Result<Vec<u8>, ReelError> {
        let rgb = frame.to_rgb8();
        let compressed = zstd::encode_all(rgb.data.as_slice(), self.level)
            .map_err(|e| ReelError::Encoding(format!("zstd encode failed: {e}")))?;

        let mut out = BytesMut::with_capacity(HEADER_LEN + compressed.len());
        out.put_slice(FRAME_MAGIC);
        out.put_u32_le(frame.width);
        out.put_u32_le(frame.height);
        out.put_u8(self.level as u8);
        out.put_u32_le(checksum32(&compressed));
        out.put_u32_le(compressed.len() as u32);
        out.put_slice(&compressed);
        Ok(out.to_vec())
    }
}

// ── Decoding ─────────────────────────────────────────────────────

/// Unpacks a container back into an RGB frame, validating the magic,
/// the declared length, and the payload checksum.
pub fn decode_frame(bytes: &[u8]) -> Result<VideoFrame, ReelError> {
    if bytes.len() < HEADER_LEN {
        return Err(ReelError::Encoding("frame container too short".into()));
    }
    let mut buf = bytes;

    let mut magic = [0u8; 4];
    buf.copy_to_slice(&mut magic);
    if &magic != FRAME_MAGIC {
        return Err(ReelError::Encoding("bad frame container magic".into()));
    }
    let width = buf.get_u32_le();
    let height = buf.get_u32_le();
    let _level = buf.get_u8();
    let checksum = buf.get_u32_le();
    let length = buf.get_u32_le() as usize;

    if buf.remaining() != length {
        return Err(ReelError::Encoding("frame container length mismatch".into()));
    }
    if checksum32(buf) != checksum {
        return Err(ReelError::Encoding("frame payload checksum mismatch".into()));
    }

    let data =
        zstd::decode_all(buf).map_err(|e| ReelError::Encoding(format!("zstd decode failed: {e}")))?;
    let expected = width as usize * height as usize * 3;
    if data.len() != expected {
        return Err(ReelError::Encoding(format!(
            "pixel payload is {} bytes, expected {expected}",
            data.len()
        )));
    }

    Ok(VideoFrame {
        width,
        height,
        format: PixelFormat::Rgb8,
        data,
    })
}

/// Leading four bytes of the BLAKE3 hash, little endian.
fn checksum32(data: &[u8]) -> u32 {
    let hash = blake3::hash(data);
    let bytes = hash.as_bytes();
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

// ── Tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> VideoFrame {
        let mut frame = VideoFrame::new(16, 9, PixelFormat::Bgr8);
        for y in 0..9 {
            for x in 0..16 {
                frame.set_pixel(x, y, [(x * 16) as u8, (y * 28) as u8, 77]);
            }
        }
        frame
    }

    #[test]
    fn roundtrip_preserves_pixels_in_rgb() {
        let frame = sample_frame();
        let encoded = ZstdFrameEncoder::new().encode(&frame).unwrap();
        let decoded = decode_frame(&encoded).unwrap();

        assert_eq!((decoded.width, decoded.height), (16, 9));
        assert_eq!(decoded.format, PixelFormat::Rgb8);
        assert_eq!(decoded, frame.to_rgb8());
    }

    #[test]
    fn container_header_layout() {
        let encoded = ZstdFrameEncoder::with_level(5).encode(&sample_frame()).unwrap();
        assert_eq!(&encoded[0..4], FRAME_MAGIC);
        assert_eq!(u32::from_le_bytes(encoded[4..8].try_into().unwrap()), 16);
        assert_eq!(u32::from_le_bytes(encoded[8..12].try_into().unwrap()), 9);
        assert_eq!(encoded[12], 5);
        let length = u32::from_le_bytes(encoded[17..21].try_into().unwrap()) as usize;
        assert_eq!(encoded.len(), HEADER_LEN + length);
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let mut encoded = ZstdFrameEncoder::new().encode(&sample_frame()).unwrap();
        let last = encoded.len() - 1;
        encoded[last] ^= 0xff;
        let err = decode_frame(&encoded).unwrap_err();
        assert!(err.to_string().contains("checksum"));
    }

    #[test]
    fn truncated_and_garbage_containers_fail() {
        let encoded = ZstdFrameEncoder::new().encode(&sample_frame()).unwrap();
        assert!(decode_frame(&encoded[..HEADER_LEN - 1]).is_err());
        assert!(decode_frame(&encoded[..encoded.len() - 2]).is_err());

        let mut wrong_magic = encoded.clone();
        wrong_magic[0] = b'X';
        assert!(decode_frame(&wrong_magic).is_err());
    }

    #[test]
    fn repetitive_frames_compress() {
        let frame = VideoFrame::new(64, 64, PixelFormat::Rgb8);
        let encoded = ZstdFrameEncoder::new().encode(&frame).unwrap();
        assert!(encoded.len() < frame.data.len() / 4);
    }

    #[test]
    fn level_is_clamped() {
        assert_eq!(ZstdFrameEncoder::with_level(0).level(), 1);
        assert_eq!(ZstdFrameEncoder::with_level(99).level(), 19);
        assert_eq!(ZstdFrameEncoder::with_level(7).level(), 7);
    }
}
