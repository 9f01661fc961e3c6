use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use serde::{Deserialize, Serialize};
use std::io::{self, Read};

/// Size of one `(x, y, w, h)` record on the wire.
pub const RECORD_SIZE: usize = 4 * std::mem::size_of::<u16>();

/// `floor(255 * 0.6)`
pub const DEFAULT_THRESHOLD: u8 = 153;

pub const DEFAULT_MAX_WIDTH: u32 = 1024;

/// One rectangle record as it appears in a frame stream.
///
/// Encoded as four little-endian `u16` fields in `x, y, w, h` order.
/// The all-zero record is reserved as the end-of-frame sentinel.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "[u16; 4]", into = "[u16; 4]")]
pub struct PixelRect {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

impl PixelRect {
    pub const EOS_MARKER: Self = Self {
        x: 0,
        y: 0,
        w: 0,
        h: 0,
    };

    pub const fn new(x: u16, y: u16, w: u16, h: u16) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn is_frame_end(&self) -> bool {
        *self == Self::EOS_MARKER
    }

    #[inline]
    pub fn area(&self) -> u32 {
        self.w as u32 * self.h as u32
    }

    #[inline]
    pub fn to_le_bytes(self) -> [u8; RECORD_SIZE] {
        let mut out = [0u8; RECORD_SIZE];
        LittleEndian::write_u16_into(&<[u16; 4]>::from(self), &mut out);
        out
    }

    #[inline]
    pub fn from_le_bytes(buf: [u8; RECORD_SIZE]) -> Self {
        let mut fields = [0u16; 4];
        LittleEndian::read_u16_into(&buf, &mut fields);
        Self::from(fields)
    }

    /// Reads one whole record. A short source is `UnexpectedEof`.
    pub fn read_from<R: Read>(mut src: R) -> io::Result<Self> {
        Ok(Self {
            x: src.read_u16::<LittleEndian>()?,
            y: src.read_u16::<LittleEndian>()?,
            w: src.read_u16::<LittleEndian>()?,
            h: src.read_u16::<LittleEndian>()?,
        })
    }
}

impl From<[u16; 4]> for PixelRect {
    fn from([x, y, w, h]: [u16; 4]) -> Self {
        Self { x, y, w, h }
    }
}

impl From<PixelRect> for [u16; 4] {
    fn from(r: PixelRect) -> Self {
        [r.x, r.y, r.w, r.h]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_encodes_to_zero_bytes() {
        assert_eq!(PixelRect::EOS_MARKER.to_le_bytes(), [0u8; RECORD_SIZE]);
        assert!(PixelRect::EOS_MARKER.is_frame_end());
    }

    #[test]
    fn fields_are_little_endian_in_order() {
        let rect = PixelRect::new(0x0102, 0x0304, 0x0506, 0x0708);
        assert_eq!(
            rect.to_le_bytes(),
            [0x02, 0x01, 0x04, 0x03, 0x06, 0x05, 0x08, 0x07]
        );
        assert_eq!(PixelRect::from_le_bytes(rect.to_le_bytes()), rect);
    }

    #[test]
    fn reader_decodes_array_encoding() {
        let rect = PixelRect::new(640, 1, 65535, 12);
        let buf = rect.to_le_bytes();
        assert_eq!(PixelRect::read_from(&buf[..]).unwrap(), rect);
    }

    #[test]
    fn short_read_is_unexpected_eof() {
        let err = PixelRect::read_from(&[1u8, 0, 2][..]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn zero_width_is_not_a_sentinel_unless_all_zero() {
        assert!(!PixelRect::new(3, 0, 0, 0).is_frame_end());
    }

    #[test]
    fn default_threshold_matches_sixty_percent() {
        assert_eq!(DEFAULT_THRESHOLD, (255.0f64 * 0.6).floor() as u8);
    }
}
