//! RGB555 <-> RGB888 palette conversion.
//!
//! The DS stores colors as little-endian `u16` words: red in bits 0-4, green
//! in 5-9, blue in 10-14, bit 15 unused. Expansion to 8 bits replicates the
//! top bits of each channel into the low bits (`c * 33 >> 2`), so shifting
//! right by 3 recovers the original channel exactly.

use crate::{Error, Result};

/// Colors in a background palette.
pub const PALETTE_COLORS: usize = 256;

/// Byte length of a 256-color RGB555 palette.
pub const RGB555_PALETTE_LEN: usize = PALETTE_COLORS * 2;

/// Byte length of a 256-color RGB888 palette.
pub const RGB888_PALETTE_LEN: usize = PALETTE_COLORS * 3;

/// One 15-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb555(pub u16);

impl Rgb555 {
    pub fn to_rgb888(self) -> [u8; 3] {
        let expand = |c: u16| ((c & 0x1F) * 33 >> 2) as u8;
        [expand(self.0), expand(self.0 >> 5), expand(self.0 >> 10)]
    }

    pub fn from_rgb888([r, g, b]: [u8; 3]) -> Self {
        let narrow = |c: u8| u16::from(c >> 3);
        Self(narrow(r) | (narrow(g) << 5) | (narrow(b) << 10))
    }
}

/// Expand any whole number of RGB555 colors to RGB888.
pub fn upconvert(rgb555: &[u8]) -> Result<Vec<u8>> {
    if rgb555.len() % 2 != 0 {
        return Err(Error::InvalidLength {
            context: "RGB555 color data",
            len: rgb555.len(),
        });
    }
    Ok(rgb555
        .chunks_exact(2)
        .flat_map(|c| Rgb555(u16::from_le_bytes([c[0], c[1]])).to_rgb888())
        .collect())
}

/// Narrow any whole number of RGB888 colors to RGB555.
pub fn downconvert(rgb888: &[u8]) -> Result<Vec<u8>> {
    if rgb888.len() % 3 != 0 {
        return Err(Error::InvalidLength {
            context: "RGB888 color data",
            len: rgb888.len(),
        });
    }
    Ok(rgb888
        .chunks_exact(3)
        .flat_map(|c| Rgb555::from_rgb888([c[0], c[1], c[2]]).0.to_le_bytes())
        .collect())
}

/// Expand a full 256-color palette (exactly 512 bytes).
pub fn upconvert_palette(rgb555: &[u8]) -> Result<Vec<u8>> {
    if rgb555.len() != RGB555_PALETTE_LEN {
        return Err(Error::InvalidLength {
            context: "RGB555 palette",
            len: rgb555.len(),
        });
    }
    upconvert(rgb555)
}

/// Narrow a full 256-color palette (exactly 768 bytes).
pub fn downconvert_palette(rgb888: &[u8]) -> Result<Vec<u8>> {
    if rgb888.len() != RGB888_PALETTE_LEN {
        return Err(Error::InvalidLength {
            context: "RGB888 palette",
            len: rgb888.len(),
        });
    }
    downconvert(rgb888)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_expansion() {
        assert_eq!(Rgb555(0x7FFF).to_rgb888(), [255, 255, 255]);
        assert_eq!(Rgb555(0).to_rgb888(), [0, 0, 0]);
        assert_eq!(Rgb555(0x001F).to_rgb888(), [255, 0, 0]);
        assert_eq!(Rgb555(1 << 5).to_rgb888(), [0, 8, 0]);
        assert_eq!(Rgb555(16 << 10).to_rgb888(), [0, 0, 132]);
        // Bit 15 is ignored.
        assert_eq!(Rgb555(0x8000).to_rgb888(), [0, 0, 0]);
    }

    #[test]
    fn channel_narrowing() {
        assert_eq!(Rgb555::from_rgb888([255, 255, 255]), Rgb555(0x7FFF));
        assert_eq!(Rgb555::from_rgb888([7, 8, 132]), Rgb555((1 << 5) | (16 << 10)));
    }

    #[test]
    fn buffer_conversion() {
        let up = upconvert(&[0x1F, 0x00, 0xE0, 0x03]).unwrap();
        assert_eq!(up, [255, 0, 0, 0, 255, 0]);
        assert_eq!(downconvert(&up).unwrap(), [0x1F, 0x00, 0xE0, 0x03]);
    }

    #[test]
    fn stride_violations() {
        assert!(matches!(upconvert(&[0; 3]), Err(Error::InvalidLength { len: 3, .. })));
        assert!(matches!(downconvert(&[0; 4]), Err(Error::InvalidLength { len: 4, .. })));
        assert!(upconvert_palette(&[0; 510]).is_err());
        assert!(downconvert_palette(&[0; 771]).is_err());
        assert_eq!(upconvert_palette(&[0; 512]).unwrap().len(), 768);
        assert_eq!(downconvert_palette(&[0; 768]).unwrap().len(), 512);
    }
}
