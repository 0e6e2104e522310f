//! AT6P - delta + Exponential-Golomb compression for background rasters.
//!
//! Background files (`bg/*.dat`) are SIR0 containers wrapped in an AT6P
//! stream. The codec stores the first byte raw and every following byte as a
//! signed step relative to a two-byte history.
//!
//! ## Layout
//! ```text
//! [0x00] Magic "AT6P"                      (4 bytes)
//! [0x04] Unknown                           (u8, opaque)
//! [0x05] CompressedLength                  (u16 LE; must equal the stream length)
//! [0x07] Unknown                           (9 bytes, opaque)
//! [0x10] DecompressedLength                (u24 LE)
//! [0x13] Reserved (0)                      (u8)
//! [0x14] Seed - first decompressed byte    (u8)
//! [0x15] Unknown                           (u8, opaque)
//! [0x16] Bitstream
//! ```
//!
//! ## Bitstream
//! Bits are consumed least-significant first. Each code is an
//! Exponential-Golomb integer: `P` zero bits, a one bit, then `P` value bits
//! (lowest first). `word = value + 2^P - 1`. The low bit of `word` is a sign
//! and the rest a magnitude:
//!
//! | sign | magnitude | meaning |
//! |------|-----------|---------|
//! | +    | 0         | repeat the current byte |
//! | -    | 0         | recall the byte before it (swap the two slots) |
//! | ±    | m         | current ± m (mod 256) |
//!
//! The longest legal prefix is 8 zero bits; anything longer is corruption.

use std::borrow::Cow;

use tracing::debug;

use super::bits::{BitReader, BitWriter};
use crate::utils::{bytes, le_u16, le_u24, magic, u8};
use crate::{Error, Result};

/// Stream signature.
pub const MAGIC: &[u8; 4] = b"AT6P";

/// Size of the fixed header before the seed byte.
pub const HEADER_SIZE: usize = 0x14;

/// Offset of the first bitstream byte.
pub const STREAM_OFFSET: usize = 0x16;

/// Longest accepted run of zero bits in a code prefix.
pub const MAX_PREFIX: u32 = 8;

/// Largest input the 24-bit length field can describe.
pub const MAX_DECOMPRESSED_LEN: usize = 0xFF_FFFF;

/// Parsed AT6P header.
///
/// The `opaque_*` fields have no known meaning. They are carried through so
/// that rebuilt streams can reproduce them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct At6pHeader {
    pub opaque_04: u8,
    /// Total stream length in bytes, header included.
    pub compressed_len: u16,
    pub opaque_07: [u8; 9],
    pub decompressed_len: u32,
    /// First decompressed byte; also seeds the history.
    pub seed: u8,
    pub opaque_15: u8,
}

impl At6pHeader {
    /// Parse the header at the start of `data`.
    ///
    /// Does not compare `compressed_len` with `data.len()`; [`decompress`]
    /// does.
    pub fn parse(data: &[u8]) -> Result<Self> {
        magic(data, 0, MAGIC)?;
        bytes(data, 0, STREAM_OFFSET)?;
        if u8(data, 0x13)? != 0 {
            return Err(Error::Format("AT6P reserved byte is not zero"));
        }
        let mut opaque_07 = [0u8; 9];
        opaque_07.copy_from_slice(&data[0x07..0x10]);
        Ok(Self {
            opaque_04: u8(data, 0x04)?,
            compressed_len: le_u16(data, 0x05)?,
            opaque_07,
            decompressed_len: le_u24(data, 0x10)?,
            seed: u8(data, 0x14)?,
            opaque_15: u8(data, 0x15)?,
        })
    }

    fn write(&self, out: &mut [u8]) {
        out[0..4].copy_from_slice(MAGIC);
        out[0x04] = self.opaque_04;
        out[0x05..0x07].copy_from_slice(&self.compressed_len.to_le_bytes());
        out[0x07..0x10].copy_from_slice(&self.opaque_07);
        out[0x10..0x13].copy_from_slice(&self.decompressed_len.to_le_bytes()[..3]);
        out[0x13] = 0;
        out[0x14] = self.seed;
        out[0x15] = self.opaque_15;
    }
}

/// One decoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Emit the current byte again.
    Repeat,
    /// Swap the two history slots and emit the new current byte.
    Recall,
    /// Add a signed amount to the current byte. Never zero.
    Delta(i16),
}

impl Step {
    /// Interpret a Golomb-decoded word.
    pub fn from_word(word: u32) -> Self {
        let magnitude = (word >> 1) as i16;
        match (word & 1 == 1, magnitude) {
            (false, 0) => Self::Repeat,
            (true, 0) => Self::Recall,
            (false, m) => Self::Delta(m),
            (true, m) => Self::Delta(-m),
        }
    }

    /// The word that decodes to this step.
    pub fn word(self) -> u32 {
        match self {
            Self::Repeat => 0,
            Self::Recall => 1,
            Self::Delta(d) => u32::from(d.unsigned_abs()) * 2 + u32::from(d < 0),
        }
    }
}

/// The decoder's two-slot shift register.
///
/// `current` is always the last emitted byte. `previous` moves only on a
/// [`Step::Delta`] (it takes the old `current`) or a [`Step::Recall`] (the
/// slots swap); a [`Step::Repeat`] leaves both slots alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct History {
    pub previous: u8,
    pub current: u8,
}

impl History {
    pub fn new(seed: u8) -> Self {
        Self {
            previous: seed,
            current: seed,
        }
    }

    /// Apply `step` and return the emitted byte.
    pub fn apply(&mut self, step: Step) -> u8 {
        match step {
            Step::Repeat => {}
            Step::Recall => std::mem::swap(&mut self.previous, &mut self.current),
            Step::Delta(d) => {
                self.previous = self.current;
                self.current = self.current.wrapping_add(d as u8);
            }
        }
        self.current
    }

    /// The cheapest step that makes the next emitted byte `target`.
    pub fn step_toward(&self, target: u8) -> Step {
        if target == self.current {
            Step::Repeat
        } else if target == self.previous {
            Step::Recall
        } else {
            Step::Delta(i16::from(target.wrapping_sub(self.current) as i8))
        }
    }
}

fn read_word(bits: &mut BitReader<'_>) -> Result<u32> {
    let start = bits.position();
    let mut prefix = 0u32;
    while !bits.read_bit()? {
        prefix += 1;
        if prefix > MAX_PREFIX {
            return Err(Error::CorruptStream {
                offset: start,
                prefix,
            });
        }
    }
    let value = bits.read_bits(prefix)?;
    Ok(value + (1 << prefix) - 1)
}

fn write_word(bits: &mut BitWriter, word: u32) {
    let code = word + 1;
    let width = u32::BITS - code.leading_zeros();
    bits.write_bits(0, width - 1);
    bits.write_bit(true);
    bits.write_bits(code, width - 1);
}

/// Whether `data` starts with the AT6P signature.
pub fn is_at6p(data: &[u8]) -> bool {
    data.starts_with(MAGIC)
}

/// Decompress a complete AT6P stream.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let header = At6pHeader::parse(data)?;
    if usize::from(header.compressed_len) != data.len() {
        return Err(Error::LengthMismatch {
            declared: usize::from(header.compressed_len),
            actual: data.len(),
        });
    }
    let len = header.decompressed_len as usize;
    if len == 0 {
        return Err(Error::Format("AT6P decompressed length is zero"));
    }

    let mut out = Vec::with_capacity(len);
    out.push(header.seed);
    let mut history = History::new(header.seed);
    let mut bits = BitReader::new(data, STREAM_OFFSET);
    while out.len() < len {
        let word = read_word(&mut bits)?;
        out.push(history.apply(Step::from_word(word)));
    }

    debug!(compressed = data.len(), decompressed = len, "decompressed AT6P stream");
    Ok(out)
}

/// Decompress `data` if it is an AT6P stream; otherwise borrow it unchanged.
pub fn decompress_if_at6p(data: &[u8]) -> Result<Cow<'_, [u8]>> {
    if is_at6p(data) {
        Ok(Cow::Owned(decompress(data)?))
    } else {
        Ok(Cow::Borrowed(data))
    }
}

/// Compress `data` into a fresh AT6P stream with zeroed opaque fields.
///
/// Fails with [`Error::InvalidLength`] if `data` is empty, longer than
/// [`MAX_DECOMPRESSED_LEN`], or compresses to more than `u16::MAX` bytes.
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let (&seed, rest) = data.split_first().ok_or(Error::InvalidLength {
        context: "AT6P input",
        len: 0,
    })?;
    if data.len() > MAX_DECOMPRESSED_LEN {
        return Err(Error::InvalidLength {
            context: "AT6P input",
            len: data.len(),
        });
    }

    let mut history = History::new(seed);
    let mut bits = BitWriter::new(vec![0; STREAM_OFFSET]);
    for &b in rest {
        let step = history.step_toward(b);
        history.apply(step);
        write_word(&mut bits, step.word());
    }
    let mut out = bits.finish();

    let compressed_len = u16::try_from(out.len()).map_err(|_| Error::InvalidLength {
        context: "AT6P compressed stream",
        len: out.len(),
    })?;
    let header = At6pHeader {
        opaque_04: 0,
        compressed_len,
        opaque_07: [0; 9],
        decompressed_len: data.len() as u32,
        seed,
        opaque_15: 0,
    };
    header.write(&mut out[..STREAM_OFFSET]);

    debug!(decompressed = data.len(), compressed = out.len(), "compressed AT6P stream");
    Ok(out)
}

/// Compress `data`, copying the opaque header bytes from `previous`, an
/// earlier AT6P stream of the same asset, to keep binary diffs small.
pub fn compress_with_template(data: &[u8], previous: &[u8]) -> Result<Vec<u8>> {
    magic(previous, 0, MAGIC)?;
    let template = bytes(previous, 0, STREAM_OFFSET)?;
    let mut out = compress(data)?;
    out[0x04] = template[0x04];
    out[0x08..0x10].copy_from_slice(&template[0x08..0x10]);
    out[0x15] = template[0x15];
    Ok(out)
}
