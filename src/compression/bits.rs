//! LSB-first bit cursor and bit sink.

use crate::{Error, Result};

/// Reads bits least-significant first within each byte.
#[derive(Debug)]
pub(crate) struct BitReader<'a> {
    data: &'a [u8],
    byte: usize,
    bit: u32,
}

impl<'a> BitReader<'a> {
    pub(crate) fn new(data: &'a [u8], start: usize) -> Self {
        Self {
            data,
            byte: start,
            bit: 0,
        }
    }

    /// Byte offset of the next bit.
    pub(crate) fn position(&self) -> usize {
        self.byte
    }

    pub(crate) fn read_bit(&mut self) -> Result<bool> {
        let &b = self.data.get(self.byte).ok_or(Error::OutOfBounds {
            offset: self.byte,
            len: 1,
            size: self.data.len(),
        })?;
        let bit = (b >> self.bit) & 1 != 0;
        self.bit += 1;
        if self.bit == 8 {
            self.bit = 0;
            self.byte += 1;
        }
        Ok(bit)
    }

    /// Read `count` bits (at most 32) as an integer, first bit lowest.
    pub(crate) fn read_bits(&mut self, count: u32) -> Result<u32> {
        debug_assert!(count <= 32);
        let mut v = 0u32;
        for j in 0..count {
            if self.read_bit()? {
                v |= 1 << j;
            }
        }
        Ok(v)
    }
}

/// Appends bits least-significant first; the final partial byte is
/// zero-filled.
#[derive(Debug)]
pub(crate) struct BitWriter {
    out: Vec<u8>,
    acc: u8,
    bit: u32,
}

impl BitWriter {
    pub(crate) fn new(out: Vec<u8>) -> Self {
        Self { out, acc: 0, bit: 0 }
    }

    pub(crate) fn write_bit(&mut self, bit: bool) {
        if bit {
            self.acc |= 1 << self.bit;
        }
        self.bit += 1;
        if self.bit == 8 {
            self.out.push(self.acc);
            self.acc = 0;
            self.bit = 0;
        }
    }

    /// Write the low `count` bits of `value`, lowest first.
    pub(crate) fn write_bits(&mut self, value: u32, count: u32) {
        for j in 0..count {
            self.write_bit((value >> j) & 1 != 0);
        }
    }

    pub(crate) fn finish(mut self) -> Vec<u8> {
        if self.bit != 0 {
            self.out.push(self.acc);
        }
        self.out
    }
}
