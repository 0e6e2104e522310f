//! Low-level byte-slice primitives shared by the container and codec code.
//!
//! Each read function returns exactly the value it promises or
//! [`Error::OutOfBounds`] - there is no partial-read ambiguity.

use crate::{Error, Result};

/// Borrow `len` bytes starting at `offset`.
#[inline]
pub(crate) fn bytes(buf: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    offset
        .checked_add(len)
        .and_then(|end| buf.get(offset..end))
        .ok_or(Error::OutOfBounds {
            offset,
            len,
            size: buf.len(),
        })
}

/// Read exactly `N` bytes into a fixed-size array.
#[inline]
pub(crate) fn bytesa<const N: usize>(buf: &[u8], offset: usize) -> Result<[u8; N]> {
    let mut b = [0u8; N];
    b.copy_from_slice(bytes(buf, offset, N)?);
    Ok(b)
}

/// Read one byte.
#[inline]
pub(crate) fn u8(buf: &[u8], offset: usize) -> Result<u8> {
    Ok(bytesa::<1>(buf, offset)?[0])
}

/// Read a little-endian `u16`.
#[inline]
pub(crate) fn le_u16(buf: &[u8], offset: usize) -> Result<u16> {
    Ok(u16::from_le_bytes(bytesa(buf, offset)?))
}

/// Read a little-endian 24-bit integer.
#[inline]
pub(crate) fn le_u24(buf: &[u8], offset: usize) -> Result<u32> {
    let [a, b, c] = bytesa::<3>(buf, offset)?;
    Ok(u32::from_le_bytes([a, b, c, 0]))
}

/// Read a little-endian `u32`.
#[inline]
pub(crate) fn le_u32(buf: &[u8], offset: usize) -> Result<u32> {
    Ok(u32::from_le_bytes(bytesa(buf, offset)?))
}

/// Verify that the four bytes at `offset` match `expected`.
///
/// Returns [`Error::BadMagic`] on mismatch.
#[inline]
pub(crate) fn magic(buf: &[u8], offset: usize, expected: &[u8; 4]) -> Result<()> {
    let found = bytesa::<4>(buf, offset)?;
    if &found != expected {
        return Err(Error::BadMagic {
            expected: *expected,
            found,
        });
    }
    Ok(())
}

/// Borrow the bytes of a null-terminated string at `offset`, without the
/// terminator.
///
/// An unterminated string is reported as [`Error::OutOfBounds`] covering the
/// scanned region plus the missing terminator.
#[inline]
pub(crate) fn null_terminated(buf: &[u8], offset: usize) -> Result<&[u8]> {
    let slice = buf.get(offset..).ok_or(Error::OutOfBounds {
        offset,
        len: 1,
        size: buf.len(),
    })?;
    let end = slice
        .iter()
        .position(|&b| b == 0)
        .ok_or(Error::OutOfBounds {
            offset,
            len: slice.len() + 1,
            size: buf.len(),
        })?;
    Ok(&slice[..end])
}

/// Round `n` up to the next multiple of `align` (a power of two).
#[inline]
pub(crate) const fn align_up(n: usize, align: usize) -> usize {
    (n + align - 1) & !(align - 1)
}

/// Append `fill` bytes to `buf` until its length is a multiple of `align`.
#[inline]
pub(crate) fn pad_to(buf: &mut Vec<u8>, align: usize, fill: u8) {
    buf.resize(align_up(buf.len(), align), fill);
}
