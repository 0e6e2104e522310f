//! Relocation table codec.
//!
//! The table lists every file offset that holds a pointer, ascending. The
//! first entry is absolute and each later entry is the distance from the
//! previous one. Each value is written as a big-endian base-128 varint: 7-bit
//! groups, most significant first, with `0x80` set on every byte but the last.
//! A single `0x00` byte ends the table.

use crate::{Error, Result};

/// Encode ascending absolute `offsets` into a terminated relocation table.
///
/// Returns [`Error::InvalidSchema`] if `offsets` is not strictly increasing.
pub fn encode(offsets: &[u32]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(offsets.len() + 1);
    let mut prev: Option<u32> = None;
    for &offset in offsets {
        let delta = match prev {
            None => offset,
            Some(p) if offset > p => offset - p,
            Some(_) => {
                return Err(Error::InvalidSchema(format!(
                    "pointer offsets not strictly increasing at {offset:#x}"
                )));
            }
        };
        push_varint(&mut out, delta);
        prev = Some(offset);
    }
    out.push(0);
    Ok(out)
}

fn push_varint(out: &mut Vec<u8>, value: u32) {
    let mut groups = [0u8; 5];
    let mut n = 0;
    let mut v = value;
    loop {
        groups[n] = (v & 0x7F) as u8;
        n += 1;
        v >>= 7;
        if v == 0 {
            break;
        }
    }
    for i in (1..n).rev() {
        out.push(groups[i] | 0x80);
    }
    out.push(groups[0]);
}

/// Decode a relocation table starting at `table[0]` into absolute offsets.
///
/// Stops at the terminating zero byte. Returns [`Error::Format`] if the table
/// runs off the end of the slice or a varint overflows 32 bits.
pub fn decode(table: &[u8]) -> Result<Vec<u32>> {
    let mut offsets = Vec::new();
    let mut pos = 0usize;
    let mut current: u32 = 0;
    loop {
        let mut value: u32 = 0;
        loop {
            let &byte = table
                .get(pos)
                .ok_or(Error::Format("unterminated relocation table"))?;
            pos += 1;
            if value > (u32::MAX >> 7) {
                return Err(Error::Format("relocation entry overflows 32 bits"));
            }
            value = (value << 7) | u32::from(byte & 0x7F);
            if byte & 0x80 == 0 {
                break;
            }
        }
        if value == 0 {
            return Ok(offsets);
        }
        current = current
            .checked_add(value)
            .ok_or(Error::Format("relocation entry overflows 32 bits"))?;
        offsets.push(current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn varint_groups_are_big_endian() {
        let mut out = Vec::new();
        push_varint(&mut out, 0x7F);
        assert_eq!(out, [0x7F]);

        out.clear();
        push_varint(&mut out, 0x80);
        assert_eq!(out, [0x81, 0x00]);

        out.clear();
        push_varint(&mut out, 0x3FFF);
        assert_eq!(out, [0xFF, 0x7F]);

        out.clear();
        push_varint(&mut out, 0x4000);
        assert_eq!(out, [0x81, 0x80, 0x00]);
    }

    #[test]
    fn header_pointers_encode_as_two_fours() {
        assert_eq!(encode(&[4, 8]).unwrap(), [4, 4, 0]);
    }

    #[test]
    fn decode_inverts_encode() {
        let offsets = [4, 8, 0x20, 0x24, 0x1A0, 0x4230];
        let table = encode(&offsets).unwrap();
        assert_eq!(*table.last().unwrap(), 0);
        assert_eq!(decode(&table).unwrap(), offsets);
    }

    #[test]
    fn decode_ignores_trailing_padding() {
        assert_eq!(decode(&[4, 4, 0, 0xAA, 0xAA]).unwrap(), [4, 8]);
    }

    #[test]
    fn unordered_offsets_are_rejected() {
        assert!(matches!(encode(&[8, 4]), Err(Error::InvalidSchema(_))));
        assert!(matches!(encode(&[4, 4]), Err(Error::InvalidSchema(_))));
    }

    #[test]
    fn truncated_table_is_rejected() {
        assert!(matches!(decode(&[4, 0x81]), Err(Error::Format(_))));
        assert!(matches!(decode(&[]), Err(Error::Format(_))));
    }
}
