use tracing::debug;

use super::{HEADER_SIZE, reloc};
use crate::text::{Codepage, TextConfig, TextKind};
use crate::utils::{bytes, le_u16, le_u24, le_u32, null_terminated, u8};
use crate::{Error, Result};

/// Read-only view of a SIR0 container.
///
/// All offsets taken and returned are absolute byte offsets into the
/// container, which is also what every stored pointer holds.
#[derive(Debug, Clone, Copy)]
pub struct Sir0<'a> {
    data: &'a [u8],
    main_data_offset: u32,
    reloc_table_offset: u32,
}

impl<'a> Sir0<'a> {
    /// Validate the header of `data` and wrap it.
    ///
    /// Returns [`Error::BadMagic`] unless the file starts with `SIR`, and
    /// [`Error::UnsupportedVersion`] when the fourth byte is not `0`.
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let signature = bytes(data, 0, HEADER_SIZE)?;
        if &signature[..3] != b"SIR" {
            let mut found = [0u8; 4];
            found.copy_from_slice(&signature[..4]);
            return Err(Error::BadMagic {
                expected: *super::MAGIC,
                found,
            });
        }
        if signature[3] != b'0' {
            return Err(Error::UnsupportedVersion(signature[3]));
        }

        let main_data_offset = le_u32(data, 4)?;
        let reloc_table_offset = le_u32(data, 8)?;
        if main_data_offset as usize >= data.len() {
            return Err(Error::OutOfBounds {
                offset: main_data_offset as usize,
                len: 1,
                size: data.len(),
            });
        }

        debug!(
            len = data.len(),
            main_data_offset, reloc_table_offset, "parsed SIR0 header"
        );

        Ok(Self {
            data,
            main_data_offset,
            reloc_table_offset,
        })
    }

    /// The whole container.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Absolute offset of the root record.
    pub fn main_data_offset(&self) -> usize {
        self.main_data_offset as usize
    }

    /// Absolute offset of the relocation table, as recorded in the header.
    pub fn reloc_table_offset(&self) -> usize {
        self.reloc_table_offset as usize
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8> {
        u8(self.data, offset)
    }

    pub fn read_u16(&self, offset: usize) -> Result<u16> {
        le_u16(self.data, offset)
    }

    pub fn read_u24(&self, offset: usize) -> Result<u32> {
        le_u24(self.data, offset)
    }

    pub fn read_u32(&self, offset: usize) -> Result<u32> {
        le_u32(self.data, offset)
    }

    /// Borrow `len` raw bytes, e.g. pixel or palette data.
    pub fn read_bytes(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        bytes(self.data, offset, len)
    }

    /// Decode the null-terminated string at `offset` in `codepage`.
    pub fn read_string(&self, offset: usize, codepage: Codepage) -> Result<String> {
        let raw = null_terminated(self.data, offset)?;
        Ok(codepage.decode(raw, offset)?.into_owned())
    }

    /// Decode an identifier string; identifiers are always Shift-JIS.
    pub fn read_identifier(&self, offset: usize) -> Result<String> {
        self.read_string(offset, Codepage::ShiftJis)
    }

    /// Decode a string of `kind` using the code page `config` selects for it.
    pub fn read_text(&self, offset: usize, kind: TextKind, config: &TextConfig) -> Result<String> {
        self.read_string(offset, config.codepage(kind))
    }

    /// Read the pointer stored at `offset`. A zero pointer is `None`.
    pub fn read_pointer(&self, offset: usize) -> Result<Option<usize>> {
        let ptr = self.read_u32(offset)?;
        Ok((ptr != 0).then_some(ptr as usize))
    }

    /// Follow the pointer at `offset` and decode the string it points to.
    ///
    /// A null pointer yields `None`.
    pub fn read_string_at_pointer(
        &self,
        offset: usize,
        codepage: Codepage,
    ) -> Result<Option<String>> {
        self.read_pointer(offset)?
            .map(|target| self.read_string(target, codepage))
            .transpose()
    }

    /// Read a null-terminated array of pointers starting at `offset`.
    pub fn read_pointer_list(&self, offset: usize) -> Result<Vec<usize>> {
        let mut out = Vec::new();
        let mut at = offset;
        while let Some(ptr) = self.read_pointer(at)? {
            out.push(ptr);
            at += 4;
        }
        Ok(out)
    }

    /// Offsets of consecutive `stride`-byte records starting at `start`,
    /// ending before the first record whose leading `u32` is zero.
    pub fn terminated_records(&self, start: usize, stride: usize) -> Result<Vec<usize>> {
        if stride < 4 {
            return Err(Error::InvalidLength {
                context: "record stride",
                len: stride,
            });
        }
        let mut out = Vec::new();
        let mut at = start;
        while self.read_u32(at)? != 0 {
            out.push(at);
            at += stride;
        }
        Ok(out)
    }

    /// Decode the relocation table: the ascending absolute offsets of every
    /// pointer in the container.
    pub fn pointer_offsets(&self) -> Result<Vec<u32>> {
        let start = self.reloc_table_offset as usize;
        let table = self.data.get(start..).ok_or(Error::OutOfBounds {
            offset: start,
            len: 1,
            size: self.data.len(),
        })?;
        reloc::decode(table)
    }
}
