//! SIR0 - pointer-relocatable object container.
//!
//! Nearly every data file in the game is a SIR0 container. The payload is a
//! graph of records that refer to each other with absolute file offsets; the
//! trailing relocation table tells the loader which words are pointers so it
//! can rebase them after loading the file at an arbitrary address.
//!
//! ## Layout
//! ```text
//! [0x00] Header            (0x10 bytes)
//! [0x10] String table      (null-terminated strings, padded to 4 with 0xAA)
//! [...]  Record segments   (fixed-stride arrays, each padded to 4 with 0xAA)
//! [...]  Root segment      (the record the header points at)
//! [...]  0xAA padding to a 16-byte boundary
//! [...]  Relocation table  (varint deltas, 0x00-terminated)
//! [...]  0xAA padding to a 16-byte boundary
//! ```
//!
//! ## Header (0x10 bytes)
//! ```text
//! [0x00] Magic "SIR0"                      (4 bytes; "SIR1" is 64-bit and unsupported)
//! [0x04] MainDataOffset  (abs ptr)         (u32 LE)
//! [0x08] RelocTableOffset (abs ptr)        (u32 LE)
//! [0x0C] Reserved (0)                      (4 bytes)
//! ```
//!
//! Both header words are themselves pointers, so every relocation table
//! starts with the entries `4` and `8`.
//!
//! ## Relocation table
//! See [`reloc`]. Null pointers (stored as `0`) are never listed, otherwise
//! the loader would rebase them into non-null garbage.
//!
//! ## Usage
//! [`Sir0`] reads a container; [`Sir0Builder`] lays one out from segments and
//! pointer placeholders and computes the relocation table.

mod builder;
mod reader;
pub mod reloc;

pub use builder::{Layout, Pointer, SegmentId, Sir0Builder};
pub use reader::Sir0;

/// Container signature.
pub const MAGIC: &[u8; 4] = b"SIR0";

/// Size of the fixed header; the string table starts here.
pub const HEADER_SIZE: usize = 0x10;

/// Filler byte used for all alignment padding.
pub const PAD_BYTE: u8 = 0xAA;
