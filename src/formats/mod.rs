//! Parsers and writers for container formats.
//!
//! Parsers borrow the whole file as a byte slice and never copy payload data.
//! Compressed files must be expanded first with [`crate::compression`].
//!
//! ## Format overview
//!
//! | Module   | Format | Description |
//! |----------|--------|-------------|
//! | [`sir0`] | SIR0   | Header + segments + relocation table listing every pointer slot |

pub mod sir0;
