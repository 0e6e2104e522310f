//! **datkit** - read, write and recompress the data files of the Pokemon
//! Mystery Dungeon DS games.
//!
//! # Supported formats
//! | Module | Format |
//! |--------|--------|
//! | [`formats::sir0`]     | SIR0 - relocatable pointer container |
//! | [`compression::at6p`] | AT6P - delta + Exp-Golomb compressed payload |
//! | [`palette`]           | RGB555 <-> RGB888 color conversion |
//!
//! Game text is single-byte or Shift-JIS encoded; see [`text`] for codepage
//! selection.

pub mod compression;
pub mod error;
pub mod formats;
pub mod palette;
pub mod text;
pub(crate) mod utils;

pub use error::{Error, Result};
