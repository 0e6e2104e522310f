//! Compression codecs used by game data.
//!
//! ## Submodules
//!
//! | Module | Algorithm | Typical use in datkit |
//! |--------|-----------|-----------------------|
//! | [`at6p`] | Delta + Exponential-Golomb | Background raster containers (`bg/*.dat`) |
//!
//! ## Choosing the right function
//!
//! * **Unknown input** - use [`at6p::decompress_if_at6p`], which passes
//!   uncompressed data through untouched, then parse the result with
//!   [`crate::formats::sir0::Sir0::parse`].
//! * **Fresh data** - use [`at6p::compress`].
//! * **Edited data** - use [`at6p::compress_with_template`] with the original
//!   compressed file so the opaque header bytes survive the round trip.

pub mod at6p;
mod bits;
