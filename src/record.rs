//! Decode the bit packed data chunk of a container.
//!
//! The data chunk is a single save record read field by field from a
//! [`BitCursor`](crate::BitCursor):
//!
//! ```text
//! magic            64 bits
//! optional flag    1 or 8 bits, then 27 x 32 bit opaque values when set
//! timestamp        64 or 32 bits
//! save file name   16 bit length + bytes
//! game version     16 bits
//! save version     16 bits
//! unknown          2 x 16 bits
//! build info       32 bits
//! level name       16 bit length + bytes
//! level trailer    32 bits
//! bundles          16 bit count + strings
//! ```
//!
//! Which widths and encodings apply is described by a [`FormatProfile`].

mod decoder;
mod profile;
mod reader;
mod timestamp;

pub use decoder::*;
pub use profile::*;
pub use reader::RecordReader;
pub use timestamp::*;
