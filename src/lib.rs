/*!

A decoder for `FBCHUNKS` save game containers.

A container is a small fixed preamble followed by two checksummed chunks: a
byte oriented header table of `(hash, string)` entries and a bit packed data
record describing the save (timestamp, save name, versions, level, preloaded
bundles). This crate validates and decodes both into plain Rust structures.

## Features

- ✔ Validate before trust: every chunk is CRC checked before a single field is
  interpreted
- ✔ Endianness is detected from the container magic
- ✔ Predictable failure: corrupt input is reported as a typed [`Error`], never
  a panic, while recognized but unsupported versions decode with a
  [`DecodeStatus::Unsupported`] status so they can still be inspected
- ✔ Decode only: there is no writer

## Quick Start

```rust
use fbchunks::SaveFile;
use std::fs::File;

# fn run(path: &str) -> Result<(), Box<dyn std::error::Error>> {
let file = File::open(path)?;
let save = SaveFile::from_reader(file)?;
println!("{} saved at {}", save.record().save_file_name(), save.record().timestamp());
for entry in save.header().iter() {
    println!("{:08x} = {}", entry.hash(), entry.value());
}
# Ok(())
# }
```

Decoding with a fixed record layout instead of trying every known one:

```rust
use fbchunks::{ContainerDecoder, FormatProfile, ProfileSelection};

let decoder = ContainerDecoder::builder()
    .profile(ProfileSelection::Fixed(FormatProfile::NARROW))
    .build();

// An empty input is not a container
let err = decoder.decode_slice(b"").unwrap_err();
assert_eq!(err.stage(), fbchunks::Stage::Framing);
```

## Caveats

Caller is responsible for:

- Opening the save file (the decoder accepts any `Read + Seek` source)
- Installing a [`log`](https://docs.rs/log) implementation if decode progress
  should be visible

*/

mod bit_cursor;
mod byte_cursor;
mod checksum;
mod container;
mod endian;
mod errors;
mod header;
mod record;
pub(crate) mod util;

pub use self::bit_cursor::{correct_byte_order, BitCursor};
pub use self::byte_cursor::{ByteCursor, MAX_LIST_LEN, MAX_STRING_LEN};
pub use self::checksum::{checksum, verify_checksum, CHECKSUM_SEED, CRC32_POLYNOMIAL};
pub use self::container::*;
pub use self::endian::{Endianness, Primitive};
pub use self::errors::*;
pub use self::header::*;
pub use self::record::*;
