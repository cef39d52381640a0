use crate::{Endianness, Error, ErrorKind, Primitive};

/// Sequential reader over a tightly packed bit stream
///
/// Bits are consumed least significant bit first within each byte. An `n` bit
/// read places stream bit `position + k` at bit `k` of the returned value, so
/// a byte aligned 16 bit read of `[0x34, 0x12]` yields `0x1234`.
///
/// ```
/// use fbchunks::BitCursor;
/// let data = [0b1010_0101, 0xff];
/// let mut cursor = BitCursor::new(&data);
/// assert_eq!(cursor.read_bits(1).unwrap(), 1);
/// assert_eq!(cursor.read_bits(3).unwrap(), 0b010);
/// assert_eq!(cursor.peek_bits(8).unwrap(), 0b1111_1010);
/// assert_eq!(cursor.position(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct BitCursor<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BitCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        BitCursor { data, position: 0 }
    }

    /// Number of bits consumed so far
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of bits that have yet to be read
    #[inline]
    pub fn remaining_bits(&self) -> usize {
        self.data.len() * 8 - self.position
    }

    /// Extracts the next `width` bits without consuming them
    ///
    /// # Panics
    ///
    /// Panics if `width` is not within `1..=64`
    pub fn peek_bits(&self, width: u32) -> Result<u64, Error> {
        assert!(
            (1..=64).contains(&width),
            "bit width must be within 1..=64, got {}",
            width
        );

        let width = width as usize;
        if width > self.remaining_bits() {
            return Err(Error::new(ErrorKind::Eof {
                offset: self.position,
                needed: width,
            }));
        }

        let mut value = 0u64;
        let mut filled = 0;
        let mut pos = self.position;
        while filled < width {
            let byte = u64::from(self.data[pos / 8]);
            let shift = pos % 8;
            let take = (8 - shift).min(width - filled);
            let bits = (byte >> shift) & ((1u64 << take) - 1);
            value |= bits << filled;
            filled += take;
            pos += take;
        }

        Ok(value)
    }

    /// Extracts and consumes the next `width` bits
    ///
    /// # Panics
    ///
    /// Panics if `width` is not within `1..=64`
    #[inline]
    pub fn read_bits(&mut self, width: u32) -> Result<u64, Error> {
        let value = self.peek_bits(width)?;
        self.position += width as usize;
        Ok(value)
    }

    #[inline]
    pub fn read_bit(&mut self) -> Result<bool, Error> {
        self.read_bits(1).map(|x| x == 1)
    }

    /// Reads an unsigned integer of `T`'s width exactly as the stream packs it
    #[inline]
    pub fn read_raw<T: Primitive>(&mut self) -> Result<T, Error> {
        self.read_bits((T::WIDTH * 8) as u32).map(T::from_bits)
    }

    /// Reads an unsigned integer of `T`'s width and corrects its byte order for
    /// a container of the given endianness
    #[inline]
    pub fn read<T: Primitive>(&mut self, container: Endianness) -> Result<T, Error> {
        self.read_raw::<T>()
            .map(|raw| correct_byte_order(raw, container))
    }

    /// Reads `len` consecutive 8 bit values
    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>, Error> {
        if len * 8 > self.remaining_bits() {
            return Err(Error::new(ErrorKind::Eof {
                offset: self.position,
                needed: len * 8,
            }));
        }

        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            out.push(self.read_raw::<u8>()?);
        }
        Ok(out)
    }
}

/// Converts a multi-byte value as extracted from the record bit stream into
/// its logical value
///
/// Extracted values arrive in one fixed byte order regardless of the
/// container's. A little endian container needs every multi-byte field byte
/// swapped while a big endian container uses the raw extraction as is.
///
/// ```
/// use fbchunks::{correct_byte_order, Endianness};
/// assert_eq!(correct_byte_order(0x0300u16, Endianness::Little), 0x0003);
/// assert_eq!(correct_byte_order(0x0300u16, Endianness::Big), 0x0300);
/// assert_eq!(correct_byte_order(0x12u8, Endianness::Little), 0x12);
/// ```
#[inline]
pub fn correct_byte_order<T: Primitive>(raw: T, container: Endianness) -> T {
    match container {
        Endianness::Little => raw.swap_bytes(),
        Endianness::Big => raw,
    }
}
