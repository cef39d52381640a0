use crate::{errors::EscapedBytes, util::get_split, Endianness, Error, ErrorKind, Primitive};

/// Longest string a length prefix may declare before the data is considered
/// corrupt
pub const MAX_STRING_LEN: usize = 1000;

/// Most elements a count prefixed list may declare before the data is
/// considered corrupt
pub const MAX_LIST_LEN: usize = 1000;

/// Sequential reader over a byte buffer with a runtime selected byte order
///
/// ```
/// use fbchunks::{ByteCursor, Endianness};
/// let data = [0x02, 0x00, b'h', b'i', 0x00, 0x00, 0x00, 0x07];
/// let mut cursor = ByteCursor::new(&data, Endianness::Little);
/// assert_eq!(cursor.read_string().unwrap(), "hi");
/// assert_eq!(cursor.read_u32().unwrap(), 0x0700_0000);
/// assert!(cursor.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    original_len: usize,
    endian: Endianness,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8], endian: Endianness) -> Self {
        ByteCursor {
            data,
            original_len: data.len(),
            endian,
        }
    }

    /// The byte order multi-byte integers are decoded with
    pub fn endianness(&self) -> Endianness {
        self.endian
    }

    /// Number of bytes consumed so far
    #[inline]
    pub fn position(&self) -> usize {
        self.original_len - self.data.len()
    }

    /// Returns the bytes that have yet to be read
    #[inline]
    pub fn remainder(&self) -> &'a [u8] {
        self.data
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    fn eof(&self, needed: usize) -> Error {
        Error::new(ErrorKind::Eof {
            offset: self.position(),
            needed,
        })
    }

    /// Reads the next `len` bytes verbatim
    #[inline]
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], Error> {
        if len > self.data.len() {
            return Err(self.eof(len));
        }

        let (head, rest) = self.data.split_at(len);
        self.data = rest;
        Ok(head)
    }

    /// Reads the next `N` bytes verbatim as an array
    #[inline]
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], Error> {
        let (head, rest) = get_split::<N>(self.data).ok_or_else(|| self.eof(N))?;
        self.data = rest;
        Ok(head)
    }

    /// Reads a fixed width integer in the cursor's byte order
    #[inline]
    pub fn read<T: Primitive>(&mut self) -> Result<T, Error> {
        let endian = self.endian;
        self.read_bytes(T::WIDTH)
            .map(|data| T::from_bytes(data, endian))
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8, Error> {
        self.read::<u8>()
    }

    #[inline]
    pub fn read_u16(&mut self) -> Result<u16, Error> {
        self.read::<u16>()
    }

    #[inline]
    pub fn read_u32(&mut self) -> Result<u32, Error> {
        self.read::<u32>()
    }

    #[inline]
    pub fn read_u64(&mut self) -> Result<u64, Error> {
        self.read::<u64>()
    }

    /// Reads a string with a 16 bit length prefix
    ///
    /// Invalid UTF-8 is replaced rather than rejected. A declared length above
    /// [`MAX_STRING_LEN`] is an error even when enough bytes remain.
    pub fn read_string(&mut self) -> Result<String, Error> {
        let offset = self.position();
        let len = usize::from(self.read_u16()?);
        if len > MAX_STRING_LEN {
            log::warn!("unrealistically long string of {} bytes at {}", len, offset);
            return Err(Error::new(ErrorKind::StringTooLong { len, offset }));
        }

        let data = self.read_bytes(len)?;
        Ok(String::from_utf8_lossy(data).into_owned())
    }

    /// Consumes the next 8 bytes and checks them against `expected`
    pub fn expect_magic(&mut self, expected: &[u8; 8]) -> Result<(), Error> {
        let found = self.read_array::<8>()?;
        if &found != expected {
            log::warn!(
                "invalid magic {} expected {}",
                EscapedBytes(&found),
                EscapedBytes(expected)
            );
            return Err(Error::new(ErrorKind::InvalidMagic {
                expected: *expected,
                found,
            }));
        }

        Ok(())
    }
}
