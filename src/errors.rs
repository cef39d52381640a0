use std::fmt;

/// An error that can occur when decoding a container
///
/// Every error is fatal to the chunk being decoded. Recognized but unsupported
/// values are not errors and are reported as a [`SoftFailure`](crate::SoftFailure)
/// instead.
#[derive(Debug)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub(crate) fn new(kind: ErrorKind) -> Error {
        Error(Box::new(kind))
    }

    /// Return the specific type of error
    pub fn kind(&self) -> &ErrorKind {
        &self.0
    }

    /// Returns the offset that the error occurs (if available)
    ///
    /// Offsets are relative to the start of the buffer being decoded. They
    /// count bytes in the container preamble and header chunk, and bits in the
    /// data chunk.
    pub fn offset(&self) -> Option<usize> {
        self.0.offset()
    }
}

/// Specific type of error
#[derive(Debug)]
pub enum ErrorKind {
    /// Fewer bytes (or bits) remained than a read requested
    Eof { offset: usize, needed: usize },

    /// The container magic matched neither byte order
    UnknownEndianness { magic: [u8; 8] },

    /// A chunk began with an unexpected magic value
    InvalidMagic { expected: [u8; 8], found: [u8; 8] },

    /// A chunk's stored checksum disagrees with the checksum of its content
    ChecksumMismatch { stored: u32, computed: u32 },

    /// A chunk length too small to hold its own checksum
    InvalidChunkLength { declared: u32 },

    /// The header declared a different number of entries than the schema
    EntryCountMismatch { expected: u32, found: u32 },

    /// A length prefixed string exceeded the sanity cap
    StringTooLong { len: usize, offset: usize },

    /// A count prefixed list exceeded the sanity cap
    ListTooLong { len: usize, offset: usize },

    /// The save schema version is outside the supported range and the format
    /// profile treats that as fatal
    UnsupportedSaveVersion { version: u16 },

    /// The underlying byte source failed
    Io(std::io::Error),
}

impl ErrorKind {
    pub fn offset(&self) -> Option<usize> {
        match *self {
            ErrorKind::Eof { offset, .. } => Some(offset),
            ErrorKind::StringTooLong { offset, .. } => Some(offset),
            ErrorKind::ListTooLong { offset, .. } => Some(offset),
            _ => None,
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self.0 {
            ErrorKind::Io(ref err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self.0 {
            ErrorKind::Eof { offset, needed } => write!(
                f,
                "unexpected end of data (needed: {}, offset: {})",
                needed, offset
            ),
            ErrorKind::UnknownEndianness { ref magic } => write!(
                f,
                "container magic {} matches neither byte order",
                EscapedBytes(magic)
            ),
            ErrorKind::InvalidMagic {
                ref expected,
                ref found,
            } => write!(
                f,
                "invalid magic (expected: {}, found: {})",
                EscapedBytes(expected),
                EscapedBytes(found)
            ),
            ErrorKind::ChecksumMismatch { stored, computed } => write!(
                f,
                "checksum mismatch (stored: 0x{:08x}, computed: 0x{:08x})",
                stored, computed
            ),
            ErrorKind::InvalidChunkLength { declared } => {
                write!(f, "chunk length {} cannot hold a checksum", declared)
            }
            ErrorKind::EntryCountMismatch { expected, found } => write!(
                f,
                "invalid number of header entries (expected: {}, found: {})",
                expected, found
            ),
            ErrorKind::StringTooLong { len, offset } => write!(
                f,
                "unrealistically long string (length: {}, offset: {})",
                len, offset
            ),
            ErrorKind::ListTooLong { len, offset } => write!(
                f,
                "unrealistically long list (length: {}, offset: {})",
                len, offset
            ),
            ErrorKind::UnsupportedSaveVersion { version } => {
                write!(f, "unsupported save version: {}", version)
            }
            ErrorKind::Io(ref err) => write!(f, "io error: {}", err),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::new(ErrorKind::Io(error))
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error::new(kind)
    }
}

/// Formats magic values like `b"FB\0SAVE\n"`
pub(crate) struct EscapedBytes<'a>(pub(crate) &'a [u8]);

impl fmt::Display for EscapedBytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("b\"")?;
        for &b in self.0 {
            write!(f, "{}", std::ascii::escape_default(b))?;
        }
        f.write_str("\"")
    }
}
