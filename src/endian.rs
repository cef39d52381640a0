/// Byte order of the fixed width fields in a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Endianness {
    Little,
    Big,
}

impl Endianness {
    /// Determines the byte order under which `magic` reads as `expected`
    ///
    /// Returns `None` when neither interpretation matches. A palindromic
    /// `expected` is reported as little endian.
    ///
    /// ```
    /// use fbchunks::Endianness;
    /// let expected = u64::from_le_bytes(*b"FBCHUNKS");
    /// assert_eq!(Endianness::detect(*b"FBCHUNKS", expected), Some(Endianness::Little));
    /// assert_eq!(Endianness::detect(*b"SKNUHCBF", expected), Some(Endianness::Big));
    /// assert_eq!(Endianness::detect(*b"FBHEADER", expected), None);
    /// ```
    pub fn detect(magic: [u8; 8], expected: u64) -> Option<Endianness> {
        if u64::from_le_bytes(magic) == expected {
            Some(Endianness::Little)
        } else if u64::from_be_bytes(magic) == expected {
            Some(Endianness::Big)
        } else {
            None
        }
    }
}

mod private {
    pub trait Sealed {}
}

/// Unsigned integer types that can be read from a cursor
pub trait Primitive: Copy + private::Sealed {
    /// Width of the type in bytes
    const WIDTH: usize;

    /// Decodes the type from exactly `WIDTH` bytes
    fn from_bytes(data: &[u8], endian: Endianness) -> Self;

    /// Truncates the low bits of a bit cursor extraction
    fn from_bits(bits: u64) -> Self;

    /// Reverses the byte order of the value
    fn swap_bytes(self) -> Self;
}

macro_rules! primitive {
    ($($ty:ty),*) => {
        $(
            impl private::Sealed for $ty {}

            impl Primitive for $ty {
                const WIDTH: usize = std::mem::size_of::<$ty>();

                #[inline]
                fn from_bytes(data: &[u8], endian: Endianness) -> Self {
                    let mut buf = [0u8; std::mem::size_of::<$ty>()];
                    buf.copy_from_slice(data);
                    match endian {
                        Endianness::Little => <$ty>::from_le_bytes(buf),
                        Endianness::Big => <$ty>::from_be_bytes(buf),
                    }
                }

                #[inline]
                fn from_bits(bits: u64) -> Self {
                    bits as $ty
                }

                #[inline]
                fn swap_bytes(self) -> Self {
                    <$ty>::swap_bytes(self)
                }
            }
        )*
    };
}

primitive!(u8, u16, u32, u64);
