use crate::{
    BitCursor, Endianness, Error, ErrorKind, FlagEncoding, Primitive, MAX_LIST_LEN,
    MAX_STRING_LEN,
};
use std::collections::HashMap;

/// Typed field reads over the record bit stream
///
/// Multi-byte integers are byte order corrected for the container's
/// endianness. Strings have the top bit of every byte cleared.
#[derive(Debug, Clone)]
pub struct RecordReader<'a> {
    cursor: BitCursor<'a>,
    endian: Endianness,
}

impl<'a> RecordReader<'a> {
    pub fn new(data: &'a [u8], endian: Endianness) -> Self {
        RecordReader {
            cursor: BitCursor::new(data),
            endian,
        }
    }

    /// Bit offset of the next read
    #[inline]
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    #[inline]
    pub fn remaining_bits(&self) -> usize {
        self.cursor.remaining_bits()
    }

    /// Inspect upcoming bits without consuming them
    pub fn peek_bits(&self, width: u32) -> Result<u64, Error> {
        self.cursor.peek_bits(width)
    }

    #[inline]
    pub fn read<T: Primitive>(&mut self) -> Result<T, Error> {
        self.cursor.read::<T>(self.endian)
    }

    /// Reads a value exactly as the stream packs it, skipping byte order
    /// correction
    #[inline]
    pub fn read_raw<T: Primitive>(&mut self) -> Result<T, Error> {
        self.cursor.read_raw::<T>()
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

    pub fn read_flag(&mut self, encoding: FlagEncoding) -> Result<bool, Error> {
        match encoding {
            FlagEncoding::Bit => self.cursor.read_bit(),
            FlagEncoding::Byte => self.cursor.read_raw::<u8>().map(|x| x != 0),
        }
    }

    /// Reads a string with a 16 bit length prefix
    ///
    /// The top bit of each byte is masked off before the bytes are
    /// interpreted, so the result is always ASCII.
    pub fn read_string(&mut self) -> Result<String, Error> {
        let offset = self.position();
        let len = usize::from(self.read_u16()?);
        if len == 0 {
            return Ok(String::new());
        }

        if len > MAX_STRING_LEN {
            log::warn!("unrealistically long string of {} bytes at bit {}", len, offset);
            return Err(Error::new(ErrorKind::StringTooLong { len, offset }));
        }

        let content = self.cursor.read_bytes(len)?;
        Ok(content.into_iter().map(|b| char::from(b & 0x7f)).collect())
    }

    fn read_count(&mut self) -> Result<usize, Error> {
        let offset = self.position();
        let len = usize::from(self.read_u16()?);
        if len > MAX_LIST_LEN {
            log::warn!("unrealistically long list of {} entries at bit {}", len, offset);
            return Err(Error::new(ErrorKind::ListTooLong { len, offset }));
        }
        Ok(len)
    }

    /// Reads a 16 bit count followed by that many strings
    pub fn read_string_list(&mut self) -> Result<Vec<String>, Error> {
        let len = self.read_count()?;
        log::debug!("string list of {} entries", len);
        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            out.push(self.read_string()?);
        }
        Ok(out)
    }

    /// Reads a 16 bit count followed by that many key and value strings
    ///
    /// A repeated key keeps the last value.
    pub fn read_dictionary(&mut self) -> Result<HashMap<String, String>, Error> {
        let len = self.read_count()?;
        log::debug!("dictionary of {} entries", len);
        let mut out = HashMap::with_capacity(len);
        for _ in 0..len {
            let key = self.read_string()?;
            let value = self.read_string()?;
            out.insert(key, value);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    /// Byte aligned record data for a big endian container, where no
    /// correction applies and stream order is least significant byte first
    fn lsb(fields: &[&[u8]]) -> Vec<u8> {
        fields.concat()
    }

    fn string_field(s: &[u8]) -> Vec<u8> {
        let mut out = (s.len() as u16).to_le_bytes().to_vec();
        out.extend_from_slice(s);
        out
    }

    #[test]
    fn test_string_clears_top_bits() {
        let data = string_field(&[b'L' | 0x80, b'v', b'l' | 0x80, 0xff]);
        let mut reader = RecordReader::new(&data, Endianness::Big);
        assert_eq!(reader.read_string().unwrap(), "Lvl\u{7f}");
    }

    #[test]
    fn test_string_length_corrected_for_little_endian() {
        // little endian containers store the length byte swapped
        let data = [0x00, 0x02, b'o', b'k'];
        let mut reader = RecordReader::new(&data, Endianness::Little);
        assert_eq!(reader.read_string().unwrap(), "ok");
        assert_eq!(reader.remaining_bits(), 0);
    }

    #[test]
    fn test_empty_string() {
        let data = [0x00, 0x00, 0xaa];
        let mut reader = RecordReader::new(&data, Endianness::Big);
        assert_eq!(reader.read_string().unwrap(), "");
        assert_eq!(reader.position(), 16);
    }

    #[test]
    fn test_oversized_string_is_fatal() {
        let mut data = 5000u16.to_le_bytes().to_vec();
        data.extend(std::iter::repeat(b'a').take(5000));
        let mut reader = RecordReader::new(&data, Endianness::Big);
        let err = reader.read_string().unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::StringTooLong { len: 5000, offset: 0 }
        ));
    }

    #[test]
    fn test_string_list() {
        let data = lsb(&[
            &2u16.to_le_bytes(),
            &string_field(b"a"),
            &string_field(b"bc"),
            &[0xee],
        ]);
        let mut reader = RecordReader::new(&data, Endianness::Big);
        assert_eq!(
            reader.read_string_list().unwrap(),
            vec![String::from("a"), String::from("bc")]
        );
        assert_eq!(reader.remaining_bits(), 8);
    }

    #[test]
    fn test_string_list_propagates_element_failure() {
        let data = lsb(&[&2u16.to_le_bytes(), &string_field(b"a"), &[0x05, 0x00, b'x']]);
        let mut reader = RecordReader::new(&data, Endianness::Big);
        let err = reader.read_string_list().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Eof { .. }));
    }

    #[test]
    fn test_oversized_list_is_fatal() {
        let data = 1001u16.to_le_bytes();
        let mut reader = RecordReader::new(&data, Endianness::Big);
        let err = reader.read_string_list().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::ListTooLong { len: 1001, .. }));
    }

    #[test]
    fn test_dictionary() {
        let data = lsb(&[
            &3u16.to_le_bytes(),
            &string_field(b"k1"),
            &string_field(b"v1"),
            &string_field(b"k2"),
            &string_field(b""),
            &string_field(b"k1"),
            &string_field(b"v3"),
        ]);
        let mut reader = RecordReader::new(&data, Endianness::Big);
        let dict = reader.read_dictionary().unwrap();
        assert_eq!(dict.len(), 2);
        assert_eq!(dict["k1"], "v3");
        assert_eq!(dict["k2"], "");
    }

    #[test]
    fn test_dictionary_missing_value() {
        let data = lsb(&[&1u16.to_le_bytes(), &string_field(b"key")]);
        let mut reader = RecordReader::new(&data, Endianness::Big);
        assert!(reader.read_dictionary().is_err());
    }

    #[test]
    fn test_flags() {
        let data = [0b0000_0010, 0x00, 0x07];
        let mut reader = RecordReader::new(&data, Endianness::Little);
        assert!(!reader.read_flag(FlagEncoding::Bit).unwrap());
        assert!(reader.read_flag(FlagEncoding::Bit).unwrap());

        let mut reader = RecordReader::new(&data[1..], Endianness::Little);
        assert!(!reader.read_flag(FlagEncoding::Byte).unwrap());
        assert!(reader.read_flag(FlagEncoding::Byte).unwrap());
    }

    #[quickcheck]
    fn string_roundtrip_clears_top_bits(content: Vec<u8>) -> bool {
        let mut data = (content.len() as u16).to_be_bytes().to_vec();
        data.extend_from_slice(&content);
        let mut reader = RecordReader::new(&data, Endianness::Little);
        let result = reader.read_string();
        if content.len() > MAX_STRING_LEN {
            result.is_err()
        } else {
            let expected: String = content.iter().map(|&b| char::from(b & 0x7f)).collect();
            result.map(|s| s == expected).unwrap_or(false)
        }
    }
}
