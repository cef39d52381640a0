#![allow(dead_code)]

use fbchunks::{
    checksum, Endianness, FlagEncoding, FormatProfile, MagicByteOrder, TimestampEncoding,
    CHECKSUM_SEED, HEADER_ENTRY_COUNT, RECORD_MAGIC,
};

/// Packs values least significant bit first, the inverse of `BitCursor`
#[derive(Debug, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl BitWriter {
    pub fn new() -> Self {
        BitWriter::default()
    }

    pub fn write_bits(&mut self, value: u64, width: u32) {
        for k in 0..width {
            if self.bit_len % 8 == 0 {
                self.bytes.push(0);
            }
            let bit = ((value >> k) & 1) as u8;
            let last = self.bytes.len() - 1;
            self.bytes[last] |= bit << (self.bit_len % 8);
            self.bit_len += 1;
        }
    }

    pub fn write_byte(&mut self, value: u8) {
        self.write_bits(u64::from(value), 8);
    }

    // The stream stores multi-byte fields byte swapped for little endian
    // containers
    pub fn write_u16(&mut self, value: u16, endian: Endianness) {
        let raw = match endian {
            Endianness::Little => value.swap_bytes(),
            Endianness::Big => value,
        };
        self.write_bits(u64::from(raw), 16);
    }

    pub fn write_u32(&mut self, value: u32, endian: Endianness) {
        let raw = match endian {
            Endianness::Little => value.swap_bytes(),
            Endianness::Big => value,
        };
        self.write_bits(u64::from(raw), 32);
    }

    pub fn write_u64(&mut self, value: u64, endian: Endianness) {
        let raw = match endian {
            Endianness::Little => value.swap_bytes(),
            Endianness::Big => value,
        };
        self.write_bits(raw, 64);
    }

    pub fn write_string(&mut self, content: &[u8], endian: Endianness) {
        self.write_u16(content.len() as u16, endian);
        for &b in content {
            self.write_byte(b);
        }
    }

    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }
}

/// Field values of a data record to encode
#[derive(Debug, Clone)]
pub struct RecordFields {
    pub magic: u64,
    pub optional_block: Option<[u32; 27]>,
    pub timestamp: u64,
    pub save_file_name: Vec<u8>,
    pub save_file_name_len: Option<u16>,
    pub game_version: u16,
    pub save_version: u16,
    pub unknown: [u16; 2],
    pub build_info: u32,
    pub level_name: Vec<u8>,
    pub level_trailer: u32,
    pub bundles: Vec<Vec<u8>>,
}

impl Default for RecordFields {
    fn default() -> Self {
        RecordFields {
            magic: RECORD_MAGIC,
            optional_block: None,
            timestamp: 1_600_000_000,
            save_file_name: b"Slot 1".to_vec(),
            save_file_name_len: None,
            game_version: 3,
            save_version: 21,
            unknown: [0x0102, 0x0304],
            build_info: 0x00C0_FFEE,
            level_name: b"Levels/Mainline/Docks".to_vec(),
            level_trailer: 0xDEAD_BEEF,
            bundles: vec![b"ui".to_vec(), b"dlc/expansion".to_vec()],
        }
    }
}

impl RecordFields {
    pub fn encode(&self, endian: Endianness, profile: FormatProfile) -> Vec<u8> {
        let mut w = BitWriter::new();
        match profile.magic {
            MagicByteOrder::Corrected => w.write_u64(self.magic, endian),
            MagicByteOrder::Raw => w.write_bits(self.magic, 64),
        }

        let flag = u64::from(self.optional_block.is_some());
        match profile.flag {
            FlagEncoding::Bit => w.write_bits(flag, 1),
            FlagEncoding::Byte => w.write_bits(flag, 8),
        }
        if let Some(block) = &self.optional_block {
            for &value in block {
                w.write_u32(value, endian);
            }
        }

        match profile.timestamp {
            TimestampEncoding::Ticks64 => w.write_u64(self.timestamp, endian),
            TimestampEncoding::Seconds32 => w.write_u32(self.timestamp as u32, endian),
        }

        match self.save_file_name_len {
            Some(len) => {
                w.write_u16(len, endian);
                for &b in &self.save_file_name {
                    w.write_byte(b);
                }
            }
            None => w.write_string(&self.save_file_name, endian),
        }

        w.write_u16(self.game_version, endian);
        w.write_u16(self.save_version, endian);
        w.write_u16(self.unknown[0], endian);
        w.write_u16(self.unknown[1], endian);
        w.write_u32(self.build_info, endian);
        w.write_string(&self.level_name, endian);
        w.write_u32(self.level_trailer, endian);

        w.write_u16(self.bundles.len() as u16, endian);
        for bundle in &self.bundles {
            w.write_string(bundle, endian);
        }

        w.finish()
    }
}

fn u16_bytes(value: u16, endian: Endianness) -> [u8; 2] {
    match endian {
        Endianness::Little => value.to_le_bytes(),
        Endianness::Big => value.to_be_bytes(),
    }
}

fn u32_bytes(value: u32, endian: Endianness) -> [u8; 4] {
    match endian {
        Endianness::Little => value.to_le_bytes(),
        Endianness::Big => value.to_be_bytes(),
    }
}

pub fn header_value(index: usize) -> String {
    format!("header value {}", index)
}

/// A header chunk with `count` declared entries and that many entries present
pub fn header_chunk(endian: Endianness, count: u32) -> Vec<u8> {
    let mut out = b"FBHEADER".to_vec();
    out.extend_from_slice(&u16_bytes(2, endian));
    out.extend_from_slice(&u32_bytes(count, endian));
    for i in 0..count as usize {
        let value = header_value(i);
        out.extend_from_slice(&u32_bytes(0xA000_0000 + i as u32, endian));
        out.extend_from_slice(&u16_bytes(value.len() as u16, endian));
        out.extend_from_slice(value.as_bytes());
    }
    out
}

pub fn valid_header_chunk(endian: Endianness) -> Vec<u8> {
    header_chunk(endian, HEADER_ENTRY_COUNT)
}

/// Frames and checksums both chunks into a container
pub fn container(endian: Endianness, header: &[u8], data: &[u8]) -> Vec<u8> {
    let mut out = match endian {
        Endianness::Little => b"FBCHUNKS".to_vec(),
        Endianness::Big => b"SKNUHCBF".to_vec(),
    };
    out.extend_from_slice(&u16_bytes(1, endian));
    out.extend_from_slice(&u32_bytes(header.len() as u32 + 4, endian));
    out.extend_from_slice(&u32_bytes(data.len() as u32 + 4, endian));
    out.extend_from_slice(&u32_bytes(checksum(CHECKSUM_SEED, header), endian));
    out.extend_from_slice(header);
    out.extend_from_slice(&u32_bytes(checksum(CHECKSUM_SEED, data), endian));
    out.extend_from_slice(data);
    out
}

/// Offset of the first data chunk byte within a container
pub fn data_offset(header: &[u8]) -> usize {
    fbchunks::PREAMBLE_LEN + 4 + header.len() + 4
}

pub fn sample_container(endian: Endianness, profile: FormatProfile) -> Vec<u8> {
    let header = valid_header_chunk(endian);
    let data = RecordFields::default().encode(endian, profile);
    container(endian, &header, &data)
}
