use super::reader::RecordReader;
use crate::{
    errors::EscapedBytes, Endianness, Error, ErrorKind, FormatProfile, MagicByteOrder,
    Timestamp, TimestampEncoding, VersionPolicy,
};
use std::fmt;
use std::ops::RangeInclusive;

/// Magic that opens the data record (`FB\0SAVE\n` in stream order)
pub const RECORD_MAGIC: u64 = 0x0A45_5641_5300_4246;

/// The only game version the record layout is known for
pub const SUPPORTED_GAME_VERSION: u16 = 3;

/// Save schema versions the record layout is known for
pub const SUPPORTED_SAVE_VERSIONS: RangeInclusive<u16> = 20..=22;

/// Number of opaque values in the optional block
pub const OPTIONAL_BLOCK_LEN: usize = 27;

/// A value outside the known good set that did not stop the decode
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SoftFailure {
    GameVersion { found: u16, expected: u16 },
    SaveVersion { found: u16, min: u16, max: u16 },
}

impl fmt::Display for SoftFailure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SoftFailure::GameVersion { found, expected } => write!(
                f,
                "unsupported game version {} (expected {})",
                found, expected
            ),
            SoftFailure::SaveVersion { found, min, max } => write!(
                f,
                "unsupported save version {} (expected {} to {})",
                found, min, max
            ),
        }
    }
}

/// Whether a successful decode can be fully trusted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum DecodeStatus {
    /// Every field was within its known good set
    Success,

    /// Decoded completely, but at least one version is not known to use this
    /// layout
    Unsupported,
}

/// The decoded data record
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SaveRecord {
    profile: FormatProfile,
    optional_block: Option<[u32; OPTIONAL_BLOCK_LEN]>,
    timestamp: Timestamp,
    save_file_name: String,
    game_version: u16,
    save_version: u16,
    unknown: [u16; 2],
    build_info: u32,
    level_name: String,
    level_trailer: u32,
    preloaded_bundles: Vec<String>,
    soft_failures: Vec<SoftFailure>,
}

impl SaveRecord {
    /// The profile the record was decoded with
    pub fn profile(&self) -> FormatProfile {
        self.profile
    }

    /// The opaque values following the optional block flag, when set
    pub fn optional_block(&self) -> Option<&[u32; OPTIONAL_BLOCK_LEN]> {
        self.optional_block.as_ref()
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn save_file_name(&self) -> &str {
        &self.save_file_name
    }

    pub fn game_version(&self) -> u16 {
        self.game_version
    }

    pub fn save_version(&self) -> u16 {
        self.save_version
    }

    /// The two 16 bit values between the save version and the build info
    pub fn unknown(&self) -> [u16; 2] {
        self.unknown
    }

    pub fn build_info(&self) -> u32 {
        self.build_info
    }

    pub fn level_name(&self) -> &str {
        &self.level_name
    }

    /// The 32 bit value stored after the level name
    pub fn level_trailer(&self) -> u32 {
        self.level_trailer
    }

    pub fn preloaded_bundles(&self) -> &[String] {
        &self.preloaded_bundles
    }

    /// Values outside the known good set encountered while decoding
    pub fn soft_failures(&self) -> &[SoftFailure] {
        &self.soft_failures
    }

    pub fn status(&self) -> DecodeStatus {
        if self.soft_failures.is_empty() {
            DecodeStatus::Success
        } else {
            DecodeStatus::Unsupported
        }
    }
}

/// The fields of the record in decode order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    Magic,
    OptionalBlock,
    Timestamp,
    SaveFileName,
    VersionBlock,
    LevelName,
    PreloadedBundles,
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            RecordField::Magic => "magic",
            RecordField::OptionalBlock => "optional block",
            RecordField::Timestamp => "timestamp",
            RecordField::SaveFileName => "save file name",
            RecordField::VersionBlock => "version block",
            RecordField::LevelName => "level name",
            RecordField::PreloadedBundles => "preloaded bundles",
        };
        f.write_str(name)
    }
}

/// Decodes the data chunk with a single [`FormatProfile`]
#[derive(Debug, Clone, Copy)]
pub struct RecordDecoder {
    endian: Endianness,
    profile: FormatProfile,
}

impl RecordDecoder {
    pub fn new(endian: Endianness, profile: FormatProfile) -> Self {
        RecordDecoder { endian, profile }
    }

    /// Decodes a data chunk whose checksum has already been verified
    ///
    /// A fatal error discards everything read so far. Unsupported versions
    /// are recorded as [`SoftFailure`]s and decoding continues, unless the
    /// profile's [`VersionPolicy`] is strict for the save version.
    pub fn decode(&self, data: &[u8]) -> Result<SaveRecord, Error> {
        let mut state = DecodeState {
            reader: RecordReader::new(data, self.endian),
            profile: self.profile,
            field: RecordField::Magic,
            soft_failures: Vec::new(),
        };

        state.decode().map_err(|e| {
            log::warn!(
                "record decode with {} profile failed at {}: {}",
                self.profile.name(),
                state.field,
                e
            );
            e
        })
    }
}

struct DecodeState<'a> {
    reader: RecordReader<'a>,
    profile: FormatProfile,
    field: RecordField,
    soft_failures: Vec<SoftFailure>,
}

impl DecodeState<'_> {
    fn enter(&mut self, field: RecordField) {
        self.field = field;
        log::debug!("{} at bit {}", field, self.reader.position());
    }

    fn decode(&mut self) -> Result<SaveRecord, Error> {
        self.enter(RecordField::Magic);
        self.magic()?;

        self.enter(RecordField::OptionalBlock);
        let optional_block = self.optional_block()?;

        self.enter(RecordField::Timestamp);
        let timestamp = self.timestamp()?;
        log::debug!("timestamp {} (raw {})", timestamp, timestamp.raw());

        self.enter(RecordField::SaveFileName);
        let save_file_name = self.reader.read_string()?;
        log::debug!("save file name {:?}", save_file_name);

        self.enter(RecordField::VersionBlock);
        let game_version = self.reader.read_u16()?;
        self.check_game_version(game_version);
        let save_version = self.reader.read_u16()?;
        self.check_save_version(save_version)?;
        let unknown = [self.reader.read_u16()?, self.reader.read_u16()?];
        let build_info = self.reader.read_u32()?;
        log::debug!(
            "game version {} save version {} unknown {:?} build info {}",
            game_version,
            save_version,
            unknown,
            build_info
        );

        self.enter(RecordField::LevelName);
        let level_name = self.reader.read_string()?;
        let level_trailer = self.reader.read_u32()?;
        log::debug!("level name {:?} trailer {}", level_name, level_trailer);

        self.enter(RecordField::PreloadedBundles);
        let preloaded_bundles = self.reader.read_string_list()?;
        log::debug!("preloaded bundles {:?}", preloaded_bundles);

        if self.reader.remaining_bits() >= 8 {
            log::debug!(
                "{} bits remain after the record",
                self.reader.remaining_bits()
            );
        }

        Ok(SaveRecord {
            profile: self.profile,
            optional_block,
            timestamp,
            save_file_name,
            game_version,
            save_version,
            unknown,
            build_info,
            level_name,
            level_trailer,
            preloaded_bundles,
            soft_failures: std::mem::take(&mut self.soft_failures),
        })
    }

    fn magic(&mut self) -> Result<(), Error> {
        let found = match self.profile.magic {
            MagicByteOrder::Corrected => self.reader.read_u64()?,
            MagicByteOrder::Raw => self.reader.read_raw::<u64>()?,
        };

        if found != RECORD_MAGIC {
            let expected = RECORD_MAGIC.to_le_bytes();
            let found = found.to_le_bytes();
            log::warn!(
                "invalid record magic {} expected {}",
                EscapedBytes(&found),
                EscapedBytes(&expected)
            );
            return Err(Error::new(ErrorKind::InvalidMagic { expected, found }));
        }

        Ok(())
    }

    fn optional_block(&mut self) -> Result<Option<[u32; OPTIONAL_BLOCK_LEN]>, Error> {
        if !self.reader.read_flag(self.profile.flag)? {
            return Ok(None);
        }

        let mut block = [0u32; OPTIONAL_BLOCK_LEN];
        for value in block.iter_mut() {
            *value = self.reader.read_u32()?;
        }
        log::debug!("optional block {:?}", block);
        Ok(Some(block))
    }

    fn timestamp(&mut self) -> Result<Timestamp, Error> {
        let encoding = self.profile.timestamp;
        let raw = match encoding {
            TimestampEncoding::Ticks64 => self.reader.read_u64()?,
            TimestampEncoding::Seconds32 => u64::from(self.reader.read_u32()?),
        };
        Ok(Timestamp::new(raw, encoding))
    }

    fn check_game_version(&mut self, found: u16) {
        if found != SUPPORTED_GAME_VERSION {
            let failure = SoftFailure::GameVersion {
                found,
                expected: SUPPORTED_GAME_VERSION,
            };
            log::warn!("{}", failure);
            self.soft_failures.push(failure);
        }
    }

    fn check_save_version(&mut self, found: u16) -> Result<(), Error> {
        if SUPPORTED_SAVE_VERSIONS.contains(&found) {
            return Ok(());
        }

        let failure = SoftFailure::SaveVersion {
            found,
            min: *SUPPORTED_SAVE_VERSIONS.start(),
            max: *SUPPORTED_SAVE_VERSIONS.end(),
        };
        log::warn!("{}", failure);
        match self.profile.save_version {
            VersionPolicy::Soft => {
                self.soft_failures.push(failure);
                Ok(())
            }
            VersionPolicy::Strict => Err(Error::new(ErrorKind::UnsupportedSaveVersion {
                version: found,
            })),
        }
    }
}
