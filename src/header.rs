use crate::{ByteCursor, Endianness, Error, ErrorKind};
use std::fmt;
use std::str::FromStr;

/// Magic that opens the header chunk
pub const HEADER_MAGIC: [u8; 8] = *b"FBHEADER";

/// Number of entries in the header schema
pub const HEADER_ENTRY_COUNT: u32 = HeaderEntryId::ALL.len() as u32;

/// Slot of an entry within the header table
///
/// Entries are positional: the `n`th entry of a header is always slot `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum HeaderEntryId {
    AreaNameStringId,
    AreaThumbnailTextureId,
    GameVersion,
    RequiredDlc,
    RequiredInstallGroup,
    ProfileName,
    ProfileUniqueName,
    ProfileId,
    LevelId,
    PlayerLevel,
    GameCompleted,
    TrialMode,
    CompletionPercentage,
    DateTime,
    LevelTitleId,
    LevelFloorId,
    LevelRegionId,
    TotalPlaytime,
    NameOverrideStringId,
}

impl HeaderEntryId {
    /// Every slot in header order
    pub const ALL: [HeaderEntryId; 19] = [
        HeaderEntryId::AreaNameStringId,
        HeaderEntryId::AreaThumbnailTextureId,
        HeaderEntryId::GameVersion,
        HeaderEntryId::RequiredDlc,
        HeaderEntryId::RequiredInstallGroup,
        HeaderEntryId::ProfileName,
        HeaderEntryId::ProfileUniqueName,
        HeaderEntryId::ProfileId,
        HeaderEntryId::LevelId,
        HeaderEntryId::PlayerLevel,
        HeaderEntryId::GameCompleted,
        HeaderEntryId::TrialMode,
        HeaderEntryId::CompletionPercentage,
        HeaderEntryId::DateTime,
        HeaderEntryId::LevelTitleId,
        HeaderEntryId::LevelFloorId,
        HeaderEntryId::LevelRegionId,
        HeaderEntryId::TotalPlaytime,
        HeaderEntryId::NameOverrideStringId,
    ];

    /// Position of the slot within the header
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<HeaderEntryId> {
        HeaderEntryId::ALL.get(index).copied()
    }

    /// The name the game uses for the slot
    pub fn as_str(self) -> &'static str {
        match self {
            HeaderEntryId::AreaNameStringId => "AreaNameStringId",
            HeaderEntryId::AreaThumbnailTextureId => "AreaThumbnailTextureId",
            HeaderEntryId::GameVersion => "GameVersion",
            HeaderEntryId::RequiredDlc => "RequiredDLC",
            HeaderEntryId::RequiredInstallGroup => "RequiredInstallGroup",
            HeaderEntryId::ProfileName => "ProfileName",
            HeaderEntryId::ProfileUniqueName => "ProfileUniqueName",
            HeaderEntryId::ProfileId => "ProfileId",
            HeaderEntryId::LevelId => "LevelID",
            HeaderEntryId::PlayerLevel => "PlayerLevel",
            HeaderEntryId::GameCompleted => "GameCompleted",
            HeaderEntryId::TrialMode => "TrialMode",
            HeaderEntryId::CompletionPercentage => "CompletionPercentage",
            HeaderEntryId::DateTime => "DateTime",
            HeaderEntryId::LevelTitleId => "LevelTitleID",
            HeaderEntryId::LevelFloorId => "LevelFloorID",
            HeaderEntryId::LevelRegionId => "LevelRegionID",
            HeaderEntryId::TotalPlaytime => "TotalPlaytime",
            HeaderEntryId::NameOverrideStringId => "NameOverrideStringId",
        }
    }
}

impl fmt::Display for HeaderEntryId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unrecognized header slot name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEntryId(String);

impl std::error::Error for UnknownEntryId {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

impl fmt::Display for UnknownEntryId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unknown header entry: {}", self.0)
    }
}

impl FromStr for HeaderEntryId {
    type Err = UnknownEntryId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HeaderEntryId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| UnknownEntryId(s.to_string()))
    }
}

/// A single `(hash, value)` pair of the header table
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HeaderEntry {
    hash: u32,
    value: String,
}

impl HeaderEntry {
    pub fn new(hash: u32, value: String) -> Self {
        HeaderEntry { hash, value }
    }

    /// Numeric id stored alongside the value
    pub fn hash(&self) -> u32 {
        self.hash
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// The decoded header chunk
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HeaderTable {
    version: u16,
    entries: Vec<HeaderEntry>,
}

impl HeaderTable {
    /// Version the header chunk declared. Informational only.
    pub fn version(&self) -> u16 {
        self.version
    }

    /// Entries in the order they were stored
    pub fn entries(&self) -> &[HeaderEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &HeaderEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the entry stored in the given slot
    pub fn get(&self, id: HeaderEntryId) -> Option<&HeaderEntry> {
        self.entries.get(id.index())
    }

    /// Pairs each entry with its slot
    pub fn slots(&self) -> impl Iterator<Item = (HeaderEntryId, &HeaderEntry)> {
        HeaderEntryId::ALL.into_iter().zip(self.entries.iter())
    }
}

/// Decodes the fixed schema header chunk
#[derive(Debug, Clone, Copy)]
pub struct HeaderDecoder {
    endian: Endianness,
}

impl HeaderDecoder {
    pub fn new(endian: Endianness) -> Self {
        HeaderDecoder { endian }
    }

    /// Decodes a header chunk whose checksum has already been verified
    ///
    /// Nothing of a partially read table is returned on failure.
    pub fn decode(&self, data: &[u8]) -> Result<HeaderTable, Error> {
        let mut cursor = ByteCursor::new(data, self.endian);
        cursor.expect_magic(&HEADER_MAGIC)?;

        let version = cursor.read_u16()?;
        log::debug!("header version {}", version);

        let found = cursor.read_u32()?;
        if found != HEADER_ENTRY_COUNT {
            log::warn!(
                "invalid number of header entries {} expected {}",
                found,
                HEADER_ENTRY_COUNT
            );
            return Err(Error::new(ErrorKind::EntryCountMismatch {
                expected: HEADER_ENTRY_COUNT,
                found,
            }));
        }

        let mut entries = Vec::with_capacity(HeaderEntryId::ALL.len());
        for id in HeaderEntryId::ALL {
            let hash = cursor.read_u32()?;
            let value = cursor.read_string()?;
            log::debug!("header {} ({:08x}) = {:?}", id, hash, value);
            entries.push(HeaderEntry { hash, value });
        }

        if !cursor.is_empty() {
            log::debug!(
                "{} trailing bytes after header entries",
                cursor.remainder().len()
            );
        }

        Ok(HeaderTable { version, entries })
    }
}
