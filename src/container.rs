use crate::{
    checksum::{verify_checksum, CHECKSUM_SEED},
    ByteCursor, DecodeStatus, Endianness, Error, ErrorKind, FormatProfile, HeaderDecoder,
    HeaderTable, ProfileSelection, RecordDecoder, SaveRecord,
};
use std::fmt;
use std::io::{Cursor, Read, Seek};

/// Magic that opens every container (`FBCHUNKS` when little endian)
pub const CONTAINER_MAGIC: u64 = 0x534B_4E55_4843_4246;

/// Bytes before the first chunk: magic, version, and both chunk lengths
pub const PREAMBLE_LEN: usize = 8 + 2 + 4 + 4;

const CHECKSUM_LEN: u32 = 4;

/// The fixed preamble of a container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Container {
    endian: Endianness,
    format_version: u16,
    header_len: u32,
    data_len: u32,
}

impl Container {
    /// Decodes the preamble from its first [`PREAMBLE_LEN`] bytes
    pub fn from_slice(data: &[u8]) -> Result<Container, Error> {
        let mut cursor = ByteCursor::new(data, Endianness::Little);
        let magic = cursor.read_array::<8>()?;
        let endian = Endianness::detect(magic, CONTAINER_MAGIC).ok_or_else(|| {
            log::warn!("unknown endianness for magic {:02x?}", magic);
            Error::new(ErrorKind::UnknownEndianness { magic })
        })?;
        log::debug!("{:?} endian container", endian);

        let mut cursor = ByteCursor::new(cursor.remainder(), endian);
        let format_version = cursor.read_u16()?;
        let header_len = cursor.read_u32()?;
        let data_len = cursor.read_u32()?;
        log::debug!(
            "format version {} header length {} data length {}",
            format_version,
            header_len,
            data_len
        );

        Ok(Container {
            endian,
            format_version,
            header_len,
            data_len,
        })
    }

    pub fn endianness(&self) -> Endianness {
        self.endian
    }

    /// Version of the container. Informational only.
    pub fn format_version(&self) -> u16 {
        self.format_version
    }

    /// Declared header chunk length, including its checksum
    pub fn header_len(&self) -> u32 {
        self.header_len
    }

    /// Declared data chunk length, including its checksum
    pub fn data_len(&self) -> u32 {
        self.data_len
    }
}

/// Location and checksum of a chunk within the source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ChunkInfo {
    offset: u64,
    checksum: u32,
}

impl ChunkInfo {
    /// Stream offset of the chunk's checksum
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// The checksum stored ahead of the chunk
    pub fn checksum(&self) -> u32 {
        self.checksum
    }
}

/// A fully decoded container
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SaveFile {
    container: Container,
    header_chunk: ChunkInfo,
    data_chunk: ChunkInfo,
    header: HeaderTable,
    record: SaveRecord,
}

impl SaveFile {
    /// Decodes a container with the default options
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<SaveFile, ContainerError> {
        ContainerDecoder::default().decode(reader)
    }

    /// Decodes a container held in memory with the default options
    pub fn from_slice(data: &[u8]) -> Result<SaveFile, ContainerError> {
        ContainerDecoder::default().decode_slice(data)
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn header_chunk(&self) -> &ChunkInfo {
        &self.header_chunk
    }

    pub fn data_chunk(&self) -> &ChunkInfo {
        &self.data_chunk
    }

    pub fn header(&self) -> &HeaderTable {
        &self.header
    }

    pub fn record(&self) -> &SaveRecord {
        &self.record
    }

    /// Whether any field fell outside its known good set
    pub fn status(&self) -> DecodeStatus {
        self.record.status()
    }
}

/// The step of a decode that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Magic, version, and chunk lengths
    Framing,

    /// Reading or checksumming the header chunk
    HeaderChunk,

    /// Decoding the validated header chunk
    Header,

    /// Reading or checksumming the data chunk
    DataChunk,

    /// Decoding the validated data chunk
    Record,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Stage::Framing => "container framing",
            Stage::HeaderChunk => "header chunk",
            Stage::Header => "header",
            Stage::DataChunk => "data chunk",
            Stage::Record => "record",
        };
        f.write_str(name)
    }
}

/// A failed decode along with whatever was decoded before the failure
#[derive(Debug)]
pub struct ContainerError {
    stage: Stage,
    error: Error,
    container: Option<Container>,
    header: Option<HeaderTable>,
}

impl ContainerError {
    fn new(stage: Stage, error: Error) -> Self {
        ContainerError {
            stage,
            error,
            container: None,
            header: None,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn error(&self) -> &Error {
        &self.error
    }

    pub fn kind(&self) -> &ErrorKind {
        self.error.kind()
    }

    /// The preamble, when it decoded before the failure
    pub fn container(&self) -> Option<&Container> {
        self.container.as_ref()
    }

    /// The header table, when it validated and decoded before the failure
    pub fn header(&self) -> Option<&HeaderTable> {
        self.header.as_ref()
    }

    pub fn into_error(self) -> Error {
        self.error
    }
}

impl std::error::Error for ContainerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl fmt::Display for ContainerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "failed to decode {}: {}", self.stage, self.error)
    }
}

/// Reads a checksum and the `len - 4` chunk bytes following it
fn read_chunk<R: Read + Seek>(
    reader: &mut R,
    endian: Endianness,
    len: u32,
) -> Result<(ChunkInfo, Vec<u8>), Error> {
    let payload_len = len
        .checked_sub(CHECKSUM_LEN)
        .ok_or_else(|| Error::new(ErrorKind::InvalidChunkLength { declared: len }))?;

    let offset = reader.stream_position()?;
    let checksum = read_exact::<4, _>(reader, offset)?;
    let checksum = ByteCursor::new(&checksum, endian).read_u32()?;

    let mut data = Vec::new();
    reader
        .by_ref()
        .take(u64::from(payload_len))
        .read_to_end(&mut data)?;
    if data.len() != payload_len as usize {
        return Err(Error::new(ErrorKind::Eof {
            offset: (offset + u64::from(CHECKSUM_LEN)) as usize + data.len(),
            needed: payload_len as usize - data.len(),
        }));
    }

    Ok((ChunkInfo { offset, checksum }, data))
}

fn read_exact<const N: usize, R: Read>(reader: &mut R, offset: u64) -> Result<[u8; N], Error> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf).map_err(|e| match e.kind() {
        std::io::ErrorKind::UnexpectedEof => Error::new(ErrorKind::Eof {
            offset: offset as usize,
            needed: N,
        }),
        _ => Error::from(e),
    })?;
    Ok(buf)
}

/// Decodes containers with a fixed set of options
#[derive(Debug, Clone)]
pub struct ContainerDecoder {
    profiles: ProfileSelection,
    checksum_seed: u32,
    verify_checksums: bool,
}

impl Default for ContainerDecoder {
    fn default() -> Self {
        ContainerDecoder::builder().build()
    }
}

impl ContainerDecoder {
    pub fn builder() -> ContainerDecoderBuilder {
        ContainerDecoderBuilder::new()
    }

    /// Decodes a container held in memory
    pub fn decode_slice(&self, data: &[u8]) -> Result<SaveFile, ContainerError> {
        self.decode(Cursor::new(data))
    }

    /// Decodes a container starting at the reader's current position
    ///
    /// Both chunks are read and checksummed in full before they are decoded.
    /// When the data chunk fails, the returned error still carries the
    /// decoded header.
    pub fn decode<R: Read + Seek>(&self, mut reader: R) -> Result<SaveFile, ContainerError> {
        let start = reader
            .stream_position()
            .map_err(|e| ContainerError::new(Stage::Framing, e.into()))?;
        let preamble = read_exact::<PREAMBLE_LEN, _>(&mut reader, start)
            .map_err(|e| ContainerError::new(Stage::Framing, e))?;
        let container =
            Container::from_slice(&preamble).map_err(|e| ContainerError::new(Stage::Framing, e))?;

        let fail = |stage, error, header: Option<HeaderTable>| ContainerError {
            stage,
            error,
            container: Some(container),
            header,
        };

        let (header_chunk, header_data) = self
            .validated_chunk(&mut reader, container.endian, container.header_len)
            .map_err(|e| fail(Stage::HeaderChunk, e, None))?;
        log::debug!("header checksum valid");

        let header = HeaderDecoder::new(container.endian)
            .decode(&header_data)
            .map_err(|e| fail(Stage::Header, e, None))?;

        let (data_chunk, data) = match self.validated_chunk(
            &mut reader,
            container.endian,
            container.data_len,
        ) {
            Ok(x) => x,
            Err(e) => return Err(fail(Stage::DataChunk, e, Some(header))),
        };
        log::debug!("data checksum valid");

        let record = match self.decode_record(container.endian, &data) {
            Ok(x) => x,
            Err(e) => return Err(fail(Stage::Record, e, Some(header))),
        };

        Ok(SaveFile {
            container,
            header_chunk,
            data_chunk,
            header,
            record,
        })
    }

    fn validated_chunk<R: Read + Seek>(
        &self,
        reader: &mut R,
        endian: Endianness,
        len: u32,
    ) -> Result<(ChunkInfo, Vec<u8>), Error> {
        let (info, data) = read_chunk(reader, endian, len)?;
        match verify_checksum(self.checksum_seed, info.checksum, &data) {
            Ok(()) => Ok((info, data)),
            Err(e) if !self.verify_checksums => {
                log::warn!("ignoring chunk at {}: {}", info.offset, e);
                Ok((info, data))
            }
            Err(e) => {
                log::warn!("invalid chunk at {}: {}", info.offset, e);
                Err(e)
            }
        }
    }

    fn decode_record(&self, endian: Endianness, data: &[u8]) -> Result<SaveRecord, Error> {
        let primary = self.profiles.primary();
        let err = match RecordDecoder::new(endian, primary).decode(data) {
            Ok(record) => return Ok(record),
            Err(e) => e,
        };

        let Some(fallback) = self.profiles.fallback() else {
            return Err(err);
        };

        log::debug!(
            "retrying record with {} profile after {} profile failed",
            fallback.name(),
            primary.name()
        );
        match RecordDecoder::new(endian, fallback).decode(data) {
            Ok(record) => Ok(record),
            // a fallback that can't match the magic says less than the primary
            Err(e) if matches!(e.kind(), ErrorKind::InvalidMagic { .. }) => Err(err),
            Err(e) => Err(e),
        }
    }
}

/// Customizes a [`ContainerDecoder`]
#[derive(Debug, Clone)]
pub struct ContainerDecoderBuilder {
    profiles: ProfileSelection,
    checksum_seed: u32,
    verify_checksums: bool,
}

impl Default for ContainerDecoderBuilder {
    fn default() -> Self {
        ContainerDecoderBuilder::new()
    }
}

impl ContainerDecoderBuilder {
    pub fn new() -> Self {
        ContainerDecoderBuilder {
            profiles: ProfileSelection::default(),
            checksum_seed: CHECKSUM_SEED,
            verify_checksums: true,
        }
    }

    /// Set which record layouts are attempted
    pub fn profile(&mut self, selection: ProfileSelection) -> &mut Self {
        self.profiles = selection;
        self
    }

    /// Shorthand for decoding with exactly one layout
    pub fn fixed_profile(&mut self, profile: FormatProfile) -> &mut Self {
        self.profile(ProfileSelection::Fixed(profile))
    }

    /// Set the seed chunk checksums are computed with
    pub fn checksum_seed(&mut self, seed: u32) -> &mut Self {
        self.checksum_seed = seed;
        self
    }

    /// Set whether a checksum mismatch aborts the decode
    ///
    /// Disabling verification is only useful for inspecting damaged files.
    pub fn verify_checksums(&mut self, verify: bool) -> &mut Self {
        self.verify_checksums = verify;
        self
    }

    pub fn build(&self) -> ContainerDecoder {
        ContainerDecoder {
            profiles: self.profiles,
            checksum_seed: self.checksum_seed,
            verify_checksums: self.verify_checksums,
        }
    }
}
