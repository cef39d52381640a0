use crate::record::timestamp::TimestampEncoding;

/// How the record magic is compared after extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum MagicByteOrder {
    /// The magic goes through the same byte order correction as every other
    /// multi-byte field
    Corrected,

    /// The magic is compared exactly as extracted from the stream
    Raw,
}

/// How the optional block flag is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum FlagEncoding {
    /// A single bit
    Bit,

    /// A full 8 bit value where anything nonzero is set
    Byte,
}

/// What happens when the save schema version is outside the supported range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum VersionPolicy {
    /// Record a soft failure and keep decoding
    Soft,

    /// Abort the record
    Strict,
}

/// The field widths and encodings of one record layout
///
/// Two layouts have been observed and neither has been confirmed as the one
/// that belongs to save versions 20 through 22, so both are available as
/// [`FormatProfile::WIDE`] and [`FormatProfile::NARROW`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FormatProfile {
    pub timestamp: TimestampEncoding,
    pub magic: MagicByteOrder,
    pub flag: FlagEncoding,
    pub save_version: VersionPolicy,
}

impl FormatProfile {
    /// 64 bit tick timestamp, corrected magic, single bit flag
    pub const WIDE: FormatProfile = FormatProfile {
        timestamp: TimestampEncoding::Ticks64,
        magic: MagicByteOrder::Corrected,
        flag: FlagEncoding::Bit,
        save_version: VersionPolicy::Soft,
    };

    /// 32 bit seconds timestamp, raw magic, byte flag
    pub const NARROW: FormatProfile = FormatProfile {
        timestamp: TimestampEncoding::Seconds32,
        magic: MagicByteOrder::Raw,
        flag: FlagEncoding::Byte,
        save_version: VersionPolicy::Strict,
    };

    /// Short label used in diagnostics
    pub fn name(&self) -> &'static str {
        match *self {
            FormatProfile::WIDE => "wide",
            FormatProfile::NARROW => "narrow",
            _ => "custom",
        }
    }
}

impl Default for FormatProfile {
    fn default() -> Self {
        FormatProfile::WIDE
    }
}

/// Which profiles a decode may use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileSelection {
    /// Decode with exactly this profile
    Fixed(FormatProfile),

    /// Decode with `primary` and, if the record fails fatally, start over
    /// with `fallback`
    Fallback {
        primary: FormatProfile,
        fallback: FormatProfile,
    },
}

impl ProfileSelection {
    /// The profile attempted first
    pub fn primary(&self) -> FormatProfile {
        match *self {
            ProfileSelection::Fixed(profile) => profile,
            ProfileSelection::Fallback { primary, .. } => primary,
        }
    }

    /// The profile attempted when the primary fails
    pub fn fallback(&self) -> Option<FormatProfile> {
        match *self {
            ProfileSelection::Fixed(_) => None,
            ProfileSelection::Fallback { fallback, .. } => Some(fallback),
        }
    }
}

impl Default for ProfileSelection {
    fn default() -> Self {
        ProfileSelection::Fallback {
            primary: FormatProfile::WIDE,
            fallback: FormatProfile::NARROW,
        }
    }
}
