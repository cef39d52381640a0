use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Stored units per millisecond of a [`TimestampEncoding::Ticks64`] value
pub const TICKS_PER_MILLI: u64 = 10_000_000;

const NANOS_PER_MILLI: u64 = 1_000_000;

/// How a record timestamp is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TimestampEncoding {
    /// 64 bit count of milliseconds since the Unix epoch, scaled by
    /// [`TICKS_PER_MILLI`]
    Ticks64,

    /// 32 bit count of seconds since the Unix epoch
    Seconds32,
}

/// A point in time relative to the Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Timestamp {
    raw: u64,
    encoding: TimestampEncoding,
}

impl Timestamp {
    pub fn new(raw: u64, encoding: TimestampEncoding) -> Self {
        Timestamp { raw, encoding }
    }

    /// The value as stored
    pub fn raw(&self) -> u64 {
        self.raw
    }

    pub fn encoding(&self) -> TimestampEncoding {
        self.encoding
    }

    /// Whole milliseconds since the Unix epoch
    ///
    /// Sub-millisecond ticks are truncated.
    pub fn unix_millis(&self) -> u64 {
        match self.encoding {
            TimestampEncoding::Ticks64 => self.raw / TICKS_PER_MILLI,
            TimestampEncoding::Seconds32 => self.raw * 1000,
        }
    }

    /// Whole seconds since the Unix epoch
    pub fn unix_seconds(&self) -> u64 {
        self.unix_millis() / 1000
    }

    /// Nanoseconds past [`unix_seconds`](Self::unix_seconds), at millisecond
    /// resolution
    pub fn subsec_nanos(&self) -> u32 {
        ((self.unix_millis() % 1000) * NANOS_PER_MILLI) as u32
    }

    pub fn to_system_time(&self) -> Option<SystemTime> {
        UNIX_EPOCH.checked_add(Duration::new(self.unix_seconds(), self.subsec_nanos()))
    }
}

// http://howardhinnant.github.io/date_algorithms.html#civil_from_days
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

/// Formats as an ISO-8601 UTC date time
impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let secs = self.unix_seconds();
        let days = (secs / 86_400) as i64;
        let rem = secs % 86_400;
        let (year, month, day) = civil_from_days(days);
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            year,
            month,
            day,
            rem / 3600,
            (rem % 3600) / 60,
            rem % 60
        )?;

        let millis = self.unix_millis() % 1000;
        if millis != 0 {
            write!(f, ".{:03}", millis)?;
        }
        f.write_str("Z")
    }
}
