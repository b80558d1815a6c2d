//! Movie header (`mvhd`) box decoding.
//!
//! Layout of the bytes that follow the `mvhd` marker:
//!
//! ```text
//! version(1) flags(3) creation_time(4|8) modification_time(4|8) ...
//! ```
//!
//! Version 0 stores both times as 32-bit big-endian values, version 1 as
//! 64-bit ones. Both count seconds since 1904-01-01T00:00:00Z.

use crate::error::Result;
use crate::source::{AsyncByteRangeSource, ByteRangeSource};
use crate::time;
use chrono::{DateTime, Utc};
use std::ops::Range;
use tracing::{debug, warn};

/// The box type of the movie header.
pub const MVHD: &[u8; 4] = b"mvhd";

const VERSION_AND_FLAGS_SIZE: usize = 4;

/// Longest body we ever look at: version, flags and two 64-bit times.
const MAX_BODY_SIZE: u64 = (VERSION_AND_FLAGS_SIZE + 2 * 8) as u64;

/// Layout discriminant stored in the first byte after the marker.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Version {
    /// 32-bit time fields
    V0,
    /// 64-bit time fields
    V1,
}

impl Version {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Version::V0),
            1 => Some(Version::V1),
            _ => None,
        }
    }

    /// Size in bytes of each time field.
    pub const fn field_size(self) -> usize {
        match self {
            Version::V0 => 4,
            Version::V1 => 8,
        }
    }
}

/// The time fields of a movie header, in seconds since the Mac HFS+ epoch.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MovieHeader {
    pub version: Version,
    pub creation_time: u64,
    /// `None` when the source ended before the field.
    pub modification_time: Option<u64>,
}

impl MovieHeader {
    /// Parses the bytes that immediately follow the `mvhd` marker.
    ///
    /// Returns `None` for an unsupported version byte or a body too short to
    /// hold the creation time.
    pub fn parse(body: &[u8]) -> Option<Self> {
        let version = Version::from_byte(*body.first()?)?;
        let size = version.field_size();

        let creation = VERSION_AND_FLAGS_SIZE..VERSION_AND_FLAGS_SIZE + size;
        let modification = creation.end..creation.end + size;

        Some(Self {
            version,
            creation_time: be_uint(body.get(creation)?),
            modification_time: body.get(modification).map(be_uint),
        })
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        time::from_mac_seconds(self.creation_time)
    }

    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        self.modification_time.and_then(time::from_mac_seconds)
    }

    /// The creation time rendered as an ISO 8601 UTC string.
    pub fn creation_iso8601(&self) -> Option<String> {
        match self.created_at() {
            Some(timestamp) => Some(time::to_iso8601(&timestamp)),
            None => {
                warn!(
                    "mvhd creation time {} is outside the representable range",
                    self.creation_time
                );
                None
            }
        }
    }
}

/// Interprets up to 8 bytes as an unsigned big-endian integer.
fn be_uint(bytes: &[u8]) -> u64 {
    debug_assert!(bytes.len() <= 8);
    bytes
        .iter()
        .fold(0u64, |value, &byte| (value << 8) | u64::from(byte))
}

/// The range holding the header body, clamped to the source length.
fn body_range(marker_offset: u64, len: u64) -> Option<Range<u64>> {
    let start = marker_offset.checked_add(MVHD.len() as u64)?;
    if start >= len {
        return None;
    }

    Some(start..start.saturating_add(MAX_BODY_SIZE).min(len))
}

fn parse_body(marker_offset: u64, body: &[u8]) -> Option<MovieHeader> {
    let header = MovieHeader::parse(body);
    if header.is_none() {
        debug!(
            "unsupported or truncated mvhd body at offset {} (version byte {:?})",
            marker_offset,
            body.first()
        );
    }
    header
}

/// Reads the movie header whose marker starts at `marker_offset`.
pub fn read_movie_header<S>(source: &S, marker_offset: u64) -> Result<Option<MovieHeader>>
where
    S: ByteRangeSource + ?Sized,
{
    let Some(range) = body_range(marker_offset, source.len()) else {
        return Ok(None);
    };

    let body = source.read_range(range)?;
    Ok(parse_body(marker_offset, &body))
}

/// Async counterpart of [`read_movie_header`].
pub async fn read_movie_header_async<S>(
    source: &S,
    marker_offset: u64,
) -> Result<Option<MovieHeader>>
where
    S: AsyncByteRangeSource + ?Sized,
{
    let Some(range) = body_range(marker_offset, source.len()) else {
        return Ok(None);
    };

    let body = source.read_range(range).await?;
    Ok(parse_body(marker_offset, &body))
}

/// Decodes the creation time of the movie header at `marker_offset` as an
/// ISO 8601 string.
pub fn decode<S>(source: &S, marker_offset: u64) -> Result<Option<String>>
where
    S: ByteRangeSource + ?Sized,
{
    Ok(read_movie_header(source, marker_offset)?.and_then(|header| header.creation_iso8601()))
}

/// Async counterpart of [`decode`].
pub async fn decode_async<S>(source: &S, marker_offset: u64) -> Result<Option<String>>
where
    S: AsyncByteRangeSource + ?Sized,
{
    Ok(read_movie_header_async(source, marker_offset)
        .await?
        .and_then(|header| header.creation_iso8601()))
}
