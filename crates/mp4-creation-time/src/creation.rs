//! Creation time lookup: locate the movie header from the tail of the source,
//! then decode its creation time.

use crate::error::Result;
use crate::mvhd::{self, MVHD, MovieHeader};
use crate::options::ScanOptions;
use crate::scan::{scan, scan_async};
use crate::source::{AsyncByteRangeSource, ByteRangeSource};
use chrono::{DateTime, Utc};

/// Finds and parses the movie header closest to the tail of `source`.
pub fn find_movie_header<S>(source: &S, options: &ScanOptions) -> Result<Option<MovieHeader>>
where
    S: ByteRangeSource + ?Sized,
{
    match scan(source, MVHD, options)? {
        Some(offset) => mvhd::read_movie_header(source, offset),
        None => Ok(None),
    }
}

/// Returns the creation time of an MP4/QuickTime source as an ISO 8601 UTC
/// string, or `None` when no supported movie header was found within
/// `options.max_bytes` of the tail.
pub fn get_creation_time<S>(source: &S, options: &ScanOptions) -> Result<Option<String>>
where
    S: ByteRangeSource + ?Sized,
{
    match scan(source, MVHD, options)? {
        Some(offset) => mvhd::decode(source, offset),
        None => Ok(None),
    }
}

/// Like [`get_creation_time`], but returns the typed timestamp.
pub fn creation_datetime<S>(source: &S, options: &ScanOptions) -> Result<Option<DateTime<Utc>>>
where
    S: ByteRangeSource + ?Sized,
{
    Ok(find_movie_header(source, options)?.and_then(|header| header.created_at()))
}

/// Async counterpart of [`find_movie_header`].
pub async fn find_movie_header_async<S>(
    source: &S,
    options: &ScanOptions,
) -> Result<Option<MovieHeader>>
where
    S: AsyncByteRangeSource + ?Sized,
{
    match scan_async(source, MVHD, options).await? {
        Some(offset) => mvhd::read_movie_header_async(source, offset).await,
        None => Ok(None),
    }
}

/// Async counterpart of [`get_creation_time`].
pub async fn get_creation_time_async<S>(
    source: &S,
    options: &ScanOptions,
) -> Result<Option<String>>
where
    S: AsyncByteRangeSource + ?Sized,
{
    match scan_async(source, MVHD, options).await? {
        Some(offset) => mvhd::decode_async(source, offset).await,
        None => Ok(None),
    }
}

/// Async counterpart of [`creation_datetime`].
pub async fn creation_datetime_async<S>(
    source: &S,
    options: &ScanOptions,
) -> Result<Option<DateTime<Utc>>>
where
    S: AsyncByteRangeSource + ?Sized,
{
    Ok(find_movie_header_async(source, options)
        .await?
        .and_then(|header| header.created_at()))
}
