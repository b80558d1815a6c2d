//! Random-access byte sources.
//!
//! The scanner and decoder only need two things from the data they inspect:
//! its total length and the ability to materialize an arbitrary `[start, end)`
//! range. [`ByteRangeSource`] provides that through blocking reads and
//! [`AsyncByteRangeSource`] through awaited ones. Both take `&self`, so a
//! single source can serve several lookups at once.

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::borrow::Cow;
use std::ops::Range;

mod file;
mod memory;

pub use file::{AsyncFileSource, FileSource};

/// A source that can read arbitrary byte ranges synchronously.
pub trait ByteRangeSource {
    /// Total number of bytes in the source.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Materializes the bytes in `range`.
    ///
    /// Fails with [`Error::OutOfBounds`] when the range does not lie within
    /// `[0, len)`.
    fn read_range(&self, range: Range<u64>) -> Result<Cow<'_, [u8]>>;
}

/// A source whose reads may suspend, e.g. because they hit disk or network.
#[async_trait]
pub trait AsyncByteRangeSource: Send + Sync {
    /// Total number of bytes in the source.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Materializes the bytes in `range`.
    async fn read_range(&self, range: Range<u64>) -> Result<Vec<u8>>;
}

impl<S: ByteRangeSource + ?Sized> ByteRangeSource for &S {
    fn len(&self) -> u64 {
        (**self).len()
    }

    fn read_range(&self, range: Range<u64>) -> Result<Cow<'_, [u8]>> {
        (**self).read_range(range)
    }
}

#[async_trait]
impl<S: AsyncByteRangeSource + ?Sized> AsyncByteRangeSource for &S {
    fn len(&self) -> u64 {
        (**self).len()
    }

    async fn read_range(&self, range: Range<u64>) -> Result<Vec<u8>> {
        (**self).read_range(range).await
    }
}

/// Ensures `range` is well formed and lies within a source of `len` bytes.
pub(crate) fn check_range(range: &Range<u64>, len: u64) -> Result<()> {
    if range.start > range.end || range.end > len {
        return Err(Error::OutOfBounds {
            start: range.start,
            end: range.end,
            len,
        });
    }

    Ok(())
}
