use super::{AsyncByteRangeSource, ByteRangeSource, check_range};
use crate::error::Result;
use async_trait::async_trait;
use memmap2::Mmap;
use std::borrow::Cow;
use std::ops::Range;

fn slice_range(data: &[u8], range: Range<u64>) -> Result<&[u8]> {
    check_range(&range, data.len() as u64)?;
    Ok(&data[range.start as usize..range.end as usize])
}

impl ByteRangeSource for [u8] {
    fn len(&self) -> u64 {
        <[u8]>::len(self) as u64
    }

    fn read_range(&self, range: Range<u64>) -> Result<Cow<'_, [u8]>> {
        slice_range(self, range).map(Cow::Borrowed)
    }
}

impl ByteRangeSource for Vec<u8> {
    fn len(&self) -> u64 {
        self.as_slice().len() as u64
    }

    fn read_range(&self, range: Range<u64>) -> Result<Cow<'_, [u8]>> {
        slice_range(self, range).map(Cow::Borrowed)
    }
}

/// A memory map reads straight from the page cache, without copying.
impl ByteRangeSource for Mmap {
    fn len(&self) -> u64 {
        (**self).len() as u64
    }

    fn read_range(&self, range: Range<u64>) -> Result<Cow<'_, [u8]>> {
        slice_range(self, range).map(Cow::Borrowed)
    }
}

#[async_trait]
impl AsyncByteRangeSource for [u8] {
    fn len(&self) -> u64 {
        <[u8]>::len(self) as u64
    }

    async fn read_range(&self, range: Range<u64>) -> Result<Vec<u8>> {
        slice_range(self, range).map(<[u8]>::to_vec)
    }
}

#[async_trait]
impl AsyncByteRangeSource for Vec<u8> {
    fn len(&self) -> u64 {
        self.as_slice().len() as u64
    }

    async fn read_range(&self, range: Range<u64>) -> Result<Vec<u8>> {
        slice_range(self, range).map(<[u8]>::to_vec)
    }
}
