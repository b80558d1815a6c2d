use super::{AsyncByteRangeSource, ByteRangeSource, check_range};
use crate::error::Result;
use async_trait::async_trait;
use std::borrow::Cow;
use std::fs::File;
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;

/// Fills `buf` from `file` starting at `offset` without moving a shared cursor.
#[cfg(unix)]
fn read_exact_at(file: &File, buf: &mut [u8], offset: u64) -> std::io::Result<()> {
    use std::os::unix::fs::FileExt;
    file.read_exact_at(buf, offset)
}

#[cfg(windows)]
fn read_exact_at(file: &File, mut buf: &mut [u8], mut offset: u64) -> std::io::Result<()> {
    use std::os::windows::fs::FileExt;

    while !buf.is_empty() {
        match file.seek_read(buf, offset) {
            Ok(0) => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "failed to fill whole buffer",
                ));
            }
            Ok(n) => {
                buf = &mut buf[n..];
                offset += n as u64;
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }

    Ok(())
}

fn read_file_range(file: &File, len: u64, range: Range<u64>) -> Result<Vec<u8>> {
    check_range(&range, len)?;

    let mut buf = vec![0u8; (range.end - range.start) as usize];
    read_exact_at(file, &mut buf, range.start)?;
    Ok(buf)
}

/// A file read with positional reads.
///
/// The length is captured when the source is created; a file that shrinks
/// afterwards surfaces as an I/O error on the affected reads.
#[derive(Debug)]
pub struct FileSource {
    file: File,
    len: u64,
}

impl FileSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(File::open(path)?)
    }

    pub fn new(file: File) -> Result<Self> {
        let len = file.metadata()?.len();
        Ok(Self { file, len })
    }

    pub fn into_inner(self) -> File {
        self.file
    }
}

impl ByteRangeSource for FileSource {
    fn len(&self) -> u64 {
        self.len
    }

    fn read_range(&self, range: Range<u64>) -> Result<Cow<'_, [u8]>> {
        read_file_range(&self.file, self.len, range).map(Cow::Owned)
    }
}

/// A file whose reads run on tokio's blocking thread pool.
///
/// Cloning is cheap and clones share the underlying file handle.
#[derive(Debug, Clone)]
pub struct AsyncFileSource {
    file: Arc<File>,
    len: u64,
}

impl AsyncFileSource {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = tokio::fs::File::open(path).await?.into_std().await;
        Self::new(file)
    }

    pub fn new(file: File) -> Result<Self> {
        let len = file.metadata()?.len();
        Ok(Self {
            file: Arc::new(file),
            len,
        })
    }
}

impl From<FileSource> for AsyncFileSource {
    fn from(source: FileSource) -> Self {
        Self {
            file: Arc::new(source.file),
            len: source.len,
        }
    }
}

#[async_trait]
impl AsyncByteRangeSource for AsyncFileSource {
    fn len(&self) -> u64 {
        self.len
    }

    async fn read_range(&self, range: Range<u64>) -> Result<Vec<u8>> {
        check_range(&range, self.len)?;

        let file = Arc::clone(&self.file);
        let len = self.len;
        tokio::task::spawn_blocking(move || read_file_range(&file, len, range)).await?
    }
}
