//! Source shapes consumed by the asynchronous spliterator.
//!
//! Two shapes exist beyond plain in-memory slices: a *seekable* resource with
//! a known size and positional reads, and a pull-based *chunk stream*. The
//! spliterator never owns scheduling; every suspension in the crate happens
//! inside these primitives.

use std::future::Future;
use std::io;

use futures_core::Stream;

#[cfg(feature = "fs")]
use crate::error::SplitError;

/// A random-access byte resource with a known size.
///
/// `read_at` issues at most one read per call; returning fewer bytes than
/// requested is fine as long as the cursor advanced (a zero-byte read before
/// the end of the resource is treated as an I/O failure by the caller).
/// Distinct values must be able to serve positional reads concurrently,
/// since parallel scans give every spliterator its own instance.
pub trait SeekableSource {
    /// Total size of the resource in bytes.
    fn size(&self) -> usize;

    /// Reads up to `buf.len()` bytes starting at byte `pos` of the resource.
    fn read_at(
        &mut self,
        pos: usize,
        buf: &mut [u8],
    ) -> impl Future<Output = io::Result<usize>> + Send;
}

/// In-memory bytes presented as a seekable resource.
///
/// Mostly useful in tests and for memory-mapped regions; cloning is as cheap
/// as cloning `T`, which makes it directly usable with
/// [`split_many`](crate::split_many).
#[derive(Debug, Clone)]
pub struct MemorySource<T>(pub T);

impl<T: AsRef<[u8]> + Send> SeekableSource for MemorySource<T> {
    fn size(&self) -> usize {
        self.0.as_ref().len()
    }

    fn read_at(
        &mut self,
        pos: usize,
        buf: &mut [u8],
    ) -> impl Future<Output = io::Result<usize>> + Send {
        let bytes = self.0.as_ref();
        let pos = pos.min(bytes.len());
        let n = (bytes.len() - pos).min(buf.len());
        buf[..n].copy_from_slice(&bytes[pos..pos + n]);
        std::future::ready(Ok(n))
    }
}

/// A file presented as a seekable resource, backed by `tokio::fs`.
///
/// The handle is opened lazily, which keeps clones cheap; every clone opens
/// its own descriptor, so concurrent positional reads from parallel
/// spliterators never share a file cursor.
#[cfg(feature = "fs")]
#[derive(Debug)]
pub struct FileSource {
    path: std::path::PathBuf,
    size: usize,
    file: Option<tokio::fs::File>,
}

#[cfg(feature = "fs")]
impl Clone for FileSource {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            size: self.size,
            file: None,
        }
    }
}

#[cfg(feature = "fs")]
impl FileSource {
    /// Stats `path` and prepares a seekable source over its contents.
    ///
    /// # Errors
    ///
    /// [`SplitError::Io`] if the metadata lookup fails, or
    /// [`SplitError::SourceTooLarge`] if the file length does not fit in
    /// `usize`.
    pub async fn open(path: impl Into<std::path::PathBuf>) -> Result<Self, SplitError> {
        let path = path.into();
        let meta = tokio::fs::metadata(&path)
            .await
            .map_err(|source| SplitError::Io {
                position: 0,
                source,
            })?;
        let size = usize::try_from(meta.len())
            .map_err(|_| SplitError::SourceTooLarge { size: meta.len() })?;
        Ok(Self {
            path,
            size,
            file: None,
        })
    }
}

#[cfg(feature = "fs")]
impl SeekableSource for FileSource {
    fn size(&self) -> usize {
        self.size
    }

    fn read_at(
        &mut self,
        pos: usize,
        buf: &mut [u8],
    ) -> impl Future<Output = io::Result<usize>> + Send {
        use tokio::io::{AsyncReadExt, AsyncSeekExt};

        async move {
            let file = match self.file.take() {
                Some(file) => self.file.insert(file),
                None => self
                    .file
                    .insert(tokio::fs::File::open(&self.path).await?),
            };
            file.seek(io::SeekFrom::Start(pos as u64)).await?;
            file.read(buf).await
        }
    }
}

/// Lifts an iterator of byte buffers into the chunk-stream source shape.
///
/// ```rust
/// use spliterator::{iter_chunks, AsyncSpliterator, Needle, SplitOptions};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let chunks = iter_chunks([b"ab\nc".to_vec(), b"d\nef".to_vec()]);
/// let mut records = AsyncSpliterator::over_stream(
///     chunks,
///     Needle::from_char('\n'),
///     SplitOptions::default(),
/// );
/// assert_eq!(records.next().await.unwrap().unwrap(), b"ab");
/// assert_eq!(records.next().await.unwrap().unwrap(), b"cd");
/// assert_eq!(records.next().await.unwrap().unwrap(), b"ef");
/// assert!(records.next().await.is_none());
/// # });
/// ```
pub fn iter_chunks<I>(chunks: I) -> impl Stream<Item = io::Result<Vec<u8>>> + Unpin + Send
where
    I: IntoIterator<Item = Vec<u8>>,
    I::IntoIter: Send,
{
    futures_util::stream::iter(chunks.into_iter().map(Ok))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_source_reads_positionally() {
        let mut src = MemorySource(b"hello world".to_vec());
        assert_eq!(src.size(), 11);
        let mut buf = [0u8; 5];
        let n = futures_util::future::FutureExt::now_or_never(src.read_at(6, &mut buf))
            .unwrap()
            .unwrap();
        assert_eq!(n, 5);
        assert_eq!(&buf, b"world");
    }

    #[test]
    fn memory_source_read_past_end_is_empty() {
        let mut src = MemorySource(&b"abc"[..]);
        let mut buf = [0u8; 4];
        let n = futures_util::future::FutureExt::now_or_never(src.read_at(10, &mut buf))
            .unwrap()
            .unwrap();
        assert_eq!(n, 0);
    }
}
