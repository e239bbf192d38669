//! The asynchronous spliterator.
//!
//! Drives the same [`ScanEngine`](crate::splitter) state machine as the
//! synchronous spliterator, with records carved out of an internal
//! [`GrowBuf`] that is filled from the source and compacted between fills.
//! The only suspension points are the source pulls; fill, search, drain, and
//! queue operations never await.

use std::future::Future;
use std::io;

use futures_core::Stream;
use futures_util::StreamExt;
use serde::de::DeserializeOwned;

use crate::error::SplitError;
use crate::grow_buf::GrowBuf;
use crate::needle::Needle;
use crate::options::SplitOptions;
use crate::range_queue::ByteRange;
use crate::source::SeekableSource;
use crate::splitter::ScanEngine;
use crate::{json, text};

/// Crate seam between the scan engine and the two async source shapes.
///
/// One pull appends one batch of bytes at the buffer's watermark and reports
/// how many arrived; `Ok(0)` means end of input. Implemented by [`Seekable`]
/// and [`Chunked`]; not meant for implementation outside the crate.
pub trait Feed {
    /// Pulls the next batch into `buf`.
    fn pull(
        &mut self,
        buf: &mut GrowBuf,
        high_water_mark: usize,
    ) -> impl Future<Output = io::Result<usize>> + Send;

    /// Source offset of the next pull, for error context.
    fn position(&self) -> usize;
}

/// Feed over a [`SeekableSource`]: positional reads of at most the
/// high-water mark, bounded by the resource size.
#[derive(Debug)]
pub struct Seekable<R> {
    source: R,
    read_pos: usize,
    end: usize,
}

impl<R: SeekableSource> Seekable<R> {
    fn new(source: R, start: usize, end: usize) -> Self {
        let end = end.min(source.size());
        Self {
            source,
            read_pos: start.min(end),
            end,
        }
    }
}

impl<R: SeekableSource + Send> Feed for Seekable<R> {
    fn pull(
        &mut self,
        buf: &mut GrowBuf,
        high_water_mark: usize,
    ) -> impl Future<Output = io::Result<usize>> + Send {
        async move {
            let want = high_water_mark.min(self.end - self.read_pos);
            if want == 0 {
                return Ok(0);
            }
            let n = self.source.read_at(self.read_pos, buf.space(want)).await?;
            if n == 0 {
                // A read below the advertised size that does not advance the
                // cursor would loop forever; surface it.
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("read at {} returned no bytes ({} remaining)", self.read_pos, want),
                ));
            }
            buf.commit(n);
            self.read_pos += n;
            Ok(n)
        }
    }

    fn position(&self) -> usize {
        self.read_pos
    }
}

/// Feed over a pull-based chunk stream.
#[derive(Debug)]
pub struct Chunked<S> {
    stream: S,
    skip: usize,
    pulled: usize,
}

impl<S> Chunked<S> {
    fn new(stream: S, skip: usize) -> Self {
        Self {
            stream,
            skip,
            pulled: 0,
        }
    }
}

impl<S> Feed for Chunked<S>
where
    S: Stream<Item = io::Result<Vec<u8>>> + Unpin + Send,
{
    fn pull(
        &mut self,
        buf: &mut GrowBuf,
        _high_water_mark: usize,
    ) -> impl Future<Output = io::Result<usize>> + Send {
        async move {
            loop {
                let Some(chunk) = self.stream.next().await else {
                    return Ok(0);
                };
                let chunk = chunk?;
                let skip = self.skip.min(chunk.len());
                self.skip -= skip;
                let rest = &chunk[skip..];
                if rest.is_empty() {
                    continue;
                }
                buf.extend(rest);
                self.pulled += rest.len();
                return Ok(rest.len());
            }
        }
    }

    fn position(&self) -> usize {
        self.pulled
    }
}

/// Suspension-capable spliterator over a seekable resource or chunk stream.
///
/// Each emitted record is a view into the internal buffer; the view lives
/// until the next `next().await`, which may compact or reallocate the buffer
/// underneath it; the `&mut self` borrow in the signature enforces exactly
/// that window. Copy a record (`to_vec`) to retain it.
///
/// A spliterator is advanced by one task at a time; it spawns nothing and
/// holds no locks. Dropping it (or calling [`close`](Self::close) first)
/// releases the source.
#[derive(Debug)]
pub struct AsyncSpliterator<F> {
    feed: F,
    buf: GrowBuf,
    engine: ScanEngine,
    eof: bool,
    emitted: usize,
}

impl<R: SeekableSource + Send> AsyncSpliterator<Seekable<R>> {
    /// A spliterator issuing positional reads against `source`, starting at
    /// `options.position`.
    #[must_use]
    pub fn over_seekable(source: R, needle: Needle, options: SplitOptions) -> Self {
        let end = source.size();
        let feed = Seekable::new(source, options.position, end);
        Self::with_feed(feed, needle, options)
    }

    /// A spliterator over the byte range `[range.start, range.end)` of
    /// `source`, as produced by [`plan_chunks`](crate::plan_chunks).
    ///
    /// `options.position` is ignored; the range defines the cursor.
    #[must_use]
    pub fn over_seekable_range(
        source: R,
        needle: Needle,
        range: ByteRange,
        options: SplitOptions,
    ) -> Self {
        let feed = Seekable::new(source, range.start, range.end);
        let options = SplitOptions {
            position: 0,
            ..options
        };
        Self::with_feed(feed, needle, options)
    }
}

impl<S> AsyncSpliterator<Chunked<S>>
where
    S: Stream<Item = io::Result<Vec<u8>>> + Unpin + Send,
{
    /// A spliterator pulling chunks from `stream`. `options.position` bytes
    /// are discarded before scanning begins.
    #[must_use]
    pub fn over_stream(stream: S, needle: Needle, options: SplitOptions) -> Self {
        let feed = Chunked::new(stream, options.position);
        Self::with_feed(feed, needle, options)
    }
}

impl<F: Feed> AsyncSpliterator<F> {
    fn with_feed(feed: F, needle: Needle, options: SplitOptions) -> Self {
        let high_water_mark = options.effective_high_water_mark();
        Self {
            feed,
            buf: GrowBuf::with_capacity(high_water_mark.min(64 * 1024)),
            engine: ScanEngine::new(needle, None, &options, 0),
            eof: false,
            emitted: 0,
        }
    }

    /// The next record, or `None` once the source is exhausted.
    ///
    /// The returned slice borrows the spliterator and dies at the next call;
    /// an I/O failure is terminal and leaves the spliterator done.
    pub async fn next(&mut self) -> Option<Result<&[u8], SplitError>> {
        loop {
            if self.engine.finished() {
                return None;
            }
            if self.engine.queue_is_empty() {
                // Everything before the consumed watermark has been yielded;
                // reclaim it so the buffer stays bounded by the high-water
                // mark plus one record.
                let cut = self.engine.consumed_upto();
                if cut > 0 {
                    self.buf.compact(cut, self.buf.written());
                    self.engine.rebase(cut);
                }
                while !self.eof && self.engine.queued_bytes() < self.engine.high_water_mark() {
                    match self
                        .feed
                        .pull(&mut self.buf, self.engine.high_water_mark())
                        .await
                    {
                        Ok(0) => self.eof = true,
                        Ok(_) => self.engine.scan(self.buf.as_slice(), self.buf.written()),
                        Err(source) => {
                            let position = self.feed.position();
                            self.close();
                            return Some(Err(SplitError::Io { position, source }));
                        }
                    }
                }
                if self.engine.queue_is_empty() {
                    if !self.eof {
                        continue;
                    }
                    if self.engine.drained() {
                        self.engine.set_done();
                        return None;
                    }
                    self.engine.drain(self.buf.written());
                    if self.engine.queue_is_empty() {
                        self.engine.set_done();
                        return None;
                    }
                }
            }
            if let Some(range) = self.engine.pop_next() {
                self.emitted += 1;
                return Some(match self.buf.subarray(range.start, range.end) {
                    Ok(view) => Ok(view),
                    Err(err) => {
                        self.engine.set_done();
                        Err(err)
                    }
                });
            }
            // Queued ranges were all dropped or empty-skipped; refill.
        }
    }

    /// The next record decoded as UTF-8. Decode failures carry the record
    /// index and do not stop iteration.
    pub async fn next_text(&mut self) -> Option<Result<&str, SplitError>> {
        let index = self.emitted;
        match self.next().await? {
            Ok(bytes) => Some(text::decode_record(bytes, index)),
            Err(err) => Some(Err(err)),
        }
    }

    /// The next record parsed as JSON. Parse failures carry the record index
    /// and do not stop iteration.
    pub async fn next_json<T: DeserializeOwned>(&mut self) -> Option<Result<T, SplitError>> {
        let index = self.emitted;
        match self.next().await? {
            Ok(bytes) => Some(json::parse_record(bytes, index)),
            Err(err) => Some(Err(err)),
        }
    }

    /// Drains the spliterator into owned records. Terminal.
    ///
    /// # Errors
    ///
    /// The first error encountered; records before it are lost.
    pub async fn collect_vecs(mut self) -> Result<Vec<Vec<u8>>, SplitError> {
        let mut out = Vec::new();
        while let Some(record) = self.next().await {
            out.push(record?.to_vec());
        }
        Ok(out)
    }

    /// Drains the spliterator into owned strings. Terminal.
    ///
    /// # Errors
    ///
    /// The first I/O or decode error encountered.
    pub async fn collect_strings(mut self) -> Result<Vec<String>, SplitError> {
        let mut out = Vec::new();
        while let Some(record) = self.next_text().await {
            out.push(record?.to_owned());
        }
        Ok(out)
    }

    /// Drains the spliterator, parsing every record as JSON. Terminal.
    ///
    /// # Errors
    ///
    /// The first I/O or parse error encountered.
    pub async fn collect_json<T: DeserializeOwned>(mut self) -> Result<Vec<T>, SplitError> {
        let mut out = Vec::new();
        while let Some(record) = self.next_json().await {
            out.push(record?);
        }
        Ok(out)
    }

    /// Cancels the iteration: clears the queue and buffer and marks the
    /// spliterator done. Idempotent. The source itself is released on drop.
    pub fn close(&mut self) {
        self.engine.cancel();
        self.buf.clear();
    }
}
