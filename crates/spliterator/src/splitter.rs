//! The delimiter-scan state machine and the synchronous spliterator.
//!
//! [`ScanEngine`] is the single state machine behind both spliterators. It is
//! entirely synchronous: fill, drain, and queue operations never suspend, so
//! the async spliterator can drive the same engine and keep all suspension
//! inside its source reads.
//!
//! The engine works in *haystack coordinates*: for the synchronous
//! [`Spliterator`] those are offsets into the caller's slice, for the
//! asynchronous one they are offsets into its scratch buffer (rebased on
//! compaction).

use crate::error::SplitError;
use crate::needle::Needle;
use crate::options::SplitOptions;
use crate::range_queue::{ByteRange, RangeQueue};
use crate::text::TextRecords;

/// Scan state shared by the sync and async spliterators.
///
/// Invariants:
/// - `[start-of-segment, pos)` has been fully carved into queued or emitted
///   ranges; `pos` sits just past the last consumed delimiter.
/// - No delimiter occurrence begins in `[pos, scan_from)`.
/// - `parity` is the `"`-count parity of `[row-start, parity_pos)` when
///   quote-aware scanning is enabled.
#[derive(Debug)]
pub(crate) struct ScanEngine {
    needle: Needle,
    quote: Option<u8>,
    queue: RangeQueue,
    pos: usize,
    scan_from: usize,
    parity_pos: usize,
    parity: bool,
    yielded: usize,
    drop: usize,
    take: Option<usize>,
    skip_empty: bool,
    high_water_mark: usize,
    initial_position: usize,
    start_at: usize,
    drained: bool,
    done: bool,
}

impl ScanEngine {
    /// `start_at` is the first haystack offset the engine may touch: the
    /// init position for in-memory sources, zero for buffered async sources
    /// (which honor the position inside their read cursor instead).
    pub(crate) fn new(
        needle: Needle,
        quote: Option<u8>,
        options: &SplitOptions,
        start_at: usize,
    ) -> Self {
        Self {
            needle,
            quote,
            queue: RangeQueue::new(),
            pos: start_at,
            scan_from: start_at,
            parity_pos: start_at,
            parity: false,
            yielded: 0,
            drop: options.drop,
            take: options.take,
            skip_empty: options.skip_empty,
            high_water_mark: options.effective_high_water_mark(),
            initial_position: options.position,
            start_at,
            drained: false,
            done: false,
        }
    }

    /// Searches `haystack[scan_from..upto]` for delimiters, queueing the
    /// ranges between them until the queued byte total reaches the
    /// high-water mark.
    ///
    /// Stops short of a complete trailing match window so a delimiter
    /// straddling the next append is still found at its true position.
    pub(crate) fn scan(&mut self, haystack: &[u8], upto: usize) {
        while self.queue.total_bytes() < self.high_water_mark {
            let Some(p) = self.needle.search(haystack, self.scan_from, upto) else {
                // A suffix shorter than the needle may complete later.
                self.scan_from = upto
                    .saturating_sub(self.needle.len() - 1)
                    .max(self.scan_from);
                return;
            };
            if self.quote_parity_at(haystack, p) {
                // Delimiter between an odd and even quote: not a boundary.
                self.scan_from = p + 1;
                continue;
            }
            self.queue.push(ByteRange::new(self.pos, p));
            self.pos = p + self.needle.len();
            self.scan_from = self.pos;
            self.parity_pos = self.pos;
        }
    }

    /// Advances quote parity up to `p` and reports whether `p` falls inside
    /// a quoted region. Always `false` when quote-awareness is off.
    fn quote_parity_at(&mut self, haystack: &[u8], p: usize) -> bool {
        let Some(quote) = self.quote else {
            return false;
        };
        let quotes = memchr::memchr_iter(quote, &haystack[self.parity_pos..p]).count();
        if quotes % 2 == 1 {
            self.parity = !self.parity;
        }
        self.parity_pos = p;
        self.parity
    }

    /// Queues the final unterminated record once the source is exhausted.
    ///
    /// `total` is the end of the haystack: the source length for in-memory
    /// scans, bytes observed so far for async ones. A source that ends with
    /// its delimiter leaves `pos == total` and queues the empty trailing
    /// record; an init position at or past the end queues nothing.
    pub(crate) fn drain(&mut self, total: usize) {
        if self.drained {
            return;
        }
        self.drained = true;
        if self.initial_position > 0 && total <= self.start_at {
            return;
        }
        if self.pos > total {
            // position past the end of a non-empty source
            return;
        }
        self.queue.push(ByteRange::new(self.pos, total));
        self.pos = total;
    }

    /// Pops queued ranges, applying `skip_empty` and `drop`, until one is
    /// emittable. `None` when the queue runs dry or the take cap is hit.
    pub(crate) fn pop_next(&mut self) -> Option<ByteRange> {
        loop {
            if self.finished() {
                return None;
            }
            let range = self.queue.pop()?;
            if range.is_empty() && self.skip_empty {
                continue;
            }
            self.yielded += 1;
            if self.yielded <= self.drop {
                continue;
            }
            return Some(range);
        }
    }

    pub(crate) fn finished(&self) -> bool {
        self.done
            || self
                .take
                .is_some_and(|take| self.yielded >= self.drop + take)
    }

    pub(crate) fn set_done(&mut self) {
        self.done = true;
    }

    pub(crate) fn drained(&self) -> bool {
        self.drained
    }

    pub(crate) fn queue_is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub(crate) fn queued_bytes(&self) -> usize {
        self.queue.total_bytes()
    }

    pub(crate) fn high_water_mark(&self) -> usize {
        self.high_water_mark
    }

    /// Everything before this haystack offset has been consumed; it is the
    /// compaction cut point for the async spliterator.
    pub(crate) fn consumed_upto(&self) -> usize {
        self.pos
    }

    /// Shifts all engine coordinates left by `cut` after a compaction.
    /// Callable only while the queue is empty.
    pub(crate) fn rebase(&mut self, cut: usize) {
        debug_assert!(self.queue.is_empty());
        debug_assert!(self.pos >= cut);
        self.queue.rebase(cut);
        self.pos -= cut;
        self.scan_from -= cut;
        self.parity_pos -= cut;
    }

    /// Cancellation: drops queued ranges and refuses further work.
    pub(crate) fn cancel(&mut self) {
        self.queue.clear();
        self.done = true;
    }
}

/// Iterator over an in-memory byte source, yielding the zero-copy slices
/// between delimiter occurrences.
///
/// Records borrow the source directly, so they stay valid for `'src`; the
/// lifetime makes the view contract trivial here, unlike the async
/// spliterator whose views die at the next `next().await`.
///
/// ```rust
/// use spliterator::{Needle, Spliterator, SplitOptions};
///
/// let mut lines = Spliterator::new(
///     b"alpha\nbeta\ngamma",
///     Needle::from_char('\n'),
///     SplitOptions::default(),
/// );
/// assert_eq!(lines.next(), Some(&b"alpha"[..]));
/// assert_eq!(lines.next(), Some(&b"beta"[..]));
/// assert_eq!(lines.next(), Some(&b"gamma"[..]));
/// assert_eq!(lines.next(), None);
/// ```
#[derive(Debug)]
pub struct Spliterator<'src> {
    source: &'src [u8],
    engine: ScanEngine,
}

impl<'src> Spliterator<'src> {
    /// A spliterator over `source` split at every occurrence of `needle`.
    #[must_use]
    pub fn new(source: &'src [u8], needle: Needle, options: SplitOptions) -> Self {
        Self {
            source,
            engine: ScanEngine::new(needle, None, &options, options.position),
        }
    }

    /// A quote-aware spliterator: occurrences of `needle` between an odd and
    /// even `quote` byte are not treated as boundaries.
    ///
    /// This is the CSV *column* scanner. Doubled quotes are two quote
    /// characters, not an escape, and parity accumulates across the whole
    /// source, so use it on a single logical row.
    #[must_use]
    pub fn quote_aware(
        source: &'src [u8],
        needle: Needle,
        quote: u8,
        options: SplitOptions,
    ) -> Self {
        Self {
            source,
            engine: ScanEngine::new(needle, Some(quote), &options, options.position),
        }
    }

    /// Source-relative offsets of the next record. The slice-yielding
    /// [`Iterator`] impl is a view over exactly these ranges.
    pub fn next_range(&mut self) -> Option<ByteRange> {
        loop {
            if self.engine.finished() {
                return None;
            }
            if self.engine.queue_is_empty() {
                self.engine.scan(self.source, self.source.len());
                if self.engine.queue_is_empty() {
                    if self.engine.drained() {
                        self.engine.set_done();
                        return None;
                    }
                    self.engine.drain(self.source.len());
                    if self.engine.queue_is_empty() {
                        self.engine.set_done();
                        return None;
                    }
                }
            }
            if let Some(range) = self.engine.pop_next() {
                return Some(range);
            }
            // Every queued range was dropped or empty-skipped; refill.
        }
    }

    /// Remaining records as source-relative ranges. Terminal.
    pub fn collect_ranges(mut self) -> Vec<ByteRange> {
        std::iter::from_fn(|| self.next_range()).collect()
    }

    /// Remaining records decoded as UTF-8, failing on the first undecodable
    /// record. Terminal, like `collect`.
    ///
    /// # Errors
    ///
    /// [`SplitError::Decode`] with the index of the offending record.
    pub fn collect_decoded(self) -> Result<Vec<&'src str>, SplitError> {
        TextRecords::new(self).collect()
    }
}

impl<'src> Iterator for Spliterator<'src> {
    type Item = &'src [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let range = self.next_range()?;
        Some(&self.source[range.start..range.end])
    }
}

impl std::iter::FusedIterator for Spliterator<'_> {}
