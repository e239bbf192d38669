/// Initialization parameters shared by the synchronous and asynchronous
/// spliterators.
///
/// # Examples
///
/// ```rust
/// use spliterator::{Needle, Spliterator, SplitOptions};
///
/// let records: Vec<_> = Spliterator::new(
///     b"a\n\nb\n",
///     Needle::from_char('\n'),
///     SplitOptions {
///         skip_empty: true,
///         ..Default::default()
///     },
/// )
/// .collect();
/// assert_eq!(records, [b"a", b"b"]);
/// ```
#[derive(Debug, Clone)]
pub struct SplitOptions {
    /// Number of leading records to skip. Skipped records still count toward
    /// `take`'s window, mirroring `emitted = min(take, total - drop)`.
    ///
    /// # Default
    ///
    /// `0`
    pub drop: usize,

    /// Maximum number of records to emit, or `None` for no cap.
    ///
    /// # Default
    ///
    /// `None`
    pub take: Option<usize>,

    /// Whether zero-length records are silently dropped.
    ///
    /// An empty record arises between adjacent delimiters, after a trailing
    /// delimiter, and for an entirely empty source.
    ///
    /// # Default
    ///
    /// `false`
    pub skip_empty: bool,

    /// Initial cursor into the source. Scanning begins here; bytes before the
    /// position are never read. A non-zero position at or past the end of the
    /// source yields nothing.
    ///
    /// # Default
    ///
    /// `0`
    pub position: usize,

    /// Upper bound on each read issued against an asynchronous source *and*
    /// on the byte length queued ahead of the consumer. The async fill loop
    /// stops reading while the queue holds at least this many bytes, which is
    /// the library's only backpressure mechanism.
    ///
    /// A value of `0` is replaced with the default.
    ///
    /// # Default
    ///
    /// `65_536`
    pub high_water_mark: usize,
}

/// Default size of reads and of the queued-byte bound.
pub const DEFAULT_HIGH_WATER_MARK: usize = 64 * 1024;

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            drop: 0,
            take: None,
            skip_empty: false,
            position: 0,
            high_water_mark: DEFAULT_HIGH_WATER_MARK,
        }
    }
}

impl SplitOptions {
    pub(crate) fn effective_high_water_mark(&self) -> usize {
        if self.high_water_mark == 0 {
            DEFAULT_HIGH_WATER_MARK
        } else {
            self.high_water_mark
        }
    }
}
