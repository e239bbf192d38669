use thiserror::Error;

/// Errors surfaced by spliterators, decoder stages, and the chunk planner.
///
/// `Io` and `Range` are terminal: the spliterator that raised them enters its
/// done state and emits nothing further. `Decode` and `Parse` carry the index
/// of the offending record and leave the underlying iteration resumable; the
/// caller decides whether to abort (`?`) or keep pulling.
#[derive(Debug, Error)]
pub enum SplitError {
    /// A positional read on the underlying source failed.
    #[error("read at byte {position} failed: {source}")]
    Io {
        /// Source offset the read was issued at.
        position: usize,
        #[source]
        source: std::io::Error,
    },

    /// A buffer view was requested outside the written region.
    #[error("range {start}..{end} out of bounds (written: {written})")]
    Range {
        start: usize,
        end: usize,
        /// Buffer watermark at the time of the request.
        written: usize,
    },

    /// The planner found no delimiter occurrence anywhere in a boundary's
    /// search window.
    #[error("no delimiter near byte {target} (searched {window_lo}..{window_hi})")]
    PlanWindow {
        /// Boundary target offset.
        target: usize,
        /// Lower edge of the widest window examined.
        window_lo: usize,
        /// Upper edge of the widest window examined.
        window_hi: usize,
    },

    /// A record was not valid UTF-8.
    #[error("record {index} is not valid UTF-8")]
    Decode {
        /// Zero-based index of the record within the stream.
        index: usize,
        #[source]
        source: std::str::Utf8Error,
    },

    /// A record did not parse as JSON.
    #[error("record {index} is not valid JSON: {source}")]
    Parse {
        /// Zero-based index of the record within the stream.
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    /// A delimiter of length zero was supplied.
    #[error("delimiter must be at least one byte")]
    EmptyDelimiter,

    /// The source reports a length that does not fit in `usize`.
    #[error("source of {size} bytes exceeds the addressable range")]
    SourceTooLarge { size: u64 },
}

impl SplitError {
    /// `true` for failures that terminate the spliterator that raised them.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SplitError::Io { .. } | SplitError::Range { .. } | SplitError::PlanWindow { .. }
        )
    }
}
