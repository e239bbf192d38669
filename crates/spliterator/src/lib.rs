//! Streaming record extraction from delimited byte sources.
//!
//! A *spliterator* scans a byte source for occurrences of a delimiter (any
//! non-empty byte sequence, CRLF included) and yields the zero-copy views
//! between them, without ever materializing the whole input. Sources can be
//! in-memory slices, seekable resources read by positional chunks, or
//! pull-based chunk streams; thin stages lift the raw byte records into
//! UTF-8 strings, JSON values, or projected CSV rows, and a chunk planner
//! partitions a seekable source into delimiter-aligned ranges for parallel
//! scans.
//!
//! ```rust
//! use spliterator::{Needle, Spliterator, SplitOptions};
//!
//! let mut records = Spliterator::new(
//!     b"alpha\r\nbeta\r\ngamma",
//!     Needle::from_str("\r\n").unwrap(),
//!     SplitOptions::default(),
//! );
//! assert_eq!(records.next(), Some(&b"alpha"[..]));
//! ```
//!
//! Emitted views follow source order exactly: interleaving one delimiter
//! between consecutive records reconstructs the input byte-for-byte. Views
//! from the asynchronous spliterator live only until the next
//! `next().await`; copy what you keep.

#![allow(missing_docs)]

mod csv;
mod error;
mod grow_buf;
mod json;
mod needle;
mod options;
mod planner;
mod range_queue;
mod source;
mod splitter;
mod stream;
mod text;
mod zip;

pub use csv::{
    normalize_column_names, AsyncCsvSplitter, CsvMode, CsvOptions, CsvRow, CsvSplitter, Transform,
    Transformers,
};
pub use error::SplitError;
pub use grow_buf::GrowBuf;
pub use json::JsonRecords;
pub use needle::Needle;
pub use options::{SplitOptions, DEFAULT_HIGH_WATER_MARK};
pub use planner::{plan_chunks, split_many};
pub use range_queue::{ByteRange, RangeQueue};
#[cfg(feature = "fs")]
pub use source::FileSource;
pub use source::{iter_chunks, MemorySource, SeekableSource};
pub use splitter::Spliterator;
pub use stream::{AsyncSpliterator, Chunked, Feed, Seekable};
pub use text::TextRecords;
pub use zip::{zip_pad, ZipPad};

#[cfg(test)]
mod tests;
