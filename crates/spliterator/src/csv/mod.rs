//! CSV projection: a row-level spliterator composed with per-row,
//! quote-aware column spliterators, plus header binding, column-name
//! canonicalization, and per-column value transformation.
//!
//! This is deliberately not a full CSV parser. The row scanner treats the
//! row delimiter literally, so a quoted field containing it is split
//! mid-field, and a doubled `""` is two quote characters rather than an
//! escape. Only the column scanner is quote-aware.

mod header;

pub use header::normalize_column_names;

use std::collections::HashMap;
use std::io;

use futures_core::Stream;
use serde_json::{Map, Value};

use crate::error::SplitError;
use crate::needle::Needle;
use crate::options::{SplitOptions, DEFAULT_HIGH_WATER_MARK};
use crate::source::SeekableSource;
use crate::splitter::Spliterator;
use crate::stream::{AsyncSpliterator, Chunked, Feed, Seekable};
use crate::text::decode_record;
use crate::zip::zip_pad;

/// Shape of each emitted row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CsvMode {
    /// The row's cells in order.
    #[default]
    Array,
    /// A `header -> value` mapping. Trailing cells the header does not name
    /// are dropped; absent trailing cells produce no key at all.
    Object,
    /// `(key, value, column_index)` triples in column order.
    Entries,
}

/// A per-column value transform. Pure `&str -> Value`; must not capture
/// state across rows.
pub type Transform = Box<dyn Fn(&str) -> Value + Send + Sync>;

/// Per-column transforms, bound positionally or by (possibly canonicalized)
/// header name. Missing entries default to identity, which produces
/// [`Value::String`].
#[derive(Default)]
pub enum Transformers {
    /// Every cell passes through as a string.
    #[default]
    None,
    /// Aligned with column positions; `None` slots are identity.
    ByPosition(Vec<Option<Transform>>),
    /// Keyed by header name as it appears after canonicalization.
    ByName(HashMap<String, Transform>),
}

impl std::fmt::Debug for Transformers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transformers::None => f.write_str("Transformers::None"),
            Transformers::ByPosition(v) => write!(f, "Transformers::ByPosition(len={})", v.len()),
            Transformers::ByName(m) => write!(f, "Transformers::ByName(len={})", m.len()),
        }
    }
}

/// One projected row.
#[derive(Debug, Clone, PartialEq)]
pub enum CsvRow {
    /// `CsvMode::Array` output.
    Array(Vec<Value>),
    /// `CsvMode::Object` output.
    Object(Map<String, Value>),
    /// `CsvMode::Entries` output.
    Entries(Vec<(String, Value, usize)>),
}

impl From<CsvRow> for Value {
    /// Flattens the row into a plain JSON value; entries become
    /// `[key, value, index]` triples.
    fn from(row: CsvRow) -> Value {
        match row {
            CsvRow::Array(cells) => Value::Array(cells),
            CsvRow::Object(object) => Value::Object(object),
            CsvRow::Entries(entries) => Value::Array(
                entries
                    .into_iter()
                    .map(|(key, value, index)| {
                        Value::Array(vec![Value::String(key), value, Value::from(index)])
                    })
                    .collect(),
            ),
        }
    }
}

/// Configuration for [`CsvSplitter`] and [`AsyncCsvSplitter`].
///
/// `drop` and `take` are counted after the header row; `skip_empty` applies
/// at the row level and defaults to `true`, so a trailing row delimiter does
/// not produce a phantom empty row.
#[derive(Debug)]
pub struct CsvOptions {
    /// Delimiter between records.
    ///
    /// # Default
    ///
    /// LF
    pub row_delimiter: Needle,

    /// Delimiter between fields within a row.
    ///
    /// # Default
    ///
    /// `,`
    pub column_delimiter: Needle,

    /// Quote byte for the column scanner, or `None` to scan columns
    /// literally. Column delimiters at odd quote parity are not boundaries;
    /// `""` is two quotes, not an escape.
    ///
    /// # Default
    ///
    /// `Some(b'"')`
    pub quote: Option<u8>,

    /// Whether the first row is a header naming the columns.
    ///
    /// # Default
    ///
    /// `true`
    pub header: bool,

    /// Whether header names are canonicalized before use. `None` resolves to
    /// `true` for [`CsvMode::Object`] and [`CsvMode::Entries`], `false` for
    /// [`CsvMode::Array`].
    ///
    /// # Default
    ///
    /// `None`
    pub normalize_keys: Option<bool>,

    /// Per-column value transforms.
    ///
    /// # Default
    ///
    /// [`Transformers::None`]
    pub transformers: Transformers,

    /// Shape of each emitted row.
    ///
    /// # Default
    ///
    /// [`CsvMode::Array`]
    pub mode: CsvMode,

    /// Data rows to skip after the header.
    ///
    /// # Default
    ///
    /// `0`
    pub drop: usize,

    /// Cap on emitted data rows.
    ///
    /// # Default
    ///
    /// `None`
    pub take: Option<usize>,

    /// Whether empty rows are skipped.
    ///
    /// # Default
    ///
    /// `true`
    pub skip_empty: bool,

    /// High-water mark for the underlying row spliterator (async sources).
    ///
    /// # Default
    ///
    /// `65_536`
    pub high_water_mark: usize,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            row_delimiter: Needle::from_char('\n'),
            column_delimiter: Needle::from_char(','),
            quote: Some(b'"'),
            header: true,
            normalize_keys: None,
            transformers: Transformers::None,
            mode: CsvMode::Array,
            drop: 0,
            take: None,
            skip_empty: true,
            high_water_mark: DEFAULT_HIGH_WATER_MARK,
        }
    }
}

impl CsvOptions {
    fn row_split_options(&self) -> SplitOptions {
        SplitOptions {
            drop: 0,
            take: None,
            skip_empty: self.skip_empty,
            position: 0,
            high_water_mark: self.high_water_mark,
        }
    }
}

/// Shared row-to-value projection behind the sync and async CSV splitters.
#[derive(Debug)]
struct RowProjector {
    column_delimiter: Needle,
    quote: Option<u8>,
    mode: CsvMode,
    normalize_keys: bool,
    header_expected: bool,
    header: Option<Vec<String>>,
    transformers: Transformers,
    row_index: usize,
}

impl RowProjector {
    fn new(options: &mut CsvOptions) -> Self {
        let normalize_keys = options
            .normalize_keys
            .unwrap_or(!matches!(options.mode, CsvMode::Array));
        Self {
            column_delimiter: options.column_delimiter.clone(),
            quote: options.quote,
            mode: options.mode,
            normalize_keys,
            header_expected: options.header,
            header: None,
            transformers: std::mem::take(&mut options.transformers),
            row_index: 0,
        }
    }

    fn needs_header(&self) -> bool {
        self.header_expected && self.header.is_none()
    }

    fn split_columns<'row>(&self, row: &'row [u8]) -> Vec<&'row [u8]> {
        let needle = self.column_delimiter.clone();
        match self.quote {
            Some(quote) => {
                Spliterator::quote_aware(row, needle, quote, SplitOptions::default()).collect()
            }
            None => Spliterator::new(row, needle, SplitOptions::default()).collect(),
        }
    }

    fn bind_header(&mut self, row: &[u8]) -> Result<(), SplitError> {
        let index = self.row_index;
        self.row_index += 1;
        let mut names = Vec::new();
        for col in self.split_columns(row) {
            names.push(decode_record(col, index)?.to_owned());
        }
        if self.normalize_keys {
            names = normalize_column_names(&names);
        }
        self.header = Some(names);
        Ok(())
    }

    fn skip_row(&mut self) {
        self.row_index += 1;
    }

    fn transform_cell(&self, position: usize, key: Option<&str>, text: &str) -> Value {
        let transform = match &self.transformers {
            Transformers::None => None,
            Transformers::ByPosition(list) => list.get(position).and_then(Option::as_ref),
            Transformers::ByName(map) => key.and_then(|k| map.get(k)),
        };
        match transform {
            Some(f) => f(text),
            None => Value::String(text.to_owned()),
        }
    }

    fn project(&mut self, row: &[u8]) -> Result<CsvRow, SplitError> {
        let index = self.row_index;
        self.row_index += 1;
        let cols = self.split_columns(row);
        let mut cells = Vec::with_capacity(cols.len());
        for col in cols {
            cells.push(decode_record(col, index)?);
        }

        Ok(match self.mode {
            CsvMode::Array => CsvRow::Array(
                cells
                    .iter()
                    .enumerate()
                    .map(|(i, &text)| {
                        let key = self.header_key(i);
                        self.transform_cell(i, key, text)
                    })
                    .collect(),
            ),
            CsvMode::Object => {
                let mut object = Map::new();
                for (i, key, text) in self.keyed_cells(&cells) {
                    let value = self.transform_cell(i, Some(&key), text);
                    object.insert(key, value);
                }
                CsvRow::Object(object)
            }
            CsvMode::Entries => {
                let mut entries = Vec::new();
                for (i, key, text) in self.keyed_cells(&cells) {
                    let value = self.transform_cell(i, Some(&key), text);
                    entries.push((key, value, i));
                }
                CsvRow::Entries(entries)
            }
        })
    }

    fn header_key(&self, position: usize) -> Option<&str> {
        self.header
            .as_ref()
            .and_then(|h| h.get(position))
            .map(String::as_str)
    }

    /// Pairs cells with their keys: header names where a header exists
    /// (padding drops extras on either side), column indexes otherwise.
    fn keyed_cells<'c>(&self, cells: &[&'c str]) -> Vec<(usize, String, &'c str)> {
        match &self.header {
            Some(names) => zip_pad(names.iter(), cells.iter().enumerate())
                .filter_map(|(key, cell)| match (key, cell) {
                    (Some(key), Some((i, text))) => Some((i, key.clone(), *text)),
                    // Missing trailing cell: the key is simply absent.
                    // Extra cell beyond the header: dropped.
                    _ => None,
                })
                .collect(),
            None => cells
                .iter()
                .enumerate()
                .map(|(i, text)| (i, i.to_string(), *text))
                .collect(),
        }
    }
}

/// Drop/take accounting over projected data rows, shared by the sync and
/// async splitters. Counting starts after the header row.
#[derive(Debug)]
struct CsvDriver {
    projector: RowProjector,
    to_drop: usize,
    remaining: Option<usize>,
}

impl CsvDriver {
    fn new(options: &mut CsvOptions) -> Self {
        Self {
            projector: RowProjector::new(options),
            to_drop: options.drop,
            remaining: options.take,
        }
    }

    fn exhausted(&self) -> bool {
        matches!(self.remaining, Some(0))
    }

    fn offer(&mut self, row: &[u8]) -> Result<Option<CsvRow>, SplitError> {
        if self.projector.needs_header() {
            self.projector.bind_header(row)?;
            return Ok(None);
        }
        if self.to_drop > 0 {
            self.to_drop -= 1;
            self.projector.skip_row();
            return Ok(None);
        }
        if let Some(remaining) = &mut self.remaining {
            *remaining -= 1;
        }
        self.projector.project(row).map(Some)
    }

    fn headers(&self) -> Option<&[String]> {
        self.projector.header.as_deref()
    }
}

/// Synchronous CSV splitter over an in-memory byte source.
///
/// ```rust
/// use spliterator::{CsvMode, CsvOptions, CsvRow, CsvSplitter};
///
/// let source = b"name,age\nAlice,30\nBob,40\n";
/// let rows: Vec<_> = CsvSplitter::new(
///     source,
///     CsvOptions {
///         mode: CsvMode::Object,
///         ..Default::default()
///     },
/// )
/// .collect::<Result<_, _>>()
/// .unwrap();
/// let CsvRow::Object(first) = &rows[0] else { unreachable!() };
/// assert_eq!(first["name"], "Alice");
/// assert_eq!(first["age"], "30");
/// ```
#[derive(Debug)]
pub struct CsvSplitter<'src> {
    rows: Spliterator<'src>,
    driver: CsvDriver,
}

impl<'src> CsvSplitter<'src> {
    /// A CSV splitter over `source` configured by `options`.
    #[must_use]
    pub fn new(source: &'src [u8], mut options: CsvOptions) -> Self {
        let rows = Spliterator::new(
            source,
            options.row_delimiter.clone(),
            options.row_split_options(),
        );
        Self {
            rows,
            driver: CsvDriver::new(&mut options),
        }
    }

    /// The bound header, available once the first row has been consumed.
    /// Canonicalized when `normalize_keys` resolved to `true`.
    #[must_use]
    pub fn headers(&self) -> Option<&[String]> {
        self.driver.headers()
    }
}

impl Iterator for CsvSplitter<'_> {
    type Item = Result<CsvRow, SplitError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.driver.exhausted() {
                return None;
            }
            let row = self.rows.next()?;
            match self.driver.offer(row) {
                Ok(Some(projected)) => return Some(Ok(projected)),
                Ok(None) => {}
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

/// Asynchronous CSV splitter over a seekable resource or chunk stream.
#[derive(Debug)]
pub struct AsyncCsvSplitter<F> {
    rows: AsyncSpliterator<F>,
    driver: CsvDriver,
}

impl<R: SeekableSource + Send> AsyncCsvSplitter<Seekable<R>> {
    /// Rows read positionally from `source`.
    #[must_use]
    pub fn over_seekable(source: R, mut options: CsvOptions) -> Self {
        let rows = AsyncSpliterator::over_seekable(
            source,
            options.row_delimiter.clone(),
            options.row_split_options(),
        );
        Self {
            rows,
            driver: CsvDriver::new(&mut options),
        }
    }
}

impl<S> AsyncCsvSplitter<Chunked<S>>
where
    S: Stream<Item = io::Result<Vec<u8>>> + Unpin + Send,
{
    /// Rows pulled from a chunk stream.
    #[must_use]
    pub fn over_stream(stream: S, mut options: CsvOptions) -> Self {
        let rows = AsyncSpliterator::over_stream(
            stream,
            options.row_delimiter.clone(),
            options.row_split_options(),
        );
        Self {
            rows,
            driver: CsvDriver::new(&mut options),
        }
    }
}

impl<F: Feed> AsyncCsvSplitter<F> {
    /// The next projected row, or `None` once the source is exhausted.
    pub async fn next_row(&mut self) -> Option<Result<CsvRow, SplitError>> {
        loop {
            if self.driver.exhausted() {
                return None;
            }
            let row = match self.rows.next().await? {
                Ok(row) => row,
                Err(err) => return Some(Err(err)),
            };
            match self.driver.offer(row) {
                Ok(Some(projected)) => return Some(Ok(projected)),
                Ok(None) => {}
                Err(err) => return Some(Err(err)),
            }
        }
    }

    /// Drains all rows into a vector. Terminal.
    ///
    /// # Errors
    ///
    /// The first error encountered.
    pub async fn collect_rows(mut self) -> Result<Vec<CsvRow>, SplitError> {
        let mut out = Vec::new();
        while let Some(row) = self.next_row().await {
            out.push(row?);
        }
        Ok(out)
    }

    /// The bound header, available once the first row has been consumed.
    #[must_use]
    pub fn headers(&self) -> Option<&[String]> {
        self.driver.headers()
    }
}
