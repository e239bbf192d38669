//! JSON decoder stage: one parsed value per record (NDJSON and friends).

use serde::de::DeserializeOwned;

use crate::error::SplitError;
use crate::splitter::Spliterator;

pub(crate) fn parse_record<T: DeserializeOwned>(
    bytes: &[u8],
    index: usize,
) -> Result<T, SplitError> {
    serde_json::from_slice(bytes).map_err(|source| SplitError::Parse { index, source })
}

/// Iterator adapter that parses each record as JSON.
///
/// `T` defaults to [`serde_json::Value`]; any `DeserializeOwned` type works
/// for homogeneous record streams. Failures surface as [`SplitError::Parse`]
/// with the record index, and iteration continues past them.
///
/// ```rust
/// use spliterator::{JsonRecords, Needle, Spliterator, SplitOptions};
///
/// let source = b"{\"id\":1}\n{\"id\":2}\n";
/// let ids: Vec<serde_json::Value> = JsonRecords::new(Spliterator::new(
///     source,
///     Needle::from_char('\n'),
///     SplitOptions {
///         skip_empty: true,
///         ..Default::default()
///     },
/// ))
/// .collect::<Result<_, _>>()
/// .unwrap();
/// assert_eq!(ids[1]["id"], 2);
/// ```
#[derive(Debug)]
pub struct JsonRecords<'src, T = serde_json::Value> {
    inner: Spliterator<'src>,
    index: usize,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<'src, T: DeserializeOwned> JsonRecords<'src, T> {
    /// Wraps a spliterator; record indexes start at zero.
    #[must_use]
    pub fn new(inner: Spliterator<'src>) -> Self {
        Self {
            inner,
            index: 0,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<'src, T: DeserializeOwned> Iterator for JsonRecords<'src, T> {
    type Item = Result<T, SplitError>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.inner.next()?;
        let index = self.index;
        self.index += 1;
        Some(parse_record(bytes, index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::needle::Needle;
    use crate::options::SplitOptions;
    use serde::Deserialize;

    #[test]
    fn parses_ndjson_values() {
        let source = b"1\n[2,3]\n{\"four\":4}";
        let values: Vec<serde_json::Value> = JsonRecords::new(Spliterator::new(
            source,
            Needle::from_char('\n'),
            SplitOptions::default(),
        ))
        .collect::<Result<_, _>>()
        .unwrap();
        assert_eq!(values.len(), 3);
        assert_eq!(values[2]["four"], 4);
    }

    #[test]
    fn deserializes_typed_records() {
        #[derive(Deserialize, PartialEq, Debug)]
        struct Row {
            name: String,
        }
        let source = b"{\"name\":\"a\"}\n{\"name\":\"b\"}";
        let rows: Vec<Row> = JsonRecords::new(Spliterator::new(
            source,
            Needle::from_char('\n'),
            SplitOptions::default(),
        ))
        .collect::<Result<_, _>>()
        .unwrap();
        assert_eq!(rows[1], Row { name: "b".into() });
    }

    #[test]
    fn parse_failure_carries_the_record_index() {
        let source = b"{\"ok\":true}\nnot json\n2";
        let mut records: JsonRecords<'_> = JsonRecords::new(Spliterator::new(
            source,
            Needle::from_char('\n'),
            SplitOptions::default(),
        ));
        assert!(records.next().unwrap().is_ok());
        match records.next().unwrap() {
            Err(SplitError::Parse { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected parse error, got {other:?}"),
        }
        assert_eq!(
            records.next().unwrap().unwrap(),
            serde_json::Value::from(2)
        );
    }
}
