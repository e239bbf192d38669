//! Text decoder stage: lifts a spliterator into UTF-8 strings.

use crate::error::SplitError;
use crate::splitter::Spliterator;

pub(crate) fn decode_record(bytes: &[u8], index: usize) -> Result<&str, SplitError> {
    std::str::from_utf8(bytes).map_err(|source| SplitError::Decode { index, source })
}

/// Iterator adapter that decodes each record as UTF-8.
///
/// A record that fails to decode is surfaced as [`SplitError::Decode`] with
/// its index; the iterator itself keeps going, so the caller chooses between
/// aborting (`collect::<Result<Vec<_>, _>>()?`, the default posture) and
/// skipping bad records.
#[derive(Debug)]
pub struct TextRecords<'src> {
    inner: Spliterator<'src>,
    index: usize,
}

impl<'src> TextRecords<'src> {
    /// Wraps a spliterator; record indexes start at zero.
    #[must_use]
    pub fn new(inner: Spliterator<'src>) -> Self {
        Self { inner, index: 0 }
    }
}

impl<'src> Iterator for TextRecords<'src> {
    type Item = Result<&'src str, SplitError>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.inner.next()?;
        let index = self.index;
        self.index += 1;
        Some(decode_record(bytes, index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::needle::Needle;
    use crate::options::SplitOptions;

    fn lines(source: &[u8]) -> TextRecords<'_> {
        TextRecords::new(Spliterator::new(
            source,
            Needle::from_char('\n'),
            SplitOptions::default(),
        ))
    }

    #[test]
    fn decodes_each_record() {
        let out: Result<Vec<_>, _> = lines("héllo\nwörld".as_bytes()).collect();
        assert_eq!(out.unwrap(), ["héllo", "wörld"]);
    }

    #[test]
    fn decode_failure_carries_the_record_index() {
        let mut records = lines(b"ok\n\xff\xfe\nstill ok");
        assert_eq!(records.next().unwrap().unwrap(), "ok");
        match records.next().unwrap() {
            Err(SplitError::Decode { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected decode error, got {other:?}"),
        }
        // iteration continues past the bad record
        assert_eq!(records.next().unwrap().unwrap(), "still ok");
        assert!(records.next().is_none());
    }
}
