//! Shared generators and the model splitter the properties compare against.

use quickcheck::{Arbitrary, Gen};

/// Iteration count: thorough on CI, quick locally.
pub fn iterations() -> u64 {
    if is_ci::cached() {
        10_000
    } else {
        1_000
    }
}

/// Reference splitter: leftmost non-overlapping occurrences, one trailing
/// record after the last delimiter. Intentionally naive (no skip table, no
/// queue) so it cannot share a bug with the real engine.
pub fn model_split(source: &[u8], delim: &[u8]) -> Vec<Vec<u8>> {
    assert!(!delim.is_empty());
    let mut records = Vec::new();
    let mut start = 0;
    let mut at = 0;
    while at + delim.len() <= source.len() {
        if &source[at..at + delim.len()] == delim {
            records.push(source[start..at].to_vec());
            at += delim.len();
            start = at;
        } else {
            at += 1;
        }
    }
    records.push(source[start..].to_vec());
    records
}

/// Naive leftmost search over a window, for checking the BMH search.
pub fn naive_search(haystack: &[u8], needle: &[u8], lo: usize, hi: usize) -> Option<usize> {
    let hi = hi.min(haystack.len());
    let lo = lo.min(hi);
    if hi - lo < needle.len() {
        return None;
    }
    (lo..=hi - needle.len()).find(|&p| &haystack[p..p + needle.len()] == needle)
}

/// A source drawn from a four-byte alphabet plus a short delimiter over the
/// same alphabet, so delimiter hits are dense enough to be interesting.
#[derive(Clone, Debug)]
pub struct Corpus {
    pub source: Vec<u8>,
    pub delim: Vec<u8>,
}

const ALPHABET: [u8; 4] = [b'a', b'b', b'\n', b','];

impl Arbitrary for Corpus {
    fn arbitrary(g: &mut Gen) -> Self {
        let source = Vec::<u8>::arbitrary(g)
            .into_iter()
            .map(|b| ALPHABET[b as usize % ALPHABET.len()])
            .collect();
        let len = 1 + usize::arbitrary(g) % 2;
        let delim = (0..len)
            .map(|_| ALPHABET[usize::arbitrary(g) % ALPHABET.len()])
            .collect();
        Corpus { source, delim }
    }
}
