#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use spliterator::{Needle, SplitOptions, Spliterator};

#[derive(Arbitrary, Debug)]
struct Input {
    source: Vec<u8>,
    delim: Vec<u8>,
    drop: u8,
    take: Option<u8>,
    skip_empty: bool,
    position: u8,
}

/// Reference splitter: leftmost non-overlapping matches plus the trailing
/// record, mirroring the documented emission rules.
fn model(input: &Input) -> Vec<Vec<u8>> {
    let position = input.position as usize;
    if position > 0 && position >= input.source.len() {
        return Vec::new();
    }
    let source = &input.source[position..];
    let delim = &input.delim;

    let mut records = Vec::new();
    let mut start = 0;
    let mut at = 0;
    while at + delim.len() <= source.len() {
        if &source[at..at + delim.len()] == &delim[..] {
            records.push(source[start..at].to_vec());
            at += delim.len();
            start = at;
        } else {
            at += 1;
        }
    }
    records.push(source[start..].to_vec());

    records
        .into_iter()
        .filter(|r| !(input.skip_empty && r.is_empty()))
        .skip(input.drop as usize)
        .take(input.take.map_or(usize::MAX, usize::from))
        .collect()
}

fuzz_target!(|input: Input| {
    let Ok(needle) = Needle::new(input.delim.clone()) else {
        return;
    };
    let records: Vec<Vec<u8>> = Spliterator::new(
        &input.source,
        needle,
        SplitOptions {
            drop: input.drop as usize,
            take: input.take.map(usize::from),
            skip_empty: input.skip_empty,
            position: input.position as usize,
            ..Default::default()
        },
    )
    .map(<[u8]>::to_vec)
    .collect();

    assert_eq!(records, model(&input));
});
